// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Reporting of elements that never became processable

use crate::config::ProcessorConfig;
use crate::diagnostics::Diagnostic;
use crate::element::{Element, SymbolTable};
use crate::key::ElementKey;

/// One error per outstanding key, attached to the element if it still resolves
pub(crate) fn unresolved_diagnostics<'a, E, I>(keys: I, symbols: &dyn SymbolTable<E>, config: &ProcessorConfig) -> Vec<Diagnostic<E>>
where
    E: Element + 'a,
    I: IntoIterator<Item = &'a ElementKey<E>>,
{
    keys.into_iter()
        .map(|key| match key.resolve(symbols) {
            Some(element) => Diagnostic::error(config.unresolved_message(&format!("this {}", element.kind())), Some(element)),
            None => Diagnostic::error(config.unresolved_message(&key.to_string()), None),
        })
        .collect()
}
