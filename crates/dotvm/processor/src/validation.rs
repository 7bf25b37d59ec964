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

//! Structural readiness of containers

use crate::element::Element;

/// Decides whether a package or type is complete enough to be processed
///
/// Implementations typically check that every type the container references
/// already exists. The processor consults a validator at most once per
/// container per round.
#[cfg_attr(test, mockall::automock)]
pub trait Validator<E: Element> {
    fn is_well_formed(&self, container: &E) -> bool;
}

impl<E: Element, F> Validator<E> for F
where
    F: Fn(&E) -> bool,
{
    fn is_well_formed(&self, container: &E) -> bool {
        self(container)
    }
}

/// Validator that accepts every container
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl<E: Element> Validator<E> for AcceptAll {
    fn is_well_formed(&self, _container: &E) -> bool {
        true
    }
}
