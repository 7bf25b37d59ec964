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

//! Annotation registry built from the registered steps

use indexmap::IndexSet;

use crate::element::{Element, SymbolTable};
use crate::step::Step;

/// The annotations each step declared, and their union
///
/// Built once when the processor is created and never changed afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationRegistry {
    all: IndexSet<String>,
    per_step: Vec<IndexSet<String>>,
}

impl AnnotationRegistry {
    pub fn from_steps<E: Element>(steps: &[Box<dyn Step<E>>]) -> Self {
        let per_step: Vec<IndexSet<String>> = steps.iter().map(|step| step.annotations()).collect();
        let all = per_step.iter().flatten().cloned().collect();
        Self { all, per_step }
    }

    /// Union of all declared annotations
    pub fn all(&self) -> &IndexSet<String> {
        &self.all
    }

    /// Annotations declared by the step at `index`
    pub fn for_step(&self, index: usize) -> &IndexSet<String> {
        &self.per_step[index]
    }

    pub fn step_count(&self) -> usize {
        self.per_step.len()
    }

    /// Keep only annotations the symbol table knows as types
    pub fn resolvable_in<E: Element>(&self, symbols: &dyn SymbolTable<E>) -> Self {
        let known = |name: &String| symbols.type_element(name).is_some();
        Self {
            all: self.all.iter().filter(|name| known(name)).cloned().collect(),
            per_step: self.per_step.iter().map(|names| names.iter().filter(|name| known(name)).cloned().collect()).collect(),
        }
    }
}
