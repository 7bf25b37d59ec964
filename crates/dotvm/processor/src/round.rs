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

//! Input of a single processing round

use crate::element::Element;
use crate::step::AnnotatedElements;

/// What the host discovered in one round
#[derive(Debug, Clone)]
pub struct Round<E: Element> {
    discovered: AnnotatedElements<E>,
    processing_over: bool,
    error_raised: bool,
}

impl<E: Element> Round<E> {
    /// An intermediate round with the newly discovered elements
    pub fn new(discovered: AnnotatedElements<E>) -> Self {
        Self {
            discovered,
            processing_over: false,
            error_raised: false,
        }
    }

    /// The final round; no further rounds will follow
    pub fn last() -> Self {
        Self {
            discovered: AnnotatedElements::new(),
            processing_over: true,
            error_raised: false,
        }
    }

    /// Mark whether an error was already reported elsewhere during this round
    pub fn with_error_raised(mut self, error_raised: bool) -> Self {
        self.error_raised = error_raised;
        self
    }

    pub fn discovered(&self) -> &AnnotatedElements<E> {
        &self.discovered
    }

    pub fn processing_over(&self) -> bool {
        self.processing_over
    }

    pub fn error_raised(&self) -> bool {
        self.error_raised
    }
}
