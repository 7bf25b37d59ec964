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

//! Discovery of annotated elements below a container

use indexmap::IndexSet;

use crate::element::Element;
use crate::error::{ProcessorError, ProcessorResult};
use crate::step::AnnotatedElements;

/// Add `element` and its enclosed elements carrying any of `annotations`
///
/// Member types are not expanded: scanning `Outer` yields `Outer` and its
/// annotated fields, methods, parameters and type parameters, but neither a
/// nested `Inner` nor its members. Nested types are containers of their own.
pub fn find_annotated_elements<E: Element>(element: &E, annotations: &IndexSet<String>, found: &mut AnnotatedElements<E>) {
    for enclosed in element.enclosed_elements() {
        if !enclosed.kind().is_type() {
            find_annotated_elements(&enclosed, annotations, found);
        }
    }

    // Parameters and type parameters are not enclosed elements
    let kind = element.kind();
    if kind.is_executable() {
        for parameter in element.parameters() {
            find_annotated_elements(&parameter, annotations, found);
        }
    }
    if kind.is_type() || kind.is_executable() {
        for type_parameter in element.type_parameters() {
            find_annotated_elements(&type_parameter, annotations, found);
        }
    }

    for annotation in annotations {
        if element.is_annotated_with(annotation) {
            found.insert(annotation.clone(), element.clone());
        }
    }
}

/// The nearest type enclosing `element`, or `element` itself if it is a type
pub fn enclosing_type<E: Element>(element: &E) -> ProcessorResult<E> {
    let mut current = Some(element.clone());
    while let Some(candidate) = current {
        if candidate.kind().is_type() {
            return Ok(candidate);
        }
        current = candidate.enclosing_element();
    }
    Err(ProcessorError::not_enclosed_in_type(element))
}

/// The container whose well-formedness decides whether `element` is ready
///
/// Packages are their own container; everything else belongs to its nearest
/// enclosing type.
pub fn enclosing_container<E: Element>(element: &E) -> ProcessorResult<E> {
    if element.kind().is_package() { Ok(element.clone()) } else { enclosing_type(element) }
}
