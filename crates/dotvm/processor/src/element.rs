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

//! Host element model boundary
//!
//! The processor never owns program elements. A host hands out handles that
//! are only meaningful for the round they were produced in, together with a
//! [`SymbolTable`] that can look packages and types up by name again.

use std::fmt;
use std::hash::Hash;

/// Kind of a program element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Package,
    Class,
    Enum,
    Interface,
    AnnotationType,
    Record,
    TypeParameter,
    Field,
    EnumConstant,
    RecordComponent,
    Method,
    Constructor,
    Parameter,
    Module,
    LocalVariable,
    Initializer,
    Other,
}

impl ElementKind {
    /// Packages are their own container
    pub fn is_package(&self) -> bool {
        matches!(self, Self::Package)
    }

    /// Classes, enums, interfaces, annotation types and records
    pub fn is_type(&self) -> bool {
        matches!(self, Self::Class | Self::Enum | Self::Interface | Self::AnnotationType | Self::Record)
    }

    /// Methods and constructors
    pub fn is_executable(&self) -> bool {
        matches!(self, Self::Method | Self::Constructor)
    }

    /// Lowercase surface name, as used in diagnostics ("this method")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::Class => "class",
            Self::Enum => "enum",
            Self::Interface => "interface",
            Self::AnnotationType => "annotation_type",
            Self::Record => "record",
            Self::TypeParameter => "type_parameter",
            Self::Field => "field",
            Self::EnumConstant => "enum_constant",
            Self::RecordComponent => "record_component",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Parameter => "parameter",
            Self::Module => "module",
            Self::LocalVariable => "local_variable",
            Self::Initializer => "initializer",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A handle to a program element supplied by the host
///
/// Handles produced in different rounds may be different values for the same
/// logical element, so equality is only meaningful within one round. The
/// `Display` output is the element's printable identity; for packages and
/// types it must be the fully qualified name.
pub trait Element: Clone + Eq + Hash + fmt::Debug + fmt::Display + 'static {
    /// Kind of this element
    fn kind(&self) -> ElementKind;

    /// Simple (unqualified) name
    fn simple_name(&self) -> String;

    /// The element that directly encloses this one, if any
    fn enclosing_element(&self) -> Option<Self>;

    /// Directly enclosed elements in natural declaration order
    ///
    /// Parameters and type parameters are not part of this list.
    fn enclosed_elements(&self) -> Vec<Self>;

    /// Parameters of an executable, empty for other kinds
    fn parameters(&self) -> Vec<Self>;

    /// Type parameters of a type or executable, empty for other kinds
    fn type_parameters(&self) -> Vec<Self>;

    /// Whether the annotation with the given qualified name is present
    fn is_annotated_with(&self, annotation: &str) -> bool;
}

/// Name-based lookup of packages and types for the current round
pub trait SymbolTable<E: Element> {
    /// Look up a package by its fully qualified name
    fn package_element(&self, name: &str) -> Option<E>;

    /// Look up a type by its fully qualified name
    fn type_element(&self, name: &str) -> Option<E>;
}
