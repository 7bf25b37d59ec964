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

//! Diagnostic reporting

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info, warn};

use crate::element::Element;

/// Severity of a reported diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Note => write!(f, "note"),
        }
    }
}

/// Sink for diagnostics produced by the processor
pub trait Diagnostics<E: Element> {
    /// Report a message, optionally attached to an element
    fn report(&mut self, severity: Severity, message: &str, element: Option<&E>);
}

/// A single diagnostic, produced by a round and emitted to a sink afterwards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic<E> {
    pub severity: Severity,
    pub message: String,
    pub element: Option<E>,
}

impl<E: Element> Diagnostic<E> {
    pub fn error(message: impl Into<String>, element: Option<E>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            element,
        }
    }

    pub fn warning(message: impl Into<String>, element: Option<E>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            element,
        }
    }

    /// Send this diagnostic to a sink
    pub fn emit(&self, sink: &mut dyn Diagnostics<E>) {
        sink.report(self.severity, &self.message, self.element.as_ref());
    }
}

/// In-memory diagnostics sink
#[derive(Debug, Clone)]
pub struct DiagnosticLog<E> {
    entries: Vec<Diagnostic<E>>,
}

impl<E> Default for DiagnosticLog<E> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<E: Element> DiagnosticLog<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Diagnostic<E>] {
        &self.entries
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic<E>> {
        self.entries.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic<E>> {
        self.entries.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<E: Element> Diagnostics<E> for DiagnosticLog<E> {
    fn report(&mut self, severity: Severity, message: &str, element: Option<&E>) {
        self.entries.push(Diagnostic {
            severity,
            message: message.to_string(),
            element: element.cloned(),
        });
    }
}

/// Diagnostics sink that forwards everything to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl<E: Element> Diagnostics<E> for TracingDiagnostics {
    fn report(&mut self, severity: Severity, message: &str, element: Option<&E>) {
        let location = element.map(|e| e.to_string()).unwrap_or_default();
        match severity {
            Severity::Error => error!(location = %location, "{}", message),
            Severity::Warning => warn!(location = %location, "{}", message),
            Severity::Note => info!(location = %location, "{}", message),
        }
    }
}
