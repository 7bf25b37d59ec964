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

//! Multi-round annotated element processing for the DotVM toolchain
//!
//! A host toolchain discovers annotated program elements over several rounds.
//! [`RoundProcessor`] filters those elements down to the ones whose enclosing
//! package or type is well-formed, hands them to the registered [`Step`]s by
//! annotation, and carries everything that could not be handled yet into the
//! next round as an [`ElementKey`]. Keys survive the host handing out fresh
//! handle objects every round. When the host signals the final round, anything
//! still outstanding is reported through the [`Diagnostics`] sink.

pub mod config;
pub mod diagnostics;
pub mod element;
pub mod error;
pub mod key;
pub mod memory;
pub mod processor;
pub mod registry;
pub mod round;
pub mod scanner;
pub mod step;
pub mod validation;

pub use config::ProcessorConfig;
pub use diagnostics::{Diagnostic, DiagnosticLog, Diagnostics, Severity, TracingDiagnostics};
pub use element::{Element, ElementKind, SymbolTable};
pub use error::{ErrorCategory, ProcessorError, ProcessorResult};
pub use key::{ElementKey, ExecutableKey, TypeKey};
pub use processor::{ProcessingEnv, ProcessorState, RoundInfo, RoundOutcome, RoundProcessor, RoundSummary, StepSummary};
pub use registry::AnnotationRegistry;
pub use round::Round;
pub use step::{AnnotatedElements, Step};
pub use validation::Validator;
