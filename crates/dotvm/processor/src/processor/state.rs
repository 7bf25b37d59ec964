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

//! Per-round bookkeeping and the round transition
//!
//! [`ProcessorState`] is everything that survives from one round to the
//! next. [`ProcessorState::advance`] computes the state after a round from
//! the state before it and the round's input; diagnostics are returned, not
//! emitted, so the transition has no effects beyond invoking the steps.

use indexmap::IndexSet;
use tracing::{debug, debug_span, warn};

use super::report::unresolved_diagnostics;
use super::{RoundSummary, StepSummary};
use crate::config::ProcessorConfig;
use crate::diagnostics::Diagnostic;
use crate::element::{Element, SymbolTable};
use crate::error::{ProcessorError, ProcessorResult};
use crate::key::ElementKey;
use crate::registry::AnnotationRegistry;
use crate::round::Round;
use crate::scanner::{enclosing_container, find_annotated_elements};
use crate::step::{AnnotatedElements, Step};
use crate::validation::Validator;

/// Collaborators a single round runs against
pub struct RoundContext<'a, E: Element> {
    pub steps: &'a mut [Box<dyn Step<E>>],
    pub registry: &'a AnnotationRegistry,
    pub config: &'a ProcessorConfig,
    pub symbols: &'a dyn SymbolTable<E>,
    pub validator: &'a dyn Validator<E>,
}

/// Result of a round besides the next state
#[derive(Debug)]
pub struct RoundOutcome<E> {
    pub summary: RoundSummary,
    pub diagnostics: Vec<Diagnostic<E>>,
}

/// Deferred work carried between rounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorState<E: Element> {
    /// Packages and types that were not well-formed in the last round
    deferred_enclosing: IndexSet<ElementKey<E>>,
    /// Elements each step rejected in its last invocation, by step position
    deferred_by_step: Vec<IndexSet<ElementKey<E>>>,
    rounds: usize,
    finished: bool,
}

impl<E: Element> ProcessorState<E> {
    pub fn new(step_count: usize) -> Self {
        Self {
            deferred_enclosing: IndexSet::new(),
            deferred_by_step: (0..step_count).map(|_| IndexSet::new()).collect(),
            rounds: 0,
            finished: false,
        }
    }

    pub fn deferred_containers(&self) -> &IndexSet<ElementKey<E>> {
        &self.deferred_enclosing
    }

    pub fn deferred_by_step(&self, index: usize) -> Option<&IndexSet<ElementKey<E>>> {
        self.deferred_by_step.get(index)
    }

    /// Every deferred key, containers first, without duplicates
    pub fn outstanding(&self) -> IndexSet<&ElementKey<E>> {
        self.deferred_enclosing.iter().chain(self.deferred_by_step.iter().flatten()).collect()
    }

    /// Number of rounds processed so far
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Whether the final round has been processed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Compute the state after `round`
    ///
    /// An error leaves `self` untouched; steps invoked before the error was
    /// detected keep whatever effects they had.
    pub fn advance(&self, round: &Round<E>, context: RoundContext<'_, E>) -> ProcessorResult<(Self, RoundOutcome<E>)> {
        let number = self.rounds + 1;
        if self.finished {
            return Err(ProcessorError::RoundAfterCompletion { round: number });
        }
        if self.deferred_by_step.len() != context.steps.len() || context.registry.step_count() != context.steps.len() {
            return Err(ProcessorError::internal_error(format!(
                "state tracks {} steps, registry {}, but {} steps were supplied",
                self.deferred_by_step.len(),
                context.registry.step_count(),
                context.steps.len()
            )));
        }

        let span = debug_span!("round", round = number, last = round.processing_over());
        let _enter = span.enter();

        if round.processing_over() { Ok(self.finish(round, &context, number)) } else { self.process(round, context, number) }
    }

    fn finish(&self, round: &Round<E>, context: &RoundContext<'_, E>, number: usize) -> (Self, RoundOutcome<E>) {
        let outstanding = self.outstanding();
        let diagnostics = if round.error_raised() {
            debug!(outstanding = outstanding.len(), "An error was already raised, not reporting unresolved elements");
            Vec::new()
        } else if !context.config.report_unresolved {
            debug!(outstanding = outstanding.len(), "Reporting of unresolved elements is disabled");
            Vec::new()
        } else {
            unresolved_diagnostics(outstanding.iter().copied(), context.symbols, context.config)
        };

        let summary = RoundSummary {
            round: number,
            terminal: true,
            outstanding: outstanding.len(),
            reported: diagnostics.len(),
            ..RoundSummary::default()
        };
        let next = Self {
            deferred_enclosing: IndexSet::new(),
            deferred_by_step: (0..self.deferred_by_step.len()).map(|_| IndexSet::new()).collect(),
            rounds: number,
            finished: true,
        };
        (next, RoundOutcome { summary, diagnostics })
    }

    fn process(&self, round: &Round<E>, context: RoundContext<'_, E>, number: usize) -> ProcessorResult<(Self, RoundOutcome<E>)> {
        let resolvable;
        let registry = if context.config.require_resolvable_annotations {
            resolvable = context.registry.resolvable_in(context.symbols);
            &resolvable
        } else {
            context.registry
        };
        let mut diagnostics = Vec::new();
        let mut deferred_enclosing = IndexSet::new();

        // Containers deferred last round are rescanned if they can be found again
        let mut previously_ill_formed = AnnotatedElements::new();
        for key in &self.deferred_enclosing {
            match key.resolve(context.symbols) {
                Some(container) => find_annotated_elements(&container, registry.all(), &mut previously_ill_formed),
                None => {
                    debug!(container = %key, "Deferred container does not resolve yet");
                    deferred_enclosing.insert(key.clone());
                }
            }
        }

        let mut well_formed = AnnotatedElements::new();
        let mut proven = IndexSet::new();
        let mut discovered = 0;
        let mut validated = 0;
        for annotation in registry.all() {
            discovered += round.discovered().get(annotation).count();
            let candidates: IndexSet<&E> = round.discovered().get(annotation).chain(previously_ill_formed.get(annotation)).collect();

            for element in candidates {
                let container = enclosing_container(element)?;
                let container_key = key_for(&container, context.config, &mut diagnostics)?;
                let ready = if proven.contains(&container_key) {
                    true
                } else if deferred_enclosing.contains(&container_key) {
                    false
                } else {
                    validated += 1;
                    context.validator.is_well_formed(&container)
                };

                if ready {
                    well_formed.insert(annotation.clone(), element.clone());
                    proven.insert(container_key);
                } else {
                    debug!(element = %element, container = %container_key, "Container is not well-formed, deferring");
                    deferred_enclosing.insert(container_key);
                }
            }
        }

        let mut deferred_by_step = Vec::with_capacity(context.steps.len());
        let mut steps = Vec::with_capacity(context.steps.len());
        for (index, step) in context.steps.iter_mut().enumerate() {
            let annotations = registry.for_step(index);
            let mut elements = AnnotatedElements::new();
            for key in &self.deferred_by_step[index] {
                match key.resolve(context.symbols) {
                    Some(element) => {
                        for annotation in annotations {
                            if element.is_annotated_with(annotation) {
                                elements.insert(annotation.clone(), element.clone());
                            }
                        }
                    }
                    None => debug!(step = step.name(), element = %key, "Deferred element does not resolve"),
                }
            }
            elements.extend(&well_formed.restricted_to(annotations));

            let mut summary = StepSummary {
                name: step.name().to_string(),
                received: elements.len(),
                ..StepSummary::default()
            };
            if elements.is_empty() {
                debug!(step = step.name(), "Nothing to process, skipping step");
                deferred_by_step.push(IndexSet::new());
            } else {
                let rejected = step.process(&elements);
                let mut keys = IndexSet::new();
                for element in rejected {
                    if !elements.contains_element(&element) {
                        warn!(step = step.name(), element = %element, "Step rejected an element it was not given");
                    }
                    keys.insert(key_for(&element, context.config, &mut diagnostics)?);
                }
                summary.invoked = true;
                summary.rejected = keys.len();
                deferred_by_step.push(keys);
            }
            steps.push(summary);
        }

        let summary = RoundSummary {
            round: number,
            terminal: false,
            discovered,
            well_formed: well_formed.len(),
            validated,
            deferred_containers: deferred_enclosing.len(),
            steps,
            outstanding: deferred_enclosing.len() + deferred_by_step.iter().map(IndexSet::len).sum::<usize>(),
            reported: diagnostics.len(),
        };
        let next = Self {
            deferred_enclosing,
            deferred_by_step,
            rounds: number,
            finished: false,
        };
        Ok((next, RoundOutcome { summary, diagnostics }))
    }
}

/// Key for `element`, warning about kinds that will not survive handle churn
fn key_for<E: Element>(element: &E, config: &ProcessorConfig, diagnostics: &mut Vec<Diagnostic<E>>) -> ProcessorResult<ElementKey<E>> {
    let key = ElementKey::for_element(element)?;
    if config.warn_unsupported_kinds {
        if let Some(kind) = key.unsupported_kind() {
            diagnostics.push(Diagnostic::warning(config.unsupported_message(kind.as_str()), None));
        }
    }
    Ok(key)
}
