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

//! The round-driven processor
//!
//! [`RoundProcessor`] owns the steps and the [`ProcessorState`] carried
//! between rounds. Each call to [`RoundProcessor::process`] runs one round
//! through [`ProcessorState::advance`], emits the round's diagnostics into
//! the host's sink and fires the post-round hook.

pub mod report;
mod state;

pub use state::{ProcessorState, RoundContext, RoundOutcome};

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ProcessorConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::element::{Element, SymbolTable};
use crate::error::ProcessorResult;
use crate::registry::AnnotationRegistry;
use crate::round::Round;
use crate::step::Step;
use crate::validation::Validator;

/// Host services available while processing a round
pub struct ProcessingEnv<'a, E: Element> {
    pub symbols: &'a dyn SymbolTable<E>,
    pub validator: &'a dyn Validator<E>,
    pub diagnostics: &'a mut dyn Diagnostics<E>,
}

impl<'a, E: Element> ProcessingEnv<'a, E> {
    pub fn new(symbols: &'a dyn SymbolTable<E>, validator: &'a dyn Validator<E>, diagnostics: &'a mut dyn Diagnostics<E>) -> Self {
        Self { symbols, validator, diagnostics }
    }
}

/// What the post-round hook is told about the round that just ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundInfo {
    pub round: usize,
    pub processing_over: bool,
    pub error_raised: bool,
}

/// Counters describing one round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    /// 1-based round number
    pub round: usize,
    pub terminal: bool,
    /// Elements the host discovered for supported annotations
    pub discovered: usize,
    /// Annotation/element pairs whose container was well-formed
    pub well_formed: usize,
    /// Validator calls made this round
    pub validated: usize,
    pub deferred_containers: usize,
    pub steps: Vec<StepSummary>,
    /// Keys carried into the next round, or reported on the final round
    pub outstanding: usize,
    /// Diagnostics produced by the round
    pub reported: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub name: String,
    pub invoked: bool,
    pub received: usize,
    pub rejected: usize,
}

type PostRoundHook = Box<dyn FnMut(&RoundInfo)>;

/// Drives registered steps across the rounds of one compilation
pub struct RoundProcessor<E: Element> {
    config: ProcessorConfig,
    steps: Vec<Box<dyn Step<E>>>,
    registry: AnnotationRegistry,
    state: ProcessorState<E>,
    post_round: Option<PostRoundHook>,
}

impl<E: Element> RoundProcessor<E> {
    /// Create a processor; the step list is fixed from here on
    pub fn new(config: ProcessorConfig, steps: Vec<Box<dyn Step<E>>>) -> ProcessorResult<Self> {
        config.validate()?;
        let registry = AnnotationRegistry::from_steps(&steps);
        debug!(
            processor = %config.qualified_name,
            steps = steps.len(),
            annotations = registry.all().len(),
            "Created round processor"
        );
        Ok(Self {
            state: ProcessorState::new(steps.len()),
            config,
            steps,
            registry,
            post_round: None,
        })
    }

    /// Run `hook` after every round, the final one included
    pub fn with_post_round_hook(mut self, hook: impl FnMut(&RoundInfo) + 'static) -> Self {
        self.post_round = Some(Box::new(hook));
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Union of every step's annotations, in registration order
    pub fn supported_annotations(&self) -> &IndexSet<String> {
        self.registry.all()
    }

    pub fn registry(&self) -> &AnnotationRegistry {
        &self.registry
    }

    pub fn state(&self) -> &ProcessorState<E> {
        &self.state
    }

    /// Process one round
    ///
    /// On error the carried state is left as it was before the call.
    pub fn process(&mut self, round: &Round<E>, env: &mut ProcessingEnv<'_, E>) -> ProcessorResult<RoundSummary> {
        let context = RoundContext {
            steps: &mut self.steps,
            registry: &self.registry,
            config: &self.config,
            symbols: env.symbols,
            validator: env.validator,
        };
        let (state, outcome) = self.state.advance(round, context)?;
        self.state = state;

        let info = RoundInfo {
            round: outcome.summary.round,
            processing_over: round.processing_over(),
            error_raised: round.error_raised(),
        };
        if round.processing_over() {
            self.run_post_round_hook(&info);
            emit(&outcome.diagnostics, &mut *env.diagnostics);
        } else {
            emit(&outcome.diagnostics, &mut *env.diagnostics);
            self.run_post_round_hook(&info);
        }

        let summary = outcome.summary;
        info!(
            round = summary.round,
            terminal = summary.terminal,
            well_formed = summary.well_formed,
            deferred_containers = summary.deferred_containers,
            outstanding = summary.outstanding,
            reported = summary.reported,
            "Round processed"
        );
        Ok(summary)
    }

    fn run_post_round_hook(&mut self, info: &RoundInfo) {
        if let Some(hook) = self.post_round.as_mut() {
            hook(info);
        }
    }
}

fn emit<E: Element>(diagnostics: &[Diagnostic<E>], sink: &mut dyn Diagnostics<E>) {
    for diagnostic in diagnostics {
        diagnostic.emit(sink);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::diagnostics::DiagnosticLog;
    use crate::memory::{MemoryElement, ProgramModel};
    use crate::step::{AnnotatedElements, FnStep};
    use crate::validation::{AcceptAll, MockValidator};

    const ANNOTATION: &str = "gen.Generate";

    fn recording_step(seen: Rc<RefCell<Vec<usize>>>) -> Box<dyn Step<MemoryElement>> {
        Box::new(FnStep::new("record", [ANNOTATION], move |elements: &AnnotatedElements<MemoryElement>| -> Vec<MemoryElement> {
            seen.borrow_mut().push(elements.len());
            Vec::new()
        }))
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ProcessorConfig::new("", "x::Y");
        assert!(RoundProcessor::<MemoryElement>::new(config, Vec::new()).is_err());
    }

    #[test]
    fn test_container_validated_once_per_round() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let class = model.add_class(pkg, "A");
        let first = model.add_method(class, "a", "a()");
        let second = model.add_method(class, "b", "b()");
        model.annotate(first, ANNOTATION).annotate(second, ANNOTATION);
        let snapshot = model.snapshot();

        let mut validator = MockValidator::<MemoryElement>::new();
        validator.expect_is_well_formed().times(1).return_const(true);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut processor = RoundProcessor::new(ProcessorConfig::default(), vec![recording_step(seen.clone())]).unwrap();
        let mut log: DiagnosticLog<MemoryElement> = DiagnosticLog::new();
        let mut env = ProcessingEnv::<MemoryElement>::new(&snapshot, &validator, &mut log);

        let summary = processor.process(&Round::new(snapshot.discover([ANNOTATION])), &mut env).unwrap();

        assert_eq!(summary.validated, 1);
        assert_eq!(summary.well_formed, 2);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_rejected_container_validated_once_per_round() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let class = model.add_class(pkg, "A");
        let first = model.add_method(class, "a", "a()");
        let second = model.add_field(class, "b");
        model.annotate(first, ANNOTATION).annotate(second, ANNOTATION);
        let snapshot = model.snapshot();

        let mut validator = MockValidator::<MemoryElement>::new();
        validator.expect_is_well_formed().times(1).return_const(false);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut processor = RoundProcessor::new(ProcessorConfig::default(), vec![recording_step(seen.clone())]).unwrap();
        let mut log: DiagnosticLog<MemoryElement> = DiagnosticLog::new();
        let mut env = ProcessingEnv::<MemoryElement>::new(&snapshot, &validator, &mut log);

        let summary = processor.process(&Round::new(snapshot.discover([ANNOTATION])), &mut env).unwrap();

        assert_eq!(summary.validated, 1);
        assert_eq!(summary.well_formed, 0);
        assert_eq!(summary.deferred_containers, 1);
        assert!(!summary.steps[0].invoked);
        assert!(seen.borrow().is_empty());
        assert_eq!(processor.state().deferred_containers().len(), 1);
    }

    #[test]
    fn test_hook_order_relative_to_diagnostics() {
        let mut model = ProgramModel::new();
        let pkg = model.add_package("p");
        let class = model.add_class(pkg, "A");
        model.annotate(class, ANNOTATION);
        let snapshot = model.snapshot();

        let events = Rc::new(RefCell::new(Vec::new()));
        let hook_events = events.clone();
        let rejecting = FnStep::new("reject", [ANNOTATION], |elements: &AnnotatedElements<MemoryElement>| -> Vec<MemoryElement> {
            elements.get(ANNOTATION).cloned().collect()
        });
        let mut processor = RoundProcessor::new(ProcessorConfig::default(), vec![Box::new(rejecting) as Box<dyn Step<MemoryElement>>])
            .unwrap()
            .with_post_round_hook(move |info| hook_events.borrow_mut().push(info.round));

        let mut log: DiagnosticLog<MemoryElement> = DiagnosticLog::new();
        {
            let mut env = ProcessingEnv::<MemoryElement>::new(&snapshot, &AcceptAll, &mut log);
            processor.process(&Round::new(snapshot.discover([ANNOTATION])), &mut env).unwrap();
        }
        assert_eq!(*events.borrow(), vec![1]);
        assert!(log.is_empty());

        {
            let mut env = ProcessingEnv::<MemoryElement>::new(&snapshot, &AcceptAll, &mut log);
            let summary = processor.process(&Round::last(), &mut env).unwrap();
            assert!(summary.terminal);
            assert_eq!(summary.reported, 1);
        }
        assert_eq!(*events.borrow(), vec![1, 2]);
        assert_eq!(log.errors().count(), 1);
        assert!(processor.state().is_finished());
    }

    #[test]
    fn test_failed_round_keeps_state() {
        let mut processor = RoundProcessor::<MemoryElement>::new(ProcessorConfig::default(), Vec::new()).unwrap();
        let mut model = ProgramModel::new();
        let snapshot = model.snapshot();
        let mut log: DiagnosticLog<MemoryElement> = DiagnosticLog::new();
        let mut env = ProcessingEnv::<MemoryElement>::new(&snapshot, &AcceptAll, &mut log);

        processor.process(&Round::last(), &mut env).unwrap();
        let before = processor.state().clone();
        assert!(processor.process(&Round::last(), &mut env).is_err());
        assert_eq!(processor.state(), &before);
    }
}
