//! The agent control loop.
//!
//! One run: append the human input, optionally clarify it with a single
//! best-effort backend call, then iterate — assemble the turn prompt,
//! generate, parse the requested action, dispatch it, fold the result back
//! into the log — until the model selects the terminal action, output stops
//! parsing, or the iteration bound is hit. Whatever ends the run, the best
//! available answer so far is appended as the final AI entry and returned.

use std::sync::Arc;

use promptweave_core::{CapabilityRegistry, ConversationLog, Error, GenerationBackend, Result};
use promptweave_prompt::{LengthOracle, PromptAssembler};
use tracing::{debug, info, warn};

use crate::parser::parse_response;
use crate::tree::{build_turn_tree, clarify_prompt};

/// The reserved action name that ends a run. Matched case-insensitively.
pub const TERMINAL_ACTION: &str = "Finish";

const DEFAULT_BUDGET: usize = 4000;
const DEFAULT_MAX_ITERATIONS: u32 = 25;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalState {
    /// The model selected the terminal action.
    Terminal,
    /// The model's output could not be parsed.
    Aborted,
    /// The iteration safety bound was reached.
    IterationLimit,
}

/// The result of one run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The best available answer: the most recent non-empty action input or
    /// capability result.
    pub answer: String,
    pub state: FinalState,
    /// Iterations performed.
    pub iterations: u32,
}

/// The control loop. Owns handles to the backend and registry; the
/// conversation log is passed per run so callers can keep a session going
/// across runs.
pub struct ControlLoop {
    backend: Arc<dyn GenerationBackend>,
    registry: Arc<CapabilityRegistry>,
    assembler: PromptAssembler,
    budget: usize,
    max_iterations: u32,
    clarify_intent: bool,
}

impl ControlLoop {
    pub fn new(backend: Arc<dyn GenerationBackend>, registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            backend,
            registry,
            assembler: PromptAssembler::with_shared_oracle(),
            budget: DEFAULT_BUDGET,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            clarify_intent: true,
        }
    }

    /// Set the prompt assembly budget.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Set the iteration safety bound.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Enable or disable the intent-clarification preprocessing call.
    pub fn with_clarify_intent(mut self, clarify: bool) -> Self {
        self.clarify_intent = clarify;
        self
    }

    /// Use a custom length oracle instead of the shared one.
    pub fn with_oracle(mut self, oracle: Arc<dyn LengthOracle>) -> Self {
        self.assembler = PromptAssembler::new(oracle);
        self
    }

    /// Run the loop for one user request, folding into `log`.
    pub async fn run(&self, log: &mut ConversationLog, input: &str) -> Result<RunOutcome> {
        info!(backend = self.backend.name(), "starting run");
        log.push_human(input);

        // Computed once; every iteration sees the same working input.
        let working_input = if self.clarify_intent {
            self.clarify(input).await
        } else {
            input.to_string()
        };

        let mut best_answer = String::new();
        let mut iterations = 0u32;
        let state = loop {
            if iterations >= self.max_iterations {
                warn!(iterations, "iteration bound reached, finalizing");
                break FinalState::IterationLimit;
            }
            iterations += 1;

            let tree = build_turn_tree(log.render(), self.registry.describe_all());
            let assembled = self
                .assembler
                .assemble(&tree, &working_input, self.budget)
                .map_err(|e| Error::Assembly {
                    message: e.to_string(),
                })?;
            debug!(
                iteration = iterations,
                cost = assembled.stats.cost,
                dropped = assembled.stats.nodes_dropped,
                "prompt assembled"
            );

            let output = self.backend.generate(&assembled.text).await?;

            let action = match parse_response(&output) {
                Ok(action) => action,
                Err(e) => {
                    warn!(error = %e, "model output did not parse, aborting run");
                    log.push_action_result(None, "Error parsing model output.");
                    break FinalState::Aborted;
                }
            };
            debug!(
                action = %action.name,
                reasoning = %action.reasoning,
                "action parsed"
            );

            if !action.input.is_empty() {
                best_answer = action.input.clone();
            }

            match self.registry.resolve_or_fallback(&action.name) {
                Some((capability, via_fallback)) => {
                    if via_fallback {
                        warn!(
                            requested = %action.name,
                            dispatched = capability.name(),
                            "unknown action, dispatching to fallback"
                        );
                    }
                    let result = capability.invoke(&action.input).await;
                    if !result.is_empty() {
                        best_answer = result.clone();
                        // Logged under the name the model asked for, so the
                        // next prompt reflects the model's own framing.
                        log.push_action_result(Some(action.name.as_str()), result);
                    }
                }
                None => {
                    warn!(requested = %action.name, "unknown action and no fallback designated");
                    log.push_action_result(
                        Some(action.name.as_str()),
                        format!("No function named '{}' is available.", action.name),
                    );
                }
            }

            if action.name.eq_ignore_ascii_case(TERMINAL_ACTION) {
                break FinalState::Terminal;
            }
        };

        log.push_ai(&best_answer);
        info!(?state, iterations, "run complete");
        Ok(RunOutcome {
            answer: best_answer,
            state,
            iterations,
        })
    }

    /// One best-effort rewrite of the user input. Any failure or empty
    /// response falls back to the raw input.
    async fn clarify(&self, input: &str) -> String {
        match self.backend.generate(&clarify_prompt(input)).await {
            Ok(clarified) if !clarified.trim().is_empty() => clarified,
            Ok(_) => {
                warn!("clarification returned empty text, using raw input");
                input.to_string()
            }
            Err(e) => {
                warn!(error = %e, "clarification failed, using raw input");
                input.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use promptweave_backends::ScriptedBackend;
    use promptweave_capabilities::{FinishCapability, default_registry};
    use promptweave_core::{Capability, EntryKind};
    use std::sync::Mutex;

    fn loop_with(backend: ScriptedBackend, registry: CapabilityRegistry) -> ControlLoop {
        ControlLoop::new(Arc::new(backend), Arc::new(registry)).with_clarify_intent(false)
    }

    /// Records every invocation so tests can assert on dispatch.
    struct RecordingCapability {
        name: &'static str,
        result: &'static str,
        invocations: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Capability for RecordingCapability {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "records invocations"
        }
        fn input_shape(&self) -> &str {
            "<any>"
        }
        async fn invoke(&self, input: &str) -> String {
            self.invocations.lock().unwrap().push(input.to_string());
            self.result.to_string()
        }
    }

    #[tokio::test]
    async fn finish_terminates_with_its_input_as_answer() {
        let backend = ScriptedBackend::single_text("Function: Finish\nInput: all done\n");
        let agent = loop_with(backend, default_registry());
        let mut log = ConversationLog::new();

        let outcome = agent.run(&mut log, "do something").await.unwrap();
        assert_eq!(outcome.answer, "all done");
        assert_eq!(outcome.state, FinalState::Terminal);
        assert_eq!(outcome.iterations, 1);

        // Finish produces no action result, so the log holds exactly the
        // human input and the final AI answer.
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].kind, EntryKind::HumanInput);
        assert_eq!(log.entries()[1].kind, EntryKind::AiOutput);
        assert_eq!(log.entries()[1].content, "all done");
    }

    #[tokio::test]
    async fn terminal_action_matches_case_insensitively() {
        let backend = ScriptedBackend::single_text("Function: FINISH\nInput: done\n");
        let agent = loop_with(backend, default_registry());
        let mut log = ConversationLog::new();

        let outcome = agent.run(&mut log, "task").await.unwrap();
        assert_eq!(outcome.state, FinalState::Terminal);
    }

    #[tokio::test]
    async fn capability_result_feeds_next_iteration() {
        let invocations = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CapabilityRegistry::new();
        registry.register(Box::new(RecordingCapability {
            name: "Lookup",
            result: "42 degrees",
            invocations: invocations.clone(),
        }));
        registry.register(Box::new(FinishCapability));

        let backend = ScriptedBackend::from_texts(&[
            "Function: Lookup\nInput: temperature\n",
            "Function: Finish\nInput: It is 42 degrees.\n",
        ]);
        let agent = loop_with(backend, registry);
        let mut log = ConversationLog::new();

        let outcome = agent.run(&mut log, "how hot is it?").await.unwrap();
        assert_eq!(outcome.answer, "It is 42 degrees.");
        assert_eq!(outcome.iterations, 2);
        assert_eq!(*invocations.lock().unwrap(), vec!["temperature"]);

        // The action result entry is tagged and visible to the second prompt.
        assert_eq!(log.entries()[1].kind, EntryKind::ActionResult);
        assert_eq!(log.entries()[1].action_name.as_deref(), Some("Lookup"));
        assert_eq!(log.entries()[1].content, "42 degrees");
    }

    #[tokio::test]
    async fn unknown_action_dispatches_to_fallback_under_requested_name() {
        let invocations = Arc::new(Mutex::new(Vec::new()));
        let mut registry = CapabilityRegistry::new();
        registry.register(Box::new(RecordingCapability {
            name: "Search",
            result: "some results",
            invocations: invocations.clone(),
        }));
        registry.register(Box::new(FinishCapability));
        let registry = registry.with_fallback("Search");

        let backend = ScriptedBackend::from_texts(&[
            "Function: Telepathy\nInput: read my mind\n",
            "Function: Finish\nInput: done\n",
        ]);
        let agent = loop_with(backend, registry);
        let mut log = ConversationLog::new();

        let outcome = agent.run(&mut log, "q").await.unwrap();
        assert_eq!(outcome.state, FinalState::Terminal);
        assert_eq!(*invocations.lock().unwrap(), vec!["read my mind"]);
        // Logged under the name the model requested, not the fallback's.
        assert_eq!(log.entries()[1].action_name.as_deref(), Some("Telepathy"));
    }

    #[tokio::test]
    async fn unknown_action_without_fallback_continues() {
        let mut registry = CapabilityRegistry::new();
        registry.register(Box::new(FinishCapability));

        let backend = ScriptedBackend::from_texts(&[
            "Function: Telepathy\nInput: hm\n",
            "Function: Finish\nInput: gave up\n",
        ]);
        let agent = loop_with(backend, registry);
        let mut log = ConversationLog::new();

        let outcome = agent.run(&mut log, "q").await.unwrap();
        assert_eq!(outcome.state, FinalState::Terminal);
        assert!(log.entries()[1]
            .content
            .contains("No function named 'Telepathy'"));
    }

    #[tokio::test]
    async fn unparseable_output_aborts_with_best_answer() {
        let backend = ScriptedBackend::single_text("I refuse to follow the format.");
        let agent = loop_with(backend, default_registry());
        let mut log = ConversationLog::new();

        let outcome = agent.run(&mut log, "q").await.unwrap();
        assert_eq!(outcome.state, FinalState::Aborted);
        assert_eq!(outcome.answer, "");

        assert_eq!(log.entries()[1].content, "Error parsing model output.");
        assert_eq!(log.entries()[1].action_name, None);
        assert_eq!(log.entries()[2].kind, EntryKind::AiOutput);
    }

    #[tokio::test]
    async fn iteration_bound_ends_run_with_best_so_far() {
        let backend = ScriptedBackend::from_texts(&[
            "Function: Search\nInput: first query\n",
            "Function: Search\nInput: second query\n",
            "Function: Search\nInput: third query\n",
        ]);
        let agent = loop_with(backend, default_registry()).with_max_iterations(3);
        let mut log = ConversationLog::new();

        let outcome = agent.run(&mut log, "loop forever").await.unwrap();
        assert_eq!(outcome.state, FinalState::IterationLimit);
        assert_eq!(outcome.iterations, 3);
        assert!(!outcome.answer.is_empty());
    }

    #[tokio::test]
    async fn clarification_failure_falls_back_to_raw_input() {
        use promptweave_core::BackendError;
        let backend = ScriptedBackend::new(vec![
            Err(BackendError::Network("connection refused".into())),
            Ok("Function: Finish\nInput: answered\n".to_string()),
        ]);
        let agent = ControlLoop::new(Arc::new(backend), Arc::new(default_registry()))
            .with_clarify_intent(true);
        let mut log = ConversationLog::new();

        let outcome = agent.run(&mut log, "raw question").await.unwrap();
        assert_eq!(outcome.state, FinalState::Terminal);
        assert_eq!(outcome.answer, "answered");
    }

    #[tokio::test]
    async fn clarified_input_is_used_in_prompts() {
        let backend = Arc::new(ScriptedBackend::from_texts(&[
            "a precise reformulation",
            "Function: Finish\nInput: ok\n",
        ]));
        let agent = ControlLoop::new(backend.clone(), Arc::new(default_registry()))
            .with_clarify_intent(true);
        let mut log = ConversationLog::new();

        agent.run(&mut log, "vague ask").await.unwrap();
        let prompts = backend.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("vague ask"));
        assert!(prompts[1].contains("a precise reformulation"));
        assert!(!prompts[1].contains("</s><|user|>vague ask"));
    }

    #[tokio::test]
    async fn backend_failure_mid_run_is_propagated() {
        use promptweave_core::BackendError;
        let backend = ScriptedBackend::new(vec![Err(BackendError::Timeout("slow".into()))]);
        let agent = loop_with(backend, default_registry());
        let mut log = ConversationLog::new();

        let err = agent.run(&mut log, "q").await.unwrap_err();
        assert!(matches!(err, Error::Backend(BackendError::Timeout(_))));
    }

    #[tokio::test]
    async fn prompt_contains_catalog_and_history() {
        let backend = Arc::new(ScriptedBackend::from_texts(&[
            "Function: CurrentTime\nInput: N/A\n",
            "Function: Finish\nInput: done\n",
        ]));
        let agent = ControlLoop::new(backend.clone(), Arc::new(default_registry()))
            .with_clarify_intent(false);
        let mut log = ConversationLog::new();

        agent.run(&mut log, "what time is it?").await.unwrap();
        let prompts = backend.prompts();
        assert!(prompts[0].contains("Available functions:"));
        assert!(prompts[0].contains("Human: what time is it?"));
        // Second iteration sees the clock result in the conversation.
        assert!(prompts[1].contains("System: [CurrentTime] Current time is "));
    }
}
