// src/core/agent.rs — The run state machine

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::budget::BudgetTracker;
use super::control::{AgentHandle, Controls};
use super::state::AgentState;
use super::types::{AgentPhase, Artifact, RunConfiguration, StopReason};
use crate::engine::{DecisionEngine, ExecutionAdapter, OutcomeEvaluator};
use crate::provider::VisionProvider;
use crate::report::RunReport;

/// Drives decide → execute → evaluate → learn until the iteration cap,
/// the budget ceiling, or a stop request ends the run.
///
/// Exactly one loop runs per agent, and iterations are strictly
/// sequential: each decision depends on the artifact the previous
/// iteration produced. All run state is owned here and published as
/// read-only snapshots after every transition; control signals are
/// observed only at checkpoints, never mid-call.
pub struct DesignAgent {
    decider: DecisionEngine,
    executor: ExecutionAdapter,
    evaluator: OutcomeEvaluator,
    budget: BudgetTracker,
    config: RunConfiguration,
    state: AgentState,
    controls: Arc<Controls>,
    snapshots: watch::Sender<AgentState>,
}

/// What one iteration decided about the loop's future.
enum StepOutcome {
    /// Sleep this long, then iterate again.
    Continue(Duration),
    /// Wind the run down.
    Stop(StopReason),
}

impl DesignAgent {
    /// Create an idle agent and its control handle. The first snapshot
    /// (Idle) is published immediately.
    pub fn new(
        provider: Arc<dyn VisionProvider>,
        config: RunConfiguration,
        initial: Artifact,
    ) -> (Self, AgentHandle) {
        let state = AgentState::new(config.clone(), initial);
        let (tx, rx) = watch::channel(state.clone());
        let controls = Arc::new(Controls::default());
        let handle = AgentHandle::new(controls.clone(), rx);

        let agent = Self {
            decider: DecisionEngine::new(provider.clone()),
            executor: ExecutionAdapter::new(provider.clone()),
            evaluator: OutcomeEvaluator::new(provider),
            budget: BudgetTracker::new(config.budget_usd),
            config,
            state,
            controls,
            snapshots: tx,
        };
        (agent, handle)
    }

    /// Spawn the run on the current runtime.
    pub fn spawn(
        provider: Arc<dyn VisionProvider>,
        config: RunConfiguration,
        initial: Artifact,
    ) -> (tokio::task::JoinHandle<RunReport>, AgentHandle) {
        let (agent, handle) = Self::new(provider, config, initial);
        (tokio::spawn(agent.run()), handle)
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.clone());
    }

    /// Run to completion. Never returns an error: every failure mode is
    /// either recovered within its iteration or recorded as the stop
    /// reason in the final snapshot.
    pub async fn run(mut self) -> RunReport {
        self.state.phase = AgentPhase::Running;
        self.publish();
        tracing::info!(
            goal = %self.config.goal,
            max_iterations = self.config.max_iterations,
            budget_usd = self.config.budget_usd,
            simulate = self.config.simulate,
            "Run started"
        );

        let reason = self.drive().await;

        self.state.phase = AgentPhase::Stopped;
        self.state.stop_reason = Some(reason);
        self.publish();
        tracing::info!(
            %reason,
            iterations = self.state.iteration,
            spent_usd = self.budget.spent(),
            "Run stopped"
        );
        RunReport::from_state(&self.state)
    }

    /// The loop proper. Returns the terminal stop reason.
    async fn drive(&mut self) -> StopReason {
        loop {
            if self.controls.stop_requested() {
                return StopReason::UserStop;
            }

            if self.controls.pause_requested() {
                self.state.phase = AgentPhase::Paused;
                self.publish();
                tracing::info!("Paused");
                self.controls.wait_while_paused().await;
                // A stop can be what ended the pause
                if self.controls.stop_requested() {
                    return StopReason::UserStop;
                }
                self.state.phase = AgentPhase::Running;
                self.publish();
                tracing::info!("Resumed");
            }

            if self.state.iteration >= self.config.max_iterations {
                return StopReason::IterationCap;
            }

            self.state.iteration += 1;
            self.publish();

            match self.step().await {
                StepOutcome::Continue(delay) => {
                    self.publish();
                    self.controls.interruptible_sleep(delay).await;
                }
                StepOutcome::Stop(reason) => return reason,
            }
        }
    }

    /// One iteration: decide, re-check stop, reserve budget, execute,
    /// evaluate, learn. Every service failure is absorbed here — a
    /// decision failure became Wait, an evaluation failure became a
    /// neutral score, and an execution failure only costs this
    /// iteration its artifact advance.
    async fn step(&mut self) -> StepOutcome {
        let iteration = self.state.iteration;

        let decision = self
            .decider
            .next_decision(
                &self.config,
                &self.state.artifact,
                &self.state.decisions,
                &self.state.memory,
                iteration,
            )
            .await;
        tracing::info!(
            iteration,
            action = %decision.action,
            target = %decision.target,
            confidence = decision.confidence,
            "Decision"
        );
        self.state.decisions.push(decision.clone());

        // Last stop check before any cost is incurred: execution is the
        // one irreversible step and stays skippable until here.
        if self.controls.stop_requested() {
            return StepOutcome::Stop(StopReason::UserStop);
        }

        if decision.action.is_wait() {
            tracing::info!(iteration, "Waiting this iteration, backing off");
            return StepOutcome::Continue(self.config.wait_delay());
        }

        if !self.budget.try_reserve(decision.estimated_cost) {
            let entry = format!(
                "budget exhausted: {:.2} spent + {:.2} would exceed ceiling {:.2}",
                self.budget.spent(),
                decision.estimated_cost,
                self.budget.ceiling()
            );
            tracing::warn!(iteration, "{}", entry);
            self.state.errors.push(entry);
            return StepOutcome::Stop(StopReason::BudgetExhausted);
        }
        self.state.spent_usd = self.budget.spent();

        match self
            .executor
            .apply(&self.config, &self.state.artifact, &decision)
            .await
        {
            Ok(artifact) => {
                self.state.artifact = artifact.clone();
                let evaluation = self
                    .evaluator
                    .assess(&self.config, &artifact, &decision)
                    .await;
                tracing::info!(
                    iteration,
                    quality = evaluation.quality_score,
                    style = evaluation.style_score,
                    success = evaluation.success,
                    "Evaluated"
                );
                self.state.memory.update(&evaluation);
                self.state.evaluations.push(evaluation);
                self.state.recompute_progress();
            }
            Err(e) => {
                tracing::warn!(iteration, retriable = e.is_retriable(), "Execution failed: {}", e);
                self.state
                    .errors
                    .push(format!("iteration {}: execution failed: {}", iteration, e));
            }
        }

        StepOutcome::Continue(self.config.iteration_delay())
    }
}
