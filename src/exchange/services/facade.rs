//! Chat facade: classify, then serve on the fast or coordinated path.

use crate::coordination::domain::{AggregatedAnswer, SessionOutcome};
use crate::coordination::services::CoordinationOrchestrator;
use crate::directory::ports::AgentDirectory;
use crate::exchange::domain::{
    ChatReply, ExchangeError, ExchangeHealth, ExchangeResult, GateState, StartupGate,
};
use crate::routing::domain::{ExecutionPlan, PathKind, Query};
use crate::routing::services::{CapabilityRouter, QueryClassifier};
use mockable::Clock;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

const BEST_EFFORT_NOTE: &str =
    "Note: the main service did not answer in time, so this answer may be incomplete.";

/// Entry point for chat requests.
pub struct ExchangeCore<C>
where
    C: Clock + Send + Sync,
{
    directory: Arc<dyn AgentDirectory>,
    classifier: QueryClassifier,
    router: CapabilityRouter,
    orchestrator: CoordinationOrchestrator<C>,
    gate: Arc<StartupGate>,
}

impl<C> Clone for ExchangeCore<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            classifier: self.classifier.clone(),
            router: self.router.clone(),
            orchestrator: self.orchestrator.clone(),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<C> ExchangeCore<C>
where
    C: Clock + Send + Sync,
{
    /// Wires the exchange with an unvalidated gate.
    #[must_use]
    pub fn new(
        directory: Arc<dyn AgentDirectory>,
        classifier: QueryClassifier,
        router: CapabilityRouter,
        orchestrator: CoordinationOrchestrator<C>,
    ) -> Self {
        Self {
            directory,
            classifier,
            router,
            orchestrator,
            gate: Arc::new(StartupGate::new()),
        }
    }

    /// Runs the one-time directory check. Repeated calls return the first
    /// result without checking again.
    pub async fn initialize(&self) -> GateState {
        if self.gate.state() != GateState::Unvalidated {
            return self.gate.state();
        }
        let healthy = self.directory_reachable().await;
        let state = self.gate.record(healthy);
        if state == GateState::Open {
            tracing::info!("directory validated, coordinated path enabled");
        } else {
            tracing::error!("directory validation failed, coordinated path disabled");
        }
        state
    }

    /// Checks the directory again on request of an external supervisor.
    pub async fn revalidate(&self) -> GateState {
        if self.gate.state() == GateState::Open {
            return GateState::Open;
        }
        let healthy = self.directory_reachable().await;
        let state = self.gate.reopen(healthy);
        tracing::info!(%state, "coordination gate revalidated");
        state
    }

    /// Returns the gate state.
    #[must_use]
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// Reports current health without touching the gate.
    pub async fn health(&self) -> ExchangeHealth {
        ExchangeHealth {
            directory_reachable: self.directory_reachable().await,
            coordination_gate: self.gate.state(),
            classifier_provider: self.classifier.provider_name(),
        }
    }

    /// Answers one chat request.
    ///
    /// # Errors
    ///
    /// Fast-path agent failures are returned as their [`ExchangeError`]
    /// category. Coordinated requests fail with
    /// [`ExchangeError::ConfigurationError`] while the gate is not open,
    /// [`ExchangeError::Timeout`] when nothing answered before the deadline
    /// and with the session's causes when nothing usable arrived.
    pub async fn chat(&self, text: &str) -> ExchangeResult<ChatReply> {
        let trace_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("chat", trace_id = %trace_id);
        self.serve(text, trace_id.clone()).instrument(span).await
    }

    async fn serve(&self, text: &str, trace_id: String) -> ExchangeResult<ChatReply> {
        let started = Instant::now();
        let classification = self.classifier.classify(text).await;
        let query = Query::classified(text, &classification);
        tracing::info!(
            path = %classification.plan.kind(),
            intent = %query.intent,
            complexity = query.complexity,
            source = ?classification.source,
            confidence = classification.confidence,
            "query classified"
        );

        let plan = &classification.plan;
        let answer_text = match plan.kind() {
            PathKind::Fast => self.fast(plan, text, &trace_id).await?,
            PathKind::Coordinated => self.coordinated(plan, text, &trace_id).await?,
        };
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(latency_ms, "chat answered");

        Ok(ChatReply {
            answer_text,
            path_used: plan.kind(),
            latency_ms,
            trace_id,
        })
    }

    async fn fast(&self, plan: &ExecutionPlan, text: &str, trace_id: &str) -> ExchangeResult<String> {
        let routed = self.router.dispatch(plan.primary(), text, trace_id).await?;
        routed.reply.text().map(str::to_owned).ok_or_else(|| {
            ExchangeError::Malformed(format!("agent {} answered without text", routed.agent))
        })
    }

    async fn coordinated(
        &self,
        plan: &ExecutionPlan,
        text: &str,
        trace_id: &str,
    ) -> ExchangeResult<String> {
        if !self.gate.allows_coordination() {
            return Err(ExchangeError::ConfigurationError(format!(
                "coordinated path is disabled (directory validation {})",
                self.gate.state()
            )));
        }

        let session = self.orchestrator.coordinate(plan, text, trace_id).await?;
        match session.outcome() {
            Some(SessionOutcome::Completed(answer)) => compose_answer(answer).ok_or_else(|| {
                ExchangeError::Malformed("agents answered without text".to_owned())
            }),
            Some(SessionOutcome::TimedOut { pending, .. }) => Err(ExchangeError::Timeout(format!(
                "{} agent(s) did not answer within {:?}",
                pending.len(),
                self.orchestrator.deadline()
            ))),
            Some(SessionOutcome::Failed { causes }) => Err(ExchangeError::from_causes(causes)),
            None => Err(ExchangeError::Failed {
                causes: vec![format!("session {} ended without an outcome", session.id())],
            }),
        }
    }

    async fn directory_reachable(&self) -> bool {
        match self.directory.health().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "directory health check failed");
                false
            }
        }
    }
}

/// Joins the primary answer and the secondary answers (in agent-id order).
///
/// Best-effort answers carry a note saying so. Returns `None` when no
/// answer has text.
#[must_use]
pub fn compose_answer(answer: &AggregatedAnswer) -> Option<String> {
    let mut parts: Vec<&str> = answer
        .primary
        .iter()
        .chain(&answer.secondaries)
        .filter_map(|part| part.reply.text())
        .filter(|text| !text.trim().is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }
    if answer.is_best_effort() {
        parts.push(BEST_EFFORT_NOTE);
    }
    Some(parts.join("\n\n"))
}
