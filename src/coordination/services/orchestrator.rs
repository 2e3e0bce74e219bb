//! Drives one coordination session from directory lookup to its outcome.

use crate::coordination::domain::{
    CoordinationSession, FailureCause, FailureKind, SessionDomainError,
};
use crate::directory::domain::AgentId;
use crate::routing::domain::ExecutionPlan;
use crate::routing::services::{AgentDiscovery, DiscoveryError};
use crate::transport::domain::{AgentCall, AgentReply};
use crate::transport::ports::{TransportChannel, TransportError};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Session deadline used when none is configured.
pub const DEFAULT_SESSION_DEADLINE: Duration = Duration::from_secs(8);

/// Errors raised by the orchestrator itself, as opposed to session
/// outcomes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoordinationError {
    /// The session aggregate rejected a step.
    #[error(transparent)]
    Session(#[from] SessionDomainError),
}

/// Result type for orchestrator operations.
pub type CoordinationResult<T> = Result<T, CoordinationError>;

type DispatchResult = (AgentId, Result<AgentReply, TransportError>);

/// Fans a coordinated plan out to one agent per capability and aggregates
/// whatever arrives before the deadline.
pub struct CoordinationOrchestrator<C>
where
    C: Clock + Send + Sync,
{
    discovery: AgentDiscovery,
    channel: Arc<dyn TransportChannel>,
    clock: Arc<C>,
    deadline: Duration,
}

impl<C> Clone for CoordinationOrchestrator<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            discovery: self.discovery.clone(),
            channel: Arc::clone(&self.channel),
            clock: Arc::clone(&self.clock),
            deadline: self.deadline,
        }
    }
}

impl<C> CoordinationOrchestrator<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator whose sessions end after `deadline`.
    #[must_use]
    pub fn new(
        discovery: AgentDiscovery,
        channel: Arc<dyn TransportChannel>,
        clock: Arc<C>,
        deadline: Duration,
    ) -> Self {
        Self {
            discovery,
            channel,
            clock,
            deadline,
        }
    }

    /// Returns the per-session deadline.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Runs a fresh session for `plan` and returns it in its terminal
    /// state.
    ///
    /// Failures of individual agents are part of the session outcome, not
    /// errors of this call.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinationError::Session`] if the session aggregate
    /// rejects a lifecycle step.
    pub async fn coordinate(
        &self,
        plan: &ExecutionPlan,
        query: &str,
        trace_id: &str,
    ) -> CoordinationResult<CoordinationSession> {
        let mut session =
            CoordinationSession::new(plan.capabilities().cloned(), self.deadline, &*self.clock);
        let span = tracing::info_span!(
            "coordination_session",
            session_id = %session.id(),
            trace_id,
            primary = %plan.primary(),
        );
        self.run(&mut session, plan, query, trace_id)
            .instrument(span)
            .await?;
        Ok(session)
    }

    async fn run(
        &self,
        session: &mut CoordinationSession,
        plan: &ExecutionPlan,
        query: &str,
        trace_id: &str,
    ) -> CoordinationResult<()> {
        let clock = &*self.clock;
        let deadline = Instant::now() + self.deadline;

        session.begin_lookup(clock)?;
        let selected = match timeout_at(deadline, self.discovery.select(plan.capabilities())).await
        {
            Ok(Ok(selected)) => selected,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "no agent could be selected");
                session.fail(vec![discovery_cause(&err)], clock)?;
                return Ok(());
            }
            Err(_) => {
                tracing::warn!("directory lookup exceeded the session deadline");
                session.fail(
                    vec![FailureCause::general(
                        FailureKind::Timeout,
                        "directory lookup exceeded the session deadline",
                    )],
                    clock,
                )?;
                return Ok(());
            }
        };

        let unserved = selected.unserved.iter().map(discovery_cause).collect();
        session.dispatch_to(
            selected
                .assignments
                .iter()
                .map(|assignment| (assignment.agent.id().clone(), assignment.capabilities.clone())),
            selected.primary.clone(),
            unserved,
            clock,
        )?;

        let cancel = CancellationToken::new();
        let (results, mut inbox) = mpsc::channel::<DispatchResult>(selected.assignments.len().max(1));
        for assignment in &selected.assignments {
            let Some(capability) = assignment.capabilities.first() else {
                continue;
            };
            let call = AgentCall::message(capability.clone(), query)
                .serving_all(&assignment.capabilities)
                .with_trace_id(trace_id);
            let agent = assignment.agent.id().clone();
            let endpoint = assignment.agent.endpoint().clone();
            let channel = Arc::clone(&self.channel);
            let token = cancel.child_token();
            let sender = results.clone();
            let budget = deadline.saturating_duration_since(Instant::now());
            tracing::debug!(%agent, %endpoint, "dispatching");

            tokio::spawn(
                async move {
                    tokio::select! {
                        () = token.cancelled() => {
                            tracing::debug!(%agent, "dispatch cancelled at deadline");
                        }
                        result = channel.invoke(&endpoint, &call, budget) => {
                            if sender.send((agent, result)).await.is_err() {
                                tracing::debug!("late response discarded");
                            }
                        }
                    }
                }
                .in_current_span(),
            );
        }
        drop(results);
        session.await_responses(clock)?;

        while !session.all_resolved() {
            match timeout_at(deadline, inbox.recv()).await {
                Ok(Some((agent, Ok(reply)))) => {
                    tracing::debug!(%agent, "response received");
                    session.record_response(&agent, reply)?;
                }
                Ok(Some((agent, Err(err)))) => {
                    tracing::warn!(%agent, error = %err, "agent call failed");
                    let cause = transport_cause(agent.clone(), &err);
                    session.record_failure(&agent, cause)?;
                }
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!("session deadline reached with pending agents");
                    break;
                }
            }
        }
        cancel.cancel();

        session.aggregate(clock)?;
        tracing::info!(state = %session.state(), "session finished");
        Ok(())
    }
}

impl From<&TransportError> for FailureKind {
    fn from(err: &TransportError) -> Self {
        match err {
            TransportError::NotAvailable { .. } => Self::NotAvailable,
            TransportError::Timeout { .. } => Self::Timeout,
            TransportError::Malformed { .. } => Self::Malformed,
            TransportError::AgentRejected { .. } => Self::AgentRejected,
        }
    }
}

impl From<&DiscoveryError> for FailureKind {
    fn from(err: &DiscoveryError) -> Self {
        match err {
            DiscoveryError::NoActiveAgent { .. } => Self::ConfigurationError,
            DiscoveryError::NoAgentRegistered { .. } | DiscoveryError::Directory(_) => {
                Self::NotAvailable
            }
        }
    }
}

fn discovery_cause(err: &DiscoveryError) -> FailureCause {
    FailureCause::general(FailureKind::from(err), err.to_string())
}

fn transport_cause(agent: AgentId, err: &TransportError) -> FailureCause {
    FailureCause::for_agent(agent, FailureKind::from(err), err.to_string())
}
