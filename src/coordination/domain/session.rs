//! Coordination session aggregate.

use super::{
    AgentAnswer, AggregatedAnswer, FailureCause, FailureKind, SessionDomainError, SessionId, SessionOutcome,
    SessionState,
};
use crate::directory::domain::{AgentId, CapabilityTag};
use crate::transport::domain::AgentReply;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use mockable::Clock;
use std::collections::BTreeMap;
use std::time::Duration;

/// Resolution of one dispatched agent.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome {
    /// No answer yet.
    Pending,
    /// The agent answered.
    Responded(AgentReply),
    /// The call failed.
    Failed(FailureCause),
}

/// Response slot for one dispatched agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSlot {
    capabilities: Vec<CapabilityTag>,
    outcome: SlotOutcome,
}

impl ResponseSlot {
    /// Returns the capabilities the agent was asked to serve.
    #[must_use]
    pub fn capabilities(&self) -> &[CapabilityTag] {
        &self.capabilities
    }

    /// Returns the slot resolution.
    #[must_use]
    pub const fn outcome(&self) -> &SlotOutcome {
        &self.outcome
    }

    /// Returns whether the slot still waits for an answer.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.outcome, SlotOutcome::Pending)
    }

    /// Returns whether the slot is pending or its call timed out.
    #[must_use]
    pub fn ran_out_of_time(&self) -> bool {
        match &self.outcome {
            SlotOutcome::Pending => true,
            SlotOutcome::Failed(cause) => cause.kind == FailureKind::Timeout,
            SlotOutcome::Responded(_) => false,
        }
    }
}

/// One coordinated query, from directory lookup to its terminal state.
///
/// Sessions are single-use: once terminal, every further mutation is
/// rejected and late responses are discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinationSession {
    id: SessionId,
    capabilities: Vec<CapabilityTag>,
    state: SessionState,
    slots: BTreeMap<AgentId, ResponseSlot>,
    primary: Option<AgentId>,
    causes: Vec<FailureCause>,
    outcome: Option<SessionOutcome>,
    deadline: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CoordinationSession {
    /// Opens a session for `capabilities` that must finish within `budget`.
    pub fn new(
        capabilities: impl IntoIterator<Item = CapabilityTag>,
        budget: Duration,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.utc();
        let span = ChronoDuration::from_std(budget).unwrap_or(ChronoDuration::MAX);
        Self {
            id: SessionId::new(),
            capabilities: capabilities.into_iter().collect(),
            state: SessionState::Init,
            slots: BTreeMap::new(),
            primary: None,
            causes: Vec::new(),
            outcome: None,
            deadline: now.checked_add_signed(span).unwrap_or(DateTime::<Utc>::MAX_UTC),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the requested capabilities, primary first.
    #[must_use]
    pub fn capabilities(&self) -> &[CapabilityTag] {
        &self.capabilities
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the participating agents in id order.
    pub fn participants(&self) -> impl Iterator<Item = &AgentId> {
        self.slots.keys()
    }

    /// Returns the slot for `agent`.
    #[must_use]
    pub fn slot(&self, agent: &AgentId) -> Option<&ResponseSlot> {
        self.slots.get(agent)
    }

    /// Returns the primary agent, if one was selected.
    #[must_use]
    pub const fn primary(&self) -> Option<&AgentId> {
        self.primary.as_ref()
    }

    /// Returns the causes recorded so far.
    #[must_use]
    pub fn causes(&self) -> &[FailureCause] {
        &self.causes
    }

    /// Returns the terminal outcome once reached.
    #[must_use]
    pub const fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    /// Returns the wall-clock deadline.
    #[must_use]
    pub const fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest state-change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether every dispatched slot has resolved.
    #[must_use]
    pub fn all_resolved(&self) -> bool {
        self.slots.values().all(|slot| !slot.is_pending())
    }

    /// Moves to directory lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::InvalidTransition`] unless the session
    /// is fresh.
    pub fn begin_lookup(&mut self, clock: &impl Clock) -> Result<(), SessionDomainError> {
        self.transition(SessionState::DirectoryLookup, clock)
    }

    /// Records the selected agents and moves to dispatch.
    ///
    /// `unserved` lists capabilities that will be missing from the answer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::InvalidTransition`] outside directory
    /// lookup.
    pub fn dispatch_to(
        &mut self,
        assignments: impl IntoIterator<Item = (AgentId, Vec<CapabilityTag>)>,
        primary: Option<AgentId>,
        unserved: Vec<FailureCause>,
        clock: &impl Clock,
    ) -> Result<(), SessionDomainError> {
        self.transition(SessionState::Dispatch, clock)?;
        self.slots = assignments
            .into_iter()
            .map(|(agent, capabilities)| {
                (
                    agent,
                    ResponseSlot {
                        capabilities,
                        outcome: SlotOutcome::Pending,
                    },
                )
            })
            .collect();
        self.primary = primary;
        self.causes.extend(unserved);
        Ok(())
    }

    /// Moves to response collection once every request is sent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::InvalidTransition`] outside dispatch.
    pub fn await_responses(&mut self, clock: &impl Clock) -> Result<(), SessionDomainError> {
        self.transition(SessionState::AwaitResponses, clock)
    }

    /// Stores an agent's answer.
    ///
    /// Returns `false` when the slot had already resolved.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::NotAwaiting`] once collection has
    /// ended and [`SessionDomainError::UnknownAgent`] for agents the session
    /// never dispatched to.
    pub fn record_response(
        &mut self,
        agent: &AgentId,
        reply: AgentReply,
    ) -> Result<bool, SessionDomainError> {
        self.resolve(agent, SlotOutcome::Responded(reply))
    }

    /// Stores an agent's failure.
    ///
    /// # Errors
    ///
    /// As [`Self::record_response`].
    pub fn record_failure(
        &mut self,
        agent: &AgentId,
        cause: FailureCause,
    ) -> Result<bool, SessionDomainError> {
        self.resolve(agent, SlotOutcome::Failed(cause))
    }

    /// Fails the session before dispatch with the given causes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::InvalidTransition`] unless the session
    /// is in directory lookup or dispatch.
    pub fn fail(
        &mut self,
        causes: Vec<FailureCause>,
        clock: &impl Clock,
    ) -> Result<&SessionOutcome, SessionDomainError> {
        self.transition(SessionState::Failed, clock)?;
        self.causes.extend(causes);
        Ok(self.outcome.insert(SessionOutcome::Failed {
            causes: self.causes.clone(),
        }))
    }

    /// Combines the collected responses and enters the terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionDomainError::InvalidTransition`] unless the session
    /// is collecting responses.
    pub fn aggregate(&mut self, clock: &impl Clock) -> Result<&SessionOutcome, SessionDomainError> {
        self.transition(SessionState::Aggregate, clock)?;

        let mut primary = None;
        let mut secondaries = Vec::new();
        let mut missing = Vec::new();
        let mut causes = self.causes.clone();
        for (agent, slot) in &self.slots {
            match &slot.outcome {
                SlotOutcome::Responded(reply) => {
                    let answer = AgentAnswer {
                        agent: agent.clone(),
                        capabilities: slot.capabilities.clone(),
                        reply: reply.clone(),
                    };
                    if self.primary.as_ref() == Some(agent) {
                        primary = Some(answer);
                    } else {
                        secondaries.push(answer);
                    }
                }
                SlotOutcome::Failed(cause) => {
                    missing.push(agent.clone());
                    causes.push(cause.clone());
                }
                SlotOutcome::Pending => missing.push(agent.clone()),
            }
        }

        let (terminal, outcome) = if primary.is_some() || !secondaries.is_empty() {
            (
                SessionState::Completed,
                SessionOutcome::Completed(AggregatedAnswer {
                    primary,
                    secondaries,
                    missing,
                    causes,
                }),
            )
        } else if self.slots.values().any(ResponseSlot::ran_out_of_time) {
            let pending = self
                .slots
                .iter()
                .filter(|(_, slot)| slot.ran_out_of_time())
                .map(|(agent, _)| agent.clone())
                .collect();
            (
                SessionState::TimedOut,
                SessionOutcome::TimedOut { pending, causes },
            )
        } else {
            (SessionState::Failed, SessionOutcome::Failed { causes })
        };

        self.transition(terminal, clock)?;
        Ok(self.outcome.insert(outcome))
    }

    fn resolve(&mut self, agent: &AgentId, outcome: SlotOutcome) -> Result<bool, SessionDomainError> {
        if self.state != SessionState::AwaitResponses {
            return Err(SessionDomainError::NotAwaiting {
                session: self.id,
                state: self.state,
            });
        }
        let slot = self
            .slots
            .get_mut(agent)
            .ok_or_else(|| SessionDomainError::UnknownAgent {
                session: self.id,
                agent: agent.clone(),
            })?;
        if !slot.is_pending() {
            return Ok(false);
        }
        slot.outcome = outcome;
        Ok(true)
    }

    fn transition(
        &mut self,
        next: SessionState,
        clock: &impl Clock,
    ) -> Result<(), SessionDomainError> {
        if !self.state.can_transition_to(next) {
            return Err(SessionDomainError::InvalidTransition {
                session: self.id,
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(session_id = %self.id, from = %self.state, to = %next, "session transition");
        self.state = next;
        self.updated_at = clock.utc();
        Ok(())
    }
}
