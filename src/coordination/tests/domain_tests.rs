//! Unit tests for the session aggregate and its state machine.

use std::time::Duration;

use crate::coordination::domain::{
    CoordinationSession, FailureCause, FailureKind, SessionDomainError, SessionOutcome,
    SessionState, SlotOutcome,
};
use crate::directory::domain::{AgentId, CapabilityTag};
use crate::transport::domain::AgentReply;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Map, Value};

fn agent(raw: &str) -> AgentId {
    AgentId::new(raw).expect("valid agent id")
}

fn reply(text: &str) -> AgentReply {
    let mut payload = Map::new();
    payload.insert("text".to_owned(), Value::String(text.to_owned()));
    AgentReply {
        payload,
        metadata: Map::new(),
    }
}

/// Session with `planner` as primary and `alerts` as secondary, awaiting
/// responses.
#[fixture]
fn awaiting() -> CoordinationSession {
    let clock = DefaultClock;
    let mut session = CoordinationSession::new(
        [CapabilityTag::trip_planning(), CapabilityTag::service_alerts()],
        Duration::from_secs(2),
        &clock,
    );
    session.begin_lookup(&clock).expect("lookup");
    session
        .dispatch_to(
            [
                (agent("planner"), vec![CapabilityTag::trip_planning()]),
                (agent("alerts"), vec![CapabilityTag::service_alerts()]),
            ],
            Some(agent("planner")),
            Vec::new(),
            &clock,
        )
        .expect("dispatch");
    session.await_responses(&clock).expect("awaiting");
    session
}

#[rstest]
#[case(SessionState::Init, SessionState::DirectoryLookup, true)]
#[case(SessionState::DirectoryLookup, SessionState::Dispatch, true)]
#[case(SessionState::DirectoryLookup, SessionState::Failed, true)]
#[case(SessionState::Dispatch, SessionState::Failed, true)]
#[case(SessionState::Dispatch, SessionState::AwaitResponses, true)]
#[case(SessionState::AwaitResponses, SessionState::Aggregate, true)]
#[case(SessionState::Aggregate, SessionState::TimedOut, true)]
#[case(SessionState::Init, SessionState::Dispatch, false)]
#[case(SessionState::AwaitResponses, SessionState::Completed, false)]
#[case(SessionState::Completed, SessionState::Init, false)]
#[case(SessionState::TimedOut, SessionState::Aggregate, false)]
fn lifecycle_edges(#[case] from: SessionState, #[case] to: SessionState, #[case] allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
#[case("await_responses", SessionState::AwaitResponses)]
#[case(" TIMED_OUT ", SessionState::TimedOut)]
fn states_parse_from_canonical_names(#[case] raw: &str, #[case] expected: SessionState) {
    assert_eq!(SessionState::try_from(raw).expect("known state"), expected);
}

#[test]
fn fresh_session_cannot_skip_lookup() {
    let clock = DefaultClock;
    let mut session =
        CoordinationSession::new([CapabilityTag::stop_info()], Duration::from_secs(1), &clock);

    let err = session.await_responses(&clock).expect_err("must look up first");

    assert!(matches!(
        err,
        SessionDomainError::InvalidTransition {
            from: SessionState::Init,
            to: SessionState::AwaitResponses,
            ..
        }
    ));
    assert_eq!(session.state(), SessionState::Init);
}

#[rstest]
fn primary_answer_completes_with_missing_secondary_as_partial(mut awaiting: CoordinationSession) {
    let clock = DefaultClock;
    assert!(awaiting
        .record_response(&agent("planner"), reply("Take the Red Line"))
        .expect("recorded"));

    let outcome = awaiting.aggregate(&clock).expect("aggregate").clone();

    assert_eq!(awaiting.state(), SessionState::Completed);
    let SessionOutcome::Completed(answer) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(
        answer.primary.as_ref().and_then(|primary| primary.reply.text()),
        Some("Take the Red Line")
    );
    assert!(answer.is_partial());
    assert!(!answer.is_best_effort());
    assert_eq!(answer.missing, vec![agent("alerts")]);
}

#[rstest]
fn secondary_alone_is_best_effort(mut awaiting: CoordinationSession) {
    let clock = DefaultClock;
    awaiting
        .record_failure(
            &agent("planner"),
            FailureCause::for_agent(agent("planner"), FailureKind::NotAvailable, "refused"),
        )
        .expect("recorded");
    awaiting
        .record_response(&agent("alerts"), reply("No alerts"))
        .expect("recorded");

    let outcome = awaiting.aggregate(&clock).expect("aggregate").clone();

    let SessionOutcome::Completed(answer) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert!(answer.is_best_effort());
    assert!(answer.is_partial());
    assert_eq!(answer.causes.len(), 1);
}

#[rstest]
fn nothing_before_deadline_times_out(mut awaiting: CoordinationSession) {
    let clock = DefaultClock;

    let outcome = awaiting.aggregate(&clock).expect("aggregate").clone();

    assert_eq!(awaiting.state(), SessionState::TimedOut);
    assert!(matches!(outcome, SessionOutcome::TimedOut { pending, .. } if pending.len() == 2));
}

#[rstest]
fn every_slot_failing_fails_with_all_causes(mut awaiting: CoordinationSession) {
    let clock = DefaultClock;
    for id in ["planner", "alerts"] {
        awaiting
            .record_failure(
                &agent(id),
                FailureCause::for_agent(agent(id), FailureKind::Malformed, "bad envelope"),
            )
            .expect("recorded");
    }

    let outcome = awaiting.aggregate(&clock).expect("aggregate").clone();

    assert_eq!(awaiting.state(), SessionState::Failed);
    assert!(matches!(outcome, SessionOutcome::Failed { causes } if causes.len() == 2));
}

#[rstest]
fn first_resolution_wins(mut awaiting: CoordinationSession) {
    awaiting
        .record_response(&agent("alerts"), reply("first"))
        .expect("recorded");

    let again = awaiting
        .record_response(&agent("alerts"), reply("second"))
        .expect("ignored");

    assert!(!again);
    let slot = awaiting.slot(&agent("alerts")).expect("slot");
    assert!(matches!(slot.outcome(), SlotOutcome::Responded(body) if body.text() == Some("first")));
}

#[rstest]
fn late_results_after_terminal_state_are_rejected(mut awaiting: CoordinationSession) {
    let clock = DefaultClock;
    awaiting.aggregate(&clock).expect("aggregate");

    let err = awaiting
        .record_response(&agent("planner"), reply("too late"))
        .expect_err("closed");

    assert!(matches!(err, SessionDomainError::NotAwaiting { state: SessionState::TimedOut, .. }));
    assert!(awaiting.aggregate(&clock).is_err());
}

#[rstest]
fn unknown_agents_are_rejected(mut awaiting: CoordinationSession) {
    let err = awaiting
        .record_response(&agent("stranger"), reply("hello"))
        .expect_err("never dispatched");

    assert!(matches!(err, SessionDomainError::UnknownAgent { .. }));
}

#[rstest]
fn participants_are_listed_in_id_order(awaiting: CoordinationSession) {
    let ids: Vec<&str> = awaiting.participants().map(AgentId::as_str).collect();

    assert_eq!(ids, vec!["alerts", "planner"]);
    assert_eq!(awaiting.primary().map(AgentId::as_str), Some("planner"));
    assert!(awaiting.deadline() > awaiting.created_at());
}
