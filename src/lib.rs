//! Transit exchange: multi-agent query routing for public transit questions.
//!
//! A rider's free-text question is classified onto one of two paths. The
//! fast path forwards it to the single agent serving the matched capability;
//! the coordinated path fans it out to every relevant agent under one
//! deadline and aggregates whatever answers arrive in time.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal layering:
//!
//! - **Domain**: value types, state machines and pure algorithms
//! - **Ports**: trait contracts for storage, transport and external providers
//! - **Adapters**: in-memory, HTTP and TCP implementations of the ports
//! - **Services**: orchestration of domain types over ports
//!
//! # Modules
//!
//! - [`directory`]: agent registration, activation and capability discovery
//! - [`transport`]: agent message envelopes and the direct/multiplexed channels
//! - [`routing`]: query classification and the fast path
//! - [`coordination`]: coordination sessions and the orchestrator
//! - [`planner`]: one-transfer route search over transit data
//! - [`agent`]: capability handlers served by agent processes
//! - [`completion`]: LLM completion providers used for classification and
//!   location extraction
//! - [`exchange`]: the chat facade and its startup validation gate
//! - [`server`]: HTTP surfaces for each process role
//! - [`config`] and [`telemetry`]: environment settings and logging setup

pub mod agent;
pub mod completion;
pub mod config;
pub mod coordination;
pub mod directory;
pub mod exchange;
pub mod planner;
pub mod routing;
pub mod server;
pub mod telemetry;
pub mod transport;
