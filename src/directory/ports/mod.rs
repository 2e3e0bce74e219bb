//! Port contracts for the agent directory.
//!
//! [`store`] is the persistence contract used by the directory service;
//! [`lookup`] is the read-side contract consumed by the router, the
//! orchestrator and the exchange gate.

pub mod lookup;
pub mod store;

#[cfg(test)]
pub use lookup::MockAgentDirectory;
pub use lookup::{AgentDirectory, AgentFilter, DirectoryLookupError, DirectoryLookupResult};
pub use store::{AgentRecordStore, DirectoryStoreError, DirectoryStoreResult, RecordMutation};
