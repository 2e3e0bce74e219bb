//! Port definitions for transit data access.

mod provider;

pub use provider::{TransitDataError, TransitDataProvider, TransitDataResult};
