//! Transit data adapters.

mod mbta;
mod memory;

pub use mbta::{DEFAULT_MBTA_BASE_URL, MbtaDataProvider};
pub use memory::StaticTransitData;
