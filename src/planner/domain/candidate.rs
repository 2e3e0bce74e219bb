//! Search result type.

use super::{RouteId, StopId};
use serde::{Deserialize, Serialize};

/// A trip with at most one transfer.
///
/// A direct trip has no transfer stop and no second route, so the hop count
/// can never exceed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCandidate {
    origin: StopId,
    destination: StopId,
    first_route: RouteId,
    transfer: Option<(StopId, RouteId)>,
}

impl TransferCandidate {
    /// Creates a direct trip on `route`.
    #[must_use]
    pub const fn direct(origin: StopId, destination: StopId, route: RouteId) -> Self {
        Self {
            origin,
            destination,
            first_route: route,
            transfer: None,
        }
    }

    /// Creates a trip changing from `first_route` to `second_route` at
    /// `transfer_stop`.
    #[must_use]
    pub const fn with_transfer(
        origin: StopId,
        destination: StopId,
        first_route: RouteId,
        transfer_stop: StopId,
        second_route: RouteId,
    ) -> Self {
        Self {
            origin,
            destination,
            first_route,
            transfer: Some((transfer_stop, second_route)),
        }
    }

    /// Returns the origin stop.
    #[must_use]
    pub const fn origin(&self) -> &StopId {
        &self.origin
    }

    /// Returns the destination stop.
    #[must_use]
    pub const fn destination(&self) -> &StopId {
        &self.destination
    }

    /// Returns the route boarded at the origin.
    #[must_use]
    pub const fn first_route(&self) -> &RouteId {
        &self.first_route
    }

    /// Returns the transfer stop, if any.
    #[must_use]
    pub fn transfer_stop(&self) -> Option<&StopId> {
        self.transfer.as_ref().map(|(stop, _)| stop)
    }

    /// Returns the route boarded at the transfer stop, if any.
    #[must_use]
    pub fn second_route(&self) -> Option<&RouteId> {
        self.transfer.as_ref().map(|(_, route)| route)
    }

    /// Returns whether the trip needs no transfer.
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        self.transfer.is_none()
    }

    /// Returns the number of transfers (0 or 1).
    #[must_use]
    pub const fn hops(&self) -> usize {
        if self.transfer.is_some() { 1 } else { 0 }
    }
}
