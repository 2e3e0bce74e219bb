//! Multi-process wiring tests over real sockets.
//!
//! Tests are organized into modules by transport:
//! - `direct_tests`: one HTTP request per agent call
//! - `multiplexed_tests`: correlated frames over one TCP stream per agent

mod end_to_end {
    pub mod helpers;

    mod direct_tests;
    mod multiplexed_tests;
}
