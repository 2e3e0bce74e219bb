//! Routing unit tests.

mod router_tests;
