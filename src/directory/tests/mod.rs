//! Unit tests for the agent directory.

mod service_tests;
