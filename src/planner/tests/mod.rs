//! Planner unit tests.

mod domain_tests;
