//! Coordination unit tests.

mod domain_tests;
