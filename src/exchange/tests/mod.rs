//! Exchange unit tests.

mod service_tests;
