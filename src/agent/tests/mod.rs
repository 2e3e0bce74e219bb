//! Agent unit tests.

mod stream_tests;
