//! End-to-end tests; they need a running server and are ignored by default

mod api_tests;
