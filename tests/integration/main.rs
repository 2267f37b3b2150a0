//! End-to-end tests against a mock platform API
//!
//! wiremock stands in for the platform; the tests drive the crate through
//! its public surface, from the API client up to the HTTP boundary.

mod support;

mod api_tests;
mod pipeline_tests;
