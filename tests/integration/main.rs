//! Integration tests against a mock platform API
//!
//! These tests use wiremock to stand in for the platform and drive real
//! HTTP requests through the client and the crawl controller.

mod client_tests;
mod crawl_tests;
