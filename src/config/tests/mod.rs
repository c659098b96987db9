//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Token, owner, title, and manifest resolution tests
//! - `run_request`: Repository list, endpoint, and run request assembly tests

mod helpers;
mod run_request;
