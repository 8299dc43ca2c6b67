//! Test support: recording sinks, instrumented handlers and Restful Objects
//! fixtures
//!
//! Lets dispatch be exercised end to end without a running server.

pub mod fixtures;
pub mod mocks;

pub use fixtures::{standard_fixtures, Fixture};
pub use mocks::*;
