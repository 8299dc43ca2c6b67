//! Network adapters that produce response envelopes
//!
//! Dispatch itself never touches the network. Adapters here turn an HTTP
//! exchange into a [`ResponseEnvelope`](crate::protocol::ResponseEnvelope) and
//! stop there.

pub mod http;

pub use http::{FetchError, HttpFetcher};
