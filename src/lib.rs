//! ro-dispatch - Restful Objects response dispatch
//!
//! Classifies HTTP responses from a Restful Objects server (Apache Isis and
//! friends) and routes each one to exactly one handler through an ordered,
//! immutable chain that always ends in a catch-all.
//!
//! # Overview
//!
//! - [`protocol`]: the response envelope, media types and the representation
//!   vocabulary
//! - [`handler`]: the handler contract and the built-in handlers
//! - [`dispatch`]: chain assembly, the dispatcher and representation sinks
//! - [`transport`]: a reqwest adapter that turns HTTP exchanges into envelopes
//! - [`observability`]: tracing setup and per-dispatcher metrics
//!
//! # Quick Start
//!
//! ```rust
//! use ro_dispatch::dispatch::Dispatcher;
//! use ro_dispatch::protocol::{ProcessingState, ReprType, ResponseEnvelope};
//!
//! let dispatcher = Dispatcher::default();
//!
//! let mut envelope = ResponseEnvelope::get("http://localhost:8080/restful/user")
//!     .with_repr_type(ReprType::User)
//!     .with_body(r#"{"userName": "sven", "roles": [], "links": []}"#);
//!
//! dispatcher.dispatch(&mut envelope);
//!
//! assert!(matches!(envelope.state(), ProcessingState::Processed { handler } if handler == "user"));
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod observability;
pub mod protocol;
pub mod testing;
pub mod transport;

pub use config::{ConfigError, DispatcherConfig};
pub use dispatch::{ChainBuilder, DispatchChain, Dispatcher, RepresentationSink};
pub use error::{DispatchError, DispatchResult};
pub use handler::{HandlerDescriptor, ResponseHandler};
pub use protocol::*;
