//! Chain assembly, dispatch and delivery of parsed representations

pub mod chain;
pub mod dispatcher;
pub mod sink;

pub use chain::{ChainBuilder, ChainError, DispatchChain};
pub use dispatcher::Dispatcher;
pub use sink::{ChannelSink, Delivery, NullSink, RepresentationSink};
