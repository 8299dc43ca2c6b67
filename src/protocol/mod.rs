//! Response envelopes, the representation-type vocabulary and the domain
//! representations handlers produce.

pub mod envelope;
pub mod media_type;
pub mod repr_types;
pub mod representation;

pub use envelope::{EnvelopeRecord, HttpMethod, ProcessingState, ResponseEnvelope};
pub use media_type::MediaType;
pub use repr_types::ReprType;
pub use representation::{Link, Representation};
