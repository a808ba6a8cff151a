//! Data layer

pub mod registry;

pub use registry::{
    DecodeError, Descriptor, SampleRegistry, SampleValue, StoredSample, ValueKind, decode,
    identity,
};
