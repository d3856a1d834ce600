//! Delivery-range matching engine.
//!
//! Build path: feed -> normalizer -> index builder -> shard writer.
//! Query path: retrieval -> spatial -> temporal -> distance -> ids.

pub mod distance;
pub mod error;
pub mod retrieval;
pub mod service;
pub mod spatial;
pub mod temporal;

pub use error::{EngineError, ErrorKind};
pub use service::{DeliveryRangeService, EngineSettings, PreprocessReport};
