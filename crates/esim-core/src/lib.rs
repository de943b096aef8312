//! Core data model for the eSIM profile lifecycle engine.
//!
//! Holds the canonical [`Profile`] record, the closed [`ProfileStatus`]
//! lifecycle enum with its single free-text classifier, the read-time
//! [`LifecycleView`] bucketing, and the shared error model. Everything
//! upstream-shaped and loosely typed lives in the ingest crate; by the time
//! a record reaches this type it is fully normalized.
pub mod error;
pub mod profile;
pub mod status;

pub use error::EsimError;
pub use profile::{identity_key_of, Profile, ProfilePatch};
pub use status::{LifecycleView, ProfileStatus};

/// Engine version reported by the health endpoint.
pub const ENGINE_VERSION: &str = "0.8.0";
