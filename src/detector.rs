//! Change detection primitives: content fingerprints and the fetchers that
//! produce them.

pub mod client;
pub mod fingerprint;

pub use client::{ChangeDetector, FetchError, HttpChangeDetector};
pub use fingerprint::Fingerprint;
