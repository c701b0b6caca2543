//! # Manifests
//!
//! Template sets, the transform chain run over them, and the configuration
//! hash used to detect no-op reconciliations.

pub mod error;
pub mod hash;
pub mod resource;
pub mod set;
pub mod transforms;

pub use error::ManifestError;
pub use hash::ConfigHash;
pub use resource::{parse_documents, ManifestResource, ResourceIdentity};
pub use set::{Evaluation, ManifestSet, Release};
