//! Artifact Store: fetches, validates, caches, and exposes the current
//! routing artifact. See [`store::ArtifactStore`] for the atomically
//! replaceable snapshot and [`model::Artifact`] for the validated shape.

pub mod fetch;
pub mod model;
pub mod store;

pub use fetch::{ArtifactSource, HttpArtifactSource};
pub use model::Artifact;
pub use store::ArtifactStore;
