//! Artifact storage.

pub mod blob;

pub use blob::{BlobKind, BlobReader, BlobWriter, load_blob, save_blob};
