//! Classifier loading and invocation.
//!
//! Artefacts are read once at startup through a [`ModelRepo`]; afterwards the
//! registry is immutable and shared without locks.

pub mod domain;
pub mod repo_fs;
pub mod service;

pub use domain::{decode_label, Classifier, ClassifierHandle, ModelArtefact, ModelRepo};
pub use repo_fs::FsModelRepo;
pub use service::{LoadReport, ModelRegistry};
