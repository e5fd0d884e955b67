//! Lifestyle suggestions keyed by disease and outcome.

pub mod domain;

pub use domain::SuggestionCatalog;
