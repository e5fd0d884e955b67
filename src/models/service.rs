//! Model registry: one loaded classifier per disease, read-only after load.

use std::collections::HashMap;
use std::thread;

use log::Level;
use serde_json::{Map, Value};

use crate::common::error::{ErrorCode, ModelError};
use crate::common::log::log_json_with;
use crate::common::time;
use crate::schema::DiseaseId;

use super::domain::{ClassifierHandle, ModelRepo};

/// Outcome of loading every disease's artefact.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<DiseaseId>,
    pub failures: Vec<(DiseaseId, ModelError)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failure(&self, disease: DiseaseId) -> Option<&ModelError> {
        self.failures
            .iter()
            .find(|(d, _)| *d == disease)
            .map(|(_, err)| err)
    }
}

/// Loaded classifier handles keyed by disease.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    handles: HashMap<DiseaseId, ClassifierHandle>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every disease from `repo`. A failing disease is recorded in the
    /// report and left out; the others are still registered.
    pub fn load(repo: &dyn ModelRepo, parallel: bool) -> (Self, LoadReport) {
        let start = time::now_ms();
        let results: Vec<(DiseaseId, Result<ClassifierHandle, ModelError>)> = if parallel {
            thread::scope(|scope| {
                let workers: Vec<_> = DiseaseId::ALL
                    .iter()
                    .map(|&disease| (disease, scope.spawn(move || load_one(repo, disease))))
                    .collect();
                workers
                    .into_iter()
                    .map(|(disease, worker)| {
                        let result = worker.join().unwrap_or_else(|_| {
                            Err(ModelError::Io {
                                disease,
                                detail: "loader thread panicked".into(),
                            })
                        });
                        (disease, result)
                    })
                    .collect::<Vec<_>>()
            })
        } else {
            DiseaseId::ALL
                .iter()
                .map(|&disease| (disease, load_one(repo, disease)))
                .collect::<Vec<_>>()
        };

        let mut registry = Self::new();
        let mut report = LoadReport::default();
        for (disease, result) in results {
            match result {
                Ok(handle) => {
                    log_loaded(&handle, time::since_ms(start));
                    registry.insert(handle);
                    report.loaded.push(disease);
                }
                Err(err) => {
                    log_unavailable(disease, &err);
                    report.failures.push((disease, err));
                }
            }
        }
        (registry, report)
    }

    /// Register a handle, replacing any previous one for the same disease.
    pub fn insert(&mut self, handle: ClassifierHandle) -> Option<ClassifierHandle> {
        self.handles.insert(handle.disease(), handle)
    }

    pub fn get(&self, disease: DiseaseId) -> Result<&ClassifierHandle, ModelError> {
        self.handles
            .get(&disease)
            .ok_or(ModelError::Unavailable(disease))
    }

    pub fn contains(&self, disease: DiseaseId) -> bool {
        self.handles.contains_key(&disease)
    }

    /// Servable diseases in declaration order.
    pub fn available(&self) -> Vec<DiseaseId> {
        DiseaseId::ALL
            .into_iter()
            .filter(|d| self.handles.contains_key(d))
            .collect()
    }
}

fn load_one(repo: &dyn ModelRepo, disease: DiseaseId) -> Result<ClassifierHandle, ModelError> {
    let bytes = repo.fetch(disease)?;
    ClassifierHandle::from_bytes(disease, &bytes)
}

fn log_loaded(handle: &ClassifierHandle, dur_ms: u128) {
    let disease = handle.disease();
    let expected = disease.schema().len();
    let mut extra = Map::new();
    extra.insert("disease".into(), Value::from(disease.as_str()));
    extra.insert("kind".into(), Value::from(handle.kind()));
    extra.insert("fingerprint".into(), Value::from(handle.fingerprint()));
    extra.insert("n_features".into(), Value::from(handle.n_features()));

    if handle.n_features() != expected {
        // Every prediction for this disease will fail as an internal inconsistency.
        extra.insert("schema_len".into(), Value::from(expected));
        log_json_with(
            Level::Error,
            "models",
            "arity_mismatch",
            ErrorCode::Internal as u32,
            dur_ms,
            extra,
        );
    } else {
        log_json_with(Level::Info, "models", "model_loaded", ErrorCode::Ok as u32, dur_ms, extra);
    }
}

fn log_unavailable(disease: DiseaseId, err: &ModelError) {
    let mut extra = Map::new();
    extra.insert("disease".into(), Value::from(disease.as_str()));
    extra.insert("reason".into(), Value::from(err.to_string()));
    log_json_with(Level::Warn, "models", "model_unavailable", err.code() as u32, 0, extra);
}
