//! Filesystem repository for classifier artefacts.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::common::config::AppCfg;
use crate::common::error::ModelError;
use crate::schema::DiseaseId;

use super::domain::ModelRepo;

/// Reads `<model_dir>/<stem>.json` for each disease.
pub struct FsModelRepo {
    root: PathBuf,
}

impl FsModelRepo {
    pub fn new(cfg: &AppCfg) -> Self {
        Self::at(&cfg.model_dir)
    }

    pub fn at(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn artefact_path(&self, disease: DiseaseId) -> PathBuf {
        self.root.join(format!("{}.json", disease.artefact_stem()))
    }
}

impl ModelRepo for FsModelRepo {
    fn fetch(&self, disease: DiseaseId) -> Result<Vec<u8>, ModelError> {
        let path = self.artefact_path(disease);
        fs::read(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ModelError::Unavailable(disease),
            _ => ModelError::Io {
                disease,
                detail: format!("{}: {err}", path.display()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artefact_names_follow_disease_stems() {
        let repo = FsModelRepo::at("/srv/models");
        assert_eq!(
            repo.artefact_path(DiseaseId::Heart),
            PathBuf::from("/srv/models/heart_disease_model.json")
        );
        assert_eq!(
            repo.artefact_path(DiseaseId::Parkinsons),
            PathBuf::from("/srv/models/parkinsons_model.json")
        );
    }

    #[test]
    fn missing_file_means_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsModelRepo::at(dir.path());
        assert_eq!(
            repo.fetch(DiseaseId::Diabetes),
            Err(ModelError::Unavailable(DiseaseId::Diabetes))
        );
    }

    #[test]
    fn reads_existing_artefact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("diabetes_model.json"), b"{}").unwrap();
        let repo = FsModelRepo::new(&AppCfg::with_model_dir(dir.path()));
        assert_eq!(repo.fetch(DiseaseId::Diabetes).unwrap(), b"{}".to_vec());
    }
}
