//! Prediction orchestration.
//!
//! schema -> coerce -> classifier -> decode -> suggestion. The first failure
//! ends the call; there are no partial results and no default outcome.

use log::Level;
use serde_json::{Map, Value};

use crate::advice::SuggestionCatalog;
use crate::common::config::AppCfg;
use crate::common::error::{CatalogError, ErrorCode, PredictResult, PredictionError};
use crate::common::log::log_json_with;
use crate::common::time;
use crate::intake::{coerce, RawInput};
use crate::models::{FsModelRepo, LoadReport, ModelRegistry};
use crate::schema::DiseaseId;

use super::domain::{PredictionRequest, PredictionResult, RequestContext};

/// Immutable after construction; share it behind an `Arc` across threads.
#[derive(Debug)]
pub struct PredictionService {
    registry: ModelRegistry,
    catalog: SuggestionCatalog,
}

impl PredictionService {
    pub fn new(registry: ModelRegistry, catalog: SuggestionCatalog) -> Self {
        Self { registry, catalog }
    }

    /// Load artefacts and the suggestion catalog described by `cfg`.
    ///
    /// Missing or broken artefacts only show up in the report; a bad catalog
    /// file fails startup because every prediction would depend on it.
    pub fn bootstrap(cfg: &AppCfg) -> Result<(Self, LoadReport), CatalogError> {
        let catalog = match &cfg.suggestions_path {
            Some(path) => {
                let catalog = SuggestionCatalog::from_file(path)?;
                let mut extra = Map::new();
                extra.insert("path".into(), Value::from(path.display().to_string()));
                log_json_with(Level::Info, "advice", "catalog_loaded", ErrorCode::Ok as u32, 0, extra);
                catalog
            }
            None => SuggestionCatalog::builtin(),
        };
        let (registry, report) = ModelRegistry::load(&FsModelRepo::new(cfg), cfg.parallel_load);
        Ok((Self::new(registry, catalog), report))
    }

    /// Diseases whose classifier is loaded.
    pub fn available(&self) -> Vec<DiseaseId> {
        self.registry.available()
    }

    pub fn predict(&self, disease: DiseaseId, fields: &RawInput) -> PredictResult<PredictionResult> {
        self.predict_with(disease, fields, &RequestContext::default())
    }

    pub fn handle(&self, request: &PredictionRequest) -> PredictResult<PredictionResult> {
        self.predict_with(request.disease, &request.fields, &request.context)
    }

    /// Each request is answered independently.
    pub fn predict_batch(
        &self,
        requests: &[PredictionRequest],
    ) -> Vec<PredictResult<PredictionResult>> {
        requests.iter().map(|request| self.handle(request)).collect()
    }

    pub fn predict_with(
        &self,
        disease: DiseaseId,
        fields: &RawInput,
        ctx: &RequestContext,
    ) -> PredictResult<PredictionResult> {
        let start = time::now_ms();
        let result = self.run(disease, fields);
        log_outcome(disease, ctx, &result, time::since_ms(start));
        result
    }

    fn run(&self, disease: DiseaseId, fields: &RawInput) -> PredictResult<PredictionResult> {
        let schema = disease.schema();
        let features = coerce(schema, fields)?;
        let handle = self.registry.get(disease)?;
        let outcome = handle.predict(&features)?;
        Ok(PredictionResult {
            disease,
            outcome,
            suggestion: self.catalog.lookup(disease, outcome).to_string(),
        })
    }
}

fn log_outcome(
    disease: DiseaseId,
    ctx: &RequestContext,
    result: &PredictResult<PredictionResult>,
    dur_ms: u128,
) {
    let mut extra = Map::new();
    extra.insert("disease".into(), Value::from(disease.as_str()));
    if let Some(id) = &ctx.request_id {
        extra.insert("request_id".into(), Value::from(id.as_str()));
    }
    match result {
        Ok(res) => {
            extra.insert("outcome".into(), Value::from(res.outcome.as_str()));
            log_json_with(Level::Info, "inference", "prediction", ErrorCode::Ok as u32, dur_ms, extra);
        }
        Err(err) => {
            if let PredictionError::InvalidInput { field, .. } = err {
                extra.insert("field".into(), Value::from(field.as_str()));
            }
            let level = match err {
                PredictionError::InvalidInput { .. } => Level::Info,
                PredictionError::ModelUnavailable(_) => Level::Warn,
                PredictionError::InternalInconsistency(_) => Level::Error,
            };
            log_json_with(level, "inference", "prediction_failed", err.code() as u32, dur_ms, extra);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::thread;

    use crate::common::error::{CoercionError, ErrorClass, ModelError};
    use crate::models::domain::LinearModel;
    use crate::models::{Classifier, ClassifierHandle};
    use crate::schema::Outcome;

    /// Returns a fixed label and records nothing; arity is configurable.
    struct Fixed {
        n_features: usize,
        label: i64,
    }

    impl Classifier for Fixed {
        fn n_features(&self) -> usize {
            self.n_features
        }
        fn predict_label(&self, _: &[f64]) -> Result<i64, ModelError> {
            Ok(self.label)
        }
        fn kind(&self) -> &'static str {
            "fixed"
        }
    }

    /// Positive exactly when the Glucose slot is above 140.
    struct GlucoseRule;

    impl Classifier for GlucoseRule {
        fn n_features(&self) -> usize {
            8
        }
        fn predict_label(&self, features: &[f64]) -> Result<i64, ModelError> {
            Ok(i64::from(features[1] > 140.0))
        }
        fn kind(&self) -> &'static str {
            "rule"
        }
    }

    fn handle(disease: DiseaseId, label: i64) -> ClassifierHandle {
        let model = Fixed {
            n_features: disease.schema().len(),
            label,
        };
        ClassifierHandle::new(disease, Box::new(model))
    }

    fn service(handles: Vec<ClassifierHandle>) -> PredictionService {
        let mut registry = ModelRegistry::new();
        for h in handles {
            registry.insert(h);
        }
        PredictionService::new(registry, SuggestionCatalog::builtin())
    }

    fn filled(disease: DiseaseId) -> RawInput {
        disease.schema().names().map(|name| (name, "1")).collect()
    }

    #[test]
    fn well_formed_input_yields_a_complete_result() {
        let svc = service(DiseaseId::ALL.iter().map(|&d| handle(d, 0)).collect());
        for disease in DiseaseId::ALL {
            let result = svc.predict(disease, &filled(disease)).unwrap();
            assert_eq!(result.disease, disease);
            assert_eq!(result.outcome, Outcome::Negative);
            assert!(!result.suggestion.is_empty());
        }
    }

    #[test]
    fn diabetes_positive_scenario() {
        let svc = service(vec![ClassifierHandle::new(
            DiseaseId::Diabetes,
            Box::new(GlucoseRule),
        )]);
        let fields = RawInput::new()
            .with("Pregnancies", "6")
            .with("Glucose", "148")
            .with("BloodPressure", "72")
            .with("SkinThickness", "35")
            .with("Insulin", "0")
            .with("BMI", "33.6")
            .with("DiabetesPedigreeFunction", "0.627")
            .with("Age", "50");

        let result = svc.predict(DiseaseId::Diabetes, &fields).unwrap();
        assert_eq!(result.outcome, Outcome::Positive);
        assert_eq!(
            result.suggestion,
            SuggestionCatalog::builtin().lookup(DiseaseId::Diabetes, Outcome::Positive)
        );

        let lower = fields.with("Glucose", "85");
        assert_eq!(
            svc.predict(DiseaseId::Diabetes, &lower).unwrap().outcome,
            Outcome::Negative
        );
    }

    #[test]
    fn heart_age_abc_is_invalid_input() {
        let svc = service(vec![handle(DiseaseId::Heart, 1)]);
        let fields = filled(DiseaseId::Heart).with("age", "abc");
        let err = svc.predict(DiseaseId::Heart, &fields).unwrap_err();
        assert_eq!(
            err,
            PredictionError::InvalidInput {
                field: "age".into(),
                detail: CoercionError::InvalidNumber {
                    field: "age".into(),
                    text: "abc".into()
                }
            }
        );
        assert_eq!(err.class(), ErrorClass::UserInput);
    }

    #[test]
    fn missing_field_is_named_exactly() {
        let svc = service(vec![handle(DiseaseId::Parkinsons, 1)]);
        for name in DiseaseId::Parkinsons.schema().names() {
            let mut fields = filled(DiseaseId::Parkinsons);
            fields.remove(name);
            match svc.predict(DiseaseId::Parkinsons, &fields) {
                Err(PredictionError::InvalidInput {
                    field,
                    detail: CoercionError::MissingField { .. },
                }) => assert_eq!(field, name),
                other => panic!("{name}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn input_errors_win_over_missing_models() {
        let svc = service(Vec::new());
        let fields = filled(DiseaseId::Heart).with("chol", "");
        assert_eq!(
            svc.predict(DiseaseId::Heart, &fields).unwrap_err().code(),
            ErrorCode::InvalidInput
        );
    }

    #[test]
    fn missing_model_is_a_deployment_error() {
        let svc = service(vec![handle(DiseaseId::Diabetes, 1), handle(DiseaseId::Heart, 0)]);
        let err = svc
            .predict(DiseaseId::Parkinsons, &filled(DiseaseId::Parkinsons))
            .unwrap_err();
        assert_eq!(err, PredictionError::ModelUnavailable(DiseaseId::Parkinsons));
        assert_eq!(err.class(), ErrorClass::Deployment);

        assert!(svc.predict(DiseaseId::Diabetes, &filled(DiseaseId::Diabetes)).is_ok());
        assert!(svc.predict(DiseaseId::Heart, &filled(DiseaseId::Heart)).is_ok());
        assert_eq!(svc.available(), vec![DiseaseId::Diabetes, DiseaseId::Heart]);
    }

    #[test]
    fn arity_disagreement_is_internal() {
        let model = Fixed {
            n_features: 7,
            label: 1,
        };
        let svc = service(vec![ClassifierHandle::new(DiseaseId::Diabetes, Box::new(model))]);
        let err = svc
            .predict(DiseaseId::Diabetes, &filled(DiseaseId::Diabetes))
            .unwrap_err();
        assert_eq!(
            err,
            PredictionError::InternalInconsistency(ModelError::DimensionMismatch {
                expected: 7,
                actual: 8
            })
        );
        assert_eq!(err.class(), ErrorClass::Internal);
    }

    #[test]
    fn overflowing_linear_decision_is_internal_not_negative() {
        let mut coefficients = vec![0.0; 8];
        coefficients[0] = 10.0;
        coefficients[1] = -10.0;
        let model = LinearModel {
            n_features: 8,
            coefficients,
            intercept: 5.0,
            classes: [0, 1],
            scaler: None,
        };
        let svc = service(vec![ClassifierHandle::new(DiseaseId::Diabetes, Box::new(model))]);
        let fields = filled(DiseaseId::Diabetes)
            .with("Pregnancies", "1e308")
            .with("Glucose", "1e308");
        let err = svc.predict(DiseaseId::Diabetes, &fields).unwrap_err();
        assert_eq!(
            err,
            PredictionError::InternalInconsistency(ModelError::NonFiniteDecision)
        );
        assert_eq!(err.class(), ErrorClass::Internal);
    }

    #[test]
    fn unexpected_label_is_internal_not_an_outcome() {
        let svc = service(vec![handle(DiseaseId::Heart, 3)]);
        assert_eq!(
            svc.predict(DiseaseId::Heart, &filled(DiseaseId::Heart)),
            Err(PredictionError::InternalInconsistency(
                ModelError::UnexpectedLabel(3)
            ))
        );
    }

    #[test]
    fn batch_answers_each_request_independently() {
        let svc = service(vec![handle(DiseaseId::Heart, 1)]);
        let requests = vec![
            PredictionRequest::new(DiseaseId::Heart, filled(DiseaseId::Heart))
                .with_context(RequestContext::new("r-1")),
            PredictionRequest::new(DiseaseId::Heart, RawInput::new()),
            PredictionRequest::new(DiseaseId::Diabetes, filled(DiseaseId::Diabetes)),
        ];
        let results = svc.predict_batch(&requests);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().outcome, Outcome::Positive);
        assert_eq!(results[1].as_ref().unwrap_err().code(), ErrorCode::InvalidInput);
        assert_eq!(
            results[2].as_ref().unwrap_err(),
            &PredictionError::ModelUnavailable(DiseaseId::Diabetes)
        );
    }

    #[test]
    fn shared_service_serves_concurrent_requests() {
        let svc = Arc::new(service(vec![handle(DiseaseId::Heart, 1)]));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let svc = Arc::clone(&svc);
                thread::spawn(move || svc.predict(DiseaseId::Heart, &filled(DiseaseId::Heart)))
            })
            .collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap().unwrap().outcome, Outcome::Positive);
        }
    }

    #[test]
    fn bootstrap_reads_artefacts_and_catalog_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let linear = |n: usize| {
            format!(
                r#"{{"kind":"linear","n_features":{n},"coefficients":[{}],"intercept":1.0}}"#,
                vec!["0.0"; n].join(",")
            )
        };
        fs::write(dir.path().join("diabetes_model.json"), linear(8)).unwrap();
        fs::write(dir.path().join("heart_disease_model.json"), linear(13)).unwrap();
        let advice = dir.path().join("advice.json");
        fs::write(
            &advice,
            r#"{"diabetes":{"positive":"a","negative":"b"},"heart":{"positive":"c","negative":"d"},"parkinsons":{"positive":"e","negative":"f"}}"#,
        )
        .unwrap();

        let mut cfg = AppCfg::with_model_dir(dir.path());
        cfg.suggestions_path = Some(advice);
        let (svc, report) = PredictionService::bootstrap(&cfg).unwrap();

        assert_eq!(report.loaded, vec![DiseaseId::Diabetes, DiseaseId::Heart]);
        assert_eq!(
            svc.predict(DiseaseId::Heart, &filled(DiseaseId::Heart)).unwrap().suggestion,
            "c"
        );
        assert_eq!(
            svc.predict(DiseaseId::Parkinsons, &filled(DiseaseId::Parkinsons)),
            Err(PredictionError::ModelUnavailable(DiseaseId::Parkinsons))
        );
    }

    #[test]
    fn bootstrap_fails_on_a_broken_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let advice = dir.path().join("advice.json");
        fs::write(&advice, "{").unwrap();
        let mut cfg = AppCfg::with_model_dir(dir.path());
        cfg.suggestions_path = Some(advice);
        assert!(matches!(
            PredictionService::bootstrap(&cfg),
            Err(CatalogError::Malformed(_))
        ));
    }

    #[test]
    fn request_deserializes_from_json() {
        let json = r#"{"disease":"heart","fields":{"age":"63"},"context":{"request_id":"x"}}"#;
        let request: PredictionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.disease, DiseaseId::Heart);
        assert_eq!(request.fields.get("age"), Some("63"));
        assert_eq!(request.context, RequestContext::new("x"));
    }
}
