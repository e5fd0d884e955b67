//! C-compatible API for the presentation layer.
//!
//! Ownership rules: a service pointer from `medpredict_service_new` must be
//! released with `medpredict_service_free`; every string returned by this
//! module must be released with `medpredict_free_str`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::common::config::AppCfg;
use crate::common::error::{ErrorClass, ErrorCode, PredictResult, PredictionError};
use crate::inference::{PredictionResult, PredictionService};
use crate::intake::RawInput;
use crate::schema::DiseaseId;

/// ABI version to coordinate with the presentation layer.
#[no_mangle]
pub extern "C" fn medpredict_api_version() -> u32 {
    1
}

/// Build a service from the environment, optionally overriding the model
/// directory. Returns null when the suggestion catalog cannot be loaded.
#[no_mangle]
pub extern "C" fn medpredict_service_new(model_dir: *const c_char) -> *mut PredictionService {
    let mut cfg = AppCfg::load();
    if let Some(dir) = read_str(model_dir) {
        cfg.model_dir = dir.into();
    }
    crate::common::log::init_logger(cfg.level_filter());

    match PredictionService::bootstrap(&cfg) {
        Ok((service, _report)) => Box::into_raw(Box::new(service)),
        Err(err) => {
            crate::common::log::log_json(
                log::Level::Error,
                "api",
                "bootstrap_failed",
                err.code() as u32,
                0,
            );
            std::ptr::null_mut()
        }
    }
}

/// Release a service created by `medpredict_service_new`.
#[no_mangle]
pub extern "C" fn medpredict_service_free(service: *mut PredictionService) {
    if service.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(service));
    }
}

/// Run one prediction. `fields_json` is a flat JSON object of field name to
/// value; the returned JSON string always carries an `ok` flag.
#[no_mangle]
pub extern "C" fn medpredict_predict(
    service: *const PredictionService,
    disease: *const c_char,
    fields_json: *const c_char,
) -> *const c_char {
    if service.is_null() {
        return reply(request_error("no_service", "service pointer is null"));
    }
    let service = unsafe { &*service };

    let disease = match read_str(disease).map(|raw| raw.parse::<DiseaseId>()) {
        Some(Ok(disease)) => disease,
        Some(Err(err)) => return reply(request_error("unknown_disease", &err.to_string())),
        None => return reply(request_error("unknown_disease", "disease is null")),
    };
    let fields = match read_str(fields_json).as_deref().map(parse_fields) {
        Some(Ok(fields)) => fields,
        Some(Err(msg)) => return reply(request_error("malformed_request", &msg)),
        None => return reply(request_error("malformed_request", "fields are null")),
    };

    reply(render(&service.predict(disease, &fields)))
}

/// JSON array of diseases that can currently be served.
#[no_mangle]
pub extern "C" fn medpredict_available(service: *const PredictionService) -> *const c_char {
    if service.is_null() {
        return string_to_raw("[]".to_string());
    }
    let service = unsafe { &*service };
    reply(json!(service.available()))
}

/// Free strings allocated by Rust.
#[no_mangle]
pub extern "C" fn medpredict_free_str(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(ptr as *mut c_char);
    }
}

fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Accept string values as-is and render JSON numbers as text, so a caller
/// that already holds numbers does not have to stringify them.
fn parse_fields(json: &str) -> Result<RawInput, String> {
    let object: Map<String, Value> = serde_json::from_str(json).map_err(|err| err.to_string())?;
    object
        .into_iter()
        .map(|(name, value)| match value {
            Value::String(text) => Ok((name, text)),
            Value::Number(n) => Ok((name, n.to_string())),
            other => Err(format!("field `{name}` has unsupported value {other}")),
        })
        .collect()
}

fn class_name(class: ErrorClass) -> &'static str {
    match class {
        ErrorClass::UserInput => "user_input",
        ErrorClass::Deployment => "deployment",
        ErrorClass::Internal => "internal",
    }
}

#[derive(Serialize)]
struct Success<'a> {
    ok: bool,
    #[serde(flatten)]
    result: &'a PredictionResult,
}

fn render(result: &PredictResult<PredictionResult>) -> Value {
    match result {
        Ok(res) => serde_json::to_value(Success {
            ok: true,
            result: res,
        })
        .unwrap_or_else(|_| json!({ "ok": false })),
        Err(err) => {
            let mut body = json!({
                "ok": false,
                "code": err.code() as u32,
                "class": class_name(err.class()),
                "message": err.to_string(),
            });
            match err {
                PredictionError::InvalidInput { field, .. } => body["field"] = json!(field),
                PredictionError::ModelUnavailable(disease) => body["disease"] = json!(disease),
                PredictionError::InternalInconsistency(_) => {}
            }
            body
        }
    }
}

fn request_error(kind: &str, message: &str) -> Value {
    json!({
        "ok": false,
        "code": ErrorCode::InvalidInput as u32,
        "class": class_name(ErrorClass::UserInput),
        "kind": kind,
        "message": message,
    })
}

fn reply(body: Value) -> *const c_char {
    string_to_raw(body.to_string())
}

fn string_to_raw(s: String) -> *const c_char {
    match CString::new(s) {
        Ok(cstring) => cstring.into_raw() as *const c_char,
        Err(_) => fallback_json_raw(),
    }
}

fn fallback_json_raw() -> *const c_char {
    CString::new("{\"ok\":false}")
        .map(|cstring| cstring.into_raw() as *const c_char)
        .unwrap_or(std::ptr::null())
}
