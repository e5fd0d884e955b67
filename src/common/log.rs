//! Structured JSON-line logging on top of the `log` facade.
//!
//! Every line carries `ts`, `level`, `mod`, `ev`, `code` and `dur_ms`, plus
//! optional extra keys. Raw clinical values never go into a log line.

use std::io::Write;

use log::{Level, LevelFilter};
use serde_json::{Map, Value};

/// Install a stdout logger that writes each record as-is, one JSON line per
/// event. Returns `false` when the host already installed a logger; the
/// level filter is applied either way.
pub fn init_logger(filter: LevelFilter) -> bool {
    let installed = env_logger::Builder::new()
        .filter_level(filter)
        .target(env_logger::Target::Stdout)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .try_init()
        .is_ok();
    log::set_max_level(filter);
    installed
}

/// Emit a JSON line with the standard keys.
pub fn log_json(level: Level, module: &str, event: &str, code: u32, dur_ms: u128) {
    log_json_with(level, module, event, code, dur_ms, Map::new());
}

/// Emit a JSON line with additional context keys.
pub fn log_json_with(
    level: Level,
    module: &str,
    event: &str,
    code: u32,
    dur_ms: u128,
    extra: Map<String, Value>,
) {
    if !log::log_enabled!(target: "medpredict", level) {
        return;
    }
    log::log!(target: "medpredict", level, "{}", render(level, module, event, code, dur_ms, extra));
}

fn render(
    level: Level,
    module: &str,
    event: &str,
    code: u32,
    dur_ms: u128,
    extra: Map<String, Value>,
) -> String {
    let mut line = Map::new();
    line.insert("ts".into(), Value::from(crate::common::time::now_ms() as u64));
    line.insert("level".into(), Value::from(level.as_str().to_ascii_lowercase()));
    line.insert("mod".into(), Value::from(module));
    line.insert("ev".into(), Value::from(event));
    line.insert("code".into(), Value::from(code));
    line.insert("dur_ms".into(), Value::from(dur_ms as u64));
    for (key, value) in extra {
        line.entry(key).or_insert(value);
    }
    Value::Object(line).to_string()
}
