//! Output rendering
//!
//! Three modes:
//! - human: tables and `Key: value` blocks on stdout, logs on stderr
//! - `--json`: pretty JSON of the decoded data on stdout
//! - `--agent`: Pebble v1.1 JSON Lines (`{"v":1,"type":...,"payload":...}`)

use serde::Serialize;
use serde_json::{json, Value};

use crate::api::ApiError;

const SCHEMA_VERSION: u8 = 1;

/// Event wrapper with schema version
#[derive(Serialize)]
struct Event<T: Serialize> {
    v: u8,
    #[serde(rename = "type")]
    event_type: String,
    payload: T,
}

fn emit<T: Serialize>(event_type: &str, payload: T) {
    let event = Event {
        v: SCHEMA_VERSION,
        event_type: event_type.to_string(),
        payload,
    };
    match serde_json::to_string(&event) {
        Ok(line) => println!("{}", line),
        Err(e) => eprintln!("[ERROR] failed to encode {} event: {}", event_type, e),
    }
}

fn print_pretty<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("[ERROR] failed to encode output: {}", e),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Human,
    Json,
    Agent,
}

/// Output handler
pub struct Output {
    mode: Mode,
    verbose: bool,
}

impl Output {
    pub fn new(agent: bool, json: bool, verbose: bool) -> Self {
        let mode = if agent {
            Mode::Agent
        } else if json {
            Mode::Json
        } else {
            Mode::Human
        };
        Self { mode, verbose }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Log message (stderr for human/json, JSON Lines for agent).
    /// `debug` is dropped unless --verbose.
    pub fn log(&self, level: &str, message: &str) {
        if level == "debug" && !self.verbose {
            return;
        }
        if self.mode == Mode::Agent {
            emit("log", json!({"level": level, "message": message}));
        } else {
            eprintln!("[{}] {}", level.to_uppercase(), message);
        }
    }

    /// Final result as JSON (pretty for human/json, event for agent)
    pub fn result<T: Serialize>(&self, data: T) {
        if self.mode == Mode::Agent {
            emit("result", data);
        } else {
            print_pretty(&data);
        }
    }

    /// A collection: table for humans, the raw items otherwise
    pub fn list<T: Serialize>(
        &self,
        items: &[T],
        empty: &str,
        columns: &[&str],
        row: impl Fn(&T) -> Vec<String>,
    ) {
        if self.mode != Mode::Human {
            self.result(items);
            return;
        }
        if items.is_empty() {
            println!("{}", empty);
            return;
        }
        let rows: Vec<Vec<String>> = items.iter().map(row).collect();
        print!("{}", table(columns, &rows));
    }

    /// A single item: aligned `Label: value` lines for humans
    pub fn detail<T: Serialize>(&self, item: &T, fields: &[(&str, String)]) {
        if self.mode != Mode::Human {
            self.result(item);
            return;
        }
        print!("{}", key_values(fields));
    }

    /// Confirmation of a write that returns nothing worth showing
    pub fn done(&self, message: &str) {
        if self.mode == Mode::Human {
            println!("{}", message);
        } else {
            self.result(json!({"success": true, "message": message}));
        }
    }

    /// Raw JSON payload (reports, whois) printed as-is
    pub fn raw(&self, data: &Value) {
        self.result(data);
    }

    /// Error output (Pebble v1.1). Exits the process.
    pub fn error(&self, err: PebbleError) -> ! {
        if self.mode == Mode::Agent {
            emit("error", &err);
        } else {
            eprintln!("Error [{}][{}]: {}", err.cat, err.code, err.message.as_deref().unwrap_or(""));
            if let Some(Value::Object(fields)) = &err.details {
                for (field, reason) in fields {
                    eprintln!("  {}: {}", field, reason.as_str().unwrap_or(&reason.to_string()));
                }
            }
            if err.retryable {
                if let Some(s) = err.retry_after_s {
                    eprintln!("  Retry after: {}s", s);
                }
            }
            eprintln!("  Fix: {:?}", err.fix);
        }
        std::process::exit(err.exit_code());
    }
}

/// Left-aligned columns sized to the widest cell, dashed rule under the header.
pub fn table(columns: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| -> String {
        let line = cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join("  ");
        format!("{}\n", line.trim_end())
    };

    let mut out = render(columns.to_vec());
    let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    out.push_str(&"-".repeat(total));
    out.push('\n');
    for row in rows {
        out.push_str(&render(row.iter().map(String::as_str).collect()));
    }
    out
}

pub fn key_values(fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(k, _)| k.chars().count() + 1).max().unwrap_or(0);
    fields
        .iter()
        .map(|(k, v)| format!("{:<width$} {}\n", format!("{}:", k), v, width = width))
        .collect()
}

/// Cut to `max` characters with a trailing "..."
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    format!("{}...", s.chars().take(keep).collect::<String>())
}

/// 1536 -> "1.50 KB"
pub fn format_bytes(bytes: i64) -> String {
    const UNIT: i64 = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let suffix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.2} {}B", bytes as f64 / div as f64, suffix)
}

/// Pebble error (v1.1)
#[derive(Debug, Serialize)]
pub struct PebbleError {
    pub code: String,
    pub cat: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_s: Option<u32>,
    pub fix: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl PebbleError {
    fn new(code: &str, cat: &str, retryable: bool, retry_after_s: Option<u32>, fix: &[&str], message: &str) -> Self {
        Self {
            code: code.into(),
            cat: cat.into(),
            op: None,
            retryable,
            retry_after_s,
            fix: fix.iter().map(|f| f.to_string()).collect(),
            message: Some(message.into()),
            details: None,
        }
    }

    /// Network error
    pub fn net(code: &str, message: &str) -> Self {
        Self::new(code, "net", true, Some(5), &["proxy", "wait"], message)
    }

    /// Input error
    pub fn input(code: &str, message: &str) -> Self {
        Self::new(code, "in", false, None, &["param"], message)
    }

    /// Auth error
    pub fn auth(code: &str, message: &str) -> Self {
        Self::new(code, "auth", false, None, &["auth"], message)
    }

    /// External service error
    pub fn ext(code: &str, message: &str) -> Self {
        Self::new(code, "ext", false, None, &["report"], message)
    }

    /// System error
    pub fn sys(code: &str, message: &str) -> Self {
        Self::new(code, "sys", false, None, &["report"], message)
    }

    /// Timeout error
    pub fn timeout(code: &str, message: &str, retry_after: u32) -> Self {
        Self::new(code, "time", true, Some(retry_after), &["wait"], message)
    }

    /// Add operation context
    pub fn with_op(mut self, op: &str) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add details
    pub fn with_details<T: Serialize>(mut self, details: T) -> Self {
        self.details = serde_json::to_value(details).ok();
        self
    }

    /// Get exit code based on category
    pub fn exit_code(&self) -> i32 {
        match self.cat.as_str() {
            "in" => 1,
            "auth" => 3,
            "time" => 4,
            _ => 2,
        }
    }
}

impl From<&ApiError> for PebbleError {
    fn from(err: &ApiError) -> Self {
        let message = err.to_string();
        match err {
            ApiError::Build(_) => PebbleError::input("BAD_REQUEST", &message),
            ApiError::Transport(_) if err.is_timeout() => {
                PebbleError::timeout("TIMEOUT", &message, 30)
            }
            ApiError::Transport(_) => PebbleError::net("NETWORK", &message),
            ApiError::Unauthorized => PebbleError::auth("UNAUTHORIZED", &message),
            ApiError::RateLimited => {
                let mut e = PebbleError::ext("RATE_LIMITED", &message);
                e.retryable = true;
                e.retry_after_s = Some(60);
                e.fix = vec!["wait".into()];
                e
            }
            ApiError::MalformedResponse(_) => PebbleError::ext("BAD_RESPONSE", &message),
            ApiError::Api { errors, .. } if !errors.is_empty() => {
                PebbleError::ext("API_ERROR", &message).with_details(errors)
            }
            ApiError::Api { .. } => PebbleError::ext("API_ERROR", &message),
            ApiError::Decode(_) => PebbleError::sys("DECODE_FAILED", &message),
        }
    }
}

/// Map a command failure onto a Pebble error category
pub fn classify(err: &anyhow::Error) -> PebbleError {
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return PebbleError::from(api);
    }
    PebbleError::sys("INTERNAL", &format!("{:#}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn table_pads_to_widest_cell() {
        let rendered = table(
            &["ID", "NAME"],
            &[
                vec!["1".to_string(), "web".to_string()],
                vec!["12345".to_string(), "db".to_string()],
            ],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "ID     NAME");
        assert_eq!(lines[1], "-----------");
        assert_eq!(lines[2], "1      web");
        assert_eq!(lines[3], "12345  db");
    }

    #[test]
    fn key_values_align_labels() {
        let rendered = key_values(&[("ID", "7".to_string()), ("Status", "active".to_string())]);
        assert_eq!(rendered, "ID:     7\nStatus: active\n");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-server-name", 10), "a-very-...");
        assert_eq!(truncate("سرور-اصلی-تهران", 8), "سرور-...");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn api_errors_map_to_exit_codes() {
        assert_eq!(PebbleError::from(&ApiError::Unauthorized).exit_code(), 3);
        assert_eq!(PebbleError::from(&ApiError::Build("bad".into())).exit_code(), 1);

        let limited = PebbleError::from(&ApiError::RateLimited);
        assert_eq!(limited.code, "RATE_LIMITED");
        assert!(limited.retryable);
        assert_eq!(limited.exit_code(), 2);
    }

    #[test]
    fn api_error_keeps_server_message_and_field_errors() {
        let mut errors = BTreeMap::new();
        errors.insert("name".to_string(), "required".to_string());
        let err = ApiError::Api {
            message: "validation failed".into(),
            errors,
        };

        let pebble = PebbleError::from(&err);
        assert_eq!(pebble.message.as_deref(), Some("API error: validation failed"));
        assert_eq!(pebble.details, Some(json!({"name": "required"})));
    }

    #[test]
    fn classify_falls_back_to_internal() {
        let err = anyhow::anyhow!("something odd");
        let pebble = classify(&err);
        assert_eq!(pebble.code, "INTERNAL");
        assert_eq!(pebble.cat, "sys");

        let wrapped = anyhow::Error::new(ApiError::Unauthorized);
        assert_eq!(classify(&wrapped).cat, "auth");
    }
}
