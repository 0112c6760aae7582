//! Command handlers, one module per command group

use serde::Serialize;

pub mod access_rules;
pub mod auth;
pub mod cache;
pub mod cluster;
pub mod custom_pages;
pub mod ddos;
pub mod dns;
pub mod domain;
pub mod firewall;
pub mod log_forwarder;
pub mod network;
pub mod page_rules;
pub mod plan;
pub mod ratelimit;
pub mod server;
pub mod snapshot;
pub mod ssh_key;
pub mod ssl;
pub mod ticket;
pub mod volume;
pub mod waf;

/// `/v1/cdn/ng/domains/{id}` plus an optional suffix
pub(crate) fn domain_path(domain: u64, suffix: &str) -> String {
    if suffix.is_empty() {
        format!("/v1/cdn/ng/domains/{}", domain)
    } else {
        format!("/v1/cdn/ng/domains/{}/{}", domain, suffix.trim_start_matches('/'))
    }
}

/// `{"enabled": bool}`
#[derive(Debug, Serialize)]
pub(crate) struct Toggle {
    pub enabled: bool,
}

/// `{"ttl": seconds}`
#[derive(Debug, Serialize)]
pub(crate) struct TtlBody {
    pub ttl: u32,
}

pub(crate) fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// "-" for empty cells
pub(crate) fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Parse a `--settings`/`--config` flag into a JSON object
pub(crate) fn parse_json_object(flag: &str, raw: &str) -> anyhow::Result<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("invalid JSON in --{}: {}", flag, e))?;
    if !value.is_object() {
        anyhow::bail!("--{} must be a JSON object", flag);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_paths() {
        assert_eq!(domain_path(12, ""), "/v1/cdn/ng/domains/12");
        assert_eq!(domain_path(12, "dns"), "/v1/cdn/ng/domains/12/dns");
        assert_eq!(domain_path(12, "/https/ssl"), "/v1/cdn/ng/domains/12/https/ssl");
    }

    #[test]
    fn json_flags_must_be_objects() {
        assert!(parse_json_object("settings", r#"{"ttl": 60}"#).is_ok());
        assert!(parse_json_object("settings", "[1, 2]").is_err());
        assert!(parse_json_object("settings", "{oops").is_err());
    }

    #[test]
    fn decoded_flags_render_as_yes_no() {
        let flag: crate::types::NumericBool = serde_json::from_str("\"1\"").unwrap();
        assert_eq!(yes_no(flag.get()), "Yes");
        assert_eq!(yes_no(false), "No");
    }
}
