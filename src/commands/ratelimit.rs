//! Rate limiting

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, ApiClient};
use crate::cli::{RatelimitAction, RatelimitCommand};
use crate::output::Output;
use crate::types::NumericBool;

use super::{domain_path, on_off};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub domain_id: u64,
    pub enabled: NumericBool,
    pub limit: u32,
    pub block: u32,
    pub allow_methods: Vec<String>,
    pub whitelist: Vec<String>,
    pub allow_countries: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Full settings; the endpoint replaces everything on each write
#[derive(Debug, Serialize, PartialEq)]
struct RateLimitBody {
    mode: bool,
    request_count: u32,
    block_time: u32,
    methods: Vec<String>,
    ips: Vec<String>,
    countries: Vec<String>,
}

impl RateLimitBody {
    /// Current settings with rate limiting switched off
    fn disabled_from(current: RateLimitSettings) -> Self {
        Self {
            mode: false,
            request_count: current.limit,
            block_time: current.block,
            methods: current.allow_methods,
            ips: current.whitelist,
            countries: current.allow_countries,
        }
    }
}

fn joined_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

pub async fn run(cmd: RatelimitCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        RatelimitAction::Status { target } => {
            let s: RateLimitSettings =
                extract(&client.get(&domain_path(target.domain, "ratelimit")).await?)?;
            out.detail(
                &s,
                &[
                    ("Enabled", s.enabled.to_string()),
                    ("Request Limit", format!("{} req/s", s.limit)),
                    ("Block Duration", format!("{} seconds", s.block)),
                    ("Allowed Methods", joined_or(&s.allow_methods, "(all)")),
                    ("Whitelisted IPs", joined_or(&s.whitelist, "(none)")),
                    ("Allowed Countries", joined_or(&s.allow_countries, "(all)")),
                ],
            );
        }
        RatelimitAction::Set {
            target,
            switch,
            request_count,
            block_time,
            methods,
            ips,
            countries,
        } => {
            let body = RateLimitBody {
                mode: switch.enabled,
                request_count,
                block_time,
                methods,
                ips,
                countries,
            };
            client
                .post(&domain_path(target.domain, "ratelimit"), &body)
                .await?;
            out.done(&format!(
                "Rate limiting {}: {} req/s, block {} seconds",
                on_off(body.mode),
                body.request_count,
                body.block_time
            ));
        }
        RatelimitAction::Enable {
            target,
            request_count,
            block_time,
        } => {
            let body = RateLimitBody {
                mode: true,
                request_count,
                block_time,
                methods: Vec::new(),
                ips: Vec::new(),
                countries: Vec::new(),
            };
            client
                .post(&domain_path(target.domain, "ratelimit"), &body)
                .await?;
            out.done(&format!(
                "Rate limiting enabled: {} req/s, block {} seconds",
                request_count, block_time
            ));
        }
        RatelimitAction::Disable { target } => {
            let path = domain_path(target.domain, "ratelimit");
            out.log("debug", "Reading current rate limit settings");
            let current: RateLimitSettings = extract(&client.get(&path).await?)?;
            client
                .post(&path, &RateLimitBody::disabled_from(current))
                .await?;
            out.done("Rate limiting disabled");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disable_keeps_current_limits_and_whitelists() {
        let envelope = crate::api::Envelope {
            success: true,
            message: String::new(),
            data: json!({
                "domain_id": 12,
                "enabled": 1,
                "limit": 250,
                "block": 90,
                "allow_methods": ["GET"],
                "whitelist": ["10.0.0.1"],
                "allow_countries": null
            }),
        };
        let current: RateLimitSettings = extract(&envelope).unwrap();

        let body = RateLimitBody::disabled_from(current);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "mode": false,
                "request_count": 250,
                "block_time": 90,
                "methods": ["GET"],
                "ips": ["10.0.0.1"],
                "countries": []
            })
        );
    }

    #[test]
    fn disable_on_unconfigured_domain_sends_zeroed_settings() {
        let envelope = crate::api::Envelope {
            success: true,
            message: String::new(),
            data: serde_json::Value::Null,
        };
        let current: RateLimitSettings = extract(&envelope).unwrap();

        let body = RateLimitBody::disabled_from(current);
        assert!(!body.mode);
        assert_eq!(body.request_count, 0);
        assert!(body.methods.is_empty());
    }

    #[test]
    fn empty_lists_render_placeholder() {
        assert_eq!(joined_or(&[], "(all)"), "(all)");
        assert_eq!(joined_or(&["GET".into(), "POST".into()], "(all)"), "GET, POST");
    }
}
