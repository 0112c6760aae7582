//! DDoS protection

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, ApiClient};
use crate::cli::{DdosAction, DdosCommand};
use crate::output::{Output, PebbleError};
use crate::types::NumericBool;

use super::{domain_path, or_dash, TtlBody};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DdosSettings {
    pub mode: String,
    pub captcha_module: String,
    pub cookie_ttl: u32,
    pub js_ttl: u32,
    pub captcha_ttl: u32,
    pub under_attack: NumericBool,
    pub js_challenge: NumericBool,
    pub captcha_challenge: NumericBool,
}

#[derive(Debug, Serialize)]
struct ModeBody<'a> {
    mode: &'a str,
}

#[derive(Debug, Serialize)]
struct CaptchaModule<'a> {
    module: &'a str,
}

/// Accepted protection modes with their descriptions
const MODES: [(&str, &str); 4] = [
    ("off", "Protection disabled"),
    ("normal", "Standard protection"),
    ("high", "High protection"),
    ("under_attack", "Maximum protection (Under Attack mode)"),
];

fn describe_mode(mode: &str) -> Option<&'static str> {
    MODES.iter().find(|(m, _)| *m == mode).map(|(_, d)| *d)
}

pub async fn run(cmd: DdosCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        DdosAction::Status { target } => {
            let s: DdosSettings = extract(&client.get(&domain_path(target.domain, "ddos")).await?)?;
            out.detail(
                &s,
                &[
                    ("Mode", or_dash(&s.mode)),
                    ("Under Attack", s.under_attack.to_string()),
                    ("JS Challenge", s.js_challenge.to_string()),
                    ("Captcha Challenge", s.captcha_challenge.to_string()),
                    ("Captcha Module", or_dash(&s.captcha_module)),
                    ("Cookie TTL", format!("{} seconds", s.cookie_ttl)),
                    ("JS TTL", format!("{} seconds", s.js_ttl)),
                    ("Captcha TTL", format!("{} seconds", s.captcha_ttl)),
                ],
            );
        }
        DdosAction::Mode { target, mode } => {
            let Some(description) = describe_mode(&mode) else {
                out.error(
                    PebbleError::input(
                        "INVALID_MODE",
                        "mode must be one of: off, normal, high, under_attack",
                    )
                    .with_op("ddos.mode"),
                );
            };
            client
                .post(&domain_path(target.domain, "ddos"), &ModeBody { mode: &mode })
                .await?;
            out.done(&format!("DDoS protection mode set to {} ({})", mode, description));
        }
        DdosAction::Captcha { target, module } => {
            client
                .post(
                    &domain_path(target.domain, "ddos/captcha-module"),
                    &CaptchaModule { module: &module },
                )
                .await?;
            out.done(&format!("Captcha module set to {}", module));
        }
        DdosAction::Ttl {
            challenge,
            target,
            ttl,
        } => {
            client
                .post(
                    &domain_path(target.domain, &format!("ddos/set-ttl/{}", challenge.as_str())),
                    &TtlBody { ttl },
                )
                .await?;
            out.done(&format!(
                "{} challenge TTL set to {} seconds",
                challenge.as_str(),
                ttl
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_modes_have_descriptions() {
        assert_eq!(describe_mode("high"), Some("High protection"));
        assert!(describe_mode("under_attack").is_some());
        assert!(describe_mode("extreme").is_none());
    }
}
