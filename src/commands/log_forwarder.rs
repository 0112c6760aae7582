//! Log forwarding destinations

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{LogForwarderAction, LogForwarderCommand};
use crate::output::{truncate, Output, PebbleError};
use crate::types::NumericBool;

use super::{domain_path, parse_json_object, yes_no};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogForwarder {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub forwarder_type: String,
    pub endpoint: String,
    pub enabled: NumericBool,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
struct ForwarderBody<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    forwarder_type: &'a str,
    endpoint: &'a str,
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<Value>,
}

#[derive(Debug, Serialize)]
struct ForwarderUpdate<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<&'a str>,
    enabled: bool,
}

pub async fn run(cmd: LogForwarderCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        LogForwarderAction::List { target } => {
            let forwarders: Vec<LogForwarder> =
                extract_list(&client.get(&domain_path(target.domain, "log-forwarders")).await?)?;
            out.list(
                &forwarders,
                "No log forwarders configured",
                &["ID", "NAME", "TYPE", "ENDPOINT", "ENABLED"],
                |f| {
                    vec![
                        f.id.to_string(),
                        truncate(&f.name, 20),
                        f.forwarder_type.clone(),
                        truncate(&f.endpoint, 35),
                        yes_no(f.enabled.get()).to_string(),
                    ]
                },
            );
        }
        LogForwarderAction::Add {
            target,
            name,
            forwarder_type,
            endpoint,
            switch,
            config,
        } => {
            let config = match config.as_deref().map(|raw| parse_json_object("config", raw)) {
                None => None,
                Some(Ok(v)) => Some(v),
                Some(Err(e)) => out.error(
                    PebbleError::input("INVALID_JSON", &e.to_string()).with_op("log-forwarder.add"),
                ),
            };
            let body = ForwarderBody {
                name: &name,
                forwarder_type: &forwarder_type,
                endpoint: &endpoint,
                enabled: switch.enabled,
                config,
            };
            let created: LogForwarder = extract(
                &client
                    .post(&domain_path(target.domain, "log-forwarders"), &body)
                    .await?,
            )?;
            out.detail(
                &created,
                &[
                    ("ID", created.id.to_string()),
                    ("Name", created.name.clone()),
                    ("Type", created.forwarder_type.clone()),
                ],
            );
        }
        LogForwarderAction::Update {
            target,
            forwarder,
            name,
            endpoint,
            switch,
        } => {
            let body = ForwarderUpdate {
                name: name.as_deref().filter(|n| !n.is_empty()),
                endpoint: endpoint.as_deref().filter(|e| !e.is_empty()),
                enabled: switch.enabled,
            };
            client
                .put(
                    &domain_path(target.domain, &format!("log-forwarders/{}", forwarder)),
                    &body,
                )
                .await?;
            out.done(&format!("Log forwarder {} updated", forwarder));
        }
        LogForwarderAction::Delete { target, id } => {
            client
                .delete(&domain_path(target.domain, &format!("log-forwarders/{}", id)))
                .await?;
            out.done(&format!("Log forwarder {} deleted", id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_sends_only_given_fields() {
        let body = ForwarderUpdate {
            name: None,
            endpoint: Some("https://logs.example.com"),
            enabled: false,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"endpoint": "https://logs.example.com", "enabled": false})
        );
    }

    #[test]
    fn add_body_omits_missing_config() {
        let body = ForwarderBody {
            name: "es",
            forwarder_type: "elasticsearch",
            endpoint: "https://es:9200",
            enabled: true,
            config: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["type"], "elasticsearch");
        assert!(value.get("config").is_none());
    }

    #[test]
    fn forwarder_decodes_string_flags() {
        let f: LogForwarder = serde_json::from_value(json!({
            "id": 3,
            "name": "hook",
            "type": "http",
            "enabled": "0"
        }))
        .unwrap();
        assert!(!f.enabled.get());
        assert_eq!(f.forwarder_type, "http");
    }
}
