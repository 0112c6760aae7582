//! Page rules: path patterns with per-path rule overrides

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{PageRulesAction, PageRulesCommand};
use crate::output::{truncate, Output, PebbleError};

use super::{domain_path, parse_json_object};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PagePath {
    pub id: u64,
    pub path: String,
    pub priority: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathRule {
    pub id: u64,
    pub path_id: u64,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub settings: Value,
}

#[derive(Debug, Serialize)]
struct PathBody<'a> {
    path: &'a str,
    priority: u32,
}

#[derive(Debug, Serialize)]
struct RuleBody<'a> {
    #[serde(rename = "type")]
    rule_type: &'a str,
    settings: Value,
}

/// `paths` for every rule type, `paths/{type}` otherwise
fn list_path(domain: u64, rule_type: &str) -> String {
    if rule_type.is_empty() || rule_type == "all" {
        domain_path(domain, "paths")
    } else {
        domain_path(domain, &format!("paths/{}", rule_type))
    }
}

pub async fn run(cmd: PageRulesCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        PageRulesAction::List { target, rule_type } => {
            let paths: Vec<PagePath> =
                extract_list(&client.get(&list_path(target.domain, &rule_type)).await?)?;
            out.list(&paths, "No page rules found", &["ID", "PATH", "PRIORITY"], |p| {
                vec![
                    p.id.to_string(),
                    truncate(&p.path, 40),
                    p.priority.to_string(),
                ]
            });
        }
        PageRulesAction::AddPath {
            target,
            path,
            priority,
        } => {
            let created: PagePath = extract(
                &client
                    .post(
                        &domain_path(target.domain, "paths"),
                        &PathBody {
                            path: &path,
                            priority,
                        },
                    )
                    .await?,
            )?;
            out.detail(
                &created,
                &[
                    ("ID", created.id.to_string()),
                    ("Path", created.path.clone()),
                    ("Priority", created.priority.to_string()),
                ],
            );
        }
        PageRulesAction::DeletePath { target, id } => {
            client
                .delete(&domain_path(target.domain, &format!("paths/{}", id)))
                .await?;
            out.done(&format!("Path {} deleted", id));
        }
        PageRulesAction::SetRule {
            target,
            path,
            rule_type,
            settings,
        } => {
            let settings = match parse_json_object("settings", &settings) {
                Ok(v) => v,
                Err(e) => out.error(
                    PebbleError::input("INVALID_JSON", &e.to_string()).with_op("page-rules.set-rule"),
                ),
            };
            client
                .post(
                    &domain_path(target.domain, &format!("paths/{}/rules", path)),
                    &RuleBody {
                        rule_type: &rule_type,
                        settings,
                    },
                )
                .await?;
            out.done(&format!("Rule '{}' set for path {}", rule_type, path));
        }
        PageRulesAction::DeleteRule {
            target,
            path,
            rule_type,
        } => {
            client
                .delete(&domain_path(
                    target.domain,
                    &format!("paths/{}/rules/{}", path, rule_type),
                ))
                .await?;
            out.done(&format!("Rule '{}' deleted from path {}", rule_type, path));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_path_filters_by_type() {
        assert_eq!(list_path(9, "all"), "/v1/cdn/ng/domains/9/paths");
        assert_eq!(list_path(9, "waf"), "/v1/cdn/ng/domains/9/paths/waf");
    }

    #[test]
    fn rule_body_carries_settings_object() {
        let body = RuleBody {
            rule_type: "cache",
            settings: parse_json_object("settings", r#"{"ttl": 600}"#).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"type": "cache", "settings": {"ttl": 600}})
        );
    }

    #[test]
    fn path_rule_keeps_arbitrary_settings() {
        let rule: PathRule = serde_json::from_value(json!({
            "id": 2,
            "path_id": 5,
            "type": "waf",
            "settings": {"mode": "block", "layers": [1, 2]}
        }))
        .unwrap();
        assert_eq!(rule.rule_type, "waf");
        assert_eq!(rule.settings["layers"][1], 2);
    }
}
