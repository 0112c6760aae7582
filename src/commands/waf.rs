//! Web application firewall

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{WafAction, WafCommand, WafGroupsAction, WafRulesAction};
use crate::output::{truncate, Output};
use crate::types::NumericBool;

use super::{domain_path, on_off, or_dash, yes_no};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WafStatus {
    enabled: NumericBool,
    mode: String,
}

/// Layers, rules and groups share this shape; IDs are strings
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WafItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: NumericBool,
}

#[derive(Debug, Serialize)]
struct WafUpdate<'a> {
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SwitchRule<'a> {
    rule_id: &'a str,
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct SwitchGroup<'a> {
    group_id: &'a str,
    enabled: bool,
}

fn waf_path(domain: u64, suffix: &str) -> String {
    if suffix.is_empty() {
        domain_path(domain, "waf")
    } else {
        domain_path(domain, &format!("waf/{}", suffix))
    }
}

fn show_items(out: &Output, items: &[WafItem], empty: &str) {
    out.list(items, empty, &["ID", "NAME", "ENABLED"], |item| {
        vec![
            item.id.clone(),
            truncate(&item.name, 30),
            yes_no(item.enabled.get()).to_string(),
        ]
    });
}

pub async fn run(cmd: WafCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        WafAction::Status { target } => {
            let status: WafStatus = extract(&client.get(&waf_path(target.domain, "")).await?)?;
            out.detail(
                &status,
                &[
                    ("WAF Status", on_off(status.enabled.get()).to_string()),
                    ("Mode", or_dash(&status.mode)),
                ],
            );
        }
        WafAction::Enable { target, mode } => {
            let body = WafUpdate {
                enabled: true,
                mode: Some(&mode),
            };
            client.put(&waf_path(target.domain, ""), &body).await?;
            out.done(&format!("WAF enabled (mode: {})", mode));
        }
        WafAction::Disable { target } => {
            let body = WafUpdate {
                enabled: false,
                mode: None,
            };
            client.put(&waf_path(target.domain, ""), &body).await?;
            out.done("WAF disabled");
        }
        WafAction::Layers { target } => {
            let layers: Vec<WafItem> =
                extract_list(&client.get(&waf_path(target.domain, "layers")).await?)?;
            show_items(out, &layers, "No WAF layers found");
        }
        WafAction::Rules(rules) => match rules.action {
            WafRulesAction::List { target } => {
                let rules: Vec<WafItem> =
                    extract_list(&client.get(&waf_path(target.domain, "rules")).await?)?;
                show_items(out, &rules, "No WAF rules found");
            }
            WafRulesAction::Disabled { target } => {
                let rules: Vec<WafItem> = extract_list(
                    &client
                        .get(&waf_path(target.domain, "disabled-rules"))
                        .await?,
                )?;
                out.list(&rules, "No disabled rules", &["ID", "NAME"], |r| {
                    vec![r.id.clone(), truncate(&r.name, 40)]
                });
            }
            WafRulesAction::Toggle {
                target,
                rule,
                switch,
            } => {
                let body = SwitchRule {
                    rule_id: &rule,
                    enabled: switch.enabled,
                };
                client
                    .put(&waf_path(target.domain, "switch-rule"), &body)
                    .await?;
                out.done(&format!("WAF rule {} {}", rule, on_off(switch.enabled)));
            }
        },
        WafAction::Groups(groups) => match groups.action {
            WafGroupsAction::Toggle {
                target,
                group,
                switch,
            } => {
                let body = SwitchGroup {
                    group_id: &group,
                    enabled: switch.enabled,
                };
                client
                    .put(&waf_path(target.domain, "switch-group"), &body)
                    .await?;
                out.done(&format!("WAF group {} {}", group, on_off(switch.enabled)));
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn disable_sends_only_enabled() {
        let body = WafUpdate {
            enabled: false,
            mode: None,
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"enabled": false}));
    }

    #[test]
    fn waf_paths() {
        assert_eq!(waf_path(3, ""), "/v1/cdn/ng/domains/3/waf");
        assert_eq!(waf_path(3, "switch-rule"), "/v1/cdn/ng/domains/3/waf/switch-rule");
    }
}
