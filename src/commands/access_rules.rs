//! IP and country access rules

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, ApiClient};
use crate::cli::{AccessRulesAction, AccessRulesCommand};
use crate::output::{table, Mode, Output};

use super::domain_path;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessRule {
    pub id: u64,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub value: String,
    pub action: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct AccessRules {
    ip_rules: Vec<AccessRule>,
    country_rules: Vec<AccessRule>,
}

/// Every change goes through one endpoint; `action: "remove"` deletes
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RuleChange<'a> {
    Ip { ip: &'a str, action: &'a str },
    Country { country: &'a str, action: &'a str },
}

const REMOVE: &str = "remove";

pub async fn run(cmd: AccessRulesCommand, client: &ApiClient, out: &Output) -> Result<()> {
    let (domain, change, message) = match &cmd.action {
        AccessRulesAction::Status { target } => {
            let rules: AccessRules =
                extract(&client.get(&domain_path(target.domain, "firewall")).await?)?;
            show(out, &rules);
            return Ok(());
        }
        AccessRulesAction::AddIp { target, ip, action } => (
            target.domain,
            RuleChange::Ip { ip, action },
            format!("IP rule added: {} -> {}", ip, action),
        ),
        AccessRulesAction::RemoveIp { target, ip } => (
            target.domain,
            RuleChange::Ip { ip, action: REMOVE },
            format!("IP rule removed: {}", ip),
        ),
        AccessRulesAction::AddCountry {
            target,
            country,
            action,
        } => (
            target.domain,
            RuleChange::Country { country, action },
            format!("Country rule added: {} -> {}", country, action),
        ),
        AccessRulesAction::RemoveCountry { target, country } => (
            target.domain,
            RuleChange::Country {
                country,
                action: REMOVE,
            },
            format!("Country rule removed: {}", country),
        ),
    };

    client.post(&domain_path(domain, "firewall"), &change).await?;
    out.done(&message);
    Ok(())
}

fn show(out: &Output, rules: &AccessRules) {
    if out.mode() != Mode::Human {
        out.result(rules);
        return;
    }

    let section = |title: &str, value_col: &str, items: &[AccessRule]| {
        println!("{}:", title);
        if items.is_empty() {
            println!("  (none)");
            return;
        }
        let rows: Vec<Vec<String>> = items
            .iter()
            .map(|r| vec![r.id.to_string(), r.value.clone(), r.action.clone()])
            .collect();
        for line in table(&["ID", value_col, "ACTION"], &rows).lines() {
            println!("  {}", line);
        }
    };

    section("IP Rules", "IP/CIDR", &rules.ip_rules);
    println!();
    section("Country Rules", "COUNTRY", &rules.country_rules);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rule_changes_are_tagged_by_type() {
        let add = RuleChange::Ip {
            ip: "10.0.0.0/8",
            action: "block",
        };
        assert_eq!(
            serde_json::to_value(&add).unwrap(),
            json!({"type": "ip", "ip": "10.0.0.0/8", "action": "block"})
        );

        let remove = RuleChange::Country {
            country: "DE",
            action: REMOVE,
        };
        assert_eq!(
            serde_json::to_value(&remove).unwrap(),
            json!({"type": "country", "country": "DE", "action": "remove"})
        );
    }

    #[test]
    fn rules_decode_with_missing_sections() {
        let rules: AccessRules =
            serde_json::from_value(json!({"ip_rules": [{"id": 1, "type": "ip", "value": "1.2.3.4", "action": "allow"}]}))
                .unwrap();
        assert_eq!(rules.ip_rules.len(), 1);
        assert!(rules.country_rules.is_empty());
    }
}
