//! Cloud firewalls and their rules

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{FirewallAction, FirewallCommand, FirewallRuleAction};
use crate::output::Output;

const FIREWALLS: &str = "/v1/cloud/firewall";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Firewall {
    pub id: u64,
    pub name: String,
    pub rules: Vec<FirewallRule>,
    pub servers: Vec<u64>,
    pub created_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FirewallRule {
    pub id: u64,
    pub direction: String,
    pub protocol: String,
    pub port_min: u16,
    pub port_max: u16,
    pub remote_ip: String,
}

#[derive(Debug, Serialize)]
struct CreateFirewall<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct AddRule<'a> {
    firewall_id: u64,
    direction: &'a str,
    protocol: &'a str,
    port_min: u16,
    port_max: u16,
    remote_ip: &'a str,
}

#[derive(Debug, Serialize)]
struct Binding {
    firewall_id: u64,
    server_id: u64,
}

pub async fn run(cmd: FirewallCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        FirewallAction::List => {
            let firewalls: Vec<Firewall> = extract_list(&client.get(FIREWALLS).await?)?;
            out.list(
                &firewalls,
                "No firewalls found",
                &["ID", "NAME", "RULES", "SERVERS"],
                |f| {
                    vec![
                        f.id.to_string(),
                        f.name.clone(),
                        f.rules.len().to_string(),
                        f.servers.len().to_string(),
                    ]
                },
            );
            Ok(())
        }
        FirewallAction::Create { name } => {
            let firewall: Firewall =
                extract(&client.post(FIREWALLS, &CreateFirewall { name: &name }).await?)?;
            out.detail(
                &firewall,
                &[("ID", firewall.id.to_string()), ("Name", firewall.name.clone())],
            );
            Ok(())
        }
        FirewallAction::Delete { id } => {
            client.delete(&format!("{}/{}", FIREWALLS, id)).await?;
            out.done(&format!("Firewall {} deleted", id));
            Ok(())
        }
        FirewallAction::Rule(rule) => match rule.action {
            FirewallRuleAction::Add {
                firewall,
                direction,
                protocol,
                port_min,
                port_max,
                remote_ip,
            } => {
                let body = AddRule {
                    firewall_id: firewall,
                    direction: &direction,
                    protocol: &protocol,
                    port_min,
                    port_max: port_max.unwrap_or(port_min),
                    remote_ip: &remote_ip,
                };
                client.post(&format!("{}/rule", FIREWALLS), &body).await?;
                out.done(&format!(
                    "Rule added to firewall {}: {} {} {}",
                    firewall,
                    direction,
                    protocol,
                    port_range(body.port_min, body.port_max)
                ));
                Ok(())
            }
            FirewallRuleAction::Delete { id } => {
                client.delete(&format!("{}/rule/{}", FIREWALLS, id)).await?;
                out.done(&format!("Firewall rule {} deleted", id));
                Ok(())
            }
        },
        FirewallAction::Attach { id, server } => {
            let body = Binding {
                firewall_id: id,
                server_id: server,
            };
            client.post(&format!("{}/attach", FIREWALLS), &body).await?;
            out.done(&format!("Firewall {} attached to server {}", id, server));
            Ok(())
        }
        FirewallAction::Detach { id, server } => {
            let body = Binding {
                firewall_id: id,
                server_id: server,
            };
            client.post(&format!("{}/detach", FIREWALLS), &body).await?;
            out.done(&format!("Firewall {} detached from server {}", id, server));
            Ok(())
        }
    }
}

fn port_range(min: u16, max: u16) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{}-{}", min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_ranges() {
        assert_eq!(port_range(22, 22), "22");
        assert_eq!(port_range(5000, 5100), "5000-5100");
    }
}
