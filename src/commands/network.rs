//! Private networks

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{NetworkAction, NetworkCommand};
use crate::output::Output;

use super::or_dash;

const NETWORKS: &str = "/v1/cloud/private-networks";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    pub id: u64,
    pub name: String,
    pub cidr: String,
    pub gateway: String,
    pub servers: Vec<u64>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
struct CreateNetwork<'a> {
    name: &'a str,
    cidr: &'a str,
    datacenter_id: u64,
}

#[derive(Debug, Serialize)]
struct Membership<'a> {
    network_id: u64,
    server_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip: Option<&'a str>,
}

pub async fn run(cmd: NetworkCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        NetworkAction::List => {
            let networks: Vec<Network> = extract_list(&client.get(NETWORKS).await?)?;
            out.list(
                &networks,
                "No private networks found",
                &["ID", "NAME", "CIDR", "GATEWAY", "SERVERS"],
                |n| {
                    vec![
                        n.id.to_string(),
                        n.name.clone(),
                        n.cidr.clone(),
                        or_dash(&n.gateway),
                        n.servers.len().to_string(),
                    ]
                },
            );
            Ok(())
        }
        NetworkAction::Create {
            name,
            cidr,
            datacenter,
        } => {
            let body = CreateNetwork {
                name: &name,
                cidr: &cidr,
                datacenter_id: datacenter,
            };
            let network: Network = extract(&client.post(NETWORKS, &body).await?)?;
            out.detail(
                &network,
                &[
                    ("ID", network.id.to_string()),
                    ("Name", network.name.clone()),
                    ("CIDR", network.cidr.clone()),
                ],
            );
            Ok(())
        }
        NetworkAction::Delete { id } => {
            client.delete(&format!("{}/{}", NETWORKS, id)).await?;
            out.done(&format!("Private network {} deleted", id));
            Ok(())
        }
        NetworkAction::Attach { id, server, ip } => {
            let body = Membership {
                network_id: id,
                server_id: server,
                ip: ip.as_deref().filter(|ip| !ip.is_empty()),
            };
            client.post(&format!("{}/attach", NETWORKS), &body).await?;
            out.done(&format!("Server {} attached to network {}", server, id));
            Ok(())
        }
        NetworkAction::Detach { id, server } => {
            let body = Membership {
                network_id: id,
                server_id: server,
                ip: None,
            };
            client.post(&format!("{}/detach", NETWORKS), &body).await?;
            out.done(&format!("Server {} detached from network {}", server, id));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn membership_ip_is_optional() {
        let body = Membership {
            network_id: 2,
            server_id: 8,
            ip: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"network_id": 2, "server_id": 8})
        );
    }
}
