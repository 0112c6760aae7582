//! Load balancing clusters (pools) and their backend servers

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{ClusterAction, ClusterArgs, ClusterCommand, ClusterServerAction};
use crate::output::{table, truncate, Mode, Output};
use crate::types::NumericBool;

use super::domain_path;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterPool {
    pub id: u64,
    pub domain_id: u64,
    pub name: String,
    pub port: u16,
    pub description: String,
    pub method: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hash_key: String,
    pub error_reporting: NumericBool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub monitoring_protocol: String,
    pub monitoring_port: u16,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub monitoring_method: String,
    pub monitoring_error_reporting: NumericBool,
    pub servers: Vec<ClusterServer>,
    pub created_at: String,
    pub updated_at: String,
}

impl ClusterPool {
    fn monitoring(&self) -> String {
        if self.monitoring_protocol.is_empty() {
            return "off".to_string();
        }
        let protocol = self.monitoring_protocol.to_lowercase();
        if self.monitoring_port > 0 {
            format!("{}:{}", protocol, self.monitoring_port)
        } else {
            protocol
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterServer {
    pub id: u64,
    pub pool_id: u64,
    pub address: String,
    pub weight: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host_header: String,
    pub port: u16,
    /// -1 marks a backup server
    pub priority: i32,
    pub protocol: String,
}

impl ClusterServer {
    fn role(&self) -> &'static str {
        if self.priority == -1 {
            "backup"
        } else {
            "active"
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Assignment {
    cluster_id: u64,
    cluster_name: String,
    path_id: u64,
    path: String,
}

#[derive(Debug, Serialize)]
struct PoolBody<'a> {
    name: &'a str,
    port: u16,
    method: &'a str,
    description: &'a str,
    error_reporting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash_key: Option<&'a str>,
}

impl<'a> From<&'a ClusterArgs> for PoolBody<'a> {
    fn from(args: &'a ClusterArgs) -> Self {
        Self {
            name: &args.name,
            port: args.port,
            method: &args.method,
            description: &args.description,
            error_reporting: args.error_reporting,
            hash_key: args.hash_key.as_deref().filter(|k| !k.is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ServerBody<'a> {
    address: &'a str,
    port: u16,
    weight: u32,
    priority: u32,
    protocol: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    host_header: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct AssignBody {
    path_id: u64,
}

fn cluster_path(domain: u64, suffix: &str) -> String {
    if suffix.is_empty() {
        domain_path(domain, "cluster")
    } else {
        domain_path(domain, &format!("cluster/{}", suffix))
    }
}

pub async fn run(cmd: ClusterCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        ClusterAction::List { target } => {
            let pools: Vec<ClusterPool> =
                extract_list(&client.get(&cluster_path(target.domain, "")).await?)?;
            show_pools(out, &pools);
        }
        ClusterAction::Assignments { target } => {
            let assignments: Vec<Assignment> =
                extract_list(&client.get(&cluster_path(target.domain, "assignments")).await?)?;
            out.list(
                &assignments,
                "No cluster assignments found",
                &["CLUSTER ID", "CLUSTER NAME", "PATH ID", "PATH"],
                |a| {
                    vec![
                        a.cluster_id.to_string(),
                        truncate(&a.cluster_name, 20),
                        a.path_id.to_string(),
                        truncate(&a.path, 30),
                    ]
                },
            );
        }
        ClusterAction::Add { target, pool } => {
            let created: ClusterPool = extract(
                &client
                    .post(&cluster_path(target.domain, ""), &PoolBody::from(&pool))
                    .await?,
            )?;
            out.detail(
                &created,
                &[
                    ("ID", created.id.to_string()),
                    ("Name", created.name.clone()),
                    ("Method", created.method.clone()),
                ],
            );
        }
        ClusterAction::Update {
            target,
            cluster,
            pool,
        } => {
            client
                .put(
                    &cluster_path(target.domain, &cluster.to_string()),
                    &PoolBody::from(&pool),
                )
                .await?;
            out.done(&format!("Cluster {} updated", cluster));
        }
        ClusterAction::Delete { target, cluster } => {
            client
                .delete(&cluster_path(target.domain, &cluster.to_string()))
                .await?;
            out.done(&format!("Cluster {} deleted", cluster));
        }
        ClusterAction::Assign {
            target,
            cluster,
            path,
        } => {
            client
                .post(
                    &cluster_path(target.domain, &format!("{}/assign", cluster)),
                    &AssignBody { path_id: path },
                )
                .await?;
            out.done(&format!("Cluster {} assigned to path {}", cluster, path));
        }
        ClusterAction::Unassign {
            target,
            cluster,
            path,
        } => {
            client
                .delete(&cluster_path(
                    target.domain,
                    &format!("{}/assign/{}", cluster, path),
                ))
                .await?;
            out.done(&format!("Cluster {} unassigned from path {}", cluster, path));
        }
        ClusterAction::Server(server) => match server.action {
            ClusterServerAction::Add {
                target,
                cluster,
                address,
                port,
                weight,
                priority,
                protocol,
                host_header,
            } => {
                let body = ServerBody {
                    address: &address,
                    port,
                    weight,
                    priority,
                    protocol: &protocol,
                    host_header: host_header.as_deref().filter(|h| !h.is_empty()),
                };
                client
                    .post(
                        &cluster_path(target.domain, &format!("{}/servers", cluster)),
                        &body,
                    )
                    .await?;
                out.done(&format!("Server {} added to cluster {}", address, cluster));
            }
            ClusterServerAction::Delete {
                target,
                cluster,
                server,
            } => {
                client
                    .delete(&cluster_path(
                        target.domain,
                        &format!("{}/servers/{}", cluster, server),
                    ))
                    .await?;
                out.done(&format!("Server {} removed from cluster {}", server, cluster));
            }
        },
    }
    Ok(())
}

/// One block per pool with its servers nested underneath
fn show_pools(out: &Output, pools: &[ClusterPool]) {
    if out.mode() != Mode::Human {
        out.result(pools);
        return;
    }
    if pools.is_empty() {
        println!("No cluster pools found");
        return;
    }

    for pool in pools {
        println!("Pool: {} (ID: {})", pool.name, pool.id);
        println!(
            "  Method: {}  Port: {}  Error Reporting: {}",
            pool.method, pool.port, pool.error_reporting
        );
        println!("  Monitoring: {}", pool.monitoring());
        if !pool.description.is_empty() {
            println!("  Description: {}", pool.description);
        }

        if pool.servers.is_empty() {
            println!("  Servers: (none)");
        } else {
            println!("  Servers:");
            let rows: Vec<Vec<String>> = pool
                .servers
                .iter()
                .map(|s| {
                    vec![
                        s.id.to_string(),
                        s.address.clone(),
                        s.port.to_string(),
                        s.weight.to_string(),
                        s.protocol.clone(),
                        s.role().to_string(),
                    ]
                })
                .collect();
            let rendered = table(
                &["ID", "ADDRESS", "PORT", "WEIGHT", "PROTOCOL", "STATUS"],
                &rows,
            );
            for line in rendered.lines() {
                println!("    {}", line);
            }
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pool_body_skips_empty_hash_key() {
        let args = ClusterArgs {
            name: "web".into(),
            port: 443,
            method: "roundrobin".into(),
            description: String::new(),
            hash_key: Some(String::new()),
            error_reporting: true,
        };
        assert_eq!(
            serde_json::to_value(PoolBody::from(&args)).unwrap(),
            json!({
                "name": "web",
                "port": 443,
                "method": "roundrobin",
                "description": "",
                "error_reporting": true
            })
        );
    }

    #[test]
    fn pool_decodes_monitoring_and_backup_servers() {
        let pool: ClusterPool = serde_json::from_value(json!({
            "id": 4,
            "name": "api",
            "error_reporting": "1",
            "monitoring_protocol": "HTTP",
            "monitoring_port": 8080,
            "servers": [
                {"id": 1, "address": "10.0.0.1", "priority": 1},
                {"id": 2, "address": "10.0.0.2", "priority": -1}
            ]
        }))
        .unwrap();

        assert!(pool.error_reporting.get());
        assert_eq!(pool.monitoring(), "http:8080");
        assert_eq!(pool.servers[0].role(), "active");
        assert_eq!(pool.servers[1].role(), "backup");
    }

    #[test]
    fn monitoring_off_without_protocol() {
        assert_eq!(ClusterPool::default().monitoring(), "off");
    }
}
