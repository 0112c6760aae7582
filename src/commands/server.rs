//! Cloud server commands

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{RescueAction, ServerAction, ServerCommand};
use crate::output::{truncate, Output};

use super::or_dash;

const SERVERS: &str = "/v1/cloud/servers";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub cpu: u32,
    pub ram: u32,
    pub storage: u32,
    pub os: String,
    pub public_ip: String,
    pub private_ip: String,
    pub datacenter_id: u64,
    pub created_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ServerLog {
    action: String,
    status: String,
    created_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Vnc {
    url: String,
}

#[derive(Debug, Serialize)]
struct CreateServer {
    name: String,
    os: String,
    cpu: u32,
    ram: u32,
    storage: u32,
    datacenter_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    ssh_key_id: Option<u64>,
}

#[derive(Debug, Serialize)]
struct Rename<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Rebuild<'a> {
    os: &'a str,
}

pub async fn run(cmd: ServerCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        ServerAction::List => list(client, out).await,
        ServerAction::Create {
            name,
            os,
            cpu,
            ram,
            storage,
            datacenter,
            ssh_key,
        } => {
            let body = CreateServer {
                name,
                os,
                cpu,
                ram,
                storage,
                datacenter_id: datacenter,
                ssh_key_id: ssh_key,
            };
            create(client, &body, out).await
        }
        ServerAction::Get { id } => get(client, id, out).await,
        ServerAction::Delete { id } => {
            client.delete(&format!("{}/{}", SERVERS, id)).await?;
            out.done(&format!("Server {} deleted", id));
            Ok(())
        }
        ServerAction::Power { action, id } => {
            out.log("info", &format!("Power {} server {}", action.as_str(), id));
            client
                .put_empty(&format!("{}/{}/power/{}", SERVERS, id, action.as_str()))
                .await?;
            out.done(&format!("Power {} sent to server {}", action.as_str(), id));
            Ok(())
        }
        ServerAction::Rename { id, name } => {
            client
                .post(&format!("{}/{}/rename", SERVERS, id), &Rename { name: &name })
                .await?;
            out.done(&format!("Server {} renamed to {}", id, name));
            Ok(())
        }
        ServerAction::Vnc { id } => {
            let vnc: Vnc = extract(&client.get(&format!("{}/{}/access/vnc", SERVERS, id)).await?)?;
            out.detail(&vnc, &[("VNC URL", vnc.url.clone())]);
            Ok(())
        }
        ServerAction::Logs { id } => logs(client, id, out).await,
        ServerAction::Reports { id } => {
            let envelope = client.get(&format!("{}/{}/reports", SERVERS, id)).await?;
            out.raw(&envelope.data);
            Ok(())
        }
        ServerAction::Rebuild { id, os } => {
            out.log("warn", &format!("Rebuilding server {} erases its disk", id));
            client
                .put(&format!("{}/{}/rebuild/software", SERVERS, id), &Rebuild { os: &os })
                .await?;
            out.done(&format!("Server {} is being rebuilt with {}", id, os));
            Ok(())
        }
        ServerAction::Rescue { action, id } => {
            let (path, message) = match action {
                RescueAction::Enable => ("rescue", "enabled"),
                RescueAction::Disable => ("unrescue", "disabled"),
            };
            client.post_empty(&format!("{}/{}/{}", SERVERS, id, path)).await?;
            out.done(&format!("Rescue mode {} for server {}", message, id));
            Ok(())
        }
    }
}

async fn list(client: &ApiClient, out: &Output) -> Result<()> {
    let servers: Vec<Server> = extract_list(&client.get(SERVERS).await?)?;
    out.list(
        &servers,
        "No servers found",
        &["ID", "NAME", "STATUS", "CPU", "RAM", "IP", "OS"],
        |s| {
            vec![
                s.id.to_string(),
                truncate(&s.name, 20),
                s.status.clone(),
                s.cpu.to_string(),
                format!("{}MB", s.ram),
                or_dash(&s.public_ip),
                truncate(&s.os, 15),
            ]
        },
    );
    Ok(())
}

async fn create(client: &ApiClient, body: &CreateServer, out: &Output) -> Result<()> {
    out.log("info", &format!("Creating server {}", body.name));
    let server: Server = extract(&client.post(SERVERS, body).await?)?;
    out.detail(
        &server,
        &[
            ("ID", server.id.to_string()),
            ("Name", server.name.clone()),
            ("Status", server.status.clone()),
        ],
    );
    Ok(())
}

async fn get(client: &ApiClient, id: u64, out: &Output) -> Result<()> {
    let server: Server = extract(&client.get(&format!("{}/{}", SERVERS, id)).await?)?;
    out.detail(
        &server,
        &[
            ("ID", server.id.to_string()),
            ("Name", server.name.clone()),
            ("Status", server.status.clone()),
            ("CPU", format!("{} cores", server.cpu)),
            ("RAM", format!("{} MB", server.ram)),
            ("Storage", format!("{} GB", server.storage)),
            ("OS", or_dash(&server.os)),
            ("Public IP", or_dash(&server.public_ip)),
            ("Private IP", or_dash(&server.private_ip)),
            ("Datacenter", server.datacenter_id.to_string()),
            ("Created", or_dash(&server.created_at)),
        ],
    );
    Ok(())
}

async fn logs(client: &ApiClient, id: u64, out: &Output) -> Result<()> {
    let logs: Vec<ServerLog> =
        extract_list(&client.get(&format!("{}/{}/logs", SERVERS, id)).await?)?;
    out.list(&logs, "No logs found", &["ACTION", "STATUS", "TIME"], |l| {
        vec![l.action.clone(), l.status.clone(), l.created_at.clone()]
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_body_omits_missing_ssh_key() {
        let body = CreateServer {
            name: "web-1".into(),
            os: "ubuntu-22.04".into(),
            cpu: 1,
            ram: 1024,
            storage: 20,
            datacenter_id: 1,
            ssh_key_id: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "name": "web-1",
                "os": "ubuntu-22.04",
                "cpu": 1,
                "ram": 1024,
                "storage": 20,
                "datacenter_id": 1
            })
        );
    }

    #[test]
    fn server_decodes_with_missing_fields() {
        let server: Server =
            serde_json::from_value(json!({"id": 7, "name": "db", "status": "active"})).unwrap();
        assert_eq!(server.id, 7);
        assert_eq!(server.public_ip, "");
    }
}
