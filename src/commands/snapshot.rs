//! Server snapshots

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{SnapshotAction, SnapshotCommand};
use crate::output::Output;

use super::or_dash;

const SNAPSHOTS: &str = "/v1/cloud/snapshots";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub id: u64,
    pub name: String,
    pub size: u32,
    pub status: String,
    pub server_id: u64,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
struct CreateSnapshot<'a> {
    name: &'a str,
    server_id: u64,
}

pub async fn run(cmd: SnapshotCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        SnapshotAction::List => {
            let snapshots: Vec<Snapshot> = extract_list(&client.get(SNAPSHOTS).await?)?;
            out.list(
                &snapshots,
                "No snapshots found",
                &["ID", "NAME", "SIZE", "STATUS", "SERVER", "CREATED"],
                |s| {
                    vec![
                        s.id.to_string(),
                        s.name.clone(),
                        format!("{} GB", s.size),
                        s.status.clone(),
                        s.server_id.to_string(),
                        or_dash(&s.created_at),
                    ]
                },
            );
            Ok(())
        }
        SnapshotAction::Create { name, server } => {
            out.log("info", &format!("Snapshotting server {}", server));
            let body = CreateSnapshot {
                name: &name,
                server_id: server,
            };
            let snapshot: Snapshot = extract(&client.post(SNAPSHOTS, &body).await?)?;
            out.detail(
                &snapshot,
                &[
                    ("ID", snapshot.id.to_string()),
                    ("Name", snapshot.name.clone()),
                    ("Status", snapshot.status.clone()),
                ],
            );
            Ok(())
        }
        SnapshotAction::Get { id } => {
            let snapshot: Snapshot =
                extract(&client.get(&format!("{}/{}", SNAPSHOTS, id)).await?)?;
            out.detail(
                &snapshot,
                &[
                    ("ID", snapshot.id.to_string()),
                    ("Name", snapshot.name.clone()),
                    ("Size", format!("{} GB", snapshot.size)),
                    ("Status", snapshot.status.clone()),
                    ("Server", snapshot.server_id.to_string()),
                    ("Created", or_dash(&snapshot.created_at)),
                ],
            );
            Ok(())
        }
        SnapshotAction::Delete { id } => {
            client.delete(&format!("{}/{}", SNAPSHOTS, id)).await?;
            out.done(&format!("Snapshot {} deleted", id));
            Ok(())
        }
    }
}
