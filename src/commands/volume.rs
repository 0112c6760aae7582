//! Block storage volumes

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{VolumeAction, VolumeCommand};
use crate::output::Output;

use super::or_dash;

const VOLUMES: &str = "/v1/cloud/volumes";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Volume {
    pub id: u64,
    pub name: String,
    pub size: u32,
    pub status: String,
    pub server_id: u64,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
struct CreateVolume<'a> {
    name: &'a str,
    size: u32,
    datacenter_id: u64,
}

/// The endpoint expects the volume ID as a string
#[derive(Debug, Serialize)]
struct Attachment {
    volume_id: String,
    server_id: u64,
}

#[derive(Debug, Serialize)]
struct Resize {
    size: u32,
}

pub async fn run(cmd: VolumeCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        VolumeAction::List => {
            let volumes: Vec<Volume> = extract_list(&client.get(VOLUMES).await?)?;
            out.list(
                &volumes,
                "No volumes found",
                &["ID", "NAME", "SIZE", "STATUS", "SERVER"],
                |v| {
                    vec![
                        v.id.to_string(),
                        v.name.clone(),
                        format!("{} GB", v.size),
                        v.status.clone(),
                        attached_to(v),
                    ]
                },
            );
            Ok(())
        }
        VolumeAction::Create {
            name,
            size,
            datacenter,
        } => {
            let body = CreateVolume {
                name: &name,
                size,
                datacenter_id: datacenter,
            };
            let volume: Volume = extract(&client.post(VOLUMES, &body).await?)?;
            out.detail(
                &volume,
                &[
                    ("ID", volume.id.to_string()),
                    ("Name", volume.name.clone()),
                    ("Size", format!("{} GB", volume.size)),
                ],
            );
            Ok(())
        }
        VolumeAction::Get { id } => {
            let volume: Volume = extract(&client.get(&format!("{}/{}", VOLUMES, id)).await?)?;
            out.detail(
                &volume,
                &[
                    ("ID", volume.id.to_string()),
                    ("Name", volume.name.clone()),
                    ("Size", format!("{} GB", volume.size)),
                    ("Status", volume.status.clone()),
                    ("Server", attached_to(&volume)),
                    ("Created", or_dash(&volume.created_at)),
                ],
            );
            Ok(())
        }
        VolumeAction::Delete { id } => {
            client.delete(&format!("{}/{}", VOLUMES, id)).await?;
            out.done(&format!("Volume {} deleted", id));
            Ok(())
        }
        VolumeAction::Attach { id, server } => {
            client
                .post(&format!("{}/attach", VOLUMES), &attachment(id, server))
                .await?;
            out.done(&format!("Volume {} attached to server {}", id, server));
            Ok(())
        }
        VolumeAction::Detach { id, server } => {
            client
                .post(&format!("{}/detach", VOLUMES), &attachment(id, server))
                .await?;
            out.done(&format!("Volume {} detached from server {}", id, server));
            Ok(())
        }
        VolumeAction::Resize { id, size } => {
            client.put(&format!("{}/{}", VOLUMES, id), &Resize { size }).await?;
            out.done(&format!("Volume {} resized to {} GB", id, size));
            Ok(())
        }
    }
}

fn attachment(volume: u64, server: u64) -> Attachment {
    Attachment {
        volume_id: volume.to_string(),
        server_id: server,
    }
}

fn attached_to(volume: &Volume) -> String {
    if volume.server_id == 0 {
        "-".to_string()
    } else {
        volume.server_id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attachment_sends_volume_id_as_string() {
        assert_eq!(
            serde_json::to_value(attachment(5, 9)).unwrap(),
            json!({"volume_id": "5", "server_id": 9})
        );
    }
}
