//! SSH keys

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{SshKeyAction, SshKeyCommand};
use crate::output::{truncate, Output};

use super::or_dash;

const SSH_KEYS: &str = "/v1/cloud/ssh";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SshKey {
    pub id: u64,
    pub name: String,
    pub fingerprint: String,
    pub public_key: String,
    pub created_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct GeneratedKey {
    id: u64,
    public_key: String,
    private_key: String,
}

#[derive(Debug, Serialize)]
struct AddKey<'a> {
    name: &'a str,
    public_key: &'a str,
}

pub async fn run(cmd: SshKeyCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        SshKeyAction::List => {
            let keys: Vec<SshKey> = extract_list(&client.get(SSH_KEYS).await?)?;
            out.list(
                &keys,
                "No SSH keys found",
                &["ID", "NAME", "FINGERPRINT", "CREATED"],
                |k| {
                    vec![
                        k.id.to_string(),
                        k.name.clone(),
                        truncate(&k.fingerprint, 30),
                        or_dash(&k.created_at),
                    ]
                },
            );
            Ok(())
        }
        SshKeyAction::Add { name, key } => {
            let body = AddKey {
                name: &name,
                public_key: key.trim(),
            };
            let added: SshKey = extract(&client.post(SSH_KEYS, &body).await?)?;
            out.detail(
                &added,
                &[
                    ("ID", added.id.to_string()),
                    ("Name", added.name.clone()),
                    ("Fingerprint", or_dash(&added.fingerprint)),
                ],
            );
            Ok(())
        }
        SshKeyAction::Get { id } => {
            let key: SshKey = extract(&client.get(&format!("{}/{}", SSH_KEYS, id)).await?)?;
            out.detail(
                &key,
                &[
                    ("ID", key.id.to_string()),
                    ("Name", key.name.clone()),
                    ("Fingerprint", or_dash(&key.fingerprint)),
                    ("Created", or_dash(&key.created_at)),
                    ("Public Key", key.public_key.clone()),
                ],
            );
            Ok(())
        }
        SshKeyAction::Delete { id } => {
            client.delete(&format!("{}/{}", SSH_KEYS, id)).await?;
            out.done(&format!("SSH key {} deleted", id));
            Ok(())
        }
        SshKeyAction::Generate => {
            let generated: GeneratedKey =
                extract(&client.get(&format!("{}/random", SSH_KEYS)).await?)?;
            out.log("warn", "Store the private key now; it is not kept server-side");
            out.detail(
                &generated,
                &[
                    ("ID", generated.id.to_string()),
                    ("Public Key", generated.public_key.clone()),
                    ("Private Key", format!("\n{}", generated.private_key)),
                ],
            );
            Ok(())
        }
    }
}
