//! Login, logout, profile and API keys

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{ApiKeysAction, LoginArgs, ProfileAction, ProfileCommand};
use crate::config::Config;
use crate::output::{truncate, Output, PebbleError};
use crate::types::NumericBool;

use super::{or_dash, yes_no};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub national_id: String,
    pub tfa_enabled: NumericBool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ApiKey {
    id: u64,
    name: String,
    token: String,
    created_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CreatedKey {
    token: String,
}

#[derive(Debug, Serialize)]
struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
struct KeyCreate<'a> {
    name: &'a str,
}

/// Validate the token against the profile endpoint, then save it.
///
/// `session_url` is the `--api-url` override; it is used for the check but
/// only `--url` is persisted.
pub async fn login(
    args: LoginArgs,
    mut config: Config,
    session_url: Option<String>,
    out: &Output,
) -> Result<()> {
    let token = match args.token {
        Some(token) => token,
        None => rpassword::prompt_password("Enter your API token: ")
            .context("Failed to read token")?,
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        out.error(PebbleError::input("TOKEN_EMPTY", "token cannot be empty").with_op("login"));
    }

    let persist_url = args.url.is_some();
    if let Some(url) = args.url {
        config.base_url = url;
    }
    config.token = token;

    let mut session = config.clone();
    if !persist_url {
        if let Some(url) = session_url {
            session.base_url = url;
        }
    }

    out.log("info", &format!("Validating token against {}", session.base_url));
    let client = ApiClient::new(&session)?;
    let profile: Profile = extract(&client.get("/v1/auth/profile").await?)?;

    config.save()?;
    out.log("debug", &format!("Saved credentials to {:?}", crate::config::config_path()));

    out.done(&format!(
        "Successfully logged in as {} ({})",
        profile.name, profile.email
    ));
    Ok(())
}

pub fn logout(mut config: Config, out: &Output) -> Result<()> {
    config.logout()?;
    out.done("Successfully logged out");
    Ok(())
}

pub async fn run(cmd: ProfileCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        ProfileAction::Show => show(client, out).await,
        ProfileAction::Update { name, phone } => update(client, name, phone, out).await,
        ProfileAction::ApiKeys(keys) => match keys.action {
            ApiKeysAction::List => list_keys(client, out).await,
            ApiKeysAction::Create { name } => create_key(client, &name, out).await,
            ApiKeysAction::Delete { id } => delete_key(client, id, out).await,
        },
    }
}

async fn show(client: &ApiClient, out: &Output) -> Result<()> {
    let profile: Profile = extract(&client.get("/v1/auth/profile").await?)?;
    out.detail(
        &profile,
        &[
            ("ID", profile.id.to_string()),
            ("Name", or_dash(&profile.name)),
            ("Email", or_dash(&profile.email)),
            ("Phone", or_dash(&profile.phone_number)),
            ("National ID", or_dash(&profile.national_id)),
            ("2FA Enabled", yes_no(profile.tfa_enabled.get()).to_string()),
        ],
    );
    Ok(())
}

fn profile_update(name: Option<String>, phone: Option<String>) -> Option<ProfileUpdate> {
    let name = name.filter(|n| !n.is_empty());
    let phone_number = phone.filter(|p| !p.is_empty());
    if name.is_none() && phone_number.is_none() {
        return None;
    }
    Some(ProfileUpdate { name, phone_number })
}

async fn update(
    client: &ApiClient,
    name: Option<String>,
    phone: Option<String>,
    out: &Output,
) -> Result<()> {
    let Some(body) = profile_update(name, phone) else {
        out.error(
            PebbleError::input("NO_FIELDS", "no fields to update; use --name or --phone")
                .with_op("profile.update"),
        );
    };
    client.put("/v1/auth/profile", &body).await?;
    out.done("Profile updated successfully");
    Ok(())
}

async fn list_keys(client: &ApiClient, out: &Output) -> Result<()> {
    let keys: Vec<ApiKey> = extract_list(&client.get("/v1/auth/api-token").await?)?;
    out.list(&keys, "No API keys found", &["ID", "NAME", "TOKEN", "CREATED"], |k| {
        vec![
            k.id.to_string(),
            k.name.clone(),
            truncate(&k.token, 20),
            or_dash(&k.created_at),
        ]
    });
    Ok(())
}

async fn create_key(client: &ApiClient, name: &str, out: &Output) -> Result<()> {
    let created: CreatedKey =
        extract(&client.post("/v1/auth/api-token", &KeyCreate { name }).await?)?;
    out.log("warn", "Save this token now; it will not be shown again");
    out.detail(&created, &[("Name", name.to_string()), ("Token", created.token.clone())]);
    Ok(())
}

async fn delete_key(client: &ApiClient, id: u64, out: &Output) -> Result<()> {
    client.delete(&format!("/v1/auth/api-token/{}", id)).await?;
    out.done(&format!("API key {} deleted", id));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_update_skips_empty_fields() {
        assert!(profile_update(None, Some(String::new())).is_none());

        let body = profile_update(Some("Sara".into()), None).unwrap();
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"name": "Sara"}));
    }

    #[test]
    fn profile_tolerates_numeric_tfa_flag() {
        let profile: Profile =
            serde_json::from_value(json!({"id": 3, "name": "Sara", "tfa_enabled": 1})).unwrap();
        assert!(profile.tfa_enabled.get());
        assert_eq!(profile.email, "");
    }
}
