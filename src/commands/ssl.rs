//! SSL certificates and HTTPS settings

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{DomainArg, SslAction, SslCommand, SslSettingsAction};
use crate::output::{truncate, Output};
use crate::types::NumericBool;

use super::{domain_path, on_off, or_dash, Toggle};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub id: u64,
    #[serde(rename = "type")]
    pub cert_type: String,
    pub status: String,
    pub expires_at: String,
    pub domains: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CertificateInfo {
    has_ssl: NumericBool,
    issuer: String,
    valid_from: String,
    valid_to: String,
    domains: Vec<String>,
    fingerprint: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct HttpsConfig {
    tls_version: String,
    https_redirect: NumericBool,
    hsts_enabled: NumericBool,
    hsts_max_age: u64,
    hsts_include_subdomains: NumericBool,
    hsts_preload: NumericBool,
    backend_protocol: String,
    h3_enabled: NumericBool,
    csp_override: NumericBool,
}

#[derive(Debug, Serialize)]
struct AttachCertificate<'a> {
    certificate_id: u64,
    record_ids: &'a [u64],
}

#[derive(Debug, Serialize)]
struct DetachCertificate<'a> {
    record_ids: &'a [u64],
}

#[derive(Debug, Serialize)]
struct CustomCertificate {
    certificate: String,
    private_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    chain: Option<String>,
}

#[derive(Debug, Serialize)]
struct TlsVersion<'a> {
    min_version: &'a str,
}

#[derive(Debug, Serialize)]
struct Hsts {
    enabled: bool,
    max_age: u64,
    include_subdomains: bool,
    preload: bool,
}

#[derive(Debug, Serialize)]
struct BackendProtocol<'a> {
    protocol: &'a str,
}

fn https_path(domain: u64, suffix: &str) -> String {
    domain_path(domain, &format!("https/{}", suffix))
}

fn read_pem(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

pub async fn run(cmd: SslCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        SslAction::Info { target } => info(client, target, out).await,
        SslAction::Status { target } => status(client, target, out).await,
        SslAction::List { target } => {
            let certs: Vec<Certificate> =
                extract_list(&client.get(&https_path(target.domain, "ssl")).await?)?;
            out.list(
                &certs,
                "No SSL certificates found",
                &["ID", "TYPE", "STATUS", "EXPIRES", "DOMAINS"],
                |c| {
                    vec![
                        c.id.to_string(),
                        c.cert_type.clone(),
                        c.status.clone(),
                        or_dash(&c.expires_at),
                        truncate(&c.domains.join(", "), 30),
                    ]
                },
            );
            Ok(())
        }
        SslAction::AttachDefault { target } => {
            client
                .post_empty(&https_path(target.domain, "attach-default"))
                .await?;
            out.done("Default SSL certificate attached");
            Ok(())
        }
        SslAction::DetachDefault { target } => {
            client
                .post_empty(&https_path(target.domain, "detach-default"))
                .await?;
            out.done("Default SSL certificate detached");
            Ok(())
        }
        SslAction::Attach {
            target,
            cert,
            records,
        } => {
            let body = AttachCertificate {
                certificate_id: cert,
                record_ids: &records,
            };
            client.post(&https_path(target.domain, "attach"), &body).await?;
            out.done(&format!(
                "Certificate {} attached to {} record(s)",
                cert,
                records.len()
            ));
            Ok(())
        }
        SslAction::Detach { target, records } => {
            let body = DetachCertificate {
                record_ids: &records,
            };
            client.post(&https_path(target.domain, "detach"), &body).await?;
            out.done(&format!("Certificate detached from {} record(s)", records.len()));
            Ok(())
        }
        SslAction::RequestFree { target } => {
            client.post_empty(&https_path(target.domain, "ssl/free")).await?;
            out.log("info", "The certificate is usually issued within a few minutes");
            out.done("Free SSL certificate requested");
            Ok(())
        }
        SslAction::AddCustom {
            target,
            cert,
            key,
            chain,
        } => {
            let body = CustomCertificate {
                certificate: read_pem(&cert)?,
                private_key: read_pem(&key)?,
                chain: chain.as_deref().map(read_pem).transpose()?,
            };
            client.post(&https_path(target.domain, "ssl/add"), &body).await?;
            out.done("Custom SSL certificate added");
            Ok(())
        }
        SslAction::Delete { target, id } => {
            client
                .delete(&https_path(target.domain, &format!("ssl/{}", id)))
                .await?;
            out.done(&format!("SSL certificate {} deleted", id));
            Ok(())
        }
        SslAction::Settings(settings) => run_settings(settings.action, client, out).await,
    }
}

async fn run_settings(action: SslSettingsAction, client: &ApiClient, out: &Output) -> Result<()> {
    match action {
        SslSettingsAction::TlsVersion { target, version } => {
            client
                .post(
                    &https_path(target.domain, "ssl/tls-version"),
                    &TlsVersion {
                        min_version: &version,
                    },
                )
                .await?;
            out.done(&format!("Minimum TLS version set to {}", version));
        }
        SslSettingsAction::Hsts {
            target,
            switch,
            max_age,
            include_subdomains,
            preload,
        } => {
            let body = Hsts {
                enabled: switch.enabled,
                max_age,
                include_subdomains,
                preload,
            };
            client.post(&https_path(target.domain, "hsts"), &body).await?;
            out.done(&format!("HSTS {}", on_off(switch.enabled)));
        }
        SslSettingsAction::Redirect { target, switch } => {
            client
                .post(
                    &https_path(target.domain, "redirect"),
                    &Toggle {
                        enabled: switch.enabled,
                    },
                )
                .await?;
            out.done(&format!("HTTPS redirect {}", on_off(switch.enabled)));
        }
        SslSettingsAction::BackendProtocol { target, protocol } => {
            client
                .post(
                    &https_path(target.domain, "backend-protocol"),
                    &BackendProtocol {
                        protocol: &protocol,
                    },
                )
                .await?;
            out.done(&format!("Backend protocol set to {}", protocol));
        }
        SslSettingsAction::H3 { target, switch } => {
            client
                .post(
                    &https_path(target.domain, "h3"),
                    &Toggle {
                        enabled: switch.enabled,
                    },
                )
                .await?;
            out.done(&format!("HTTP/3 (QUIC) {}", on_off(switch.enabled)));
        }
        SslSettingsAction::CspOverride { target, switch } => {
            client
                .post(
                    &https_path(target.domain, "csp-override"),
                    &Toggle {
                        enabled: switch.enabled,
                    },
                )
                .await?;
            out.done(&format!("CSP override {}", on_off(switch.enabled)));
        }
    }
    Ok(())
}

async fn info(client: &ApiClient, target: DomainArg, out: &Output) -> Result<()> {
    let envelope = client.get(&https_path(target.domain, "ssl/get-info")).await?;
    let Ok(info) = extract::<CertificateInfo>(&envelope) else {
        out.raw(&envelope.data);
        return Ok(());
    };

    let mut fields = vec![("Has SSL", info.has_ssl.to_string())];
    if info.has_ssl.get() {
        fields.push(("Issuer", or_dash(&info.issuer)));
        fields.push(("Valid From", or_dash(&info.valid_from)));
        fields.push(("Valid To", or_dash(&info.valid_to)));
        fields.push(("Fingerprint", or_dash(&info.fingerprint)));
        if !info.domains.is_empty() {
            fields.push(("Domains", info.domains.join(", ")));
        }
    }
    out.detail(&info, &fields);
    Ok(())
}

async fn status(client: &ApiClient, target: DomainArg, out: &Output) -> Result<()> {
    let envelope = client.get(&https_path(target.domain, "ssl/get-configs")).await?;
    let Ok(config) = extract::<HttpsConfig>(&envelope) else {
        out.raw(&envelope.data);
        return Ok(());
    };

    let mut fields = vec![
        ("TLS Version", or_dash(&config.tls_version)),
        ("HTTPS Redirect", config.https_redirect.to_string()),
        ("Backend Protocol", or_dash(&config.backend_protocol)),
        ("HTTP/3 (QUIC)", config.h3_enabled.to_string()),
        ("CSP Override", config.csp_override.to_string()),
        ("HSTS", config.hsts_enabled.to_string()),
    ];
    if config.hsts_enabled.get() {
        fields.push(("HSTS Max Age", format!("{} seconds", config.hsts_max_age)));
        fields.push(("HSTS Subdomains", config.hsts_include_subdomains.to_string()));
        fields.push(("HSTS Preload", config.hsts_preload.to_string()));
    }
    out.detail(&config, &fields);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn https_paths() {
        assert_eq!(
            https_path(4, "ssl/get-info"),
            "/v1/cdn/ng/domains/4/https/ssl/get-info"
        );
    }

    #[test]
    fn attach_body_lists_record_ids() {
        let records = [3, 5];
        let body = AttachCertificate {
            certificate_id: 9,
            record_ids: &records,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"certificate_id": 9, "record_ids": [3, 5]})
        );
    }

    #[test]
    fn custom_certificate_reads_pem_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let cert = dir.path().join("cert.pem");
        std::fs::write(&cert, "-----BEGIN CERTIFICATE-----\n").unwrap();

        assert!(read_pem(&cert).unwrap().starts_with("-----BEGIN"));
        assert!(read_pem(&dir.path().join("missing.pem")).is_err());
    }

    #[test]
    fn https_config_accepts_numeric_flags() {
        let config: HttpsConfig = serde_json::from_value(json!({
            "tls_version": "1.2",
            "https_redirect": 1,
            "hsts_enabled": "true",
            "hsts_max_age": 31536000
        }))
        .unwrap();
        assert!(config.https_redirect.get());
        assert!(config.hsts_enabled.get());
        assert!(!config.h3_enabled.get());
    }
}
