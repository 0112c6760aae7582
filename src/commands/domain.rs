//! CDN domains

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{DomainAction, DomainCommand};
use crate::output::{format_bytes, truncate, Output, PebbleError};
use crate::types::{FlexibleString, NumericBool};

use super::{domain_path, or_dash, yes_no};

const DOMAINS: &str = "/v1/cdn/ng/domains";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Domain {
    pub id: u64,
    pub name: String,
    pub domain: String,
    pub status: String,
    pub plan: String,
    pub plan_display_name: String,
    #[serde(rename = "waf-enabled")]
    pub waf_enabled: NumericBool,
    pub dnssec_enabled: NumericBool,
    pub h3_enabled: NumericBool,
    pub supports_websocket: NumericBool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameservers: Option<Nameservers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_nameservers: Option<CurrentNameservers>,
    pub added_at: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Domain {
    /// Some endpoints fill `name`, others only `domain`
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.domain
        } else {
            &self.name
        }
    }
}

/// Nameservers assigned by the CDN; the IPs come as a string or a one-element list
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Nameservers {
    pub ns1: String,
    pub ns2: String,
    pub ip1: FlexibleString,
    pub ip2: FlexibleString,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentNameservers {
    pub ns1: String,
    pub ns2: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Usage {
    traffic: i64,
    requests: i64,
    bandwidth: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Whois {
    registrar: String,
    creation_date: String,
    expiry_date: String,
    nameservers: Vec<String>,
    status: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Reports {
    total_traffic: i64,
    total_requests: i64,
    cache_hit_ratio: f64,
    bandwidth_peak: i64,
}

#[derive(Debug, Serialize)]
struct AddDomain<'a> {
    domain: &'a str,
}

#[derive(Debug, Serialize)]
struct ReportsQuery<'a> {
    period: &'a str,
}

#[derive(Debug, Serialize)]
struct RedirectMode<'a> {
    mode: &'a str,
}

const REDIRECT_MODES: [&str; 3] = ["none", "www", "naked"];

pub async fn run(cmd: DomainCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        DomainAction::List => list(client, out).await,
        DomainAction::Add { name } => add(client, &name, out).await,
        DomainAction::Get { id } => get(client, id, out).await,
        DomainAction::Delete { id } => {
            client.delete(&domain_path(id, "")).await?;
            out.done(&format!("Domain {} deleted", id));
            Ok(())
        }
        DomainAction::Usage { id } => {
            let usage: Usage = extract(&client.get(&domain_path(id, "usage")).await?)?;
            out.detail(
                &usage,
                &[
                    ("Traffic", format_bytes(usage.traffic)),
                    ("Requests", usage.requests.to_string()),
                    ("Bandwidth", format!("{}/s", format_bytes(usage.bandwidth))),
                ],
            );
            Ok(())
        }
        DomainAction::Whois { id } => whois(client, id, out).await,
        DomainAction::Reports { target, period } => {
            let envelope = client
                .post(
                    &domain_path(target.domain, "reports"),
                    &ReportsQuery { period: &period },
                )
                .await?;
            // unknown report shapes are shown as-is
            match extract::<Reports>(&envelope) {
                Ok(reports) => out.detail(
                    &reports,
                    &[
                        ("Period", period.clone()),
                        ("Total Traffic", format_bytes(reports.total_traffic)),
                        ("Total Requests", reports.total_requests.to_string()),
                        ("Cache Hit Ratio", format!("{:.2}%", reports.cache_hit_ratio * 100.0)),
                        ("Bandwidth Peak", format!("{}/s", format_bytes(reports.bandwidth_peak))),
                    ],
                ),
                Err(_) => out.raw(&envelope.data),
            }
            Ok(())
        }
        DomainAction::RedirectMode { target, mode } => {
            if !REDIRECT_MODES.contains(&mode.as_str()) {
                out.error(
                    PebbleError::input("INVALID_MODE", "mode must be one of: none, www, naked")
                        .with_op("domain.redirect-mode"),
                );
            }
            client
                .post(
                    &domain_path(target.domain, "redirect-mode"),
                    &RedirectMode { mode: &mode },
                )
                .await?;
            out.done(&format!("Redirect mode set to {}", mode));
            Ok(())
        }
    }
}

async fn list(client: &ApiClient, out: &Output) -> Result<()> {
    let domains: Vec<Domain> = extract_list(&client.get(DOMAINS).await?)?;
    out.list(
        &domains,
        "No domains found",
        &["ID", "DOMAIN", "STATUS", "PLAN", "WAF"],
        |d| {
            vec![
                d.id.to_string(),
                truncate(d.display_name(), 30),
                d.status.clone(),
                or_dash(&d.plan_display_name),
                yes_no(d.waf_enabled.get()).to_string(),
            ]
        },
    );
    Ok(())
}

async fn add(client: &ApiClient, name: &str, out: &Output) -> Result<()> {
    out.log("info", &format!("Adding domain {}", name));
    let domain: Domain = extract(&client.post(DOMAINS, &AddDomain { domain: name }).await?)?;

    let mut fields = vec![
        ("ID", domain.id.to_string()),
        ("Domain", domain.display_name().to_string()),
        ("Status", domain.status.clone()),
    ];
    if let Some(ns) = &domain.nameservers {
        out.log("info", "Point your domain to the nameservers below");
        fields.push(("NS1", ns.ns1.clone()));
        fields.push(("NS2", ns.ns2.clone()));
    }
    out.detail(&domain, &fields);
    Ok(())
}

fn domain_fields(domain: &Domain) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("ID", domain.id.to_string()),
        ("Domain", domain.display_name().to_string()),
        ("Status", domain.status.clone()),
        ("Plan", format!("{} ({})", domain.plan, domain.plan_display_name)),
        ("WAF", domain.waf_enabled.to_string()),
        ("DNSSEC", domain.dnssec_enabled.to_string()),
        ("HTTP/3", domain.h3_enabled.to_string()),
        ("WebSocket", domain.supports_websocket.to_string()),
        ("Added", or_dash(&domain.added_at)),
    ];
    if let Some(ns) = &domain.current_nameservers {
        fields.push(("Current NS1", ns.ns1.clone()));
        fields.push(("Current NS2", ns.ns2.clone()));
    }
    if let Some(ns) = &domain.nameservers {
        fields.push(("Target NS1", with_ip(&ns.ns1, &ns.ip1)));
        fields.push(("Target NS2", with_ip(&ns.ns2, &ns.ip2)));
    }
    fields
}

fn with_ip(host: &str, ip: &FlexibleString) -> String {
    if ip.as_str().is_empty() {
        host.to_string()
    } else {
        format!("{} ({})", host, ip)
    }
}

async fn get(client: &ApiClient, id: u64, out: &Output) -> Result<()> {
    let domain: Domain = extract(&client.get(&domain_path(id, "")).await?)?;
    out.detail(&domain, &domain_fields(&domain));
    Ok(())
}

async fn whois(client: &ApiClient, id: u64, out: &Output) -> Result<()> {
    let envelope = client.get(&domain_path(id, "whois")).await?;
    let Ok(whois) = extract::<Whois>(&envelope) else {
        out.raw(&envelope.data);
        return Ok(());
    };
    out.detail(
        &whois,
        &[
            ("Registrar", or_dash(&whois.registrar)),
            ("Created", or_dash(&whois.creation_date)),
            ("Expires", or_dash(&whois.expiry_date)),
            ("Status", or_dash(&whois.status)),
            ("Nameservers", whois.nameservers.join(", ")),
        ],
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn domain_decodes_loose_backend_encoding() {
        let domain: Domain = serde_json::from_value(json!({
            "id": 12,
            "domain": "example.com",
            "status": "active",
            "waf-enabled": 1,
            "dnssec_enabled": "0",
            "h3_enabled": true,
            "nameservers": {"ns1": "a.ns.mizbancloud.com", "ns2": "b.ns.mizbancloud.com", "ip1": ["185.1.1.1"], "ip2": []}
        }))
        .unwrap();

        assert_eq!(domain.display_name(), "example.com");
        assert!(domain.waf_enabled.get());
        assert!(!domain.dnssec_enabled.get());
        assert!(domain.h3_enabled.get());

        let ns = domain.nameservers.as_ref().unwrap();
        assert_eq!(with_ip(&ns.ns1, &ns.ip1), "a.ns.mizbancloud.com (185.1.1.1)");
        assert_eq!(with_ip(&ns.ns2, &ns.ip2), "b.ns.mizbancloud.com");
    }

    #[test]
    fn domain_fields_include_nameservers_when_present() {
        let domain = Domain {
            id: 1,
            name: "shop.ir".into(),
            current_nameservers: Some(CurrentNameservers {
                ns1: "ns1.old.net".into(),
                ns2: "ns2.old.net".into(),
            }),
            ..Default::default()
        };
        let labels: Vec<&str> = domain_fields(&domain).iter().map(|(k, _)| *k).collect();
        assert!(labels.contains(&"Current NS1"));
        assert!(!labels.contains(&"Target NS1"));
    }
}
