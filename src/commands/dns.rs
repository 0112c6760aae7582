//! DNS records, custom nameservers and DNSSEC

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{
    CustomNsAction, DnsAction, DnsCommand, DnsRecordArgs, DnssecAction, DomainArg,
};
use crate::output::{truncate, Output};
use crate::types::NumericBool;

use super::{domain_path, or_dash, yes_no, Toggle};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub priority: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub port: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    /// "ACTIVE" when the record goes through the CDN
    pub proxy: String,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl DnsRecord {
    pub fn proxied(&self) -> bool {
        self.proxy == "ACTIVE"
    }

    /// Protocol column: "-" for the default, with the port appended when set
    fn protocol_label(&self) -> String {
        let protocol = if self.protocol.is_empty() || self.protocol == "DEFAULT" {
            "-"
        } else {
            self.protocol.as_str()
        };
        if self.port > 0 {
            format!("{}:{}", protocol, self.port)
        } else {
            protocol.to_string()
        }
    }
}

/// Body for add and update; `record_id` is only sent on update
#[derive(Debug, Serialize)]
struct RecordBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    record_id: Option<u64>,
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    destination: &'a str,
    ttl: u32,
    protocol: &'a str,
    proxy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
}

impl<'a> RecordBody<'a> {
    fn new(args: &'a DnsRecordArgs, record_id: Option<u64>) -> Self {
        Self {
            record_id,
            record_type: &args.record_type,
            name: &args.name,
            destination: &args.destination,
            ttl: args.ttl,
            protocol: &args.protocol,
            proxy: args.proxy,
            priority: args.priority.filter(|p| *p > 0),
            port: args.port.filter(|p| *p > 0),
        }
    }
}

#[derive(Debug, Serialize)]
struct ZoneImport {
    zone: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ZoneExport {
    zone: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Fetched {
    records: Vec<DnsRecord>,
    count: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CustomNs {
    ns1: String,
    ns2: String,
    enabled: NumericBool,
}

#[derive(Debug, Serialize)]
struct CustomNsBody<'a> {
    ns1: &'a str,
    ns2: &'a str,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Dnssec {
    enabled: NumericBool,
    algorithm: String,
    ds: String,
    key_tag: u32,
    digest_type: String,
    digest: String,
}

pub async fn run(cmd: DnsCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        DnsAction::List { target } => list(client, target, out).await,
        DnsAction::Get { target, id } => get(client, target, id, out).await,
        DnsAction::Add { target, record } => {
            let body = RecordBody::new(&record, None);
            let added: DnsRecord =
                extract(&client.post(&domain_path(target.domain, "dns"), &body).await?)?;
            out.detail(
                &added,
                &[
                    ("ID", added.id.to_string()),
                    ("Type", added.record_type.clone()),
                    ("Name", added.name.clone()),
                    ("Content", added.content.clone()),
                ],
            );
            Ok(())
        }
        DnsAction::Update {
            target,
            record,
            fields,
        } => {
            let body = RecordBody::new(&fields, Some(record));
            client
                .put(&domain_path(target.domain, &format!("dns/{}", record)), &body)
                .await?;
            out.done(&format!("DNS record {} updated", record));
            Ok(())
        }
        DnsAction::Delete { target, id } => {
            client
                .delete(&domain_path(target.domain, &format!("dns/{}", id)))
                .await?;
            out.done(&format!("DNS record {} deleted", id));
            Ok(())
        }
        DnsAction::Proxiable { target } => {
            let records: Vec<DnsRecord> =
                extract_list(&client.get(&domain_path(target.domain, "dns/proxiable")).await?)?;
            out.list(
                &records,
                "No proxiable DNS records found",
                &["ID", "TYPE", "NAME", "CONTENT", "PROXIED"],
                |r| {
                    vec![
                        r.id.to_string(),
                        r.record_type.clone(),
                        truncate(&r.name, 25),
                        truncate(&r.content, 40),
                        yes_no(r.proxied()).to_string(),
                    ]
                },
            );
            Ok(())
        }
        DnsAction::Import { target, file } => {
            let zone = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read zone file {:?}", file))?;
            out.log("info", &format!("Importing zone file {:?}", file));
            client
                .post(&domain_path(target.domain, "dns/import"), &ZoneImport { zone })
                .await?;
            out.done("DNS zone imported successfully");
            Ok(())
        }
        DnsAction::Export { target } => {
            let export: ZoneExport =
                extract(&client.get(&domain_path(target.domain, "dns/export")).await?)?;
            match out.mode() {
                crate::output::Mode::Human => println!("{}", export.zone),
                _ => out.result(&export),
            }
            Ok(())
        }
        DnsAction::FetchRecords { target } => fetch_records(client, target, out).await,
        DnsAction::CustomNs(ns) => match ns.action {
            CustomNsAction::Get { target } => {
                let envelope = client.get(&domain_path(target.domain, "dns/custom-ns")).await?;
                let Ok(ns) = extract::<CustomNs>(&envelope) else {
                    out.raw(&envelope.data);
                    return Ok(());
                };
                out.detail(
                    &ns,
                    &[
                        ("Enabled", ns.enabled.to_string()),
                        ("NS1", or_dash(&ns.ns1)),
                        ("NS2", or_dash(&ns.ns2)),
                    ],
                );
                Ok(())
            }
            CustomNsAction::Set { target, ns1, ns2 } => {
                let body = CustomNsBody {
                    ns1: &ns1,
                    ns2: &ns2,
                };
                client
                    .post(&domain_path(target.domain, "dns/custom-ns"), &body)
                    .await?;
                out.done(&format!("Custom nameservers set: {}, {}", ns1, ns2));
                Ok(())
            }
            CustomNsAction::Delete { target } => {
                client
                    .delete(&domain_path(target.domain, "dns/custom-ns"))
                    .await?;
                out.done("Custom nameservers removed");
                Ok(())
            }
        },
        DnsAction::Dnssec(dnssec) => match dnssec.action {
            DnssecAction::Status { target } => dnssec_status(client, target, out).await,
            DnssecAction::Enable { target } => {
                let envelope = client
                    .post(&domain_path(target.domain, "dns/dnssec"), &Toggle { enabled: true })
                    .await?;
                let ds = extract::<Dnssec>(&envelope).map(|d| d.ds).unwrap_or_default();
                if ds.is_empty() {
                    out.done("DNSSEC enabled");
                } else {
                    out.log("info", "Add this DS record at your registrar");
                    out.detail(&envelope.data, &[("DS Record", ds)]);
                }
                Ok(())
            }
            DnssecAction::Disable { target } => {
                client
                    .post(&domain_path(target.domain, "dns/dnssec"), &Toggle { enabled: false })
                    .await?;
                out.log("info", "Remember to remove the DS record at your registrar");
                out.done("DNSSEC disabled");
                Ok(())
            }
        },
    }
}

async fn list(client: &ApiClient, target: DomainArg, out: &Output) -> Result<()> {
    out.log("debug", &format!("Fetching DNS records for domain {}", target.domain));
    let records: Vec<DnsRecord> =
        extract_list(&client.get(&domain_path(target.domain, "dns")).await?)?;
    out.list(
        &records,
        "No DNS records found",
        &["ID", "TYPE", "NAME", "CONTENT", "TTL", "PROTOCOL", "PROXIED"],
        |r| {
            vec![
                r.id.to_string(),
                r.record_type.clone(),
                truncate(&r.name, 25),
                truncate(&r.content, 40),
                r.ttl.to_string(),
                r.protocol_label(),
                yes_no(r.proxied()).to_string(),
            ]
        },
    );
    Ok(())
}

async fn get(client: &ApiClient, target: DomainArg, id: u64, out: &Output) -> Result<()> {
    let record: DnsRecord = extract(
        &client
            .get(&domain_path(target.domain, &format!("dns/{}", id)))
            .await?,
    )?;

    let mut fields = vec![
        ("ID", record.id.to_string()),
        ("Type", record.record_type.clone()),
        ("Name", record.name.clone()),
        ("Content", record.content.clone()),
        ("TTL", record.ttl.to_string()),
    ];
    if record.priority > 0 {
        fields.push(("Priority", record.priority.to_string()));
    }
    if record.port > 0 {
        fields.push(("Port", record.port.to_string()));
    }
    if !record.protocol.is_empty() {
        fields.push(("Protocol", record.protocol.clone()));
    }
    fields.push(("Proxied", or_dash(&record.proxy)));

    out.detail(&record, &fields);
    Ok(())
}

async fn fetch_records(client: &ApiClient, target: DomainArg, out: &Output) -> Result<()> {
    out.log("info", "Discovering records from the current authoritative nameservers");
    let envelope = client
        .post_empty(&domain_path(target.domain, "dns/fetch-records"))
        .await?;
    let Ok(fetched) = extract::<Fetched>(&envelope) else {
        out.done("DNS records fetched successfully");
        return Ok(());
    };

    out.log("info", &format!("Fetched {} DNS records", fetched.count));
    out.list(
        &fetched.records,
        "No new records found",
        &["ID", "TYPE", "NAME", "CONTENT"],
        |r| {
            vec![
                r.id.to_string(),
                r.record_type.clone(),
                truncate(&r.name, 25),
                truncate(&r.content, 40),
            ]
        },
    );
    Ok(())
}

async fn dnssec_status(client: &ApiClient, target: DomainArg, out: &Output) -> Result<()> {
    let envelope = client.get(&domain_path(target.domain, "dns/dnssec")).await?;
    let Ok(dnssec) = extract::<Dnssec>(&envelope) else {
        out.raw(&envelope.data);
        return Ok(());
    };

    let mut fields = vec![("Enabled", dnssec.enabled.to_string())];
    if dnssec.enabled.get() {
        fields.push(("Algorithm", or_dash(&dnssec.algorithm)));
        fields.push(("Key Tag", dnssec.key_tag.to_string()));
        fields.push(("Digest Type", or_dash(&dnssec.digest_type)));
        if !dnssec.ds.is_empty() {
            fields.push(("DS Record", dnssec.ds.clone()));
        }
    }
    out.detail(&dnssec, &fields);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(priority: Option<u32>, port: Option<u16>) -> DnsRecordArgs {
        DnsRecordArgs {
            record_type: "MX".into(),
            name: "@".into(),
            destination: "mail.example.com".into(),
            ttl: 3600,
            priority,
            port,
            protocol: "DEFAULT".into(),
            proxy: false,
        }
    }

    #[test]
    fn add_body_omits_unset_priority_and_port() {
        let args = args(None, Some(0));
        assert_eq!(
            serde_json::to_value(RecordBody::new(&args, None)).unwrap(),
            json!({
                "type": "MX",
                "name": "@",
                "destination": "mail.example.com",
                "ttl": 3600,
                "protocol": "DEFAULT",
                "proxy": false
            })
        );
    }

    #[test]
    fn update_body_carries_record_id() {
        let args = args(Some(10), None);
        let body = serde_json::to_value(RecordBody::new(&args, Some(77))).unwrap();
        assert_eq!(body["record_id"], 77);
        assert_eq!(body["priority"], 10);
        assert!(body.get("port").is_none());
    }

    #[test]
    fn protocol_column() {
        let mut record = DnsRecord {
            protocol: "DEFAULT".into(),
            ..Default::default()
        };
        assert_eq!(record.protocol_label(), "-");

        record.protocol = "HTTPS".into();
        record.port = 8443;
        assert_eq!(record.protocol_label(), "HTTPS:8443");
    }

    #[test]
    fn proxy_flag_is_a_status_string() {
        let record: DnsRecord =
            serde_json::from_value(json!({"id": 1, "type": "A", "proxy": "ACTIVE"})).unwrap();
        assert!(record.proxied());
        let record: DnsRecord = serde_json::from_value(json!({"id": 2, "proxy": "INACTIVE"})).unwrap();
        assert!(!record.proxied());
    }
}
