//! Support tickets

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract, extract_list, ApiClient};
use crate::cli::{TicketAction, TicketCommand};
use crate::output::{key_values, truncate, Mode, Output};
use crate::types::NumericBool;

const TICKETS: &str = "/v1/support/tickets";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticket {
    pub id: u64,
    pub subject: String,
    pub status: String,
    pub priority: String,
    pub department: String,
    pub department_id: u64,
    pub user_id: u64,
    pub is_closed: NumericBool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketReply {
    pub id: u64,
    pub ticket_id: u64,
    pub message: String,
    pub content: String,
    pub author: String,
    pub user_id: u64,
    pub is_staff: NumericBool,
    pub created_at: String,
}

impl TicketReply {
    /// Older replies carry their text in `content`
    fn text(&self) -> &str {
        if self.message.is_empty() {
            &self.content
        } else {
            &self.message
        }
    }

    fn author_kind(&self) -> &'static str {
        if self.is_staff.get() {
            "Staff"
        } else {
            "Customer"
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct TicketThread {
    ticket: Ticket,
    replies: Vec<TicketReply>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Department {
    id: u64,
    name: String,
}

#[derive(Debug, Serialize)]
struct NewTicket<'a> {
    subject: &'a str,
    message: &'a str,
    department: &'a str,
    priority: &'a str,
}

#[derive(Debug, Serialize)]
struct ReplyBody<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct StatusBody<'a> {
    status: &'a str,
}

fn list_path(status: Option<&str>) -> String {
    match status.filter(|s| !s.is_empty()) {
        Some(status) => format!("{}?status={}", TICKETS, status),
        None => TICKETS.to_string(),
    }
}

pub async fn run(cmd: TicketCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        TicketAction::List { status } => {
            let tickets: Vec<Ticket> =
                extract_list(&client.get(&list_path(status.as_deref())).await?)?;
            out.list(
                &tickets,
                "No tickets found",
                &["ID", "SUBJECT", "STATUS", "PRIORITY", "DEPARTMENT"],
                |t| {
                    vec![
                        t.id.to_string(),
                        truncate(&t.subject, 35),
                        t.status.clone(),
                        t.priority.clone(),
                        t.department.clone(),
                    ]
                },
            );
        }
        TicketAction::Create {
            subject,
            message,
            department,
            priority,
        } => {
            let body = NewTicket {
                subject: &subject,
                message: &message,
                department: &department,
                priority: &priority,
            };
            let ticket: Ticket = extract(&client.post(TICKETS, &body).await?)?;
            out.detail(
                &ticket,
                &[
                    ("ID", ticket.id.to_string()),
                    ("Subject", ticket.subject.clone()),
                    ("Status", ticket.status.clone()),
                ],
            );
        }
        TicketAction::Get { id } => {
            let thread: TicketThread =
                extract(&client.get(&format!("{}/{}", TICKETS, id)).await?)?;
            show_thread(out, &thread);
        }
        TicketAction::Reply { id, message } => {
            client
                .post(
                    &format!("{}/{}/replies", TICKETS, id),
                    &ReplyBody { message: &message },
                )
                .await?;
            out.done(&format!("Reply sent to ticket {}", id));
        }
        TicketAction::Close { id } => {
            client
                .post(
                    &format!("{}/{}/status", TICKETS, id),
                    &StatusBody { status: "closed" },
                )
                .await?;
            out.done(&format!("Ticket {} closed", id));
        }
        TicketAction::Departments => {
            let departments: Vec<Department> =
                extract_list(&client.get(&format!("{}/departments", TICKETS)).await?)?;
            out.list(&departments, "No departments found", &["ID", "NAME"], |d| {
                vec![d.id.to_string(), d.name.clone()]
            });
        }
    }
    Ok(())
}

fn show_thread(out: &Output, thread: &TicketThread) {
    if out.mode() != Mode::Human {
        out.result(thread);
        return;
    }

    let t = &thread.ticket;
    print!(
        "{}",
        key_values(&[
            ("ID", t.id.to_string()),
            ("Subject", t.subject.clone()),
            ("Status", t.status.clone()),
            ("Priority", t.priority.clone()),
            ("Department", t.department.clone()),
            ("Created", t.created_at.clone()),
            ("Updated", t.updated_at.clone()),
        ])
    );

    if thread.replies.is_empty() {
        return;
    }
    println!("\n--- Replies ---");
    for r in &thread.replies {
        println!("\n[{}] {} ({}):\n{}", r.created_at, r.author, r.author_kind(), r.text());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Envelope;
    use serde_json::json;

    #[test]
    fn status_filter_goes_in_query() {
        assert_eq!(list_path(None), "/v1/support/tickets");
        assert_eq!(list_path(Some("")), "/v1/support/tickets");
        assert_eq!(list_path(Some("open")), "/v1/support/tickets?status=open");
    }

    #[test]
    fn thread_decodes_with_null_replies() {
        let envelope = Envelope {
            success: true,
            message: String::new(),
            data: json!({
                "ticket": {"id": 8, "subject": "Down", "is_closed": "1"},
                "replies": null
            }),
        };
        let thread: TicketThread = extract(&envelope).unwrap();
        assert_eq!(thread.ticket.id, 8);
        assert!(thread.ticket.is_closed.get());
        assert!(thread.replies.is_empty());
    }

    #[test]
    fn reply_text_falls_back_to_content() {
        let reply: TicketReply = serde_json::from_value(json!({
            "content": "legacy body",
            "is_staff": 1
        }))
        .unwrap();
        assert_eq!(reply.text(), "legacy body");
        assert_eq!(reply.author_kind(), "Staff");
    }
}
