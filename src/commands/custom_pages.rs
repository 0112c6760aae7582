//! Custom error pages

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{extract, ApiClient};
use crate::cli::{CustomPagesAction, CustomPagesCommand};
use crate::output::{Output, PebbleError};

use super::domain_path;

const ERROR_CODES: [u16; 6] = [403, 404, 500, 502, 503, 504];

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomPages {
    pub error_403: String,
    pub error_404: String,
    pub error_500: String,
    pub error_502: String,
    pub error_503: String,
    pub error_504: String,
}

impl CustomPages {
    /// Label and Custom/Default status per error code
    fn statuses(&self) -> Vec<(&'static str, String)> {
        [
            ("403 Forbidden", &self.error_403),
            ("404 Not Found", &self.error_404),
            ("500 Internal Server Error", &self.error_500),
            ("502 Bad Gateway", &self.error_502),
            ("503 Service Unavailable", &self.error_503),
            ("504 Gateway Timeout", &self.error_504),
        ]
        .into_iter()
        .map(|(label, html)| {
            let status = if html.is_empty() { "Default" } else { "Custom" };
            (label, status.to_string())
        })
        .collect()
    }
}

#[derive(Debug, Serialize)]
struct PageBody<'a> {
    error_code: u16,
    content: &'a str,
}

fn check_code(code: u16, op: &str, out: &Output) {
    if !ERROR_CODES.contains(&code) {
        out.error(
            PebbleError::input(
                "INVALID_CODE",
                &format!(
                    "invalid error code: {} (supported: 403, 404, 500, 502, 503, 504)",
                    code
                ),
            )
            .with_op(op),
        );
    }
}

pub async fn run(cmd: CustomPagesCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        CustomPagesAction::Get { target } => {
            let pages: CustomPages =
                extract(&client.get(&domain_path(target.domain, "custom-pages")).await?)?;
            out.detail(&pages, &pages.statuses());
        }
        CustomPagesAction::Set { target, code, html } => {
            check_code(code, "custom-pages.set", out);
            let content = std::fs::read_to_string(&html)
                .with_context(|| format!("failed to read {}", html.display()))?;
            client
                .post(
                    &domain_path(target.domain, "custom-pages"),
                    &PageBody {
                        error_code: code,
                        content: &content,
                    },
                )
                .await?;
            out.done(&format!("Custom page for error {} set", code));
        }
        CustomPagesAction::Delete { target, code } => {
            check_code(code, "custom-pages.delete", out);
            client
                .delete(&domain_path(target.domain, "custom-pages"))
                .await?;
            out.done(&format!(
                "Custom page for error {} deleted (restored to default)",
                code
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn statuses_mark_custom_pages() {
        let pages: CustomPages = serde_json::from_value(json!({
            "error_404": "<h1>gone</h1>",
            "error_503": ""
        }))
        .unwrap();
        let statuses = pages.statuses();

        assert_eq!(statuses.len(), 6);
        assert_eq!(statuses[0], ("403 Forbidden", "Default".to_string()));
        assert_eq!(statuses[1], ("404 Not Found", "Custom".to_string()));
        assert_eq!(statuses[4].1, "Default");
    }

    #[test]
    fn page_body_shape() {
        let body = PageBody {
            error_code: 404,
            content: "<p>x</p>",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"error_code": 404, "content": "<p>x</p>"})
        );
    }
}
