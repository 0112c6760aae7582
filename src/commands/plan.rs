//! CDN plans

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{extract_list, ApiClient};
use crate::cli::{PlanAction, PlanCommand};
use crate::output::{format_bytes, truncate, Output};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Plan {
    pub id: u64,
    pub name: String,
    pub display_name: String,
    pub traffic: i64,
    pub price: i64,
    pub features: Vec<String>,
}

impl Plan {
    fn price_label(&self) -> String {
        if self.price == 0 {
            "Free".to_string()
        } else {
            format!("{} Toman", self.price)
        }
    }
}

pub async fn run(cmd: PlanCommand, client: &ApiClient, out: &Output) -> Result<()> {
    match cmd.action {
        PlanAction::List => {
            let plans: Vec<Plan> = extract_list(&client.get("/v1/cdn/ng/plans").await?)?;
            out.list(
                &plans,
                "No plans available",
                &["ID", "NAME", "DISPLAY NAME", "TRAFFIC", "PRICE"],
                |p| {
                    vec![
                        p.id.to_string(),
                        p.name.clone(),
                        truncate(&p.display_name, 20),
                        format_bytes(p.traffic),
                        p.price_label(),
                    ]
                },
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_plans_are_labelled() {
        let free = Plan::default();
        assert_eq!(free.price_label(), "Free");

        let paid = Plan {
            price: 250000,
            ..Plan::default()
        };
        assert_eq!(paid.price_label(), "250000 Toman");
    }
}
