#![deny(clippy::all, clippy::pedantic)]

use serde_json::json;

use crate::args::AdminCmd;
use crate::client::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: AdminCmd) -> Result<(), CliError> {
    match cmd {
        AdminCmd::Stats => {
            let stats = ctx.admin().stats().await?;
            let categories: Vec<_> = stats
                .categories
                .iter()
                .map(|entry| {
                    json!({
                        "category": entry.category,
                        "count": entry.count,
                        "percentage": (stats.percentage(entry) * 10.0).round() / 10.0,
                    })
                })
                .collect();
            print_json(&json!({ "total": stats.total, "categories": categories }))
        }
        AdminCmd::DeleteAll { yes } => {
            if !yes {
                return Err(CliError::InvalidInput(
                    "deleting every post cannot be undone; pass --yes to confirm".into(),
                ));
            }
            print_json(&ctx.admin().delete_all().await?)
        }
        AdminCmd::Import { count } => {
            let count = count.unwrap_or(ctx.settings.import.default_count);
            let summary = ctx.admin().import(count).await?;
            print_json(&summary)
        }
    }
}
