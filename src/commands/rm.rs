use owo_colors::OwoColorize;
use serde_json::json;

use super::{Backend, CommandOutput};
use crate::api::ResourceKind;
use crate::cli::OutputOptions;
use crate::error::Result;

/// Delete one record.
pub async fn cmd_rm(kind: ResourceKind, id: &str, output: OutputOptions) -> Result<()> {
    let backend = Backend::connect()?;
    backend.client.delete(kind.endpoint(), id).await?;
    tracing::info!(resource = %kind, id, "record deleted");

    CommandOutput::new(json!({
        "action": "deleted",
        "resource": kind.to_string(),
        "id": id,
    }))
    .with_text(format!("Deleted {} {}", kind, id.cyan()))
    .print(output)
}
