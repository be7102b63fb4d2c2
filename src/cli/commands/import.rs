//! Import command handler

use std::path::Path;

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_import(config: Config, file: &Path) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let shared = SharedState::new(config).await?;
    let summary = shared.importer().import_file(file).await?;

    println!(
        "✓ Imported {} movies from {} ({} rows skipped)",
        summary.imported,
        file.display(),
        summary.skipped
    );

    Ok(())
}
