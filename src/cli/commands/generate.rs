//! Generate command handler

use std::path::Path;

use crate::services::generator::{fetch_mock_data, write_rows};

pub async fn cmd_generate(count: usize, file: &Path, url: &str) -> anyhow::Result<()> {
    let data = match fetch_mock_data(url).await {
        Ok(data) => data,
        Err(e) => {
            println!("Can't fetch data from {url}: {e}");
            return Ok(());
        }
    };

    write_rows(&data, count, file).await?;
    println!("✓ File {} was created with {count} movies", file.display());

    Ok(())
}
