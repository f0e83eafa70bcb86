//! Models command

use anyhow::Result;
use futures::StreamExt;
use genloop_core::{Client, ListConfig};

/// List available models, one per line.
pub async fn models_command(client: &Client, page_size: Option<u32>) -> Result<()> {
    let config = ListConfig {
        page_size,
        filter: None,
    };
    let pager = client.list_models_with(config).await?;

    let mut models = pager.into_stream();
    let mut count = 0usize;
    while let Some(model) = models.next().await {
        let model = model?;
        match model.display_name {
            Some(display_name) => println!("{}  ({})", model.name, display_name),
            None => println!("{}", model.name),
        }
        count += 1;
    }
    tracing::debug!(count, "listed models");

    Ok(())
}
