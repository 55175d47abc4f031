use crate::cli::{ListArgs, ListCommand};
use crate::context::AppContext;
use crate::output_types::{ProductRow, ProviderRow};
use anyhow::Result;

pub async fn execute(args: ListArgs, ctx: &AppContext<'_>) -> Result<()> {
    let hub = ctx.hub()?;
    let output = ctx.output;

    match args.command {
        ListCommand::Providers => {
            let rows: Vec<ProviderRow> = hub.list_providers().await?.into_iter().map(ProviderRow::new).collect();
            output.section(format!("{} providers", rows.len()));
            output.table(rows)
        }
        ListCommand::Products { provider } => {
            let products = hub.list_products(provider.as_deref()).await?;
            let rows: Vec<ProductRow> = products.iter().map(ProductRow::from).collect();
            match provider {
                Some(ref p) => output.section(format!("{} product types from {}", rows.len(), p)),
                None => output.section(format!("{} product types", rows.len())),
            }
            output.table(rows)
        }
    }
}
