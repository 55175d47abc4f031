use crate::cli::SearchArgs;
use crate::context::AppContext;
use crate::errors;
use crate::output_types::{ResultRow, SearchOutput};
use crate::progress::create_spinner;
use anyhow::{Context, Result};
use geodatahub_core::error::Result as DomainResult;
use geodatahub_core::models::{BoundingBox, RequestOverrides, SearchResult};
use std::fs;
use std::path::Path;

pub async fn execute(args: SearchArgs, ctx: &AppContext<'_>) -> Result<()> {
    let output = ctx.output;
    if !args.has_criteria() {
        return Err(errors::nothing_to_search().into());
    }

    let overrides = overrides(&args)?;
    let parser = ctx.parser().await?;
    let hub = ctx.hub()?;

    let query = args.query.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let request = match query {
        Some(text) => {
            output.info(format!("Parsing query: '{}'", text));
            parser.parse(text, &overrides).await?
        }
        None => parser.from_overrides(&overrides).await?,
    };

    output.section("Request");
    output.kv("Search", &request);

    let spinner = create_spinner("Searching providers...", output.is_json());
    let results = hub.search(&request).await;
    spinner.finish_and_clear();
    let results = results?;

    let saved_to = match args.output {
        Some(ref path) => {
            save_results(&results, path)?;
            Some(path.display().to_string())
        }
        None => None,
    };

    if output.is_json() {
        return output.result(SearchOutput {
            query: query.map(str::to_string),
            request,
            count: results.len(),
            results,
            saved_to,
        });
    }

    if results.is_empty() {
        output.info("No results found");
        return Ok(());
    }

    output.section(format!("Found {} results", results.len()));
    let rows: Vec<ResultRow> = results.iter().enumerate().map(|(i, r)| ResultRow::new(i + 1, r)).collect();
    output.table(rows)?;

    if let Some(path) = saved_to {
        output.success(format!("Results saved to {}", path));
    }
    Ok(())
}

/// Explicit flags as parser overrides
fn overrides(args: &SearchArgs) -> Result<RequestOverrides> {
    let bbox = match args.bbox {
        Some(ref values) => {
            let bbox = BoundingBox::from_slice(values)?;
            bbox.validate()?;
            Some(bbox)
        }
        None => None,
    };

    Ok(RequestOverrides {
        product: args.product.clone(),
        data_type: None,
        provider: args.provider.clone(),
        bbox,
        location_name: args.location.clone(),
        start_date: args.start,
        end_date: args.end,
        cloud_cover_max: args.cloud,
        limit: Some(args.limit),
    })
}

/// Write results as a JSON array of flat objects
fn save_results(results: &[SearchResult], path: &Path) -> Result<()> {
    let flat = results
        .iter()
        .map(SearchResult::to_flat_map)
        .collect::<DomainResult<Vec<_>>>()?;
    let text = serde_json::to_string_pretty(&flat)?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
