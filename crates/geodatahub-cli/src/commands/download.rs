use crate::cli::DownloadArgs;
use crate::context::AppContext;
use crate::errors;
use crate::output_types::DownloadOutput;
use crate::progress::{create_download_bar, create_spinner};
use anyhow::Result;
use console::{style, Term};
use dialoguer::Confirm;
use geodatahub_core::models::{DownloadStatus, RequestOverrides};

pub async fn execute(args: DownloadArgs, ctx: &AppContext<'_>) -> Result<()> {
    let output = ctx.output;
    let parser = ctx.parser().await?;
    let hub = ctx.hub()?;

    output.info(format!("Parsing query: '{}'", args.query));
    let overrides = RequestOverrides {
        limit: args.limit,
        ..Default::default()
    };
    let request = parser.parse(&args.query, &overrides).await?;
    output.kv("Search", &request);

    let spinner = create_spinner("Searching providers...", output.is_json());
    let results = hub.search(&request).await;
    spinner.finish_and_clear();
    let results = results?;

    if results.is_empty() {
        output.info("No results found");
        return Ok(());
    }

    let output_dir = ctx.config.download_dir.value.clone();

    if !args.yes {
        if !Term::stderr().is_term() {
            return Err(errors::confirmation_required().into());
        }

        output.section("Products to download");
        for (i, result) in results.iter().enumerate() {
            println!("  {}. {} ({})", i + 1, result.title, style(result.date()).dim());
        }
        println!();

        let confirmed = Confirm::new()
            .with_prompt(format!("Download {} products to '{}'?", results.len(), output_dir.display()))
            .default(false)
            .interact()?;

        if !confirmed {
            output.info("Download cancelled");
            return Ok(());
        }
    }

    let pb = create_download_bar(results.len() as u64, output.is_json());
    let outcomes = hub
        .download_all_with_progress(&results, &output_dir, |_, outcome| {
            pb.set_message(outcome.result_id.clone());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    let downloaded = outcomes.iter().filter(|o| o.is_success()).count();
    let failed = outcomes.len() - downloaded;

    if output.is_json() {
        output.result(DownloadOutput {
            output_dir: output_dir.display().to_string(),
            requested: results.len(),
            downloaded,
            failed,
            outcomes,
        })?;
    } else {
        output.section("Downloads");
        for outcome in &outcomes {
            match outcome.status {
                DownloadStatus::Downloaded { ref path } => output.success(path.display()),
                DownloadStatus::Failed { ref reason } => {
                    output.warning(format!("{}: {}", outcome.result_id, reason))
                }
            }
        }
        output.info(format!(
            "Downloaded {} of {} products to {}",
            downloaded,
            results.len(),
            output_dir.display()
        ));
    }

    if failed > 0 {
        return Err(errors::downloads_failed(failed, results.len()).into());
    }
    Ok(())
}
