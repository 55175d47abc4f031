use crate::context::AppContext;
use crate::output_types::ConfigRow;
use anyhow::Result;
use geodatahub_core::config::default_config_path;

pub fn execute(ctx: &AppContext<'_>) -> Result<()> {
    let mut rows: Vec<ConfigRow> = ctx
        .config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: source.to_string(),
        })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    if let Some(path) = default_config_path() {
        ctx.output.kv("Default config file", path.display());
    }
    ctx.output.section("Effective configuration");
    ctx.output.table(rows)
}
