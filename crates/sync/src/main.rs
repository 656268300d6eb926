use anyhow::Context;

use tagsync_sync::{InMemoryCountSink, InMemoryRetirementSink, SyncConfig, SyncInputs, run_sync};

fn main() -> anyhow::Result<()> {
    let config = SyncConfig::load();
    tagsync_observability::init(config.log_format);

    tracing::info!(
        scan = %config.scan_path.display(),
        catalog = %config.catalog_path.display(),
        sale = ?config.sale_path,
        "starting sync run"
    );

    let inputs = SyncInputs::load(&config)?;

    let counts = InMemoryCountSink::new();
    let retirements = InMemoryRetirementSink::new();
    let report = run_sync(&inputs, &config.status_filter, &counts, &retirements)?;

    if report.has_diagnostics() {
        tracing::warn!(count = report.diagnostics.len(), "run finished with diagnostics to review");
    }

    let rendered = serde_json::to_string_pretty(&report)?;
    if let Some(path) = &config.report_path {
        std::fs::write(path, &rendered)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "report written");
    }
    println!("{rendered}");

    Ok(())
}
