//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::pipeline::{ItemReport, Pipeline};
use lectern_llm::LlmProvider;
use lectern_notes::ProcessedLedger;
use tracing::{error, info};

/// Execute the analyze command.
pub async fn execute_analyze<L>(
    args: AnalyzeArgs,
    pipeline: &Pipeline<L>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider + Sync,
{
    let mut ledger = ProcessedLedger::load(&config.watch.processed_ids_file)?;

    if let Some(key) = args.target.key {
        let key = key.trim().to_uppercase();
        let report = pipeline.process_item(&key, args.dry_run, formatter).await?;
        if !args.dry_run {
            ledger.record(&key)?;
            print_done(&report, formatter);
        }
        return Ok(());
    }

    let keys: Vec<String> = if args.target.all {
        let items = pipeline.zotero().all_items().await?;
        let total = items.len();
        let pending: Vec<String> = items
            .into_iter()
            .map(|item| item.key)
            .filter(|key| !ledger.contains(key))
            .collect();
        println!(
            "{}",
            formatter.info(&format!(
                "全库共 {} 篇文献，已处理 {} 篇，待处理 {} 篇",
                total,
                total - pending.len(),
                pending.len()
            ))
        );
        pending
    } else {
        let limit = args.target.recent.unwrap_or(1);
        pipeline
            .zotero()
            .recent_items(limit)
            .await?
            .into_iter()
            .map(|item| item.key)
            .collect()
    };

    let (reports, failures) = run_batch(&keys, pipeline, &mut ledger, args.dry_run, config, formatter).await?;
    println!();
    println!("{}", formatter.summary_table(&reports, &failures));
    Ok(())
}

/// Process `keys` in order, pausing between items; failures do not stop the batch.
pub async fn run_batch<L>(
    keys: &[String],
    pipeline: &Pipeline<L>,
    ledger: &mut ProcessedLedger,
    dry_run: bool,
    config: &Config,
    formatter: &Formatter,
) -> Result<(Vec<ItemReport>, Vec<(String, String)>)>
where
    L: LlmProvider + Sync,
{
    let mut reports = Vec::new();
    let mut failures = Vec::new();

    for (i, key) in keys.iter().enumerate() {
        println!();
        println!("{}", formatter.heading(&format!("[{}/{}] {}", i + 1, keys.len(), key)));

        match pipeline.process_item(key, dry_run, formatter).await {
            Ok(report) => {
                if !dry_run {
                    ledger.record(key)?;
                }
                reports.push(report);
            }
            Err(e) => {
                error!(key = %key, error = %e, "Item failed");
                eprintln!("{}", formatter.error(&e.to_string()));
                failures.push((key.clone(), e.to_string()));
            }
        }

        if !dry_run && i + 1 < keys.len() {
            tokio::time::sleep(config.batch_delay()).await;
        }
    }

    info!(processed = reports.len(), failed = failures.len(), "Batch finished");
    Ok((reports, failures))
}

fn print_done(report: &ItemReport, formatter: &Formatter) {
    if let Some(path) = &report.note_path {
        println!("{}", formatter.success(&format!("完成: {} → {}", report.key, path.display())));
    }
}
