//! Watch command implementation.

use crate::cli::WatchArgs;
use crate::commands::analyze::run_batch;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use crate::pipeline::Pipeline;
use lectern_llm::LlmProvider;
use lectern_notes::ProcessedLedger;
use lectern_zotero::ZoteroClient;
use std::collections::HashSet;
use tokio::time::interval;
use tracing::{debug, error, info};

/// Execute the watch command.
pub async fn execute_watch<L>(
    args: WatchArgs,
    pipeline: &Pipeline<L>,
    config: &Config,
    formatter: &Formatter,
) -> Result<()>
where
    L: LlmProvider + Sync,
{
    let mut ledger = ProcessedLedger::load(&config.watch.processed_ids_file)?;

    if args.once {
        let pending = new_keys(pipeline, config, &ledger, &HashSet::new()).await?;
        if pending.is_empty() {
            println!("{}", formatter.info("没有新文献"));
            return Ok(());
        }
        let (reports, failures) = run_batch(&pending, pipeline, &mut ledger, false, config, formatter).await?;
        println!("{}", formatter.summary_table(&reports, &failures));
        return Ok(());
    }

    // Items present at startup are not new, whether processed or not
    let mut known = library_keys(pipeline.zotero()).await?;
    info!(known = known.len(), interval = ?config.poll_interval(), "Watching library");
    println!(
        "{}",
        formatter.info(&format!(
            "监听中（每 {} 秒检查一次，Ctrl+C 退出），已标记 {} 篇现有文献",
            config.watch.poll_interval_secs,
            known.len()
        ))
    );

    let mut ticker = interval(config.poll_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let pending = match new_keys(pipeline, config, &ledger, &known).await {
                    Ok(pending) => pending,
                    Err(e) => {
                        error!(error = %e, "Poll failed");
                        continue;
                    }
                };
                let Some(key) = pending.first() else {
                    debug!("No new items");
                    continue;
                };

                known.insert(key.clone());
                println!("{}", formatter.info(&format!("发现新文献: {}", key)));
                match pipeline.process_item(key, false, formatter).await {
                    Ok(_) => ledger.record(key)?,
                    Err(e) => {
                        error!(key = %key, error = %e, "Item failed");
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping watch");
                println!("{}", formatter.info("已停止监听"));
                break;
            }
        }
    }

    Ok(())
}

/// Keys of every item in the library, across all pages.
pub async fn library_keys(zotero: &ZoteroClient) -> Result<HashSet<String>> {
    let items = zotero.all_items().await?;
    Ok(items.into_iter().map(|item| item.key).collect())
}

/// Recent items neither processed nor already known, newest first.
async fn new_keys<L>(
    pipeline: &Pipeline<L>,
    config: &Config,
    ledger: &ProcessedLedger,
    known: &HashSet<String>,
) -> Result<Vec<String>>
where
    L: LlmProvider + Sync,
{
    let items = pipeline.zotero().recent_items(config.watch.recent_window).await?;
    Ok(items
        .into_iter()
        .map(|item| item.key)
        .filter(|key| !ledger.contains(key) && !known.contains(key))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_zotero::ZoteroConfig;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(key: &str) -> serde_json::Value {
        json!({"key": key, "version": 1, "data": {"key": key, "version": 1, "itemType": "journalArticle", "title": key}})
    }

    #[tokio::test]
    async fn test_library_keys_covers_items_past_the_first_page() {
        let server = MockServer::start().await;
        let first: Vec<_> = (0..100).map(|i| item(&format!("NEW{}", i))).collect();
        Mock::given(method("GET"))
            .and(path("/users/42/items/top"))
            .and(query_param("start", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(first)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/42/items/top"))
            .and(query_param("start", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([item("OLD")])))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = ZoteroClient::new(&ZoteroConfig {
            library_id: "42".to_string(),
            api_key: "zkey".to_string(),
            local_storage: dir.path().to_path_buf(),
            api_base: server.uri(),
            ..Default::default()
        })
        .unwrap();

        let known = library_keys(&client).await.unwrap();
        assert_eq!(known.len(), 101);
        assert!(known.contains("OLD"));
    }
}
