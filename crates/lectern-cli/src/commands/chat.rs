//! Chat command implementation.

use crate::cli::ChatArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::pipeline::extract_blocking;
use crate::repl;
use lectern_analyzer::{group_thousands, ChatContext, ChatSession};
use lectern_llm::LlmProvider;
use lectern_notes::{find_note_for_key, load_note};
use lectern_zotero::{PdfTextExtractor, ZoteroClient};
use tracing::warn;

/// Execute the chat command.
pub async fn execute_chat<L>(args: ChatArgs, provider: L, config: &Config, formatter: &Formatter) -> Result<()>
where
    L: LlmProvider + Sync,
{
    let model = config.model(args.model.as_deref()).to_string();
    config.validate_model(&model)?;

    let key = args.key.as_deref().map(|k| k.trim().to_uppercase());
    let context = load_context(&args, key.as_deref(), config, formatter).await?;

    let mut session = ChatSession::new(provider, model, &context, &config.analysis.limits);
    repl::run_chat(&mut session, &context.metadata, formatter).await
}

async fn load_context(
    args: &ChatArgs,
    key: Option<&str>,
    config: &Config,
    formatter: &Formatter,
) -> Result<ChatContext> {
    let mut context = ChatContext::default();

    let note_path = match (&args.md, key) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(key)) => {
            let found = find_note_for_key(&config.output.notes_dir, key);
            match &found {
                Some(path) => println!("{}", formatter.success(&format!("找到已有分析: {}", path.display()))),
                None => println!("{}", formatter.info("未找到已有分析，将直接加载元数据和 PDF")),
            }
            found
        }
        (None, None) => None,
    };

    if let Some(path) = note_path {
        let note = load_note(&path)?;
        context.metadata = note.metadata;
        context.prior_analysis = Some(note.body).filter(|b| !b.trim().is_empty());
    }

    let Some(key) = key else {
        return finish(context);
    };
    if context.metadata.key.is_empty() {
        context.metadata.key = key.to_string();
    }

    let client = match ZoteroClient::new(&config.zotero) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "Zotero unavailable for chat context");
            None
        }
    };

    if let Some(client) = &client {
        if context.metadata.title.is_none() {
            match client.metadata(key).await {
                Ok(metadata) => context.metadata = metadata,
                Err(e) => println!("{}", formatter.warning(&format!("获取 Zotero 元数据失败: {}", e))),
            }
        }

        if !args.no_pdf {
            if let Some(path) = client.find_pdf(key).await {
                let pdf = PdfTextExtractor::new(&config.pdf.pdftotext);
                if let Some(document) = extract_blocking(&pdf, &path, config.pdf.max_chars).await {
                    println!(
                        "{}",
                        formatter.info(&format!(
                            "PDF 已加载: {} 页，{} 字符",
                            document.page_count,
                            group_thousands(document.text.chars().count())
                        ))
                    );
                    context.document_text = Some(document.text);
                }
            }
        }
    }

    finish(context)
}

fn finish(context: ChatContext) -> Result<ChatContext> {
    if context.metadata.title.is_none() && context.prior_analysis.is_none() {
        return Err(CliError::InvalidInput(
            "could not load the paper, check --key or --md".to_string(),
        ));
    }
    Ok(context)
}
