//! Save command implementation.

use crate::cli::SaveArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::pipeline::Pipeline;
use lectern_llm::LlmProvider;
use std::io::{self, Read};

/// Execute the save command, reading the analysis from stdin.
pub async fn execute_save<L>(args: SaveArgs, pipeline: &Pipeline<L>, formatter: &Formatter) -> Result<()>
where
    L: LlmProvider + Sync,
{
    let mut analysis = String::new();
    io::stdin().read_to_string(&mut analysis)?;
    if analysis.trim().is_empty() {
        return Err(CliError::InvalidInput("stdin is empty, no analysis to save".to_string()));
    }

    let key = args.key.trim().to_uppercase();
    let report = pipeline.save_external(&key, &analysis, formatter).await?;
    println!("{}", formatter.success(&format!("保存完成: {}", report.key)));
    Ok(())
}
