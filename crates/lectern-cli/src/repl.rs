//! Interactive follow-up chat about one paper.

use crate::error::Result;
use crate::output::Formatter;
use lectern_analyzer::ChatSession;
use lectern_domain::PaperMetadata;
use lectern_llm::LlmProvider;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use tracing::debug;

const PROMPT: &str = "你: ";

/// What one input line asks for.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Empty,
    Exit,
    Clear,
    Info,
    Question(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    match line.to_lowercase().as_str() {
        "q" | "exit" | "quit" | "退出" => ChatInput::Exit,
        "/clear" => ChatInput::Clear,
        "/info" => ChatInput::Info,
        _ => ChatInput::Question(line),
    }
}

/// Run the chat loop until the user leaves.
pub async fn run_chat<L>(session: &mut ChatSession<L>, metadata: &PaperMetadata, formatter: &Formatter) -> Result<()>
where
    L: LlmProvider + Sync,
{
    println!(
        "{}",
        formatter.info("论文追问模式 · 输入 q/exit/退出 结束，/clear 清空历史，/info 查看论文信息")
    );
    println!("{}", formatter.paper_info(metadata, session.model()));
    println!();

    let mut editor = DefaultEditor::new()?;
    let history_path = history_path();
    if let Some(path) = &history_path {
        history_ok("load", path, editor.load_history(path));
    }

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let input = parse_input(&line);
                if let ChatInput::Question(question) = &input {
                    editor.add_history_entry(*question).ok();
                }

                match input {
                    ChatInput::Empty => continue,
                    ChatInput::Exit => {
                        println!("{}", formatter.info("👋 退出追问模式"));
                        break;
                    }
                    ChatInput::Clear => {
                        session.clear();
                        println!("{}", formatter.success("对话历史已清空"));
                    }
                    ChatInput::Info => {
                        println!("{}", formatter.paper_info(metadata, session.model()));
                    }
                    ChatInput::Question(question) => match session.ask(question).await {
                        Ok(reply) => println!("\n🤖 {}\n", reply.trim()),
                        Err(e) => eprintln!("{}", formatter.error(&format!("调用失败: {}", e))),
                    },
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("{}", formatter.info("👋 退出追问模式"));
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    if let Some(path) = &history_path {
        history_ok("save", path, editor.save_history(path));
    }

    Ok(())
}

/// History is best-effort: a failed load or save is logged and the chat goes on.
fn history_ok(action: &str, path: &Path, result: rustyline::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Could not {} chat history", action);
            false
        }
    }
}

/// Get the chat history file path.
fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".lectern").join("chat_history"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        for word in ["q", "exit", "QUIT", "退出", "  quit  "] {
            assert_eq!(parse_input(word), ChatInput::Exit, "{word}");
        }
    }

    #[test]
    fn test_history_failure_is_reported_not_raised() {
        let path = Path::new("/nonexistent/chat_history");
        let missing = ReadlineError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "no history"));
        assert!(!history_ok("load", path, Err(missing)));
        assert!(history_ok("save", path, Ok(())));
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse_input("/clear"), ChatInput::Clear);
        assert_eq!(parse_input("/info"), ChatInput::Info);
        assert_eq!(parse_input("   "), ChatInput::Empty);
    }

    #[test]
    fn test_question_is_trimmed() {
        assert_eq!(parse_input("  什么是主要贡献？ "), ChatInput::Question("什么是主要贡献？"));
    }
}
