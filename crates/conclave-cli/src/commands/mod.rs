pub mod list;
pub mod rep;
pub mod task;

use anyhow::{Result, bail};

use conclave_core::Coordinator;

use crate::repl::output;

/// The result of dispatching one command line.
#[derive(Debug)]
pub enum CommandResult {
    /// Command handled, keep reading.
    Continue,
    /// User requested exit.
    Quit,
}

/// Parse and dispatch one line of operator input.
pub async fn dispatch(input: &str, coordinator: &Coordinator) -> Result<CommandResult> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    match cmd {
        "exit" | "quit" => {
            return Ok(CommandResult::Quit);
        }

        "help" => {
            output::print_help();
        }

        "list" => {
            list::handle(coordinator).await?;
        }

        "rep" => {
            rep::handle(coordinator).await?;
        }

        "task" => {
            if args.is_empty() {
                bail!("Usage: task <image_path>");
            }
            task::handle(args, coordinator).await?;
        }

        other => {
            output::print_error(&format!("Unknown command: {other}. Type help for a list."));
        }
    }

    Ok(CommandResult::Continue)
}
