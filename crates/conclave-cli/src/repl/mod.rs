pub mod output;

use std::sync::Arc;

use anyhow::Result;
use rustyline::DefaultEditor;

use conclave_core::Coordinator;

use crate::commands::{self, CommandResult};

/// Run the interactive operator loop.
pub async fn run(coordinator: Arc<Coordinator>, bind_addr: &str) -> Result<()> {
    output::print_welcome(bind_addr);

    let mut rl = DefaultEditor::new()?;

    loop {
        let peer_count = coordinator.peers().await.len();
        let prompt = output::build_prompt(peer_count);

        // Read the line in a blocking thread so the registration listener
        // keeps running underneath.
        let line = {
            let prompt_clone = prompt.clone();
            tokio::task::spawn_blocking(move || {
                // Create a temporary editor for the blocking read.
                // This is a workaround because rustyline's Editor is not Send.
                let mut editor = DefaultEditor::new().expect("failed to create editor");
                editor.readline(&prompt_clone)
            })
            .await?
        };

        match line {
            Ok(input) => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    continue;
                }

                // Add to history on the main editor (best-effort).
                let _ = rl.add_history_entry(trimmed);

                match commands::dispatch(trimmed, &coordinator).await {
                    Ok(CommandResult::Quit) => break,
                    Ok(CommandResult::Continue) => {}
                    Err(e) => output::print_error(&format!("{e:#}")),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ctrl-C: ignore, just print a new prompt.
                println!("(Use exit or Ctrl-D to leave)");
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                // Ctrl-D: exit.
                break;
            }
            Err(e) => {
                output::print_error(&format!("Input error: {e}"));
                break;
            }
        }
    }

    output::print_success("Goodbye.");
    Ok(())
}
