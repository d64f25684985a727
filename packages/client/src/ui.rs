//! UI utilities for the client.

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::error::ClientError;

/// Prompt shown while waiting for input
pub fn prompt(username: &str) -> String {
    format!("{}> ", username)
}

/// Redisplay the prompt after printing a message from the server
pub fn redisplay_prompt(username: &str) {
    print!("{}", prompt(username));
    std::io::stdout().flush().ok();
}

/// Ask for a username interactively.
pub fn ask_username() -> Result<String, ClientError> {
    let mut editor = DefaultEditor::new()?;
    let line = editor.readline("Enter your username: ")?;
    let username = line.trim().to_string();
    if username.is_empty() {
        return Err(ClientError::EmptyUsername);
    }
    Ok(username)
}

/// Read lines from the terminal on a dedicated thread.
///
/// The receiver closes on Ctrl+C, Ctrl+D or an input error. The thread is
/// a plain OS thread so a pending `readline` never holds up process exit.
pub fn spawn_input_reader(username: &str) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);
    let prompt = prompt(username);

    std::thread::spawn(move || {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                tracing::error!("Failed to open terminal: {}", e);
                return;
            }
        };

        loop {
            match editor.readline(&prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Input error: {}", e);
                    break;
                }
            }
        }
    });

    rx
}
