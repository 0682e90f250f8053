//! Chat command handler.

use std::io::{BufRead, IsTerminal, Read, Write};

use anyhow::{Context, Result};
use kite_assist_core::settings::AssistSettings;
use kite_assist_core::{ChatSession, StreamEvent};

use super::exec;
use crate::render;

pub async fn run(settings: &AssistSettings, show_thinking: bool) -> Result<()> {
    // If stdin is piped, run exec mode instead
    if !std::io::stdin().is_terminal() {
        let mut prompt = String::new();
        std::io::stdin().lock().read_to_string(&mut prompt)?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            anyhow::bail!("No input provided via pipe");
        }
        return exec::run(settings, prompt, show_thinking).await;
    }

    let mut session = ChatSession::new(settings).context("create chat session")?;

    let color = std::io::stdout().is_terminal();
    println!("kite-assist ({})", session.model());
    println!(
        "{}",
        render::render_markdown(&session.messages()[0].content, color)
    );
    println!("Type 'exit' or 'quit' to leave, '/reset' to start over.\n");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF ends the session like 'exit' does.
            println!();
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }
        if input == "/reset" {
            session.reset();
            println!("Session reset.\n");
            continue;
        }

        let mut streamed = String::new();
        let result = session
            .send(input, |event| match event {
                StreamEvent::ContentDelta(text) => {
                    streamed.push_str(text);
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
                StreamEvent::ThinkingDelta(text) => {
                    if show_thinking {
                        eprint!("{text}");
                        let _ = std::io::stderr().flush();
                    }
                }
                StreamEvent::Completed => {}
            })
            .await;

        match result {
            Ok(reply) => {
                if !streamed.is_empty() && reply.content == streamed {
                    println!("\n");
                } else {
                    // The reply was substituted (or nothing streamed);
                    // render it whole, closing any partial line first.
                    if !streamed.is_empty() {
                        println!();
                    }
                    println!("{}\n", render::render_markdown(&reply.content, color));
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat turn rejected");
                eprintln!("error: {err:#}");
            }
        }
    }

    Ok(())
}
