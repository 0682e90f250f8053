//! Exec command handler.

use std::io::{IsTerminal, Write};

use anyhow::{Context, Result};
use kite_assist_core::settings::AssistSettings;
use kite_assist_core::{ChatSession, StreamEvent};

use crate::render;

/// Sends one prompt and streams the reply to stdout.
///
/// Content deltas are printed incrementally as they arrive; the final
/// newline is added at the end. When the session substitutes an offline
/// reply (request failure, or mid-stream failure after a partial reply),
/// the final content no longer matches what was streamed, so it is
/// rendered whole instead.
pub async fn run(settings: &AssistSettings, prompt: &str, show_thinking: bool) -> Result<()> {
    let mut session = ChatSession::new(settings).context("create chat session")?;

    let mut streamed = String::new();
    let reply = session
        .send(prompt, |event| match event {
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
        .await?;

    if !streamed.is_empty() && reply.content == streamed {
        println!();
    } else {
        // A partial stream already on screen is terminated first.
        if !streamed.is_empty() {
            println!();
        }
        let color = std::io::stdout().is_terminal();
        println!("{}", render::render_markdown(&reply.content, color));
    }

    Ok(())
}
