//! Example of streaming a reply, stopping early with Ctrl-C or a word limit

use colloquy::prelude::*;
use colloquy::providers::OpenAI;
use futures::StreamExt;
use std::time::Duration;

const MAX_INCREMENTS: usize = 200;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = OpenAI::from_env()?;

    let mut history = ChatHistory::with_system_message("You are a poet.");
    history.add_user_message("Write a haiku about Rust programming");

    let options = CompletionOptions::new().with_timeout(Duration::from_secs(30));
    let mut stream = client
        .complete_chat_stream(&history, &ExecutionSettings::new().with("temperature", 0.9), &options)
        .await?;

    println!("Streaming response...\n");

    let mut accumulator = StreamAccumulator::new();
    loop {
        tokio::select! {
            item = stream.next() => match item {
                Some(chunks) => {
                    for chunk in chunks? {
                        print!("{}", chunk.content.as_deref().unwrap_or_default());
                        accumulator.push(chunk);
                    }
                    if stream.increments() >= MAX_INCREMENTS {
                        println!("\n\nStopping early");
                        break;
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\n\nCancelled");
                break;
            }
        }
    }
    // Dropping the stream closes the connection
    drop(stream);

    for message in accumulator.into_messages() {
        println!("\nFull response: {}", message.content.unwrap_or_default());
    }

    Ok(())
}
