//! Example of a tool-using conversation sent as one batch request

use colloquy::prelude::*;
use colloquy::providers::OpenAI;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Reads OPENAI_API_KEY, and OPENAI_BASE_URL / OPENAI_MODEL when set
    let client = OpenAI::from_env()?;

    let mut history = ChatHistory::with_system_message("You explain tool results to the user.");
    history.add_user_message("What is 17 * 23?");
    history.add_tool_message("391", "call_mul_1", "multiply");

    // This is what goes on the wire as `messages`
    for record in client.prepare_chat_history(&history) {
        println!("{}", serde_json::to_string(&record)?);
    }

    let settings = ExecutionSettings::new().with("max_tokens", 100);
    let replies = client
        .complete_chat(&history, &settings, &CompletionOptions::new())
        .await?;

    for reply in replies {
        println!(
            "\n[{}] {}",
            reply.choice_index.unwrap_or_default(),
            reply.content.unwrap_or_default()
        );
    }

    Ok(())
}
