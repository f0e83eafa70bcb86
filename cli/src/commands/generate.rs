//! Generate command

use anyhow::Result;
use futures::StreamExt;
use genloop_core::{Client, FunctionCallingConfig, GenerateContentRequest};
use std::io::Write;

/// Generate content for a prompt, optionally streaming fragments as they
/// arrive.
pub async fn generate_command(
    client: &Client,
    prompt: String,
    stream: bool,
    max_remote_calls: Option<u32>,
) -> Result<()> {
    let mut request = GenerateContentRequest::from_text(prompt);
    if let Some(maximum_remote_calls) = max_remote_calls {
        request = request.with_function_calling(FunctionCallingConfig {
            maximum_remote_calls,
            ..Default::default()
        });
    }

    if stream {
        let mut fragments = client.generate_content_stream(request).await?;
        let mut stdout = std::io::stdout();
        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            if let Some(text) = fragment.text() {
                write!(stdout, "{}", text)?;
                stdout.flush()?;
            }
        }
        writeln!(stdout)?;
    } else {
        let response = client.generate_content(request).await?;
        match response.text() {
            Some(text) => println!("{}", text),
            None => tracing::warn!("response contained no text"),
        }
        if let Some(usage) = response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "token usage"
            );
        }
    }

    Ok(())
}
