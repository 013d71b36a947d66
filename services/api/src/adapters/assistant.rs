//! services/api/src/adapters/assistant.rs
//!
//! This module contains the adapter for the slide-writing assistant. It implements
//! the `AssistantService` port from the `core` crate on top of the OpenAI
//! Assistants API, keeping one conversation thread per project so that later
//! slides can build on earlier ones.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::assistants::{
        CreateMessageRequestArgs, CreateRunRequestArgs, CreateThreadRequestArgs, MessageContent,
        MessageRole, RunStatus,
    },
    Client,
};
use async_trait::async_trait;
use pitchdeck_core::ports::{AssistantService, PortError, PortResult};
use regex::Regex;
use std::time::Duration;
use tokio::time::Instant;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AssistantService` using the OpenAI Assistants API.
#[derive(Clone)]
pub struct OpenAiAssistantAdapter {
    client: Client<OpenAIConfig>,
    assistant_id: String,
    poll_interval: Duration,
    run_timeout: Duration,
}

impl OpenAiAssistantAdapter {
    /// Creates a new `OpenAiAssistantAdapter`.
    pub fn new(
        client: Client<OpenAIConfig>,
        assistant_id: String,
        poll_interval: Duration,
        run_timeout: Duration,
    ) -> Self {
        Self {
            client,
            assistant_id,
            poll_interval,
            run_timeout,
        }
    }

    /// Strips assistant artifacts the renderer cannot use: code fences, markdown
    /// emphasis markers and file-search citations like `【4:0†source】`.
    fn clean_response(text: &str) -> String {
        let citation_regex = Regex::new(r"【.*?】").unwrap();
        let without_citations = citation_regex.replace_all(text, "");

        let lines: Vec<String> = without_citations
            .lines()
            .filter(|line| !line.trim().starts_with("```"))
            .map(|line| line.replace("**", "").replace('*', ""))
            .collect();

        // Collapse runs of blank lines left behind by the filtering above.
        let mut cleaned: Vec<&str> = Vec::new();
        let mut last_blank = true;
        for line in lines.iter().map(|l| l.trim_end()) {
            let blank = line.trim().is_empty();
            if blank && last_blank {
                continue;
            }
            cleaned.push(line);
            last_blank = blank;
        }
        while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
            cleaned.pop();
        }
        cleaned.join("\n")
    }
}

//=========================================================================================
// `AssistantService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AssistantService for OpenAiAssistantAdapter {
    /// Creates a fresh conversation thread and returns its handle.
    async fn create_thread(&self) -> PortResult<String> {
        let request = CreateThreadRequestArgs::default()
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let thread = self
            .client
            .threads()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;
        Ok(thread.id)
    }

    /// Appends `message` to the thread, runs the assistant over it and returns
    /// the cleaned reply text.
    async fn run_prompt(&self, thread_id: &str, message: &str) -> PortResult<String> {
        let message_request = CreateMessageRequestArgs::default()
            .role(MessageRole::User)
            .content(message)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.client
            .threads()
            .messages(thread_id)
            .create(message_request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let run_request = CreateRunRequestArgs::default()
            .assistant_id(&self.assistant_id)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let run = self
            .client
            .threads()
            .runs(thread_id)
            .create(run_request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // Poll the run at a fixed interval until it settles or the deadline passes.
        let deadline = Instant::now() + self.run_timeout;
        loop {
            let current = self
                .client
                .threads()
                .runs(thread_id)
                .retrieve(&run.id)
                .await
                .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

            match current.status {
                RunStatus::Completed => break,
                RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling => {
                    if Instant::now() >= deadline {
                        return Err(PortError::Timeout(format!(
                            "Assistant run {} did not finish within {:?}",
                            run.id, self.run_timeout
                        )));
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                other => {
                    return Err(PortError::Unexpected(format!(
                        "Assistant run {} ended with status {:?}",
                        run.id, other
                    )));
                }
            }
        }

        // The newest message on the thread is the assistant's reply.
        let messages = self
            .client
            .threads()
            .messages(thread_id)
            .list()
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let reply = messages
            .data
            .first()
            .ok_or_else(|| PortError::Unexpected("Assistant produced no reply".to_string()))?;

        let text = reply
            .content
            .iter()
            .find_map(|part| match part {
                MessageContent::Text(text) => Some(text.text.value.clone()),
                _ => None,
            })
            .ok_or_else(|| {
                PortError::Unexpected("Assistant reply contained no text".to_string())
            })?;

        Ok(Self::clean_response(&text))
    }
}

//=========================================================================================
// Unit Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_response_strips_code_fences() {
        let raw = "```\nTitle\n- Point one\n```";
        assert_eq!(
            OpenAiAssistantAdapter::clean_response(raw),
            "Title\n- Point one"
        );
    }

    #[test]
    fn clean_response_strips_citations_and_emphasis() {
        let raw = "**Market**\nLarge market【4:0†source】 growing fast.";
        assert_eq!(
            OpenAiAssistantAdapter::clean_response(raw),
            "Market\nLarge market growing fast."
        );
    }

    #[test]
    fn clean_response_collapses_blank_runs() {
        let raw = "Line one\n\n\n\nLine two\n\n";
        assert_eq!(
            OpenAiAssistantAdapter::clean_response(raw),
            "Line one\n\nLine two"
        );
    }
}
