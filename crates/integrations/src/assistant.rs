//! Chat assistant
//!
//! The assistant is a seam for an AI backend. The bundled [`CannedAssistant`]
//! answers from a keyword table after an artificial delay.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{IntegrationError, IntegrationResult};

/// Something the user attached to a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attachment {
    /// Uploaded image
    Image { name: String },
    /// Uploaded document (PDF, ZIP, TXT, ...)
    File { name: String },
}

/// A chat message for the assistant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantRequest {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl AssistantRequest {
    /// Creates a text-only request
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    /// Attaches an upload
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// True when there is neither text nor an attachment
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.attachment.is_none()
    }
}

/// Trait for chat assistants
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Produces a reply to `request`
    async fn respond(&self, request: &AssistantRequest) -> IntegrationResult<String>;
}

/// Greeting shown when a chat opens
pub const WELCOME_MESSAGE: &str =
    "Hello! I'm the CARVFi assistant. Ask me about points, your profile, rewards or protection.";

const KEYWORD_REPLIES: &[(&[&str], &str)] = &[
    (
        &["hello", "hi", "hey"],
        "Welcome! I'm the CARVFi assistant. How can I help you on the platform today?",
    ),
    (
        &["help"],
        "I can help you set up your profile, earn points, protect your account and explore CARVFi.",
    ),
    (
        &["points", "point"],
        "You earn points by logging in daily, chatting with me, completing your profile and inviting friends.",
    ),
    (
        &["profile"],
        "Open the Profile tab to create or edit your profile.",
    ),
    (
        &["rewards", "reward"],
        "Check the Rewards tab to see what you have earned and how to earn more.",
    ),
    (
        &["protection", "bot", "bots"],
        "Our protection layer blocks bots and flags suspicious behaviour.",
    ),
    (
        &["carv", "carvfi"],
        "CARVFi runs on the Carv SVM testnet, a network focused on digital identity.",
    ),
];

const DEFAULT_REPLY: &str = "Interesting question! I can tell you more about points, your profile or account protection.";

/// Keyword-matching assistant with a simulated response delay
#[derive(Debug, Clone)]
pub struct CannedAssistant {
    delay: Duration,
}

impl CannedAssistant {
    /// Creates an assistant that waits `delay` before answering
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    fn reply_for(request: &AssistantRequest) -> String {
        match &request.attachment {
            Some(Attachment::Image { name }) => format!(
                "I've looked at the image you uploaded ({}). Tell me what you'd like to know about it.",
                name
            ),
            Some(Attachment::File { name }) => format!(
                "I've processed the file you uploaded ({}). What would you like to know about it?",
                name
            ),
            None => {
                let text = request.text.to_lowercase();
                let words: Vec<&str> = text
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|w| !w.is_empty())
                    .collect();
                KEYWORD_REPLIES
                    .iter()
                    .find(|(keywords, _)| keywords.iter().any(|k| words.contains(k)))
                    .map(|(_, reply)| reply.to_string())
                    .unwrap_or_else(|| DEFAULT_REPLY.to_string())
            }
        }
    }
}

impl Default for CannedAssistant {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[async_trait]
impl Assistant for CannedAssistant {
    async fn respond(&self, request: &AssistantRequest) -> IntegrationResult<String> {
        if request.is_empty() {
            return Err(IntegrationError::EmptyPrompt);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let reply = Self::reply_for(request);
        debug!(chars = request.text.len(), "Assistant replied");
        Ok(reply)
    }
}
