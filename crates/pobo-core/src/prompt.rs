//! Prompt assembly for the résumé assistant.
//!
//! Pure functions: the responder decides where the context came from, this
//! module turns context, history, and the current message into the single
//! prompt sent to the chat model.

use serde::Serialize;

use crate::fallback::FALLBACK_KNOWLEDGE;
use crate::models::{ConversationTurn, Role, ScoredMatch};

/// Name the assistant uses for its own turns.
pub const ASSISTANT_NAME: &str = "Pobo";

/// Default number of recent turns kept in the prompt.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Shown to the visitor when the chat model call fails.
pub const APOLOGY_MESSAGE: &str = "Sorry, I'm having trouble answering right now. Please try again in a moment, or reach Pabitra directly at write2pabitra@gmail.com.";

const PERSONA: &str = "\
You are Pobo, Pabitra Jiban Maity's AI assistant. You have access to comprehensive knowledge about Pabitra's professional background, skills, projects, and experience.

RESPONSE GUIDELINES:
1. Keep responses CONCISE and to the point - avoid lengthy explanations
2. Use simple, clean text formatting - NO markdown, NO bold/italic, NO asterisks
3. Use proper paragraph breaks for readability
4. Focus on the specific question asked
5. If listing items, use simple bullet points with dashes (-)
6. Maintain a professional, friendly tone
7. If asked about something not in your knowledge base, politely redirect to contact information
8. Use the most relevant information from the provided context

IMPORTANT: Always respond as if you are Pabitra's professional assistant. Be helpful, accurate, and maintain his professional reputation.";

const CLOSING: &str =
    "Please provide a concise, professional response based on this information. Keep it brief and well-formatted.";

/// Why the responder used the static knowledge block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No vector store (or embedding) credential.
    NotConfigured,
    EmbeddingFailed,
    /// The query embedding was a degraded placeholder.
    Degraded,
    StoreFailed,
    Timeout,
    NoMatches,
}

/// Where the prompt context came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextSource {
    /// Retrieved records, in descending similarity order.
    Retrieved { ids: Vec<String> },
    Fallback { reason: FallbackReason },
}

impl ContextSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ContextSource::Fallback { .. })
    }
}

/// Context text plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub source: ContextSource,
    pub text: String,
}

impl PromptContext {
    /// Build context from query matches. Returns `None` for an empty list.
    pub fn from_matches(matches: &[ScoredMatch]) -> Option<Self> {
        if matches.is_empty() {
            return None;
        }
        let text = matches
            .iter()
            .map(|m| m.metadata.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        Some(Self {
            source: ContextSource::Retrieved {
                ids: matches.iter().map(|m| m.id.clone()).collect(),
            },
            text,
        })
    }

    /// The full static knowledge block, verbatim.
    pub fn fallback(reason: FallbackReason) -> Self {
        Self {
            source: ContextSource::Fallback { reason },
            text: FALLBACK_KNOWLEDGE.to_string(),
        }
    }

    fn heading(&self) -> &'static str {
        match self.source {
            ContextSource::Retrieved { .. } => "Relevant Information:",
            ContextSource::Fallback { .. } => "Knowledge Base:",
        }
    }
}

/// The most recent `window` turns, oldest first.
pub fn recent_history(history: &[ConversationTurn], window: usize) -> &[ConversationTurn] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}

/// Render turns as `User: …` / `Pobo: …` lines.
pub fn render_history(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|t| {
            let label = match t.role {
                Role::User => "User",
                Role::Assistant => ASSISTANT_NAME,
            };
            format!("{}: {}", label, t.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the single prompt sent to the chat model.
///
/// `history` is truncated to the last `history_window` turns here, so callers
/// can pass the full client-held conversation.
pub fn assemble_prompt(
    context: &PromptContext,
    history: &[ConversationTurn],
    history_window: usize,
    message: &str,
) -> String {
    let mut prompt = String::with_capacity(PERSONA.len() + context.text.len() + 512);
    prompt.push_str(PERSONA);
    prompt.push_str("\n\n");
    prompt.push_str(context.heading());
    prompt.push('\n');
    prompt.push_str(&context.text);

    let recent = recent_history(history, history_window);
    if !recent.is_empty() {
        prompt.push_str("\n\nPrevious conversation:\n");
        prompt.push_str(&render_history(recent));
    }

    prompt.push_str("\n\nCurrent user message: ");
    prompt.push_str(message);
    prompt.push_str("\n\n");
    prompt.push_str(CLOSING);
    prompt
}
