//! Conversation ignition.
//!
//! Ignition turns a character's static definition into a chat-ready opening:
//! a situation, a first line, up to three starter prompts for the player, and
//! an addendum appended to every later system prompt. It runs when a
//! character is created and on explicit regeneration, never during chat.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taleweave_core::error::DomainError;
use taleweave_core::generation::{ChatMessage, CompletionRequest};

use super::character::Character;

/// Most starter prompts kept from a generated ignition.
pub const MAX_STARTER_PROMPTS: usize = 3;

/// Token budget for an ignition completion.
pub const IGNITION_MAX_TOKENS: u32 = 700;

const IGNITION_SYSTEM_PROMPT: &str = "\
You prepare characters for an interactive fiction chat. Given a character \
definition, reply with a single JSON object and nothing else, with these keys:
- \"opening_situation\": one or two sentences of scene-setting in second person.
- \"opening_line\": the character's first line of dialogue, in their voice.
- \"starter_prompts\": up to three short things the player might say first.
- \"system_prompt_addendum\": private guidance for playing this character well.
Never break the character's boundaries.";

/// The generated opening state of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ignition {
    /// Scene-setting shown before the first line.
    pub opening_situation: String,
    /// The character's first line.
    pub opening_line: String,
    /// Suggested first messages for the player.
    pub starter_prompts: Vec<String>,
    /// Extra system-prompt guidance used in every conversation.
    pub system_prompt_addendum: String,
    /// When the ignition was generated.
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RawIgnition {
    #[serde(default)]
    opening_situation: Option<String>,
    #[serde(default)]
    opening_line: Option<String>,
    #[serde(default)]
    starter_prompts: Vec<String>,
    #[serde(default)]
    system_prompt_addendum: Option<String>,
}

fn push_field(prompt: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(prompt, "{label}: {value}");
    }
}

/// Builds the ignition request for `character`. The same definition always
/// yields the same request.
#[must_use]
pub fn build_ignition_request(character: &Character) -> CompletionRequest {
    let mut definition = String::new();
    push_field(&mut definition, "Name", &character.name);
    push_field(&mut definition, "Archetype", &character.archetype);
    push_field(&mut definition, "Personality", &character.personality);
    push_field(&mut definition, "Backstory", &character.backstory);
    push_field(&mut definition, "Speaking style", &character.speaking_style);
    if !character.boundaries.is_empty() {
        definition.push_str("Boundaries:\n");
        for boundary in &character.boundaries {
            let _ = writeln!(definition, "- {boundary}");
        }
    }

    CompletionRequest {
        system: IGNITION_SYSTEM_PROMPT.to_owned(),
        messages: vec![ChatMessage::user(definition)],
        max_tokens: IGNITION_MAX_TOKENS,
        temperature: 0.0,
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::Upstream(format!("ignition reply is missing {field}")))
}

/// Parses a generator reply into an [`Ignition`].
///
/// Accepts a bare JSON object or one wrapped in a fenced code block. Fields
/// are trimmed, blank starter prompts dropped, and at most
/// [`MAX_STARTER_PROMPTS`] kept.
///
/// # Errors
///
/// Returns `DomainError::Upstream` if the reply is not a JSON object or the
/// opening situation or line is missing or blank.
pub fn parse_ignition(raw: &str, now: DateTime<Utc>) -> Result<Ignition, DomainError> {
    let parsed: RawIgnition = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| DomainError::Upstream(format!("ignition reply is not valid JSON: {e}")))?;

    Ok(Ignition {
        opening_situation: required(parsed.opening_situation, "opening_situation")?,
        opening_line: required(parsed.opening_line, "opening_line")?,
        starter_prompts: parsed
            .starter_prompts
            .into_iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .take(MAX_STARTER_PROMPTS)
            .collect(),
        system_prompt_addendum: parsed
            .system_prompt_addendum
            .map(|s| s.trim().to_owned())
            .unwrap_or_default(),
        generated_at: now,
    })
}
