//! System prompt composition for live chat.

use std::fmt::Write as _;

use taleweave_catalog::domain::episode::Beat;
use taleweave_characters::domain::character::Character;
use taleweave_characters::domain::ignition::Ignition;

use super::aggregates::MadeChoice;

/// Most recalled memories included in a prompt.
pub const MAX_PROMPT_MEMORIES: usize = 5;

/// Everything the system prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    /// The character being played.
    pub character: &'a Character,
    /// The character's ignition, if it has one.
    pub ignition: Option<&'a Ignition>,
    /// The episode's opening situation.
    pub situation: &'a str,
    /// The active beat.
    pub beat: &'a Beat,
    /// Choices made earlier in the session.
    pub choices: &'a [MadeChoice],
    /// Recalled memories, most relevant first.
    pub memories: &'a [String],
}

/// Builds the system prompt for the next reply. The same context always
/// yields the same prompt.
#[must_use]
pub fn compose_system_prompt(ctx: &PromptContext<'_>) -> String {
    let character = ctx.character;
    let mut prompt = format!("You are {}", character.name);
    if !character.archetype.is_empty() {
        let _ = write!(prompt, ", {}", character.archetype);
    }
    prompt.push_str(". Stay in character and never mention being an AI.\n");

    let _ = writeln!(prompt, "\nPersonality: {}", character.personality);
    if !character.backstory.is_empty() {
        let _ = writeln!(prompt, "Backstory: {}", character.backstory);
    }
    if !character.speaking_style.is_empty() {
        let _ = writeln!(prompt, "Speaking style: {}", character.speaking_style);
    }
    if !character.boundaries.is_empty() {
        prompt.push_str("Never cross these boundaries:\n");
        for boundary in &character.boundaries {
            let _ = writeln!(prompt, "- {boundary}");
        }
    }

    if let Some(addendum) = ctx
        .ignition
        .map(|i| i.system_prompt_addendum.as_str())
        .filter(|a| !a.is_empty())
    {
        let _ = writeln!(prompt, "\n{addendum}");
    }

    if !ctx.situation.is_empty() {
        let _ = writeln!(prompt, "\nSituation: {}", ctx.situation);
    }
    let _ = writeln!(
        prompt,
        "\nCurrent beat: {}\n{}",
        ctx.beat.title, ctx.beat.instructions
    );
    if let Some(choice) = &ctx.beat.choice {
        let _ = writeln!(
            prompt,
            "Steer the scene toward this decision for the player: {}",
            choice.prompt
        );
    }

    let consequences: Vec<&MadeChoice> = ctx
        .choices
        .iter()
        .filter(|c| !c.consequence.is_empty())
        .collect();
    if !consequences.is_empty() {
        prompt.push_str("\nWhat has happened so far:\n");
        for choice in consequences {
            let _ = writeln!(prompt, "- {}", choice.consequence);
        }
    }

    if !ctx.memories.is_empty() {
        prompt.push_str("\nThings you remember about the player:\n");
        for memory in ctx.memories.iter().take(MAX_PROMPT_MEMORIES) {
            let _ = writeln!(prompt, "- {memory}");
        }
    }

    prompt
}
