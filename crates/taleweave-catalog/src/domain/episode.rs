//! Episode templates and the beats that structure them.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taleweave_core::error::DomainError;
use uuid::Uuid;

/// Exchanges a beat lasts when the author does not say.
pub const DEFAULT_TARGET_EXCHANGES: u32 = 3;

fn default_target_exchanges() -> u32 {
    DEFAULT_TARGET_EXCHANGES
}

/// One option at a choice point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Stable key the client submits.
    pub key: String,
    /// Text shown to the player.
    pub label: String,
    /// What the character is told happened, once chosen.
    #[serde(default)]
    pub consequence: String,
}

/// A decision the player must make to leave a beat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoicePoint {
    /// Question put to the player.
    pub prompt: String,
    /// Available options.
    pub options: Vec<ChoiceOption>,
}

impl ChoicePoint {
    /// Looks up an option by key.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.key == key)
    }
}

/// An authored narrative checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beat {
    /// Key unique within the episode.
    pub key: String,
    /// Short title.
    pub title: String,
    /// Instructions for the character while this beat is active.
    pub instructions: String,
    /// Exchanges before the beat is complete.
    #[serde(default = "default_target_exchanges")]
    pub target_exchanges: u32,
    /// Optional decision that ends the beat.
    #[serde(default)]
    pub choice: Option<ChoicePoint>,
}

/// Checks the beat contract of an episode.
///
/// # Errors
///
/// Returns `DomainError::Validation` when there are no beats, a key is blank
/// or repeated, `target_exchanges` is zero, or a choice point has fewer than
/// two options or repeats an option key.
pub fn validate_beats(beats: &[Beat]) -> Result<(), DomainError> {
    if beats.is_empty() {
        return Err(DomainError::Validation(
            "an episode needs at least one beat".into(),
        ));
    }
    let mut keys = HashSet::new();
    for beat in beats {
        if beat.key.trim().is_empty() {
            return Err(DomainError::Validation("beat key must not be empty".into()));
        }
        if !keys.insert(beat.key.as_str()) {
            return Err(DomainError::Validation(format!(
                "duplicate beat key {:?}",
                beat.key
            )));
        }
        if beat.target_exchanges == 0 {
            return Err(DomainError::Validation(format!(
                "beat {:?} must last at least one exchange",
                beat.key
            )));
        }
        if let Some(choice) = &beat.choice {
            if choice.options.len() < 2 {
                return Err(DomainError::Validation(format!(
                    "choice in beat {:?} needs at least two options",
                    beat.key
                )));
            }
            let mut option_keys = HashSet::new();
            if let Some(dup) = choice
                .options
                .iter()
                .find(|o| o.key.trim().is_empty() || !option_keys.insert(o.key.as_str()))
            {
                return Err(DomainError::Validation(format!(
                    "choice in beat {:?} has a blank or duplicate option key {:?}",
                    beat.key, dup.key
                )));
            }
        }
    }
    Ok(())
}

/// An authored episode within a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeTemplate {
    /// Template identifier.
    pub id: Uuid,
    /// The series the episode belongs to.
    pub series_id: Uuid,
    /// Position within the series, starting at 1.
    pub episode_number: i32,
    /// Display title.
    pub title: String,
    /// The situation the player walks into.
    pub situation: String,
    /// Default character for the episode.
    pub character_id: Option<Uuid>,
    /// Ordered beats.
    pub beats: Vec<Beat>,
    /// Unpublished templates cannot be played.
    pub is_published: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for creating an episode template.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEpisodeTemplate {
    /// Owning series.
    pub series_id: Uuid,
    /// Position within the series.
    pub episode_number: i32,
    /// Display title.
    pub title: String,
    /// Opening situation.
    #[serde(default)]
    pub situation: String,
    /// Default character.
    pub character_id: Option<Uuid>,
    /// Ordered beats.
    pub beats: Vec<Beat>,
}

impl EpisodeTemplate {
    /// Builds a validated, unpublished template.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a bad number, blank title, or a
    /// broken beat contract.
    pub fn create(
        input: NewEpisodeTemplate,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if input.episode_number < 1 {
            return Err(DomainError::Validation(
                "episode number must be at least 1".into(),
            ));
        }
        if input.title.trim().is_empty() {
            return Err(DomainError::Validation("episode title must not be empty".into()));
        }
        validate_beats(&input.beats)?;
        Ok(Self {
            id,
            series_id: input.series_id,
            episode_number: input.episode_number,
            title: input.title.trim().to_owned(),
            situation: input.situation.trim().to_owned(),
            character_id: input.character_id,
            beats: input.beats,
            is_published: false,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(key: &str) -> Beat {
        Beat {
            key: key.into(),
            title: key.into(),
            instructions: "Stay in character.".into(),
            target_exchanges: 2,
            choice: None,
        }
    }

    fn option(key: &str) -> ChoiceOption {
        ChoiceOption {
            key: key.into(),
            label: key.into(),
            consequence: String::new(),
        }
    }

    #[test]
    fn test_validate_beats_accepts_well_formed_plan() {
        let mut second = beat("door");
        second.choice = Some(ChoicePoint {
            prompt: "Open it?".into(),
            options: vec![option("open"), option("leave")],
        });

        assert!(validate_beats(&[beat("arrival"), second]).is_ok());
    }

    #[test]
    fn test_validate_beats_rejects_empty_and_duplicates() {
        assert!(validate_beats(&[]).is_err());
        assert!(validate_beats(&[beat("a"), beat("a")]).is_err());
    }

    #[test]
    fn test_validate_beats_rejects_zero_exchanges() {
        let mut b = beat("a");
        b.target_exchanges = 0;

        assert!(validate_beats(&[b]).is_err());
    }

    #[test]
    fn test_validate_beats_rejects_thin_or_repeated_choices() {
        let mut single = beat("a");
        single.choice = Some(ChoicePoint {
            prompt: "?".into(),
            options: vec![option("x")],
        });
        let mut repeated = beat("b");
        repeated.choice = Some(ChoicePoint {
            prompt: "?".into(),
            options: vec![option("x"), option("x")],
        });

        assert!(validate_beats(&[single]).is_err());
        assert!(validate_beats(&[repeated]).is_err());
    }

    #[test]
    fn test_beat_defaults_target_exchanges_when_deserialized() {
        let beat: Beat = serde_json::from_value(serde_json::json!({
            "key": "k", "title": "t", "instructions": "i"
        }))
        .unwrap();

        assert_eq!(beat.target_exchanges, DEFAULT_TARGET_EXCHANGES);
        assert!(beat.choice.is_none());
    }
}
