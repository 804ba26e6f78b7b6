//! Character definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taleweave_core::error::DomainError;
use uuid::Uuid;

use super::ignition::Ignition;

/// Longest accepted character name.
pub const MAX_NAME_LEN: usize = 80;

/// Most boundaries a character may declare.
pub const MAX_BOUNDARIES: usize = 20;

/// An AI-driven character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Character identifier.
    pub id: Uuid,
    /// The member who created the character.
    pub creator_id: Uuid,
    /// Display name.
    pub name: String,
    /// Short archetype, e.g. `"retired sea captain"`.
    pub archetype: String,
    /// Personality description.
    pub personality: String,
    /// Backstory.
    pub backstory: String,
    /// How the character talks.
    pub speaking_style: String,
    /// Things the character will never do or say.
    pub boundaries: Vec<String>,
    /// Opening state, once ignition has run.
    pub ignition: Option<Ignition>,
    /// Public characters are visible to everyone.
    pub is_public: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a character.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCharacter {
    /// Display name.
    pub name: String,
    /// Short archetype.
    #[serde(default)]
    pub archetype: String,
    /// Personality description.
    pub personality: String,
    /// Backstory.
    #[serde(default)]
    pub backstory: String,
    /// How the character talks.
    #[serde(default)]
    pub speaking_style: String,
    /// Hard limits.
    #[serde(default)]
    pub boundaries: Vec<String>,
    /// Visible to everyone.
    #[serde(default)]
    pub is_public: bool,
}

/// Partial update of a character. Never re-runs ignition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterUpdate {
    /// New name.
    pub name: Option<String>,
    /// New archetype.
    pub archetype: Option<String>,
    /// New personality.
    pub personality: Option<String>,
    /// New backstory.
    pub backstory: Option<String>,
    /// New speaking style.
    pub speaking_style: Option<String>,
    /// New boundaries.
    pub boundaries: Option<Vec<String>>,
    /// New visibility.
    pub is_public: Option<bool>,
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "character name must be 1..={MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_owned())
}

fn validate_personality(personality: &str) -> Result<String, DomainError> {
    let personality = personality.trim();
    if personality.is_empty() {
        return Err(DomainError::Validation(
            "character personality must not be empty".into(),
        ));
    }
    Ok(personality.to_owned())
}

fn tidy_boundaries(boundaries: Vec<String>) -> Result<Vec<String>, DomainError> {
    let tidy: Vec<String> = boundaries
        .into_iter()
        .map(|b| b.trim().to_owned())
        .filter(|b| !b.is_empty())
        .collect();
    if tidy.len() > MAX_BOUNDARIES {
        return Err(DomainError::Validation(format!(
            "at most {MAX_BOUNDARIES} boundaries are allowed"
        )));
    }
    Ok(tidy)
}

impl Character {
    /// Builds a validated character without ignition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a bad name, an empty
    /// personality, or too many boundaries.
    pub fn create(
        input: NewCharacter,
        id: Uuid,
        creator_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            creator_id,
            name: validate_name(&input.name)?,
            archetype: input.archetype.trim().to_owned(),
            personality: validate_personality(&input.personality)?,
            backstory: input.backstory.trim().to_owned(),
            speaking_style: input.speaking_style.trim().to_owned(),
            boundaries: tidy_boundaries(input.boundaries)?,
            ignition: None,
            is_public: input.is_public,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` under the same rules as
    /// [`Character::create`].
    pub fn apply_update(
        &mut self,
        update: CharacterUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if let Some(name) = update.name {
            self.name = validate_name(&name)?;
        }
        if let Some(personality) = update.personality {
            self.personality = validate_personality(&personality)?;
        }
        if let Some(boundaries) = update.boundaries {
            self.boundaries = tidy_boundaries(boundaries)?;
        }
        if let Some(archetype) = update.archetype {
            self.archetype = archetype.trim().to_owned();
        }
        if let Some(backstory) = update.backstory {
            self.backstory = backstory.trim().to_owned();
        }
        if let Some(style) = update.speaking_style {
            self.speaking_style = style.trim().to_owned();
        }
        if let Some(is_public) = update.is_public {
            self.is_public = is_public;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Whether the character can be seen by `user_id`.
    #[must_use]
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.is_public || self.creator_id == user_id
    }

    /// Fails unless `user_id` created the character.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Forbidden` for anyone but the creator.
    pub fn ensure_creator(&self, user_id: Uuid) -> Result<(), DomainError> {
        if self.creator_id == user_id {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "only the creator may change this character".into(),
            ))
        }
    }
}
