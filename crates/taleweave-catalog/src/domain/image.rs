//! Image metadata for avatars, scenes and covers.
//!
//! Bytes live in object storage; only the storage key and descriptive
//! metadata are kept here.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taleweave_core::error::DomainError;
use uuid::Uuid;

/// Accepted image MIME types.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

/// What kind of record an image is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOwnerKind {
    /// A world.
    World,
    /// A series.
    Series,
    /// A character.
    Character,
    /// An episode template.
    Episode,
}

impl ImageOwnerKind {
    /// The stored name of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Series => "series",
            Self::Character => "character",
            Self::Episode => "episode",
        }
    }
}

impl fmt::Display for ImageOwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageOwnerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "world" => Ok(Self::World),
            "series" => Ok(Self::Series),
            "character" => Ok(Self::Character),
            "episode" => Ok(Self::Episode),
            other => Err(DomainError::Validation(format!(
                "unknown image owner kind {other:?}"
            ))),
        }
    }
}

/// How an image is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePurpose {
    /// Character portrait.
    Avatar,
    /// Scene illustration.
    Scene,
    /// Cover art.
    Cover,
}

impl ImagePurpose {
    /// The stored name of this purpose.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Scene => "scene",
            Self::Cover => "cover",
        }
    }
}

impl FromStr for ImagePurpose {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avatar" => Ok(Self::Avatar),
            "scene" => Ok(Self::Scene),
            "cover" => Ok(Self::Cover),
            other => Err(DomainError::Validation(format!(
                "unknown image purpose {other:?}"
            ))),
        }
    }
}

/// Metadata for one stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image identifier.
    pub id: Uuid,
    /// Kind of owning record.
    pub owner_kind: ImageOwnerKind,
    /// Owning record id.
    pub owner_id: Uuid,
    /// How the image is used.
    pub purpose: ImagePurpose,
    /// Object storage key.
    pub storage_key: String,
    /// MIME type.
    pub mime_type: String,
    /// Width in pixels.
    pub width: Option<i32>,
    /// Height in pixels.
    pub height: Option<i32>,
    /// Prompt the image was generated from, if generated.
    pub prompt: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for registering an image.
#[derive(Debug, Clone, Deserialize)]
pub struct NewImage {
    /// Kind of owning record.
    pub owner_kind: ImageOwnerKind,
    /// Owning record id.
    pub owner_id: Uuid,
    /// How the image is used.
    pub purpose: ImagePurpose,
    /// Object storage key.
    pub storage_key: String,
    /// MIME type.
    pub mime_type: String,
    /// Width in pixels.
    pub width: Option<i32>,
    /// Height in pixels.
    pub height: Option<i32>,
    /// Generation prompt.
    pub prompt: Option<String>,
}

impl Image {
    /// Builds validated image metadata.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unsafe storage key, an
    /// unsupported MIME type, or non-positive dimensions.
    pub fn create(input: NewImage, id: Uuid, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let key = input.storage_key.trim();
        if key.is_empty()
            || key.starts_with('/')
            || key.split('/').any(|segment| segment.is_empty() || segment == "..")
        {
            return Err(DomainError::Validation(format!(
                "invalid storage key {key:?}"
            )));
        }
        if !ALLOWED_MIME_TYPES.contains(&input.mime_type.as_str()) {
            return Err(DomainError::Validation(format!(
                "unsupported image type {:?}",
                input.mime_type
            )));
        }
        if input.width.is_some_and(|w| w <= 0) || input.height.is_some_and(|h| h <= 0) {
            return Err(DomainError::Validation(
                "image dimensions must be positive".into(),
            ));
        }
        Ok(Self {
            id,
            owner_kind: input.owner_kind,
            owner_id: input.owner_id,
            purpose: input.purpose,
            storage_key: key.to_owned(),
            mime_type: input.mime_type,
            width: input.width,
            height: input.height,
            prompt: input.prompt,
            created_at: now,
        })
    }

    /// Public URL of the image under `asset_base_url`.
    #[must_use]
    pub fn public_url(&self, asset_base_url: &str) -> String {
        format!(
            "{}/{}",
            asset_base_url.trim_end_matches('/'),
            self.storage_key
        )
    }
}
