//! Series: named groupings of episodes with a fixed type tag.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taleweave_core::error::DomainError;
use uuid::Uuid;

/// How a series' episodes relate to one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    /// A single self-contained story.
    Standalone,
    /// Episodes continue one story in order.
    Serial,
    /// Independent stories sharing a theme.
    Anthology,
    /// Characters from several worlds meet.
    Crossover,
    /// Game-like episodes with explicit choices.
    Play,
}

impl SeriesType {
    /// Every accepted series type.
    pub const ALL: [Self; 5] = [
        Self::Standalone,
        Self::Serial,
        Self::Anthology,
        Self::Crossover,
        Self::Play,
    ];

    /// The stored name of this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Serial => "serial",
            Self::Anthology => "anthology",
            Self::Crossover => "crossover",
            Self::Play => "play",
        }
    }
}

impl fmt::Display for SeriesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "unknown series type {s:?}; expected one of standalone, serial, anthology, crossover, play"
                ))
            })
    }
}

/// A series of episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Series identifier.
    pub id: Uuid,
    /// The world the series is set in, if any.
    pub world_id: Option<Uuid>,
    /// Display title.
    pub title: String,
    /// Unique URL slug.
    pub slug: String,
    /// One-line pitch.
    pub tagline: Option<String>,
    /// Series type.
    pub series_type: SeriesType,
    /// Unpublished series are only visible to admins.
    pub is_published: bool,
    /// SHA-256 of the content pack the series was imported from.
    pub content_hash: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a series.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSeries {
    /// Owning world.
    pub world_id: Option<Uuid>,
    /// Display title.
    pub title: String,
    /// Slug; derived from the title when omitted.
    pub slug: Option<String>,
    /// One-line pitch.
    pub tagline: Option<String>,
    /// Series type name; validated against [`SeriesType`].
    pub series_type: String,
}

/// Partial update of a series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesUpdate {
    /// New title.
    pub title: Option<String>,
    /// New tagline.
    pub tagline: Option<String>,
    /// New series type name.
    pub series_type: Option<String>,
}

/// Listing filter for series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesFilter {
    /// Only this type.
    pub series_type: Option<SeriesType>,
    /// Only series in this world.
    pub world_id: Option<Uuid>,
    /// Include unpublished series.
    #[serde(default)]
    pub include_unpublished: bool,
}

impl SeriesFilter {
    /// Whether `series` passes the filter.
    #[must_use]
    pub fn matches(&self, series: &Series) -> bool {
        (self.include_unpublished || series.is_published)
            && self.series_type.is_none_or(|t| t == series.series_type)
            && self.world_id.is_none_or(|w| series.world_id == Some(w))
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("series title must not be empty".into()));
    }
    Ok(())
}

impl Series {
    /// Builds a validated, unpublished series.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a bad title, slug or type.
    pub fn create(input: NewSeries, id: Uuid, now: DateTime<Utc>) -> Result<Self, DomainError> {
        validate_title(&input.title)?;
        let series_type: SeriesType = input.series_type.trim().parse()?;
        let slug = super::slug::resolve_slug(input.slug.as_deref(), &input.title)?;
        Ok(Self {
            id,
            world_id: input.world_id,
            title: input.title.trim().to_owned(),
            slug,
            tagline: input.tagline,
            series_type,
            is_published: false,
            content_hash: None,
            created_at: now,
        })
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a bad title or type.
    pub fn apply_update(&mut self, update: SeriesUpdate) -> Result<(), DomainError> {
        if let Some(title) = update.title {
            validate_title(&title)?;
            self.title = title.trim().to_owned();
        }
        if let Some(tagline) = update.tagline {
            self.tagline = Some(tagline);
        }
        if let Some(series_type) = update.series_type {
            self.series_type = series_type.trim().parse()?;
        }
        Ok(())
    }
}
