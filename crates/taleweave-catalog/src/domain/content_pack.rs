//! Content packs: declarative YAML documents that seed a series.
//!
//! A pack names a series (and optionally its world) and lists episodes. Each
//! episode carries its beats either as YAML or as a Markdown script:
//!
//! ```markdown
//! ## The Arrival
//! Greet the player at the door. Be wary.
//!
//! Exchanges: 2
//!
//! ### Choice: Let them in?
//! - admit: Open the door => You let the stranger in out of the rain.
//! - refuse: Keep it shut => The stranger's knocking fades into the storm.
//! ```
//!
//! Every `##` heading starts a beat, paragraphs become its instructions, an
//! `Exchanges: N` paragraph sets its length, and list items under a
//! `### Choice` heading become options (`key: label => consequence`).

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use taleweave_core::error::DomainError;
use uuid::Uuid;

use super::episode::{
    Beat, ChoiceOption, ChoicePoint, DEFAULT_TARGET_EXCHANGES, validate_beats,
};
use super::slug::slugify;
use super::world::NewWorld;

/// The series section of a pack.
#[derive(Debug, Clone, Deserialize)]
pub struct PackSeries {
    /// Display title.
    pub title: String,
    /// Slug; derived from the title when omitted. Re-imports match on it.
    pub slug: Option<String>,
    /// One-line pitch.
    pub tagline: Option<String>,
    /// Series type name.
    #[serde(rename = "type")]
    pub series_type: String,
    /// Publish the series and its episodes on import.
    #[serde(default)]
    pub publish: bool,
}

/// One episode of a pack.
#[derive(Debug, Clone, Deserialize)]
pub struct PackEpisode {
    /// Position within the series.
    pub number: i32,
    /// Display title.
    pub title: String,
    /// Opening situation.
    #[serde(default)]
    pub situation: String,
    /// Default character.
    pub character_id: Option<Uuid>,
    /// Beats given directly.
    #[serde(default)]
    pub beats: Vec<Beat>,
    /// Beats given as a Markdown script.
    pub script: Option<String>,
}

/// A parsed content pack.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentPack {
    /// World to create (or reuse by slug).
    pub world: Option<NewWorld>,
    /// Series to create.
    pub series: PackSeries,
    /// Episodes in order.
    #[serde(default)]
    pub episodes: Vec<PackEpisode>,
}

/// A pack whose scripts have been compiled into beats.
#[derive(Debug, Clone)]
pub struct CompiledPack {
    /// The pack, with every episode's `beats` filled in and `script` cleared.
    pub pack: ContentPack,
    /// Hex SHA-256 of the raw document.
    pub content_hash: String,
}

/// Hex SHA-256 of `raw`.
#[must_use]
pub fn content_hash(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    format!("{digest:x}")
}

/// Parses and compiles a YAML content pack.
///
/// # Errors
///
/// Returns `DomainError::Validation` for malformed YAML, an episode with both
/// or neither of `beats` and `script`, a bad script, duplicate episode
/// numbers, or a broken beat contract.
pub fn compile_content_pack(raw: &str) -> Result<CompiledPack, DomainError> {
    let mut pack: ContentPack = serde_yaml::from_str(raw)
        .map_err(|e| DomainError::Validation(format!("content pack is not valid YAML: {e}")))?;

    let mut numbers = std::collections::HashSet::new();
    for episode in &mut pack.episodes {
        if !numbers.insert(episode.number) {
            return Err(DomainError::Validation(format!(
                "episode number {} appears twice",
                episode.number
            )));
        }
        if let Some(script) = episode.script.take() {
            if !episode.beats.is_empty() {
                return Err(DomainError::Validation(format!(
                    "episode {} gives both beats and a script",
                    episode.number
                )));
            }
            episode.beats = parse_beat_script(&script)?;
        }
        validate_beats(&episode.beats).map_err(|e| match e {
            DomainError::Validation(msg) => {
                DomainError::Validation(format!("episode {}: {msg}", episode.number))
            }
            other => other,
        })?;
    }

    Ok(CompiledPack {
        pack,
        content_hash: content_hash(raw),
    })
}

#[derive(Debug)]
struct BeatDraft {
    title: String,
    paragraphs: Vec<String>,
    target_exchanges: u32,
    choice: Option<ChoicePoint>,
}

impl BeatDraft {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            paragraphs: Vec::new(),
            target_exchanges: DEFAULT_TARGET_EXCHANGES,
            choice: None,
        }
    }

    fn finish(self) -> Result<Beat, DomainError> {
        let key = slugify(&self.title);
        if key.is_empty() {
            return Err(DomainError::Validation(format!(
                "beat heading {:?} has no usable characters",
                self.title
            )));
        }
        Ok(Beat {
            key,
            title: self.title,
            instructions: self.paragraphs.join("\n\n"),
            target_exchanges: self.target_exchanges,
            choice: self.choice,
        })
    }
}

fn parse_option(line: &str) -> Result<ChoiceOption, DomainError> {
    let (key, rest) = line.split_once(':').ok_or_else(|| {
        DomainError::Validation(format!("choice option {line:?} must look like `key: label`"))
    })?;
    let (label, consequence) = match rest.split_once("=>") {
        Some((label, consequence)) => (label, consequence),
        None => (rest, ""),
    };
    Ok(ChoiceOption {
        key: key.trim().to_owned(),
        label: label.trim().to_owned(),
        consequence: consequence.trim().to_owned(),
    })
}

/// Compiles a Markdown beat script into beats.
///
/// # Errors
///
/// Returns `DomainError::Validation` for content before the first beat
/// heading that is not a title, an unknown `###` section, a malformed
/// `Exchanges:` value or option line.
pub fn parse_beat_script(markdown: &str) -> Result<Vec<Beat>, DomainError> {
    let mut beats = Vec::new();
    let mut current: Option<BeatDraft> = None;
    let mut text = String::new();
    let mut item_depth = 0_usize;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { .. } | Tag::Paragraph) if item_depth == 0 => text.clear(),
            Event::Start(Tag::Item) => {
                item_depth += 1;
                text.clear();
            }
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(TagEnd::Heading(HeadingLevel::H2)) => {
                if let Some(draft) = current.take() {
                    beats.push(draft.finish()?);
                }
                current = Some(BeatDraft::new(text.trim()));
            }
            Event::End(TagEnd::Heading(HeadingLevel::H3)) => {
                let draft = current.as_mut().ok_or_else(|| {
                    DomainError::Validation("`###` section before any `##` beat".into())
                })?;
                let heading = text.trim();
                let prompt = heading
                    .strip_prefix("Choice")
                    .ok_or_else(|| {
                        DomainError::Validation(format!("unknown beat section {heading:?}"))
                    })?
                    .trim_start_matches(':')
                    .trim();
                draft.choice = Some(ChoicePoint {
                    prompt: prompt.to_owned(),
                    options: Vec::new(),
                });
            }
            Event::End(TagEnd::Paragraph) if item_depth == 0 => {
                let paragraph = text.trim();
                let Some(draft) = current.as_mut() else {
                    continue;
                };
                if let Some(value) = paragraph.strip_prefix("Exchanges:") {
                    draft.target_exchanges = value.trim().parse().map_err(|_| {
                        DomainError::Validation(format!(
                            "beat {:?}: exchanges must be a whole number",
                            draft.title
                        ))
                    })?;
                } else if !paragraph.is_empty() {
                    draft.paragraphs.push(paragraph.to_owned());
                }
            }
            Event::End(TagEnd::Item) => {
                item_depth = item_depth.saturating_sub(1);
                let line = text.trim().to_owned();
                text.clear();
                match current.as_mut().and_then(|d| d.choice.as_mut()) {
                    Some(choice) => choice.options.push(parse_option(&line)?),
                    None => {
                        if let Some(draft) = current.as_mut() {
                            draft.paragraphs.push(format!("- {line}"));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(draft) = current.take() {
        beats.push(draft.finish()?);
    }
    Ok(beats)
}
