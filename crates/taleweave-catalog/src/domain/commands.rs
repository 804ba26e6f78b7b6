//! Commands for the catalog context.

use taleweave_core::command::Command;
use uuid::Uuid;

use super::episode::NewEpisodeTemplate;
use super::image::NewImage;
use super::series::{NewSeries, SeriesUpdate};
use super::world::{NewWorld, WorldUpdate};

macro_rules! command {
    ($name:ident, $type_name:literal) => {
        impl Command for $name {
            fn command_type(&self) -> &'static str {
                $type_name
            }

            fn correlation_id(&self) -> Uuid {
                self.correlation_id
            }
        }
    };
}

/// Command to create a world.
#[derive(Debug, Clone)]
pub struct CreateWorld {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// World fields.
    pub input: NewWorld,
}
command!(CreateWorld, "catalog.create_world");

/// Command to update a world.
#[derive(Debug, Clone)]
pub struct UpdateWorld {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The world to update.
    pub world_id: Uuid,
    /// Fields to change.
    pub update: WorldUpdate,
}
command!(UpdateWorld, "catalog.update_world");

/// Command to create a series.
#[derive(Debug, Clone)]
pub struct CreateSeries {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Series fields.
    pub input: NewSeries,
}
command!(CreateSeries, "catalog.create_series");

/// Command to update a series.
#[derive(Debug, Clone)]
pub struct UpdateSeries {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The series to update.
    pub series_id: Uuid,
    /// Fields to change.
    pub update: SeriesUpdate,
}
command!(UpdateSeries, "catalog.update_series");

/// Command to publish a series.
#[derive(Debug, Clone)]
pub struct PublishSeries {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The series to publish.
    pub series_id: Uuid,
}
command!(PublishSeries, "catalog.publish_series");

/// Command to create an episode template.
#[derive(Debug, Clone)]
pub struct CreateEpisodeTemplate {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Template fields.
    pub input: NewEpisodeTemplate,
}
command!(CreateEpisodeTemplate, "catalog.create_episode_template");

/// Command to publish an episode template.
#[derive(Debug, Clone)]
pub struct PublishEpisodeTemplate {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The template to publish.
    pub episode_id: Uuid,
}
command!(PublishEpisodeTemplate, "catalog.publish_episode_template");

/// Command to register image metadata.
#[derive(Debug, Clone)]
pub struct RegisterImage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Image fields.
    pub input: NewImage,
}
command!(RegisterImage, "catalog.register_image");

/// Command to delete image metadata.
#[derive(Debug, Clone)]
pub struct DeleteImage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The image to delete.
    pub image_id: Uuid,
}
command!(DeleteImage, "catalog.delete_image");

/// Command to import a YAML content pack.
#[derive(Debug, Clone)]
pub struct ImportContentPack {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Raw YAML document.
    pub document: String,
}
command!(ImportContentPack, "catalog.import_content_pack");
