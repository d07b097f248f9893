//! CLI utilities for glovetalk.
//!
//! Configuration profiles, the on-disk directory layout and output
//! formatting shared by the `glovetalk` binary.

pub mod config;
pub mod output;
pub mod paths;

pub use config::{
    ArtifactSettings, Config, ConfigError, GoogleSettings, PlaybackSettings, Profile,
    ProgramSettings, SerialSettings, ToleranceSetting, load_config, mask_api_key,
};
pub use output::OutputFormat;
pub use paths::Paths;
