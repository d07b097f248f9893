//! Speech feedback for recognized gestures.
//!
//! This crate provides:
//! - [`CloudSynthesizer`] and [`LocalSpeaker`]: the two synthesis capabilities
//! - [`SpeechSynthesizer`]: cloud-first synthesis with a local fallback
//! - [`AudioArtifact`] and [`ArtifactStore`]: uniquely named temporary audio
//! - [`AudioDevice`] and [`Player`]: blocking playback with retried cleanup
//! - [`Announcer`]: synthesis and playback as one step
//! - [`GoogleTts`], [`CommandSpeaker`], [`CommandDevice`]: concrete engines
//!
//! # Example
//!
//! ```rust,ignore
//! use glovetalk_speech::{Announcer, ArtifactStore, CommandDevice, CommandSpeaker, GoogleTts, Player, SpeechSynthesizer};
//!
//! let cloud = GoogleTts::new(api_key).ok().map(|c| Arc::new(c) as Arc<dyn CloudSynthesizer>);
//! let synthesizer = SpeechSynthesizer::new(cloud, Arc::new(CommandSpeaker::espeak("ml")), ArtifactStore::new(dir));
//! let player = Player::new(Box::new(CommandDevice::mpg123()));
//!
//! let mut announcer = Announcer::new(synthesizer, player, "ml-IN");
//! announcer.announce("hello").await?;
//! ```

mod announcer;
mod artifact;
mod cleanup;
mod command;
mod google;
mod player;
mod synth;

pub use announcer::*;
pub use artifact::*;
pub use cleanup::*;
pub use command::*;
pub use google::*;
pub use player::*;
pub use synth::*;
