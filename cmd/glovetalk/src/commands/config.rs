//! Configuration management commands.

use clap::{Args, Subcommand};
use glovetalk_cli::{
    Config, GoogleSettings, Profile, ProgramSettings, ToleranceSetting, mask_api_key,
};
use glovetalk_gesture::ChannelPolicy;

use super::{apply_overrides, get_config, output_format, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Profiles describe one glove deployment each (serial link, dataset,
/// channel policy, tolerances, speech engines), similar to kubectl's
/// context management.
///
/// Configuration is stored in ~/.glovetalk/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add or replace a profile (takes the serial port and dataset from
    /// --port and --dataset)
    #[command(name = "add-profile")]
    AddProfile(AddProfileArgs),
    /// Delete a profile
    #[command(name = "delete-profile")]
    DeleteProfile {
        /// Profile name
        name: String,
    },
    /// Set the current profile
    #[command(name = "use-profile")]
    UseProfile {
        /// Profile name
        name: String,
    },
    /// Display the current profile
    #[command(name = "get-profile")]
    GetProfile,
    /// List all profiles
    #[command(name = "list-profiles", alias = "get-profiles")]
    ListProfiles,
    /// View the current configuration
    View,
}

#[derive(Args)]
struct AddProfileArgs {
    /// Profile name
    name: String,
    /// Serial baud rate
    #[arg(long)]
    baud_rate: Option<u32>,
    /// Serial read timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Number of sensor channels
    #[arg(long)]
    channels: Option<usize>,
    /// Channel policy: exact or leading
    #[arg(long, value_parser = parse_channel_policy)]
    channel_policy: Option<ChannelPolicy>,
    /// Tolerance ratio, or one ratio per channel separated by commas
    #[arg(long, value_delimiter = ',')]
    tolerance: Vec<f64>,
    /// Speech language tag
    #[arg(long)]
    language: Option<String>,
    /// Google Cloud API key for Text-to-Speech
    #[arg(long)]
    google_api_key: Option<String>,
    /// Google Text-to-Speech base URL
    #[arg(long)]
    google_base_url: Option<String>,
    /// Local speech program
    #[arg(long)]
    speaker: Option<String>,
    /// Audio player program
    #[arg(long)]
    player: Option<String>,
    /// Pause between cycles in milliseconds
    #[arg(long)]
    cycle_interval_ms: Option<u64>,
}

fn parse_channel_policy(s: &str) -> Result<ChannelPolicy, String> {
    match s.to_ascii_lowercase().as_str() {
        "exact" => Ok(ChannelPolicy::Exact),
        "leading" => Ok(ChannelPolicy::Leading),
        other => Err(format!("unknown channel policy '{other}' (expected exact or leading)")),
    }
}

impl AddProfileArgs {
    fn to_profile(&self) -> Profile {
        let mut profile = Profile::default();

        if let Some(baud) = self.baud_rate {
            profile.serial.baud_rate = baud;
        }
        if let Some(timeout) = self.timeout_ms {
            profile.serial.timeout_ms = timeout;
        }
        if let Some(channels) = self.channels {
            profile.channels = channels;
        }
        if let Some(policy) = self.channel_policy {
            profile.channel_policy = policy;
        }
        match self.tolerance.as_slice() {
            [] => {}
            [ratio] => profile.tolerance = ToleranceSetting::Uniform(*ratio),
            ratios => profile.tolerance = ToleranceSetting::PerChannel(ratios.to_vec()),
        }
        if let Some(language) = &self.language {
            profile.language = language.clone();
        }
        if let Some(key) = &self.google_api_key {
            profile.google = Some(GoogleSettings {
                api_key: key.clone(),
                base_url: self.google_base_url.clone().unwrap_or_default(),
            });
        }
        profile.speaker = self.speaker.as_ref().map(|program| ProgramSettings {
            program: program.clone(),
            args: Vec::new(),
        });
        profile.player = self.player.as_ref().map(|program| ProgramSettings {
            program: program.clone(),
            args: Vec::new(),
        });
        if let Some(interval) = self.cycle_interval_ms {
            profile.cycle_interval_ms = interval;
        }
        profile
    }
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddProfile(args) => {
                let mut cfg = get_config(cli)?;
                let mut profile = args.to_profile();
                apply_overrides(cli, &mut profile);
                cfg.add_profile(&args.name, profile)?;
                print_success(&format!("Profile \"{}\" added successfully", args.name));
                Ok(())
            }

            ConfigSubcommand::DeleteProfile { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_profile(name)?;
                print_success(&format!("Profile \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseProfile { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_profile(name)?;
                print_success(&format!("Switched to profile \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetProfile => {
                let cfg = get_config(cli)?;
                if cfg.current_profile.is_empty() {
                    println!("No current profile set");
                } else {
                    println!("{}", cfg.current_profile);
                }
                Ok(())
            }

            ConfigSubcommand::ListProfiles => {
                let cfg = get_config(cli)?;
                if cfg.profiles.is_empty() {
                    println!("No profiles configured");
                    return Ok(());
                }

                println!(
                    "{:<8} {:<16} {:<16} {:<9} {}",
                    "CURRENT", "NAME", "PORT", "CHANNELS", "DATASET"
                );
                for (name, profile) in &cfg.profiles {
                    let current = if name == &cfg.current_profile { "*" } else { "" };
                    let dataset = profile
                        .dataset
                        .as_ref()
                        .map(|d| d.display().to_string())
                        .unwrap_or_default();
                    println!(
                        "{:<8} {:<16} {:<16} {:<9} {}",
                        current, name, profile.serial.port, profile.channels, dataset
                    );
                }
                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;
                println!("# Config file: {}", cfg.path().display());
                output_format(cli).print(&masked(&cfg))?;
                Ok(())
            }
        }
    }
}

/// Returns a copy of the configuration with API keys masked.
fn masked(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if let Some(google) = profile.google.as_mut() {
            google.api_key = mask_api_key(&google.api_key);
        }
    }
    cfg
}
