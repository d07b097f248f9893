//! CLI commands module.

mod classify;
mod config;
mod run;
mod say;

pub use classify::ClassifyCommand;
pub use config::ConfigCommand;
pub use run::RunCommand;
pub use say::SayCommand;

use glovetalk_cli::{Config, OutputFormat, Profile, load_config};

use crate::Cli;

/// Loads the configuration file.
pub(crate) fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    Ok(load_config(cli.config.as_deref())?)
}

/// Resolves the profile to use and applies command line overrides.
pub(crate) fn get_profile(cli: &Cli) -> anyhow::Result<Profile> {
    let cfg = get_config(cli)?;
    let mut profile = cfg.resolve_profile(cli.profile.as_deref())?;
    apply_overrides(cli, &mut profile);
    Ok(profile)
}

/// Applies --port and --dataset to a profile.
pub(crate) fn apply_overrides(cli: &Cli, profile: &mut Profile) {
    if let Some(port) = &cli.port {
        profile.serial.port = port.clone();
    }
    if let Some(dataset) = &cli.dataset {
        profile.dataset = Some(dataset.clone());
    }
}

/// Returns the output format selected on the command line.
pub(crate) fn output_format(cli: &Cli) -> OutputFormat {
    if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    }
}

/// Prints success message.
pub(crate) fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_overrides_replace_profile_values() {
        let cli = Cli::parse_from([
            "glovetalk",
            "--port",
            "/dev/ttyACM0",
            "--dataset",
            "gestures.csv",
            "classify",
            "1,2,3,4,5",
        ]);
        let mut profile = Profile::default();
        profile.serial.port = "COM4".to_string();

        apply_overrides(&cli, &mut profile);

        assert_eq!(profile.serial.port, "/dev/ttyACM0");
        assert_eq!(profile.dataset.as_deref(), Some(std::path::Path::new("gestures.csv")));
    }

    #[test]
    fn test_get_profile_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "current_profile: lab\nprofiles:\n  lab:\n    channels: 11\n    serial:\n      port: COM4\n",
        )
        .unwrap();
        let path_arg = path.to_string_lossy().to_string();

        let cli = Cli::parse_from(["glovetalk", "--config", &path_arg, "say", "hello"]);
        let profile = get_profile(&cli).unwrap();
        assert_eq!(profile.channels, 11);
        assert_eq!(profile.serial.port, "COM4");

        let cli = Cli::parse_from(["glovetalk", "--config", &path_arg, "-p", "missing", "say", "hi"]);
        assert!(get_profile(&cli).is_err());
    }

    #[test]
    fn test_output_format() {
        let cli = Cli::parse_from(["glovetalk", "--json", "classify", "1"]);
        assert_eq!(output_format(&cli), OutputFormat::Json);
    }
}
