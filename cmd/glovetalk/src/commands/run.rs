//! The recognition loop command.

use anyhow::Context;
use clap::Args;
use tracing::info;

use super::get_profile;
use crate::Cli;
use crate::driver::Driver;
use crate::pipeline::{build_announcer, load_classifier};
use crate::transport::{FrameSource, LineReader, SerialConfig, SerialSource};

/// Read, classify and announce gestures from the glove.
///
/// Runs until Ctrl-C. Each cycle reads the latest frame, speaks the
/// recognized gesture (or a diagnostic phrase) and waits for playback to
/// finish before the next cycle.
#[derive(Args)]
pub struct RunCommand {
    /// Stop after this many cycles
    #[arg(long)]
    cycles: Option<u64>,

    /// Read frames from stdin instead of the serial port
    #[arg(long)]
    stdin: bool,
}

impl RunCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let profile = get_profile(cli)?;
        let classifier = load_classifier(&profile)?;
        let announcer = build_announcer(&profile)?;

        let source: Box<dyn FrameSource> = if self.stdin {
            Box::new(LineReader::new(std::io::stdin()))
        } else {
            if profile.serial.port.is_empty() {
                anyhow::bail!("no serial port configured; pass --port or set `serial.port` in the profile");
            }
            let config = SerialConfig {
                port: profile.serial.port.clone(),
                baud_rate: profile.serial.baud_rate,
                timeout: profile.serial_timeout(),
            };
            let source = SerialSource::open(config)
                .with_context(|| format!("failed to open serial port {}", profile.serial.port))?;
            Box::new(source)
        };

        let mut driver = Driver::new(
            source,
            classifier,
            profile.phrases.clone(),
            announcer,
            profile.cycle_interval(),
        );
        let summary = driver.run(self.cycles).await?;
        info!(cycles = summary.cycles, "run finished");
        Ok(())
    }
}
