//! The read, classify and announce loop.

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use glovetalk_gesture::{GestureClassifier, Outcome, Phrasebook, Reading};
use glovetalk_speech::Announcer;
use tracing::{debug, error, info, warn};

use crate::transport::FrameSource;

/// Counters for one driver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub matched: u64,
    pub diagnostics: u64,
    /// Announcements spoken by the local engine.
    pub degraded: u64,
    /// Announcements that failed to play.
    pub failed: u64,
}

/// Runs recognition cycles one after another.
///
/// A cycle reads one reading, classifies it, speaks the phrase and waits for
/// playback to finish; only then does the next cycle start.
pub struct Driver {
    source: Option<Box<dyn FrameSource>>,
    classifier: GestureClassifier,
    phrasebook: Phrasebook,
    announcer: Announcer,
    interval: Duration,
}

impl Driver {
    pub fn new(
        source: Box<dyn FrameSource>,
        classifier: GestureClassifier,
        phrasebook: Phrasebook,
        announcer: Announcer,
        interval: Duration,
    ) -> Self {
        Self {
            source: Some(source),
            classifier,
            phrasebook,
            announcer,
            interval,
        }
    }

    /// Runs until Ctrl-C, or for `max_cycles` cycles.
    pub async fn run(&mut self, max_cycles: Option<u64>) -> anyhow::Result<RunSummary> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let signal = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = tx.send(());
                }
                Err(e) => warn!(error = %e, "driver: cannot listen for ctrl-c"),
            }
        });

        let shutdown = async {
            if rx.await.is_err() {
                std::future::pending::<()>().await;
            }
        };
        let result = self.run_until(max_cycles, shutdown).await;
        signal.abort();
        result
    }

    /// Runs until `shutdown` completes, or for `max_cycles` cycles.
    ///
    /// Shutdown is only observed between cycles; a cycle in progress always
    /// finishes its announcement.
    pub async fn run_until<F>(
        &mut self,
        max_cycles: Option<u64>,
        shutdown: F,
    ) -> anyhow::Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        loop {
            if !self.cycle(&mut summary).await? {
                info!("driver: input exhausted");
                break;
            }

            if max_cycles.is_some_and(|max| summary.cycles >= max) {
                break;
            }
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("driver: shutdown requested");
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(
            cycles = summary.cycles,
            matched = summary.matched,
            diagnostics = summary.diagnostics,
            degraded = summary.degraded,
            failed = summary.failed,
            "driver: stopped"
        );
        Ok(summary)
    }

    /// Runs one cycle. Returns false if the source has run dry.
    async fn cycle(&mut self, summary: &mut RunSummary) -> anyhow::Result<bool> {
        let reading = self.read().await?;
        debug!(?reading, "driver: reading");
        if matches!(reading, Reading::TransportError(_))
            && self.source.as_ref().is_some_and(|s| s.is_exhausted())
        {
            return Ok(false);
        }

        let outcome = self.classifier.recognize(&reading);
        summary.cycles += 1;
        match &outcome {
            Outcome::Matched(_) => summary.matched += 1,
            Outcome::Diagnostic(_) => summary.diagnostics += 1,
        }

        let phrase = self.phrasebook.phrase(&outcome);
        info!(%outcome, %phrase, "driver: recognized");

        match self.announcer.announce(&phrase).await {
            Ok(announcement) => {
                if announcement.degraded.is_some() {
                    summary.degraded += 1;
                }
            }
            Err(e) => {
                error!(error = %e, "driver: announcement failed");
                summary.failed += 1;
            }
        }
        Ok(true)
    }

    /// Reads on the blocking pool; the source moves in and back out.
    async fn read(&mut self) -> anyhow::Result<Reading> {
        let mut source = self.source.take().context("frame source lost")?;
        let (source, reading) = tokio::task::spawn_blocking(move || {
            let reading = source.next_reading();
            (source, reading)
        })
        .await
        .context("frame source panicked")?;
        self.source = Some(source);
        Ok(reading)
    }
}
