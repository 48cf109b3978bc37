#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the gazetteer toolchain.
//!
//! [`IndicatifProgress`] renders batch ingestion through the
//! [`ProgressCallback`] trait, and [`init_logger`] routes `log` output
//! through `indicatif-log-bridge` so lines don't tear the progress bars.

use std::sync::Arc;
use std::time::Duration;

use gazetteer_provenance::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Progress of a provenance ingestion run, drawn as an `indicatif` bar.
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style used once the number of records is known.
    counted_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Adds an ingestion bar to `multi`.
    ///
    /// Shows a spinner with `message` until the record count arrives, then
    /// records done out of total with an ETA.
    #[must_use]
    pub fn records_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        Arc::new(Self::new(multi, message))
    }

    fn new(multi: &MultiProgress, message: &str) -> Self {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let counted_style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.cyan/dim} {pos}/{len} records [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");

        Self { bar, counted_style }
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.counted_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Initializes `pretty_env_logger` wrapped in `indicatif-log-bridge`.
///
/// Logs at `info` unless `RUST_LOG` says otherwise. Returns the
/// [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let logger = builder.build();
    let level = logger.filter();

    // Already set in tests.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    #[test]
    fn counts_ingested_records() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let progress = IndicatifProgress::new(&multi, "Ingesting");

        progress.set_total(3);
        progress.inc(1);
        progress.inc(1);
        progress.set_message("Ingesting 42".to_string());

        assert_eq!(progress.bar.length(), Some(3));
        assert_eq!(progress.bar.position(), 2);
        assert_eq!(progress.bar.message(), "Ingesting 42");

        progress.finish("done".to_string());
        assert!(progress.bar.is_finished());
    }
}
