#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal helpers for the helix command line tools.
//!
//! [`init_logger`] installs a `pretty_env_logger` behind
//! `indicatif-log-bridge`, so log lines printed during an import do not
//! tear the progress bar. [`IndicatifProgress`] renders import progress
//! through the [`ProgressCallback`] trait.

use std::time::Duration;

use helix_import::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Style used once the row count is known.
    bar_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Creates a row progress bar.
    ///
    /// Starts as a spinner and switches to a bar with percentage and ETA
    /// once [`ProgressCallback::set_total`] is called.
    #[must_use]
    pub fn rows_bar(multi: &MultiProgress, message: &str) -> Self {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let bar_style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.green/dim} {pos}/{len} rows {percent}% [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Self { bar, bar_style }
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
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

/// Filter used when `RUST_LOG` is unset: the helix crates at `info`,
/// everything else at `warn`.
pub const DEFAULT_LOG_FILTER: &str =
    "warn,helix=info,helix_address=info,helix_property=info,helix_import=info";

/// Returns the filter directives to log with, preferring `env` when it is
/// set and non-empty.
#[must_use]
pub fn log_filter(env: Option<&str>) -> &str {
    env.map(str::trim)
        .filter(|filter| !filter.is_empty())
        .unwrap_or(DEFAULT_LOG_FILTER)
}

/// Initializes the global logger from `RUST_LOG` (or
/// [`DEFAULT_LOG_FILTER`]), wrapped so that log output is suspended while
/// progress bars redraw.
///
/// Returns the [`MultiProgress`] that progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let env = std::env::var("RUST_LOG").ok();
    let logger = pretty_env_logger::formatted_builder()
        .parse_filters(log_filter(env.as_deref()))
        .build();
    let level = logger.filter();

    // Installing twice fails quietly, as in tests.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}
