//! Progress bar setup using [indicatif]

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str =
    "{prefix:>12.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} ({eta})";

/// Creates a progress bar of length `len`, drawing to stderr.
///
/// Falls back to indicatif's default style if the template fails to parse.
pub fn get_progressbar(len: u64) -> ProgressBar {
    let style = ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr()).with_style(style)
}
