//! Run progress using indicatif.

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.cyan} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} invocations";

/// Progress bar over every invocation of a run. Hidden when stderr is not a
/// terminal.
pub fn invocation_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("◆◇ ");
    pb.set_style(style);
    pb
}

/// Clears the bar so the summary starts on a clean line.
pub fn finish_and_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
