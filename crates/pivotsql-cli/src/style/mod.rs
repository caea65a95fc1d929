//! Terminal styling for the run report and `config show`.

use std::sync::atomic::{AtomicBool, Ordering};

pub mod colors;
pub mod output;
pub mod progress;
pub mod table;

pub use output::*;
pub use progress::*;
pub use table::*;

static NO_COLOR: AtomicBool = AtomicBool::new(false);

/// Turns coloring off for the rest of the process (`--no-color`).
pub fn set_no_color(value: bool) {
    NO_COLOR.store(value, Ordering::SeqCst);
}

/// True under `--no-color` or when `NO_COLOR` is set.
pub fn no_color() -> bool {
    NO_COLOR.load(Ordering::SeqCst) || std::env::var_os("NO_COLOR").is_some()
}
