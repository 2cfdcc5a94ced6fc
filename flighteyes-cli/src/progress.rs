//! Terminal progress bar for tile downloads.
//!
//! Log lines share stderr with the bar, so they are written through
//! [`LogWriter`], which clears the bar, prints the line and redraws it.

use std::io::{self, Write};

use flighteyes::mosaic::ProgressObserver;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} tiles";

pub struct TileProgress {
    bar: ProgressBar,
    visible: bool,
}

impl TileProgress {
    /// A bar that stays hidden until [`TileProgress::start`].
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style);
        }
        Self { bar, visible: true }
    }

    /// A bar that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            visible: false,
        }
    }

    /// Sets the tile count and starts drawing.
    pub fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        if self.visible {
            self.bar.set_draw_target(ProgressDrawTarget::stderr());
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Console writer for the logger.
    pub fn log_writer(&self) -> impl Fn() -> LogWriter + Send + Sync + 'static {
        let bar = self.bar.clone();
        move || LogWriter { bar: bar.clone() }
    }
}

impl Default for TileProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for TileProgress {
    fn tile_fetched(&self, done: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(done as u64);
    }
}

/// Writes to stderr with the progress bar suspended.
#[derive(Clone)]
pub struct LogWriter {
    bar: ProgressBar,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.suspend(|| io::stderr().write(buf))
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.bar.suspend(|| io::stderr().write_all(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}
