//! Progress reporting for batch model rendering

use indicatif::{ProgressBar, ProgressStyle};

/// Console progress bar shown while rendering one overlay per model
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    /// Creates a bar sized to the number of models to render
    pub fn new(total: u64, description: &str) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40.green/black}] {pos}/{len} models ({elapsed_precise})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(total);
        bar.set_style(style);
        bar.set_message(description.to_string());

        ProgressTracker { bar }
    }

    pub fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("All models rendered");
    }

    /// Shows the model currently being composited
    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }
}
