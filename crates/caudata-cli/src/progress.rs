use caudata_core::error::CaudataError;
use caudata_pipeline::{Stage, StageObserver};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    let pb = ProgressBar::new_spinner();
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✗ {}", message));
}

/// Progress tracker for pipeline stages, one spinner per stage
pub struct StageProgress {
    multi: MultiProgress,
    current: Option<(ProgressBar, String)>,
}

impl StageProgress {
    /// Hidden when the output is JSON
    pub fn new(hidden: bool) -> Self {
        let multi = if hidden {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };
        Self { multi, current: None }
    }

    pub fn start(&mut self, message: &str) {
        let pb = self.multi.add(create_spinner(&format!("{}...", message)));
        self.current = Some((pb, message.to_string()));
    }

    /// Close the current spinner according to the stage result
    pub fn complete<T, E>(&mut self, result: Result<T, E>, done: impl FnOnce(&T) -> String) -> Result<T, E> {
        if let Some((pb, message)) = self.current.take() {
            match &result {
                Ok(value) => finish_success(&pb, &done(value)),
                Err(_) => finish_error(&pb, &format!("{} failed", message)),
            }
        }
        result
    }
}

impl StageObserver for StageProgress {
    fn stage_started(&mut self, stage: Stage) {
        self.start(stage.label());
    }

    fn stage_finished(&mut self, _stage: Stage, outcome: Result<&str, &CaudataError>) {
        if let Some((pb, message)) = self.current.take() {
            match outcome {
                Ok(summary) => finish_success(&pb, summary),
                Err(_) => finish_error(&pb, &format!("{} failed", message)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_spinner_is_closed() {
        let mut progress = StageProgress::new(true);
        progress.stage_started(Stage::Clean);
        assert!(progress.current.is_some());
        progress.stage_finished(Stage::Clean, Ok("Retained 8 records"));
        assert!(progress.current.is_none());
    }
}
