//! Stage notifications for callers that display progress.

use caudata_core::error::{CaudataError, Result};

/// A step of [`Pipeline::run_with`](crate::Pipeline::run_with), in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Acquire,
    Profile,
    Clean,
    Enrich,
    Visualize,
    Report,
}

impl Stage {
    pub const ALL: [Stage; 6] =
        [Stage::Acquire, Stage::Profile, Stage::Clean, Stage::Enrich, Stage::Visualize, Stage::Report];

    /// Present-tense description of the running stage
    pub fn label(self) -> &'static str {
        match self {
            Stage::Acquire => "Fetching occurrence records",
            Stage::Profile => "Profiling records",
            Stage::Clean => "Cleaning coordinates",
            Stage::Enrich => "Fetching elevation and deriving terrain",
            Stage::Visualize => "Rendering maps and charts",
            Stage::Report => "Writing report",
        }
    }
}

/// Receives a start and a finish call for every stage a run reaches
///
/// `stage_finished` gets a one-line summary on success. A failed stage is
/// the last one reported.
pub trait StageObserver {
    fn stage_started(&mut self, _stage: Stage) {}

    fn stage_finished(&mut self, _stage: Stage, _outcome: std::result::Result<&str, &CaudataError>) {}
}

impl StageObserver for () {}

/// Report the end of `stage` and pass its result through
pub(crate) fn finish<T>(
    observer: &mut impl StageObserver,
    stage: Stage,
    result: Result<T>,
    summary: impl FnOnce(&T) -> String,
) -> Result<T> {
    match &result {
        Ok(value) => observer.stage_finished(stage, Ok(summary(value).as_str())),
        Err(e) => observer.stage_finished(stage, Err(e)),
    }
    result
}
