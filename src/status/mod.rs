//! Shared run status and cooperative stop control
//!
//! A single `StatusManager` instance owns the mutable run status for the
//! whole process. The pipeline task mutates it through the setters below,
//! HTTP callers read snapshots and raise the stop flag. The stop check
//! lives inside the mutating setters themselves, so every stage passes
//! through the same bounded set of cancellation checkpoints.

use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

/// Signal returned by a status checkpoint when a stop has been requested
///
/// Converted to `CrawlError::Stopped` at stage boundaries via `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopRequested;

impl fmt::Display for StopRequested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipeline stop was requested")
    }
}

impl std::error::Error for StopRequested {}

/// Represents the current phase of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No run in progress (initial and terminal phase)
    Idle,

    /// Fetching source metadata from the platform
    CollectingSources,

    /// Parsing staged source metadata
    PreprocessingSources,

    /// Fetching posts and comments for each source
    CollectingItems,

    /// Flattening, cleaning and tokenizing collected text
    PreprocessingItems,

    /// Running the classifier over processed rows
    Inferring,

    /// Writing the run, sources and predictions to the database
    SavingResults,
}

impl Phase {
    /// Returns true for the phases where per-source progress is meaningful
    ///
    /// `SetPhase` preserves the progress fields only when entering one of
    /// these phases.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::CollectingSources | Self::CollectingItems)
    }

    /// Converts the phase to its wire string representation
    ///
    /// Used for the `/status` payload and log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CollectingSources => "collecting_sources",
            Self::PreprocessingSources => "preprocessing_sources",
            Self::CollectingItems => "collecting_items",
            Self::PreprocessingItems => "preprocessing_items",
            Self::Inferring => "inferring",
            Self::SavingResults => "saving_results",
        }
    }

    /// Parses a phase from its wire string representation
    ///
    /// Returns None if the string doesn't match any known phase.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "collecting_sources" => Some(Self::CollectingSources),
            "preprocessing_sources" => Some(Self::PreprocessingSources),
            "collecting_items" => Some(Self::CollectingItems),
            "preprocessing_items" => Some(Self::PreprocessingItems),
            "inferring" => Some(Self::Inferring),
            "saving_results" => Some(Self::SavingResults),
            _ => None,
        }
    }

    /// Returns all pipeline phases in execution order
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Idle,
            Self::CollectingSources,
            Self::PreprocessingSources,
            Self::CollectingItems,
            Self::PreprocessingItems,
            Self::Inferring,
            Self::SavingResults,
        ]
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the run status, as exposed over `GET /status`
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub phase: Phase,
    pub current_source: Option<String>,
    pub progress: Option<u8>,
    pub last_error: Option<String>,
    pub stop_requested: bool,
}

impl Default for PipelineStatus {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            current_source: None,
            progress: None,
            last_error: None,
            stop_requested: false,
        }
    }
}

/// Serializes all access to the run status behind a mutex
///
/// Safe to share between the pipeline task and any number of HTTP callers.
/// Readers only ever get snapshot copies, never a live reference.
pub struct StatusManager {
    inner: Mutex<PipelineStatus>,
}

impl StatusManager {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PipelineStatus::default()),
        }
    }

    /// Resets the full status to its initial value
    ///
    /// Called at run start and at clean run end. Also clears the stop flag.
    pub fn reset(&self) {
        let mut status = self.inner.lock().unwrap();
        *status = PipelineStatus::default();
    }

    /// Transitions to a new phase
    ///
    /// Fails with `StopRequested` (without mutating anything) when a stop
    /// has been requested and the target phase is not `Idle`, so stopping
    /// a run can never be blocked by its own cleanup transition.
    ///
    /// Clears `current_source`, `progress` and `last_error` unless the
    /// target is a collection phase, where progress carries over.
    pub fn set_phase(&self, phase: Phase) -> Result<(), StopRequested> {
        let mut status = self.inner.lock().unwrap();
        if phase != Phase::Idle && status.stop_requested {
            return Err(StopRequested);
        }
        status.phase = phase;
        if !phase.is_collection() {
            status.current_source = None;
            status.progress = None;
        }
        status.last_error = None;
        Ok(())
    }

    /// Records which source is being processed
    ///
    /// Setting a source is a stop checkpoint; clearing (passing None) is
    /// always allowed so cleanup after a stop cannot itself be blocked.
    pub fn set_current_source(&self, source: Option<String>) -> Result<(), StopRequested> {
        let mut status = self.inner.lock().unwrap();
        if source.is_some() && status.stop_requested {
            return Err(StopRequested);
        }
        status.current_source = source;
        Ok(())
    }

    /// Sets the progress percentage, clamped to 0..=100
    pub fn set_progress(&self, pct: Option<u8>) {
        let mut status = self.inner.lock().unwrap();
        status.progress = pct.map(|p| p.min(100));
    }

    /// Sets or clears the terminal error message
    pub fn set_error(&self, message: Option<String>) {
        let mut status = self.inner.lock().unwrap();
        status.last_error = message;
    }

    /// Raises the stop flag; idempotent
    pub fn request_stop(&self) {
        let mut status = self.inner.lock().unwrap();
        status.stop_requested = true;
    }

    /// Clears the stop flag without touching other fields
    ///
    /// Called at the start of each collection stage to open a fresh
    /// cancellation window.
    pub fn reset_stop_flag(&self) {
        let mut status = self.inner.lock().unwrap();
        status.stop_requested = false;
    }

    /// Non-blocking read of the stop flag
    pub fn should_stop(&self) -> bool {
        self.inner.lock().unwrap().stop_requested
    }

    /// Returns a snapshot copy of the current status
    pub fn snapshot(&self) -> PipelineStatus {
        self.inner.lock().unwrap().clone()
    }
}

impl Default for StatusManager {
    fn default() -> Self {
        Self::new()
    }
}
