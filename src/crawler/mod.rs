//! Pipeline orchestration
//!
//! This module contains the run loop that coordinates all phases of a
//! collection run, including:
//! - Collecting source metadata, posts and comments into the staging area
//! - Preprocessing staged JSON into classifier-ready rows
//! - Running the classifier
//! - Persisting the results in one transaction
//! - Mapping every outcome onto the published status

use crate::collector::Collector;
use crate::pipeline::{
    collect_items_stage, collect_sources_stage, preprocess_items, preprocess_sources, Classifier,
    Preprocessor,
};
use crate::storage::{open_storage, SourceRecord, SqliteStorage};
use crate::{CrawlError, Phase, Result, StatusManager};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Terminal message for a run that produced nothing to classify
const NO_DATA_MESSAGE: &str = "No data to process.";

/// Terminal message for a run ended by a stop request
const STOPPED_MESSAGE: &str = "Pipeline stopped by user request.";

/// How a run ended when no error forced it down
enum RunOutcome {
    Completed,
    NoData,
}

/// Main pipeline orchestrator
///
/// Owns the collaborators for one deployment: the collector boundary, the
/// classifier, the shared status, and the results database. One instance
/// serves the whole process lifetime; `run_pipeline` is invoked per run.
pub struct Crawler {
    collector: Arc<dyn Collector>,
    classifier: Arc<dyn Classifier>,
    status: Arc<StatusManager>,
    storage: Arc<Mutex<SqliteStorage>>,
    data_dir: PathBuf,
    preprocessor: Preprocessor,
}

impl Crawler {
    /// Creates the orchestrator and opens the results database
    ///
    /// This is the one place a broken deployment should fail hard; once
    /// construction succeeds, runs only ever end in a published status.
    ///
    /// # Arguments
    ///
    /// * `collector` - Boundary that fetches and stages platform data
    /// * `classifier` - Produces one risk flag per processed row
    /// * `status` - Shared status published over HTTP
    /// * `database_path` - Path to the SQLite results database
    /// * `data_dir` - Root of the staging area
    /// * `preprocessor` - Text cleaning settings and lexicon
    pub fn new(
        collector: Arc<dyn Collector>,
        classifier: Arc<dyn Classifier>,
        status: Arc<StatusManager>,
        database_path: &Path,
        data_dir: PathBuf,
        preprocessor: Preprocessor,
    ) -> Result<Self> {
        let storage = open_storage(database_path)?;
        Ok(Self {
            collector,
            classifier,
            status,
            storage: Arc::new(Mutex::new(storage)),
            data_dir,
            preprocessor,
        })
    }

    /// Runs the full pipeline for one set of sources
    ///
    /// Never returns an error: every outcome lands in the status manager.
    /// A clean run resets the status, a run with nothing to classify or a
    /// stopped or failed run parks an operator-readable message in
    /// `last_error` with the phase back at idle.
    pub async fn run_pipeline(&self, sources: &[String], target_date: NaiveDate) {
        tracing::info!(
            "starting pipeline run over {} source(s) back to {}",
            sources.len(),
            target_date
        );

        match self.execute(sources, target_date).await {
            Ok(RunOutcome::Completed) => {
                tracing::info!("pipeline run completed");
                self.status.reset();
            }
            Ok(RunOutcome::NoData) => {
                tracing::info!("pipeline run produced no publications to classify");
                self.finish_with_error(NO_DATA_MESSAGE);
            }
            Err(CrawlError::Stopped) => {
                tracing::info!("pipeline run ended by stop request");
                self.finish_with_error(STOPPED_MESSAGE);
            }
            Err(err) => {
                let phase = self.status.snapshot().phase;
                tracing::error!("pipeline run failed during {}: {}", phase, err);
                self.finish_with_error(&format!("Pipeline failed during {phase}."));
            }
        }
    }

    async fn execute(&self, sources: &[String], target_date: NaiveDate) -> Result<RunOutcome> {
        self.status.reset();

        self.status.set_phase(Phase::CollectingSources)?;
        let sources_files = collect_sources_stage(
            self.collector.as_ref(),
            &self.status,
            sources,
            &self.data_dir,
        )
        .await?;
        self.absorb_stop("source collection");
        // one staging file per source, so the files written count the
        // sources that made it through before any stop
        let collected_sources = &sources[..sources_files.len().min(sources.len())];

        self.status.set_phase(Phase::PreprocessingSources)?;
        let source_meta = preprocess_sources(&sources_files)?;

        self.status.set_phase(Phase::CollectingItems)?;
        let (posts_files, comments_files) = collect_items_stage(
            self.collector.as_ref(),
            &self.status,
            collected_sources,
            target_date,
            &self.data_dir,
        )
        .await?;
        self.absorb_stop("item collection");

        self.status.set_phase(Phase::PreprocessingItems)?;
        let items = preprocess_items(&posts_files, &comments_files, &self.preprocessor)?;
        if items.is_empty() {
            return Ok(RunOutcome::NoData);
        }

        self.status.set_phase(Phase::Inferring)?;
        let flags = self.classifier.predict(&items);

        self.status.set_phase(Phase::SavingResults)?;
        let records: Vec<SourceRecord> = source_meta.iter().map(SourceRecord::from).collect();
        {
            let mut storage = self.storage.lock().unwrap();
            let mut batch = storage.begin_save(&records, target_date)?;
            for (item, flagged) in items.iter().zip(&flags) {
                batch.save_prediction(item.source_id, item.parent_id, item.item_id, *flagged)?;
            }
            let summary = batch.commit()?;
            tracing::info!(
                "saved run: {} source(s), {} prediction(s) inserted, {} skipped",
                summary.sources_upserted,
                summary.predictions_inserted,
                summary.predictions_skipped
            );
        }

        Ok(RunOutcome::Completed)
    }

    /// Consumes a stop observed during a collection stage
    ///
    /// The stage already ended its loop early; clearing the flag here lets
    /// whatever it did collect continue through preprocessing, inference
    /// and save. A stop raised outside the collection stages still ends
    /// the run at the next phase transition.
    fn absorb_stop(&self, stage: &str) {
        if self.status.should_stop() {
            tracing::info!("stop observed during {stage}, keeping partial results");
            self.status.reset_stop_flag();
        }
    }

    /// Parks a terminal message and returns the phase to idle
    fn finish_with_error(&self, message: &str) {
        // the idle transition is allowed even while the stop flag is raised
        let _ = self.status.set_phase(Phase::Idle);
        self.status.set_error(Some(message.to_string()));
    }
}
