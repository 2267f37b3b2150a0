//! Pipeline stages between the HTTP boundary and the database
//!
//! This module contains:
//! - The collection stage loops with progress and cooperative stop
//! - Preprocessing of staged JSON into cleaned, tokenized rows
//! - The classifier seam and the lexicon baseline implementation

mod classify;
mod preprocess;
mod stages;

pub use classify::{Classifier, LexiconClassifier};
pub use preprocess::{load_lexicon, preprocess_items, preprocess_sources, ProcessedItem, Preprocessor};
pub use stages::{collect_items_stage, collect_sources_stage};
