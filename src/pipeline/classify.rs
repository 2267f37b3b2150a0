//! Classifier seam and the lexicon baseline

use crate::pipeline::ProcessedItem;

/// Produces one boolean risk flag per processed item
///
/// Object-safe so the pipeline can swap in a scripted classifier in tests
/// or a heavier model behind the same seam.
pub trait Classifier: Send + Sync {
    fn predict(&self, items: &[ProcessedItem]) -> Vec<bool>;
}

/// Flags an item when the share of lexicon-hit tokens reaches a threshold
pub struct LexiconClassifier {
    threshold: f64,
}

impl LexiconClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Classifier for LexiconClassifier {
    fn predict(&self, items: &[ProcessedItem]) -> Vec<bool> {
        items
            .iter()
            .map(|item| {
                if item.tokens.is_empty() {
                    return false;
                }
                let share = item.lexicon_hits as f64 / item.tokens.len() as f64;
                share >= self.threshold
            })
            .collect()
    }
}
