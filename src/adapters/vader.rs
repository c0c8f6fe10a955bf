use crate::domain::model::PolarityScores;
use crate::domain::ports::SentimentScorer;
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;
use vader_sentiment::SentimentIntensityAnalyzer;

/// VADER polarity scoring over its full published lexicon.
pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn score(scores: &HashMap<&str, f64>, key: &str) -> Result<f64> {
    scores
        .get(key)
        .copied()
        .ok_or_else(|| EtlError::ProcessingError {
            message: format!("sentiment analyzer returned no '{}' score", key),
        })
}

impl SentimentScorer for VaderScorer {
    fn polarity_scores(&self, text: &str) -> Result<PolarityScores> {
        let scores = self.analyzer.polarity_scores(text);
        Ok(PolarityScores {
            neg: score(&scores, "neg")?,
            neu: score(&scores, "neu")?,
            pos: score(&scores, "pos")?,
            compound: score(&scores, "compound")?,
        })
    }
}
