//! Result ranking

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::loader::LabelSet;

/// A labeled class probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: String,
    pub probability: f32,
}

/// Ranked predictions, best first
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    predictions: Vec<Prediction>,
}

impl Ranking {
    /// Highest-probability prediction
    pub fn top(&self) -> &Prediction {
        // Construction guarantees at least one entry.
        &self.predictions[0]
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn into_predictions(self) -> Vec<Prediction> {
        self.predictions
    }
}

/// Label and sort scores descending; ties keep output-index order
pub fn rank(scores: &[f32], labels: &LabelSet) -> Result<Ranking, PipelineError> {
    if scores.is_empty() {
        return Err(PipelineError::EmptyScoreVector);
    }

    let mut predictions: Vec<Prediction> = scores
        .iter()
        .enumerate()
        .map(|(index, &probability)| Prediction {
            class: labels.name(index),
            probability,
        })
        .collect();

    // Stable sort; NaN sinks to the end.
    predictions.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or_else(|| a.probability.is_nan().cmp(&b.probability.is_nan()))
    });

    Ok(Ranking { predictions })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> LabelSet {
        LabelSet::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_rank_with_labels() {
        let ranking = rank(&[0.7, 0.2, 0.1], &labels(&["cat", "dog", "bird"])).unwrap();
        let classes: Vec<_> = ranking.predictions().iter().map(|p| p.class.as_str()).collect();
        assert_eq!(classes, vec!["cat", "dog", "bird"]);
        assert_eq!(
            ranking.top(),
            &Prediction {
                class: "cat".into(),
                probability: 0.7
            }
        );
    }

    #[test]
    fn test_rank_sorts_descending() {
        let ranking = rank(&[0.1, 0.6, 0.3], &labels(&["a", "b", "c"])).unwrap();
        let classes: Vec<_> = ranking.predictions().iter().map(|p| p.class.as_str()).collect();
        assert_eq!(classes, vec!["b", "c", "a"]);
        assert!(ranking
            .predictions()
            .windows(2)
            .all(|w| w[0].probability >= w[1].probability));
    }

    #[test]
    fn test_rank_synthesizes_missing_labels() {
        let ranking = rank(&[0.2, 0.1, 0.7], &labels(&["only"])).unwrap();
        assert_eq!(ranking.top().class, "class3");
        let classes: Vec<_> = ranking.predictions().iter().map(|p| p.class.as_str()).collect();
        assert_eq!(classes, vec!["class3", "only", "class2"]);
    }

    #[test]
    fn test_rank_without_labels() {
        let ranking = rank(&[0.5, 0.3, 0.2], &LabelSet::default()).unwrap();
        let classes: Vec<_> = ranking.predictions().iter().map(|p| p.class.as_str()).collect();
        assert_eq!(classes, vec!["class1", "class2", "class3"]);
    }

    #[test]
    fn test_ties_keep_index_order() {
        let ranking = rank(&[0.25, 0.5, 0.25, 0.5], &LabelSet::default()).unwrap();
        let classes: Vec<_> = ranking.predictions().iter().map(|p| p.class.as_str()).collect();
        assert_eq!(classes, vec!["class2", "class4", "class1", "class3"]);
    }

    #[test]
    fn test_empty_scores() {
        assert!(matches!(
            rank(&[], &LabelSet::default()),
            Err(PipelineError::EmptyScoreVector)
        ));
    }

    #[test]
    fn test_nan_sinks() {
        let ranking = rank(&[f32::NAN, 0.4, 0.6], &LabelSet::default()).unwrap();
        assert_eq!(ranking.top().class, "class3");
        assert_eq!(ranking.predictions()[2].class, "class1");
    }

    #[test]
    fn test_length_preserved() {
        let scores: Vec<f32> = (0..1000).map(|i| ((i * 37) % 101) as f32 / 100.0).collect();
        let ranking = rank(&scores, &labels(&["x", "y"])).unwrap();
        assert_eq!(ranking.predictions().len(), 1000);
        assert_eq!(ranking.top(), &ranking.predictions()[0]);
    }
}
