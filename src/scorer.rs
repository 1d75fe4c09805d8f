use std::collections::HashMap;

use crate::{
    features::{extract_features, FeatureSet},
    model::ModelArtifact,
};

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Logistic score of a feature set.
///
/// Each present feature contributes its raw weight once. There is no
/// term-frequency or tf-idf reweighting at inference time.
pub fn score(features: &FeatureSet, weights: &HashMap<String, f64>, intercept: f64) -> f64 {
    let z = features
        .iter()
        .filter_map(|feature| weights.get(feature))
        .fold(intercept, |acc, weight| acc + weight);
    sigmoid(z)
}

/// Phishing probability of a single URL under `model`.
pub fn predict(model: &ModelArtifact, url: &str) -> f64 {
    let features = extract_features(url, &model.vocabulary, model.ngram_range);
    score(&features, &model.weights, model.intercept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn tiny_model(intercept: f64) -> ModelArtifact {
        ModelArtifact {
            vocabulary: [" a", "a "].iter().map(|s| s.to_string()).collect(),
            ngram_range: (2, 2),
            weights: [(" a".to_string(), 2.0), ("a ".to_string(), -1.0)].into_iter().collect(),
            intercept,
        }
    }

    #[test]
    fn test_worked_example() {
        let probability = predict(&tiny_model(0.0), "a");
        assert!((probability - sigmoid(1.0)).abs() < 1e-12);
        assert!((probability - 0.7310585786).abs() < 1e-9);
        assert!(probability <= 0.75);
    }

    #[test]
    fn test_empty_vocabulary_is_sigmoid_of_intercept() {
        let model = ModelArtifact {
            vocabulary: HashSet::new(),
            ngram_range: (1, 3),
            weights: HashMap::new(),
            intercept: -0.4,
        };
        for url in ["", "a", "https://login.example.com/?next=/account#top"] {
            assert_eq!(predict(&model, url), sigmoid(-0.4));
        }
    }

    #[test]
    fn test_vocabulary_feature_without_weight_contributes_nothing() {
        let features: FeatureSet = ["ab".to_string()].into_iter().collect();
        assert_eq!(score(&features, &HashMap::new(), 0.0), 0.5);
    }

    #[test]
    fn test_monotonic_in_intercept() {
        let mut previous = 0.0;
        for intercept in [-5.0, -1.0, 0.0, 0.5, 3.0] {
            let probability = predict(&tiny_model(intercept), "a");
            assert!(probability > previous);
            previous = probability;
        }
    }

    #[test]
    fn test_bounded_for_extreme_scores() {
        for intercept in [-1e6, -745.0, 0.0, 745.0, 1e6] {
            let probability = predict(&tiny_model(intercept), "a");
            assert!((0.0..=1.0).contains(&probability));
        }
    }
}
