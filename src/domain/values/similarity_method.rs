use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scoring function used to rank documents against a query vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMethod {
    #[default]
    Cosine,
    Euclidean,
    Dot,
}

impl SimilarityMethod {
    /// Distance metrics rank ascending and treat the threshold as an upper bound.
    pub fn is_distance(&self) -> bool {
        matches!(self, SimilarityMethod::Euclidean)
    }

    /// Whether `score` survives `threshold` under this method's direction.
    pub fn passes(&self, score: f64, threshold: f64) -> bool {
        if self.is_distance() {
            score <= threshold
        } else {
            score >= threshold
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityMethod::Cosine => write!(f, "cosine"),
            SimilarityMethod::Euclidean => write!(f, "euclidean"),
            SimilarityMethod::Dot => write!(f, "dot"),
        }
    }
}

impl FromStr for SimilarityMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(SimilarityMethod::Cosine),
            "euclidean" | "l2" => Ok(SimilarityMethod::Euclidean),
            "dot" | "dot_product" => Ok(SimilarityMethod::Dot),
            _ => Err(format!("Unknown similarity method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Cosine".parse::<SimilarityMethod>().unwrap(), SimilarityMethod::Cosine);
        assert_eq!("EUCLIDEAN".parse::<SimilarityMethod>().unwrap(), SimilarityMethod::Euclidean);
        assert_eq!("dot".parse::<SimilarityMethod>().unwrap(), SimilarityMethod::Dot);
        assert!("manhattan".parse::<SimilarityMethod>().is_err());
    }

    #[test]
    fn test_threshold_direction() {
        assert!(SimilarityMethod::Cosine.passes(0.8, 0.5));
        assert!(!SimilarityMethod::Cosine.passes(0.4, 0.5));
        assert!(SimilarityMethod::Euclidean.passes(0.4, 0.5));
        assert!(!SimilarityMethod::Euclidean.passes(0.8, 0.5));
        assert!(SimilarityMethod::Dot.passes(0.5, 0.5));
    }

    #[test]
    fn test_default_is_cosine() {
        assert_eq!(SimilarityMethod::default(), SimilarityMethod::Cosine);
    }
}
