use crate::domain::error::DomainError;
use crate::domain::values::similarity_method::SimilarityMethod;

fn check_dimensions(a: &[f32], b: &[f32]) -> Result<(), DomainError> {
    if a.len() != b.len() {
        return Err(DomainError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(())
}

/// Raw inner product, accumulated in f64.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f64, DomainError> {
    check_dimensions(a, b)?;
    Ok(a.iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum())
}

/// Cosine of the angle between `a` and `b`. Zero-norm vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, DomainError> {
    check_dimensions(a, b)?;
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot / denom)
    }
}

/// L2 norm of `a - b`.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f64, DomainError> {
    check_dimensions(a, b)?;
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum();
    Ok(sum.sqrt())
}

pub fn score(method: SimilarityMethod, a: &[f32], b: &[f32]) -> Result<f64, DomainError> {
    match method {
        SimilarityMethod::Cosine => cosine_similarity(a, b),
        SimilarityMethod::Euclidean => euclidean_distance(a, b),
        SimilarityMethod::Dot => dot_product(a, b),
    }
}
