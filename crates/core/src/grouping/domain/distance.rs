use thiserror::Error;

/// Two compared embeddings have different lengths. Should not happen when
/// the upstream model is consistent, but a silent wrong distance is worse
/// than a checked error.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("embedding dimension mismatch: {left} vs {right}")]
pub struct DimensionMismatch {
    pub left: usize,
    pub right: usize,
}

/// Euclidean (L2) distance between equal-length embeddings.
///
/// Accumulates in f64 so the result is independent of summation order
/// effects at f32 precision. Symmetric: `euclidean(a, b) == euclidean(b, a)`.
pub fn euclidean(a: &[f32], b: &[f32]) -> Result<f64, DimensionMismatch> {
    if a.len() != b.len() {
        return Err(DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum();
    Ok(sum.sqrt())
}
