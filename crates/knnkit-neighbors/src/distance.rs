use knnkit_core::{KnnError, KnnResult, NumericVector};

fn check_dims(a: &NumericVector, b: &NumericVector) -> KnnResult<()> {
    if a.len() != b.len() {
        return Err(KnnError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(())
}

/// Plain Euclidean distance.
pub fn euclidean_distance(a: &NumericVector, b: &NumericVector) -> KnnResult<f64> {
    check_dims(a, b)?;
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    Ok(sum.sqrt())
}

/// Euclidean distance with every difference scaled by its weight before
/// squaring: `sqrt(sum(((a_i - b_i) * w_i)^2))`.
///
/// Both vectors and the weights must have the same length. Neither vector may
/// still carry a class label.
pub fn weighted_euclidean_distance(
    a: &NumericVector,
    b: &NumericVector,
    weights: &NumericVector,
) -> KnnResult<f64> {
    check_dims(a, b)?;
    check_dims(a, weights)?;
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .zip(weights.iter())
        .map(|((x, y), w)| {
            let d = (x - y) * w;
            d * d
        })
        .sum();
    Ok(sum.sqrt())
}
