use knnkit_core::{KnnError, KnnResult, NumericVector};
use knnkit_data::{Dataset, Instance};
use knnkit_preprocessing::Preprocessing;
use rayon::prelude::*;
use std::cmp::Ordering;

/// A selected training row.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Row index in the training set.
    pub index: usize,
    pub distance: f64,
    pub label: String,
}

/// Weighted k-nearest neighbors classifier.
///
/// Distances are weighted Euclidean over the quantitative feature columns,
/// using the training set's column weights. The label column is always
/// excluded from the distance. `k` is fixed at construction and is at least 1.
#[derive(Debug, Clone)]
pub struct KNNClassifier {
    k: usize,
    /// Compute the distance vector on the rayon thread pool.
    parallel: bool,
}

impl KNNClassifier {
    pub fn new(k: usize) -> KnnResult<Self> {
        if k == 0 {
            return Err(KnnError::InvalidOperation("k must be at least 1".into()));
        }
        Ok(KNNClassifier { k, parallel: true })
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    fn row_distance(
        columns: &[&NumericVector],
        index: usize,
        query: &NumericVector,
        weights: &NumericVector,
    ) -> KnnResult<f64> {
        let mut sum = 0.0;
        for ((column, q), w) in columns.iter().zip(query.iter()).zip(weights.iter()) {
            let d = (column.get(index)? - q) * w;
            sum += d * d;
        }
        Ok(sum.sqrt())
    }

    /// Distance from the query to every training row, in row order.
    pub fn distances(&self, train: &Dataset, query: &Instance) -> KnnResult<NumericVector> {
        let n = train.number_of_cases();
        if n == 0 {
            return Err(KnnError::EmptyTrainingSet);
        }
        let columns = feature_columns(train);
        let query = query.feature_vector();
        if query.len() != columns.len() {
            return Err(KnnError::DimensionMismatch {
                expected: columns.len(),
                got: query.len(),
            });
        }
        let weights = train.feature_weights();
        tracing::debug!(
            rows = n,
            features = query.len(),
            k = self.k,
            parallel = self.parallel,
            "computing distances"
        );

        let distances = if self.parallel {
            (0..n)
                .into_par_iter()
                .map(|i| Self::row_distance(&columns, i, &query, &weights))
                .collect::<KnnResult<Vec<f64>>>()?
        } else {
            (0..n)
                .map(|i| Self::row_distance(&columns, i, &query, &weights))
                .collect::<KnnResult<Vec<f64>>>()?
        };
        Ok(NumericVector::from(distances))
    }

    /// The `k` closest training rows (all rows when `k` exceeds the training
    /// set), in candidate-slot order. See [`select_top_k`] for tie handling.
    pub fn nearest_neighbors(&self, train: &Dataset, query: &Instance) -> KnnResult<Vec<Neighbor>> {
        let labels = label_column(train)?;
        let distances = self.distances(train, query)?;
        Ok(select_top_k(distances.as_slice(), self.k)
            .into_iter()
            .map(|(index, distance)| Neighbor {
                index,
                distance,
                label: labels[index].clone(),
            })
            .collect())
    }

    /// Majority label among the nearest neighbors.
    pub fn classify(&self, train: &Dataset, query: &Instance) -> KnnResult<String> {
        let neighbors = self.nearest_neighbors(train, query)?;
        let labels: Vec<&str> = neighbors.iter().map(|n| n.label.as_str()).collect();
        majority_class(&labels).ok_or(KnnError::EmptyTrainingSet)
    }

    /// Preprocess `raw_training` and the query with `mode`, then classify.
    pub fn classify_with(
        &self,
        raw_training: &Dataset,
        query: &Instance,
        mode: Preprocessing,
    ) -> KnnResult<String> {
        let (train, query) = mode.prepare_query(raw_training, query)?;
        self.classify(&train, &query)
    }

    /// Classify every row of a labelled test set, ignoring its labels.
    pub fn predict(&self, train: &Dataset, test: &Dataset) -> KnnResult<Vec<String>> {
        (0..test.number_of_cases())
            .map(|i| {
                let mut query = test.row_at(i)?;
                query.delete_label();
                self.classify(train, &query)
            })
            .collect()
    }
}

fn label_column(train: &Dataset) -> KnnResult<&[String]> {
    let last = train.attributes().last().ok_or(KnnError::EmptyTrainingSet)?;
    last.as_categorical()
        .map(|c| c.values())
        .ok_or_else(|| {
            KnnError::TypeMismatch(format!("label attribute {} is not categorical", last.name()))
        })
}

/// Quantitative feature columns, aligned with `Dataset::feature_weights`.
fn feature_columns(train: &Dataset) -> Vec<&NumericVector> {
    let attributes = train.attributes();
    let features = attributes.len().saturating_sub(1);
    attributes[..features]
        .iter()
        .filter_map(|a| a.as_quantitative())
        .map(|q| q.values())
        .collect()
}

/// Total order on distances with NaN (of either sign) above every number.
fn distance_order(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.total_cmp(&b),
    }
}

fn worst_slot(candidates: &[(usize, f64)]) -> usize {
    let mut worst = 0;
    for (slot, c) in candidates.iter().enumerate().skip(1) {
        if distance_order(c.1, candidates[worst].1) == Ordering::Greater {
            worst = slot;
        }
    }
    worst
}

/// Streaming top-k over a distance vector, returning `(row, distance)` pairs.
///
/// The first `k` rows seed the candidate set. Each later row replaces the
/// current worst candidate only if its distance is strictly smaller, so on
/// equal distances the earlier row stays. When several candidates share the
/// worst distance, the one in the lowest slot is evicted. A NaN distance
/// ranks above every number: it is evicted first and never displaces a
/// candidate.
pub fn select_top_k(distances: &[f64], k: usize) -> Vec<(usize, f64)> {
    let k = k.min(distances.len());
    let mut candidates: Vec<(usize, f64)> = distances[..k].iter().copied().enumerate().collect();
    if k == 0 {
        return candidates;
    }
    for (i, &d) in distances.iter().enumerate().skip(k) {
        let worst = worst_slot(&candidates);
        if distance_order(d, candidates[worst].1) == Ordering::Less {
            candidates[worst] = (i, d);
        }
    }
    candidates
}

/// Most frequent label. Ties go to the label seen first; distances play no
/// part. `None` for an empty slice.
pub fn majority_class<S: AsRef<str>>(labels: &[S]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for label in labels {
        let label: &str = label.as_ref();
        match counts.iter_mut().find(|(c, _)| *c == label) {
            Some(entry) => entry.1 += 1,
            None => counts.push((label, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for &(label, count) in &counts {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.to_string())
}
