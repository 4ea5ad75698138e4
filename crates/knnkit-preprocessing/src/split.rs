use knnkit_core::{KnnError, KnnResult};
use knnkit_data::Dataset;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Two disjoint datasets with the same schema and a shared class vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
    pub classes: Vec<String>,
}

impl TrainTestSplit {
    /// Pair up an existing train and test set. The class vocabulary is the
    /// train labels followed by any label seen only in the test set.
    pub fn from_parts(train: Dataset, test: Dataset) -> KnnResult<Self> {
        let mut classes = train.distinct_labels()?;
        for label in test.distinct_labels()? {
            if !classes.contains(&label) {
                classes.push(label);
            }
        }
        Ok(TrainTestSplit {
            train,
            test,
            classes,
        })
    }
}

/// Split a dataset into training and test partitions.
///
/// `ceil(n * train_ratio)` rows go to the training set, so any valid ratio
/// keeps at least one training row. Without a seed they
/// are the first rows in order; with a seed the row indices are shuffled
/// first. The test set keeps the remaining rows in their original order.
pub fn train_test_split(
    dataset: &Dataset,
    train_ratio: f64,
    seed: Option<u64>,
) -> KnnResult<TrainTestSplit> {
    if !(train_ratio > 0.0 && train_ratio <= 1.0) {
        return Err(KnnError::InvalidOperation(format!(
            "train ratio {train_ratio} is outside (0, 1]"
        )));
    }
    let classes = dataset.distinct_labels()?;
    let n = dataset.number_of_cases();
    let train_size = ((n as f64 * train_ratio).ceil() as usize).min(n);

    let mut indices: Vec<usize> = (0..n).collect();
    if let Some(s) = seed {
        let mut rng = StdRng::seed_from_u64(s);
        indices.shuffle(&mut rng);
    }
    let (train_idx, test_idx) = indices.split_at_mut(train_size);
    test_idx.sort_unstable();

    let mut train = dataset.empty_schema_copy();
    for &idx in train_idx.iter() {
        train.add_row(&dataset.row_at(idx)?)?;
    }
    let mut test = dataset.empty_schema_copy();
    for &idx in test_idx.iter() {
        test.add_row(&dataset.row_at(idx)?)?;
    }

    tracing::info!(
        train = train.number_of_cases(),
        test = test.number_of_cases(),
        seed = ?seed,
        "split dataset"
    );
    Ok(TrainTestSplit {
        train,
        test,
        classes,
    })
}
