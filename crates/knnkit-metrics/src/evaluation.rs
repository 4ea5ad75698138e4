use knnkit_core::{KnnError, KnnResult};
use knnkit_data::Dataset;
use knnkit_neighbors::KNNClassifier;
use knnkit_preprocessing::{train_test_split, Preprocessing, TrainTestSplit};
use serde::{Deserialize, Serialize};

use crate::classification::ConfusionMatrix;

fn default_parallel() -> bool {
    true
}

/// Configurable knobs for a train/test experiment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Number of neighbors.
    pub k: usize,
    /// Fraction of rows used for training, in `(0, 1]`.
    pub train_ratio: f64,
    /// Shuffle seed; `None` splits sequentially.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub preprocessing: Preprocessing,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl ExperimentConfig {
    pub fn new(k: usize, train_ratio: f64) -> Self {
        ExperimentConfig {
            k,
            train_ratio,
            seed: None,
            preprocessing: Preprocessing::Raw,
            parallel: true,
        }
    }

    pub fn validate(&self) -> KnnResult<()> {
        if self.k == 0 {
            return Err(KnnError::InvalidOperation("k must be > 0".into()));
        }
        if !(self.train_ratio > 0.0 && self.train_ratio <= 1.0) {
            return Err(KnnError::InvalidOperation(
                "train_ratio must be in (0, 1]".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome for one test row.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Prediction {
    pub index: usize,
    pub actual: String,
    pub predicted: String,
    pub correct: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub k: usize,
    pub predictions: Vec<Prediction>,
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
}

/// Classify every test row against the training set.
pub fn evaluate(split: &TrainTestSplit, classifier: &KNNClassifier) -> KnnResult<EvaluationReport> {
    let predicted = classifier.predict(&split.train, &split.test)?;
    let mut confusion = ConfusionMatrix::new(split.classes.clone());
    let mut predictions = Vec::with_capacity(predicted.len());

    for (index, predicted) in predicted.into_iter().enumerate() {
        let row = split.test.row_at(index)?;
        let actual = row
            .label()
            .map(ToString::to_string)
            .ok_or(KnnError::EmptyDataset)?;
        confusion.record(&actual, &predicted)?;
        predictions.push(Prediction {
            index,
            correct: actual == predicted,
            actual,
            predicted,
        });
    }

    let accuracy = confusion.accuracy();
    tracing::info!(
        k = classifier.k(),
        correct = confusion.correct(),
        total = confusion.total(),
        accuracy,
        "evaluation finished"
    );
    Ok(EvaluationReport {
        k: classifier.k(),
        predictions,
        confusion,
        accuracy,
    })
}

/// Preprocess, split and evaluate according to `config`.
pub fn run_experiment(dataset: &Dataset, config: &ExperimentConfig) -> KnnResult<EvaluationReport> {
    config.validate()?;
    let mut data = dataset.clone();
    config.preprocessing.apply(&mut data);
    let split = train_test_split(&data, config.train_ratio, config.seed)?;
    let classifier = KNNClassifier::new(config.k)?.with_parallel(config.parallel);
    evaluate(&split, &classifier)
}
