use knnkit_core::{KnnError, KnnResult};
use knnkit_data::{Attribute, Dataset, Instance, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label given to a query while it travels through a preprocessing pass.
const QUERY_PLACEHOLDER_LABEL: &str = "?";

/// In-place transform of the quantitative columns of a dataset.
///
/// Categorical columns are never touched. The returned slice is every
/// column, in the original order.
pub trait Preprocessor {
    fn apply<'a>(&self, dataset: &'a mut Dataset) -> &'a [Attribute];
}

/// Leaves the data as loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPassthrough;

impl Preprocessor for RawPassthrough {
    fn apply<'a>(&self, dataset: &'a mut Dataset) -> &'a [Attribute] {
        dataset.attributes()
    }
}

/// Min-max scales every quantitative column to `[0, 1]`.
///
/// A constant column has a zero range and turns into `NaN`s; prefer
/// [`Standardization`] for data that may contain constant columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalization;

impl Preprocessor for Normalization {
    fn apply<'a>(&self, dataset: &'a mut Dataset) -> &'a [Attribute] {
        for attribute in dataset.attributes_mut() {
            if let Some(q) = attribute.as_quantitative_mut() {
                q.normalize();
            }
        }
        dataset.attributes()
    }
}

/// Z-scores every quantitative column with at least two values and a
/// non-zero sample deviation. Other columns are left as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standardization;

impl Preprocessor for Standardization {
    fn apply<'a>(&self, dataset: &'a mut Dataset) -> &'a [Attribute] {
        for attribute in dataset.attributes_mut() {
            let Some(q) = attribute.as_quantitative_mut() else {
                continue;
            };
            if q.len() > 1 && q.standard_deviation() > 0.0 {
                q.standardize();
            } else {
                tracing::debug!(
                    attribute = attribute.name(),
                    "skipping standardization of degenerate attribute"
                );
            }
        }
        dataset.attributes()
    }
}

/// Which transform a dataset went through. Classification of a query must use
/// the same mode as the training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preprocessing {
    #[default]
    Raw = 1,
    Normalized = 2,
    Standardized = 3,
}

impl Preprocessing {
    /// Map the numeric menu codes `1 | 2 | 3`.
    pub fn from_code(code: u8) -> KnnResult<Self> {
        match code {
            1 => Ok(Preprocessing::Raw),
            2 => Ok(Preprocessing::Normalized),
            3 => Ok(Preprocessing::Standardized),
            other => Err(KnnError::InvalidOperation(format!(
                "unknown preprocessing code {other}"
            ))),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn preprocessor(self) -> Box<dyn Preprocessor> {
        match self {
            Preprocessing::Raw => Box::new(RawPassthrough),
            Preprocessing::Normalized => Box::new(Normalization),
            Preprocessing::Standardized => Box::new(Standardization),
        }
    }

    pub fn apply(self, dataset: &mut Dataset) {
        self.preprocessor().apply(dataset);
    }

    /// Transform a query consistently with the training data.
    ///
    /// The query is appended (with a placeholder label) to a copy of the raw
    /// training set, the whole table is preprocessed, and the query row is
    /// taken back out. Returns the preprocessed training set and the
    /// unlabelled, preprocessed query.
    pub fn prepare_query(self, raw_training: &Dataset, query: &Instance) -> KnnResult<(Dataset, Instance)> {
        let mut training = raw_training.clone();
        if self == Preprocessing::Raw {
            let mut query = query.clone();
            query.delete_label();
            return Ok((training, query));
        }

        // The placeholder row must fit a categorical label column.
        raw_training.distinct_labels()?;
        let row = Instance::with_label(
            query.features().to_vec(),
            Value::from(QUERY_PLACEHOLDER_LABEL),
        );
        training.add_row(&row)?;
        self.apply(&mut training);

        let last = training.number_of_cases() - 1;
        let mut prepared = training.row_at(last)?;
        training.delete_row(last)?;
        prepared.delete_label();
        Ok((training, prepared))
    }
}

impl fmt::Display for Preprocessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preprocessing::Raw => write!(f, "raw"),
            Preprocessing::Normalized => write!(f, "normalized"),
            Preprocessing::Standardized => write!(f, "standardized"),
        }
    }
}

impl FromStr for Preprocessing {
    type Err = KnnError;

    fn from_str(s: &str) -> KnnResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "raw" | "1" => Ok(Preprocessing::Raw),
            "normalized" | "normalization" | "2" => Ok(Preprocessing::Normalized),
            "standardized" | "standardization" | "3" => Ok(Preprocessing::Standardized),
            other => Err(KnnError::InvalidOperation(format!(
                "unsupported preprocessing '{other}'"
            ))),
        }
    }
}
