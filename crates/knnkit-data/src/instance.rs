use knnkit_core::{KnnError, NumericVector};
use std::fmt;
use std::str::FromStr;

use crate::value::Value;

/// One row of data: feature values, optionally followed by a class label.
///
/// An instance owns its values; building one from a dataset row copies them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instance {
    values: Vec<Value>,
    labelled: bool,
}

impl Instance {
    /// Feature values only.
    pub fn unlabelled(values: Vec<Value>) -> Self {
        Instance {
            values,
            labelled: false,
        }
    }

    /// A full row whose last value is the class label.
    pub fn labelled(values: Vec<Value>) -> Self {
        let labelled = !values.is_empty();
        Instance { values, labelled }
    }

    pub fn with_label(mut features: Vec<Value>, label: impl Into<Value>) -> Self {
        features.push(label.into());
        Instance {
            values: features,
            labelled: true,
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_labelled(&self) -> bool {
        self.labelled
    }

    pub fn label(&self) -> Option<&Value> {
        if self.labelled {
            self.values.last()
        } else {
            None
        }
    }

    /// Drop the class label, returning it.
    pub fn delete_label(&mut self) -> Option<Value> {
        if !self.labelled {
            return None;
        }
        self.labelled = false;
        self.values.pop()
    }

    /// Values without the trailing label.
    pub fn features(&self) -> &[Value] {
        if self.labelled {
            &self.values[..self.values.len() - 1]
        } else {
            &self.values
        }
    }

    /// Numeric features in order, label and text features excluded.
    pub fn feature_vector(&self) -> NumericVector {
        self.features().iter().filter_map(Value::as_number).collect()
    }

    fn numeric_positions(&self) -> Vec<usize> {
        self.features()
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_number())
            .map(|(i, _)| i)
            .collect()
    }

    fn write_back(&mut self, positions: &[usize], scaled: &NumericVector) {
        for (&pos, &v) in positions.iter().zip(scaled.iter()) {
            self.values[pos] = Value::Number(v);
        }
    }

    /// Min-max scale the numeric features against each other.
    pub fn normalize(&mut self) {
        let positions = self.numeric_positions();
        let mut features = self.feature_vector();
        features.normalize();
        self.write_back(&positions, &features);
    }

    /// Z-score the numeric features against each other using the population
    /// deviation. Left unchanged when the deviation is zero.
    pub fn standardize(&mut self) {
        let positions = self.numeric_positions();
        let features = self.feature_vector();
        let Ok(mean) = features.average() else {
            return;
        };
        let variance =
            features.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / features.len() as f64;
        let std = variance.sqrt();
        if std == 0.0 {
            return;
        }
        let scaled: NumericVector = features.iter().map(|v| (v - mean) / std).collect();
        self.write_back(&positions, &scaled);
    }
}

/// Splits on commas into unlabelled text values, e.g. `"5.1,3.5,setosa"`.
impl FromStr for Instance {
    type Err = KnnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Instance::unlabelled(
            s.split(',').map(|v| Value::Text(v.trim().to_string())).collect(),
        ))
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}
