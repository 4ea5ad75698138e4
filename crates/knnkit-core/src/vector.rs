use crate::error::{KnnError, KnnResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resizable sequence of `f64` values.
///
/// Every binary operation (`add_assign`, `sum`, `dot`) requires both operands
/// to have the same length and fails with [`KnnError::DimensionMismatch`]
/// otherwise; nothing is broadcast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericVector {
    data: Vec<f64>,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl NumericVector {
    /// Create an empty vector.
    pub fn new() -> Self {
        NumericVector { data: Vec::new() }
    }

    /// Create a vector of `size` zeros.
    pub fn zeros(size: usize) -> Self {
        NumericVector {
            data: vec![0.0; size],
        }
    }

    /// Create a vector from a slice.
    pub fn from_slice(data: &[f64]) -> Self {
        NumericVector {
            data: data.to_vec(),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.data.iter()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Value at `index`.
    pub fn get(&self, index: usize) -> KnnResult<f64> {
        self.data
            .get(index)
            .copied()
            .ok_or(KnnError::IndexOutOfBounds {
                index,
                size: self.data.len(),
            })
    }

    /// Overwrite the value at `index`.
    pub fn set(&mut self, index: usize, value: f64) -> KnnResult<()> {
        let size = self.data.len();
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(KnnError::IndexOutOfBounds { index, size }),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.data.contains(&value)
    }

    // ─── Mutation ───────────────────────────────────────────────────────────

    /// Append a value.
    pub fn push(&mut self, value: f64) {
        self.data.push(value);
    }

    pub fn pop(&mut self) -> Option<f64> {
        self.data.pop()
    }

    /// Remove and return the value at `index`, shifting the tail left.
    pub fn remove(&mut self, index: usize) -> KnnResult<f64> {
        if index >= self.data.len() {
            return Err(KnnError::IndexOutOfBounds {
                index,
                size: self.data.len(),
            });
        }
        Ok(self.data.remove(index))
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Append every value of `other`.
    pub fn concat(&mut self, other: &NumericVector) {
        self.data.extend_from_slice(&other.data);
    }

    fn check_same_len(&self, other: &NumericVector) -> KnnResult<()> {
        if self.len() != other.len() {
            return Err(KnnError::DimensionMismatch {
                expected: self.len(),
                got: other.len(),
            });
        }
        Ok(())
    }

    // ─── Arithmetic ─────────────────────────────────────────────────────────

    /// Element-wise in-place sum.
    pub fn add_assign(&mut self, other: &NumericVector) -> KnnResult<()> {
        self.check_same_len(other)?;
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// Element-wise sum into a new vector.
    pub fn sum(&self, other: &NumericVector) -> KnnResult<NumericVector> {
        self.check_same_len(other)?;
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| a + b)
            .collect();
        Ok(NumericVector { data })
    }

    /// Add `value` to every component, returning a new vector.
    pub fn sum_scalar(&self, value: f64) -> NumericVector {
        NumericVector {
            data: self.data.iter().map(|&v| v + value).collect(),
        }
    }

    /// Scale every component in place.
    pub fn multiply(&mut self, scalar: f64) {
        for v in self.data.iter_mut() {
            *v *= scalar;
        }
    }

    pub fn dot(&self, other: &NumericVector) -> KnnResult<f64> {
        self.check_same_len(other)?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| a * b)
            .sum())
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    // ─── Reductions ─────────────────────────────────────────────────────────

    pub fn min(&self) -> KnnResult<f64> {
        let i = self.argmin()?;
        Ok(self.data[i])
    }

    pub fn max(&self) -> KnnResult<f64> {
        let i = self.argmax()?;
        Ok(self.data[i])
    }

    /// Index of the first maximum.
    pub fn argmax(&self) -> KnnResult<usize> {
        if self.data.is_empty() {
            return Err(KnnError::EmptyVector);
        }
        let mut best = 0;
        for i in 1..self.data.len() {
            if self.data[i] > self.data[best] {
                best = i;
            }
        }
        Ok(best)
    }

    /// Index of the first minimum.
    pub fn argmin(&self) -> KnnResult<usize> {
        if self.data.is_empty() {
            return Err(KnnError::EmptyVector);
        }
        let mut best = 0;
        for i in 1..self.data.len() {
            if self.data[i] < self.data[best] {
                best = i;
            }
        }
        Ok(best)
    }

    /// Arithmetic mean.
    pub fn average(&self) -> KnnResult<f64> {
        if self.data.is_empty() {
            return Err(KnnError::EmptyVector);
        }
        Ok(self.data.iter().sum::<f64>() / self.data.len() as f64)
    }

    /// Min-max scale to `[0, 1]` in place.
    ///
    /// A vector whose values are all equal has a zero range and every
    /// component becomes `NaN`. Callers that cannot accept that must check
    /// the range first. An empty vector is left untouched.
    pub fn normalize(&mut self) {
        let (Ok(min), Ok(max)) = (self.min(), self.max()) else {
            return;
        };
        let range = max - min;
        for v in self.data.iter_mut() {
            *v = (*v - min) / range;
        }
    }
}

impl From<Vec<f64>> for NumericVector {
    fn from(data: Vec<f64>) -> Self {
        NumericVector { data }
    }
}

impl FromIterator<f64> for NumericVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        NumericVector {
            data: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a NumericVector {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// Parses comma-separated numbers, e.g. `"1.5, 2, -3"`.
impl FromStr for NumericVector {
    type Err = KnnError;

    fn from_str(s: &str) -> KnnResult<Self> {
        if s.trim().is_empty() {
            return Ok(NumericVector::new());
        }
        s.split(',')
            .map(|field| {
                let field = field.trim();
                field.parse::<f64>().map_err(|_| {
                    KnnError::InvalidOperation(format!("cannot parse {field:?} as a number"))
                })
            })
            .collect()
    }
}

impl fmt::Display for NumericVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}
