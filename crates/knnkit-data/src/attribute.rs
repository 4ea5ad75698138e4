use knnkit_core::{KnnError, KnnResult, NumericVector};
use std::fmt;

use crate::value::Value;

const DEFAULT_WEIGHT: f64 = 1.0;

/// Numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantitative {
    name: String,
    weight: f64,
    values: NumericVector,
}

impl Quantitative {
    pub fn new(name: impl Into<String>) -> Self {
        Quantitative {
            name: name.into(),
            weight: DEFAULT_WEIGHT,
            values: NumericVector::new(),
        }
    }

    pub fn with_values(name: impl Into<String>, values: NumericVector) -> Self {
        Quantitative {
            name: name.into(),
            weight: DEFAULT_WEIGHT,
            values,
        }
    }

    pub fn values(&self) -> &NumericVector {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut NumericVector {
        &mut self.values
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> KnnResult<f64> {
        self.values.average()
    }

    pub fn min(&self) -> KnnResult<f64> {
        self.values.min()
    }

    pub fn max(&self) -> KnnResult<f64> {
        self.values.max()
    }

    /// Sample standard deviation (`n - 1` denominator); `0.0` for fewer than
    /// two values.
    pub fn standard_deviation(&self) -> f64 {
        let n = self.values.len();
        if n <= 1 {
            return 0.0;
        }
        let mean = self.values.iter().sum::<f64>() / n as f64;
        let squares: f64 = self.values.iter().map(|v| (v - mean) * (v - mean)).sum();
        (squares / (n - 1) as f64).sqrt()
    }

    /// Z-score the column in place. Columns with fewer than two values or no
    /// variance are left as they are.
    pub fn standardize(&mut self) {
        if self.values.len() <= 1 {
            return;
        }
        let std = self.standard_deviation();
        if std == 0.0 {
            return;
        }
        let mean = self.values.iter().sum::<f64>() / self.values.len() as f64;
        let scaled: NumericVector = self.values.iter().map(|v| (v - mean) / std).collect();
        self.values = scaled;
    }

    /// Min-max scale the column in place (see [`NumericVector::normalize`]).
    pub fn normalize(&mut self) {
        self.values.normalize();
    }
}

/// Text column.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    name: String,
    weight: f64,
    values: Vec<String>,
}

impl Categorical {
    pub fn new(name: impl Into<String>) -> Self {
        Categorical {
            name: name.into(),
            weight: DEFAULT_WEIGHT,
            values: Vec::new(),
        }
    }

    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Categorical {
            name: name.into(),
            weight: DEFAULT_WEIGHT,
            values,
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn push(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Distinct values in first-seen order.
    pub fn distinct_classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        for v in &self.values {
            if !classes.contains(v) {
                classes.push(v.clone());
            }
        }
        classes
    }

    pub fn class_count(&self) -> usize {
        self.distinct_classes().len()
    }

    /// Relative frequency of each distinct class, in the order of
    /// [`distinct_classes`](Self::distinct_classes).
    pub fn class_frequencies(&self) -> Vec<f64> {
        let total = self.values.len() as f64;
        self.distinct_classes()
            .iter()
            .map(|class| {
                let count = self.values.iter().filter(|v| *v == class).count();
                count as f64 / total
            })
            .collect()
    }
}

/// A named, weighted column of a [`Dataset`](crate::Dataset).
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Quantitative(Quantitative),
    Categorical(Categorical),
}

impl Attribute {
    pub fn quantitative(name: impl Into<String>) -> Self {
        Attribute::Quantitative(Quantitative::new(name))
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Attribute::Categorical(Categorical::new(name))
    }

    pub fn name(&self) -> &str {
        match self {
            Attribute::Quantitative(q) => &q.name,
            Attribute::Categorical(c) => &c.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Attribute::Quantitative(q) => q.name = name.into(),
            Attribute::Categorical(c) => c.name = name.into(),
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Attribute::Quantitative(q) => q.weight,
            Attribute::Categorical(c) => c.weight,
        }
    }

    /// Store a weight without range checks; [`Dataset`](crate::Dataset)
    /// enforces `[0, 1]`.
    pub fn set_weight(&mut self, weight: f64) {
        match self {
            Attribute::Quantitative(q) => q.weight = weight,
            Attribute::Categorical(c) => c.weight = weight,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Attribute::Quantitative(q) => q.len(),
            Attribute::Categorical(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_quantitative(&self) -> bool {
        matches!(self, Attribute::Quantitative(_))
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Attribute::Categorical(_))
    }

    pub fn as_quantitative(&self) -> Option<&Quantitative> {
        match self {
            Attribute::Quantitative(q) => Some(q),
            Attribute::Categorical(_) => None,
        }
    }

    pub fn as_quantitative_mut(&mut self) -> Option<&mut Quantitative> {
        match self {
            Attribute::Quantitative(q) => Some(q),
            Attribute::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&Categorical> {
        match self {
            Attribute::Categorical(c) => Some(c),
            Attribute::Quantitative(_) => None,
        }
    }

    /// Append a value. Quantitative columns reject text; categorical columns
    /// store numbers by their string form.
    pub fn push(&mut self, value: Value) -> KnnResult<()> {
        match (self, value) {
            (Attribute::Quantitative(q), Value::Number(v)) => {
                q.push(v);
                Ok(())
            }
            (Attribute::Quantitative(q), Value::Text(s)) => Err(KnnError::InvalidValue {
                attribute: q.name.clone(),
                value: s,
            }),
            (Attribute::Categorical(c), value) => {
                c.push(value.to_string());
                Ok(())
            }
        }
    }

    /// Parse a raw field according to the column kind.
    pub fn parse_value(&self, raw: &str) -> KnnResult<Value> {
        match self {
            Attribute::Quantitative(q) => {
                raw.trim()
                    .parse::<f64>()
                    .map(Value::Number)
                    .map_err(|_| KnnError::InvalidValue {
                        attribute: q.name.clone(),
                        value: raw.to_string(),
                    })
            }
            Attribute::Categorical(_) => Ok(Value::Text(raw.to_string())),
        }
    }

    /// Remove and return the last value, `None` when the column is empty.
    pub fn pop_last(&mut self) -> Option<Value> {
        match self {
            Attribute::Quantitative(q) => q.values.pop().map(Value::Number),
            Attribute::Categorical(c) => c.values.pop().map(Value::Text),
        }
    }

    pub fn delete(&mut self, index: usize) -> KnnResult<()> {
        let size = self.len();
        if index >= size {
            return Err(KnnError::IndexOutOfBounds { index, size });
        }
        match self {
            Attribute::Quantitative(q) => {
                q.values.remove(index)?;
            }
            Attribute::Categorical(c) => {
                c.values.remove(index);
            }
        }
        Ok(())
    }

    pub fn value_at(&self, index: usize) -> KnnResult<Value> {
        match self {
            Attribute::Quantitative(q) => q.values.get(index).map(Value::Number),
            Attribute::Categorical(c) => c
                .values
                .get(index)
                .map(|s| Value::Text(s.clone()))
                .ok_or(KnnError::IndexOutOfBounds {
                    index,
                    size: c.values.len(),
                }),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Attribute::Quantitative(q) => q.values.clear(),
            Attribute::Categorical(c) => c.values.clear(),
        }
    }

    /// Same name, kind and weight, no values.
    pub fn empty_copy(&self) -> Attribute {
        let mut copy = match self {
            Attribute::Quantitative(q) => Attribute::quantitative(q.name.clone()),
            Attribute::Categorical(c) => Attribute::categorical(c.name.clone()),
        };
        copy.set_weight(self.weight());
        copy
    }
}

impl From<Quantitative> for Attribute {
    fn from(q: Quantitative) -> Self {
        Attribute::Quantitative(q)
    }
}

impl From<Categorical> for Attribute {
    fn from(c: Categorical) -> Self {
        Attribute::Categorical(c)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Quantitative(q) => write!(f, "{}", q.values),
            Attribute::Categorical(c) => write!(f, "[{}]", c.values.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn quantitative(values: &[f64]) -> Quantitative {
        Quantitative::with_values("x", NumericVector::from_slice(values))
    }

    #[test]
    fn test_quantitative_statistics() {
        let q = quantitative(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_abs_diff_eq!(q.mean().unwrap(), 5.0);
        assert_eq!(q.min().unwrap(), 2.0);
        assert_eq!(q.max().unwrap(), 9.0);
        // sum of squares 32, n - 1 = 7
        assert_abs_diff_eq!(q.standard_deviation(), (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_standard_deviation_single_value_is_zero() {
        assert_eq!(quantitative(&[3.0]).standard_deviation(), 0.0);
        assert_eq!(quantitative(&[]).standard_deviation(), 0.0);
    }

    #[test]
    fn test_standardize_gives_zero_mean_unit_std() {
        let mut q = quantitative(&[1.0, 3.0, 8.0, 12.0, 20.0]);
        q.standardize();
        assert_abs_diff_eq!(q.mean().unwrap(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(q.standard_deviation(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_standardize_degenerate_is_noop() {
        let mut constant = quantitative(&[4.0, 4.0, 4.0]);
        constant.standardize();
        assert_eq!(constant.values().as_slice(), &[4.0, 4.0, 4.0]);

        let mut single = quantitative(&[7.0]);
        single.standardize();
        assert_eq!(single.values().as_slice(), &[7.0]);
    }

    #[test]
    fn test_categorical_classes_and_frequencies() {
        let c = Categorical::with_values(
            "class",
            vec!["b".into(), "a".into(), "b".into(), "c".into()],
        );
        assert_eq!(c.distinct_classes(), vec!["b", "a", "c"]);
        assert_eq!(c.class_count(), 3);
        let freq = c.class_frequencies();
        assert_abs_diff_eq!(freq[0], 0.5);
        assert_abs_diff_eq!(freq[1], 0.25);
        assert_abs_diff_eq!(freq[2], 0.25);
    }

    #[test]
    fn test_push_validates_type() {
        let mut q = Attribute::quantitative("height");
        q.push(Value::Number(1.5)).unwrap();
        let err = q.push(Value::from("tall")).unwrap_err();
        assert!(matches!(err, KnnError::InvalidValue { .. }));
        assert_eq!(q.len(), 1);

        let mut c = Attribute::categorical("colour");
        c.push(Value::from("red")).unwrap();
        c.push(Value::Number(2.0)).unwrap();
        assert_eq!(c.value_at(1).unwrap(), Value::from("2"));
    }

    #[test]
    fn test_delete_and_value_at_bounds() {
        let mut q: Attribute = quantitative(&[1.0, 2.0, 3.0]).into();
        q.delete(0).unwrap();
        assert_eq!(q.value_at(0).unwrap(), Value::Number(2.0));
        assert!(q.delete(5).is_err());
        assert!(q.value_at(2).is_err());
    }

    #[test]
    fn test_pop_last() {
        let mut q: Attribute = quantitative(&[1.0, 2.0]).into();
        assert_eq!(q.pop_last(), Some(Value::Number(2.0)));
        assert_eq!(q.len(), 1);

        let mut c = Attribute::categorical("colour");
        c.push(Value::from("red")).unwrap();
        assert_eq!(c.pop_last(), Some(Value::from("red")));
        assert_eq!(c.pop_last(), None);
    }

    #[test]
    fn test_copy_is_independent() {
        let mut original: Attribute = quantitative(&[1.0, 2.0]).into();
        original.set_weight(0.3);
        let mut copy = original.clone();
        copy.push(Value::Number(9.0)).unwrap();
        copy.set_weight(0.9);
        assert_eq!(original.len(), 2);
        assert_eq!(original.weight(), 0.3);

        let empty = original.empty_copy();
        assert!(empty.is_empty());
        assert!(empty.is_quantitative());
        assert_eq!(empty.weight(), 0.3);
        assert_eq!(empty.name(), "x");
    }
}
