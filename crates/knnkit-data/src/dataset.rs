use knnkit_core::{KnnError, KnnResult, NumericVector};
use std::fmt;

use crate::attribute::Attribute;
use crate::instance::Instance;
use crate::value::Value;

/// A table of equally long attributes. The last attribute is the class label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    attributes: Vec<Attribute>,
}

fn validate_weight(weight: f64) -> KnnResult<f64> {
    if (0.0..=1.0).contains(&weight) {
        Ok(weight)
    } else {
        Err(KnnError::InvalidWeight(format!(
            "weight {weight} is outside [0, 1]"
        )))
    }
}

fn check_equal_lengths(attributes: &[Attribute]) -> KnnResult<()> {
    if let Some(first) = attributes.first() {
        for attribute in &attributes[1..] {
            if attribute.len() != first.len() {
                return Err(KnnError::DimensionMismatch {
                    expected: first.len(),
                    got: attribute.len(),
                });
            }
        }
    }
    Ok(())
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Dataset {
    pub fn new() -> Self {
        Dataset {
            attributes: Vec::new(),
        }
    }

    /// Build a dataset from columns, which must all have the same length.
    pub fn from_attributes(attributes: Vec<Attribute>) -> KnnResult<Self> {
        check_equal_lengths(&attributes)?;
        Ok(Dataset { attributes })
    }

    /// Same columns, names, kinds and weights, zero rows.
    pub fn empty_schema_copy(&self) -> Dataset {
        Dataset {
            attributes: self.attributes.iter().map(Attribute::empty_copy).collect(),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn number_of_cases(&self) -> usize {
        self.attributes.first().map_or(0, Attribute::len)
    }

    pub fn number_of_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Columns for in-place transforms. Lengths must not be changed through
    /// this handle.
    pub fn attributes_mut(&mut self) -> &mut [Attribute] {
        &mut self.attributes
    }

    pub fn set_attributes(&mut self, attributes: Vec<Attribute>) -> KnnResult<()> {
        check_equal_lengths(&attributes)?;
        self.attributes = attributes;
        Ok(())
    }

    pub fn into_attributes(self) -> Vec<Attribute> {
        self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    /// Append a column. It must match the current number of cases unless the
    /// dataset has no columns yet.
    pub fn push_attribute(&mut self, attribute: Attribute) -> KnnResult<()> {
        if !self.attributes.is_empty() && attribute.len() != self.number_of_cases() {
            return Err(KnnError::DimensionMismatch {
                expected: self.number_of_cases(),
                got: attribute.len(),
            });
        }
        self.attributes.push(attribute);
        Ok(())
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|a| a.name().to_string()).collect()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.attributes.iter().map(Attribute::weight).collect()
    }

    /// `"name: weight"` for every column.
    pub fn weight_summary(&self) -> Vec<String> {
        self.attributes
            .iter()
            .map(|a| format!("{}: {}", a.name(), a.weight()))
            .collect()
    }

    /// Weights of the quantitative feature columns (every column but the
    /// label), aligned with [`Instance::feature_vector`].
    pub fn feature_weights(&self) -> NumericVector {
        let n = self.attributes.len();
        if n == 0 {
            return NumericVector::new();
        }
        self.attributes[..n - 1]
            .iter()
            .filter(|a| a.is_quantitative())
            .map(Attribute::weight)
            .collect()
    }

    /// Distinct values of the label column in first-seen order.
    pub fn distinct_labels(&self) -> KnnResult<Vec<String>> {
        let last = self.attributes.last().ok_or(KnnError::EmptyDataset)?;
        match last.as_categorical() {
            Some(c) => Ok(c.distinct_classes()),
            None => Err(KnnError::TypeMismatch(format!(
                "label attribute {} is not categorical",
                last.name()
            ))),
        }
    }

    /// Every cell rendered as text, row by row.
    pub fn values(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.number_of_cases() * self.number_of_attributes());
        for i in 0..self.number_of_cases() {
            for attribute in &self.attributes {
                if let Ok(v) = attribute.value_at(i) {
                    out.push(v.to_string());
                }
            }
        }
        out
    }

    fn check_row_index(&self, index: usize) -> KnnResult<()> {
        if self.attributes.is_empty() {
            return Err(KnnError::EmptyDataset);
        }
        let size = self.number_of_cases();
        if index >= size {
            return Err(KnnError::IndexOutOfBounds { index, size });
        }
        Ok(())
    }

    /// Copy of row `index` as a labelled instance.
    pub fn row_at(&self, index: usize) -> KnnResult<Instance> {
        self.check_row_index(index)?;
        let values = self
            .attributes
            .iter()
            .map(|a| a.value_at(index))
            .collect::<KnnResult<Vec<Value>>>()?;
        Ok(Instance::labelled(values))
    }

    /// Parse raw fields into an instance using the column kinds: one field per
    /// feature column gives an unlabelled query, one per column a labelled row.
    pub fn instance_from_strings<S: AsRef<str>>(&self, fields: &[S]) -> KnnResult<Instance> {
        let n = self.attributes.len();
        if n == 0 {
            return Err(KnnError::EmptyDataset);
        }
        if fields.len() != n && fields.len() != n - 1 {
            return Err(KnnError::DimensionMismatch {
                expected: n - 1,
                got: fields.len(),
            });
        }
        let values = self
            .attributes
            .iter()
            .zip(fields)
            .map(|(a, f)| a.parse_value(f.as_ref()))
            .collect::<KnnResult<Vec<Value>>>()?;
        if fields.len() == n {
            Ok(Instance::labelled(values))
        } else {
            Ok(Instance::unlabelled(values))
        }
    }

    // ─── Row mutation ───────────────────────────────────────────────────────

    fn check_row_width(&self, got: usize) -> KnnResult<()> {
        if self.attributes.is_empty() {
            return Err(KnnError::EmptyDataset);
        }
        if got != self.attributes.len() {
            return Err(KnnError::DimensionMismatch {
                expected: self.attributes.len(),
                got,
            });
        }
        Ok(())
    }

    /// Remove the last value of the first `count` attributes.
    fn rollback(&mut self, count: usize) {
        tracing::warn!(columns = count, "rolling back partially added row");
        for attribute in &mut self.attributes[..count] {
            let popped = attribute.pop_last();
            debug_assert!(popped.is_some(), "rollback on empty column {}", attribute.name());
        }
    }

    /// Append an instance, one value per column. Either every column receives
    /// its value or none does.
    pub fn add_row(&mut self, instance: &Instance) -> KnnResult<()> {
        self.check_row_width(instance.len())?;
        for (i, value) in instance.values().iter().enumerate() {
            if let Err(e) = self.attributes[i].push(value.clone()) {
                self.rollback(i);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Append a row of raw fields, parsing numbers for quantitative columns.
    /// A field that fails to parse leaves the dataset unchanged.
    pub fn add_row_strings<S: AsRef<str>>(&mut self, fields: &[S]) -> KnnResult<()> {
        self.check_row_width(fields.len())?;
        for (i, field) in fields.iter().enumerate() {
            let pushed = self.attributes[i]
                .parse_value(field.as_ref())
                .and_then(|value| self.attributes[i].push(value));
            if let Err(e) = pushed {
                self.rollback(i);
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn delete_row(&mut self, index: usize) -> KnnResult<()> {
        self.check_row_index(index)?;
        for attribute in &mut self.attributes {
            attribute.delete(index)?;
        }
        Ok(())
    }

    // ─── Weights ────────────────────────────────────────────────────────────

    /// Set every column's weight from raw text. All weights are parsed and
    /// range-checked before any is applied.
    pub fn set_weights<S: AsRef<str>>(&mut self, weights: &[S]) -> KnnResult<()> {
        if weights.len() != self.attributes.len() {
            return Err(KnnError::InvalidWeight(format!(
                "expected {} weights, got {}",
                self.attributes.len(),
                weights.len()
            )));
        }
        let parsed = weights
            .iter()
            .map(|w| {
                let raw: &str = w.as_ref();
                let raw = raw.trim();
                raw.parse::<f64>()
                    .map_err(|_| KnnError::InvalidWeight(format!("cannot parse {raw:?}")))
                    .and_then(validate_weight)
            })
            .collect::<KnnResult<Vec<f64>>>()?;
        for (attribute, w) in self.attributes.iter_mut().zip(parsed) {
            attribute.set_weight(w);
        }
        Ok(())
    }

    pub fn set_weight(&mut self, index: usize, weight: f64) -> KnnResult<()> {
        let weight = validate_weight(weight)?;
        let size = self.attributes.len();
        let attribute = self
            .attributes
            .get_mut(index)
            .ok_or(KnnError::IndexOutOfBounds { index, size })?;
        attribute.set_weight(weight);
        Ok(())
    }

    /// Broadcast one weight to every column.
    pub fn set_all_weights(&mut self, weight: f64) -> KnnResult<()> {
        let weight = validate_weight(weight)?;
        for attribute in &mut self.attributes {
            attribute.set_weight(weight);
        }
        Ok(())
    }
}

/// CSV-style rendering: a header line of names, then one line per row.
impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.attribute_names().join(","))?;
        let width = self.number_of_attributes();
        for row in self.values().chunks(width.max(1)) {
            writeln!(f, "{}", row.join(","))?;
        }
        Ok(())
    }
}
