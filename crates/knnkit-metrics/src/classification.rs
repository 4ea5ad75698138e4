use knnkit_core::{KnnError, KnnResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compute accuracy: fraction of predictions equal to the true label.
///
/// An empty input has accuracy `0.0`.
pub fn accuracy<S: AsRef<str>>(y_true: &[S], y_pred: &[S]) -> KnnResult<f64> {
    if y_true.len() != y_pred.len() {
        return Err(KnnError::DimensionMismatch {
            expected: y_true.len(),
            got: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Ok(0.0);
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t.as_ref() == p.as_ref())
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Confusion matrix over a fixed class vocabulary.
///
/// Rows are actual classes, columns predicted classes, both in vocabulary
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    classes: Vec<String>,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(classes: Vec<String>) -> Self {
        let n = classes.len();
        ConfusionMatrix {
            classes,
            counts: vec![vec![0usize; n]; n],
        }
    }

    pub fn from_predictions<S: AsRef<str>>(
        classes: Vec<String>,
        y_true: &[S],
        y_pred: &[S],
    ) -> KnnResult<Self> {
        if y_true.len() != y_pred.len() {
            return Err(KnnError::DimensionMismatch {
                expected: y_true.len(),
                got: y_pred.len(),
            });
        }
        let mut matrix = ConfusionMatrix::new(classes);
        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            matrix.record(t.as_ref(), p.as_ref())?;
        }
        Ok(matrix)
    }

    fn class_index(&self, label: &str) -> KnnResult<usize> {
        self.classes
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| KnnError::InvalidValue {
                attribute: "class".into(),
                value: label.to_string(),
            })
    }

    /// Count one prediction.
    pub fn record(&mut self, actual: &str, predicted: &str) -> KnnResult<()> {
        let row = self.class_index(actual)?;
        let col = self.class_index(predicted)?;
        self.counts[row][col] += 1;
        Ok(())
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Count for an (actual, predicted) pair of labels.
    pub fn get(&self, actual: &str, predicted: &str) -> KnnResult<usize> {
        Ok(self.counts[self.class_index(actual)?][self.class_index(predicted)?])
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Diagonal sum.
    pub fn correct(&self) -> usize {
        (0..self.classes.len()).map(|i| self.counts[i][i]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }

    /// Precision for a specific class.
    pub fn precision(&self, class: &str) -> KnnResult<f64> {
        let c = self.class_index(class)?;
        let tp = self.counts[c][c];
        let predicted: usize = self.counts.iter().map(|row| row[c]).sum();
        Ok(if predicted == 0 {
            0.0
        } else {
            tp as f64 / predicted as f64
        })
    }

    /// Recall for a specific class.
    pub fn recall(&self, class: &str) -> KnnResult<f64> {
        let c = self.class_index(class)?;
        let tp = self.counts[c][c];
        let actual: usize = self.counts[c].iter().sum();
        Ok(if actual == 0 {
            0.0
        } else {
            tp as f64 / actual as f64
        })
    }

    /// F1 score for a specific class.
    pub fn f1(&self, class: &str) -> KnnResult<f64> {
        let p = self.precision(class)?;
        let r = self.recall(class)?;
        Ok(if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) })
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(String::len)
            .chain(self.counts.iter().flatten().map(|c| c.to_string().len()))
            .max()
            .unwrap_or(1);
        write!(f, "{:width$}", "")?;
        for class in &self.classes {
            write!(f, " {class:>width$}")?;
        }
        writeln!(f)?;
        for (class, row) in self.classes.iter().zip(&self.counts) {
            write!(f, "{class:width$}")?;
            for count in row {
                write!(f, " {count:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn classes() -> Vec<String> {
        vec!["cat".into(), "dog".into()]
    }

    #[test]
    fn test_accuracy() {
        let y_true = ["a", "b", "c", "b", "a"];
        let y_pred = ["a", "b", "c", "a", "a"];
        assert_abs_diff_eq!(accuracy(&y_true, &y_pred).unwrap(), 0.8);
        assert!(accuracy(&y_true, &y_pred[..2]).is_err());
        assert_eq!(accuracy::<&str>(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_confusion_matrix() {
        let y_true = ["cat", "cat", "dog", "dog"];
        let y_pred = ["cat", "dog", "cat", "dog"];
        let cm = ConfusionMatrix::from_predictions(classes(), &y_true, &y_pred).unwrap();
        assert_eq!(cm.get("cat", "cat").unwrap(), 1);
        assert_eq!(cm.get("cat", "dog").unwrap(), 1);
        assert_eq!(cm.get("dog", "cat").unwrap(), 1);
        assert_eq!(cm.get("dog", "dog").unwrap(), 1);
        assert_eq!(cm.total(), 4);
        assert_eq!(cm.correct(), 2);
        assert_abs_diff_eq!(cm.accuracy(), 0.5);
    }

    #[test]
    fn test_unknown_label_rejected() {
        let mut cm = ConfusionMatrix::new(classes());
        assert!(matches!(
            cm.record("cat", "bird"),
            Err(KnnError::InvalidValue { .. })
        ));
        assert_eq!(cm.total(), 0);
    }

    #[test]
    fn test_precision_recall_f1() {
        let y_true = ["dog", "dog", "cat", "cat", "dog"];
        let y_pred = ["dog", "cat", "cat", "dog", "dog"];
        let cm = ConfusionMatrix::from_predictions(classes(), &y_true, &y_pred).unwrap();
        // TP=2, FP=1, FN=1 for dog
        assert_abs_diff_eq!(cm.precision("dog").unwrap(), 2.0 / 3.0);
        assert_abs_diff_eq!(cm.recall("dog").unwrap(), 2.0 / 3.0);
        assert_abs_diff_eq!(cm.f1("dog").unwrap(), 2.0 / 3.0);
        assert_abs_diff_eq!(cm.recall("cat").unwrap(), 0.5);
    }

    #[test]
    fn test_display() {
        let cm = ConfusionMatrix::from_predictions(classes(), &["cat", "dog"], &["cat", "cat"])
            .unwrap();
        assert_eq!(cm.to_string(), "    cat dog\ncat   1   0\ndog   1   0\n");
    }
}
