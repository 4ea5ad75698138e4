use knnkit_metrics::{EvaluationReport, ExperimentConfig};
use std::fs;
use std::path::Path;

use crate::error::IoResult;

/// Load an experiment configuration from JSON and validate it.
pub fn load_config(path: impl AsRef<Path>) -> IoResult<ExperimentConfig> {
    let json = fs::read_to_string(path)?;
    let config: ExperimentConfig = serde_json::from_str(&json)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config(path: impl AsRef<Path>, config: &ExperimentConfig) -> IoResult<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

/// Save an evaluation report as pretty-printed JSON.
pub fn save_report(path: impl AsRef<Path>, report: &EvaluationReport) -> IoResult<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), accuracy = report.accuracy, "saved report");
    Ok(())
}

pub fn load_report(path: impl AsRef<Path>) -> IoResult<EvaluationReport> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IoError;
    use knnkit_metrics::{ConfusionMatrix, Prediction};
    use knnkit_preprocessing::Preprocessing;

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = ExperimentConfig::new(5, 0.8);
        config.seed = Some(3);
        config.preprocessing = Preprocessing::Normalized;

        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"k": 0, "train_ratio": 0.5}"#).unwrap();
        assert!(matches!(load_config(&path), Err(IoError::Data(_))));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_config(&path), Err(IoError::Json(_))));

        assert!(matches!(
            load_config(dir.path().join("missing.json")),
            Err(IoError::Io(_))
        ));
    }

    #[test]
    fn test_report_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut confusion = ConfusionMatrix::new(vec!["A".into(), "B".into()]);
        confusion.record("A", "B").unwrap();
        let report = EvaluationReport {
            k: 3,
            predictions: vec![Prediction {
                index: 0,
                actual: "A".into(),
                predicted: "B".into(),
                correct: false,
            }],
            confusion,
            accuracy: 0.0,
        };

        save_report(&path, &report).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"predicted\": \"B\""));
        assert_eq!(load_report(&path).unwrap(), report);
    }
}
