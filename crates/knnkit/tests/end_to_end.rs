use approx::assert_abs_diff_eq;
use knnkit::data::{Attribute, Dataset, Instance, Value};
use knnkit::io::{
    load_config, load_report, read_dataset, read_split, save_report, write_predictions, write_split,
};
use knnkit::metrics::{evaluate, run_experiment, ExperimentConfig};
use knnkit::neighbors::KNNClassifier;
use knnkit::preprocessing::{train_test_split, Preprocessing};
use std::fs;

const FRUIT: &str = "\
weight,diameter,color,fruit
150,7.0,red,apple
170,7.5,red,apple
140,6.8,green,apple
160,7.2,green,apple
120,6.0,orange,orange
130,6.5,orange,orange
125,6.2,orange,orange
135,6.6,orange,orange
";

fn points() -> Dataset {
    let mut ds = Dataset::from_attributes(vec![
        Attribute::quantitative("x"),
        Attribute::quantitative("y"),
        Attribute::categorical("class"),
    ])
    .unwrap();
    ds.add_row_strings(&["1", "1", "A"]).unwrap();
    ds.add_row_strings(&["2", "2", "A"]).unwrap();
    ds.add_row_strings(&["8", "8", "B"]).unwrap();
    ds
}

fn query(x: f64, y: f64) -> Instance {
    Instance::unlabelled(vec![Value::Number(x), Value::Number(y)])
}

#[test]
fn test_classify_small_table() {
    let train = points();
    let two = KNNClassifier::new(2).unwrap();
    assert_eq!(two.classify(&train, &query(1.5, 1.5)).unwrap(), "A");

    let one = KNNClassifier::new(1).unwrap();
    assert_eq!(one.classify(&train, &query(7.0, 7.0)).unwrap(), "B");
}

#[test]
fn test_classify_with_every_preprocessing_mode() {
    let train = points();
    let knn = KNNClassifier::new(1).unwrap();
    for mode in [
        Preprocessing::Raw,
        Preprocessing::Normalized,
        Preprocessing::Standardized,
    ] {
        assert_eq!(knn.classify_with(&train, &query(1.2, 1.1), mode).unwrap(), "A");
        assert_eq!(knn.classify_with(&train, &query(7.5, 7.9), mode).unwrap(), "B");
    }
    // The raw table is untouched.
    assert_eq!(train, points());
}

#[test]
fn test_csv_to_report() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("fruit.csv");
    fs::write(&data, FRUIT).unwrap();

    let mut ds = read_dataset(&data).unwrap();
    assert_eq!(ds.number_of_cases(), 8);
    assert!(ds.attribute(2).unwrap().is_categorical());
    // Only numeric columns take part in the distance.
    assert_eq!(ds.feature_weights().len(), 2);

    Preprocessing::Normalized.apply(&mut ds);
    let split = train_test_split(&ds, 0.75, Some(11)).unwrap();
    assert_eq!(split.train.number_of_cases(), 6);
    assert_eq!(split.classes, vec!["apple", "orange"]);

    let train_path = dir.path().join("train.csv");
    let test_path = dir.path().join("test.csv");
    write_split(&train_path, &test_path, &split).unwrap();
    let reloaded = read_split(&train_path, &test_path).unwrap();
    assert_eq!(reloaded.test.number_of_cases(), 2);

    let report = evaluate(&reloaded, &KNNClassifier::new(3).unwrap()).unwrap();
    assert_eq!(report.predictions.len(), 2);
    assert_eq!(report.confusion.total(), 2);

    let out = dir.path().join("predictions.csv");
    write_predictions(&out, &report).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("instance,actual,predicted,correct\n"));
    assert!(text.trim_end().ends_with('%'));

    let report_path = dir.path().join("report.json");
    save_report(&report_path, &report).unwrap();
    assert_eq!(load_report(&report_path).unwrap(), report);
}

#[test]
fn test_experiment_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("fruit.csv");
    fs::write(&data, FRUIT).unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        r#"{"k": 1, "train_ratio": 1.0, "preprocessing": "standardized", "parallel": false}"#,
    )
    .unwrap();

    let config: ExperimentConfig = load_config(&config_path).unwrap();
    let ds = read_dataset(&data).unwrap();
    let report = run_experiment(&ds, &config).unwrap();
    // Every row is in the training set, so there is nothing to test.
    assert!(report.predictions.is_empty());
    assert_abs_diff_eq!(report.accuracy, 0.0);

    let mut config = config;
    config.train_ratio = 0.5;
    config.seed = Some(5);
    let report = run_experiment(&ds, &config).unwrap();
    assert_eq!(report.predictions.len(), 4);
    assert!(report.accuracy >= 0.0 && report.accuracy <= 1.0);
}

#[test]
fn test_weights_shift_the_vote() {
    let mut train = Dataset::from_attributes(vec![
        Attribute::quantitative("x"),
        Attribute::quantitative("y"),
        Attribute::categorical("class"),
    ])
    .unwrap();
    train.add_row_strings(&["1", "6", "same_x"]).unwrap();
    train.add_row_strings(&["4", "1", "same_y"]).unwrap();
    let knn = KNNClassifier::new(1).unwrap();
    let q = query(1.0, 1.0);

    assert_eq!(knn.classify(&train, &q).unwrap(), "same_y");
    // Ignore y entirely.
    train.set_weights(&["1.0", "0.0", "1.0"]).unwrap();
    assert_eq!(knn.classify(&train, &q).unwrap(), "same_x");
}
