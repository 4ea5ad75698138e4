use knnkit_data::{Attribute, Dataset};
use knnkit_metrics::EvaluationReport;
use knnkit_preprocessing::TrainTestSplit;
use std::io::Write;
use std::path::Path;

use crate::error::{IoError, IoResult};

/// Read a CSV file into a dataset.
///
/// The header row names the attributes. A column whose first data value parses
/// as a number is quantitative, otherwise categorical; every later row must
/// follow those kinds.
pub fn read_dataset(path: impl AsRef<Path>) -> IoResult<Dataset> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(IoError::EmptyFile(path.display().to_string()));
    }

    let mut records = rdr.records();
    let first = match records.next() {
        Some(record) => record?,
        None => {
            return Err(IoError::Malformed(format!(
                "{} has no data rows to infer column types from",
                path.display()
            )))
        }
    };

    let attributes = headers
        .iter()
        .zip(first.iter())
        .map(|(name, value)| {
            if value.parse::<f64>().is_ok() {
                Attribute::quantitative(name.clone())
            } else {
                Attribute::categorical(name.clone())
            }
        })
        .collect();
    let mut dataset = Dataset::from_attributes(attributes)?;
    dataset.add_row_strings(&first.iter().collect::<Vec<_>>())?;

    for result in records {
        let record = result?;
        dataset.add_row_strings(&record.iter().collect::<Vec<_>>())?;
    }

    tracing::info!(
        path = %path.display(),
        rows = dataset.number_of_cases(),
        attributes = dataset.number_of_attributes(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Write a dataset as CSV with a header row.
pub fn write_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> IoResult<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(dataset.attribute_names())?;

    for i in 0..dataset.number_of_cases() {
        let row: Vec<String> = dataset
            .row_at(i)?
            .values()
            .iter()
            .map(|v| v.to_string())
            .collect();
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    tracing::info!(path = %path.display(), rows = dataset.number_of_cases(), "saved dataset");
    Ok(())
}

/// Write the train and test partitions to two CSV files.
pub fn write_split(
    train_path: impl AsRef<Path>,
    test_path: impl AsRef<Path>,
    split: &TrainTestSplit,
) -> IoResult<()> {
    write_dataset(train_path, &split.train)?;
    write_dataset(test_path, &split.test)
}

/// Read a train and a test CSV file, merging their class vocabularies.
pub fn read_split(train_path: impl AsRef<Path>, test_path: impl AsRef<Path>) -> IoResult<TrainTestSplit> {
    let train = read_dataset(train_path)?;
    let test = read_dataset(test_path)?;
    if train.attribute_names() != test.attribute_names() {
        return Err(IoError::Malformed(
            "train and test files have different columns".into(),
        ));
    }
    Ok(TrainTestSplit::from_parts(train, test)?)
}

/// Export per-row predictions followed by the overall accuracy.
///
/// ```text
/// instance,actual,predicted,correct
/// 0,A,A,true
///
/// accuracy,100.00%
/// ```
pub fn write_predictions(path: impl AsRef<Path>, report: &EvaluationReport) -> IoResult<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["instance", "actual", "predicted", "correct"])?;
    for p in &report.predictions {
        wtr.write_record([
            p.index.to_string(),
            p.actual.clone(),
            p.predicted.clone(),
            p.correct.to_string(),
        ])?;
    }
    let mut file = wtr.into_inner().map_err(|e| e.into_error())?;
    writeln!(file)?;
    writeln!(file, "accuracy,{:.2}%", report.accuracy * 100.0)?;
    file.flush()?;
    tracing::info!(
        path = %path.display(),
        predictions = report.predictions.len(),
        "exported predictions"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use knnkit_data::Value;
    use knnkit_metrics::evaluate;
    use knnkit_neighbors::KNNClassifier;
    use std::fs;

    const IRIS: &str = "\
sepal_length,sepal_width,species
5.1,3.5,setosa
4.9,3.0,setosa
7.0,3.2,versicolor
6.4,3.2,versicolor
";

    #[test]
    fn test_read_infers_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iris.csv");
        fs::write(&path, IRIS).unwrap();

        let ds = read_dataset(&path).unwrap();
        assert_eq!(ds.number_of_cases(), 4);
        assert_eq!(ds.attribute_names(), vec!["sepal_length", "sepal_width", "species"]);
        assert!(ds.attribute(0).unwrap().is_quantitative());
        assert!(ds.attribute(2).unwrap().is_categorical());
        assert_eq!(ds.distinct_labels().unwrap(), vec!["setosa", "versicolor"]);
        assert_eq!(ds.row_at(2).unwrap().values()[0], Value::Number(7.0));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("in.csv");
        let target = dir.path().join("out.csv");
        fs::write(&source, IRIS).unwrap();

        let ds = read_dataset(&source).unwrap();
        write_dataset(&target, &ds).unwrap();
        let text = fs::read_to_string(&target).unwrap();
        assert!(text.starts_with("sepal_length,sepal_width,species\n5.1,3.5,setosa\n"));
        assert_eq!(read_dataset(&target).unwrap(), ds);
    }

    #[test]
    fn test_bad_numeric_value_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "x,class\n1,A\nabc,B\n").unwrap();
        assert!(matches!(read_dataset(&path), Err(IoError::Data(_))));
    }

    #[test]
    fn test_empty_and_header_only_files() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.csv");
        fs::write(&empty, "").unwrap();
        assert!(matches!(read_dataset(&empty), Err(IoError::EmptyFile(_))));

        let header = dir.path().join("header.csv");
        fs::write(&header, "x,class\n").unwrap();
        assert!(matches!(read_dataset(&header), Err(IoError::Malformed(_))));

        assert!(matches!(
            read_dataset(dir.path().join("missing.csv")),
            Err(IoError::Csv(_))
        ));
    }

    #[test]
    fn test_split_files_merge_classes() {
        let dir = tempfile::tempdir().unwrap();
        let train = dir.path().join("train.csv");
        let test = dir.path().join("test.csv");
        fs::write(&train, "x,class\n1,A\n2,B\n").unwrap();
        fs::write(&test, "x,class\n3,C\n4,A\n").unwrap();

        let split = read_split(&train, &test).unwrap();
        assert_eq!(split.classes, vec!["A", "B", "C"]);

        let again = dir.path().join("again_train.csv");
        let again_test = dir.path().join("again_test.csv");
        write_split(&again, &again_test, &split).unwrap();
        assert_eq!(read_split(&again, &again_test).unwrap(), split);
    }

    #[test]
    fn test_write_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let train = dir.path().join("train.csv");
        let test = dir.path().join("test.csv");
        fs::write(&train, "x,class\n0,A\n10,B\n").unwrap();
        fs::write(&test, "x,class\n1,A\n9,A\n").unwrap();
        let split = read_split(&train, &test).unwrap();
        let report = evaluate(&split, &KNNClassifier::new(1).unwrap()).unwrap();

        let out = dir.path().join("predictions.csv");
        write_predictions(&out, &report).unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap(),
            "instance,actual,predicted,correct\n0,A,A,true\n1,A,B,false\n\naccuracy,50.00%\n"
        );
    }
}
