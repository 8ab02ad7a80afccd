//! Integration tests for manifest loading and column access.

use std::io::Write;
use std::path::PathBuf;

use survey_report::dataset::{Column, ColumnKind, Port, Sex, TicketClass};
use survey_report::{Dataset, Field, ReportError};

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/titanic_sample.csv")
}

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(content.as_bytes()).unwrap();
    path
}

const HEADER: &str = "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked";

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn load_sample_manifest() {
    let ds = Dataset::load(sample_path()).unwrap();
    assert_eq!(ds.len(), 13);
    assert_eq!(ds.columns().len(), 12);
    assert!(ds.source().is_some());

    let first = &ds.records()[0];
    assert_eq!(first.id, 1);
    assert!(!first.survived);
    assert_eq!(first.class, TicketClass::Third);
    assert_eq!(first.sex, Sex::Male);
    assert_eq!(first.age, Some(22.0));
    assert_eq!(first.siblings_spouses, 1);
    assert!((first.fare - 7.25).abs() < 1e-9);
    assert_eq!(first.cabin, None);
    assert_eq!(first.embarked, Some(Port::Southampton));
    assert_eq!(first.name.as_deref(), Some("Braund, Mr. Owen Harris"));
}

#[test]
fn load_keeps_missing_values() {
    let ds = Dataset::load(sample_path()).unwrap();
    let moran = ds.records().iter().find(|p| p.id == 6).unwrap();
    assert_eq!(moran.age, None);
    assert_eq!(moran.embarked, Some(Port::Queenstown));

    let icard = ds.records().iter().find(|p| p.id == 62).unwrap();
    assert_eq!(icard.embarked, None);
    assert_eq!(icard.cabin.as_deref(), Some("B28"));
}

#[test]
fn load_missing_file_is_not_found() {
    let err = Dataset::load("/nonexistent/titanic.csv").unwrap_err();
    assert!(matches!(err, ReportError::NotFound(_)));
}

#[test]
fn load_missing_required_column_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "bad.csv", "PassengerId,Survived\n1,0\n");
    let err = Dataset::load(&path).unwrap_err();
    match err {
        ReportError::Format { message, .. } => assert!(message.contains("Pclass")),
        other => panic!("expected Format error, got {:?}", other),
    }
}

#[test]
fn load_unparseable_value_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let content = format!("{}\n1,maybe,3,A,male,22,1,0,T,7.25,,S\n", HEADER);
    let path = write_file(&dir, "bad.csv", &content);
    let err = Dataset::load(&path).unwrap_err();
    assert!(matches!(err, ReportError::Format { .. }), "got {:?}", err);
}

#[test]
fn load_rejects_unknown_ticket_class() {
    let dir = tempfile::tempdir().unwrap();
    let content = format!("{}\n1,0,4,A,male,22,1,0,T,7.25,,S\n", HEADER);
    let path = write_file(&dir, "bad.csv", &content);
    assert!(matches!(
        Dataset::load(&path).unwrap_err(),
        ReportError::Format { .. }
    ));
}

#[test]
fn load_ignores_unknown_columns_and_optional_ones() {
    let dir = tempfile::tempdir().unwrap();
    let content = "Extra,PassengerId,Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Cabin,Embarked\n\
                   x,1,1,2,female,30,0,0,13.0,,C\n";
    let path = write_file(&dir, "extra.csv", content);
    let ds = Dataset::load(&path).unwrap();
    assert_eq!(ds.len(), 1);
    assert!(!ds.has_column(Field::Name));
    assert!(!ds.has_column(Field::Ticket));
    assert_eq!(ds.records()[0].name, None);
    assert!(ds.records()[0].survived);
}

#[test]
fn load_matches_headers_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let content = "passengerid,SURVIVED,pclass,name,sex,age,sibsp,parch,ticket,fare,cabin,embarked\n\
                   7,1,1,\"Doe, Ms. Jane\",female,41,0,1,PC 1,80.5,C5,C\n";
    let path = write_file(&dir, "lower.csv", content);
    let ds = Dataset::load(&path).unwrap();
    assert_eq!(ds.columns().len(), 12);

    let p = &ds.records()[0];
    assert_eq!(p.id, 7);
    assert!(p.survived);
    assert_eq!(p.class, TicketClass::First);
    assert_eq!(p.name.as_deref(), Some("Doe, Ms. Jane"));
    assert_eq!(p.age, Some(41.0));
    assert_eq!(p.parents_children, 1);
    assert_eq!(p.embarked, Some(Port::Cherbourg));
}

#[test]
fn load_tsv_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let content = "PassengerId\tSurvived\tPclass\tSex\tAge\tSibSp\tParch\tFare\tCabin\tEmbarked\n\
                   1\t0\t3\tmale\t\t0\t0\t8.05\t\tS\n";
    let path = write_file(&dir, "manifest.tsv", content);
    let ds = Dataset::load(&path).unwrap();
    assert_eq!(ds.len(), 1);
    assert_eq!(ds.records()[0].age, None);
}

#[test]
fn load_header_only_gives_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "empty.csv", &format!("{}\n", HEADER));
    let ds = Dataset::load(&path).unwrap();
    assert!(ds.is_empty());
}

// ---------------------------------------------------------------------------
// Fields and columns
// ---------------------------------------------------------------------------

#[test]
fn field_from_str_is_case_insensitive() {
    assert_eq!("pclass".parse::<Field>().unwrap(), Field::Pclass);
    assert_eq!(" SURVIVED ".parse::<Field>().unwrap(), Field::Survived);
    assert!(matches!(
        "Deck".parse::<Field>().unwrap_err(),
        ReportError::UnknownColumn(_)
    ));
}

#[test]
fn field_kinds() {
    assert_eq!(Field::Age.kind(), ColumnKind::Float);
    assert_eq!(Field::Survived.kind(), ColumnKind::Boolean);
    assert_eq!(Field::Embarked.kind(), ColumnKind::Categorical);
    assert!(Field::Pclass.kind().is_numeric());
    assert!(!Field::Cabin.kind().is_numeric());
}

#[test]
fn numeric_column_aligned_with_records() {
    let ds = Dataset::load(sample_path()).unwrap();
    let ages = ds.numeric_values(Field::Age).unwrap();
    assert_eq!(ages.len(), ds.len());
    assert_eq!(ages.iter().filter(|a| a.is_none()).count(), 1);

    match ds.column(Field::Embarked).unwrap() {
        Column::Categorical(values) => {
            assert_eq!(values[0].as_deref(), Some("S"));
            assert_eq!(values.iter().filter(|v| v.is_none()).count(), 1);
        }
        Column::Numeric(_) => panic!("Embarked should be categorical"),
    }
}

#[test]
fn numeric_values_of_categorical_column_errors() {
    let ds = Dataset::load(sample_path()).unwrap();
    assert!(matches!(
        ds.numeric_values(Field::Sex).unwrap_err(),
        ReportError::InvalidArgument(_)
    ));
}
