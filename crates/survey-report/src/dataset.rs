//! Passenger manifest loading.
//!
//! The manifest is read once into a [`Dataset`] and never mutated afterwards.
//! Columns are addressed through [`Field`], which knows the header name and
//! the kind of values each column holds.
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::{ReportError, Result};

/// Known manifest columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    PassengerId,
    Survived,
    Pclass,
    Name,
    Sex,
    Age,
    SibSp,
    Parch,
    Ticket,
    Fare,
    Cabin,
    Embarked,
}

/// Kind of values held by a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Categorical,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnKind::Integer | ColumnKind::Float | ColumnKind::Boolean
        )
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Text => "text",
        };
        f.write_str(name)
    }
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::PassengerId,
        Field::Survived,
        Field::Pclass,
        Field::Name,
        Field::Sex,
        Field::Age,
        Field::SibSp,
        Field::Parch,
        Field::Ticket,
        Field::Fare,
        Field::Cabin,
        Field::Embarked,
    ];

    /// Columns that must appear in the header for a manifest to load.
    pub const REQUIRED: [Field; 10] = [
        Field::PassengerId,
        Field::Survived,
        Field::Pclass,
        Field::Sex,
        Field::Age,
        Field::SibSp,
        Field::Parch,
        Field::Fare,
        Field::Cabin,
        Field::Embarked,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Field::PassengerId => "PassengerId",
            Field::Survived => "Survived",
            Field::Pclass => "Pclass",
            Field::Name => "Name",
            Field::Sex => "Sex",
            Field::Age => "Age",
            Field::SibSp => "SibSp",
            Field::Parch => "Parch",
            Field::Ticket => "Ticket",
            Field::Fare => "Fare",
            Field::Cabin => "Cabin",
            Field::Embarked => "Embarked",
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Field::PassengerId | Field::Pclass | Field::SibSp | Field::Parch => ColumnKind::Integer,
            Field::Age | Field::Fare => ColumnKind::Float,
            Field::Survived => ColumnKind::Boolean,
            Field::Sex | Field::Embarked => ColumnKind::Categorical,
            Field::Name | Field::Ticket | Field::Cabin => ColumnKind::Text,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Field {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.header().to_lowercase() == wanted)
            .ok_or_else(|| ReportError::UnknownColumn(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TicketClass {
    First,
    Second,
    Third,
}

impl TryFrom<u8> for TicketClass {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(TicketClass::First),
            2 => Ok(TicketClass::Second),
            3 => Ok(TicketClass::Third),
            other => Err(format!("ticket class must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<TicketClass> for u8 {
    fn from(class: TicketClass) -> u8 {
        match class {
            TicketClass::First => 1,
            TicketClass::Second => 2,
            TicketClass::Third => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// Port of embarkation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Port {
    #[serde(rename = "C")]
    Cherbourg,
    #[serde(rename = "Q")]
    Queenstown,
    #[serde(rename = "S")]
    Southampton,
}

impl Port {
    pub fn code(&self) -> &'static str {
        match self {
            Port::Cherbourg => "C",
            Port::Queenstown => "Q",
            Port::Southampton => "S",
        }
    }
}

/// One row of the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    #[serde(rename = "PassengerId")]
    pub id: u32,
    #[serde(rename = "Survived", deserialize_with = "deserialize_flag")]
    pub survived: bool,
    #[serde(rename = "Pclass")]
    pub class: TicketClass,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Sex")]
    pub sex: Sex,
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "SibSp")]
    pub siblings_spouses: u32,
    #[serde(rename = "Parch")]
    pub parents_children: u32,
    #[serde(rename = "Ticket", default)]
    pub ticket: Option<String>,
    #[serde(rename = "Fare")]
    pub fare: f64,
    #[serde(rename = "Cabin")]
    pub cabin: Option<String>,
    #[serde(rename = "Embarked")]
    pub embarked: Option<Port>,
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" => Ok(false),
        other => Err(de::Error::custom(format!(
            "survival flag must be 0 or 1, got {:?}",
            other
        ))),
    }
}

impl Passenger {
    /// Numeric value of a field, `None` when missing or not numeric.
    pub fn numeric(&self, field: Field) -> Option<f64> {
        match field {
            Field::PassengerId => Some(self.id as f64),
            Field::Survived => Some(if self.survived { 1.0 } else { 0.0 }),
            Field::Pclass => Some(u8::from(self.class) as f64),
            Field::Age => self.age,
            Field::SibSp => Some(self.siblings_spouses as f64),
            Field::Parch => Some(self.parents_children as f64),
            Field::Fare => Some(self.fare),
            Field::Name | Field::Sex | Field::Ticket | Field::Cabin | Field::Embarked => None,
        }
    }

    /// Value of a field rendered as a category label, `None` when missing.
    pub fn category(&self, field: Field) -> Option<String> {
        match field {
            Field::Survived => Some(if self.survived { "1" } else { "0" }.to_string()),
            Field::Sex => Some(self.sex.as_str().to_string()),
            Field::Embarked => self.embarked.map(|port| port.code().to_string()),
            Field::Name => self.name.clone(),
            Field::Ticket => self.ticket.clone(),
            Field::Cabin => self.cabin.clone(),
            Field::Age => self.age.map(|age| age.to_string()),
            Field::Fare => Some(self.fare.to_string()),
            Field::PassengerId => Some(self.id.to_string()),
            Field::Pclass => Some(u8::from(self.class).to_string()),
            Field::SibSp => Some(self.siblings_spouses.to_string()),
            Field::Parch => Some(self.parents_children.to_string()),
        }
    }
}

/// Column view over a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn missing(&self) -> usize {
        match self {
            Column::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            Column::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }
}

/// The immutable in-memory manifest.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: Option<PathBuf>,
    columns: Vec<Field>,
    records: Vec<Passenger>,
}

impl Dataset {
    /// Load a manifest from a CSV (or `.tsv`) file with a header row.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReportError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|e| ReportError::io(path, e))?;
        let reader = BufReader::new(file);

        let is_tsv = path.extension().map(|e| e == "tsv").unwrap_or(false);
        let delimiter = if is_tsv { b'\t' } else { b',' };

        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let format_error = |err: csv::Error| ReportError::Format {
            path: path.to_path_buf(),
            line: err.position().map(|p| p.line()),
            message: err.to_string(),
        };

        // Known columns match case-insensitively; rename them to the exact
        // names `Passenger` deserializes from.
        let headers: StringRecord = rdr
            .headers()
            .map_err(format_error)?
            .iter()
            .map(|h| match Field::from_str(h) {
                Ok(field) => field.header(),
                Err(_) => h,
            })
            .collect();
        rdr.set_headers(headers.clone());

        let columns: Vec<Field> = headers
            .iter()
            .filter_map(|h| Field::from_str(h).ok())
            .collect();

        let missing: Vec<&str> = Field::REQUIRED
            .iter()
            .filter(|field| !columns.contains(field))
            .map(|field| field.header())
            .collect();
        if !missing.is_empty() {
            return Err(ReportError::Format {
                path: path.to_path_buf(),
                line: Some(1),
                message: format!("missing required columns: {}", missing.join(", ")),
            });
        }

        let mut records = Vec::new();
        for result in rdr.deserialize::<Passenger>() {
            records.push(result.map_err(format_error)?);
        }

        log::info!(
            "Loaded {} passengers ({} known columns) from {}",
            records.len(),
            columns.len(),
            path.display()
        );

        Ok(Dataset {
            source: Some(path.to_path_buf()),
            columns,
            records,
        })
    }

    /// Build a dataset from records already in memory. All known columns are
    /// treated as present.
    pub fn from_records(records: Vec<Passenger>) -> Self {
        Dataset {
            source: None,
            columns: Field::ALL.to_vec(),
            records,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Known columns in header order.
    pub fn columns(&self) -> &[Field] {
        &self.columns
    }

    pub fn has_column(&self, field: Field) -> bool {
        self.columns.contains(&field)
    }

    pub fn records(&self) -> &[Passenger] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Typed view of one column, aligned with [`Dataset::records`].
    pub fn column(&self, field: Field) -> Result<Column> {
        if !self.has_column(field) {
            return Err(ReportError::UnknownColumn(field.header().to_string()));
        }
        let column = if field.kind().is_numeric() {
            Column::Numeric(self.records.iter().map(|r| r.numeric(field)).collect())
        } else {
            Column::Categorical(self.records.iter().map(|r| r.category(field)).collect())
        };
        Ok(column)
    }

    /// Numeric values of a column, `None` where missing.
    pub fn numeric_values(&self, field: Field) -> Result<Vec<Option<f64>>> {
        match self.column(field)? {
            Column::Numeric(values) => Ok(values),
            Column::Categorical(_) => Err(ReportError::InvalidArgument(format!(
                "column {} is not numeric",
                field
            ))),
        }
    }

    /// Category labels of a column, `None` where missing. Numeric columns
    /// are rendered as their textual value.
    pub fn categories(&self, field: Field) -> Result<Vec<Option<String>>> {
        if !self.has_column(field) {
            return Err(ReportError::UnknownColumn(field.header().to_string()));
        }
        Ok(self.records.iter().map(|r| r.category(field)).collect())
    }
}
