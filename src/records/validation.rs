//! Validation of raw record fields
//!
//! Every field is checked independently; a submission with three bad fields
//! gets three messages back, not one.

use super::NewRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Record fields that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    First,
    Last,
    Age,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::First => "first",
            Field::Last => "last",
            Field::Age => "age",
        }
    }
}

/// Field name to human-readable message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

/// A submitted field value
///
/// Form bodies always carry text; JSON bodies may send `age` as a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Float(n) => n.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(i64::from(n))
    }
}

/// Raw save request body, before validation
///
/// The Portuguese aliases are the field names posted by the bundled form page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecordInput {
    #[serde(default, alias = "nome")]
    pub first: Option<FieldValue>,
    #[serde(default, alias = "sobrenome")]
    pub last: Option<FieldValue>,
    #[serde(default, alias = "idade")]
    pub age: Option<FieldValue>,
}

impl RawRecordInput {
    pub fn new(
        first: impl Into<FieldValue>,
        last: impl Into<FieldValue>,
        age: impl Into<FieldValue>,
    ) -> Self {
        Self {
            first: Some(first.into()),
            last: Some(last.into()),
            age: Some(age.into()),
        }
    }
}

const FIRST_REQUIRED: &str = "first name is required";
const LAST_REQUIRED: &str = "last name is required";
const AGE_REQUIRED: &str = "age is required";
const AGE_NOT_A_NUMBER: &str = "age must be a whole number";
const AGE_NOT_POSITIVE: &str = "age must be greater than 0";
const AGE_OUT_OF_RANGE: &str = "age is out of range";

/// Validate raw input into a [`NewRecord`]
///
/// # Errors
///
/// Returns every failing field with its message.
pub fn validate(input: &RawRecordInput) -> Result<NewRecord, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let first = required_name(input.first.as_ref());
    if first.is_none() {
        errors.add(Field::First, FIRST_REQUIRED);
    }

    let last = required_name(input.last.as_ref());
    if last.is_none() {
        errors.add(Field::Last, LAST_REQUIRED);
    }

    let age = match parse_age(input.age.as_ref()) {
        Ok(age) => Some(age),
        Err(message) => {
            errors.add(Field::Age, message);
            None
        }
    };

    match (first, last, age) {
        (Some(first), Some(last), Some(age)) if errors.is_empty() => {
            Ok(NewRecord::new(first, last, age))
        }
        _ => Err(errors),
    }
}

fn required_name(value: Option<&FieldValue>) -> Option<String> {
    let text = value?.as_text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_age(value: Option<&FieldValue>) -> Result<u32, &'static str> {
    let number = match value {
        None => return Err(AGE_REQUIRED),
        Some(FieldValue::Integer(n)) => *n,
        Some(FieldValue::Float(f)) => {
            if !f.is_finite() || f.fract() != 0.0 {
                return Err(AGE_NOT_A_NUMBER);
            }
            if *f <= 0.0 {
                return Err(AGE_NOT_POSITIVE);
            }
            if *f > f64::from(u32::MAX) {
                return Err(AGE_OUT_OF_RANGE);
            }
            return Ok(*f as u32);
        }
        Some(FieldValue::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Err(AGE_REQUIRED);
            }
            s.parse::<i64>().map_err(|_| AGE_NOT_A_NUMBER)?
        }
    };

    if number <= 0 {
        return Err(AGE_NOT_POSITIVE);
    }
    u32::try_from(number).map_err(|_| AGE_OUT_OF_RANGE)
}
