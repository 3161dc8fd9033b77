use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Gender, MAX_AGE, MIN_AGE, Severity, SymptomReport, parse_age};

pub const MIN_SYMPTOM_CHARS: usize = 10;
pub const MAX_SYMPTOM_CHARS: usize = 500;

/// Per-field validation messages, in form order
pub type FieldErrors = BTreeMap<Field, String>;

/// Form fields in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Symptoms,
    Age,
    Gender,
    Severity,
    Duration,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Symptoms,
        Field::Age,
        Field::Gender,
        Field::Severity,
        Field::Duration,
    ];

    pub const REQUIRED: [Field; 4] = [
        Field::Symptoms,
        Field::Gender,
        Field::Severity,
        Field::Duration,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Symptoms => "Symptoms Description",
            Field::Age => "Age",
            Field::Gender => "Gender",
            Field::Severity => "Severity Level",
            Field::Duration => "Duration",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Field::Symptoms => "Be as specific as possible about what you're experiencing",
            Field::Age => "optional, 1-120",
            Field::Gender => "male, female or other",
            Field::Severity => "mild, moderate or severe",
            Field::Duration => "e.g. 2 days, 1 week, 3 hours, ongoing for months",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    /// 1-based position in the form
    pub fn from_index(index: usize) -> Option<Field> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values as typed by the user; nothing is validated until submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeForm {
    pub symptoms: String,
    pub age: String,
    pub gender: Option<Gender>,
    pub severity: Option<Severity>,
    pub duration: String,
}

impl IntakeForm {
    pub fn is_filled(&self, field: Field) -> bool {
        match field {
            Field::Symptoms => !self.symptoms.trim().is_empty(),
            Field::Age => !self.age.trim().is_empty(),
            Field::Gender => self.gender.is_some(),
            Field::Severity => self.severity.is_some(),
            Field::Duration => !self.duration.trim().is_empty(),
        }
    }

    /// Filled required fields over total required fields, rounded to a percent
    pub fn completion_percentage(&self) -> u8 {
        let total = Field::REQUIRED.len();
        let filled = Field::REQUIRED
            .iter()
            .filter(|f| self.is_filled(**f))
            .count();
        ((filled * 100 + total / 2) / total) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.completion_percentage() == 100
    }

    /// Store raw input for a field. Selection fields must name a valid option;
    /// an empty value clears the selection.
    pub fn set(&mut self, field: Field, value: &str) -> Result<(), String> {
        match field {
            Field::Symptoms => self.symptoms = value.to_string(),
            Field::Age => self.age = value.trim().to_string(),
            Field::Duration => self.duration = value.to_string(),
            Field::Gender => {
                self.gender = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.parse()?)
                }
            }
            Field::Severity => {
                self.severity = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.parse()?)
                }
            }
        }
        Ok(())
    }

    pub fn display_value(&self, field: Field) -> String {
        match field {
            Field::Symptoms => self.symptoms.clone(),
            Field::Age => self.age.clone(),
            Field::Gender => self.gender.map(|g| g.to_string()).unwrap_or_default(),
            Field::Severity => self.severity.map(|s| s.to_string()).unwrap_or_default(),
            Field::Duration => self.duration.clone(),
        }
    }

    /// Field-level validation; every failing field gets its own message.
    pub fn validate(&self) -> Result<SymptomReport, FieldErrors> {
        let mut errors = FieldErrors::new();

        let symptoms = self.symptoms.trim();
        if symptoms.is_empty() {
            errors.insert(Field::Symptoms, "Please describe your symptoms".to_string());
        } else if symptoms.chars().count() < MIN_SYMPTOM_CHARS {
            errors.insert(
                Field::Symptoms,
                format!(
                    "Please provide more detailed description (at least {MIN_SYMPTOM_CHARS} characters)"
                ),
            );
        }

        if self.gender.is_none() {
            errors.insert(Field::Gender, "Please select your gender".to_string());
        }
        if self.severity.is_none() {
            errors.insert(Field::Severity, "Please select symptom severity".to_string());
        }

        let duration = self.duration.trim();
        if duration.is_empty() {
            errors.insert(Field::Duration, "Please specify duration".to_string());
        }

        let age = if self.age.trim().is_empty() {
            None
        } else {
            match parse_age(&self.age) {
                Ok(age) => Some(age),
                Err(_) => {
                    errors.insert(
                        Field::Age,
                        format!("Please enter a valid age between {MIN_AGE} and {MAX_AGE}"),
                    );
                    None
                }
            }
        };

        match (self.gender, self.severity) {
            (Some(gender), Some(severity)) if errors.is_empty() => Ok(SymptomReport {
                symptoms: symptoms.to_string(),
                gender,
                severity,
                duration: duration.to_string(),
                age,
            }),
            _ => Err(errors),
        }
    }
}
