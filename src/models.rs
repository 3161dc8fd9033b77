use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SymptomCheckerError;

pub const MIN_AGE: u8 = 1;
pub const MAX_AGE: u8 = 120;

/// Flexible age deserializer: browsers post the age input as a string, other
/// clients send a number. Empty strings and null count as "not provided".
fn deserialize_flexible_age<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleAge {
        Int(i64),
        Float(f64),
        String(String),
    }

    let value = Option::<FlexibleAge>::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(FlexibleAge::Int(i)) => Some(i.to_string()),
        Some(FlexibleAge::Float(f)) if f.fract() == 0.0 => Some((f as i64).to_string()),
        Some(FlexibleAge::Float(f)) => Some(f.to_string()),
        Some(FlexibleAge::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for Gender {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" | "o" => Ok(Gender::Other),
            other => Err(format!(
                "unknown gender '{other}' (expected male, female or other)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];

    pub fn description(&self) -> &'static str {
        match self {
            Severity::Mild => "Manageable discomfort",
            Severity::Moderate => "Noticeable impact on daily activities",
            Severity::Severe => "Significant distress or impairment",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        };
        f.write_str(s)
    }
}

impl FromStr for Severity {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            other => Err(format!(
                "unknown severity '{other}' (expected mild, moderate or severe)"
            )),
        }
    }
}

/// A validated symptom report, ready to be turned into a prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomReport {
    pub symptoms: String,
    pub gender: Gender,
    pub severity: Severity,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
}

/// Raw body of `POST /api/check-symptoms`. Every field is optional at this
/// layer so that a missing field turns into a 400 rather than a JSON rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckSymptomsRequest {
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_age")]
    pub age: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn parse_age(raw: &str) -> Result<u8, String> {
    let age: i64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a whole number"))?;
    if !(i64::from(MIN_AGE)..=i64::from(MAX_AGE)).contains(&age) {
        return Err(format!("{age} is outside {MIN_AGE}..={MAX_AGE}"));
    }
    Ok(age as u8)
}

impl TryFrom<CheckSymptomsRequest> for SymptomReport {
    type Error = SymptomCheckerError;

    fn try_from(req: CheckSymptomsRequest) -> Result<Self, Self::Error> {
        let missing: Vec<&'static str> = [
            ("symptoms", present(&req.symptoms)),
            ("gender", present(&req.gender)),
            ("severity", present(&req.severity)),
            ("duration", present(&req.duration)),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.is_none().then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(SymptomCheckerError::MissingFields { fields: missing });
        }

        let field = |value: &Option<String>| present(value).unwrap_or_default().to_string();

        let gender = field(&req.gender)
            .parse::<Gender>()
            .map_err(|reason| SymptomCheckerError::InvalidField {
                field: "gender",
                reason,
            })?;
        let severity = field(&req.severity)
            .parse::<Severity>()
            .map_err(|reason| SymptomCheckerError::InvalidField {
                field: "severity",
                reason,
            })?;
        let age = match present(&req.age) {
            Some(raw) => Some(
                parse_age(raw)
                    .map_err(|reason| SymptomCheckerError::InvalidField { field: "age", reason })?,
            ),
            None => None,
        };

        Ok(SymptomReport {
            symptoms: field(&req.symptoms),
            gender,
            severity,
            duration: field(&req.duration),
            age,
        })
    }
}

/// Success body of `POST /api/check-symptoms`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckSymptomsResponse {
    pub result: String,
}

/// Error body shared by both relay endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// Gemini generateContent request format
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: String, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config,
        }
    }

    /// Text of the first part of the first content block
    pub fn prompt(&self) -> Option<&str> {
        self.contents
            .first()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Sampling parameters sent with every analysis request. Not configurable.
    pub const FIXED: Self = Self {
        temperature: 0.7,
        top_k: 40,
        top_p: 0.95,
        max_output_tokens: 2048,
    };
}

// Gemini generateContent response format
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    pub fn from_text(text: &str) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts: vec![Part {
                        text: Some(text.to_string()),
                    }],
                }),
            }],
        }
    }

    /// First candidate's first text part, if it is non-empty
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .filter(|t| !t.is_empty())
    }
}
