//! Splits the free-form analysis text into titled, categorized sections.
//!
//! Sections start at the `###` heading marker; anything before the first
//! marker is preamble and dropped. Classification is keyword based and lives
//! entirely in [`classify`] so the rules can change without touching the
//! line renderers. Formatting is pure: no state, no I/O, never fails.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Heading marker that opens a section
pub const SECTION_DELIMITER: &str = "###";

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.*)$").expect("numbered-line pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    Disclaimer,
    Summary,
    Conditions,
    Steps,
    General,
}

/// One renderable piece of a section body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    Paragraph {
        text: String,
    },
    Bullet {
        text: String,
    },
    Condition {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Step {
        number: u32,
        text: String,
    },
    SubStep {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedSection {
    pub title: String,
    pub category: SectionCategory,
    pub content: Vec<Fragment>,
}

/// Classify a section by its title. First matching rule wins, so a title
/// mentioning both "summary" and "disclaimer" is a disclaimer.
pub fn classify(title: &str) -> SectionCategory {
    let t = title.to_lowercase();
    if t.contains("disclaimer") {
        SectionCategory::Disclaimer
    } else if t.contains("summary") {
        SectionCategory::Summary
    } else if t.contains("possible conditions") {
        SectionCategory::Conditions
    } else if t.contains("next steps") || t.contains("recommended") {
        SectionCategory::Steps
    } else {
        SectionCategory::General
    }
}

/// Format raw analysis text. `None` and empty input yield no sections.
pub fn format_result(raw: Option<&str>) -> Vec<FormattedSection> {
    let Some(text) = raw else {
        return Vec::new();
    };

    text.split(SECTION_DELIMITER)
        .skip(1)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(format_section)
        .collect()
}

fn format_section(chunk: &str) -> FormattedSection {
    let chunk = chunk.trim();
    let (heading, body) = chunk.split_once('\n').unwrap_or((chunk, ""));

    let title = strip_bold(heading)
        .trim_start_matches('#')
        .trim()
        .to_string();
    let category = classify(&title);
    let body = body.trim();

    let content = match category {
        SectionCategory::Disclaimer | SectionCategory::General => paragraph_body(body),
        SectionCategory::Summary => summary_body(body),
        SectionCategory::Conditions => conditions_body(body),
        SectionCategory::Steps => steps_body(body),
    };

    FormattedSection {
        title,
        category,
        content,
    }
}

fn strip_bold(s: &str) -> String {
    s.replace("**", "")
}

fn strip_stars(s: &str) -> String {
    s.replace('*', "").trim().to_string()
}

fn non_blank_lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines().map(str::trim).filter(|line| !line.is_empty())
}

fn paragraph(line: &str) -> Fragment {
    Fragment::Paragraph {
        text: strip_bold(line).trim().to_string(),
    }
}

fn paragraph_body(body: &str) -> Vec<Fragment> {
    if body.is_empty() {
        return Vec::new();
    }
    vec![Fragment::Paragraph {
        text: strip_bold(body),
    }]
}

fn summary_body(body: &str) -> Vec<Fragment> {
    non_blank_lines(body)
        .map(|line| {
            if line.starts_with('*') {
                Fragment::Bullet {
                    text: strip_stars(line),
                }
            } else {
                paragraph(line)
            }
        })
        .collect()
}

fn conditions_body(body: &str) -> Vec<Fragment> {
    non_blank_lines(body)
        .map(|line| match NUMBERED_LINE.captures(line) {
            Some(caps) => {
                let rest = caps.get(2).map_or("", |m| m.as_str());
                let (name, description) = rest.split_once(':').unwrap_or((rest, ""));
                let description = strip_bold(description).trim().to_string();
                Fragment::Condition {
                    name: strip_bold(name).trim().to_string(),
                    description: (!description.is_empty()).then_some(description),
                }
            }
            None => paragraph(line),
        })
        .collect()
}

fn steps_body(body: &str) -> Vec<Fragment> {
    non_blank_lines(body)
        .map(|line| {
            if let Some(caps) = NUMBERED_LINE.captures(line) {
                // Absurdly long numerals saturate rather than fail
                let number = caps[1].parse().unwrap_or(u32::MAX);
                Fragment::Step {
                    number,
                    text: strip_bold(&caps[2]).trim().to_string(),
                }
            } else if line.starts_with('*') {
                Fragment::SubStep {
                    text: strip_stars(line),
                }
            } else {
                paragraph(line)
            }
        })
        .collect()
}
