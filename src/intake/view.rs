//! Terminal rendering of the three intake views
use colored::*;
use std::fmt;

use crate::formatter::{FormattedSection, Fragment, SectionCategory};
use crate::models::{Gender, Severity};

use super::app::{IntakeState, View};
use super::form::{Field, MAX_SYMPTOM_CHARS};

pub const DISCLAIMER: &str = "This tool is for educational purposes only and does not constitute medical advice. Always consult a healthcare professional for medical concerns.";

pub fn render(state: &IntakeState) -> String {
    match state.view {
        View::Landing => render_landing(),
        View::Form => render_form(state),
        View::Result => render_result(state),
    }
}

pub fn render_landing() -> String {
    Landing.to_string()
}

pub fn render_form(state: &IntakeState) -> String {
    FormView(state).to_string()
}

pub fn render_result(state: &IntakeState) -> String {
    ResultView(state).to_string()
}

pub fn render_sections(sections: &[FormattedSection]) -> String {
    Sections(sections).to_string()
}

struct Landing;

impl fmt::Display for Landing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Healthcare Symptom Checker".bold().cyan())?;
        writeln!(f, "{}", "AI-powered health insights at your fingertips".italic())?;
        writeln!(f)?;
        writeln!(f, "{} {}", "⚠️".yellow(), "Important Medical Disclaimer".bold())?;
        writeln!(f, "{DISCLAIMER}")
    }
}

fn render_options<T: fmt::Display + PartialEq + Copy>(all: &[T], selected: Option<T>) -> String {
    all.iter()
        .map(|opt| {
            if Some(*opt) == selected {
                format!("[{opt}]").green().bold().to_string()
            } else {
                opt.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

struct FormView<'a>(&'a IntakeState);

impl fmt::Display for FormView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        let form = &state.form;
        writeln!(
            f,
            "{}  {}",
            "Symptom Assessment".bold().cyan(),
            format!("{}%", form.completion_percentage()).bold()
        )?;
        writeln!(f)?;

        for (i, field) in Field::ALL.iter().enumerate() {
            let marker = if field.is_required() { " *" } else { "" };
            let value = match field {
                Field::Gender => render_options(&Gender::ALL, form.gender),
                Field::Severity => {
                    let options = render_options(&Severity::ALL, form.severity);
                    match form.severity {
                        Some(s) => format!("{options}  ({})", s.description()),
                        None => options,
                    }
                }
                Field::Symptoms => format!(
                    "{}  {}",
                    form.symptoms,
                    format!("{}/{MAX_SYMPTOM_CHARS} characters", form.symptoms.chars().count())
                        .dimmed()
                ),
                _ => form.display_value(*field),
            };
            writeln!(f, "{}. {}{}: {}", i + 1, field.label().bold(), marker, value)?;
            if let Some(err) = state.field_errors.get(field) {
                writeln!(f, "   {} {}", "⚠️".yellow(), err.red())?;
            } else if !form.is_filled(*field) {
                writeln!(f, "   {}", field.hint().dimmed())?;
            }
        }

        writeln!(f)?;
        if state.loading {
            writeln!(f, "{}", "Analyzing your symptoms...".bold())?;
        } else if !form.is_complete() {
            writeln!(f, "{}", "Complete all fields to enable analysis".dimmed())?;
        }

        if let Some(err) = &state.error {
            writeln!(f, "{} {}", "Something went wrong:".red().bold(), err)?;
        }
        Ok(())
    }
}

struct ResultView<'a>(&'a IntakeState);

impl fmt::Display for ResultView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "Analysis Results".bold().cyan())?;
        writeln!(f)?;
        write!(f, "{}", Sections(&self.0.sections()))?;
        writeln!(f, "{} {}", "Important:".yellow().bold(), DISCLAIMER)
    }
}

fn section_icon(category: SectionCategory) -> &'static str {
    match category {
        SectionCategory::Disclaimer => "⚠️ ",
        SectionCategory::Summary => "📋 ",
        SectionCategory::Conditions => "🏥 ",
        SectionCategory::Steps => "📝 ",
        SectionCategory::General => "",
    }
}

struct Sections<'a>(&'a [FormattedSection]);

impl fmt::Display for Sections<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in self.0 {
            let heading = format!("{}{}", section_icon(section.category), section.title);
            let heading = match section.category {
                SectionCategory::Disclaimer => heading.yellow().bold(),
                _ => heading.bold(),
            };
            writeln!(f, "{heading}")?;

            for fragment in &section.content {
                match fragment {
                    Fragment::Paragraph { text } => writeln!(f, "{text}")?,
                    Fragment::Bullet { text } => writeln!(f, "• {text}")?,
                    Fragment::Condition { name, description } => {
                        writeln!(f, "{}", name.bold())?;
                        if let Some(description) = description {
                            writeln!(f, "  {description}")?;
                        }
                    }
                    Fragment::Step { number, text } => writeln!(f, "{number}. {text}")?,
                    Fragment::SubStep { text } => writeln!(f, "    • {text}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
