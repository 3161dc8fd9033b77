//! Intake state machine.
//!
//! All UI state lives in [`IntakeState`] and only changes through
//! [`IntakeState::update`]. Update never performs I/O: when a submission
//! passes validation it hands back [`Effect::Send`] and the driver reports the
//! outcome as [`Action::Succeeded`] or [`Action::Failed`].

use crate::formatter::{FormattedSection, format_result};
use crate::models::SymptomReport;

use super::form::{Field, FieldErrors, IntakeForm};

/// Current screen/view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Landing,
    Form,
    Result,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Start,
    Back,
    Edit(Field, String),
    Submit,
    Succeeded(String),
    Failed(String),
    DismissError,
    /// Clear the form and start a new assessment
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Send(SymptomReport),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntakeState {
    pub view: View,
    pub form: IntakeForm,
    pub field_errors: FieldErrors,
    /// A request is in flight
    pub loading: bool,
    /// Dismissable banner for request failures
    pub error: Option<String>,
    pub result: Option<String>,
}

impl IntakeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submission is disabled while incomplete or while a request is in flight
    pub fn can_submit(&self) -> bool {
        self.view == View::Form && !self.loading && self.form.is_complete()
    }

    pub fn sections(&self) -> Vec<FormattedSection> {
        format_result(self.result.as_deref())
    }

    pub fn update(&mut self, action: Action) -> Effect {
        match action {
            Action::Start => {
                if self.view == View::Landing {
                    self.view = View::Form;
                }
            }
            Action::Back => {
                self.view = match self.view {
                    View::Landing | View::Form => View::Landing,
                    View::Result => View::Form,
                };
            }
            Action::Edit(field, value) => {
                if self.view != View::Form || self.loading {
                    return Effect::None;
                }
                self.field_errors.remove(&field);
                if let Err(reason) = self.form.set(field, &value) {
                    self.field_errors.insert(field, reason);
                }
            }
            Action::Submit => {
                if !self.can_submit() {
                    return Effect::None;
                }
                match self.form.validate() {
                    Ok(report) => {
                        self.field_errors.clear();
                        self.error = None;
                        self.loading = true;
                        return Effect::Send(report);
                    }
                    Err(errors) => self.field_errors = errors,
                }
            }
            Action::Succeeded(result) => {
                if self.loading {
                    self.loading = false;
                    self.result = Some(result);
                    self.view = View::Result;
                }
            }
            Action::Failed(message) => {
                if self.loading {
                    self.loading = false;
                    self.error = Some(message);
                }
            }
            Action::DismissError => self.error = None,
            Action::Reset => {
                *self = Self {
                    view: View::Form,
                    ..Self::default()
                };
            }
        }
        Effect::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::SectionCategory;

    fn filled_state() -> IntakeState {
        let mut state = IntakeState::new();
        state.update(Action::Start);
        for (field, value) in [
            (Field::Symptoms, "persistent cough for 3 days with mild headache"),
            (Field::Gender, "male"),
            (Field::Severity, "mild"),
            (Field::Duration, "3 days"),
            (Field::Age, "29"),
        ] {
            state.update(Action::Edit(field, value.to_string()));
        }
        state
    }

    #[test]
    fn test_navigation() {
        let mut state = IntakeState::new();
        assert_eq!(state.view, View::Landing);
        state.update(Action::Start);
        assert_eq!(state.view, View::Form);
        state.update(Action::Back);
        assert_eq!(state.view, View::Landing);
    }

    #[test]
    fn test_submit_disabled_until_complete() {
        let mut state = IntakeState::new();
        state.update(Action::Start);
        state.update(Action::Edit(Field::Symptoms, "headache all day".to_string()));
        assert!(!state.can_submit());
        assert_eq!(state.update(Action::Submit), Effect::None);
        assert!(state.field_errors.is_empty());
        assert!(!state.loading);
    }

    #[test]
    fn test_validation_failure_blocks_send() {
        let mut state = filled_state();
        state.update(Action::Edit(Field::Symptoms, "cough".to_string()));
        assert!(state.can_submit());
        assert_eq!(state.update(Action::Submit), Effect::None);
        assert!(state.field_errors.contains_key(&Field::Symptoms));
        assert!(!state.loading);

        // Editing the field clears its error
        state.update(Action::Edit(Field::Symptoms, "cough and sore throat".to_string()));
        assert!(state.field_errors.is_empty());
    }

    #[test]
    fn test_submit_round_trip_to_result_view() {
        let mut state = filled_state();
        let report = match state.update(Action::Submit) {
            Effect::Send(report) => report,
            Effect::None => panic!("complete form should send"),
        };
        assert_eq!(report.age, Some(29));
        assert!(state.loading);
        assert!(!state.can_submit());
        // Second submit while in flight is ignored
        assert_eq!(state.update(Action::Submit), Effect::None);

        state.update(Action::Succeeded(
            "### Summary\n* feeling tired\n### Disclaimer\nEducational only".to_string(),
        ));
        assert!(!state.loading);
        assert_eq!(state.view, View::Result);
        let sections = state.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category, SectionCategory::Summary);

        // Back keeps the form values
        state.update(Action::Back);
        assert_eq!(state.view, View::Form);
        assert_eq!(state.form.duration, "3 days");
    }

    #[test]
    fn test_failure_shows_dismissable_banner() {
        let mut state = filled_state();
        state.update(Action::Submit);
        state.update(Action::Failed("Request timeout.".to_string()));
        assert_eq!(state.view, View::Form);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Request timeout."));
        assert!(state.can_submit());

        state.update(Action::DismissError);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_stale_outcome_ignored() {
        let mut state = filled_state();
        state.update(Action::Succeeded("### Summary".to_string()));
        assert_eq!(state.view, View::Form);
        assert_eq!(state.result, None);
    }

    #[test]
    fn test_invalid_selection_recorded_as_field_error() {
        let mut state = filled_state();
        state.update(Action::Edit(Field::Severity, "terrible".to_string()));
        assert!(state.field_errors.contains_key(&Field::Severity));
        // Previous valid selection survives
        assert!(state.form.severity.is_some());
    }

    #[test]
    fn test_reset_starts_fresh_form() {
        let mut state = filled_state();
        state.update(Action::Submit);
        state.update(Action::Succeeded("### Summary".to_string()));
        state.update(Action::Reset);
        assert_eq!(state.view, View::Form);
        assert_eq!(state.form, IntakeForm::default());
        assert_eq!(state.result, None);
    }
}
