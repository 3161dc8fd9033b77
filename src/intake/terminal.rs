//! Line-oriented driver for the intake state machine.
//!
//! Reads commands from any async line source, feeds them to
//! [`IntakeState::update`] and performs the resulting effects. Generic over
//! input and output so it can be scripted in tests.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use super::app::{Action, Effect, IntakeState, View};
use super::client::RelayClient;
use super::form::Field;
use super::view::render;

const LANDING_HELP: &str = "Press Enter to start analysis, q to quit";
const FORM_HELP: &str = "1-5 edit field, w walk through all fields, s submit, d dismiss error, b back, q quit";
const RESULT_HELP: &str = "b back to form, n new assessment, q quit";

enum Command {
    Act(Action),
    EditField(Field),
    Walk,
    Quit,
    Unknown(String),
}

fn parse_command(view: View, line: &str) -> Command {
    let input = line.trim().to_lowercase();
    if matches!(input.as_str(), "q" | "quit" | "exit") {
        return Command::Quit;
    }
    match view {
        View::Landing => match input.as_str() {
            "" | "start" | "s" => Command::Act(Action::Start),
            _ => Command::Unknown(input),
        },
        View::Form => match input.as_str() {
            "s" | "submit" => Command::Act(Action::Submit),
            "d" | "dismiss" => Command::Act(Action::DismissError),
            "b" | "back" => Command::Act(Action::Back),
            "w" | "walk" | "" => Command::Walk,
            other => match other.parse::<usize>().ok().and_then(Field::from_index) {
                Some(field) => Command::EditField(field),
                None => Command::Unknown(input),
            },
        },
        View::Result => match input.as_str() {
            "b" | "back" => Command::Act(Action::Back),
            "n" | "new" => Command::Act(Action::Reset),
            _ => Command::Unknown(input),
        },
    }
}

fn help(view: View) -> &'static str {
    match view {
        View::Landing => LANDING_HELP,
        View::Form => FORM_HELP,
        View::Result => RESULT_HELP,
    }
}

async fn prompt_value<R, W>(lines: &mut Lines<R>, out: &mut W, field: Field) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let required = if field.is_required() { " *" } else { "" };
    write!(out, "{}{} ({}): ", field.label(), required, field.hint())?;
    out.flush()?;
    Ok(lines.next_line().await?)
}

/// Run the intake until the user quits or input ends. Returns the final state.
pub async fn run<R, W>(client: &RelayClient, input: R, out: &mut W) -> Result<IntakeState>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut state = IntakeState::new();
    let mut lines = input.lines();

    loop {
        writeln!(out, "{}", render(&state))?;
        writeln!(out, "{}", help(state.view))?;
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let action = match parse_command(state.view, &line) {
            Command::Quit => break,
            Command::Act(action) => action,
            Command::EditField(field) => match prompt_value(&mut lines, out, field).await? {
                Some(value) => Action::Edit(field, value),
                None => break,
            },
            Command::Walk => {
                let mut ended = false;
                for field in Field::ALL {
                    match prompt_value(&mut lines, out, field).await? {
                        Some(value) => {
                            state.update(Action::Edit(field, value));
                        }
                        None => {
                            ended = true;
                            break;
                        }
                    }
                }
                if ended {
                    break;
                }
                continue;
            }
            Command::Unknown(input) => {
                writeln!(out, "Unknown command '{input}'")?;
                continue;
            }
        };

        if action == Action::Submit && !state.can_submit() {
            writeln!(out, "Complete all fields to enable analysis")?;
            continue;
        }

        if let Effect::Send(report) = state.update(action) {
            writeln!(out, "{}", render(&state))?;
            let outcome = match client.check_symptoms(&report).await {
                Ok(result) => Action::Succeeded(result),
                Err(e) => Action::Failed(e.to_string()),
            };
            state.update(outcome);
        }
    }

    tracing::debug!(view = ?state.view, "Intake session ended");
    Ok(state)
}
