/// Terminal intake front-end: form state, relay client and rendering
pub mod app;
pub mod client;
pub mod form;
pub mod terminal;
pub mod view;

pub use app::{Action, Effect, IntakeState, View};
pub use client::{RelayClient, RequestError};
pub use form::{Field, FieldErrors, IntakeForm};
