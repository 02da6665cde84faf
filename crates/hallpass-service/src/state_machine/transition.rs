//! Transition legality.

use thiserror::Error;

use hallpass_core::error::AppError;
use hallpass_entity::location::LocationInfo;
use hallpass_entity::pass::{LegState, Pass, PassAction};

/// Why a transition was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The action name is not one the state machine knows.
    #[error("Unknown pass action: {0}")]
    UnknownAction(String),
    /// The action exists but the pass is not in a state that allows it.
    #[error("Cannot {action}: {reason}")]
    InvalidState {
        /// The refused action.
        action: PassAction,
        /// What is wrong with the pass state.
        reason: String,
    },
}

impl TransitionError {
    pub(crate) fn invalid(action: PassAction, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            action,
            reason: reason.into(),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::UnknownAction(_) => AppError::validation(err.to_string()),
            TransitionError::InvalidState { .. } => AppError::invalid_transition(err.to_string()),
        }
    }
}

/// Parse an action name, accepting only transitions on an existing pass.
pub fn parse_action(name: &str) -> Result<PassAction, TransitionError> {
    name.parse::<PassAction>()
        .ok()
        .filter(PassAction::is_transition)
        .ok_or_else(|| TransitionError::UnknownAction(name.to_string()))
}

/// Check whether `action` is legal for `pass`, whose current destination
/// is `destination`.
pub fn check(
    pass: &Pass,
    action: PassAction,
    destination: &LocationInfo,
) -> Result<(), TransitionError> {
    if !pass.is_open() {
        return Err(TransitionError::invalid(action, "pass is already closed"));
    }
    let Some(leg) = pass.current_leg() else {
        return Err(TransitionError::invalid(action, "pass has no legs"));
    };

    match action {
        PassAction::Arrive => {
            if !leg.is_out() {
                return Err(TransitionError::invalid(action, "arrival already confirmed"));
            }
            if destination.is_bathroom() {
                return Err(TransitionError::invalid(
                    action,
                    "restroom trips return without an arrival",
                ));
            }
        }
        PassAction::ReturnToClass => {
            if leg.state != LegState::In {
                return Err(TransitionError::invalid(
                    action,
                    "arrival at the destination has not been confirmed",
                ));
            }
        }
        PassAction::RestroomReturn => {
            if !leg.is_out() {
                return Err(TransitionError::invalid(
                    action,
                    "student is not out on a restroom trip",
                ));
            }
            if !destination.is_bathroom() {
                return Err(TransitionError::invalid(
                    action,
                    "current destination is not a restroom",
                ));
            }
        }
        PassAction::NewDestination | PassAction::ClosePass => {}
        PassAction::Create => {
            return Err(TransitionError::UnknownAction(action.to_string()));
        }
    }
    Ok(())
}
