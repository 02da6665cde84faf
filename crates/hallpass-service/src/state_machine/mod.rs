//! The leg-based pass state machine.
//!
//! State is the pair (pass status, current leg state). Mutators append
//! legs or close the pass; nothing else touches a pass.

pub mod action_state;
pub mod machine;
pub mod transition;

pub use action_state::ActionState;
pub use machine::PassStateMachine;
pub use transition::TransitionError;
