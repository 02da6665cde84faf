//! # hallpass-service
//!
//! Pass lifecycle services. Each service orchestrates repositories, the
//! rate limiter, the policy engine and the audit monitor to implement one
//! use case.
//!
//! Services follow constructor injection: every dependency is handed in
//! at construction time as an `Arc`.

pub mod context;
pub mod creation;
pub mod pass;
pub mod policy;
pub mod state_machine;

pub use context::RequestContext;
pub use creation::CreationGuard;
pub use pass::{CreatePassRequest, PassOutcome, PassService, PassServiceDeps, TransitionRequest};
pub use policy::PolicyService;
pub use state_machine::{ActionState, PassStateMachine, TransitionError};
