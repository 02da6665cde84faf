//! Orchestrated pass create, transition and claim flows.

pub mod outcome;
pub mod request;
pub mod service;

pub use outcome::PassOutcome;
pub use request::{CreatePassRequest, TransitionRequest};
pub use service::{PassService, PassServiceDeps};
