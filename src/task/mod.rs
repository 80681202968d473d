//! Task lifecycle management for Tasklane.
//!
//! Tasks own an ordered collection of subtasks and both carry a lifecycle
//! state. The state machine in [`domain`] decides which transitions are
//! legal, including the parent/child consistency rules: a parent reaching a
//! terminal state propagates it to every live subtask, and a subtask
//! completing can auto-complete an in-progress parent. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
