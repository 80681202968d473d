//! Tasklane: lifecycle tracking for automation tasks and their subtasks.
//!
//! This crate provides the core of a task-tracking service: validated task
//! and subtask entities, the finite state machine governing their lifecycle
//! transitions, and the orchestration services that apply validated updates
//! through a persistence port.
//!
//! # Architecture
//!
//! Tasklane follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! HTTP binding and process bootstrap live outside this crate; callers hand
//! the services validated inputs and serialize the entity snapshots they get
//! back.

pub mod task;
