//! # Voxel Task System
//!
//! Background jobs that produce column data. Each job runs through an
//! [`AsyncLoadService`](crate::engine_state::task_management::AsyncLoadService) and
//! publishes its result into the World from its completion, on the owning thread.

pub mod column_load_task;
