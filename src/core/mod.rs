//! # Core Module
//!
//! Concurrency primitives shared by the rest of the runtime.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with copy-on-write
//!   mutation. Column storage is handed to background workers through it.
//!
//! ## Usage
//! ```rust
//! use voxel_runtime::core::MtResource;
//!
//! let mut counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;
