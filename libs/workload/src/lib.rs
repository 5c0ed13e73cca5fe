//! # booking-workload
//!
//! Work class descriptors for booking-limit allocation.
//!
//! ## Design Principles
//!
//! - A workload is supplied wholesale and never mutated after validation
//! - Every class shares the same prefill depth; classes differ only in how
//!   many decode stages they run and how often they arrive
//! - Class identifiers are typed and validated at the boundary
//!
//! ## File Format
//!
//! Workloads deserialize from a list of classes:
//!
//! ```toml
//! [[classes]]
//! type = "type1"
//! prefill = 10
//! decode = 10
//! arrival_rate = 30
//! ```

mod error;
mod types;
mod workload;

pub use error::WorkloadError;
pub use types::TypeId;
pub use workload::{WorkClass, Workload};
