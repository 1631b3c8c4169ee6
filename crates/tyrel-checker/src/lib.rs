//! Declaration checker and query surface.
//!
//! This crate sits on top of the solver:
//! - `state` - `Checker`, which owns one program's `TypeEnvironment` and
//!   answers type queries for hosts (editors, emitters, code fixes)
//! - `declarations` - the declaration pass driven by `Checker::check_program`
//! - `heritage` - `extends`/`implements` compatibility and circular bases
//! - `type_arguments` - type arguments checked against their constraints
//! - `cancellation` - cooperative cancellation between top-level declarations
//! - `tracing_config` - opt-in tracing subscriber for debugging

pub mod cancellation;
mod declarations;
pub mod error;
mod heritage;
pub mod state;
pub mod tracing_config;
mod type_arguments;

pub use cancellation::CancellationToken;
pub use declarations::CheckReport;
pub use error::CheckerError;
pub use state::Checker;
