//! Relation rules, one file per family of types.
//!
//! Each file adds methods to `SubtypeChecker`; the dispatch order lives in
//! `subtype.rs`.

mod functions;
mod generics;
mod identity;
mod intrinsics;
mod objects;
mod tuples;
mod unions;

pub(crate) use functions::{arity_compatible, param_type_at};
pub(crate) use tuples::rest_element_type;
