//! Structural Type Solver
//!
//! The type graph, relation checker and inference engine of tyrel. It uses:
//!
//! - **Interning**: `TypeData` keys hash-consed into dense `TypeId`s
//! - **Ena**: union-find variables for type argument inference
//! - **Cycle Detection**: coinductive semantics for recursive types
//!
//! Key properties:
//! - O(1) type identity via interning (`TypeId` comparison)
//! - Lazy member resolution with an explicit tri-state per symbol
//! - Failed relations are plain `false`; explanations are built on request
mod diagnostics;
mod env;
pub mod error;
mod evaluate;
mod infer;
mod infer_resolve;
mod instantiate;
mod intern;
mod lower;
pub mod node_builder;
mod query_trace;
pub mod recursion;
mod structure;
mod subtype;
mod subtype_explain;
mod subtype_rules;
pub mod type_classifier;
pub mod types;
mod variance;
pub mod walker;

pub use diagnostics::SubtypeFailureReason;
pub use env::{Program, RelationStats, TypeEnvironment};
pub use error::SolverError;
pub use evaluate::{evaluate_type, get_conditional_type, get_indexed_access_type, get_keyof_type, get_mapped_type};
pub use infer::{CallArgument, InferenceContext, InferenceInfo, InferenceVar, infer_type_arguments};
pub use instantiate::{
    TypeMapper, instantiate_signature, instantiate_signature_with_args, instantiate_type, instantiate_type_with_id,
};
pub use intern::{FreeParams, TypeInterner};
pub use node_builder::{TypeFormatFlags, signature_to_string, type_to_string, type_to_type_node};
pub use recursion::{DepthCounter, RecursionGuard, RecursionProfile, RecursionResult};
pub use subtype::{
    SubtypeChecker, SubtypeResult, is_type_assignable_to, is_type_comparable_to, is_type_identical_to,
    is_type_related_to, is_type_subtype_of,
};
pub use subtype_explain::{assignability_diagnostic, explain_relation};
pub use types::*;
pub use variance::get_variances;
pub use walker::{SymbolWalker, WalkResult, walk_symbol, walk_type};
