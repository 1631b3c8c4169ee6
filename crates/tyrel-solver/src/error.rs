//! Internal invariant violations.
//!
//! A relation that does not hold is a `false`, never an error. `SolverError`
//! is reserved for states the engine should never reach, such as a
//! declaration handle that points nowhere. Violations are recorded on the
//! environment and surfaced by the checker for the declaration being checked.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("declaration node {0} does not exist")]
    MissingDeclaration(u32),

    #[error("symbol '{0}' has no declarations")]
    SymbolWithoutDeclarations(String),

    #[error("constraint of type parameter '{0}' was set twice")]
    ConstraintAlreadySet(String),

    #[error("type {0} has no interned data")]
    UnknownType(u32),

    #[error("expected '{name}' to be a {expected} declaration")]
    UnexpectedDeclarationKind { name: String, expected: &'static str },
}
