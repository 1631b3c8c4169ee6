//! Centralized limits and thresholds.
//!
//! Shared constants for recursion depths and capacity limits used by the
//! binder, solver and checker. Keeping them in one place prevents duplicate
//! definitions with inconsistent values.
//!
//! # Solver recursion limits
//!
//! Limits for relation checking, evaluation and variance probing are
//! expressed as `tyrel_solver::recursion::RecursionProfile` presets, which
//! read the constants below. The profiles are the only place a guard is
//! constructed from.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum depth for generic type instantiation.
///
/// Instantiating a type whose expansion keeps growing (for example a
/// conditional alias that re-instantiates itself with a larger argument)
/// stops here. The instantiation degrades to the error type, which the
/// relation checker treats like `any`, and a counter is bumped.
pub const MAX_INSTANTIATION_DEPTH: u32 = 50;

/// Maximum nesting depth for structural relation checks.
///
/// A relation check that descends this many distinct (source, target)
/// pairs without hitting a cached or in-progress pair bails out with
/// "unrelated". Coinductive cycle detection normally ends recursion long
/// before this.
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Maximum number of pair visits per top-level relation query.
pub const MAX_RELATION_ITERATIONS: u32 = 100_000;

/// Maximum depth for type evaluation (conditional, indexed access, mapped, keyof).
pub const MAX_EVALUATION_DEPTH: u32 = 50;

/// Maximum depth for structural inference between a source and target shape.
pub const MAX_INFERENCE_DEPTH: u32 = 50;

/// Maximum depth when converting a type back into a type node.
///
/// Anonymous object types cannot form cycles (cycles always pass through a
/// named reference), so this only trips on very deep but finite nesting.
pub const MAX_TYPE_NODE_DEPTH: u32 = 100;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Inline capacity for short type lists (union members, type arguments).
pub const TYPE_LIST_INLINE: usize = 8;

/// Largest union a mapped type or distributive conditional may fan out over.
///
/// Beyond this the operation is deferred instead of enumerated.
pub const MAX_DISTRIBUTION_SIZE: usize = 10_000;
