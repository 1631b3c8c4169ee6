//! Structural relation checking.
//!
//! `SubtypeChecker` decides whether a source type relates to a target type
//! under one of the four relation kinds. The walk is a depth-first
//! structural comparison with three layers of protection:
//!
//! - **Fast paths** for identical ids and the top and bottom types.
//! - **Relation cache** on the environment, keyed by
//!   `(source, target, relation)`. Only answers that do not depend on an
//!   unfinished assumption are stored.
//! - **Coinduction**: a pair that is re-entered while it is still being
//!   compared is assumed to hold. Anything proven under that assumption is
//!   kept on a pending list and committed once the outermost comparison
//!   succeeds, or discarded when the comparison that owns it fails.
//!
//! The individual rules live in `subtype_rules`.

use crate::env::TypeEnvironment;
use crate::evaluate::evaluate_type;
use crate::query_trace;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult, ensure_sufficient_stack};
use crate::types::*;
use tracing::{trace, warn};

/// Outcome of one comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubtypeResult {
    True,
    False,
    /// The pair is already being compared further up; assumed to hold.
    CycleDetected,
    /// The depth or iteration budget ran out; treated as unrelated.
    DepthExceeded,
}

impl SubtypeResult {
    #[inline]
    pub fn is_true(self) -> bool {
        matches!(self, SubtypeResult::True | SubtypeResult::CycleDetected)
    }

    #[inline]
    pub fn is_false(self) -> bool {
        !self.is_true()
    }

    #[inline]
    pub fn from_bool(value: bool) -> Self {
        if value {
            SubtypeResult::True
        } else {
            SubtypeResult::False
        }
    }
}

/// One relation query in progress.
pub struct SubtypeChecker<'a> {
    pub(crate) env: &'a TypeEnvironment,
    pub(crate) relation: RelationKind,
    pub(crate) strict_null_checks: bool,
    pub(crate) strict_function_types: bool,
    guard: RecursionGuard<(TypeId, TypeId)>,
    /// Positive answers waiting for the outermost comparison to finish.
    maybe_keys: Vec<(TypeId, TypeId)>,
    pub(crate) depth_exceeded: bool,
    /// Pairs whose failure is currently being explained.
    pub(crate) explaining: Vec<(TypeId, TypeId)>,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(env: &'a TypeEnvironment, relation: RelationKind) -> Self {
        let options = env.options();
        SubtypeChecker {
            env,
            relation,
            strict_null_checks: options.strict_null_checks,
            strict_function_types: options.strict_function_types,
            guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
            maybe_keys: Vec::new(),
            depth_exceeded: false,
            explaining: Vec::new(),
        }
    }

    /// Whether the budget ran out at any point during this checker's lifetime.
    pub fn hit_depth_limit(&self) -> bool {
        self.depth_exceeded
    }

    /// Compare `source` against `target` under this checker's relation.
    pub fn check_subtype(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        if let Some(result) = self.fast_path(source, target) {
            return result;
        }

        let relation = self.relation;
        let key = (source, target, relation);
        let cached = self.env.relation_cache.borrow().get(&key).copied();
        if let Some(cached) = cached {
            self.env.count_relation_cache_hit();
            return SubtypeResult::from_bool(cached);
        }

        let pair = (source, target);
        match self.guard.enter(pair) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(source = source.0, target = target.0, "relation cycle, assuming related");
                return SubtypeResult::CycleDetected;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                if !self.depth_exceeded {
                    self.env.count_depth_limit_hit();
                    warn!(
                        source = source.0,
                        target = target.0,
                        relation = relation.as_str(),
                        depth = self.guard.depth(),
                        "relation depth limit reached, treating as unrelated"
                    );
                }
                self.depth_exceeded = true;
                return SubtypeResult::DepthExceeded;
            }
        }

        let mark = self.maybe_keys.len();
        let result = ensure_sufficient_stack(|| self.check_subtype_inner(source, target));
        self.guard.leave(pair);

        if result.is_true() {
            self.maybe_keys.push(pair);
            if !self.guard.is_active() {
                let mut cache = self.env.relation_cache.borrow_mut();
                for (s, t) in self.maybe_keys.drain(..) {
                    cache.insert((s, t, relation), true);
                }
            }
        } else {
            self.maybe_keys.truncate(mark);
            if !self.depth_exceeded {
                self.env.relation_cache.borrow_mut().insert(key, false);
            }
        }
        result
    }

    /// Answers that need no structure.
    pub(crate) fn fast_path(&self, source: TypeId, target: TypeId) -> Option<SubtypeResult> {
        if source == target || source.is_error() || target.is_error() {
            return Some(SubtypeResult::True);
        }
        if self.relation == RelationKind::Identity {
            return None;
        }
        if target.is_any_or_unknown() || source.is_never() {
            return Some(SubtypeResult::True);
        }
        if source.is_any() {
            let related = self.relation != RelationKind::Subtype && !target.is_never();
            return Some(SubtypeResult::from_bool(related));
        }
        if target.is_never() {
            return Some(SubtypeResult::False);
        }
        if source.is_unknown() {
            return Some(SubtypeResult::from_bool(
                self.relation == RelationKind::Comparable,
            ));
        }
        if !self.strict_null_checks && source.is_nullish() {
            return Some(SubtypeResult::True);
        }
        None
    }

    fn check_subtype_inner(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        if self.relation == RelationKind::Identity {
            return self.check_identical(source, target);
        }

        let normalized_source = evaluate_type(self.env, source);
        let normalized_target = evaluate_type(self.env, target);
        if normalized_source != source || normalized_target != target {
            return self.check_subtype(normalized_source, normalized_target);
        }

        let interner = self.env.interner();
        if let Some(members) = interner.union_members(source) {
            return self.check_union_source(&members, target);
        }
        if let Some(members) = interner.union_members(target) {
            let result = self.check_union_target(source, &members);
            if result.is_true() || !self.relates_through_constraint(source) {
                return result;
            }
        }
        if let Some(members) = interner.intersection_members(target) {
            return self.check_intersection_target(source, &members);
        }
        if let Some(members) = interner.intersection_members(source) {
            if self.check_intersection_source(&members, target).is_true() {
                return SubtypeResult::True;
            }
            return self.check_structural(source, target);
        }

        let Some(source_data) = interner.lookup(source) else {
            return SubtypeResult::False;
        };
        match source_data {
            TypeData::TypeParameter(param) => return self.check_type_param_source(param, target),
            TypeData::Conditional(_) | TypeData::IndexAccess(..) | TypeData::KeyOf(_) | TypeData::Mapped(_) => {
                return self.check_deferred_source(source, source_data, target);
            }
            _ => {}
        }
        if matches!(
            interner.lookup(target),
            Some(
                TypeData::TypeParameter(_)
                    | TypeData::Conditional(_)
                    | TypeData::IndexAccess(..)
                    | TypeData::KeyOf(_)
                    | TypeData::Mapped(_)
            )
        ) {
            return SubtypeResult::False;
        }

        if let Some(result) = self.check_primitive_pair(source, target) {
            return result;
        }
        if let Some(result) = self.check_same_reference(source, target) {
            return result;
        }
        if let Some(result) = self.check_array_like(source, target) {
            return result;
        }
        self.check_structural(source, target)
    }

    /// Sources whose relation to a union may hold as a whole even when no
    /// single member of the union accepts them.
    fn relates_through_constraint(&self, source: TypeId) -> bool {
        matches!(
            self.env.interner().lookup(source),
            Some(
                TypeData::TypeParameter(_)
                    | TypeData::IndexAccess(..)
                    | TypeData::Conditional(_)
                    | TypeData::KeyOf(_)
                    | TypeData::Intersection(_)
            )
        )
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Whether `source` relates to `target` under `relation`.
pub fn is_type_related_to(env: &TypeEnvironment, source: TypeId, target: TypeId, relation: RelationKind) -> bool {
    env.count_relation_query();
    let tracing_queries = query_trace::enabled();
    let query_id = if tracing_queries {
        let id = query_trace::next_query_id();
        query_trace::relation_start(id, relation, source, target);
        Some(id)
    } else {
        None
    };
    let cache_hit = tracing_queries
        && env
            .relation_cache
            .borrow()
            .contains_key(&(source, target, relation));

    let mut checker = SubtypeChecker::new(env, relation);
    let result = checker.check_subtype(source, target).is_true();

    if let Some(id) = query_id {
        query_trace::relation_end(id, relation, result, cache_hit);
    }
    result
}

pub fn is_type_assignable_to(env: &TypeEnvironment, source: TypeId, target: TypeId) -> bool {
    is_type_related_to(env, source, target, RelationKind::Assignable)
}

pub fn is_type_subtype_of(env: &TypeEnvironment, source: TypeId, target: TypeId) -> bool {
    is_type_related_to(env, source, target, RelationKind::Subtype)
}

pub fn is_type_identical_to(env: &TypeEnvironment, source: TypeId, target: TypeId) -> bool {
    is_type_related_to(env, source, target, RelationKind::Identity)
}

/// Comparability holds when either direction is comparable.
pub fn is_type_comparable_to(env: &TypeEnvironment, source: TypeId, target: TypeId) -> bool {
    is_type_related_to(env, source, target, RelationKind::Comparable)
        || is_type_related_to(env, target, source, RelationKind::Comparable)
}

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod tests;
