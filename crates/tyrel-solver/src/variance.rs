//! Variance measurement for generic interfaces and classes.
//!
//! The variance of each type parameter is measured once per target by
//! relating two instantiations that differ only at that parameter:
//!
//! - `Target<Sub>` to `Target<Super>` holds: covariant;
//! - `Target<Super>` to `Target<Sub>` holds: contravariant;
//! - both hold, and so does `Target<Other>` to `Target<Super>`: the parameter
//!   does not affect the relation (independent);
//! - neither holds: invariant.
//!
//! `Sub` is a marker type parameter constrained to the `Super` marker and
//! `Other` is unrelated to both. While a target is being measured its
//! references are compared structurally, so a recursive target relies on
//! the coinductive cycle rule instead of its own unfinished variances.

use crate::env::TypeEnvironment;
use crate::subtype::is_type_related_to;
use crate::types::*;
use std::rc::Rc;
use tracing::debug;
use tyrel_binder::SymbolId;

/// The relation whose variances `relation` shares.
fn variance_relation(relation: RelationKind) -> RelationKind {
    match relation {
        RelationKind::Comparable => RelationKind::Assignable,
        other => other,
    }
}

/// Variances of the type parameters of `symbol`, in declaration order.
pub fn get_variances(env: &TypeEnvironment, symbol: SymbolId, relation: RelationKind) -> Rc<[Variance]> {
    let relation = variance_relation(relation);
    if let Some(cached) = env.variances.borrow().get(&(symbol, relation)) {
        return cached.clone();
    }
    let params = env.type_params_of(symbol);
    if params.is_empty() {
        return Rc::from(Vec::new());
    }
    if !env.variance_computing.borrow_mut().insert(symbol) {
        // Re-entered from a nested measurement; the caller compares structurally.
        return params.iter().map(|_| Variance::COVARIANT).collect();
    }

    let (sub, sup, other) = markers(env);
    let interner = env.interner();
    let own_args: Vec<TypeId> = params.iter().map(|&tp| interner.type_param_type(tp)).collect();
    let reference_with = |index: usize, marker: TypeId| {
        let mut args = own_args.clone();
        args[index] = marker;
        interner.application(symbol, args)
    };

    let mut variances = Vec::with_capacity(params.len());
    for index in 0..params.len() {
        let with_sub = reference_with(index, sub);
        let with_super = reference_with(index, sup);
        let mut variance = Variance::empty();
        if is_type_related_to(env, with_sub, with_super, relation) {
            variance |= Variance::COVARIANT;
        }
        if is_type_related_to(env, with_super, with_sub, relation) {
            variance |= Variance::CONTRAVARIANT;
        }
        if variance == Variance::BIVARIANT {
            let with_other = reference_with(index, other);
            if is_type_related_to(env, with_other, with_super, relation) {
                variance |= Variance::INDEPENDENT;
            }
        }
        variances.push(variance);
    }

    env.variance_computing.borrow_mut().remove(&symbol);
    debug!(
        symbol = %env.symbol_name(symbol),
        relation = relation.as_str(),
        variances = ?variances,
        "measured type parameter variances"
    );
    let variances: Rc<[Variance]> = Rc::from(variances);
    env.variances
        .borrow_mut()
        .insert((symbol, relation), variances.clone());
    variances
}

/// The `(sub, super, other)` marker types, created on first use.
fn markers(env: &TypeEnvironment) -> (TypeId, TypeId, TypeId) {
    if let Some(markers) = env.variance_markers.get() {
        return markers;
    }
    let interner = env.interner();
    let super_param = interner.fresh_type_param(interner.intern_string("__super"), SymbolId::NONE);
    let sub_param = interner.fresh_type_param(interner.intern_string("__sub"), SymbolId::NONE);
    let other_param = interner.fresh_type_param(interner.intern_string("__other"), SymbolId::NONE);
    let super_type = interner.type_param_type(super_param);
    for (param, constraint) in [(super_param, None), (sub_param, Some(super_type)), (other_param, None)] {
        if let Err(error) = interner.set_type_param_constraint(param, constraint, None) {
            env.record_violation(error);
        }
    }
    let markers = (
        interner.type_param_type(sub_param),
        super_type,
        interner.type_param_type(other_param),
    );
    env.variance_markers.set(Some(markers));
    markers
}

#[cfg(test)]
#[path = "../tests/variance_tests.rs"]
mod tests;
