//! Signature compatibility.
//!
//! A source signature relates to a target signature when:
//!
//! - it does not require more arguments than the target provides,
//! - each parameter position relates (contravariantly under `Subtype` and
//!   strict function types, in either direction otherwise and for methods),
//! - its return type relates to the target's, unless the target returns `void`.
//!
//! A generic source is first instantiated by inference against the target.

use super::tuples::rest_element_type;
use crate::env::TypeEnvironment;
use crate::infer::instantiate_signature_in_context_of;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

impl<'a> SubtypeChecker<'a> {
    /// Every target signature must be matched by some source signature.
    pub(crate) fn check_signature_lists(
        &mut self,
        source: &[SignatureId],
        target: &[SignatureId],
        bivariant: bool,
    ) -> SubtypeResult {
        for &target_sig in target {
            let matched = source
                .iter()
                .any(|&source_sig| self.check_signature(source_sig, target_sig, bivariant).is_true());
            if !matched {
                return SubtypeResult::False;
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn check_signature(&mut self, source_id: SignatureId, target_id: SignatureId, bivariant: bool) -> SubtypeResult {
        if source_id == target_id {
            return SubtypeResult::True;
        }
        let interner = self.env.interner();
        let (Some(source), Some(target)) = (interner.signature(source_id), interner.signature(target_id)) else {
            return SubtypeResult::False;
        };
        if source.flags.contains(SignatureFlags::ABSTRACT) && !target.flags.contains(SignatureFlags::ABSTRACT) {
            return SubtypeResult::False;
        }
        let source = if source.type_params.is_empty() {
            source
        } else {
            let instantiated = instantiate_signature_in_context_of(self.env, source_id, target_id);
            match interner.signature(instantiated) {
                Some(sig) => sig,
                None => return SubtypeResult::False,
            }
        };

        if !arity_compatible(&source, &target) {
            return SubtypeResult::False;
        }

        let count = if source.has_rest() || target.has_rest() {
            source.params.len().max(target.params.len())
        } else {
            source.params.len().min(target.params.len())
        };
        for i in 0..count {
            let (Some(source_param), Some(target_param)) = (self.param_type_at(&source, i), self.param_type_at(&target, i)) else {
                continue;
            };
            if !self.check_parameter(source_param, target_param, bivariant) {
                return SubtypeResult::False;
            }
        }

        if let (Some(source_this), Some(target_this)) = (source.this_type, target.this_type) {
            let result = self.check_subtype(target_this, source_this);
            if result.is_false() {
                return result;
            }
        }

        if target.return_type == TypeId::VOID {
            return SubtypeResult::True;
        }
        self.check_subtype(source.return_type, target.return_type)
    }

    pub(crate) fn check_parameter(&mut self, source: TypeId, target: TypeId, bivariant: bool) -> bool {
        let strict = !bivariant && (self.strict_function_types || self.relation == RelationKind::Subtype);
        if self.check_subtype(target, source).is_true() {
            return true;
        }
        !strict && self.check_subtype(source, target).is_true()
    }

    pub(crate) fn param_type_at(&self, sig: &Signature, index: usize) -> Option<TypeId> {
        param_type_at(self.env, sig, index)
    }
}

/// The type accepted at argument position `index`, reading through a
/// trailing rest parameter.
pub(crate) fn param_type_at(env: &TypeEnvironment, sig: &Signature, index: usize) -> Option<TypeId> {
    let last = sig.params.len().checked_sub(1)?;
    if sig.has_rest() && index >= last {
        return Some(rest_element_type(env, sig.params[last].type_id));
    }
    sig.params.get(index).map(|p| p.type_id)
}

/// The source may not require more arguments than the target accepts.
pub(crate) fn arity_compatible(source: &Signature, target: &Signature) -> bool {
    let target_count = if target.has_rest() {
        usize::MAX
    } else {
        target.params.len()
    };
    source.min_argument_count <= target_count
}
