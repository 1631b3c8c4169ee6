//! Explaining failed relations.
//!
//! The slow path behind relation diagnostics. After a query has failed, the
//! dispatch of `check_subtype` is walked again, this time stopping at the
//! first piece that does not hold and describing it as a
//! `SubtypeFailureReason`. Everything the walk asks is answered by the same
//! rules (and mostly by the relation cache), so an explanation never
//! disagrees with the boolean answer.

use crate::diagnostics::SubtypeFailureReason;
use crate::env::TypeEnvironment;
use crate::evaluate::{evaluate_type, is_numeric_name};
use crate::infer::instantiate_signature_in_context_of;
use crate::subtype::SubtypeChecker;
use crate::subtype_rules::arity_compatible;
use crate::types::*;
use crate::variance::get_variances;
use tyrel_common::diagnostics::Diagnostic;

/// Nested elaborations deeper than this collapse into a plain mismatch.
const MAX_EXPLAIN_DEPTH: usize = 16;

impl<'a> SubtypeChecker<'a> {
    /// Why `source` does not relate to `target`, or `None` when it does.
    pub fn explain_failure(&mut self, source: TypeId, target: TypeId) -> Option<SubtypeFailureReason> {
        if self.check_subtype(source, target).is_true() {
            return None;
        }
        if self.depth_exceeded {
            return Some(SubtypeFailureReason::RecursionLimitExceeded {
                source_type: source,
                target_type: target,
            });
        }
        Some(self.explain_mismatch(source, target))
    }

    fn explain_mismatch(&mut self, source: TypeId, target: TypeId) -> SubtypeFailureReason {
        let pair = (source, target);
        if self.explaining.len() >= MAX_EXPLAIN_DEPTH || self.explaining.contains(&pair) {
            return mismatch(source, target);
        }
        self.explaining.push(pair);
        let reason = self.explain_mismatch_inner(source, target);
        self.explaining.pop();
        reason
    }

    fn explain_mismatch_inner(&mut self, source: TypeId, target: TypeId) -> SubtypeFailureReason {
        if self.relation == RelationKind::Identity {
            return mismatch(source, target);
        }
        let normalized_source = evaluate_type(self.env, source);
        let normalized_target = evaluate_type(self.env, target);
        if normalized_source != source || normalized_target != target {
            return self.explain_mismatch(normalized_source, normalized_target);
        }

        let interner = self.env.interner();
        if let Some(members) = interner.union_members(source) {
            if self.relation != RelationKind::Comparable {
                for &member in members.iter() {
                    if self.check_subtype(member, target).is_false() {
                        return self.explain_mismatch(member, target);
                    }
                }
            }
            return mismatch(source, target);
        }
        if interner.union_members(target).is_some() {
            return SubtypeFailureReason::NoUnionMemberMatches {
                source_type: source,
                target_type: target,
            };
        }
        if let Some(members) = interner.intersection_members(target) {
            for &member in members.iter() {
                if self.check_subtype(source, member).is_false() {
                    return self.explain_mismatch(source, member);
                }
            }
            return mismatch(source, target);
        }
        if interner.intersection_members(source).is_some() {
            return self.explain_structural(source, target);
        }

        let deferred = |t: TypeId| {
            matches!(
                interner.lookup(t),
                Some(
                    TypeData::TypeParameter(_)
                        | TypeData::Conditional(_)
                        | TypeData::IndexAccess(..)
                        | TypeData::KeyOf(_)
                        | TypeData::Mapped(_)
                )
            )
        };
        if deferred(source) || deferred(target) || self.check_primitive_pair(source, target).is_some() {
            return mismatch(source, target);
        }
        if let Some(reason) = self.explain_type_arguments(source, target) {
            return reason;
        }
        if let Some(reason) = self.explain_array_like(source, target) {
            return reason;
        }
        self.explain_structural(source, target)
    }

    fn explain_type_arguments(&mut self, source: TypeId, target: TypeId) -> Option<SubtypeFailureReason> {
        let source_app = self.env.is_structured_reference(source)?;
        let target_app = self.env.is_structured_reference(target)?;
        if source_app.target != target_app.target
            || source_app.args.len() != target_app.args.len()
            || source_app.args.is_empty()
        {
            return None;
        }
        let variances = get_variances(self.env, source_app.target, self.relation);
        for (index, (&s, &t)) in source_app.args.iter().zip(&target_app.args).enumerate() {
            let variance = variances.get(index).copied().unwrap_or(Variance::COVARIANT);
            if !self.type_argument_related(s, t, variance) {
                return Some(SubtypeFailureReason::TypeArgumentMismatch {
                    index,
                    source_arg: s,
                    target_arg: t,
                });
            }
        }
        None
    }

    fn explain_array_like(&mut self, source: TypeId, target: TypeId) -> Option<SubtypeFailureReason> {
        let interner = self.env.interner();
        let reason = match (interner.lookup(source)?, interner.lookup(target)?) {
            (TypeData::Array(s), TypeData::Array(t)) => self.explain_mismatch(s, t),
            (TypeData::Tuple(s), TypeData::Tuple(t)) => {
                let source_elements = interner.tuple_list(s);
                let target_elements = interner.tuple_list(t);
                if self.tuple_arity_compatible(&source_elements, &target_elements) {
                    mismatch(source, target)
                } else {
                    SubtypeFailureReason::TupleArityMismatch {
                        source_count: source_elements.len(),
                        target_count: target_elements.len(),
                    }
                }
            }
            (_, TypeData::Array(_) | TypeData::Tuple(_)) => mismatch(source, target),
            _ => return None,
        };
        Some(reason)
    }

    fn explain_structural(&mut self, source: TypeId, target: TypeId) -> SubtypeFailureReason {
        let (Some(source_shape), Some(target_shape)) = (self.env.resolve_shape(source), self.env.resolve_shape(target)) else {
            return mismatch(source, target);
        };

        for target_prop in &target_shape.properties {
            let Some(source_prop) = source_shape.find_property(target_prop.name) else {
                if target_prop.optional {
                    continue;
                }
                return SubtypeFailureReason::MissingProperty {
                    property_name: target_prop.name,
                    source_type: source,
                    target_type: target,
                };
            };
            if source_prop.optional && !target_prop.optional && self.relation != RelationKind::Comparable {
                return SubtypeFailureReason::OptionalPropertyRequired {
                    property_name: target_prop.name,
                    source_type: source,
                    target_type: target,
                };
            }
            if self.check_property_types(source_prop, target_prop).is_false() {
                let source_type = self.read_type(source_prop);
                let target_type = self.read_type(target_prop);
                let nested = self.explain_mismatch(source_type, target_type);
                return SubtypeFailureReason::PropertyTypeMismatch {
                    property_name: target_prop.name,
                    source_property_type: source_type,
                    target_property_type: target_type,
                    nested_reason: Some(Box::new(nested)),
                };
            }
        }

        for (target_index, key_type) in [
            (target_shape.string_index, TypeId::STRING),
            (target_shape.number_index, TypeId::NUMBER),
        ] {
            let Some(target_index) = target_index else {
                continue;
            };
            if let Some(reason) = self.explain_index(source, &source_shape, key_type, target_index.value_type) {
                return reason;
            }
        }

        for (source_sigs, target_sigs) in [
            (&source_shape.call_signatures, &target_shape.call_signatures),
            (&source_shape.construct_signatures, &target_shape.construct_signatures),
        ] {
            if let Some(reason) = self.explain_signature_lists(source, source_sigs, target_sigs) {
                return reason;
            }
        }
        mismatch(source, target)
    }

    fn explain_index(
        &mut self,
        source: TypeId,
        source_shape: &ObjectShape,
        key_type: TypeId,
        target_value: TypeId,
    ) -> Option<SubtypeFailureReason> {
        let declared = if key_type == TypeId::NUMBER {
            source_shape.number_index.or(source_shape.string_index)
        } else {
            source_shape.string_index
        };
        let missing = |source_value: Option<TypeId>| SubtypeFailureReason::IndexSignatureMismatch {
            key_type,
            source_type: source,
            source_value,
            target_value,
        };
        match declared {
            Some(index) => {
                if self.check_subtype(index.value_type, target_value).is_false() {
                    return Some(missing(Some(index.value_type)));
                }
            }
            None if !self.has_implicit_index(source_shape) => return Some(missing(None)),
            None => {}
        }
        let interner = self.env.interner();
        for prop in &source_shape.properties {
            if key_type == TypeId::NUMBER && !is_numeric_name(&interner.resolve_atom(prop.name)) {
                continue;
            }
            let value = self.read_type(prop);
            if self.check_subtype(value, target_value).is_false() {
                return Some(SubtypeFailureReason::PropertyTypeMismatch {
                    property_name: prop.name,
                    source_property_type: value,
                    target_property_type: target_value,
                    nested_reason: None,
                });
            }
        }
        None
    }

    fn explain_signature_lists(
        &mut self,
        source: TypeId,
        source_sigs: &[SignatureId],
        target_sigs: &[SignatureId],
    ) -> Option<SubtypeFailureReason> {
        for &target_sig in target_sigs {
            let matched = source_sigs
                .iter()
                .any(|&source_sig| self.check_signature(source_sig, target_sig, false).is_true());
            if matched {
                continue;
            }
            return Some(match source_sigs {
                [only] => self.explain_signature(source, *only, target_sig),
                _ => SubtypeFailureReason::MissingSignature {
                    source_type: source,
                    target_signature: target_sig,
                },
            });
        }
        None
    }

    fn explain_signature(&mut self, source_type: TypeId, source_id: SignatureId, target_id: SignatureId) -> SubtypeFailureReason {
        let missing = SubtypeFailureReason::MissingSignature {
            source_type,
            target_signature: target_id,
        };
        let interner = self.env.interner();
        let source_id = match interner.signature(source_id) {
            Some(sig) if !sig.type_params.is_empty() => instantiate_signature_in_context_of(self.env, source_id, target_id),
            _ => source_id,
        };
        let (Some(source), Some(target)) = (interner.signature(source_id), interner.signature(target_id)) else {
            return missing;
        };
        if !arity_compatible(&source, &target) {
            return SubtypeFailureReason::TooManyParameters {
                source_count: source.min_argument_count,
                target_count: target.params.len(),
            };
        }
        let count = source.params.len().min(target.params.len());
        for param_index in 0..count {
            let (Some(source_param), Some(target_param)) =
                (self.param_type_at(&source, param_index), self.param_type_at(&target, param_index))
            else {
                continue;
            };
            if !self.check_parameter(source_param, target_param, false) {
                return SubtypeFailureReason::ParameterTypeMismatch {
                    param_index,
                    source_name: source.params[param_index].name,
                    target_name: target.params[param_index].name,
                    source_param,
                    target_param,
                };
            }
        }
        if target.return_type != TypeId::VOID && self.check_subtype(source.return_type, target.return_type).is_false() {
            let nested = self.explain_mismatch(source.return_type, target.return_type);
            return SubtypeFailureReason::ReturnTypeMismatch {
                source_return: source.return_type,
                target_return: target.return_type,
                nested_reason: Some(Box::new(nested)),
            };
        }
        missing
    }
}

fn mismatch(source: TypeId, target: TypeId) -> SubtypeFailureReason {
    SubtypeFailureReason::TypeMismatch {
        source_type: source,
        target_type: target,
    }
}

/// Why `source` does not relate to `target` under `relation`, or `None`
/// when it does.
pub fn explain_relation(
    env: &TypeEnvironment,
    source: TypeId,
    target: TypeId,
    relation: RelationKind,
) -> Option<SubtypeFailureReason> {
    SubtypeChecker::new(env, relation).explain_failure(source, target)
}

/// The assignability diagnostic for `source` and `target` at `node`, or
/// `None` when `source` is assignable.
pub fn assignability_diagnostic(env: &TypeEnvironment, node: u32, source: TypeId, target: TypeId) -> Option<Diagnostic> {
    explain_relation(env, source, target, RelationKind::Assignable)
        .map(|reason| reason.to_diagnostic(env, node, source, target))
}

#[cfg(test)]
#[path = "../tests/subtype_explain_tests.rs"]
mod tests;
