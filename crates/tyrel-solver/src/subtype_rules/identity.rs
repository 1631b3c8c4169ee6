//! Structural identity.
//!
//! Two types are identical when they have the same kind and identical
//! parts: unions and intersections member-wise, arrays and tuples
//! element-wise, references to the same target argument-wise, and objects
//! with the same properties, modifiers, signatures and index signatures.

use crate::evaluate::evaluate_type;
use crate::instantiate::instantiate_signature_with_args;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_identical(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        let normalized_source = evaluate_type(self.env, source);
        let normalized_target = evaluate_type(self.env, target);
        if normalized_source != source || normalized_target != target {
            return self.check_subtype(normalized_source, normalized_target);
        }

        let interner = self.env.interner();
        let (Some(source_data), Some(target_data)) = (interner.lookup(source), interner.lookup(target)) else {
            return SubtypeResult::False;
        };
        match (source_data, target_data) {
            (TypeData::Union(s), TypeData::Union(t)) | (TypeData::Intersection(s), TypeData::Intersection(t)) => {
                let source_members = interner.type_list(s);
                let target_members = interner.type_list(t);
                SubtypeResult::from_bool(
                    source_members.len() == target_members.len()
                        && self.each_has_identical(&source_members, &target_members)
                        && self.each_has_identical(&target_members, &source_members),
                )
            }
            (TypeData::Array(s), TypeData::Array(t)) => self.check_subtype(s, t),
            (TypeData::Tuple(s), TypeData::Tuple(t)) => {
                let source_elements = interner.tuple_list(s);
                let target_elements = interner.tuple_list(t);
                if source_elements.len() != target_elements.len() {
                    return SubtypeResult::False;
                }
                for (s, t) in source_elements.iter().zip(target_elements.iter()) {
                    if s.optional != t.optional || s.rest != t.rest {
                        return SubtypeResult::False;
                    }
                    let result = self.check_subtype(s.type_id, t.type_id);
                    if result.is_false() {
                        return result;
                    }
                }
                SubtypeResult::True
            }
            (TypeData::Application(_), TypeData::Application(_)) => {
                match (self.env.is_structured_reference(source), self.env.is_structured_reference(target)) {
                    (Some(s), Some(t)) if s.target == t.target && s.args.len() == t.args.len() => {
                        for (&a, &b) in s.args.iter().zip(&t.args) {
                            let result = self.check_subtype(a, b);
                            if result.is_false() {
                                return result;
                            }
                        }
                        SubtypeResult::True
                    }
                    _ => self.check_identical_shapes(source, target),
                }
            }
            (TypeData::Object(_) | TypeData::Application(_), TypeData::Object(_) | TypeData::Application(_)) => {
                self.check_identical_shapes(source, target)
            }
            _ => SubtypeResult::False,
        }
    }

    fn each_has_identical(&mut self, members: &[TypeId], candidates: &[TypeId]) -> bool {
        members.iter().all(|&m| {
            candidates.contains(&m) || candidates.iter().any(|&c| self.check_subtype(m, c).is_true())
        })
    }

    fn check_identical_shapes(&mut self, source: TypeId, target: TypeId) -> SubtypeResult {
        let (Some(source_shape), Some(target_shape)) = (self.env.resolve_shape(source), self.env.resolve_shape(target)) else {
            return SubtypeResult::False;
        };
        if source_shape.properties.len() != target_shape.properties.len()
            || source_shape.call_signatures.len() != target_shape.call_signatures.len()
            || source_shape.construct_signatures.len() != target_shape.construct_signatures.len()
        {
            return SubtypeResult::False;
        }
        for target_prop in &target_shape.properties {
            let Some(source_prop) = source_shape.find_property(target_prop.name) else {
                return SubtypeResult::False;
            };
            if source_prop.optional != target_prop.optional || source_prop.readonly != target_prop.readonly {
                return SubtypeResult::False;
            }
            let result = self.check_subtype(source_prop.type_id, target_prop.type_id);
            if result.is_false() {
                return result;
            }
        }
        for (source_index, target_index) in [
            (source_shape.string_index, target_shape.string_index),
            (source_shape.number_index, target_shape.number_index),
        ] {
            match (source_index, target_index) {
                (None, None) => {}
                (Some(s), Some(t)) if s.readonly == t.readonly => {
                    let result = self.check_subtype(s.value_type, t.value_type);
                    if result.is_false() {
                        return result;
                    }
                }
                _ => return SubtypeResult::False,
            }
        }
        let signature_pairs = source_shape
            .call_signatures
            .iter()
            .zip(&target_shape.call_signatures)
            .chain(
                source_shape
                    .construct_signatures
                    .iter()
                    .zip(&target_shape.construct_signatures),
            );
        for (&s, &t) in signature_pairs {
            if !self.signatures_identical(s, t) {
                return SubtypeResult::False;
            }
        }
        SubtypeResult::True
    }

    fn signatures_identical(&mut self, source_id: SignatureId, target_id: SignatureId) -> bool {
        if source_id == target_id {
            return true;
        }
        let interner = self.env.interner();
        let (Some(source), Some(target)) = (interner.signature(source_id), interner.signature(target_id)) else {
            return false;
        };
        if source.params.len() != target.params.len()
            || source.type_params.len() != target.type_params.len()
            || source.min_argument_count != target.min_argument_count
            || source.has_rest() != target.has_rest()
        {
            return false;
        }
        // Align the source's type parameters with the target's.
        let source = if source.type_params.is_empty() {
            source
        } else {
            let target_params: Vec<TypeId> = target
                .type_params
                .iter()
                .map(|&tp| interner.type_param_type(tp))
                .collect();
            match interner.signature(instantiate_signature_with_args(self.env, source_id, &target_params)) {
                Some(sig) => sig,
                None => return false,
            }
        };
        for (s, t) in source.params.iter().zip(&target.params) {
            if s.optional != t.optional || self.check_subtype(s.type_id, t.type_id).is_false() {
                return false;
            }
        }
        self.check_subtype(source.return_type, target.return_type).is_true()
    }
}
