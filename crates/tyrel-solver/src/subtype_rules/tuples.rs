//! Array and tuple rules.

use crate::env::TypeEnvironment;
use crate::evaluate::tuple_element_value;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

/// The element type a rest parameter or rest tuple element accepts.
pub(crate) fn rest_element_type(env: &TypeEnvironment, type_id: TypeId) -> TypeId {
    let interner = env.interner();
    match interner.lookup(type_id) {
        Some(TypeData::Array(element)) => element,
        Some(TypeData::Tuple(list)) => {
            let values = interner
                .tuple_list(list)
                .iter()
                .map(|e| tuple_element_value(env, e))
                .collect();
            interner.union(values)
        }
        _ => type_id,
    }
}

/// Arity summary of a tuple.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TupleArity {
    /// Elements before the rest element.
    pub fixed: usize,
    /// Leading elements that are neither optional nor rest.
    pub required: usize,
    pub has_rest: bool,
}

impl TupleArity {
    pub(crate) fn of(elements: &[TupleElement]) -> Self {
        TupleArity {
            fixed: elements.iter().take_while(|e| !e.rest).count(),
            required: elements.iter().take_while(|e| !e.rest && !e.optional).count(),
            has_rest: elements.iter().any(|e| e.rest),
        }
    }
}

impl<'a> SubtypeChecker<'a> {
    /// `None` when neither side is an array or tuple.
    pub(crate) fn check_array_like(&mut self, source: TypeId, target: TypeId) -> Option<SubtypeResult> {
        let interner = self.env.interner();
        let source_data = interner.lookup(source)?;
        let target_data = interner.lookup(target)?;
        let result = match (source_data, target_data) {
            (TypeData::Array(s), TypeData::Array(t)) => self.check_subtype(s, t),
            (TypeData::Tuple(list), TypeData::Array(t)) => {
                let elements = interner.tuple_list(list);
                for element in elements.iter() {
                    let value = tuple_element_value(self.env, element);
                    let result = self.check_subtype(value, t);
                    if result.is_false() {
                        return Some(result);
                    }
                }
                SubtypeResult::True
            }
            (TypeData::Tuple(s), TypeData::Tuple(t)) => {
                let source_elements = interner.tuple_list(s);
                let target_elements = interner.tuple_list(t);
                self.check_tuple(&source_elements, &target_elements)
            }
            (TypeData::Array(_), TypeData::Tuple(list)) => {
                // Only a tuple made of a single rest element accepts an array.
                let elements = interner.tuple_list(list);
                match elements.as_ref() {
                    [only] if only.rest => self.check_subtype(source, only.type_id),
                    _ => SubtypeResult::False,
                }
            }
            (_, TypeData::Array(_) | TypeData::Tuple(_)) => SubtypeResult::False,
            _ => return None,
        };
        Some(result)
    }

    pub(crate) fn check_tuple(&mut self, source: &[TupleElement], target: &[TupleElement]) -> SubtypeResult {
        if !self.tuple_arity_compatible(source, target) {
            return SubtypeResult::False;
        }
        let target_arity = TupleArity::of(target);
        let target_rest = target.iter().find(|e| e.rest).map(|e| rest_element_type(self.env, e.type_id));

        for (i, element) in source.iter().enumerate() {
            if element.rest {
                let source_rest = rest_element_type(self.env, element.type_id);
                // Target positions the source only covers with its rest element.
                for target_element in target.iter().take(target_arity.fixed).skip(i) {
                    let result = self.check_subtype(source_rest, target_element.type_id);
                    if result.is_false() {
                        return result;
                    }
                }
                if let Some(target_rest) = target_rest {
                    let result = self.check_subtype(source_rest, target_rest);
                    if result.is_false() {
                        return result;
                    }
                }
                continue;
            }
            let target_type = match target.get(i) {
                Some(t) if !t.rest => {
                    if element.optional && !t.optional && self.relation != RelationKind::Comparable {
                        return SubtypeResult::False;
                    }
                    t.type_id
                }
                _ => match target_rest {
                    Some(rest) => rest,
                    None => return SubtypeResult::False,
                },
            };
            let result = self.check_subtype(element.type_id, target_type);
            if result.is_false() {
                return result;
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn tuple_arity_compatible(&self, source: &[TupleElement], target: &[TupleElement]) -> bool {
        let source_arity = TupleArity::of(source);
        let target_arity = TupleArity::of(target);
        if source_arity.has_rest && !target_arity.has_rest {
            return false;
        }
        if !target_arity.has_rest && source_arity.fixed > target_arity.fixed {
            return false;
        }
        source_arity.fixed >= target_arity.required
    }
}
