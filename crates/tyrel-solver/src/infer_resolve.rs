//! Turning collected inference candidates into type arguments.
//!
//! For each type parameter, in declaration order:
//!
//! 1. covariant candidates: their union. When every candidate is a literal
//!    they are widened, unless the constraint asks for literals or the
//!    candidates only came from the contextual return type;
//! 2. otherwise contravariant candidates: the candidate that is a subtype of
//!    the others;
//! 3. otherwise the declared default;
//! 4. otherwise the configured inference default.
//!
//! The result must satisfy the instantiated constraint, else the constraint
//! itself is used. Type parameters that are not resolved yet are seen as
//! their constraint while an earlier one resolves; every parameter that saw
//! such a placeholder is resolved once more after the first round.

use crate::infer::InferenceContext;
use crate::instantiate::{TypeMapper, instantiate_type};
use crate::subtype::{is_type_assignable_to, is_type_subtype_of};
use crate::types::*;
use tracing::debug;
use tyrel_binder::symbol_flags;
use tyrel_common::options::InferenceDefault;

impl<'a> InferenceContext<'a> {
    /// One type argument per type parameter, in order.
    pub fn resolve_all(&mut self) -> Vec<TypeId> {
        let params: Vec<TypeParamId> = self.type_params.iter().map(|(p, _)| *p).collect();
        let interner = self.env.interner();
        let mut results: Vec<TypeId> = params
            .iter()
            .map(|&p| interner.type_param_constraint(p).unwrap_or(TypeId::UNKNOWN))
            .collect();

        let mut dependent = Vec::new();
        for index in 0..params.len() {
            let mapper = TypeMapper::new(&params, &results);
            if self.mentions_unresolved(index) {
                dependent.push(index);
            }
            results[index] = self.resolve_one(index, &mapper);
        }
        for index in dependent {
            let mapper = TypeMapper::new(&params, &results);
            results[index] = self.resolve_one(index, &mapper);
            debug!(param = index, result = results[index].0, "re-resolved circular inference");
        }
        results
    }

    /// Whether the inputs of parameter `index` mention itself or a later parameter.
    fn mentions_unresolved(&mut self, index: usize) -> bool {
        let (param, var) = self.type_params[index];
        let info = self.info(var);
        let interner = self.env.interner();
        let unresolved: Vec<TypeParamId> = self.type_params[index..].iter().map(|(p, _)| *p).collect();
        let param_info = interner.type_param_info(param);
        let inputs = info
            .candidates
            .iter()
            .chain(&info.contra_candidates)
            .copied()
            .chain(param_info.as_ref().and_then(|i| i.constraint))
            .chain(param_info.as_ref().and_then(|i| i.default));
        for input in inputs {
            let free = interner.free_type_params(input);
            if free.iter().any(|p| unresolved.contains(p)) {
                return true;
            }
        }
        false
    }

    fn resolve_one(&mut self, index: usize, mapper: &TypeMapper) -> TypeId {
        let env = self.env;
        let interner = env.interner();
        let (param, var) = self.type_params[index];
        let info = self.info(var);
        let param_info = interner.type_param_info(param);
        let constraint = param_info
            .as_ref()
            .and_then(|i| i.constraint)
            .map(|c| instantiate_type(env, c, mapper));

        let inferred = if !info.candidates.is_empty() {
            let candidates: Vec<TypeId> = info
                .candidates
                .iter()
                .map(|&c| instantiate_type(env, c, mapper))
                .collect();
            // Widening only applies when every candidate is a literal.
            let preserve_literals = constraint.is_some_and(|c| self.is_literal_preserving(c))
                || info.priority == Some(InferencePriority::ReturnType)
                || !candidates.iter().all(|&c| self.is_widenable_literal(c));
            let candidates = if preserve_literals {
                candidates
            } else {
                candidates.into_iter().map(|c| self.widen_literal(c)).collect()
            };
            Some(interner.union(candidates))
        } else if !info.contra_candidates.is_empty() {
            let candidates: Vec<TypeId> = info
                .contra_candidates
                .iter()
                .map(|&c| instantiate_type(env, c, mapper))
                .collect();
            Some(self.common_subtype(&candidates))
        } else {
            None
        };

        let mut result = match inferred {
            Some(t) => t,
            None => match param_info.as_ref().and_then(|i| i.default) {
                Some(default) => instantiate_type(env, default, mapper),
                None => match env.options().inference_default {
                    InferenceDefault::Unknown => TypeId::UNKNOWN,
                    InferenceDefault::Any => TypeId::ANY,
                    InferenceDefault::Constraint => constraint.unwrap_or(TypeId::UNKNOWN),
                },
            },
        };
        if let Some(constraint) = constraint {
            if !is_type_assignable_to(env, result, constraint) {
                debug!(
                    param = index,
                    inferred = result.0,
                    constraint = constraint.0,
                    "inferred type does not satisfy constraint, using constraint"
                );
                result = constraint;
            }
        }
        self.set_resolved(var, result);
        result
    }

    /// Constraints that keep inferred literals as they are.
    fn is_literal_preserving(&self, constraint: TypeId) -> bool {
        let interner = self.env.interner();
        match interner.lookup(constraint) {
            Some(TypeData::Intrinsic(kind)) => matches!(
                kind,
                IntrinsicKind::String
                    | IntrinsicKind::Number
                    | IntrinsicKind::Boolean
                    | IntrinsicKind::Bigint
                    | IntrinsicKind::Symbol
            ),
            Some(TypeData::Literal(_) | TypeData::EnumLiteral(..) | TypeData::KeyOf(_)) => true,
            Some(TypeData::Union(list)) => interner
                .type_list(list)
                .iter()
                .any(|&m| self.is_literal_preserving(m)),
            _ => false,
        }
    }

    fn is_widenable_literal(&self, type_id: TypeId) -> bool {
        matches!(
            self.env.interner().lookup(type_id),
            Some(TypeData::Literal(_) | TypeData::EnumLiteral(..))
        )
    }

    /// Literal to primitive; enum member to its enum.
    fn widen_literal(&self, type_id: TypeId) -> TypeId {
        let env = self.env;
        match env.interner().lookup(type_id) {
            Some(TypeData::Literal(value)) => value.primitive(),
            Some(TypeData::EnumLiteral(member, _)) => env
                .symbol(member)
                .map(|s| s.parent)
                .filter(|&parent| env.symbol(parent).is_some_and(|p| p.has_flags(symbol_flags::ENUM)))
                .map(|parent| env.get_declared_type_of_symbol(parent))
                .unwrap_or(type_id),
            _ => type_id,
        }
    }

    /// The candidate that is a subtype of the others, or the first one.
    fn common_subtype(&self, candidates: &[TypeId]) -> TypeId {
        candidates
            .iter()
            .copied()
            .reduce(|best, next| if is_type_subtype_of(self.env, next, best) { next } else { best })
            .unwrap_or(TypeId::UNKNOWN)
    }
}

#[cfg(test)]
#[path = "../tests/infer_resolve_tests.rs"]
mod tests;
