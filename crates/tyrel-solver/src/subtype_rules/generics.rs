//! Type parameters, deferred forms and generic references.
//!
//! A type parameter relates through its constraint; a type parameter target
//! only accepts itself (and the top-level fast paths). Two references to the
//! same interface or class compare their type arguments by the measured
//! variance of each parameter instead of expanding both structures.

use crate::evaluate::get_indexed_access_type;
use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;
use crate::variance::get_variances;
use tyrel_binder::SymbolId;

impl<'a> SubtypeChecker<'a> {
    pub(crate) fn check_type_param_source(&mut self, param: TypeParamId, target: TypeId) -> SubtypeResult {
        match self.env.interner().type_param_constraint(param) {
            Some(constraint) => self.check_subtype(constraint, target),
            None => SubtypeResult::False,
        }
    }

    /// `keyof T`, `T[K]`, conditional and generic mapped sources.
    pub(crate) fn check_deferred_source(&mut self, source: TypeId, data: TypeData, target: TypeId) -> SubtypeResult {
        let interner = self.env.interner();
        match data {
            TypeData::KeyOf(_) => {
                let keys = interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL]);
                self.check_subtype(keys, target)
            }
            TypeData::Conditional(cond_id) => {
                let Some(cond) = interner.conditional_type(cond_id) else {
                    return SubtypeResult::False;
                };
                let result = self.check_subtype(cond.true_type, target);
                if result.is_false() {
                    return result;
                }
                self.check_subtype(cond.false_type, target)
            }
            TypeData::IndexAccess(object, index) => {
                let constraint = self.index_access_constraint(object, index);
                if constraint == source || constraint.is_error() {
                    return SubtypeResult::False;
                }
                self.check_subtype(constraint, target)
            }
            _ => SubtypeResult::False,
        }
    }

    /// `T[K]` read through the constraints of `T` and `K`.
    fn index_access_constraint(&self, object: TypeId, index: TypeId) -> TypeId {
        let base_object = self.base_constraint(object);
        let base_index = self.base_constraint(index);
        if base_object == object && base_index == index {
            return self.env.interner().index_access(object, index);
        }
        get_indexed_access_type(self.env, base_object, base_index)
    }

    fn base_constraint(&self, type_id: TypeId) -> TypeId {
        let interner = self.env.interner();
        match interner.lookup(type_id) {
            Some(TypeData::TypeParameter(param)) => interner.type_param_constraint(param).unwrap_or(TypeId::UNKNOWN),
            _ => type_id,
        }
    }

    /// Variance shortcut for two references to the same interface or class.
    pub(crate) fn check_same_reference(&mut self, source: TypeId, target: TypeId) -> Option<SubtypeResult> {
        let source_app = self.env.is_structured_reference(source)?;
        let target_app = self.env.is_structured_reference(target)?;
        if source_app.target != target_app.target || source_app.args.len() != target_app.args.len() {
            return None;
        }
        if source_app.args.is_empty() || self.env.variance_computing.borrow().contains(&source_app.target) {
            return None;
        }
        Some(self.check_type_arguments(source_app.target, &source_app.args, &target_app.args))
    }

    pub(crate) fn check_type_arguments(
        &mut self,
        symbol: SymbolId,
        source_args: &[TypeId],
        target_args: &[TypeId],
    ) -> SubtypeResult {
        let variances = get_variances(self.env, symbol, self.relation);
        for (i, (&s, &t)) in source_args.iter().zip(target_args).enumerate() {
            let variance = variances.get(i).copied().unwrap_or(Variance::COVARIANT);
            if !self.type_argument_related(s, t, variance) {
                return SubtypeResult::False;
            }
        }
        SubtypeResult::True
    }

    pub(crate) fn type_argument_related(&mut self, source: TypeId, target: TypeId, variance: Variance) -> bool {
        if variance.is_independent() {
            return true;
        }
        if variance.is_bivariant() {
            return self.check_subtype(source, target).is_true() || self.check_subtype(target, source).is_true();
        }
        if variance.is_covariant() {
            return self.check_subtype(source, target).is_true();
        }
        if variance.is_contravariant() {
            return self.check_subtype(target, source).is_true();
        }
        self.check_subtype(source, target).is_true() && self.check_subtype(target, source).is_true()
    }
}
