//! Type argument inference.
//!
//! Each type parameter of the signature being inferred gets an inference
//! variable in an `ena` unification table. The value of a variable is its
//! `InferenceInfo`: the candidates seen in covariant and contravariant
//! positions and the priority they were collected at. Candidates are added
//! by unifying a one-candidate info into the variable, so the priority rule
//! lives in `unify_values`: a better priority replaces what was collected,
//! a worse one is ignored, an equal one appends in discovery order.
//!
//! Candidates are gathered by walking an argument type and a parameter type
//! in parallel (`infer_from_types`). Resolution is in `infer_resolve.rs`.

use crate::env::TypeEnvironment;
use crate::evaluate::{evaluate_type, is_numeric_name, tuple_element_value};
use crate::instantiate::instantiate_signature_with_args;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::subtype_rules::{param_type_at, rest_element_type};
use crate::types::*;
use crate::variance::get_variances;
use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use rustc_hash::FxHashSet;
use tracing::trace;

/// An inference variable, one per inferred type parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InferenceVar(pub u32);

impl UnifyKey for InferenceVar {
    type Value = InferenceInfo;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        InferenceVar(u)
    }

    fn tag() -> &'static str {
        "InferenceVar"
    }
}

/// What is known about one inference variable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InferenceInfo {
    /// Candidates from covariant positions, in discovery order.
    pub candidates: Vec<TypeId>,
    /// Candidates from contravariant positions, in discovery order.
    pub contra_candidates: Vec<TypeId>,
    /// Priority of the candidates; `None` while there are none.
    pub priority: Option<InferencePriority>,
    pub resolved: Option<TypeId>,
}

impl InferenceInfo {
    fn candidate(type_id: TypeId, contravariant: bool, priority: InferencePriority) -> Self {
        let mut info = InferenceInfo {
            priority: Some(priority),
            ..InferenceInfo::default()
        };
        if contravariant {
            info.contra_candidates.push(type_id);
        } else {
            info.candidates.push(type_id);
        }
        info
    }

    fn resolved(type_id: TypeId) -> Self {
        InferenceInfo {
            resolved: Some(type_id),
            ..InferenceInfo::default()
        }
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty() || !self.contra_candidates.is_empty()
    }
}

impl UnifyValue for InferenceInfo {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        let mut merged = match (a.priority, b.priority) {
            (Some(pa), Some(pb)) if pb < pa => b.clone(),
            (Some(pa), Some(pb)) if pa == pb => {
                let mut merged = a.clone();
                for &c in &b.candidates {
                    if !merged.candidates.contains(&c) {
                        merged.candidates.push(c);
                    }
                }
                for &c in &b.contra_candidates {
                    if !merged.contra_candidates.contains(&c) {
                        merged.contra_candidates.push(c);
                    }
                }
                merged
            }
            (None, Some(_)) => b.clone(),
            _ => a.clone(),
        };
        // A later resolution replaces an earlier placeholder.
        merged.resolved = b.resolved.or(a.resolved);
        Ok(merged)
    }
}

/// One argument of a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallArgument {
    pub type_id: TypeId,
    /// The argument's type depends on its contextual type (for example an
    /// unannotated function expression); inferred from in the second pass.
    pub context_sensitive: bool,
}

impl CallArgument {
    pub fn new(type_id: TypeId) -> Self {
        CallArgument {
            type_id,
            context_sensitive: false,
        }
    }

    pub fn context_sensitive(type_id: TypeId) -> Self {
        CallArgument {
            type_id,
            context_sensitive: true,
        }
    }
}

/// Inference state for one generic signature at one call.
pub struct InferenceContext<'a> {
    pub(crate) env: &'a TypeEnvironment,
    pub(crate) table: InPlaceUnificationTable<InferenceVar>,
    pub(crate) type_params: Vec<(TypeParamId, InferenceVar)>,
    priority: InferencePriority,
    contravariant: bool,
    visited: FxHashSet<(TypeId, TypeId, bool)>,
    depth: DepthCounter,
}

impl<'a> InferenceContext<'a> {
    pub fn new(env: &'a TypeEnvironment, type_params: &[TypeParamId]) -> Self {
        let mut table = InPlaceUnificationTable::new();
        let type_params = type_params
            .iter()
            .map(|&tp| (tp, table.new_key(InferenceInfo::default())))
            .collect();
        InferenceContext {
            env,
            table,
            type_params,
            priority: InferencePriority::Direct,
            contravariant: false,
            visited: FxHashSet::default(),
            depth: DepthCounter::with_profile(RecursionProfile::Inference),
        }
    }

    /// The variable of `type_id` if it is one of this context's type parameters.
    pub fn var_of_type(&self, type_id: TypeId) -> Option<InferenceVar> {
        match self.env.interner().lookup(type_id)? {
            TypeData::TypeParameter(tp) => self
                .type_params
                .iter()
                .find(|(param, _)| *param == tp)
                .map(|(_, var)| *var),
            _ => None,
        }
    }

    pub fn info(&mut self, var: InferenceVar) -> InferenceInfo {
        self.table.probe_value(var)
    }

    pub(crate) fn set_resolved(&mut self, var: InferenceVar, type_id: TypeId) {
        self.table.union_value(var, InferenceInfo::resolved(type_id));
    }

    fn add_candidate(&mut self, var: InferenceVar, type_id: TypeId) {
        trace!(
            var = var.0,
            candidate = type_id.0,
            contravariant = self.contravariant,
            priority = ?self.priority,
            "inference candidate"
        );
        let info = InferenceInfo::candidate(type_id, self.contravariant, self.priority);
        self.table.union_value(var, info);
    }

    /// Collect candidates from `source` flowing into `target` at `priority`.
    pub fn infer_with_priority(&mut self, priority: InferencePriority, source: TypeId, target: TypeId) {
        if priority != self.priority {
            self.visited.clear();
            self.priority = priority;
        }
        self.infer_from_types(source, target);
    }

    pub fn infer_from_types(&mut self, source: TypeId, target: TypeId) {
        if source.is_error() || !self.env.interner().contains_type_params(target) {
            return;
        }
        if let Some(var) = self.var_of_type(target) {
            self.add_candidate(var, source);
            return;
        }
        if !self.visited.insert((source, target, self.contravariant)) {
            return;
        }
        if !self.depth.enter() {
            return;
        }
        self.infer_from_types_inner(source, target);
        self.depth.leave();
    }

    fn infer_from_contravariant_types(&mut self, source: TypeId, target: TypeId) {
        self.contravariant = !self.contravariant;
        self.infer_from_types(source, target);
        self.contravariant = !self.contravariant;
    }

    fn infer_from_types_inner(&mut self, source: TypeId, target: TypeId) {
        let env = self.env;
        let interner = env.interner();
        let source = evaluate_type(env, source);

        if let Some(targets) = interner.union_members(target) {
            self.infer_to_union(source, &targets);
            return;
        }
        if let Some(sources) = interner.union_members(source) {
            for &member in sources.iter() {
                self.infer_from_types(member, target);
            }
            return;
        }
        if let Some(targets) = interner.intersection_members(target) {
            for &member in targets.iter() {
                self.infer_from_types(source, member);
            }
            return;
        }

        if let (Some(source_app), Some(target_app)) = (env.is_structured_reference(source), env.is_structured_reference(target)) {
            if source_app.target == target_app.target && source_app.args.len() == target_app.args.len() {
                let variances = get_variances(env, target_app.target, RelationKind::Assignable);
                for (i, (&s, &t)) in source_app.args.iter().zip(&target_app.args).enumerate() {
                    let variance = variances.get(i).copied().unwrap_or(Variance::COVARIANT);
                    if variance.is_contravariant() && !variance.is_covariant() {
                        self.infer_from_contravariant_types(s, t);
                    } else {
                        self.infer_from_types(s, t);
                    }
                }
                return;
            }
        }

        let (Some(source_data), Some(target_data)) = (interner.lookup(source), interner.lookup(target)) else {
            return;
        };
        match (source_data, target_data) {
            (TypeData::Array(s), TypeData::Array(t)) => self.infer_from_types(s, t),
            (TypeData::Tuple(list), TypeData::Array(t)) => {
                for element in interner.tuple_list(list).iter() {
                    self.infer_from_types(tuple_element_value(env, element), t);
                }
            }
            (TypeData::Tuple(s), TypeData::Tuple(t)) => {
                let source_elements = interner.tuple_list(s);
                let target_elements = interner.tuple_list(t);
                self.infer_from_tuples(&source_elements, &target_elements);
            }
            (TypeData::Array(_), TypeData::Tuple(list)) => {
                if let Some(rest) = interner.tuple_list(list).iter().find(|e| e.rest) {
                    self.infer_from_types(source, rest.type_id);
                }
            }
            (_, TypeData::Mapped(mapped_id)) => {
                if let Some(mapped) = interner.mapped_type(mapped_id) {
                    self.infer_to_homomorphic_mapped(source, mapped);
                }
            }
            (TypeData::Conditional(s), TypeData::Conditional(t)) => {
                if let (Some(s), Some(t)) = (interner.conditional_type(s), interner.conditional_type(t)) {
                    self.infer_from_types(s.check_type, t.check_type);
                    self.infer_from_types(s.extends_type, t.extends_type);
                    self.infer_from_types(s.true_type, t.true_type);
                    self.infer_from_types(s.false_type, t.false_type);
                }
            }
            (TypeData::IndexAccess(so, si), TypeData::IndexAccess(to, ti)) => {
                self.infer_from_types(so, to);
                self.infer_from_types(si, ti);
            }
            (TypeData::KeyOf(s), TypeData::KeyOf(t)) => self.infer_from_contravariant_types(s, t),
            (
                TypeData::Object(_) | TypeData::Application(_) | TypeData::Intersection(_),
                TypeData::Object(_) | TypeData::Application(_),
            ) => self.infer_from_objects(source, target),
            _ => {}
        }
    }

    /// Match identical members first, then infer what is left of the source
    /// into the single naked type parameter of the target, if there is one.
    fn infer_to_union(&mut self, source: TypeId, targets: &[TypeId]) {
        let interner = self.env.interner();
        let sources: Vec<TypeId> = match interner.union_members(source) {
            Some(members) => members.to_vec(),
            None => vec![source],
        };
        let unmatched_sources: Vec<TypeId> = sources.iter().copied().filter(|s| !targets.contains(s)).collect();
        let unmatched_targets: Vec<TypeId> = targets.iter().copied().filter(|t| !sources.contains(t)).collect();
        let (naked, structured): (Vec<TypeId>, Vec<TypeId>) = unmatched_targets
            .into_iter()
            .partition(|&t| self.var_of_type(t).is_some());

        for &target in &structured {
            for &source in &unmatched_sources {
                self.infer_from_types(source, target);
            }
        }
        if let [naked] = naked.as_slice() {
            if !unmatched_sources.is_empty() {
                let remaining = interner.union(unmatched_sources);
                self.infer_from_types(remaining, *naked);
            }
        }
    }

    fn infer_from_tuples(&mut self, source: &[TupleElement], target: &[TupleElement]) {
        let env = self.env;
        for (i, target_element) in target.iter().enumerate() {
            if target_element.rest {
                let rest_element = rest_element_type(env, target_element.type_id);
                // A variadic `...T` collects the remaining elements as a tuple.
                if let Some(var) = self.var_of_type(target_element.type_id) {
                    let remaining = env.interner().tuple(source.iter().skip(i).copied().collect());
                    self.add_candidate(var, remaining);
                    return;
                }
                for element in source.iter().skip(i) {
                    let value = if element.rest {
                        rest_element_type(env, element.type_id)
                    } else {
                        element.type_id
                    };
                    self.infer_from_types(value, rest_element);
                }
                return;
            }
            match source.get(i) {
                Some(element) if !element.rest => self.infer_from_types(element.type_id, target_element.type_id),
                Some(element) => {
                    let value = rest_element_type(env, element.type_id);
                    self.infer_from_types(value, target_element.type_id);
                }
                None => return,
            }
        }
    }

    /// `{ [K in keyof T]: T[K] }`-shaped targets infer the source into `T`.
    fn infer_to_homomorphic_mapped(&mut self, source: TypeId, mapped: MappedType) {
        let interner = self.env.interner();
        let Some(TypeData::KeyOf(operand)) = interner.lookup(mapped.constraint) else {
            return;
        };
        if self.var_of_type(operand).is_none() {
            return;
        }
        let key = interner.type_param_type(mapped.type_param);
        if mapped.template == interner.index_access(operand, key) {
            self.infer_from_types(source, operand);
        }
    }

    fn infer_from_objects(&mut self, source: TypeId, target: TypeId) {
        let env = self.env;
        let (Some(source_shape), Some(target_shape)) = (env.resolve_shape(source), env.resolve_shape(target)) else {
            return;
        };

        for target_prop in &target_shape.properties {
            if let Some(source_prop) = source_shape.find_property(target_prop.name) {
                self.infer_from_types(source_prop.type_id, target_prop.type_id);
            }
        }

        if let Some(target_index) = target_shape.string_index {
            let values: Vec<TypeId> = match source_shape.string_index {
                Some(index) => vec![index.value_type],
                None => source_shape.properties.iter().map(|p| p.type_id).collect(),
            };
            if !values.is_empty() {
                let value = env.interner().union(values);
                self.infer_from_types(value, target_index.value_type);
            }
        }
        if let Some(target_index) = target_shape.number_index {
            let interner = env.interner();
            let values: Vec<TypeId> = match source_shape.number_index.or(source_shape.string_index) {
                Some(index) => vec![index.value_type],
                None => source_shape
                    .properties
                    .iter()
                    .filter(|p| is_numeric_name(&interner.resolve_atom(p.name)))
                    .map(|p| p.type_id)
                    .collect(),
            };
            if !values.is_empty() {
                let value = interner.union(values);
                self.infer_from_types(value, target_index.value_type);
            }
        }

        self.infer_from_signature_lists(&source_shape.call_signatures, &target_shape.call_signatures);
        self.infer_from_signature_lists(&source_shape.construct_signatures, &target_shape.construct_signatures);
    }

    /// Pairs signatures from the end of both lists, so the most general
    /// overloads meet.
    fn infer_from_signature_lists(&mut self, source: &[SignatureId], target: &[SignatureId]) {
        let count = source.len().min(target.len());
        let source = &source[source.len() - count..];
        let target = &target[target.len() - count..];
        for (&s, &t) in source.iter().zip(target) {
            self.infer_from_signatures(s, t);
        }
    }

    fn infer_from_signatures(&mut self, source_id: SignatureId, target_id: SignatureId) {
        let env = self.env;
        let interner = env.interner();
        // A generic source contributes through its constraints.
        let source_id = match interner.signature(source_id) {
            Some(sig) if !sig.type_params.is_empty() => {
                let erased: Vec<TypeId> = sig
                    .type_params
                    .iter()
                    .map(|&tp| interner.type_param_constraint(tp).unwrap_or(TypeId::UNKNOWN))
                    .collect();
                instantiate_signature_with_args(env, source_id, &erased)
            }
            _ => source_id,
        };
        let (Some(source), Some(target)) = (interner.signature(source_id), interner.signature(target_id)) else {
            return;
        };

        for (i, target_param) in target.params.iter().enumerate() {
            if target_param.rest {
                if let Some(var) = self.var_of_type(target_param.type_id) {
                    let remaining: Vec<TupleElement> = source.params[i.min(source.params.len())..]
                        .iter()
                        .map(|p| TupleElement {
                            type_id: p.type_id,
                            optional: p.optional,
                            rest: p.rest,
                        })
                        .collect();
                    let tuple = interner.tuple(remaining);
                    self.contravariant = !self.contravariant;
                    self.add_candidate(var, tuple);
                    self.contravariant = !self.contravariant;
                    break;
                }
            }
            let Some(source_type) = param_type_at(env, &source, i) else {
                break;
            };
            let Some(target_type) = param_type_at(env, &target, i) else {
                break;
            };
            self.infer_from_contravariant_types(source_type, target_type);
        }
        if let (Some(s), Some(t)) = (source.this_type, target.this_type) {
            self.infer_from_contravariant_types(s, t);
        }
        self.infer_from_types(source.return_type, target.return_type);
    }
}

/// Infer one type per type parameter of `sig_id` from the arguments of a
/// call, and from the type the call result is expected to have.
///
/// Directly typed arguments are inferred from first; context-sensitive
/// arguments second at a lower priority; the contextual type feeds the
/// return type at the lowest priority.
pub fn infer_type_arguments(
    env: &TypeEnvironment,
    sig_id: SignatureId,
    args: &[CallArgument],
    contextual_type: Option<TypeId>,
) -> Vec<TypeId> {
    let interner = env.interner();
    let Some(sig) = interner.signature(sig_id) else {
        return Vec::new();
    };
    if sig.type_params.is_empty() {
        return Vec::new();
    }
    let mut ctx = InferenceContext::new(env, &sig.type_params);

    let rest_var = if sig.has_rest() {
        sig.params.last().and_then(|p| ctx.var_of_type(p.type_id))
    } else {
        None
    };
    let rest_start = sig.params.len().saturating_sub(1);

    for (priority, context_sensitive) in [
        (InferencePriority::Direct, false),
        (InferencePriority::ContextualArgument, true),
    ] {
        for (i, arg) in args.iter().enumerate() {
            if arg.context_sensitive != context_sensitive {
                continue;
            }
            if rest_var.is_some() && i >= rest_start {
                continue;
            }
            if let Some(param) = param_type_at(env, &sig, i) {
                ctx.infer_with_priority(priority, arg.type_id, param);
            }
        }
    }
    // `...args: T` collects the trailing arguments as a tuple.
    if let (Some(_), Some(rest_param)) = (rest_var, sig.params.last()) {
        let elements = args
            .iter()
            .skip(rest_start)
            .map(|arg| TupleElement {
                type_id: arg.type_id,
                optional: false,
                rest: false,
            })
            .collect();
        let tuple = interner.tuple(elements);
        ctx.infer_with_priority(InferencePriority::Direct, tuple, rest_param.type_id);
    }
    if let Some(contextual) = contextual_type {
        ctx.infer_with_priority(InferencePriority::ReturnType, contextual, sig.return_type);
    }

    ctx.resolve_all()
}

/// Instantiate a generic `source` signature by inferring its type
/// parameters from the parameters of `target`, for signature comparison.
pub fn instantiate_signature_in_context_of(env: &TypeEnvironment, source_id: SignatureId, target_id: SignatureId) -> SignatureId {
    let interner = env.interner();
    let (Some(source), Some(target)) = (interner.signature(source_id), interner.signature(target_id)) else {
        return source_id;
    };
    if source.type_params.is_empty() {
        return source_id;
    }
    let mut ctx = InferenceContext::new(env, &source.type_params);
    let count = source.params.len().max(target.params.len());
    for i in 0..count {
        let (Some(target_type), Some(source_type)) = (param_type_at(env, &target, i), param_type_at(env, &source, i)) else {
            continue;
        };
        ctx.infer_with_priority(InferencePriority::Direct, target_type, source_type);
    }
    let args = ctx.resolve_all();
    instantiate_signature_with_args(env, source_id, &args)
}

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod tests;
