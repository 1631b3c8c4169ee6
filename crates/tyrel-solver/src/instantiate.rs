//! Generic instantiation.
//!
//! `instantiate_type` substitutes type parameters according to a
//! `TypeMapper`. Types without free type parameters (or whose free
//! parameters the mapper does not mention) come back unchanged, with the
//! same id. Interned mappers (`MapperId`) are memoized per
//! `(type, mapper)` on the environment; ad hoc mappers only share a cache
//! for the duration of one call.
//!
//! Applications of interfaces and classes are never expanded here: only
//! their arguments are instantiated, so recursive references stay finite.

use crate::env::TypeEnvironment;
use crate::evaluate;
use crate::types::*;
use rustc_hash::FxHashMap;
use tracing::warn;
use tyrel_common::limits::MAX_INSTANTIATION_DEPTH;

/// Substitution from type parameters to types, in parameter order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TypeMapper {
    sources: Vec<TypeParamId>,
    targets: Vec<TypeId>,
}

impl TypeMapper {
    /// Pair `sources` with `targets`; extra entries on either side are dropped.
    pub fn new(sources: &[TypeParamId], targets: &[TypeId]) -> Self {
        let len = sources.len().min(targets.len());
        TypeMapper {
            sources: sources[..len].to_vec(),
            targets: targets[..len].to_vec(),
        }
    }

    pub fn single(source: TypeParamId, target: TypeId) -> Self {
        TypeMapper {
            sources: vec![source],
            targets: vec![target],
        }
    }

    pub fn get(&self, source: TypeParamId) -> Option<TypeId> {
        self.sources
            .iter()
            .position(|&s| s == source)
            .map(|i| self.targets[i])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn sources(&self) -> &[TypeParamId] {
        &self.sources
    }

    pub fn targets(&self) -> &[TypeId] {
        &self.targets
    }

    /// This mapper with `source` rebound to `target`.
    pub fn with(&self, source: TypeParamId, target: TypeId) -> Self {
        let mut mapper = self.without(&[source]);
        mapper.sources.push(source);
        mapper.targets.push(target);
        mapper
    }

    /// This mapper minus the parameters shadowed by an inner binder.
    pub fn without(&self, shadowed: &[TypeParamId]) -> Self {
        let mut mapper = TypeMapper::default();
        for (&source, &target) in self.sources.iter().zip(&self.targets) {
            if !shadowed.contains(&source) {
                mapper.sources.push(source);
                mapper.targets.push(target);
            }
        }
        mapper
    }

    fn mentions_any(&self, params: &[TypeParamId]) -> bool {
        params.iter().any(|p| self.sources.contains(p))
    }
}

/// Instantiate `type_id` through an ad hoc mapper.
pub fn instantiate_type(env: &TypeEnvironment, type_id: TypeId, mapper: &TypeMapper) -> TypeId {
    let mut instantiator = Instantiator::new(env, mapper);
    instantiator.instantiate(type_id)
}

/// Instantiate `type_id` through an interned mapper, memoized on the environment.
pub fn instantiate_type_with_id(env: &TypeEnvironment, type_id: TypeId, mapper_id: MapperId) -> TypeId {
    if let Some(&cached) = env.instantiation_cache.borrow().get(&(type_id, mapper_id)) {
        return cached;
    }
    let Some(mapper) = env.mapper(mapper_id) else {
        return type_id;
    };
    let depth_before = env.stats().instantiation_limit_hits;
    let result = instantiate_type(env, type_id, &mapper);
    // A result cut short by the depth guard is not a stable answer.
    if env.stats().instantiation_limit_hits == depth_before {
        env.instantiation_cache
            .borrow_mut()
            .insert((type_id, mapper_id), result);
    }
    result
}

/// Instantiate a signature. Type parameters the signature declares itself
/// shadow the mapper and stay generic.
pub fn instantiate_signature(env: &TypeEnvironment, sig_id: SignatureId, mapper: &TypeMapper) -> SignatureId {
    let Some(sig) = env.interner().signature(sig_id) else {
        return sig_id;
    };
    let mapper = mapper.without(&sig.type_params);
    let free = env.interner().signature_free_params(sig_id);
    if !mapper.mentions_any(&free) {
        return sig_id;
    }
    let mut instantiator = Instantiator::new(env, &mapper);
    let params = sig
        .params
        .iter()
        .map(|p| ParamInfo {
            type_id: instantiator.instantiate(p.type_id),
            ..*p
        })
        .collect();
    let this_type = sig.this_type.map(|t| instantiator.instantiate(t));
    let return_type = instantiator.instantiate(sig.return_type);
    env.interner().alloc_signature(Signature {
        declaration: sig.declaration,
        type_params: sig.type_params.clone(),
        params,
        this_type,
        return_type,
        min_argument_count: sig.min_argument_count,
        flags: sig.flags,
    })
}

/// Instantiate the type parameters of a generic signature with concrete
/// arguments, dropping them from the result.
pub fn instantiate_signature_with_args(env: &TypeEnvironment, sig_id: SignatureId, args: &[TypeId]) -> SignatureId {
    let Some(sig) = env.interner().signature(sig_id) else {
        return sig_id;
    };
    if sig.type_params.is_empty() {
        return sig_id;
    }
    let mapper = TypeMapper::new(&sig.type_params, args);
    let mut instantiator = Instantiator::new(env, &mapper);
    let params = sig
        .params
        .iter()
        .map(|p| ParamInfo {
            type_id: instantiator.instantiate(p.type_id),
            ..*p
        })
        .collect();
    let this_type = sig.this_type.map(|t| instantiator.instantiate(t));
    let return_type = instantiator.instantiate(sig.return_type);
    env.interner().alloc_signature(Signature {
        declaration: sig.declaration,
        type_params: Vec::new(),
        params,
        this_type,
        return_type,
        min_argument_count: sig.min_argument_count,
        flags: sig.flags,
    })
}

struct Instantiator<'a> {
    env: &'a TypeEnvironment,
    mapper: &'a TypeMapper,
    cache: FxHashMap<TypeId, TypeId>,
}

impl<'a> Instantiator<'a> {
    fn new(env: &'a TypeEnvironment, mapper: &'a TypeMapper) -> Self {
        Instantiator {
            env,
            mapper,
            cache: FxHashMap::default(),
        }
    }

    fn instantiate(&mut self, type_id: TypeId) -> TypeId {
        if self.mapper.is_empty() {
            return type_id;
        }
        let free = self.env.interner().free_type_params(type_id);
        if !self.mapper.mentions_any(&free) {
            return type_id;
        }
        if let Some(&cached) = self.cache.get(&type_id) {
            return cached;
        }

        let depth = self.env.instantiation_depth.get();
        if depth >= MAX_INSTANTIATION_DEPTH {
            self.env.count_instantiation_limit_hit();
            warn!(
                type_id = type_id.0,
                depth, "instantiation depth limit reached, degrading to error type"
            );
            return TypeId::ERROR;
        }
        self.env.instantiation_depth.set(depth + 1);
        let result = self.instantiate_inner(type_id);
        self.env.instantiation_depth.set(depth);

        self.cache.insert(type_id, result);
        result
    }

    fn instantiate_inner(&mut self, type_id: TypeId) -> TypeId {
        let env = self.env;
        let interner = env.interner();
        let Some(data) = interner.lookup(type_id) else {
            return type_id;
        };
        match data {
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::EnumLiteral(..) => type_id,
            TypeData::TypeParameter(tp) => self.mapper.get(tp).unwrap_or(type_id),
            TypeData::Union(list) => {
                let members = interner.type_list(list);
                let mapped = members.iter().map(|&m| self.instantiate(m)).collect();
                interner.union(mapped)
            }
            TypeData::Intersection(list) => {
                let members = interner.type_list(list);
                let mapped = members.iter().map(|&m| self.instantiate(m)).collect();
                interner.intersection(mapped)
            }
            TypeData::Array(element) => {
                let element = self.instantiate(element);
                interner.array(element)
            }
            TypeData::Tuple(list) => {
                let elements = interner.tuple_list(list);
                let mapped = elements
                    .iter()
                    .map(|e| TupleElement {
                        type_id: self.instantiate(e.type_id),
                        ..*e
                    })
                    .collect();
                interner.tuple(mapped)
            }
            TypeData::Object(shape_id) => self.instantiate_object(shape_id),
            TypeData::Application(app_id) => {
                let Some(app) = interner.type_application(app_id) else {
                    return type_id;
                };
                let args = app.args.iter().map(|&a| self.instantiate(a)).collect();
                interner.application(app.target, args)
            }
            TypeData::Conditional(cond_id) => self.instantiate_conditional(type_id, cond_id),
            TypeData::Mapped(mapped_id) => {
                let Some(mapped) = interner.mapped_type(mapped_id) else {
                    return type_id;
                };
                // `keyof X` stays unevaluated so the result is still homomorphic.
                let constraint = match interner.lookup(mapped.constraint) {
                    Some(TypeData::KeyOf(source)) => {
                        let source = self.instantiate(source);
                        interner.keyof(source)
                    }
                    _ => self.instantiate(mapped.constraint),
                };
                let inner = self.mapper.without(&[mapped.type_param]);
                let template = instantiate_type(self.env, mapped.template, &inner);
                evaluate::get_mapped_type(
                    self.env,
                    MappedType {
                        constraint,
                        template,
                        ..mapped
                    },
                )
            }
            TypeData::IndexAccess(object, index) => {
                let object = self.instantiate(object);
                let index = self.instantiate(index);
                evaluate::get_indexed_access_type(self.env, object, index)
            }
            TypeData::KeyOf(operand) => {
                let operand = self.instantiate(operand);
                evaluate::get_keyof_type(self.env, operand)
            }
        }
    }

    fn instantiate_object(&mut self, shape_id: ObjectShapeId) -> TypeId {
        let env = self.env;
        let interner = env.interner();
        let shape = interner.object_shape(shape_id);
        let properties = shape
            .properties
            .iter()
            .map(|p| PropertyInfo {
                type_id: self.instantiate(p.type_id),
                ..*p
            })
            .collect();
        let call_signatures = shape
            .call_signatures
            .iter()
            .map(|&s| instantiate_signature(self.env, s, self.mapper))
            .collect();
        let construct_signatures = shape
            .construct_signatures
            .iter()
            .map(|&s| instantiate_signature(self.env, s, self.mapper))
            .collect();
        let string_index = shape.string_index.map(|info| IndexInfo {
            key_type: self.instantiate(info.key_type),
            value_type: self.instantiate(info.value_type),
            readonly: info.readonly,
        });
        let number_index = shape.number_index.map(|info| IndexInfo {
            key_type: self.instantiate(info.key_type),
            value_type: self.instantiate(info.value_type),
            readonly: info.readonly,
        });
        interner.object(ObjectShape {
            symbol: shape.symbol,
            flags: shape.flags | ObjectFlags::INSTANTIATED,
            properties,
            call_signatures,
            construct_signatures,
            string_index,
            number_index,
        })
    }

    fn instantiate_conditional(&mut self, type_id: TypeId, cond_id: ConditionalTypeId) -> TypeId {
        let env = self.env;
        let interner = env.interner();
        let Some(cond) = interner.conditional_type(cond_id) else {
            return type_id;
        };

        // Distribute over a union substituted for a naked check parameter.
        if cond.is_distributive {
            if let Some(TypeData::TypeParameter(tp)) = interner.lookup(cond.check_type) {
                if let Some(replacement) = self.mapper.get(tp) {
                    if replacement == TypeId::NEVER {
                        return TypeId::NEVER;
                    }
                    if let Some(members) = interner.union_members(replacement) {
                        let results = members
                            .iter()
                            .map(|&member| {
                                let per_member = self.mapper.with(tp, member);
                                instantiate_conditional_parts(self.env, cond, &per_member)
                            })
                            .collect();
                        return interner.union(results);
                    }
                }
            }
        }

        instantiate_conditional_parts(self.env, cond, self.mapper)
    }
}

fn instantiate_conditional_parts(env: &TypeEnvironment, cond: ConditionalType, mapper: &TypeMapper) -> TypeId {
    let mut instantiator = Instantiator::new(env, mapper);
    let instantiated = ConditionalType {
        check_type: instantiator.instantiate(cond.check_type),
        extends_type: instantiator.instantiate(cond.extends_type),
        true_type: instantiator.instantiate(cond.true_type),
        false_type: instantiator.instantiate(cond.false_type),
        is_distributive: cond.is_distributive,
    };
    evaluate::get_conditional_type(env, instantiated)
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
