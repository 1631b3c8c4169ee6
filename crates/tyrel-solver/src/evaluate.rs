//! Evaluation of deferred type forms.
//!
//! Conditional, indexed access, `keyof` and mapped types are resolved here as
//! soon as their inputs are concrete. While an input still mentions a type
//! parameter the form is interned as-is and resolved again after
//! instantiation.

use crate::env::TypeEnvironment;
use crate::instantiate::{TypeMapper, instantiate_type};
use crate::query_trace;
use crate::subtype::is_type_assignable_to;
use crate::types::*;
use std::rc::Rc;
use tracing::{trace, warn};
use tyrel_binder::SymbolId;
use tyrel_common::limits::MAX_EVALUATION_DEPTH;

/// Run `f` one evaluation level deeper, or degrade to `error` at the limit.
fn with_depth(env: &TypeEnvironment, what: &'static str, f: impl FnOnce() -> TypeId) -> TypeId {
    let depth = env.evaluation_depth.get();
    if depth >= MAX_EVALUATION_DEPTH {
        env.count_evaluation_limit_hit();
        warn!(what, depth, "evaluation depth limit reached, degrading to error type");
        return TypeId::ERROR;
    }
    env.evaluation_depth.set(depth + 1);
    let result = f();
    env.evaluation_depth.set(depth);
    result
}

/// Resolve alias applications and deferred forms whose inputs became
/// concrete. Anything else is returned unchanged.
pub fn evaluate_type(env: &TypeEnvironment, type_id: TypeId) -> TypeId {
    let interner = env.interner();
    let Some(data) = interner.lookup(type_id) else {
        return type_id;
    };
    let deferred = matches!(
        data,
        TypeData::Application(_)
            | TypeData::Conditional(_)
            | TypeData::IndexAccess(..)
            | TypeData::KeyOf(_)
            | TypeData::Mapped(_)
    );
    if !deferred {
        return type_id;
    }
    let query_id = query_trace::enabled().then(query_trace::next_query_id);
    if let Some(id) = query_id {
        query_trace::unary_start(id, "evaluate", type_id);
    }
    if let Some(&cached) = env.evaluation_cache.borrow().get(&type_id) {
        if let Some(id) = query_id {
            query_trace::unary_end(id, "evaluate", cached, true);
        }
        return cached;
    }

    let limit_hits = env.stats().evaluation_limit_hits;
    let result = with_depth(env, "evaluate", || match data {
        TypeData::Application(app_id) => match env.expand_alias(app_id) {
            Some(expanded) if expanded != type_id => evaluate_type(env, expanded),
            _ => type_id,
        },
        TypeData::Conditional(cond_id) => match interner.conditional_type(cond_id) {
            Some(cond) => get_conditional_type(env, cond),
            None => type_id,
        },
        TypeData::IndexAccess(object, index) => get_indexed_access_type(env, object, index),
        TypeData::KeyOf(operand) => get_keyof_type(env, operand),
        TypeData::Mapped(mapped_id) => match interner.mapped_type(mapped_id) {
            Some(mapped) => get_mapped_type(env, mapped),
            None => type_id,
        },
        _ => type_id,
    });

    // Alias expansion may still be in progress; only settle stable answers.
    let settled = match data {
        TypeData::Application(_) => result != type_id,
        _ => true,
    };
    if settled && env.stats().evaluation_limit_hits == limit_hits {
        env.evaluation_cache.borrow_mut().insert(type_id, result);
    }
    if let Some(id) = query_id {
        query_trace::unary_end(id, "evaluate", result, false);
    }
    result
}

// =============================================================================
// Conditional types
// =============================================================================

/// `check extends extends ? true : false`
pub fn get_conditional_type(env: &TypeEnvironment, cond: ConditionalType) -> TypeId {
    let interner = env.interner();
    if interner.contains_type_params(cond.check_type) || interner.contains_type_params(cond.extends_type) {
        return interner.conditional(cond);
    }
    if cond.is_distributive && cond.check_type == TypeId::NEVER {
        return TypeId::NEVER;
    }
    if cond.check_type == TypeId::ANY {
        return interner.union2(cond.true_type, cond.false_type);
    }
    with_depth(env, "conditional", || {
        let check = evaluate_type(env, cond.check_type);
        let extends = evaluate_type(env, cond.extends_type);
        let taken = if is_type_assignable_to(env, check, extends) {
            cond.true_type
        } else {
            cond.false_type
        };
        trace!(
            check = check.0,
            extends = extends.0,
            result = taken.0,
            "resolved conditional type"
        );
        evaluate_type(env, taken)
    })
}

// =============================================================================
// Indexed access
// =============================================================================

fn add_undefined(env: &TypeEnvironment, type_id: TypeId) -> TypeId {
    if env.options().strict_null_checks {
        env.interner().union2(type_id, TypeId::UNDEFINED)
    } else {
        type_id
    }
}

fn unchecked_index_result(env: &TypeEnvironment, type_id: TypeId) -> TypeId {
    if env.options().no_unchecked_indexed_access {
        add_undefined(env, type_id)
    } else {
        type_id
    }
}

/// The property name a literal index type denotes.
pub(crate) fn property_name_of_literal(env: &TypeEnvironment, index: TypeId) -> Option<Rc<str>> {
    let interner = env.interner();
    let literal = match interner.lookup(index)? {
        TypeData::Literal(value) => value,
        TypeData::EnumLiteral(_, value) => interner.literal_value(value)?,
        _ => return None,
    };
    match literal {
        LiteralValue::String(atom) => Some(interner.resolve_atom(atom)),
        LiteralValue::Number(OrderedFloat(n)) => Some(Rc::from(format_number_key(n))),
        LiteralValue::Boolean(_) | LiteralValue::BigInt(_) => None,
    }
}

/// Property-name spelling of a number (`1`, `1.5`, `NaN`).
pub(crate) fn format_number_key(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else {
        format!("{n}")
    }
}

pub(crate) fn is_numeric_name(name: &str) -> bool {
    name.parse::<f64>()
        .map(|n| format_number_key(n) == name)
        .unwrap_or(false)
}

/// `object[index]`
pub fn get_indexed_access_type(env: &TypeEnvironment, object: TypeId, index: TypeId) -> TypeId {
    let interner = env.interner();
    if object.is_error() || index.is_error() {
        return TypeId::ERROR;
    }
    if interner.contains_type_params(object) || interner.contains_type_params(index) {
        return interner.index_access(object, index);
    }
    if object == TypeId::ANY {
        return TypeId::ANY;
    }
    if let Some(members) = interner.union_members(index) {
        let results = members
            .iter()
            .map(|&m| get_indexed_access_type(env, object, m))
            .collect();
        return interner.union(results);
    }
    with_depth(env, "indexed access", || {
        let object = evaluate_type(env, object);
        if let Some(members) = interner.union_members(object) {
            let results = members
                .iter()
                .map(|&m| get_indexed_access_type(env, m, index))
                .collect();
            return interner.union(results);
        }
        resolve_indexed_access(env, object, index).unwrap_or(TypeId::ERROR)
    })
}

fn resolve_indexed_access(env: &TypeEnvironment, object: TypeId, index: TypeId) -> Option<TypeId> {
    let interner = env.interner();
    match interner.lookup(object)? {
        TypeData::Array(element) => {
            if index == TypeId::NUMBER || is_number_like_literal(env, index) {
                return Some(unchecked_index_result(env, element));
            }
        }
        TypeData::Tuple(list) => {
            let elements = interner.tuple_list(list);
            if let Some(name) = property_name_of_literal(env, index) {
                if let Ok(position) = name.parse::<usize>() {
                    if let Some(element) = elements.get(position).filter(|e| !e.rest) {
                        return Some(if element.optional {
                            add_undefined(env, element.type_id)
                        } else {
                            element.type_id
                        });
                    }
                }
            }
            if index == TypeId::NUMBER {
                let members = elements
                    .iter()
                    .map(|e| tuple_element_value(env, e))
                    .collect();
                return Some(interner.union(members));
            }
        }
        _ => {}
    }

    if let Some(name) = property_name_of_literal(env, index) {
        if let Some(prop) = env.get_property_of_type(object, &name) {
            return Some(if prop.optional {
                add_undefined(env, prop.type_id)
            } else {
                prop.type_id
            });
        }
    }

    let shape = env.resolve_shape(object)?;
    let numeric = index == TypeId::NUMBER
        || property_name_of_literal(env, index).is_some_and(|name| is_numeric_name(&name));
    if numeric {
        if let Some(info) = shape.number_index.or(shape.string_index) {
            return Some(unchecked_index_result(env, info.value_type));
        }
    }
    let string_like = index == TypeId::STRING
        || matches!(
            interner.literal_value(index),
            Some(LiteralValue::String(_))
        );
    if string_like {
        if let Some(info) = shape.string_index {
            return Some(unchecked_index_result(env, info.value_type));
        }
    }
    None
}

fn is_number_like_literal(env: &TypeEnvironment, index: TypeId) -> bool {
    matches!(
        env.interner().widened_literal_primitive(index),
        Some(TypeId::NUMBER)
    )
}

/// The element type a tuple element contributes when read by `number`.
pub(crate) fn tuple_element_value(env: &TypeEnvironment, element: &TupleElement) -> TypeId {
    if element.rest {
        match env.interner().lookup(element.type_id) {
            Some(TypeData::Array(inner)) => inner,
            _ => element.type_id,
        }
    } else if element.optional {
        add_undefined(env, element.type_id)
    } else {
        element.type_id
    }
}

// =============================================================================
// keyof
// =============================================================================

fn property_key_type(env: &TypeEnvironment, name: &str) -> TypeId {
    env.interner().literal_string(name)
}

/// `keyof operand`
pub fn get_keyof_type(env: &TypeEnvironment, operand: TypeId) -> TypeId {
    let interner = env.interner();
    if interner.contains_type_params(operand) {
        return interner.keyof(operand);
    }
    match operand {
        TypeId::ANY => {
            return interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL]);
        }
        TypeId::ERROR => return TypeId::ERROR,
        TypeId::NEVER => {
            return interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL]);
        }
        _ => {}
    }
    with_depth(env, "keyof", || {
        let operand = evaluate_type(env, operand);
        match interner.lookup(operand) {
            Some(TypeData::Union(list)) => {
                let keys = interner
                    .type_list(list)
                    .iter()
                    .map(|&m| get_keyof_type(env, m))
                    .collect();
                return interner.intersection(keys);
            }
            Some(TypeData::Intersection(list)) => {
                let keys = interner
                    .type_list(list)
                    .iter()
                    .map(|&m| get_keyof_type(env, m))
                    .collect();
                return interner.union(keys);
            }
            Some(TypeData::Array(_)) => {
                return interner.union(vec![TypeId::NUMBER, property_key_type(env, "length")]);
            }
            Some(TypeData::Tuple(list)) => {
                let count = interner.tuple_list(list).iter().filter(|e| !e.rest).count();
                let mut keys: Vec<TypeId> = (0..count)
                    .map(|i| property_key_type(env, &i.to_string()))
                    .collect();
                keys.push(TypeId::NUMBER);
                keys.push(property_key_type(env, "length"));
                return interner.union(keys);
            }
            _ => {}
        }
        let Some(shape) = env.resolve_shape(operand) else {
            return TypeId::NEVER;
        };
        let mut keys: Vec<TypeId> = shape
            .properties
            .iter()
            .map(|p| {
                let name = interner.resolve_atom(p.name);
                property_key_type(env, &name)
            })
            .collect();
        if shape.string_index.is_some() {
            keys.push(TypeId::STRING);
            keys.push(TypeId::NUMBER);
        } else if shape.number_index.is_some() {
            keys.push(TypeId::NUMBER);
        }
        interner.union(keys)
    })
}

// =============================================================================
// Mapped types
// =============================================================================

fn apply_modifier(modifier: MappedModifier, inherited: bool) -> bool {
    match modifier {
        MappedModifier::Add => true,
        MappedModifier::Remove => false,
        MappedModifier::None => inherited,
    }
}

fn remove_undefined(env: &TypeEnvironment, type_id: TypeId) -> TypeId {
    let interner = env.interner();
    match interner.union_members(type_id) {
        Some(members) => interner.union(
            members
                .iter()
                .copied()
                .filter(|&m| m != TypeId::UNDEFINED)
                .collect(),
        ),
        None => type_id,
    }
}

/// `{ [P in constraint]: template }`
///
/// A constraint of the form `keyof S` makes the mapped type homomorphic: the
/// modifiers of the properties of `S` carry over unless overridden.
pub fn get_mapped_type(env: &TypeEnvironment, mapped: MappedType) -> TypeId {
    let interner = env.interner();
    if interner.contains_type_params(mapped.constraint) {
        return interner.mapped(mapped);
    }
    with_depth(env, "mapped", || {
        let homomorphic_source = match interner.lookup(mapped.constraint) {
            Some(TypeData::KeyOf(source)) => Some(source),
            _ => None,
        };
        let keys = match homomorphic_source {
            Some(source) => get_keyof_type(env, source),
            None => evaluate_type(env, mapped.constraint),
        };
        let source_shape = homomorphic_source.and_then(|s| env.resolve_shape(s));

        let mut shape = ObjectShape {
            flags: ObjectFlags::ANONYMOUS | ObjectFlags::MAPPED,
            ..ObjectShape::anonymous()
        };
        for &key in interner.members(keys).iter() {
            if key == TypeId::NEVER {
                continue;
            }
            let value = instantiate_type(env, mapped.template, &TypeMapper::single(mapped.type_param, key));
            if key == TypeId::STRING {
                shape.string_index = Some(IndexInfo {
                    key_type: TypeId::STRING,
                    value_type: value,
                    readonly: apply_modifier(mapped.readonly_modifier, false),
                });
                continue;
            }
            if key == TypeId::NUMBER {
                shape.number_index = Some(IndexInfo {
                    key_type: TypeId::NUMBER,
                    value_type: value,
                    readonly: apply_modifier(mapped.readonly_modifier, false),
                });
                continue;
            }
            let Some(name) = property_name_of_literal(env, key) else {
                continue;
            };
            let atom = interner.intern_string(&name);
            let inherited = source_shape
                .as_ref()
                .and_then(|s| s.find_property(atom).copied());
            let optional = apply_modifier(
                mapped.optional_modifier,
                inherited.is_some_and(|p| p.optional),
            );
            let readonly = apply_modifier(
                mapped.readonly_modifier,
                inherited.is_some_and(|p| p.readonly),
            );
            let value = if mapped.optional_modifier == MappedModifier::Remove {
                remove_undefined(env, value)
            } else {
                value
            };
            shape.properties.push(PropertyInfo {
                name: atom,
                type_id: value,
                optional,
                readonly,
                is_method: false,
                symbol: inherited.map_or(SymbolId::NONE, |p| p.symbol),
            });
        }
        interner.object(shape)
    })
}

#[cfg(test)]
#[path = "../tests/evaluate_tests.rs"]
mod tests;
