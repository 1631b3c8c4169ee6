//! Flag classification of types.
//!
//! `TypeData` is the structural key; `TypeFlags` and `ObjectFlags` are the
//! "is-a" view consumers dispatch on. One type may satisfy several
//! classifications at once: a reference to a generic interface is
//! `OBJECT` with `REFERENCE | INTERFACE | GENERIC`.

use crate::env::TypeEnvironment;
use crate::types::*;
use tyrel_binder::symbol_flags;

pub fn get_type_flags(env: &TypeEnvironment, type_id: TypeId) -> TypeFlags {
    let interner = env.interner();
    let Some(data) = interner.lookup(type_id) else {
        return TypeFlags::empty();
    };
    match data {
        TypeData::Intrinsic(kind) => match kind {
            IntrinsicKind::None => TypeFlags::empty(),
            IntrinsicKind::Error => TypeFlags::ERROR | TypeFlags::ANY,
            IntrinsicKind::Never => TypeFlags::NEVER,
            IntrinsicKind::Unknown => TypeFlags::UNKNOWN,
            IntrinsicKind::Any => TypeFlags::ANY,
            IntrinsicKind::Void => TypeFlags::VOID,
            IntrinsicKind::Undefined => TypeFlags::UNDEFINED,
            IntrinsicKind::Null => TypeFlags::NULL,
            IntrinsicKind::Boolean => TypeFlags::BOOLEAN,
            IntrinsicKind::Number => TypeFlags::NUMBER,
            IntrinsicKind::String => TypeFlags::STRING,
            IntrinsicKind::Bigint => TypeFlags::BIGINT,
            IntrinsicKind::Symbol => TypeFlags::SYMBOL,
            IntrinsicKind::Object => TypeFlags::NON_PRIMITIVE,
        },
        TypeData::Literal(value) => match value {
            LiteralValue::String(_) => TypeFlags::STRING_LITERAL,
            LiteralValue::Number(_) => TypeFlags::NUMBER_LITERAL,
            LiteralValue::Boolean(_) => TypeFlags::BOOLEAN_LITERAL,
            LiteralValue::BigInt(_) => TypeFlags::BIGINT_LITERAL,
        },
        TypeData::EnumLiteral(_, value) => {
            TypeFlags::ENUM_LITERAL | get_type_flags(env, value)
        }
        TypeData::Object(_) | TypeData::Array(_) | TypeData::Tuple(_) | TypeData::Mapped(_) => TypeFlags::OBJECT,
        TypeData::Application(app_id) => {
            let is_alias = interner
                .type_application(app_id)
                .and_then(|app| env.symbol(app.target))
                .is_some_and(|s| s.has_flags(symbol_flags::TYPE_ALIAS));
            if is_alias {
                match crate::evaluate::evaluate_type(env, type_id) {
                    expanded if expanded != type_id => get_type_flags(env, expanded),
                    _ => TypeFlags::OBJECT,
                }
            } else {
                TypeFlags::OBJECT
            }
        }
        TypeData::Union(list) => {
            let members = interner.type_list(list);
            let all_enum = members
                .iter()
                .all(|&m| matches!(interner.lookup(m), Some(TypeData::EnumLiteral(..))));
            if all_enum && !members.is_empty() {
                TypeFlags::UNION | TypeFlags::ENUM
            } else {
                TypeFlags::UNION
            }
        }
        TypeData::Intersection(_) => TypeFlags::INTERSECTION,
        TypeData::TypeParameter(_) => TypeFlags::TYPE_PARAMETER,
        TypeData::Conditional(_) => TypeFlags::CONDITIONAL,
        TypeData::IndexAccess(..) => TypeFlags::INDEXED_ACCESS,
        TypeData::KeyOf(_) => TypeFlags::INDEX,
    }
}

pub fn get_object_flags(env: &TypeEnvironment, type_id: TypeId) -> ObjectFlags {
    let interner = env.interner();
    match interner.lookup(type_id) {
        Some(TypeData::Object(shape_id)) => interner.object_shape(shape_id).flags,
        Some(TypeData::Array(_)) => ObjectFlags::ARRAY,
        Some(TypeData::Tuple(_)) => ObjectFlags::TUPLE,
        Some(TypeData::Mapped(_)) => ObjectFlags::MAPPED,
        Some(TypeData::Application(app_id)) => {
            let Some(app) = interner.type_application(app_id) else {
                return ObjectFlags::empty();
            };
            let Some(sym) = env.symbol(app.target) else {
                return ObjectFlags::empty();
            };
            let mut flags = ObjectFlags::empty();
            if sym.has_flags(symbol_flags::HAS_STRUCTURE) {
                flags |= ObjectFlags::REFERENCE;
            }
            if sym.has_flags(symbol_flags::CLASS) {
                flags |= ObjectFlags::CLASS;
            }
            if sym.has_flags(symbol_flags::INTERFACE) {
                flags |= ObjectFlags::INTERFACE;
            }
            if !app.args.is_empty() {
                flags |= ObjectFlags::GENERIC;
            }
            flags
        }
        _ => ObjectFlags::empty(),
    }
}

/// Primitive-like: string, number, boolean, bigint, symbol, enum, their
/// literals, and the unit types.
pub fn is_primitive_like(env: &TypeEnvironment, type_id: TypeId) -> bool {
    let flags = get_type_flags(env, type_id);
    if flags.contains(TypeFlags::UNION) {
        return env
            .interner()
            .members(type_id)
            .iter()
            .all(|&m| is_primitive_like(env, m));
    }
    flags.intersects(TypeFlags::PRIMITIVE)
}

/// Object-like for the `object` keyword: anything that is not a primitive.
pub fn is_non_primitive(env: &TypeEnvironment, type_id: TypeId) -> bool {
    get_type_flags(env, type_id).intersects(TypeFlags::OBJECT | TypeFlags::NON_PRIMITIVE)
}

#[cfg(test)]
#[path = "../tests/type_classifier_tests.rs"]
mod tests;
