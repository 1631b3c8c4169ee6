//! Primitive, literal and enum rules, and the `object` keyword.

use crate::subtype::{SubtypeChecker, SubtypeResult};
use crate::types::*;

/// How a type takes part in the primitive table.
#[derive(Clone, Copy, PartialEq, Eq)]
enum PrimitiveClass {
    /// string, number, boolean, bigint, symbol and their literals.
    Value,
    /// void, undefined, null.
    Unit,
    /// The `object` keyword.
    ObjectKeyword,
    /// Objects, arrays, tuples and references.
    Structured,
}

impl<'a> SubtypeChecker<'a> {
    fn primitive_class(&self, type_id: TypeId) -> Option<PrimitiveClass> {
        let class = match self.env.interner().lookup(type_id)? {
            TypeData::Intrinsic(kind) => match kind {
                IntrinsicKind::Void | IntrinsicKind::Undefined | IntrinsicKind::Null => PrimitiveClass::Unit,
                IntrinsicKind::Object => PrimitiveClass::ObjectKeyword,
                IntrinsicKind::Boolean
                | IntrinsicKind::Number
                | IntrinsicKind::String
                | IntrinsicKind::Bigint
                | IntrinsicKind::Symbol => PrimitiveClass::Value,
                _ => return None,
            },
            TypeData::Literal(_) | TypeData::EnumLiteral(..) => PrimitiveClass::Value,
            TypeData::Object(_) | TypeData::Array(_) | TypeData::Tuple(_) | TypeData::Application(_) => {
                PrimitiveClass::Structured
            }
            _ => return None,
        };
        Some(class)
    }

    /// Decide pairs where at least one side is primitive or `object`.
    /// `None` means both sides are structured.
    pub(crate) fn check_primitive_pair(&mut self, source: TypeId, target: TypeId) -> Option<SubtypeResult> {
        let source_class = self.primitive_class(source)?;
        let target_class = self.primitive_class(target)?;
        use PrimitiveClass::*;
        let related = match (source_class, target_class) {
            (Structured, Structured) => return None,
            (Structured, ObjectKeyword) => true,
            (Structured, Value | Unit) => false,
            (Value | Unit, Value | Unit) => self.primitive_related(source, target),
            (Value | Unit | ObjectKeyword, ObjectKeyword) => false,
            (ObjectKeyword, Value | Unit) => false,
            (Unit, Structured) => false,
            (Value | ObjectKeyword, Structured) => self.accepts_any_value(target),
        };
        Some(SubtypeResult::from_bool(related))
    }

    fn primitive_related(&self, source: TypeId, target: TypeId) -> bool {
        let interner = self.env.interner();
        let assignable_like = matches!(
            self.relation,
            RelationKind::Assignable | RelationKind::Comparable
        );
        match interner.lookup(source) {
            Some(TypeData::Literal(value)) => {
                if target == value.primitive() {
                    return true;
                }
                // A number literal relates to the numeric enum member with that value.
                matches!(
                    interner.lookup(target),
                    Some(TypeData::EnumLiteral(_, member_value)) if assignable_like && member_value == source
                )
            }
            Some(TypeData::EnumLiteral(_, value)) => {
                target == value || interner.widened_literal_primitive(source) == Some(target)
            }
            Some(TypeData::Intrinsic(IntrinsicKind::Undefined)) => target == TypeId::VOID,
            _ => {
                // Under comparability a primitive is comparable to its own literals.
                self.relation == RelationKind::Comparable
                    && interner.widened_literal_primitive(target) == Some(source)
            }
        }
    }

    /// A structured target every primitive value satisfies: no required
    /// properties, no signatures, no index signatures.
    fn accepts_any_value(&self, target: TypeId) -> bool {
        if !matches!(self.env.interner().lookup(target), Some(TypeData::Object(_) | TypeData::Application(_))) {
            return false;
        }
        let Some(shape) = self.env.resolve_shape(target) else {
            return false;
        };
        shape.properties.iter().all(|p| p.optional)
            && shape.call_signatures.is_empty()
            && shape.construct_signatures.is_empty()
            && shape.string_index.is_none()
            && shape.number_index.is_none()
    }
}
