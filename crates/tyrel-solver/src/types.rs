//! Type representation.
//!
//! Types are interned: a `TypeId` is a dense `u32` handle into the
//! `TypeInterner`, and two types are the same type exactly when their ids are
//! equal. `TypeData` is the structural key that is hash-consed into an id;
//! every payload that does not fit in a `Copy` key (member lists, shapes,
//! applications) is interned separately and referenced by its own id.

use bitflags::bitflags;
use serde::Serialize;
use std::hash::{Hash, Hasher};
use tyrel_binder::{NodeIndex, SymbolId};
use tyrel_common::interner::Atom;

// =============================================================================
// Type ids
// =============================================================================

/// Handle of an interned type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Sentinel for "no type"; never produced by lowering.
    pub const NONE: TypeId = TypeId(0);
    /// The error type. Relates like `any` so one error does not cascade.
    pub const ERROR: TypeId = TypeId(1);
    pub const NEVER: TypeId = TypeId(2);
    pub const UNKNOWN: TypeId = TypeId(3);
    pub const ANY: TypeId = TypeId(4);
    pub const VOID: TypeId = TypeId(5);
    pub const UNDEFINED: TypeId = TypeId(6);
    pub const NULL: TypeId = TypeId(7);
    pub const BOOLEAN: TypeId = TypeId(8);
    pub const NUMBER: TypeId = TypeId(9);
    pub const STRING: TypeId = TypeId(10);
    pub const BIGINT: TypeId = TypeId(11);
    pub const SYMBOL: TypeId = TypeId(12);
    /// The `object` keyword (any non-primitive).
    pub const OBJECT: TypeId = TypeId(13);
    pub const BOOLEAN_TRUE: TypeId = TypeId(14);
    pub const BOOLEAN_FALSE: TypeId = TypeId(15);

    /// First id handed out to a non-builtin type.
    pub const FIRST_USER: u32 = 16;

    #[inline]
    pub fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub fn is_any(self) -> bool {
        self == Self::ANY
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }

    #[inline]
    pub fn is_never(self) -> bool {
        self == Self::NEVER
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }

    #[inline]
    pub fn is_any_or_unknown(self) -> bool {
        self == Self::ANY || self == Self::UNKNOWN
    }

    #[inline]
    pub fn is_nullish(self) -> bool {
        self == Self::NULL || self == Self::UNDEFINED
    }
}

/// Intrinsic kinds. The discriminant of each kind is the id of its type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum IntrinsicKind {
    None = 0,
    Error = 1,
    Never = 2,
    Unknown = 3,
    Any = 4,
    Void = 5,
    Undefined = 6,
    Null = 7,
    Boolean = 8,
    Number = 9,
    String = 10,
    Bigint = 11,
    Symbol = 12,
    Object = 13,
}

impl IntrinsicKind {
    pub const ALL: [IntrinsicKind; 14] = [
        IntrinsicKind::None,
        IntrinsicKind::Error,
        IntrinsicKind::Never,
        IntrinsicKind::Unknown,
        IntrinsicKind::Any,
        IntrinsicKind::Void,
        IntrinsicKind::Undefined,
        IntrinsicKind::Null,
        IntrinsicKind::Boolean,
        IntrinsicKind::Number,
        IntrinsicKind::String,
        IntrinsicKind::Bigint,
        IntrinsicKind::Symbol,
        IntrinsicKind::Object,
    ];

    #[inline]
    pub fn type_id(self) -> TypeId {
        TypeId(self as u32)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntrinsicKind::None => "none",
            IntrinsicKind::Error => "error",
            IntrinsicKind::Never => "never",
            IntrinsicKind::Unknown => "unknown",
            IntrinsicKind::Any => "any",
            IntrinsicKind::Void => "void",
            IntrinsicKind::Undefined => "undefined",
            IntrinsicKind::Null => "null",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Number => "number",
            IntrinsicKind::String => "string",
            IntrinsicKind::Bigint => "bigint",
            IntrinsicKind::Symbol => "symbol",
            IntrinsicKind::Object => "object",
        }
    }
}

// =============================================================================
// Literals
// =============================================================================

/// `f64` with bitwise equality so number literals can be hash-consed.
///
/// `-0.0` is normalized to `0.0` and every NaN to one canonical NaN.
#[derive(Clone, Copy, Debug)]
pub struct OrderedFloat(pub f64);

impl OrderedFloat {
    fn canonical_bits(self) -> u64 {
        if self.0 == 0.0 {
            0.0f64.to_bits()
        } else if self.0.is_nan() {
            f64::NAN.to_bits()
        } else {
            self.0.to_bits()
        }
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(Atom),
    Number(OrderedFloat),
    Boolean(bool),
    /// Digits without the trailing `n`.
    BigInt(Atom),
}

impl LiteralValue {
    /// The primitive this literal widens to.
    pub fn primitive(self) -> TypeId {
        match self {
            LiteralValue::String(_) => TypeId::STRING,
            LiteralValue::Number(_) => TypeId::NUMBER,
            LiteralValue::Boolean(_) => TypeId::BOOLEAN,
            LiteralValue::BigInt(_) => TypeId::BIGINT,
        }
    }
}

// =============================================================================
// Payload ids
// =============================================================================

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

id_type!(
    /// Interned list of types (union/intersection members).
    TypeListId
);
id_type!(
    /// Interned list of tuple elements.
    TupleListId
);
id_type!(
    /// Interned object shape.
    ObjectShapeId
);
id_type!(
    /// Interned generic application.
    TypeApplicationId
);
id_type!(ConditionalTypeId);
id_type!(MappedTypeId);
id_type!(
    /// Arena index of a signature. Signatures are never deduplicated.
    SignatureId
);
id_type!(
    /// Arena index of a type parameter.
    TypeParamId
);
id_type!(
    /// Interned type mapper.
    MapperId
);

// =============================================================================
// TypeData
// =============================================================================

/// The structural key of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Literal(LiteralValue),
    /// A member of an enum: the member symbol and its literal value type.
    EnumLiteral(SymbolId, TypeId),
    Object(ObjectShapeId),
    Union(TypeListId),
    Intersection(TypeListId),
    Array(TypeId),
    Tuple(TupleListId),
    TypeParameter(TypeParamId),
    /// Reference to an interface, class or alias target with type arguments.
    /// Interface and class references stay in this form; their members are
    /// resolved on demand.
    Application(TypeApplicationId),
    Conditional(ConditionalTypeId),
    Mapped(MappedTypeId),
    /// `object[index]`, kept only while one side is generic.
    IndexAccess(TypeId, TypeId),
    /// `keyof operand`, kept only while the operand is generic.
    KeyOf(TypeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub type_id: TypeId,
    pub optional: bool,
    /// `...T[]`; `type_id` is the array type.
    pub rest: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeApplication {
    pub target: SymbolId,
    pub args: Vec<TypeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalType {
    pub check_type: TypeId,
    pub extends_type: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
    /// The check type was written as a naked type parameter.
    pub is_distributive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MappedModifier {
    None,
    Add,
    Remove,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MappedType {
    pub type_param: TypeParamId,
    pub constraint: TypeId,
    pub template: TypeId,
    pub readonly_modifier: MappedModifier,
    pub optional_modifier: MappedModifier,
}

// =============================================================================
// Objects
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: Atom,
    /// Declared type, without the `undefined` an optional property adds on read.
    pub type_id: TypeId,
    pub optional: bool,
    pub readonly: bool,
    /// Declared with method syntax; parameters compare bivariantly.
    pub is_method: bool,
    pub symbol: SymbolId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexInfo {
    pub key_type: TypeId,
    pub value_type: TypeId,
    pub readonly: bool,
}

/// Resolved members of an object type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    /// Declaring symbol; `NONE` for anonymous shapes.
    pub symbol: SymbolId,
    pub flags: ObjectFlags,
    /// Properties in declaration order (own members first, then inherited).
    pub properties: Vec<PropertyInfo>,
    pub call_signatures: Vec<SignatureId>,
    pub construct_signatures: Vec<SignatureId>,
    pub string_index: Option<IndexInfo>,
    pub number_index: Option<IndexInfo>,
}

impl ObjectShape {
    pub fn anonymous() -> Self {
        ObjectShape {
            symbol: SymbolId::NONE,
            flags: ObjectFlags::ANONYMOUS,
            properties: Vec::new(),
            call_signatures: Vec::new(),
            construct_signatures: Vec::new(),
            string_index: None,
            number_index: None,
        }
    }

    pub fn find_property(&self, name: Atom) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn signatures(&self, kind: SignatureKind) -> &[SignatureId] {
        match kind {
            SignatureKind::Call => &self.call_signatures,
            SignatureKind::Construct => &self.construct_signatures,
        }
    }

    /// No properties, signatures or index signatures: `{}`.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.call_signatures.is_empty()
            && self.construct_signatures.is_empty()
            && self.string_index.is_none()
            && self.number_index.is_none()
    }
}

// =============================================================================
// Signatures and type parameters
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureKind {
    Call,
    Construct,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub optional: bool,
    pub rest: bool,
    pub symbol: SymbolId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    /// Owning declaration; `NONE` for signatures written inside type nodes or
    /// produced by instantiation.
    pub declaration: NodeIndex,
    pub type_params: Vec<TypeParamId>,
    pub params: Vec<ParamInfo>,
    pub this_type: Option<TypeId>,
    pub return_type: TypeId,
    pub min_argument_count: usize,
    pub flags: SignatureFlags,
}

impl Signature {
    #[inline]
    pub fn has_rest(&self) -> bool {
        self.flags.contains(SignatureFlags::HAS_REST)
    }

    /// Parameters that are neither optional nor rest.
    pub fn compute_min_argument_count(params: &[ParamInfo]) -> usize {
        params
            .iter()
            .take_while(|p| !p.optional && !p.rest)
            .count()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParamInfo {
    pub name: Atom,
    /// Declaring type-parameter symbol; `NONE` for markers and inline parameters.
    pub symbol: SymbolId,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
    /// Whether `constraint`/`default` have been filled in.
    pub constraint_set: bool,
}

/// Lazily computed value with a single forward transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionState<T> {
    Unresolved,
    Resolving,
    Resolved(T),
}

impl<T> Default for ResolutionState<T> {
    fn default() -> Self {
        ResolutionState::Unresolved
    }
}

impl<T: Copy> ResolutionState<T> {
    pub fn resolved(&self) -> Option<T> {
        match self {
            ResolutionState::Resolved(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self, ResolutionState::Resolving)
    }
}

// =============================================================================
// Relation and reduction modes
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RelationKind {
    Identity,
    Subtype,
    Assignable,
    Comparable,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Identity => "identity",
            RelationKind::Subtype => "subtype",
            RelationKind::Assignable => "assignable",
            RelationKind::Comparable => "comparable",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UnionReduction {
    /// Flatten and deduplicate only.
    None,
    /// Also absorb literals into their primitive.
    #[default]
    Literal,
    /// Also drop members that are definitely subtypes of another member.
    Subtype,
}

/// Priority of an inference. Lower is better.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InferencePriority {
    /// From a directly typed argument.
    Direct,
    /// From a context-sensitive argument, inferred in the second pass.
    ContextualArgument,
    /// From the contextual type of the call into the return type.
    ReturnType,
}

// =============================================================================
// Flags
// =============================================================================

bitflags! {
    /// Classification of a type. One type may carry several flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        const ANY = 1 << 0;
        const UNKNOWN = 1 << 1;
        const STRING = 1 << 2;
        const NUMBER = 1 << 3;
        const BOOLEAN = 1 << 4;
        const ENUM = 1 << 5;
        const BIGINT = 1 << 6;
        const STRING_LITERAL = 1 << 7;
        const NUMBER_LITERAL = 1 << 8;
        const BOOLEAN_LITERAL = 1 << 9;
        const ENUM_LITERAL = 1 << 10;
        const BIGINT_LITERAL = 1 << 11;
        const SYMBOL = 1 << 12;
        const VOID = 1 << 13;
        const UNDEFINED = 1 << 14;
        const NULL = 1 << 15;
        const NEVER = 1 << 16;
        const TYPE_PARAMETER = 1 << 17;
        const OBJECT = 1 << 18;
        const UNION = 1 << 19;
        const INTERSECTION = 1 << 20;
        const INDEX = 1 << 21;
        const INDEXED_ACCESS = 1 << 22;
        const CONDITIONAL = 1 << 23;
        const NON_PRIMITIVE = 1 << 24;
        const ERROR = 1 << 25;

        const LITERAL = Self::STRING_LITERAL.bits()
            | Self::NUMBER_LITERAL.bits()
            | Self::BOOLEAN_LITERAL.bits()
            | Self::BIGINT_LITERAL.bits();
        const NULLISH = Self::UNDEFINED.bits() | Self::NULL.bits();
        const STRING_LIKE = Self::STRING.bits() | Self::STRING_LITERAL.bits();
        const NUMBER_LIKE = Self::NUMBER.bits() | Self::NUMBER_LITERAL.bits() | Self::ENUM.bits();
        const PRIMITIVE = Self::STRING.bits()
            | Self::NUMBER.bits()
            | Self::BIGINT.bits()
            | Self::BOOLEAN.bits()
            | Self::ENUM.bits()
            | Self::ENUM_LITERAL.bits()
            | Self::SYMBOL.bits()
            | Self::VOID.bits()
            | Self::UNDEFINED.bits()
            | Self::NULL.bits()
            | Self::LITERAL.bits();
        const STRUCTURED = Self::OBJECT.bits() | Self::UNION.bits() | Self::INTERSECTION.bits();
    }
}

bitflags! {
    /// Classification of object types.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u32 {
        const CLASS = 1 << 0;
        const INTERFACE = 1 << 1;
        /// A reference to a class or interface target.
        const REFERENCE = 1 << 2;
        const TUPLE = 1 << 3;
        const ANONYMOUS = 1 << 4;
        const MAPPED = 1 << 5;
        const INSTANTIATED = 1 << 6;
        const ARRAY = 1 << 7;
        /// Has call or construct signatures.
        const FUNCTION_LIKE = 1 << 8;
        /// Target declares type parameters.
        const GENERIC = 1 << 9;
        /// Value side of a class (constructor function type).
        const CONSTRUCTOR_TYPE = 1 << 10;
        const ENUM_OBJECT = 1 << 11;
        const NAMESPACE_OBJECT = 1 << 12;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SignatureFlags: u8 {
        const HAS_REST = 1 << 0;
        const CONSTRUCT = 1 << 1;
        const ABSTRACT = 1 << 2;
        const METHOD = 1 << 3;
    }
}

bitflags! {
    /// Variance of a type parameter. The empty set is invariant.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Variance: u8 {
        const COVARIANT = 1 << 0;
        const CONTRAVARIANT = 1 << 1;
        /// Unused in any position that affects the relation.
        const INDEPENDENT = 1 << 2;
        const BIVARIANT = Self::COVARIANT.bits() | Self::CONTRAVARIANT.bits();
    }
}

impl Variance {
    #[inline]
    pub fn is_invariant(self) -> bool {
        self.is_empty()
    }

    #[inline]
    pub fn is_covariant(self) -> bool {
        self == Variance::COVARIANT
    }

    #[inline]
    pub fn is_contravariant(self) -> bool {
        self == Variance::CONTRAVARIANT
    }

    #[inline]
    pub fn is_bivariant(self) -> bool {
        self == Variance::BIVARIANT
    }

    #[inline]
    pub fn is_independent(self) -> bool {
        self.contains(Variance::INDEPENDENT)
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
