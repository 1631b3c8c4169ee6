use super::*;
use tyrel_binder::{DeclarationArena, NodeIndex, SymbolId, TypeNode};
use tyrel_common::options::CheckerOptions;

#[test]
fn test_intrinsic_and_literal_flags() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    assert_eq!(get_type_flags(&env, TypeId::STRING), TypeFlags::STRING);
    assert_eq!(get_type_flags(&env, TypeId::OBJECT), TypeFlags::NON_PRIMITIVE);
    assert!(get_type_flags(&env, TypeId::ERROR).contains(TypeFlags::ANY | TypeFlags::ERROR));
    assert_eq!(
        get_type_flags(&env, interner.literal_string("a")),
        TypeFlags::STRING_LITERAL
    );
    assert_eq!(
        get_type_flags(&env, TypeId::BOOLEAN_TRUE),
        TypeFlags::BOOLEAN_LITERAL
    );
    assert!(get_type_flags(&env, TypeId::NONE).is_empty());
}

#[test]
fn test_structured_flags() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let array = interner.array(TypeId::NUMBER);
    assert_eq!(get_type_flags(&env, array), TypeFlags::OBJECT);
    assert_eq!(get_object_flags(&env, array), ObjectFlags::ARRAY);
    assert_eq!(
        get_type_flags(&env, interner.union2(TypeId::STRING, TypeId::NUMBER)),
        TypeFlags::UNION
    );
    let param = interner.fresh_type_param(interner.intern_string("T"), SymbolId::NONE);
    let param = interner.type_param_type(param);
    assert_eq!(get_type_flags(&env, param), TypeFlags::TYPE_PARAMETER);
    assert_eq!(get_type_flags(&env, interner.keyof(param)), TypeFlags::INDEX);
    assert!(get_object_flags(&env, TypeId::STRING).is_empty());
}

#[test]
fn test_reference_object_flags() {
    let mut arena = DeclarationArena::new();
    let t = arena.type_parameter("T", None, None);
    arena.interface("Box", vec![t], vec![], vec![]);
    arena.class("Point", vec![], None, vec![], vec![]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());
    let lower = |node: TypeNode| env.get_type_from_type_node(&node, NodeIndex::NONE);

    let box_string = lower(TypeNode::reference("Box", vec![TypeNode::string()]));
    assert_eq!(
        get_object_flags(&env, box_string),
        ObjectFlags::REFERENCE | ObjectFlags::INTERFACE | ObjectFlags::GENERIC
    );
    let point = lower(TypeNode::named("Point"));
    assert_eq!(
        get_object_flags(&env, point),
        ObjectFlags::REFERENCE | ObjectFlags::CLASS
    );
    assert_eq!(get_type_flags(&env, point), TypeFlags::OBJECT);
}

#[test]
fn test_enum_union_and_alias_application() {
    let mut arena = DeclarationArena::new();
    let a = arena.enum_member("A", None);
    let b = arena.enum_member("B", None);
    let color = arena.enum_declaration("Color", vec![a, b]);
    arena.type_alias("Name", vec![], TypeNode::string());
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());

    let enum_type = env.get_type_at_location(color);
    assert_eq!(get_type_flags(&env, enum_type), TypeFlags::UNION | TypeFlags::ENUM);
    let member = env.get_type_at_location(a);
    assert_eq!(
        get_type_flags(&env, member),
        TypeFlags::ENUM_LITERAL | TypeFlags::NUMBER_LITERAL
    );

    let alias = env.binder().globals.get("Name").expect("Name");
    let application = env.interner().application(alias, vec![]);
    assert_eq!(get_type_flags(&env, application), TypeFlags::STRING);
}

#[test]
fn test_primitive_like_and_non_primitive() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let literals = interner.union2(interner.literal_string("a"), TypeId::NULL);
    assert!(is_primitive_like(&env, literals));
    assert!(is_primitive_like(&env, TypeId::UNDEFINED));

    let array = interner.array(TypeId::STRING);
    assert!(!is_primitive_like(&env, interner.union2(TypeId::STRING, array)));
    assert!(is_non_primitive(&env, array));
    assert!(is_non_primitive(&env, TypeId::OBJECT));
    assert!(!is_non_primitive(&env, TypeId::NUMBER));
}
