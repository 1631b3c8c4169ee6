use super::*;
use tyrel_binder::{DeclarationArena, EnumInitializer, SignatureDecl};
use tyrel_common::options::CheckerOptions;

fn prop(env: &TypeEnvironment, name: &str, type_id: TypeId, optional: bool) -> PropertyInfo {
    PropertyInfo {
        name: env.interner().intern_string(name),
        type_id,
        optional,
        readonly: false,
        is_method: false,
        symbol: SymbolId::NONE,
    }
}

#[test]
fn test_primitive_and_literal_display() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    assert_eq!(type_to_string(&env, TypeId::STRING), "string");
    assert_eq!(type_to_string(&env, TypeId::ERROR), "any");
    assert_eq!(type_to_string(&env, interner.literal_string("a")), "\"a\"");
    assert_eq!(type_to_string(&env, interner.literal_number(1.5)), "1.5");
    assert_eq!(
        type_to_string(&env, interner.union2(interner.literal_string("a"), TypeId::NUMBER)),
        "number | \"a\""
    );
}

#[test]
fn test_structured_display() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let mixed = interner.array(interner.union2(TypeId::STRING, TypeId::NUMBER));
    assert_eq!(type_to_string(&env, mixed), "(number | string)[]");

    let pair = interner.tuple(vec![
        TupleElement {
            type_id: TypeId::STRING,
            optional: false,
            rest: false,
        },
        TupleElement {
            type_id: TypeId::NUMBER,
            optional: true,
            rest: false,
        },
    ]);
    assert_eq!(type_to_string(&env, pair), "[string, number?]");

    let object = interner.object_with_properties(vec![
        prop(&env, "a", TypeId::STRING, false),
        prop(&env, "b", TypeId::NUMBER, true),
    ]);
    assert_eq!(type_to_string(&env, object), "{ a: string; b?: number }");
    assert_eq!(type_to_string(&env, interner.keyof(object)), "keyof { a: string; b?: number }");
}

#[test]
fn test_function_type_display() {
    let mut arena = DeclarationArena::new();
    let t = arena.type_parameter("T", None, None);
    let x = arena.parameter("x", TypeNode::named("T"));
    let f = arena.function(
        "identity",
        SignatureDecl::generic(vec![t], vec![x], TypeNode::named("T")),
    );
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());

    let f_type = env.get_type_at_location(f);
    assert_eq!(type_to_string(&env, f_type), "<T>(x: T) => T");
    let sig = env.signature_of_declaration(f).expect("signature");
    assert_eq!(signature_to_string(&env, sig), "<T>(x: T) => T");
}

#[test]
fn test_references_use_shortest_resolving_name() {
    let mut arena = DeclarationArena::new();
    let inner = arena.interface("Inner", vec![], vec![], vec![]);
    arena.namespace("NS", vec![inner]);
    let t = arena.type_parameter("T", None, None);
    arena.interface("Box", vec![t], vec![], vec![]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());

    let inner_type = env.get_type_from_type_node(&TypeNode::qualified(&["NS", "Inner"], vec![]), NodeIndex::NONE);
    assert_eq!(type_to_string(&env, inner_type), "NS.Inner");
    let from_inside = type_to_type_node(&env, inner_type, Some(inner), TypeFormatFlags::empty());
    assert_eq!(from_inside.to_string(), "Inner");
    let qualified = type_to_type_node(&env, inner_type, Some(inner), TypeFormatFlags::USE_FULLY_QUALIFIED_TYPE);
    assert_eq!(qualified.to_string(), "NS.Inner");

    let boxed = env.get_type_from_type_node(&TypeNode::reference("Box", vec![TypeNode::string()]), NodeIndex::NONE);
    assert_eq!(type_to_string(&env, boxed), "Box<string>");
}

#[test]
fn test_enum_members_print_qualified() {
    let mut arena = DeclarationArena::new();
    let a = arena.enum_member("A", Some(EnumInitializer::Number(1.0)));
    arena.enum_declaration("E", vec![a]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());
    assert_eq!(type_to_string(&env, env.get_type_at_location(a)), "E.A");
}

#[test]
fn test_alias_references_expand_on_request() {
    let mut arena = DeclarationArena::new();
    let t = arena.type_parameter("T", None, None);
    arena.type_alias("List", vec![t], TypeNode::array(TypeNode::named("T")));
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());
    let list = env.binder().globals.get("List").expect("List");
    let application = env.interner().application(list, vec![TypeId::NUMBER]);

    assert_eq!(type_to_string(&env, application), "List<number>");
    let expanded = type_to_type_node(&env, application, None, TypeFormatFlags::EXPAND_ALIASES);
    assert_eq!(expanded.to_string(), "number[]");
}

#[test]
fn test_printed_nodes_lower_back_to_the_same_type() {
    let mut arena = DeclarationArena::new();
    let value = arena.property("value", TypeNode::number());
    arena.interface("Item", vec![], vec![], vec![value]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());
    let interner = env.interner();

    let item = env.get_type_from_type_node(&TypeNode::named("Item"), NodeIndex::NONE);
    let original = interner.union2(interner.array(item), TypeId::NULL);
    let node = type_to_type_node(&env, original, None, TypeFormatFlags::empty());
    assert_eq!(env.get_type_from_type_node(&node, NodeIndex::NONE), original);
    assert!(env.take_diagnostics().is_empty());
}
