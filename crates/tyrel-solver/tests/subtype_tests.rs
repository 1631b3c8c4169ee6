use super::*;
use tyrel_binder::{
    DeclarationArena, EnumInitializer, KeywordKind, NodeIndex, ParameterNode, SignatureNode, SymbolId, TypeNode,
    TupleElementNode, TypeMemberNode,
};
use tyrel_common::options::CheckerOptions;

fn strict_env() -> TypeEnvironment {
    TypeEnvironment::new(CheckerOptions::strict())
}

fn lower(env: &TypeEnvironment, node: TypeNode) -> TypeId {
    env.get_type_from_type_node(&node, NodeIndex::NONE)
}

fn literal_object(members: Vec<(&str, TypeNode, bool)>) -> TypeNode {
    TypeNode::TypeLiteral(
        members
            .into_iter()
            .map(|(name, ty, optional)| TypeMemberNode::Property {
                name: name.to_string(),
                ty,
                optional,
                readonly: false,
            })
            .collect(),
    )
}

fn function(params: Vec<TypeNode>, ret: TypeNode) -> TypeNode {
    let params = params
        .into_iter()
        .enumerate()
        .map(|(i, ty)| ParameterNode::new(&format!("p{i}"), ty))
        .collect();
    TypeNode::Function(SignatureNode::new(params, ret))
}

fn tuple(elements: Vec<TypeNode>) -> TypeNode {
    TypeNode::Tuple(
        elements
            .into_iter()
            .map(|ty| TupleElementNode {
                ty,
                optional: false,
                rest: false,
            })
            .collect(),
    )
}

#[test]
fn test_top_and_bottom_types() {
    let env = strict_env();
    assert!(is_type_assignable_to(&env, TypeId::STRING, TypeId::UNKNOWN));
    assert!(is_type_assignable_to(&env, TypeId::NEVER, TypeId::STRING));
    assert!(is_type_assignable_to(&env, TypeId::ANY, TypeId::STRING));
    assert!(!is_type_subtype_of(&env, TypeId::ANY, TypeId::STRING));
    assert!(!is_type_assignable_to(&env, TypeId::ANY, TypeId::NEVER));
    assert!(!is_type_assignable_to(&env, TypeId::UNKNOWN, TypeId::STRING));
    assert!(is_type_comparable_to(&env, TypeId::UNKNOWN, TypeId::STRING));
    assert!(!is_type_assignable_to(&env, TypeId::STRING, TypeId::NEVER));
    assert!(is_type_assignable_to(&env, TypeId::ERROR, TypeId::NEVER));
}

#[test]
fn test_relations_are_reflexive() {
    let env = strict_env();
    let object = lower(&env, literal_object(vec![("x", TypeNode::number(), false)]));
    for type_id in [TypeId::STRING, TypeId::UNDEFINED, object] {
        for relation in [
            RelationKind::Identity,
            RelationKind::Subtype,
            RelationKind::Assignable,
            RelationKind::Comparable,
        ] {
            assert!(is_type_related_to(&env, type_id, type_id, relation));
        }
    }
}

#[test]
fn test_literals_and_primitives() {
    let env = strict_env();
    let a = env.interner().literal_string("a");
    assert!(is_type_subtype_of(&env, a, TypeId::STRING));
    assert!(is_type_assignable_to(&env, a, TypeId::STRING));
    assert!(!is_type_assignable_to(&env, TypeId::STRING, a));
    assert!(is_type_comparable_to(&env, TypeId::STRING, a));
    assert!(!is_type_assignable_to(&env, a, TypeId::NUMBER));
    assert!(is_type_assignable_to(&env, TypeId::BOOLEAN_TRUE, TypeId::BOOLEAN));
}

#[test]
fn test_null_and_undefined_follow_strictness() {
    let strict = strict_env();
    assert!(!is_type_assignable_to(&strict, TypeId::UNDEFINED, TypeId::STRING));
    assert!(!is_type_assignable_to(&strict, TypeId::NULL, TypeId::UNDEFINED));
    assert!(is_type_assignable_to(&strict, TypeId::UNDEFINED, TypeId::VOID));

    let loose = TypeEnvironment::new(CheckerOptions::default());
    assert!(is_type_assignable_to(&loose, TypeId::UNDEFINED, TypeId::STRING));
    assert!(is_type_assignable_to(&loose, TypeId::NULL, TypeId::NUMBER));
}

#[test]
fn test_unions_distribute() {
    let env = strict_env();
    let interner = env.interner();
    let a_or_b = interner.union2(interner.literal_string("a"), interner.literal_string("b"));
    assert!(is_type_assignable_to(&env, a_or_b, TypeId::STRING));
    let string_or_number = interner.union2(TypeId::STRING, TypeId::NUMBER);
    assert!(!is_type_assignable_to(&env, string_or_number, TypeId::STRING));
    assert!(is_type_assignable_to(&env, TypeId::NUMBER, string_or_number));
    assert!(is_type_comparable_to(&env, string_or_number, TypeId::STRING));
}

#[test]
fn test_object_width_and_optionality() {
    let env = strict_env();
    let point = lower(
        &env,
        literal_object(vec![("x", TypeNode::number(), false), ("y", TypeNode::number(), false)]),
    );
    let x_only = lower(&env, literal_object(vec![("x", TypeNode::number(), false)]));
    let optional_z = lower(
        &env,
        literal_object(vec![("x", TypeNode::number(), false), ("z", TypeNode::string(), true)]),
    );
    let optional_x = lower(&env, literal_object(vec![("x", TypeNode::number(), true)]));

    assert!(is_type_assignable_to(&env, point, x_only));
    assert!(!is_type_assignable_to(&env, x_only, point));
    assert!(is_type_assignable_to(&env, point, optional_z));
    assert!(!is_type_assignable_to(&env, optional_x, x_only));
    assert!(is_type_comparable_to(&env, optional_x, x_only));
}

#[test]
fn test_object_keyword_and_empty_object() {
    let env = strict_env();
    let point = lower(&env, literal_object(vec![("x", TypeNode::number(), false)]));
    let empty = lower(&env, TypeNode::TypeLiteral(vec![]));

    assert!(is_type_assignable_to(&env, point, TypeId::OBJECT));
    assert!(!is_type_assignable_to(&env, TypeId::STRING, TypeId::OBJECT));
    assert!(is_type_assignable_to(&env, TypeId::STRING, empty));
    assert!(!is_type_assignable_to(&env, TypeId::STRING, point));
    assert!(is_type_assignable_to(&env, TypeId::OBJECT, empty));
}

#[test]
fn test_implicit_index_signature_only_for_anonymous_shapes() {
    let mut arena = DeclarationArena::new();
    let a = arena.property("a", TypeNode::number());
    arena.interface("Named", vec![], vec![], vec![a]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());

    let dictionary = lower(
        &env,
        TypeNode::TypeLiteral(vec![TypeMemberNode::Index {
            parameter_name: "key".to_string(),
            key: TypeNode::string(),
            ty: TypeNode::number(),
            readonly: false,
        }]),
    );
    let anonymous = lower(&env, literal_object(vec![("a", TypeNode::number(), false)]));
    let named = lower(&env, TypeNode::named("Named"));
    let wrong_value = lower(&env, literal_object(vec![("a", TypeNode::string(), false)]));

    assert!(is_type_assignable_to(&env, anonymous, dictionary));
    assert!(!is_type_assignable_to(&env, named, dictionary));
    assert!(!is_type_assignable_to(&env, wrong_value, dictionary));
}

#[test]
fn test_function_parameters() {
    let wide = || function(vec![TypeNode::union(vec![TypeNode::number(), TypeNode::string()])], TypeNode::keyword(KeywordKind::Void));
    let narrow = || function(vec![TypeNode::number()], TypeNode::keyword(KeywordKind::Void));

    let strict = strict_env();
    let (w, n) = (lower(&strict, wide()), lower(&strict, narrow()));
    assert!(is_type_assignable_to(&strict, w, n));
    assert!(!is_type_assignable_to(&strict, n, w));

    let loose = TypeEnvironment::new(CheckerOptions::default());
    let (w, n) = (lower(&loose, wide()), lower(&loose, narrow()));
    assert!(is_type_assignable_to(&loose, n, w));
    assert!(!is_type_subtype_of(&loose, n, w));
}

#[test]
fn test_function_arity_and_return() {
    let env = strict_env();
    let nullary = lower(&env, function(vec![], TypeNode::number()));
    let unary = lower(&env, function(vec![TypeNode::number()], TypeNode::number()));
    let returns_void = lower(&env, function(vec![], TypeNode::keyword(KeywordKind::Void)));
    let returns_string = lower(&env, function(vec![], TypeNode::string()));

    assert!(is_type_assignable_to(&env, nullary, unary));
    assert!(!is_type_assignable_to(&env, unary, nullary));
    assert!(is_type_assignable_to(&env, nullary, returns_void));
    assert!(!is_type_assignable_to(&env, nullary, returns_string));
    assert!(!is_type_assignable_to(&env, TypeId::STRING, nullary));
}

#[test]
fn test_arrays_and_tuples() {
    let env = strict_env();
    let pair = lower(&env, tuple(vec![TypeNode::string(), TypeNode::number()]));
    let single = lower(&env, tuple(vec![TypeNode::string()]));
    let mixed_array = lower(
        &env,
        TypeNode::array(TypeNode::union(vec![TypeNode::string(), TypeNode::number()])),
    );
    let strings = lower(&env, TypeNode::array(TypeNode::string()));
    let literals = lower(&env, TypeNode::array(TypeNode::string_literal("a")));

    assert!(is_type_assignable_to(&env, pair, mixed_array));
    assert!(!is_type_assignable_to(&env, strings, single));
    assert!(!is_type_assignable_to(&env, single, pair));
    assert!(!is_type_assignable_to(&env, pair, single));
    assert!(is_type_assignable_to(&env, literals, strings));
    assert!(!is_type_assignable_to(&env, strings, literals));
}

#[test]
fn test_recursive_interfaces_relate_coinductively() {
    let mut arena = DeclarationArena::new();
    for (name, value) in [("ListA", TypeNode::number()), ("ListB", TypeNode::number()), ("ListC", TypeNode::string())] {
        let v = arena.property("value", value);
        let next = arena.property("next", TypeNode::named(name));
        arena.interface(name, vec![], vec![], vec![v, next]);
    }
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let a = lower(&env, TypeNode::named("ListA"));
    let b = lower(&env, TypeNode::named("ListB"));
    let c = lower(&env, TypeNode::named("ListC"));

    assert!(is_type_assignable_to(&env, a, b));
    assert!(is_type_assignable_to(&env, b, a));
    assert!(is_type_identical_to(&env, a, b));
    assert!(!is_type_assignable_to(&env, a, c));
    assert_eq!(env.stats().depth_limit_hits, 0);
}

#[test]
fn test_generic_references_compare_arguments() {
    let mut arena = DeclarationArena::new();
    let t = arena.type_parameter("T", None, None);
    let value = arena.property("value", TypeNode::named("T"));
    arena.interface("Box", vec![t], vec![], vec![value]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());

    let box_a = lower(&env, TypeNode::reference("Box", vec![TypeNode::string_literal("a")]));
    let box_string = lower(&env, TypeNode::reference("Box", vec![TypeNode::string()]));
    assert!(is_type_assignable_to(&env, box_a, box_string));
    assert!(!is_type_assignable_to(&env, box_string, box_a));

    let structural = lower(&env, literal_object(vec![("value", TypeNode::string(), false)]));
    assert!(is_type_assignable_to(&env, box_a, structural));
    assert!(is_type_assignable_to(&env, structural, box_string));
}

#[test]
fn test_type_parameters_relate_through_constraints() {
    let env = strict_env();
    let interner = env.interner();
    let t = interner.fresh_type_param(interner.intern_string("T"), SymbolId::NONE);
    interner
        .set_type_param_constraint(t, Some(TypeId::STRING), None)
        .expect("first constraint");
    let u = interner.fresh_type_param(interner.intern_string("U"), SymbolId::NONE);
    let (t, u) = (interner.type_param_type(t), interner.type_param_type(u));

    assert!(is_type_assignable_to(&env, t, TypeId::STRING));
    assert!(!is_type_assignable_to(&env, t, interner.literal_string("a")));
    assert!(!is_type_assignable_to(&env, u, TypeId::STRING));
    assert!(is_type_assignable_to(&env, u, TypeId::UNKNOWN));
    assert!(!is_type_assignable_to(&env, TypeId::STRING, t));
}

#[test]
fn test_intersections() {
    let env = strict_env();
    let x = lower(&env, literal_object(vec![("x", TypeNode::number(), false)]));
    let y = lower(&env, literal_object(vec![("y", TypeNode::number(), false)]));
    let both = env.interner().intersection(vec![x, y]);
    let point = lower(
        &env,
        literal_object(vec![("x", TypeNode::number(), false), ("y", TypeNode::number(), false)]),
    );

    assert!(is_type_assignable_to(&env, point, both));
    assert!(is_type_assignable_to(&env, both, x));
    assert!(is_type_assignable_to(&env, both, point));
    assert!(!is_type_assignable_to(&env, x, both));
}

#[test]
fn test_numeric_enum_members() {
    let mut arena = DeclarationArena::new();
    let a = arena.enum_member("A", Some(EnumInitializer::Number(1.0)));
    arena.enum_declaration("E", vec![a]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let member = lower(&env, TypeNode::qualified(&["E", "A"], vec![]));
    let one = env.interner().literal_number(1.0);

    assert!(is_type_assignable_to(&env, member, TypeId::NUMBER));
    assert!(is_type_assignable_to(&env, member, one));
    assert!(is_type_assignable_to(&env, one, member));
    assert!(!is_type_subtype_of(&env, one, member));
}

#[test]
fn test_answers_are_cached() {
    let env = strict_env();
    let point = lower(&env, literal_object(vec![("x", TypeNode::number(), false)]));
    let target = lower(&env, literal_object(vec![("x", TypeNode::number(), true)]));

    assert!(is_type_assignable_to(&env, point, target));
    let hits = env.stats().relation_cache_hits;
    assert!(is_type_assignable_to(&env, point, target));
    assert!(env.stats().relation_cache_hits > hits);
    assert_eq!(env.stats().relation_queries, 2);
}

#[test]
fn test_checker_result_helpers() {
    assert!(SubtypeResult::CycleDetected.is_true());
    assert!(SubtypeResult::DepthExceeded.is_false());
    assert_eq!(SubtypeResult::from_bool(false), SubtypeResult::False);

    let env = strict_env();
    let mut checker = SubtypeChecker::new(&env, RelationKind::Assignable);
    assert_eq!(
        checker.check_subtype(TypeId::BOOLEAN_FALSE, TypeId::BOOLEAN),
        SubtypeResult::True
    );
    assert!(!checker.hit_depth_limit());
}
