use super::*;
use tyrel_binder::{
    DeclarationArena, KeywordKind, NodeIndex, ParameterNode, SignatureDecl, SignatureNode, TypeNode, modifier_flags,
};
use tyrel_common::options::{CheckerOptions, InferenceDefault};

type TypeParamSpec<'s> = (&'s str, Option<TypeNode>, Option<TypeNode>);

fn declare(
    arena: &mut DeclarationArena,
    name: &str,
    type_params: Vec<TypeParamSpec<'_>>,
    params: Vec<(&str, TypeNode, u32)>,
    ret: TypeNode,
) -> NodeIndex {
    let type_params = type_params
        .into_iter()
        .map(|(tp, constraint, default)| arena.type_parameter(tp, constraint, default))
        .collect();
    let params = params
        .into_iter()
        .map(|(param, ty, flags)| arena.parameter_with(param, ty, flags))
        .collect();
    arena.function(name, SignatureDecl::generic(type_params, params, ret))
}

fn t() -> TypeNode {
    TypeNode::named("T")
}

fn plain(name: &str) -> TypeParamSpec<'_> {
    (name, None, None)
}

fn signature(env: &TypeEnvironment, decl: NodeIndex) -> SignatureId {
    env.signature_of_declaration(decl).expect("signature")
}

fn direct(types: &[TypeId]) -> Vec<CallArgument> {
    types.iter().map(|&t| CallArgument::new(t)).collect()
}

#[test]
fn test_infers_widened_argument_type() {
    let mut arena = DeclarationArena::new();
    let identity = declare(&mut arena, "identity", vec![plain("T")], vec![("x", t(), 0)], t());
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let sig = signature(&env, identity);
    let a = env.interner().literal_string("a");

    assert_eq!(infer_type_arguments(&env, sig, &direct(&[a]), None), vec![TypeId::STRING]);
}

#[test]
fn test_primitive_constraint_keeps_literals() {
    let mut arena = DeclarationArena::new();
    let f = declare(
        &mut arena,
        "f",
        vec![("T", Some(TypeNode::string()), None)],
        vec![("x", t(), 0)],
        t(),
    );
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let sig = signature(&env, f);
    let a = env.interner().literal_string("a");

    assert_eq!(infer_type_arguments(&env, sig, &direct(&[a]), None), vec![a]);
    // A candidate outside the constraint falls back to the constraint.
    assert_eq!(
        infer_type_arguments(&env, sig, &direct(&[TypeId::NUMBER]), None),
        vec![TypeId::STRING]
    );
}

#[test]
fn test_multiple_candidates_are_unioned() {
    let mut arena = DeclarationArena::new();
    let f = declare(
        &mut arena,
        "f",
        vec![plain("T")],
        vec![("a", t(), 0), ("b", t(), 0)],
        t(),
    );
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let interner = env.interner();
    let sig = signature(&env, f);

    let args = direct(&[interner.literal_number(1.0), interner.literal_string("x")]);
    assert_eq!(
        infer_type_arguments(&env, sig, &args, None),
        vec![interner.union2(TypeId::NUMBER, TypeId::STRING)]
    );

    // Context-sensitive arguments only count when nothing better was found.
    let args = vec![
        CallArgument::new(TypeId::NUMBER),
        CallArgument::context_sensitive(TypeId::STRING),
    ];
    assert_eq!(infer_type_arguments(&env, sig, &args, None), vec![TypeId::NUMBER]);
    let args = vec![
        CallArgument::context_sensitive(TypeId::STRING),
        CallArgument::context_sensitive(TypeId::STRING),
    ];
    assert_eq!(infer_type_arguments(&env, sig, &args, None), vec![TypeId::STRING]);
}

#[test]
fn test_mixed_candidates_keep_their_literals() {
    // interface HasX { x: number }
    // function f<T>(a: T, b: T): T
    let mut arena = DeclarationArena::new();
    let x = arena.property("x", TypeNode::number());
    let has_x = arena.interface("HasX", vec![], vec![], vec![x]);
    let f = declare(
        &mut arena,
        "f",
        vec![plain("T")],
        vec![("a", t(), 0), ("b", t(), 0)],
        t(),
    );
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let interner = env.interner();
    let sig = signature(&env, f);
    let a = interner.literal_string("a");
    let has_x = env.get_type_at_location(has_x);

    assert_eq!(
        infer_type_arguments(&env, sig, &direct(&[a, has_x]), None),
        vec![interner.union2(a, has_x)]
    );
}

/// `function pair<T, U>(a: T, b: T, c: U, d: U): T` next to `interface HasX { x: number }`.
fn pair_arena() -> (DeclarationArena, NodeIndex, NodeIndex) {
    let mut arena = DeclarationArena::new();
    let x = arena.property("x", TypeNode::number());
    let has_x = arena.interface("HasX", vec![], vec![], vec![x]);
    let u = || TypeNode::named("U");
    let pair = declare(
        &mut arena,
        "pair",
        vec![plain("T"), plain("U")],
        vec![("a", t(), 0), ("b", t(), 0), ("c", u(), 0), ("d", u(), 0)],
        t(),
    );
    (arena, pair, has_x)
}

fn infer_pair(env: &TypeEnvironment, pair: NodeIndex, has_x: NodeIndex) -> Vec<TypeId> {
    let interner = env.interner();
    let has_x = env.get_type_at_location(has_x);
    let args = direct(&[
        interner.literal_number(1.0),
        interner.literal_string("x"),
        has_x,
        interner.literal_string("y"),
    ]);
    infer_type_arguments(env, signature(env, pair), &args, None)
}

#[test]
fn test_inference_is_deterministic() {
    let (arena, pair, has_x) = pair_arena();
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let first = infer_pair(&env, pair, has_x);
    let second = infer_pair(&env, pair, has_x);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);

    let (arena, pair, has_x) = pair_arena();
    let fresh = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let rebuilt = infer_pair(&fresh, pair, has_x);
    let render = |env: &TypeEnvironment, types: &[TypeId]| -> Vec<String> {
        types
            .iter()
            .map(|&t| crate::node_builder::type_to_string(env, t))
            .collect()
    };
    assert_eq!(render(&env, &first), render(&fresh, &rebuilt));
}

#[test]
fn test_infers_through_structure() {
    let mut arena = DeclarationArena::new();
    let tp = arena.type_parameter("T", None, None);
    let value = arena.property("value", t());
    arena.interface("Box", vec![tp], vec![], vec![value]);
    let first = declare(
        &mut arena,
        "first",
        vec![plain("T")],
        vec![("xs", TypeNode::array(t()), 0)],
        t(),
    );
    let unbox = declare(
        &mut arena,
        "unbox",
        vec![plain("T")],
        vec![("b", TypeNode::reference("Box", vec![t()]), 0)],
        t(),
    );
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let interner = env.interner();

    let booleans = interner.array(TypeId::BOOLEAN);
    assert_eq!(
        infer_type_arguments(&env, signature(&env, first), &direct(&[booleans]), None),
        vec![TypeId::BOOLEAN]
    );

    let box_string = env.get_type_from_type_node(&TypeNode::reference("Box", vec![TypeNode::string()]), NodeIndex::NONE);
    assert_eq!(
        infer_type_arguments(&env, signature(&env, unbox), &direct(&[box_string]), None),
        vec![TypeId::STRING]
    );
}

#[test]
fn test_callback_parameters_infer_contravariantly() {
    let mut arena = DeclarationArena::new();
    let callback = TypeNode::Function(SignatureNode::new(
        vec![ParameterNode::new("x", t())],
        TypeNode::keyword(KeywordKind::Void),
    ));
    let f = declare(
        &mut arena,
        "each",
        vec![plain("T")],
        vec![("cb", callback, 0)],
        TypeNode::keyword(KeywordKind::Void),
    );
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());

    let handler = env.get_type_from_type_node(
        &TypeNode::Function(SignatureNode::new(
            vec![ParameterNode::new("s", TypeNode::string())],
            TypeNode::keyword(KeywordKind::Void),
        )),
        NodeIndex::NONE,
    );
    assert_eq!(
        infer_type_arguments(&env, signature(&env, f), &direct(&[handler]), None),
        vec![TypeId::STRING]
    );
}

#[test]
fn test_union_target_strips_matched_members() {
    let mut arena = DeclarationArena::new();
    let f = declare(
        &mut arena,
        "f",
        vec![plain("T")],
        vec![(
            "x",
            TypeNode::union(vec![t(), TypeNode::keyword(KeywordKind::Undefined)]),
            0,
        )],
        t(),
    );
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let arg = env.interner().union2(TypeId::STRING, TypeId::UNDEFINED);
    assert_eq!(
        infer_type_arguments(&env, signature(&env, f), &direct(&[arg]), None),
        vec![TypeId::STRING]
    );
}

#[test]
fn test_contextual_return_type_has_lowest_priority() {
    let mut arena = DeclarationArena::new();
    let make = declare(&mut arena, "make", vec![plain("T")], vec![], t());
    let identity = declare(&mut arena, "identity", vec![plain("T")], vec![("x", t(), 0)], t());
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let a = env.interner().literal_string("a");

    // Return-type inferences keep their literals.
    assert_eq!(
        infer_type_arguments(&env, signature(&env, make), &[], Some(a)),
        vec![a]
    );
    assert_eq!(
        infer_type_arguments(&env, signature(&env, identity), &direct(&[TypeId::NUMBER]), Some(TypeId::STRING)),
        vec![TypeId::NUMBER]
    );
}

#[test]
fn test_uninferred_parameters_use_default_then_fallback() {
    let mut arena = DeclarationArena::new();
    let bare = declare(&mut arena, "bare", vec![plain("T")], vec![], TypeNode::keyword(KeywordKind::Void));
    let defaulted = declare(
        &mut arena,
        "defaulted",
        vec![("T", None, Some(TypeNode::number()))],
        vec![],
        TypeNode::keyword(KeywordKind::Void),
    );

    let env = TypeEnvironment::from_arena(arena.clone(), CheckerOptions::strict());
    assert_eq!(
        infer_type_arguments(&env, signature(&env, bare), &[], None),
        vec![TypeId::UNKNOWN]
    );
    assert_eq!(
        infer_type_arguments(&env, signature(&env, defaulted), &[], None),
        vec![TypeId::NUMBER]
    );

    let any_default = TypeEnvironment::from_arena(
        arena,
        CheckerOptions {
            inference_default: InferenceDefault::Any,
            ..CheckerOptions::strict()
        },
    );
    assert_eq!(
        infer_type_arguments(&any_default, signature(&any_default, bare), &[], None),
        vec![TypeId::ANY]
    );
}

#[test]
fn test_rest_type_parameter_collects_a_tuple() {
    let mut arena = DeclarationArena::new();
    let f = declare(
        &mut arena,
        "tuple",
        vec![plain("T")],
        vec![("args", t(), modifier_flags::REST)],
        t(),
    );
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let interner = env.interner();
    let element = |type_id| TupleElement {
        type_id,
        optional: false,
        rest: false,
    };

    let inferred = infer_type_arguments(
        &env,
        signature(&env, f),
        &direct(&[TypeId::NUMBER, TypeId::STRING]),
        None,
    );
    assert_eq!(
        inferred,
        vec![interner.tuple(vec![element(TypeId::NUMBER), element(TypeId::STRING)])]
    );
}

#[test]
fn test_non_generic_signature_infers_nothing() {
    let mut arena = DeclarationArena::new();
    let f = declare(&mut arena, "f", vec![], vec![("x", TypeNode::number(), 0)], TypeNode::number());
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    assert!(infer_type_arguments(&env, signature(&env, f), &direct(&[TypeId::NUMBER]), None).is_empty());
}

#[test]
fn test_generic_source_is_instantiated_against_target() {
    let mut arena = DeclarationArena::new();
    let identity = declare(&mut arena, "identity", vec![plain("T")], vec![("x", t(), 0)], t());
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let interner = env.interner();

    let target = env.get_type_from_type_node(
        &TypeNode::Function(SignatureNode::new(
            vec![ParameterNode::new("n", TypeNode::number())],
            TypeNode::number(),
        )),
        NodeIndex::NONE,
    );
    let target_sig = env.get_signatures_of_type(target, SignatureKind::Call)[0];
    let instantiated = instantiate_signature_in_context_of(&env, signature(&env, identity), target_sig);
    let instantiated = interner.signature(instantiated).expect("signature");
    assert!(instantiated.type_params.is_empty());
    assert_eq!(instantiated.params[0].type_id, TypeId::NUMBER);
    assert_eq!(instantiated.return_type, TypeId::NUMBER);
}
