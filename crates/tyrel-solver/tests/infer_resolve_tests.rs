use super::*;
use crate::env::TypeEnvironment;
use crate::infer::{CallArgument, infer_type_arguments};
use tyrel_binder::{DeclarationArena, NodeIndex, SignatureDecl, SymbolId, TypeNode};
use tyrel_common::options::CheckerOptions;

fn fresh(env: &TypeEnvironment, name: &str, constraint: Option<TypeId>) -> TypeParamId {
    let interner = env.interner();
    let id = interner.fresh_type_param(interner.intern_string(name), SymbolId::NONE);
    interner
        .set_type_param_constraint(id, constraint, None)
        .expect("fresh parameter");
    id
}

/// `(x: param) => void` as a function object.
fn callback(env: &TypeEnvironment, param: TypeId) -> TypeId {
    let interner = env.interner();
    let sig = interner.alloc_signature(Signature {
        declaration: NodeIndex::NONE,
        type_params: Vec::new(),
        params: vec![ParamInfo {
            name: interner.intern_string("x"),
            type_id: param,
            optional: false,
            rest: false,
            symbol: SymbolId::NONE,
        }],
        this_type: None,
        return_type: TypeId::VOID,
        min_argument_count: 1,
        flags: SignatureFlags::empty(),
    });
    interner.object(ObjectShape {
        call_signatures: vec![sig],
        ..ObjectShape::anonymous()
    })
}

#[test]
fn test_better_priority_replaces_candidates() {
    let env = TypeEnvironment::new(CheckerOptions::strict());
    let param = fresh(&env, "T", None);
    let target = env.interner().type_param_type(param);
    let mut ctx = InferenceContext::new(&env, &[param]);
    let var = ctx.var_of_type(target).expect("inference variable");

    ctx.infer_with_priority(InferencePriority::ReturnType, TypeId::STRING, target);
    ctx.infer_with_priority(InferencePriority::Direct, TypeId::NUMBER, target);
    ctx.infer_with_priority(InferencePriority::ContextualArgument, TypeId::BOOLEAN, target);

    let info = ctx.info(var);
    assert_eq!(info.candidates, vec![TypeId::NUMBER]);
    assert_eq!(info.priority, Some(InferencePriority::Direct));
    assert_eq!(ctx.resolve_all(), vec![TypeId::NUMBER]);
    assert_eq!(ctx.info(var).resolved, Some(TypeId::NUMBER));
}

#[test]
fn test_contravariant_candidates_pick_the_common_subtype() {
    let env = TypeEnvironment::new(CheckerOptions::strict());
    let interner = env.interner();
    let param = fresh(&env, "T", None);
    let target = callback(&env, interner.type_param_type(param));
    let a = interner.literal_string("a");

    let mut ctx = InferenceContext::new(&env, &[param]);
    ctx.infer_from_types(callback(&env, TypeId::STRING), target);
    ctx.infer_from_types(callback(&env, a), target);
    let var = ctx.var_of_type(interner.type_param_type(param)).expect("variable");
    assert_eq!(ctx.info(var).contra_candidates, vec![TypeId::STRING, a]);
    assert_eq!(ctx.resolve_all(), vec![a]);
}

#[test]
fn test_unconstrained_without_candidates_is_unknown() {
    let env = TypeEnvironment::new(CheckerOptions::strict());
    let unconstrained = fresh(&env, "T", None);
    let constrained = fresh(&env, "U", Some(TypeId::STRING));
    let mut ctx = InferenceContext::new(&env, &[unconstrained, constrained]);
    assert_eq!(ctx.resolve_all(), vec![TypeId::UNKNOWN, TypeId::STRING]);
}

#[test]
fn test_constraint_on_a_later_parameter_is_resolved_again() {
    let mut arena = DeclarationArena::new();
    let t = arena.type_parameter("T", Some(TypeNode::named("U")), None);
    let u = arena.type_parameter("U", None, None);
    let first = arena.parameter("t", TypeNode::named("T"));
    let second = arena.parameter("u", TypeNode::named("U"));
    let f = arena.function(
        "pick",
        SignatureDecl::generic(vec![t, u], vec![first, second], TypeNode::named("T")),
    );
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let sig = env.signature_of_declaration(f).expect("signature");
    let a = env.interner().literal_string("a");

    let args = [CallArgument::new(a), CallArgument::new(TypeId::STRING)];
    // Once `U` is known to be `string`, `T` keeps its literal.
    assert_eq!(
        infer_type_arguments(&env, sig, &args, None),
        vec![a, TypeId::STRING]
    );
}

#[test]
fn test_enum_members_widen_to_their_enum() {
    let mut arena = DeclarationArena::new();
    let a = arena.enum_member("A", None);
    let b = arena.enum_member("B", None);
    let color = arena.enum_declaration("Color", vec![a, b]);
    let tp = arena.type_parameter("T", None, None);
    let x = arena.parameter("x", TypeNode::named("T"));
    let f = arena.function("id", SignatureDecl::generic(vec![tp], vec![x], TypeNode::named("T")));
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());

    let sig = env.signature_of_declaration(f).expect("signature");
    let member = env.get_type_at_location(a);
    assert_eq!(
        infer_type_arguments(&env, sig, &[CallArgument::new(member)], None),
        vec![env.get_type_at_location(color)]
    );
}
