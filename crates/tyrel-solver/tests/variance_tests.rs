use super::*;
use crate::subtype::is_type_assignable_to;
use tyrel_binder::{DeclarationArena, KeywordKind, NodeIndex, ParameterNode, SignatureNode, TypeNode};
use tyrel_common::options::CheckerOptions;

fn callback(param: TypeNode) -> TypeNode {
    TypeNode::Function(SignatureNode::new(
        vec![ParameterNode::new("x", param)],
        TypeNode::keyword(KeywordKind::Void),
    ))
}

fn getter() -> TypeNode {
    TypeNode::Function(SignatureNode::new(vec![], TypeNode::named("T")))
}

/// Box<T> reads T, Sink<T> writes T, Cell<T> does both, Tagged<T> ignores it.
fn generic_arena() -> DeclarationArena {
    let mut arena = DeclarationArena::new();
    let shapes: [(&str, Vec<(&str, TypeNode)>); 4] = [
        ("Box", vec![("value", TypeNode::named("T"))]),
        ("Sink", vec![("write", callback(TypeNode::named("T")))]),
        ("Cell", vec![("get", getter()), ("set", callback(TypeNode::named("T")))]),
        ("Tagged", vec![("tag", TypeNode::string())]),
    ];
    for (name, members) in shapes {
        let t = arena.type_parameter("T", None, None);
        let members = members
            .into_iter()
            .map(|(member, ty)| arena.property(member, ty))
            .collect();
        arena.interface(name, vec![t], vec![], members);
    }
    arena.interface("Plain", vec![], vec![], vec![]);
    arena
}

fn variances_of(env: &TypeEnvironment, name: &str) -> Rc<[Variance]> {
    let symbol = env.binder().globals.get(name).expect("declared global");
    get_variances(env, symbol, RelationKind::Assignable)
}

#[test]
fn test_measured_variances_under_strict_function_types() {
    let env = TypeEnvironment::from_arena(generic_arena(), CheckerOptions::strict());
    assert_eq!(variances_of(&env, "Box").as_ref(), &[Variance::COVARIANT]);
    assert_eq!(variances_of(&env, "Sink").as_ref(), &[Variance::CONTRAVARIANT]);
    assert!(variances_of(&env, "Cell")[0].is_invariant());
    assert!(variances_of(&env, "Tagged")[0].is_independent());
    assert!(variances_of(&env, "Plain").is_empty());
}

#[test]
fn test_parameter_bivariance_without_strict_function_types() {
    let env = TypeEnvironment::from_arena(generic_arena(), CheckerOptions::default());
    let sink = variances_of(&env, "Sink");
    assert!(sink[0].is_bivariant());
    assert!(!sink[0].is_independent());
}

#[test]
fn test_variances_are_cached_and_shared_with_comparable() {
    let env = TypeEnvironment::from_arena(generic_arena(), CheckerOptions::strict());
    let symbol = env.binder().globals.get("Box").expect("Box");
    let first = get_variances(&env, symbol, RelationKind::Assignable);
    let second = get_variances(&env, symbol, RelationKind::Assignable);
    assert!(Rc::ptr_eq(&first, &second));
    let comparable = get_variances(&env, symbol, RelationKind::Comparable);
    assert!(Rc::ptr_eq(&first, &comparable));
    assert!(env.take_violations().is_empty());
}

#[test]
fn test_references_relate_by_measured_variance() {
    let env = TypeEnvironment::from_arena(generic_arena(), CheckerOptions::strict());
    let lower = |name: &str, arg: TypeNode| env.get_type_from_type_node(&TypeNode::reference(name, vec![arg]), NodeIndex::NONE);

    let sink_string = lower("Sink", TypeNode::string());
    let sink_a = lower("Sink", TypeNode::string_literal("a"));
    assert!(is_type_assignable_to(&env, sink_string, sink_a));
    assert!(!is_type_assignable_to(&env, sink_a, sink_string));

    let cell_string = lower("Cell", TypeNode::string());
    let cell_a = lower("Cell", TypeNode::string_literal("a"));
    assert!(!is_type_assignable_to(&env, cell_string, cell_a));
    assert!(!is_type_assignable_to(&env, cell_a, cell_string));

    let tagged_string = lower("Tagged", TypeNode::string());
    let tagged_number = lower("Tagged", TypeNode::number());
    assert!(is_type_assignable_to(&env, tagged_string, tagged_number));
}
