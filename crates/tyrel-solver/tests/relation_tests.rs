//! Relation queries over bound declarations, driven through the public API.

use tyrel_binder::{DeclarationArena, KeywordKind, NodeIndex, ParameterNode, SignatureDecl, SignatureNode, SymbolId, TypeNode};
use tyrel_common::options::CheckerOptions;
use tyrel_solver::{
    RelationKind, SubtypeFailureReason, TypeEnvironment, TypeId, Variance, assignability_diagnostic, explain_relation,
    get_variances, is_type_assignable_to, is_type_identical_to, is_type_subtype_of, type_to_string,
};

fn global(env: &TypeEnvironment, name: &str) -> SymbolId {
    env.binder().globals.get(name).expect("declared global")
}

fn declared(env: &TypeEnvironment, name: &str) -> TypeId {
    env.get_declared_type_of_symbol(global(env, name))
}

fn lower(env: &TypeEnvironment, node: TypeNode) -> TypeId {
    env.get_type_from_type_node(&node, NodeIndex::NONE)
}

fn void() -> TypeNode {
    TypeNode::keyword(KeywordKind::Void)
}

#[test]
fn test_interfaces_relate_by_structure() {
    let mut arena = DeclarationArena::new();
    let x = arena.property("x", TypeNode::number());
    let y = arena.property("y", TypeNode::number());
    arena.interface("Point", vec![], vec![], vec![x, y]);
    let only_x = arena.property("x", TypeNode::number());
    arena.interface("HasX", vec![], vec![], vec![only_x]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());

    let point = declared(&env, "Point");
    let has_x = declared(&env, "HasX");
    assert!(is_type_assignable_to(&env, point, has_x));
    assert!(is_type_subtype_of(&env, point, has_x));
    assert!(!is_type_assignable_to(&env, has_x, point));
    assert!(!is_type_identical_to(&env, point, has_x));

    match explain_relation(&env, has_x, point, RelationKind::Assignable) {
        Some(SubtypeFailureReason::MissingProperty { property_name, .. }) => {
            assert_eq!(&*env.interner().resolve_atom(property_name), "y");
        }
        other => panic!("expected a missing property, got {other:?}"),
    }
}

#[test]
fn test_class_instance_satisfies_interface() {
    let mut arena = DeclarationArena::new();
    let id = arena.property("id", TypeNode::number());
    let render = arena.method("render", SignatureDecl::new(vec![], TypeNode::string()));
    arena.class("Widget", vec![], None, vec![], vec![id, render]);
    let contract = arena.method("render", SignatureDecl::new(vec![], TypeNode::string()));
    arena.interface("Renderable", vec![], vec![], vec![contract]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());

    let widget = declared(&env, "Widget");
    let renderable = declared(&env, "Renderable");
    assert!(is_type_assignable_to(&env, widget, renderable));
    assert!(!is_type_assignable_to(&env, renderable, widget));
}

#[test]
fn test_methods_stay_bivariant_under_strict_function_types() {
    let mut arena = DeclarationArena::new();
    let either = || TypeNode::union(vec![TypeNode::string(), TypeNode::number()]);

    let narrow_param = arena.parameter("x", TypeNode::string());
    let narrow = arena.method("handle", SignatureDecl::new(vec![narrow_param], void()));
    arena.interface("NarrowMethod", vec![], vec![], vec![narrow]);
    let wide_param = arena.parameter("x", either());
    let wide = arena.method("handle", SignatureDecl::new(vec![wide_param], void()));
    arena.interface("WideMethod", vec![], vec![], vec![wide]);

    let callback = |ty| TypeNode::Function(SignatureNode::new(vec![ParameterNode::new("x", ty)], void()));
    let narrow_prop = arena.property("handle", callback(TypeNode::string()));
    arena.interface("NarrowProperty", vec![], vec![], vec![narrow_prop]);
    let wide_prop = arena.property("handle", callback(either()));
    arena.interface("WideProperty", vec![], vec![], vec![wide_prop]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());

    assert!(is_type_assignable_to(&env, declared(&env, "NarrowMethod"), declared(&env, "WideMethod")));
    assert!(!is_type_assignable_to(&env, declared(&env, "NarrowProperty"), declared(&env, "WideProperty")));
    assert!(is_type_assignable_to(&env, declared(&env, "WideProperty"), declared(&env, "NarrowProperty")));
}

#[test]
fn test_recursive_generic_interface_is_covariant() {
    let mut arena = DeclarationArena::new();
    let t = arena.type_parameter("T", None, None);
    let value = arena.property("value", TypeNode::named("T"));
    let children = arena.property(
        "children",
        TypeNode::array(TypeNode::reference("Tree", vec![TypeNode::named("T")])),
    );
    arena.interface("Tree", vec![t], vec![], vec![value, children]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());

    let tree = global(&env, "Tree");
    assert_eq!(get_variances(&env, tree, RelationKind::Assignable)[0], Variance::COVARIANT);

    let tree_of = |arg| lower(&env, TypeNode::reference("Tree", vec![arg]));
    let literal_tree = tree_of(TypeNode::string_literal("a"));
    let string_tree = tree_of(TypeNode::string());
    let number_tree = tree_of(TypeNode::number());
    assert!(is_type_assignable_to(&env, literal_tree, string_tree));
    assert!(!is_type_assignable_to(&env, string_tree, literal_tree));
    assert!(!is_type_assignable_to(&env, number_tree, string_tree));
    assert_eq!(env.stats().depth_limit_hits, 0);
}

#[test]
fn test_literal_union_alias() {
    let mut arena = DeclarationArena::new();
    arena.type_alias(
        "Status",
        vec![],
        TypeNode::union(vec![TypeNode::string_literal("ok"), TypeNode::string_literal("error")]),
    );
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());
    let interner = env.interner();

    let status = declared(&env, "Status");
    assert!(is_type_assignable_to(&env, interner.literal_string("ok"), status));
    assert!(!is_type_assignable_to(&env, interner.literal_string("pending"), status));
    assert!(!is_type_assignable_to(&env, TypeId::STRING, status));
    assert!(is_type_assignable_to(&env, status, TypeId::STRING));
}

#[test]
fn test_diagnostic_names_declared_types() {
    let mut arena = DeclarationArena::new();
    let x = arena.property("x", TypeNode::number());
    arena.interface("HasX", vec![], vec![], vec![x]);
    let label = arena.property("label", TypeNode::string());
    arena.interface("Labelled", vec![], vec![], vec![label]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());

    let has_x = declared(&env, "HasX");
    let labelled = declared(&env, "Labelled");
    assert_eq!(type_to_string(&env, has_x), "HasX");

    let diagnostic = assignability_diagnostic(&env, 0, has_x, labelled).expect("not assignable");
    assert_eq!(
        diagnostic.message_text,
        "Type 'HasX' is not assignable to type 'Labelled'."
    );
    assert_eq!(
        diagnostic.related_information[0].message_text,
        "Property 'label' is missing in type 'HasX' but required in type 'Labelled'."
    );
}
