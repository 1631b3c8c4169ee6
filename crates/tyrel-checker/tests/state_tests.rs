use super::*;
use tyrel_binder::SignatureDecl;
use tyrel_solver::SolverError;

/// `interface Box<T> { value: T }` and `function unbox<T>(b: Box<T>): T`.
fn boxed() -> (Checker, NodeIndex, NodeIndex) {
    let mut arena = DeclarationArena::new();
    let t = arena.type_parameter("T", None, None);
    let value = arena.property("value", TypeNode::named("T"));
    let iface = arena.interface("Box", vec![t], vec![], vec![value]);
    let u = arena.type_parameter("T", None, None);
    let b = arena.parameter("b", TypeNode::reference("Box", vec![TypeNode::named("T")]));
    let unbox = arena.function("unbox", SignatureDecl::generic(vec![u], vec![b], TypeNode::named("T")));
    (Checker::new(arena, CheckerOptions::strict()), iface, unbox)
}

fn box_of(checker: &Checker, arg: TypeNode) -> TypeId {
    checker.get_type_from_type_node(&TypeNode::reference("Box", vec![arg]), NodeIndex::NONE)
}

#[test]
fn test_location_queries() {
    let (checker, iface, unbox) = boxed();
    let symbol = checker.get_symbol_at_location(iface).expect("Box symbol");
    assert_eq!(checker.get_type_at_location(iface), checker.get_declared_type_of_symbol(symbol));
    assert_eq!(checker.get_symbol_at_location(NodeIndex::NONE), None);

    let unbox_type = checker.get_type_at_location(unbox);
    assert_eq!(checker.get_signatures_of_type(unbox_type, SignatureKind::Call).len(), 1);
    assert!(checker.get_signatures_of_type(unbox_type, SignatureKind::Construct).is_empty());

    let box_string = box_of(&checker, TypeNode::string());
    let value = checker.get_property_of_type(box_string, "value").expect("value");
    assert_eq!(value.type_id, TypeId::STRING);
    assert_eq!(checker.get_properties_of_type(box_string).len(), 1);
}

#[test]
fn test_relation_queries() {
    let checker = Checker::new(DeclarationArena::new(), CheckerOptions::strict());
    let interner = checker.env().interner();
    let a = interner.literal_string("a");
    assert!(checker.is_type_assignable_to(a, TypeId::STRING));
    assert!(!checker.is_type_assignable_to(TypeId::STRING, a));
    assert!(checker.is_type_comparable_to(TypeId::STRING, a));

    let number_or_string = interner.union2(TypeId::NUMBER, TypeId::STRING);
    let wider = interner.union(vec![TypeId::NUMBER, TypeId::STRING, TypeId::BOOLEAN]);
    assert!(checker.is_type_assignable_to(number_or_string, wider));
    assert!(checker.is_type_subtype_of(number_or_string, wider));
    assert!(checker.is_type_identical_to(wider, wider));
    assert!(!checker.is_type_related_to(wider, number_or_string, RelationKind::Assignable));

    assert_eq!(checker.explain_relation(a, TypeId::STRING, RelationKind::Assignable), None);
    assert!(matches!(
        checker.explain_relation(wider, number_or_string, RelationKind::Assignable),
        Some(SubtypeFailureReason::NoUnionMemberMatches { .. })
    ));
    assert!(checker.stats().relation_queries > 0);
}

#[test]
fn test_infer_type_arguments_for_declaration() {
    let (checker, _, unbox) = boxed();
    let box_string = box_of(&checker, TypeNode::string());
    let inferred = checker
        .infer_type_arguments_for_declaration(unbox, &[CallArgument::new(box_string)], None)
        .expect("unbox signature");
    assert_eq!(inferred, vec![TypeId::STRING]);
}

#[test]
fn test_infer_for_missing_declaration_is_internal_error() {
    let (checker, _, _) = boxed();
    let result = checker.infer_type_arguments_for_declaration(NodeIndex(999), &[], None);
    assert!(matches!(
        result,
        Err(CheckerError::Internal(SolverError::MissingDeclaration(999)))
    ));
}

#[test]
fn test_type_to_type_node_round_trips() {
    let (checker, iface, _) = boxed();
    let box_string = box_of(&checker, TypeNode::string());
    let node = checker.type_to_type_node(box_string, None, TypeFormatFlags::empty());
    assert_eq!(node.to_string(), "Box<string>");
    assert_eq!(checker.get_type_from_type_node(&node, NodeIndex::NONE), box_string);
    assert_eq!(checker.type_to_string(checker.get_type_at_location(iface)), "Box<T>");
}
