use super::*;
use tyrel_binder::{DeclarationArena, KeywordKind, NodeIndex, ParameterNode, SignatureNode, TupleElementNode, TypeNode};
use tyrel_common::diagnostics::diagnostic_codes;
use tyrel_common::options::CheckerOptions;

fn lower(env: &TypeEnvironment, node: TypeNode) -> TypeId {
    env.get_type_from_type_node(&node, NodeIndex::NONE)
}

fn object(members: Vec<(&str, TypeNode, bool)>) -> TypeNode {
    TypeNode::TypeLiteral(
        members
            .into_iter()
            .map(|(name, ty, optional)| tyrel_binder::TypeMemberNode::Property {
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

fn explain(env: &TypeEnvironment, source: TypeId, target: TypeId) -> Option<SubtypeFailureReason> {
    explain_relation(env, source, target, RelationKind::Assignable)
}

#[test]
fn test_related_types_have_no_explanation() {
    let env = TypeEnvironment::new(CheckerOptions::strict());
    let a = env.interner().literal_string("a");
    assert_eq!(explain(&env, a, TypeId::STRING), None);
    assert!(assignability_diagnostic(&env, 0, a, TypeId::STRING).is_none());
}

#[test]
fn test_property_failures() {
    let env = TypeEnvironment::new(CheckerOptions::strict());
    let number_a = lower(&env, object(vec![("a", TypeNode::number(), false)]));
    let string_a = lower(&env, object(vec![("a", TypeNode::string(), false)]));
    let optional_a = lower(&env, object(vec![("a", TypeNode::string(), true)]));
    let empty = lower(&env, TypeNode::TypeLiteral(vec![]));
    let a = env.interner().intern_string("a");

    assert_eq!(
        explain(&env, number_a, string_a),
        Some(SubtypeFailureReason::PropertyTypeMismatch {
            property_name: a,
            source_property_type: TypeId::NUMBER,
            target_property_type: TypeId::STRING,
            nested_reason: Some(Box::new(SubtypeFailureReason::TypeMismatch {
                source_type: TypeId::NUMBER,
                target_type: TypeId::STRING,
            })),
        })
    );
    assert_eq!(
        explain(&env, empty, string_a),
        Some(SubtypeFailureReason::MissingProperty {
            property_name: a,
            source_type: empty,
            target_type: string_a,
        })
    );
    assert_eq!(
        explain(&env, optional_a, string_a),
        Some(SubtypeFailureReason::OptionalPropertyRequired {
            property_name: a,
            source_type: optional_a,
            target_type: string_a,
        })
    );
}

#[test]
fn test_union_failures() {
    let env = TypeEnvironment::new(CheckerOptions::strict());
    let interner = env.interner();
    let a = interner.literal_string("a");
    let b = interner.literal_string("b");
    let one = interner.literal_number(1.0);
    let a_or_b = interner.union2(a, b);

    assert_eq!(
        explain(&env, TypeId::NUMBER, a_or_b),
        Some(SubtypeFailureReason::NoUnionMemberMatches {
            source_type: TypeId::NUMBER,
            target_type: a_or_b,
        })
    );
    assert_eq!(
        explain(&env, interner.union2(a, one), TypeId::STRING),
        Some(SubtypeFailureReason::TypeMismatch {
            source_type: one,
            target_type: TypeId::STRING,
        })
    );
}

#[test]
fn test_tuple_arity_failure() {
    let env = TypeEnvironment::new(CheckerOptions::strict());
    let element = |ty| TupleElementNode {
        ty,
        optional: false,
        rest: false,
    };
    let single = lower(&env, TypeNode::Tuple(vec![element(TypeNode::string())]));
    let pair = lower(
        &env,
        TypeNode::Tuple(vec![element(TypeNode::string()), element(TypeNode::number())]),
    );
    assert_eq!(
        explain(&env, single, pair),
        Some(SubtypeFailureReason::TupleArityMismatch {
            source_count: 1,
            target_count: 2,
        })
    );
}

#[test]
fn test_signature_failures() {
    let env = TypeEnvironment::new(CheckerOptions::strict());
    let void = || TypeNode::keyword(KeywordKind::Void);
    let takes_number = lower(&env, function(vec![TypeNode::number()], void()));
    let takes_either = lower(
        &env,
        function(vec![TypeNode::union(vec![TypeNode::number(), TypeNode::string()])], void()),
    );
    let takes_nothing = lower(&env, function(vec![], void()));

    match explain(&env, takes_number, takes_either) {
        Some(SubtypeFailureReason::ParameterTypeMismatch {
            param_index,
            source_param,
            ..
        }) => {
            assert_eq!(param_index, 0);
            assert_eq!(source_param, TypeId::NUMBER);
        }
        other => panic!("expected a parameter mismatch, got {other:?}"),
    }
    assert_eq!(
        explain(&env, takes_number, takes_nothing),
        Some(SubtypeFailureReason::TooManyParameters {
            source_count: 1,
            target_count: 0,
        })
    );

    let returns_number = lower(&env, function(vec![], TypeNode::number()));
    let returns_string = lower(&env, function(vec![], TypeNode::string()));
    assert!(matches!(
        explain(&env, returns_number, returns_string),
        Some(SubtypeFailureReason::ReturnTypeMismatch {
            source_return: TypeId::NUMBER,
            target_return: TypeId::STRING,
            ..
        })
    ));
}

#[test]
fn test_type_argument_failure() {
    let mut arena = DeclarationArena::new();
    let t = arena.type_parameter("T", None, None);
    let value = arena.property("value", TypeNode::named("T"));
    arena.interface("Box", vec![t], vec![], vec![value]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::strict());

    let box_string = lower(&env, TypeNode::reference("Box", vec![TypeNode::string()]));
    let box_number = lower(&env, TypeNode::reference("Box", vec![TypeNode::number()]));
    assert_eq!(
        explain(&env, box_string, box_number),
        Some(SubtypeFailureReason::TypeArgumentMismatch {
            index: 0,
            source_arg: TypeId::STRING,
            target_arg: TypeId::NUMBER,
        })
    );
}

#[test]
fn test_assignability_diagnostic_chain() {
    let env = TypeEnvironment::new(CheckerOptions::strict());
    let number_a = lower(&env, object(vec![("a", TypeNode::number(), false)]));
    let string_a = lower(&env, object(vec![("a", TypeNode::string(), false)]));

    let diagnostic = assignability_diagnostic(&env, 4, number_a, string_a).expect("not assignable");
    assert_eq!(diagnostic.code, diagnostic_codes::TYPE_NOT_ASSIGNABLE);
    assert_eq!(
        diagnostic.message_text,
        "Type '{ a: number }' is not assignable to type '{ a: string }'."
    );
    let related: Vec<&str> = diagnostic
        .related_information
        .iter()
        .map(|r| r.message_text.as_str())
        .collect();
    assert_eq!(
        related,
        vec![
            "Types of property 'a' are incompatible.",
            "Type 'number' is not assignable to type 'string'."
        ]
    );
}
