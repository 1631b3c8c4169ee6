//! End-to-end checks through the public checker surface.

use std::thread;
use tyrel_binder::{DeclarationArena, NodeIndex, SignatureDecl, TypeNode, VariableKind};
use tyrel_checker::tracing_config::init_tracing;
use tyrel_checker::{CancellationToken, CheckReport, Checker, CheckerError};
use tyrel_common::diagnostics::diagnostic_codes;
use tyrel_common::options::CheckerOptions;
use tyrel_solver::{CallArgument, SignatureKind, TypeId};

struct Geometry {
    point: NodeIndex,
    point3: NodeIndex,
    first: NodeIndex,
    origin: NodeIndex,
}

/// ```text
/// namespace Geometry {
///     interface Point { x: number; y: number }
///     class Point3 implements Point { x: number; y: number; z: number }
/// }
/// function first<T>(items: T[]): T
/// const origin: Geometry.Point
/// ```
fn geometry() -> (DeclarationArena, Geometry) {
    let mut arena = DeclarationArena::new();
    let x = arena.property("x", TypeNode::number());
    let y = arena.property("y", TypeNode::number());
    let point = arena.interface("Point", vec![], vec![], vec![x, y]);
    let x3 = arena.property("x", TypeNode::number());
    let y3 = arena.property("y", TypeNode::number());
    let z3 = arena.property("z", TypeNode::number());
    let point3 = arena.class("Point3", vec![], None, vec![TypeNode::named("Point")], vec![x3, y3, z3]);
    arena.namespace("Geometry", vec![point, point3]);

    let t = arena.type_parameter("T", None, None);
    let items = arena.parameter("items", TypeNode::array(TypeNode::named("T")));
    let first = arena.function("first", SignatureDecl::generic(vec![t], vec![items], TypeNode::named("T")));
    let origin = arena.variable(
        "origin",
        VariableKind::Const,
        Some(TypeNode::qualified(&["Geometry", "Point"], vec![])),
    );
    (
        arena,
        Geometry {
            point,
            point3,
            first,
            origin,
        },
    )
}

fn check(checker: &Checker) -> CheckReport {
    checker.check_program(&CancellationToken::new()).expect("not cancelled")
}

#[test]
fn test_well_typed_program() {
    init_tracing();
    let (arena, nodes) = geometry();
    let checker = Checker::new(arena, CheckerOptions::strict());
    let report = check(&checker);
    assert!(!report.has_errors(), "{:?}", report.diagnostics);

    let point = checker.get_type_at_location(nodes.point);
    let point3 = checker.get_type_at_location(nodes.point3);
    assert!(checker.is_type_assignable_to(point3, point));
    assert!(!checker.is_type_assignable_to(point, point3));
    assert_eq!(checker.get_type_at_location(nodes.origin), point);
    assert_eq!(checker.type_to_string(point), "Geometry.Point");
}

#[test]
fn test_inference_through_checked_program() {
    let (arena, nodes) = geometry();
    let checker = Checker::new(arena, CheckerOptions::strict());
    check(&checker);

    let strings = checker.env().interner().array(TypeId::STRING);
    let inferred = checker
        .infer_type_arguments_for_declaration(nodes.first, &[CallArgument::new(strings)], None)
        .expect("first is a signature declaration");
    assert_eq!(inferred, vec![TypeId::STRING]);

    let first_type = checker.get_type_at_location(nodes.first);
    let signatures = checker.get_signatures_of_type(first_type, SignatureKind::Call);
    assert_eq!(signatures.len(), 1);
    assert_eq!(checker.signature_to_string(signatures[0]), "<T>(items: T[]) => T");
}

#[test]
fn test_diagnostics_are_sorted_by_declaration() {
    let (mut arena, _) = geometry();
    let missing = arena.type_alias("Later", vec![], TypeNode::named("Nowhere"));
    let broken = arena.class(
        "Broken",
        vec![],
        None,
        vec![TypeNode::qualified(&["Geometry", "Point"], vec![])],
        vec![],
    );
    let checker = Checker::new(arena, CheckerOptions::strict());
    let report = check(&checker);

    let reported: Vec<(u32, u32)> = report.diagnostics.iter().map(|d| (d.node, d.code)).collect();
    assert_eq!(
        reported,
        vec![
            (missing.0, diagnostic_codes::CANNOT_FIND_NAME),
            (broken.0, diagnostic_codes::CLASS_INCORRECTLY_IMPLEMENTS_INTERFACE),
        ]
    );
    assert!(report.to_json().expect("serializable").contains("\"code\": 2420"));
}

#[test]
fn test_cancellation_from_another_thread() {
    let (arena, _) = geometry();
    let checker = Checker::new(arena, CheckerOptions::strict());
    let token = CancellationToken::new();
    let remote = token.clone();
    thread::spawn(move || remote.cancel()).join().expect("cancel thread");

    assert!(matches!(
        checker.check_program(&token),
        Err(CheckerError::Cancelled { checked: 0 })
    ));
}
