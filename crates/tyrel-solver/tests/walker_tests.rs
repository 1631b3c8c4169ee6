use super::*;
use tyrel_binder::{DeclarationArena, NodeIndex, TypeNode};
use tyrel_common::options::CheckerOptions;

/// `Holder { item: Item }`, `Item { secret: Hidden }`, `Hidden {}`.
fn nested_env() -> TypeEnvironment {
    let mut arena = DeclarationArena::new();
    let item = arena.property("item", TypeNode::named("Item"));
    arena.interface("Holder", vec![], vec![], vec![item]);
    let secret = arena.property("secret", TypeNode::named("Hidden"));
    arena.interface("Item", vec![], vec![], vec![secret]);
    arena.interface("Hidden", vec![], vec![], vec![]);
    TypeEnvironment::from_arena(arena, CheckerOptions::default())
}

fn global(env: &TypeEnvironment, name: &str) -> SymbolId {
    env.binder().globals.get(name).expect("declared global")
}

#[test]
fn test_walk_type_visits_components_once() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let numbers = interner.array(TypeId::NUMBER);
    let root = interner.union(vec![TypeId::STRING, numbers, interner.array(TypeId::NUMBER)]);

    let result = walk_type(&env, root);
    assert_eq!(result.visited_types[0], root);
    for expected in [TypeId::STRING, numbers, TypeId::NUMBER] {
        assert_eq!(result.visited_types.iter().filter(|&&t| t == expected).count(), 1);
    }
    assert!(result.visited_symbols.is_empty());
}

#[test]
fn test_walk_symbol_reaches_referenced_declarations() {
    let env = nested_env();
    let result = walk_symbol(&env, global(&env, "Holder"));
    assert_eq!(result.visited_symbols[0], global(&env, "Holder"));
    for name in ["Item", "Hidden"] {
        assert!(result.visited_symbols.contains(&global(&env, name)), "{name} reached");
    }
    let hidden = env.get_declared_type_of_symbol(global(&env, "Hidden"));
    assert!(result.visited_types.contains(&hidden));
}

#[test]
fn test_rejected_symbol_is_recorded_but_not_entered() {
    let env = nested_env();
    let item = global(&env, "Item");
    let mut walker = SymbolWalker::new(&env, |symbol| symbol != item);
    let result = walker.walk_symbol(global(&env, "Holder"));

    assert!(result.visited_symbols.contains(&item));
    assert!(!result.visited_symbols.contains(&global(&env, "Hidden")));
    let item_type = env.get_declared_type_of_symbol(item);
    assert!(result.visited_types.contains(&item_type));
}

#[test]
fn test_walker_reports_only_new_reachables() {
    let env = nested_env();
    let item = global(&env, "Item");
    let mut walker = SymbolWalker::new(&env, |_| true);

    let first = walker.walk_symbol(item);
    assert!(first.visited_symbols.contains(&item));
    let second = walker.walk_symbol(global(&env, "Holder"));
    assert!(second.visited_symbols.contains(&global(&env, "Holder")));
    assert!(!second.visited_symbols.contains(&item));
    assert!(!second.visited_symbols.contains(&global(&env, "Hidden")));
    assert!(walker.walk_symbol(item).visited_symbols.is_empty());
}

#[test]
fn test_recursive_declarations_terminate() {
    let mut arena = DeclarationArena::new();
    let next = arena.property("next", TypeNode::named("Node"));
    arena.interface("Node", vec![], vec![], vec![next]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());
    let node = global(&env, "Node");

    let result = walk_symbol(&env, node);
    assert_eq!(result.visited_symbols.iter().filter(|&&s| s == node).count(), 1);
    let node_type = env.get_type_from_type_node(&TypeNode::named("Node"), NodeIndex::NONE);
    assert_eq!(result.visited_types, vec![node_type]);
}

#[test]
fn test_enum_literal_reaches_its_member() {
    let mut arena = DeclarationArena::new();
    let a = arena.enum_member("A", None);
    arena.enum_declaration("E", vec![a]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());
    let member = env.binder().get_node_symbol(a).expect("A");

    let result = walk_type(&env, env.get_type_at_location(a));
    assert_eq!(result.visited_symbols, vec![member]);
    assert!(result.visited_types.contains(&env.interner().literal_number(0.0)));
}
