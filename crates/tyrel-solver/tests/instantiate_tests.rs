use super::*;
use tyrel_binder::{DeclarationArena, NodeIndex, SymbolId, TypeNode};
use tyrel_common::options::CheckerOptions;

fn type_param(env: &TypeEnvironment, name: &str) -> (TypeParamId, TypeId) {
    let interner = env.interner();
    let id = interner.fresh_type_param(interner.intern_string(name), SymbolId::NONE);
    (id, interner.type_param_type(id))
}

fn value_object(env: &TypeEnvironment, type_id: TypeId) -> TypeId {
    let interner = env.interner();
    interner.object_with_properties(vec![PropertyInfo {
        name: interner.intern_string("value"),
        type_id,
        optional: false,
        readonly: false,
        is_method: false,
        symbol: SymbolId::NONE,
    }])
}

#[test]
fn test_mapper_rebinding_and_shadowing() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let (t, _) = type_param(&env, "T");
    let (u, _) = type_param(&env, "U");

    let mapper = TypeMapper::new(&[t, u], &[TypeId::STRING]);
    assert_eq!(mapper.sources(), &[t]);
    assert_eq!(mapper.get(t), Some(TypeId::STRING));
    assert_eq!(mapper.get(u), None);

    let rebound = mapper.with(t, TypeId::NUMBER);
    assert_eq!(rebound.get(t), Some(TypeId::NUMBER));
    assert_eq!(rebound.sources().len(), 1);

    assert!(mapper.without(&[t]).is_empty());
}

#[test]
fn test_closed_types_are_returned_unchanged() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let (t, _) = type_param(&env, "T");
    let mapper = TypeMapper::single(t, TypeId::STRING);

    let closed = value_object(&env, TypeId::NUMBER);
    assert_eq!(instantiate_type(&env, closed, &mapper), closed);
    assert_eq!(instantiate_type(&env, TypeId::STRING, &mapper), TypeId::STRING);
}

#[test]
fn test_substitutes_through_structure() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let (t, t_type) = type_param(&env, "T");
    let mapper = TypeMapper::single(t, TypeId::STRING);

    assert_eq!(
        instantiate_type(&env, interner.array(t_type), &mapper),
        interner.array(TypeId::STRING)
    );
    assert_eq!(
        instantiate_type(&env, interner.union2(t_type, TypeId::NUMBER), &mapper),
        interner.union2(TypeId::STRING, TypeId::NUMBER)
    );

    let generic = value_object(&env, t_type);
    let instantiated = instantiate_type(&env, generic, &mapper);
    let shape = env.resolve_shape(instantiated).expect("object");
    assert!(shape.flags.contains(ObjectFlags::INSTANTIATED));
    assert_eq!(shape.properties[0].type_id, TypeId::STRING);
    assert!(!interner.contains_type_params(instantiated));
}

#[test]
fn test_signature_type_params_shadow_the_mapper() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let (t, t_type) = type_param(&env, "T");
    let sig = interner.alloc_signature(Signature {
        declaration: NodeIndex::NONE,
        type_params: vec![t],
        params: vec![ParamInfo {
            name: interner.intern_string("x"),
            type_id: t_type,
            optional: false,
            rest: false,
            symbol: SymbolId::NONE,
        }],
        this_type: None,
        return_type: t_type,
        min_argument_count: 1,
        flags: SignatureFlags::empty(),
    });

    assert_eq!(
        instantiate_signature(&env, sig, &TypeMapper::single(t, TypeId::STRING)),
        sig
    );

    let concrete = instantiate_signature_with_args(&env, sig, &[TypeId::NUMBER]);
    let concrete = interner.signature(concrete).expect("signature");
    assert!(concrete.type_params.is_empty());
    assert_eq!(concrete.params[0].type_id, TypeId::NUMBER);
    assert_eq!(concrete.return_type, TypeId::NUMBER);
}

#[test]
fn test_application_arguments_are_instantiated() {
    let mut arena = DeclarationArena::new();
    let t = arena.type_parameter("T", None, None);
    let value = arena.property("value", TypeNode::named("T"));
    arena.interface("Box", vec![t], vec![], vec![value]);
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());
    let boxed = env.binder().globals.get("Box").expect("Box");
    let interner = env.interner();

    let (u, u_type) = type_param(&env, "U");
    let generic = interner.application(boxed, vec![u_type]);
    let instantiated = instantiate_type(&env, generic, &TypeMapper::single(u, TypeId::STRING));
    assert_eq!(instantiated, interner.application(boxed, vec![TypeId::STRING]));
}

#[test]
fn test_distributive_conditional_over_union() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let (t, t_type) = type_param(&env, "T");
    let yes = interner.literal_string("yes");
    let no = interner.literal_string("no");
    let conditional = interner.conditional(ConditionalType {
        check_type: t_type,
        extends_type: TypeId::STRING,
        true_type: yes,
        false_type: no,
        is_distributive: true,
    });

    let a = interner.literal_string("a");
    let argument = interner.union2(a, TypeId::NUMBER);
    let result = instantiate_type(&env, conditional, &TypeMapper::single(t, argument));
    assert_eq!(result, interner.union2(yes, no));

    assert_eq!(
        instantiate_type(&env, conditional, &TypeMapper::single(t, TypeId::NEVER)),
        TypeId::NEVER
    );
    assert_eq!(
        instantiate_type(&env, conditional, &TypeMapper::single(t, a)),
        yes
    );
}

#[test]
fn test_interned_mapper_results_are_memoized() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let (t, t_type) = type_param(&env, "T");
    let generic = value_object(&env, t_type);

    let mapper_id = env.intern_mapper(TypeMapper::single(t, TypeId::STRING));
    assert_eq!(
        env.intern_mapper(TypeMapper::single(t, TypeId::STRING)),
        mapper_id
    );
    let first = instantiate_type_with_id(&env, generic, mapper_id);
    let second = instantiate_type_with_id(&env, generic, mapper_id);
    assert_eq!(first, second);
    assert_eq!(
        env.get_property_of_type(first, "value").map(|p| p.type_id),
        Some(TypeId::STRING)
    );
}
