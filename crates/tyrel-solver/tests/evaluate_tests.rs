use super::*;
use tyrel_binder::{DeclarationArena, TypeNode};
use std::io;
use std::sync::{Arc, Mutex};
use tyrel_common::options::CheckerOptions;

fn prop(env: &TypeEnvironment, name: &str, type_id: TypeId, optional: bool, readonly: bool) -> PropertyInfo {
    PropertyInfo {
        name: env.interner().intern_string(name),
        type_id,
        optional,
        readonly,
        is_method: false,
        symbol: SymbolId::NONE,
    }
}

fn type_param(env: &TypeEnvironment, name: &str) -> (TypeParamId, TypeId) {
    let interner = env.interner();
    let id = interner.fresh_type_param(interner.intern_string(name), SymbolId::NONE);
    (id, interner.type_param_type(id))
}

fn element(type_id: TypeId) -> TupleElement {
    TupleElement {
        type_id,
        optional: false,
        rest: false,
    }
}

#[test]
fn test_indexed_access_reads_properties() {
    let env = TypeEnvironment::new(CheckerOptions::strict());
    let interner = env.interner();
    let object = interner.object_with_properties(vec![
        prop(&env, "a", TypeId::STRING, false, false),
        prop(&env, "b", TypeId::NUMBER, true, false),
    ]);

    let a = interner.literal_string("a");
    let b = interner.literal_string("b");
    assert_eq!(get_indexed_access_type(&env, object, a), TypeId::STRING);
    assert_eq!(
        get_indexed_access_type(&env, object, b),
        interner.union2(TypeId::NUMBER, TypeId::UNDEFINED)
    );
    assert_eq!(
        get_indexed_access_type(&env, object, interner.union2(a, b)),
        interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::UNDEFINED])
    );
    assert_eq!(
        get_indexed_access_type(&env, object, interner.literal_string("missing")),
        TypeId::ERROR
    );
}

#[test]
fn test_indexed_access_on_arrays_and_tuples() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let array = interner.array(TypeId::STRING);
    assert_eq!(get_indexed_access_type(&env, array, TypeId::NUMBER), TypeId::STRING);

    let pair = interner.tuple(vec![element(TypeId::STRING), element(TypeId::NUMBER)]);
    assert_eq!(
        get_indexed_access_type(&env, pair, interner.literal_number(1.0)),
        TypeId::NUMBER
    );
    assert_eq!(
        get_indexed_access_type(&env, pair, TypeId::NUMBER),
        interner.union2(TypeId::STRING, TypeId::NUMBER)
    );

    let unchecked = TypeEnvironment::new(CheckerOptions {
        no_unchecked_indexed_access: true,
        ..CheckerOptions::strict()
    });
    let array = unchecked.interner().array(TypeId::STRING);
    assert_eq!(
        get_indexed_access_type(&unchecked, array, TypeId::NUMBER),
        unchecked.interner().union2(TypeId::STRING, TypeId::UNDEFINED)
    );
}

#[test]
fn test_generic_forms_stay_deferred() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let (_, t) = type_param(&env, "T");
    let key = interner.literal_string("a");

    let access = get_indexed_access_type(&env, t, key);
    assert_eq!(interner.lookup(access), Some(TypeData::IndexAccess(t, key)));
    assert_eq!(get_keyof_type(&env, t), interner.keyof(t));
    assert_eq!(evaluate_type(&env, access), access);
}

#[test]
fn test_keyof_object_and_index_signatures() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let object = interner.object_with_properties(vec![
        prop(&env, "x", TypeId::NUMBER, false, false),
        prop(&env, "y", TypeId::NUMBER, false, false),
    ]);
    assert_eq!(
        get_keyof_type(&env, object),
        interner.union2(interner.literal_string("x"), interner.literal_string("y"))
    );

    let dictionary = interner.object(ObjectShape {
        string_index: Some(IndexInfo {
            key_type: TypeId::STRING,
            value_type: TypeId::BOOLEAN,
            readonly: false,
        }),
        ..ObjectShape::anonymous()
    });
    assert_eq!(
        get_keyof_type(&env, dictionary),
        interner.union2(TypeId::STRING, TypeId::NUMBER)
    );
    assert_eq!(
        get_keyof_type(&env, TypeId::ANY),
        interner.union(vec![TypeId::STRING, TypeId::NUMBER, TypeId::SYMBOL])
    );
    assert_eq!(get_keyof_type(&env, TypeId::STRING), TypeId::NEVER);
}

#[test]
fn test_keyof_union_keeps_common_keys() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let left = interner.object_with_properties(vec![
        prop(&env, "shared", TypeId::NUMBER, false, false),
        prop(&env, "left", TypeId::NUMBER, false, false),
    ]);
    let right = interner.object_with_properties(vec![
        prop(&env, "shared", TypeId::STRING, false, false),
        prop(&env, "right", TypeId::NUMBER, false, false),
    ]);
    assert_eq!(
        get_keyof_type(&env, interner.union2(left, right)),
        interner.literal_string("shared")
    );
}

#[test]
fn test_mapped_type_over_literal_keys() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let (p, _) = type_param(&env, "P");
    let keys = interner.union2(interner.literal_string("a"), interner.literal_string("b"));

    let mapped = get_mapped_type(
        &env,
        MappedType {
            type_param: p,
            constraint: keys,
            template: TypeId::NUMBER,
            readonly_modifier: MappedModifier::None,
            optional_modifier: MappedModifier::None,
        },
    );
    let shape = env.resolve_shape(mapped).expect("object");
    assert!(shape.flags.contains(ObjectFlags::MAPPED));
    assert_eq!(shape.properties.len(), 2);
    assert!(shape.properties.iter().all(|p| p.type_id == TypeId::NUMBER && !p.optional));
}

#[test]
fn test_homomorphic_mapped_type_keeps_modifiers() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let source = interner.object_with_properties(vec![
        prop(&env, "id", TypeId::NUMBER, false, true),
        prop(&env, "name", TypeId::STRING, false, false),
    ]);
    let (p, p_type) = type_param(&env, "P");

    // { [P in keyof S]?: S[P] }
    let partial = get_mapped_type(
        &env,
        MappedType {
            type_param: p,
            constraint: interner.keyof(source),
            template: interner.index_access(source, p_type),
            readonly_modifier: MappedModifier::None,
            optional_modifier: MappedModifier::Add,
        },
    );
    let id = env.get_property_of_type(partial, "id").expect("id");
    assert_eq!(id.type_id, TypeId::NUMBER);
    assert!(id.optional);
    assert!(id.readonly);
    let name = env.get_property_of_type(partial, "name").expect("name");
    assert_eq!(name.type_id, TypeId::STRING);
    assert!(!name.readonly);
}

#[test]
fn test_conditional_resolution() {
    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let one = interner.literal_number(1.0);
    let two = interner.literal_number(2.0);
    let cond = |check_type, extends_type| ConditionalType {
        check_type,
        extends_type,
        true_type: one,
        false_type: two,
        is_distributive: false,
    };

    assert_eq!(
        get_conditional_type(&env, cond(interner.literal_string("a"), TypeId::STRING)),
        one
    );
    assert_eq!(get_conditional_type(&env, cond(TypeId::NUMBER, TypeId::STRING)), two);
    assert_eq!(
        get_conditional_type(&env, cond(TypeId::ANY, TypeId::STRING)),
        interner.union2(one, two)
    );

    let (_, t) = type_param(&env, "T");
    let deferred = get_conditional_type(&env, cond(t, TypeId::STRING));
    assert!(matches!(interner.lookup(deferred), Some(TypeData::Conditional(_))));
}

#[test]
fn test_evaluate_expands_alias_application() {
    let mut arena = DeclarationArena::new();
    let t = arena.type_parameter("T", None, None);
    arena.type_alias("Id", vec![t], TypeNode::array(TypeNode::named("T")));
    let env = TypeEnvironment::from_arena(arena, CheckerOptions::default());
    let alias = env.binder().globals.get("Id").expect("Id");
    let interner = env.interner();

    let application = interner.application(alias, vec![TypeId::STRING]);
    assert_eq!(evaluate_type(&env, application), interner.array(TypeId::STRING));
    assert_eq!(
        env.get_type_from_type_node(
            &TypeNode::reference("Id", vec![TypeNode::number()]),
            tyrel_binder::NodeIndex::NONE
        ),
        interner.array(TypeId::NUMBER)
    );
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_evaluation_emits_query_events() {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(move || writer.clone())
        .finish();

    let env = TypeEnvironment::new(CheckerOptions::default());
    let interner = env.interner();
    let object = interner.object_with_properties(vec![prop(&env, "x", TypeId::NUMBER, false, false)]);
    let keys = interner.keyof(object);
    tracing::subscriber::with_default(subscriber, || {
        assert_eq!(evaluate_type(&env, keys), interner.literal_string("x"));
        assert_eq!(evaluate_type(&env, keys), interner.literal_string("x"));
    });

    let output = String::from_utf8(log.0.lock().expect("log buffer").clone()).expect("utf8 log");
    let events: Vec<serde_json::Value> = output
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .filter(|event: &serde_json::Value| event["target"] == "tyrel::query")
        .collect();
    let ends: Vec<&serde_json::Value> = events
        .iter()
        .filter(|event| event["fields"]["op"] == "evaluate" && event["fields"]["phase"] == "end")
        .collect();
    assert_eq!(ends.len(), 2);
    assert_eq!(ends[0]["fields"]["cache_hit"], false);
    assert_eq!(ends[1]["fields"]["cache_hit"], true);
    let starts = events.iter().filter(|event| event["fields"]["phase"] == "start").count();
    assert_eq!(starts, 2);
}

#[test]
fn test_numeric_property_names() {
    assert!(is_numeric_name("1"));
    assert!(is_numeric_name("1.5"));
    assert!(!is_numeric_name("01"));
    assert!(!is_numeric_name("x"));
    assert_eq!(format_number_key(3.0), "3");
    assert_eq!(format_number_key(f64::NAN), "NaN");
}
