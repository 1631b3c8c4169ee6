//! Type interning for structural deduplication.
//!
//! This module implements the interning engine that turns `TypeData` keys
//! into lightweight `TypeId` handles.
//!
//! Benefits:
//! - O(1) type equality (compare ids)
//! - Each unique structure is stored once
//! - Every memo table can be keyed by a `u32`
//!
//! Union and intersection construction normalize their members here, so the
//! same member set always produces the same id.
//!
//! The interner belongs to one program snapshot and is single-threaded:
//! storage sits behind `RefCell`s so the rest of the engine can work with
//! `&TypeInterner`.

use crate::error::SolverError;
use crate::types::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;
use tyrel_binder::SymbolId;
use tyrel_common::interner::{Atom, Interner};
use tyrel_common::limits::{MAX_DISTRIBUTION_SIZE, TYPE_LIST_INLINE};

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

/// Free type parameters of a type, sorted and deduplicated.
pub type FreeParams = Rc<[TypeParamId]>;

struct SliceInterner<T> {
    items: Vec<Rc<[T]>>,
    map: FxHashMap<Rc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Rc<[T]> = Rc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }
        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }
        let rc: Rc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(rc.clone());
        self.map.insert(rc, id);
        id
    }

    fn get(&self, id: u32) -> Rc<[T]> {
        self.items
            .get(id as usize)
            .cloned()
            .unwrap_or_else(|| self.items[0].clone())
    }
}

struct ValueInterner<T> {
    items: Vec<Rc<T>>,
    map: FxHashMap<Rc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }
        let rc = Rc::new(value);
        let id = self.items.len() as u32;
        self.items.push(rc.clone());
        self.map.insert(rc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Rc<T>> {
        self.items.get(id as usize).cloned()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PrimitiveDomain {
    String,
    Number,
    Boolean,
    Bigint,
    Symbol,
    Null,
    Undefined,
    Void,
}

pub struct TypeInterner {
    types: RefCell<Vec<TypeData>>,
    free_params: RefCell<Vec<FreeParams>>,
    type_map: RefCell<FxHashMap<TypeData, TypeId>>,
    type_lists: RefCell<SliceInterner<TypeId>>,
    tuple_lists: RefCell<SliceInterner<TupleElement>>,
    object_shapes: RefCell<ValueInterner<ObjectShape>>,
    applications: RefCell<ValueInterner<TypeApplication>>,
    conditionals: RefCell<ValueInterner<ConditionalType>>,
    mapped_types: RefCell<ValueInterner<MappedType>>,
    signatures: RefCell<Vec<(Rc<Signature>, FreeParams)>>,
    type_params: RefCell<Vec<TypeParamInfo>>,
    atoms: RefCell<Interner>,
    empty_params: FreeParams,
}

impl TypeInterner {
    pub fn new() -> Self {
        let mut atoms = Interner::new();
        atoms.intern_common();
        let empty_params: FreeParams = Rc::from(Vec::new());
        let interner = TypeInterner {
            types: RefCell::new(Vec::new()),
            free_params: RefCell::new(Vec::new()),
            type_map: RefCell::new(FxHashMap::default()),
            type_lists: RefCell::new(SliceInterner::new()),
            tuple_lists: RefCell::new(SliceInterner::new()),
            object_shapes: RefCell::new(ValueInterner::new()),
            applications: RefCell::new(ValueInterner::new()),
            conditionals: RefCell::new(ValueInterner::new()),
            mapped_types: RefCell::new(ValueInterner::new()),
            signatures: RefCell::new(Vec::new()),
            type_params: RefCell::new(Vec::new()),
            atoms: RefCell::new(atoms),
            empty_params,
        };
        for kind in IntrinsicKind::ALL {
            interner.intern(TypeData::Intrinsic(kind));
        }
        interner.intern(TypeData::Literal(LiteralValue::Boolean(true)));
        interner.intern(TypeData::Literal(LiteralValue::Boolean(false)));
        debug_assert_eq!(interner.type_count(), TypeId::FIRST_USER as usize);
        interner
    }

    // =========================================================================
    // Core interning
    // =========================================================================

    /// Intern a structural key. The same key always yields the same id.
    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(&id) = self.type_map.borrow().get(&data) {
            return id;
        }
        let free = self.compute_free_params(&data);
        let mut types = self.types.borrow_mut();
        let id = TypeId(types.len() as u32);
        types.push(data);
        self.free_params.borrow_mut().push(free);
        self.type_map.borrow_mut().insert(data, id);
        id
    }

    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        self.types.borrow().get(id.0 as usize).copied()
    }

    pub fn type_count(&self) -> usize {
        self.types.borrow().len()
    }

    /// Free type parameters of `id`.
    pub fn free_type_params(&self, id: TypeId) -> FreeParams {
        self.free_params
            .borrow()
            .get(id.0 as usize)
            .cloned()
            .unwrap_or_else(|| self.empty_params.clone())
    }

    /// Whether `id` mentions a type parameter it does not itself bind.
    pub fn contains_type_params(&self, id: TypeId) -> bool {
        self.free_params
            .borrow()
            .get(id.0 as usize)
            .is_some_and(|free| !free.is_empty())
    }

    fn compute_free_params(&self, data: &TypeData) -> FreeParams {
        let mut acc: Vec<TypeParamId> = Vec::new();
        match *data {
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::EnumLiteral(..) => {}
            TypeData::TypeParameter(tp) => acc.push(tp),
            TypeData::Union(list) | TypeData::Intersection(list) => {
                for &member in self.type_list(list).iter() {
                    self.extend_free(&mut acc, member);
                }
            }
            TypeData::Array(element) | TypeData::KeyOf(element) => {
                self.extend_free(&mut acc, element)
            }
            TypeData::Tuple(list) => {
                for element in self.tuple_list(list).iter() {
                    self.extend_free(&mut acc, element.type_id);
                }
            }
            TypeData::Object(shape_id) => {
                let shape = self.object_shape(shape_id);
                for prop in &shape.properties {
                    self.extend_free(&mut acc, prop.type_id);
                }
                for &sig in shape
                    .call_signatures
                    .iter()
                    .chain(&shape.construct_signatures)
                {
                    acc.extend(self.signature_free_params(sig).iter().copied());
                }
                for info in shape.string_index.iter().chain(&shape.number_index) {
                    self.extend_free(&mut acc, info.key_type);
                    self.extend_free(&mut acc, info.value_type);
                }
            }
            TypeData::Application(app_id) => {
                if let Some(app) = self.applications.borrow().get(app_id.0) {
                    for &arg in &app.args {
                        self.extend_free(&mut acc, arg);
                    }
                }
            }
            TypeData::Conditional(cond_id) => {
                if let Some(cond) = self.conditional_type(cond_id) {
                    for part in [
                        cond.check_type,
                        cond.extends_type,
                        cond.true_type,
                        cond.false_type,
                    ] {
                        self.extend_free(&mut acc, part);
                    }
                }
            }
            TypeData::Mapped(mapped_id) => {
                if let Some(mapped) = self.mapped_type(mapped_id) {
                    self.extend_free(&mut acc, mapped.constraint);
                    let own = mapped.type_param;
                    acc.extend(
                        self.free_type_params(mapped.template)
                            .iter()
                            .copied()
                            .filter(|&tp| tp != own),
                    );
                }
            }
            TypeData::IndexAccess(object, index) => {
                self.extend_free(&mut acc, object);
                self.extend_free(&mut acc, index);
            }
        }
        self.finish_free(acc)
    }

    fn extend_free(&self, acc: &mut Vec<TypeParamId>, id: TypeId) {
        acc.extend(self.free_type_params(id).iter().copied());
    }

    fn finish_free(&self, mut acc: Vec<TypeParamId>) -> FreeParams {
        if acc.is_empty() {
            return self.empty_params.clone();
        }
        acc.sort_unstable();
        acc.dedup();
        Rc::from(acc)
    }

    // =========================================================================
    // Strings
    // =========================================================================

    pub fn intern_string(&self, s: &str) -> Atom {
        self.atoms.borrow_mut().intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Rc<str> {
        self.atoms.borrow().resolve_shared(atom)
    }

    // =========================================================================
    // Payload accessors
    // =========================================================================

    pub fn type_list(&self, id: TypeListId) -> Rc<[TypeId]> {
        self.type_lists.borrow().get(id.0)
    }

    pub fn tuple_list(&self, id: TupleListId) -> Rc<[TupleElement]> {
        self.tuple_lists.borrow().get(id.0)
    }

    pub fn object_shape(&self, id: ObjectShapeId) -> Rc<ObjectShape> {
        self.object_shapes
            .borrow()
            .get(id.0)
            .unwrap_or_else(|| Rc::new(ObjectShape::anonymous()))
    }

    pub fn type_application(&self, id: TypeApplicationId) -> Option<Rc<TypeApplication>> {
        self.applications.borrow().get(id.0)
    }

    pub fn conditional_type(&self, id: ConditionalTypeId) -> Option<ConditionalType> {
        self.conditionals.borrow().get(id.0).map(|c| *c)
    }

    pub fn mapped_type(&self, id: MappedTypeId) -> Option<MappedType> {
        self.mapped_types.borrow().get(id.0).map(|m| *m)
    }

    /// Members of a union or intersection; a single-element slice otherwise.
    pub fn members(&self, id: TypeId) -> Rc<[TypeId]> {
        match self.lookup(id) {
            Some(TypeData::Union(list)) | Some(TypeData::Intersection(list)) => {
                self.type_list(list)
            }
            _ => Rc::from(vec![id]),
        }
    }

    pub fn union_members(&self, id: TypeId) -> Option<Rc<[TypeId]>> {
        match self.lookup(id) {
            Some(TypeData::Union(list)) => Some(self.type_list(list)),
            _ => None,
        }
    }

    pub fn intersection_members(&self, id: TypeId) -> Option<Rc<[TypeId]>> {
        match self.lookup(id) {
            Some(TypeData::Intersection(list)) => Some(self.type_list(list)),
            _ => None,
        }
    }

    pub fn literal_value(&self, id: TypeId) -> Option<LiteralValue> {
        match self.lookup(id) {
            Some(TypeData::Literal(value)) => Some(value),
            _ => None,
        }
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn literal_string(&self, value: &str) -> TypeId {
        let atom = self.intern_string(value);
        self.intern(TypeData::Literal(LiteralValue::String(atom)))
    }

    pub fn literal_number(&self, value: f64) -> TypeId {
        self.intern(TypeData::Literal(LiteralValue::Number(OrderedFloat(value))))
    }

    pub fn literal_boolean(&self, value: bool) -> TypeId {
        if value {
            TypeId::BOOLEAN_TRUE
        } else {
            TypeId::BOOLEAN_FALSE
        }
    }

    pub fn literal_bigint(&self, digits: &str) -> TypeId {
        let atom = self.intern_string(digits);
        self.intern(TypeData::Literal(LiteralValue::BigInt(atom)))
    }

    pub fn enum_literal(&self, member: SymbolId, value: TypeId) -> TypeId {
        self.intern(TypeData::EnumLiteral(member, value))
    }

    pub fn object(&self, shape: ObjectShape) -> TypeId {
        let id = ObjectShapeId(self.object_shapes.borrow_mut().intern(shape));
        self.intern(TypeData::Object(id))
    }

    /// Anonymous object type with the given properties and nothing else.
    pub fn object_with_properties(&self, properties: Vec<PropertyInfo>) -> TypeId {
        self.object(ObjectShape {
            properties,
            ..ObjectShape::anonymous()
        })
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Array(element))
    }

    pub fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        let id = TupleListId(self.tuple_lists.borrow_mut().intern(elements));
        self.intern(TypeData::Tuple(id))
    }

    pub fn application(&self, target: SymbolId, args: Vec<TypeId>) -> TypeId {
        let id = TypeApplicationId(
            self.applications
                .borrow_mut()
                .intern(TypeApplication { target, args }),
        );
        self.intern(TypeData::Application(id))
    }

    pub fn conditional(&self, conditional: ConditionalType) -> TypeId {
        let id = ConditionalTypeId(self.conditionals.borrow_mut().intern(conditional));
        self.intern(TypeData::Conditional(id))
    }

    pub fn mapped(&self, mapped: MappedType) -> TypeId {
        let id = MappedTypeId(self.mapped_types.borrow_mut().intern(mapped));
        self.intern(TypeData::Mapped(id))
    }

    pub fn index_access(&self, object: TypeId, index: TypeId) -> TypeId {
        self.intern(TypeData::IndexAccess(object, index))
    }

    pub fn keyof(&self, operand: TypeId) -> TypeId {
        self.intern(TypeData::KeyOf(operand))
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    pub fn fresh_type_param(&self, name: Atom, symbol: SymbolId) -> TypeParamId {
        let mut params = self.type_params.borrow_mut();
        let id = TypeParamId(params.len() as u32);
        params.push(TypeParamInfo {
            name,
            symbol,
            constraint: None,
            default: None,
            constraint_set: false,
        });
        id
    }

    pub fn type_param_info(&self, id: TypeParamId) -> Option<TypeParamInfo> {
        self.type_params.borrow().get(id.0 as usize).cloned()
    }

    pub fn type_param_type(&self, id: TypeParamId) -> TypeId {
        self.intern(TypeData::TypeParameter(id))
    }

    /// Fill in the constraint and default of a type parameter.
    ///
    /// The transition happens once; a second call is an invariant violation.
    pub fn set_type_param_constraint(
        &self,
        id: TypeParamId,
        constraint: Option<TypeId>,
        default: Option<TypeId>,
    ) -> Result<(), SolverError> {
        let mut params = self.type_params.borrow_mut();
        let Some(info) = params.get_mut(id.0 as usize) else {
            return Err(SolverError::ConstraintAlreadySet(format!("#{}", id.0)));
        };
        if info.constraint_set {
            let name = info.name;
            drop(params);
            return Err(SolverError::ConstraintAlreadySet(
                self.resolve_atom(name).to_string(),
            ));
        }
        info.constraint = constraint;
        info.default = default;
        info.constraint_set = true;
        Ok(())
    }

    pub fn type_param_constraint(&self, id: TypeParamId) -> Option<TypeId> {
        self.type_params
            .borrow()
            .get(id.0 as usize)
            .and_then(|info| info.constraint)
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// Allocate a signature. Signatures are identified per allocation.
    pub fn alloc_signature(&self, signature: Signature) -> SignatureId {
        let mut acc = Vec::new();
        for param in &signature.params {
            self.extend_free(&mut acc, param.type_id);
        }
        if let Some(this_type) = signature.this_type {
            self.extend_free(&mut acc, this_type);
        }
        self.extend_free(&mut acc, signature.return_type);
        acc.retain(|tp| !signature.type_params.contains(tp));
        let free = self.finish_free(acc);

        let mut signatures = self.signatures.borrow_mut();
        let id = SignatureId(signatures.len() as u32);
        signatures.push((Rc::new(signature), free));
        id
    }

    pub fn signature(&self, id: SignatureId) -> Option<Rc<Signature>> {
        self.signatures
            .borrow()
            .get(id.0 as usize)
            .map(|(sig, _)| sig.clone())
    }

    pub fn signature_free_params(&self, id: SignatureId) -> FreeParams {
        self.signatures
            .borrow()
            .get(id.0 as usize)
            .map(|(_, free)| free.clone())
            .unwrap_or_else(|| self.empty_params.clone())
    }

    // =========================================================================
    // Unions
    // =========================================================================

    /// Union with literal reduction.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.union_with(members, UnionReduction::Literal)
    }

    pub fn union2(&self, a: TypeId, b: TypeId) -> TypeId {
        self.union(vec![a, b])
    }

    /// Build a union.
    ///
    /// Flattens nested unions, lets `error`/`any`/`unknown` absorb everything,
    /// drops `never`, sorts and deduplicates by id, and folds `true | false`
    /// into `boolean`. The reduction mode decides what else is dropped.
    pub fn union_with(&self, members: Vec<TypeId>, reduction: UnionReduction) -> TypeId {
        let mut flat = TypeListBuffer::new();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Union(list)) => flat.extend(self.type_list(list).iter().copied()),
                _ => flat.push(member),
            }
        }

        if flat.contains(&TypeId::ERROR) {
            return TypeId::ERROR;
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        if flat.contains(&TypeId::UNKNOWN) {
            return TypeId::UNKNOWN;
        }
        flat.retain(|t| *t != TypeId::NEVER && *t != TypeId::NONE);
        flat.sort_unstable();
        flat.dedup();

        if flat.contains(&TypeId::BOOLEAN_TRUE) && flat.contains(&TypeId::BOOLEAN_FALSE) {
            flat.retain(|t| *t != TypeId::BOOLEAN_TRUE && *t != TypeId::BOOLEAN_FALSE);
            if !flat.contains(&TypeId::BOOLEAN) {
                flat.push(TypeId::BOOLEAN);
                flat.sort_unstable();
            }
        }

        if reduction != UnionReduction::None {
            self.remove_absorbed_literals(&mut flat);
        }
        if reduction == UnionReduction::Subtype {
            self.remove_definite_subtypes(&mut flat);
        }

        match flat.len() {
            0 => TypeId::NEVER,
            1 => flat[0],
            _ => {
                let list = TypeListId(self.type_lists.borrow_mut().intern(flat.to_vec()));
                self.intern(TypeData::Union(list))
            }
        }
    }

    fn remove_absorbed_literals(&self, flat: &mut TypeListBuffer) {
        let has = |t: TypeId| flat.contains(&t);
        let (has_string, has_number, has_boolean, has_bigint) = (
            has(TypeId::STRING),
            has(TypeId::NUMBER),
            has(TypeId::BOOLEAN),
            has(TypeId::BIGINT),
        );
        if !(has_string || has_number || has_boolean || has_bigint) {
            return;
        }
        flat.retain(|t| match self.widened_literal_primitive(*t) {
            Some(TypeId::STRING) => !has_string,
            Some(TypeId::NUMBER) => !has_number,
            Some(TypeId::BOOLEAN) => !has_boolean,
            Some(TypeId::BIGINT) => !has_bigint,
            _ => true,
        });
    }

    /// For literal and enum literal types, the primitive they belong to.
    pub fn widened_literal_primitive(&self, id: TypeId) -> Option<TypeId> {
        match self.lookup(id)? {
            TypeData::Literal(value) => Some(value.primitive()),
            TypeData::EnumLiteral(_, value) => self.literal_value(value).map(|v| v.primitive()),
            _ => None,
        }
    }

    fn remove_definite_subtypes(&self, flat: &mut TypeListBuffer) {
        let snapshot: TypeListBuffer = flat.clone();
        flat.retain(|candidate| {
            !snapshot
                .iter()
                .any(|other| other != candidate && self.is_definitely_subtype(*candidate, *other))
        });
    }

    /// Flag-level subtype test used by union reduction.
    ///
    /// Never compares object structure, so it cannot re-enter the relation
    /// checker.
    pub fn is_definitely_subtype(&self, source: TypeId, target: TypeId) -> bool {
        if source == target {
            return true;
        }
        if target == TypeId::ANY || target == TypeId::UNKNOWN {
            return true;
        }
        if source == TypeId::NEVER {
            return true;
        }
        match self.lookup(source) {
            Some(TypeData::Literal(value)) => target == value.primitive(),
            Some(TypeData::EnumLiteral(_, value)) => {
                target == value || self.widened_literal_primitive(source) == Some(target)
            }
            Some(TypeData::Intrinsic(IntrinsicKind::Undefined)) => target == TypeId::VOID,
            Some(
                TypeData::Object(_)
                | TypeData::Array(_)
                | TypeData::Tuple(_)
                | TypeData::Application(_),
            ) => target == TypeId::OBJECT,
            _ => false,
        }
    }

    // =========================================================================
    // Intersections
    // =========================================================================

    /// Build an intersection.
    ///
    /// Flattens, sorts and deduplicates; `never`, `any` and `error` absorb,
    /// `unknown` is dropped, disjoint primitives collapse to `never`, and an
    /// intersection containing unions is distributed into a union of
    /// intersections.
    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat = TypeListBuffer::new();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Intersection(list)) => {
                    flat.extend(self.type_list(list).iter().copied())
                }
                _ => flat.push(member),
            }
        }

        if flat.contains(&TypeId::ERROR) {
            return TypeId::ERROR;
        }
        if flat.contains(&TypeId::NEVER) {
            return TypeId::NEVER;
        }
        if flat.contains(&TypeId::ANY) {
            return TypeId::ANY;
        }
        flat.retain(|t| *t != TypeId::UNKNOWN && *t != TypeId::NONE);
        flat.sort_unstable();
        flat.dedup();

        if self.has_disjoint_primitives(&flat) {
            return TypeId::NEVER;
        }
        // A literal together with its own primitive is just the literal.
        let literal_primitives: TypeListBuffer = flat
            .iter()
            .filter_map(|t| self.widened_literal_primitive(*t))
            .collect();
        flat.retain(|t| !literal_primitives.contains(t));

        if let Some(pos) = flat
            .iter()
            .position(|t| matches!(self.lookup(*t), Some(TypeData::Union(_))))
        {
            return self.distribute_intersection(&flat, pos);
        }

        match flat.len() {
            0 => TypeId::UNKNOWN,
            1 => flat[0],
            _ => {
                let list = TypeListId(self.type_lists.borrow_mut().intern(flat.to_vec()));
                self.intern(TypeData::Intersection(list))
            }
        }
    }

    fn distribute_intersection(&self, flat: &TypeListBuffer, union_pos: usize) -> TypeId {
        let union_members = self.members(flat[union_pos]);
        let rest_size: usize = flat
            .iter()
            .filter_map(|t| self.union_members(*t).map(|m| m.len()))
            .product();
        if rest_size > MAX_DISTRIBUTION_SIZE {
            let list = TypeListId(self.type_lists.borrow_mut().intern(flat.to_vec()));
            return self.intern(TypeData::Intersection(list));
        }
        let mut results = Vec::with_capacity(union_members.len());
        for &member in union_members.iter() {
            let mut parts: Vec<TypeId> = flat.to_vec();
            parts[union_pos] = member;
            results.push(self.intersection(parts));
        }
        self.union(results)
    }

    fn primitive_domain(&self, id: TypeId) -> Option<PrimitiveDomain> {
        let domain = match self.lookup(id)? {
            TypeData::Intrinsic(kind) => match kind {
                IntrinsicKind::String => PrimitiveDomain::String,
                IntrinsicKind::Number => PrimitiveDomain::Number,
                IntrinsicKind::Boolean => PrimitiveDomain::Boolean,
                IntrinsicKind::Bigint => PrimitiveDomain::Bigint,
                IntrinsicKind::Symbol => PrimitiveDomain::Symbol,
                IntrinsicKind::Null => PrimitiveDomain::Null,
                IntrinsicKind::Undefined => PrimitiveDomain::Undefined,
                IntrinsicKind::Void => PrimitiveDomain::Void,
                _ => return None,
            },
            TypeData::Literal(value) => match value {
                LiteralValue::String(_) => PrimitiveDomain::String,
                LiteralValue::Number(_) => PrimitiveDomain::Number,
                LiteralValue::Boolean(_) => PrimitiveDomain::Boolean,
                LiteralValue::BigInt(_) => PrimitiveDomain::Bigint,
            },
            TypeData::EnumLiteral(_, value) => return self.primitive_domain(value),
            _ => return None,
        };
        Some(domain)
    }

    fn has_disjoint_primitives(&self, flat: &TypeListBuffer) -> bool {
        let mut seen_domain: Option<PrimitiveDomain> = None;
        let mut seen_unit: Option<TypeId> = None;
        for &member in flat {
            let Some(domain) = self.primitive_domain(member) else {
                continue;
            };
            match seen_domain {
                Some(existing) if existing != domain => {
                    // `undefined & void` is `undefined`
                    let undefined_void = matches!(
                        (existing, domain),
                        (PrimitiveDomain::Undefined, PrimitiveDomain::Void)
                            | (PrimitiveDomain::Void, PrimitiveDomain::Undefined)
                    );
                    if !undefined_void {
                        return true;
                    }
                }
                _ => seen_domain = Some(domain),
            }
            let is_unit = matches!(
                self.lookup(member),
                Some(TypeData::Literal(_) | TypeData::EnumLiteral(..))
            );
            if is_unit {
                let value = match self.lookup(member) {
                    Some(TypeData::EnumLiteral(_, value)) => value,
                    _ => member,
                };
                match seen_unit {
                    Some(existing) if existing != value => return true,
                    _ => seen_unit = Some(value),
                }
            }
        }
        false
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
