//! Member resolution for object-like types.
//!
//! Interface and class references stay lazy `Application`s in the type graph.
//! Their members are resolved here on first demand: the own structure of the
//! target symbol (own members plus merged base members, with the target's type
//! parameters free) is built once per symbol, then instantiated per
//! application and cached.

use crate::env::TypeEnvironment;
use crate::evaluate::{self, tuple_element_value};
use crate::instantiate::{TypeMapper, instantiate_type_with_id};
use crate::types::*;
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::{debug, trace};
use tyrel_binder::{DeclarationKind, NodeIndex, SymbolId, TypeNode, internal_names, modifier_flags, symbol_flags};
use tyrel_common::interner::Atom;

const MAX_SHAPE_DEPTH: u32 = 50;

impl TypeEnvironment {
    // =========================================================================
    // Bases
    // =========================================================================

    /// Types named in the `extends` clauses of an interface or class, in
    /// declaration order across merged declarations.
    pub fn base_types(&self, symbol: SymbolId) -> Vec<TypeId> {
        self.heritage_types(symbol, false)
    }

    /// Types named in the `implements` clauses of a class.
    pub fn implemented_types(&self, symbol: SymbolId) -> Vec<TypeId> {
        self.heritage_types(symbol, true)
    }

    fn heritage_types(&self, symbol: SymbolId, implements_clause: bool) -> Vec<TypeId> {
        let arena = self.arena();
        let Some(sym) = self.symbol(symbol) else {
            return Vec::new();
        };
        let mut types = Vec::new();
        for &decl_idx in &sym.declarations {
            let nodes: Vec<&TypeNode> = match arena.get(decl_idx).map(|d| &d.kind) {
                Some(DeclarationKind::Interface { extends, .. }) if !implements_clause => extends.iter().collect(),
                Some(DeclarationKind::Class { extends, .. }) if !implements_clause => extends.iter().collect(),
                Some(DeclarationKind::Class { implements, .. }) if implements_clause => implements.iter().collect(),
                _ => continue,
            };
            types.extend(nodes.into_iter().map(|node| self.get_type_from_type_node(node, decl_idx)));
        }
        types
    }

    // =========================================================================
    // Own structure
    // =========================================================================

    /// The resolved members of an interface or class with its own type
    /// parameters free. Circular inheritance yields the members resolved so
    /// far and marks the symbols involved.
    pub(crate) fn own_structure(&self, symbol: SymbolId) -> TypeId {
        match self.with_links(symbol, |links| links.structure) {
            ResolutionState::Resolved(type_id) => return type_id,
            ResolutionState::Resolving => {
                debug!(symbol = symbol.0, "structure re-entered while resolving");
                return self.interner().object(ObjectShape::anonymous());
            }
            ResolutionState::Unresolved => {}
        }
        self.with_links(symbol, |links| links.structure = ResolutionState::Resolving);

        let mut shape = self.own_members(symbol);
        for base in self.base_types(symbol) {
            if let Some(TypeData::Application(app_id)) = self.interner().lookup(base) {
                if let Some(app) = self.interner().type_application(app_id) {
                    let base_resolving = self
                        .read_links(app.target, |links| links.structure.is_resolving())
                        .unwrap_or(false);
                    if app.target == symbol || base_resolving {
                        debug!(symbol = symbol.0, base = app.target.0, "circular base type");
                        self.mark_circular_base(symbol);
                        self.mark_circular_base(app.target);
                        continue;
                    }
                }
            }
            let Some(base_shape) = self.resolve_shape(base) else {
                continue;
            };
            merge_base_shape(&mut shape, &base_shape);
        }
        if !shape.call_signatures.is_empty() || !shape.construct_signatures.is_empty() {
            shape.flags |= ObjectFlags::FUNCTION_LIKE;
        }

        let result = self.interner().object(shape);
        self.with_links(symbol, |links| links.structure = ResolutionState::Resolved(result));
        trace!(symbol = symbol.0, type_id = result.0, "structure resolved");
        result
    }

    fn own_members(&self, symbol: SymbolId) -> ObjectShape {
        let mut flags = ObjectFlags::empty();
        if let Some(sym) = self.symbol(symbol) {
            if sym.has_flags(symbol_flags::CLASS) {
                flags |= ObjectFlags::CLASS;
            }
            if sym.has_flags(symbol_flags::INTERFACE) {
                flags |= ObjectFlags::INTERFACE;
            }
        }
        if !self.type_params_of(symbol).is_empty() {
            flags |= ObjectFlags::GENERIC;
        }
        let mut shape = ObjectShape {
            symbol,
            flags,
            ..ObjectShape::anonymous()
        };

        let Some(members) = self.binder().get_members(symbol) else {
            return shape;
        };
        let members: Vec<(String, SymbolId)> = members.iter().map(|(n, id)| (n.to_string(), id)).collect();
        for (escaped, member) in members {
            match escaped.as_str() {
                internal_names::CALL => {
                    shape.call_signatures.extend(self.member_signatures(member));
                }
                internal_names::NEW => {
                    shape.construct_signatures.extend(self.member_signatures(member));
                }
                internal_names::INDEX => self.add_index_signatures(member, &mut shape),
                internal_names::CONSTRUCTOR => {}
                _ => {
                    if let Some(info) = self.member_property(&escaped, member) {
                        shape.properties.push(info);
                    }
                }
            }
        }
        shape
    }

    fn member_signatures(&self, member: SymbolId) -> Vec<SignatureId> {
        let Some(sym) = self.symbol(member) else {
            return Vec::new();
        };
        let mut signatures = Vec::with_capacity(sym.declarations.len());
        for &decl_idx in &sym.declarations {
            match self.signature_of_declaration(decl_idx) {
                Ok(sig) => signatures.push(sig),
                Err(error) => self.record_violation(error),
            }
        }
        signatures
    }

    fn add_index_signatures(&self, member: SymbolId, shape: &mut ObjectShape) {
        let Some(sym) = self.symbol(member) else {
            return;
        };
        for &decl_idx in &sym.declarations {
            let Some(decl) = self.arena().get(decl_idx) else {
                continue;
            };
            let DeclarationKind::IndexSignature { parameter_type, ty } = &decl.kind else {
                continue;
            };
            let key_type = self.get_type_from_type_node(parameter_type, decl_idx);
            let info = IndexInfo {
                key_type,
                value_type: self.get_type_from_type_node(ty, decl_idx),
                readonly: decl.has_modifier(modifier_flags::READONLY),
            };
            match key_type {
                TypeId::STRING => shape.string_index = Some(info),
                TypeId::NUMBER => shape.number_index = Some(info),
                _ => {}
            }
        }
    }

    fn member_property(&self, escaped: &str, member: SymbolId) -> Option<PropertyInfo> {
        let interner = self.interner();
        let sym = self.symbol(member)?;
        let is_method = sym.has_flags(symbol_flags::METHOD);
        let type_id = if is_method {
            self.get_type_of_symbol(member)
        } else if sym.has_flags(symbol_flags::PROPERTY) {
            match self.annotated_type_of_symbol(member) {
                Ok(type_id) => type_id,
                Err(error) => {
                    self.record_violation(error);
                    TypeId::ERROR
                }
            }
        } else {
            return None;
        };
        Some(PropertyInfo {
            name: interner.intern_string(tyrel_binder::unescape_name(escaped)),
            type_id,
            optional: sym.has_flags(symbol_flags::OPTIONAL),
            readonly: sym.has_flags(symbol_flags::READONLY),
            is_method,
            symbol: member,
        })
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Members of an interface or class application.
    pub(crate) fn expand_reference(&self, app_id: TypeApplicationId) -> Option<TypeId> {
        if let Some(&cached) = self.expansion_cache.borrow().get(&app_id) {
            return Some(cached);
        }
        let app = self.interner().type_application(app_id)?;
        let structure = self.own_structure(app.target);
        let settled = self
            .read_links(app.target, |links| links.structure.resolved().is_some())
            .unwrap_or(false);
        let params = self.type_params_of(app.target);
        let expanded = if params.is_empty() {
            structure
        } else {
            let mapper = self.intern_mapper(TypeMapper::new(&params, &app.args));
            instantiate_type_with_id(self, structure, mapper)
        };
        if settled {
            self.expansion_cache.borrow_mut().insert(app_id, expanded);
        }
        Some(expanded)
    }

    /// The body of a type alias application, or `None` when the target is
    /// not an alias or is still being lowered.
    pub(crate) fn expand_alias(&self, app_id: TypeApplicationId) -> Option<TypeId> {
        let app = self.interner().type_application(app_id)?;
        let is_alias = self
            .symbol(app.target)
            .is_some_and(|s| s.has_flags(symbol_flags::TYPE_ALIAS));
        if !is_alias {
            return None;
        }
        if let Some(&cached) = self.alias_cache.borrow().get(&app_id) {
            return Some(cached);
        }
        let resolving = self
            .read_links(app.target, |links| links.declared_type.is_resolving())
            .unwrap_or(false);
        if resolving {
            return None;
        }
        let declared = self.get_declared_type_of_symbol(app.target);
        let params = self.type_params_of(app.target);
        let expanded = if params.is_empty() {
            declared
        } else {
            let mapper = self.intern_mapper(TypeMapper::new(&params, &app.args));
            instantiate_type_with_id(self, declared, mapper)
        };
        self.alias_cache.borrow_mut().insert(app_id, expanded);
        Some(expanded)
    }

    /// Whether `type_id` references an interface or class target (not an alias).
    pub(crate) fn is_structured_reference(&self, type_id: TypeId) -> Option<Rc<TypeApplication>> {
        let TypeData::Application(app_id) = self.interner().lookup(type_id)? else {
            return None;
        };
        let app = self.interner().type_application(app_id)?;
        self.symbol(app.target)
            .is_some_and(|s| s.has_flags(symbol_flags::HAS_STRUCTURE))
            .then_some(app)
    }

    // =========================================================================
    // Shapes
    // =========================================================================

    /// The object shape of a type, if it has one.
    ///
    /// References expand to their members, intersections merge, type
    /// parameters use their constraint, arrays and tuples get their
    /// structural view. Primitives have no shape.
    pub fn resolve_shape(&self, type_id: TypeId) -> Option<Rc<ObjectShape>> {
        self.resolve_shape_at(type_id, 0)
    }

    fn resolve_shape_at(&self, type_id: TypeId, depth: u32) -> Option<Rc<ObjectShape>> {
        if depth >= MAX_SHAPE_DEPTH {
            debug!(type_id = type_id.0, "shape resolution too deep");
            return None;
        }
        let interner = self.interner();
        match interner.lookup(type_id)? {
            TypeData::Object(shape_id) => Some(interner.object_shape(shape_id)),
            TypeData::Application(app_id) => {
                let app = interner.type_application(app_id)?;
                let is_alias = self
                    .symbol(app.target)
                    .is_some_and(|s| s.has_flags(symbol_flags::TYPE_ALIAS));
                let expanded = if is_alias {
                    self.expand_alias(app_id)?
                } else {
                    self.expand_reference(app_id)?
                };
                if expanded == type_id {
                    return None;
                }
                self.resolve_shape_at(expanded, depth + 1)
            }
            TypeData::Intersection(list) => {
                let shapes: Vec<Rc<ObjectShape>> = interner
                    .type_list(list)
                    .iter()
                    .filter_map(|&m| self.resolve_shape_at(m, depth + 1))
                    .collect();
                if shapes.is_empty() {
                    return None;
                }
                Some(Rc::new(self.merge_intersection_shapes(&shapes)))
            }
            TypeData::TypeParameter(param) => {
                let constraint = interner.type_param_constraint(param)?;
                self.resolve_shape_at(constraint, depth + 1)
            }
            TypeData::Conditional(_) | TypeData::IndexAccess(..) | TypeData::KeyOf(_) | TypeData::Mapped(_) => {
                let evaluated = evaluate::evaluate_type(self, type_id);
                if evaluated == type_id {
                    return None;
                }
                self.resolve_shape_at(evaluated, depth + 1)
            }
            TypeData::Array(element) => Some(Rc::new(self.array_shape(element))),
            TypeData::Tuple(list) => Some(Rc::new(self.tuple_shape(&interner.tuple_list(list)))),
            TypeData::Intrinsic(_) | TypeData::Literal(_) | TypeData::EnumLiteral(..) | TypeData::Union(_) => None,
        }
    }

    fn length_property(&self, type_id: TypeId) -> PropertyInfo {
        PropertyInfo {
            name: self.interner().intern_string("length"),
            type_id,
            optional: false,
            readonly: false,
            is_method: false,
            symbol: SymbolId::NONE,
        }
    }

    fn array_shape(&self, element: TypeId) -> ObjectShape {
        ObjectShape {
            flags: ObjectFlags::ARRAY,
            properties: vec![self.length_property(TypeId::NUMBER)],
            number_index: Some(IndexInfo {
                key_type: TypeId::NUMBER,
                value_type: element,
                readonly: false,
            }),
            ..ObjectShape::anonymous()
        }
    }

    fn tuple_shape(&self, elements: &[TupleElement]) -> ObjectShape {
        let interner = self.interner();
        let mut properties = Vec::with_capacity(elements.len() + 1);
        for (i, element) in elements.iter().enumerate().take_while(|(_, e)| !e.rest) {
            properties.push(PropertyInfo {
                name: interner.intern_string(&i.to_string()),
                type_id: element.type_id,
                optional: element.optional,
                readonly: false,
                is_method: false,
                symbol: SymbolId::NONE,
            });
        }
        let has_rest = elements.iter().any(|e| e.rest);
        let has_optional = elements.iter().any(|e| e.optional);
        let length = if has_rest || has_optional {
            TypeId::NUMBER
        } else {
            interner.literal_number(elements.len() as f64)
        };
        properties.push(self.length_property(length));
        let values = elements.iter().map(|e| tuple_element_value(self, e)).collect();
        ObjectShape {
            flags: ObjectFlags::TUPLE,
            properties,
            number_index: Some(IndexInfo {
                key_type: TypeId::NUMBER,
                value_type: interner.union(values),
                readonly: false,
            }),
            ..ObjectShape::anonymous()
        }
    }

    fn merge_intersection_shapes(&self, shapes: &[Rc<ObjectShape>]) -> ObjectShape {
        let interner = self.interner();
        let mut merged = ObjectShape::anonymous();
        let mut positions: FxHashMap<Atom, usize> = FxHashMap::default();
        let mut property_types: Vec<Vec<TypeId>> = Vec::new();

        for shape in shapes {
            for prop in &shape.properties {
                match positions.get(&prop.name) {
                    Some(&pos) => {
                        let existing = &mut merged.properties[pos];
                        existing.optional &= prop.optional;
                        existing.readonly &= prop.readonly;
                        property_types[pos].push(prop.type_id);
                    }
                    None => {
                        positions.insert(prop.name, merged.properties.len());
                        merged.properties.push(*prop);
                        property_types.push(vec![prop.type_id]);
                    }
                }
            }
            merged.call_signatures.extend(shape.call_signatures.iter().copied());
            merged.construct_signatures.extend(shape.construct_signatures.iter().copied());
            merged.string_index = merge_index(interner, merged.string_index, shape.string_index);
            merged.number_index = merge_index(interner, merged.number_index, shape.number_index);
        }
        for (prop, types) in merged.properties.iter_mut().zip(property_types) {
            if types.len() > 1 {
                prop.type_id = interner.intersection(types);
            }
        }
        if !merged.call_signatures.is_empty() || !merged.construct_signatures.is_empty() {
            merged.flags |= ObjectFlags::FUNCTION_LIKE;
        }
        merged
    }

    // =========================================================================
    // Member queries
    // =========================================================================

    /// Properties of a type. For unions, only properties present in every
    /// member, with their types unioned.
    pub fn get_properties_of_type(&self, type_id: TypeId) -> Vec<PropertyInfo> {
        let interner = self.interner();
        if let Some(members) = interner.union_members(type_id) {
            let Some((&first, rest)) = members.split_first() else {
                return Vec::new();
            };
            return self
                .get_properties_of_type(first)
                .into_iter()
                .filter_map(|prop| {
                    let name = interner.resolve_atom(prop.name);
                    let mut types = vec![prop.type_id];
                    let mut merged = prop;
                    for &member in rest {
                        let other = self.get_property_of_type(member, &name)?;
                        types.push(other.type_id);
                        merged.optional |= other.optional;
                        merged.readonly |= other.readonly;
                    }
                    merged.type_id = interner.union(types);
                    merged.symbol = SymbolId::NONE;
                    Some(merged)
                })
                .collect();
        }
        self.resolve_shape(type_id)
            .map(|shape| shape.properties.clone())
            .unwrap_or_default()
    }

    /// A named property of a type, with its declared (not read) type.
    pub fn get_property_of_type(&self, type_id: TypeId, name: &str) -> Option<PropertyInfo> {
        let interner = self.interner();
        if let Some(members) = interner.union_members(type_id) {
            let mut types = Vec::with_capacity(members.len());
            let mut merged: Option<PropertyInfo> = None;
            for &member in members.iter() {
                let prop = self.get_property_of_type(member, name)?;
                types.push(prop.type_id);
                merged = Some(match merged {
                    Some(mut acc) => {
                        acc.optional |= prop.optional;
                        acc.readonly |= prop.readonly;
                        acc.symbol = SymbolId::NONE;
                        acc
                    }
                    None => prop,
                });
            }
            let mut merged = merged?;
            merged.type_id = interner.union(types);
            return Some(merged);
        }
        let shape = self.resolve_shape(type_id)?;
        let atom = interner.intern_string(name);
        shape.find_property(atom).copied()
    }

    /// Call or construct signatures of a type, in declaration order.
    ///
    /// A union has signatures only when every member has the same ones.
    pub fn get_signatures_of_type(&self, type_id: TypeId, kind: SignatureKind) -> Vec<SignatureId> {
        let interner = self.interner();
        if let Some(members) = interner.union_members(type_id) {
            let mut lists = members
                .iter()
                .map(|&m| self.get_signatures_of_type(m, kind));
            let Some(first) = lists.next() else {
                return Vec::new();
            };
            return if lists.all(|other| other == first) {
                first
            } else {
                Vec::new()
            };
        }
        self.resolve_shape(type_id)
            .map(|shape| shape.signatures(kind).to_vec())
            .unwrap_or_default()
    }

    /// The symbol declaring a type, if any.
    pub fn symbol_of_type(&self, type_id: TypeId) -> Option<SymbolId> {
        let interner = self.interner();
        let symbol = match interner.lookup(type_id)? {
            TypeData::Application(app_id) => interner.type_application(app_id)?.target,
            TypeData::Object(shape_id) => interner.object_shape(shape_id).symbol,
            TypeData::EnumLiteral(symbol, _) => symbol,
            TypeData::TypeParameter(param) => interner.type_param_info(param)?.symbol,
            _ => return None,
        };
        (symbol != SymbolId::NONE).then_some(symbol)
    }

    /// The declaration a type came from, if any.
    pub fn declaration_of_type(&self, type_id: TypeId) -> Option<NodeIndex> {
        let symbol = self.symbol_of_type(type_id)?;
        self.symbol(symbol)?.declarations.first().copied()
    }
}

fn merge_index(
    interner: &crate::intern::TypeInterner,
    existing: Option<IndexInfo>,
    incoming: Option<IndexInfo>,
) -> Option<IndexInfo> {
    match (existing, incoming) {
        (Some(a), Some(b)) => Some(IndexInfo {
            key_type: a.key_type,
            value_type: interner.intersection(vec![a.value_type, b.value_type]),
            readonly: a.readonly && b.readonly,
        }),
        (a, b) => a.or(b),
    }
}

/// Merge inherited members: derived properties win, signatures accumulate,
/// index signatures are inherited when the derived type has none.
fn merge_base_shape(shape: &mut ObjectShape, base: &ObjectShape) {
    for prop in &base.properties {
        if shape.find_property(prop.name).is_none() {
            shape.properties.push(*prop);
        }
    }
    shape.call_signatures.extend(base.call_signatures.iter().copied());
    shape.construct_signatures.extend(base.construct_signatures.iter().copied());
    if shape.string_index.is_none() {
        shape.string_index = base.string_index;
    }
    if shape.number_index.is_none() {
        shape.number_index = base.number_index;
    }
}

#[cfg(test)]
#[path = "../tests/structure_tests.rs"]
mod tests;
