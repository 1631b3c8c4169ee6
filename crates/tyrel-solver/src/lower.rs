//! Lowering declarations and annotations into types.
//!
//! Everything here is demand-driven: `get_type_of_symbol` and
//! `get_declared_type_of_symbol` lower a symbol's declarations the first time
//! they are asked and memoize the result in the symbol links. A symbol that
//! is re-entered while it is still resolving gets a conservative answer
//! (`any` for values, a lazy `Application` for type aliases) instead of
//! recursing.

use crate::env::TypeEnvironment;
use crate::error::SolverError;
use crate::evaluate;
use crate::instantiate::{TypeMapper, instantiate_type};
use crate::types::*;
use std::rc::Rc;
use tracing::{debug, trace};
use tyrel_binder::{
    DeclarationKind, EnumInitializer, KeywordKind, LiteralNode, MappedModifierNode, NodeIndex,
    SignatureNode, SymbolId, TypeMemberNode, TypeNode, internal_names, modifier_flags, symbol_flags,
    unescape_name,
};
use tyrel_common::diagnostics::{Diagnostic, diagnostic_codes};

fn keyword_type(kind: KeywordKind) -> TypeId {
    match kind {
        KeywordKind::Any => TypeId::ANY,
        KeywordKind::Unknown => TypeId::UNKNOWN,
        KeywordKind::Never => TypeId::NEVER,
        KeywordKind::Void => TypeId::VOID,
        KeywordKind::Undefined => TypeId::UNDEFINED,
        KeywordKind::Null => TypeId::NULL,
        KeywordKind::Boolean => TypeId::BOOLEAN,
        KeywordKind::Number => TypeId::NUMBER,
        KeywordKind::String => TypeId::STRING,
        KeywordKind::Bigint => TypeId::BIGINT,
        KeywordKind::Symbol => TypeId::SYMBOL,
        KeywordKind::Object => TypeId::OBJECT,
    }
}

fn mapped_modifier(modifier: MappedModifierNode) -> MappedModifier {
    match modifier {
        MappedModifierNode::None => MappedModifier::None,
        MappedModifierNode::Add => MappedModifier::Add,
        MappedModifierNode::Remove => MappedModifier::Remove,
    }
}

/// Lowers one annotation. `location` is the declaration the annotation is
/// written on; names resolve outward from it. Type parameters introduced
/// inside the annotation (function types, mapped types) live in `scopes`.
struct Lowering<'a> {
    env: &'a TypeEnvironment,
    location: NodeIndex,
    scopes: Vec<(String, TypeId)>,
}

impl<'a> Lowering<'a> {
    fn new(env: &'a TypeEnvironment, location: NodeIndex) -> Self {
        Lowering {
            env,
            location,
            scopes: Vec::new(),
        }
    }

    fn lower(&mut self, node: &TypeNode) -> TypeId {
        let env = self.env;
        let interner = env.interner();
        match node {
            TypeNode::Keyword(kind) => keyword_type(*kind),
            TypeNode::Literal(literal) => match literal {
                LiteralNode::String(value) => interner.literal_string(value),
                LiteralNode::Number(value) => interner.literal_number(*value),
                LiteralNode::Boolean(value) => interner.literal_boolean(*value),
                LiteralNode::BigInt(digits) => interner.literal_bigint(digits),
            },
            TypeNode::Reference {
                name,
                type_arguments,
            } => self.lower_reference(name, type_arguments),
            TypeNode::Union(members) => {
                let members = members.iter().map(|m| self.lower(m)).collect();
                interner.union(members)
            }
            TypeNode::Intersection(members) => {
                let members = members.iter().map(|m| self.lower(m)).collect();
                interner.intersection(members)
            }
            TypeNode::Array(element) => {
                let element = self.lower(element);
                interner.array(element)
            }
            TypeNode::Tuple(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| TupleElement {
                        type_id: self.lower(&e.ty),
                        optional: e.optional,
                        rest: e.rest,
                    })
                    .collect();
                interner.tuple(elements)
            }
            TypeNode::Function(signature) => {
                let sig = self.lower_signature(signature, SignatureFlags::empty());
                interner.object(ObjectShape {
                    flags: ObjectFlags::ANONYMOUS | ObjectFlags::FUNCTION_LIKE,
                    call_signatures: vec![sig],
                    ..ObjectShape::anonymous()
                })
            }
            TypeNode::Constructor {
                signature,
                is_abstract,
            } => {
                let mut flags = SignatureFlags::CONSTRUCT;
                if *is_abstract {
                    flags |= SignatureFlags::ABSTRACT;
                }
                let sig = self.lower_signature(signature, flags);
                interner.object(ObjectShape {
                    flags: ObjectFlags::ANONYMOUS | ObjectFlags::FUNCTION_LIKE,
                    construct_signatures: vec![sig],
                    ..ObjectShape::anonymous()
                })
            }
            TypeNode::TypeLiteral(members) => self.lower_type_literal(members),
            TypeNode::IndexedAccess { object, index } => {
                let object = self.lower(object);
                let index = self.lower(index);
                evaluate::get_indexed_access_type(env, object, index)
            }
            TypeNode::KeyOf(operand) => {
                let operand = self.lower(operand);
                evaluate::get_keyof_type(env, operand)
            }
            TypeNode::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => {
                let check_type = self.lower(check);
                let is_distributive =
                    matches!(interner.lookup(check_type), Some(TypeData::TypeParameter(_)));
                let cond = ConditionalType {
                    check_type,
                    extends_type: self.lower(extends),
                    true_type: self.lower(true_type),
                    false_type: self.lower(false_type),
                    is_distributive,
                };
                evaluate::get_conditional_type(env, cond)
            }
            TypeNode::Mapped {
                type_parameter,
                constraint,
                ty,
                readonly,
                optional,
            } => {
                let param = interner.fresh_type_param(interner.intern_string(type_parameter), SymbolId::NONE);
                let constraint = match constraint.as_ref() {
                    TypeNode::KeyOf(source) => {
                        let source = self.lower(source);
                        interner.keyof(source)
                    }
                    other => self.lower(other),
                };
                if let Err(error) = interner.set_type_param_constraint(param, Some(constraint), None) {
                    env.record_violation(error);
                }
                self.scopes
                    .push((type_parameter.clone(), interner.type_param_type(param)));
                let template = self.lower(ty);
                self.scopes.pop();
                evaluate::get_mapped_type(
                    env,
                    MappedType {
                        type_param: param,
                        constraint,
                        template,
                        readonly_modifier: mapped_modifier(*readonly),
                        optional_modifier: mapped_modifier(*optional),
                    },
                )
            }
        }
    }

    fn lower_reference(&mut self, name: &[String], type_arguments: &[TypeNode]) -> TypeId {
        if let [single] = name {
            if let Some((_, type_id)) = self.scopes.iter().rev().find(|(n, _)| n == single) {
                return *type_id;
            }
        }
        let env = self.env;
        let binder = env.binder();
        let Some(symbol) =
            binder.resolve_qualified_name(env.arena(), name, self.location, symbol_flags::TYPE)
        else {
            self.report_unresolved(name);
            return TypeId::ERROR;
        };
        let args = type_arguments.iter().map(|a| self.lower(a)).collect();
        env.reference_to_symbol(symbol, args, self.location)
    }

    fn report_unresolved(&self, name: &[String]) {
        let env = self.env;
        let binder = env.binder();
        let qualified = name.join(".");
        let resolves_as = |meaning| {
            binder
                .resolve_qualified_name(env.arena(), name, self.location, meaning)
                .is_some()
        };
        let code = if resolves_as(symbol_flags::MODULE) {
            diagnostic_codes::CANNOT_USE_NAMESPACE_AS_TYPE
        } else if resolves_as(symbol_flags::VALUE) {
            diagnostic_codes::REFERS_TO_VALUE_USED_AS_TYPE
        } else {
            diagnostic_codes::CANNOT_FIND_NAME
        };
        debug!(name = %qualified, code, "unresolved type reference");
        env.push_diagnostic(Diagnostic::from_code(self.location.0, code, &[qualified.as_str()]));
    }

    fn lower_signature(&mut self, node: &SignatureNode, flags: SignatureFlags) -> SignatureId {
        let env = self.env;
        let interner = env.interner();
        let scope_len = self.scopes.len();

        let mut type_params = Vec::with_capacity(node.type_parameters.len());
        for tp in &node.type_parameters {
            let id = interner.fresh_type_param(interner.intern_string(&tp.name), SymbolId::NONE);
            self.scopes.push((tp.name.clone(), interner.type_param_type(id)));
            type_params.push(id);
        }
        for (tp, &id) in node.type_parameters.iter().zip(&type_params) {
            let constraint = tp.constraint.as_ref().map(|c| self.lower(c));
            let default = tp.default.as_ref().map(|d| self.lower(d));
            if let Err(error) = interner.set_type_param_constraint(id, constraint, default) {
                env.record_violation(error);
            }
        }

        let mut flags = flags;
        let params: Vec<ParamInfo> = node
            .parameters
            .iter()
            .map(|p| {
                if p.rest {
                    flags |= SignatureFlags::HAS_REST;
                }
                ParamInfo {
                    name: interner.intern_string(&p.name),
                    type_id: self.lower(&p.ty),
                    optional: p.optional,
                    rest: p.rest,
                    symbol: SymbolId::NONE,
                }
            })
            .collect();
        let return_type = self.lower(&node.return_type);
        self.scopes.truncate(scope_len);

        interner.alloc_signature(Signature {
            declaration: NodeIndex::NONE,
            type_params,
            min_argument_count: Signature::compute_min_argument_count(&params),
            params,
            this_type: None,
            return_type,
            flags,
        })
    }

    fn lower_type_literal(&mut self, members: &[TypeMemberNode]) -> TypeId {
        let env = self.env;
        let interner = env.interner();
        let mut shape = ObjectShape::anonymous();
        // (property position, overloads) for method members
        let mut methods: Vec<(usize, Vec<SignatureId>)> = Vec::new();

        for member in members {
            match member {
                TypeMemberNode::Property {
                    name,
                    ty,
                    optional,
                    readonly,
                } => {
                    let type_id = self.lower(ty);
                    let atom = interner.intern_string(name);
                    let info = PropertyInfo {
                        name: atom,
                        type_id,
                        optional: *optional,
                        readonly: *readonly,
                        is_method: false,
                        symbol: SymbolId::NONE,
                    };
                    match shape.properties.iter().position(|p| p.name == atom) {
                        Some(pos) => shape.properties[pos] = info,
                        None => shape.properties.push(info),
                    }
                }
                TypeMemberNode::Method {
                    name,
                    signature,
                    optional,
                } => {
                    let sig = self.lower_signature(signature, SignatureFlags::METHOD);
                    let atom = interner.intern_string(name);
                    let existing = shape
                        .properties
                        .iter()
                        .position(|p| p.name == atom && p.is_method);
                    match existing.and_then(|pos| methods.iter_mut().find(|(p, _)| *p == pos)) {
                        Some((_, overloads)) => overloads.push(sig),
                        None => {
                            methods.push((shape.properties.len(), vec![sig]));
                            shape.properties.push(PropertyInfo {
                                name: atom,
                                type_id: TypeId::ERROR,
                                optional: *optional,
                                readonly: false,
                                is_method: true,
                                symbol: SymbolId::NONE,
                            });
                        }
                    }
                }
                TypeMemberNode::Call(signature) => {
                    let sig = self.lower_signature(signature, SignatureFlags::empty());
                    shape.call_signatures.push(sig);
                }
                TypeMemberNode::Construct(signature) => {
                    let sig = self.lower_signature(signature, SignatureFlags::CONSTRUCT);
                    shape.construct_signatures.push(sig);
                }
                TypeMemberNode::Index {
                    key, ty, readonly, ..
                } => {
                    let key_type = self.lower(key);
                    let info = IndexInfo {
                        key_type,
                        value_type: self.lower(ty),
                        readonly: *readonly,
                    };
                    match key_type {
                        TypeId::STRING => shape.string_index = Some(info),
                        TypeId::NUMBER => shape.number_index = Some(info),
                        _ => {}
                    }
                }
            }
        }

        for (pos, overloads) in methods {
            shape.properties[pos].type_id = env.function_type(SymbolId::NONE, overloads, Vec::new());
        }
        if !shape.call_signatures.is_empty() || !shape.construct_signatures.is_empty() {
            shape.flags |= ObjectFlags::FUNCTION_LIKE;
        }
        interner.object(shape)
    }
}

impl TypeEnvironment {
    /// Lower an annotation written on the declaration `location`.
    pub fn get_type_from_type_node(&self, node: &TypeNode, location: NodeIndex) -> TypeId {
        Lowering::new(self, location).lower(node)
    }

    /// Object type carrying `call_signatures`, plus value properties.
    pub(crate) fn function_type(
        &self,
        symbol: SymbolId,
        call_signatures: Vec<SignatureId>,
        properties: Vec<PropertyInfo>,
    ) -> TypeId {
        self.interner().object(ObjectShape {
            symbol,
            flags: ObjectFlags::ANONYMOUS | ObjectFlags::FUNCTION_LIKE,
            properties,
            call_signatures,
            ..ObjectShape::anonymous()
        })
    }

    /// Resolve a type reference to `symbol` with the given arguments.
    ///
    /// Interface and class references become lazy applications. Alias
    /// references expand immediately unless the alias is still being
    /// lowered, in which case they stay lazy.
    pub(crate) fn reference_to_symbol(&self, symbol: SymbolId, args: Vec<TypeId>, location: NodeIndex) -> TypeId {
        let interner = self.interner();
        let Some(sym) = self.symbol(symbol) else {
            return TypeId::ERROR;
        };
        let flags = sym.flags;

        if flags & symbol_flags::TYPE_PARAMETER != 0 {
            return self.get_declared_type_of_symbol(symbol);
        }
        if flags & symbol_flags::HAS_STRUCTURE != 0 {
            let params = self.type_params_of(symbol);
            let args = self.fill_type_arguments(symbol, &params, args, location);
            return interner.application(symbol, args);
        }
        if flags & symbol_flags::TYPE_ALIAS != 0 {
            let params = self.type_params_of(symbol);
            let args = self.fill_type_arguments(symbol, &params, args, location);
            let resolving = self
                .read_links(symbol, |links| links.declared_type.is_resolving())
                .unwrap_or(false);
            let reference = interner.application(symbol, args);
            if resolving {
                trace!(alias = symbol.0, "alias referenced while resolving, deferring");
                return reference;
            }
            // Expansion goes through the alias cache so every reference to the
            // same instantiation shares one id.
            return match interner.lookup(reference) {
                Some(TypeData::Application(app_id)) => self.expand_alias(app_id).unwrap_or(reference),
                _ => reference,
            };
        }
        if flags & (symbol_flags::ENUM | symbol_flags::ENUM_MEMBER) != 0 {
            return self.get_declared_type_of_symbol(symbol);
        }
        TypeId::ERROR
    }

    /// Match written type arguments against declared parameters, filling
    /// defaults. A count mismatch is reported and padded with `error`.
    fn fill_type_arguments(
        &self,
        symbol: SymbolId,
        params: &[TypeParamId],
        args: Vec<TypeId>,
        location: NodeIndex,
    ) -> Vec<TypeId> {
        let interner = self.interner();
        let required = params
            .iter()
            .filter(|&&p| interner.type_param_info(p).is_some_and(|i| i.default.is_none()))
            .count();
        if args.len() > params.len() || args.len() < required {
            let expected = if required == params.len() {
                params.len().to_string()
            } else {
                format!("{required}-{}", params.len())
            };
            let name = self.symbol_name(symbol);
            self.push_diagnostic(Diagnostic::from_code(
                location.0,
                diagnostic_codes::GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS,
                &[name.as_str(), expected.as_str()],
            ));
        }

        let mut filled: Vec<TypeId> = Vec::with_capacity(params.len());
        for (i, &param) in params.iter().enumerate() {
            if let Some(&arg) = args.get(i) {
                filled.push(arg);
                continue;
            }
            let default = interner.type_param_info(param).and_then(|info| info.default);
            let value = match default {
                Some(default) => instantiate_type(self, default, &TypeMapper::new(&params[..i], &filled)),
                None => TypeId::ERROR,
            };
            filled.push(value);
        }
        filled
    }

    /// Positional type parameters of an interface, class or alias.
    ///
    /// Created once per symbol; merged declarations share them.
    pub fn type_params_of(&self, symbol: SymbolId) -> Rc<[TypeParamId]> {
        if let Some(Some(params)) = self.read_links(symbol, |links| links.type_params.clone()) {
            return params;
        }
        let interner = self.interner();
        let arena = self.arena();
        let binder = self.binder();

        let declared: Vec<NodeIndex> = self
            .symbol(symbol)
            .map(|sym| {
                sym.declarations
                    .iter()
                    .filter_map(|&d| arena.get(d))
                    .map(|d| d.kind.type_parameters())
                    .find(|tps| !tps.is_empty())
                    .map(|tps| tps.to_vec())
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        let ids: Vec<TypeParamId> = declared
            .iter()
            .map(|&tp| {
                let name = arena.get(tp).map_or("", |d| d.name.as_str());
                let tp_symbol = binder.get_node_symbol(tp).unwrap_or(SymbolId::NONE);
                interner.fresh_type_param(interner.intern_string(name), tp_symbol)
            })
            .collect();
        let params: Rc<[TypeParamId]> = Rc::from(ids);
        self.with_links(symbol, |links| links.type_params = Some(params.clone()));

        // Constraints may mention the parameters themselves, so they are
        // lowered only after the ids are registered.
        for (&tp, &id) in declared.iter().zip(params.iter()) {
            let Some(DeclarationKind::TypeParameter {
                constraint,
                default,
            }) = arena.get(tp).map(|d| &d.kind)
            else {
                continue;
            };
            let constraint = constraint.as_ref().map(|c| self.get_type_from_type_node(c, tp));
            let default = default.as_ref().map(|d| self.get_type_from_type_node(d, tp));
            if let Err(error) = interner.set_type_param_constraint(id, constraint, default) {
                self.record_violation(error);
            }
        }
        params
    }

    // =========================================================================
    // Declared types
    // =========================================================================

    /// The type a symbol denotes in type position.
    pub fn get_declared_type_of_symbol(&self, symbol: SymbolId) -> TypeId {
        match self.with_links(symbol, |links| links.declared_type) {
            ResolutionState::Resolved(type_id) => return type_id,
            ResolutionState::Resolving => {
                debug!(symbol = symbol.0, "circular declared type");
                return TypeId::ERROR;
            }
            ResolutionState::Unresolved => {}
        }
        self.with_links(symbol, |links| links.declared_type = ResolutionState::Resolving);
        let result = match self.compute_declared_type(symbol) {
            Ok(type_id) => type_id,
            Err(error) => {
                self.record_violation(error);
                TypeId::ERROR
            }
        };
        self.with_links(symbol, |links| {
            links.declared_type = ResolutionState::Resolved(result)
        });
        trace!(symbol = symbol.0, type_id = result.0, "declared type resolved");
        result
    }

    fn compute_declared_type(&self, symbol: SymbolId) -> Result<TypeId, SolverError> {
        let interner = self.interner();
        let arena = self.arena();
        let sym = self
            .symbol(symbol)
            .ok_or(SolverError::SymbolWithoutDeclarations(format!("#{}", symbol.0)))?;
        let flags = sym.flags;

        if flags & symbol_flags::TYPE_PARAMETER != 0 {
            return self.declared_type_parameter(symbol);
        }
        if flags & symbol_flags::TYPE_ALIAS != 0 {
            for &decl_idx in &sym.declarations {
                if let Some(DeclarationKind::TypeAlias { ty, .. }) = arena.get(decl_idx).map(|d| &d.kind) {
                    return Ok(self.get_type_from_type_node(ty, decl_idx));
                }
            }
            return Err(SolverError::UnexpectedDeclarationKind {
                name: sym.name().to_string(),
                expected: "type alias",
            });
        }
        if flags & symbol_flags::HAS_STRUCTURE != 0 {
            let params = self.type_params_of(symbol);
            let args = params.iter().map(|&p| interner.type_param_type(p)).collect();
            return Ok(interner.application(symbol, args));
        }
        if flags & symbol_flags::ENUM != 0 {
            let members: Vec<TypeId> = sym
                .exports
                .ids()
                .filter(|&m| {
                    self.symbol(m)
                        .is_some_and(|s| s.has_flags(symbol_flags::ENUM_MEMBER))
                })
                .map(|m| self.get_declared_type_of_symbol(m))
                .collect();
            return Ok(interner.union_with(members, UnionReduction::None));
        }
        if flags & symbol_flags::ENUM_MEMBER != 0 {
            return self.enum_member_type(symbol);
        }
        Ok(TypeId::ERROR)
    }

    fn declared_type_parameter(&self, symbol: SymbolId) -> Result<TypeId, SolverError> {
        let interner = self.interner();
        let arena = self.arena();
        let decl_idx = self.first_declaration(symbol)?;
        let parent = arena.parent(decl_idx);

        // Parameters of interfaces, classes and aliases are positional on the owner.
        if let Some(parent_decl) = arena.get(parent) {
            let owned = matches!(
                parent_decl.kind,
                DeclarationKind::Interface { .. }
                    | DeclarationKind::Class { .. }
                    | DeclarationKind::TypeAlias { .. }
            );
            if owned {
                if let Some(owner) = self.binder().get_node_symbol(parent) {
                    let position = parent_decl
                        .kind
                        .type_parameters()
                        .iter()
                        .position(|&p| p == decl_idx);
                    let params = self.type_params_of(owner);
                    if let Some(&id) = position.and_then(|i| params.get(i)) {
                        return Ok(interner.type_param_type(id));
                    }
                }
            }
        }

        let decl = arena
            .get(decl_idx)
            .ok_or(SolverError::MissingDeclaration(decl_idx.0))?;
        let DeclarationKind::TypeParameter {
            constraint,
            default,
        } = &decl.kind
        else {
            return Err(SolverError::UnexpectedDeclarationKind {
                name: decl.name.clone(),
                expected: "type parameter",
            });
        };
        let id = interner.fresh_type_param(interner.intern_string(&decl.name), symbol);
        let type_id = interner.type_param_type(id);
        // Registered before the constraint is lowered: `T extends Foo<T>`.
        self.with_links(symbol, |links| {
            links.declared_type = ResolutionState::Resolved(type_id)
        });
        let constraint = constraint
            .as_ref()
            .map(|c| self.get_type_from_type_node(c, decl_idx));
        let default = default
            .as_ref()
            .map(|d| self.get_type_from_type_node(d, decl_idx));
        interner.set_type_param_constraint(id, constraint, default)?;
        Ok(type_id)
    }

    fn enum_member_type(&self, symbol: SymbolId) -> Result<TypeId, SolverError> {
        let interner = self.interner();
        let arena = self.arena();
        let decl_idx = self.first_declaration(symbol)?;
        let parent = arena.parent(decl_idx);
        let Some(DeclarationKind::Enum { members }) = arena.get(parent).map(|d| &d.kind) else {
            return Err(SolverError::UnexpectedDeclarationKind {
                name: self.symbol_name(symbol),
                expected: "enum member",
            });
        };

        // Auto-increment restarts in every enum declaration.
        let mut next = 0.0f64;
        for &member in members {
            let Some(DeclarationKind::EnumMember { initializer }) = arena.get(member).map(|d| &d.kind) else {
                continue;
            };
            let value = match initializer {
                Some(EnumInitializer::Number(n)) => {
                    next = n + 1.0;
                    interner.literal_number(*n)
                }
                Some(EnumInitializer::String(s)) => interner.literal_string(s),
                None => {
                    let value = interner.literal_number(next);
                    next += 1.0;
                    value
                }
            };
            if member == decl_idx {
                return Ok(interner.enum_literal(symbol, value));
            }
        }
        Err(SolverError::MissingDeclaration(decl_idx.0))
    }

    // =========================================================================
    // Value types
    // =========================================================================

    /// The type a symbol has in value position.
    pub fn get_type_of_symbol(&self, symbol: SymbolId) -> TypeId {
        match self.with_links(symbol, |links| links.type_of) {
            ResolutionState::Resolved(type_id) => return type_id,
            ResolutionState::Resolving => {
                debug!(symbol = symbol.0, "circular type of symbol, using any");
                return TypeId::ANY;
            }
            ResolutionState::Unresolved => {}
        }
        self.with_links(symbol, |links| links.type_of = ResolutionState::Resolving);
        let result = match self.compute_type_of_symbol(symbol) {
            Ok(type_id) => type_id,
            Err(error) => {
                self.record_violation(error);
                TypeId::ERROR
            }
        };
        self.with_links(symbol, |links| links.type_of = ResolutionState::Resolved(result));
        result
    }

    fn compute_type_of_symbol(&self, symbol: SymbolId) -> Result<TypeId, SolverError> {
        let sym = self
            .symbol(symbol)
            .ok_or(SolverError::SymbolWithoutDeclarations(format!("#{}", symbol.0)))?;
        let flags = sym.flags;

        if flags & symbol_flags::CLASS != 0 {
            return self.class_constructor_type(symbol);
        }
        if flags & (symbol_flags::FUNCTION | symbol_flags::METHOD) != 0 {
            let mut signatures = Vec::new();
            for &decl_idx in &sym.declarations {
                let is_callable = matches!(
                    self.arena().get(decl_idx).map(|d| &d.kind),
                    Some(DeclarationKind::Function(_) | DeclarationKind::Method(_))
                );
                if is_callable {
                    signatures.push(self.signature_of_declaration(decl_idx)?);
                }
            }
            let properties = self.value_exports_as_properties(symbol, false);
            return Ok(self.function_type(symbol, signatures, properties));
        }
        if flags & symbol_flags::ENUM != 0 {
            let properties = self.value_exports_as_properties(symbol, false);
            return Ok(self.interner().object(ObjectShape {
                symbol,
                flags: ObjectFlags::ANONYMOUS | ObjectFlags::ENUM_OBJECT,
                properties,
                ..ObjectShape::anonymous()
            }));
        }
        if flags & symbol_flags::VALUE_MODULE != 0 {
            let properties = self.value_exports_as_properties(symbol, false);
            return Ok(self.interner().object(ObjectShape {
                symbol,
                flags: ObjectFlags::ANONYMOUS | ObjectFlags::NAMESPACE_OBJECT,
                properties,
                ..ObjectShape::anonymous()
            }));
        }
        if flags & symbol_flags::ENUM_MEMBER != 0 {
            return Ok(self.get_declared_type_of_symbol(symbol));
        }
        if flags & (symbol_flags::VARIABLE | symbol_flags::PROPERTY) != 0 {
            let declared = self.annotated_type_of_symbol(symbol)?;
            if flags & symbol_flags::OPTIONAL != 0 && self.options().strict_null_checks {
                return Ok(self.interner().union2(declared, TypeId::UNDEFINED));
            }
            return Ok(declared);
        }
        // Type-only symbols have no value side.
        Ok(TypeId::ERROR)
    }

    /// The written annotation of a variable, parameter or property, or `any`.
    pub(crate) fn annotated_type_of_symbol(&self, symbol: SymbolId) -> Result<TypeId, SolverError> {
        let sym = self
            .symbol(symbol)
            .ok_or(SolverError::SymbolWithoutDeclarations(format!("#{}", symbol.0)))?;
        let decl_idx = if sym.value_declaration.is_some() {
            sym.value_declaration
        } else {
            self.first_declaration(symbol)?
        };
        let decl = self
            .arena()
            .get(decl_idx)
            .ok_or(SolverError::MissingDeclaration(decl_idx.0))?;
        let annotation = match &decl.kind {
            DeclarationKind::Variable { ty, .. }
            | DeclarationKind::Parameter { ty }
            | DeclarationKind::Property { ty } => ty.as_ref(),
            _ => {
                return Err(SolverError::UnexpectedDeclarationKind {
                    name: decl.name.clone(),
                    expected: "variable, parameter or property",
                });
            }
        };
        Ok(annotation.map_or(TypeId::ANY, |ty| self.get_type_from_type_node(ty, decl_idx)))
    }

    /// Value exports of a symbol as object properties. With `statics_only`,
    /// only class static members are included.
    fn value_exports_as_properties(&self, symbol: SymbolId, statics_only: bool) -> Vec<PropertyInfo> {
        let interner = self.interner();
        let Some(exports) = self.binder().get_exports(symbol) else {
            return Vec::new();
        };
        let mut properties = Vec::new();
        for (escaped, export) in exports.iter() {
            let Some(export_sym) = self.symbol(export) else {
                continue;
            };
            if export_sym.flags & symbol_flags::VALUE == 0 {
                continue;
            }
            if statics_only && !export_sym.has_flags(symbol_flags::STATIC) {
                continue;
            }
            properties.push(PropertyInfo {
                name: interner.intern_string(unescape_name(escaped)),
                type_id: self.get_type_of_symbol(export),
                optional: export_sym.has_flags(symbol_flags::OPTIONAL),
                readonly: export_sym
                    .has_flags(symbol_flags::READONLY | symbol_flags::ENUM_MEMBER),
                is_method: export_sym.has_flags(symbol_flags::METHOD),
                symbol: export,
            });
        }
        properties
    }

    /// The constructor function type of a class: construct signatures
    /// returning the instance type, plus static members.
    fn class_constructor_type(&self, symbol: SymbolId) -> Result<TypeId, SolverError> {
        let interner = self.interner();
        let arena = self.arena();
        let sym = self
            .symbol(symbol)
            .ok_or(SolverError::SymbolWithoutDeclarations(format!("#{}", symbol.0)))?;
        let class_decl = sym
            .declarations
            .iter()
            .copied()
            .find(|&d| matches!(arena.get(d).map(|d| &d.kind), Some(DeclarationKind::Class { .. })))
            .ok_or_else(|| SolverError::UnexpectedDeclarationKind {
                name: sym.name().to_string(),
                expected: "class",
            })?;

        let mut construct_signatures = Vec::new();
        if let Some(ctor) = sym.members.get(internal_names::CONSTRUCTOR) {
            if let Some(ctor_sym) = self.symbol(ctor) {
                for &decl_idx in &ctor_sym.declarations {
                    construct_signatures.push(self.signature_of_declaration(decl_idx)?);
                }
            }
        }
        if construct_signatures.is_empty() {
            construct_signatures = self.inherited_construct_signatures(symbol, class_decl);
        }
        if construct_signatures.is_empty() {
            let params = self.type_params_of(symbol);
            construct_signatures.push(interner.alloc_signature(Signature {
                declaration: class_decl,
                type_params: params.to_vec(),
                params: Vec::new(),
                this_type: None,
                return_type: self.get_declared_type_of_symbol(symbol),
                min_argument_count: 0,
                flags: self.class_signature_flags(class_decl),
            }));
        }

        let properties = self.value_exports_as_properties(symbol, true);
        Ok(interner.object(ObjectShape {
            symbol,
            flags: ObjectFlags::ANONYMOUS | ObjectFlags::CONSTRUCTOR_TYPE | ObjectFlags::FUNCTION_LIKE,
            properties,
            construct_signatures,
            ..ObjectShape::anonymous()
        }))
    }

    fn class_signature_flags(&self, class_decl: NodeIndex) -> SignatureFlags {
        let is_abstract = self
            .arena()
            .get(class_decl)
            .is_some_and(|d| d.has_modifier(modifier_flags::ABSTRACT));
        if is_abstract {
            SignatureFlags::CONSTRUCT | SignatureFlags::ABSTRACT
        } else {
            SignatureFlags::CONSTRUCT
        }
    }

    /// A class without its own constructor takes the base class's
    /// constructor parameters.
    fn inherited_construct_signatures(&self, symbol: SymbolId, class_decl: NodeIndex) -> Vec<SignatureId> {
        let interner = self.interner();
        let Some(DeclarationKind::Class {
            extends: Some(base_node),
            ..
        }) = self.arena().get(class_decl).map(|d| &d.kind)
        else {
            return Vec::new();
        };
        let base = self.get_type_from_type_node(base_node, class_decl);
        let Some(TypeData::Application(app_id)) = interner.lookup(base) else {
            return Vec::new();
        };
        let Some(app) = interner.type_application(app_id) else {
            return Vec::new();
        };
        let base_is_class = self
            .symbol(app.target)
            .is_some_and(|s| s.has_flags(symbol_flags::CLASS));
        if !base_is_class || app.target == symbol {
            return Vec::new();
        }

        let base_constructor = self.get_type_of_symbol(app.target);
        let Some(shape) = self.resolve_shape(base_constructor) else {
            return Vec::new();
        };
        let mapper = TypeMapper::new(&self.type_params_of(app.target), &app.args);
        let params = self.type_params_of(symbol);
        let instance = self.get_declared_type_of_symbol(symbol);
        shape
            .construct_signatures
            .iter()
            .filter_map(|&sig_id| interner.signature(sig_id))
            .map(|sig| {
                let inherited_params = sig
                    .params
                    .iter()
                    .map(|p| ParamInfo {
                        type_id: instantiate_type(self, p.type_id, &mapper),
                        ..*p
                    })
                    .collect();
                interner.alloc_signature(Signature {
                    declaration: class_decl,
                    type_params: params.to_vec(),
                    params: inherited_params,
                    this_type: None,
                    return_type: instance,
                    min_argument_count: sig.min_argument_count,
                    flags: self.class_signature_flags(class_decl)
                        | (sig.flags & SignatureFlags::HAS_REST),
                })
            })
            .collect()
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// The signature of a function, method, call/construct signature or
    /// constructor declaration. Cached per declaration.
    pub fn signature_of_declaration(&self, node: NodeIndex) -> Result<SignatureId, SolverError> {
        if let Some(&cached) = self.signature_of_node.borrow().get(&node) {
            return Ok(cached);
        }
        let interner = self.interner();
        let arena = self.arena();
        let binder = self.binder();
        let decl = arena.get(node).ok_or(SolverError::MissingDeclaration(node.0))?;
        let sig_decl = decl
            .kind
            .signature()
            .ok_or_else(|| SolverError::UnexpectedDeclarationKind {
                name: decl.name.clone(),
                expected: "signature",
            })?;

        let mut type_params = Vec::new();
        let mut flags = SignatureFlags::empty();
        let mut return_override = None;
        match decl.kind {
            DeclarationKind::Constructor(_) => {
                let class_decl = arena.parent(node);
                let class = binder
                    .get_node_symbol(class_decl)
                    .ok_or(SolverError::MissingDeclaration(class_decl.0))?;
                type_params.extend(self.type_params_of(class).iter().copied());
                return_override = Some(self.get_declared_type_of_symbol(class));
                flags |= self.class_signature_flags(class_decl);
            }
            DeclarationKind::ConstructSignature(_) => flags |= SignatureFlags::CONSTRUCT,
            DeclarationKind::Method(_) => flags |= SignatureFlags::METHOD,
            _ => {}
        }

        for &tp in &sig_decl.type_parameters {
            let tp_symbol = binder
                .get_node_symbol(tp)
                .ok_or(SolverError::MissingDeclaration(tp.0))?;
            if let Some(TypeData::TypeParameter(id)) =
                interner.lookup(self.get_declared_type_of_symbol(tp_symbol))
            {
                type_params.push(id);
            }
        }

        let mut params = Vec::with_capacity(sig_decl.parameters.len());
        for &param in &sig_decl.parameters {
            let param_decl = arena.get(param).ok_or(SolverError::MissingDeclaration(param.0))?;
            let DeclarationKind::Parameter { ty } = &param_decl.kind else {
                return Err(SolverError::UnexpectedDeclarationKind {
                    name: param_decl.name.clone(),
                    expected: "parameter",
                });
            };
            let rest = param_decl.has_modifier(modifier_flags::REST);
            if rest {
                flags |= SignatureFlags::HAS_REST;
            }
            params.push(ParamInfo {
                name: interner.intern_string(&param_decl.name),
                type_id: ty
                    .as_ref()
                    .map_or(TypeId::ANY, |t| self.get_type_from_type_node(t, param)),
                optional: param_decl.has_modifier(modifier_flags::OPTIONAL),
                rest,
                symbol: binder.get_node_symbol(param).unwrap_or(SymbolId::NONE),
            });
        }

        let this_type = sig_decl
            .this_type
            .as_ref()
            .map(|t| self.get_type_from_type_node(t, node));
        let return_type = return_override.unwrap_or_else(|| {
            sig_decl
                .return_type
                .as_ref()
                .map_or(TypeId::ANY, |t| self.get_type_from_type_node(t, node))
        });

        let sig_id = interner.alloc_signature(Signature {
            declaration: node,
            type_params,
            min_argument_count: Signature::compute_min_argument_count(&params),
            params,
            this_type,
            return_type,
            flags,
        });
        self.signature_of_node.borrow_mut().insert(node, sig_id);
        Ok(sig_id)
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// The type of a declaration: its declared type for type-introducing
    /// declarations, its value type otherwise.
    pub fn get_type_at_location(&self, node: NodeIndex) -> TypeId {
        let Some(decl) = self.arena().get(node) else {
            return TypeId::ERROR;
        };
        let Some(symbol) = self.binder().get_node_symbol(node) else {
            return TypeId::ERROR;
        };
        match decl.kind {
            DeclarationKind::Interface { .. }
            | DeclarationKind::Class { .. }
            | DeclarationKind::TypeAlias { .. }
            | DeclarationKind::Enum { .. }
            | DeclarationKind::TypeParameter { .. } => self.get_declared_type_of_symbol(symbol),
            _ => self.get_type_of_symbol(symbol),
        }
    }
}

#[cfg(test)]
#[path = "../tests/lower_tests.rs"]
mod tests;
