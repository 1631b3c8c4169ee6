//! Converting types back into type nodes.
//!
//! The node a type produces is re-parseable: lowering it again at the same
//! location yields an equivalent type. References print with the shortest
//! name that resolves back to the same symbol from the enclosing
//! declaration. Anonymous object types that contain themselves print the
//! inner occurrence as `any`, and so does anything nested deeper than the
//! type-node depth limit.

use crate::env::TypeEnvironment;
use crate::recursion::{DepthCounter, RecursionProfile};
use crate::types::*;
use bitflags::bitflags;
use rustc_hash::FxHashSet;
use tracing::trace;
use tyrel_binder::{
    KeywordKind, LiteralNode, MappedModifierNode, NodeIndex, ParameterNode, SignatureNode, SymbolId,
    TupleElementNode, TypeMemberNode, TypeNode, TypeParameterNode, symbol_flags,
};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct TypeFormatFlags: u32 {
        /// Always write the full namespace path of a referenced symbol.
        const USE_FULLY_QUALIFIED_TYPE = 1 << 0;
        /// Write type alias references as the aliased type.
        const EXPAND_ALIASES = 1 << 1;
    }
}

/// Syntax-shaped form of `type_id`, as written from inside `enclosing`.
pub fn type_to_type_node(
    env: &TypeEnvironment,
    type_id: TypeId,
    enclosing: Option<NodeIndex>,
    flags: TypeFormatFlags,
) -> TypeNode {
    let mut builder = NodeBuilder {
        env,
        enclosing: enclosing.unwrap_or(NodeIndex::NONE),
        flags,
        depth: DepthCounter::with_profile(RecursionProfile::TypeNodeBuild),
        visiting: FxHashSet::default(),
    };
    builder.build(type_id)
}

/// Display form of a type, as used in diagnostics.
pub fn type_to_string(env: &TypeEnvironment, type_id: TypeId) -> String {
    type_to_type_node(env, type_id, None, TypeFormatFlags::empty()).to_string()
}

/// Display form of a single signature, written as a function type.
pub fn signature_to_string(env: &TypeEnvironment, sig: SignatureId) -> String {
    let mut builder = NodeBuilder {
        env,
        enclosing: NodeIndex::NONE,
        flags: TypeFormatFlags::empty(),
        depth: DepthCounter::with_profile(RecursionProfile::TypeNodeBuild),
        visiting: FxHashSet::default(),
    };
    match builder.signature_node(sig) {
        Some(signature) => TypeNode::Function(signature).to_string(),
        None => KeywordKind::Any.as_str().to_string(),
    }
}

struct NodeBuilder<'a> {
    env: &'a TypeEnvironment,
    enclosing: NodeIndex,
    flags: TypeFormatFlags,
    depth: DepthCounter,
    /// Anonymous object types currently being written.
    visiting: FxHashSet<TypeId>,
}

impl<'a> NodeBuilder<'a> {
    fn build(&mut self, type_id: TypeId) -> TypeNode {
        if !self.depth.enter() {
            trace!(type_id = type_id.0, "type node depth limit reached");
            return TypeNode::Keyword(KeywordKind::Any);
        }
        let node = self.build_inner(type_id);
        self.depth.leave();
        node
    }

    fn build_inner(&mut self, type_id: TypeId) -> TypeNode {
        let interner = self.env.interner();
        let Some(data) = interner.lookup(type_id) else {
            return TypeNode::Keyword(KeywordKind::Any);
        };
        match data {
            TypeData::Intrinsic(kind) => TypeNode::Keyword(keyword_of(kind)),
            TypeData::Literal(value) => TypeNode::Literal(match value {
                LiteralValue::String(atom) => LiteralNode::String(interner.resolve_atom(atom).to_string()),
                LiteralValue::Number(n) => LiteralNode::Number(n.0),
                LiteralValue::Boolean(b) => LiteralNode::Boolean(b),
                LiteralValue::BigInt(atom) => LiteralNode::BigInt(interner.resolve_atom(atom).to_string()),
            }),
            TypeData::EnumLiteral(member, _) => TypeNode::Reference {
                name: self.reference_name(member),
                type_arguments: Vec::new(),
            },
            TypeData::Union(list) => {
                TypeNode::Union(interner.type_list(list).iter().map(|&m| self.build(m)).collect())
            }
            TypeData::Intersection(list) => {
                TypeNode::Intersection(interner.type_list(list).iter().map(|&m| self.build(m)).collect())
            }
            TypeData::Array(element) => TypeNode::Array(Box::new(self.build(element))),
            TypeData::Tuple(list) => TypeNode::Tuple(
                interner
                    .tuple_list(list)
                    .iter()
                    .map(|e| TupleElementNode {
                        ty: self.build(e.type_id),
                        optional: e.optional,
                        rest: e.rest,
                    })
                    .collect(),
            ),
            TypeData::TypeParameter(param) => match interner.type_param_info(param) {
                Some(info) => TypeNode::named(&interner.resolve_atom(info.name)),
                None => TypeNode::Keyword(KeywordKind::Unknown),
            },
            TypeData::Application(app_id) => {
                let Some(app) = interner.type_application(app_id) else {
                    return TypeNode::Keyword(KeywordKind::Any);
                };
                let is_alias = self
                    .env
                    .symbol(app.target)
                    .is_some_and(|s| s.has_flags(symbol_flags::TYPE_ALIAS));
                if is_alias && self.flags.contains(TypeFormatFlags::EXPAND_ALIASES) {
                    if let Some(expanded) = self.env.expand_alias(app_id).filter(|&e| e != type_id) {
                        return self.build(expanded);
                    }
                }
                TypeNode::Reference {
                    name: self.reference_name(app.target),
                    type_arguments: app.args.iter().map(|&a| self.build(a)).collect(),
                }
            }
            TypeData::Conditional(cond_id) => match interner.conditional_type(cond_id) {
                Some(cond) => TypeNode::Conditional {
                    check: Box::new(self.build(cond.check_type)),
                    extends: Box::new(self.build(cond.extends_type)),
                    true_type: Box::new(self.build(cond.true_type)),
                    false_type: Box::new(self.build(cond.false_type)),
                },
                None => TypeNode::Keyword(KeywordKind::Any),
            },
            TypeData::Mapped(mapped_id) => match interner.mapped_type(mapped_id) {
                Some(mapped) => {
                    let name = interner
                        .type_param_info(mapped.type_param)
                        .map(|info| interner.resolve_atom(info.name).to_string())
                        .unwrap_or_else(|| "K".to_string());
                    TypeNode::Mapped {
                        type_parameter: name,
                        constraint: Box::new(self.build(mapped.constraint)),
                        ty: Box::new(self.build(mapped.template)),
                        readonly: modifier_node(mapped.readonly_modifier),
                        optional: modifier_node(mapped.optional_modifier),
                    }
                }
                None => TypeNode::Keyword(KeywordKind::Any),
            },
            TypeData::IndexAccess(object, index) => TypeNode::IndexedAccess {
                object: Box::new(self.build(object)),
                index: Box::new(self.build(index)),
            },
            TypeData::KeyOf(operand) => TypeNode::KeyOf(Box::new(self.build(operand))),
            TypeData::Object(shape_id) => {
                if !self.visiting.insert(type_id) {
                    return TypeNode::Keyword(KeywordKind::Any);
                }
                let shape = interner.object_shape(shape_id);
                let node = self.object_node(&shape);
                self.visiting.remove(&type_id);
                node
            }
        }
    }

    fn object_node(&mut self, shape: &ObjectShape) -> TypeNode {
        let interner = self.env.interner();
        let no_members = shape.properties.is_empty() && shape.string_index.is_none() && shape.number_index.is_none();
        if no_members {
            match (shape.call_signatures.as_slice(), shape.construct_signatures.as_slice()) {
                ([call], []) => {
                    if let Some(signature) = self.signature_node(*call) {
                        return TypeNode::Function(signature);
                    }
                }
                ([], [construct]) => {
                    let is_abstract = interner
                        .signature(*construct)
                        .is_some_and(|s| s.flags.contains(SignatureFlags::ABSTRACT));
                    if let Some(signature) = self.signature_node(*construct) {
                        return TypeNode::Constructor { signature, is_abstract };
                    }
                }
                _ => {}
            }
        }

        let mut members = Vec::new();
        for &sig in &shape.call_signatures {
            if let Some(signature) = self.signature_node(sig) {
                members.push(TypeMemberNode::Call(signature));
            }
        }
        for &sig in &shape.construct_signatures {
            if let Some(signature) = self.signature_node(sig) {
                members.push(TypeMemberNode::Construct(signature));
            }
        }
        for prop in &shape.properties {
            let name = interner.resolve_atom(prop.name).to_string();
            if prop.is_method {
                let signatures = self
                    .env
                    .resolve_shape(prop.type_id)
                    .map(|s| s.call_signatures.clone())
                    .unwrap_or_default();
                if !signatures.is_empty() {
                    for sig in signatures {
                        if let Some(signature) = self.signature_node(sig) {
                            members.push(TypeMemberNode::Method {
                                name: name.clone(),
                                signature,
                                optional: prop.optional,
                            });
                        }
                    }
                    continue;
                }
            }
            members.push(TypeMemberNode::Property {
                name,
                ty: self.build(prop.type_id),
                optional: prop.optional,
                readonly: prop.readonly,
            });
        }
        for (index, key) in [(shape.string_index, KeywordKind::String), (shape.number_index, KeywordKind::Number)] {
            if let Some(index) = index {
                members.push(TypeMemberNode::Index {
                    parameter_name: if key == KeywordKind::String { "key" } else { "index" }.to_string(),
                    key: TypeNode::Keyword(key),
                    ty: self.build(index.value_type),
                    readonly: index.readonly,
                });
            }
        }
        TypeNode::TypeLiteral(members)
    }

    fn signature_node(&mut self, sig_id: SignatureId) -> Option<SignatureNode> {
        let interner = self.env.interner();
        let sig = interner.signature(sig_id)?;
        let type_parameters = sig
            .type_params
            .iter()
            .filter_map(|&tp| {
                let info = interner.type_param_info(tp)?;
                Some(TypeParameterNode {
                    name: interner.resolve_atom(info.name).to_string(),
                    constraint: info.constraint.map(|c| Box::new(self.build(c))),
                    default: info.default.map(|d| Box::new(self.build(d))),
                })
            })
            .collect();
        let parameters = sig
            .params
            .iter()
            .map(|p| ParameterNode {
                name: interner.resolve_atom(p.name).to_string(),
                ty: self.build(p.type_id),
                optional: p.optional,
                rest: p.rest,
            })
            .collect();
        Some(SignatureNode {
            type_parameters,
            parameters,
            return_type: Box::new(self.build(sig.return_type)),
        })
    }

    /// Shortest name of `symbol` that resolves back to it from the
    /// enclosing declaration.
    fn reference_name(&self, symbol: SymbolId) -> Vec<String> {
        let binder = self.env.binder();
        let qualified = binder.qualified_name(symbol);
        if self.flags.contains(TypeFormatFlags::USE_FULLY_QUALIFIED_TYPE) {
            return qualified;
        }
        let Some(simple) = qualified.last() else {
            return qualified;
        };
        let resolves = binder.resolve_name(self.env.arena(), simple, self.enclosing, symbol_flags::TYPE) == Some(symbol);
        if resolves {
            vec![simple.clone()]
        } else {
            qualified
        }
    }
}

fn keyword_of(kind: IntrinsicKind) -> KeywordKind {
    match kind {
        IntrinsicKind::None | IntrinsicKind::Error | IntrinsicKind::Any => KeywordKind::Any,
        IntrinsicKind::Never => KeywordKind::Never,
        IntrinsicKind::Unknown => KeywordKind::Unknown,
        IntrinsicKind::Void => KeywordKind::Void,
        IntrinsicKind::Undefined => KeywordKind::Undefined,
        IntrinsicKind::Null => KeywordKind::Null,
        IntrinsicKind::Boolean => KeywordKind::Boolean,
        IntrinsicKind::Number => KeywordKind::Number,
        IntrinsicKind::String => KeywordKind::String,
        IntrinsicKind::Bigint => KeywordKind::Bigint,
        IntrinsicKind::Symbol => KeywordKind::Symbol,
        IntrinsicKind::Object => KeywordKind::Object,
    }
}

fn modifier_node(modifier: MappedModifier) -> MappedModifierNode {
    match modifier {
        MappedModifier::None => MappedModifierNode::None,
        MappedModifier::Add => MappedModifierNode::Add,
        MappedModifier::Remove => MappedModifierNode::Remove,
    }
}

#[cfg(test)]
#[path = "../tests/node_builder_tests.rs"]
mod tests;
