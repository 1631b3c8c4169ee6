//! Declaration arena.
//!
//! Declarations are the opaque "syntax" handles the type engine hangs its
//! symbols and diagnostics on. The arena is dense: a `NodeIndex` is an index
//! into it. Children are created before their parent; creating the parent
//! claims them, so any node without a parent is a top-level declaration.

use crate::type_node::TypeNode;
use serde::Serialize;

/// Handle of a declaration in a `DeclarationArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

/// Declaration modifier bits.
pub mod modifier_flags {
    pub const NONE: u32 = 0;
    pub const STATIC: u32 = 1 << 0;
    pub const ABSTRACT: u32 = 1 << 1;
    pub const READONLY: u32 = 1 << 2;
    /// `?` on properties, methods and parameters.
    pub const OPTIONAL: u32 = 1 << 3;
    /// `...` on parameters.
    pub const REST: u32 = 1 << 4;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EnumInitializer {
    Number(f64),
    String(String),
}

/// The shared shape of every signature-bearing declaration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignatureDecl {
    pub type_parameters: Vec<NodeIndex>,
    pub parameters: Vec<NodeIndex>,
    pub this_type: Option<TypeNode>,
    pub return_type: Option<TypeNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeclarationKind {
    Interface {
        type_parameters: Vec<NodeIndex>,
        extends: Vec<TypeNode>,
        members: Vec<NodeIndex>,
    },
    Class {
        type_parameters: Vec<NodeIndex>,
        extends: Option<TypeNode>,
        implements: Vec<TypeNode>,
        members: Vec<NodeIndex>,
    },
    TypeAlias {
        type_parameters: Vec<NodeIndex>,
        ty: TypeNode,
    },
    Enum {
        members: Vec<NodeIndex>,
    },
    EnumMember {
        initializer: Option<EnumInitializer>,
    },
    Namespace {
        body: Vec<NodeIndex>,
    },
    Function(SignatureDecl),
    Variable {
        kind: VariableKind,
        ty: Option<TypeNode>,
    },
    Parameter {
        ty: Option<TypeNode>,
    },
    TypeParameter {
        constraint: Option<TypeNode>,
        default: Option<TypeNode>,
    },
    /// Property signature in an interface, or a class property.
    Property {
        ty: Option<TypeNode>,
    },
    /// Method signature in an interface, or a class method.
    Method(SignatureDecl),
    CallSignature(SignatureDecl),
    ConstructSignature(SignatureDecl),
    /// `[name: parameter_type]: ty`
    IndexSignature {
        parameter_type: TypeNode,
        ty: TypeNode,
    },
    Constructor(SignatureDecl),
}

impl DeclarationKind {
    /// Child declarations owned by this declaration, in source order.
    pub fn children(&self) -> Vec<NodeIndex> {
        match self {
            DeclarationKind::Interface {
                type_parameters,
                members,
                ..
            }
            | DeclarationKind::Class {
                type_parameters,
                members,
                ..
            } => type_parameters.iter().chain(members).copied().collect(),
            DeclarationKind::TypeAlias {
                type_parameters, ..
            } => type_parameters.clone(),
            DeclarationKind::Enum { members } => members.clone(),
            DeclarationKind::Namespace { body } => body.clone(),
            DeclarationKind::Function(sig)
            | DeclarationKind::Method(sig)
            | DeclarationKind::CallSignature(sig)
            | DeclarationKind::ConstructSignature(sig)
            | DeclarationKind::Constructor(sig) => sig
                .type_parameters
                .iter()
                .chain(&sig.parameters)
                .copied()
                .collect(),
            DeclarationKind::EnumMember { .. }
            | DeclarationKind::Variable { .. }
            | DeclarationKind::Parameter { .. }
            | DeclarationKind::TypeParameter { .. }
            | DeclarationKind::Property { .. }
            | DeclarationKind::IndexSignature { .. } => Vec::new(),
        }
    }

    /// The signature payload, for signature-bearing declarations.
    pub fn signature(&self) -> Option<&SignatureDecl> {
        match self {
            DeclarationKind::Function(sig)
            | DeclarationKind::Method(sig)
            | DeclarationKind::CallSignature(sig)
            | DeclarationKind::ConstructSignature(sig)
            | DeclarationKind::Constructor(sig) => Some(sig),
            _ => None,
        }
    }

    /// Type parameters declared directly on this node.
    pub fn type_parameters(&self) -> &[NodeIndex] {
        match self {
            DeclarationKind::Interface {
                type_parameters, ..
            }
            | DeclarationKind::Class {
                type_parameters, ..
            }
            | DeclarationKind::TypeAlias {
                type_parameters, ..
            } => type_parameters,
            _ => self
                .signature()
                .map_or(&[][..], |sig| sig.type_parameters.as_slice()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    /// Source name. Anonymous members (call, construct and index signatures,
    /// constructors) carry an empty name; the binder assigns synthetic ones.
    pub name: String,
    pub kind: DeclarationKind,
    pub modifiers: u32,
    pub parent: NodeIndex,
}

impl Declaration {
    #[inline]
    pub fn has_modifier(&self, flag: u32) -> bool {
        self.modifiers & flag != 0
    }
}

/// Dense arena of declarations.
#[derive(Clone, Debug, Default)]
pub struct DeclarationArena {
    nodes: Vec<Declaration>,
}

impl DeclarationArena {
    pub fn new() -> Self {
        DeclarationArena { nodes: Vec::new() }
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&Declaration> {
        self.nodes.get(idx.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate every node index in creation order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len() as u32).map(NodeIndex)
    }

    /// Top-level declarations (nodes no parent claimed), in creation order.
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.indices()
            .filter(|&idx| self.nodes[idx.0 as usize].parent.is_none())
            .collect()
    }

    /// The parent of a node, or `NONE` for roots and unknown nodes.
    pub fn parent(&self, idx: NodeIndex) -> NodeIndex {
        self.get(idx).map_or(NodeIndex::NONE, |decl| decl.parent)
    }

    /// Add a declaration and claim its children.
    ///
    /// Child indices that do not exist yet are left dangling; the binder
    /// skips them and the type engine reports them as internal errors.
    pub fn add(&mut self, name: impl Into<String>, kind: DeclarationKind, modifiers: u32) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        for child in kind.children() {
            if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                node.parent = idx;
            }
        }
        self.nodes.push(Declaration {
            name: name.into(),
            kind,
            modifiers,
            parent: NodeIndex::NONE,
        });
        idx
    }

    // -------------------------------------------------------------------------
    // Builder helpers
    // -------------------------------------------------------------------------

    pub fn type_parameter(
        &mut self,
        name: &str,
        constraint: Option<TypeNode>,
        default: Option<TypeNode>,
    ) -> NodeIndex {
        self.add(
            name,
            DeclarationKind::TypeParameter {
                constraint,
                default,
            },
            modifier_flags::NONE,
        )
    }

    pub fn parameter(&mut self, name: &str, ty: TypeNode) -> NodeIndex {
        self.add(
            name,
            DeclarationKind::Parameter { ty: Some(ty) },
            modifier_flags::NONE,
        )
    }

    pub fn parameter_with(&mut self, name: &str, ty: TypeNode, modifiers: u32) -> NodeIndex {
        self.add(name, DeclarationKind::Parameter { ty: Some(ty) }, modifiers)
    }

    pub fn property(&mut self, name: &str, ty: TypeNode) -> NodeIndex {
        self.add(
            name,
            DeclarationKind::Property { ty: Some(ty) },
            modifier_flags::NONE,
        )
    }

    pub fn property_with(&mut self, name: &str, ty: TypeNode, modifiers: u32) -> NodeIndex {
        self.add(name, DeclarationKind::Property { ty: Some(ty) }, modifiers)
    }

    pub fn method(&mut self, name: &str, signature: SignatureDecl) -> NodeIndex {
        self.add(name, DeclarationKind::Method(signature), modifier_flags::NONE)
    }

    pub fn call_signature(&mut self, signature: SignatureDecl) -> NodeIndex {
        self.add("", DeclarationKind::CallSignature(signature), modifier_flags::NONE)
    }

    pub fn construct_signature(&mut self, signature: SignatureDecl) -> NodeIndex {
        self.add(
            "",
            DeclarationKind::ConstructSignature(signature),
            modifier_flags::NONE,
        )
    }

    pub fn index_signature(&mut self, parameter_type: TypeNode, ty: TypeNode) -> NodeIndex {
        self.add(
            "",
            DeclarationKind::IndexSignature { parameter_type, ty },
            modifier_flags::NONE,
        )
    }

    pub fn interface(
        &mut self,
        name: &str,
        type_parameters: Vec<NodeIndex>,
        extends: Vec<TypeNode>,
        members: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.add(
            name,
            DeclarationKind::Interface {
                type_parameters,
                extends,
                members,
            },
            modifier_flags::NONE,
        )
    }

    pub fn class(
        &mut self,
        name: &str,
        type_parameters: Vec<NodeIndex>,
        extends: Option<TypeNode>,
        implements: Vec<TypeNode>,
        members: Vec<NodeIndex>,
    ) -> NodeIndex {
        self.add(
            name,
            DeclarationKind::Class {
                type_parameters,
                extends,
                implements,
                members,
            },
            modifier_flags::NONE,
        )
    }

    pub fn type_alias(&mut self, name: &str, type_parameters: Vec<NodeIndex>, ty: TypeNode) -> NodeIndex {
        self.add(
            name,
            DeclarationKind::TypeAlias {
                type_parameters,
                ty,
            },
            modifier_flags::NONE,
        )
    }

    pub fn function(&mut self, name: &str, signature: SignatureDecl) -> NodeIndex {
        self.add(name, DeclarationKind::Function(signature), modifier_flags::NONE)
    }

    pub fn variable(&mut self, name: &str, kind: VariableKind, ty: Option<TypeNode>) -> NodeIndex {
        self.add(
            name,
            DeclarationKind::Variable { kind, ty },
            modifier_flags::NONE,
        )
    }

    pub fn enum_member(&mut self, name: &str, initializer: Option<EnumInitializer>) -> NodeIndex {
        self.add(
            name,
            DeclarationKind::EnumMember { initializer },
            modifier_flags::NONE,
        )
    }

    pub fn enum_declaration(&mut self, name: &str, members: Vec<NodeIndex>) -> NodeIndex {
        self.add(name, DeclarationKind::Enum { members }, modifier_flags::NONE)
    }

    pub fn namespace(&mut self, name: &str, body: Vec<NodeIndex>) -> NodeIndex {
        self.add(name, DeclarationKind::Namespace { body }, modifier_flags::NONE)
    }
}

impl SignatureDecl {
    pub fn new(parameters: Vec<NodeIndex>, return_type: TypeNode) -> Self {
        SignatureDecl {
            type_parameters: Vec::new(),
            parameters,
            this_type: None,
            return_type: Some(return_type),
        }
    }

    pub fn generic(
        type_parameters: Vec<NodeIndex>,
        parameters: Vec<NodeIndex>,
        return_type: TypeNode,
    ) -> Self {
        SignatureDecl {
            type_parameters,
            parameters,
            this_type: None,
            return_type: Some(return_type),
        }
    }
}
