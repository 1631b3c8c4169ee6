//! Syntax-shaped type annotations.
//!
//! `TypeNode` is what declarations carry as annotations and what the type
//! engine produces when it turns a type back into syntax for display. The
//! `Display` impl is the printer.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeywordKind {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Bigint,
    Symbol,
    Object,
}

impl KeywordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            KeywordKind::Any => "any",
            KeywordKind::Unknown => "unknown",
            KeywordKind::Never => "never",
            KeywordKind::Void => "void",
            KeywordKind::Undefined => "undefined",
            KeywordKind::Null => "null",
            KeywordKind::Boolean => "boolean",
            KeywordKind::Number => "number",
            KeywordKind::String => "string",
            KeywordKind::Bigint => "bigint",
            KeywordKind::Symbol => "symbol",
            KeywordKind::Object => "object",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralNode {
    String(String),
    Number(f64),
    Boolean(bool),
    /// Digits without the trailing `n`.
    BigInt(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeParameterNode {
    pub name: String,
    pub constraint: Option<Box<TypeNode>>,
    pub default: Option<Box<TypeNode>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterNode {
    pub name: String,
    pub ty: TypeNode,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignatureNode {
    pub type_parameters: Vec<TypeParameterNode>,
    pub parameters: Vec<ParameterNode>,
    pub return_type: Box<TypeNode>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeMemberNode {
    Property {
        name: String,
        ty: TypeNode,
        optional: bool,
        readonly: bool,
    },
    Method {
        name: String,
        signature: SignatureNode,
        optional: bool,
    },
    Call(SignatureNode),
    Construct(SignatureNode),
    Index {
        parameter_name: String,
        key: TypeNode,
        ty: TypeNode,
        readonly: bool,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TupleElementNode {
    pub ty: TypeNode,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappedModifierNode {
    None,
    Add,
    Remove,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeNode {
    Keyword(KeywordKind),
    Literal(LiteralNode),
    /// A possibly qualified name (`A.B.C`) with type arguments.
    Reference {
        name: Vec<String>,
        type_arguments: Vec<TypeNode>,
    },
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Array(Box<TypeNode>),
    Tuple(Vec<TupleElementNode>),
    Function(SignatureNode),
    Constructor {
        signature: SignatureNode,
        is_abstract: bool,
    },
    TypeLiteral(Vec<TypeMemberNode>),
    IndexedAccess {
        object: Box<TypeNode>,
        index: Box<TypeNode>,
    },
    KeyOf(Box<TypeNode>),
    Conditional {
        check: Box<TypeNode>,
        extends: Box<TypeNode>,
        true_type: Box<TypeNode>,
        false_type: Box<TypeNode>,
    },
    Mapped {
        type_parameter: String,
        constraint: Box<TypeNode>,
        ty: Box<TypeNode>,
        readonly: MappedModifierNode,
        optional: MappedModifierNode,
    },
}

impl TypeNode {
    pub fn keyword(kind: KeywordKind) -> Self {
        TypeNode::Keyword(kind)
    }

    pub fn string() -> Self {
        TypeNode::Keyword(KeywordKind::String)
    }

    pub fn number() -> Self {
        TypeNode::Keyword(KeywordKind::Number)
    }

    pub fn boolean() -> Self {
        TypeNode::Keyword(KeywordKind::Boolean)
    }

    pub fn string_literal(value: &str) -> Self {
        TypeNode::Literal(LiteralNode::String(value.to_string()))
    }

    pub fn number_literal(value: f64) -> Self {
        TypeNode::Literal(LiteralNode::Number(value))
    }

    /// Unqualified reference without type arguments (`T`, `Foo`).
    pub fn named(name: &str) -> Self {
        TypeNode::Reference {
            name: vec![name.to_string()],
            type_arguments: Vec::new(),
        }
    }

    /// Unqualified reference with type arguments (`Box<string>`).
    pub fn reference(name: &str, type_arguments: Vec<TypeNode>) -> Self {
        TypeNode::Reference {
            name: vec![name.to_string()],
            type_arguments,
        }
    }

    /// Qualified reference (`NS.Foo`).
    pub fn qualified(path: &[&str], type_arguments: Vec<TypeNode>) -> Self {
        TypeNode::Reference {
            name: path.iter().map(|s| s.to_string()).collect(),
            type_arguments,
        }
    }

    pub fn array(element: TypeNode) -> Self {
        TypeNode::Array(Box::new(element))
    }

    pub fn union(members: Vec<TypeNode>) -> Self {
        TypeNode::Union(members)
    }

    pub fn property(name: &str, ty: TypeNode) -> TypeMemberNode {
        TypeMemberNode::Property {
            name: name.to_string(),
            ty,
            optional: false,
            readonly: false,
        }
    }

    /// Every reference in this node and its children, outermost first.
    pub fn for_each_reference<'a>(&'a self, f: &mut dyn FnMut(&'a TypeNode)) {
        match self {
            TypeNode::Keyword(_) | TypeNode::Literal(_) => {}
            TypeNode::Reference { type_arguments, .. } => {
                f(self);
                for arg in type_arguments {
                    arg.for_each_reference(f);
                }
            }
            TypeNode::Union(members) | TypeNode::Intersection(members) => {
                for member in members {
                    member.for_each_reference(f);
                }
            }
            TypeNode::Array(element) | TypeNode::KeyOf(element) => element.for_each_reference(f),
            TypeNode::Tuple(elements) => {
                for element in elements {
                    element.ty.for_each_reference(f);
                }
            }
            TypeNode::Function(sig) | TypeNode::Constructor { signature: sig, .. } => {
                sig.for_each_reference(f)
            }
            TypeNode::TypeLiteral(members) => {
                for member in members {
                    match member {
                        TypeMemberNode::Property { ty, .. } => ty.for_each_reference(f),
                        TypeMemberNode::Method { signature, .. }
                        | TypeMemberNode::Call(signature)
                        | TypeMemberNode::Construct(signature) => signature.for_each_reference(f),
                        TypeMemberNode::Index { key, ty, .. } => {
                            key.for_each_reference(f);
                            ty.for_each_reference(f);
                        }
                    }
                }
            }
            TypeNode::IndexedAccess { object, index } => {
                object.for_each_reference(f);
                index.for_each_reference(f);
            }
            TypeNode::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => {
                check.for_each_reference(f);
                extends.for_each_reference(f);
                true_type.for_each_reference(f);
                false_type.for_each_reference(f);
            }
            TypeNode::Mapped { constraint, ty, .. } => {
                constraint.for_each_reference(f);
                ty.for_each_reference(f);
            }
        }
    }

    /// Names of type parameters introduced inside this node by function
    /// types, constructor types and mapped types.
    pub fn local_type_parameter_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_local_type_parameters(&mut names);
        names
    }

    fn collect_local_type_parameters<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TypeNode::Keyword(_) | TypeNode::Literal(_) => {}
            TypeNode::Reference { type_arguments, .. } => {
                for arg in type_arguments {
                    arg.collect_local_type_parameters(names);
                }
            }
            TypeNode::Union(members) | TypeNode::Intersection(members) => {
                for member in members {
                    member.collect_local_type_parameters(names);
                }
            }
            TypeNode::Array(element) | TypeNode::KeyOf(element) => element.collect_local_type_parameters(names),
            TypeNode::Tuple(elements) => {
                for element in elements {
                    element.ty.collect_local_type_parameters(names);
                }
            }
            TypeNode::Function(sig) | TypeNode::Constructor { signature: sig, .. } => {
                sig.collect_local_type_parameters(names)
            }
            TypeNode::TypeLiteral(members) => {
                for member in members {
                    match member {
                        TypeMemberNode::Property { ty, .. } => ty.collect_local_type_parameters(names),
                        TypeMemberNode::Method { signature, .. }
                        | TypeMemberNode::Call(signature)
                        | TypeMemberNode::Construct(signature) => signature.collect_local_type_parameters(names),
                        TypeMemberNode::Index { key, ty, .. } => {
                            key.collect_local_type_parameters(names);
                            ty.collect_local_type_parameters(names);
                        }
                    }
                }
            }
            TypeNode::IndexedAccess { object, index } => {
                object.collect_local_type_parameters(names);
                index.collect_local_type_parameters(names);
            }
            TypeNode::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => {
                for part in [check, extends, true_type, false_type] {
                    part.collect_local_type_parameters(names);
                }
            }
            TypeNode::Mapped {
                type_parameter,
                constraint,
                ty,
                ..
            } => {
                names.push(type_parameter.as_str());
                constraint.collect_local_type_parameters(names);
                ty.collect_local_type_parameters(names);
            }
        }
    }
}

impl SignatureNode {
    pub fn new(parameters: Vec<ParameterNode>, return_type: TypeNode) -> Self {
        SignatureNode {
            type_parameters: Vec::new(),
            parameters,
            return_type: Box::new(return_type),
        }
    }

    fn collect_local_type_parameters<'a>(&'a self, names: &mut Vec<&'a str>) {
        for tp in &self.type_parameters {
            names.push(tp.name.as_str());
            if let Some(constraint) = &tp.constraint {
                constraint.collect_local_type_parameters(names);
            }
            if let Some(default) = &tp.default {
                default.collect_local_type_parameters(names);
            }
        }
        for param in &self.parameters {
            param.ty.collect_local_type_parameters(names);
        }
        self.return_type.collect_local_type_parameters(names);
    }

    fn for_each_reference<'a>(&'a self, f: &mut dyn FnMut(&'a TypeNode)) {
        for tp in &self.type_parameters {
            if let Some(constraint) = &tp.constraint {
                constraint.for_each_reference(f);
            }
            if let Some(default) = &tp.default {
                default.for_each_reference(f);
            }
        }
        for param in &self.parameters {
            param.ty.for_each_reference(f);
        }
        self.return_type.for_each_reference(f);
    }
}

impl ParameterNode {
    pub fn new(name: &str, ty: TypeNode) -> Self {
        ParameterNode {
            name: name.to_string(),
            ty,
            optional: false,
            rest: false,
        }
    }
}

// =============================================================================
// Printer
// =============================================================================

fn write_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e21 {
        write!(f, "{}", value as i64)
    } else if value.is_nan() {
        f.write_str("NaN")
    } else if value.is_infinite() {
        f.write_str(if value > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{value}")
    }
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in value.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            _ => write!(f, "{ch}")?,
        }
    }
    f.write_str("\"")
}

/// Whether a node must be parenthesized as an array element or `keyof` operand.
fn needs_postfix_parens(node: &TypeNode) -> bool {
    matches!(
        node,
        TypeNode::Union(_)
            | TypeNode::Intersection(_)
            | TypeNode::Function(_)
            | TypeNode::Constructor { .. }
            | TypeNode::Conditional { .. }
            | TypeNode::KeyOf(_)
    )
}

/// Whether a node must be parenthesized as a union or intersection member.
fn needs_member_parens(node: &TypeNode, in_intersection: bool) -> bool {
    match node {
        TypeNode::Function(_) | TypeNode::Constructor { .. } | TypeNode::Conditional { .. } => true,
        TypeNode::Union(_) => in_intersection,
        _ => false,
    }
}

fn write_list(
    f: &mut fmt::Formatter<'_>,
    members: &[TypeNode],
    separator: &str,
    in_intersection: bool,
) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        if needs_member_parens(member, in_intersection) {
            write!(f, "({member})")?;
        } else {
            write!(f, "{member}")?;
        }
    }
    Ok(())
}

fn write_modifier(f: &mut fmt::Formatter<'_>, modifier: MappedModifierNode, text: &str) -> fmt::Result {
    match modifier {
        MappedModifierNode::None => Ok(()),
        MappedModifierNode::Add => f.write_str(text),
        MappedModifierNode::Remove => write!(f, "-{text}"),
    }
}

impl fmt::Display for TypeParameterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(constraint) = &self.constraint {
            write!(f, " extends {constraint}")?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SignatureNode {
    /// Prints `<T>(a: A, b?: B, ...c: C[])`; the caller adds the return arrow.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_parameters.is_empty() {
            f.write_str("<")?;
            for (i, tp) in self.type_parameters.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{tp}")?;
            }
            f.write_str(">")?;
        }
        f.write_str("(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if param.rest {
                f.write_str("...")?;
            }
            f.write_str(&param.name)?;
            if param.optional {
                f.write_str("?")?;
            }
            write!(f, ": {}", param.ty)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for TypeMemberNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeMemberNode::Property {
                name,
                ty,
                optional,
                readonly,
            } => {
                if *readonly {
                    f.write_str("readonly ")?;
                }
                f.write_str(name)?;
                if *optional {
                    f.write_str("?")?;
                }
                write!(f, ": {ty}")
            }
            TypeMemberNode::Method {
                name,
                signature,
                optional,
            } => {
                f.write_str(name)?;
                if *optional {
                    f.write_str("?")?;
                }
                write!(f, "{signature}: {}", signature.return_type)
            }
            TypeMemberNode::Call(signature) => write!(f, "{signature}: {}", signature.return_type),
            TypeMemberNode::Construct(signature) => {
                write!(f, "new {signature}: {}", signature.return_type)
            }
            TypeMemberNode::Index {
                parameter_name,
                key,
                ty,
                readonly,
            } => {
                if *readonly {
                    f.write_str("readonly ")?;
                }
                write!(f, "[{parameter_name}: {key}]: {ty}")
            }
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Keyword(kind) => f.write_str(kind.as_str()),
            TypeNode::Literal(literal) => match literal {
                LiteralNode::String(value) => write_string_literal(f, value),
                LiteralNode::Number(value) => write_number(f, *value),
                LiteralNode::Boolean(value) => write!(f, "{value}"),
                LiteralNode::BigInt(digits) => write!(f, "{digits}n"),
            },
            TypeNode::Reference {
                name,
                type_arguments,
            } => {
                f.write_str(&name.join("."))?;
                if !type_arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in type_arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeNode::Union(members) => write_list(f, members, " | ", false),
            TypeNode::Intersection(members) => write_list(f, members, " & ", true),
            TypeNode::Array(element) => {
                if needs_postfix_parens(element) {
                    write!(f, "({element})[]")
                } else {
                    write!(f, "{element}[]")
                }
            }
            TypeNode::Tuple(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if element.rest {
                        f.write_str("...")?;
                    }
                    write!(f, "{}", element.ty)?;
                    if element.optional {
                        f.write_str("?")?;
                    }
                }
                f.write_str("]")
            }
            TypeNode::Function(signature) => write!(f, "{signature} => {}", signature.return_type),
            TypeNode::Constructor {
                signature,
                is_abstract,
            } => {
                if *is_abstract {
                    f.write_str("abstract ")?;
                }
                write!(f, "new {signature} => {}", signature.return_type)
            }
            TypeNode::TypeLiteral(members) => {
                if members.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(" }")
            }
            TypeNode::IndexedAccess { object, index } => {
                if needs_postfix_parens(object) {
                    write!(f, "({object})[{index}]")
                } else {
                    write!(f, "{object}[{index}]")
                }
            }
            TypeNode::KeyOf(operand) => {
                if needs_postfix_parens(operand) && !matches!(**operand, TypeNode::KeyOf(_)) {
                    write!(f, "keyof ({operand})")
                } else {
                    write!(f, "keyof {operand}")
                }
            }
            TypeNode::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => {
                if matches!(
                    **check,
                    TypeNode::Function(_) | TypeNode::Constructor { .. } | TypeNode::Conditional { .. }
                ) {
                    write!(f, "({check})")?;
                } else {
                    write!(f, "{check}")?;
                }
                write!(f, " extends {extends} ? {true_type} : {false_type}")
            }
            TypeNode::Mapped {
                type_parameter,
                constraint,
                ty,
                readonly,
                optional,
            } => {
                f.write_str("{ ")?;
                if *readonly != MappedModifierNode::None {
                    write_modifier(f, *readonly, "readonly")?;
                    f.write_str(" ")?;
                }
                write!(f, "[{type_parameter} in {constraint}]")?;
                write_modifier(f, *optional, "?")?;
                write!(f, ": {ty} }}")
            }
        }
    }
}
