//! Declaration arena, symbol tables and binder.
//!
//! The binder consumes an already-built `DeclarationArena` (parsing happens
//! elsewhere) and produces merged `Symbol`s:
//! - `nodes`: declaration records addressed by `NodeIndex`
//! - `type_node`: syntax-shaped type annotations and their printer
//! - `symbols`: `Symbol`, `SymbolArena`, `SymbolTable` and flag constants
//! - `state`: `BinderState`, declaration merging and name resolution

pub mod nodes;
pub use nodes::{
    Declaration, DeclarationArena, DeclarationKind, EnumInitializer, NodeIndex, SignatureDecl,
    VariableKind, modifier_flags,
};

pub mod type_node;
pub use type_node::{
    KeywordKind, LiteralNode, MappedModifierNode, ParameterNode, SignatureNode, TupleElementNode,
    TypeMemberNode, TypeNode, TypeParameterNode,
};

pub mod symbols;
pub use symbols::{
    Symbol, SymbolArena, SymbolId, SymbolTable, escape_name, internal_names, symbol_flags,
    unescape_name,
};

pub mod state;
pub use state::{BinderState, DeclareOutcome, DeclareResult};
