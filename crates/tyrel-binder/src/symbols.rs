//! Symbols and symbol tables.

use crate::nodes::NodeIndex;
use indexmap::IndexMap;
use serde::Serialize;

/// Handle of a symbol in a `SymbolArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Symbol flag bits. A merged symbol carries the union of its declarations' flags.
pub mod symbol_flags {
    pub const NONE: u32 = 0;
    pub const FUNCTION_SCOPED_VARIABLE: u32 = 1 << 0;
    pub const BLOCK_SCOPED_VARIABLE: u32 = 1 << 1;
    pub const PROPERTY: u32 = 1 << 2;
    pub const ENUM_MEMBER: u32 = 1 << 3;
    pub const FUNCTION: u32 = 1 << 4;
    pub const CLASS: u32 = 1 << 5;
    pub const INTERFACE: u32 = 1 << 6;
    pub const REGULAR_ENUM: u32 = 1 << 7;
    pub const VALUE_MODULE: u32 = 1 << 8;
    pub const NAMESPACE_MODULE: u32 = 1 << 9;
    pub const TYPE_LITERAL: u32 = 1 << 10;
    pub const METHOD: u32 = 1 << 11;
    pub const CONSTRUCTOR: u32 = 1 << 12;
    pub const SIGNATURE: u32 = 1 << 13;
    pub const TYPE_PARAMETER: u32 = 1 << 14;
    pub const TYPE_ALIAS: u32 = 1 << 15;
    pub const PARAMETER: u32 = 1 << 16;
    pub const STATIC: u32 = 1 << 17;
    pub const ABSTRACT: u32 = 1 << 18;
    pub const OPTIONAL: u32 = 1 << 19;
    pub const READONLY: u32 = 1 << 20;

    pub const VARIABLE: u32 = FUNCTION_SCOPED_VARIABLE | BLOCK_SCOPED_VARIABLE;
    pub const ENUM: u32 = REGULAR_ENUM;
    pub const MODULE: u32 = VALUE_MODULE | NAMESPACE_MODULE;

    /// Symbols visible in value position.
    pub const VALUE: u32 =
        VARIABLE | PROPERTY | ENUM_MEMBER | FUNCTION | CLASS | ENUM | VALUE_MODULE | METHOD;
    /// Symbols visible in type position.
    pub const TYPE: u32 =
        CLASS | INTERFACE | ENUM | ENUM_MEMBER | TYPE_LITERAL | TYPE_PARAMETER | TYPE_ALIAS;
    /// Symbols that can qualify a name (`A.B`).
    pub const NAMESPACE: u32 = VALUE_MODULE | NAMESPACE_MODULE | ENUM;

    /// Symbols that own a lazily built object structure.
    pub const HAS_STRUCTURE: u32 = CLASS | INTERFACE;
    /// Symbols whose members are stored in `members` (instance side).
    pub const HAS_MEMBERS: u32 = CLASS | INTERFACE | TYPE_LITERAL;
    /// Symbols whose children are stored in `exports`.
    pub const HAS_EXPORTS: u32 = CLASS | ENUM | MODULE;
}

/// Insertion-ordered symbol table keyed by escaped name.
///
/// Append-only for one binding pass: there is no removal.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: IndexMap::new(),
        }
    }

    pub fn get(&self, escaped_name: &str) -> Option<SymbolId> {
        self.symbols.get(escaped_name).copied()
    }

    pub fn set(&mut self, escaped_name: String, id: SymbolId) {
        self.symbols.insert(escaped_name, id);
    }

    pub fn has(&self, escaped_name: &str) -> bool {
        self.symbols.contains_key(escaped_name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolId)> {
        self.symbols.iter().map(|(name, &id)| (name.as_str(), id))
    }

    pub fn ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.values().copied()
    }
}

/// Escape a user identifier so it can never collide with a synthetic member
/// name: identifiers starting with `__` get one extra leading underscore.
pub fn escape_name(name: &str) -> String {
    if name.starts_with("__") {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

/// Reverse of `escape_name`. Synthetic names come back unchanged.
pub fn unescape_name(escaped: &str) -> &str {
    if escaped.starts_with("___") {
        &escaped[1..]
    } else {
        escaped
    }
}

/// Synthetic member names.
pub mod internal_names {
    pub const CALL: &str = "__call";
    pub const NEW: &str = "__new";
    pub const INDEX: &str = "__index";
    pub const CONSTRUCTOR: &str = "__constructor";
}

/// A named, possibly merged declaration entity.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub escaped_name: String,
    pub flags: u32,
    /// Owning declarations in binding order.
    pub declarations: Vec<NodeIndex>,
    /// The declaration used for value-position queries.
    pub value_declaration: NodeIndex,
    /// Instance members (interfaces, classes).
    pub members: SymbolTable,
    /// Static members, namespace contents, enum members.
    pub exports: SymbolTable,
    pub parent: SymbolId,
    /// Declarations that collided with this symbol without merging.
    pub conflicting_declarations: Vec<NodeIndex>,
}

impl Symbol {
    #[inline]
    pub fn has_flags(&self, flags: u32) -> bool {
        self.flags & flags != 0
    }

    /// The user-facing name.
    pub fn name(&self) -> &str {
        unescape_name(&self.escaped_name)
    }
}

/// Dense arena of symbols.
#[derive(Clone, Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> Self {
        SymbolArena {
            symbols: Vec::new(),
        }
    }

    pub fn alloc(&mut self, flags: u32, escaped_name: String) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            escaped_name,
            flags,
            declarations: Vec::new(),
            value_declaration: NodeIndex::NONE,
            members: SymbolTable::new(),
            exports: SymbolTable::new(),
            parent: SymbolId::NONE,
            conflicting_declarations: Vec::new(),
        });
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}
