//! The wire tree.
//!
//! A [`WireValue`] is either an [`Item`] (a type tag plus a fixed number of
//! text fields) or a `List` of further wire values. Trees are built bottom-up
//! by the encoder and never mutated afterwards; the only way to build an item
//! is through the per-tag constructors below, which fix its arity.

use std::fmt;

use crate::codec::{encode_complex, encode_double};
use crate::error::WireError;
use crate::sanitize::escape_text;
use crate::value::bool_text;

/// Closed set of item tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int,
    Double,
    String,
    Bool,
    Complex,
    Dict,
    Symbolic,
    InternalError,
}

impl TypeTag {
    /// Numeric protocol code, emitted as the first field of every item.
    pub const fn code(self) -> u16 {
        match self {
            TypeTag::Int => 1001,
            TypeTag::Double => 1002,
            TypeTag::String => 1003,
            TypeTag::Bool => 1005,
            TypeTag::Complex => 1006,
            TypeTag::Dict => 1010,
            TypeTag::Symbolic => 1020,
            TypeTag::InternalError => 1099,
        }
    }

    /// Number of text fields an item with this tag carries.
    pub const fn arity(self) -> usize {
        match self {
            TypeTag::Int | TypeTag::Double | TypeTag::String | TypeTag::Bool => 1,
            TypeTag::Complex | TypeTag::InternalError => 2,
            TypeTag::Dict => 0,
            TypeTag::Symbolic => 6,
        }
    }
}

/// One matrix dimension: a concrete size or the NaN sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    Known(u64),
    Unresolved,
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Known(n) => write!(f, "{n}"),
            Dim::Unresolved => f.write_str("nan"),
        }
    }
}

/// `(rows, cols)` of a symbolic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolicShape {
    pub rows: Dim,
    pub cols: Dim,
}

impl SymbolicShape {
    pub const SCALAR: SymbolicShape = SymbolicShape::concrete(1, 1);

    pub const fn concrete(rows: u64, cols: u64) -> Self {
        SymbolicShape {
            rows: Dim::Known(rows),
            cols: Dim::Known(cols),
        }
    }
}

/// The text fields of a `SYMBOLIC` item, already escaped where required.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicFields {
    pub repr: String,
    pub shape: SymbolicShape,
    pub default_str: String,
    pub ascii_pretty: String,
    pub unicode_pretty: String,
}

/// A tagged leaf node.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    tag: TypeTag,
    fields: Vec<String>,
    children: Vec<WireValue>,
}

impl Item {
    fn leaf(tag: TypeTag, fields: Vec<String>) -> Self {
        debug_assert_eq!(fields.len(), tag.arity());
        Item {
            tag,
            fields,
            children: Vec::new(),
        }
    }

    pub fn int(n: i64) -> Self {
        Self::leaf(TypeTag::Int, vec![n.to_string()])
    }

    pub fn double(x: f64) -> Self {
        Self::leaf(TypeTag::Double, vec![encode_double(x)])
    }

    /// A string item. `escaped` must already be run through the sanitizer.
    pub fn string(escaped: impl Into<String>) -> Self {
        Self::leaf(TypeTag::String, vec![escaped.into()])
    }

    pub fn boolean(b: bool) -> Self {
        Self::leaf(TypeTag::Bool, vec![bool_text(b).to_string()])
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Self::leaf(TypeTag::Complex, encode_complex(re, im).to_vec())
    }

    /// A dict item; `keys` and `values` line up positionally.
    pub fn dict(keys: Vec<WireValue>, values: Vec<WireValue>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Item {
            tag: TypeTag::Dict,
            fields: Vec::new(),
            children: vec![WireValue::List(keys), WireValue::List(values)],
        }
    }

    pub fn symbolic(fields: SymbolicFields) -> Self {
        Self::leaf(
            TypeTag::Symbolic,
            vec![
                fields.repr,
                fields.shape.rows.to_string(),
                fields.shape.cols.to_string(),
                fields.default_str,
                fields.ascii_pretty,
                fields.unicode_pretty,
            ],
        )
    }

    pub fn internal_error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::leaf(TypeTag::InternalError, vec![kind.into(), message.into()])
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Sub-structure; non-empty only for `DICT` (keys list, values list).
    pub fn children(&self) -> &[WireValue] {
        &self.children
    }
}

/// A node of the wire tree.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Item(Item),
    List(Vec<WireValue>),
}

impl WireValue {
    /// Tier-2 failure report for an encode that could not complete. The
    /// message goes through [`escape_text`] like any other free text.
    pub fn internal_error(err: &WireError) -> Self {
        WireValue::Item(Item::internal_error(err.kind(), escape_text(err.detail())))
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            WireValue::Item(item) => Some(item),
            WireValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[WireValue]> {
        match self {
            WireValue::List(children) => Some(children),
            WireValue::Item(_) => None,
        }
    }
}

impl From<Item> for WireValue {
    fn from(item: Item) -> Self {
        WireValue::Item(item)
    }
}
