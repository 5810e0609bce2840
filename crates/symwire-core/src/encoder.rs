//! Tree encoder.
//!
//! Walks one runtime value and builds its [`WireValue`] tree:
//!
//! 1. collapse 1×1 matrices ([`normalize_scalar`])
//! 2. [`classify`]
//! 3. emit the item or list for the category, recursing into sequences and
//!    mappings
//!
//! Any failure other than a pretty-printing one aborts the whole encode; no
//! partial tree is ever returned.

use tracing::{debug, trace, warn};

use crate::classify::{Category, classify, normalize_scalar, resolve_shape};
use crate::engine::{EngineCapabilities, ExpressionEngine, PrettyStyle};
use crate::error::{Result, WireError};
use crate::sanitize::escape_text;
use crate::symbolic::Symbolic;
use crate::value::{Mapping, RuntimeValue};
use crate::wire::{Item, SymbolicFields, WireValue};

/// Encodes runtime values against one expression engine.
pub struct Encoder<'e, E: ExpressionEngine + ?Sized> {
    engine: &'e E,
    capabilities: EngineCapabilities,
}

impl<'e, E: ExpressionEngine + ?Sized> Encoder<'e, E> {
    /// Bind to `engine`, reading its capabilities once.
    pub fn new(engine: &'e E) -> Self {
        let capabilities = engine.capabilities();
        debug!(
            engine = %capabilities.name,
            version = %capabilities.version,
            unicode = capabilities.unicode_pretty,
            "encoder ready"
        );
        Encoder {
            engine,
            capabilities,
        }
    }

    pub fn capabilities(&self) -> &EngineCapabilities {
        &self.capabilities
    }

    /// Build the wire tree for `value`.
    pub fn encode(&self, value: &RuntimeValue) -> Result<WireValue> {
        let x = normalize_scalar(value);
        let x = x.as_ref();
        let category = classify(x)?;
        trace!(?category, type_name = x.type_name(), "encoding node");
        match (category, x) {
            (Category::Bool, RuntimeValue::Bool(b)) => Ok(Item::boolean(*b).into()),
            (Category::Symbolic, RuntimeValue::Symbolic(symbolic)) => self.symbolic(symbolic),
            (Category::Symbolic, RuntimeValue::Absent) => self.symbolic(&Symbolic::Absent),
            (Category::Sequence, RuntimeValue::Sequence { items, .. }) => items
                .iter()
                .map(|item| self.encode(item))
                .collect::<Result<Vec<_>>>()
                .map(WireValue::List),
            (Category::Int, RuntimeValue::Int(n)) => Ok(Item::int(*n).into()),
            (Category::Real, RuntimeValue::Real(r)) => Ok(Item::double(*r).into()),
            (Category::Complex, RuntimeValue::Complex { re, im }) => {
                Ok(Item::complex(*re, *im).into())
            }
            (Category::Text, RuntimeValue::Text(s)) => Ok(Item::string(escape_text(s)).into()),
            (Category::Mapping, RuntimeValue::Mapping(m)) => self.mapping(m),
            _ => Err(WireError::UnsupportedType(x.type_name().to_string())),
        }
    }

    fn symbolic(&self, x: &Symbolic) -> Result<WireValue> {
        let shape = resolve_shape(x);
        let repr = self.engine.srepr(x)?;
        let default_str = self.engine.to_str(x);
        let ascii_pretty = self.pretty_or_default(x, PrettyStyle::Ascii, &default_str);
        let unicode_pretty = if self.capabilities.unicode_pretty {
            self.pretty_or_default(x, PrettyStyle::Unicode, &default_str)
        } else {
            ascii_pretty.clone()
        };
        Ok(Item::symbolic(SymbolicFields {
            repr,
            shape,
            default_str,
            ascii_pretty: escape_text(&ascii_pretty),
            unicode_pretty: escape_text(&unicode_pretty),
        })
        .into())
    }

    fn pretty_or_default(&self, x: &Symbolic, style: PrettyStyle, default_str: &str) -> String {
        match self.engine.pretty(x, style) {
            Ok(pretty) => pretty,
            Err(err) => {
                warn!(?style, error = %err, "pretty rendering failed, using default string");
                default_str.to_string()
            }
        }
    }

    fn mapping(&self, m: &Mapping) -> Result<WireValue> {
        let mut keys = Vec::with_capacity(m.len());
        let mut values = Vec::with_capacity(m.len());
        for (key, value) in m {
            keys.push(self.encode(&RuntimeValue::Text(key.to_string()))?);
            values.push(self.encode(value)?);
        }
        Ok(Item::dict(keys, values).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_double;
    use crate::engine::TreeEngine;
    use crate::symbolic::{Expr, Matrix};
    use crate::wire::TypeTag;

    fn encode(value: &RuntimeValue) -> Result<WireValue> {
        let engine = TreeEngine::new();
        Encoder::new(&engine).encode(value)
    }

    fn item(value: &RuntimeValue) -> Item {
        match encode(value).unwrap() {
            WireValue::Item(item) => item,
            other => panic!("expected item, got {other:?}"),
        }
    }

    #[test]
    fn test_int() {
        let item = item(&RuntimeValue::Int(5));
        assert_eq!(item.tag(), TypeTag::Int);
        assert_eq!(item.fields(), ["5"]);
    }

    #[test]
    fn test_bool_is_not_int() {
        let item = item(&RuntimeValue::Bool(true));
        assert_eq!(item.tag(), TypeTag::Bool);
        assert_eq!(item.fields(), ["True"]);
    }

    #[test]
    fn test_list_of_numbers() {
        let value = RuntimeValue::list(vec![RuntimeValue::Int(1), RuntimeValue::Real(2.5)]);
        let tree = encode(&value).unwrap();
        assert_eq!(
            tree,
            WireValue::List(vec![Item::int(1).into(), Item::double(2.5).into()])
        );
        let children = tree.as_list().unwrap();
        assert_eq!(children[1].as_item().unwrap().fields(), [encode_double(2.5)]);
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(
            encode(&RuntimeValue::tuple(Vec::new())).unwrap(),
            WireValue::List(Vec::new())
        );
    }

    #[test]
    fn test_complex() {
        let item = item(&RuntimeValue::Complex { re: 1.0, im: -0.0 });
        assert_eq!(item.fields(), ["3ff0000000000000", "8000000000000000"]);
    }

    #[test]
    fn test_text_is_escaped() {
        let item = item(&RuntimeValue::text("a\nb"));
        assert_eq!(item.tag(), TypeTag::String);
        assert_eq!(item.fields(), ["a\\nb"]);
    }

    #[test]
    fn test_dict_preserves_insertion_order() {
        let mut m = Mapping::new();
        m.insert("b", RuntimeValue::Int(2));
        m.insert("a", RuntimeValue::Int(1));
        let item = item(&RuntimeValue::Mapping(m));
        assert_eq!(item.tag(), TypeTag::Dict);
        assert!(item.fields().is_empty());
        assert_eq!(
            item.children(),
            [
                WireValue::List(vec![Item::string("b").into(), Item::string("a").into()]),
                WireValue::List(vec![Item::int(2).into(), Item::int(1).into()]),
            ]
        );
    }

    #[test]
    fn test_dict_keys_are_stringified() {
        let mut m = Mapping::new();
        m.insert(3_i64, RuntimeValue::Bool(false));
        let item = item(&RuntimeValue::Mapping(m));
        assert_eq!(
            item.children()[0],
            WireValue::List(vec![Item::string("3").into()])
        );
    }

    #[test]
    fn test_symbolic_fields() {
        let x = Expr::symbol_with("x", [("positive", true)]);
        let item = item(&RuntimeValue::expr(Expr::pow(x, Expr::Integer(2))));
        assert_eq!(item.tag(), TypeTag::Symbolic);
        assert_eq!(
            item.fields(),
            [
                "Pow(Symbol('x', positive=True), Integer(2))",
                "1",
                "1",
                "x**2",
                " 2\\nx ",
                " 2\\nx ",
            ]
        );
    }

    #[test]
    fn test_absent_uses_symbolic_path() {
        let item = item(&RuntimeValue::Absent);
        assert_eq!(item.tag(), TypeTag::Symbolic);
        assert_eq!(item.fields(), ["None", "1", "1", "None", "None", "None"]);
    }

    #[test]
    fn test_one_by_one_matrix_matches_scalar() {
        let m = Matrix::from_rows(vec![vec![Expr::symbol("x")]]).unwrap();
        let nested = RuntimeValue::list(vec![RuntimeValue::matrix(m)]);
        let scalar = RuntimeValue::list(vec![RuntimeValue::expr(Expr::symbol("x"))]);
        assert_eq!(encode(&nested).unwrap(), encode(&scalar).unwrap());
    }

    #[test]
    fn test_pretty_failure_falls_back_to_default_string() {
        let nested = Expr::pow(
            Expr::symbol("x"),
            Expr::pow(Expr::symbol("y"), Expr::Integer(2)),
        );
        let item = item(&RuntimeValue::expr(nested));
        assert_eq!(item.fields()[3], "x**(y**2)");
        assert_eq!(item.fields()[4], "x**(y**2)");
        assert_eq!(item.fields()[5], "x**(y**2)");
    }

    #[test]
    fn test_unsupported_leaf_fails_whole_encode() {
        let value = RuntimeValue::list(vec![
            RuntimeValue::Int(1),
            RuntimeValue::opaque("_io.TextIOWrapper"),
        ]);
        assert_eq!(
            encode(&value).unwrap_err(),
            WireError::UnsupportedType("_io.TextIOWrapper".into())
        );
    }

    #[test]
    fn test_ascii_only_engine_reuses_ascii_rendering() {
        let engine = TreeEngine::new().with_unicode(false);
        let encoder = Encoder::new(&engine);
        let tree = encoder
            .encode(&RuntimeValue::expr(Expr::Mul(vec![
                Expr::Integer(2),
                Expr::symbol("x"),
            ])))
            .unwrap();
        let fields = tree.as_item().unwrap().fields();
        assert_eq!(fields[4], "2*x");
        assert_eq!(fields[5], "2*x");
    }
}
