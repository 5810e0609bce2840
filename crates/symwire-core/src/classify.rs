//! Value classification and shape resolution.
//!
//! Classification walks an ordered predicate table and takes the first hit.
//! The predicates overlap the way a numeric tower does (a boolean is also an
//! integer, an integer also a real, a real also a complex), so the order is
//! what keeps `true` from going out as `1`.

use std::borrow::Cow;

use crate::error::{Result, WireError};
use crate::symbolic::{Expr, MatrixExpr, Symbolic};
use crate::value::RuntimeValue;
use crate::wire::{Dim, SymbolicShape};

/// Wire category of a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Bool,
    Symbolic,
    Sequence,
    Int,
    Real,
    Complex,
    Text,
    Mapping,
}

type Predicate = fn(&RuntimeValue) -> bool;

/// Dispatch order. Earlier entries win.
const DISPATCH: [(Category, Predicate); 8] = [
    (Category::Bool, is_boolean),
    (Category::Symbolic, is_expression),
    (Category::Sequence, is_sequence),
    (Category::Int, is_integer),
    (Category::Real, is_real),
    (Category::Complex, is_complex),
    (Category::Text, is_text),
    (Category::Mapping, is_mapping),
];

pub fn is_boolean(x: &RuntimeValue) -> bool {
    matches!(x, RuntimeValue::Bool(_))
}

/// Expressions, matrices, arrays and the absent marker.
pub fn is_expression(x: &RuntimeValue) -> bool {
    matches!(x, RuntimeValue::Symbolic(_) | RuntimeValue::Absent)
}

pub fn is_sequence(x: &RuntimeValue) -> bool {
    matches!(x, RuntimeValue::Sequence { .. })
}

pub fn is_integer(x: &RuntimeValue) -> bool {
    matches!(x, RuntimeValue::Int(_)) || is_boolean(x)
}

pub fn is_real(x: &RuntimeValue) -> bool {
    matches!(x, RuntimeValue::Real(_)) || is_integer(x)
}

pub fn is_complex(x: &RuntimeValue) -> bool {
    matches!(x, RuntimeValue::Complex { .. }) || is_real(x)
}

pub fn is_text(x: &RuntimeValue) -> bool {
    matches!(x, RuntimeValue::Text(_))
}

pub fn is_mapping(x: &RuntimeValue) -> bool {
    matches!(x, RuntimeValue::Mapping(_))
}

/// Pick the wire category of `x`.
pub fn classify(x: &RuntimeValue) -> Result<Category> {
    DISPATCH
        .iter()
        .find(|(_, predicate)| predicate(x))
        .map(|(category, _)| *category)
        .ok_or_else(|| WireError::UnsupportedType(x.type_name().to_string()))
}

/// Collapse a 1×1 matrix to its only element.
pub fn normalize_scalar(x: &RuntimeValue) -> Cow<'_, RuntimeValue> {
    match x {
        RuntimeValue::Symbolic(Symbolic::Matrix(m)) if m.rows() == 1 && m.cols() == 1 => {
            match m.entries().first() {
                Some(entry) => Cow::Owned(RuntimeValue::expr(entry.clone())),
                None => Cow::Borrowed(x),
            }
        }
        _ => Cow::Borrowed(x),
    }
}

/// Resolve the `(rows, cols)` reported for a symbolic value.
pub fn resolve_shape(x: &Symbolic) -> SymbolicShape {
    match x {
        Symbolic::Absent | Symbolic::Expr(_) => SymbolicShape::SCALAR,
        Symbolic::Matrix(m) => SymbolicShape::concrete(m.rows() as u64, m.cols() as u64),
        Symbolic::MatrixExpr(expr) => matrix_expr_shape(expr),
        Symbolic::Array(array) => match array.shape() {
            [] => SymbolicShape::SCALAR,
            [n] => SymbolicShape::concrete(1, *n as u64),
            [rows, rest @ ..] => {
                SymbolicShape::concrete(*rows as u64, rest.iter().product::<usize>() as u64)
            }
        },
    }
}

fn matrix_expr_shape(expr: &MatrixExpr) -> SymbolicShape {
    let resolve = |dim: &Expr| match dim.as_dimension() {
        Some(n) => Dim::Known(n),
        None => Dim::Unresolved,
    };
    let (rows, cols) = expr.shape();
    SymbolicShape {
        rows: resolve(rows),
        cols: resolve(cols),
    }
}
