//! Symbolic payloads.
//!
//! These are the closed set of categories the expression engine hands to the
//! encoder: plain expressions, concrete matrices, matrix expressions whose
//! dimensions may themselves be symbolic, and N-dimensional arrays.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, WireError};

/// Named numeric constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constant {
    Pi,
    E,
    ImaginaryUnit,
    Infinity,
    NegativeInfinity,
    ComplexInfinity,
    NaN,
}

/// Relational operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Expr {
    /// A symbol together with the assumptions attached to it.
    ///
    /// Example: `Symbol('x', positive=True)`
    Symbol {
        name: String,
        #[serde(default)]
        assumptions: BTreeMap<String, bool>,
    },

    Integer(i64),

    /// Numerator and (positive) denominator.
    Rational(i64, i64),

    Float(f64),

    Constant(Constant),

    /// Logical `true` / `false` atoms.
    Boolean(bool),

    Add(Vec<Expr>),

    Mul(Vec<Expr>),

    Pow(Box<Expr>, Box<Expr>),

    /// Function application, e.g. `sin(x)` or an undefined `f(x, y)`.
    Function { name: String, args: Vec<Expr> },

    Relational {
        op: RelOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Symbol {
            name: name.into(),
            assumptions: BTreeMap::new(),
        }
    }

    /// A symbol carrying assumptions such as `("positive", true)`.
    pub fn symbol_with<I, K>(name: impl Into<String>, assumptions: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        Expr::Symbol {
            name: name.into(),
            assumptions: assumptions
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    pub fn pow(base: Expr, exp: Expr) -> Self {
        Expr::Pow(Box::new(base), Box::new(exp))
    }

    pub fn relational(op: RelOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Relational {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// The value as a non-negative integer literal, if it is one.
    pub fn as_dimension(&self) -> Option<u64> {
        match self {
            Expr::Integer(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }
}

/// A matrix with concrete dimensions, entries stored row-major.
///
/// The entry count always equals `rows * cols`; deserialization rejects
/// payloads that break this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    entries: Vec<Expr>,
}

#[derive(Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<Expr>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = WireError;

    fn try_from(raw: RawMatrix) -> Result<Self> {
        Matrix::new(raw.rows, raw.cols, raw.entries)
    }
}

impl Matrix {
    /// Build a `rows` × `cols` matrix from row-major entries.
    pub fn new(rows: usize, cols: usize, entries: Vec<Expr>) -> Result<Self> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            WireError::InvalidShape(format!("matrix dimensions {rows}x{cols} overflow"))
        })?;
        if entries.len() != expected {
            return Err(WireError::InvalidShape(format!(
                "{rows}x{cols} matrix needs {expected} entries, got {}",
                entries.len()
            )));
        }
        Ok(Matrix {
            rows,
            cols,
            entries,
        })
    }

    /// Build a matrix from its rows. Returns `None` for ragged input.
    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Option<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != ncols) {
            return None;
        }
        Some(Matrix {
            rows: nrows,
            cols: ncols,
            entries: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn entries(&self) -> &[Expr] {
        &self.entries
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Expr> {
        if row < self.rows && col < self.cols {
            self.entries.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> Option<&[Expr]> {
        if row >= self.rows {
            return None;
        }
        let start = row.checked_mul(self.cols)?;
        self.entries.get(start..start.checked_add(self.cols)?)
    }

    /// Rows in order. Empty when either dimension is zero.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Expr]> {
        (0..self.rows).filter_map(move |r| self.row(r))
    }
}

/// A matrix-valued expression whose dimensions are expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MatrixExpr {
    /// Example: `MatrixSymbol('A', Integer(2), Symbol('n'))`
    Symbol {
        name: String,
        rows: Expr,
        cols: Expr,
    },
    Transpose(Box<MatrixExpr>),
}

impl MatrixExpr {
    pub fn symbol(name: impl Into<String>, rows: Expr, cols: Expr) -> Self {
        MatrixExpr::Symbol {
            name: name.into(),
            rows,
            cols,
        }
    }

    /// Dimensions as expressions, `(rows, cols)`.
    pub fn shape(&self) -> (&Expr, &Expr) {
        match self {
            MatrixExpr::Symbol { rows, cols, .. } => (rows, cols),
            MatrixExpr::Transpose(inner) => {
                let (rows, cols) = inner.shape();
                (cols, rows)
            }
        }
    }
}

/// An N-dimensional array, entries stored row-major.
///
/// The entry count always equals the product of `shape` (one entry for
/// rank 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArray")]
pub struct NdArray {
    shape: Vec<usize>,
    entries: Vec<Expr>,
}

#[derive(Deserialize)]
struct RawArray {
    shape: Vec<usize>,
    entries: Vec<Expr>,
}

impl TryFrom<RawArray> for NdArray {
    type Error = WireError;

    fn try_from(raw: RawArray) -> Result<Self> {
        NdArray::new(raw.shape, raw.entries)
    }
}

impl NdArray {
    pub fn new(shape: Vec<usize>, entries: Vec<Expr>) -> Result<Self> {
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, n| acc.checked_mul(*n))
            .ok_or_else(|| WireError::InvalidShape(format!("array shape {shape:?} overflows")))?;
        if entries.len() != expected {
            return Err(WireError::InvalidShape(format!(
                "array of shape {shape:?} needs {expected} entries, got {}",
                entries.len()
            )));
        }
        Ok(NdArray { shape, entries })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn entries(&self) -> &[Expr] {
        &self.entries
    }
}

/// Everything the encoder routes through the rich symbolic encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Symbolic {
    /// The "no result" marker.
    Absent,
    Expr(Expr),
    Matrix(Matrix),
    MatrixExpr(MatrixExpr),
    Array(NdArray),
}

impl Symbolic {
    /// Engine-facing type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Symbolic::Absent => "NoneType",
            Symbolic::Expr(_) => "Expr",
            Symbolic::Matrix(_) => "MutableDenseMatrix",
            Symbolic::MatrixExpr(MatrixExpr::Symbol { .. }) => "MatrixSymbol",
            Symbolic::MatrixExpr(MatrixExpr::Transpose(_)) => "Transpose",
            Symbolic::Array(_) => "ImmutableDenseNDimArray",
        }
    }
}
