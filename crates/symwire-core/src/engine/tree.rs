//! Reference engine over [`Expr`] trees.
//!
//! Produces a constructor-style exact representation (`srepr`), a compact
//! one-line string, and 2D pretty output via [`super::pretty`].

use std::fmt::Write;

use super::overrides::RenderOverrides;
use super::pretty::PrettyPrinter;
use super::{EngineCapabilities, EngineVersion, ExpressionEngine, PrettyStyle};
use crate::error::Result;
use crate::symbolic::{Constant, Expr, Matrix, MatrixExpr, NdArray, RelOp, Symbolic};
use crate::value::bool_text;

/// Functions the host knows by name; anything else is an undefined function.
const KNOWN_FUNCTIONS: &[&str] = &[
    "Abs", "acos", "acosh", "asin", "asinh", "atan", "atan2", "atanh", "ceiling", "conjugate",
    "cos", "cosh", "DiracDelta", "erf", "erfc", "exp", "factorial", "floor", "gamma", "Heaviside",
    "im", "LambertW", "log", "Max", "Min", "re", "sign", "sin", "sinc", "sinh", "sqrt", "tan",
    "tanh",
];

pub(crate) const PREC_REL: u8 = 20;
pub(crate) const PREC_ADD: u8 = 40;
pub(crate) const PREC_MUL: u8 = 50;
pub(crate) const PREC_POW: u8 = 60;
pub(crate) const PREC_ATOM: u8 = 100;

/// Binding strength of `expr` when printed.
pub(crate) fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Integer(n) if *n < 0 => PREC_ADD,
        Expr::Float(x) if x.is_sign_negative() => PREC_ADD,
        Expr::Rational(p, _) if *p < 0 => PREC_ADD,
        Expr::Rational(..) => PREC_MUL,
        Expr::Constant(Constant::NegativeInfinity) => PREC_ADD,
        Expr::Add(terms) if terms.len() > 1 => PREC_ADD,
        Expr::Add(terms) => terms.first().map_or(PREC_ATOM, precedence),
        Expr::Mul(factors) if factors.len() > 1 => match factors.first() {
            Some(first) if negated(first).is_some() => PREC_ADD,
            _ => PREC_MUL,
        },
        Expr::Mul(factors) => factors.first().map_or(PREC_ATOM, precedence),
        Expr::Pow(..) => PREC_POW,
        Expr::Relational { .. } => PREC_REL,
        _ => PREC_ATOM,
    }
}

/// `-expr` when `expr` prints with a leading minus sign.
pub(crate) fn negated(expr: &Expr) -> Option<Expr> {
    match expr {
        Expr::Integer(n) if *n < 0 => n.checked_neg().map(Expr::Integer),
        Expr::Float(x) if x.is_sign_negative() && !x.is_nan() => Some(Expr::Float(-x)),
        Expr::Rational(p, q) if *p < 0 => p.checked_neg().map(|p| Expr::Rational(p, *q)),
        Expr::Constant(Constant::NegativeInfinity) => Some(Expr::Constant(Constant::Infinity)),
        Expr::Mul(factors) => {
            let (first, rest) = factors.split_first()?;
            let first = negated(first)?;
            let mut rest = rest.to_vec();
            if first != Expr::Integer(1) {
                rest.insert(0, first);
            }
            Some(match rest.len() {
                0 => Expr::Integer(1),
                1 => rest.remove(0),
                _ => Expr::Mul(rest),
            })
        }
        _ => None,
    }
}

/// Reference implementation of [`ExpressionEngine`].
#[derive(Debug, Clone)]
pub struct TreeEngine {
    overrides: RenderOverrides,
    version: EngineVersion,
    unicode: bool,
}

impl Default for TreeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeEngine {
    /// Engine with the stock rendering overrides and Unicode output enabled.
    pub fn new() -> Self {
        TreeEngine {
            overrides: RenderOverrides::with_defaults(),
            version: EngineVersion::parse(env!("CARGO_PKG_VERSION")),
            unicode: true,
        }
    }

    pub fn with_overrides(mut self, overrides: RenderOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = unicode;
        self
    }

    pub fn overrides(&self) -> &RenderOverrides {
        &self.overrides
    }
}

impl ExpressionEngine for TreeEngine {
    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            name: "tree".to_string(),
            version: self.version.clone(),
            unicode_pretty: self.unicode,
        }
    }

    fn srepr(&self, value: &Symbolic) -> Result<String> {
        let mut out = String::new();
        match value {
            Symbolic::Absent => out.push_str("None"),
            Symbolic::Expr(expr) => srepr_expr(expr, &mut out),
            Symbolic::Matrix(m) => srepr_matrix(m, &mut out),
            Symbolic::MatrixExpr(expr) => srepr_matrix_expr(expr, &mut out),
            Symbolic::Array(array) => srepr_array(array, &mut out),
        }
        Ok(out)
    }

    fn to_str(&self, value: &Symbolic) -> String {
        match value {
            Symbolic::Absent => "None".to_string(),
            Symbolic::Expr(expr) => str_expr(expr),
            Symbolic::Matrix(m) => str_matrix(m),
            Symbolic::MatrixExpr(expr) => str_matrix_expr(expr),
            Symbolic::Array(array) => str_array(array),
        }
    }

    fn pretty(&self, value: &Symbolic, style: PrettyStyle) -> Result<String> {
        PrettyPrinter::new(style, &self.overrides).render(value)
    }
}

fn quote(name: &str) -> String {
    format!("'{}'", name.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn srepr_args(args: &[Expr], out: &mut String) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        srepr_expr(arg, out);
    }
}

pub(crate) fn constant_srepr(c: Constant) -> &'static str {
    match c {
        Constant::Pi => "pi",
        Constant::E => "E",
        Constant::ImaginaryUnit => "I",
        Constant::Infinity => "oo",
        Constant::NegativeInfinity => "-oo",
        Constant::ComplexInfinity => "zoo",
        Constant::NaN => "nan",
    }
}

fn relational_class(op: RelOp) -> &'static str {
    match op {
        RelOp::Eq => "Equality",
        RelOp::Ne => "Unequality",
        RelOp::Lt => "StrictLessThan",
        RelOp::Le => "LessThan",
        RelOp::Gt => "StrictGreaterThan",
        RelOp::Ge => "GreaterThan",
    }
}

fn srepr_expr(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Symbol { name, assumptions } => {
            out.push_str("Symbol(");
            out.push_str(&quote(name));
            for (key, value) in assumptions {
                let _ = write!(out, ", {key}={}", bool_text(*value));
            }
            out.push(')');
        }
        Expr::Integer(n) => {
            let _ = write!(out, "Integer({n})");
        }
        Expr::Rational(p, q) => {
            let _ = write!(out, "Rational({p}, {q})");
        }
        Expr::Float(x) => {
            let _ = write!(out, "Float('{}', precision=53)", float_literal(*x));
        }
        Expr::Constant(c) => out.push_str(constant_srepr(*c)),
        Expr::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Expr::Add(terms) if terms.is_empty() => out.push_str("Integer(0)"),
        Expr::Mul(factors) if factors.is_empty() => out.push_str("Integer(1)"),
        Expr::Add(args) | Expr::Mul(args) if args.len() == 1 => srepr_expr(&args[0], out),
        Expr::Add(terms) => {
            out.push_str("Add(");
            srepr_args(terms, out);
            out.push(')');
        }
        Expr::Mul(factors) => {
            out.push_str("Mul(");
            srepr_args(factors, out);
            out.push(')');
        }
        Expr::Pow(base, exp) => {
            out.push_str("Pow(");
            srepr_expr(base, out);
            out.push_str(", ");
            srepr_expr(exp, out);
            out.push(')');
        }
        Expr::Function { name, args } => {
            if KNOWN_FUNCTIONS.contains(&name.as_str()) {
                out.push_str(name);
            } else {
                let _ = write!(out, "Function({})", quote(name));
            }
            out.push('(');
            srepr_args(args, out);
            out.push(')');
        }
        Expr::Relational { op, lhs, rhs } => {
            out.push_str(relational_class(*op));
            out.push('(');
            srepr_expr(lhs, out);
            out.push_str(", ");
            srepr_expr(rhs, out);
            out.push(')');
        }
    }
}

/// Float text the engine parses back; non-finite values use `nan`/`inf`.
fn float_literal(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        format!("{x:?}")
    }
}

fn srepr_matrix(m: &Matrix, out: &mut String) {
    if m.rows() == 0 || m.cols() == 0 {
        let _ = write!(out, "MutableDenseMatrix({}, {}, [])", m.rows(), m.cols());
        return;
    }
    out.push_str("MutableDenseMatrix([");
    for (r, row) in m.iter_rows().enumerate() {
        if r > 0 {
            out.push_str(", ");
        }
        out.push('[');
        srepr_args(row, out);
        out.push(']');
    }
    out.push_str("])");
}

fn srepr_matrix_expr(expr: &MatrixExpr, out: &mut String) {
    match expr {
        MatrixExpr::Symbol { name, rows, cols } => {
            let _ = write!(out, "MatrixSymbol({}, ", quote(name));
            srepr_expr(rows, out);
            out.push_str(", ");
            srepr_expr(cols, out);
            out.push(')');
        }
        MatrixExpr::Transpose(inner) => {
            out.push_str("Transpose(");
            srepr_matrix_expr(inner, out);
            out.push(')');
        }
    }
}

fn srepr_array(array: &NdArray, out: &mut String) {
    out.push_str("ImmutableDenseNDimArray([");
    srepr_args(array.entries(), out);
    out.push_str("], (");
    for (i, n) in array.shape().iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{n}");
    }
    if array.shape().len() == 1 {
        out.push(',');
    }
    out.push_str("))");
}

fn wrap(expr: &Expr, threshold: u8) -> String {
    let s = str_expr(expr);
    if precedence(expr) < threshold {
        format!("({s})")
    } else {
        s
    }
}

fn join_str(args: &[Expr]) -> String {
    args.iter().map(str_expr).collect::<Vec<_>>().join(", ")
}

/// One-line rendering of an expression.
pub(crate) fn str_expr(expr: &Expr) -> String {
    match expr {
        Expr::Symbol { name, .. } => name.clone(),
        Expr::Integer(n) => n.to_string(),
        Expr::Rational(p, q) => format!("{p}/{q}"),
        Expr::Float(x) => format!("{x:?}"),
        Expr::Constant(c) => constant_srepr(*c).to_string(),
        Expr::Boolean(b) => bool_text(*b).to_string(),
        Expr::Add(terms) => match terms.split_first() {
            None => "0".to_string(),
            Some((first, rest)) => {
                let mut out = str_expr(first);
                for term in rest {
                    match negated(term) {
                        Some(positive) => {
                            out.push_str(" - ");
                            out.push_str(&wrap(&positive, PREC_MUL));
                        }
                        None => {
                            out.push_str(" + ");
                            out.push_str(&wrap(term, PREC_ADD + 1));
                        }
                    }
                }
                out
            }
        },
        Expr::Mul(factors) => match factors.split_first() {
            None => "1".to_string(),
            Some((Expr::Integer(-1), rest)) if !rest.is_empty() => {
                let rest = if rest.len() == 1 {
                    rest[0].clone()
                } else {
                    Expr::Mul(rest.to_vec())
                };
                format!("-{}", wrap(&rest, PREC_MUL))
            }
            Some(_) => factors
                .iter()
                .enumerate()
                .map(|(i, f)| {
                    // a leading negative coefficient prints bare: -2*x
                    if i == 0 && negated(f).is_some() && !matches!(f, Expr::Mul(_)) {
                        str_expr(f)
                    } else {
                        wrap(f, PREC_MUL)
                    }
                })
                .collect::<Vec<_>>()
                .join("*"),
        },
        Expr::Pow(base, exp) => match exp.as_ref() {
            Expr::Rational(1, 2) => format!("sqrt({})", str_expr(base)),
            Expr::Integer(-1) => format!("1/{}", wrap(base, PREC_POW)),
            _ => format!("{}**{}", wrap(base, PREC_POW + 1), wrap(exp, PREC_POW + 1)),
        },
        Expr::Function { name, args } => format!("{name}({})", join_str(args)),
        Expr::Relational { op, lhs, rhs } => match op {
            RelOp::Eq => format!("Eq({}, {})", str_expr(lhs), str_expr(rhs)),
            RelOp::Ne => format!("Ne({}, {})", str_expr(lhs), str_expr(rhs)),
            _ => {
                let symbol = match op {
                    RelOp::Lt => "<",
                    RelOp::Le => "<=",
                    RelOp::Gt => ">",
                    _ => ">=",
                };
                format!(
                    "{} {symbol} {}",
                    wrap(lhs, PREC_REL + 1),
                    wrap(rhs, PREC_REL + 1)
                )
            }
        },
    }
}

fn str_matrix(m: &Matrix) -> String {
    if m.rows() == 0 || m.cols() == 0 {
        return format!("Matrix({}, {}, [])", m.rows(), m.cols());
    }
    let rows: Vec<String> = m
        .iter_rows()
        .map(|row| format!("[{}]", join_str(row)))
        .collect();
    format!("Matrix([{}])", rows.join(", "))
}

fn str_matrix_expr(expr: &MatrixExpr) -> String {
    match expr {
        MatrixExpr::Symbol { name, .. } => name.clone(),
        MatrixExpr::Transpose(inner) => format!("{}.T", str_matrix_expr(inner)),
    }
}

pub(crate) fn str_array(array: &NdArray) -> String {
    fn nest(shape: &[usize], entries: &[Expr]) -> String {
        match shape.split_first() {
            None => entries.first().map(str_expr).unwrap_or_default(),
            Some((_, rest)) if rest.is_empty() => format!("[{}]", join_str(entries)),
            Some((n, rest)) => {
                let stride: usize = rest.iter().product();
                let parts: Vec<String> = (0..*n)
                    .map(|i| {
                        let start = (i * stride).min(entries.len());
                        let end = ((i + 1) * stride).min(entries.len());
                        nest(rest, &entries[start..end])
                    })
                    .collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
    nest(array.shape(), array.entries())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn x() -> Expr {
        Expr::symbol("x")
    }

    fn srepr(expr: Expr) -> String {
        TreeEngine::new().srepr(&Symbolic::Expr(expr)).unwrap()
    }

    #[test]
    fn test_srepr_lists_assumptions_explicitly() {
        let x = Expr::symbol_with("x", [("real", true), ("positive", true)]);
        assert_eq!(srepr(x), "Symbol('x', positive=True, real=True)");
    }

    #[rstest]
    #[case(Expr::Integer(5), "Integer(5)")]
    #[case(Expr::Rational(1, 2), "Rational(1, 2)")]
    #[case(Expr::Float(2.5), "Float('2.5', precision=53)")]
    #[case(Expr::Float(f64::NAN), "Float('nan', precision=53)")]
    #[case(Expr::Float(f64::NEG_INFINITY), "Float('-inf', precision=53)")]
    #[case(Expr::Constant(Constant::Pi), "pi")]
    #[case(Expr::Add(vec![x(), Expr::Integer(1)]), "Add(Symbol('x'), Integer(1))")]
    #[case(Expr::function("sin", vec![x()]), "sin(Symbol('x'))")]
    #[case(Expr::function("f", vec![x()]), "Function('f')(Symbol('x'))")]
    #[case(
        Expr::relational(RelOp::Le, x(), Expr::Integer(1)),
        "LessThan(Symbol('x'), Integer(1))"
    )]
    #[case(Expr::symbol("it's"), "Symbol('it\\'s')")]
    fn test_srepr_expr(#[case] expr: Expr, #[case] expected: &str) {
        assert_eq!(srepr(expr), expected);
    }

    #[test]
    fn test_srepr_containers() {
        let engine = TreeEngine::new();
        let m = Matrix::from_rows(vec![
            vec![Expr::Integer(1), x()],
            vec![Expr::Integer(3), Expr::Integer(4)],
        ])
        .unwrap();
        assert_eq!(
            engine.srepr(&Symbolic::Matrix(m)).unwrap(),
            "MutableDenseMatrix([[Integer(1), Symbol('x')], [Integer(3), Integer(4)]])"
        );
        let empty = Matrix::new(0, 3, Vec::new()).unwrap();
        assert_eq!(
            engine.srepr(&Symbolic::Matrix(empty)).unwrap(),
            "MutableDenseMatrix(0, 3, [])"
        );
        let a = MatrixExpr::symbol("A", Expr::Integer(2), Expr::symbol("n"));
        assert_eq!(
            engine.srepr(&Symbolic::MatrixExpr(a)).unwrap(),
            "MatrixSymbol('A', Integer(2), Symbol('n'))"
        );
        let v = NdArray::new(vec![2], vec![Expr::Integer(1), Expr::Integer(2)]).unwrap();
        assert_eq!(
            engine.srepr(&Symbolic::Array(v)).unwrap(),
            "ImmutableDenseNDimArray([Integer(1), Integer(2)], (2,))"
        );
        assert_eq!(engine.srepr(&Symbolic::Absent).unwrap(), "None");
    }

    #[rstest]
    #[case(Expr::Add(vec![x(), Expr::Integer(1)]), "x + 1")]
    #[case(Expr::Add(vec![x(), Expr::Integer(-1)]), "x - 1")]
    #[case(Expr::Mul(vec![Expr::Integer(2), x()]), "2*x")]
    #[case(Expr::Mul(vec![Expr::Integer(-1), x()]), "-x")]
    #[case(Expr::Add(vec![x(), Expr::Mul(vec![Expr::Integer(-3), x()])]), "x - 3*x")]
    #[case(Expr::pow(x(), Expr::Integer(2)), "x**2")]
    #[case(Expr::pow(Expr::Add(vec![x(), Expr::Integer(1)]), Expr::Integer(2)), "(x + 1)**2")]
    #[case(Expr::pow(x(), Expr::Rational(1, 2)), "sqrt(x)")]
    #[case(Expr::pow(x(), Expr::Integer(-1)), "1/x")]
    #[case(Expr::pow(x(), Expr::pow(Expr::symbol("y"), Expr::Integer(2))), "x**(y**2)")]
    #[case(Expr::relational(RelOp::Eq, x(), Expr::Integer(1)), "Eq(x, 1)")]
    #[case(Expr::relational(RelOp::Lt, x(), Expr::Integer(1)), "x < 1")]
    #[case(Expr::function("LambertW", vec![x()]), "LambertW(x)")]
    fn test_str_expr(#[case] expr: Expr, #[case] expected: &str) {
        assert_eq!(TreeEngine::new().to_str(&Symbolic::Expr(expr)), expected);
    }

    #[test]
    fn test_str_containers() {
        let engine = TreeEngine::new();
        let m = Matrix::from_rows(vec![vec![Expr::Integer(1), x()]]).unwrap();
        assert_eq!(engine.to_str(&Symbolic::Matrix(m)), "Matrix([[1, x]])");
        let t = MatrixExpr::Transpose(Box::new(MatrixExpr::symbol(
            "A",
            Expr::Integer(2),
            Expr::Integer(2),
        )));
        assert_eq!(engine.to_str(&Symbolic::MatrixExpr(t)), "A.T");
        let a = NdArray::new(vec![2, 2], (1..=4).map(Expr::Integer).collect()).unwrap();
        assert_eq!(engine.to_str(&Symbolic::Array(a)), "[[1, 2], [3, 4]]");
        assert_eq!(engine.to_str(&Symbolic::Absent), "None");
    }

    #[test]
    fn test_capabilities() {
        let caps = TreeEngine::new().with_unicode(false).capabilities();
        assert_eq!(caps.name, "tree");
        assert!(!caps.unicode_pretty);
    }
}
