//! Two-dimensional pretty printing.
//!
//! Output is built from rectangular [`Block`]s of text with a baseline row.
//! Blocks are glued horizontally along their baselines, stacked for
//! fractions and matrices, and raised for exponents.
//!
//! ```text
//!  2     x
//! x  +  ---
//!        2
//! ```
//!
//! Exponents must fit on one line: `x**(y**2)` or `x**(1/3)` cannot be laid
//! out and fail with [`WireError::PrettyRender`].

use super::overrides::RenderOverrides;
use super::tree::{
    PREC_ADD, PREC_MUL, PREC_POW, PREC_REL, negated, precedence, str_array, str_expr,
};
use super::PrettyStyle;
use crate::error::{Result, WireError};
use crate::symbolic::{Constant, Expr, Matrix, MatrixExpr, NdArray, RelOp, Symbolic};

/// Greek letter names drawn as glyphs in Unicode mode.
const GREEK: &[(&str, &str)] = &[
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("theta", "θ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("pi", "π"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("phi", "φ"),
    ("omega", "ω"),
];

/// A rectangle of text. All lines have the same width.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Block {
    lines: Vec<String>,
    baseline: usize,
}

fn text_width(s: &str) -> usize {
    s.chars().count()
}

fn pad_right(s: &str, width: usize) -> String {
    let mut out = s.to_string();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(text_width(s))));
    out
}

fn center(s: &str, width: usize) -> String {
    let gap = width.saturating_sub(text_width(s));
    let left = gap / 2;
    let mut out = " ".repeat(left);
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', gap - left));
    out
}

impl Block {
    pub(crate) fn atom(s: impl Into<String>) -> Self {
        Block {
            lines: vec![s.into()],
            baseline: 0,
        }
    }

    fn width(&self) -> usize {
        self.lines.first().map_or(0, |l| text_width(l))
    }

    fn height(&self) -> usize {
        self.lines.len()
    }

    /// Glue blocks left to right along their baselines.
    fn hcat(blocks: &[Block]) -> Block {
        let above = blocks.iter().map(|b| b.baseline).max().unwrap_or(0);
        let below = blocks
            .iter()
            .map(|b| b.height() - b.baseline - 1)
            .max()
            .unwrap_or(0);
        let height = above + below + 1;
        let mut lines = vec![String::new(); height];
        for block in blocks {
            let blank = " ".repeat(block.width());
            let offset = above - block.baseline;
            for (row, line) in lines.iter_mut().enumerate() {
                match row.checked_sub(offset).and_then(|r| block.lines.get(r)) {
                    Some(text) => line.push_str(text),
                    None => line.push_str(&blank),
                }
            }
        }
        Block {
            lines,
            baseline: above,
        }
    }

    /// Stack `top` over a rule over `bottom`, centered; baseline on the rule.
    fn fraction(top: Block, bottom: Block, rule: char) -> Block {
        let width = top.width().max(bottom.width());
        let mut lines: Vec<String> = top.lines.iter().map(|l| center(l, width)).collect();
        let baseline = lines.len();
        lines.push(std::iter::repeat_n(rule, width).collect());
        lines.extend(bottom.lines.iter().map(|l| center(l, width)));
        Block { lines, baseline }
    }

    /// Raise a one-line `exp` to the upper right of `self`.
    fn superscript(self, exp: Block) -> Result<Block> {
        if exp.height() != 1 {
            return Err(WireError::PrettyRender(format!(
                "exponent needs {} lines; only single-line exponents can be raised",
                exp.height()
            )));
        }
        let base_width = self.width();
        let exp_width = exp.width();
        let mut lines = Vec::with_capacity(self.height() + 1);
        lines.push(format!("{}{}", " ".repeat(base_width), exp.lines[0]));
        lines.extend(
            self.lines
                .iter()
                .map(|l| format!("{l}{}", " ".repeat(exp_width))),
        );
        Ok(Block {
            lines,
            baseline: self.baseline + 1,
        })
    }

    /// Surround with left/right delimiters, picking glyphs by line position.
    fn delimit(self, left: [&str; 4], right: [&str; 4]) -> Block {
        let height = self.height();
        let glyph = |set: [&str; 4], row: usize| -> String {
            let [single, top, middle, bottom] = set;
            let g = if height == 1 {
                single
            } else if row == 0 {
                top
            } else if row + 1 == height {
                bottom
            } else {
                middle
            };
            g.to_string()
        };
        let lines = self
            .lines
            .iter()
            .enumerate()
            .map(|(row, line)| format!("{}{line}{}", glyph(left, row), glyph(right, row)))
            .collect();
        Block {
            lines,
            baseline: self.baseline,
        }
    }

    pub(crate) fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// Pretty printer for one output style.
pub(crate) struct PrettyPrinter<'a> {
    style: PrettyStyle,
    overrides: &'a RenderOverrides,
}

impl<'a> PrettyPrinter<'a> {
    pub(crate) fn new(style: PrettyStyle, overrides: &'a RenderOverrides) -> Self {
        PrettyPrinter { style, overrides }
    }

    fn unicode(&self) -> bool {
        self.style == PrettyStyle::Unicode
    }

    pub(crate) fn render(&self, value: &Symbolic) -> Result<String> {
        let block = match value {
            Symbolic::Absent => Block::atom("None"),
            Symbolic::Expr(expr) => self.expr(expr)?,
            Symbolic::Matrix(m) => self.matrix(m)?,
            Symbolic::MatrixExpr(expr) => self.matrix_expr(expr)?,
            Symbolic::Array(array) => self.array(array)?,
        };
        Ok(block.render())
    }

    fn parens(&self, block: Block) -> Block {
        if self.unicode() {
            block.delimit(["(", "⎛", "⎜", "⎝"], [")", "⎞", "⎟", "⎠"])
        } else {
            block.delimit(["(", "/", "|", "\\"], [")", "\\", "|", "/"])
        }
    }

    fn brackets(&self, block: Block) -> Block {
        if self.unicode() {
            block.delimit(["[", "⎡", "⎢", "⎣"], ["]", "⎤", "⎥", "⎦"])
        } else {
            block.delimit(["[", "[", "[", "["], ["]", "]", "]", "]"])
        }
    }

    fn rule(&self) -> char {
        if self.unicode() { '─' } else { '-' }
    }

    fn wrapped(&self, expr: &Expr, threshold: u8) -> Result<Block> {
        let block = self.expr(expr)?;
        Ok(if precedence(expr) < threshold {
            self.parens(block)
        } else {
            block
        })
    }

    fn symbol_name(&self, name: &str) -> String {
        if self.unicode() {
            if let Some((_, glyph)) = GREEK.iter().find(|(n, _)| *n == name) {
                return (*glyph).to_string();
            }
        }
        name.to_string()
    }

    fn constant(&self, c: Constant) -> &'static str {
        match (c, self.unicode()) {
            (Constant::Pi, true) => "π",
            (Constant::Pi, false) => "pi",
            (Constant::E, true) => "ℯ",
            (Constant::E, false) => "E",
            (Constant::ImaginaryUnit, true) => "ⅈ",
            (Constant::ImaginaryUnit, false) => "I",
            (Constant::Infinity, true) => "∞",
            (Constant::Infinity, false) => "oo",
            (Constant::NegativeInfinity, true) => "-∞",
            (Constant::NegativeInfinity, false) => "-oo",
            (Constant::ComplexInfinity, _) => "zoo",
            (Constant::NaN, _) => "nan",
        }
    }

    fn expr(&self, expr: &Expr) -> Result<Block> {
        match expr {
            Expr::Symbol { name, .. } => Ok(Block::atom(self.symbol_name(name))),
            Expr::Integer(_) | Expr::Float(_) | Expr::Boolean(_) => {
                Ok(Block::atom(str_expr(expr)))
            }
            Expr::Rational(p, q) => {
                let fraction = Block::fraction(
                    Block::atom(p.unsigned_abs().to_string()),
                    Block::atom(q.to_string()),
                    self.rule(),
                );
                Ok(if *p < 0 {
                    Block::hcat(&[Block::atom("-"), fraction])
                } else {
                    fraction
                })
            }
            Expr::Constant(c) => Ok(Block::atom(self.constant(*c))),
            Expr::Add(terms) => self.add(terms),
            Expr::Mul(factors) => self.mul(factors),
            Expr::Pow(base, exp) => self.pow(base, exp),
            Expr::Function { name, args } => self.function(name, args),
            Expr::Relational { op, lhs, rhs } => {
                let symbol = match (op, self.unicode()) {
                    (RelOp::Eq, _) => "=",
                    (RelOp::Ne, true) => "≠",
                    (RelOp::Ne, false) => "!=",
                    (RelOp::Lt, _) => "<",
                    (RelOp::Le, true) => "≤",
                    (RelOp::Le, false) => "<=",
                    (RelOp::Gt, _) => ">",
                    (RelOp::Ge, true) => "≥",
                    (RelOp::Ge, false) => ">=",
                };
                Ok(Block::hcat(&[
                    self.wrapped(lhs, PREC_REL + 1)?,
                    Block::atom(format!(" {symbol} ")),
                    self.wrapped(rhs, PREC_REL + 1)?,
                ]))
            }
        }
    }

    fn add(&self, terms: &[Expr]) -> Result<Block> {
        let Some((first, rest)) = terms.split_first() else {
            return Ok(Block::atom("0"));
        };
        let mut parts = vec![self.expr(first)?];
        for term in rest {
            match negated(term) {
                Some(positive) => {
                    parts.push(Block::atom(" - "));
                    parts.push(self.wrapped(&positive, PREC_MUL)?);
                }
                None => {
                    parts.push(Block::atom(" + "));
                    parts.push(self.wrapped(term, PREC_ADD + 1)?);
                }
            }
        }
        Ok(Block::hcat(&parts))
    }

    fn product(&self, factors: &[Expr]) -> Result<Block> {
        let sep = if self.unicode() { "⋅" } else { "*" };
        let mut parts = Vec::with_capacity(factors.len() * 2);
        for (i, factor) in factors.iter().enumerate() {
            if i > 0 {
                parts.push(Block::atom(sep));
            }
            parts.push(self.wrapped(factor, PREC_MUL)?);
        }
        Ok(match parts.len() {
            0 => Block::atom("1"),
            _ => Block::hcat(&parts),
        })
    }

    fn mul(&self, factors: &[Expr]) -> Result<Block> {
        if let Some(Expr::Integer(-1)) = factors.first() {
            if factors.len() > 1 {
                let body = self.mul(&factors[1..])?;
                return Ok(Block::hcat(&[Block::atom("-"), body]));
            }
        }
        // factors of the form b**-1 go below the rule
        let (denominator, numerator): (Vec<&Expr>, Vec<&Expr>) = factors
            .iter()
            .partition(|f| matches!(f, Expr::Pow(_, e) if **e == Expr::Integer(-1)));
        if denominator.is_empty() {
            return self.product(factors);
        }
        let numerator: Vec<Expr> = numerator.into_iter().cloned().collect();
        let denominator: Vec<Expr> = denominator
            .into_iter()
            .filter_map(|f| match f {
                Expr::Pow(base, _) => Some(base.as_ref().clone()),
                _ => None,
            })
            .collect();
        Ok(Block::fraction(
            self.product(&numerator)?,
            self.product(&denominator)?,
            self.rule(),
        ))
    }

    fn pow(&self, base: &Expr, exp: &Expr) -> Result<Block> {
        match exp {
            Expr::Rational(1, 2) => {
                let inner = self.expr(base)?;
                if self.unicode() && inner.height() == 1 {
                    Ok(Block::hcat(&[Block::atom("√"), self.wrapped(base, PREC_POW)?]))
                } else {
                    Ok(Block::hcat(&[Block::atom("sqrt"), self.parens(inner)]))
                }
            }
            Expr::Integer(-1) => Ok(Block::fraction(
                Block::atom("1"),
                self.expr(base)?,
                self.rule(),
            )),
            _ => {
                let base = self.wrapped(base, PREC_POW + 1)?;
                let exp = self.wrapped(exp, PREC_POW + 1)?;
                base.superscript(exp)
            }
        }
    }

    fn function(&self, name: &str, args: &[Expr]) -> Result<Block> {
        let (name, args) = match self.overrides.apply(name, args) {
            Some((name, args)) => (name, args),
            None => (name.to_string(), args.to_vec()),
        };
        let mut parts = Vec::with_capacity(args.len() * 2);
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                parts.push(Block::atom(", "));
            }
            parts.push(self.expr(arg)?);
        }
        let inner = if parts.is_empty() {
            Block::atom("")
        } else {
            Block::hcat(&parts)
        };
        Ok(Block::hcat(&[Block::atom(name), self.parens(inner)]))
    }

    fn matrix(&self, m: &Matrix) -> Result<Block> {
        let rows: Vec<Vec<Expr>> = m.iter_rows().map(<[Expr]>::to_vec).collect();
        self.table(&rows)
    }

    /// Lay out a grid of cells, two spaces between columns and a blank line
    /// between rows, then bracket it.
    fn table(&self, rows: &[Vec<Expr>]) -> Result<Block> {
        let ncols = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || ncols == 0 {
            return Ok(Block::atom("[]"));
        }
        if rows.iter().any(|row| row.len() != ncols) {
            return Err(WireError::Engine(format!(
                "ragged table: expected {ncols} cells in every row"
            )));
        }
        let mut cells = Vec::with_capacity(rows.len());
        for row in rows {
            let mut blocks = Vec::with_capacity(ncols);
            for expr in row {
                blocks.push(self.expr(expr)?);
            }
            cells.push(blocks);
        }
        Ok(self.layout(cells, ncols))
    }

    fn layout(&self, cells: Vec<Vec<Block>>, ncols: usize) -> Block {
        let widths: Vec<usize> = (0..ncols)
            .map(|c| cells.iter().map(|row| row[c].width()).max().unwrap_or(0))
            .collect();
        let mut lines = Vec::new();
        for (r, row) in cells.iter().enumerate() {
            if r > 0 {
                lines.push(String::new());
            }
            let mut parts = Vec::with_capacity(ncols * 2);
            for (c, block) in row.iter().enumerate() {
                if c > 0 {
                    parts.push(Block::atom("  "));
                }
                parts.push(Block {
                    lines: block.lines.iter().map(|l| center(l, widths[c])).collect(),
                    baseline: block.baseline,
                });
            }
            lines.extend(Block::hcat(&parts).lines);
        }
        let width = lines.iter().map(|l| text_width(l)).max().unwrap_or(0);
        let lines: Vec<String> = lines.iter().map(|l| pad_right(l, width)).collect();
        let baseline = lines.len() / 2;
        self.brackets(Block { lines, baseline })
    }

    fn matrix_expr(&self, expr: &MatrixExpr) -> Result<Block> {
        match expr {
            MatrixExpr::Symbol { name, .. } => Ok(Block::atom(self.symbol_name(name))),
            MatrixExpr::Transpose(inner) => {
                let base = self.matrix_expr(inner)?;
                let base = match inner.as_ref() {
                    MatrixExpr::Symbol { .. } => base,
                    MatrixExpr::Transpose(_) => self.parens(base),
                };
                base.superscript(Block::atom("T"))
            }
        }
    }

    fn array(&self, array: &NdArray) -> Result<Block> {
        match array.shape() {
            [] => match array.entries().first() {
                Some(entry) => self.expr(entry),
                None => Ok(Block::atom("[]")),
            },
            [n] => self.table(&[array.entries().iter().take(*n).cloned().collect()]),
            [rows, cols] => {
                let cells: Vec<Vec<Expr>> = array
                    .entries()
                    .chunks((*cols).max(1))
                    .take(*rows)
                    .map(<[Expr]>::to_vec)
                    .collect();
                self.table(&cells)
            }
            _ => Ok(Block::atom(str_array(array))),
        }
    }
}
