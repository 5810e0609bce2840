//! Rendering overrides for specific functions.
//!
//! The pretty renderer looks a function up here before drawing it. A hit
//! replaces the displayed name and arguments; the expression itself and its
//! exact representation are left alone.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::symbolic::{Constant, Expr};

/// Maps a function's arguments to the name and arguments to display.
pub type Rewrite = Arc<dyn Fn(&[Expr]) -> (String, Vec<Expr>) + Send + Sync>;

/// Table of rewrites keyed by function name.
#[derive(Clone, Default)]
pub struct RenderOverrides {
    table: HashMap<String, Rewrite>,
}

impl RenderOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock table:
    ///
    /// - `LambertW(x, k)` shows as `lambertw(k, x)`, the host's argument order
    /// - `sinc(x)` shows as `sinc(x/pi)`, the host's normalized sinc
    pub fn with_defaults() -> Self {
        let mut overrides = Self::new();
        overrides.insert("LambertW", |args: &[Expr]| {
            ("lambertw".to_string(), args.iter().rev().cloned().collect())
        });
        overrides.insert("sinc", |args: &[Expr]| {
            let scaled = args
                .iter()
                .map(|arg| {
                    Expr::Mul(vec![
                        arg.clone(),
                        Expr::pow(Expr::Constant(Constant::Pi), Expr::Integer(-1)),
                    ])
                })
                .collect();
            ("sinc".to_string(), scaled)
        });
        overrides
    }

    pub fn insert<F>(&mut self, name: impl Into<String>, rewrite: F)
    where
        F: Fn(&[Expr]) -> (String, Vec<Expr>) + Send + Sync + 'static,
    {
        self.table.insert(name.into(), Arc::new(rewrite));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.table.remove(name).is_some()
    }

    /// Display name and arguments for `name(args)`, if overridden.
    pub fn apply(&self, name: &str, args: &[Expr]) -> Option<(String, Vec<Expr>)> {
        self.table.get(name).map(|rewrite| rewrite(args))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl fmt::Debug for RenderOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("RenderOverrides")
            .field("functions", &names)
            .finish()
    }
}
