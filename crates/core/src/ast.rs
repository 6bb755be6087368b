//! Formula AST.
//!
//! Deliberately restricted: literals, the `parents['Label']` accessor,
//! the fixed helper-function calls, binary operators, unary minus, and
//! one conditional form. No identifier resolves to anything outside the
//! parents map and the helper set, which is what keeps formulas
//! sandboxed and statically analyzable; the derived-field scheduler
//! and save-time cycle detection both lean on `referenced_parents`.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperFn {
    ComputeAge,
    Sum,
    Concat,
    Avg,
    Max,
    Min,
    If,
}

impl HelperFn {
    pub fn from_name(name: &str) -> Option<HelperFn> {
        match name {
            "computeAge" => Some(HelperFn::ComputeAge),
            "sum" => Some(HelperFn::Sum),
            "concat" => Some(HelperFn::Concat),
            "avg" => Some(HelperFn::Avg),
            "max" => Some(HelperFn::Max),
            "min" => Some(HelperFn::Min),
            "if" => Some(HelperFn::If),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HelperFn::ComputeAge => "computeAge",
            HelperFn::Sum => "sum",
            HelperFn::Concat => "concat",
            HelperFn::Avg => "avg",
            HelperFn::Max => "max",
            HelperFn::Min => "min",
            HelperFn::If => "if",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    /// `parents['Label']`
    Parent(String),
    Call {
        func: HelperFn,
        args: Vec<Expr>,
    },
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `cond ? then : else`, lazy; only the taken branch evaluates.
    Conditional {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
}

impl Expr {
    /// Parent labels referenced anywhere in the expression.
    pub fn referenced_parents(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_parents(&mut out);
        out
    }

    fn collect_parents(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) | Expr::Str(_) => {}
            Expr::Parent(label) => {
                out.insert(label.clone());
            }
            Expr::Call { args, .. } => {
                for a in args {
                    a.collect_parents(out);
                }
            }
            Expr::Neg(inner) => inner.collect_parents(out),
            Expr::Binary { left, right, .. } => {
                left.collect_parents(out);
                right.collect_parents(out);
            }
            Expr::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                cond.collect_parents(out);
                then_branch.collect_parents(out);
                else_branch.collect_parents(out);
            }
        }
    }
}
