// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Conversion between terms and SMT-LIB 2 text
//!
//! Rendering is total over the term language. Reading goes the other way
//! only for the small reply surface this crate consumes: model values and
//! the bounds printed by `(get-objectives)`, which mix ordinary numerals
//! with `oo` and `epsilon` arithmetic.

use crate::errors::{Result, SolverError};
use crate::z3::sexp::Sexp;
use num::bigint::Sign;
use num::{BigInt, BigRational, One, Zero};
use optsmt_core::{Sort, Term, Value};
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Tracks which constants have been declared to the live process.
#[derive(Debug, Default)]
pub struct SmtLibConverter {
    declared: BTreeMap<String, Sort>,
}

impl SmtLibConverter {
    pub fn new() -> SmtLibConverter {
        SmtLibConverter::default()
    }

    /// Declaration commands needed before `term` can be sent. Each
    /// constant is declared once per process lifetime.
    pub fn declarations_for(&mut self, term: &Term) -> Vec<String> {
        let mut commands = Vec::new();
        for (name, sort) in term.variables() {
            if let Entry::Vacant(entry) = self.declared.entry(name) {
                commands.push(format!(
                    "(declare-const {} {})",
                    entry.key(),
                    render_sort(sort)
                ));
                entry.insert(sort);
            }
        }
        commands
    }

    pub fn declared(&self) -> &BTreeMap<String, Sort> {
        &self.declared
    }
}

fn render_sort(sort: Sort) -> &'static str {
    match sort {
        Sort::Bool => "Bool",
        Sort::Int => "Int",
        Sort::Real => "Real",
    }
}

pub fn render_term(term: &Term) -> String {
    let mut out = String::new();
    write_term(&mut out, term);
    out
}

fn write_term(out: &mut String, term: &Term) {
    match term {
        Term::Const(value) => out.push_str(&render_value(value)),
        Term::Var { name, .. } => out.push_str(name),
        Term::Not(t) => write_unary(out, "not", t),
        Term::And(ts) => write_nary(out, "and", ts, "true"),
        Term::Or(ts) => write_nary(out, "or", ts, "false"),
        Term::Implies(a, b) => write_binary(out, "=>", a, b),
        Term::Eq(a, b) => write_binary(out, "=", a, b),
        Term::Lt(a, b) => write_binary(out, "<", a, b),
        Term::Le(a, b) => write_binary(out, "<=", a, b),
        Term::Gt(a, b) => write_binary(out, ">", a, b),
        Term::Ge(a, b) => write_binary(out, ">=", a, b),
        Term::Add(ts) => write_nary(out, "+", ts, "0"),
        Term::Sub(a, b) => write_binary(out, "-", a, b),
        Term::Neg(t) => write_unary(out, "-", t),
        Term::Mul(ts) => write_nary(out, "*", ts, "1"),
        Term::Div(a, b) => write_binary(out, "/", a, b),
        Term::Ite(c, t, e) => {
            out.push_str("(ite ");
            write_term(out, c);
            out.push(' ');
            write_term(out, t);
            out.push(' ');
            write_term(out, e);
            out.push(')');
        }
    }
}

fn write_unary(out: &mut String, op: &str, operand: &Term) {
    out.push('(');
    out.push_str(op);
    out.push(' ');
    write_term(out, operand);
    out.push(')');
}

fn write_binary(out: &mut String, op: &str, left: &Term, right: &Term) {
    out.push('(');
    out.push_str(op);
    out.push(' ');
    write_term(out, left);
    out.push(' ');
    write_term(out, right);
    out.push(')');
}

fn write_nary(out: &mut String, op: &str, operands: &[Term], identity: &str) {
    match operands {
        [] => out.push_str(identity),
        [only] => write_term(out, only),
        _ => {
            out.push('(');
            out.push_str(op);
            for operand in operands {
                out.push(' ');
                write_term(out, operand);
            }
            out.push(')');
        }
    }
}

pub fn render_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => {
            if i.sign() == Sign::Minus {
                format!("(- {})", i.magnitude())
            } else {
                i.to_string()
            }
        }
        Value::Real(r) => {
            let negative = r.numer().sign() == Sign::Minus;
            let body = if r.denom().is_one() {
                format!("{}.0", r.numer().magnitude())
            } else {
                format!("(/ {}.0 {}.0)", r.numer().magnitude(), r.denom())
            };
            if negative {
                format!("(- {})", body)
            } else {
                body
            }
        }
    }
}

/// Read a model value of the given sort. The reader is deliberately
/// liberal about numeral shapes: z3 prints `(- 5)`, `(/ 3.0 2.0)`,
/// decimals and plain numerals depending on logic and version.
pub fn parse_value(sexp: &Sexp, sort: Sort) -> Result<Value> {
    match sort {
        Sort::Bool => match sexp.atom() {
            Some("true") => Ok(Value::Bool(true)),
            Some("false") => Ok(Value::Bool(false)),
            _ => Err(bad_value(sexp, sort)),
        },
        Sort::Int => {
            let r = parse_rational(sexp).ok_or_else(|| bad_value(sexp, sort))?;
            if r.is_integer() {
                Ok(Value::Int(r.to_integer()))
            } else {
                Err(bad_value(sexp, sort))
            }
        }
        Sort::Real => parse_rational(sexp)
            .map(Value::Real)
            .ok_or_else(|| bad_value(sexp, sort)),
    }
}

fn bad_value(sexp: &Sexp, sort: Sort) -> SolverError {
    SolverError::Protocol(format!("cannot read `{}` as a {} value", sexp, sort))
}

fn parse_rational(sexp: &Sexp) -> Option<BigRational> {
    match sexp {
        Sexp::Atom(text) => parse_numeric_atom(text),
        Sexp::List(items) => {
            let (op, rest) = items.split_first()?;
            match (op.atom()?, rest) {
                ("-", [only]) => Some(-parse_rational(only)?),
                ("/", [a, b]) => {
                    let denom = parse_rational(b)?;
                    if denom.is_zero() {
                        None
                    } else {
                        Some(parse_rational(a)? / denom)
                    }
                }
                _ => None,
            }
        }
    }
}

fn parse_numeric_atom(text: &str) -> Option<BigRational> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = if let Some((whole, frac)) = digits.split_once('.') {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let numer = BigInt::from_str(&format!("{}{}", whole, frac)).ok()?;
        let denom = num::pow(BigInt::from(10), frac.len());
        BigRational::new(numer, denom)
    } else if let Some((n, d)) = digits.split_once('/') {
        let denom = BigInt::from_str(d).ok()?;
        if denom.is_zero() {
            return None;
        }
        BigRational::new(BigInt::from_str(n).ok()?, denom)
    } else {
        BigRational::from_integer(BigInt::from_str(digits).ok()?)
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Bound of one objective as printed by `(get-objectives)`.
///
/// An `epsilon` component records a strict bound the solver approached
/// but no model attains; an infinite bound records an objective that can
/// be improved forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveBound {
    Finite { base: BigRational, eps: BigRational },
    PlusInfinity,
    MinusInfinity,
}

impl ObjectiveBound {
    fn finite(base: BigRational, eps: BigRational) -> ObjectiveBound {
        ObjectiveBound::Finite { base, eps }
    }

    fn negated(self) -> ObjectiveBound {
        match self {
            ObjectiveBound::Finite { base, eps } => ObjectiveBound::finite(-base, -eps),
            ObjectiveBound::PlusInfinity => ObjectiveBound::MinusInfinity,
            ObjectiveBound::MinusInfinity => ObjectiveBound::PlusInfinity,
        }
    }

    fn sign(&self) -> Ordering {
        match self {
            ObjectiveBound::PlusInfinity => Ordering::Greater,
            ObjectiveBound::MinusInfinity => Ordering::Less,
            ObjectiveBound::Finite { base, eps } => match base.cmp(&BigRational::zero()) {
                Ordering::Equal => eps.cmp(&BigRational::zero()),
                other => other,
            },
        }
    }

    fn checked_add(self, other: ObjectiveBound) -> Option<ObjectiveBound> {
        match (self, other) {
            (
                ObjectiveBound::Finite { base: a, eps: x },
                ObjectiveBound::Finite { base: b, eps: y },
            ) => Some(ObjectiveBound::finite(a + b, x + y)),
            (ObjectiveBound::Finite { .. }, inf) | (inf, ObjectiveBound::Finite { .. }) => {
                Some(inf)
            }
            (ObjectiveBound::PlusInfinity, ObjectiveBound::PlusInfinity) => {
                Some(ObjectiveBound::PlusInfinity)
            }
            (ObjectiveBound::MinusInfinity, ObjectiveBound::MinusInfinity) => {
                Some(ObjectiveBound::MinusInfinity)
            }
            // oo - oo has no value
            _ => None,
        }
    }

    fn checked_mul(self, other: ObjectiveBound) -> Option<ObjectiveBound> {
        match (self, other) {
            (
                ObjectiveBound::Finite { base: a, eps: x },
                ObjectiveBound::Finite { base: b, eps: y },
            ) => {
                // epsilon squared is below any positive rational, drop it
                let eps = &a * &y + &b * &x;
                Some(ObjectiveBound::finite(a * b, eps))
            }
            (a, b) => match (a.sign(), b.sign()) {
                // 0 * oo has no value
                (Ordering::Equal, _) | (_, Ordering::Equal) => None,
                (sa, sb) if sa == sb => Some(ObjectiveBound::PlusInfinity),
                _ => Some(ObjectiveBound::MinusInfinity),
            },
        }
    }

    fn checked_div(self, other: ObjectiveBound) -> Option<ObjectiveBound> {
        match (self, other) {
            (
                ObjectiveBound::Finite { base: a, eps: x },
                ObjectiveBound::Finite { base: b, eps: y },
            ) if y.is_zero() && !b.is_zero() => {
                Some(ObjectiveBound::finite(a / &b, x / &b))
            }
            _ => None,
        }
    }

    /// Collapse the bound to an exact value of `sort`. Infinite and
    /// epsilon-bearing bounds have no such value and report which kind of
    /// unbounded objective was hit, named after the rendered `objective`.
    pub fn into_value(self, sort: Sort, objective: &str) -> Result<Value> {
        match self {
            ObjectiveBound::PlusInfinity | ObjectiveBound::MinusInfinity => {
                Err(SolverError::InfiniteValue(objective.to_string()))
            }
            ObjectiveBound::Finite { base, eps } => {
                if !eps.is_zero() {
                    return Err(SolverError::InfinitesimalValue(objective.to_string()));
                }
                match sort {
                    Sort::Real => Ok(Value::Real(base)),
                    Sort::Int if base.is_integer() => Ok(Value::Int(base.to_integer())),
                    Sort::Int => Err(SolverError::Protocol(format!(
                        "non-integral bound {} for the integer objective `{}`",
                        base, objective
                    ))),
                    Sort::Bool => Err(SolverError::Protocol(format!(
                        "boolean objective `{}` has no numeric bound",
                        objective
                    ))),
                }
            }
        }
    }
}

/// Read one bound expression: a numeral, `oo`, `epsilon`, or arithmetic
/// over those.
pub fn parse_bound(sexp: &Sexp) -> Result<ObjectiveBound> {
    match sexp {
        Sexp::Atom(text) => match text.as_str() {
            "oo" | "+oo" => Ok(ObjectiveBound::PlusInfinity),
            "-oo" => Ok(ObjectiveBound::MinusInfinity),
            "epsilon" => Ok(ObjectiveBound::finite(
                BigRational::zero(),
                BigRational::one(),
            )),
            _ => parse_numeric_atom(text)
                .map(|base| ObjectiveBound::finite(base, BigRational::zero()))
                .ok_or_else(|| bad_bound(sexp)),
        },
        Sexp::List(items) => {
            let (op, rest) = items.split_first().ok_or_else(|| bad_bound(sexp))?;
            let op = op.atom().ok_or_else(|| bad_bound(sexp))?;
            match (op, rest) {
                ("-", [only]) => Ok(parse_bound(only)?.negated()),
                ("-", [a, b]) => {
                    let subtracted = parse_bound(b)?.negated();
                    parse_bound(a)?
                        .checked_add(subtracted)
                        .ok_or_else(|| bad_bound(sexp))
                }
                ("+", operands) => {
                    let mut total =
                        ObjectiveBound::finite(BigRational::zero(), BigRational::zero());
                    for operand in operands {
                        total = total
                            .checked_add(parse_bound(operand)?)
                            .ok_or_else(|| bad_bound(sexp))?;
                    }
                    Ok(total)
                }
                ("*", operands) => {
                    let mut product =
                        ObjectiveBound::finite(BigRational::one(), BigRational::zero());
                    for operand in operands {
                        product = product
                            .checked_mul(parse_bound(operand)?)
                            .ok_or_else(|| bad_bound(sexp))?;
                    }
                    Ok(product)
                }
                ("/", [a, b]) => parse_bound(a)?
                    .checked_div(parse_bound(b)?)
                    .ok_or_else(|| bad_bound(sexp)),
                _ => Err(bad_bound(sexp)),
            }
        }
    }
}

fn bad_bound(sexp: &Sexp) -> SolverError {
    SolverError::Protocol(format!("cannot read `{}` as an objective bound", sexp))
}

/// Extract the bound of objective `index` from a `(get-objectives)` reply
/// shaped like `(objectives (term bound) ...)`.
pub fn objective_bound(reply: &Sexp, index: usize) -> Result<ObjectiveBound> {
    let bad = || {
        SolverError::Protocol(format!(
            "cannot read objective {} from `{}`",
            index, reply
        ))
    };
    let items = reply
        .list()
        .filter(|items| items.first().and_then(Sexp::atom) == Some("objectives"))
        .ok_or_else(bad)?;
    let entry = items.get(index + 1).and_then(Sexp::list).ok_or_else(bad)?;
    let bound = entry.last().ok_or_else(bad)?;
    parse_bound(bound)
}
