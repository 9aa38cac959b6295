// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Exact constant values

use crate::errors::{Error, Result};
use crate::sorts::Sort;
use crate::terms::Term;
use num::{BigInt, BigRational, Zero};
use std::cmp::Ordering;
use std::fmt;

/// An exact constant: a term literal, or the result of evaluating a term
/// under a model. Integers and rationals are arbitrary precision.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Value {
    Bool(bool),
    Int(BigInt),
    Real(BigRational),
}

impl Value {
    pub fn sort(&self) -> Sort {
        match self {
            Value::Bool(_) => Sort::Bool,
            Value::Int(_) => Sort::Int,
            Value::Real(_) => Sort::Real,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The constant term carrying this value.
    pub fn to_term(&self) -> Term {
        Term::Const(self.clone())
    }

    /// Order two values of the same numeric sort.
    pub fn compare(&self, other: &Value, context: &'static str) -> Result<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
            (Value::Real(a), Value::Real(b)) => Ok(a.cmp(b)),
            (Value::Bool(_), _) | (_, Value::Bool(_)) => Err(Error::NonNumericOperand {
                found: Sort::Bool,
                context,
            }),
            (a, b) => Err(Error::SortMismatch {
                expected: a.sort(),
                found: b.sort(),
                context: context.to_string(),
            }),
        }
    }

    pub fn add(&self, other: &Value) -> Result<Value> {
        self.arith(other, "addition", |a, b| a + b, |a, b| a + b)
    }

    pub fn sub(&self, other: &Value) -> Result<Value> {
        self.arith(other, "subtraction", |a, b| a - b, |a, b| a - b)
    }

    pub fn mul(&self, other: &Value) -> Result<Value> {
        self.arith(other, "multiplication", |a, b| a * b, |a, b| a * b)
    }

    pub fn neg(&self) -> Result<Value> {
        match self {
            Value::Int(a) => Ok(Value::Int(-a.clone())),
            Value::Real(a) => Ok(Value::Real(-a.clone())),
            Value::Bool(_) => Err(Error::NonNumericOperand {
                found: Sort::Bool,
                context: "negation",
            }),
        }
    }

    /// Exact division; defined over reals only.
    pub fn div(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Real(_), Value::Real(b)) if b.is_zero() => Err(Error::DivisionByZero),
            (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a / b)),
            (a, b) => {
                let found = if a.sort() == Sort::Real { b.sort() } else { a.sort() };
                Err(Error::SortMismatch {
                    expected: Sort::Real,
                    found,
                    context: "real division".to_string(),
                })
            }
        }
    }

    fn arith(
        &self,
        other: &Value,
        context: &'static str,
        int_op: impl Fn(&BigInt, &BigInt) -> BigInt,
        real_op: impl Fn(&BigRational, &BigRational) -> BigRational,
    ) -> Result<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(a, b))),
            (Value::Real(a), Value::Real(b)) => Ok(Value::Real(real_op(a, b))),
            (Value::Bool(_), _) | (_, Value::Bool(_)) => Err(Error::NonNumericOperand {
                found: Sort::Bool,
                context,
            }),
            (a, b) => Err(Error::SortMismatch {
                expected: a.sort(),
                found: b.sort(),
                context: context.to_string(),
            }),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(BigInt::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(BigInt::from(i))
    }
}

impl From<BigInt> for Value {
    fn from(i: BigInt) -> Self {
        Value::Int(i)
    }
}

impl From<BigRational> for Value {
    fn from(r: BigRational) -> Self {
        Value::Real(r)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(r) if r.is_integer() => write!(f, "{}", r.to_integer()),
            Value::Real(r) => write!(f, "{}/{}", r.numer(), r.denom()),
        }
    }
}
