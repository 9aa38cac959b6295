// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Minimal S-expression reader for solver replies

use crate::errors::{Result, SolverError};
use itertools::Itertools;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

impl Sexp {
    pub fn atom(&self) -> Option<&str> {
        match self {
            Sexp::Atom(s) => Some(s.as_str()),
            Sexp::List(_) => None,
        }
    }

    pub fn list(&self) -> Option<&[Sexp]> {
        match self {
            Sexp::Atom(_) => None,
            Sexp::List(items) => Some(items.as_slice()),
        }
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sexp::Atom(s) => write!(f, "{}", s),
            Sexp::List(items) => write!(f, "({})", items.iter().format(" ")),
        }
    }
}

/// Parse one complete S-expression. String literals keep their quotes so
/// the source text survives a display round trip.
pub fn parse(input: &str) -> Result<Sexp> {
    let mut chars = input.chars().peekable();
    let sexp = parse_one(&mut chars, input)?;
    skip_whitespace(&mut chars);
    if chars.peek().is_some() {
        return Err(SolverError::Protocol(format!(
            "trailing input after s-expression: `{}`",
            input
        )));
    }
    Ok(sexp)
}

fn skip_whitespace(chars: &mut Peekable<Chars>) {
    while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
        chars.next();
    }
}

fn parse_one(chars: &mut Peekable<Chars>, input: &str) -> Result<Sexp> {
    skip_whitespace(chars);
    match chars.peek() {
        None => Err(SolverError::Protocol(format!(
            "truncated s-expression: `{}`",
            input
        ))),
        Some('(') => {
            chars.next();
            let mut items = Vec::new();
            loop {
                skip_whitespace(chars);
                match chars.peek() {
                    None => {
                        return Err(SolverError::Protocol(format!(
                            "unterminated list in s-expression: `{}`",
                            input
                        )))
                    }
                    Some(')') => {
                        chars.next();
                        return Ok(Sexp::List(items));
                    }
                    Some(_) => items.push(parse_one(chars, input)?),
                }
            }
        }
        Some(')') => Err(SolverError::Protocol(format!(
            "unbalanced `)` in s-expression: `{}`",
            input
        ))),
        Some('"') => parse_string(chars, input),
        Some(_) => Ok(parse_atom(chars)),
    }
}

fn parse_string(chars: &mut Peekable<Chars>, input: &str) -> Result<Sexp> {
    let mut text = String::new();
    text.push(chars.next().unwrap_or('"'));
    loop {
        match chars.next() {
            None => {
                return Err(SolverError::Protocol(format!(
                    "unterminated string in s-expression: `{}`",
                    input
                )))
            }
            Some('"') => {
                text.push('"');
                // `""` escapes a quote inside SMT-LIB strings
                if chars.peek() == Some(&'"') {
                    text.push('"');
                    chars.next();
                } else {
                    return Ok(Sexp::Atom(text));
                }
            }
            Some(c) => text.push(c),
        }
    }
}

fn parse_atom(chars: &mut Peekable<Chars>) -> Sexp {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
            break;
        }
        text.push(c);
        chars.next();
    }
    Sexp::Atom(text)
}
