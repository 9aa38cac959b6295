// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Cross-cutting wrappers for solver entry points
//!
//! Three independent facilities: a deprecation shim for renamed entry
//! points, the pending-pop stack guard for assumption frames, and a
//! result type checker. None of them depends on a backend.

use crate::errors::Result;
use log::warn;
use optsmt_core::{Term, TypeContext};

/// Wraps a callable kept under an old name for compatibility. Every call
/// logs a deprecation warning, then delegates unchanged.
#[derive(Debug)]
pub struct Deprecated<F> {
    name: &'static str,
    replacement: Option<&'static str>,
    inner: F,
}

impl<F> Deprecated<F> {
    pub fn new(name: &'static str, inner: F) -> Self {
        Deprecated {
            name,
            replacement: None,
            inner,
        }
    }

    pub fn with_replacement(name: &'static str, replacement: &'static str, inner: F) -> Self {
        Deprecated {
            name,
            replacement: Some(replacement),
            inner,
        }
    }

    /// The deprecated entry point's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The suggested replacement, when one was configured.
    pub fn replacement(&self) -> Option<&'static str> {
        self.replacement
    }

    /// Invoke the wrapped callable, warning first.
    pub fn call<A, R>(&mut self, args: A) -> R
    where
        F: FnMut(A) -> R,
    {
        match self.replacement {
            Some(replacement) => warn!(
                "{} is deprecated, use {} instead",
                self.name, replacement
            ),
            None => warn!("{} is deprecated", self.name),
        }
        (self.inner)(args)
    }
}

/// A session that may leave a temporary assumption frame on the stack
/// after a check, to be discarded before the next stack-sensitive
/// operation.
pub trait PendingPop {
    /// Whether a temporary frame is still on the stack.
    fn has_pending_pop(&self) -> bool;

    fn set_pending_pop(&mut self, pending: bool);

    /// Discard the top stack frame.
    fn discard_frame(&mut self) -> Result<()>;
}

/// Clears a pending temporary frame: resets the flag, then pops exactly
/// once. A no-op when the flag is not set, so stack-sensitive operations
/// can call it unconditionally.
pub fn clear_pending_pop<S: PendingPop + ?Sized>(session: &mut S) -> Result<()> {
    if session.has_pending_pop() {
        session.set_pending_pop(false);
        session.discard_frame()?;
    }
    Ok(())
}

/// Wraps a term-producing callable so every produced term is checked
/// against `ctx` before the wrapper returns.
///
/// Known quirk: the produced term is dropped and the wrapper yields
/// unit, so it is only usable where the call matters for its side
/// effects or for the check itself.
pub fn typecheck_result<'a, A, F>(
    ctx: &'a mut TypeContext,
    mut f: F,
) -> impl FnMut(A) -> Result<()> + 'a
where
    F: FnMut(A) -> Term + 'a,
{
    move |args| {
        let term = f(args);
        ctx.sort_of(&term)?;
        Ok(())
    }
}
