// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! The z3 backend
//!
//! Sessions drive a `z3 -in -smt2` process over pipes with
//! `print-success` framing. The plain [`Z3Solver`] exposes incremental
//! solving only; [`Z3NativeOptimizer`] adds z3's own objective engine,
//! and [`Z3SuaOptimizer`]/[`Z3IncrementalOptimizer`] run the generic
//! linear searches over the plain solver instead.

mod optimize;
mod process;
mod session;
mod sexp;
mod smtlib;

pub use optimize::Z3NativeOptimizer;

use crate::engine::{IncrementalOptimizer, SuaOptimizer};
use crate::errors::{Result, SolverError};
use crate::logics::{self, Logic};
use crate::options::{read_env_var, SolverOptions};
use crate::solver::Solver;
use log::debug;
use once_cell::sync::Lazy;
use optsmt_core::{Model, Term, Value};
use regex::Regex;
use session::SmtSession;
use std::path::{Path, PathBuf};
use std::process::Command;

pub(crate) const Z3_LOGICS: &[Logic] = &[
    logics::QF_LIA,
    logics::QF_LRA,
    logics::QF_LIRA,
    logics::QF_NIA,
    logics::QF_NRA,
    logics::LIA,
    logics::LRA,
];

#[derive(Debug, Clone)]
struct Z3Binary {
    path: PathBuf,
    version: String,
}

fn default_z3_path() -> PathBuf {
    let configured = read_env_var("Z3_EXE");
    if configured.is_empty() {
        PathBuf::from("z3")
    } else {
        PathBuf::from(configured)
    }
}

static Z3_PROBE: Lazy<std::result::Result<Z3Binary, String>> =
    Lazy::new(|| probe_z3(&default_z3_path()));

/// Run `--version` on a candidate binary.
fn probe_z3(path: &Path) -> std::result::Result<Z3Binary, String> {
    static VERSION: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"version (\d+\.\d+(\.\d+)?)").unwrap());
    let output = Command::new(path)
        .arg("--version")
        .output()
        .map_err(|e| format!("cannot run `{} --version`: {}", path.display(), e))?;
    if !output.status.success() {
        return Err(format!(
            "`{} --version` exited with {}",
            path.display(),
            output.status
        ));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = VERSION
        .captures(&stdout)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| stdout.trim().to_string());
    debug!("found z3 {} at {}", version, path.display());
    Ok(Z3Binary {
        path: path.to_path_buf(),
        version,
    })
}

/// Resolve the binary a session should spawn. An explicit `z3_exe` in
/// the options bypasses the cached probe of the ambient binary.
fn locate_z3(options: &SolverOptions) -> Result<PathBuf> {
    if !options.z3_exe.is_empty() {
        let probed = probe_z3(Path::new(&options.z3_exe))
            .map_err(|reason| SolverError::BackendUnavailable {
                backend: "z3",
                reason,
            })?;
        return Ok(probed.path);
    }
    match &*Z3_PROBE {
        Ok(binary) => Ok(binary.path.clone()),
        Err(reason) => Err(SolverError::BackendUnavailable {
            backend: "z3",
            reason: reason.clone(),
        }),
    }
}

/// Version of the ambient z3 binary, when one is available.
pub fn z3_version() -> Option<&'static str> {
    Z3_PROBE.as_ref().ok().map(|binary| binary.version.as_str())
}

/// Whether the ambient z3 binary can be executed. Tests gate on this
/// instead of failing on machines without a solver.
pub fn z3_available() -> bool {
    Z3_PROBE.is_ok()
}

/// Plain incremental z3 solver without native objectives.
#[derive(Debug)]
pub struct Z3Solver {
    session: SmtSession,
}

impl Z3Solver {
    pub const LOGICS: &'static [Logic] = Z3_LOGICS;

    pub fn new(logic: Option<Logic>) -> Result<Z3Solver> {
        Z3Solver::with_options(logic, SolverOptions::default())
    }

    pub fn with_options(logic: Option<Logic>, options: SolverOptions) -> Result<Z3Solver> {
        Ok(Z3Solver {
            session: SmtSession::open(logic, options)?,
        })
    }
}

impl Solver for Z3Solver {
    fn backend_name(&self) -> &'static str {
        "z3"
    }

    fn logics(&self) -> &'static [Logic] {
        Z3Solver::LOGICS
    }

    fn add_assertion(&mut self, formula: &Term) -> Result<()> {
        self.session.add_assertion(formula)
    }

    fn push(&mut self) -> Result<()> {
        self.session.push()
    }

    fn pop(&mut self) -> Result<()> {
        self.session.pop()
    }

    fn solve(&mut self, assumptions: &[Term]) -> Result<bool> {
        self.session.solve(assumptions)
    }

    fn get_model(&mut self) -> Result<Model> {
        self.session.get_model()
    }

    fn get_value(&mut self, term: &Term) -> Result<Value> {
        self.session.get_value(term)
    }
}

/// Linear-search optimizer over the plain z3 solver.
pub type Z3SuaOptimizer = SuaOptimizer<Z3Solver>;

/// Incremental linear-search optimizer over the plain z3 solver.
pub type Z3IncrementalOptimizer = IncrementalOptimizer<Z3Solver>;

impl SuaOptimizer<Z3Solver> {
    pub const LOGICS: &'static [Logic] = Z3Solver::LOGICS;

    pub fn open(logic: Option<Logic>) -> Result<Z3SuaOptimizer> {
        SuaOptimizer::open_with_options(logic, SolverOptions::default())
    }

    pub fn open_with_options(
        logic: Option<Logic>,
        options: SolverOptions,
    ) -> Result<Z3SuaOptimizer> {
        Ok(SuaOptimizer::new(Z3Solver::with_options(logic, options)?))
    }
}

impl IncrementalOptimizer<Z3Solver> {
    pub const LOGICS: &'static [Logic] = Z3Solver::LOGICS;

    pub fn open(logic: Option<Logic>) -> Result<Z3IncrementalOptimizer> {
        IncrementalOptimizer::open_with_options(logic, SolverOptions::default())
    }

    pub fn open_with_options(
        logic: Option<Logic>,
        options: SolverOptions,
    ) -> Result<Z3IncrementalOptimizer> {
        Ok(IncrementalOptimizer::new(Z3Solver::with_options(
            logic, options,
        )?))
    }
}
