// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! A live SMT-LIB session against a z3 process

use crate::errors::{Result, SolverError};
use crate::logics::Logic;
use crate::options::SolverOptions;
use crate::solver::SatAnswer;
use crate::wrappers::{clear_pending_pop, PendingPop};
use crate::z3::locate_z3;
use crate::z3::process::SmtProcess;
use crate::z3::sexp::{self, Sexp};
use crate::z3::smtlib::{self, SmtLibConverter};
use itertools::Itertools;
use log::warn;
use optsmt_core::{Error as CoreError, Model, Sort, Term, TypeContext, Value};

/// One conversation with a solver process.
///
/// The session mirrors the assertion stack, the declared constants and a
/// typing context on this side of the pipe, so every term is typechecked
/// before anything is sent. Assumption checks keep their temporary frame
/// on the stack until the next stack-sensitive operation, which lets
/// model queries observe the assumptions that produced the model.
#[derive(Debug)]
pub struct SmtSession {
    process: SmtProcess,
    converter: SmtLibConverter,
    types: TypeContext,
    options: SolverOptions,
    logic: Option<Logic>,
    pending_pop: bool,
    asserted: Vec<Term>,
    frames: Vec<usize>,
    last_sat: Option<bool>,
}

impl SmtSession {
    /// Start a process and apply the session options. The `print-success`
    /// framing is switched on first so every later command is acked.
    pub fn open(logic: Option<Logic>, options: SolverOptions) -> Result<SmtSession> {
        let program = locate_z3(&options)?;
        let process = SmtProcess::spawn(
            &program,
            &["-in", "-smt2"],
            options.dump_smtlib.as_deref(),
        )?;
        let mut session = SmtSession {
            process,
            converter: SmtLibConverter::new(),
            types: TypeContext::new(),
            options,
            logic,
            pending_pop: false,
            asserted: Vec::new(),
            frames: Vec::new(),
            last_sat: None,
        };
        session.configure()?;
        Ok(session)
    }

    fn configure(&mut self) -> Result<()> {
        self.process
            .expect_success("(set-option :print-success true)")?;
        if self.options.generate_models {
            self.process
                .expect_success("(set-option :produce-models true)")?;
        }
        if let Some(timeout) = self.options.timeout_ms {
            self.process
                .expect_success(&format!("(set-option :timeout {})", timeout))?;
        }
        if let Some(seed) = self.options.random_seed {
            self.process
                .expect_success(&format!("(set-option :smt.random_seed {})", seed))?;
        }
        for (key, value) in &self.options.extra_options {
            self.process
                .expect_success(&format!("(set-option :{} {})", key, value))?;
        }
        if let Some(logic) = self.logic {
            self.process
                .expect_success(&format!("(set-logic {})", logic))?;
        }
        Ok(())
    }

    /// Typecheck `formula`, emit any missing declarations and assert it.
    pub fn add_assertion(&mut self, formula: &Term) -> Result<()> {
        clear_pending_pop(self)?;
        self.assert_raw(formula)
    }

    fn assert_raw(&mut self, formula: &Term) -> Result<()> {
        let sort = self.prepare_term(formula)?;
        if sort != Sort::Bool {
            return Err(CoreError::SortMismatch {
                expected: Sort::Bool,
                found: sort,
                context: "assertion".to_string(),
            }
            .into());
        }
        self.process
            .expect_success(&format!("(assert {})", smtlib::render_term(formula)))?;
        self.asserted.push(formula.clone());
        Ok(())
    }

    /// Typecheck `term` against the session context and declare its
    /// variables to the process. Returns the term's sort.
    pub fn prepare_term(&mut self, term: &Term) -> Result<Sort> {
        let sort = self.types.sort_of(term)?;
        for command in self.converter.declarations_for(term) {
            self.process.expect_success(&command)?;
        }
        Ok(sort)
    }

    pub fn push(&mut self) -> Result<()> {
        clear_pending_pop(self)?;
        self.push_raw()
    }

    fn push_raw(&mut self) -> Result<()> {
        self.process.expect_success("(push 1)")?;
        self.frames.push(self.asserted.len());
        Ok(())
    }

    pub fn pop(&mut self) -> Result<()> {
        clear_pending_pop(self)?;
        self.pop_raw()
    }

    fn pop_raw(&mut self) -> Result<()> {
        let mark = self
            .frames
            .pop()
            .ok_or_else(|| SolverError::Backend("pop without a matching push".to_string()))?;
        self.process.expect_success("(pop 1)")?;
        self.asserted.truncate(mark);
        Ok(())
    }

    /// Run one satisfiability check.
    pub fn check_sat(&mut self) -> Result<SatAnswer> {
        let reply = self.process.command("(check-sat)")?;
        let answer = match reply.as_str() {
            "sat" => SatAnswer::Sat,
            "unsat" => SatAnswer::Unsat,
            "unknown" => SatAnswer::Unknown,
            other => {
                return Err(SolverError::Protocol(format!(
                    "unexpected check-sat answer `{}`",
                    other
                )))
            }
        };
        self.last_sat = Some(answer == SatAnswer::Sat);
        Ok(answer)
    }

    /// Check satisfiability under temporary `assumptions`.
    ///
    /// Assumptions are asserted in a frame that stays on the stack until
    /// the next stack-sensitive operation, so model queries after a
    /// satisfiable answer still see them. `unknown` is an error here.
    pub fn solve(&mut self, assumptions: &[Term]) -> Result<bool> {
        clear_pending_pop(self)?;
        if !assumptions.is_empty() {
            self.push_raw()?;
            // the frame is on the stack from here on; a failed assert must
            // still leave it flagged for the next stack-sensitive operation
            self.pending_pop = true;
            for assumption in assumptions {
                self.assert_raw(assumption)?;
            }
        }
        match self.check_sat()? {
            SatAnswer::Sat => Ok(true),
            SatAnswer::Unsat => Ok(false),
            SatAnswer::Unknown => Err(SolverError::UnknownResult),
        }
    }

    fn ensure_model_available(&self) -> Result<()> {
        if self.options.generate_models && self.last_sat == Some(true) {
            Ok(())
        } else {
            Err(SolverError::NoModel)
        }
    }

    /// Snapshot the current model as values for every declared constant.
    pub fn get_model(&mut self) -> Result<Model> {
        self.ensure_model_available()?;
        let declared: Vec<(String, Sort)> = self
            .converter
            .declared()
            .iter()
            .map(|(name, sort)| (name.clone(), *sort))
            .collect();
        if declared.is_empty() {
            return Ok(Model::default());
        }
        let query = format!(
            "(get-value ({}))",
            declared.iter().map(|(name, _)| name.as_str()).join(" ")
        );
        let reply = self.process.command(&query)?;
        let parsed = sexp::parse(&reply)?;
        let entries = parsed.list().unwrap_or_default();
        if entries.len() != declared.len() {
            return Err(SolverError::Protocol(format!(
                "malformed get-value reply `{}`",
                reply
            )));
        }
        let mut assignments = Vec::with_capacity(declared.len());
        for ((name, sort), entry) in declared.iter().zip(entries) {
            let value_sexp = entry
                .list()
                .and_then(|pair| pair.last())
                .ok_or_else(|| {
                    SolverError::Protocol(format!("malformed get-value reply `{}`", reply))
                })?;
            let value = smtlib::parse_value(value_sexp, *sort)?;
            assignments.push((Term::var(name, *sort), value));
        }
        let model = Model::new(assignments);
        if self.options.validate_models {
            self.validate(&model);
        }
        Ok(model)
    }

    fn validate(&self, model: &Model) {
        for formula in &self.asserted {
            match model.eval(formula) {
                Ok(Value::Bool(true)) => {}
                Ok(value) => warn!("model validation failed for {}: evaluates to {}", formula, value),
                Err(e) => warn!("model validation could not evaluate {}: {}", formula, e),
            }
        }
    }

    /// Model value of an arbitrary term.
    pub fn get_value(&mut self, term: &Term) -> Result<Value> {
        self.ensure_model_available()?;
        let sort = self.prepare_term(term)?;
        let reply = self
            .process
            .command(&format!("(get-value ({}))", smtlib::render_term(term)))?;
        let parsed = sexp::parse(&reply)?;
        let value_sexp = parsed
            .list()
            .and_then(|entries| entries.first())
            .and_then(Sexp::list)
            .and_then(|pair| pair.last())
            .ok_or_else(|| {
                SolverError::Protocol(format!("malformed get-value reply `{}`", reply))
            })?;
        smtlib::parse_value(value_sexp, sort)
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn logic(&self) -> Option<Logic> {
        self.logic
    }

    pub fn asserted(&self) -> &[Term] {
        &self.asserted
    }

    /// Send a raw command, surfacing `(error ...)` replies.
    pub fn command(&mut self, command: &str) -> Result<String> {
        self.process.command(command)
    }

    /// Send a raw command that must be acked with `success`.
    pub fn expect_success(&mut self, command: &str) -> Result<()> {
        self.process.expect_success(command)
    }
}

impl PendingPop for SmtSession {
    fn has_pending_pop(&self) -> bool {
        self.pending_pop
    }

    fn set_pending_pop(&mut self, pending: bool) {
        self.pending_pop = pending;
    }

    fn discard_frame(&mut self) -> Result<()> {
        self.pop_raw()
    }
}
