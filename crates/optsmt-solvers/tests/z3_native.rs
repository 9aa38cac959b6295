// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! The z3 backend against a live process. Every test that needs the
//! binary skips itself on machines without one; availability reporting
//! itself is tested unconditionally.

use optsmt_core::{Sort, Term, Value};
use optsmt_solvers::logics;
use optsmt_solvers::{
    z3_available, Goal, GoalKind, Optimizer, SoftClause, Solver, SolverError, SolverOptions,
    UnboundedCause, Z3IncrementalOptimizer, Z3NativeOptimizer, Z3Solver, Z3SuaOptimizer,
};

fn z3_or_skip() -> bool {
    if z3_available() {
        true
    } else {
        eprintln!("z3 not found on this machine, skipping");
        false
    }
}

fn int_var(name: &str) -> Term {
    Term::var(name, Sort::Int)
}

fn real_var(name: &str) -> Term {
    Term::var(name, Sort::Real)
}

#[test]
fn missing_binary_reports_backend_unavailable() {
    let mut options = SolverOptions::default();
    options.z3_exe = "/nonexistent/z3-binary-for-tests".to_string();
    let error = Z3Solver::with_options(None, options).unwrap_err();
    assert!(matches!(
        error,
        SolverError::BackendUnavailable { backend: "z3", .. }
    ));
}

#[test]
fn sua_and_incremental_share_the_plain_solver_logics() {
    assert_eq!(Z3SuaOptimizer::LOGICS, Z3Solver::LOGICS);
    assert_eq!(Z3IncrementalOptimizer::LOGICS, Z3Solver::LOGICS);
}

#[test]
fn assumption_frames_last_until_the_next_operation() {
    if !z3_or_skip() {
        return;
    }
    let mut solver = Z3Solver::new(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    solver.add_assertion(&x.clone().ge(Term::int(0))).unwrap();
    assert!(solver.solve(&[x.clone().ge(Term::int(7))]).unwrap());
    let seen = solver.get_value(&x).unwrap();
    assert!(seen >= Value::from(7));

    // asserting pops the assumption frame first
    solver.add_assertion(&x.clone().le(Term::int(5))).unwrap();
    assert!(solver.solve(&[]).unwrap());
    let now = solver.get_value(&x).unwrap();
    assert!(now <= Value::from(5));

    // popping clears a pending assumption frame before the real pop
    solver.push().unwrap();
    assert!(solver.solve(&[x.clone().equals(Term::int(4))]).unwrap());
    solver.pop().unwrap();
    assert!(solver.solve(&[]).unwrap());
}

#[test]
fn failed_assumption_asserts_do_not_strand_the_frame() {
    if !z3_or_skip() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.smt2");
    let mut options = SolverOptions::default();
    options.dump_smtlib = Some(path.clone());
    let mut solver = Z3Solver::with_options(Some(logics::QF_LIA), options).unwrap();
    let x = int_var("x");
    solver.add_assertion(&x.clone().le(Term::int(5))).unwrap();
    // the second assumption is ill-sorted, so the check fails after a
    // frame holding the first assumption is already on the stack
    assert!(solver
        .solve(&[x.clone().ge(Term::int(7)), Term::int(3)])
        .is_err());
    // the partial frame must be discarded before the next check runs
    assert!(solver.solve(&[]).unwrap());
    assert!(solver.get_value(&x).unwrap() <= Value::from(5));
    let transcript = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        transcript.matches("(push 1)").count(),
        transcript.matches("(pop 1)").count()
    );
}

#[test]
fn model_queries_need_a_satisfiable_check_first() {
    if !z3_or_skip() {
        return;
    }
    let mut solver = Z3Solver::new(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    solver.add_assertion(&x.clone().ge(Term::int(0))).unwrap();
    assert!(matches!(
        solver.get_model().unwrap_err(),
        SolverError::NoModel
    ));
    assert!(matches!(
        solver.get_value(&x).unwrap_err(),
        SolverError::NoModel
    ));
}

#[test]
fn validated_models_evaluate_the_assertions() {
    if !z3_or_skip() {
        return;
    }
    let mut options = SolverOptions::default();
    options.validate_models = true;
    let mut solver = Z3Solver::with_options(Some(logics::QF_LIA), options).unwrap();
    let x = int_var("x");
    let y = int_var("y");
    solver
        .add_assertion(&x.clone().plus(y.clone()).equals(Term::int(9)))
        .unwrap();
    solver.add_assertion(&x.clone().ge(Term::int(4))).unwrap();
    assert!(solver.solve(&[]).unwrap());
    let model = solver.get_model().unwrap();
    assert_eq!(model.eval(&x.clone().plus(y)).unwrap(), Value::from(9));
    assert_eq!(
        model.eval(&x.ge(Term::int(4))).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn unsatisfiable_optimization_returns_none() {
    if !z3_or_skip() {
        return;
    }
    let mut optimizer = Z3NativeOptimizer::new(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    optimizer.add_assertion(&x.clone().lt(Term::int(0))).unwrap();
    optimizer.add_assertion(&x.clone().gt(Term::int(0))).unwrap();
    assert!(optimizer.optimize(&Goal::Minimize(x)).unwrap().is_none());
}

#[test]
fn native_minimization_reads_the_model_optimum() {
    if !z3_or_skip() {
        return;
    }
    let mut optimizer = Z3NativeOptimizer::new(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    let y = int_var("y");
    optimizer
        .add_assertion(&x.clone().plus(y.clone()).le(Term::int(10)))
        .unwrap();
    optimizer.add_assertion(&x.clone().ge(Term::int(2))).unwrap();
    optimizer.add_assertion(&y.clone().ge(Term::int(0))).unwrap();
    let objective = y.minus(x);
    let (model, value) = optimizer
        .optimize(&Goal::Minimize(objective.clone()))
        .unwrap()
        .unwrap();
    assert_eq!(value, Value::from(-10));
    assert_eq!(model.eval(&objective).unwrap(), value);
}

#[test]
fn unbounded_maximization_is_an_error() {
    if !z3_or_skip() {
        return;
    }
    let mut optimizer = Z3NativeOptimizer::new(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    optimizer.add_assertion(&x.clone().ge(Term::int(0))).unwrap();
    let error = optimizer.optimize(&Goal::Maximize(x)).unwrap_err();
    assert!(matches!(
        error,
        SolverError::Unbounded(UnboundedCause::Infinite)
    ));
}

#[test]
fn open_strict_bounds_are_infinitesimal() {
    if !z3_or_skip() {
        return;
    }
    let mut optimizer = Z3NativeOptimizer::new(Some(logics::QF_LRA)).unwrap();
    let x = real_var("x");
    optimizer
        .add_assertion(&x.clone().gt(Term::rational(2, 1)))
        .unwrap();
    let error = optimizer.optimize(&Goal::Minimize(x)).unwrap_err();
    assert!(matches!(
        error,
        SolverError::Unbounded(UnboundedCause::Infinitesimal)
    ));
}

#[test]
fn native_engine_rejects_maxsmt_goals() {
    if !z3_or_skip() {
        return;
    }
    let mut optimizer = Z3NativeOptimizer::new(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    optimizer.add_assertion(&x.clone().ge(Term::int(0))).unwrap();
    let goal = Goal::MaxSmt(vec![SoftClause::new(x.clone().equals(Term::int(1)), 1)]);
    assert!(matches!(
        optimizer.optimize(&goal).unwrap_err(),
        SolverError::UnsupportedGoal {
            backend: "z3",
            kind: GoalKind::MaxSmt
        }
    ));
    assert!(matches!(
        optimizer.pareto_optimize(&[Goal::Minimize(x.clone()), goal.clone()]),
        Err(SolverError::UnsupportedGoal {
            backend: "z3",
            kind: GoalKind::MaxSmt
        })
    ));
    // nothing was sent, so the session stays usable
    assert!(optimizer.solve(&[]).unwrap());
}

#[test]
fn native_pareto_enumerates_the_front() {
    if !z3_or_skip() {
        return;
    }
    let mut optimizer = Z3NativeOptimizer::new(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    let y = int_var("y");
    for bound in [
        x.clone().ge(Term::int(0)),
        x.clone().le(Term::int(4)),
        y.clone().ge(Term::int(0)),
        y.clone().le(Term::int(4)),
        x.clone().plus(y.clone()).ge(Term::int(4)),
    ] {
        optimizer.add_assertion(&bound).unwrap();
    }
    let goals = [Goal::Minimize(x), Goal::Minimize(y)];
    let mut points = Vec::new();
    for point in optimizer.pareto_optimize(&goals).unwrap() {
        let (_, values) = point.unwrap();
        points.push(values);
    }
    points.sort();
    let expected: Vec<Vec<Value>> = (0..=4)
        .map(|v| vec![Value::from(v), Value::from(4 - v)])
        .collect();
    assert_eq!(points, expected);
}

#[test]
fn native_lexicographic_optimizes_in_priority_order() {
    if !z3_or_skip() {
        return;
    }
    let mut optimizer = Z3NativeOptimizer::new(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    let y = int_var("y");
    for bound in [
        x.clone().ge(Term::int(0)),
        x.clone().le(Term::int(5)),
        y.clone().ge(Term::int(0)),
        y.clone().le(Term::int(5)),
        x.clone().plus(y.clone()).le(Term::int(6)),
    ] {
        optimizer.add_assertion(&bound).unwrap();
    }
    let (model, values) = optimizer
        .lexicographic_optimize(&[Goal::Maximize(x.clone()), Goal::Maximize(y)])
        .unwrap()
        .unwrap();
    assert_eq!(values, vec![Value::from(5), Value::from(1)]);
    assert_eq!(model.eval(&x).unwrap(), Value::from(5));
}

#[test]
fn native_boxed_runs_goals_on_fresh_sessions() {
    if !z3_or_skip() {
        return;
    }
    let mut optimizer = Z3NativeOptimizer::new(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    optimizer.add_assertion(&x.clone().ge(Term::int(1))).unwrap();
    optimizer.add_assertion(&x.clone().le(Term::int(5))).unwrap();
    let results = optimizer
        .boxed_optimize(&[Goal::Minimize(x.clone()), Goal::Maximize(x.clone())])
        .unwrap();
    let values: Vec<_> = results.into_iter().map(|r| r.map(|(_, v)| v)).collect();
    assert_eq!(values, vec![Some(Value::from(1)), Some(Value::from(5))]);
    // the parent session carries no objectives of its own
    assert!(optimizer.solve(&[x.clone().equals(Term::int(3))]).unwrap());
    assert_eq!(optimizer.get_value(&x).unwrap(), Value::from(3));
}

#[test]
fn dump_smtlib_writes_the_transcript() {
    if !z3_or_skip() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.smt2");
    let mut options = SolverOptions::default();
    options.dump_smtlib = Some(path.clone());
    let mut optimizer = Z3NativeOptimizer::with_options(Some(logics::QF_LIA), options).unwrap();
    let x = int_var("x");
    optimizer.add_assertion(&x.clone().ge(Term::int(3))).unwrap();
    let (_, value) = optimizer.optimize(&Goal::Minimize(x)).unwrap().unwrap();
    assert_eq!(value, Value::from(3));
    let transcript = std::fs::read_to_string(&path).unwrap();
    assert!(transcript.contains("(set-logic QF_LIA)"));
    assert!(transcript.contains("(minimize x)"));
    assert!(transcript.contains("(check-sat)"));
}

#[test]
fn divergence_flags_differ_between_engines() {
    if !z3_or_skip() {
        return;
    }
    let native = Z3NativeOptimizer::new(None).unwrap();
    let sua = Z3SuaOptimizer::open(None).unwrap();
    assert!(!native.can_diverge_for_unbounded_cases());
    assert!(sua.can_diverge_for_unbounded_cases());
}

#[test]
fn sua_over_z3_minimizes_without_native_objectives() {
    if !z3_or_skip() {
        return;
    }
    let mut optimizer = Z3SuaOptimizer::open(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    optimizer.add_assertion(&x.clone().ge(Term::int(2))).unwrap();
    optimizer.add_assertion(&x.clone().le(Term::int(9))).unwrap();
    let (model, value) = optimizer
        .optimize(&Goal::Minimize(x.clone()))
        .unwrap()
        .unwrap();
    assert_eq!(value, Value::from(2));
    assert_eq!(model.eval(&x).unwrap(), value);
}

#[test]
fn incremental_over_z3_maximizes_without_native_objectives() {
    if !z3_or_skip() {
        return;
    }
    let mut optimizer = Z3IncrementalOptimizer::open(Some(logics::QF_LIA)).unwrap();
    let x = int_var("x");
    optimizer.add_assertion(&x.clone().ge(Term::int(0))).unwrap();
    optimizer.add_assertion(&x.clone().le(Term::int(7))).unwrap();
    let (model, value) = optimizer
        .optimize(&Goal::Maximize(x.clone()))
        .unwrap()
        .unwrap();
    assert_eq!(value, Value::from(7));
    assert_eq!(model.eval(&x).unwrap(), value);
}
