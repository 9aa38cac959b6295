// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! The generic linear-search and pareto engines, driven over a
//! brute-force grid solver.

mod common;

use common::{var, GridSolver};
use optsmt_core::{Term, Value};
use optsmt_solvers::{
    Goal, GoalKind, IncrementalOptimizer, Optimizer, SoftClause, Solver, SolverError, SuaOptimizer,
};

#[test]
fn sua_minimizes_over_the_grid() {
    let mut solver = GridSolver::new(&[("x", 0, 9)]);
    solver.add_assertion(&var("x").ge(Term::int(2))).unwrap();
    let mut optimizer = SuaOptimizer::new(solver);
    let (model, value) = optimizer
        .optimize(&Goal::Minimize(var("x")))
        .unwrap()
        .unwrap();
    assert_eq!(value, Value::from(2));
    assert_eq!(model.eval(&var("x")).unwrap(), value);
}

#[test]
fn incremental_maximizes_over_the_grid() {
    let mut optimizer = IncrementalOptimizer::new(GridSolver::new(&[("x", 0, 9)]));
    let (model, value) = optimizer
        .optimize(&Goal::Maximize(var("x")))
        .unwrap()
        .unwrap();
    assert_eq!(value, Value::from(9));
    assert_eq!(model.eval(&var("x")).unwrap(), value);
    assert_eq!(optimizer.solver().depth(), 0);
}

#[test]
fn unsatisfiable_constraints_optimize_to_none() {
    let mut solver = GridSolver::new(&[("x", 0, 5)]);
    solver.add_assertion(&var("x").gt(Term::int(7))).unwrap();
    let mut optimizer = SuaOptimizer::new(solver);
    assert!(optimizer
        .optimize(&Goal::Minimize(var("x")))
        .unwrap()
        .is_none());
}

#[test]
fn min_max_minimizes_the_pointwise_maximum() {
    let mut solver = GridSolver::new(&[("x", 0, 5), ("y", 0, 5)]);
    solver.add_assertion(&var("x").ge(Term::int(3))).unwrap();
    let mut optimizer = SuaOptimizer::new(solver);
    let goal = Goal::MinMax(vec![var("x"), var("y")]);
    let (model, value) = optimizer.optimize(&goal).unwrap().unwrap();
    assert_eq!(value, Value::from(3));
    assert_eq!(model.eval(&var("x")).unwrap(), Value::from(3));
}

#[test]
fn max_min_maximizes_the_pointwise_minimum() {
    let mut solver = GridSolver::new(&[("x", 0, 5), ("y", 0, 5)]);
    solver.add_assertion(&var("y").le(Term::int(4))).unwrap();
    let mut optimizer = IncrementalOptimizer::new(solver);
    let goal = Goal::MaxMin(vec![var("x"), var("y")]);
    let (_, value) = optimizer.optimize(&goal).unwrap().unwrap();
    assert_eq!(value, Value::from(4));
}

#[test]
fn maxsmt_lowers_to_weighted_penalties() {
    let mut solver = GridSolver::new(&[("x", 0, 5)]);
    solver.add_assertion(&var("x").ge(Term::int(1))).unwrap();
    let goal = Goal::MaxSmt(vec![
        SoftClause::new(var("x").equals(Term::int(0)), 3),
        SoftClause::new(var("x").le(Term::int(4)), 2),
    ]);
    let mut optimizer = SuaOptimizer::new(solver);
    let (model, value) = optimizer.optimize(&goal).unwrap().unwrap();
    // x >= 1 forces the first clause to break, so penalty 3 is the floor
    assert_eq!(value, Value::from(3));
    assert_eq!(
        model.eval(&var("x").le(Term::int(4))).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn lexicographic_orders_goals_by_priority() {
    let mut solver = GridSolver::new(&[("x", 0, 5), ("y", 0, 5)]);
    solver
        .add_assertion(&var("x").plus(var("y")).le(Term::int(6)))
        .unwrap();
    let mut optimizer = SuaOptimizer::new(solver);
    let goals = [Goal::Maximize(var("x")), Goal::Maximize(var("y"))];
    let (model, values) = optimizer.lexicographic_optimize(&goals).unwrap().unwrap();
    assert_eq!(values, vec![Value::from(5), Value::from(1)]);
    assert_eq!(model.eval(&var("y")).unwrap(), Value::from(1));
    assert_eq!(optimizer.solver().depth(), 0);
}

#[test]
fn lexicographic_with_no_goals_is_none() {
    let mut optimizer = IncrementalOptimizer::new(GridSolver::new(&[("x", 0, 1)]));
    assert!(optimizer.lexicographic_optimize(&[]).unwrap().is_none());
    assert_eq!(optimizer.solver().depth(), 0);
}

#[test]
fn boxed_optimizes_each_goal_independently() {
    let mut optimizer = IncrementalOptimizer::new(GridSolver::new(&[("x", 1, 5)]));
    let goals = [Goal::Minimize(var("x")), Goal::Maximize(var("x"))];
    let results = optimizer.boxed_optimize(&goals).unwrap();
    let values: Vec<_> = results
        .iter()
        .map(|r| r.as_ref().map(|(_, v)| v.clone()))
        .collect();
    assert_eq!(values, vec![Some(Value::from(1)), Some(Value::from(5))]);
}

#[test]
fn pareto_enumerates_the_whole_front() {
    let mut solver = GridSolver::new(&[("x", 0, 4), ("y", 0, 4)]);
    solver
        .add_assertion(&var("x").plus(var("y")).ge(Term::int(4)))
        .unwrap();
    let mut optimizer = SuaOptimizer::new(solver);
    let goals = [Goal::Minimize(var("x")), Goal::Minimize(var("y"))];
    let mut points = Vec::new();
    for point in optimizer.pareto_optimize(&goals).unwrap() {
        let (model, values) = point.unwrap();
        assert_eq!(model.eval(&var("x")).unwrap(), values[0]);
        points.push(values);
    }
    let expected: Vec<Vec<Value>> = (0..=4)
        .map(|x| vec![Value::from(x), Value::from(4 - x)])
        .collect();
    assert_eq!(points, expected);
    assert_eq!(optimizer.solver().depth(), 0);
}

#[test]
fn pareto_with_no_goals_is_empty() {
    let mut optimizer = SuaOptimizer::new(GridSolver::new(&[("x", 0, 1)]));
    assert_eq!(optimizer.pareto_optimize(&[]).unwrap().count(), 0);
    assert_eq!(optimizer.solver().depth(), 0);
}

#[test]
fn dropping_a_pareto_iterator_restores_the_stack() {
    let mut solver = GridSolver::new(&[("x", 0, 4), ("y", 0, 4)]);
    solver
        .add_assertion(&var("x").plus(var("y")).ge(Term::int(4)))
        .unwrap();
    let mut optimizer = IncrementalOptimizer::new(solver);
    let goals = [Goal::Minimize(var("x")), Goal::Minimize(var("y"))];
    {
        let mut front = optimizer.pareto_optimize(&goals).unwrap();
        let (_, values) = front.next().unwrap().unwrap();
        assert_eq!(values, vec![Value::from(0), Value::from(4)]);
    }
    assert_eq!(optimizer.solver().depth(), 0);
    assert!(optimizer.solve(&[]).unwrap());
}

#[test]
fn min_max_without_members_is_unsupported() {
    let mut optimizer = SuaOptimizer::new(GridSolver::new(&[("x", 0, 3)]));
    let error = optimizer.optimize(&Goal::MinMax(Vec::new())).unwrap_err();
    assert!(matches!(
        error,
        SolverError::UnsupportedGoal {
            backend: "grid",
            kind: GoalKind::MinMax
        }
    ));
}

#[test]
fn linear_search_engines_advertise_divergence() {
    let sua = SuaOptimizer::new(GridSolver::new(&[("x", 0, 1)]));
    let incremental = IncrementalOptimizer::new(GridSolver::new(&[("x", 0, 1)]));
    assert!(sua.can_diverge_for_unbounded_cases());
    assert!(incremental.can_diverge_for_unbounded_cases());
}
