//! End-to-end saturation scenarios

use stratus::{
    Color, Derivation, InLiteral, InTerm, Problem, Saturation, Schedule, Strategy,
    StrategyOptions, TerminationReason, Unit,
};

fn run(units: Vec<Unit>) -> (stratus::Outcome, Saturation) {
    let mut saturation = Saturation::new(StrategyOptions::default());
    saturation.add_input(&units).unwrap();
    let outcome = saturation.run();
    (outcome, saturation)
}

#[test]
fn test_propositional_refutation_in_one_step() {
    // { p(a), ~p(a) } refutes in a single resolution
    let a = InTerm::constant("a");
    let (outcome, saturation) = run(vec![
        Unit::axiom("p_a", vec![InLiteral::positive("p", vec![a.clone()])]),
        Unit::negated_conjecture("not_p_a", vec![InLiteral::negative("p", vec![a])]),
    ]);

    assert_eq!(outcome.reason, TerminationReason::Refutation);
    assert_eq!(saturation.ctx.statistics.resolutions, 1);

    let derivation = Derivation::from_clause(outcome.refutation.as_ref().unwrap());
    assert_eq!(derivation.length(), 1);
    assert_eq!(derivation.steps().len(), 3);
}

#[test]
fn test_demodulation_chain_refutation() {
    // { f(X) = X, ~p(f(f(a))), p(a) }: demodulation collapses the nested
    // redexes and one resolution closes the proof.
    let x = InTerm::var(0);
    let a = InTerm::constant("a");
    let fx = InTerm::app("f", vec![x.clone()]);
    let fa = InTerm::app("f", vec![a.clone()]);
    let ffa = InTerm::app("f", vec![fa]);

    let (outcome, saturation) = run(vec![
        Unit::axiom("collapse", vec![InLiteral::equality(fx, x)]),
        Unit::negated_conjecture("goal", vec![InLiteral::negative("p", vec![ffa])]),
        Unit::axiom("p_a", vec![InLiteral::positive("p", vec![a])]),
    ]);

    assert_eq!(outcome.reason, TerminationReason::Refutation);
    assert_eq!(saturation.ctx.statistics.forward_demodulations, 2);
    assert!(saturation.ctx.statistics.resolutions >= 1);
}

#[test]
fn test_two_resolution_refutation() {
    // { p(X) | q(X), ~p(a), ~q(a) }
    let x = InTerm::var(0);
    let a = InTerm::constant("a");
    let (outcome, saturation) = run(vec![
        Unit::axiom(
            "split",
            vec![
                InLiteral::positive("p", vec![x.clone()]),
                InLiteral::positive("q", vec![x]),
            ],
        ),
        Unit::axiom("not_p_a", vec![InLiteral::negative("p", vec![a.clone()])]),
        Unit::axiom("not_q_a", vec![InLiteral::negative("q", vec![a])]),
    ]);

    assert_eq!(outcome.reason, TerminationReason::Refutation);
    assert_eq!(saturation.ctx.statistics.resolutions, 2);
}

#[test]
fn test_single_clause_saturates() {
    // { p(X) } alone is satisfiable under a complete configuration
    let x = InTerm::var(0);
    let (outcome, saturation) = run(vec![Unit::axiom(
        "p_x",
        vec![InLiteral::positive("p", vec![x])],
    )]);

    assert_eq!(outcome.reason, TerminationReason::Satisfiable);
    let active: Vec<_> = saturation.active_clauses().collect();
    assert_eq!(active.len(), 1);
}

#[test]
fn test_no_cross_color_demodulation() {
    // LEFT { a = b } and RIGHT { b = c }: the color discipline forbids the
    // only rewrites that would combine them, and saturation completes.
    let a = InTerm::constant("a");
    let b = InTerm::constant("b");
    let c = InTerm::constant("c");
    let (outcome, saturation) = run(vec![
        Unit::colored("left_eq", vec![InLiteral::equality(a, b.clone())], Color::Left),
        Unit::colored("right_eq", vec![InLiteral::equality(b, c)], Color::Right),
    ]);

    assert_eq!(outcome.reason, TerminationReason::Satisfiable);
    assert_eq!(saturation.ctx.statistics.forward_demodulations, 0);
    assert_eq!(saturation.ctx.statistics.backward_demodulations, 0);
    assert_eq!(saturation.active_clauses().count(), 2);
}

#[test]
fn test_cross_color_resolution_is_blocked() {
    // LEFT p(a) and RIGHT ~p(a) would refute immediately, but the
    // conclusion's colors join to invalid and the inference is discarded.
    let a = InTerm::constant("a");
    let (outcome, saturation) = run(vec![
        Unit::colored("left", vec![InLiteral::positive("p", vec![a.clone()])], Color::Left),
        Unit::colored("right", vec![InLiteral::negative("p", vec![a])], Color::Right),
    ]);

    assert_eq!(outcome.reason, TerminationReason::Satisfiable);
    assert!(saturation.ctx.statistics.color_blocked >= 1);
}

#[test]
fn test_color_valid_refutation_through_transparent() {
    // LEFT p(a) with a transparent ~p(X): the derivation stays color-valid
    // and the empty clause inherits LEFT.
    let a = InTerm::constant("a");
    let x = InTerm::var(0);
    let (outcome, _) = run(vec![
        Unit::colored("left", vec![InLiteral::positive("p", vec![a])], Color::Left),
        Unit::axiom("conn", vec![InLiteral::negative("p", vec![x])]),
    ]);

    assert_eq!(outcome.reason, TerminationReason::Refutation);
    let empty = outcome.refutation.unwrap();
    assert_eq!(empty.color, Color::Left);
}

#[test]
fn test_trivial_equality_deleted() {
    // x = x is deleted before it ever reaches passive
    let x = InTerm::var(0);
    let (outcome, saturation) = run(vec![Unit::axiom(
        "refl",
        vec![InLiteral::equality(x.clone(), x)],
    )]);

    assert_eq!(outcome.reason, TerminationReason::Satisfiable);
    assert_eq!(saturation.ctx.statistics.tautologies_deleted, 1);
    assert_eq!(saturation.ctx.statistics.passive_added, 0);
}

#[test]
fn test_reflexivity_refutation_by_equality_resolution() {
    // a != a refutes through equality resolution
    let a = InTerm::constant("a");
    let (outcome, saturation) = run(vec![Unit::negated_conjecture(
        "goal",
        vec![InLiteral::disequality(a.clone(), a)],
    )]);

    assert_eq!(outcome.reason, TerminationReason::Refutation);
    assert_eq!(saturation.ctx.statistics.equality_resolutions, 1);
}

#[test]
fn test_group_left_identity_instance() {
    // { mult(e, X) = X, ~(mult(e, a) = a) }: superposition or demodulation
    // must collapse the goal.
    let x = InTerm::var(0);
    let a = InTerm::constant("a");
    let e = InTerm::constant("e");
    let mult_ex = InTerm::app("mult", vec![e.clone(), x.clone()]);
    let mult_ea = InTerm::app("mult", vec![e, a.clone()]);

    let (outcome, _) = run(vec![
        Unit::axiom("left_identity", vec![InLiteral::equality(mult_ex, x)]),
        Unit::negated_conjecture("goal", vec![InLiteral::disequality(mult_ea, a)]),
    ]);

    assert_eq!(outcome.reason, TerminationReason::Refutation);
}

#[test]
fn test_forward_subsumption_discards_generated_duplicate() {
    // The resolvent p(a) of q(a) and ~q(X) | p(X) is subsumed by the
    // active p(X) and never enters passive.
    let x = InTerm::var(0);
    let a = InTerm::constant("a");
    let mut saturation = Saturation::new(StrategyOptions {
        selection: stratus::SelectionFn::All,
        ..StrategyOptions::default()
    });
    saturation
        .add_input(&[
            Unit::axiom("general", vec![InLiteral::positive("p", vec![x.clone()])]),
            Unit::axiom("q_a", vec![InLiteral::positive("q", vec![a])]),
            Unit::axiom(
                "implication",
                vec![
                    InLiteral::negative("q", vec![x.clone()]),
                    InLiteral::positive("p", vec![x]),
                ],
            ),
        ])
        .unwrap();
    let outcome = saturation.run();

    assert_eq!(outcome.reason, TerminationReason::Satisfiable);
    assert!(
        saturation.ctx.statistics.forward_subsumed >= 1,
        "the resolvent p(a) must be forward-subsumed by p(X)"
    );
}

#[test]
fn test_refutation_via_schedule() {
    let a = InTerm::constant("a");
    let problem = Problem::new(vec![
        Unit::axiom("p_a", vec![InLiteral::positive("p", vec![a.clone()])]),
        Unit::negated_conjecture("goal", vec![InLiteral::negative("p", vec![a])]),
    ]);

    let schedule = Schedule::default();
    let strategies = vec![
        Strategy::new("default", StrategyOptions::default(), 0),
        Strategy::new(
            "age-heavy",
            StrategyOptions {
                age_weight_ratio: (5, 1),
                ..StrategyOptions::default()
            },
            1,
        ),
    ];
    let outcome = schedule.run(&problem, strategies, None).unwrap();
    assert_eq!(outcome.reason, TerminationReason::Refutation);

    let winner = outcome.winner.unwrap();
    let empty = winner
        .ctx
        .statistics
        .termination
        .expect("winner records its termination reason");
    assert_eq!(empty, TerminationReason::Refutation);
}

#[test]
fn test_derivation_output_formats() {
    let a = InTerm::constant("a");
    let (outcome, saturation) = run(vec![
        Unit::axiom("p_a", vec![InLiteral::positive("p", vec![a.clone()])]),
        Unit::negated_conjecture("goal", vec![InLiteral::negative("p", vec![a])]),
    ]);

    let derivation = Derivation::from_clause(outcome.refutation.as_ref().unwrap());
    let text = derivation
        .display(&saturation.ctx.store, &saturation.ctx.signature)
        .to_string();
    assert!(text.contains("$false"));
    assert!(text.lines().count() >= 3);

    let wire = derivation.to_wire(&saturation.ctx.store, &saturation.ctx.signature);
    let json = serde_json::to_string(&wire).unwrap();
    assert!(json.contains("resolution"));
}
