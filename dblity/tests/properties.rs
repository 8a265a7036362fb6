//! Behavioural properties of the checker, driven through the public API.

mod common;

use common::*;
use dblity::ast::testing::*;
use dblity::ast::{CompilationUnit, DeclId};
use dblity::{check_unit, CheckReport, CheckerConfig, DiagnosticKind, Severity};
use pretty_assertions::assert_eq;

fn check(unit: &CompilationUnit) -> CheckReport {
    check_unit(unit, &CheckerConfig::default())
}

/// `void test(@Bound SubTerm sub, @Closed SubTerm closed)` on `Main`.
fn test_method(b: &mut UnitBuilder, w: &TermWorld) -> (DeclId, DeclId, DeclId) {
    let m = b.method(
        Some(w.main),
        MethodSpec::instance_method("test")
            .param("sub", "SubTerm", &["Bound"])
            .param("closed", "SubTerm", &["Closed"]),
        at(30),
    );
    (m.id, m.params[0], m.params[1])
}

#[test]
fn test_construction_takes_type_level() {
    let mut b = UnitBuilder::new("Construct.java");
    let w = term_world(&mut b);
    let leaf = b.record("Leaf", &["Closed"], &[("child", "Term", &[])], &["Term"], at(26));
    let (test, sub, _) = test_method(&mut b, &w);
    b.body(
        test,
        vec![
            // Arguments weaker than the type level do not leak into the result.
            accept(w.accept_closed, new(leaf.id, vec![var(sub, at(31))], at(31))),
            accept(w.accept_closed, new(leaf.id, vec![null(at(32))], at(32))),
            // Without a type level the construction is unresolved.
            accept(
                w.accept_closed,
                new(w.sub.id, vec![null(at(33)), null(at(33)), lit("int", at(33))], at(33)),
            ),
        ],
    );

    let report = check(&b.finish());
    assert_eq!(summary(&report), vec![(DiagnosticKind::LevelMismatch, 33)]);
}

#[test]
fn test_explicit_component_ignores_receiver() {
    let mut b = UnitBuilder::new("Explicit.java");
    let w = term_world(&mut b);
    let (test, sub, closed) = test_method(&mut b, &w);
    b.body(
        test,
        vec![
            accept(w.accept_closed, w.closed_sub_term(var(sub, at(31)), 31)),
            accept(w.accept_closed, w.closed_sub_term(var(closed, at(32)), 32)),
            accept(
                w.accept_closed,
                field(Some(var(sub, at(33))), w.sub.components[1], at(33)),
            ),
        ],
    );

    assert!(check(&b.finish()).diagnostics.is_empty());
}

#[test]
fn test_inherit_component_follows_receiver() {
    let mut b = UnitBuilder::new("Inherit.java");
    let w = term_world(&mut b);
    let (test, sub, closed) = test_method(&mut b, &w);
    b.body(
        test,
        vec![
            accept(w.accept_closed, w.inherit_sub_term(var(closed, at(31)), 31)),
            accept(w.accept_closed, w.inherit_sub_term(var(sub, at(32)), 32)),
            accept(w.accept_bound, w.inherit_sub_term(var(sub, at(33)), 33)),
            accept(w.accept_closed_int, w.integer(var(closed, at(34)), 34)),
        ],
    );

    let report = check(&b.finish());
    assert_eq!(summary(&report), vec![(DiagnosticKind::LevelMismatch, 32)]);
}

#[test]
fn test_null_never_mismatches() {
    let mut b = UnitBuilder::new("Null.java");
    let w = term_world(&mut b);
    let (test, _, _) = test_method(&mut b, &w);
    let t = b.fresh();
    b.body(
        test,
        vec![
            accept(w.accept_closed, null(at(31))),
            accept(w.accept_bound, paren(null(at(32)))),
            local(t, "t", Some("Term"), &["Closed"], Some(null(at(33))), at(33)),
            expr_stmt(assign(t, null(at(34)), at(34))),
            accept(w.accept_closed, var(t, at(35))),
        ],
    );

    assert!(check(&b.finish()).diagnostics.is_empty());
}

#[test]
fn test_destructuring_binds_receiver_level() {
    let mut b = UnitBuilder::new("Destructure.java");
    let w = term_world(&mut b);
    let (test, sub, _) = test_method(&mut b, &w);
    let [x, y] = [b.fresh(), b.fresh()];
    let deconstruct = |id: DeclId, name: &str, annotations: &[&str], line: usize| {
        record_pattern(
            w.sub.id,
            vec![
                var_pattern(binding(id, name, annotations, at(line))),
                unnamed(at(line)),
                unnamed(at(line)),
            ],
            at(line),
        )
    };
    b.body(
        test,
        vec![
            if_stmt(
                instance_of(var(sub, at(31)), deconstruct(x, "x", &[], 31), at(31)),
                vec![
                    accept(w.accept_bound, var(x, at(32))),
                    accept(w.accept_closed, var(x, at(33))),
                ],
                None,
            ),
            if_stmt(
                instance_of(var(sub, at(35)), deconstruct(y, "y", &["Closed"], 35), at(35)),
                vec![accept(w.accept_closed, var(y, at(36)))],
                None,
            ),
        ],
    );

    let report = check(&b.finish());
    assert_eq!(summary(&report), vec![(DiagnosticKind::LevelMismatch, 33)]);
    assert_eq!(report.diagnostics[0].actual, Some(dblity::Closedness::Bound));
}

#[test]
fn test_stronger_value_in_weaker_position_is_cast() {
    let mut b = UnitBuilder::new("Cast.java");
    let w = term_world(&mut b);
    let (test, sub, closed) = test_method(&mut b, &w);
    b.body(
        test,
        vec![
            accept(w.accept_bound, w.closed_sub_term(var(sub, at(31)), 31)),
            accept(w.accept_bound, var(closed, at(32))),
            accept(w.accept_bound, var(sub, at(33))),
        ],
    );
    let unit = b.finish();

    let report = check(&unit);
    assert_eq!(
        summary(&report),
        vec![(DiagnosticKind::SmartCast, 31), (DiagnosticKind::SmartCast, 32)]
    );
    assert_eq!(report.count_at_least(Severity::Warning), 0);
    assert_eq!(report.diagnostics[1].required, Some(dblity::Closedness::Bound));
    assert_eq!(report.diagnostics[1].actual, Some(dblity::Closedness::Closed));

    let mut config = CheckerConfig::default();
    config.report.smart_cast = false;
    assert!(check_unit(&unit, &config).diagnostics.is_empty());
}

#[test]
fn test_varargs_reports_only_the_weak_argument() {
    let mut b = UnitBuilder::new("Varargs.java");
    let w = term_world(&mut b);
    let accept_closed_terms = b
        .method(
            Some(w.main),
            MethodSpec::static_method("acceptClosedTerms").varargs("terms", "Term", &["Closed"]),
            at(27),
        )
        .id;
    let closed_term = b
        .method(
            Some(w.main),
            MethodSpec::static_method("closedTerm")
                .returns("Term")
                .annotated("Closed"),
            at(28),
        )
        .id;
    let (test, sub, closed) = test_method(&mut b, &w);
    b.body(
        test,
        vec![expr_stmt(call(
            None,
            accept_closed_terms,
            vec![
                var(sub, at_col(31, 23)),
                null(at_col(31, 28)),
                call(None, closed_term, vec![], at_col(31, 34)),
                var(closed, at_col(31, 48)),
            ],
            at(31),
        ))],
    );

    let report = check(&b.finish());
    assert_eq!(report.count(DiagnosticKind::LevelMismatch), 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].span.start_column, 23);
}

#[test]
fn test_no_inherit_call_is_unchecked() {
    let mut b = UnitBuilder::new("NoInherit.java");
    let w = term_world(&mut b);
    let instantiate = b
        .method(
            Some(w.sub.id),
            MethodSpec::instance_method("instantiate")
                .returns("Term")
                .annotated("NoInherit"),
            at(11),
        )
        .id;
    let (test, sub, _) = test_method(&mut b, &w);
    b.body(
        test,
        vec![accept(
            w.accept_closed,
            call(Some(var(sub, at(31))), instantiate, vec![], at(31)),
        )],
    );

    let report = check(&b.finish());
    assert_eq!(summary(&report), vec![(DiagnosticKind::UncheckedInference, 31)]);
    assert_eq!(report.diagnostics[0].severity, Severity::Info);
    assert_eq!(report.count_at_least(Severity::Warning), 0);
}

#[test]
fn test_closed_is_lost_through_plain_local() {
    let mut b = UnitBuilder::new("Lost.java");
    let w = term_world(&mut b);
    let (test, _, _) = test_method(&mut b, &w);
    let [k, l] = [b.fresh(), b.fresh()];
    b.body(
        test,
        vec![
            local(k, "k", Some("Term"), &["Closed"], Some(singleton(w.unit_ty, at(31))), at(31)),
            local(l, "l", None, &[], Some(var(k, at(32))), at(32)),
            accept(w.accept_closed, var(k, at(33))),
            accept(w.accept_closed, var(l, at(34))),
        ],
    );

    let report = check(&b.finish());
    assert_eq!(
        summary(&report),
        vec![
            (DiagnosticKind::LevelMismatch, 33),
            (DiagnosticKind::LevelMismatch, 34),
        ]
    );
}

#[test]
fn test_case_arm_takes_variant_level() {
    let mut b = UnitBuilder::new("Case.java");
    let w = term_world(&mut b);
    let leaf = b.record("Leaf", &["Closed"], &[("child", "Term", &[])], &["Term"], at(26));
    let m = b.method(
        Some(w.main),
        MethodSpec::static_method("dispatch").param("t", "Term", &["Bound"]),
        at(30),
    );
    let l = b.fresh();
    b.body(
        m.id,
        vec![switch_stmt(
            var(m.params[0], at(31)),
            vec![pattern_arm(
                type_test(leaf.id, Some(binding(l, "l", &[], at(32))), at(32)),
                vec![accept(w.accept_closed, var(l, at(33)))],
            )],
        )],
    );
    let unit = b.finish();

    let report = check(&unit);
    assert_eq!(summary(&report), vec![(DiagnosticKind::CaseArmNarrowing, 32)]);
    assert_eq!(report.diagnostics[0].required, Some(dblity::Closedness::Closed));
    assert_eq!(report.diagnostics[0].actual, Some(dblity::Closedness::Bound));

    let mut config = CheckerConfig::default();
    config.report.case_arm_narrowing = false;
    assert!(check_unit(&unit, &config).diagnostics.is_empty());
}

#[test]
fn test_conflict_is_reported_and_analysis_continues() {
    let mut b = UnitBuilder::new("Conflict.java");
    let w = term_world(&mut b);
    let m = b.method(
        Some(w.main),
        MethodSpec::static_method("both").param("t", "Term", &["Bound", "Closed"]),
        at(30),
    );
    b.body(
        m.id,
        vec![
            accept(w.accept_closed, var(m.params[0], at(31))),
            accept(w.accept_closed, null(at(32))),
        ],
    );
    let (test, sub, _) = test_method(&mut b, &w);
    b.body(test, vec![accept(w.accept_closed, var(sub, at(41)))]);

    let report = check(&b.finish());
    assert_eq!(
        summary(&report),
        vec![
            (DiagnosticKind::AnnotationConflict, 30),
            (DiagnosticKind::LevelMismatch, 41),
        ]
    );
    assert!(report.has_errors());
    assert_eq!(report.unreliable, vec![m.params[0]]);
    assert_eq!(
        report.diagnostics[0].message,
        "'@Bound' conflicts with '@Closed' and is ignored"
    );
}

#[test]
fn test_units_are_independent() {
    let first = main_java();
    let mut b = UnitBuilder::new("Empty.java");
    term_world(&mut b);
    let second = b.finish();

    let before = check(&first);
    assert!(check(&second).diagnostics.is_empty());
    assert_eq!(check(&first), before);
}
