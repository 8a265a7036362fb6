//! Shared helpers for integration tests
// Not every test target uses every helper.
#![allow(dead_code)]

use dblity::ast::testing::*;
use dblity::ast::{CompilationUnit, DeclId, Expr, Stmt};
use dblity::{CheckReport, DiagnosticKind};
use std::path::PathBuf;

/// Path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// One diagnostic per line, as the CLI prints them (without the unit name).
pub fn render(report: &CheckReport) -> String {
    report
        .diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `(kind, line)` of every diagnostic.
pub fn summary(report: &CheckReport) -> Vec<(DiagnosticKind, usize)> {
    report
        .diagnostics
        .iter()
        .map(|d| (d.kind, d.span.start_line))
        .collect()
}

/// `method(arg);` with the call located at the argument.
pub fn accept(method: DeclId, arg: Expr) -> Stmt {
    let span = arg.span();
    expr_stmt(call(None, method, vec![arg], span))
}

/// Identifiers of the declarations shared by the term-model examples.
#[derive(Debug, Clone)]
pub struct TermWorld {
    pub term: DeclId,
    pub unit_ty: DeclId,
    pub sub: RecordIds,
    pub main: DeclId,
    pub accept_closed: DeclId,
    pub accept_bound: DeclId,
    pub accept_closed_int: DeclId,
}

impl TermWorld {
    /// `sub.inheritSubTerm()`
    pub fn inherit_sub_term(&self, receiver: Expr, line: usize) -> Expr {
        call(Some(receiver), self.sub.components[0], vec![], at(line))
    }

    /// `sub.closedSubTerm()`
    pub fn closed_sub_term(&self, receiver: Expr, line: usize) -> Expr {
        call(Some(receiver), self.sub.components[1], vec![], at(line))
    }

    /// `sub.integer()`
    pub fn integer(&self, receiver: Expr, line: usize) -> Expr {
        call(Some(receiver), self.sub.components[2], vec![], at(line))
    }
}

/// Declares the term model of `Main.java` (without method bodies):
///
/// ```text
///  3 public class Main {
///  4     public interface Term {}
///  6     public enum Unit implements Term { INSTANCE }
///  8     @Bound
///  9     public record SubTerm(Term inheritSubTerm, @Closed Term closedSubTerm, int integer) implements Term { .. }
/// 20     public static void acceptClosedTerm(@Closed Term term) {}
/// 22     public static void acceptBoundTerm(@Bound Term term) {}
/// 24     public static void acceptClosedInt(@Closed int i) {}
/// ```
pub fn term_world(b: &mut UnitBuilder) -> TermWorld {
    let term = b.interface("Term", &[], at(4));
    let unit_ty = b.singleton("Unit", &[], &["Term"], at(6));
    let sub = b.record(
        "SubTerm",
        &["Bound"],
        &[
            ("inheritSubTerm", "Term", &[]),
            ("closedSubTerm", "Term", &["Closed"]),
            ("integer", "int", &[]),
        ],
        &["Term"],
        at(9),
    );
    let main = b.class("Main", at(3));
    let accept_closed = b
        .method(
            Some(main),
            MethodSpec::static_method("acceptClosedTerm").param("term", "Term", &["Closed"]),
            at(20),
        )
        .id;
    let accept_bound = b
        .method(
            Some(main),
            MethodSpec::static_method("acceptBoundTerm").param("term", "Term", &["Bound"]),
            at(22),
        )
        .id;
    let accept_closed_int = b
        .method(
            Some(main),
            MethodSpec::static_method("acceptClosedInt").param("i", "int", &["Closed"]),
            at(24),
        )
        .id;
    TermWorld {
        term,
        unit_ty,
        sub,
        main,
        accept_closed,
        accept_bound,
        accept_closed_int,
    }
}

/// The complete `Main.java` example, every statement on its source line.
pub fn main_java() -> CompilationUnit {
    let mut b = UnitBuilder::new("Main.java");
    let w = term_world(&mut b);

    // record SubTerm { public void doSomething() { .. } }
    let do_something = b.method(
        Some(w.sub.id),
        MethodSpec::instance_method("doSomething"),
        at(10),
    );
    b.body(
        do_something.id,
        vec![
            accept(w.accept_closed, field(None, w.sub.components[0], at(12))),
            accept(w.accept_bound, field(None, w.sub.components[0], at(14))),
            accept(w.accept_closed, field(None, w.sub.components[1], at(16))),
        ],
    );

    // public void testSubterm(@Bound SubTerm sub) { .. }
    let test_subterm = b.method(
        Some(w.main),
        MethodSpec::instance_method("testSubterm").param("sub", "SubTerm", &["Bound"]),
        at(26),
    );
    let sub = test_subterm.params[0];
    let [bound_a, bound_b, i, j, ii, s] = [
        b.fresh(),
        b.fresh(),
        b.fresh(),
        b.fresh(),
        b.fresh(),
        b.fresh(),
    ];
    let deconstruct = |binding: dblity::ast::PatternBinding, line: usize| {
        record_pattern(
            w.sub.id,
            vec![var_pattern(binding), unnamed(at(line)), unnamed(at(line))],
            at(line),
        )
    };
    b.body(
        test_subterm.id,
        vec![
            if_stmt(
                instance_of(
                    var(sub, at(27)),
                    deconstruct(binding(bound_a, "inheritSubTerm", &[], at(27)), 27),
                    at(27),
                ),
                vec![
                    accept(w.accept_closed, var(bound_a, at(28))),
                    accept(w.accept_bound, var(bound_a, at(30))),
                ],
                None,
            ),
            switch_stmt(
                var(sub, at(33)),
                vec![pattern_arm(
                    deconstruct(binding(bound_b, "inheritSubTerm", &["Bound"], at(34)), 34),
                    vec![accept(w.accept_closed, var(bound_b, at(35)))],
                )],
            ),
            accept(w.accept_closed, w.inherit_sub_term(var(sub, at(41)), 41)),
            accept(w.accept_closed, w.closed_sub_term(var(sub, at(44)), 44)),
            accept(w.accept_bound, w.closed_sub_term(var(sub, at(47)), 47)),
            local(i, "i", None, &[], Some(w.inherit_sub_term(var(sub, at(50)), 50)), at(50)),
            accept(w.accept_closed, var(i, at(51))),
            accept(w.accept_bound, var(i, at(53))),
            local(j, "j", Some("Term"), &["Closed"], Some(var(i, at(56))), at(56)),
            local(
                ii,
                "ii",
                Some("int"),
                &["Closed"],
                Some(w.integer(var(sub, at(59)), 59)),
                at(59),
            ),
            local(
                s,
                "s",
                Some("Term"),
                &["Closed"],
                Some(new(
                    w.sub.id,
                    vec![null(at(62)), null(at(62)), lit("int", at(62))],
                    at(62),
                )),
                at(62),
            ),
        ],
    );

    // public void inconsistent() { .. }
    let inconsistent = b.method(
        Some(w.main),
        MethodSpec::instance_method("inconsistent"),
        at(65),
    );
    let [ci, cj, k, l] = [b.fresh(), b.fresh(), b.fresh(), b.fresh()];
    b.body(
        inconsistent.id,
        vec![
            local(ci, "i", Some("int"), &["Closed"], Some(lit("int", at(66))), at(66)),
            local(cj, "j", None, &[], Some(var(ci, at(67))), at(67)),
            accept(w.accept_closed_int, var(cj, at(69))),
            local(k, "k", Some("Term"), &["Closed"], Some(singleton(w.unit_ty, at(71))), at(71)),
            local(l, "l", None, &[], Some(var(k, at(72))), at(72)),
            accept(w.accept_closed, var(l, at(74))),
        ],
    );

    b.finish()
}
