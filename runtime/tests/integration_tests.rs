use tramp::{Error, Value};
use tramp_runtime::Session;

// ============================================================================
// Helper Functions
// ============================================================================

fn rep(session: &Session, input: &str) -> String {
    match session.rep(input) {
        Ok(output) => output,
        Err(e) => panic!("evaluating {input:?} failed: {e}"),
    }
}

fn run(input: &str) -> String {
    rep(&Session::new(), input)
}

fn run_err(input: &str) -> Error {
    Session::new()
        .eval_str(input)
        .expect_err("expected evaluation to fail")
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_basic_arithmetic() {
    assert_eq!(run("(+ 1 2)"), "3");
    assert_eq!(run("(- 5 10)"), "-5");
    assert_eq!(run("(* (+ 1 2) (- 10 4))"), "18");
    assert_eq!(run("(/ (* 3 4) 2)"), "6");
}

#[test]
fn test_three_argument_arithmetic_is_arity_error() {
    assert!(matches!(
        run_err("(+ 1 2 3)"),
        Error::Arity { got: 3, .. }
    ));
}

// ============================================================================
// Definitions and Scope
// ============================================================================

#[test]
fn test_def_visible_in_child_scopes() {
    let session = Session::new();
    assert_eq!(rep(&session, "(def! a 6)"), "6");
    assert_eq!(rep(&session, "a"), "6");
    assert_eq!(rep(&session, "(let* (b 1) a)"), "6");
    assert_eq!(rep(&session, "((fn* () a))"), "6");
}

#[test]
fn test_let_is_sequential() {
    assert_eq!(run("(let* (a 1 b (+ a 1)) b)"), "2");
    assert_eq!(run("(let* [a 1 b [a a]] b)"), "[1 1]");
}

#[test]
fn test_def_inside_let_stays_local() {
    let session = Session::new();
    rep(&session, "(let* (x 1) (def! inner 5))");
    assert!(matches!(
        session.eval_str("inner"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_closures_capture_environment() {
    let session = Session::new();
    rep(&session, "(def! make-adder (fn* (n) (fn* (x) (+ x n))))");
    rep(&session, "(def! add5 (make-adder 5))");
    assert_eq!(rep(&session, "(add5 10)"), "15");
    assert_eq!(rep(&session, "((make-adder 1) 1)"), "2");
}

#[test]
fn test_failed_do_keeps_earlier_definitions() {
    let session = Session::new();
    assert!(session.eval_str("(do (def! kept 1) (undefined-thing) (def! lost 2))").is_err());
    assert_eq!(rep(&session, "kept"), "1");
    assert!(session.eval_str("lost").is_err());
}

#[test]
fn test_errors_do_not_end_the_session() {
    let session = Session::new();
    assert!(session.eval_str("(nope)").is_err());
    assert_eq!(rep(&session, "(+ 1 1)"), "2");
}

// ============================================================================
// Tail Calls
// ============================================================================

#[test]
fn test_deep_tail_recursion() {
    let session = Session::new();
    rep(
        &session,
        "(def! count-down (fn* (n) (if (= n 0) :done (count-down (- n 1)))))",
    );
    assert_eq!(rep(&session, "(count-down 100000)"), ":done");
}

#[test]
fn test_tail_calls_through_let_do_and_cond() {
    let session = Session::new();
    rep(
        &session,
        "(def! sum-to (fn* (n acc) (let* (m (- n 1)) (do (cond (= n 0) acc :else (sum-to m (+ acc n)))))))",
    );
    assert_eq!(rep(&session, "(sum-to 20000 0)"), "200010000");
}

#[test]
fn test_mutual_tail_recursion() {
    let session = Session::new();
    rep(&session, "(def! even? (fn* (n) (if (= n 0) true (odd? (- n 1)))))");
    rep(&session, "(def! odd? (fn* (n) (if (= n 0) false (even? (- n 1)))))");
    assert_eq!(rep(&session, "(even? 100001)"), "false");
}

#[test]
fn test_deep_non_tail_recursion() {
    let session = Session::new();
    rep(&session, "(def! sum (fn* (n) (if (= n 0) 0 (+ n (sum (- n 1))))))");
    assert_eq!(rep(&session, "(sum 10000)"), "50005000");
}

#[test]
fn test_runaway_recursion_is_an_error() {
    let session = Session::new();
    rep(&session, "(def! runaway (fn* (n) (+ 1 (runaway n))))");
    assert!(matches!(
        session.eval_str("(runaway 0)"),
        Err(Error::DepthExceeded(_))
    ));
    assert_eq!(tramp::stack::current_depth(), 0);
    assert_eq!(rep(&session, "(+ 1 1)"), "2");
}

#[test]
fn test_deeply_nested_source() {
    let depth = 5000;
    let nested = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(run(&format!("(count (quote {nested}))")), "1");
    assert_eq!(run(&format!("(count (read-string \"{nested}\"))")), "1");
}

// ============================================================================
// Values and Printing
// ============================================================================

#[test]
fn test_rendering() {
    assert_eq!(run("nil"), "nil");
    assert_eq!(run("true"), "true");
    assert_eq!(run("()"), "()");
    assert_eq!(run("[1 (+ 1 1)]"), "[1 2]");
    assert_eq!(run("{:a (+ 1 1)}"), "{:a 2}");
    assert_eq!(run("(fn* (x) x)"), "#<function>");
    assert_eq!(run("+"), "#<function>");
    assert_eq!(run("(atom \"s\")"), "(atom \"s\")");
    assert_eq!(run(r#""tab\\ \"q\"""#), r#""tab\\ \"q\"""#);
}

#[test]
fn test_function_equality_is_rejected() {
    assert!(matches!(
        run_err("(= (fn* () 1) (fn* () 1))"),
        Error::Type(_)
    ));
    assert_eq!(run("(= (fn* () 1) 1)"), "false");
}

#[test]
fn test_odd_map_construction_fails() {
    assert!(run_err("(hash-map :a 1 :b)").to_string().contains("even"));
    assert!(matches!(run_err("{:a 1 :b}"), Error::Syntax(_)));
}

#[test]
fn test_assoc_matches_literal_map() {
    assert_eq!(run("(= (assoc {} :a 1) {:a 1})"), "true");
    assert_eq!(run("(= (assoc {} :a 1) (hash-map :a 1))"), "true");
}

#[test]
fn test_not_callable() {
    assert!(matches!(run_err("(\"abc\" 1)"), Error::Type(_)));
    assert!(matches!(run_err("(nil)"), Error::Type(_)));
}

#[test]
fn test_eval_breaks_lexical_scope() {
    let session = Session::new();
    rep(&session, "(def! x :global)");
    assert_eq!(rep(&session, "(let* (x :local) (eval 'x))"), ":global");
    assert_eq!(rep(&session, "(eval (read-string \"(+ 2 3)\"))"), "5");
}

#[test]
fn test_eval_str_returns_value() {
    let session = Session::new();
    let value = session.eval_str("(list 1 2)").unwrap();
    assert!(matches!(value, Value::List(_)));
}
