use tramp_runtime::Session;

fn rep(session: &Session, input: &str) -> String {
    match session.rep(input) {
        Ok(output) => output,
        Err(e) => panic!("evaluating {input:?} failed: {e}"),
    }
}

fn run(input: &str) -> String {
    rep(&Session::new(), input)
}

// ============================================================================
// Quasiquote
// ============================================================================

#[test]
fn test_quasiquote_unquote() {
    assert_eq!(run("`(1 ~(+ 1 1) 3)"), "(1 2 3)");
    assert_eq!(run("(let* (x 7) `(a ~x))"), "(a 7)");
}

#[test]
fn test_quasiquote_splice() {
    assert_eq!(run("`(1 ~@(list 2 3) 4)"), "(1 2 3 4)");
    assert_eq!(run("`(~@(list))"), "()");
    assert_eq!(run("(let* (xs [1 2]) `(0 ~@xs))"), "(0 1 2)");
}

#[test]
fn test_quasiquote_leaves_atoms_and_empty_list() {
    assert_eq!(run("`7"), "7");
    assert_eq!(run("`sym"), "sym");
    assert_eq!(run("`()"), "()");
    assert_eq!(run("`(nested (list ~(+ 2 3)))"), "(nested (list 5))");
}

#[test]
fn test_quasiquoteexpand_is_unevaluated() {
    assert_eq!(
        run("(quasiquoteexpand (a ~b ~@c))"),
        "(cons (quote a) (cons b (concat c ())))"
    );
}

// ============================================================================
// Macros
// ============================================================================

#[test]
fn test_macro_arguments_are_not_evaluated() {
    let session = Session::new();
    rep(&session, "(defmacro! ignore (fn* (a) nil))");
    assert_eq!(rep(&session, "(ignore (undefined-symbol))"), "nil");
}

#[test]
fn test_macro_receives_forms() {
    let session = Session::new();
    rep(&session, "(defmacro! unless (fn* (c a b) `(if ~c ~b ~a)))");
    assert_eq!(rep(&session, "(unless false 1 2)"), "1");
    assert_eq!(rep(&session, "(unless true 1 2)"), "2");
    assert_eq!(
        rep(&session, "(macroexpand (unless x :yes :no))"),
        "(if x :no :yes)"
    );
}

#[test]
fn test_macro_expanding_to_macro() {
    let session = Session::new();
    rep(&session, "(defmacro! my-when (fn* (c & body) `(if ~c (do ~@body))))");
    rep(&session, "(defmacro! always (fn* (& body) `(my-when true ~@body)))");
    assert_eq!(rep(&session, "(always 1 2 3)"), "3");
    assert_eq!(
        rep(&session, "(macroexpand (always 1))"),
        "(if true (do 1))"
    );
}

#[test]
fn test_defmacro_copies_the_function() {
    let session = Session::new();
    rep(&session, "(def! f (fn* (x) `(quote ~x)))");
    rep(&session, "(defmacro! m f)");
    assert_eq!(rep(&session, "(macro? m)"), "true");
    assert_eq!(rep(&session, "(macro? f)"), "false");
    assert_eq!(rep(&session, "(f 1)"), "(quote 1)");
    assert_eq!(rep(&session, "(m abc)"), "abc");
}

#[test]
fn test_defmacro_requires_function() {
    let session = Session::new();
    assert!(session.eval_str("(defmacro! m 1)").is_err());
}

#[test]
fn test_cond_macro() {
    let session = Session::new();
    rep(&session, "(def! sign (fn* (n) (cond (< n 0) :neg (= n 0) :zero :else :pos)))");
    assert_eq!(rep(&session, "(sign -3)"), ":neg");
    assert_eq!(rep(&session, "(sign 0)"), ":zero");
    assert_eq!(rep(&session, "(sign 9)"), ":pos");
}

#[test]
fn test_macro_in_nested_position() {
    let session = Session::new();
    rep(&session, "(defmacro! two (fn* () 2))");
    assert_eq!(rep(&session, "(+ (two) (two))"), "4");
    assert_eq!(rep(&session, "[(two)]"), "[2]");
}
