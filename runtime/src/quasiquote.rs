//! Quasiquote expansion
//!
//! A pure rewrite of a quasiquoted form into ordinary calls to `cons`,
//! `concat` and `quote`. The evaluator then evaluates the result in place.

use tramp::{Error, ListKind, Result, Value, check_arity_exact, guarded, known};

/// Rewrite the body of `(quasiquote ast)`.
///
/// - `(unquote x)` becomes `x`
/// - a symbol becomes `(quote sym)`
/// - a non-empty list or vector is folded right to left: `(splice-unquote x)`
///   elements become `(concat x acc)`, every other element `e` becomes
///   `(cons <e expanded> acc)`, starting from the empty list
/// - everything else, including `()`, is returned unchanged
pub fn quasiquote(ast: &Value) -> Result<Value> {
    guarded(|| rewrite(ast))
}

fn rewrite(ast: &Value) -> Result<Value> {
    match ast {
        Value::Symbol(_) => Ok(Value::list([Value::symbol("quote"), ast.clone()])),
        Value::List(list) if !list.items.is_empty() => {
            if list.kind == ListKind::List && ast.is_form(known().unquote) {
                return unquoted_operand("unquote", ast);
            }

            let mut acc = Value::list([]);
            for element in list.items.iter().rev() {
                acc = if element.is_form(known().splice_unquote) {
                    let spliced = unquoted_operand("splice-unquote", element)?;
                    Value::list([Value::symbol("concat"), spliced, acc])
                } else {
                    Value::list([Value::symbol("cons"), quasiquote(element)?, acc])
                };
            }
            Ok(acc)
        }
        _ => Ok(ast.clone()),
    }
}

/// The single operand of `(unquote x)` / `(splice-unquote x)`
fn unquoted_operand(name: &str, form: &Value) -> Result<Value> {
    let items = form
        .as_seq()
        .ok_or_else(|| Error::type_error(format!("{name}: expected a list")))?;
    let operands: Vec<&Value> = items.iter().skip(1).collect();
    check_arity_exact(name, &operands, 1)?;
    Ok(operands[0].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tramp::read_str;

    fn expand(input: &str) -> String {
        quasiquote(&read_str(input).unwrap()).unwrap().to_string()
    }

    #[test]
    fn test_atoms_pass_through() {
        assert_eq!(expand("1"), "1");
        assert_eq!(expand("\"s\""), "\"s\"");
        assert_eq!(expand("nil"), "nil");
        assert_eq!(expand("()"), "()");
        assert_eq!(expand("{:a b}"), "{:a b}");
    }

    #[test]
    fn test_symbol_is_quoted() {
        assert_eq!(expand("a"), "(quote a)");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(expand("(unquote x)"), "x");
    }

    #[test]
    fn test_list_fold() {
        assert_eq!(expand("(1 b)"), "(cons 1 (cons (quote b) ()))");
        assert_eq!(
            expand("(a (unquote b) (splice-unquote c))"),
            "(cons (quote a) (cons b (concat c ())))"
        );
    }

    #[test]
    fn test_nested_lists() {
        assert_eq!(expand("((unquote x))"), "(cons x ())");
        assert_eq!(expand("((a))"), "(cons (cons (quote a) ()) ())");
    }

    #[test]
    fn test_unquote_arity() {
        let form = read_str("(unquote a b)").unwrap();
        assert!(matches!(quasiquote(&form), Err(Error::Arity { .. })));
    }
}
