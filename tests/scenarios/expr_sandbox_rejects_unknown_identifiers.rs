//! The sandboxed expression language accepts its closed function set and
//! trigger-context variables, and rejects anything outside that set.

use lexicrucible::expr::Expr;
use lexicrucible::TriggerContext;

#[test]
fn allowed_function_and_context_variable_evaluate() {
    let mut ctx = TriggerContext::new();
    ctx.set("entity.arousal", 0.9);
    let expr = Expr::parse("clamp(entity.arousal, 0, 0.5) > 0.4").unwrap();
    assert_eq!(expr.eval(&ctx).unwrap().as_bool(), Some(true));
}

#[test]
fn disallowed_function_name_is_rejected_at_parse_time() {
    assert!(Expr::parse("eval(1)").is_err());
}

#[test]
fn referencing_an_unset_variable_is_an_evaluation_error() {
    let expr = Expr::parse("entity.unset + 1").unwrap();
    let ctx = TriggerContext::new();
    assert!(expr.eval(&ctx).is_err());
}
