//! Integration tests for the built-in helpers.

use walkbars::{RenderError, Value, Walkbars, object};

fn eval(template: &str, context: Value) -> Result<String, RenderError> {
    Walkbars::new().render(template, context)
}

// =============================================================================
// each
// =============================================================================

#[test]
fn each_over_array_exposes_data() {
    let context = object! { "items" => vec!["a", "b", "c"] };
    assert_eq!(
        eval(
            "{{#each items}}{{@index}}{{@key}}{{this}}{{#if @first}}F{{/if}}{{#if @last}}L{{/if}};{{/each}}",
            context
        )
        .unwrap(),
        "00aF;11b;22cL;"
    );
}

#[test]
fn each_over_object_uses_keys() {
    let context = object! { "scores" => object! { "ann" => 3, "bob" => 5 } };
    assert_eq!(
        eval("{{#each scores}}{{@key}}={{this}} {{/each}}", context).unwrap(),
        "ann=3 bob=5 "
    );
}

#[test]
fn each_binds_block_params() {
    let context = object! { "items" => vec!["x", "y"] };
    assert_eq!(
        eval("{{#each items as |item i|}}{{i}}:{{item}} {{/each}}", context).unwrap(),
        "0:x 1:y "
    );
}

#[test]
fn each_renders_inverse_when_empty() {
    let context = object! { "items" => Vec::<Value>::new(), "label" => "none" };
    assert_eq!(eval("{{#each items}}x{{else}}{{label}}{{/each}}", context.clone()).unwrap(), "none");
    assert_eq!(eval("{{#each missing}}x{{else}}empty{{/each}}", context).unwrap(), "empty");
}

#[test]
fn each_keeps_parent_data() {
    let context = object! { "rows" => vec![vec![1, 2], vec![3]] };
    assert_eq!(
        eval(
            "{{#each rows}}{{#each this}}{{@../index}}.{{@index}} {{/each}}{{/each}}",
            context
        )
        .unwrap(),
        "0.0 0.1 1.0 "
    );
}

#[test]
fn each_reads_root() {
    let context = object! { "title" => "T", "items" => vec!["a"] };
    assert_eq!(eval("{{#each items}}{{@root.title}}{{../title}}{{/each}}", context).unwrap(), "TT");
}

#[test]
fn each_without_argument_errors() {
    let error = eval("{{#each}}x{{/each}}", object! {}).unwrap_err();
    assert_eq!(error.to_string(), "Must pass iterator to #each");
}

// =============================================================================
// if / unless
// =============================================================================

#[test]
fn if_uses_truthiness() {
    let template = "{{#if v}}yes{{else}}no{{/if}}";
    let cases = [
        (Value::from(true), "yes"),
        (Value::from("text"), "yes"),
        (object! {}, "yes"),
        (Value::from(false), "no"),
        (Value::from(""), "no"),
        (Value::from(0), "no"),
        (Value::Null, "no"),
        (Value::from(Vec::<Value>::new()), "no"),
    ];
    for (value, expected) in cases {
        let output = eval(template, object! { "v" => value.clone() }).unwrap();
        assert_eq!(output, expected, "{value:?}");
    }
}

#[test]
fn if_include_zero() {
    assert_eq!(
        eval("{{#if n includeZero=true}}zero{{else}}none{{/if}}", object! { "n" => 0 }).unwrap(),
        "zero"
    );
}

#[test]
fn if_keeps_context() {
    let context = object! { "show" => true, "name" => "Ann" };
    assert_eq!(eval("{{#if show}}{{name}}{{/if}}", context).unwrap(), "Ann");
}

#[test]
fn else_if_chains() {
    let template = "{{#if a}}A{{else if b}}B{{else}}C{{/if}}";
    assert_eq!(eval(template, object! { "a" => true }).unwrap(), "A");
    assert_eq!(eval(template, object! { "b" => true }).unwrap(), "B");
    assert_eq!(eval(template, object! {}).unwrap(), "C");
}

#[test]
fn unless_inverts() {
    let template = "{{#unless v}}off{{else}}on{{/unless}}";
    assert_eq!(eval(template, object! { "v" => false }).unwrap(), "off");
    assert_eq!(eval(template, object! { "v" => true }).unwrap(), "on");
}

#[test]
fn conditionals_require_one_argument() {
    let error = eval("{{#if}}x{{/if}}", object! {}).unwrap_err();
    assert_eq!(error.to_string(), "#if requires exactly one argument");
    let error = eval("{{#unless a b}}x{{/unless}}", object! {}).unwrap_err();
    assert_eq!(error.to_string(), "#unless requires exactly one argument");
}

// =============================================================================
// with
// =============================================================================

#[test]
fn with_changes_context() {
    let context = object! { "person" => object! { "name" => "Ann" }, "title" => "Dr" };
    assert_eq!(eval("{{#with person}}{{../title}} {{name}}{{/with}}", context).unwrap(), "Dr Ann");
}

#[test]
fn with_binds_block_param() {
    let context = object! { "person" => object! { "name" => "Ann" } };
    assert_eq!(eval("{{#with person as |p|}}{{p.name}}{{/with}}", context).unwrap(), "Ann");
}

#[test]
fn with_empty_renders_inverse() {
    assert_eq!(eval("{{#with nobody}}x{{else}}alone{{/with}}", object! {}).unwrap(), "alone");
}

#[test]
fn with_requires_one_argument() {
    let error = eval("{{#with}}x{{/with}}", object! {}).unwrap_err();
    assert!(matches!(error, RenderError::HelperArity { helper: "with", .. }));
}

// =============================================================================
// lookup / log
// =============================================================================

#[test]
fn lookup_reads_computed_properties() {
    let context = object! {
        "people" => vec!["Ann", "Bob"],
        "index" => 1,
        "fields" => object! { "k" => "v" },
        "key" => "k",
    };
    assert_eq!(eval("{{lookup people index}} {{lookup fields key}}", context).unwrap(), "Bob v");
}

#[test]
fn lookup_on_missing_object() {
    assert_eq!(eval("[{{lookup nothing \"a\"}}]", object! {}).unwrap(), "[]");
}

#[test]
fn lookup_as_sub_expression() {
    let context = object! {
        "people" => vec!["Ann"],
        "cities" => object! { "Ann" => "Oslo" },
    };
    assert_eq!(
        eval("{{#each people}}{{lookup ../cities this}}{{/each}}", context).unwrap(),
        "Oslo"
    );
}

#[test]
fn log_renders_nothing() {
    assert_eq!(
        eval("a{{log \"hello\" name level=\"warn\"}}b", object! { "name" => "x" }).unwrap(),
        "ab"
    );
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn builtin_helpers_can_be_replaced() {
    let mut walkbars = Walkbars::new();
    walkbars.register_helper("if", |_, _| Ok(Value::from("custom")));
    assert_eq!(walkbars.render("{{#if x}}a{{/if}}", object! {}).unwrap(), "custom");
}

#[test]
fn unregistered_helper_missing_still_answers() {
    let mut walkbars = Walkbars::new();
    walkbars.unregister_helper("helperMissing");
    walkbars.unregister_helper("blockHelperMissing");
    assert_eq!(walkbars.render("{{nothing}}", object! {}).unwrap(), "");
    assert_eq!(
        walkbars.render("{{#list}}{{.}}{{/list}}", object! { "list" => vec![1, 2] }).unwrap(),
        "12"
    );
}

#[test]
fn helpers_registered_from_an_object() {
    let mut walkbars = Walkbars::new();
    walkbars
        .register_helpers(object! { "greeting" => "hello", "answer" => 42 })
        .unwrap();
    assert_eq!(walkbars.render("{{greeting}} {{answer}}", object! {}).unwrap(), "hello 42");

    let error = walkbars.register_helpers("not a map").unwrap_err();
    assert!(matches!(error, RenderError::InvalidMultiRegistration { kind: "helpers" }));
}

#[test]
fn value_helper_called_with_arguments_is_not_callable() {
    let mut walkbars = Walkbars::new();
    walkbars.register_helper_value("greeting", "hello");
    let error = walkbars.render("{{greeting name}}", object! {}).unwrap_err();
    assert_eq!(error.to_string(), "greeting is not a function");
}

#[test]
fn undefined_partial_registration_is_rejected() {
    let mut walkbars = Walkbars::new();
    let error = walkbars.register_partial("p", Value::Undefined).unwrap_err();
    assert!(matches!(error, RenderError::AttemptToRegisterUndefinedPartial { name } if name == "p"));
    walkbars.register_partial("p", "ok").unwrap();
    walkbars.unregister_partial("p");
    assert!(walkbars.render("{{> p}}", object! {}).is_err());
}
