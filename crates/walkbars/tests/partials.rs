//! Integration tests for partials, partial blocks and inline partials.

use walkbars::{
    BlockOverlay, CompileOptions, Function, Partial, RenderError, RuntimeOptions, Value, Walkbars,
    object, render,
};

fn eval_with(template: &str, context: Value, runtime: RuntimeOptions) -> Result<String, RenderError> {
    render(template, context, runtime, CompileOptions::default())
}

// =============================================================================
// Partial statements
// =============================================================================

#[test]
fn missing_partial_errors() {
    let error = eval_with("{{> foo }}", object! {}, RuntimeOptions::default()).unwrap_err();
    assert_eq!(error.to_string(), "The partial foo could not be found");
    assert!(matches!(error, RenderError::MissingPartial { name, .. } if name == "foo"));
}

#[test]
fn missing_partial_suggests_close_names() {
    let runtime = RuntimeOptions::new().with_partial("header", "h");
    let error = eval_with("{{> heder}}", object! {}, runtime).unwrap_err();
    assert_eq!(error.to_string(), "The partial heder could not be found (did you mean: header?)");
}

#[test]
fn partial_renders_in_caller_context() {
    let runtime = RuntimeOptions::new()
        .with_partial("plain", "baz")
        .with_partial("ctx", "{{fizz}}");
    assert_eq!(
        eval_with("{{> plain }}{{> ctx}}", object! { "fizz" => "buzz" }, runtime).unwrap(),
        "bazbuzz"
    );
}

#[test]
fn computed_partial_names() {
    let runtime = RuntimeOptions::new().with_partial("bar", "baz");
    assert_eq!(
        eval_with("{{> (lookup . \"foo\") }}", object! { "foo" => "bar" }, runtime.clone()).unwrap(),
        "baz"
    );

    let context = object! { "foo" => Function::new(|_, _| Ok(Value::from("bar"))) };
    assert_eq!(eval_with("{{> (foo) }}", context, runtime.clone()).unwrap(), "baz");

    let error = eval_with("{{> (foo) }}", object! { "foo" => "bar" }, runtime).unwrap_err();
    assert!(error.to_string().ends_with("is not a function"), "{error}");
}

#[test]
fn computed_partial_name_that_is_missing() {
    let runtime = RuntimeOptions::new().with_partial("fizz", "baz");
    let error = eval_with("{{> (lookup . \"foo\") }}", object! { "foo" => "bar" }, runtime).unwrap_err();
    assert_eq!(error.to_string(), "The partial bar could not be found");
}

#[test]
fn partial_data_comes_from_enclosing_block() {
    let runtime = RuntimeOptions::new()
        .with_data("bar", "baz")
        .with_helper("outside", |evaluator, call| {
            let options = call.options().ok_or_else(|| RenderError::custom("no options"))?;
            let overlay = BlockOverlay {
                data: Some(object! { "bar" => "inga" }),
                block_params: None,
            };
            options.render_with(evaluator, call.this.clone(), overlay).map(Value::from)
        })
        .with_helper("inside", |evaluator, call| {
            let options = call.options().ok_or_else(|| RenderError::custom("no options"))?;
            let overlay = BlockOverlay {
                data: Some(options.data.clone()),
                block_params: None,
            };
            options.render_with(evaluator, call.this.clone(), overlay).map(Value::from)
        })
        .with_partial("foo", "{{@bar}}");
    assert_eq!(
        eval_with("{{#outside}}{{#inside}}{{> foo }}{{/inside}}{{/outside}}", object! {}, runtime).unwrap(),
        "inga"
    );
}

#[test]
fn partial_with_literal_context() {
    let runtime = RuntimeOptions::new()
        .with_partial("foo", "{{.}}")
        .with_partial("hashed", "{{.}}{{baz}}");
    assert_eq!(eval_with("{{> foo \"bar\"}}", object! {}, runtime.clone()).unwrap(), "bar");
    assert_eq!(
        eval_with("{{> hashed \"bar\" baz=\"inga\"}}", object! {}, runtime).unwrap(),
        "[object Object]inga"
    );
}

#[test]
fn partial_context_cannot_see_parent_frames() {
    let context = object! { "fizz" => "buzz", "newContext" => object! { "fizz" => "inga" } };
    let runtime = RuntimeOptions::new().with_partial("foo", "{{fizz}}{{../fizz}}");
    assert_eq!(eval_with("{{> foo ./newContext}}", context.clone(), runtime.clone()).unwrap(), "inga");
    insta::assert_snapshot!(
        eval_with("{{#with newContext}}{{> foo}}{{/with}}", context, runtime).unwrap(),
        @"inga"
    );
}

#[test]
fn partial_keeps_data() {
    let context = object! { "fizz" => "buzz", "newContext" => object! { "fizz" => "inga" } };
    let runtime = RuntimeOptions::new()
        .with_data("bar", "baz")
        .with_partial("foo", "{{fizz}}{{@bar}}");
    assert_eq!(eval_with("{{> foo ./newContext}}", context, runtime).unwrap(), "ingabaz");
}

#[test]
fn partial_argument_is_never_a_helper() {
    let context = object! { "fizz" => "buzz", "newContext" => object! { "fizz" => "inga" } };
    let runtime = RuntimeOptions::new()
        .with_helper("newContext", |_, _| Ok(Value::from("baz")))
        .with_helper("bar", |_, call| Ok(call.this.get_own_property("fizz").unwrap_or_default()))
        .with_partial("foo", "{{fizz}}")
        .with_partial("helped", "{{bar}}");
    assert_eq!(eval_with("{{> foo newContext}}", context.clone(), runtime.clone()).unwrap(), "inga");
    assert_eq!(eval_with("{{> helped newContext}}", context, runtime).unwrap(), "inga");
}

#[test]
fn partial_hash_merges_into_context() {
    let context = object! { "fizz" => "buzz", "newContext" => object! { "fizz" => "inga" } };
    let runtime = RuntimeOptions::new().with_partial("foo", "{{one}}{{fizz}}");
    assert_eq!(eval_with("{{> foo newContext one=fizz}}", context, runtime).unwrap(), "buzzinga");
}

#[test]
fn partial_with_two_arguments_is_rejected() {
    let runtime = RuntimeOptions::new().with_partial("foo", "x");
    let error = eval_with("{{> foo a b}}", object! {}, runtime).unwrap_err();
    assert!(matches!(error, RenderError::UnsupportedPartialArity { count: 2 }));
}

#[test]
fn explicit_partial_context_starts_empty() {
    let options = CompileOptions::builder().explicit_partial_context(true).build();
    let runtime = RuntimeOptions::new().with_partial("foo", "[{{fizz}}]");
    let context = object! { "fizz" => "buzz" };
    assert_eq!(render("{{> foo}}", context.clone(), runtime.clone(), options.clone()).unwrap(), "[]");
    assert_eq!(render("{{> foo .}}", context, runtime, options).unwrap(), "[buzz]");
}

#[test]
fn compat_partials_see_enclosing_scopes() {
    let options = CompileOptions::builder().compat(true).build();
    let runtime = RuntimeOptions::new().with_partial("foo", "{{fizz}}{{outer}}");
    let context = object! { "outer" => "!", "inner" => object! { "fizz" => "inga" } };
    assert_eq!(render("{{> foo inner}}", context, runtime, options).unwrap(), "inga!");
}

#[test]
fn function_partial_gets_context() {
    let runtime = RuntimeOptions::new().with_partial(
        "foo",
        Function::new(|_, call| {
            let fizz = call.arg(0).get_own_property("fizz").unwrap_or_default();
            Ok(Value::from(format!("fn {fizz}")))
        }),
    );
    assert_eq!(eval_with("{{> foo}}", object! { "fizz" => "buzz" }, runtime).unwrap(), "fn buzz");
}

#[test]
fn standalone_partial_is_indented() {
    let runtime = RuntimeOptions::new().with_partial("lines", "a\nb\n");
    assert_eq!(eval_with("x\n  {{> lines}}\ny", object! {}, runtime.clone()).unwrap(), "x\n  a\n  b\ny");

    let options = CompileOptions::builder().prevent_indent(true).build();
    assert_eq!(render("x\n  {{> lines}}\ny", object! {}, runtime, options).unwrap(), "x\n  a\nb\ny");
}

#[test]
fn self_recursive_partial_hits_depth_limit() {
    let mut walkbars = Walkbars::with_options(CompileOptions::builder().max_depth(16).build());
    walkbars.register_partial("loop", "{{> loop}}").unwrap();
    let error = walkbars.render("{{> loop}}", object! {}).unwrap_err();
    assert!(matches!(error, RenderError::MaxDepthExceeded { limit: 16 }));
}

#[test]
fn recursive_partial_over_a_tree() {
    let mut walkbars = Walkbars::new();
    walkbars
        .register_partial("node", "{{name}}({{#each children}}{{> node}}{{/each}})")
        .unwrap();
    let tree = object! {
        "name" => "root",
        "children" => vec![
            object! { "name" => "a", "children" => Vec::<Value>::new() },
            object! { "name" => "b", "children" => vec![object! { "name" => "c" }] },
        ],
    };
    assert_eq!(walkbars.render("{{> node}}", tree).unwrap(), "root(a()b(c()))");
}

// =============================================================================
// Partial blocks
// =============================================================================

#[test]
fn partial_block_renders_partial_when_present() {
    let runtime = RuntimeOptions::new().with_partial("foo", "bar");
    assert_eq!(eval_with("{{#> foo }}default{{/foo}}", object! {}, runtime).unwrap(), "bar");

    let runtime = RuntimeOptions::new().with_partial("foo", "{{fizz}}");
    assert_eq!(
        eval_with("{{#> foo }}default{{/foo}}", object! { "fizz" => "buzz" }, runtime).unwrap(),
        "buzz"
    );
}

#[test]
fn partial_block_hash() {
    let context = object! { "fizz" => "buzz", "newContext" => object! { "fizz" => "inga" } };
    let runtime = RuntimeOptions::new().with_partial("foo", "{{one}}{{fizz}}");
    assert_eq!(
        eval_with("{{#> foo newContext one=fizz}}{{fizz}}{{/foo}}", context, runtime).unwrap(),
        "buzzinga"
    );
}

#[test]
fn partial_block_falls_back_to_body() {
    let context = object! { "fizz" => "buzz", "newContext" => object! { "fizz" => "inga" } };
    let none = RuntimeOptions::default();
    assert_eq!(eval_with("{{#> foo }}default{{/foo}}", object! {}, none.clone()).unwrap(), "default");
    assert_eq!(eval_with("{{#> foo }}{{fizz}}{{/foo}}", context.clone(), none.clone()).unwrap(), "buzz");
    assert_eq!(eval_with("{{#> foo newContext}}{{fizz}}{{/foo}}", context, none).unwrap(), "inga");
}

#[test]
fn partial_block_body_via_reference() {
    let runtime = RuntimeOptions::new().with_partial("foo", "inner {{> @partial-block }}");
    insta::assert_snapshot!(
        eval_with("{{#> foo }}default{{/foo}}", object! {}, runtime.clone()).unwrap(),
        @"inner default"
    );
    assert_eq!(
        eval_with("{{#> foo }}{{ @partial-block }}{{/foo}}", object! {}, runtime.clone()).unwrap(),
        "inner "
    );
    let context = object! { "fizz" => "buzz", "newContext" => object! { "fizz" => "inga" } };
    assert_eq!(
        eval_with("{{#> foo newContext}}{{ fizz }}{{/foo}}", context, runtime).unwrap(),
        "inner inga"
    );
}

#[test]
fn partial_block_body_keeps_outer_block_params() {
    let template =
        "{{#each people as |person|}}{{#> childEntry ../newContext}}{{person.firstName}}{{/childEntry}}{{/each}}";
    let people = vec![object! { "firstName" => "one" }, object! { "firstName" => "two" }];
    let context = object! {
        "newContext" => object! { "person" => object! { "firstName" => "three" } },
        "people" => people.clone(),
    };
    let runtime = RuntimeOptions::new().with_partial("childEntry", "{{person.firstName}} {{> @partial-block }}");
    assert_eq!(eval_with(template, context, runtime).unwrap(), "three onethree two");

    let context = object! { "people" => people };
    assert_eq!(eval_with(template, context, RuntimeOptions::default()).unwrap(), "onetwo");
}

#[test]
fn nested_partial_blocks_reach_their_own_bodies() {
    let runtime = RuntimeOptions::new()
        .with_partial("nested", "<1>{{> @partial-block}}</1>")
        .with_partial(
            "outer",
            "<2>{{#> nested }}<3>{{> @partial-block }}</3>{{/nested}}{{> @partial-block}}</2>",
        );
    insta::assert_snapshot!(
        eval_with("<4>{{#> outer }}<6>{{fizz}}</6>{{/outer}}</4>", object! { "fizz" => 5 }, runtime).unwrap(),
        @"<4><2><1><3><6>5</6></3></1><6>5</6></2></4>"
    );
}

#[test]
fn partial_block_rerenders_in_new_context() {
    let runtime = RuntimeOptions::new().with_partial(
        "dude",
        "{{> @partial-block }}{{#with context}}{{> @partial-block }}{{/with}}",
    );
    let context = object! { "value" => "foo", "context" => object! { "value" => "bar" } };
    assert_eq!(eval_with("{{#> dude}}{{value}}{{/dude}}", context, runtime).unwrap(), "foobar");
}

#[test]
fn partial_block_reference_outside_a_block() {
    let error = eval_with("{{> @partial-block}}", object! {}, RuntimeOptions::default()).unwrap_err();
    assert!(matches!(error, RenderError::MissingPartial { name, .. } if name == "@partial-block"));
}

#[test]
fn standalone_partial_block_reference_is_indented() {
    let runtime = RuntimeOptions::new().with_partial("wrap", "<div>\n  {{> @partial-block}}\n</div>\n");
    assert_eq!(
        eval_with("{{#> wrap}}\na\nb\n{{/wrap}}\n", object! {}, runtime).unwrap(),
        "<div>\n  a\n  b\n</div>\n"
    );
    let direct = RuntimeOptions::new()
        .with_partial("wrap", "<div>\n  {{> body}}\n</div>\n")
        .with_partial("body", "a\nb\n");
    assert_eq!(
        eval_with("{{> wrap}}", object! {}, direct).unwrap(),
        "<div>\n  a\n  b\n</div>\n"
    );
}

// =============================================================================
// Inline partials and decorators
// =============================================================================

#[test]
fn inline_partial_is_visible_to_nested_scopes() {
    let context = object! {
        "people" => vec![object! { "firstname" => "Nils" }, object! { "firstname" => "Yehuda" }],
    };
    assert_eq!(
        eval_with(
            "{{#*inline \"myPartial\"}}My Content{{/inline}}{{#each people}}{{> myPartial}}{{/each}}",
            context,
            RuntimeOptions::default()
        )
        .unwrap(),
        "My ContentMy Content"
    );
}

#[test]
fn inline_partial_renders_with_partial_context() {
    let context = object! { "people" => vec![object! { "name" => "Nils" }, object! { "name" => "Yehuda" }] };
    assert_eq!(
        eval_with(
            "{{#*inline \"row\"}}<{{name}}>{{/inline}}{{#each people}}{{> row}}{{/each}}",
            context,
            RuntimeOptions::default()
        )
        .unwrap(),
        "<Nils><Yehuda>"
    );
}

#[test]
fn inline_partial_overrides_registered_partial() {
    let runtime = RuntimeOptions::new().with_partial("p", "registered");
    assert_eq!(
        eval_with("{{#*inline \"p\"}}inline{{/inline}}{{> p}}", object! {}, runtime).unwrap(),
        "inline"
    );
}

#[test]
fn inline_partial_fills_a_partial_block() {
    let runtime = RuntimeOptions::new().with_partial("layout", "<main>{{> content}}</main>");
    assert_eq!(
        eval_with(
            "{{#> layout}}{{#*inline \"content\"}}body{{/inline}}{{/layout}}",
            object! {},
            runtime
        )
        .unwrap(),
        "<main>body</main>"
    );
}

#[test]
fn custom_decorator_runs_when_reached() {
    let mut walkbars = Walkbars::new();
    walkbars.register_decorator("shout", |evaluator, call| {
        let text = call.arg(0).to_string().to_uppercase();
        let body = Function::new(move |_, _| Ok(Value::from(text.clone())));
        evaluator.register_inline_partial("shouted", Partial::Function(body));
        Ok(())
    });
    assert_eq!(walkbars.render("{{#*shout \"hey\"}}{{/shout}}{{> shouted}}", object! {}).unwrap(), "HEY");
}

#[test]
fn unknown_decorator_errors() {
    let error = eval_with("{{#*nope}}{{/nope}}", object! {}, RuntimeOptions::default()).unwrap_err();
    assert!(matches!(error, RenderError::MissingDecorator { name } if name == "nope"));
}
