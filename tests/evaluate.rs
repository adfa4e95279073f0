use std::{collections::HashMap, io};

use lambdatalk::{
    evaluate, Binding, Context, ContextRef, Limits, PageLoader, Strategy, TalkError,
};
use pretty_assertions::assert_eq;

fn run(source: &str) -> String {
    evaluate(source, &Context::new()).unwrap().value
}

fn run_in(source: &str, context: &ContextRef) -> String {
    evaluate(source, context).unwrap().value
}

struct MemoryPages(HashMap<&'static str, &'static str>);

impl PageLoader for MemoryPages {
    fn load(&self, page: &str) -> io::Result<String> {
        self.0
            .get(page)
            .map(|text| text.to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, page.to_string()))
    }
}

fn with_pages(pages: &[(&'static str, &'static str)]) -> ContextRef {
    Context::with_loader(
        Limits::default(),
        Some(Box::new(MemoryPages(pages.iter().copied().collect()))),
    )
}

#[test]
fn unbalanced_input_is_rejected() {
    for source in ["{", "}"] {
        assert!(matches!(
            evaluate(source, &Context::new()),
            Err(TalkError::Structural { .. })
        ));
    }
    match evaluate("{+ 1 2", &Context::new()) {
        Err(TalkError::Structural { left, right }) => assert_eq!((left, right), (1, 0)),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        evaluate("{a}}", &Context::new()),
        Err(TalkError::Structural { left: 1, right: 2 })
    ));
}

#[test]
fn balance_is_reported() {
    let evaluated = evaluate("{+ {* 2 3} 1}", &Context::new()).unwrap();
    assert_eq!(evaluated.value, "7");
    assert_eq!((evaluated.balance.left, evaluated.balance.right), (2, 2));
}

#[test]
fn undefined_names_are_errors() {
    assert!(matches!(
        evaluate("{a}", &Context::new()),
        Err(TalkError::UndefinedSymbol(name)) if name == "a"
    ));
}

#[test]
fn plain_text_passes_through() {
    assert_eq!(run("  Hello   world  "), "Hello   world");
    assert_eq!(run("6"), "6");
    assert_eq!(run(""), "");
}

#[test]
fn arithmetic() {
    assert_eq!(run("{+ 1 2 3}"), "6");
    assert_eq!(run("{* 2 3}"), "6");
    assert_eq!(run("{- 5}"), "-5");
    assert_eq!(run("1 + 2 = {+ 1 2}"), "1 + 2 = 3");
}

#[test]
fn lambda_application() {
    assert_eq!(run("{{lambda {x y} {+ x y}} 3 4}"), "7");
}

#[test]
fn partial_application() {
    assert_eq!(run("{{{lambda {x y} {+ x y}} 3} 4}"), "7");
}

#[test]
fn surplus_arguments_fold_into_last_formal() {
    assert_eq!(run("{{lambda {x rest} rest} 1 2 3}"), "2 3");
}

#[test]
fn recursion_through_def() {
    let source = "{def fac {lambda {n} {if {< n 1} 1 {* n {fac {- n 1}}}}}} {fac 5}";
    assert_eq!(run(source), "120");
}

#[test]
fn let_binds_locals() {
    assert_eq!(run("{let {{a 1} {b 2}} {+ a b}}"), "3");
}

#[test]
fn quotes_are_opaque() {
    assert_eq!(run("{quote {+ 1 2}}"), "{+ 1 2}");
    assert_eq!(run("'{+ 1 2}"), "{+ 1 2}");
    assert_eq!(run("°°{+ 1 2}°° {+ 1 2}"), "{+ 1 2} 3");
}

#[test]
fn quotes_end_before_following_text() {
    assert_eq!(run("'{a}2"), "{a}2");
    assert_eq!(run("{quote x}1"), "x1");
    assert_eq!(run("'{a}1 '{b} '{c}"), "{a}1 {b} {c}");
}

#[test]
fn comments_are_removed() {
    assert_eq!(run("a ;; {undefined}\n°°° {undefined} °°°b"), "a \nb");
}

#[test]
fn macros_rewrite_before_evaluation() {
    assert_eq!(run("{macro a+ to {+ 1 1}} a+"), "2");
    assert_eq!(run("{macro ping to ping pong} ping"), "ping pong");
    assert_eq!(run(r"{macro /(\d+)!/ to {* €1 €1}} 3!"), "9");
}

#[test]
fn evaluation_is_idempotent_on_values() {
    let once = run("{+ 1 {* 2 {- 4 1}}} and text");
    assert_eq!(run(&once), once);
}

#[test]
fn if_arity_is_checked() {
    assert!(matches!(
        evaluate("{if true}", &Context::new()),
        Err(TalkError::Syntax(_))
    ));
}

#[test]
fn depth_budget() {
    let context = Context::with_loader(
        Limits {
            max_steps: 100_000,
            max_depth: 16,
        },
        None,
    );
    let result = evaluate("{def forever {lambda {n} {forever n}}} {forever 1}", &context);
    assert!(matches!(
        result,
        Err(TalkError::ResourceExceeded {
            resource: "depth",
            limit: 16
        })
    ));
}

#[test]
fn step_budget() {
    let context = Context::with_loader(
        Limits {
            max_steps: 10,
            max_depth: 256,
        },
        None,
    );
    let result = evaluate("{+ 1 {+ 1 {+ 1 {+ 1 {+ 1 {+ 1 {+ 1 1}}}}}}}", &context);
    assert!(matches!(
        result,
        Err(TalkError::ResourceExceeded {
            resource: "step",
            limit: 10
        })
    ));
}

#[test]
fn definitions_persist_across_calls() {
    let context = Context::new();
    assert_eq!(run_in("{def x 5}", &context), "");
    assert_eq!(run_in("{def add {lambda {a b} {+ a b}}}", &context), "");
    assert_eq!(run_in("{add {x} 1}", &context), "6");
}

#[test]
fn definitions_keep_inner_lambdas() {
    let context = Context::new();
    run_in("{def square {lambda {x} {let {{y x}} {* y y}}}}", &context);
    assert_eq!(
        run_in("{{lambda {a b} {+ a b}} 2 3} {square 4}", &context),
        "5 16"
    );
    assert_eq!(run_in("{square 5}", &context), "25");
}

#[test]
fn definitions_keep_partial_applications() {
    let context = Context::new();
    run_in("{def add3 {{lambda {a b} {+ a b}} 3}}", &context);
    assert_eq!(run_in("{add3 4}", &context), "7");
}

#[test]
fn definitions_keep_quotes() {
    let context = Context::new();
    run_in("{def greet {lambda {name} {quote hello} name}}", &context);
    run_in("{def brace '{x}}", &context);
    assert_eq!(
        run_in("{quote other} {greet bob} {brace}", &context),
        "other hello bob {x}"
    );
}

#[test]
fn nested_def_returns_its_name() {
    let context = Context::new();
    assert_eq!(run_in("{{lambda {v} v} {def y 2}}", &context), "y");
    assert_eq!(run_in("{y}", &context), "2");
}

#[test]
fn registered_handlers() {
    let context = Context::new();
    context.register(
        "echo",
        Binding::native(Strategy::Eager, |args, _| Ok(args.to_string())),
    );
    context.register(
        "braces",
        Binding::native(Strategy::Lazy, |args, _| {
            Ok(args.matches('{').count().to_string())
        }),
    );
    assert_eq!(run_in("{echo a {+ 1 1} c}", &context), "a 2 c");
    assert_eq!(run_in("{braces {+ 1 2}}", &context), "1");
    assert_eq!(run_in("{{lambda {x y} {echo y}} 1 2 3}", &context), "2 3");
}

#[test]
fn lib_lists_definitions() {
    let context = Context::new();
    run_in("{def answer 42}", &context);
    let lib = run_in("{lib}", &context);
    let names = context.eager_names();
    assert_eq!(
        lib,
        format!("DICT: [{}] [{}]", names.len(), names.join(", "))
    );
    assert!(names.contains(&"answer".to_string()));
}

#[test]
fn include_appends_pages() {
    let context = with_pages(&[("intro", "&#123;+ 2 2&#125; from intro")]);
    assert_eq!(context.render("main {include intro}").unwrap(), "main4 from intro");
}

#[test]
fn include_shares_definitions() {
    let context = with_pages(&[("defs", "{def greeting hello}")]);
    context.render("{include defs}").unwrap();
    assert_eq!(context.render("{greeting}").unwrap(), "hello");
}

#[test]
fn include_skips_repeats() {
    let context = with_pages(&[("a", "A{include a}")]);
    assert_eq!(context.render("{include a}{include a}").unwrap(), "A");
}

#[test]
fn include_reports_missing_pages() {
    let context = with_pages(&[]);
    match context.render("{include nowhere}") {
        Err(TalkError::Include { page, .. }) => assert_eq!(page, "nowhere"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn include_without_loader_is_empty() {
    assert_eq!(Context::new().render("x{include page}").unwrap(), "x");
}
