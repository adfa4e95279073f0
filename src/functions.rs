use std::collections::HashMap;

use itertools::Itertools;
use lazy_static::lazy_static;
use literally::hmap;

use crate::{
    error::{Args, TalkError, TalkResult},
    interpreter::Evaluation,
    syntax::{BaseFunction, Strategy},
};

pub type Primitive = (Strategy, BaseFunction);

const fn eager(function: BaseFunction) -> Primitive {
    (Strategy::Eager, function)
}

const fn lazy(function: BaseFunction) -> Primitive {
    (Strategy::Lazy, function)
}

/// Formats a number the way the language prints results: integral values without a
/// fractional part.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if x == 0.0 {
        "0".to_string()
    } else {
        x.to_string()
    }
}

fn boolean(b: bool) -> String {
    b.to_string()
}

fn numbers(args: &str) -> TalkResult<Vec<f64>> {
    args.split_whitespace()
        .map(|word| {
            word.parse::<f64>().map_err(|_| TalkError::Type {
                expected: "number",
                value: word.to_string(),
            })
        })
        .collect()
}

fn no_arguments(name: &'static str) -> TalkError {
    TalkError::Argument {
        name,
        expected: ">= 1".to_string(),
        actual: 0,
    }
}

macro_rules! fold_op {
    ( $empty:expr, $unary:expr, $f:expr ) => {
        |args: &str, _evaluation: &mut Evaluation| -> TalkResult<String> {
            let result = match numbers(args)?.as_slice() {
                [] => $empty,
                [x] => $unary(*x),
                [first, rest @ ..] => rest.iter().fold(*first, |a, b| $f(a, *b)),
            };
            Ok(format_number(result))
        }
    };
}

macro_rules! compare_op {
    ( $name:literal, $f:expr ) => {
        |args: &str, _evaluation: &mut Evaluation| -> TalkResult<String> {
            let [a, b] = numbers(args)?.take($name)?;
            Ok(boolean($f(&a, &b)))
        }
    };
}

macro_rules! unary_op {
    ( $name:literal, $f:expr ) => {
        |args: &str, _evaluation: &mut Evaluation| -> TalkResult<String> {
            let [x] = numbers(args)?.take($name)?;
            Ok(format_number($f(x)))
        }
    };
}

macro_rules! constant_op {
    ( $value:expr ) => {
        |_args: &str, _evaluation: &mut Evaluation| -> TalkResult<String> {
            Ok(format_number($value))
        }
    };
}

lazy_static! {
    pub static ref FUNCTIONS: HashMap<&'static str, Primitive> = hmap! {
        "+" => eager(fold_op!(0.0, |x: f64| x, |a: f64, b: f64| a + b)),
        "*" => eager(fold_op!(1.0, |x: f64| x, |a: f64, b: f64| a * b)),
        "-" => eager(fold_op!(
            return Err(no_arguments("-")),
            |x: f64| -x,
            |a: f64, b: f64| a - b
        )),
        "/" => eager(fold_op!(
            return Err(no_arguments("/")),
            |x: f64| 1.0 / x,
            |a: f64, b: f64| a / b
        )),
        "%" => eager(|args, _| {
            let [a, b] = numbers(args)?.take("%")?;
            Ok(format_number(a % b))
        }),
        "<" => eager(compare_op!("<", PartialOrd::lt)),
        ">" => eager(compare_op!(">", PartialOrd::gt)),
        "<=" => eager(compare_op!("<=", PartialOrd::le)),
        ">=" => eager(compare_op!(">=", PartialOrd::ge)),
        "=" => eager(compare_op!("=", |a: &f64, b: &f64| !(a < b) && !(b < a))),
        "not" => eager(|args, _| Ok(boolean(args.trim() != "true"))),
        "and" => eager(|args, _| {
            Ok(boolean(!args.split_whitespace().any(|term| term == "false")))
        }),
        "or" => eager(|args, _| Ok(boolean(args.split_whitespace().any(|term| term == "true")))),
        "abs" => eager(unary_op!("abs", f64::abs)),
        "acos" => eager(unary_op!("acos", f64::acos)),
        "asin" => eager(unary_op!("asin", f64::asin)),
        "atan" => eager(unary_op!("atan", f64::atan)),
        "ceil" => eager(unary_op!("ceil", f64::ceil)),
        "cos" => eager(unary_op!("cos", f64::cos)),
        "exp" => eager(unary_op!("exp", f64::exp)),
        "floor" => eager(unary_op!("floor", f64::floor)),
        "log" => eager(unary_op!("log", f64::ln)),
        "round" => eager(unary_op!("round", |x: f64| (x + 0.5).floor())),
        "sin" => eager(unary_op!("sin", f64::sin)),
        "sqrt" => eager(unary_op!("sqrt", f64::sqrt)),
        "tan" => eager(unary_op!("tan", f64::tan)),
        "pow" => eager(|args, _| {
            let [base, exponent] = numbers(args)?.take("pow")?;
            Ok(format_number(base.powf(exponent)))
        }),
        "min" => eager(|args, _| {
            Ok(format_number(numbers(args)?.into_iter().fold(f64::INFINITY, f64::min)))
        }),
        "max" => eager(|args, _| {
            Ok(format_number(numbers(args)?.into_iter().fold(f64::NEG_INFINITY, f64::max)))
        }),
        "random" => eager(constant_op!(rand::random::<f64>())),
        "PI" => eager(constant_op!(std::f64::consts::PI)),
        "E" => eager(constant_op!(std::f64::consts::E)),
        "date" => eager(|_, _| Ok(chrono::Local::now().format("%Y %m %d %H %M %S").to_string())),
        "lib" => eager(fn_lib),
        "include" => eager(fn_include),
        "if" => lazy(operators::op_if_primitive),
    };
}

fn fn_lib(_args: &str, evaluation: &mut Evaluation) -> TalkResult<String> {
    let names = evaluation.context().eager_names();
    Ok(format!("DICT: [{}] [{}]", names.len(), names.iter().join(", ")))
}

fn fn_include(args: &str, evaluation: &mut Evaluation) -> TalkResult<String> {
    let page = args.trim();
    if page.is_empty() || page.contains(char::is_whitespace) {
        return Err(TalkError::syntax("`include` expects a single page name"));
    }
    evaluation.context().request_include(page);
    Ok(String::new())
}

pub mod operators {
    use enum_map::{enum_map, EnumMap};
    use lazy_static::lazy_static;
    use regex::{Captures, Regex};

    use crate::{
        error::{TalkError, TalkResult},
        interpreter::Evaluation,
        parser,
        syntax::{Binding, Closure, SpecialForm},
    };

    /// Where a special form sits: directly in the document, or inside another form.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Placement {
        Statement,
        Nested,
    }

    pub type SpecialFunction = fn(&str, Placement, &mut Evaluation) -> TalkResult<String>;

    lazy_static! {
        pub static ref OPERATORS: EnumMap<SpecialForm, SpecialFunction> = enum_map! {
            SpecialForm::Macro => op_macro as SpecialFunction,
            SpecialForm::Quote => op_quote as SpecialFunction,
            SpecialForm::Let => op_let as SpecialFunction,
            SpecialForm::Lambda => op_lambda as SpecialFunction,
            SpecialForm::Def => op_def as SpecialFunction,
            SpecialForm::If => op_if as SpecialFunction,
        };
        static ref CAPTURE_REFERENCE: Regex = Regex::new(r"€(\d+)").expect("valid regex");
    }

    #[derive(Debug)]
    enum Pattern {
        Literal(String),
        Regex(Regex),
    }

    /// A rewrite rule applied once over the source after every `{macro}` is consumed.
    #[derive(Debug)]
    pub struct Macro {
        pattern: Pattern,
        template: String,
    }

    impl Macro {
        /// Compiles a pattern. `/.../` is a regular expression whose groups the template
        /// names as `€1`, `€2`, ...; anything else matches literally.
        pub fn compile(pattern: &str, template: &str) -> TalkResult<Self> {
            if pattern.is_empty() {
                return Err(TalkError::syntax("`macro` pattern is empty"));
            }
            let regex = pattern
                .strip_prefix('/')
                .and_then(|source| source.strip_suffix('/'))
                .filter(|source| !source.is_empty());
            let Some(source) = regex else {
                return Ok(Self {
                    pattern: Pattern::Literal(pattern.to_string()),
                    template: template.to_string(),
                });
            };
            let regex = Regex::new(source).map_err(|err| {
                TalkError::syntax(format!("invalid `macro` pattern `{source}`: {err}"))
            })?;
            let template = CAPTURE_REFERENCE
                .replace_all(&template.replace('$', "$$"), |caps: &Captures| {
                    format!("${{{}}}", &caps[1])
                })
                .into_owned();
            Ok(Self {
                pattern: Pattern::Regex(regex),
                template,
            })
        }

        pub fn apply(&self, s: &str) -> String {
            match &self.pattern {
                Pattern::Literal(pattern) => s.replace(pattern.as_str(), &self.template),
                Pattern::Regex(regex) => regex.replace_all(s, self.template.as_str()).into_owned(),
            }
        }
    }

    // {macro pattern to template}
    fn op_macro(inner: &str, _: Placement, evaluation: &mut Evaluation) -> TalkResult<String> {
        let to = parser::find_top_level_word(inner, "to")
            .ok_or_else(|| TalkError::syntax("`macro` expects `{macro pattern to template}`"))?;
        let pattern = parser::supertrim(&inner[..to.start]);
        let template = parser::supertrim(&inner[to.end..]);
        evaluation.register_macro(Macro::compile(&pattern, &template)?);
        Ok(String::new())
    }

    // {quote text} and '{text}
    fn op_quote(inner: &str, _: Placement, evaluation: &mut Evaluation) -> TalkResult<String> {
        Ok(evaluation.quote(inner))
    }

    // {let {{n1 v1} {n2 v2} ...} body} -> {{lambda {n1 n2 ...} body} v1 v2 ...}
    fn op_let(inner: &str, _: Placement, evaluation: &mut Evaluation) -> TalkResult<String> {
        let inner =
            evaluation.eval_specials(inner.to_string(), SpecialForm::Let, Placement::Nested)?;
        let inner = parser::supertrim(&inner);
        let group = parser::find_group(&inner)
            .filter(|group| group.start == 0)
            .ok_or_else(|| TalkError::syntax("`let` expects a list of bindings"))?;
        let body = inner[group.end..].trim();

        let mut list = &inner[group.start + 1..group.end - 1];
        let mut names = Vec::new();
        let mut values = Vec::new();
        while let Some(pair) = parser::find_group(list) {
            let text = list[pair.start + 1..pair.end - 1].trim();
            let (name, value) = text.split_once(' ').ok_or_else(|| {
                TalkError::syntax(format!("malformed `let` binding `{{{text}}}`"))
            })?;
            names.push(name);
            values.push(value.trim());
            list = &list[pair.end..];
        }

        Ok(format!(
            "{{{{lambda {{{}}} {}}} {}}}",
            names.join(" "),
            body,
            values.join(" ")
        ))
    }

    // {lambda {f1 f2 ...} body}
    fn op_lambda(inner: &str, _: Placement, evaluation: &mut Evaluation) -> TalkResult<String> {
        let inner =
            evaluation.eval_specials(inner.to_string(), SpecialForm::Lambda, Placement::Nested)?;
        let inner = inner.trim_start();
        let close = inner
            .strip_prefix('{')
            .and_then(|_| inner.find('}'))
            .filter(|&close| !inner[1..close].contains('{'))
            .ok_or_else(|| TalkError::syntax("`lambda` expects a list of formals"))?;
        let formals = inner[1..close]
            .split_whitespace()
            .map(String::from)
            .collect();
        let body = parser::supertrim(&inner[close + 1..]);
        Ok(evaluation.register_closure(Closure { formals, body }))
    }

    // {def name expression}
    fn op_def(
        inner: &str,
        placement: Placement,
        evaluation: &mut Evaluation,
    ) -> TalkResult<String> {
        let inner =
            evaluation.eval_specials(inner.to_string(), SpecialForm::Def, Placement::Nested)?;
        let inner = inner.trim();
        let (name, expression) = inner
            .split_once(char::is_whitespace)
            .map(|(name, expression)| (name, expression.trim()))
            .unwrap_or((inner, ""));
        if name.is_empty() || name.contains(['{', '}']) {
            return Err(TalkError::syntax("`def` expects a name"));
        }

        let closure = match evaluation.closure(expression) {
            Some(closure) => Ok(closure),
            None => {
                let value = evaluation.eval_forms(expression.to_string())?;
                evaluation.closure(value.trim()).ok_or(value)
            }
        };
        let binding = match closure {
            Ok(closure) => Binding::closure(evaluation.persist_closure(&closure)),
            Err(value) => Binding::constant(evaluation.persist(&value)),
        };
        tracing::trace!(name, ?binding, "def");
        evaluation.context().register(name, binding);

        Ok(match placement {
            Placement::Statement => String::new(),
            Placement::Nested => name.to_string(),
        })
    }

    // {if condition then [else]}
    fn op_if(inner: &str, _: Placement, evaluation: &mut Evaluation) -> TalkResult<String> {
        let (condition, then, otherwise) = match parser::split_top_level(inner).as_slice() {
            [condition, then] => (*condition, *then, ""),
            [condition, then, otherwise] => (*condition, *then, *otherwise),
            args => {
                return Err(TalkError::syntax(format!(
                    "`if` expects two or three arguments, got {}",
                    args.len()
                )))
            }
        };
        let condition = evaluation.eval_forms(condition.to_string())?;
        Ok(if condition.trim() == "true" { then } else { otherwise }.to_string())
    }

    pub fn op_if_primitive(args: &str, evaluation: &mut Evaluation) -> TalkResult<String> {
        op_if(args, Placement::Nested, evaluation)
    }

}
