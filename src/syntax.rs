use std::{fmt::Display, rc::Rc};

use derivative::Derivative;
use enum_map::{Enum, EnumMap};
use itertools::Itertools;

use crate::{error::TalkResult, interpreter::Evaluation};

/// Handler signature shared by primitives and user-registered functions. The handler
/// receives the argument text of its form and returns the replacement text.
pub type Function = dyn Fn(&str, &mut Evaluation) -> TalkResult<String>;
pub type BaseFunction = fn(&str, &mut Evaluation) -> TalkResult<String>;

pub const LAMBDA_PREFIX: &str = "_LAMB_";
pub const QUOTE_PREFIX: &str = "_QUOT_";
pub const MACRO_PREFIX: &str = "_MACR_";

/// Closures and quotes kept by `def` beyond their own call live in the context under these.
pub const SAVED_LAMBDA_PREFIX: &str = "_LAMB_S";
pub const SAVED_QUOTE_PREFIX: &str = "_QUOT_S";

/// Ends every quote placeholder, so text written right after a quote stays separate.
pub const PLACEHOLDER_END: char = '_';

/// Marks a quote that came from the `'{...}` shorthand.
pub const APOSTROPHE_SENTINEL: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum SpecialForm {
    Macro,
    Quote,
    Let,
    Lambda,
    Def,
    If,
}

impl SpecialForm {
    pub const TEXT: EnumMap<Self, &'static str> =
        EnumMap::from_array(["macro", "quote", "let", "lambda", "def", "if"]);

    pub fn keyword(self) -> &'static str {
        Self::TEXT[self]
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::TEXT
            .iter()
            .find(|(_, text)| **text == word)
            .map(|(form, _)| form)
    }
}

impl Display for SpecialForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// Whether a handler sees its arguments reduced to a fixed point (eager) or as raw text
/// (lazy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Eager,
    Lazy,
}

/// A user lambda: ordered formals and an unevaluated body template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    pub formals: Vec<String>,
    pub body: String,
}

impl Display for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{lambda {{{}}} {}}}", self.formals.iter().join(" "), self.body)
    }
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub enum Handler {
    Primitive(#[derivative(Debug = "ignore")] BaseFunction),
    Native(#[derivative(Debug = "ignore")] Rc<Function>),
    Closure(Rc<Closure>),
    Constant(Rc<str>),
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub strategy: Strategy,
    pub handler: Handler,
}

impl Binding {
    pub fn primitive(strategy: Strategy, function: BaseFunction) -> Self {
        Self {
            strategy,
            handler: Handler::Primitive(function),
        }
    }

    pub fn native(
        strategy: Strategy,
        function: impl Fn(&str, &mut Evaluation) -> TalkResult<String> + 'static,
    ) -> Self {
        Self {
            strategy,
            handler: Handler::Native(Rc::new(function)),
        }
    }

    pub fn closure(closure: Rc<Closure>) -> Self {
        Self {
            strategy: Strategy::Eager,
            handler: Handler::Closure(closure),
        }
    }

    pub fn constant(value: impl Into<Rc<str>>) -> Self {
        Self {
            strategy: Strategy::Eager,
            handler: Handler::Constant(value.into()),
        }
    }

    pub fn is_lazy(&self) -> bool {
        self.strategy == Strategy::Lazy
    }
}

pub fn is_synthetic_closure(name: &str) -> bool {
    name.strip_prefix(LAMBDA_PREFIX)
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

#[test]
fn test_keywords() {
    assert_eq!(SpecialForm::from_keyword("lambda"), Some(SpecialForm::Lambda));
    assert_eq!(SpecialForm::from_keyword("iff"), None);
    assert_eq!(SpecialForm::If.to_string(), "if");
}

#[test]
fn test_synthetic_names() {
    assert!(is_synthetic_closure("_LAMB_0"));
    assert!(is_synthetic_closure("_LAMB_42"));
    assert!(!is_synthetic_closure("_LAMB_"));
    assert!(!is_synthetic_closure("_LAMB_x"));
    assert!(!is_synthetic_closure("_LAMB_S0"));
    assert!(!is_synthetic_closure("lambda"));
}

#[test]
fn test_closure_display() {
    let closure = Closure {
        formals: vec!["x".to_string(), "y".to_string()],
        body: "{+ x y}".to_string(),
    };
    assert_eq!(closure.to_string(), "{lambda {x y} {+ x y}}");
}
