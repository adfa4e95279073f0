use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    path::PathBuf,
    rc::Rc,
};

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::{debug, trace, warn};

use crate::{
    error::{TalkError, TalkResult},
    functions::{
        operators::{Macro, Placement, OPERATORS},
        FUNCTIONS,
    },
    parser::{self, Balance},
    syntax::{
        is_synthetic_closure, Binding, Closure, Handler, SpecialForm, Strategy,
        APOSTROPHE_SENTINEL, LAMBDA_PREFIX, MACRO_PREFIX, PLACEHOLDER_END, QUOTE_PREFIX,
        SAVED_LAMBDA_PREFIX, SAVED_QUOTE_PREFIX,
    },
};

lazy_static! {
    static ref BLOCK_COMMENT: Regex = Regex::new(r"(?s)°°°.*?°°°").expect("valid regex");
    static ref LINE_COMMENT: Regex = Regex::new(r";;[^\n]*").expect("valid regex");
    static ref BLOCK_QUOTE: Regex = Regex::new(r"(?s)°°(.*?)°°").expect("valid regex");
    static ref QUOTE_PLACEHOLDER: Regex = Regex::new(r"_QUOT_(S?)(\d+)_").expect("valid regex");
    static ref LAMBDA_REFERENCE: Regex = Regex::new(r"_LAMB_\d+").expect("valid regex");
    static ref ENTITY: Regex = Regex::new(r"&#(\d+);").expect("valid regex");
}

/// Budgets applied to every fixed-point loop of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Loop iterations plus handler dispatches.
    pub max_steps: usize,
    /// Nesting of handler invocations.
    pub max_depth: usize,
}

impl Limits {
    pub const DEFAULT_MAX_STEPS: usize = 100_000;
    pub const DEFAULT_MAX_DEPTH: usize = 256;
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_steps: Self::DEFAULT_MAX_STEPS,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub limits: Limits,
    /// Directory searched by `{include name}` for `name.txt`.
    pub pages: Option<PathBuf>,
}

/// Source of pages for `{include name}`.
pub trait PageLoader {
    fn load(&self, page: &str) -> std::io::Result<String>;
}

pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PageLoader for DirectoryLoader {
    fn load(&self, page: &str) -> std::io::Result<String> {
        if page.contains(['/', '\\']) || page.starts_with('.') {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "page names may not contain path components",
            ));
        }
        std::fs::read_to_string(self.root.join(format!("{page}.txt")))
    }
}

pub type ContextRef = Rc<Context>;

/// The persistent environment: user bindings layered over the shared primitive library.
/// Bindings made by one evaluation stay visible to later evaluations on the same context.
pub struct Context {
    names: RefCell<HashMap<String, Binding>>,
    limits: Limits,
    loader: Option<Box<dyn PageLoader>>,
    pending: RefCell<Vec<String>>,
    saved: RefCell<Saved>,
}

/// Closures and quotes that a persisted definition refers to.
#[derive(Debug, Default)]
struct Saved {
    closures: Vec<Rc<Closure>>,
    quotes: Vec<String>,
}

impl Context {
    pub fn new() -> ContextRef {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> ContextRef {
        let loader = config
            .pages
            .map(|root| Box::new(DirectoryLoader::new(root)) as Box<dyn PageLoader>);
        Self::with_loader(config.limits, loader)
    }

    pub fn with_loader(limits: Limits, loader: Option<Box<dyn PageLoader>>) -> ContextRef {
        Rc::new(Self {
            names: RefCell::new(HashMap::new()),
            limits,
            loader,
            pending: RefCell::new(Vec::new()),
            saved: RefCell::new(Saved::default()),
        })
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn get(&self, name: &str) -> Option<Binding> {
        self.names.borrow().get(name).cloned().or_else(|| {
            FUNCTIONS
                .get(name)
                .map(|&(strategy, function)| Binding::primitive(strategy, function))
        })
    }

    /// Adds or overwrites a binding. Primitives may be shadowed.
    pub fn register(&self, name: impl Into<String>, binding: Binding) {
        self.names.borrow_mut().insert(name.into(), binding);
    }

    /// Names of every eager binding, synthetic closures excluded, sorted.
    pub fn eager_names(&self) -> Vec<String> {
        let names = self.names.borrow();
        let user = names
            .iter()
            .filter(|(_, binding)| !binding.is_lazy())
            .map(|(name, _)| name.clone());
        let primitives = FUNCTIONS
            .iter()
            .filter(|(_, (strategy, _))| *strategy == Strategy::Eager)
            .map(|(name, _)| name.to_string());
        user.chain(primitives)
            .filter(|name| !is_synthetic_closure(name))
            .sorted()
            .dedup()
            .collect()
    }

    fn save_closure(&self, closure: Closure) -> String {
        let mut saved = self.saved.borrow_mut();
        let name = format!("{SAVED_LAMBDA_PREFIX}{}", saved.closures.len());
        trace!(%name, %closure, "saved closure");
        saved.closures.push(Rc::new(closure));
        name
    }

    fn saved_closure(&self, index: usize) -> Option<Rc<Closure>> {
        self.saved.borrow().closures.get(index).cloned()
    }

    fn save_quote(&self, text: String) -> String {
        let mut saved = self.saved.borrow_mut();
        let name = format!("{SAVED_QUOTE_PREFIX}{}{PLACEHOLDER_END}", saved.quotes.len());
        saved.quotes.push(text);
        name
    }

    fn saved_quote(&self, index: usize) -> Option<String> {
        self.saved.borrow().quotes.get(index).cloned()
    }

    /// Queues a page for [`Context::render`]. Returns false when no loader is installed.
    pub(crate) fn request_include(&self, page: &str) -> bool {
        if self.loader.is_none() {
            debug!(page, "no page loader installed, include ignored");
            return false;
        }
        self.pending.borrow_mut().push(page.to_string());
        true
    }

    /// Evaluates `source`, then appends the evaluation of every page it included.
    pub fn render(self: &ContextRef, source: &str) -> TalkResult<String> {
        self.pending.borrow_mut().clear();
        let mut output = evaluate(source, self)?.value;
        let mut included = HashSet::new();
        loop {
            let pending = std::mem::take(&mut *self.pending.borrow_mut());
            if pending.is_empty() {
                return Ok(output);
            }
            for page in pending {
                if !included.insert(page.clone()) {
                    warn!(%page, "page already included, skipping");
                    continue;
                }
                let Some(loader) = &self.loader else {
                    continue;
                };
                let text = loader
                    .load(&page)
                    .map_err(|source| TalkError::Include {
                        page: page.clone(),
                        source,
                    })?;
                debug!(%page, "including page");
                output.push_str(&evaluate(&decode_entities(&text), self)?.value);
            }
        }
    }
}

/// Replaces numeric entities such as `&#123;` with their characters.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluated {
    pub value: String,
    pub balance: Balance,
}

/// Rewrites `input` to a fixed point. Braces must balance before anything runs.
pub fn evaluate(input: &str, context: &ContextRef) -> TalkResult<Evaluated> {
    let balance = Balance::of(input).check()?;
    let value = Evaluation::new(context.clone()).run(input)?;
    Ok(Evaluated { value, balance })
}

/// State private to one `evaluate` call. Synthetic names index the arenas below, so they
/// restart at zero on every call and disappear with it.
pub struct Evaluation {
    context: ContextRef,
    closures: Vec<Rc<Closure>>,
    quotes: Vec<String>,
    macros: Vec<Macro>,
    steps: usize,
    depth: usize,
}

impl Evaluation {
    fn new(context: ContextRef) -> Self {
        Self {
            context,
            closures: Vec::new(),
            quotes: Vec::new(),
            macros: Vec::new(),
            steps: 0,
            depth: 0,
        }
    }

    pub fn context(&self) -> &ContextRef {
        &self.context
    }

    fn run(&mut self, input: &str) -> TalkResult<String> {
        let s = self.preprocess(input);
        let s = self.eval_macros(s)?;
        let mut s = s;
        for form in [
            SpecialForm::Quote,
            SpecialForm::Let,
            SpecialForm::Lambda,
            SpecialForm::Def,
        ] {
            s = self.eval_specials(s, form, Placement::Statement)?;
            debug!(%form, steps = self.steps, "special form pass complete");
        }
        let s = self.eval_forms(s)?;
        debug!(
            steps = self.steps,
            closures = self.closures.len(),
            quotes = self.quotes.len(),
            "evaluation complete"
        );
        Ok(self.postprocess(s))
    }

    fn tick(&mut self) -> TalkResult<()> {
        self.steps += 1;
        let limit = self.context.limits.max_steps;
        if self.steps > limit {
            warn!(limit, "step budget exhausted");
            return Err(TalkError::ResourceExceeded {
                resource: "step",
                limit,
            });
        }
        Ok(())
    }

    fn preprocess(&mut self, input: &str) -> String {
        let s = BLOCK_COMMENT.replace_all(input.trim(), "");
        let s = LINE_COMMENT.replace_all(&s, "");
        let s = BLOCK_QUOTE
            .replace_all(&s, |caps: &Captures| self.quote(&caps[1]))
            .into_owned();
        s.replace("'{", &format!("{{quote {APOSTROPHE_SENTINEL}"))
    }

    fn postprocess(&self, mut s: String) -> String {
        let nesting = self.quotes.len() + self.context.saved.borrow().quotes.len();
        for _ in 0..=nesting {
            if !QUOTE_PLACEHOLDER.is_match(&s) {
                break;
            }
            s = QUOTE_PLACEHOLDER
                .replace_all(&s, |caps: &Captures| self.unquote(caps))
                .into_owned();
        }
        s.trim().to_string()
    }

    fn unquote(&self, caps: &Captures) -> String {
        let index = caps[2].parse::<usize>().ok();
        let text = match &caps[1] {
            "S" => index.and_then(|i| self.context.saved_quote(i)),
            _ => index.and_then(|i| self.quotes.get(i).cloned()),
        };
        match text {
            Some(text) => match text.strip_prefix(APOSTROPHE_SENTINEL) {
                Some(form) => format!("{{{form}}}"),
                None => text,
            },
            None => caps[0].to_string(),
        }
    }

    fn eval_macros(&mut self, s: String) -> TalkResult<String> {
        let mut s = self.eval_specials(s, SpecialForm::Macro, Placement::Statement)?;
        for (index, rule) in self.macros.iter().enumerate() {
            trace!(name = %format!("{MACRO_PREFIX}{index}"), "applying macro");
            s = rule.apply(&s);
        }
        Ok(s)
    }

    /// Consumes every `{form ...}` in `s`, left-most outermost first, until none remain.
    pub(crate) fn eval_specials(
        &mut self,
        mut s: String,
        form: SpecialForm,
        placement: Placement,
    ) -> TalkResult<String> {
        while let Some(found) = parser::find_form(&s, form)? {
            self.tick()?;
            let placement = match placement {
                Placement::Statement if parser::depth_at(&s, found.span.start) == 0 => {
                    Placement::Statement
                }
                _ => Placement::Nested,
            };
            let inner = s[found.inner].to_string();
            let replacement = OPERATORS[form](&inner, placement, self)?;
            s.replace_range(found.span, &replacement);
        }
        Ok(s)
    }

    /// Rewrites innermost applications until a pass changes nothing.
    pub(crate) fn eval_forms(&mut self, mut s: String) -> TalkResult<String> {
        loop {
            self.tick()?;
            let next = self.rewrite_pass(&s)?;
            if next == s {
                return Ok(s);
            }
            s = next;
        }
    }

    fn rewrite_pass(&mut self, s: &str) -> TalkResult<String> {
        let mut out = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            rest = &rest[open..];
            match self.application(rest)? {
                Some((consumed, value)) => {
                    out.push_str(&value);
                    rest = &rest[consumed..];
                }
                None => {
                    out.push('{');
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Dispatches the form at the start of `form` if it is ready: a lazy binding is
    /// applied to its raw outermost span, anything else only once it has no nested forms.
    fn application(&mut self, form: &str) -> TalkResult<Option<(usize, String)>> {
        let head = parser::head(form);
        let binding = self.resolve(head.name);
        if let Some(binding) = binding.as_ref().filter(|binding| binding.is_lazy()) {
            let end = parser::matching_close(form, 0).ok_or_else(|| {
                TalkError::syntax(format!("unterminated `{{{}` form", head.name))
            })?;
            let args = form[head.args..end - 1].trim();
            return self
                .apply(head.name, binding.clone(), args)
                .map(|value| Some((end, value)));
        }
        let Some(end) = head.leaf_end else {
            return Ok(None);
        };
        let args = form[head.args..end - 1].trim();
        match binding {
            Some(binding) => self
                .apply(head.name, binding, args)
                .map(|value| Some((end, value))),
            None => Err(TalkError::UndefinedSymbol(head.name.to_string())),
        }
    }

    /// Looks `name` up in this call's closures, then in the context.
    pub fn resolve(&self, name: &str) -> Option<Binding> {
        self.closure(name)
            .map(Binding::closure)
            .or_else(|| self.context.get(name))
    }

    pub fn closure(&self, name: &str) -> Option<Rc<Closure>> {
        if let Some(index) = name.strip_prefix(SAVED_LAMBDA_PREFIX) {
            return index
                .parse::<usize>()
                .ok()
                .and_then(|index| self.context.saved_closure(index));
        }
        if !is_synthetic_closure(name) {
            return None;
        }
        name.strip_prefix(LAMBDA_PREFIX)?
            .parse::<usize>()
            .ok()
            .and_then(|index| self.closures.get(index).cloned())
    }

    pub fn apply(&mut self, name: &str, binding: Binding, args: &str) -> TalkResult<String> {
        self.tick()?;
        let limit = self.context.limits.max_depth;
        if self.depth >= limit {
            warn!(name, limit, "depth budget exhausted");
            return Err(TalkError::ResourceExceeded {
                resource: "depth",
                limit,
            });
        }
        trace!(name, args, depth = self.depth, "apply");
        self.depth += 1;
        let result = match binding.handler {
            Handler::Primitive(function) => function(args, self),
            Handler::Native(function) => function(args, self),
            Handler::Closure(closure) => self.invoke(&closure, args),
            Handler::Constant(value) => Ok(value.to_string()),
        };
        self.depth -= 1;
        result
    }

    /// Binds actuals to formals by count: a short list curries, an exact list
    /// substitutes one to one, a long list folds the surplus into the last formal.
    fn invoke(&mut self, closure: &Closure, args: &str) -> TalkResult<String> {
        let values = args.split_whitespace().collect::<Vec<_>>();
        let formals = &closure.formals;
        let tail;
        let actuals = if values.len() > formals.len() && !formals.is_empty() {
            let split = formals.len() - 1;
            tail = values[split..].join(" ");
            values[..split]
                .iter()
                .copied()
                .chain(std::iter::once(tail.as_str()))
                .collect()
        } else {
            values
        };
        let bindings = formals
            .iter()
            .map(String::as_str)
            .zip(actuals.iter().copied())
            .collect::<HashMap<_, _>>();
        let body = parser::substitute(&closure.body, &bindings);

        if actuals.len() < formals.len() {
            let rest = formals[actuals.len()..].to_vec();
            return Ok(self.register_closure(Closure {
                formals: rest,
                body,
            }));
        }

        let body = self.eval_specials(body, SpecialForm::If, Placement::Nested)?;
        self.eval_forms(body)
    }

    pub(crate) fn register_closure(&mut self, closure: Closure) -> String {
        let name = format!("{LAMBDA_PREFIX}{}", self.closures.len());
        trace!(%name, %closure, "registered closure");
        self.closures.push(Rc::new(closure));
        name
    }

    /// Stores `text` verbatim and returns its placeholder.
    pub(crate) fn quote(&mut self, text: &str) -> String {
        let name = format!("{QUOTE_PREFIX}{}{PLACEHOLDER_END}", self.quotes.len());
        self.quotes.push(text.to_string());
        name
    }

    pub(crate) fn register_macro(&mut self, rule: Macro) -> String {
        let name = format!("{MACRO_PREFIX}{}", self.macros.len());
        trace!(%name, ?rule, "registered macro");
        self.macros.push(rule);
        name
    }

    /// Rewrites `text` so it no longer depends on this call: every closure and quote it
    /// names is copied into the context, following closure bodies transitively.
    pub(crate) fn persist(&self, text: &str) -> String {
        self.persist_with(text, &mut HashMap::new())
    }

    /// Copy of `closure` whose body survives the end of this call.
    pub(crate) fn persist_closure(&self, closure: &Closure) -> Rc<Closure> {
        Rc::new(Closure {
            formals: closure.formals.clone(),
            body: self.persist(&closure.body),
        })
    }

    fn persist_with(&self, text: &str, renamed: &mut HashMap<String, String>) -> String {
        let text = LAMBDA_REFERENCE.replace_all(text, |caps: &Captures| {
            let name = &caps[0];
            if let Some(saved) = renamed.get(name) {
                return saved.clone();
            }
            let Some(closure) = self.closure(name) else {
                return name.to_string();
            };
            let body = self.persist_with(&closure.body, renamed);
            let saved = self.context.save_closure(Closure {
                formals: closure.formals.clone(),
                body,
            });
            renamed.insert(name.to_string(), saved.clone());
            saved
        });
        QUOTE_PLACEHOLDER
            .replace_all(&text, |caps: &Captures| {
                let name = &caps[0];
                if &caps[1] == "S" {
                    return name.to_string();
                }
                if let Some(saved) = renamed.get(name) {
                    return saved.clone();
                }
                let Some(quote) = caps[2]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.quotes.get(index))
                else {
                    return name.to_string();
                };
                let quote = self.persist_with(quote, renamed);
                let saved = self.context.save_quote(quote);
                renamed.insert(name.to_string(), saved.clone());
                saved
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(source: &str) -> String {
        evaluate(source, &Context::new()).unwrap().value
    }

    #[test]
    fn test_preprocess_comments_and_quotes() {
        let mut evaluation = Evaluation::new(Context::new());
        let s = evaluation.preprocess("a ;; gone\n°°° also gone °°° °° {kept} °° '{x}");
        assert_eq!(s, "a \n _QUOT_0_ {quote _x}");
        assert_eq!(evaluation.quotes, vec![" {kept} ".to_string()]);
    }

    #[test]
    fn test_postprocess_restores_nested_placeholders() {
        let mut evaluation = Evaluation::new(Context::new());
        let inner = evaluation.quote("{b}");
        let outer = evaluation.quote(&format!("_a {inner}"));
        assert_eq!(evaluation.postprocess(format!(" {outer} ")), "{a {b}}");
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        let evaluation = Evaluation::new(Context::new());
        assert_eq!(evaluation.postprocess("_QUOT_7_".to_string()), "_QUOT_7_");
    }

    #[test]
    fn test_closure_arena_is_per_call() {
        let context = Context::new();
        assert_eq!(evaluate("{lambda {x} x}", &context).unwrap().value, "_LAMB_0");
        assert_eq!(evaluate("{lambda {y} y}", &context).unwrap().value, "_LAMB_0");
        assert!(matches!(
            evaluate("{_LAMB_0 1}", &context),
            Err(TalkError::UndefinedSymbol(name)) if name == "_LAMB_0"
        ));
    }

    #[test]
    fn test_partial_application_registers_new_closure() {
        let context = Context::new();
        let mut evaluation = Evaluation::new(context);
        let name = evaluation.register_closure(Closure {
            formals: vec!["x".to_string(), "y".to_string()],
            body: "{+ x y}".to_string(),
        });
        let binding = evaluation.resolve(&name).unwrap();
        let curried = evaluation.apply(&name, binding, "3").unwrap();
        assert_eq!(curried, "_LAMB_1");
        let closure = evaluation.closure(&curried).unwrap();
        assert_eq!(closure.formals, vec!["y".to_string()]);
        assert_eq!(closure.body, "{+ 3 y}");
    }

    #[test]
    fn test_stored_template_is_immutable() {
        let context = Context::new();
        let mut evaluation = Evaluation::new(context);
        let name = evaluation.register_closure(Closure {
            formals: vec!["x".to_string()],
            body: "{* x x}".to_string(),
        });
        for (arg, expected) in [("3", "9"), ("4", "16")] {
            let binding = evaluation.resolve(&name).unwrap();
            assert_eq!(evaluation.apply(&name, binding, arg).unwrap(), expected);
        }
        assert_eq!(evaluation.closure(&name).unwrap().body, "{* x x}");
    }

    #[test]
    fn test_nullary_closure_ignores_surplus() {
        assert_eq!(run("{{lambda {} 5} 1 2}"), "5");
    }

    #[test]
    fn test_lazy_if_outside_lambdas() {
        assert_eq!(run("{if {< 1 2} yes {undefined-thing}}"), "yes");
        assert_eq!(run("{+ 1 {if false {boom} 2}}"), "3");
    }

    #[test]
    fn test_def_placement() {
        let context = Context::new();
        assert_eq!(evaluate("{def x 3}", &context).unwrap().value, "");
        assert_eq!(
            evaluate("{{def sq {lambda {x} {* x x}}} 4}", &context)
                .unwrap()
                .value,
            "16"
        );
        assert_eq!(evaluate("{sq 5} {x}", &context).unwrap().value, "25 3");
    }

    #[test]
    fn test_step_budget() {
        let context = Context::with_loader(
            Limits {
                max_steps: 50,
                max_depth: 10,
            },
            None,
        );
        context.register(
            "grow",
            Binding::primitive(Strategy::Eager, |_, _| Ok("a{grow}".to_string())),
        );
        assert!(matches!(
            evaluate("{grow}", &context),
            Err(TalkError::ResourceExceeded {
                resource: "step",
                limit: 50
            })
        ));
    }

    #[test]
    fn test_persist_copies_referenced_closures() {
        let context = Context::new();
        let mut evaluation = Evaluation::new(context.clone());
        let inner = evaluation.register_closure(Closure {
            formals: vec!["y".to_string()],
            body: "{* y y}".to_string(),
        });
        let quote = evaluation.quote("text");
        let outer = evaluation.register_closure(Closure {
            formals: vec!["x".to_string()],
            body: format!("{{{inner} x}} {quote} {{{inner} 2}}"),
        });
        let closure = evaluation.closure(&outer).unwrap();
        let kept = evaluation.persist_closure(&closure);
        assert_eq!(kept.body, "{_LAMB_S0 x} _QUOT_S0_ {_LAMB_S0 2}");

        let later = Evaluation::new(context);
        assert_eq!(later.closure("_LAMB_S0").unwrap().body, "{* y y}");
        assert_eq!(later.postprocess(kept.body.clone()), "{_LAMB_S0 x} text {_LAMB_S0 2}");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("&#123;+ 1 2&#125; &#x;"), "{+ 1 2} &#x;");
    }

    #[test]
    fn test_eager_names() {
        let context = Context::new();
        context.register("zeta", Binding::constant("1"));
        context.register("_LAMB_3", Binding::constant("1"));
        let names = context.eager_names();
        assert!(names.contains(&"zeta".to_string()));
        assert!(names.contains(&"lib".to_string()));
        assert!(!names.contains(&"if".to_string()));
        assert!(!names.contains(&"_LAMB_3".to_string()));
        assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
