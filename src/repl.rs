use std::borrow::Cow;

use anyhow::Result;
use colored::{ColoredString, Colorize};
use lambdatalk::{
    parser::{tokenize, Balance, Token, TokenSpan},
    ContextRef,
};
use rustyline::{
    error::ReadlineError,
    highlight::Highlighter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Completer, Editor, Helper, Hinter,
};
use tracing::debug;

pub type Repl = Editor<TalkHelper, DefaultHistory>;

#[derive(Helper, Completer, Hinter)]
pub struct TalkHelper;

impl Highlighter for TalkHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match tokenize(line) {
            Ok(tokens) => Cow::Owned(highlight_tokens(&tokens, line)),
            Err(_) => Cow::Borrowed(line),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

// Keeps reading lines while a form is still open.
impl Validator for TalkHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let balance = Balance::of(ctx.input());
        Ok(if balance.left > balance.right {
            ValidationResult::Incomplete
        } else {
            ValidationResult::Valid(None)
        })
    }
}

fn highlight_tokens(tokens: &[TokenSpan], s: &str) -> String {
    let mut next_start = 0;
    let mut highlighted = String::new();
    for (token, span) in tokens {
        if next_start < span.start {
            highlighted.push_str(&s[next_start..span.start]);
        }
        highlighted.push_str(&highlight_token(token, &s[span.clone()]).to_string());
        next_start = span.end;
    }
    if next_start < s.len() {
        highlighted.push_str(&s[next_start..]);
    }
    highlighted
}

fn highlight_token(token: &Token, s: &str) -> ColoredString {
    match token {
        Token::Open | Token::Close => s.dimmed(),
        Token::Quote => s.bright_blue(),
        Token::Keyword(_) => s.magenta(),
        Token::Number(_) => s.yellow(),
        Token::Comment | Token::BlockQuote => s.green(),
        Token::Word(_) => s.normal(),
    }
}

/// Reads entries until end of input, rendering each against `context`.
pub fn run(context: ContextRef) -> Result<()> {
    let mut repl = Repl::new()?;
    repl.set_helper(Some(TalkHelper));

    loop {
        let input = match repl.readline("> ") {
            Ok(input) => input,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if input.trim().is_empty() {
            continue;
        }
        repl.add_history_entry(input.as_str())?;

        let source = match input.trim() {
            ":lib" => "{lib}",
            _ => input.as_str(),
        };
        debug!(source, "evaluating entry");
        match context.render(source) {
            Ok(output) => println!("{output}"),
            Err(err) => println!("{}", err.to_string().red()),
        }
    }

    Ok(())
}

#[test]
fn test_highlight_keeps_text() {
    colored::control::set_override(false);
    let line = "{def x 1} ;; note";
    let tokens = tokenize(line).unwrap();
    assert_eq!(highlight_tokens(&tokens, line), line);
}
