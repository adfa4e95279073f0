use std::{collections::HashMap, ops::Range};

use crate::{
    error::{TalkError, TalkResult},
    syntax::SpecialForm,
};

pub use tokens::{tokenize, Token, TokenSpan};

/// Counts of opening and closing braces in a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub left: usize,
    pub right: usize,
}

impl Balance {
    pub fn of(source: &str) -> Self {
        source.chars().fold(Self { left: 0, right: 0 }, |mut balance, c| {
            match c {
                '{' => balance.left += 1,
                '}' => balance.right += 1,
                _ => {}
            }
            balance
        })
    }

    pub fn is_balanced(&self) -> bool {
        self.left == self.right
    }

    pub fn check(self) -> TalkResult<Self> {
        if self.is_balanced() {
            Ok(self)
        } else {
            Err(TalkError::Structural {
                left: self.left,
                right: self.right,
            })
        }
    }
}

/// Located form: `span` covers the braces, `inner` the text after the keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpan {
    pub span: Range<usize>,
    pub inner: Range<usize>,
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && c != '{' && c != '}'
}

/// Trims and collapses every whitespace run into a single space.
pub fn supertrim(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte offset just past the `}` matching the `{` at `open`.
pub fn matching_close(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in s[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + offset + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Brace depth at byte offset `at`.
pub fn depth_at(s: &str, at: usize) -> usize {
    s[..at].chars().fold(0usize, |depth, c| match c {
        '{' => depth + 1,
        '}' => depth.saturating_sub(1),
        _ => depth,
    })
}

/// Finds the left-most `{keyword ...}` form.
pub fn find_form(s: &str, form: SpecialForm) -> TalkResult<Option<FormSpan>> {
    let keyword = form.keyword();
    let mut from = 0;
    while let Some(found) = s[from..].find('{') {
        let start = from + found;
        let after = &s[start + 1..];
        let rest = after.strip_prefix(keyword).filter(|rest| {
            rest.chars().next().is_some_and(|c| c.is_whitespace() || c == '}')
        });
        if let Some(rest) = rest {
            let end = matching_close(s, start)
                .ok_or_else(|| TalkError::syntax(format!("unterminated `{{{keyword}` form")))?;
            let separator = rest.chars().next().filter(|c| c.is_whitespace());
            let inner_start = s.len() - rest.len() + separator.map_or(0, char::len_utf8);
            return Ok(Some(FormSpan {
                span: start..end,
                inner: inner_start..end - 1,
            }));
        }
        from = start + 1;
    }
    Ok(None)
}

/// Finds the left-most brace group, braces included.
pub fn find_group(s: &str) -> Option<Range<usize>> {
    let start = s.find('{')?;
    matching_close(s, start).map(|end| start..end)
}

fn top_level_ranges(s: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    ranges.push(begin..i);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(i);
    }
    if let Some(begin) = start {
        ranges.push(begin..s.len());
    }
    ranges
}

/// Splits on whitespace runs that sit at brace depth zero.
pub fn split_top_level(s: &str) -> Vec<&str> {
    top_level_ranges(s)
        .into_iter()
        .map(|range| &s[range])
        .collect()
}

/// Locates the first depth-zero word equal to `word`.
pub fn find_top_level_word(s: &str, word: &str) -> Option<Range<usize>> {
    top_level_ranges(s)
        .into_iter()
        .find(|range| &s[range.clone()] == word)
}

/// Replaces whole-word occurrences of the bound names in a single scan.
pub fn substitute(body: &str, bindings: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(body.len());
    let mut word_start = None;
    for (i, c) in body.char_indices() {
        if is_word_char(c) {
            word_start.get_or_insert(i);
            continue;
        }
        if let Some(begin) = word_start.take() {
            push_word(&mut out, &body[begin..i], bindings);
        }
        out.push(c);
    }
    if let Some(begin) = word_start {
        push_word(&mut out, &body[begin..], bindings);
    }
    out
}

fn push_word(out: &mut String, word: &str, bindings: &HashMap<&str, &str>) {
    out.push_str(bindings.get(word).copied().unwrap_or(word));
}

/// The head of an application form starting at `s[0] == '{'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head<'a> {
    pub name: &'a str,
    /// Byte offset where the arguments begin.
    pub args: usize,
    /// Byte offset just past the closing brace when the form has no nested braces.
    pub leaf_end: Option<usize>,
}

pub fn head(s: &str) -> Head<'_> {
    debug_assert!(s.starts_with('{'));
    let body = &s[1..];
    let skipped = body.len() - body.trim_start().len();
    let name_start = 1 + skipped;
    let name_len = s[name_start..]
        .find(|c: char| !is_word_char(c))
        .unwrap_or(s.len() - name_start);
    let args = name_start + name_len;
    let leaf_end = s[args..]
        .find(['{', '}'])
        .filter(|&i| s[args + i..].starts_with('}'))
        .map(|i| args + i + 1);
    Head {
        name: &s[name_start..args],
        args,
        leaf_end,
    }
}

pub mod tokens {
    use std::ops::Range;

    use winnow::{
        combinator::{alt, cut_err, peek},
        token::{take_until, take_while},
        ModalResult, Parser,
    };

    use crate::{
        error::{TalkError, TalkResult},
        syntax::SpecialForm,
    };

    /// Lexical classes used for highlighting.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Token {
        Open,
        Close,
        Quote,
        Comment,
        BlockQuote,
        Keyword(SpecialForm),
        Number(f64),
        Word(String),
    }

    pub type TokenSpan = (Token, Range<usize>);

    fn whitespace(input: &mut &str) -> ModalResult<()> {
        take_while(0.., char::is_whitespace)
            .map(|_| ())
            .parse_next(input)
    }

    fn line_comment(input: &mut &str) -> ModalResult<Token> {
        (";;", take_while(0.., |c: char| c != '\n'))
            .value(Token::Comment)
            .parse_next(input)
    }

    fn block_comment(input: &mut &str) -> ModalResult<Token> {
        ("°°°", cut_err(take_until(0.., "°°°")), "°°°")
            .value(Token::Comment)
            .parse_next(input)
    }

    fn block_quote(input: &mut &str) -> ModalResult<Token> {
        ("°°", cut_err(take_until(0.., "°°")), "°°")
            .value(Token::BlockQuote)
            .parse_next(input)
    }

    fn apostrophe(input: &mut &str) -> ModalResult<Token> {
        ('\'', peek('{')).value(Token::Quote).parse_next(input)
    }

    fn word(input: &mut &str) -> ModalResult<Token> {
        take_while(1.., |c: char| {
            !c.is_whitespace() && c != '{' && c != '}'
        })
        .map(|word: &str| match word.parse::<f64>() {
            Ok(x) => Token::Number(x),
            Err(_) => Token::Word(word.to_string()),
        })
        .parse_next(input)
    }

    fn token(input: &mut &str) -> ModalResult<Token> {
        alt((
            line_comment,
            block_comment,
            block_quote,
            apostrophe,
            '{'.value(Token::Open),
            '}'.value(Token::Close),
            word,
        ))
        .parse_next(input)
    }

    /// Splits a source line into highlighted tokens. A word right after `{` that names a
    /// special form becomes a keyword.
    pub fn tokenize(source: &str) -> TalkResult<Vec<TokenSpan>> {
        let mut input = source;
        let mut tokens: Vec<TokenSpan> = Vec::new();
        loop {
            whitespace(&mut input).map_err(|_| TalkError::syntax("unreadable whitespace"))?;
            if input.is_empty() {
                return Ok(tokens);
            }
            let start = source.len() - input.len();
            let mut token = token(&mut input).map_err(|_| {
                TalkError::syntax(format!("unexpected input at byte {start}"))
            })?;
            if let Token::Word(word) = &token {
                let after_open = matches!(tokens.last(), Some((Token::Open, _)));
                if let Some(form) = SpecialForm::from_keyword(word).filter(|_| after_open) {
                    token = Token::Keyword(form);
                }
            }
            tokens.push((token, start..source.len() - input.len()));
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn kinds(source: &str) -> Vec<Token> {
            tokenize(source)
                .unwrap()
                .into_iter()
                .map(|(token, _)| token)
                .collect()
        }

        #[test]
        fn test_keywords_follow_braces() {
            assert_eq!(
                kinds("{lambda {x} lambda}"),
                vec![
                    Token::Open,
                    Token::Keyword(SpecialForm::Lambda),
                    Token::Open,
                    Token::Word("x".to_string()),
                    Token::Close,
                    Token::Word("lambda".to_string()),
                    Token::Close,
                ]
            );
        }

        #[test]
        fn test_quotes_and_comments() {
            assert_eq!(
                kinds("'{+ 1 2} ;; three"),
                vec![
                    Token::Quote,
                    Token::Open,
                    Token::Word("+".to_string()),
                    Token::Number(1.0),
                    Token::Number(2.0),
                    Token::Close,
                    Token::Comment,
                ]
            );
            assert_eq!(
                kinds("°°° gone °°° °° kept °°"),
                vec![Token::Comment, Token::BlockQuote]
            );
        }

        #[test]
        fn test_spans() {
            let tokens = tokenize("{def x 1}").unwrap();
            assert_eq!(tokens[1], (Token::Keyword(SpecialForm::Def), 1..4));
            assert_eq!(tokens[3], (Token::Number(1.0), 7..8));
        }

        #[test]
        fn test_unterminated_block_quote() {
            assert!(tokenize("°° never closed").is_err());
        }
    }
}
