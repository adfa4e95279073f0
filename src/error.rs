use thiserror::Error;

pub type TalkResult<T> = Result<T, TalkError>;

#[derive(Error, Debug)]
pub enum TalkError {
    #[error("structural error: improper balancing, {left} `{{` against {right} `}}`")]
    Structural { left: usize, right: usize },
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("name error: `{0}` is not defined")]
    UndefinedSymbol(String),
    #[error("resource error: {resource} limit of {limit} exceeded")]
    ResourceExceeded { resource: &'static str, limit: usize },
    #[error("type error: expected {expected}, got `{value}`")]
    Type {
        expected: &'static str,
        value: String,
    },
    #[error("argument error: `{name}` expected {expected} arguments but was given {actual}")]
    Argument {
        name: &'static str,
        expected: String,
        actual: usize,
    },
    #[error("include error: could not load page `{page}`")]
    Include {
        page: String,
        #[source]
        source: std::io::Error,
    },
}

impl TalkError {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }
}

/// Fixed-arity destructuring for argument lists.
pub trait Args<T> {
    fn take<const N: usize>(self, name: &'static str) -> TalkResult<[T; N]>;
}

impl<T> Args<T> for Vec<T> {
    fn take<const N: usize>(self, name: &'static str) -> TalkResult<[T; N]> {
        self.try_into().map_err(|args: Vec<T>| TalkError::Argument {
            name,
            expected: N.to_string(),
            actual: args.len(),
        })
    }
}

#[test]
fn test_take_reports_arity() {
    let [a, b] = vec![1, 2].take("pair").unwrap();
    assert_eq!((a, b), (1, 2));

    match vec![1, 2, 3].take::<2>("pair") {
        Err(TalkError::Argument {
            name,
            expected,
            actual,
        }) => {
            assert_eq!(name, "pair");
            assert_eq!(expected, "2");
            assert_eq!(actual, 3);
        }
        other => panic!("unexpected {other:?}"),
    }
}
