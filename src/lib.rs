//! A rewriting evaluator for a brace-delimited macro language. Source text is plain
//! prose with embedded `{name args}` forms, which are replaced innermost-first by their
//! values until nothing changes.
//!
//! ```
//! use lambdatalk::{evaluate, Context};
//!
//! let context = Context::new();
//! let out = evaluate("Hello {+ 1 2}", &context).unwrap();
//! assert_eq!(out.value, "Hello 3");
//! ```

pub mod error;
pub mod functions;
pub mod interpreter;
pub mod parser;
pub mod syntax;

pub use error::{TalkError, TalkResult};
pub use interpreter::{
    evaluate, Config, Context, ContextRef, DirectoryLoader, Evaluated, Evaluation, Limits,
    PageLoader,
};
pub use parser::Balance;
pub use syntax::{Binding, Strategy};
