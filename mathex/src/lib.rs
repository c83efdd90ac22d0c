//! Embeddable arithmetic expression evaluator.
//!
//! Expressions are evaluated against a [`Config`] holding caller-supplied
//! variables, constants and functions, and a set of [`Flags`] selecting the
//! accepted grammar. Evaluation is a single scan that converts the infix
//! input to reverse Polish notation, followed by a stack-based execution.
//!
//! ```
//! use mathex::{Config, Error, Flags};
//!
//! let mut config = Config::new(Flags::DEFAULT | Flags::EXPONENTIATION);
//! config.add_constant("pi", 3.14).unwrap();
//! config
//!     .add_function("half", |args| match args {
//!         [x] => Ok(x / 2.0),
//!         _ => Err(Error::IncorrectArgsNum),
//!     })
//!     .unwrap();
//!
//! assert_eq!(config.evaluate("half(2 ^ 4) + 2"), Ok(10.0));
//! assert_eq!(config.evaluate("half()"), Err(Error::IncorrectArgsNum));
//! ```

pub mod builtins;
pub mod config;
pub mod error;
pub mod ffi;
pub mod flags;
pub mod rpn_converter;
pub mod rpn_evaluator;
pub mod token;
pub mod tokenizer;

pub use config::Config;
pub use error::Error;
pub use flags::Flags;
pub use rpn_converter::RPNExpr;
pub use token::{Function, Token, TokenKind, Variable};

/// Evaluates `expression` against the symbols and flags of `config`.
pub fn evaluate(expression: &str, config: &Config) -> Result<f64, Error> {
    config.evaluate(expression)
}
