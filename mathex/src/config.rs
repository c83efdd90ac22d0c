use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::Error;
use crate::flags::Flags;
use crate::rpn_converter::{RPNExpr, RpnConverter};
use crate::token::{Function, Token, Variable};

/// Returns true if `name` may be stored in a [`Config`].
///
/// A valid name is non-empty, does not start with a digit and consists only of
/// ASCII letters, digits and underscores.
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        Some(first) if !first.is_ascii_digit() => bytes
            .iter()
            .all(|byte| byte.is_ascii_alphanumeric() || *byte == b'_'),
        _ => false,
    }
}

/// The symbol table consulted by the evaluator, together with the grammar
/// flags that are currently enabled.
///
/// Only variables, constants and functions are stored. The table is meant to
/// be long-lived: populate it once, then evaluate any number of expressions.
#[derive(Default)]
pub struct Config {
    tokens: HashMap<String, Token>,
    flags: Flags,
}

impl Config {
    pub fn new(flags: Flags) -> Self {
        Self {
            tokens: HashMap::new(),
            flags,
        }
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    /// Returns true if every flag in `flag` is enabled.
    pub fn read_flag(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }

    /// Binds `name` to caller-owned storage.
    ///
    /// The accessor is called each time an expression referencing `name` is
    /// executed, so the evaluation always sees the current value.
    ///
    /// ```
    /// use std::{cell::Cell, rc::Rc};
    ///
    /// let x = Rc::new(Cell::new(5.0));
    /// let mut config = mathex::Config::default();
    /// config.add_variable("x", {
    ///     let x = Rc::clone(&x);
    ///     move || x.get()
    /// }).unwrap();
    ///
    /// assert_eq!(config.evaluate("x + 1"), Ok(6.0));
    /// x.set(10.0);
    /// assert_eq!(config.evaluate("x + 1"), Ok(11.0));
    /// ```
    pub fn add_variable(
        &mut self,
        name: &str,
        accessor: impl Fn() -> f64 + 'static,
    ) -> Result<(), Error> {
        self.insert(name, Token::Variable(Variable::new(accessor)))
    }

    pub fn add_constant(&mut self, name: &str, value: f64) -> Result<(), Error> {
        self.insert(name, Token::Constant(value))
    }

    /// Adds a function callable as `name(arg, ...)`.
    ///
    /// The function receives its arguments in call order and must check the
    /// argument count itself, typically returning [`Error::IncorrectArgsNum`].
    pub fn add_function(
        &mut self,
        name: &str,
        function: impl Fn(&[f64]) -> Result<f64, Error> + 'static,
    ) -> Result<(), Error> {
        self.insert(name, Token::Function(Function::new(function)))
    }

    /// Removes a symbol, returning [`Error::Undefined`] if it does not exist.
    pub fn remove(&mut self, name: &str) -> Result<(), Error> {
        match self.tokens.remove(name) {
            Some(_) => {
                tracing::debug!(name, "symbol removed");
                Ok(())
            }
            None => Err(Error::Undefined),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Token> {
        self.tokens.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.contains_key(name)
    }

    /// Iterates over the names of all stored symbols, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    /// Scans `expression` into reverse Polish notation without executing it.
    ///
    /// The result can be executed repeatedly with [`RPNExpr::evaluate`];
    /// variables are read anew on each execution.
    pub fn compile(&self, expression: &str) -> Result<RPNExpr, Error> {
        match RpnConverter::convert(expression, self) {
            Ok(rpn) => {
                tracing::trace!(expression, tokens = rpn.len(), "expression compiled");
                Ok(rpn)
            }
            Err(error) => {
                tracing::debug!(expression, %error, "failed to compile expression");
                Err(error)
            }
        }
    }

    /// Compiles and executes `expression`.
    pub fn evaluate(&self, expression: &str) -> Result<f64, Error> {
        self.compile(expression)?.evaluate()
    }

    fn insert(&mut self, name: &str, token: Token) -> Result<(), Error> {
        if !is_valid_name(name) {
            return Err(Error::IllegalName);
        }

        match self.tokens.entry(name.to_string()) {
            Entry::Occupied(_) => Err(Error::AlreadyDefined),
            Entry::Vacant(entry) => {
                tracing::debug!(name, kind = ?token.kind(), "symbol added");
                entry.insert(token);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("x"));
        assert!(is_valid_name("_private"));
        assert!(is_valid_name("snake_case_2"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("2x"));
        assert!(!is_valid_name("with space"));
        assert!(!is_valid_name("dash-ed"));
        assert!(!is_valid_name("رطانة"));
        assert!(!is_valid_name("café"));
    }

    #[test]
    fn test_add_variable() {
        let x = Rc::new(Cell::new(5.0));
        let y = Rc::new(Cell::new(3.0));
        let mut config = Config::default();

        let read = |cell: &Rc<Cell<f64>>| {
            let cell = Rc::clone(cell);
            move || cell.get()
        };

        assert_eq!(config.add_variable("x", read(&x)), Ok(()));
        assert_eq!(config.add_variable("y", read(&y)), Ok(()));
        assert_eq!(config.add_variable("y", read(&y)), Err(Error::AlreadyDefined));
        assert_eq!(config.add_variable("رطانة", read(&x)), Err(Error::IllegalName));
        assert_eq!(config.evaluate("x + y"), Ok(8.0));

        x.set(3.0);
        y.set(10.0);
        assert_eq!(config.evaluate("x + y"), Ok(13.0));

        assert_eq!(config.remove("x"), Ok(()));
        assert_eq!(config.remove("y"), Ok(()));
        assert_eq!(config.remove("رطانة"), Err(Error::Undefined));
        assert_eq!(config.evaluate("x + y"), Err(Error::Undefined));
    }

    #[test]
    fn test_add_constant() {
        let mut config = Config::default();

        assert_eq!(config.add_constant("e", 2.71), Ok(()));
        assert_eq!(config.add_constant("pi", 3.14), Ok(()));
        assert_eq!(config.add_constant("pi", 0.0), Err(Error::AlreadyDefined));
        assert_eq!(config.add_constant("رطانة", 0.0), Err(Error::IllegalName));

        let result = config.evaluate("e + pi").unwrap();
        assert!((result - 5.85).abs() < 1e-12);

        assert_eq!(config.remove("e"), Ok(()));
        assert_eq!(config.remove("pi"), Ok(()));
        assert_eq!(config.evaluate("e + pi"), Err(Error::Undefined));
    }

    #[test]
    fn test_add_function() {
        let mut config = Config::default();
        let foo = |args: &[f64]| match args {
            [] => Ok(-1.25),
            _ => Err(Error::IncorrectArgsNum),
        };
        let abs = |args: &[f64]| match args {
            [x] => Ok(x.abs()),
            _ => Err(Error::IncorrectArgsNum),
        };

        assert_eq!(config.add_function("foo", foo), Ok(()));
        assert_eq!(config.add_function("abs", abs), Ok(()));
        assert_eq!(config.add_function("abs", abs), Err(Error::AlreadyDefined));
        assert_eq!(config.add_function("رطانة", foo), Err(Error::IllegalName));

        let result = config.evaluate("abs(foo()) + 1.12").unwrap();
        assert!((result - 2.37).abs() < 1e-12);

        assert_eq!(config.remove("foo"), Ok(()));
        assert_eq!(config.remove("abs"), Ok(()));
        assert_eq!(config.evaluate("abs(foo()) + 1.12"), Err(Error::Undefined));
    }

    #[test]
    fn test_name_checked_before_uniqueness() {
        let mut config = Config::default();
        assert_eq!(config.add_constant("1st", 1.0), Err(Error::IllegalName));
        assert_eq!(config.add_constant("first", 1.0), Ok(()));
        assert_eq!(config.add_function("first", |_| Ok(0.0)), Err(Error::AlreadyDefined));
        assert_eq!(config.get("first").map(Token::kind), Some(TokenKind::Constant));
    }

    #[test]
    fn test_flags() {
        let mut config = Config::new(Flags::ADDITION);
        assert!(config.read_flag(Flags::ADDITION));
        assert!(!config.read_flag(Flags::SUBTRACTION));
        assert_eq!(config.evaluate("1 - 1"), Err(Error::SyntaxError));

        config.set_flags(config.flags() | Flags::SUBTRACTION);
        assert_eq!(config.evaluate("1 - 1"), Ok(0.0));
    }

    #[test]
    fn test_names() {
        let mut config = Config::default();
        config.add_constant("a", 1.0).unwrap();
        config.add_constant("b", 2.0).unwrap();

        let mut names: Vec<&str> = config.names().collect();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
        assert!(config.contains("a"));
        assert!(!config.contains("c"));
    }
}
