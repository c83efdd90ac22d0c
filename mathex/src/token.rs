use std::fmt;
use std::rc::Rc;

use crate::error::Error;

/// A live reference to a caller-owned number.
///
/// The accessor is invoked on every evaluation, so changes to the underlying
/// storage are observed without touching the [`Config`](crate::Config).
#[derive(Clone)]
pub struct Variable(Rc<dyn Fn() -> f64>);

impl Variable {
    pub fn new(accessor: impl Fn() -> f64 + 'static) -> Self {
        Self(Rc::new(accessor))
    }

    /// Reads the current value.
    pub fn read(&self) -> f64 {
        (self.0)()
    }
}

/// A user-supplied n-ary function.
///
/// The function receives its arguments in call order and is responsible for
/// checking its own arity.
#[derive(Clone)]
pub struct Function(Rc<dyn Fn(&[f64]) -> Result<f64, Error>>);

impl Function {
    pub fn new(function: impl Fn(&[f64]) -> Result<f64, Error> + 'static) -> Self {
        Self(Rc::new(function))
    }

    pub fn call(&self, args: &[f64]) -> Result<f64, Error> {
        (self.0)(args)
    }
}

/// A built-in binary operator.
#[derive(Debug)]
pub struct BinaryOperator {
    pub symbol: char,
    pub apply: fn(f64, f64) -> f64,
    pub precedence: u8,
    pub left_associative: bool,
}

/// A built-in unary operator.
#[derive(Debug)]
pub struct UnaryOperator {
    pub symbol: char,
    pub apply: fn(f64) -> f64,
}

pub static ADD: BinaryOperator = BinaryOperator {
    symbol: '+',
    apply: |a, b| a + b,
    precedence: 2,
    left_associative: true,
};

pub static SUB: BinaryOperator = BinaryOperator {
    symbol: '-',
    apply: |a, b| a - b,
    precedence: 2,
    left_associative: true,
};

pub static MUL: BinaryOperator = BinaryOperator {
    symbol: '*',
    apply: |a, b| a * b,
    precedence: 3,
    left_associative: true,
};

pub static DIV: BinaryOperator = BinaryOperator {
    symbol: '/',
    apply: |a, b| a / b,
    precedence: 3,
    left_associative: true,
};

// `^` and `%` share the additive tier: `2 + 3 ^ 2` is `(2 + 3) ^ 2`.
pub static POW: BinaryOperator = BinaryOperator {
    symbol: '^',
    apply: f64::powf,
    precedence: 2,
    left_associative: true,
};

pub static MOD: BinaryOperator = BinaryOperator {
    symbol: '%',
    apply: |a, b| a % b,
    precedence: 2,
    left_associative: true,
};

pub static POS: UnaryOperator = UnaryOperator {
    symbol: '+',
    apply: |x| x,
};

pub static NEG: UnaryOperator = UnaryOperator {
    symbol: '-',
    apply: |x| -x,
};

/// Every element that can appear in an expression or be stored in a
/// [`Config`](crate::Config).
#[derive(Clone)]
pub enum Token {
    None,
    LeftParen,
    RightParen,
    Comma,
    Constant(f64),
    Variable(Variable),
    Function(Function),
    BinaryOperator(&'static BinaryOperator),
    UnaryOperator(&'static UnaryOperator),
}

/// The variant of a [`Token`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    None,
    LeftParen,
    RightParen,
    Comma,
    Constant,
    Variable,
    Function,
    BinaryOperator,
    UnaryOperator,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::None => TokenKind::None,
            Token::LeftParen => TokenKind::LeftParen,
            Token::RightParen => TokenKind::RightParen,
            Token::Comma => TokenKind::Comma,
            Token::Constant(_) => TokenKind::Constant,
            Token::Variable(_) => TokenKind::Variable,
            Token::Function(_) => TokenKind::Function,
            Token::BinaryOperator(_) => TokenKind::BinaryOperator,
            Token::UnaryOperator(_) => TokenKind::UnaryOperator,
        }
    }
}

impl TokenKind {
    /// True where an operand (number, identifier, `(` or unary operator) may start.
    pub fn expects_operand(self) -> bool {
        matches!(
            self,
            TokenKind::None
                | TokenKind::LeftParen
                | TokenKind::Comma
                | TokenKind::BinaryOperator
                | TokenKind::UnaryOperator
        )
    }

    /// True where a unary `+` or `-` may appear.
    pub fn allows_unary(self) -> bool {
        matches!(
            self,
            TokenKind::None | TokenKind::LeftParen | TokenKind::Comma | TokenKind::UnaryOperator
        )
    }

    /// True right after a complete operand, where a binary operator may appear.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Constant | TokenKind::Variable | TokenKind::RightParen
        )
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::None => write!(f, "None"),
            Token::LeftParen => write!(f, "LeftParen"),
            Token::RightParen => write!(f, "RightParen"),
            Token::Comma => write!(f, "Comma"),
            Token::Constant(value) => write!(f, "Constant({})", value),
            Token::Variable(variable) => write!(f, "Variable(<{}>)", variable.read()),
            Token::Function(_) => write!(f, "Function"),
            Token::BinaryOperator(op) => write!(f, "BinaryOperator({})", op.symbol),
            Token::UnaryOperator(op) => write!(f, "UnaryOperator({})", op.symbol),
        }
    }
}
