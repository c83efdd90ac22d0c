use crate::config::Config;
use crate::error::Error;
use crate::flags::Flags;
use crate::token::{BinaryOperator, Token, TokenKind, ADD, DIV, MOD, MUL, NEG, POS, POW, SUB};
use crate::tokenizer;

/// An expression in reverse Polish notation, ready to be executed.
///
/// Besides the postfix token stream it carries the argument count of every
/// function call, in the order the calls appear in the stream.
#[derive(Debug, Clone)]
pub struct RPNExpr {
    tokens: Vec<Token>,
    arities: Vec<usize>,
}

impl RPNExpr {
    /// Argument counts of the function calls, in execution order.
    pub fn arities(&self) -> &[usize] {
        &self.arities
    }
}

impl std::ops::Deref for RPNExpr {
    type Target = [Token];

    fn deref(&self) -> &Self::Target {
        &self.tokens
    }
}

/// Converts infix expressions to Reverse Polish Notation in a single
/// left-to-right scan, using the Shunting Yard algorithm.
///
/// Lexing, grammar checks and precedence reduction all happen in the same
/// pass. No syntax tree is built.
pub struct RpnConverter<'c> {
    config: &'c Config,
    /// Kind of the previously scanned token; drives the grammar checks.
    last: TokenKind,
    /// Whether the previous token was a number literal.
    after_literal: bool,
    stack: Vec<Token>,
    output: Vec<Token>,
    /// Arguments seen so far in the innermost open call.
    arg_count: usize,
    /// Saved counters of the enclosing calls.
    arg_stack: Vec<usize>,
    arities: Vec<usize>,
}

impl<'c> RpnConverter<'c> {
    fn new(config: &'c Config) -> Self {
        Self {
            config,
            last: TokenKind::None,
            after_literal: false,
            stack: Vec::new(),
            output: Vec::new(),
            arg_count: 0,
            arg_stack: Vec::new(),
            arities: Vec::new(),
        }
    }

    /// Converts `expression` using the symbols and flags of `config`.
    ///
    /// The first grammar violation met during the scan is returned.
    pub fn convert(expression: &str, config: &'c Config) -> Result<RPNExpr, Error> {
        let input = expression.as_bytes();
        let mut converter = RpnConverter::new(config);
        let mut pos = 0;

        while let Some(&c) = input.get(pos) {
            pos = match c {
                b' ' => pos + 1,
                c if tokenizer::starts_number(c) => converter.number(input, pos)?,
                c if tokenizer::starts_identifier(c) => converter.identifier(expression, pos)?,
                b'(' => {
                    converter.left_paren()?;
                    pos + 1
                }
                b')' => {
                    converter.right_paren()?;
                    pos + 1
                }
                b',' => {
                    converter.comma()?;
                    pos + 1
                }
                _ => {
                    converter.operator(c)?;
                    pos + 1
                }
            };
        }

        converter.finish()
    }

    fn flag(&self, flag: Flags) -> bool {
        self.config.read_flag(flag)
    }

    fn advance(&mut self, kind: TokenKind) {
        self.last = kind;
        self.after_literal = false;
    }

    /// Counts an operand that starts a new argument.
    fn count_operand(&mut self) {
        if self.arg_count == 0 {
            self.arg_count = 1;
        }
    }

    fn number(&mut self, input: &[u8], start: usize) -> Result<usize, Error> {
        // Two operands in a row are not allowed
        if !self.last.expects_operand() {
            return Err(Error::SyntaxError);
        }
        self.count_operand();

        let scientific = self.flag(Flags::SCIENTIFIC_NOTATION);
        let (value, end) = tokenizer::scan_number(input, start, scientific)?;

        self.output.push(Token::Constant(value));
        self.advance(TokenKind::Constant);
        self.after_literal = true;
        Ok(end)
    }

    fn identifier(&mut self, expression: &str, start: usize) -> Result<usize, Error> {
        if self.after_literal && self.flag(Flags::IMPLICIT_MULTIPLICATION) {
            self.push_binary(&MUL);
        } else if !self.last.expects_operand() {
            return Err(Error::SyntaxError);
        }
        self.count_operand();

        let config = self.config;
        let input = expression.as_bytes();
        let end = tokenizer::scan_identifier(input, start);
        let token = config
            .get(&expression[start..end])
            .ok_or(Error::Undefined)?;

        match token {
            Token::Function(_) => {
                if input.get(end) != Some(&b'(') {
                    return Err(Error::SyntaxError);
                }
                self.stack.push(token.clone());
            }
            Token::Variable(_) | Token::Constant(_) => self.output.push(token.clone()),
            // Only symbols are ever stored in a config.
            _ => return Err(Error::SyntaxError),
        }

        self.advance(token.kind());
        Ok(end)
    }

    fn operator(&mut self, c: u8) -> Result<(), Error> {
        let binary = self.last.ends_operand();

        let token = match c {
            b'+' if binary && self.flag(Flags::ADDITION) => Token::BinaryOperator(&ADD),
            b'+' if self.last.allows_unary() && self.flag(Flags::IDENTITY) => {
                Token::UnaryOperator(&POS)
            }
            b'-' if binary && self.flag(Flags::SUBTRACTION) => Token::BinaryOperator(&SUB),
            b'-' if self.last.allows_unary() && self.flag(Flags::NEGATION) => {
                Token::UnaryOperator(&NEG)
            }
            b'*' if binary && self.flag(Flags::MULTIPLICATION) => Token::BinaryOperator(&MUL),
            b'/' if binary && self.flag(Flags::DIVISION) => Token::BinaryOperator(&DIV),
            b'^' if binary && self.flag(Flags::EXPONENTIATION) => Token::BinaryOperator(&POW),
            b'%' if binary && self.flag(Flags::MODULUS) => Token::BinaryOperator(&MOD),
            _ => return Err(Error::SyntaxError),
        };

        let kind = token.kind();
        match token {
            Token::BinaryOperator(op) => self.push_binary(op),
            _ => self.stack.push(token),
        }

        self.advance(kind);
        Ok(())
    }

    /// Pushes a binary operator after moving every operator that binds at
    /// least as tightly to the output.
    fn push_binary(&mut self, op: &'static BinaryOperator) {
        while let Some(top) = self.stack.last() {
            let pops = match top {
                Token::BinaryOperator(top) => {
                    top.precedence > op.precedence
                        || (top.precedence == op.precedence && op.left_associative)
                }
                // Unary operators bind tighter than any binary operator
                Token::UnaryOperator(_) => true,
                _ => false,
            };

            if !pops {
                break;
            }

            if let Some(token) = self.stack.pop() {
                self.output.push(token);
            }
        }

        self.stack.push(Token::BinaryOperator(op));
    }

    /// Moves operators to the output until a left parenthesis is on top of the
    /// stack.
    ///
    /// Returns `false` if the stack ran out first, which is only allowed with
    /// implicit parentheses.
    fn drain_to_left_paren(&mut self) -> Result<bool, Error> {
        loop {
            match self.stack.last() {
                Some(Token::LeftParen) => return Ok(true),
                Some(_) => {
                    if let Some(token) = self.stack.pop() {
                        self.output.push(token);
                    }
                }
                None if self.flag(Flags::IMPLICIT_PARENTHESES) => return Ok(false),
                None => return Err(Error::SyntaxError),
            }
        }
    }

    /// Moves a finished function call to the output and restores the
    /// argument counter of the enclosing call.
    fn finish_call(&mut self, function: Token) {
        self.output.push(function);
        self.arities.push(self.arg_count);
        self.arg_count = self.arg_stack.pop().unwrap_or_default();
    }

    fn left_paren(&mut self) -> Result<(), Error> {
        if self.last == TokenKind::Function {
            self.arg_stack.push(self.arg_count);
            self.arg_count = 0;
        } else {
            if !self.last.expects_operand() {
                return Err(Error::SyntaxError);
            }
            self.count_operand();
        }

        self.stack.push(Token::LeftParen);
        self.advance(TokenKind::LeftParen);
        Ok(())
    }

    fn right_paren(&mut self) -> Result<(), Error> {
        // Empty expressions are not allowed
        if matches!(self.last, TokenKind::None | TokenKind::Comma) {
            return Err(Error::SyntaxError);
        }

        let empty = self.last == TokenKind::LeftParen;
        // A dangling operator cannot be closed, e.g. `(2 +)`
        if !empty && self.last.expects_operand() {
            return Err(Error::SyntaxError);
        }
        if !empty && !self.drain_to_left_paren()? {
            self.advance(TokenKind::RightParen);
            return Ok(());
        }

        self.stack.pop();

        if let Some(Token::Function(_)) = self.stack.last() {
            if let Some(function) = self.stack.pop() {
                self.finish_call(function);
            }
        } else if empty {
            // `()` is only valid as the argument list of a function
            return Err(Error::SyntaxError);
        }

        self.advance(TokenKind::RightParen);
        Ok(())
    }

    fn comma(&mut self) -> Result<(), Error> {
        // The previous argument has to be non-empty and inside a call
        if !self.last.ends_operand() || self.arg_stack.is_empty() {
            return Err(Error::SyntaxError);
        }

        self.drain_to_left_paren()?;
        self.arg_count += 1;
        self.advance(TokenKind::Comma);
        Ok(())
    }

    fn finish(mut self) -> Result<RPNExpr, Error> {
        // The expression cannot end where an operand is expected
        if self.last.expects_operand() {
            return Err(Error::SyntaxError);
        }

        while let Some(token) = self.stack.pop() {
            match token {
                Token::LeftParen if self.flag(Flags::IMPLICIT_PARENTHESES) => {}
                Token::LeftParen => return Err(Error::SyntaxError),
                Token::Function(_) => {
                    // Zero-argument calls need their closing parenthesis
                    if self.arg_count == 0 {
                        return Err(Error::SyntaxError);
                    }
                    self.finish_call(token);
                }
                _ => self.output.push(token),
            }
        }

        Ok(RPNExpr {
            tokens: self.output,
            arities: self.arities,
        })
    }
}
