use crate::error::Error;
use crate::rpn_converter::RPNExpr;
use crate::token::Token;

pub struct RpnEvaluator;

impl RpnEvaluator {
    /// Executes an RPN expression with a single value stack.
    ///
    /// Variables are read at this point, not when the expression was
    /// converted. The first error returned by a function aborts the
    /// evaluation.
    pub fn evaluate(rpn: &RPNExpr) -> Result<f64, Error> {
        let mut eval_stack: Vec<f64> = Vec::new();
        let mut arities = rpn.arities().iter();

        for token in rpn.iter() {
            match token {
                Token::Constant(value) => eval_stack.push(*value),
                Token::Variable(variable) => eval_stack.push(variable.read()),
                Token::BinaryOperator(op) => {
                    let b = Self::pop(&mut eval_stack)?;
                    let a = Self::pop(&mut eval_stack)?;
                    eval_stack.push((op.apply)(a, b));
                }
                Token::UnaryOperator(op) => {
                    let x = Self::pop(&mut eval_stack)?;
                    eval_stack.push((op.apply)(x));
                }
                Token::Function(function) => {
                    let argc = *arities.next().ok_or(Error::SyntaxError)?;
                    let start = eval_stack
                        .len()
                        .checked_sub(argc)
                        .ok_or(Error::SyntaxError)?;
                    let args = eval_stack.split_off(start);

                    match function.call(&args) {
                        Ok(result) => eval_stack.push(result),
                        Err(error) => {
                            tracing::debug!(%error, argc, "function call failed");
                            return Err(error);
                        }
                    }
                }
                Token::None | Token::LeftParen | Token::RightParen | Token::Comma => {}
            }
        }

        // Exactly one value has to be left
        match eval_stack.as_slice() {
            [result] => {
                tracing::trace!(result, "expression evaluated");
                Ok(*result)
            }
            _ => Err(Error::SyntaxError),
        }
    }

    fn pop(eval_stack: &mut Vec<f64>) -> Result<f64, Error> {
        eval_stack.pop().ok_or(Error::SyntaxError)
    }
}

impl RPNExpr {
    /// Executes the expression, reading every variable anew.
    pub fn evaluate(&self) -> Result<f64, Error> {
        RpnEvaluator::evaluate(self)
    }
}
