//! A small sandboxed expression language for behavior predicates and
//! trigger-context lookups (§9 "sandboxed expression evaluation").
//!
//! The grammar is closed by construction: arithmetic, comparison, and
//! boolean operators plus a fixed function set (`clamp`, `min`, `max`,
//! `abs`, `floor`, `ceil`, `round`, `sqrt`, `exp`, `log`, `sigmoid`,
//! `lerp`, `mix`). There is no way to call into host code, read a file,
//! or loop; a parsed `Expr` is evaluated once per call against a
//! [`TriggerContext`].

use crate::types::{TriggerContext, TriggerValue};
use std::fmt;

/// An error raised while tokenizing, parsing, or evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprError {
    /// What went wrong.
    pub message: String,
}

impl ExprError {
    fn new(message: impl Into<String>) -> Self {
        ExprError {
            message: message.into(),
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expression error: {}", self.message)
    }
}

impl std::error::Error for ExprError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    Not,
    True,
    False,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '=' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Eq);
                i += 2;
            }
            '!' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Neq);
                i += 2;
            }
            '<' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Lte);
                i += 2;
            }
            '<' => {
                tokens.push(Token::Lt);
                i += 1;
            }
            '>' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(Token::Gte);
                i += 2;
            }
            '>' => {
                tokens.push(Token::Gt);
                i += 1;
            }
            '&' if chars.get(i + 1) == Some(&'&') => {
                tokens.push(Token::And);
                i += 2;
            }
            '|' if chars.get(i + 1) == Some(&'|') => {
                tokens.push(Token::Or);
                i += 2;
            }
            '!' => {
                tokens.push(Token::Not);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::new(format!("invalid number literal: {text}")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                match text.as_str() {
                    "true" => tokens.push(Token::True),
                    "false" => tokens.push(Token::False),
                    "and" => tokens.push(Token::And),
                    "or" => tokens.push(Token::Or),
                    "not" => tokens.push(Token::Not),
                    _ => tokens.push(Token::Ident(text)),
                }
            }
            other => return Err(ExprError::new(format!("unexpected character '{other}'"))),
        }
    }
    Ok(tokens)
}

/// A parsed, closed expression AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Bool(bool),
    Var(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

const ALLOWED_FUNCTIONS: &[&str] = &[
    "clamp", "min", "max", "abs", "floor", "ceil", "round", "sqrt", "exp", "log", "sigmoid",
    "lerp", "mix",
];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ExprError> {
        match self.next() {
            Some(ref t) if t == expected => Ok(()),
            other => Err(ExprError::new(format!(
                "expected {expected:?}, found {other:?}"
            ))),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ExprError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Or)) {
            self.next();
            let right = self.parse_and()?;
            left = Expr::Binary(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_comparison()?;
        while matches!(self.peek(), Some(Token::And)) {
            self.next();
            let right = self.parse_comparison()?;
            left = Expr::Binary(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let left = self.parse_additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => Some(BinaryOp::Eq),
            Some(Token::Neq) => Some(BinaryOp::Neq),
            Some(Token::Lt) => Some(BinaryOp::Lt),
            Some(Token::Lte) => Some(BinaryOp::Lte),
            Some(Token::Gt) => Some(BinaryOp::Gt),
            Some(Token::Gte) => Some(BinaryOp::Gte),
            _ => None,
        };
        if let Some(op) = op {
            self.next();
            let right = self.parse_additive()?;
            Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
        } else {
            Ok(left)
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    let right = self.parse_multiplicative()?;
                    left = Expr::Binary(BinaryOp::Add, Box::new(left), Box::new(right));
                }
                Some(Token::Minus) => {
                    self.next();
                    let right = self.parse_multiplicative()?;
                    left = Expr::Binary(BinaryOp::Sub, Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    let right = self.parse_unary()?;
                    left = Expr::Binary(BinaryOp::Mul, Box::new(left), Box::new(right));
                }
                Some(Token::Slash) => {
                    self.next();
                    let right = self.parse_unary()?;
                    left = Expr::Binary(BinaryOp::Div, Box::new(left), Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.next();
                let inner = self.parse_unary()?;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(inner)))
            }
            Some(Token::Not) => {
                self.next();
                let inner = self.parse_unary()?;
                Ok(Expr::Unary(UnaryOp::Not, Box::new(inner)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.next();
                    if !ALLOWED_FUNCTIONS.contains(&name.as_str()) {
                        return Err(ExprError::new(format!("unknown function '{name}'")));
                    }
                    let mut args = Vec::new();
                    if !matches!(self.peek(), Some(Token::RParen)) {
                        args.push(self.parse_expr()?);
                        while matches!(self.peek(), Some(Token::Comma)) {
                            self.next();
                            args.push(self.parse_expr()?);
                        }
                    }
                    self.expect(&Token::RParen)?;
                    Ok(Expr::Call(name, args))
                } else {
                    Ok(Expr::Var(name))
                }
            }
            other => Err(ExprError::new(format!("unexpected token {other:?}"))),
        }
    }
}

impl Expr {
    /// Parses `source` into an expression tree without evaluating it.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed syntax, an unknown function name, or
    /// trailing tokens after a complete expression.
    pub fn parse(source: &str) -> Result<Expr, ExprError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.parse_expr()?;
        if parser.pos != parser.tokens.len() {
            return Err(ExprError::new("trailing tokens after expression"));
        }
        Ok(expr)
    }

    /// Evaluates this expression against a trigger context, resolving
    /// [`Expr::Var`] nodes via [`TriggerContext::get`].
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is undefined or an operator is
    /// applied to operands of the wrong kind.
    pub fn eval(&self, ctx: &TriggerContext) -> Result<TriggerValue, ExprError> {
        match self {
            Expr::Number(n) => Ok(TriggerValue::Number(*n)),
            Expr::Bool(b) => Ok(TriggerValue::Bool(*b)),
            Expr::Var(name) => ctx
                .get(name)
                .cloned()
                .ok_or_else(|| ExprError::new(format!("undefined variable '{name}'"))),
            Expr::Unary(op, inner) => {
                let value = inner.eval(ctx)?;
                match op {
                    UnaryOp::Neg => Ok(TriggerValue::Number(-as_number(&value)?)),
                    UnaryOp::Not => Ok(TriggerValue::Bool(!as_bool(&value)?)),
                }
            }
            Expr::Binary(op, left, right) => {
                let l = left.eval(ctx)?;
                let r = right.eval(ctx)?;
                eval_binary(*op, &l, &r)
            }
            Expr::Call(name, args) => {
                let values: Result<Vec<f64>, ExprError> =
                    args.iter().map(|a| a.eval(ctx).and_then(|v| as_number(&v))).collect();
                Ok(TriggerValue::Number(eval_call(name, &values?)?))
            }
        }
    }
}

fn as_number(value: &TriggerValue) -> Result<f64, ExprError> {
    value
        .as_number()
        .ok_or_else(|| ExprError::new("expected a number"))
}

fn as_bool(value: &TriggerValue) -> Result<bool, ExprError> {
    value
        .as_bool()
        .ok_or_else(|| ExprError::new("expected a boolean"))
}

fn eval_binary(op: BinaryOp, left: &TriggerValue, right: &TriggerValue) -> Result<TriggerValue, ExprError> {
    match op {
        BinaryOp::Add => Ok(TriggerValue::Number(as_number(left)? + as_number(right)?)),
        BinaryOp::Sub => Ok(TriggerValue::Number(as_number(left)? - as_number(right)?)),
        BinaryOp::Mul => Ok(TriggerValue::Number(as_number(left)? * as_number(right)?)),
        BinaryOp::Div => {
            let divisor = as_number(right)?;
            if divisor == 0.0 {
                return Err(ExprError::new("division by zero"));
            }
            Ok(TriggerValue::Number(as_number(left)? / divisor))
        }
        BinaryOp::Eq => Ok(TriggerValue::Bool((as_number(left)? - as_number(right)?).abs() < 1e-12)),
        BinaryOp::Neq => Ok(TriggerValue::Bool((as_number(left)? - as_number(right)?).abs() >= 1e-12)),
        BinaryOp::Lt => Ok(TriggerValue::Bool(as_number(left)? < as_number(right)?)),
        BinaryOp::Lte => Ok(TriggerValue::Bool(as_number(left)? <= as_number(right)?)),
        BinaryOp::Gt => Ok(TriggerValue::Bool(as_number(left)? > as_number(right)?)),
        BinaryOp::Gte => Ok(TriggerValue::Bool(as_number(left)? >= as_number(right)?)),
        BinaryOp::And => Ok(TriggerValue::Bool(as_bool(left)? && as_bool(right)?)),
        BinaryOp::Or => Ok(TriggerValue::Bool(as_bool(left)? || as_bool(right)?)),
    }
}

fn eval_call(name: &str, args: &[f64]) -> Result<f64, ExprError> {
    let arity_error = |expected: usize| {
        ExprError::new(format!(
            "'{name}' expects {expected} argument(s), got {}",
            args.len()
        ))
    };
    match name {
        "clamp" => {
            if args.len() != 3 {
                return Err(arity_error(3));
            }
            Ok(args[0].clamp(args[1].min(args[2]), args[1].max(args[2])))
        }
        "min" => {
            if args.len() != 2 {
                return Err(arity_error(2));
            }
            Ok(args[0].min(args[1]))
        }
        "max" => {
            if args.len() != 2 {
                return Err(arity_error(2));
            }
            Ok(args[0].max(args[1]))
        }
        "abs" => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            Ok(args[0].abs())
        }
        "floor" => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            Ok(args[0].floor())
        }
        "ceil" => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            Ok(args[0].ceil())
        }
        "round" => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            Ok(args[0].round())
        }
        "sqrt" => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            Ok(args[0].max(0.0).sqrt())
        }
        "exp" => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            Ok(args[0].exp())
        }
        "log" => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            if args[0] <= 0.0 {
                return Err(ExprError::new("log of non-positive argument"));
            }
            Ok(args[0].ln())
        }
        "sigmoid" => {
            if args.len() != 1 {
                return Err(arity_error(1));
            }
            Ok(1.0 / (1.0 + (-args[0]).exp()))
        }
        "lerp" => {
            if args.len() != 3 {
                return Err(arity_error(3));
            }
            Ok(args[0] + (args[1] - args[0]) * args[2])
        }
        "mix" => {
            if args.len() != 3 {
                return Err(arity_error(3));
            }
            Ok(args[0] * (1.0 - args[2]) + args[1] * args[2])
        }
        _ => Err(ExprError::new(format!("unknown function '{name}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(pairs: &[(&str, TriggerValue)]) -> TriggerContext {
        let mut ctx = TriggerContext::default();
        for (k, v) in pairs {
            ctx.set(*k, v.clone());
        }
        ctx
    }

    #[test]
    fn evaluates_arithmetic() {
        let expr = Expr::parse("1 + 2 * 3").unwrap();
        let ctx = TriggerContext::default();
        assert_eq!(expr.eval(&ctx).unwrap().as_number(), Some(7.0));
    }

    #[test]
    fn resolves_variables_from_context() {
        let expr = Expr::parse("entity.arousal > 0.5").unwrap();
        let ctx = ctx_with(&[("entity.arousal", TriggerValue::Number(0.8))]);
        assert_eq!(expr.eval(&ctx).unwrap().as_bool(), Some(true));
    }

    #[test]
    fn rejects_unknown_function() {
        assert!(Expr::parse("system_exit()").is_err());
    }

    #[test]
    fn clamp_matches_bounds() {
        let expr = Expr::parse("clamp(5, 0, 1)").unwrap();
        let ctx = TriggerContext::default();
        assert_eq!(expr.eval(&ctx).unwrap().as_number(), Some(1.0));
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let expr = Expr::parse("missing + 1").unwrap();
        let ctx = TriggerContext::default();
        assert!(expr.eval(&ctx).is_err());
    }

    #[test]
    fn boolean_combinators_short_circuit_semantics_are_eager_but_correct() {
        let expr = Expr::parse("true and false or true").unwrap();
        let ctx = TriggerContext::default();
        assert_eq!(expr.eval(&ctx).unwrap().as_bool(), Some(true));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let expr = Expr::parse("1 / 0").unwrap();
        let ctx = TriggerContext::default();
        assert!(expr.eval(&ctx).is_err());
    }
}
