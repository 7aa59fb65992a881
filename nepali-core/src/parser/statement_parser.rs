//! Statement and expression parser
//!
//! Statements are dispatched on their first token (`लेट`/`संख्या`, `प्रतिफल`,
//! or an expression). Expressions use precedence climbing: every token kind
//! that may start an expression has a prefix rule, every operator token has an
//! infix rule and a binding precedence.
//!
//! Syntax errors are collected rather than returned; a malformed construct
//! yields no node and parsing resumes at the next token.

use crate::parser::ast::{
    BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::parser::lexer::{digit_value, Lexer, Token, TokenKind};
use crate::stack::ensure_sufficient_stack;
use std::rc::Rc;

/// Binding power of an operator, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,      // == !=
    LessGreater, // < > <= >=
    Sum,         // + -
    Product,     // * /
    Prefix,      // -x !x
    Call,        // f(x) a[i]
}

impl Precedence {
    fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
                Precedence::LessGreater
            }
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen | TokenKind::LBracket => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }
}

type PrefixParseFn = fn(&mut Parser) -> Option<Expression>;
type InfixParseFn = fn(&mut Parser, Expression) -> Option<Expression>;

fn prefix_rule(kind: TokenKind) -> Option<PrefixParseFn> {
    let rule: PrefixParseFn = match kind {
        TokenKind::Ident | TokenKind::Print => Parser::parse_identifier,
        TokenKind::Int => Parser::parse_integer_literal,
        TokenKind::String => Parser::parse_string_literal,
        TokenKind::True | TokenKind::False => Parser::parse_boolean,
        TokenKind::Bang | TokenKind::Minus => Parser::parse_prefix_expression,
        TokenKind::LParen => Parser::parse_grouped_expression,
        TokenKind::If => Parser::parse_if_expression,
        TokenKind::Function => Parser::parse_function_literal,
        TokenKind::LBracket => Parser::parse_array_literal,
        TokenKind::LBrace => Parser::parse_hash_literal,
        _ => return None,
    };
    Some(rule)
}

fn infix_rule(kind: TokenKind) -> Option<InfixParseFn> {
    let rule: InfixParseFn = match kind {
        TokenKind::LParen => Parser::parse_call_expression,
        TokenKind::LBracket => Parser::parse_index_expression,
        kind if InfixOperator::from_token(kind).is_some() => Parser::parse_infix_expression,
        _ => return None,
    };
    Some(rule)
}

/// Recursive descent parser with precedence climbing for expressions
pub struct Parser {
    lexer: Lexer,
    errors: Vec<String>,
    current: Token,
    peek: Token,
}

impl Parser {
    /// Create a new parser reading from the given lexer
    pub fn new(mut lexer: Lexer) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();

        Parser {
            lexer,
            errors: Vec::new(),
            current,
            peek,
        }
    }

    /// Diagnostics collected so far
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Consume the parser, keeping its diagnostics
    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// Advance to the next token
    fn advance(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn current_is(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.is(kind)
    }

    /// Advance if the next token has the expected kind, otherwise record a
    /// diagnostic and stay put
    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.advance();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        self.error(format!(
            "expected next token to be {}, got {} instead",
            expected, self.peek.kind
        ));
    }

    fn error(&mut self, message: String) {
        tracing::debug!(at = %self.current.span, %message, "parse error");
        self.errors.push(message);
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current.kind)
    }

    fn skip_optional_semicolon(&mut self) {
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Parse a complete program (sequence of statements)
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();

        while !self.current_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                program.push(stmt);
            }
            self.advance();
        }

        program
    }

    /// Parse a single statement starting at the current token
    pub fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Let | TokenKind::Var => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            // stray separators between statements
            TokenKind::Semicolon => None,
            _ => self.parse_expression_statement(),
        }
    }

    /// Parse: लेट <name> = <expression>[;]
    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = self.current.literal.clone();

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.advance();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Some(Statement::Let { name, value })
    }

    /// Parse: प्रतिफल <expression>[;]
    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.advance();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Some(Statement::Return(value))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_optional_semicolon();

        Some(Statement::Expression(expr))
    }

    /// Parse an expression whose operators bind tighter than `precedence`
    pub fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        ensure_sufficient_stack(|| {
            let Some(prefix) = prefix_rule(self.current.kind) else {
                let message = format!("no prefix parse function for {} found", self.current.kind);
                self.error(message);
                return None;
            };
            let mut left = prefix(self)?;

            while !self.peek_is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
                let Some(infix) = infix_rule(self.peek.kind) else {
                    return Some(left);
                };
                self.advance();
                left = infix(self, left)?;
            }

            Some(left)
        })
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(self.current.literal.clone()))
    }

    /// Integer literals may be written in Latin or Devanagari digits
    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let literal = &self.current.literal;
        let value = literal.chars().try_fold(0i64, |acc, ch| {
            let digit = digit_value(ch)?;
            acc.checked_mul(10)?.checked_add(i64::from(digit))
        });

        match value {
            Some(value) => Some(Expression::IntegerLiteral(value)),
            None => {
                let message = format!("could not parse {} as integer", literal);
                self.error(message);
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::StringLiteral(self.current.literal.clone()))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::BooleanLiteral(self.current_is(TokenKind::True)))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = PrefixOperator::from_token(self.current.kind)?;
        self.advance();

        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::prefix(operator, right))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = InfixOperator::from_token(self.current.kind)?;
        let precedence = self.current_precedence();
        self.advance();

        let right = self.parse_expression(precedence)?;
        Some(Expression::infix(left, operator, right))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.advance();

        let expr = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(expr)
    }

    /// Parse: यदि <condition> { ... } [अन्यथा { ... }]
    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let consequence = self.parse_block_statement()?;

        let alternative = if self.peek_is(TokenKind::Else) {
            self.advance();
            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Parse the statements of a block; the current token is `{`
    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        let mut block = BlockStatement::default();
        self.advance();

        while !self.current_is(TokenKind::RBrace) {
            if self.current_is(TokenKind::Eof) {
                self.error(format!(
                    "expected next token to be {}, got {} instead",
                    TokenKind::RBrace,
                    TokenKind::Eof
                ));
                return None;
            }
            if let Some(stmt) = self.parse_statement() {
                block.statements.push(stmt);
            }
            self.advance();
        }

        Some(block)
    }

    /// Parse: फन(<params>) { ... }
    fn parse_function_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }
        let body = self.parse_block_statement()?;

        Some(Expression::FunctionLiteral {
            parameters,
            body: Rc::new(body),
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<String>> {
        let mut parameters = Vec::new();

        if self.peek_is(TokenKind::RParen) {
            self.advance();
            return Some(parameters);
        }

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        parameters.push(self.current.literal.clone());

        while self.peek_is(TokenKind::Comma) {
            self.advance();
            if !self.expect_peek(TokenKind::Ident) {
                return None;
            }
            parameters.push(self.current.literal.clone());
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RParen)?;
        Some(Expression::call(function, arguments))
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.advance();
        let index = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }
        Some(Expression::index(left, index))
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        Some(Expression::ArrayLiteral(elements))
    }

    /// Comma-separated expressions up to `end`; the current token is the
    /// opening delimiter
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_is(end) {
            self.advance();
            return Some(list);
        }

        self.advance();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    /// Parse: { <key>: <value>, ... }
    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();

        while !self.peek_is(TokenKind::RBrace) {
            self.advance();
            let key = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !self.peek_is(TokenKind::RBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }
        Some(Expression::HashLiteral(pairs))
    }
}

/// Parse source text into a program plus the collected diagnostics.
/// Callers must not evaluate the program when diagnostics are present.
pub fn parse(input: &str) -> (Program, Vec<String>) {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    (program, parser.into_errors())
}
