use crate::parser::lexer::TokenKind;
use crate::stack::ensure_sufficient_stack;
use std::fmt;
use std::mem;
use std::rc::Rc;

// ============================================================================
// Program and Statement AST
// ============================================================================

/// A program is a sequence of statements
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Self {
        Program {
            statements: Vec::new(),
        }
    }

    pub fn push(&mut self, stmt: Statement) {
        self.statements.push(stmt);
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// A braced sequence of statements used as a function or `यदि` body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Variable binding: लेट x = 5;
    Let { name: String, value: Expression },

    /// Return from the enclosing function: प्रतिफल x;
    Return(Expression),

    /// A bare expression: x + 1;
    Expression(Expression),

    /// Nested block
    Block(BlockStatement),
}

// ============================================================================
// Expression AST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
}

impl PrefixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(PrefixOperator::Bang),
            TokenKind::Minus => Some(PrefixOperator::Minus),
            _ => None,
        }
    }
}

impl InfixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => InfixOperator::Plus,
            TokenKind::Minus => InfixOperator::Minus,
            TokenKind::Asterisk => InfixOperator::Asterisk,
            TokenKind::Slash => InfixOperator::Slash,
            TokenKind::Lt => InfixOperator::Lt,
            TokenKind::Gt => InfixOperator::Gt,
            TokenKind::LtEq => InfixOperator::LtEq,
            TokenKind::GtEq => InfixOperator::GtEq,
            TokenKind::Eq => InfixOperator::Eq,
            TokenKind::NotEq => InfixOperator::NotEq,
            _ => return None,
        };
        Some(op)
    }

    /// `==` and `!=`
    pub fn is_equality(self) -> bool {
        matches!(self, InfixOperator::Eq | InfixOperator::NotEq)
    }
}

/// Represents different types of expressions in the Nepali language
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),

    IntegerLiteral(i64),

    StringLiteral(String),

    BooleanLiteral(bool),

    /// [1, 2, 3]
    ArrayLiteral(Vec<Expression>),

    /// {"क": 1, 2: सत्य}, pairs kept in declaration order
    HashLiteral(Vec<(Expression, Expression)>),

    /// -x, !x
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
    },

    /// a + b
    Infix {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },

    /// यदि (x > 1) { ... } अन्यथा { ... }
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },

    /// फन(x, y) { ... }
    FunctionLiteral {
        parameters: Vec<String>,
        body: Rc<BlockStatement>,
    },

    /// callee(arg1, arg2)
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },

    /// collection[index]
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

impl Expression {
    /// Helper constructor for identifier expressions
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    /// Helper constructor for prefix expressions
    pub fn prefix(operator: PrefixOperator, right: Expression) -> Self {
        Expression::Prefix {
            operator,
            right: Box::new(right),
        }
    }

    /// Helper constructor for infix expressions
    pub fn infix(left: Expression, operator: InfixOperator, right: Expression) -> Self {
        Expression::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    /// Helper constructor for call expressions
    pub fn call(function: Expression, arguments: Vec<Expression>) -> Self {
        Expression::Call {
            function: Box::new(function),
            arguments,
        }
    }

    /// Helper constructor for index expressions
    pub fn index(left: Expression, index: Expression) -> Self {
        Expression::Index {
            left: Box::new(left),
            index: Box::new(index),
        }
    }
}

// Trees as deep as the source allows (`----…1`, `1 + 1 + …`) are torn down
// with an explicit work list; the derived recursive drop would overflow the
// stack long before the evaluator's limits are reached.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.take_children(&mut pending);
        }
    }
}

impl Expression {
    /// Move every direct sub-expression into `out`, leaving leaves behind
    fn take_children(&mut self, out: &mut Vec<Expression>) {
        fn take(boxed: &mut Box<Expression>) -> Expression {
            mem::replace(&mut **boxed, Expression::BooleanLiteral(false))
        }

        match self {
            Expression::Identifier(_)
            | Expression::IntegerLiteral(_)
            | Expression::StringLiteral(_)
            | Expression::BooleanLiteral(_) => {}
            Expression::ArrayLiteral(elements) => out.append(elements),
            Expression::HashLiteral(pairs) => {
                for (key, value) in pairs.drain(..) {
                    out.push(key);
                    out.push(value);
                }
            }
            Expression::Prefix { right, .. } => out.push(take(right)),
            Expression::Infix { left, right, .. } => {
                out.push(take(left));
                out.push(take(right));
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                out.push(take(condition));
                consequence.take_expressions(out);
                if let Some(alternative) = alternative {
                    alternative.take_expressions(out);
                }
            }
            // A body still shared with a closure is dropped by its last owner
            Expression::FunctionLiteral { body, .. } => {
                if let Some(body) = Rc::get_mut(body) {
                    body.take_expressions(out);
                }
            }
            Expression::Call {
                function,
                arguments,
            } => {
                out.push(take(function));
                out.append(arguments);
            }
            Expression::Index { left, index } => {
                out.push(take(left));
                out.push(take(index));
            }
        }
    }
}

impl BlockStatement {
    /// Empty the block, moving the expressions of its statements into `out`
    fn take_expressions(&mut self, out: &mut Vec<Expression>) {
        let mut statements = mem::take(&mut self.statements);
        while let Some(stmt) = statements.pop() {
            match stmt {
                Statement::Let { value, .. } => out.push(value),
                Statement::Return(value) | Statement::Expression(value) => out.push(value),
                Statement::Block(mut block) => statements.append(&mut block.statements),
            }
        }
    }
}

// ============================================================================
// Canonical printer
// ============================================================================

fn keyword(kind: TokenKind) -> &'static str {
    kind.keyword_literal().unwrap_or_default()
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOperator::Bang => write!(f, "!"),
            PrefixOperator::Minus => write!(f, "-"),
        }
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            InfixOperator::Plus => "+",
            InfixOperator::Minus => "-",
            InfixOperator::Asterisk => "*",
            InfixOperator::Slash => "/",
            InfixOperator::Lt => "<",
            InfixOperator::Gt => ">",
            InfixOperator::LtEq => "<=",
            InfixOperator::GtEq => ">=",
            InfixOperator::Eq => "==",
            InfixOperator::NotEq => "!=",
        };
        write!(f, "{}", symbol)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for stmt in &self.statements {
            write!(f, " {}", stmt)?;
        }
        write!(f, " }}")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => {
                write!(f, "{} {} = {};", keyword(TokenKind::Let), name, value)
            }
            Statement::Return(value) => write!(f, "{} {};", keyword(TokenKind::Return), value),
            Statement::Expression(expr) => write!(f, "{};", expr),
            Statement::Block(block) => write!(f, "{}", block),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| self.write_canonical(f))
    }
}

impl Expression {
    fn write_canonical(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::IntegerLiteral(value) => write!(f, "{}", value),
            Expression::StringLiteral(value) => write!(f, "\"{}\"", value),
            Expression::BooleanLiteral(true) => write!(f, "{}", keyword(TokenKind::True)),
            Expression::BooleanLiteral(false) => write!(f, "{}", keyword(TokenKind::False)),
            Expression::ArrayLiteral(elements) => {
                write!(f, "[")?;
                write_joined(f, elements)?;
                write!(f, "]")
            }
            Expression::HashLiteral(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Expression::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "{} {} {}", keyword(TokenKind::If), condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " {} {}", keyword(TokenKind::Else), alternative)?;
                }
                Ok(())
            }
            Expression::FunctionLiteral { parameters, body } => {
                write!(f, "{}(", keyword(TokenKind::Function))?;
                write_joined(f, parameters)?;
                write!(f, ") {}", body)
            }
            Expression::Call {
                function,
                arguments,
            } => {
                write!(f, "{}(", function)?;
                write_joined(f, arguments)?;
                write!(f, ")")
            }
            Expression::Index { left, index } => write!(f, "({}[{}])", left, index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_let_display() {
        let stmt = Statement::Let {
            name: "x".to_string(),
            value: Expression::infix(
                Expression::IntegerLiteral(1),
                InfixOperator::Plus,
                Expression::identifier("y"),
            ),
        };
        assert_eq!(stmt.to_string(), "लेट x = (1 + y);");
    }

    #[test]
    fn test_function_and_call_display() {
        let function = Expression::FunctionLiteral {
            parameters: vec!["a".to_string(), "b".to_string()],
            body: Rc::new(BlockStatement {
                statements: vec![Statement::Return(Expression::infix(
                    Expression::identifier("a"),
                    InfixOperator::Asterisk,
                    Expression::identifier("b"),
                ))],
            }),
        };
        assert_eq!(function.to_string(), "फन(a, b) { प्रतिफल (a * b); }");

        let call = Expression::call(
            Expression::identifier("f"),
            vec![Expression::IntegerLiteral(1), Expression::BooleanLiteral(false)],
        );
        assert_eq!(call.to_string(), "f(1, मिथ्या)");
    }

    #[test]
    fn test_if_display() {
        let expr = Expression::If {
            condition: Box::new(Expression::prefix(
                PrefixOperator::Bang,
                Expression::BooleanLiteral(true),
            )),
            consequence: BlockStatement {
                statements: vec![Statement::Expression(Expression::IntegerLiteral(1))],
            },
            alternative: Some(BlockStatement::default()),
        };
        assert_eq!(expr.to_string(), "यदि (!सत्य) { 1; } अन्यथा { }");
    }

    #[test]
    fn test_collection_display() {
        let array = Expression::ArrayLiteral(vec![
            Expression::IntegerLiteral(1),
            Expression::StringLiteral("दुई".to_string()),
        ]);
        assert_eq!(array.to_string(), "[1, \"दुई\"]");

        let hash = Expression::HashLiteral(vec![(
            Expression::StringLiteral("क".to_string()),
            Expression::index(array, Expression::IntegerLiteral(0)),
        )]);
        assert_eq!(hash.to_string(), "{\"क\": ([1, \"दुई\"][0])}");
    }

    #[test]
    fn test_operator_from_token() {
        assert_eq!(
            InfixOperator::from_token(TokenKind::GtEq),
            Some(InfixOperator::GtEq)
        );
        assert_eq!(InfixOperator::from_token(TokenKind::Bang), None);
        assert_eq!(
            PrefixOperator::from_token(TokenKind::Minus),
            Some(PrefixOperator::Minus)
        );
        assert!(InfixOperator::NotEq.is_equality());
        assert!(!InfixOperator::Lt.is_equality());
    }
}
