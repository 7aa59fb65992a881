use std::fmt;

/// Kinds of tokens in the Nepali language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    Eof,
    Illegal,

    // Identifiers and literals
    Ident,
    Int,
    String,

    // Operators
    Assign,   // =
    Plus,     // +
    Minus,    // -
    Bang,     // !
    Asterisk, // *
    Slash,    // /
    Lt,       // <
    Gt,       // >
    LtEq,     // <=
    GtEq,     // >=
    Eq,       // ==
    NotEq,    // !=

    // Delimiters
    Comma,     // ,
    Semicolon, // ;
    Colon,     // :
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]

    // Keywords
    Function, // फन
    Let,      // लेट
    Var,      // संख्या
    True,     // सत्य
    False,    // मिथ्या
    If,       // यदि
    Else,     // अन्यथा
    Return,   // प्रतिफल
    Print,    // लेख्नुहोस्
}

/// Keyword spellings. The first entry for a kind is its canonical spelling.
const KEYWORDS: &[(&str, TokenKind)] = &[
    ("फन", TokenKind::Function),
    ("लेट", TokenKind::Let),
    ("संख्या", TokenKind::Var),
    ("सत्य", TokenKind::True),
    ("मिथ्या", TokenKind::False),
    ("असत्य", TokenKind::False),
    ("यदि", TokenKind::If),
    ("अन्यथा", TokenKind::Else),
    ("प्रतिफल", TokenKind::Return),
    ("लेख्नुहोस्", TokenKind::Print),
];

/// Map an identifier-shaped word to its keyword kind, or `Ident`
pub fn lookup_ident(word: &str) -> TokenKind {
    KEYWORDS
        .iter()
        .find(|(spelling, _)| *spelling == word)
        .map(|(_, kind)| *kind)
        .unwrap_or(TokenKind::Ident)
}

impl TokenKind {
    /// Canonical source spelling for keywords, `None` for everything else
    pub fn keyword_literal(self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(spelling, _)| *spelling)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(keyword) = self.keyword_literal() {
            return write!(f, "{}", keyword);
        }
        let text = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Ident => "IDENT",
            TokenKind::Int => "INT",
            TokenKind::String => "STRING",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Bang => "!",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            // keywords are handled above
            _ => unreachable!("keyword without spelling: {:?}", self),
        };
        write!(f, "{}", text)
    }
}

/// Source position of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first character
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token with its literal text and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            literal: literal.into(),
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.span, self.kind, self.literal)
    }
}

const DEVANAGARI_DIGIT_ZERO: char = '\u{0966}';
const DEVANAGARI_DIGIT_NINE: char = '\u{096F}';

fn is_devanagari(ch: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&ch)
}

fn is_devanagari_digit(ch: char) -> bool {
    (DEVANAGARI_DIGIT_ZERO..=DEVANAGARI_DIGIT_NINE).contains(&ch)
}

/// Danda and double danda are punctuation, never part of a word
fn is_danda(ch: char) -> bool {
    ch == '\u{0964}' || ch == '\u{0965}'
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_'
        || (is_devanagari(ch) && !is_devanagari_digit(ch) && !is_danda(ch))
        || ch.is_alphabetic()
}

fn is_identifier_continue(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit() || is_devanagari_digit(ch)
}

/// Numeral script of a digit, used to keep integer literals single-script
#[derive(Clone, Copy, PartialEq, Eq)]
enum DigitScript {
    Latin,
    Devanagari,
}

fn digit_script(ch: char) -> Option<DigitScript> {
    if ch.is_ascii_digit() {
        Some(DigitScript::Latin)
    } else if is_devanagari_digit(ch) {
        Some(DigitScript::Devanagari)
    } else {
        None
    }
}

/// Value of a Latin or Devanagari decimal digit
pub fn digit_value(ch: char) -> Option<u32> {
    match digit_script(ch)? {
        DigitScript::Latin => ch.to_digit(10),
        DigitScript::Devanagari => Some(ch as u32 - DEVANAGARI_DIGIT_ZERO as u32),
    }
}

/// Tokenizes source text into tokens, one per `next_token` call
pub struct Lexer {
    input: Vec<char>,
    /// Index of `current_char`
    position: usize,
    /// Byte offset of `current_char`
    offset: usize,
    current_char: Option<char>,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Lexer {
            input: chars,
            position: 0,
            offset: 0,
            current_char,
            line: 1,
            column: 1,
        }
    }

    /// Advance to the next character
    fn advance(&mut self) {
        if let Some(ch) = self.current_char {
            self.offset += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    /// Peek at the next character without advancing
    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn span(&self) -> Span {
        Span {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\n' | '\r') = self.current_char {
            self.advance();
        }
    }

    fn read_while(&mut self, mut accept: impl FnMut(char) -> bool) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            if !accept(ch) {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result
    }

    fn read_identifier(&mut self) -> String {
        self.read_while(is_identifier_continue)
    }

    /// Read a run of digits from a single numeral script
    fn read_number(&mut self, script: DigitScript) -> String {
        self.read_while(|ch| digit_script(ch) == Some(script))
    }

    /// Read a string body after the opening quote. An unterminated string
    /// runs to the end of input.
    fn read_string(&mut self) -> String {
        self.advance(); // opening "
        let body = self.read_while(|ch| ch != '"');
        if self.current_char == Some('"') {
            self.advance();
        }
        body
    }

    /// Single-character token, or the two-character form when the next char
    /// is `=`
    fn one_or_two(&mut self, single: TokenKind, double: TokenKind, span: Span) -> Token {
        let first = self.current_char.unwrap_or_default();
        if self.peek() == Some('=') {
            self.advance();
            self.advance();
            Token::new(double, format!("{}=", first), span)
        } else {
            self.advance();
            Token::new(single, first.to_string(), span)
        }
    }

    /// Get the next token. Returns `Eof` forever once input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let span = self.span();

        let Some(ch) = self.current_char else {
            return Token::new(TokenKind::Eof, "", span);
        };

        let single = match ch {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Asterisk),
            '/' => Some(TokenKind::Slash),
            ',' => Some(TokenKind::Comma),
            ';' => Some(TokenKind::Semicolon),
            ':' => Some(TokenKind::Colon),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            _ => None,
        };

        let token = if let Some(kind) = single {
            self.advance();
            Token::new(kind, ch.to_string(), span)
        } else {
            match ch {
                '=' => self.one_or_two(TokenKind::Assign, TokenKind::Eq, span),
                '!' => self.one_or_two(TokenKind::Bang, TokenKind::NotEq, span),
                '<' => self.one_or_two(TokenKind::Lt, TokenKind::LtEq, span),
                '>' => self.one_or_two(TokenKind::Gt, TokenKind::GtEq, span),
                '"' => Token::new(TokenKind::String, self.read_string(), span),
                ch if is_identifier_start(ch) => {
                    let word = self.read_identifier();
                    Token::new(lookup_ident(&word), word, span)
                }
                ch => match digit_script(ch) {
                    Some(script) => Token::new(TokenKind::Int, self.read_number(script), span),
                    None => {
                        self.advance();
                        Token::new(TokenKind::Illegal, ch.to_string(), span)
                    }
                },
            }
        };

        tracing::trace!(kind = ?token.kind, literal = %token.literal, at = %token.span, "token");
        token
    }

    /// Tokenize the entire input, including the final `Eof` token
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.is(TokenKind::Eof);
            tokens.push(token);

            if is_eof {
                break;
            }
        }

        tokens
    }
}

impl Iterator for Lexer {
    type Item = Token;

    /// Yields tokens up to, but not including, `Eof`
    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (!token.is(TokenKind::Eof)).then_some(token)
    }
}

/// Convenience function to tokenize a string
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}
