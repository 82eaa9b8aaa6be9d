//! Lexer/Scanner implementation for the Think language
//!
//! This module implements lexical analysis, converting source code into tokens.

use super::token::{Keyword, Literal, Token, TokenType};
use crate::error::{SourceLocation, ThinkError, ThinkResult};

/// Lexer for Think source code
pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    column: usize,
    filename: Option<String>,
}

impl Lexer {
    /// Create a new lexer
    pub fn new(source: &str, filename: Option<&str>) -> Self {
        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            filename: filename.map(|s| s.to_string()),
        }
    }

    /// Tokenize the source code
    pub fn tokenize(&mut self) -> ThinkResult<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        // Add EOF token
        self.tokens.push(Token::new(
            TokenType::Eof,
            String::new(),
            self.current_location(),
        ));

        Ok(self.tokens.clone())
    }

    /// Scan a single token
    fn scan_token(&mut self) -> ThinkResult<()> {
        let c = self.advance();

        match c {
            // Whitespace (skip)
            ' ' | '\r' | '\t' => Ok(()),

            // Newline
            '\n' => {
                self.line += 1;
                self.column = 1;
                Ok(())
            }

            // Comments: '#' to end of line, discarded
            '#' => {
                while self.peek() != '\n' && !self.is_at_end() {
                    self.advance();
                }
                Ok(())
            }

            // Single-character tokens
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            '[' => self.add_token(TokenType::LeftBracket),
            ']' => self.add_token(TokenType::RightBracket),
            ',' => self.add_token(TokenType::Comma),
            ':' => self.add_token(TokenType::Colon),
            '+' => self.add_token(TokenType::Plus),
            '-' => self.add_token(TokenType::Minus),
            '*' => self.add_token(TokenType::Star),
            '/' => self.add_token(TokenType::Slash),

            // One- or two-character tokens
            '=' => {
                if self.match_char('=') {
                    self.add_token(TokenType::Equal)
                } else {
                    self.add_token(TokenType::Assign)
                }
            }

            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenType::NotEqual)
                } else {
                    Err(self.error("Unexpected character '!'. Did you mean '!='?"))
                }
            }

            '<' => {
                if self.match_char('=') {
                    self.add_token(TokenType::LessEqual)
                } else {
                    self.add_token(TokenType::Less)
                }
            }

            '>' => {
                if self.match_char('=') {
                    self.add_token(TokenType::GreaterEqual)
                } else {
                    self.add_token(TokenType::Greater)
                }
            }

            // String literals, single or double quoted
            '"' | '\'' => self.scan_string(c),

            // Number literals
            c if c.is_ascii_digit() => self.scan_number(),

            // Identifiers and keywords
            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),

            // Unexpected character
            _ => Err(self.error(&format!("Unexpected character '{}'", c))),
        }
    }

    /// Scan a string literal delimited by `quote`
    fn scan_string(&mut self, quote: char) -> ThinkResult<()> {
        let mut value = String::new();

        while self.peek() != quote && !self.is_at_end() {
            // Strings do not continue across lines
            if self.peek() == '\n' {
                return Err(self.error("Unterminated string"));
            }

            // Handle escape sequences
            if self.peek() == '\\' {
                self.advance(); // consume backslash
                let escaped = self.advance();
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    '\\' => value.push('\\'),
                    '"' => value.push('"'),
                    '\'' => value.push('\''),
                    _ => {
                        return Err(
                            self.error(&format!("Invalid escape sequence '\\{}'", escaped))
                        )
                    }
                }
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            return Err(self.error("Unterminated string"));
        }

        // Consume closing quote
        self.advance();

        self.add_token(TokenType::Literal(Literal::String(value)))
    }

    /// Scan a number literal (integer or float, scientific notation allowed)
    fn scan_number(&mut self) -> ThinkResult<()> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        let mut is_float = false;

        // Fractional part
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            is_float = true;
            self.advance(); // consume '.'
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        // Exponent part: e or E, optional sign, at least one digit
        if self.peek() == 'e' || self.peek() == 'E' {
            let after_e = self.peek_next();
            let exponent_ok = after_e.is_ascii_digit()
                || ((after_e == '+' || after_e == '-') && self.peek_at(2).is_ascii_digit());
            if exponent_ok {
                is_float = true;
                self.advance(); // consume 'e'
                if self.peek() == '+' || self.peek() == '-' {
                    self.advance();
                }
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        let lexeme: String = self.source[self.start..self.current].iter().collect();

        if is_float {
            let value = lexeme
                .parse::<f64>()
                .map_err(|_| self.error(&format!("Invalid float literal '{}'", lexeme)))?;
            self.add_token(TokenType::Literal(Literal::Float(value)))
        } else {
            let value = lexeme
                .parse::<i64>()
                .map_err(|_| self.error(&format!("Invalid integer literal '{}'", lexeme)))?;
            self.add_token(TokenType::Literal(Literal::Integer(value)))
        }
    }

    /// Scan an identifier or keyword
    fn scan_identifier(&mut self) -> ThinkResult<()> {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let lexeme: String = self.source[self.start..self.current].iter().collect();

        let token_type = if let Some(keyword) = Keyword::from_str(&lexeme) {
            TokenType::Keyword(keyword)
        } else {
            TokenType::Identifier
        };

        self.add_token(token_type)
    }

    /// Add a token to the token list
    fn add_token(&mut self, token_type: TokenType) -> ThinkResult<()> {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        let location = SourceLocation::new(
            self.line,
            self.column - (self.current - self.start),
            self.filename.clone(),
        );
        self.tokens.push(Token::new(token_type, lexeme, location));
        Ok(())
    }

    /// Advance to the next character
    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        self.column += 1;
        c
    }

    /// Check if the next character matches and consume it if so
    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.current += 1;
            self.column += 1;
            true
        }
    }

    /// Peek at the current character without consuming it
    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    /// Peek at the next character without consuming it
    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    /// Peek `offset` characters ahead without consuming
    fn peek_at(&self, offset: usize) -> char {
        if self.current + offset >= self.source.len() {
            '\0'
        } else {
            self.source[self.current + offset]
        }
    }

    /// Check if we've reached the end of the source
    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    /// Get the current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.filename.clone())
    }

    /// Create an error at the current location
    fn error(&self, message: &str) -> ThinkError {
        ThinkError::lex_error(message, self.current_location())
    }
}
