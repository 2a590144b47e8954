//! Lexical analysis for callback expressions

use crate::expr::token::{Token, TokenKind};
use crate::expr::Issue;
use crate::span::Span;

/// Lexer state for tokenizing expression text
pub struct Lexer {
    chars: Vec<char>,
    current: usize,
    start_pos: usize,
    issues: Vec<Issue>,
}

impl Lexer {
    /// Create a new lexer for the given source
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            current: 0,
            start_pos: 0,
            issues: Vec::new(),
        }
    }

    /// Tokenize the source, returning tokens and any lexical issues
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<Issue>) {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        (tokens, std::mem::take(&mut self.issues))
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start_pos = self.current;

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof, "");
        }

        let c = self.advance();

        match c {
            '(' => self.make_token(TokenKind::LeftParen, "("),
            ')' => self.make_token(TokenKind::RightParen, ")"),
            '[' => self.make_token(TokenKind::LeftBracket, "["),
            ']' => self.make_token(TokenKind::RightBracket, "]"),
            ';' => self.make_token(TokenKind::Semicolon, ";"),
            '+' => self.make_token(TokenKind::Plus, "+"),
            '-' => self.make_token(TokenKind::Minus, "-"),
            '*' => self.make_token(TokenKind::Star, "*"),
            '/' => self.make_token(TokenKind::Slash, "/"),
            '%' => self.make_token(TokenKind::Percent, "%"),
            '#' => self.make_token(TokenKind::Hash, "#"),

            '.' => {
                if self.match_char('.') {
                    self.make_token(TokenKind::DotDot, "..")
                } else {
                    self.make_token(TokenKind::Dot, ".")
                }
            }
            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::EqualEqual, "==")
                } else {
                    self.error_token("Assignment is not allowed in callback expressions")
                }
            }
            '~' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::NotEqual, "~=")
                } else {
                    self.error_token("Unexpected character '~'")
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::NotEqual, "!=")
                } else {
                    self.make_token(TokenKind::Bang, "!")
                }
            }
            '<' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::LessEqual, "<=")
                } else {
                    self.make_token(TokenKind::Less, "<")
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::GreaterEqual, ">=")
                } else {
                    self.make_token(TokenKind::Greater, ">")
                }
            }
            '&' => {
                if self.match_char('&') {
                    self.make_token(TokenKind::AmpAmp, "&&")
                } else {
                    self.error_token("Unexpected character '&'")
                }
            }
            '|' => {
                if self.match_char('|') {
                    self.make_token(TokenKind::PipePipe, "||")
                } else {
                    self.error_token("Unexpected character '|'")
                }
            }

            '"' | '\'' => self.string(c),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => self.error_token(&format!("Unexpected character '{}'", c)),
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    /// Scan a string literal delimited by `quote`
    fn string(&mut self, quote: char) -> Token {
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != quote {
            if self.peek() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
                let escaped = match self.advance() {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    other => {
                        return self.error_token(&format!("Invalid escape sequence '\\{}'", other))
                    }
                };
                value.push(escaped);
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            return self.error_token("Unterminated string literal");
        }

        self.advance(); // closing quote
        self.make_token(TokenKind::String, &value)
    }

    /// Scan a number literal (integer, decimal, or scientific notation)
    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A dot only belongs to the number when a digit follows (`1..2` is concat)
        if self.peek() == '.' && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if self.peek() == 'e' || self.peek() == 'E' {
            self.advance();
            if self.peek() == '+' || self.peek() == '-' {
                self.advance();
            }
            if !self.peek().is_ascii_digit() {
                return self.error_token("Invalid number: exponent requires digits");
            }
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme: String = self.chars[self.start_pos..self.current].iter().collect();
        self.make_token(TokenKind::Number, &lexeme)
    }

    /// Scan an identifier or keyword
    fn identifier(&mut self) -> Token {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let lexeme: String = self.chars[self.start_pos..self.current].iter().collect();
        let kind = TokenKind::is_keyword(&lexeme).unwrap_or(TokenKind::Identifier);
        self.make_token(kind, &lexeme)
    }

    // === Character navigation ===

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        self.chars.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.current + 1).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected && !self.is_at_end() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    // === Token creation ===

    fn make_token(&self, kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, Span::new(self.start_pos, self.current))
    }

    /// Record an issue and return an error token in its place
    fn error_token(&mut self, message: &str) -> Token {
        let span = Span::new(self.start_pos, self.current.max(self.start_pos + 1));
        self.issues.push(Issue::new(message, span));
        Token::new(TokenKind::Error, message, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, issues) = Lexer::new(source).tokenize();
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ - * / % # .. . == ~= != < <= > >= && || !"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::Hash,
                TokenKind::DotDot,
                TokenKind::Dot,
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::NotEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::Bang,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("x and not nil or true"),
            vec![
                TokenKind::Identifier,
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Nil,
                TokenKind::Or,
                TokenKind::True,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers_and_concat() {
        let (tokens, _) = Lexer::new("1..2.5e1").tokenize();
        assert_eq!(tokens[0].lexeme, "1");
        assert_eq!(tokens[1].kind, TokenKind::DotDot);
        assert_eq!(tokens[2].lexeme, "2.5e1");
    }

    #[test]
    fn test_string_quotes_and_escapes() {
        let (tokens, issues) = Lexer::new(r#"'it\'s' "a\tb""#).tokenize();
        assert!(issues.is_empty());
        assert_eq!(tokens[0].lexeme, "it's");
        assert_eq!(tokens[1].lexeme, "a\tb");
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, issues) = Lexer::new("'abc").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(issues[0].message, "Unterminated string literal");
    }

    #[test]
    fn test_single_equals_rejected() {
        let (_, issues) = Lexer::new("x = 1").tokenize();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].span, Span::new(2, 3));
    }
}
