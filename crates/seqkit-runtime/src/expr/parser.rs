//! Expression parsing (Pratt parsing)
//!
//! Parameter names are resolved against the template's parameter list while
//! parsing; any other identifier is an error.

use crate::expr::ast::*;
use crate::expr::token::{Token, TokenKind};
use crate::expr::Issue;
use crate::span::Span;

/// Parser state for building expression trees from tokens
pub struct Parser<'p> {
    tokens: Vec<Token>,
    current: usize,
    params: &'p [&'static str],
    max_depth: usize,
    depth: usize,
    issues: Vec<Issue>,
}

/// Operator precedence levels for Pratt parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Or,         // or ||
    And,        // and &&
    Comparison, // == ~= != < <= > >=
    Concat,     // .. (right associative)
    Term,       // + -
    Factor,     // * / %
    Unary,      // - not ! #
    Call,       // [] .
}

impl<'p> Parser<'p> {
    /// Create a new parser binding identifiers to `params`
    pub fn new(tokens: Vec<Token>, params: &'p [&'static str], max_depth: usize) -> Self {
        Self {
            tokens,
            current: 0,
            params,
            max_depth,
            depth: 0,
            issues: Vec::new(),
        }
    }

    /// Parse exactly one expression spanning the whole input
    pub fn parse_single(&mut self) -> (Option<Expr>, Vec<Issue>) {
        let expr = self.parse_expression().and_then(|expr| {
            if self.is_at_end() {
                Ok(expr)
            } else {
                self.error("Unexpected token after expression");
                Err(())
            }
        });
        (expr.ok(), std::mem::take(&mut self.issues))
    }

    /// Parse a `;`-separated expression list; empty input is allowed
    pub fn parse_sequence(&mut self) -> (Vec<Expr>, Vec<Issue>) {
        let mut body = Vec::new();

        while !self.is_at_end() {
            if self.match_token(TokenKind::Semicolon) {
                continue;
            }
            match self.parse_expression() {
                Ok(expr) => body.push(expr),
                Err(()) => break,
            }
            if !self.is_at_end() && !self.check(TokenKind::Semicolon) {
                self.error("Expected ';' between expressions");
                break;
            }
        }

        (body, std::mem::take(&mut self.issues))
    }

    // === Expressions ===

    fn parse_expression(&mut self) -> Result<Expr, ()> {
        self.parse_precedence(Precedence::Lowest)
    }

    fn parse_precedence(&mut self, precedence: Precedence) -> Result<Expr, ()> {
        let outer = self.depth;

        let result = self
            .enter()
            .and_then(|()| self.parse_prefix())
            .and_then(|mut left| {
                while precedence < self.current_precedence() {
                    // every infix step wraps `left` in one more node
                    self.enter()?;
                    left = self.parse_infix(left)?;
                }
                Ok(left)
            });

        self.depth = outer;
        result
    }

    /// Count one more level of tree height against the depth limit
    fn enter(&mut self) -> Result<(), ()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.error(&format!(
                "Expression nesting exceeds maximum depth of {}",
                self.max_depth
            ));
            return Err(());
        }
        Ok(())
    }

    fn parse_prefix(&mut self) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::Number => self.parse_number(),
            TokenKind::String => {
                let token = self.advance();
                Ok(Expr::Literal(Literal::String(token.lexeme.clone()), token.span))
            }
            TokenKind::True | TokenKind::False => {
                let token = self.advance();
                let value = token.kind == TokenKind::True;
                Ok(Expr::Literal(Literal::Bool(value), token.span))
            }
            TokenKind::Nil => {
                let span = self.advance().span;
                Ok(Expr::Literal(Literal::Nil, span))
            }
            TokenKind::Identifier => self.parse_param(),
            TokenKind::LeftParen => self.parse_group(),
            TokenKind::Minus | TokenKind::Not | TokenKind::Bang | TokenKind::Hash => {
                self.parse_unary()
            }
            // the lexer has already reported it
            TokenKind::Error => Err(()),
            _ => {
                self.error("Expected expression");
                Err(())
            }
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr, ()> {
        match self.peek().kind {
            TokenKind::LeftBracket => self.parse_index(left),
            TokenKind::Dot => self.parse_field(left),
            _ => self.parse_binary(left),
        }
    }

    fn current_precedence(&self) -> Precedence {
        Self::token_precedence(self.peek().kind)
    }

    fn token_precedence(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Or | TokenKind::PipePipe => Precedence::Or,
            TokenKind::And | TokenKind::AmpAmp => Precedence::And,
            TokenKind::EqualEqual
            | TokenKind::NotEqual
            | TokenKind::Less
            | TokenKind::LessEqual
            | TokenKind::Greater
            | TokenKind::GreaterEqual => Precedence::Comparison,
            TokenKind::DotDot => Precedence::Concat,
            TokenKind::Plus | TokenKind::Minus => Precedence::Term,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Precedence::Factor,
            TokenKind::LeftBracket | TokenKind::Dot => Precedence::Call,
            _ => Precedence::Lowest,
        }
    }

    fn parse_number(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        let span = token.span;
        match token.lexeme.parse::<f64>() {
            Ok(value) => Ok(Expr::Literal(Literal::Number(value), span)),
            Err(_) => {
                let message = format!("Invalid number '{}'", token.lexeme);
                self.error_at(&message, span);
                Err(())
            }
        }
    }

    /// Resolve an identifier to its template parameter slot
    fn parse_param(&mut self) -> Result<Expr, ()> {
        let token = self.advance();
        let name = token.lexeme.clone();
        let span = token.span;

        match self.params.iter().position(|p| *p == name) {
            Some(slot) => Ok(Expr::Param(ParamRef { name, slot, span })),
            None => {
                let message = format!(
                    "Unknown name '{}' (available: {})",
                    name,
                    self.params.join(", ")
                );
                self.error_at(&message, span);
                Err(())
            }
        }
    }

    fn parse_group(&mut self) -> Result<Expr, ()> {
        let start_span = self.consume(TokenKind::LeftParen, "Expected '('")?.span;
        let expr = self.parse_expression()?;
        let end_span = self.consume(TokenKind::RightParen, "Expected ')'")?.span;

        Ok(Expr::Group(GroupExpr {
            expr: Box::new(expr),
            span: start_span.merge(end_span),
        }))
    }

    fn parse_unary(&mut self) -> Result<Expr, ()> {
        let op_token = self.advance();
        let op_span = op_token.span;
        let op = match op_token.kind {
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Hash => UnaryOp::Len,
            _ => UnaryOp::Not,
        };

        let operand = self.parse_precedence(Precedence::Unary)?;
        let operand_span = operand.span();

        Ok(Expr::Unary(UnaryExpr {
            op,
            expr: Box::new(operand),
            span: op_span.merge(operand_span),
        }))
    }

    fn parse_binary(&mut self, left: Expr) -> Result<Expr, ()> {
        let left_span = left.span();
        let op_kind = self.advance().kind;

        let op = match op_kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::DotDot => BinaryOp::Concat,
            TokenKind::EqualEqual => BinaryOp::Eq,
            TokenKind::NotEqual => BinaryOp::Ne,
            TokenKind::Less => BinaryOp::Lt,
            TokenKind::LessEqual => BinaryOp::Le,
            TokenKind::Greater => BinaryOp::Gt,
            TokenKind::GreaterEqual => BinaryOp::Ge,
            TokenKind::And | TokenKind::AmpAmp => BinaryOp::And,
            _ => BinaryOp::Or,
        };

        // `..` binds to the right: parse its operand one level lower
        let precedence = match op {
            BinaryOp::Concat => Precedence::Comparison,
            _ => Self::token_precedence(op_kind),
        };

        let right = self.parse_precedence(precedence)?;
        let right_span = right.span();

        Ok(Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: left_span.merge(right_span),
        }))
    }

    fn parse_index(&mut self, target: Expr) -> Result<Expr, ()> {
        let target_span = target.span();
        self.consume(TokenKind::LeftBracket, "Expected '['")?;
        let index = self.parse_expression()?;
        let end_span = self.consume(TokenKind::RightBracket, "Expected ']'")?.span;

        Ok(Expr::Index(IndexExpr {
            target: Box::new(target),
            index: Box::new(index),
            span: target_span.merge(end_span),
        }))
    }

    fn parse_field(&mut self, target: Expr) -> Result<Expr, ()> {
        let target_span = target.span();
        self.consume(TokenKind::Dot, "Expected '.'")?;
        let name_token = self.consume(TokenKind::Identifier, "Expected field name after '.'")?;
        let name = name_token.lexeme.clone();
        let end_span = name_token.span;

        Ok(Expr::Field(FieldExpr {
            target: Box::new(target),
            name,
            span: target_span.merge(end_span),
        }))
    }

    // === Token navigation ===

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.current.min(last)]
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, ()> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            self.error(message);
            Err(())
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    // === Error reporting ===

    fn error(&mut self, message: &str) {
        let span = self.peek().span;
        self.error_at(message, span);
    }

    fn error_at(&mut self, message: &str, span: Span) {
        // an error token was already reported by the lexer
        if self.peek().kind != TokenKind::Error {
            self.issues.push(Issue::new(message, span));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::lexer::Lexer;

    const PARAMS: &[&str] = &["x", "i", "self"];

    fn parse(source: &str) -> Result<Expr, Vec<Issue>> {
        let (tokens, _) = Lexer::new(source).tokenize();
        let (expr, issues) = Parser::new(tokens, PARAMS, 64).parse_single();
        expr.ok_or(issues)
    }

    fn binary_op(expr: &Expr) -> BinaryOp {
        match expr {
            Expr::Binary(b) => b.op,
            other => panic!("expected binary expression, got {:?}", other),
        }
    }

    #[test]
    fn test_params_resolve_to_slots() {
        match parse("self").unwrap() {
            Expr::Param(p) => assert_eq!(p.slot, 2),
            other => panic!("expected param, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let issues = parse("y + 1").unwrap_err();
        assert_eq!(issues[0].message, "Unknown name 'y' (available: x, i, self)");
        assert_eq!(issues[0].span, Span::new(0, 1));
    }

    #[test]
    fn test_factor_binds_tighter_than_term() {
        let expr = parse("x + i * 2").unwrap();
        assert_eq!(binary_op(&expr), BinaryOp::Add);
        if let Expr::Binary(b) = expr {
            assert_eq!(binary_op(&b.right), BinaryOp::Mul);
        }
    }

    #[test]
    fn test_concat_is_right_associative() {
        let expr = parse("x .. i .. 'z'").unwrap();
        if let Expr::Binary(b) = expr {
            assert!(matches!(*b.left, Expr::Param(_)));
            assert_eq!(binary_op(&b.right), BinaryOp::Concat);
        } else {
            panic!("expected concat");
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse("x or i and self").unwrap();
        assert_eq!(binary_op(&expr), BinaryOp::Or);
    }

    #[test]
    fn test_postfix_access() {
        let expr = parse("self[i].length").unwrap();
        match expr {
            Expr::Field(f) => {
                assert_eq!(f.name, "length");
                assert!(matches!(*f.target, Expr::Index(_)));
            }
            other => panic!("expected field access, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        let issues = parse("x 1").unwrap_err();
        assert_eq!(issues[0].message, "Unexpected token after expression");
    }

    #[test]
    fn test_empty_single_expression_rejected() {
        let issues = parse("").unwrap_err();
        assert_eq!(issues[0].message, "Expected expression");
    }

    #[test]
    fn test_depth_limit() {
        let (tokens, _) = Lexer::new("((((x))))").tokenize();
        let (expr, issues) = Parser::new(tokens, PARAMS, 3).parse_single();
        assert!(expr.is_none());
        assert!(issues[0].message.contains("maximum depth of 3"));
    }

    #[test]
    fn test_depth_limit_counts_operator_chains() {
        let source = format!("x{}", "+1".repeat(1000));
        let (tokens, _) = Lexer::new(&source).tokenize();
        let (expr, issues) = Parser::new(tokens, PARAMS, 64).parse_single();
        assert!(expr.is_none());
        assert!(issues[0].message.contains("maximum depth of 64"));

        let source = format!("self{}", "[1]".repeat(100));
        let (tokens, _) = Lexer::new(&source).tokenize();
        let (expr, _) = Parser::new(tokens, PARAMS, 64).parse_single();
        assert!(expr.is_none());
    }

    #[test]
    fn test_short_chains_fit_the_depth_limit() {
        let source = format!("x{}", "+1".repeat(40));
        assert!(parse(&source).is_ok());
    }

    #[test]
    fn test_statement_list() {
        let (tokens, _) = Lexer::new("x; i;; self").tokenize();
        let (body, issues) = Parser::new(tokens, PARAMS, 64).parse_sequence();
        assert!(issues.is_empty());
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn test_statement_list_requires_separator() {
        let (tokens, _) = Lexer::new("x i").tokenize();
        let (_, issues) = Parser::new(tokens, PARAMS, 64).parse_sequence();
        assert_eq!(issues[0].message, "Expected ';' between expressions");
    }
}
