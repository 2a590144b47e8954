//! Sandboxed expression language for textual callbacks
//!
//! Text is lexed, parsed against a template's parameter list and kept as a
//! tree. The only names an expression can see are the template parameters,
//! so a textual callback can read its arguments and nothing else.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod token;

use crate::callback::Template;
use crate::error::{SeqError, SeqResult};
use crate::options::Options;
use crate::span::Span;
use crate::value::Value;
use ast::Expr;
use lexer::Lexer;
use parser::Parser;
use std::rc::Rc;

/// A problem found while lexing or parsing
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub message: String,
    pub span: Span,
}

impl Issue {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Expression text compiled against a template
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    template: Template,
    source: Rc<str>,
    body: Vec<Expr>,
}

impl CompiledExpr {
    pub fn template(&self) -> Template {
        self.template
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate the body with positional arguments.
    ///
    /// Returns the value of the last expression; an empty side-effect body
    /// yields `nil`.
    pub fn call(&self, args: &[Value]) -> SeqResult<Value> {
        let mut result = Value::Nil;
        for expr in &self.body {
            result = eval::evaluate(expr, args)?;
        }
        Ok(result)
    }
}

/// Compile `source` against `template`
pub fn compile(source: &str, template: Template, options: &Options) -> SeqResult<CompiledExpr> {
    let compile_error = |issue: Issue| SeqError::Compile {
        template,
        msg: issue.message,
        span: issue.span,
    };

    if source.len() > options.max_expression_length {
        return Err(compile_error(Issue::new(
            format!(
                "Expression is {} bytes long, the limit is {}",
                source.len(),
                options.max_expression_length
            ),
            Span::new(0, source.len()),
        )));
    }

    let (tokens, lex_issues) = Lexer::new(source).tokenize();
    if let Some(issue) = lex_issues.into_iter().next() {
        return Err(compile_error(issue));
    }

    let mut parser = Parser::new(tokens, template.params(), options.max_expression_depth);
    let (body, issues) = match template {
        Template::SideEffect => parser.parse_sequence(),
        _ => {
            let (expr, issues) = parser.parse_single();
            (expr.into_iter().collect(), issues)
        }
    };

    if let Some(issue) = issues.into_iter().next() {
        return Err(compile_error(issue));
    }

    Ok(CompiledExpr {
        template,
        source: Rc::from(source),
        body,
    })
}
