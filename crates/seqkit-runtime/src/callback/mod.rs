//! Callback normalization
//!
//! Every method that takes a callback accepts either a native closure or
//! expression text. [`normalize`] turns both into a [`Callable`] with the
//! positional signature of one of four [`Template`]s. Native closures pass
//! through unchanged; text is compiled on every call site that hands it in.

use crate::error::{SeqError, SeqResult};
use crate::expr::{self, CompiledExpr};
use crate::options::Options;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// Native callback: receives the template's arguments positionally
pub type NativeFn = Rc<dyn Fn(&[Value]) -> SeqResult<Value>>;

/// Parameter binding shape for a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    /// `(x, i, self)`, result tested for truthiness
    ElementTest,
    /// `(x, i)`
    Map,
    /// `(x, i, self)`, result discarded
    SideEffect,
    /// `(acc, cur, i, self)`
    Reduce,
}

impl Template {
    /// Names bound inside textual callbacks, in argument order
    pub fn params(self) -> &'static [&'static str] {
        match self {
            Template::ElementTest | Template::SideEffect => &["x", "i", "self"],
            Template::Map => &["x", "i"],
            Template::Reduce => &["acc", "cur", "i", "self"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Template::ElementTest => "element-test",
            Template::Map => "map",
            Template::SideEffect => "side-effect",
            Template::Reduce => "reduce",
        }
    }

    pub fn arity(self) -> usize {
        self.params().len()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A callback as supplied by the caller
#[derive(Clone)]
pub enum Callback {
    Native(NativeFn),
    Text(Rc<str>),
}

impl Callback {
    /// Wrap a closure
    pub fn native<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> SeqResult<Value> + 'static,
    {
        Callback::Native(Rc::new(f))
    }
}

impl From<&str> for Callback {
    fn from(text: &str) -> Self {
        Callback::Text(Rc::from(text))
    }
}

impl From<String> for Callback {
    fn from(text: String) -> Self {
        Callback::Text(Rc::from(text))
    }
}

impl From<NativeFn> for Callback {
    fn from(f: NativeFn) -> Self {
        Callback::Native(f)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Native(_) => write!(f, "Callback::Native(<fn>)"),
            Callback::Text(text) => write!(f, "Callback::Text({:?})", text),
        }
    }
}

/// A normalized callback, ready to invoke
#[derive(Clone)]
pub enum Callable {
    Native(NativeFn),
    Compiled(Rc<CompiledExpr>),
}

impl Callable {
    /// Invoke with the template's positional arguments
    pub fn call(&self, args: &[Value]) -> SeqResult<Value> {
        match self {
            Callable::Native(f) => f(args),
            Callable::Compiled(compiled) => compiled.call(args),
        }
    }

    /// Source text, for compiled callables
    pub fn source(&self) -> Option<&str> {
        match self {
            Callable::Native(_) => None,
            Callable::Compiled(compiled) => Some(compiled.source()),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => write!(f, "Callable::Native(<fn>)"),
            Callable::Compiled(c) => write!(f, "Callable::Compiled({:?})", c.source()),
        }
    }
}

/// Normalize a callback with default options
pub fn normalize(callback: impl Into<Callback>, template: Template) -> SeqResult<Callable> {
    normalize_with(callback, template, &Options::default())
}

/// Normalize a callback: native closures pass through, text is compiled
/// against `template` under the sandbox limits in `options`.
pub fn normalize_with(
    callback: impl Into<Callback>,
    template: Template,
    options: &Options,
) -> SeqResult<Callable> {
    match callback.into() {
        Callback::Native(f) => Ok(Callable::Native(f)),
        Callback::Text(text) => {
            if !options.text_callbacks {
                return Err(SeqError::TextCallbacksDisabled);
            }
            tracing::debug!(%template, source = %text, "compiling textual callback");
            match expr::compile(&text, template, options) {
                Ok(compiled) => Ok(Callable::Compiled(Rc::new(compiled))),
                Err(err) => {
                    tracing::debug!(%template, source = %text, error = %err, "textual callback rejected");
                    Err(err)
                }
            }
        }
    }
}
