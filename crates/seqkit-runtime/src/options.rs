//! Runtime policies carried by every sequence
//!
//! Sequences hold an `Rc<Options>`; sequences derived from them (copies,
//! slices, `flat` results...) inherit the same options.

use seqkit_config::{SeqkitConfig, DEFAULT_MAX_EXPRESSION_DEPTH, DEFAULT_MAX_EXPRESSION_LENGTH};

pub use seqkit_config::OverlapMode;

/// What `flat` drops when it appends a non-sequence value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FalsyPolicy {
    /// Drop `nil` and `false` (compatible with the reference behavior)
    #[default]
    DropFalsy,
    /// Drop only `nil`
    DropNil,
}

/// Runtime options
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Accept textual callbacks
    pub text_callbacks: bool,
    /// Maximum expression source length in bytes
    pub max_expression_length: usize,
    /// Maximum expression nesting depth
    pub max_expression_depth: usize,
    /// `flat` dropping policy
    pub flat_falsy: FalsyPolicy,
    /// `copy_within` overlap handling
    pub overlap: OverlapMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            text_callbacks: true,
            max_expression_length: DEFAULT_MAX_EXPRESSION_LENGTH,
            max_expression_depth: DEFAULT_MAX_EXPRESSION_DEPTH,
            flat_falsy: FalsyPolicy::DropFalsy,
            overlap: OverlapMode::Forward,
        }
    }
}

impl Options {
    /// Build runtime options from merged configuration
    pub fn from_config(config: &SeqkitConfig) -> Self {
        Self {
            text_callbacks: config.text_callbacks_enabled(),
            max_expression_length: config.max_expression_length(),
            max_expression_depth: config.max_expression_depth(),
            flat_falsy: if config.flat_drops_falsy() {
                FalsyPolicy::DropFalsy
            } else {
                FalsyPolicy::DropNil
            },
            overlap: config.overlap_mode(),
        }
    }

    /// Options with textual callbacks switched off
    pub fn native_only() -> Self {
        Self {
            text_callbacks: false,
            ..Self::default()
        }
    }

    /// Whether `flat` should drop this value instead of appending it
    pub(crate) fn flat_drops(&self, value: &crate::Value) -> bool {
        match self.flat_falsy {
            FalsyPolicy::DropFalsy => !value.is_truthy(),
            FalsyPolicy::DropNil => value.is_nil(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn test_from_config() {
        let config = SeqkitConfig::parse(
            r#"
[callbacks]
text = false

[flat]
drop_falsy = false

[copy_within]
overlap = "memmove"
"#,
        )
        .unwrap();

        let options = Options::from_config(&config);
        assert!(!options.text_callbacks);
        assert_eq!(options.flat_falsy, FalsyPolicy::DropNil);
        assert_eq!(options.overlap, OverlapMode::Memmove);
    }

    #[test]
    fn test_default_config_matches_default_options() {
        assert_eq!(
            Options::from_config(&SeqkitConfig::default()),
            Options::default()
        );
    }

    #[test]
    fn test_flat_drops() {
        let compat = Options::default();
        assert!(compat.flat_drops(&Value::Bool(false)));
        assert!(!compat.flat_drops(&Value::from(0)));

        let strict = Options {
            flat_falsy: FalsyPolicy::DropNil,
            ..Options::default()
        };
        assert!(!strict.flat_drops(&Value::Bool(false)));
        assert!(strict.flat_drops(&Value::Nil));
    }
}
