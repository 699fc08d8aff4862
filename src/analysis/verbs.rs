//! Template suffix matching and the accepted-verb policy.

use serde::{Deserialize, Serialize};

const MESSAGE_ANY: &str =
    r#"invalid format for fmt.Errorf. Use "...: %v" or "...: %w" to format errors"#;
const MESSAGE_WRAP_ONLY: &str = r#"invalid format for fmt.Errorf. Use "...: %w" to format errors"#;

/// The two sanctioned ways of rendering an underlying error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    /// `%v`: the error's text only.
    Display,
    /// `%w`: the text plus the error kept as an unwrappable cause.
    Wrap,
}

impl Verb {
    pub fn suffix(self) -> &'static str {
        match self {
            Verb::Display => ": %v",
            Verb::Wrap => ": %w",
        }
    }
}

/// The verb whose suffix (separator included) ends `template`.
pub fn trailing_verb(template: &str) -> Option<Verb> {
    [Verb::Wrap, Verb::Display]
        .into_iter()
        .find(|verb| template.ends_with(verb.suffix()))
}

/// Which trailing verbs are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Policy {
    #[serde(rename = "wraponly")]
    pub wrap_only: bool,
}

impl Policy {
    pub const PERMISSIVE: Policy = Policy { wrap_only: false };
    pub const WRAP_ONLY: Policy = Policy { wrap_only: true };

    pub fn accepts_verb(&self, verb: Verb) -> bool {
        match verb {
            Verb::Wrap => true,
            Verb::Display => !self.wrap_only,
        }
    }

    /// The trailing verb of `template` when this policy accepts it.
    pub fn accepted_verb(&self, template: &str) -> Option<Verb> {
        trailing_verb(template).filter(|&verb| self.accepts_verb(verb))
    }

    /// Diagnostic text for a rejected template.
    pub fn message(&self) -> &'static str {
        if self.wrap_only {
            MESSAGE_WRAP_ONLY
        } else {
            MESSAGE_ANY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_verb() {
        assert_eq!(trailing_verb("err: %w"), Some(Verb::Wrap));
        assert_eq!(trailing_verb("open config: %v"), Some(Verb::Display));
        assert_eq!(trailing_verb("err=%w"), None);
        assert_eq!(trailing_verb("err: %s"), None);
        assert_eq!(trailing_verb("err: %v: suffix"), None);
        assert_eq!(trailing_verb(": %v"), Some(Verb::Display));
        assert_eq!(trailing_verb(""), None);
    }

    #[test]
    fn test_permissive_accepts_both_verbs() {
        let policy = Policy::PERMISSIVE;
        assert_eq!(policy.accepted_verb("read file: %v"), Some(Verb::Display));
        assert_eq!(policy.accepted_verb("read file: %w"), Some(Verb::Wrap));
        assert_eq!(policy.accepted_verb("read file %v"), None);
        assert_eq!(policy.accepted_verb("read file: %s"), None);
    }

    #[test]
    fn test_wrap_only_accepts_wrap() {
        let policy = Policy::WRAP_ONLY;
        assert_eq!(policy.accepted_verb("read file: %w"), Some(Verb::Wrap));
        assert_eq!(policy.accepted_verb("read file: %v"), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Policy::PERMISSIVE.message(),
            r#"invalid format for fmt.Errorf. Use "...: %v" or "...: %w" to format errors"#
        );
        assert_eq!(
            Policy::WRAP_ONLY.message(),
            r#"invalid format for fmt.Errorf. Use "...: %w" to format errors"#
        );
    }
}
