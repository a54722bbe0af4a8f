use std::fmt;

use serde::{Deserialize, Serialize};

/// What the operator typed, classified the way the platform looks it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TargetQuery {
    Phone(String),
    /// Always carries the leading `@`.
    Username(String),
    Name { name: String, suggested: String },
}

impl TargetQuery {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
            return TargetQuery::Phone(input.to_string());
        }
        if input.starts_with('@') {
            return TargetQuery::Username(input.to_string());
        }
        if input.contains(' ') {
            let suggested = format!("@{}", input.replace(' ', "").to_lowercase());
            return TargetQuery::Name {
                name: input.to_string(),
                suggested,
            };
        }
        TargetQuery::Username(format!("@{input}"))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TargetQuery::Phone(_) => "phone",
            TargetQuery::Username(_) => "username",
            TargetQuery::Name { .. } => "name",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            TargetQuery::Phone(v) | TargetQuery::Username(v) => v,
            TargetQuery::Name { name, .. } => name,
        }
    }
}

impl fmt::Display for TargetQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value(), self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_inputs() {
        assert_eq!(
            TargetQuery::parse(" 34123456789 "),
            TargetQuery::Phone("34123456789".into())
        );
        assert_eq!(
            TargetQuery::parse("@marysan"),
            TargetQuery::Username("@marysan".into())
        );
        assert_eq!(
            TargetQuery::parse("marysan"),
            TargetQuery::Username("@marysan".into())
        );
        assert_eq!(
            TargetQuery::parse("Mary San"),
            TargetQuery::Name {
                name: "Mary San".into(),
                suggested: "@marysan".into()
            }
        );
    }

    #[test]
    fn plus_prefixed_phone_is_a_username_lookup() {
        // Only bare digits are treated as phone numbers.
        assert_eq!(TargetQuery::parse("+34600").kind(), "username");
    }

    #[test]
    fn display_shows_value_and_kind() {
        assert_eq!(TargetQuery::parse("Mary San").to_string(), "Mary San (name)");
    }
}
