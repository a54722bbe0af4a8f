use serde::{Deserialize, Serialize};

use crate::target::TargetQuery;

/// Account data as the platform reports it. Every field but `id` may be
/// missing; the renderer prints `N/A` for absent text, `false` for absent
/// flags and `0` for absent counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub verified: bool,
    pub premium: bool,
    pub bot: bool,
    pub restricted: bool,
    pub scam: bool,
    pub fake: bool,
    pub status: Option<String>,
    pub dc_id: Option<i32>,
    pub lang_code: Option<String>,
    /// Local path of a downloaded profile photo.
    pub photo: Option<String>,
    pub photo_id: Option<i64>,
    pub common_chats_count: u32,
    pub last_seen: Option<String>,
    pub bio: Option<String>,
}

pub(crate) const NOT_AVAILABLE: &str = "N/A";

pub(crate) fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        format!("{} {}", or_na(&self.first_name), or_na(&self.last_name))
    }

    /// Username without `@`, or `unknown`.
    pub fn handle(&self) -> &str {
        self.username
            .as_deref()
            .map(|u| u.trim_start_matches('@'))
            .filter(|u| !u.is_empty())
            .unwrap_or("unknown")
    }

    /// Whether this profile is what `query` asks for.
    pub fn matches(&self, query: &TargetQuery) -> bool {
        match query {
            TargetQuery::Phone(digits) => {
                self.id.to_string() == *digits
                    || self
                        .phone
                        .as_deref()
                        .map(|p| p.trim_start_matches('+') == digits.trim_start_matches('+'))
                        .unwrap_or(false)
            }
            TargetQuery::Username(handle) => {
                let wanted = handle.trim_start_matches('@');
                self.username
                    .as_deref()
                    .map(|u| u.trim_start_matches('@').eq_ignore_ascii_case(wanted))
                    .unwrap_or(false)
            }
            TargetQuery::Name { name, .. } => {
                let full = [self.first_name.as_deref(), self.last_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                !full.is_empty() && full.to_lowercase() == name.trim().to_lowercase()
            }
        }
    }
}
