use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_EMOJI: &str = "🚀";
pub const DEFAULT_SAVINGS_GOAL_PERCENT: f64 = 20.0;
pub const DEFAULT_DISPLAY_NAME: &str = "INVESTIDOR";

/// User preferences kept in the identity provider's user metadata.
///
/// Every field is optional on the wire; use [`UserProfile::resolve`] to get
/// the values the dashboard actually shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub emoji: Option<String>,

    /// Target savings rate in percent
    #[serde(rename = "meta_save", default)]
    pub savings_goal_percent: Option<f64>,

    #[serde(default)]
    pub dark_mode: Option<bool>,
}

/// Profile values with defaults filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProfile {
    pub display_name: String,
    pub emoji: String,
    pub savings_goal_percent: f64,
    pub dark_mode: bool,
}

impl UserProfile {
    /// Fill in defaults. The display name falls back to the uppercased
    /// local part of the e-mail address.
    pub fn resolve(&self, email: Option<&str>) -> ResolvedProfile {
        let display_name = self
            .display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                email
                    .and_then(|e| e.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_uppercase)
            })
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        ResolvedProfile {
            display_name,
            emoji: self
                .emoji
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EMOJI.to_string()),
            savings_goal_percent: self
                .savings_goal_percent
                .filter(|p| p.is_finite() && *p > 0.0)
                .unwrap_or(DEFAULT_SAVINGS_GOAL_PERCENT),
            dark_mode: self.dark_mode.unwrap_or(false),
        }
    }

    /// Merge a partial update; fields absent from the patch are kept.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(name) = &patch.display_name {
            self.display_name = Some(name.clone());
        }
        if let Some(emoji) = &patch.emoji {
            self.emoji = Some(emoji.clone());
        }
        if let Some(percent) = patch.savings_goal_percent {
            self.savings_goal_percent = Some(percent);
        }
        if let Some(dark) = patch.dark_mode {
            self.dark_mode = Some(dark);
        }
    }
}

/// Partial metadata update sent to the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    #[serde(rename = "meta_save", skip_serializing_if = "Option::is_none")]
    pub savings_goal_percent: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.emoji.is_none()
            && self.savings_goal_percent.is_none()
            && self.dark_mode.is_none()
    }
}

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(rename = "user_metadata", default)]
    pub metadata: UserProfile,
}

impl CurrentUser {
    pub fn profile(&self) -> ResolvedProfile {
        self.metadata.resolve(self.email.as_deref())
    }
}
