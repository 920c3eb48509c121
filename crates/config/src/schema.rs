//! Configuration schema. Every field defaults so a partial file loads.

use serde::{Deserialize, Serialize};

/// Default gateway port when none has been chosen yet.
pub const DEFAULT_GATEWAY_PORT: u16 = 18789;

/// Root configuration, serialized as `waypoint.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub identity: AgentIdentity,
    pub user: UserProfile,
    pub agent: AgentConfig,
    pub gateway: GatewayConfig,
}

/// How the agent presents itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Who the agent is talking to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Directory the agent works in. Stored expanded (no `~`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_GATEWAY_PORT,
            auth_token: None,
        }
    }
}

impl Config {
    /// Collapse whitespace-only strings to `None` so the saved file never
    /// carries empty keys.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.identity.name = non_empty(self.identity.name);
        self.identity.emoji = non_empty(self.identity.emoji);
        self.user.name = non_empty(self.user.name);
        self.user.timezone = non_empty(self.user.timezone);
        self.agent.workspace = non_empty(self.agent.workspace);
        self.gateway.auth_token = non_empty(self.gateway.auth_token);
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_loads_with_defaults() {
        let cfg: Config = toml::from_str("[identity]\nname = \"pat\"\n").unwrap();
        assert_eq!(cfg.identity.name.as_deref(), Some("pat"));
        assert_eq!(cfg.gateway.port, DEFAULT_GATEWAY_PORT);
        assert_eq!(cfg.user, UserProfile::default());
    }

    #[test]
    fn normalized_drops_blank_strings() {
        let cfg = Config {
            identity: AgentIdentity {
                name: Some("  ".into()),
                emoji: Some("🦞".into()),
            },
            ..Config::default()
        }
        .normalized();
        assert_eq!(cfg.identity.name, None);
        assert_eq!(cfg.identity.emoji.as_deref(), Some("🦞"));
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = Config {
            user: UserProfile {
                name: Some("Ada".into()),
                timezone: None,
            },
            gateway: GatewayConfig {
                port: 9100,
                auth_token: Some("tok".into()),
            },
            ..Config::default()
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }
}
