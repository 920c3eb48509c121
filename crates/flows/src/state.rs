//! Domain state the setup flows operate on.

use std::path::PathBuf;

use waypoint_config::Config;

use waypoint_wizard::Transition;

/// Which top-level command started the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupCommand {
    Onboard,
    Configure,
}

/// A configurable area of the setup, selectable in configure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupSection {
    Identity,
    Workspace,
    Gateway,
}

/// Canonical ordering; section runs always follow this order regardless of
/// selection order.
pub const SECTION_ORDER: &[SetupSection] = &[
    SetupSection::Identity,
    SetupSection::Workspace,
    SetupSection::Gateway,
];

impl SetupSection {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "identity" => Some(Self::Identity),
            "workspace" => Some(Self::Workspace),
            "gateway" => Some(Self::Gateway),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Workspace => "workspace",
            Self::Gateway => "gateway",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Workspace => "Workspace",
            Self::Gateway => "Gateway",
        }
    }

    /// First step of the section in the merged flow.
    pub fn entry_id(self) -> &'static str {
        match self {
            Self::Identity => "identity.agent_name",
            Self::Workspace => "workspace.path",
            Self::Gateway => "gateway.port",
        }
    }
}

/// Reorder a selection into [`SECTION_ORDER`], dropping duplicates.
pub fn normalize_section_selection(selection: &[SetupSection]) -> Vec<SetupSection> {
    SECTION_ORDER
        .iter()
        .copied()
        .filter(|section| selection.contains(section))
        .collect()
}

/// Flow domain state. Cloned by the engine for back-navigation snapshots, so
/// everything here must be cheap-ish to clone and free of live resources.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupState {
    pub command: SetupCommand,
    /// Last config committed to the store.
    pub base_config: Config,
    /// Pending edits, committed by the apply steps.
    pub draft_config: Config,
    pub workspace_dir: String,
    pub gateway_port: u16,
    /// Sections still to run in configure mode, with `section_index` as the
    /// cursor into it.
    pub sections: Vec<SetupSection>,
    pub section_index: usize,
}

impl SetupState {
    pub fn new(
        command: SetupCommand,
        base: Config,
        workspace: Option<String>,
        sections: Vec<SetupSection>,
    ) -> Self {
        let workspace_dir = resolve_user_path(
            workspace
                .or_else(|| base.agent.workspace.clone())
                .unwrap_or_else(default_workspace)
                .trim(),
        );
        let gateway_port = base.gateway.port;
        Self {
            command,
            draft_config: base.clone(),
            base_config: base,
            workspace_dir,
            gateway_port,
            sections: normalize_section_selection(&sections),
            section_index: 0,
        }
    }
}

/// Advance the section cursor and return the transition into the next
/// selected section, or to `fallback` once the selection is exhausted.
pub(crate) fn next_selected_section(state: &mut SetupState, fallback: &str) -> Transition {
    let Some(section) = state.sections.get(state.section_index).copied() else {
        return Transition::goto(fallback);
    };
    state.section_index += 1;
    Transition::goto(section.entry_id())
}

/// Default workspace directory when neither the config nor the caller names
/// one.
pub fn default_workspace() -> String {
    "~/waypoint".to_string()
}

/// Expand a leading `~` to the user's home directory.
pub fn resolve_user_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed == "~" || trimmed.starts_with("~/") {
        if let Some(dirs) = directories::UserDirs::new() {
            let mut expanded = PathBuf::from(dirs.home_dir());
            if let Some(rest) = trimmed.strip_prefix("~/") {
                expanded.push(rest);
            }
            return expanded.to_string_lossy().into_owned();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_normalized_to_canonical_order() {
        let selection = [
            SetupSection::Gateway,
            SetupSection::Identity,
            SetupSection::Identity,
        ];
        assert_eq!(
            normalize_section_selection(&selection),
            vec![SetupSection::Identity, SetupSection::Gateway],
        );
    }

    #[test]
    fn section_cursor_walks_selection_then_falls_back() {
        let mut state = SetupState::new(
            SetupCommand::Configure,
            Config::default(),
            None,
            vec![SetupSection::Workspace, SetupSection::Gateway],
        );
        assert_eq!(
            next_selected_section(&mut state, "finish"),
            Transition::goto("workspace.path"),
        );
        assert_eq!(
            next_selected_section(&mut state, "finish"),
            Transition::goto("gateway.port"),
        );
        assert_eq!(
            next_selected_section(&mut state, "finish"),
            Transition::goto("finish"),
        );
    }

    #[test]
    fn workspace_override_wins_over_config() {
        let mut base = Config::default();
        base.agent.workspace = Some("/srv/agent".into());
        let state = SetupState::new(
            SetupCommand::Onboard,
            base.clone(),
            Some("/tmp/elsewhere".into()),
            vec![],
        );
        assert_eq!(state.workspace_dir, "/tmp/elsewhere");

        let state = SetupState::new(SetupCommand::Onboard, base, None, vec![]);
        assert_eq!(state.workspace_dir, "/srv/agent");
    }

    #[test]
    fn tilde_paths_expand_to_home() {
        let expanded = resolve_user_path("~/projects");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/projects"));
        assert_eq!(resolve_user_path("/absolute"), "/absolute");
    }
}
