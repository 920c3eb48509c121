//! Configuration schema and persistence.
//!
//! Config file: `waypoint.toml`, searched in `./` then the user-global
//! config directory (`~/.config/waypoint/` by default).

pub mod loader;
pub mod schema;

pub use {
    loader::{
        clear_config_dir, config_dir, discover_and_load, find_or_default_config_path, load_config,
        save_config, set_config_dir,
    },
    schema::{AgentConfig, AgentIdentity, Config, GatewayConfig, UserProfile},
};
