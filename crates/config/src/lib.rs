//! Configuration loading, validation defaults, and env substitution.
//!
//! Config files: `ainx.toml`, `ainx.yaml`, or `ainx.json`
//! Searched in `./` then `~/.config/ainx/`.
//!
//! Supports `${ENV_VAR}` substitution in the raw file text.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{AgentEntry, AgentKind, AinxConfig, BusSettings, LogSettings, RouterSettings},
};
