/// TOML configuration (`ragkit.toml`).
pub mod toml_config;
