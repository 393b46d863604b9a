pub mod toml_loader;

pub use toml_loader::{load_params_from_toml, parse_params};
