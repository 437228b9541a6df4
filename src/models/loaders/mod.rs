pub mod toml_loader;

pub use toml_loader::{load_builtin_catalog, load_catalog_file, parse_catalog};
