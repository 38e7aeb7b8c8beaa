pub mod cli;
pub mod interactive;
pub mod load_config;
pub mod provider;

pub use cli::{run, Cli};
