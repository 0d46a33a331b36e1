#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Runtime is entered by the binary's `#[tokio::main]`
use tokio as _;

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{Session, bootstrap};
pub use config::{LaunchMode, WrapperConfig};
pub use error::CliError;
pub use parser::Cli;
