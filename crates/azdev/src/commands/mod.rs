pub mod aks;
pub mod auth;
pub mod config;
pub mod func;
pub mod keyvault;
pub mod resource;
pub mod spring;

use colored::Colorize;

/// `  label: value` with a dimmed label
pub(crate) fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", format!("{}:", label).dimmed(), value);
}
