//! CLI module for the user service
//!
//! - `serve`: run the HTTP service (default)
//! - `hash-password`: print a password hash for provisioning accounts

pub mod hash;
pub mod serve;

use clap::{Parser, Subcommand};

/// User Service - issues and verifies JWT bearer tokens
#[derive(Parser)]
#[command(name = "user-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Hash a password with the configured scheme
    HashPassword(hash::HashArgs),
}
