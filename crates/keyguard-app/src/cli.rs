use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "keyguard", about = "Unlock an Android device's lock screen over adb")]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Device serial, overrides the config file
    #[arg(long, global = true)]
    pub serial: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Unlock the device if its screen is locked
    Unlock {
        /// pin, pinWithKeyEvent, password, pattern or fingerprint
        #[arg(long = "type")]
        unlock_type: String,
        #[arg(long)]
        key: String,
        /// uiautomator (simulate input) or locksettings (clear and restore the credential)
        #[arg(long, default_value = "uiautomator")]
        strategy: String,
    },

    /// Check an unlock type and key without touching the device
    Validate {
        #[arg(long = "type")]
        unlock_type: String,
        #[arg(long)]
        key: String,
    },

    /// Print the touch actions that draw a pattern
    Pattern {
        #[arg(long)]
        key: String,
        /// Left edge of the pattern view
        #[arg(long, allow_negative_numbers = true)]
        x: i32,
        /// Top edge of the pattern view
        #[arg(long, allow_negative_numbers = true)]
        y: i32,
        /// Cell size (pattern view width / 3)
        #[arg(long)]
        cell: f64,
    },

    /// Show API level and lock state
    Status,
}
