//! Hostlock operator tool.
//!
//! Prints the current machine's hardware fingerprint (the value a
//! customer sends in when requesting a hardware-bound license), issues
//! signed license keys, and checks existing keys against this machine.
//!
//! Usage:
//!   hostlock hwid
//!   hostlock issue --name "Acme" --email a@acme.com --expiry-days 365
//!   hostlock check <KEY>

use anyhow::Result;
use clap::{Parser, Subcommand};
use hostlock_hwid::{HardwareId, SystemInfo};
use hostlock_license::{
    encode_key, IssueOptions, LicenseConfig, LicenseManager, SigningSecret,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "hostlock")]
#[command(about = "Hardware-bound license tooling")]
struct Args {
    /// Enable verbose debug logging (shows probe fallbacks)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print this machine's hardware fingerprint
    Hwid {
        /// Hash only the MAC address and disk serial
        #[arg(long)]
        short: bool,
    },
    /// Print the collected system attributes as JSON
    Info,
    /// Issue a signed license key for a customer
    Issue {
        /// Customer name
        #[arg(long)]
        name: String,
        /// Customer email
        #[arg(long)]
        email: String,
        /// Days until the license expires
        #[arg(long, default_value_t = 365)]
        expiry_days: i64,
        /// Maximum concurrent users
        #[arg(long, default_value_t = 1)]
        max_users: u32,
        /// Shared signing secret
        #[arg(long, env = "LICENSE_SECRET", hide_env_values = true)]
        secret: String,
    },
    /// Check a license key against this machine (exit 1 when invalid)
    Check {
        /// The license key
        #[arg(env = "LICENSE_KEY")]
        key: String,
        /// Shared signing secret
        #[arg(long, env = "LICENSE_SECRET", hide_env_values = true)]
        secret: String,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    match args.command {
        Command::Hwid { short } => {
            let id = if short {
                HardwareId::current_short()
            } else {
                HardwareId::current()
            };
            println!("{id}");
        }
        Command::Info => {
            println!("{}", serde_json::to_string_pretty(&SystemInfo::collect())?);
        }
        Command::Issue {
            name,
            email,
            expiry_days,
            max_users,
            secret,
        } => {
            let secret = SigningSecret::new(secret)?;
            let manager = LicenseManager::new(LicenseConfig::new(None, secret));
            let record = manager.generate_license(
                &name,
                &email,
                IssueOptions {
                    expiry_days,
                    max_users,
                    features: None,
                },
            )?;
            eprintln!("license id: {}", record.license_id);
            eprintln!("expires:    {}", record.expiry_date);
            println!("{}", encode_key(&record)?);
        }
        Command::Check { key, secret } => {
            let secret = SigningSecret::new(secret)?;
            let manager = LicenseManager::new(LicenseConfig::new(Some(key), secret));
            let validation = manager.check_license();
            println!("{}", validation.message);
            if !validation.is_valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
