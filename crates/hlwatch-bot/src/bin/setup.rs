//! Interactive first-time setup: writes the config file and the initial
//! address list.

use anyhow::{Context, Result};
use clap::Parser;
use hlwatch_bot::setup::{parse_address, parse_admins, parse_chat_id, validate_bot_token, write_setup};
use hlwatch_bot::AppConfig;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Create the hlwatch configuration interactively
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file to write
    #[arg(short, long, default_value = "config/default.toml")]
    config: PathBuf,

    /// Address list to write
    #[arg(short, long, default_value = "user_addresses.json")]
    addresses: PathBuf,
}

/// Print `label` and read one trimmed line. `None` at end of input.
fn prompt(input: &mut impl BufRead, label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prompt until `parse` accepts the input.
fn prompt_until<T>(
    input: &mut impl BufRead,
    label: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<T> {
    loop {
        let line = prompt(input, label)?.context("input closed before setup finished")?;
        match parse(&line) {
            Ok(value) => return Ok(value),
            Err(e) => println!("Invalid input: {e}"),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let bot_token = prompt_until(&mut input, "Telegram bot token: ", |s| {
        validate_bot_token(s).map(|()| s.to_string())
    })?;
    let chat_id = prompt_until(&mut input, "Telegram chat id: ", parse_chat_id)?;

    println!("\nAdmin chat ids allowed to run commands, comma-separated:");
    let admins = prompt_until(&mut input, "Admins (e.g. -123456789,123456): ", parse_admins)?;

    println!("\nAddresses to track, one per line (empty line to finish):");
    let mut addresses = Vec::new();
    while let Some(line) = prompt(&mut input, "Address: ")? {
        if line.is_empty() {
            break;
        }
        match parse_address(&line) {
            Ok(address) if addresses.contains(&address) => println!("Already added: {address}"),
            Ok(address) => addresses.push(address),
            Err(e) => println!("Invalid address: {e}"),
        }
    }

    let mut config = AppConfig::default();
    config.addresses_path = args.addresses;
    config.telegram.bot_token = bot_token;
    config.telegram.chat_id = chat_id;
    config.telegram.admins = admins;

    write_setup(&args.config, &config, &addresses)?;

    println!(
        "\nSetup complete: wrote {} and {} ({} addresses).",
        args.config.display(),
        config.addresses_path.display(),
        addresses.len()
    );
    Ok(())
}
