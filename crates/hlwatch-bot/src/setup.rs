//! Input validation and file writing for the `hlwatch-setup` binary.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use hlwatch_core::UserAddress;
use hlwatch_registry::AddressFile;
use std::fs;
use std::path::Path;
use tracing::info;

/// Check that `token` looks like a Bot API token (`<id>:<secret>`).
pub fn validate_bot_token(token: &str) -> Result<(), String> {
    let token = token.trim();
    if token.is_empty() {
        return Err("bot token must not be empty".to_string());
    }
    if !token.contains(':') {
        return Err("bot token must contain ':'".to_string());
    }
    Ok(())
}

/// Parse a chat id; group chats have negative ids.
pub fn parse_chat_id(input: &str) -> Result<i64, String> {
    match input.trim().parse() {
        Ok(0) => Err("chat id must not be 0".to_string()),
        Ok(id) => Ok(id),
        Err(_) => Err("chat id must be an integer (may be negative)".to_string()),
    }
}

/// Parse a comma-separated list of admin chat ids.
pub fn parse_admins(input: &str) -> Result<Vec<i64>, String> {
    let admins = input
        .split(',')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse()
                .map_err(|_| format!("admin id {part:?} is not an integer"))
        })
        .collect::<Result<Vec<i64>, String>>()?;

    if admins.is_empty() {
        return Err("admin list must not be empty".to_string());
    }
    Ok(admins)
}

pub fn parse_address(input: &str) -> Result<UserAddress, String> {
    UserAddress::parse(input.trim()).map_err(|e| e.to_string())
}

/// Write the config file and the initial address list.
pub fn write_setup(
    config_path: &Path,
    config: &AppConfig,
    addresses: &[UserAddress],
) -> AppResult<()> {
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize config: {e}")))?;
    fs::write(config_path, content)?;
    info!(path = %config_path.display(), "Config written");

    AddressFile::new(config.addresses_path.clone()).save(addresses)?;
    info!(
        path = %config.addresses_path.display(),
        count = addresses.len(),
        "Address list written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const A: &str = "0x5d2f4460ac3514ada79f5d9838916e508ab39bb7";

    #[test]
    fn test_validate_bot_token() {
        assert!(validate_bot_token("123:abc").is_ok());
        assert!(validate_bot_token("").is_err());
        assert!(validate_bot_token("   ").is_err());
        assert!(validate_bot_token("123abc").is_err());
    }

    #[test]
    fn test_parse_chat_id() {
        assert_eq!(parse_chat_id("-100123"), Ok(-100123));
        assert_eq!(parse_chat_id(" 42 "), Ok(42));
        assert!(parse_chat_id("").is_err());
        assert!(parse_chat_id("abc").is_err());
        assert!(parse_chat_id("0").is_err());
    }

    #[test]
    fn test_parse_admins() {
        assert_eq!(parse_admins("-123456789,123456"), Ok(vec![-123456789, 123456]));
        assert_eq!(parse_admins(" 1 , 2 ,"), Ok(vec![1, 2]));
        assert!(parse_admins("").is_err());
        assert!(parse_admins("1,x").is_err());
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address(&format!(" {A} ")).unwrap().as_str(), A);
        assert!(parse_address("0x123").is_err());
    }

    #[test]
    fn test_write_setup() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config").join("default.toml");

        let mut config = AppConfig::default();
        config.addresses_path = dir.path().join("user_addresses.json");
        config.telegram.bot_token = "123:abc".into();
        config.telegram.chat_id = -100;
        config.telegram.admins = vec![1, 2];

        let addresses = vec![parse_address(A).unwrap()];
        write_setup(&config_path, &config, &addresses).unwrap();

        let loaded = AppConfig::from_file(&config_path).unwrap();
        assert_eq!(loaded.telegram.admins, vec![1, 2]);
        assert_eq!(loaded.telegram.chat_id, -100);
        loaded.validate().unwrap();

        let stored = AddressFile::new(&config.addresses_path).load().unwrap();
        assert_eq!(stored, addresses);
    }
}
