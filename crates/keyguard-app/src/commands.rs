use anyhow::Result;
use keyguard_core::config::AppConfig;
use keyguard_core::geometry::{gesture_actions, parse_pattern_digits};
use keyguard_core::types::Position;
use keyguard_core::{validate_unlock_capabilities, DeviceControl, UnlockType};
use keyguard_unlock::{UnlockOutcome, UnlockRequest, UnlockStrategy};

use crate::setup::{create_device, create_unlocker};

pub async fn unlock(
    config: &AppConfig,
    unlock_type: String,
    key: String,
    strategy: String,
) -> Result<()> {
    let strategy: UnlockStrategy = strategy.parse()?;
    let unlocker = create_unlocker(config);
    let request = UnlockRequest {
        unlock_type,
        unlock_key: key,
        strategy,
    };
    match unlocker.unlock(&request).await? {
        UnlockOutcome::AlreadyUnlocked => println!("already unlocked"),
        UnlockOutcome::Unlocked => println!("unlocked"),
    }
    Ok(())
}

pub fn validate(unlock_type: String, key: String) -> Result<()> {
    let caps = validate_unlock_capabilities(&unlock_type, &key)?;
    println!("ok: {}", caps.unlock_type);
    Ok(())
}

pub fn pattern(key: String, x: i32, y: i32, cell: f64) -> Result<()> {
    validate_unlock_capabilities(UnlockType::Pattern.as_str(), &key)?;
    if !(cell.is_finite() && cell > 0.0) {
        anyhow::bail!("Cell size must be a positive number, got {cell}");
    }
    let digits = parse_pattern_digits(&key)?;
    let actions = gesture_actions(&digits, Position::new(x, y), cell);
    println!("{}", serde_json::to_string_pretty(&actions)?);
    Ok(())
}

pub async fn status(config: &AppConfig) -> Result<()> {
    let device = create_device(config);
    let api_level = device.api_level().await?;
    let locked = device.is_screen_locked().await?;
    println!("api_level\t{api_level}");
    println!("locked\t{locked}");
    Ok(())
}
