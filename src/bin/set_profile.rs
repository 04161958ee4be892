//! Set the user profile from the command line.
//!
//! Usage: set_profile <height> <inches|cm> <age> <male|female>

use fittrack::config::ServerConfig;
use fittrack::models::{Gender, HeightUnit, UserProfileUpdate, Validate};
use fittrack::storage::{create_storage, StorageBackend};
use rust_decimal::Decimal;

const USAGE: &str = "Usage: set_profile <height> <inches|cm> <age> <male|female>";

fn parse_args(args: &[String]) -> Result<UserProfileUpdate, String> {
    let [height, unit, age, gender] = args else {
        return Err(USAGE.to_string());
    };

    let height: Decimal = height
        .parse()
        .map_err(|_| format!("Invalid height '{}'", height))?;
    let height_unit =
        HeightUnit::from_str(unit).ok_or_else(|| format!("Invalid height unit '{}'", unit))?;
    let age: i64 = age.parse().map_err(|_| format!("Invalid age '{}'", age))?;
    let gender = Gender::from_str(gender).ok_or_else(|| format!("Invalid gender '{}'", gender))?;

    let update = UserProfileUpdate {
        height: Some(height),
        height_unit,
        age: Some(age),
        gender,
    };
    update.validate().map_err(|errors| {
        errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join(", ")
    })?;
    Ok(update)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let update = match parse_args(&args) {
        Ok(update) => update,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    let config = ServerConfig::from_env()?;
    if config.backend == StorageBackend::Memory {
        eprintln!("Warning: the memory backend does not keep data after exit");
    } else {
        println!("Database path: {}", config.database);
    }

    let storage = create_storage(config.backend, config.database);
    storage.connect().await?;

    let profile = storage.update_user_profile(update).await?;
    println!("Profile set:");
    if let Some(height) = profile.height {
        println!("  Height: {} {}", height, profile.height_unit.as_str());
    }
    if let Some(age) = profile.age {
        println!("  Age: {}", age);
    }
    println!("  Gender: {}", profile.gender.as_str());
    println!("  Updated: {}", profile.updated_at);

    storage.disconnect().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let update = parse_args(&args(&["180", "cm", "30", "female"])).unwrap();
        assert_eq!(update.height, Some(Decimal::from(180)));
        assert_eq!(update.height_unit, HeightUnit::Cm);
        assert_eq!(update.age, Some(30));
        assert_eq!(update.gender, Gender::Female);
    }

    #[test]
    fn test_parse_args_rejects_bad_input() {
        assert_eq!(parse_args(&args(&["180"])).unwrap_err(), USAGE);
        assert!(parse_args(&args(&["tall", "cm", "30", "male"])).is_err());
        assert!(parse_args(&args(&["70", "feet", "30", "male"])).is_err());
        assert!(parse_args(&args(&["70", "in", "-3", "male"])).is_err());
    }
}
