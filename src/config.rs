use config::{Config, ConfigError, File, FileFormat};
use tracing::{error, info};

use strafe_control::DriveSettings;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

pub fn load_settings() -> Result<DriveSettings, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .build()
        .and_then(Config::try_deserialize::<DriveSettings>);

    match settings {
        Ok(settings) => {
            info!("Successfully loaded configuration: {:?}", settings);
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
