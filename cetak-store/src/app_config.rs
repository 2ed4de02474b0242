use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub nota: NotaConfig,
}

/// Invoice numbering defaults, used to seed the counter on first start.
/// Runtime changes go through the engine's settings operation, not here.
#[derive(Debug, Deserialize, Clone)]
pub struct NotaConfig {
    pub prefix: String,
    pub start_number: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("nota.prefix", "INV")?
            .set_default("nota.start_number", "001")?
            // Optional configuration files, per run mode
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `CETAK__NOTA__PREFIX=NOTA` overrides the prefix
            .add_source(config::Environment::with_prefix("CETAK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
