use serde::Deserialize;
use std::fs::File;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format when no --format is given.
    pub output: String,
    /// Simulated network delay applied before the dataset load completes.
    pub delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output: "table".to_string(),
            delay_ms: 1000,
        }
    }
}

impl Config {
    /// Read the optional config file; defaults apply when it is absent.
    pub fn new(filename: &str) -> Config {
        match File::open(filename) {
            Ok(reader) => serde_yaml::from_reader(reader).expect("invalid config file"),
            Err(_) => Config::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config() {
        let content = r##"output: csv
delay_ms: 250
"##;
        let config: Config = serde_yaml::from_str(content).unwrap();
        assert_eq!(config.output, "csv");
        assert_eq!(config.delay_ms, 250);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: Config = serde_yaml::from_str("output: polar\n").unwrap();
        assert_eq!(config.output, "polar");
        assert_eq!(config.delay_ms, 1000);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::new("does-not-exist.yml");
        assert_eq!(config.output, "table");
        assert_eq!(config.delay_ms, 1000);
    }
}
