//! Demo host configuration: the `[server]` section of `telnet.conf`.
//!
//! Same hand-rolled `[section]` / `key = value` / `#`-comment format this
//! codebase already used for `bbs.conf`, trimmed to the one section this
//! scope still has. A missing file gets a default written out for next time;
//! a present-but-unparseable file is the caller's problem (`main` logs a
//! warning and falls back to `TelnetConfig::default()`).

use crate::errors::ConfigError;

use std::fs;

#[derive(Debug, Clone)]
pub struct TelnetConfig {
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub max_connections: usize,
    pub listen_backlog: i32,
}

impl Default for TelnetConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 2323,
                max_connections: telnet_negotiation::MAX_CONNECTIONS,
                listen_backlog: telnet_negotiation::LISTEN_BACKLOG,
            },
        }
    }
}

impl TelnetConfig {
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse_config(&content),
            Err(_) => {
                let default_config = Self::default();
                let config_content = default_config.to_config_file_format();
                if let Err(e) = fs::write(path, config_content) {
                    eprintln!("! Could not create default config file: {}", e);
                }
                Ok(default_config)
            }
        }
    }

    fn parse_config(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut current_section = String::new();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                current_section = line[1..line.len() - 1].to_string();
                continue;
            }

            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = line[eq_pos + 1..].trim().trim_matches('"');

                match current_section.as_str() {
                    "server" => config.parse_server_config(key, value)?,
                    _ => return Err(ConfigError::UnknownSection(current_section.clone())),
                }
            }
        }

        Ok(config)
    }

    fn parse_server_config(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "bind_address" => {
                self.server.bind_address = value.to_string();
            }
            "port" => {
                self.server.port = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))?;
            }
            "max_connections" => {
                self.server.max_connections = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))?;
            }
            "listen_backlog" => {
                self.server.listen_backlog = value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), value.to_string()))?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    fn to_config_file_format(&self) -> String {
        format!(
            r#"# Moonbase telnet front end configuration
# Lines starting with # are comments

[server]
bind_address = "{}"
port = {}
max_connections = {}
listen_backlog = {}
"#,
            self.server.bind_address,
            self.server.port,
            self.server.max_connections,
            self.server.listen_backlog,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_spec_constants() {
        let config = TelnetConfig::default();
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.port, 2323);
        assert_eq!(config.server.max_connections, 1000);
        assert_eq!(config.server.listen_backlog, 5);
    }

    #[test]
    fn test_parse_overrides_defaults() {
        let content = r#"
[server]
bind_address = "0.0.0.0"
port = 23
max_connections = 10
listen_backlog = 1
"#;
        let config = TelnetConfig::parse_config(content).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.port, 23);
        assert_eq!(config.server.max_connections, 10);
        assert_eq!(config.server.listen_backlog, 1);
    }

    #[test]
    fn test_parse_missing_keys_keep_defaults() {
        let content = "[server]\nport = 9000\n";
        let config = TelnetConfig::parse_config(content).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.max_connections, 1000);
    }

    #[test]
    fn test_unknown_key_is_error() {
        let content = "[server]\nbogus = 1\n";
        assert!(matches!(
            TelnetConfig::parse_config(content),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_unknown_section_is_error() {
        let content = "[ui]\nbox_style = \"ascii\"\n";
        assert!(matches!(
            TelnetConfig::parse_config(content),
            Err(ConfigError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_load_from_file_creates_default_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telnet.conf");
        let path_str = path.to_str().unwrap();

        let config = TelnetConfig::load_from_file(path_str).unwrap();
        assert_eq!(config.server.port, 2323);
        assert!(path.exists());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("[server]"));
        assert!(written.contains("port = 2323"));
    }
}
