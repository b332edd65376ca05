// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

use num_cpus;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{info, warn};
use std::fs::File;
use std::io::prelude::*;

use crate::{exception::ConfigError, request::validate_href_base};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    href_base: Option<String>,
    #[serde(default = "default_root_component")]
    root_component: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    worker_threads: usize,
    #[serde(default = "default_local")]
    local: bool,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    log_dispatch: bool,
}

fn default_root_component() -> String {
    "root".to_string()
}

fn default_port() -> u16 {
    7878
}

fn default_local() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            href_base: None,
            root_component: default_root_component(),
            port: default_port(),
            worker_threads: 0,
            local: default_local(),
            debug: false,
            log_dispatch: false,
        }
    }

    /// 从 TOML 文件读取配置。`href_base` 不合法属于致命错误。
    pub fn from_toml(filename: &str) -> Result<Self, ConfigError> {
        let mut file = File::open(filename)?;
        let mut str_val = String::new();
        file.read_to_string(&mut str_val)?;
        Self::from_toml_str(&str_val)
    }

    pub fn from_toml_str(str_val: &str) -> Result<Self, ConfigError> {
        let mut raw_config: Config = toml::from_str(str_val)?;
        if let Some(base) = &raw_config.href_base {
            validate_href_base(base)?;
        }
        if raw_config.worker_threads == 0 {
            raw_config.worker_threads = num_cpus::get();
            info!("worker_threads 未设置，使用 CPU 核心数：{}", raw_config.worker_threads);
        }
        if raw_config.root_component.is_empty() {
            warn!("root_component 为空，将被改为 root。");
            raw_config.root_component = default_root_component();
        }
        Ok(raw_config)
    }
}

impl Config {
    pub fn href_base(&self) -> Option<&str> {
        self.href_base.as_deref()
    }

    pub fn root_component(&self) -> &str {
        &self.root_component
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn log_dispatch(&self) -> bool {
        self.log_dispatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_from_toml_full() {
        let file = write_config(
            r#"
href_base = "/app"
root_component = "site"
port = 8080
worker_threads = 2
local = false
debug = true
log_dispatch = true
"#,
        );
        let config = Config::from_toml(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.href_base(), Some("/app"));
        assert_eq!(config.root_component(), "site");
        assert_eq!(config.port(), 8080);
        assert_eq!(config.worker_threads(), 2);
        assert!(!config.local());
        assert!(config.debug());
        assert!(config.log_dispatch());
    }

    #[test]
    fn test_defaults() {
        let file = write_config("");
        let config = Config::from_toml(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.href_base(), None);
        assert_eq!(config.root_component(), "root");
        assert_eq!(config.port(), 7878);
        assert!(config.local());
        assert!(config.worker_threads() >= 1);
        assert!(!config.debug());
    }

    #[test]
    fn test_invalid_href_base() {
        let file = write_config("href_base = \"/app/\"\n");
        let result = Config::from_toml(file.path().to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::TrailingSlash(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_toml("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = Config::from_toml_str("port = \"not a number\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
