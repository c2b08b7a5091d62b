use crate::config::validate_provider;
use crate::core::{BoardCommand, ConfigProvider, MapView, OutputFormat};
use crate::domain::model::{DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, DEFAULT_TILE_URL};
use crate::utils::error::{BoardError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub map: MapConfig,
    pub output: OutputConfig,

    /// `board.commands` after parsing.
    #[serde(skip)]
    commands: Vec<BoardCommand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// `[latitude, longitude]`
    pub center: Option<[f64; 2]>,
    pub zoom: Option<u8>,
    pub tile_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<OutputFormat>,
    pub bundle: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，並解析看板指令
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: TomlConfig =
            toml::from_str(&processed_content).map_err(|e| BoardError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        config.commands = config
            .board
            .commands
            .iter()
            .map(|raw| raw.parse::<BoardCommand>())
            .collect::<Result<Vec<BoardCommand>>>()?;

        Ok(config)
    }

    /// 替換環境變數 (例如 ${API_HOST})，未定義的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BoardError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }

    fn commands(&self) -> &[BoardCommand] {
        &self.commands
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.output.formats
    }

    fn bundle(&self) -> bool {
        self.output.bundle.unwrap_or(false)
    }

    fn map_view(&self) -> MapView {
        MapView {
            center: self.map.center.unwrap_or(DEFAULT_MAP_CENTER),
            zoom: self.map.zoom.unwrap_or(DEFAULT_MAP_ZOOM),
            tile_url: self
                .map
                .tile_url
                .clone()
                .unwrap_or_else(|| DEFAULT_TILE_URL.to_string()),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
