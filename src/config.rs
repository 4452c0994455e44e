use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::llm::openai::DEFAULT_BASE_URL;
use crate::store::supabase::DEFAULT_TABLE;
use crate::store::StoreConfig;

const ENV_PREFIX: &str = "BROODJE";

/// Top-level application configuration loaded from file + environment.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingSection,
    pub llm: LlmSection,
    pub store: StoreSection,
    pub trigger: TriggerSection,
    pub worker: WorkerSection,
}

impl AppConfig {
    /// Load configuration from disk and environment.
    pub fn load() -> Result<Self> {
        let vars: HashMap<String, String> = env::vars().collect();
        let config_path = vars
            .get("BROODJE_CONFIG")
            .cloned()
            .unwrap_or_else(|| "config.toml".to_string());

        Self::load_from(Path::new(&config_path), &vars)
    }

    /// Load configuration from `path` (skipped when absent) layered under the
    /// given environment variables.
    pub fn load_from(path: &Path, vars: &HashMap<String, String>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if path.exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(
                    vars.iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect::<config::Map<String, String>>(),
                )),
        );

        let settings = builder.build()?;
        let mut config: Self = settings.try_deserialize()?;

        config.apply_conventional_env(|name| vars.get(name).cloned());

        if config.logging.level.trim().is_empty() {
            config.logging.level = "info".to_string();
        }

        Ok(config)
    }

    /// Fill gaps from the variable names the LLM and datastore providers
    /// document (`OPENAI_API_KEY`, `SUPABASE_URL`, `SUPABASE_KEY`).
    ///
    /// Supabase credentials only select the Supabase backend when no backend
    /// was set explicitly, in the file or through `BROODJE_STORE__BACKEND`.
    pub fn apply_conventional_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        }

        let url = lookup("SUPABASE_URL");
        let key = lookup("SUPABASE_KEY").or_else(|| lookup("SUPABASE_SERVICE_ROLE_KEY"));

        if url.is_none() && key.is_none() {
            return;
        }

        let backend_chosen = self.store.backend.is_some();

        let section = self.store.supabase.get_or_insert_with(SupabaseSection::default);
        if section.url.trim().is_empty() {
            if let Some(url) = url {
                section.url = url;
            }
        }
        if section.key.trim().is_empty() {
            if let Some(key) = key {
                section.key = key;
            }
        }

        if !backend_chosen && !section.url.is_empty() && !section.key.is_empty() {
            self.store.backend = Some(StoreBackendKind::Supabase);
        }
    }

    /// Resolve and validate the store configuration.
    pub fn store_runtime(&self) -> Result<StoreConfig> {
        self.store.to_runtime()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl LlmSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StoreSection {
    /// `None` until set by the file or environment; resolves to memory
    pub backend: Option<StoreBackendKind>,
    pub supabase: Option<SupabaseSection>,
}

impl StoreSection {
    pub fn to_runtime(&self) -> Result<StoreConfig> {
        match self.backend.clone().unwrap_or_default() {
            StoreBackendKind::Memory => Ok(StoreConfig::Memory),
            StoreBackendKind::Supabase => {
                let Some(supabase) = self.supabase.clone() else {
                    bail!("store.supabase configuration required when backend is 'supabase'");
                };

                if supabase.url.trim().is_empty() {
                    bail!("store.supabase.url must be specified (or SUPABASE_URL)");
                }
                if supabase.key.trim().is_empty() {
                    bail!("store.supabase.key must be specified (or SUPABASE_KEY)");
                }

                let table = match supabase.table.trim() {
                    "" => DEFAULT_TABLE.to_string(),
                    t => t.to_string(),
                };

                Ok(StoreConfig::Supabase {
                    url: supabase.url.trim().to_string(),
                    key: supabase.key,
                    table,
                    timeout: Duration::from_secs(supabase.timeout_secs),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    #[default]
    Memory,
    Supabase,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupabaseSection {
    pub url: String,
    pub key: String,
    pub table: String,
    pub timeout_secs: u64,
}

impl Default for SupabaseSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            table: DEFAULT_TABLE.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriggerSection {
    pub url: String,
    pub connect_timeout_ms: u64,
    pub timeout_ms: u64,
}

impl TriggerSection {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for TriggerSection {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5001/api/background/generate".to_string(),
            connect_timeout_ms: 2_000,
            timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerSection {
    pub enabled: bool,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self { enabled: true }
    }
}
