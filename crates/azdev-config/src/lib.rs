pub mod cloud;
pub mod error;

pub use cloud::{CloudEndpoints, CloudName};
pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_POLL_FREQUENCY_SECS: u64 = 30;

/// azdev の設定ディレクトリを取得
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("azdev");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 AZDEV_CONFIG_PATH (直接パス指定)
/// 2. ./.azdev/config.yaml
/// 3. ~/.config/azdev/config.yaml (グローバル設定)
///
/// 見つからない場合は `None`。設定ファイルは必須ではない。
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var("AZDEV_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let local = std::env::current_dir()?.join(".azdev").join(CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("azdev").join(CONFIG_FILE);
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// 全コマンド共通のユーザー設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cloud: CloudName,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,

    /// 長時間実行操作のポーリング間隔（秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_frequency_secs: Option<u64>,
}

impl Config {
    /// 設定ファイルを読み込み（あれば）、環境変数で上書きする
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file()? {
            Some(path) => Self::from_path(&path)?,
            None => {
                tracing::debug!("設定ファイルなし、デフォルト値を使用");
                Self::default()
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        tracing::debug!("設定ファイルを読み込み: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// AZURE_TENANT_ID / AZURE_SUBSCRIPTION_ID / AZDEV_CLOUD はファイルより優先
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(tenant) = non_empty_var("AZURE_TENANT_ID") {
            self.tenant_id = Some(tenant);
        }
        if let Some(subscription) = non_empty_var("AZURE_SUBSCRIPTION_ID") {
            self.subscription_id = Some(subscription);
        }
        if let Some(cloud) = non_empty_var("AZDEV_CLOUD") {
            self.cloud = cloud.parse()?;
        }
        Ok(())
    }

    pub fn endpoints(&self) -> CloudEndpoints {
        self.cloud.endpoints()
    }

    pub fn poll_frequency(&self) -> Duration {
        Duration::from_secs(self.poll_frequency_secs.unwrap_or(DEFAULT_POLL_FREQUENCY_SECS))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("azdev"));
        assert!(config_dir.exists());
    }

    #[test]
    #[serial]
    fn test_find_config_file_env_var() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("custom.yaml");
        fs::write(&config_path, "cloud: AzureChina\n").unwrap();

        temp_env::with_var("AZDEV_CONFIG_PATH", Some(config_path.as_os_str()), || {
            let found = find_config_file().unwrap();
            assert_eq!(found, Some(config_path.clone()));
        });
    }

    #[test]
    #[serial]
    fn test_find_config_file_in_project_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();

        let project_dir = temp_dir.path().join(".azdev");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join("config.yaml"), "tenant_id: t1\n").unwrap();

        std::env::set_current_dir(&temp_dir).unwrap();

        temp_env::with_var_unset("AZDEV_CONFIG_PATH", || {
            let found = find_config_file().unwrap().unwrap();
            assert!(found.ends_with(".azdev/config.yaml"));
        });

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    #[serial]
    fn test_load_applies_env_overrides() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            "cloud: AzurePublic\ntenant_id: file-tenant\nsubscription_id: file-sub\npoll_frequency_secs: 5\n",
        )
        .unwrap();

        temp_env::with_vars(
            [
                ("AZDEV_CONFIG_PATH", Some(config_path.to_str().unwrap())),
                ("AZURE_TENANT_ID", Some("env-tenant")),
                ("AZURE_SUBSCRIPTION_ID", None),
                ("AZDEV_CLOUD", Some("AzureUSGovernment")),
            ],
            || {
                let config = Config::load().unwrap();
                assert_eq!(config.tenant_id.as_deref(), Some("env-tenant"));
                assert_eq!(config.subscription_id.as_deref(), Some("file-sub"));
                assert_eq!(config.cloud, CloudName::AzureUSGovernment);
                assert_eq!(config.poll_frequency(), Duration::from_secs(5));
            },
        );
    }

    #[test]
    #[serial]
    fn test_unknown_cloud_in_env_is_an_error() {
        temp_env::with_var("AZDEV_CLOUD", Some("nowhere"), || {
            let mut config = Config::default();
            let result = config.apply_env_overrides();
            assert!(matches!(result, Err(ConfigError::UnknownCloud(_))));
        });
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "\n").unwrap();

        let config = Config::from_path(&config_path).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.poll_frequency(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "cloud: [not, a, cloud]\n").unwrap();

        match Config::from_path(&config_path) {
            Err(ConfigError::Parse { path, .. }) => assert!(path.ends_with("config.yaml")),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }
}
