//! ソブリンクラウドごとのエンドポイント表

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 接続先の Azure クラウド
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudName {
    #[default]
    AzurePublic,
    AzureChina,
    AzureUSGovernment,
}

impl CloudName {
    pub fn endpoints(self) -> CloudEndpoints {
        match self {
            CloudName::AzurePublic => CloudEndpoints {
                resource_manager: "https://management.azure.com".to_string(),
                resource_manager_audience: "https://management.core.windows.net/".to_string(),
                graph: "https://graph.microsoft.com".to_string(),
                key_vault_suffix: "vault.azure.net".to_string(),
                active_directory: "https://login.microsoftonline.com".to_string(),
                scm_suffix: "scm.azurewebsites.net".to_string(),
            },
            CloudName::AzureChina => CloudEndpoints {
                resource_manager: "https://management.chinacloudapi.cn".to_string(),
                resource_manager_audience: "https://management.core.chinacloudapi.cn/".to_string(),
                graph: "https://microsoftgraph.chinacloudapi.cn".to_string(),
                key_vault_suffix: "vault.azure.cn".to_string(),
                active_directory: "https://login.chinacloudapi.cn".to_string(),
                scm_suffix: "scm.chinacloudsites.cn".to_string(),
            },
            CloudName::AzureUSGovernment => CloudEndpoints {
                resource_manager: "https://management.usgovcloudapi.net".to_string(),
                resource_manager_audience: "https://management.core.usgovcloudapi.net/".to_string(),
                graph: "https://graph.microsoft.us".to_string(),
                key_vault_suffix: "vault.usgovcloudapi.net".to_string(),
                active_directory: "https://login.microsoftonline.us".to_string(),
                scm_suffix: "scm.azurewebsites.us".to_string(),
            },
        }
    }
}

impl fmt::Display for CloudName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CloudName::AzurePublic => "AzurePublic",
            CloudName::AzureChina => "AzureChina",
            CloudName::AzureUSGovernment => "AzureUSGovernment",
        };
        f.write_str(name)
    }
}

impl FromStr for CloudName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "azurepublic" | "azurecloud" | "public" => Ok(CloudName::AzurePublic),
            "azurechina" | "azurechinacloud" | "china" => Ok(CloudName::AzureChina),
            "azureusgovernment" | "azureusgovernmentcloud" | "usgov" => {
                Ok(CloudName::AzureUSGovernment)
            }
            _ => Err(ConfigError::UnknownCloud(s.to_string())),
        }
    }
}

/// 1 つのクラウドのサービスエンドポイント
///
/// テストでモックサーバーを指せるよう、各フィールドは単純な文字列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudEndpoints {
    /// Resource Manager のベース URL（末尾スラッシュなし）
    pub resource_manager: String,

    /// Resource Manager トークンのオーディエンス
    pub resource_manager_audience: String,

    /// Microsoft Graph のベース URL
    pub graph: String,

    /// Key Vault データプレーンホストの DNS サフィックス
    pub key_vault_suffix: String,

    /// Entra ID の認証機関ホスト
    pub active_directory: String,

    /// App Service SCM (Kudu) ホストの DNS サフィックス
    pub scm_suffix: String,
}

impl CloudEndpoints {
    /// Resource Manager トークン用の `.default` スコープ
    pub fn resource_manager_scope(&self) -> String {
        format!("{}/.default", self.resource_manager_audience)
    }

    pub fn graph_scope(&self) -> String {
        format!("{}/.default", self.graph.trim_end_matches('/'))
    }

    pub fn key_vault_scope(&self) -> String {
        format!("https://{}/.default", self.key_vault_suffix)
    }

    /// コンテナー名から Vault URL を組み立てる
    pub fn key_vault_url(&self, vault_name: &str) -> String {
        format!("https://{}.{}", vault_name, self.key_vault_suffix)
    }

    /// App Service アプリの SCM ベース URL
    pub fn scm_url(&self, app_name: &str) -> String {
        format!("https://{}.{}", app_name, self.scm_suffix)
    }
}

impl Default for CloudEndpoints {
    fn default() -> Self {
        CloudName::AzurePublic.endpoints()
    }
}
