use serde::Deserialize;
use std::{fs, path::Path, time::Duration};

use crate::error::{CsError, Result};

pub const DEFAULT_API_BASE: &str = "https://api.weixin.qq.com";

/// 客服接口客户端配置
#[derive(Debug, Clone, Deserialize)]
pub struct CsConfig {
    /// 微信接口地址，测试或走代理时可替换
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// 整个请求的超时（秒），0 表示不设置
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for CsConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl CsConfig {
    /// 指向指定接口地址的默认配置
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self { api_base: api_base.into(), ..Self::default() }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CsError::Config(format!("无效的配置文件: {e}")))
    }

    /// 读取 `CS_CLIENT_CONFIG` 指定的配置文件（默认 `cs-client.toml`），
    /// 文件不存在时使用默认配置，最后应用环境变量覆盖。
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// 同 [`CsConfig::load`]，环境变量从 `lookup` 读取
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup("CS_CLIENT_CONFIG").unwrap_or_else(|| "cs-client.toml".to_string());

        let mut config = match fs::read_to_string(Path::new(&path)) {
            Ok(content) => Self::from_toml(&content)?,
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "未找到配置文件，使用默认配置");
                Self::default()
            }
        };

        config.apply_env_overrides(lookup)?;
        Ok(config)
    }

    /// 支持环境变量覆盖
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_base) = lookup("WECHAT_API_BASE") {
            self.api_base = api_base;
        }
        if let Some(timeout) = lookup("WECHAT_HTTP_TIMEOUT_SECS") {
            self.timeout_secs = parse_secs("WECHAT_HTTP_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(timeout) = lookup("WECHAT_CONNECT_TIMEOUT_SECS") {
            self.connect_timeout_secs = parse_secs("WECHAT_CONNECT_TIMEOUT_SECS", &timeout)?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_secs > 0).then(|| Duration::from_secs(self.connect_timeout_secs))
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| CsError::Config(format!("{key}={value} 不是有效的秒数: {e}")))
}
