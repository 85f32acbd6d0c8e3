use thiserror::Error;

/// 客服接口调用错误
#[derive(Debug, Error)]
pub enum CsError {
    /// 请求体构造失败（JSON 或 multipart）
    #[error("请求编码失败: {0}")]
    Encode(String),

    /// 网络层失败：连接、超时、读取响应体
    #[error("请求微信服务器失败: {0}")]
    Transport(#[from] reqwest::Error),

    /// 响应体不是预期的 JSON
    #[error("解析微信响应失败: {0}")]
    Decode(#[from] serde_json::Error),

    /// 微信返回非 0 的 errcode
    #[error("微信接口错误 {code}: {message}")]
    Api { code: i64, message: String },

    #[error("配置错误: {0}")]
    Config(String),
}

impl CsError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// 微信返回的 errcode（仅 Api 错误有）
    pub fn api_code(&self) -> Option<i64> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// 微信返回的 errmsg（仅 Api 错误有）
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CsError>;
