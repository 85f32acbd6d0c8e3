use serde::Deserialize;
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

/// 计算 token、nonce、timestamp 对应的签名
///
/// 三个字符串按字典序排序后直接拼接，取 SHA-1 的小写十六进制。
pub fn signature_for(token: &str, nonce: &str, timestamp: &str) -> String {
    let mut parts = [token, nonce, timestamp];
    parts.sort_unstable();

    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// 验证消息是否来自微信服务器
pub fn check_signature(token: &str, nonce: &str, timestamp: &str, signature: &str) -> bool {
    let expected = signature_for(token, nonce, timestamp);
    // 长度不同直接不等，长度本身不是秘密（固定 40 位）
    expected.len() == signature.len()
        && bool::from(expected.as_bytes().ct_eq(signature.as_bytes()))
}

/// 微信回调 URL 上携带的校验参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookQuery {
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub nonce: String,
    /// 仅在配置服务器地址时出现
    #[serde(default)]
    pub echostr: Option<String>,
}

impl WebhookQuery {
    pub fn verify(&self, token: &str) -> bool {
        check_signature(token, &self.nonce, &self.timestamp, &self.signature)
    }

    /// 服务器地址校验：签名正确时原样返回 echostr
    pub fn echo(&self, token: &str) -> Option<&str> {
        if !self.verify(token) {
            tracing::debug!(timestamp = %self.timestamp, nonce = %self.nonce, "回调签名校验失败");
            return None;
        }
        self.echostr.as_deref()
    }
}
