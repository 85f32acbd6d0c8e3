//! 微信小程序客服接口
//!
//! 目前支持：[`check_signature`] 验证消息是否来自微信服务器，
//! [`CsClient::send_message`] 发送客服消息给用户，
//! [`CsClient::upload_temp_media`] 把图片上传到微信服务器。

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod signature;

// Re-exports for convenience
pub use client::{CsClient, send_message, upload_temp_media};
pub use config::CsConfig;
pub use error::{CsError, Result};
pub use model::{
    ApiStatus, ImageMessage, LinkMessage, Message, MiniProgramPageMessage, SendRequest,
    SendResponse, TextMessage, UploadRequest, UploadResponse,
};
pub use signature::{WebhookQuery, check_signature, signature_for};
