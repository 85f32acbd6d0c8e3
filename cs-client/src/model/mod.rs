use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CsError, Result};

/// 临时素材有效期
pub const TEMP_MEDIA_TTL_DAYS: i64 = 3;

/// 文本消息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
}

/// 图片消息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMessage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub media_id: String,
}

/// 图文链接
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMessage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// 图文链接消息的图片链接
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thumb_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// 被点击后跳转的链接
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

/// 小程序卡片
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniProgramPageMessage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// 小程序的页面路径
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pagepath: String,
    /// 卡片封面的 media_id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub thumb_media_id: String,
}

/// 客服消息内容
///
/// 序列化为 `"msgtype": "<类型>"` 加同名字段承载的消息体，
/// 例如 `{"msgtype":"text","text":{"content":"hi"}}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msgtype", rename_all = "lowercase")]
pub enum Message {
    Text { text: TextMessage },
    Image { image: ImageMessage },
    Link { link: LinkMessage },
    #[serde(rename = "miniprogrampage")]
    MiniProgramPage { miniprogrampage: MiniProgramPageMessage },
}

impl Message {
    pub fn text(content: impl Into<String>) -> Self {
        Message::Text { text: TextMessage { content: content.into() } }
    }

    pub fn image(media_id: impl Into<String>) -> Self {
        Message::Image { image: ImageMessage { media_id: media_id.into() } }
    }

    pub fn link(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        thumb_url: impl Into<String>,
    ) -> Self {
        Message::Link {
            link: LinkMessage {
                description: description.into(),
                thumb_url: thumb_url.into(),
                title: title.into(),
                url: url.into(),
            },
        }
    }

    pub fn mini_program_page(
        title: impl Into<String>,
        pagepath: impl Into<String>,
        thumb_media_id: impl Into<String>,
    ) -> Self {
        Message::MiniProgramPage {
            miniprogrampage: MiniProgramPageMessage {
                title: title.into(),
                pagepath: pagepath.into(),
                thumb_media_id: thumb_media_id.into(),
            },
        }
    }

    /// 消息类型：text, image, link, miniprogrampage
    pub fn msg_type(&self) -> &'static str {
        match self {
            Message::Text { .. } => "text",
            Message::Image { .. } => "image",
            Message::Link { .. } => "link",
            Message::MiniProgramPage { .. } => "miniprogrampage",
        }
    }
}

/// 发送客服消息请求参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_token: String,
    /// 用户的 OpenID
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub touser: String,
    #[serde(flatten)]
    pub message: Message,
}

impl SendRequest {
    pub fn new(access_token: impl Into<String>, touser: impl Into<String>, message: Message) -> Self {
        Self {
            access_token: access_token.into(),
            touser: touser.into(),
            message,
        }
    }
}

/// 微信接口通用返回：errcode 缺省视为 0
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub errcode: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub errmsg: String,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl ApiStatus {
    pub fn is_ok(&self) -> bool {
        self.errcode == 0
    }

    /// errcode 非 0 时转为 [`CsError::Api`]
    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(CsError::Api { code: self.errcode, message: self.errmsg })
        }
    }
}

/// 发送客服消息响应参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// 文件上传请求参数
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub access_token: String,
    /// 图片内容
    pub image: Vec<u8>,
}

impl UploadRequest {
    pub fn new(access_token: impl Into<String>, image: impl Into<Vec<u8>>) -> Self {
        Self { access_token: access_token.into(), image: image.into() }
    }
}

/// 文件上传响应参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// 媒体文件上传后的标识，3 天内有效
    #[serde(default)]
    pub media_id: String,
    #[serde(default, rename = "type")]
    pub media_type: String,
    /// 上传时间戳（秒）
    #[serde(default)]
    pub created_at: i64,
    #[serde(flatten)]
    pub status: ApiStatus,
}

impl UploadResponse {
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }

    /// media_id 失效时间
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.created_at_utc()
            .and_then(|t| t.checked_add_signed(Duration::days(TEMP_MEDIA_TTL_DAYS)))
    }

    pub(crate) fn into_result(self) -> Result<Self> {
        if self.status.is_ok() {
            Ok(self)
        } else {
            Err(CsError::Api { code: self.status.errcode, message: self.status.errmsg })
        }
    }
}
