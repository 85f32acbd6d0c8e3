use once_cell::sync::OnceCell;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::CsConfig;
use crate::error::{CsError, Result};
use crate::model::{SendRequest, SendResponse, UploadRequest, UploadResponse};

pub const SEND_MESSAGE_PATH: &str = "/cgi-bin/message/custom/send";
pub const UPLOAD_MEDIA_PATH: &str = "/cgi-bin/media/upload";

/// 上传表单的字段名和文件名
pub const UPLOAD_FIELD: &str = "media";
pub const UPLOAD_FILE_NAME: &str = "temp.png";

static DEFAULT_CLIENT: OnceCell<CsClient> = OnceCell::new();

/// 微信小程序客服接口客户端
///
/// 内部的 `reqwest::Client` 自带连接池，clone 后可在多个任务间共享。
#[derive(Debug, Clone)]
pub struct CsClient {
    http: reqwest::Client,
    config: CsConfig,
}

impl CsClient {
    pub fn new(config: CsConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| CsError::Config(format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Self { http, config })
    }

    /// 复用调用方已有的 HTTP 客户端（超时等策略由调用方决定）
    pub fn with_http_client(http: reqwest::Client, config: CsConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &CsConfig {
        &self.config
    }

    /// 发送客服消息给用户
    pub async fn send_message(&self, req: &SendRequest) -> Result<()> {
        let url = format!(
            "{}?access_token={}",
            self.config.endpoint(SEND_MESSAGE_PATH),
            urlencoding::encode(&req.access_token)
        );
        let body = serde_json::to_vec(req).map_err(|e| CsError::Encode(e.to_string()))?;

        debug!(msgtype = req.message.msg_type(), touser = %req.touser, "发送客服消息");

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let resp: SendResponse = read_json(response).await?;
        resp.status.into_result().inspect_err(|e| {
            debug!(error = %e, touser = %req.touser, "发送客服消息失败");
        })
    }

    /// 把图片上传为临时素材，返回 media_id 等信息
    pub async fn upload_temp_media(&self, req: &UploadRequest) -> Result<UploadResponse> {
        let url = format!(
            "{}?access_token={}&type=image",
            self.config.endpoint(UPLOAD_MEDIA_PATH),
            urlencoding::encode(&req.access_token)
        );

        let part = Part::bytes(req.image.clone())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("application/octet-stream")
            .map_err(|e| CsError::Encode(e.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        debug!(size = req.image.len(), "上传临时素材");

        let response = self.http.post(&url).multipart(form).send().await?;

        let resp: UploadResponse = read_json(response).await?;
        resp.into_result().inspect_err(|e| {
            debug!(error = %e, "上传临时素材失败");
        })
    }
}

/// 读完响应体再解析；`response` 按值消费，任何返回路径上连接都会被释放
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;
    debug!(status = %status, len = body.len(), "收到微信响应");
    Ok(serde_json::from_slice(&body)?)
}

fn default_client() -> Result<&'static CsClient> {
    DEFAULT_CLIENT.get_or_try_init(|| CsClient::new(CsConfig::load()?))
}

/// 使用默认客户端发送客服消息
///
/// 默认客户端的连接池全进程共享，只应在同一个长期运行的 tokio runtime 中调用。
pub async fn send_message(req: &SendRequest) -> Result<()> {
    default_client()?.send_message(req).await
}

/// 使用默认客户端上传临时素材
///
/// 与 [`send_message`] 相同，只应在同一个长期运行的 runtime 中调用。
pub async fn upload_temp_media(req: &UploadRequest) -> Result<UploadResponse> {
    default_client()?.upload_temp_media(req).await
}
