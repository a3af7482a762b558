use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::session::{GeoAttributes, SessionContext};

/// 上游会话有效期，固定 30 天
pub const EXPIRES_IN_SECS: u64 = 30 * 24 * 60 * 60;

const DEFAULT_CLIENT_TYPE: &str = "web";

/// 信封头。`clientType` 缺省为 "web"，其余缺省为空字符串。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeHeader {
    pub device_id: String,
    pub client_type: String,
    pub client_version: String,
    pub client_id: String,
}

impl EnvelopeHeader {
    pub fn from_session(ctx: &SessionContext) -> Self {
        Self {
            device_id: ctx.device_id.clone().unwrap_or_default(),
            client_type: ctx
                .client_type
                .clone()
                .unwrap_or_else(|| DEFAULT_CLIENT_TYPE.to_string()),
            client_version: ctx.client_version.clone().unwrap_or_default(),
            client_id: ctx.client_id.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    GetTicket,
    GetSid,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeBody<P> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    pub request_param: P,
}

/// 上游 JSON 接口统一的请求结构
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<P> {
    pub header: EnvelopeHeader,
    pub body: EnvelopeBody<P>,
}

impl<P: Serialize> Envelope<P> {
    pub fn new(header: EnvelopeHeader, action: Action, request_param: P) -> Self {
        Self {
            header,
            body: EnvelopeBody {
                action: Some(action),
                request_param,
            },
        }
    }
}

/// `getTicket`：校验已有会话。验证码字段在此流程中恒为空。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTicketParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub password: String,
    pub session_id: String,
    pub ips: Vec<Option<String>>,
    pub expires_in: u64,
    #[serde(flatten)]
    pub geo: GeoAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub redirect_url: String,
    pub captcha_id: String,
    pub captcha: String,
}

impl GetTicketParams {
    pub fn new(
        ctx: &SessionContext,
        session_id: &str,
        user_agent: Option<String>,
        redirect_url: &str,
    ) -> Self {
        Self {
            user_name: ctx.user_name.clone(),
            password: String::new(),
            session_id: session_id.to_string(),
            ips: vec![ctx.device_id.clone()],
            expires_in: EXPIRES_IN_SECS,
            geo: ctx.geo.clone(),
            user_agent,
            redirect_url: redirect_url.to_string(),
            captcha_id: String::new(),
            captcha: String::new(),
        }
    }
}

/// `getSid`：用一次性 ticket 换取会话
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSidParams {
    pub ticket: String,
    pub ips: Vec<Option<String>>,
    pub expires_in: u64,
    #[serde(flatten)]
    pub geo: GeoAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub redirect_url: String,
}

/// 上游响应 `{ code, msg?, sessionId? }`。`code == 0` 表示成功。
///
/// `raw_code` 与 `msg` 保留上游的原始值，用于失败时原样回显。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpstreamResponse {
    pub code: Option<i64>,
    pub raw_code: Option<Value>,
    pub msg: Option<Value>,
    pub session_id: Option<String>,
}

impl UpstreamResponse {
    /// 宽松读取：数字或数字字符串形式的 code 都接受
    pub fn from_value(value: &Value) -> Self {
        let code = match value.get("code") {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        // 空串、0、false、null 都视为没有 sessionId
        let session_id = match value.get("sessionId") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            Some(Value::Bool(true)) => Some("true".to_string()),
            _ => None,
        };

        Self {
            code,
            raw_code: value.get("code").cloned(),
            msg: value.get("msg").cloned(),
            session_id,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(crate::error::error_codes::SUCCESS)
    }
}
