use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 拦截器直接返回给浏览器的 `{ code, msg }`，字段类型随上游原样保留
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<Value>,
}

impl ApiResult {
    pub fn error(code: i64, msg: &str) -> Self {
        Self {
            code: Some(Value::from(code)),
            msg: Some(Value::from(msg)),
        }
    }
}

/// 上游返回非 JSON 文本时的响应
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtocolFailure {
    pub code: i64,
    pub status: u16,
    pub msg: String,
    pub resbody: String,
    pub err: Option<String>,
}
