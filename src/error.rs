use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use serde_json::Value;

use crate::result::{ApiResult, ProtocolFailure};

pub mod error_codes {
    pub const SUCCESS: i64 = 0;
    pub const GATEWAY_ERROR: i64 = -1;
}

const PARAMETER_ERROR_MSG: &str = "parameter error";
const PROTOCOL_ERROR_MSG: &str =
    "upstream request failed, check the request url and parameters: response is not JSON text";

/// 拦截器的失败出口，都以 HTTP 200 + JSON 返回给调用方
#[derive(Debug)]
pub enum GatewayError {
    MissingParameter,
    UpstreamProtocol {
        body: String,
        err: Option<String>,
    },
    /// 原样回显上游的业务失败
    Exchange {
        code: Option<Value>,
        msg: Option<Value>,
    },
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::MissingParameter => (
                StatusCode::OK,
                Json(ApiResult::error(error_codes::GATEWAY_ERROR, PARAMETER_ERROR_MSG)),
            )
                .into_response(),
            GatewayError::UpstreamProtocol { body, err } => {
                tracing::warn!("Upstream answered with non-JSON text: {:?} ({:?})", body, err);
                (
                    StatusCode::OK,
                    Json(ProtocolFailure {
                        code: error_codes::GATEWAY_ERROR,
                        status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                        msg: PROTOCOL_ERROR_MSG.to_string(),
                        resbody: body,
                        err,
                    }),
                )
                    .into_response()
            }
            GatewayError::Exchange { code, msg } => {
                (StatusCode::OK, Json(ApiResult { code, msg })).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    use super::*;

    async fn body_json(err: GatewayError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn protocol_failure_shape() {
        let (status, body) = body_json(GatewayError::UpstreamProtocol {
            body: "<html/>".into(),
            err: None,
        })
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], -1);
        assert_eq!(body["status"], 500);
        assert_eq!(body["resbody"], "<html/>");
        assert_eq!(body["err"], Value::Null);
        assert!(body["msg"].is_string());
    }

    #[tokio::test]
    async fn missing_parameter_shape() {
        let (_, body) = body_json(GatewayError::MissingParameter).await;
        assert_eq!(body, json!({ "code": -1, "msg": "parameter error" }));
    }

    #[tokio::test]
    async fn exchange_failure_echoes_upstream() {
        let (_, body) = body_json(GatewayError::Exchange {
            code: Some(json!(1)),
            msg: Some(json!("ticket expired")),
        })
        .await;
        assert_eq!(body, json!({ "code": 1, "msg": "ticket expired" }));
    }

    #[tokio::test]
    async fn exchange_failure_keeps_value_types() {
        let (_, body) = body_json(GatewayError::Exchange {
            code: Some(json!("1")),
            msg: Some(json!({ "zh": "x" })),
        })
        .await;
        assert_eq!(body, json!({ "code": "1", "msg": { "zh": "x" } }));

        let (_, body) = body_json(GatewayError::Exchange {
            code: None,
            msg: Some(Value::Null),
        })
        .await;
        assert_eq!(body, json!({ "msg": null }));
    }
}
