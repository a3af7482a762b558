use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{Map, Value};

use crate::{
    config::Config,
    error::GatewayError,
    infrastructure::UpstreamClient,
    utils::cookie_names,
};

const USER_TOKEN: &str = "userToken";

/// 把 `body.requestParam.userToken` 替换为当前会话令牌。
/// 没有会话令牌时移除客户端自带的值。
pub fn substitute_user_token(payload: &mut Value, token: Option<&str>) -> Result<(), GatewayError> {
    let param = payload
        .as_object_mut()
        .and_then(|root| {
            root.entry("body")
                .or_insert_with(|| Value::Object(Map::new()))
                .as_object_mut()
        })
        .and_then(|body| {
            body.entry("requestParam")
                .or_insert_with(|| Value::Object(Map::new()))
                .as_object_mut()
        })
        .ok_or(GatewayError::MissingParameter)?;

    match token {
        Some(token) => {
            param.insert(USER_TOKEN.to_string(), Value::String(token.to_string()));
        }
        None => {
            param.remove(USER_TOKEN);
        }
    }
    Ok(())
}

/// 通用转发：替换令牌后原样转发给后端，并原样返回后端响应文本
#[derive(Debug, Clone)]
pub struct RequestForwarder {
    api_url: String,
    upstream: UpstreamClient,
}

impl RequestForwarder {
    pub fn new(config: &Config, upstream: UpstreamClient) -> Self {
        Self {
            api_url: config.forward_api_url.clone(),
            upstream,
        }
    }

    pub async fn relay(&self, jar: &CookieJar, mut payload: Value) -> Result<Response, GatewayError> {
        let token = jar
            .get(cookie_names::SESSION_TOKEN)
            .map(|c| c.value())
            .filter(|v| !v.is_empty());
        substitute_user_token(&mut payload, token)?;

        let reply = self.upstream.post(&self.api_url, &payload).await;
        if !reply.is_well_formed() {
            return Err(GatewayError::UpstreamProtocol {
                body: reply.body,
                err: reply.transport_error,
            });
        }

        Ok((
            StatusCode::OK,
            [(CONTENT_TYPE, "application/json")],
            reply.body,
        )
            .into_response())
    }
}

pub async fn forward(
    State(forwarder): State<Arc<RequestForwarder>>,
    jar: CookieJar,
    Json(payload): Json<Value>,
) -> Result<Response, GatewayError> {
    forwarder.relay(&jar, payload).await
}
