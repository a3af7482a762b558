use axum::http::header::CONTENT_TYPE;
use serde::Serialize;

/// 一次上游调用的结果：原始响应文本与传输层错误（如有）
#[derive(Debug, Clone, Default)]
pub struct UpstreamReply {
    pub body: String,
    pub transport_error: Option<String>,
}

impl UpstreamReply {
    pub fn is_well_formed(&self) -> bool {
        is_well_formed_json(&self.body)
    }
}

pub fn is_well_formed_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}

/// 向上游 JSON 接口发送信封。不重试，超时沿用 reqwest 默认值。
#[derive(Debug, Clone, Default)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// 信封序列化后的 JSON 文本作为整个表单载荷发出
    pub async fn post<T: Serialize + ?Sized>(&self, url: &str, envelope: &T) -> UpstreamReply {
        let payload = match serde_json::to_string(envelope) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to serialize upstream envelope: {}", e);
                return UpstreamReply {
                    body: String::new(),
                    transport_error: Some(e.to_string()),
                };
            }
        };
        tracing::debug!("POST {} payload: {}", url, payload);

        let response = match self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Upstream request to {} failed: {}", url, e);
                return UpstreamReply {
                    body: String::new(),
                    transport_error: Some(e.to_string()),
                };
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => {
                tracing::debug!("Upstream {} answered {}: {}", url, status, body);
                UpstreamReply {
                    body,
                    transport_error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to read upstream body from {}: {}", url, e);
                UpstreamReply {
                    body: String::new(),
                    transport_error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn json_classification() {
        assert!(is_well_formed_json(r#"{"code":0}"#));
        assert!(is_well_formed_json("123"));
        assert!(!is_well_formed_json(""));
        assert!(!is_well_formed_json("<html>502 Bad Gateway</html>"));
    }

    #[tokio::test]
    async fn posts_envelope_as_form_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sso"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string(r#"{"body":{"action":"getSid"}}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"code":0}"#))
            .expect(1)
            .mount(&server)
            .await;

        let reply = UpstreamClient::new()
            .post(
                &format!("{}/sso", server.uri()),
                &json!({ "body": { "action": "getSid" } }),
            )
            .await;

        assert_eq!(reply.body, r#"{"code":0}"#);
        assert!(reply.transport_error.is_none());
        assert!(reply.is_well_formed());
    }

    #[tokio::test]
    async fn transport_failure_is_captured() {
        // 端口 9 (discard) 上通常没有监听
        let reply = UpstreamClient::new()
            .post("http://127.0.0.1:9/sso", &json!({}))
            .await;

        assert!(reply.transport_error.is_some());
        assert_eq!(reply.body, "");
        assert!(!reply.is_well_formed());
    }
}
