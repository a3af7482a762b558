use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header::{LOCATION, USER_AGENT}},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;

use crate::{
    config::Config,
    error::GatewayError,
    infrastructure::UpstreamClient,
    models::{Action, Envelope, EnvelopeHeader, GetTicketParams, SessionContext, UpstreamResponse},
};

pub const NO_SID: &str = "NoSID";
pub const NO_USER_ID: &str = "NoUserId";

/// 跳转回单点登录页：`<ssoUrl>?redirectUrl=<siteUrl>&errorMsg=<reason>`
pub fn login_redirect(sso_url: &str, site_url: &str, reason: &str) -> Response {
    let separator = if sso_url.contains('?') { '&' } else { '?' };
    let location = format!(
        "{}{}redirectUrl={}&errorMsg={}",
        sso_url,
        separator,
        urlencoding::encode(site_url),
        urlencoding::encode(reason),
    );

    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

/// 读取 User-Agent。含非 ASCII 字节时按 UTF-8 宽松解码，不拒绝请求。
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .map(|h| String::from_utf8_lossy(h.as_bytes()).into_owned())
}

/// 校验浏览器已有的会话是否仍被 SSO 接受
#[derive(Debug, Clone)]
pub struct SessionValidator {
    sso_url: String,
    site_url: String,
    api_url: String,
    upstream: UpstreamClient,
}

impl SessionValidator {
    pub fn new(config: &Config, upstream: UpstreamClient) -> Self {
        Self {
            sso_url: config.sso_url.clone(),
            site_url: config.site_url.clone(),
            api_url: config.sso_api_url.clone(),
            upstream,
        }
    }

    pub async fn check_session(self: Arc<Self>, req: Request<Body>, next: Next) -> Response {
        let jar = CookieJar::from_headers(req.headers());
        let ctx = SessionContext::from_jar(&jar);

        // 没有 ycsid 或 userId 都需要重新登录
        let Some(session_id) = ctx.session_token.as_deref() else {
            tracing::debug!("No session cookie, redirecting to login");
            return login_redirect(&self.sso_url, &self.site_url, NO_SID);
        };
        if ctx.user_id.is_none() {
            tracing::debug!("No userId cookie, redirecting to login");
            return login_redirect(&self.sso_url, &self.site_url, NO_USER_ID);
        }

        let user_agent = user_agent(req.headers());
        let envelope = Envelope::new(
            EnvelopeHeader::from_session(&ctx),
            Action::GetTicket,
            GetTicketParams::new(&ctx, session_id, user_agent, &self.site_url),
        );

        let reply = self.upstream.post(&self.api_url, &envelope).await;
        let Ok(value) = serde_json::from_str::<Value>(&reply.body) else {
            return GatewayError::UpstreamProtocol {
                body: reply.body,
                err: reply.transport_error,
            }
            .into_response();
        };

        if UpstreamResponse::from_value(&value).is_success() {
            next.run(req).await
        } else {
            tracing::warn!("Session rejected by SSO: {}", reply.body);
            login_redirect(&self.sso_url, &self.site_url, &reply.body)
        }
    }
}

pub async fn check_sid(
    State(validator): State<Arc<SessionValidator>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    validator.check_session(req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(response: &Response) -> &str {
        response.headers()[LOCATION].to_str().unwrap()
    }

    #[test]
    fn redirect_encodes_parameters() {
        let response = login_redirect(
            "https://sso.example.com/login",
            "https://site.example.com/home",
            r#"{"code":3,"msg":"expired"}"#,
        );

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            location(&response),
            "https://sso.example.com/login?redirectUrl=https%3A%2F%2Fsite.example.com%2Fhome\
             &errorMsg=%7B%22code%22%3A3%2C%22msg%22%3A%22expired%22%7D"
        );
    }

    #[test]
    fn user_agent_tolerates_non_ascii() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_agent(&headers), None);

        headers.insert(
            USER_AGENT,
            axum::http::HeaderValue::from_bytes("Mozilla/5.0 (Linux; 华为)".as_bytes()).unwrap(),
        );
        assert_eq!(user_agent(&headers).as_deref(), Some("Mozilla/5.0 (Linux; 华为)"));
    }

    #[test]
    fn redirect_appends_to_existing_query() {
        let response = login_redirect("https://sso.example.com/login?lang=zh", "site", NO_SID);
        assert_eq!(
            location(&response),
            "https://sso.example.com/login?lang=zh&redirectUrl=site&errorMsg=NoSID"
        );
    }
}
