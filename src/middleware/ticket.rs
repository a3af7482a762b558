use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::Value;

use crate::{
    config::Config,
    error::GatewayError,
    infrastructure::UpstreamClient,
    middleware::session::user_agent,
    models::{
        Action, EXPIRES_IN_SECS, Envelope, EnvelopeHeader, GetSidParams, SessionContext,
        UpstreamResponse,
    },
    utils::cookie_names,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    pub ticket: Option<String>,
    pub device_id: Option<String>,
    pub remember: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_type: Option<String>,
    pub img_link: Option<String>,
}

impl TicketQuery {
    /// 重复出现的参数只取第一个值
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "ticket" => &mut query.ticket,
                "deviceId" => &mut query.device_id,
                "remember" => &mut query.remember,
                "userId" => &mut query.user_id,
                "userName" => &mut query.user_name,
                "userType" => &mut query.user_type,
                "imgLink" => &mut query.img_link,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// 用一次性 ticket 换取会话，并写入会话与用户资料 cookie
#[derive(Debug, Clone)]
pub struct TicketExchanger {
    site_url: String,
    api_url: String,
    max_age: time::Duration,
    upstream: UpstreamClient,
}

impl TicketExchanger {
    pub fn new(config: &Config, upstream: UpstreamClient) -> Self {
        Self {
            site_url: config.site_url.clone(),
            api_url: config.sso_api_url.clone(),
            max_age: time::Duration::seconds(
                i64::try_from(config.cookie_max_age_secs).unwrap_or(i64::MAX),
            ),
            upstream,
        }
    }

    pub async fn exchange(
        &self,
        jar: CookieJar,
        user_agent: Option<String>,
        query: TicketQuery,
    ) -> Result<(CookieJar, &'static str), GatewayError> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        let (Some(ticket), Some(device_id)) = (non_empty(&query.ticket), non_empty(&query.device_id))
        else {
            return Err(GatewayError::MissingParameter);
        };

        let ctx = SessionContext::from_jar(&jar);
        let params = GetSidParams {
            ticket,
            ips: vec![Some(device_id)],
            expires_in: EXPIRES_IN_SECS,
            geo: ctx.geo.clone(),
            user_agent,
            redirect_url: self.site_url.clone(),
        };
        let envelope = Envelope::new(EnvelopeHeader::from_session(&ctx), Action::GetSid, params);

        let reply = self.upstream.post(&self.api_url, &envelope).await;
        let value: Value =
            serde_json::from_str(&reply.body).map_err(|_| GatewayError::UpstreamProtocol {
                body: reply.body.clone(),
                err: reply.transport_error.clone(),
            })?;

        let ret = UpstreamResponse::from_value(&value);
        let accepted = ret.is_success();
        let session_id = match ret.session_id {
            Some(session_id) if accepted => session_id,
            _ => {
                tracing::warn!("Ticket exchange failed: {:?} {:?}", ret.code, ret.msg);
                return Err(GatewayError::Exchange {
                    code: ret.raw_code,
                    msg: ret.msg,
                });
            }
        };

        // remember=true 时会话 cookie 保留 maxAge，否则只存在于浏览器会话中
        let remember = query.remember.unwrap_or_default();
        let session = Cookie::build((cookie_names::SESSION_TOKEN, session_id))
            .path("/")
            .http_only(true);
        let session = if remember == "true" {
            session.max_age(self.max_age)
        } else {
            session
        };

        let mut jar = jar.add(session);
        for (name, value) in [
            (cookie_names::USER_ID, query.user_id),
            (cookie_names::USER_NAME, query.user_name),
            (cookie_names::USER_TYPE, query.user_type),
            (cookie_names::IMG_LINK, query.img_link),
            (cookie_names::REMEMBER, Some(remember)),
        ] {
            jar = jar.add(
                Cookie::build((name, value.unwrap_or_default()))
                    .path("/")
                    .max_age(self.max_age),
            );
        }

        Ok((jar, "ok"))
    }
}

pub async fn check_ticket(
    State(exchanger): State<Arc<TicketExchanger>>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<(CookieJar, &'static str), GatewayError> {
    exchanger
        .exchange(jar, user_agent(&headers), TicketQuery::from_pairs(pairs))
        .await
}
