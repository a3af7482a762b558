use std::env;
use std::time::Duration;

const DEFAULT_COOKIE_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// 单点登录页地址
    pub sso_url: String,
    /// 本分站地址
    pub site_url: String,
    /// 会话校验与换票使用的 SSO 接口
    pub sso_api_url: String,
    /// 通用转发的后端接口
    pub forward_api_url: String,
    /// cookie 的 Max-Age，单位为秒（`COOKIE_MAX_AGE`），不是毫秒
    pub cookie_max_age_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let sso_api_url = env::var("SSO_API_URL")?;
        Ok(Config {
            sso_url: env::var("SSO_URL")?,
            site_url: env::var("SITE_URL")?,
            forward_api_url: env::var("FORWARD_API_URL").unwrap_or_else(|_| sso_api_url.clone()),
            sso_api_url,
            cookie_max_age_secs: env::var("COOKIE_MAX_AGE")
                .ok()
                .and_then(|v| v.trim_end_matches('s').parse().ok())
                .unwrap_or(DEFAULT_COOKIE_MAX_AGE_SECS),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
        })
    }

    pub fn cookie_max_age(&self) -> Duration {
        Duration::from_secs(self.cookie_max_age_secs)
    }
}
