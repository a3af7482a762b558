use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::utils::{cookie_names, decode_attribute, geo_cookie_name};

/// 地理位置属性，取自以哈希命名的 cookie
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoAttributes {
    pub country: String,
    pub province: String,
    pub city: String,
    pub lat: String,
    pub lon: String,
    pub district: String,
}

impl GeoAttributes {
    pub fn from_jar(jar: &CookieJar) -> Self {
        let read = |name: &str| {
            let cookie_name = geo_cookie_name(name);
            decode_attribute(jar.get(&cookie_name).map(|c| c.value()))
        };

        Self {
            country: read("country"),
            province: read("province"),
            city: read("city"),
            lat: read("lat"),
            lon: read("lon"),
            district: read("district"),
        }
    }
}

/// 浏览器 cookie 中携带的会话上下文。空值视为缺失。
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub session_token: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_type: Option<String>,
    pub img_link: Option<String>,
    pub device_id: Option<String>,
    pub client_type: Option<String>,
    pub client_version: Option<String>,
    pub client_id: Option<String>,
    pub remember: Option<String>,
    pub geo: GeoAttributes,
}

impl SessionContext {
    pub fn from_jar(jar: &CookieJar) -> Self {
        let read = |name: &str| {
            jar.get(name)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            session_token: read(cookie_names::SESSION_TOKEN),
            user_id: read(cookie_names::USER_ID),
            user_name: read(cookie_names::USER_NAME),
            user_type: read(cookie_names::USER_TYPE),
            img_link: read(cookie_names::IMG_LINK),
            device_id: read(cookie_names::DEVICE_ID),
            client_type: read(cookie_names::CLIENT_TYPE),
            client_version: read(cookie_names::CLIENT_VERSION),
            client_id: read(cookie_names::CLIENT_ID),
            remember: read(cookie_names::REMEMBER),
            geo: GeoAttributes::from_jar(jar),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

    use super::*;
    use crate::utils::attribute_cookie_name;

    fn jar(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn reads_geo_attributes_from_hashed_cookies() {
        let cookie = format!(
            "{}=Q2hpbmE=; {}=5YyX5Lqs; {}=MzkuOQ==",
            attribute_cookie_name("country"),
            attribute_cookie_name("city"),
            attribute_cookie_name("lat"),
        );
        let geo = GeoAttributes::from_jar(&jar(&cookie));

        assert_eq!(geo.country, "China");
        assert_eq!(geo.city, "北京");
        assert_eq!(geo.lat, "39.9");
        assert_eq!(geo.lon, "");
        assert_eq!(geo.province, "");
        assert_eq!(geo.district, "");
    }

    #[test]
    fn literal_geo_names_are_ignored() {
        let geo = GeoAttributes::from_jar(&jar("country=Q2hpbmE="));
        assert_eq!(geo, GeoAttributes::default());
    }

    #[test]
    fn empty_cookies_count_as_missing() {
        let ctx = SessionContext::from_jar(&jar("ycsid=; userId=U1; clientType=app"));

        assert_eq!(ctx.session_token, None);
        assert_eq!(ctx.user_id.as_deref(), Some("U1"));
        assert_eq!(ctx.client_type.as_deref(), Some("app"));
        assert_eq!(ctx.device_id, None);
    }
}
