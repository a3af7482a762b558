//! Cookie 名称与取值的编解码。
//!
//! 地理属性 cookie 的名称是语义名的 MD5 十六进制摘要，值为 base64 文本。
//! 这只是各分站与登录页之间约定的 cookie 命名方式，不提供任何安全性。

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use md5::{Digest, Md5};

/// 会话上下文使用的明文 cookie 名
pub mod cookie_names {
    pub const SESSION_TOKEN: &str = "ycsid";
    pub const USER_ID: &str = "userId";
    pub const USER_NAME: &str = "userName";
    pub const USER_TYPE: &str = "userType";
    pub const IMG_LINK: &str = "imgLink";
    pub const DEVICE_ID: &str = "deviceId";
    pub const CLIENT_TYPE: &str = "clientType";
    pub const CLIENT_VERSION: &str = "clientVersion";
    pub const CLIENT_ID: &str = "clientId";
    pub const REMEMBER: &str = "remember";
}

/// 地理属性的语义名
pub const GEO_ATTRIBUTES: [&str; 6] = ["country", "province", "city", "lat", "lon", "district"];

/// 语义名 -> cookie 名 的查找表
pub static GEO_COOKIE_NAMES: LazyLock<HashMap<&'static str, String>> = LazyLock::new(|| {
    GEO_ATTRIBUTES
        .iter()
        .map(|name| (*name, attribute_cookie_name(name)))
        .collect()
});

// 浏览器端写入的值可能省略填充
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn attribute_cookie_name(name: &str) -> String {
    format!("{:x}", Md5::digest(name.as_bytes()))
}

/// 解码 base64 属性值。缺失或格式错误时返回空字符串。
pub fn decode_attribute(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    let bytes = match BASE64.decode(value.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Ignoring malformed base64 attribute {:?}: {}", value, e);
            return String::new();
        }
    };

    String::from_utf8(bytes).unwrap_or_else(|e| {
        tracing::debug!("Ignoring non-utf8 attribute {:?}: {}", value, e);
        String::new()
    })
}

/// 语义名对应的 cookie 名，未登记的名称现场计算
pub fn geo_cookie_name(name: &str) -> String {
    GEO_COOKIE_NAMES
        .get(name)
        .cloned()
        .unwrap_or_else(|| attribute_cookie_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_name_is_md5_hex() {
        assert_eq!(
            attribute_cookie_name("country"),
            "e909c2d7067ea37437cf97fe11d91bd0"
        );
        assert_eq!(attribute_cookie_name("city"), "4ed5d2eaed1a1fadcc41ad1d58ed603e");
    }

    #[test]
    fn lookup_table_covers_all_geo_attributes() {
        assert_eq!(GEO_COOKIE_NAMES.len(), GEO_ATTRIBUTES.len());
        for name in GEO_ATTRIBUTES {
            assert_eq!(GEO_COOKIE_NAMES[name], attribute_cookie_name(name));
            assert_eq!(GEO_COOKIE_NAMES[name].len(), 32);
        }
    }

    #[test]
    fn decodes_base64_values() {
        assert_eq!(decode_attribute(Some("5YyX5Lqs")), "北京");
        assert_eq!(decode_attribute(Some("Q2hpbmE=")), "China");
        assert_eq!(decode_attribute(Some("Q2hpbmE")), "China");
    }

    #[test]
    fn absent_or_malformed_values_decode_to_empty() {
        assert_eq!(decode_attribute(None), "");
        assert_eq!(decode_attribute(Some("")), "");
        assert_eq!(decode_attribute(Some("!!not base64!!")), "");
        // 0xff 0xfe 不是合法 UTF-8
        assert_eq!(decode_attribute(Some("//4=")), "");
    }
}
