//! Shapes of the decrypted client payloads.
use serde::{Deserialize, Serialize};

/// Origin stamp embedded in every decrypted payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub open_id: String,
    pub nick_name: String,
    /// 0 unknown, 1 male, 2 female.
    pub gender: i64,
    pub city: String,
    pub province: String,
    pub country: String,
    pub avatar_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub union_id: Option<String>,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<Watermark>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneInfo {
    /// With country code for numbers outside mainland China.
    pub phone_number: String,
    pub pure_phone_number: String,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<Watermark>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_info_camel_case() {
        let u: UserInfo = serde_json::from_value(json!({
            "openId": "o1",
            "nickName": "Band",
            "gender": 1,
            "city": "Guangzhou",
            "province": "Guangdong",
            "country": "CN",
            "avatarUrl": "http://wx.qlogo.cn/x/0",
            "unionId": "u1",
            "language": "zh_CN",
            "watermark": {"appid": "wx1", "timestamp": 1_477_314_187}
        }))
        .unwrap();
        assert_eq!(u.open_id, "o1");
        assert_eq!(u.avatar_url, "http://wx.qlogo.cn/x/0");
        assert_eq!(u.union_id.as_deref(), Some("u1"));
        assert_eq!(u.watermark.unwrap().timestamp, 1_477_314_187);
    }

    #[test]
    fn test_phone_info_missing_fields_default() {
        let p: PhoneInfo = serde_json::from_value(json!({"phoneNumber": "13580006666"})).unwrap();
        assert_eq!(p.phone_number, "13580006666");
        assert!(p.pure_phone_number.is_empty());
        assert!(p.watermark.is_none());
    }
}
