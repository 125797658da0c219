use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::constants::{
    MAX_COMPANY_LENGTH, MAX_LONG_TEXT_LENGTH, MAX_NAME_LENGTH, MAX_PHONE_LENGTH,
};
use crate::shared::text::normalize_optional;
use crate::shared::validation::{validate_consent, validate_not_blank, PHONE_REGEX};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InquiryType {
    Service,
    Pricing,
    Partnership,
    #[default]
    Other,
}

impl InquiryType {
    pub fn label(&self) -> &'static str {
        match self {
            InquiryType::Service => "サービスについて",
            InquiryType::Pricing => "料金について",
            InquiryType::Partnership => "協業・パートナーシップ",
            InquiryType::Other => "その他",
        }
    }
}

/// Contact form submission
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequestDto {
    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH, message = "お名前は1〜100文字で入力してください"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(email(message = "メールアドレスの形式が正しくありません"))]
    pub email: String,

    #[validate(length(max = MAX_COMPANY_LENGTH, message = "会社名は200文字以内で入力してください"))]
    pub company: Option<String>,

    #[validate(
        length(max = MAX_PHONE_LENGTH, message = "電話番号は20文字以内で入力してください"),
        regex(path = *PHONE_REGEX, message = "電話番号の形式が正しくありません")
    )]
    pub phone: Option<String>,

    #[serde(default)]
    pub inquiry_type: InquiryType,

    #[validate(
        length(min = 1, max = MAX_LONG_TEXT_LENGTH, message = "お問い合わせ内容は1〜5000文字で入力してください"),
        custom(function = "validate_not_blank")
    )]
    pub message: String,

    /// Must be `true`; a missing value counts as not given
    #[serde(default)]
    #[validate(custom(function = "validate_consent"))]
    pub consent: bool,
}

impl ContactRequestDto {
    /// Trim fields and drop empty optional values before validation
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            company: normalize_optional(self.company),
            phone: normalize_optional(self.phone),
            message: self.message.trim().to_string(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponseDto {
    /// Message id assigned by the email provider
    pub message_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn valid_request() -> ContactRequestDto {
        ContactRequestDto {
            name: Name().fake(),
            email: SafeEmail().fake(),
            company: None,
            phone: Some("03-1234-5678".into()),
            inquiry_type: InquiryType::Service,
            message: "サービスについて詳しく知りたいです。".into(),
            consent: true,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_consent_must_be_true() {
        let dto = ContactRequestDto {
            consent: false,
            ..valid_request()
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("consent"));
    }

    #[test]
    fn test_blank_message_rejected() {
        let dto = ContactRequestDto {
            message: "   ".into(),
            ..valid_request()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_empty_optional_fields_are_dropped() {
        let dto = ContactRequestDto {
            phone: Some("".into()),
            company: Some("  ".into()),
            ..valid_request()
        }
        .normalized();
        assert!(dto.phone.is_none());
        assert!(dto.company.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_invalid_phone_rejected() {
        let dto = ContactRequestDto {
            phone: Some("call me".into()),
            ..valid_request()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_inquiry_type_defaults_to_other() {
        let dto: ContactRequestDto = serde_json::from_value(serde_json::json!({
            "name": "山田太郎",
            "email": "taro@example.jp",
            "message": "hello",
            "consent": true
        }))
        .unwrap();
        assert_eq!(dto.inquiry_type, InquiryType::Other);
    }
}
