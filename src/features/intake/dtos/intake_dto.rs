use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::intake::models::{EmailDeliveryStatus, IntakeStatus, RequestType};
use crate::shared::constants::{
    MAX_COMPANY_LENGTH, MAX_LONG_TEXT_LENGTH, MAX_NAME_LENGTH, MAX_PHONE_LENGTH,
    MAX_SHORT_TEXT_LENGTH,
};
use crate::shared::text::normalize_optional;
use crate::shared::validation::{validate_consent, validate_not_blank, PHONE_REGEX};

/// Intake form fields, sent as JSON or as multipart text fields
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_required_by_type"))]
pub struct IntakeSubmissionDto {
    pub request_type: RequestType,

    #[validate(
        length(min = 1, max = MAX_NAME_LENGTH, message = "お名前は1〜100文字で入力してください"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[validate(email(message = "メールアドレスの形式が正しくありません"))]
    pub email: String,

    #[validate(
        length(max = MAX_PHONE_LENGTH),
        regex(path = *PHONE_REGEX, message = "電話番号の形式が正しくありません")
    )]
    pub phone: Option<String>,

    #[validate(length(max = MAX_COMPANY_LENGTH))]
    pub company_name: Option<String>,

    #[validate(length(max = MAX_SHORT_TEXT_LENGTH))]
    pub position: Option<String>,

    #[validate(length(max = MAX_SHORT_TEXT_LENGTH))]
    pub industry: Option<String>,

    #[validate(length(max = 50))]
    pub employee_count: Option<String>,

    #[validate(
        length(max = 500),
        url(message = "WebサイトのURLが正しくありません")
    )]
    pub website_url: Option<String>,

    #[validate(length(max = MAX_LONG_TEXT_LENGTH))]
    pub business_description: Option<String>,

    #[validate(length(max = MAX_LONG_TEXT_LENGTH))]
    pub challenges: Option<String>,

    #[validate(length(max = MAX_LONG_TEXT_LENGTH))]
    pub goals: Option<String>,

    #[validate(length(max = MAX_SHORT_TEXT_LENGTH))]
    pub budget: Option<String>,

    #[validate(length(max = MAX_SHORT_TEXT_LENGTH))]
    pub timeline: Option<String>,

    #[validate(length(max = 50))]
    pub preferred_contact: Option<String>,

    #[validate(length(max = MAX_LONG_TEXT_LENGTH))]
    pub message: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_consent"))]
    pub consent: bool,
}

impl IntakeSubmissionDto {
    /// Trim fields and drop empty optional values before validation
    pub fn normalized(self) -> Self {
        Self {
            request_type: self.request_type,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: normalize_optional(self.phone),
            company_name: normalize_optional(self.company_name),
            position: normalize_optional(self.position),
            industry: normalize_optional(self.industry),
            employee_count: normalize_optional(self.employee_count),
            website_url: normalize_optional(self.website_url),
            business_description: normalize_optional(self.business_description),
            challenges: normalize_optional(self.challenges),
            goals: normalize_optional(self.goals),
            budget: normalize_optional(self.budget),
            timeline: normalize_optional(self.timeline),
            preferred_contact: normalize_optional(self.preferred_contact),
            message: normalize_optional(self.message),
            consent: self.consent,
        }
    }

    /// Fields the chosen request type needs but the submission left empty
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let required: Vec<(&'static str, &Option<String>)> = match self.request_type {
            RequestType::Diagnosis => vec![
                ("companyName", &self.company_name),
                ("businessDescription", &self.business_description),
                ("challenges", &self.challenges),
            ],
            RequestType::Estimate => {
                vec![("companyName", &self.company_name), ("budget", &self.budget)]
            }
            RequestType::Consultation | RequestType::Other => vec![("message", &self.message)],
        };

        required
            .into_iter()
            .filter(|(_, value)| !value.as_deref().is_some_and(|v| !v.trim().is_empty()))
            .map(|(name, _)| name)
            .collect()
    }
}

fn validate_required_by_type(dto: &IntakeSubmissionDto) -> Result<(), ValidationError> {
    let missing = dto.missing_required_fields();
    if missing.is_empty() {
        return Ok(());
    }

    let mut err = ValidationError::new("required_for_request_type");
    err.message = Some(format!("必須項目が入力されていません: {}", missing.join(", ")).into());
    Err(err)
}

/// Multipart body of `POST /api/intake`.
/// Documentation only; the handler reads the parts itself.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct IntakeUploadForm {
    /// Same fields as the JSON body, as text parts (`consent` = "true")
    pub request_type: String,
    pub name: String,
    pub email: String,
    /// Up to 10 files, 10 MB each and 25 MB in total
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
}

/// Result of a submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntakeSubmittedDto {
    pub id: Uuid,
    pub status: IntakeStatus,
    pub admin_email_status: EmailDeliveryStatus,
    pub user_email_status: EmailDeliveryStatus,
    pub attachment_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn submission(request_type: RequestType) -> IntakeSubmissionDto {
        IntakeSubmissionDto {
            request_type,
            name: Name().fake(),
            email: SafeEmail().fake(),
            phone: None,
            company_name: None,
            position: None,
            industry: None,
            employee_count: None,
            website_url: None,
            business_description: None,
            challenges: None,
            goals: None,
            budget: None,
            timeline: None,
            preferred_contact: None,
            message: None,
            consent: true,
        }
    }

    #[test]
    fn test_diagnosis_requires_business_context() {
        let dto = submission(RequestType::Diagnosis);
        assert_eq!(
            dto.missing_required_fields(),
            vec!["companyName", "businessDescription", "challenges"]
        );
        assert!(dto.validate().is_err());

        let dto = IntakeSubmissionDto {
            company_name: Some("山田工業".into()),
            business_description: Some("金属加工".into()),
            challenges: Some("人手不足".into()),
            ..submission(RequestType::Diagnosis)
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_estimate_requires_company_and_budget() {
        let dto = IntakeSubmissionDto {
            company_name: Some("山田工業".into()),
            ..submission(RequestType::Estimate)
        };
        assert_eq!(dto.missing_required_fields(), vec!["budget"]);
    }

    #[test]
    fn test_consultation_and_other_require_message() {
        for request_type in [RequestType::Consultation, RequestType::Other] {
            let dto = submission(request_type);
            assert_eq!(dto.missing_required_fields(), vec!["message"]);

            let dto = IntakeSubmissionDto {
                message: Some("相談したいです".into()),
                ..submission(request_type)
            };
            assert!(dto.validate().is_ok());
        }
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let dto = IntakeSubmissionDto {
            message: Some("   ".into()),
            ..submission(RequestType::Other)
        }
        .normalized();
        assert!(dto.message.is_none());
        assert_eq!(dto.missing_required_fields(), vec!["message"]);
    }

    #[test]
    fn test_consent_required() {
        let dto = IntakeSubmissionDto {
            consent: false,
            message: Some("hello".into()),
            ..submission(RequestType::Other)
        };
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("consent"));
    }

    #[test]
    fn test_unknown_request_type_fails_to_parse() {
        let parsed = serde_json::from_value::<IntakeSubmissionDto>(serde_json::json!({
            "requestType": "partnership",
            "name": "山田",
            "email": "a@example.jp",
            "consent": true
        }));
        assert!(parsed.is_err());
    }
}
