use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use validator::ValidationError;

lazy_static! {
    /// Regex for URL slugs of news and blog entries
    /// Must be lowercase alphanumeric with single hyphens
    /// - Valid: "spring-campaign", "2025-04-news", "a"
    /// - Invalid: "-news", "news-", "news--item", "News", "news_item"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for phone numbers as typed into the forms
    /// Digits with optional leading "+", hyphens, spaces and parentheses
    /// - Valid: "03-1234-5678", "+81 90 1234 5678", "(03)1234-5678"
    /// - Invalid: "abc", "03-1234-5678 ext", "++81"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9()\- ]{6,19}$").unwrap();
}

/// Consent checkboxes must be explicitly ticked
pub fn validate_consent(consent: &bool) -> Result<(), ValidationError> {
    if *consent {
        Ok(())
    } else {
        let mut err = ValidationError::new("consent_required");
        err.message = Some("個人情報の取り扱いへの同意が必要です".into());
        Err(err)
    }
}

/// Reject strings that are empty after trimming
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

/// Absolute http(s) URL with a host; other schemes such as `javascript:` are refused
pub fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => {
            let mut err = ValidationError::new("url");
            err.message = Some("http:// または https:// で始まるURLを入力してください".into());
            Err(err)
        }
    }
}

/// Like [`validate_http_url`] but accepts an empty string, which clears the field
pub fn validate_http_url_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Ok(())
    } else {
        validate_http_url(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("spring-campaign"));
        assert!(SLUG_REGEX.is_match("2025-04-news"));
        assert!(SLUG_REGEX.is_match("a"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-news")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("news-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("news--item")); // double hyphen
        assert!(!SLUG_REGEX.is_match("News")); // uppercase
        assert!(!SLUG_REGEX.is_match("news_item")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
        assert!(!SLUG_REGEX.is_match("お知らせ"));
    }

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("03-1234-5678"));
        assert!(PHONE_REGEX.is_match("+81 90 1234 5678"));
        assert!(PHONE_REGEX.is_match("(03)1234-5678"));
        assert!(!PHONE_REGEX.is_match("abc"));
        assert!(!PHONE_REGEX.is_match("++81"));
        assert!(!PHONE_REGEX.is_match("03-1234-5678 ext"));
    }

    #[test]
    fn test_consent_and_blank() {
        assert!(validate_consent(&true).is_ok());
        assert!(validate_consent(&false).is_err());
        assert!(validate_not_blank("  ").is_err());
        assert!(validate_not_blank("x").is_ok());
    }

    #[test]
    fn test_http_url() {
        assert!(validate_http_url("https://cdn.example.jp/a.png").is_ok());
        assert!(validate_http_url("http://localhost:9000/bucket/a.png").is_ok());
        assert!(validate_http_url("javascript:alert(1)").is_err());
        assert!(validate_http_url("data:text/html,<script>").is_err());
        assert!(validate_http_url("ftp://example.jp/a.png").is_err());
        assert!(validate_http_url("/relative/a.png").is_err());
        assert!(validate_http_url("").is_err());
    }

    #[test]
    fn test_http_url_or_empty() {
        assert!(validate_http_url_or_empty("").is_ok());
        assert!(validate_http_url_or_empty("  ").is_ok());
        assert!(validate_http_url_or_empty("https://example.jp").is_ok());
        assert!(validate_http_url_or_empty("javascript:alert(1)").is_err());
    }
}
