use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin_intake::{dtos as admin_intake_dtos, handlers as admin_intake_handlers};
use crate::features::auth;
use crate::features::contact::{dtos as contact_dtos, handlers as contact_handlers};
use crate::features::content::{
    dtos as content_dtos, handlers as content_handlers, models as content_models,
};
use crate::features::intake::{
    dtos as intake_dtos, handlers as intake_handlers, models as intake_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Contact
        contact_handlers::submit_contact,
        // Intake
        intake_handlers::submit_intake,
        // Content (public)
        content_handlers::list_published,
        content_handlers::list_categories,
        content_handlers::get_published,
        // Auth
        auth::handlers::get_me,
        // Admin intake
        admin_intake_handlers::list_intakes,
        admin_intake_handlers::intake_summary,
        admin_intake_handlers::get_intake,
        admin_intake_handlers::update_intake_status,
        // Admin content
        content_handlers::list_content,
        content_handlers::get_content,
        content_handlers::create_content,
        content_handlers::update_content,
        content_handlers::delete_content,
        content_handlers::upload_image,
    ),
    components(
        schemas(
            Meta,
            // Contact
            contact_dtos::InquiryType,
            contact_dtos::ContactRequestDto,
            contact_dtos::ContactResponseDto,
            ApiResponse<contact_dtos::ContactResponseDto>,
            // Intake
            intake_models::RequestType,
            intake_models::IntakeStatus,
            intake_models::EmailDeliveryStatus,
            intake_models::Attachment,
            intake_dtos::IntakeSubmissionDto,
            intake_dtos::IntakeUploadForm,
            intake_dtos::IntakeSubmittedDto,
            ApiResponse<intake_dtos::IntakeSubmittedDto>,
            // Auth
            auth::model::AuthenticatedUser,
            ApiResponse<auth::model::AuthenticatedUser>,
            // Admin intake
            admin_intake_dtos::IntakeListItemDto,
            admin_intake_dtos::AttachmentDto,
            admin_intake_dtos::IntakeDetailDto,
            admin_intake_dtos::UpdateIntakeStatusDto,
            admin_intake_dtos::StatusCountDto,
            admin_intake_dtos::IntakeSummaryDto,
            ApiResponse<Vec<admin_intake_dtos::IntakeListItemDto>>,
            ApiResponse<admin_intake_dtos::IntakeDetailDto>,
            ApiResponse<admin_intake_dtos::IntakeSummaryDto>,
            // Content
            content_models::ContentStatus,
            content_models::ContentLink,
            content_dtos::ContentLinkDto,
            content_dtos::CreateContentDto,
            content_dtos::UpdateContentDto,
            content_dtos::ContentSummaryDto,
            content_dtos::ContentDetailDto,
            content_dtos::ContentAdminDto,
            content_dtos::ImageUploadForm,
            content_dtos::UploadedImageDto,
            ApiResponse<Vec<content_dtos::ContentSummaryDto>>,
            ApiResponse<content_dtos::ContentDetailDto>,
            ApiResponse<Vec<content_dtos::ContentAdminDto>>,
            ApiResponse<content_dtos::ContentAdminDto>,
            ApiResponse<content_dtos::UploadedImageDto>,
            ApiResponse<Vec<String>>,
        )
    ),
    tags(
        (name = "contact", description = "Contact form (public)"),
        (name = "intake", description = "Business diagnosis, consultation and estimate requests (public)"),
        (name = "content", description = "Published news and blog posts (public)"),
        (name = "auth", description = "Admin session"),
        (name = "admin-intake", description = "Intake review (admin only)"),
        (name = "admin-content", description = "News and blog editing, image upload (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Bizsite API",
        version = "0.1.0",
        description = "Contact, intake and content API for the corporate site",
    )
)]
pub struct ApiDoc;

/// Bearer ID token scheme used by the admin endpoints
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Overrides the document title, version and description from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_public_and_admin_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/contact",
            "/api/intake",
            "/api/{section}/{slug}",
            "/api/admin/intake/{id}/status",
            "/api/admin/{collection}/{id}",
            "/api/admin/uploads/images",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
