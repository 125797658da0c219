mod form_parser;
mod intake_notifier;
mod intake_service;

pub use form_parser::{read_intake_form, UploadedFile};
pub use intake_notifier::IntakeNotifier;
pub use intake_service::IntakeService;
