mod intake_response;

pub use intake_response::{
    Attachment, CreateIntakeResponse, EmailDeliveryStatus, IntakeResponse, IntakeStatus,
    RequestType,
};
