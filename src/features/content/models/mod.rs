mod content_item;

pub use content_item::{resolve_published_at, ContentItem, ContentKind, ContentLink, ContentStatus};
