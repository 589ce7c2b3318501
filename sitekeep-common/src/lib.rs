pub mod document;
pub mod validation;

pub use document::{DocumentError, SiteDocument};
pub use validation::{MissingField, PayloadError, check_required_fields, validate_payload};

/// Header carrying the write credential.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Route serving the site document.
pub const SITE_ROUTE: &str = "/api/site";

/// Endpoint the admin client talks to when no URL has been configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5205/api/site";
