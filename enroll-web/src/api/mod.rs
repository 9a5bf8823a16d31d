//! HTTP handlers for the enrollment wizard

pub mod error;
pub mod finalize;
pub mod health;
pub mod review;
pub mod stages;
pub mod ui;
pub mod upload;

pub use error::{ApiError, ApiResult};
pub use finalize::finalize;
pub use health::health_routes;
pub use review::review;
pub use stages::{submit_course, submit_education, submit_personal};
pub use ui::{course_form, education_form, home, personal_form};
pub use upload::{submit_uploads, upload_form};
