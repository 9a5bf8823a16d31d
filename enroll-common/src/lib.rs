//! # Enrollment Common Library
//!
//! Shared code for the enrollment service:
//! - Wizard stage models
//! - Requirement upload validation
//! - Database schema and the enrollment finalizer
//! - Bootstrap configuration loading
//! - Error types

pub mod config;
pub mod db;
pub mod error;
pub mod upload;
pub mod wizard;

pub use error::{Error, Result};
pub use wizard::{
    CompleteEnrollment, CourseSelection, DocumentKind, EducationRecord, PersonalData, StageKey,
    StageRecord, UploadedDocumentSet, WizardState,
};
