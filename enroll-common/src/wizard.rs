//! Enrollment wizard stage models
//!
//! Each wizard page submits one stage record. Records are accumulated in the
//! session store until finalize turns them into database rows.
//!
//! Form fields map one-to-one onto struct fields. A field missing from the
//! submission deserializes to `None`; a submitted value (even an empty one)
//! is stored verbatim.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{Error, Result};

/// Identity, contact and family details (first wizard page)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalData {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub district: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    /// Learner Reference Number
    pub lrn: Option<String>,
    pub age: Option<String>,
    pub citizenship: Option<String>,
    pub civil_status: Option<String>,
    pub religion: Option<String>,
    pub father_name: Option<String>,
    pub father_occupation: Option<String>,
    pub father_contact: Option<String>,
    pub mother_name: Option<String>,
    pub mother_occupation: Option<String>,
    pub mother_contact: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_occupation: Option<String>,
    pub guardian_contact: Option<String>,
}

impl PersonalData {
    /// Returns `(last_name, first_name)` when both are present and non-empty
    ///
    /// The upload stage needs both to build the expected filename prefix.
    pub fn identity(&self) -> Option<(&str, &str)> {
        let last = self.last_name.as_deref().filter(|s| !s.is_empty())?;
        let first = self.first_name.as_deref().filter(|s| !s.is_empty())?;
        Some((last, first))
    }
}

/// Prior schooling history (second wizard page)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub first_gen: Option<String>,
    pub elementary: Option<String>,
    pub elem_year: Option<String>,
    pub elem_honors: Option<String>,
    pub highschool: Option<String>,
    pub hs_year: Option<String>,
    pub hs_honors: Option<String>,
    pub college: Option<String>,
    pub college_year: Option<String>,
    pub college_honors: Option<String>,
}

/// Target program and status (third wizard page)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSelection {
    pub id_number: Option<String>,
    pub year_level: Option<String>,
    #[serde(rename = "enroll")]
    pub enroll_status: Option<String>,
    #[serde(rename = "student")]
    pub student_status: Option<String>,
}

/// Kind of requirement document accepted by the upload stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    MedicalCertificate,
    Grades,
    OrgFee,
}

impl DocumentKind {
    /// All kinds in the order the upload form validates them
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::MedicalCertificate,
        DocumentKind::Grades,
        DocumentKind::OrgFee,
    ];

    /// Multipart field name
    pub fn field(self) -> &'static str {
        match self {
            DocumentKind::MedicalCertificate => "medical_certificate",
            DocumentKind::Grades => "grades",
            DocumentKind::OrgFee => "org_fee",
        }
    }

    /// Label used in the required filename prefix
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::MedicalCertificate => "Medical",
            DocumentKind::Grades => "Grades",
            DocumentKind::OrgFee => "OrgFee",
        }
    }

    /// Look up a kind by its multipart field name
    pub fn from_field(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.field() == field)
    }

    /// `{LastName}_{FirstName}_{Label}`
    pub fn expected_prefix(self, last_name: &str, first_name: &str) -> String {
        format!("{}_{}_{}", last_name, first_name, self.label())
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

/// Stored filenames of accepted requirement documents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocumentSet {
    files: BTreeMap<DocumentKind, String>,
}

impl UploadedDocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: DocumentKind, filename: impl Into<String>) {
        self.files.insert(kind, filename.into());
    }

    pub fn get(&self, kind: DocumentKind) -> Option<&str> {
        self.files.get(&kind).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocumentKind, &str)> {
        self.files.iter().map(|(kind, name)| (*kind, name.as_str()))
    }
}

/// Session key of a wizard stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKey {
    Personal,
    Education,
    Course,
    Uploads,
}

impl StageKey {
    pub const ALL: [StageKey; 4] = [
        StageKey::Personal,
        StageKey::Education,
        StageKey::Course,
        StageKey::Uploads,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageKey::Personal => "personal_data",
            StageKey::Education => "education",
            StageKey::Course => "course",
            StageKey::Uploads => "uploaded_files",
        }
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage's submission, tagged by stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageRecord {
    Personal(PersonalData),
    Education(EducationRecord),
    Course(CourseSelection),
    Uploads(UploadedDocumentSet),
}

impl StageRecord {
    pub fn key(&self) -> StageKey {
        match self {
            StageRecord::Personal(_) => StageKey::Personal,
            StageRecord::Education(_) => StageKey::Education,
            StageRecord::Course(_) => StageKey::Course,
            StageRecord::Uploads(_) => StageKey::Uploads,
        }
    }
}

/// Everything a session has accumulated so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    pub personal: Option<PersonalData>,
    pub education: Option<EducationRecord>,
    pub course: Option<CourseSelection>,
    pub uploads: Option<UploadedDocumentSet>,
}

impl WizardState {
    /// Store a stage record, replacing any earlier submission of that stage
    pub fn put(&mut self, record: StageRecord) {
        match record {
            StageRecord::Personal(data) => self.personal = Some(data),
            StageRecord::Education(data) => self.education = Some(data),
            StageRecord::Course(data) => self.course = Some(data),
            StageRecord::Uploads(data) => self.uploads = Some(data),
        }
    }

    /// Fetch a copy of one stage's record, if present
    pub fn get(&self, key: StageKey) -> Option<StageRecord> {
        match key {
            StageKey::Personal => self.personal.clone().map(StageRecord::Personal),
            StageKey::Education => self.education.clone().map(StageRecord::Education),
            StageKey::Course => self.course.clone().map(StageRecord::Course),
            StageKey::Uploads => self.uploads.clone().map(StageRecord::Uploads),
        }
    }

    pub fn contains(&self, key: StageKey) -> bool {
        match key {
            StageKey::Personal => self.personal.is_some(),
            StageKey::Education => self.education.is_some(),
            StageKey::Course => self.course.is_some(),
            StageKey::Uploads => self.uploads.as_ref().is_some_and(|u| !u.is_empty()),
        }
    }

    pub fn clear(&mut self) {
        *self = WizardState::default();
    }

    pub fn is_empty(&self) -> bool {
        self.personal.is_none()
            && self.education.is_none()
            && self.course.is_none()
            && self.uploads.is_none()
    }

    /// First stage still missing before the state can be finalized
    pub fn first_missing(&self) -> Option<StageKey> {
        StageKey::ALL.into_iter().find(|key| !self.contains(*key))
    }

    /// Borrow all four records when every stage is complete
    pub fn complete(&self) -> Option<CompleteEnrollment<'_>> {
        match (&self.personal, &self.education, &self.course, &self.uploads) {
            (Some(personal), Some(education), Some(course), Some(uploads))
                if !uploads.is_empty() =>
            {
                Some(CompleteEnrollment {
                    personal,
                    education,
                    course,
                    uploads,
                })
            }
            _ => None,
        }
    }

    /// Like [`WizardState::complete`], naming the first missing stage on failure
    pub fn require_complete(&self) -> Result<CompleteEnrollment<'_>> {
        match self.first_missing() {
            Some(stage) => Err(Error::MissingPrerequisite(stage)),
            None => self
                .complete()
                .ok_or_else(|| Error::Internal("wizard state incomplete".to_string())),
        }
    }
}

/// All four stage records, ready to persist
#[derive(Debug, Clone, Copy)]
pub struct CompleteEnrollment<'a> {
    pub personal: &'a PersonalData,
    pub education: &'a EducationRecord,
    pub course: &'a CourseSelection,
    pub uploads: &'a UploadedDocumentSet,
}
