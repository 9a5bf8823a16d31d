//! Requirement document validation
//!
//! A document is accepted when its extension is on the allow-list and its
//! sanitized filename starts with `{LastName}_{FirstName}_{Label}`.
//! Validation is pure; writing accepted bytes to disk is the caller's job.

use thiserror::Error;

use crate::wizard::DocumentKind;

/// Extensions accepted for requirement documents (compared lowercase)
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "png", "jpg", "jpeg"];

/// Why an uploaded document was refused
///
/// Display text is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    /// No file, empty filename, or extension not on the allow-list
    #[error("Invalid file or format for {field}. Allowed formats: PDF, JPG, PNG")]
    InvalidFormat { field: String },

    /// Sanitized filename does not carry the required prefix
    #[error("Invalid file name for {field}. Must start with: {expected_prefix}")]
    InvalidName {
        field: String,
        expected_prefix: String,
    },
}

/// Extension after the last `.`, lowercased
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// True when `filename` has an extension from `allowed`
pub fn allowed_file(filename: &str, allowed: &[&str]) -> bool {
    extension_of(filename).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Make a client-supplied filename safe to store
///
/// Drops directory components and non-ASCII characters, joins whitespace
/// runs with `_`, removes anything outside `[A-Za-z0-9_.-]`, then trims
/// leading and trailing `.` and `_`. May return an empty string.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let ascii: String = base.chars().filter(char::is_ascii).collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

/// Validate one uploaded document
///
/// `filename` is the client-supplied name (`None` when the field was not
/// sent). Returns the sanitized name to store under on success.
pub fn validate_upload(
    kind: DocumentKind,
    filename: Option<&str>,
    expected_prefix: &str,
    allowed_extensions: &[&str],
) -> Result<String, UploadRejection> {
    let invalid_format = || UploadRejection::InvalidFormat {
        field: kind.field().to_string(),
    };

    let filename = filename.filter(|name| !name.is_empty()).ok_or_else(invalid_format)?;
    if !allowed_file(filename, allowed_extensions) {
        return Err(invalid_format());
    }

    let sanitized = sanitize_filename(filename);
    if !sanitized.starts_with(expected_prefix) {
        return Err(UploadRejection::InvalidName {
            field: kind.field().to_string(),
            expected_prefix: expected_prefix.to_string(),
        });
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(kind: DocumentKind, filename: Option<&str>) -> Result<String, UploadRejection> {
        let prefix = kind.expected_prefix("Cruz", "Ana");
        validate_upload(kind, filename, &prefix, &ALLOWED_EXTENSIONS)
    }

    #[test]
    fn test_accepts_conventional_name() {
        assert_eq!(
            check(DocumentKind::Grades, Some("Cruz_Ana_Grades.pdf")),
            Ok("Cruz_Ana_Grades.pdf".to_string())
        );
        assert_eq!(
            check(DocumentKind::MedicalCertificate, Some("Cruz_Ana_Medical_2024.JPEG")),
            Ok("Cruz_Ana_Medical_2024.JPEG".to_string())
        );
        assert_eq!(
            check(DocumentKind::OrgFee, Some("Cruz_Ana_OrgFee.png")),
            Ok("Cruz_Ana_OrgFee.png".to_string())
        );
    }

    #[test]
    fn test_rejects_missing_prefix() {
        let err = check(DocumentKind::Grades, Some("grades.pdf")).unwrap_err();
        assert!(matches!(&err, UploadRejection::InvalidName { field, .. } if field == "grades"));
        assert_eq!(
            err.to_string(),
            "Invalid file name for grades. Must start with: Cruz_Ana_Grades"
        );
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        let err = check(DocumentKind::Grades, Some("cruz_ana_grades.pdf")).unwrap_err();
        assert!(matches!(err, UploadRejection::InvalidName { .. }));
    }

    #[test]
    fn test_rejects_bad_extension_or_missing_file() {
        for name in [None, Some(""), Some("Cruz_Ana_Grades"), Some("Cruz_Ana_Grades.docx")] {
            let err = check(DocumentKind::Grades, name).unwrap_err();
            assert_eq!(
                err,
                UploadRejection::InvalidFormat {
                    field: "grades".to_string()
                },
                "filename {:?}",
                name
            );
        }
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(allowed_file("scan.PDF", &ALLOWED_EXTENSIONS));
        assert!(allowed_file("scan.Jpg", &ALLOWED_EXTENSIONS));
        assert!(!allowed_file("scan.gif", &ALLOWED_EXTENSIONS));
        assert!(!allowed_file("scan", &ALLOWED_EXTENSIONS));
    }

    #[test]
    fn test_sanitize_strips_paths_and_unsafe_characters() {
        assert_eq!(sanitize_filename("../../etc/Cruz_Ana_Grades.pdf"), "Cruz_Ana_Grades.pdf");
        assert_eq!(sanitize_filename("C:\\Users\\ana\\Cruz_Ana_Grades.pdf"), "Cruz_Ana_Grades.pdf");
        assert_eq!(sanitize_filename("my  report (1).pdf"), "my_report_1.pdf");
        assert_eq!(sanitize_filename("Cruz_Añá_Grades.pdf"), "Cruz_A_Grades.pdf");
        assert_eq!(sanitize_filename("..hidden.pdf"), "hidden.pdf");
        assert_eq!(sanitize_filename("/"), "");
    }

    #[test]
    fn test_path_prefix_is_removed_before_prefix_check() {
        assert_eq!(
            check(DocumentKind::Grades, Some("uploads/Cruz_Ana_Grades.pdf")),
            Ok("Cruz_Ana_Grades.pdf".to_string())
        );
    }
}
