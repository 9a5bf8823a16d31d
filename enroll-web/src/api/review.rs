//! Review page
//!
//! Renders everything the session has accumulated so the student can check
//! it before finalizing. Missing stages render as empty sections.

use axum::{extract::State, response::Html};
use enroll_common::{CourseSelection, EducationRecord, PersonalData, UploadedDocumentSet};

use super::ui::{escape_html, SUBMISSION_HTML};
use crate::session::SessionId;
use crate::AppState;

/// GET /submission
pub async fn review(State(state): State<AppState>, session: SessionId) -> Html<String> {
    let wizard = state.sessions.snapshot(session).await;

    let personal = personal_section(wizard.personal.as_ref());
    let education = education_section(wizard.education.as_ref());
    let course = course_section(wizard.course.as_ref());
    let uploads = uploads_section(wizard.uploads.as_ref());

    Html(fill_template(
        SUBMISSION_HTML,
        &[
            ("PERSONAL", personal.as_str()),
            ("EDUCATION", education.as_str()),
            ("COURSE", course.as_str()),
            ("UPLOADS", uploads.as_str()),
        ],
    ))
}

/// Substitute `{{NAME}}` markers in a single pass over `template`
///
/// Inserted values are never scanned again, so markers typed into form
/// fields come out as plain text. Unknown markers are kept verbatim.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let name = &after[..end];
        match values.iter().find(|(marker, _)| *marker == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

fn definition_list(rows: &[(&str, &Option<String>)]) -> String {
    let mut html = String::from("<dl>");
    for (label, value) in rows {
        html.push_str(&format!(
            "<dt>{}</dt><dd>{}</dd>",
            label,
            escape_html(value.as_deref().unwrap_or_default())
        ));
    }
    html.push_str("</dl>");
    html
}

fn personal_section(personal: Option<&PersonalData>) -> String {
    let pd = personal.cloned().unwrap_or_default();
    definition_list(&[
        ("First name", &pd.first_name),
        ("Middle name", &pd.middle_name),
        ("Last name", &pd.last_name),
        ("Address", &pd.address),
        ("District", &pd.district),
        ("Contact", &pd.contact),
        ("Email", &pd.email),
        ("Gender", &pd.gender),
        ("Birthdate", &pd.birthdate),
        ("Age", &pd.age),
        ("LRN", &pd.lrn),
        ("Citizenship", &pd.citizenship),
        ("Civil status", &pd.civil_status),
        ("Religion", &pd.religion),
        ("Father", &pd.father_name),
        ("Father's occupation", &pd.father_occupation),
        ("Father's contact", &pd.father_contact),
        ("Mother", &pd.mother_name),
        ("Mother's occupation", &pd.mother_occupation),
        ("Mother's contact", &pd.mother_contact),
        ("Guardian", &pd.guardian_name),
        ("Guardian's occupation", &pd.guardian_occupation),
        ("Guardian's contact", &pd.guardian_contact),
    ])
}

fn education_section(education: Option<&EducationRecord>) -> String {
    let edu = education.cloned().unwrap_or_default();
    definition_list(&[
        ("First generation", &edu.first_gen),
        ("Elementary", &edu.elementary),
        ("Elementary year", &edu.elem_year),
        ("Elementary honors", &edu.elem_honors),
        ("High school", &edu.highschool),
        ("High school year", &edu.hs_year),
        ("High school honors", &edu.hs_honors),
        ("College", &edu.college),
        ("College year", &edu.college_year),
        ("College honors", &edu.college_honors),
    ])
}

fn course_section(course: Option<&CourseSelection>) -> String {
    let course = course.cloned().unwrap_or_default();
    definition_list(&[
        ("Program ID", &course.id_number),
        ("Year level", &course.year_level),
        ("Enrollment status", &course.enroll_status),
        ("Student status", &course.student_status),
    ])
}

fn uploads_section(uploads: Option<&UploadedDocumentSet>) -> String {
    let mut html = String::from("<ul>");
    for (kind, filename) in uploads.into_iter().flat_map(|u| u.iter()) {
        html.push_str(&format!(
            "<li>{}: {}</li>",
            kind.label(),
            escape_html(filename)
        ));
    }
    html.push_str("</ul>");
    html
}
