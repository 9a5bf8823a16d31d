//! Embedded wizard pages
//!
//! Pages are static HTML compiled into the binary. Only the review page has
//! dynamic content, filled in by [`super::review`].

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../ui/index.html");
const PERSONAL_HTML: &str = include_str!("../../ui/personaldetails.html");
const EDUCATION_HTML: &str = include_str!("../../ui/educational_bg.html");
const COURSE_HTML: &str = include_str!("../../ui/course-detail.html");
pub(crate) const UPLOAD_HTML: &str = include_str!("../../ui/upload_requirements.html");
pub(crate) const SUBMISSION_HTML: &str = include_str!("../../ui/submission.html");

/// Fragment returned after a successful finalize
pub const SUCCESS_HTML: &str = "<h2>Enrollment Successful!</h2><p>Thank you for enrolling.</p>";

/// GET /
pub async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /form
pub async fn personal_form() -> Html<&'static str> {
    Html(PERSONAL_HTML)
}

/// GET /educational
pub async fn education_form() -> Html<&'static str> {
    Html(EDUCATION_HTML)
}

/// GET /course
pub async fn course_form() -> Html<&'static str> {
    Html(COURSE_HTML)
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#x27;y&#x27;&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("Cruz_Ana_Grades"), "Cruz_Ana_Grades");
    }

    #[test]
    fn test_submission_template_has_placeholders() {
        for placeholder in ["{{PERSONAL}}", "{{EDUCATION}}", "{{COURSE}}", "{{UPLOADS}}"] {
            assert!(SUBMISSION_HTML.contains(placeholder), "missing {}", placeholder);
        }
    }
}
