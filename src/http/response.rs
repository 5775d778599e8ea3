//! Response rendering.
//!
//! # Responsibilities
//! - Render a decision as a bare verdict or an explanatory HTML page
//! - Build the plain-text error and not-found responses
//!
//! # Design Decisions
//! - Main endpoint answers carry status 404, whatever the verdict
//! - Error bodies describe the failure without internal paths or traces

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::decision::{DecisionResult, DEMOCRACY_THRESHOLD};
use crate::http::request::ResponseFormat;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

/// Where the democracy index comes from.
pub const ATTRIBUTION_URL: &str =
    "https://worldpopulationreview.com/country-rankings/democracy-countries";

/// Status of every rendered main endpoint answer.
pub const MAIN_STATUS: StatusCode = StatusCode::NOT_FOUND;

/// A rendered body and its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    pub content_type: &'static str,
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        (MAIN_STATUS, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// Render a decision in the requested format.
pub fn render(result: &DecisionResult, format: ResponseFormat) -> Rendered {
    match format {
        ResponseFormat::Plain => Rendered {
            body: result.verdict.as_str().to_string(),
            content_type: TEXT_PLAIN,
        },
        ResponseFormat::Html => Rendered {
            body: render_html(result),
            content_type: TEXT_HTML,
        },
    }
}

fn render_html(result: &DecisionResult) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n");
    page.push_str("<html>\n");
    page.push_str("<head>\n");
    page.push_str("<title>Do You Live In A Democracy?</title>\n");
    page.push_str("</head>\n");
    page.push_str("<body>\n");
    page.push_str(&format!("<h1>{}</h1>\n", result.verdict));
    page.push_str("<div>\n");
    page.push_str(&format!("Country code: {}<br>\n", result.country_code));
    if result.country_name.is_empty() {
        page.push_str("We could not find your country.<br>\n");
    } else {
        page.push_str(&format!("Country name: {}<br>\n", result.country_name));
        if !result.found {
            page.push_str("We could not find your democracy score.<br>\n");
        } else {
            page.push_str(&format!(
                "Democracy score: {:.2} ({})<br>\n",
                result.score, result.category
            ));
            page.push_str(&format!(
                "<i>Countries scoring {:.2} or higher are considered democracies.  \
                 See <a href=\"{}\">this link</a> for more details.</i><br>\n",
                DEMOCRACY_THRESHOLD, ATTRIBUTION_URL
            ));
        }
    }
    page.push_str("</div>\n");
    page.push_str("</body>\n");
    page.push_str("</html>\n");
    page
}

/// 500 with the error description as plain text.
pub fn internal_error(error: &impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        error.to_string(),
    )
        .into_response()
}

/// 404 with body `Not found`.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, TEXT_PLAIN)], "Not found").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Verdict;

    fn result(name: &str, found: bool, score: f64, verdict: Verdict) -> DecisionResult {
        DecisionResult {
            country_code: "NO".into(),
            country_name: name.into(),
            found,
            score,
            category: if found { "Full democracy".into() } else { String::new() },
            verdict,
        }
    }

    #[test]
    fn test_plain_is_bare_verdict() {
        for verdict in [Verdict::Yes, Verdict::No, Verdict::Unknown] {
            let rendered = render(&result("Norway", true, 9.81, verdict), ResponseFormat::Plain);
            assert_eq!(rendered.body, verdict.as_str());
            assert_eq!(rendered.content_type, TEXT_PLAIN);
        }
    }

    #[test]
    fn test_html_with_score() {
        let rendered = render(&result("Norway", true, 9.81, Verdict::Yes), ResponseFormat::Html);
        assert_eq!(rendered.content_type, TEXT_HTML);
        let body = rendered.body;
        assert!(body.starts_with("<!DOCTYPE html>\n"));
        assert!(body.contains("<title>Do You Live In A Democracy?</title>"));
        assert!(body.contains("<h1>Yes</h1>\n"));
        assert!(body.contains("Country code: NO<br>\n"));
        assert!(body.contains("Country name: Norway<br>\n"));
        assert!(body.contains("Democracy score: 9.81 (Full democracy)<br>\n"));
        assert!(body.contains("Countries scoring 8.01 or higher are considered democracies."));
        assert!(body.contains(ATTRIBUTION_URL));
        assert!(body.ends_with("</html>\n"));
    }

    #[test]
    fn test_html_score_two_decimals() {
        let rendered = render(&result("Norway", true, 7.5, Verdict::No), ResponseFormat::Html);
        assert!(rendered.body.contains("Democracy score: 7.50 (Full democracy)"));
    }

    #[test]
    fn test_html_unknown_country() {
        let rendered = render(&result("", false, 0.0, Verdict::Unknown), ResponseFormat::Html);
        assert!(rendered.body.contains("<h1>Unknown</h1>"));
        assert!(rendered.body.contains("We could not find your country.<br>"));
        assert!(!rendered.body.contains("Country name:"));
    }

    #[test]
    fn test_html_missing_score() {
        let rendered =
            render(&result("Antarctica", false, 0.0, Verdict::Unknown), ResponseFormat::Html);
        assert!(rendered.body.contains("Country name: Antarctica<br>"));
        assert!(rendered.body.contains("We could not find your democracy score.<br>"));
        assert!(!rendered.body.contains("Democracy score:"));
    }

    #[test]
    fn test_rendered_status_is_not_found() {
        let response = render(&result("Norway", true, 9.81, Verdict::Yes), ResponseFormat::Plain)
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
    }
}
