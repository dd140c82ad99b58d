//! Turning a report response into something the window can show.

use log::{debug, error};
use serde_json::Value;

pub const FALLBACK_FILE_NAME: &str = "response";
pub const PROCESSING_ERROR: &str = "An error occurred while processing the response.";

/// Raw response as received from the report service.
#[derive(Debug, Clone, Default)]
pub struct ReportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

/// A file payload to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Text for the output area.
    Message(String),
    /// Body claimed to be JSON but did not parse.
    ProcessingError,
    Download(DownloadFile),
}

impl ResponseOutcome {
    /// Text shown in the output area, if any.
    pub fn output_text(&self) -> Option<&str> {
        match self {
            ResponseOutcome::Message(text) => Some(text),
            ResponseOutcome::ProcessingError => Some(PROCESSING_ERROR),
            ResponseOutcome::Download(_) => None,
        }
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
}

/// Branch on the declared content type. JSON bodies become text; every
/// other content type, including none, becomes a download.
pub fn interpret(response: ReportResponse) -> ResponseOutcome {
    if is_json(response.content_type.as_deref()) {
        return match serde_json::from_slice::<Value>(&response.body) {
            Ok(value) => ResponseOutcome::Message(json_message(&value)),
            Err(e) => {
                error!("Failed to parse JSON response (status {}): {}", response.status, e);
                ResponseOutcome::ProcessingError
            }
        };
    }

    let file_name = download_file_name(response.content_disposition.as_deref());
    debug!("Treating {} byte response as file {}", response.body.len(), file_name);
    ResponseOutcome::Download(DownloadFile {
        file_name,
        bytes: response.body,
    })
}

/// `detail` wins over the full body; string details are shown verbatim.
fn json_message(value: &Value) -> String {
    match value.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(detail) => pretty(detail),
        None => pretty(value),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// File name announced by a `Content-Disposition` header.
///
/// Takes the `filename=` token (quoted or bare) and drops one trailing
/// underscore from the name, or from its stem when it has an extension.
pub fn download_file_name(content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(filename_token)
        .map(trim_trailing_underscore)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

/// Value of the `filename` parameter. A quoted value runs to its closing
/// quote and may contain `;`.
fn filename_token(header: &str) -> Option<&str> {
    let mut rest = header;
    while let Some((_, tail)) = rest.split_once(';') {
        let tail = tail.trim_start();
        let Some(end) = tail.find(['=', ';']) else {
            return None;
        };
        let (key, value) = tail.split_at(end);
        let Some(value) = value.strip_prefix('=') else {
            // Bare token such as `inline`.
            rest = value;
            continue;
        };
        if key.trim().eq_ignore_ascii_case("filename") {
            let value = value.trim_start();
            return Some(match value.strip_prefix('"') {
                Some(quoted) => quoted.split_once('"').map_or(quoted, |(name, _)| name),
                None => value.split(';').next().unwrap_or_default().trim(),
            });
        }
        rest = skip_parameter_value(value);
    }
    None
}

/// Remainder after a parameter value, starting at the next `;`.
fn skip_parameter_value(value: &str) -> &str {
    let value = value.trim_start();
    let after = match value.strip_prefix('"') {
        Some(quoted) => quoted.split_once('"').map_or("", |(_, tail)| tail),
        None => value,
    };
    after.find(';').map_or("", |i| &after[i..])
}

fn trim_trailing_underscore(name: &str) -> String {
    if let Some(stripped) = name.strip_suffix('_') {
        return stripped.to_string();
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => match stem.strip_suffix('_') {
            Some(stem) => format!("{stem}.{ext}"),
            None => name.to_string(),
        },
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(body: &str) -> ReportResponse {
        ReportResponse {
            status: 200,
            content_type: Some("application/json".to_string()),
            content_disposition: None,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn json_body_is_pretty_printed() {
        let outcome = interpret(json(r#"{"ok": true}"#));
        assert_eq!(outcome, ResponseOutcome::Message("{\n  \"ok\": true\n}".to_string()));
    }

    #[test]
    fn detail_is_shown_verbatim() {
        let outcome = interpret(json(r#"{"detail": "bad input"}"#));
        assert_eq!(outcome.output_text(), Some("bad input"));
    }

    #[test]
    fn structured_detail_is_pretty_printed() {
        let outcome = interpret(json(r#"{"detail": [{"loc": ["body"]}]}"#));
        let text = outcome.output_text().unwrap();
        assert!(text.starts_with('['));
        assert!(text.contains("\"loc\""));
    }

    #[test]
    fn malformed_json_yields_processing_error() {
        let outcome = interpret(json("{not json"));
        assert_eq!(outcome, ResponseOutcome::ProcessingError);
        assert_eq!(outcome.output_text(), Some(PROCESSING_ERROR));
    }

    #[test]
    fn json_content_type_with_charset_is_json() {
        let mut response = json(r#"{"a": 1}"#);
        response.content_type = Some("Application/JSON; charset=utf-8".to_string());
        assert!(matches!(interpret(response), ResponseOutcome::Message(_)));
    }

    #[test]
    fn binary_response_becomes_download() {
        let response = ReportResponse {
            status: 200,
            content_type: Some("application/octet-stream".to_string()),
            content_disposition: Some(r#"attachment; filename="report_.csv""#.to_string()),
            body: b"a,b\n1,2\n".to_vec(),
        };
        match interpret(response) {
            ResponseOutcome::Download(file) => {
                assert_eq!(file.file_name, "report.csv");
                assert_eq!(file.bytes, b"a,b\n1,2\n");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn missing_content_type_is_a_download() {
        let response = ReportResponse {
            body: vec![1, 2, 3],
            ..ReportResponse::default()
        };
        let outcome = interpret(response);
        assert_eq!(outcome.output_text(), None);
        assert!(matches!(outcome, ResponseOutcome::Download(ref f) if f.file_name == FALLBACK_FILE_NAME));
    }

    #[test]
    fn file_name_variants() {
        assert_eq!(download_file_name(None), "response");
        assert_eq!(download_file_name(Some("attachment")), "response");
        assert_eq!(download_file_name(Some(r#"attachment; filename="x_""#)), "x");
        assert_eq!(
            download_file_name(Some(r#"attachment; filename="ACME CIS Compliance report.xlsx""#)),
            "ACME CIS Compliance report.xlsx"
        );
        assert_eq!(download_file_name(Some("attachment; filename=plain.csv; size=3")), "plain.csv");
        assert_eq!(download_file_name(Some(r#"attachment; filename="a__.csv""#)), "a_.csv");
    }

    #[test]
    fn quoted_file_name_may_contain_semicolons() {
        assert_eq!(
            download_file_name(Some(r#"attachment; filename="Q1; EU report_.csv""#)),
            "Q1; EU report.csv"
        );
        assert_eq!(
            download_file_name(Some(r#"attachment; note="a; filename=x"; filename=y.csv"#)),
            "y.csv"
        );
        assert_eq!(
            download_file_name(Some(r#"attachment; filename*=UTF-8''z.csv; filename="z_.csv""#)),
            "z.csv"
        );
        assert_eq!(download_file_name(Some("attachment; inline; filename=a.csv")), "a.csv");
    }
}
