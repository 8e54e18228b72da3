//! Text extraction from uploaded CV files. PDF and markdown/plain text are
//! the only accepted formats; everything else is an explicit
//! unsupported-format error rather than a parse attempt.

use bytes::Bytes;

use crate::errors::AppError;

/// Extracts plain text from an uploaded CV file.
///
/// Enforces the byte-size ceiling first. PDF extraction is CPU-bound and
/// runs on the blocking pool so the request dispatcher is not starved.
pub async fn extract_text_from_upload(
    filename: &str,
    content_type: Option<&str>,
    contents: Bytes,
    max_bytes: usize,
) -> Result<String, AppError> {
    if contents.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "upload is {} bytes, limit is {max_bytes}",
            contents.len()
        )));
    }

    let filename = filename.to_lowercase();
    let content_type = content_type.unwrap_or_default();

    if filename.ends_with(".pdf") || content_type == "application/pdf" {
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&contents))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
            .map_err(|e| AppError::Validation(format!("could not extract text from PDF: {e}")))?;
        return Ok(text);
    }

    if filename.ends_with(".md")
        || filename.ends_with(".markdown")
        || content_type.starts_with("text/")
    {
        return Ok(match String::from_utf8(contents.to_vec()) {
            Ok(text) => text,
            // Not UTF-8: decode what we can instead of failing the upload.
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        });
    }

    Err(AppError::UnsupportedFormat(
        "unsupported CV format, send a PDF or Markdown file".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_size_ceiling_enforced() {
        let contents = Bytes::from(vec![0u8; 64]);
        let result = extract_text_from_upload("cv.md", None, contents, 32).await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn test_markdown_decoded_as_utf8() {
        let contents = Bytes::from_static("# Jane Doe\nBackend engineer".as_bytes());
        let text = extract_text_from_upload("cv.md", None, contents, 1024)
            .await
            .unwrap();
        assert!(text.starts_with("# Jane Doe"));
    }

    #[tokio::test]
    async fn test_text_content_type_accepted_without_extension() {
        let contents = Bytes::from_static(b"plain resume body");
        let text = extract_text_from_upload("resume", Some("text/plain"), contents, 1024)
            .await
            .unwrap();
        assert_eq!(text, "plain resume body");
    }

    #[tokio::test]
    async fn test_invalid_utf8_degrades_lossily() {
        let contents = Bytes::from(vec![b'o', b'k', 0xFF, b'!']);
        let text = extract_text_from_upload("cv.md", None, contents, 1024)
            .await
            .unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.ends_with('!'));
    }

    #[tokio::test]
    async fn test_unknown_format_rejected() {
        let contents = Bytes::from_static(b"PK\x03\x04 zip-ish");
        let result =
            extract_text_from_upload("cv.docx", Some("application/zip"), contents, 1024).await;
        assert!(matches!(result, Err(AppError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn test_corrupt_pdf_is_a_validation_error() {
        let contents = Bytes::from_static(b"this is not a pdf");
        let result = extract_text_from_upload("cv.pdf", None, contents, 1024).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
