use std::path::Path;

use crate::errors::AppError;

/// Extracts plain text from a PDF file on disk.
///
/// Fails with `PdfInvalid` if the file is absent, zero-length,
/// password-protected, or scanned without OCR (trimmed text length < 1).
pub fn extract_from_pdf(path: &Path) -> Result<String, AppError> {
    let metadata = std::fs::metadata(path)
        .map_err(|_| AppError::PdfInvalid(format!("file not found: {}", path.display())))?;

    if metadata.len() == 0 {
        return Err(AppError::PdfInvalid(format!(
            "file is empty: {}",
            path.display()
        )));
    }

    let text = pdf_extract::extract_text(path).map_err(|e| {
        AppError::PdfInvalid(format!(
            "failed to parse PDF at {} (possibly password-protected): {e}",
            path.display()
        ))
    })?;

    if text.trim().len() < 1 {
        return Err(AppError::PdfInvalid(format!(
            "PDF contains no extractable text (likely scanned without OCR): {}",
            path.display()
        )));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_is_pdf_invalid() {
        let result = extract_from_pdf(&PathBuf::from("/nonexistent/path/does-not-exist.pdf"));
        assert!(matches!(result, Err(AppError::PdfInvalid(_))));
    }

    #[test]
    fn test_empty_file_is_pdf_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::write(&path, []).unwrap();
        let result = extract_from_pdf(&path);
        assert!(matches!(result, Err(AppError::PdfInvalid(_))));
    }
}
