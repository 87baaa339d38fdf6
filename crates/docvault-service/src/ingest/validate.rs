//! Structural upload validation.
//!
//! Validation runs before any side effect; a failure here leaves nothing
//! to compensate.

use docvault_core::error::AppError;

/// Checks an upload's name, size, and declared type.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    /// Maximum accepted upload size in bytes.
    max_size_bytes: u64,
    /// Allowed content types (empty = allow any).
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    /// Create a new validator.
    pub fn new(max_size_bytes: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_size_bytes,
            allowed_content_types,
        }
    }

    /// Validate an upload, returning a validation error on the first
    /// failed check.
    pub fn validate(
        &self,
        name: &str,
        size_bytes: usize,
        content_type: Option<&str>,
    ) -> Result<(), AppError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("File name cannot be empty"));
        }
        if trimmed.contains('/') || trimmed.contains('\\') || trimmed.contains("..") {
            return Err(AppError::validation(format!(
                "File name '{trimmed}' contains path segments"
            )));
        }

        if size_bytes == 0 {
            return Err(AppError::validation("File is empty"));
        }
        if size_bytes as u64 > self.max_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.max_size_bytes
            )));
        }

        if !self.allowed_content_types.is_empty() {
            let declared = content_type.unwrap_or("application/octet-stream");
            if !self
                .allowed_content_types
                .iter()
                .any(|allowed| allowed == declared)
            {
                return Err(AppError::validation(format!(
                    "Content type '{declared}' is not accepted"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_upload() {
        let validator = UploadValidator::new(1024, Vec::new());
        assert!(validator.validate("a.pdf", 10, None).is_ok());
    }

    #[test]
    fn test_rejects_oversize() {
        let validator = UploadValidator::new(4, Vec::new());
        assert!(validator.validate("a.pdf", 5, None).is_err());
    }

    #[test]
    fn test_rejects_empty_and_path_names() {
        let validator = UploadValidator::new(1024, Vec::new());
        assert!(validator.validate("  ", 1, None).is_err());
        assert!(validator.validate("../evil.pdf", 1, None).is_err());
        assert!(validator.validate("dir/evil.pdf", 1, None).is_err());
    }

    #[test]
    fn test_content_type_allow_list() {
        let validator = UploadValidator::new(1024, vec!["application/pdf".to_string()]);
        assert!(
            validator
                .validate("a.pdf", 1, Some("application/pdf"))
                .is_ok()
        );
        assert!(validator.validate("a.exe", 1, Some("application/x-dosexec")).is_err());
        assert!(validator.validate("a.bin", 1, None).is_err());
    }
}
