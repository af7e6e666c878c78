//! Pre-flight checks run before any remote call
//!
//! Order matters and matches what the forms enforce: empty content first,
//! then the attachment size.

use crate::error::ValidationError;
use crate::types::{ConfigDraft, LocalFile};

/// Content must be non-empty for any create or update
#[inline]
pub fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.is_empty() {
        Err(ValidationError::EmptyContent)
    } else {
        Ok(())
    }
}

/// A picked file must not exceed `limit` bytes
#[inline]
pub fn validate_attachment(file: Option<&LocalFile>, limit: u64) -> Result<(), ValidationError> {
    match file {
        Some(file) if file.size() > limit => Err(ValidationError::AttachmentTooLarge {
            size: file.size(),
            limit,
        }),
        _ => Ok(()),
    }
}

/// Full draft check: content, then attachment
pub fn validate_draft(draft: &ConfigDraft, limit: u64) -> Result<(), ValidationError> {
    validate_content(&draft.content)?;
    validate_attachment(draft.attachment.as_ref(), limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LIMIT: u64 = 5_000_000;

    #[test]
    fn whitespace_counts_as_content() {
        assert!(validate_content(" ").is_ok());
        assert_eq!(validate_content(""), Err(ValidationError::EmptyContent));
    }

    #[test]
    fn file_at_the_limit_is_accepted() {
        let file = LocalFile::from_bytes("a.bin", vec![0; 16]);
        assert!(validate_attachment(Some(&file), 16).is_ok());
        assert!(validate_attachment(Some(&file), 15).is_err());
        assert!(validate_attachment(None, 0).is_ok());
    }

    #[test]
    fn empty_content_wins_over_oversize_file() {
        let draft = ConfigDraft::new("a", "").with_attachment(LocalFile::from_bytes(
            "a.bin",
            vec![0; 32],
        ));
        assert_eq!(validate_draft(&draft, 8), Err(ValidationError::EmptyContent));
    }

    proptest! {
        #[test]
        fn prop_draft_rejected_iff_content_empty(
            name in ".{0,16}",
            content in ".{0,32}",
        ) {
            let draft = ConfigDraft::new(name, content.clone());
            let result = validate_draft(&draft, LIMIT);
            prop_assert_eq!(result.is_err(), content.is_empty());
        }

        #[test]
        fn prop_oversize_file_always_rejected(size in 0usize..4096, limit in 0u64..4096) {
            let draft = ConfigDraft::new("n", "c")
                .with_attachment(LocalFile::from_bytes("f.bin", vec![0; size]));
            let result = validate_draft(&draft, limit);
            if size as u64 > limit {
                let is_size_error = matches!(result, Err(ValidationError::AttachmentTooLarge { .. }));
                prop_assert!(is_size_error);
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }
}
