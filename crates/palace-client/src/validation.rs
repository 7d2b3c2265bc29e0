use thiserror::Error;

use crate::config::ClientConfig;

/// Client-side rejections. Nothing that fails here reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("write something before saving a memory")]
    EmptyContent,
    #[error("type a question or keyword to search")]
    EmptyQuery,
    #[error("pillar name cannot be blank")]
    EmptyPillarName,
    #[error("'{0}' is already in this step")]
    DuplicatePillar(String),
    #[error("'{file_name}' is not an image")]
    NotAnImage { file_name: String },
    #[error("'{file_name}' is {size} bytes; the limit is {max} bytes")]
    PhotoTooLarge {
        file_name: String,
        size: u64,
        max: u64,
    },
    #[error("at most {max} photos can be attached")]
    TooManyPhotos { max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDraft {
    pub content: String,
    pub photos: Vec<PhotoAttachment>,
}

impl MemoryDraft {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            photos: Vec::new(),
        }
    }

    pub fn with_photo(mut self, photo: PhotoAttachment) -> Self {
        self.photos.push(photo);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoLimits {
    pub max_photo_bytes: u64,
    pub max_photos: usize,
}

impl From<&ClientConfig> for PhotoLimits {
    fn from(config: &ClientConfig) -> Self {
        Self {
            max_photo_bytes: config.max_photo_bytes,
            max_photos: config.max_photos,
        }
    }
}

pub fn validate_draft(draft: &MemoryDraft, limits: PhotoLimits) -> Result<(), ValidationError> {
    if draft.content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }

    if draft.photos.len() > limits.max_photos {
        return Err(ValidationError::TooManyPhotos {
            max: limits.max_photos,
        });
    }

    for photo in &draft.photos {
        validate_photo(photo, limits.max_photo_bytes)?;
    }

    Ok(())
}

fn validate_photo(photo: &PhotoAttachment, max_bytes: u64) -> Result<(), ValidationError> {
    let content_type = photo.content_type.trim().to_ascii_lowercase();
    if !content_type.starts_with("image/") || content_type.len() == "image/".len() {
        return Err(ValidationError::NotAnImage {
            file_name: photo.file_name.clone(),
        });
    }

    let size = photo.bytes.len() as u64;
    if size > max_bytes {
        return Err(ValidationError::PhotoTooLarge {
            file_name: photo.file_name.clone(),
            size,
            max: max_bytes,
        });
    }

    Ok(())
}

pub fn normalize_query(query: &str) -> Result<String, ValidationError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        MemoryDraft, PhotoAttachment, PhotoLimits, ValidationError, normalize_query,
        validate_draft,
    };

    const LIMITS: PhotoLimits = PhotoLimits {
        max_photo_bytes: 16,
        max_photos: 2,
    };

    fn photo(name: &str, content_type: &str, size: usize) -> PhotoAttachment {
        PhotoAttachment {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0_u8; size],
        }
    }

    #[test]
    fn blank_content_is_rejected() {
        let err = validate_draft(&MemoryDraft::text("   \n"), LIMITS)
            .expect_err("blank draft should be rejected");
        assert_eq!(err, ValidationError::EmptyContent);
    }

    #[test]
    fn non_image_and_oversized_photos_are_rejected() {
        let not_image = MemoryDraft::text("beach day").with_photo(photo("notes.pdf", "application/pdf", 4));
        assert!(matches!(
            validate_draft(&not_image, LIMITS),
            Err(ValidationError::NotAnImage { .. })
        ));

        let oversized = MemoryDraft::text("beach day").with_photo(photo("big.jpg", "image/jpeg", 17));
        assert!(matches!(
            validate_draft(&oversized, LIMITS),
            Err(ValidationError::PhotoTooLarge { size: 17, max: 16, .. })
        ));
    }

    #[test]
    fn photo_count_is_capped() {
        let draft = MemoryDraft::text("album")
            .with_photo(photo("a.png", "image/png", 1))
            .with_photo(photo("b.png", "image/png", 1))
            .with_photo(photo("c.png", "image/png", 1));
        assert_eq!(
            validate_draft(&draft, LIMITS),
            Err(ValidationError::TooManyPhotos { max: 2 })
        );
    }

    #[test]
    fn valid_draft_with_photo_passes() {
        let draft = MemoryDraft::text("sunset").with_photo(photo("s.jpg", "IMAGE/JPEG", 16));
        assert_eq!(validate_draft(&draft, LIMITS), Ok(()));
    }

    #[test]
    fn query_is_trimmed_and_must_not_be_blank() {
        assert_eq!(normalize_query("  when is mom's birthday "), Ok("when is mom's birthday".to_string()));
        assert_eq!(normalize_query("  "), Err(ValidationError::EmptyQuery));
    }
}
