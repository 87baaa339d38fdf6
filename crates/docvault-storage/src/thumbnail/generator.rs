//! Thumbnail generator for image documents.

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;

use docvault_core::error::{AppError, ErrorKind};
use docvault_core::result::AppResult;
use docvault_core::traits::storage::StorageProvider;

/// Generates JPEG thumbnails for image documents.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    /// Storage provider for reading source objects and writing thumbnails.
    provider: Arc<dyn StorageProvider>,
    /// Thumbnail output directory path.
    output_dir: String,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator.
    pub fn new(provider: Arc<dyn StorageProvider>, output_dir: &str) -> Self {
        Self {
            provider,
            output_dir: output_dir.to_string(),
        }
    }

    /// Check if a content type is a supported source for thumbnailing.
    pub fn is_supported(content_type: &str) -> bool {
        matches!(
            content_type,
            "image/jpeg" | "image/png" | "image/gif" | "image/webp" | "image/bmp"
        )
    }

    /// Generate a thumbnail of the specified size.
    ///
    /// Returns the storage path of the generated thumbnail.
    pub async fn generate(
        &self,
        source_location: &str,
        document_id: uuid::Uuid,
        size: u32,
    ) -> AppResult<String> {
        let source_bytes = self.provider.read_bytes(source_location).await?;

        let thumbnail_bytes =
            tokio::task::spawn_blocking(move || resize_image(&source_bytes, size))
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e)
                })??;

        let thumb_path = format!("{}/{}/{}x{}.jpg", self.output_dir, document_id, size, size);

        self.provider.write(&thumb_path, thumbnail_bytes).await?;

        tracing::debug!(
            source = source_location,
            size,
            output = %thumb_path,
            "Generated thumbnail"
        );

        Ok(thumb_path)
    }

    /// Generate thumbnails at multiple sizes.
    pub async fn generate_multiple(
        &self,
        source_location: &str,
        document_id: uuid::Uuid,
        sizes: &[u32],
    ) -> AppResult<Vec<String>> {
        let mut paths = Vec::new();
        for &size in sizes {
            let path = self.generate(source_location, document_id, size).await?;
            paths.push(path);
        }
        Ok(paths)
    }

    /// Delete all thumbnails for a document. Best effort per size.
    pub async fn delete_thumbnails(
        &self,
        document_id: uuid::Uuid,
        sizes: &[u32],
    ) -> AppResult<()> {
        for &size in sizes {
            let path = format!("{}/{}/{}x{}.jpg", self.output_dir, document_id, size, size);
            self.provider.delete(&path).await?;
        }
        Ok(())
    }
}

/// Decode an image and resize it to fit within `max_size`, re-encoding as
/// JPEG.
fn resize_image(data: &[u8], max_size: u32) -> AppResult<Bytes> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::with_source(ErrorKind::Validation, "Unreadable image data", e))?;

    let thumb = image::DynamicImage::ImageRgb8(img.thumbnail(max_size, max_size).to_rgb8());

    let mut out = Cursor::new(Vec::new());
    thumb
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to encode thumbnail", e)
        })?;

    Ok(Bytes::from(out.into_inner()))
}
