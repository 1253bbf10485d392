//! Opaque pass-through readers for the CLI.
//!
//! The CLI performs dry-run imports: bytes are wrapped as-is so the
//! pipeline, stores and primary selection can be exercised without any
//! pixel decoding. Real deployments register actual decoder collaborators.

use async_trait::async_trait;
use voxport_core::{
    DecodedDataset, DicomSeries, FileSource, FileType, FormatReader, ImageBlob, ReaderRegistry,
};

/// Wraps bytes as an opaque single-image dataset.
struct PassthroughImage {
    token: &'static str,
}

#[async_trait]
impl FormatReader for PassthroughImage {
    fn file_type(&self) -> FileType {
        FileType::new(self.token)
    }

    async fn read(&self, file: &FileSource) -> anyhow::Result<DecodedDataset> {
        if file.bytes.is_empty() {
            anyhow::bail!("empty file");
        }
        Ok(DecodedDataset::Image(ImageBlob {
            name: file.name.clone(),
            data: file.bytes.clone(),
        }))
    }
}

/// Wraps bytes as one DICOM series with unknown modality metadata.
struct PassthroughDicom;

#[async_trait]
impl FormatReader for PassthroughDicom {
    fn file_type(&self) -> FileType {
        FileType::new("dcm")
    }

    async fn read(&self, file: &FileSource) -> anyhow::Result<DecodedDataset> {
        if file.bytes.is_empty() {
            anyhow::bail!("empty file");
        }
        Ok(DecodedDataset::Dicom(vec![DicomSeries {
            name: file.name.clone(),
            modality: None,
            slice_count: None,
            data: file.bytes.clone(),
        }]))
    }
}

const IMAGE_TOKENS: &[&str] = &["nii", "nii.gz", "nrrd", "mha", "vti", "png", "jpg", "jpeg"];

/// Registry with pass-through readers for common imaging extensions.
pub fn passthrough_registry() -> ReaderRegistry {
    let mut registry = ReaderRegistry::new();
    for &token in IMAGE_TOKENS {
        registry
            .register(std::sync::Arc::new(PassthroughImage { token }))
            .expect("image tokens are unique");
    }
    registry
        .register(std::sync::Arc::new(PassthroughDicom))
        .expect("dcm token is unique");
    registry
}
