//! Dataset store — the external home of decoded datasets.
//!
//! The pipeline never decodes pixel data itself; registered format readers
//! hand back a [`DecodedDataset`] and the single-file import handler parks
//! it here in exchange for an opaque [`DataId`]. Deletions are published on
//! a typed broadcast stream so sibling subsystems (view configuration,
//! thumbnails, ...) can cascade-clean without polling the store.

use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Opaque handle to one dataset held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataId(Uuid);

impl DataId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for DataId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An opaque single-image payload produced by a format reader.
///
/// The core treats the decoded object as a black box; only the name travels
/// into store bookkeeping.
#[derive(Debug, Clone)]
pub struct ImageBlob {
    pub name: String,
    pub data: Bytes,
}

/// One DICOM series decoded from a source. A single source (typically an
/// archive) may decode into several series.
#[derive(Debug, Clone)]
pub struct DicomSeries {
    pub name: String,
    pub modality: Option<String>,
    pub slice_count: Option<u32>,
    pub data: Bytes,
}

/// An opaque surface-mesh payload. There is no model store yet; registering
/// one is an unsupported-kind failure at the import handler.
#[derive(Debug, Clone)]
pub struct MeshBlob {
    pub name: String,
    pub data: Bytes,
}

/// What a format reader decoded a byte source into.
#[derive(Debug, Clone)]
pub enum DecodedDataset {
    Image(ImageBlob),
    Dicom(Vec<DicomSeries>),
    Mesh(MeshBlob),
}

impl DecodedDataset {
    /// Short kind label for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedDataset::Image(_) => "image",
            DecodedDataset::Dicom(_) => "dicom",
            DecodedDataset::Mesh(_) => "mesh",
        }
    }
}

/// Selection-relevant metadata kept per registered DICOM series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DicomMeta {
    pub modality: Option<String>,
    pub slice_count: Option<u32>,
}

#[derive(Debug)]
enum StoredDataset {
    Image(ImageBlob),
    Dicom { series: DicomSeries, meta: DicomMeta },
}

#[derive(Debug, Default)]
struct StoreInner {
    datasets: HashMap<DataId, (String, StoredDataset)>,
    active: Option<DataId>,
}

/// Additive, id-keyed dataset storage shared by all pipeline branches.
///
/// Registration is the only write the import pipeline performs; concurrent
/// branches register independently and never read back mid-run.
pub struct DatasetStore {
    inner: Mutex<StoreInner>,
    deletions: broadcast::Sender<DataId>,
}

impl DatasetStore {
    pub fn new() -> Self {
        let (deletions, _) = broadcast::channel(64);
        Self {
            inner: Mutex::new(StoreInner::default()),
            deletions,
        }
    }

    /// Register a decoded image and return its handle.
    pub fn register_image(&self, image: ImageBlob) -> DataId {
        let id = DataId::new();
        let mut inner = self.inner.lock().expect("dataset store poisoned");
        debug!(%id, name = %image.name, "registering image dataset");
        inner
            .datasets
            .insert(id, (image.name.clone(), StoredDataset::Image(image)));
        id
    }

    /// Register one decoded DICOM series and return its handle.
    pub fn register_dicom(&self, series: DicomSeries) -> DataId {
        let id = DataId::new();
        let meta = DicomMeta {
            modality: series.modality.clone(),
            slice_count: series.slice_count,
        };
        let mut inner = self.inner.lock().expect("dataset store poisoned");
        debug!(%id, name = %series.name, modality = ?meta.modality, "registering dicom series");
        inner
            .datasets
            .insert(id, (series.name.clone(), StoredDataset::Dicom { series, meta }));
        id
    }

    /// Display name of a registered dataset.
    pub fn name_of(&self, id: DataId) -> Option<String> {
        let inner = self.inner.lock().expect("dataset store poisoned");
        inner.datasets.get(&id).map(|(name, _)| name.clone())
    }

    /// Selection metadata for a registered DICOM series, if `id` is one.
    pub fn dicom_meta(&self, id: DataId) -> Option<DicomMeta> {
        let inner = self.inner.lock().expect("dataset store poisoned");
        match inner.datasets.get(&id) {
            Some((_, StoredDataset::Dicom { meta, .. })) => Some(meta.clone()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("dataset store poisoned").datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a dataset and notify deletion subscribers. Returns whether the
    /// id was present.
    pub fn remove(&self, id: DataId) -> bool {
        let removed = {
            let mut inner = self.inner.lock().expect("dataset store poisoned");
            if inner.active == Some(id) {
                inner.active = None;
            }
            inner.datasets.remove(&id).is_some()
        };
        if removed {
            debug!(%id, "dataset removed");
            // No receivers is fine; nobody has subscribed yet.
            let _ = self.deletions.send(id);
        }
        removed
    }

    /// Subscribe to dataset deletions.
    pub fn subscribe_deletions(&self) -> broadcast::Receiver<DataId> {
        self.deletions.subscribe()
    }

    /// Mark a dataset as the active (initially displayed) selection.
    pub fn set_active(&self, id: DataId) {
        let mut inner = self.inner.lock().expect("dataset store poisoned");
        if inner.datasets.contains_key(&id) {
            inner.active = Some(id);
        }
    }

    pub fn active(&self) -> Option<DataId> {
        self.inner.lock().expect("dataset store poisoned").active
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> ImageBlob {
        ImageBlob {
            name: name.to_string(),
            data: Bytes::from_static(b"px"),
        }
    }

    fn series(name: &str, modality: &str, slices: u32) -> DicomSeries {
        DicomSeries {
            name: name.to_string(),
            modality: Some(modality.to_string()),
            slice_count: Some(slices),
            data: Bytes::from_static(b"dcm"),
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let store = DatasetStore::new();
        let id = store.register_image(image("brain.nii"));
        assert_eq!(store.name_of(id).as_deref(), Some("brain.nii"));
        assert_eq!(store.len(), 1);
        assert!(store.dicom_meta(id).is_none());
    }

    #[test]
    fn test_dicom_meta_survives_registration() {
        let store = DatasetStore::new();
        let id = store.register_dicom(series("chest", "CT", 42));
        let meta = store.dicom_meta(id).unwrap();
        assert_eq!(meta.modality.as_deref(), Some("CT"));
        assert_eq!(meta.slice_count, Some(42));
    }

    #[test]
    fn test_active_requires_registered_id() {
        let store = DatasetStore::new();
        let id = store.register_image(image("a.png"));
        store.set_active(id);
        assert_eq!(store.active(), Some(id));

        store.remove(id);
        assert_eq!(store.active(), None);
    }

    #[tokio::test]
    async fn test_deletion_is_broadcast() {
        let store = DatasetStore::new();
        let id = store.register_image(image("a.png"));
        let mut rx = store.subscribe_deletions();

        assert!(store.remove(id));
        assert_eq!(rx.recv().await.unwrap(), id);

        // Removing again is a no-op and publishes nothing.
        assert!(!store.remove(id));
        assert!(rx.try_recv().is_err());
    }
}
