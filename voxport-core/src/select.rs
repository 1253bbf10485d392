//! Primary-dataset selection — picks which successfully loaded dataset
//! becomes the initial active selection.
//!
//! DICOM series win over plain images, ranked by a modality priority table
//! with slice count as the tie-break; among images, segmentation-named
//! files are passed over. The heuristic only inspects loadable results
//! (image and dicom kinds).

use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::result::{DataType, ImportResult, PipelineOk};
use crate::store::DatasetStore;

/// The fixed modality ranking: cross-sectional volumes first, ultrasound
/// next, plain radiographs last. Unlisted modalities are never candidates.
pub fn default_modality_priorities() -> HashMap<String, u8> {
    HashMap::from([
        ("CT".to_string(), 3),
        ("MR".to_string(), 3),
        ("US".to_string(), 2),
        ("DX".to_string(), 1),
    ])
}

/// Flatten succeeded branch results into their loadable (image/dicom)
/// import results, preserving original order.
pub fn loadable_results(succeeded: &[PipelineOk]) -> Vec<&ImportResult> {
    succeeded
        .iter()
        .flat_map(|ok| ok.results.iter())
        .filter(|r| r.is_loadable())
        .collect()
}

/// Whether a display name follows the segmentation naming convention: the
/// non-leading dot-separated extension run contains the configured token.
/// An empty token disqualifies nothing.
pub fn is_segmentation_name(name: &str, segment_group_extension: &str) -> bool {
    if segment_group_extension.is_empty() {
        return false;
    }
    name.split('.')
        .skip(1)
        .any(|seg| seg.eq_ignore_ascii_case(segment_group_extension))
}

/// Choose the primary dataset among the loadable results.
///
/// 1. Highest-priority DICOM modality, ties broken by descending slice
///    count; a series without slice-count metadata sorts after one with it,
///    and a tie with both missing keeps original encounter order.
/// 2. Otherwise the first image whose name is not a segmentation.
/// 3. Otherwise the first loadable result, or `None` when there is none.
pub fn find_base_dataset<'a>(
    loadable: &[&'a ImportResult],
    store: &DatasetStore,
    priorities: &HashMap<String, u8>,
    segment_group_extension: &str,
) -> Option<&'a ImportResult> {
    let mut dicom: Vec<(&'a ImportResult, u8, Option<u32>)> = loadable
        .iter()
        .filter(|r| r.data_type == DataType::Dicom)
        .filter_map(|r| {
            let meta = store.dicom_meta(r.data_id)?;
            let modality = meta.modality?.to_ascii_uppercase();
            let priority = *priorities.get(&modality)?;
            Some((*r, priority, meta.slice_count))
        })
        .collect();

    // Stable sort keeps encounter order for full ties.
    dicom.sort_by(|a, b| {
        b.1.cmp(&a.1).then_with(|| match (a.2, b.2) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
    });
    if let Some(&(winner, priority, slices)) = dicom.first() {
        debug!(
            name = winner.data_source.display_name(),
            priority,
            slices = ?slices,
            "primary selection: dicom candidate"
        );
        return Some(winner);
    }

    if let Some(image) = loadable.iter().copied().find(|r| {
        r.data_type == DataType::Image
            && !is_segmentation_name(r.data_source.display_name(), segment_group_extension)
    }) {
        debug!(
            name = image.data_source.display_name(),
            "primary selection: image fallback"
        );
        return Some(image);
    }

    loadable.first().copied()
}
