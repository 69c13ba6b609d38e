//! Asset preparation – resolves the record's image bytes into assets the
//! renderer can embed, before any layout happens.
//!
//! Bytes that cannot be probed are logged and treated exactly like a
//! missing image; layout never learns the difference.

use crate::error::{DocumentError, Result};
use crate::plan::ImageSlot;
use crate::record::CustomerRecord;

/// Image bytes plus their intrinsic pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    pub bytes: Vec<u8>,
    pub px_width: u32,
    pub px_height: u32,
}

impl ImageAsset {
    /// Probe PNG/JPEG bytes with the `image` crate.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let decoded = ::image::load_from_memory(&bytes)
            .map_err(|e| DocumentError::Image(format!("decode error: {e}")))?;
        let (px_width, px_height) = (decoded.width(), decoded.height());
        if px_width == 0 || px_height == 0 {
            return Err(DocumentError::Image("image has no pixels".to_string()));
        }
        Ok(Self {
            bytes,
            px_width,
            px_height,
        })
    }
}

/// Prepared images of one record, keyed by slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentAssets {
    pub identity_document: Option<ImageAsset>,
    pub secondary_document: Option<ImageAsset>,
}

impl DocumentAssets {
    pub fn prepare(record: &CustomerRecord) -> Self {
        Self {
            identity_document: prepare_slot(
                ImageSlot::IdentityDocument,
                record.identity_document.as_deref(),
            ),
            secondary_document: prepare_slot(
                ImageSlot::SecondaryDocument,
                record.secondary_document.as_deref(),
            ),
        }
    }

    pub fn get(&self, slot: ImageSlot) -> Option<&ImageAsset> {
        match slot {
            ImageSlot::IdentityDocument => self.identity_document.as_ref(),
            ImageSlot::SecondaryDocument => self.secondary_document.as_ref(),
        }
    }

    pub fn has(&self, slot: ImageSlot) -> bool {
        self.get(slot).is_some()
    }
}

fn prepare_slot(slot: ImageSlot, bytes: Option<&[u8]>) -> Option<ImageAsset> {
    let bytes = bytes.filter(|b| !b.is_empty())?;
    match ImageAsset::from_bytes(bytes.to_vec()) {
        Ok(asset) => Some(asset),
        Err(e) => {
            log::warn!("Treating {slot:?} as absent: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = ::image::RgbImage::from_pixel(width, height, ::image::Rgb([200, 40, 40]));
        let mut buf = Vec::new();
        ::image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), ::image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn probes_pixel_size() {
        let asset = ImageAsset::from_bytes(png(107, 67)).unwrap();
        assert_eq!((asset.px_width, asset.px_height), (107, 67));
    }

    #[test]
    fn garbage_is_an_image_error() {
        assert!(matches!(
            ImageAsset::from_bytes(b"GIF89a?".to_vec()),
            Err(DocumentError::Image(_))
        ));
    }

    #[test]
    fn undecodable_bytes_become_absent() {
        let record = CustomerRecord {
            id: "C-1".into(),
            full_name: "Rina".into(),
            identity_document: Some(b"definitely not a png".to_vec()),
            secondary_document: Some(png(4, 3)),
            ..Default::default()
        };
        let assets = DocumentAssets::prepare(&record);
        assert!(!assets.has(ImageSlot::IdentityDocument));
        assert!(assets.has(ImageSlot::SecondaryDocument));
    }

    #[test]
    fn empty_bytes_are_absent() {
        let record = CustomerRecord {
            identity_document: Some(Vec::new()),
            ..Default::default()
        };
        assert_eq!(DocumentAssets::prepare(&record), DocumentAssets::default());
    }
}
