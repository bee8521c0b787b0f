/// Image catalog data model
///
/// The gallery consumes a catalog of image descriptors supplied as JSON
/// configuration (written by hand or emitted by the `optimize-images` tool).
/// Records are immutable once loaded; the engine never mutates them.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// One alternate-resolution locator for an image.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageVariant {
    /// Where to fetch this rendition
    pub url: String,
    /// Intrinsic width of this rendition in pixels
    pub width: u32,
}

/// One layout-breakpoint hint: "below this viewport width, the image is
/// displayed at `display_width` pixels". A hint without `max_viewport_width`
/// is the unconditional default and should come last.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SizeHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_viewport_width: Option<u32>,
    pub display_width: u32,
}

/// A single displayable photograph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub id: String,
    /// Primary source locator, always present
    pub src: String,
    /// Alternate-resolution locators, widths strictly increasing
    #[serde(default)]
    pub srcset: Vec<ImageVariant>,
    #[serde(default)]
    pub sizes: Vec<SizeHint>,
    /// Tiny inline placeholder payload (base64 data URI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Accessible text description
    pub alt: String,
    /// Intrinsic dimensions
    pub width: u32,
    pub height: u32,
    /// Gallery section this image belongs to (wedding, portrait, ...)
    #[serde(default)]
    pub category: String,
    /// High-priority images load immediately, bypassing visibility checks
    #[serde(default)]
    pub priority: bool,
}

impl ImageRecord {
    /// Render the srcset attribute value: "url 400w, url 800w, ..."
    pub fn srcset_attr(&self) -> String {
        self.srcset
            .iter()
            .map(|v| format!("{} {}w", v.url, v.width))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render the sizes attribute value:
    /// "(max-width: 640px) 400px, (max-width: 1024px) 800px, 1600px"
    pub fn sizes_attr(&self) -> String {
        self.sizes
            .iter()
            .map(|s| match s.max_viewport_width {
                Some(bp) => format!("(max-width: {}px) {}px", bp, s.display_width),
                None => format!("{}px", s.display_width),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Check the record invariants.
    fn validate(&self) -> Result<(), CatalogError> {
        if self.src.trim().is_empty() {
            return Err(CatalogError::MissingSource {
                id: self.id.clone(),
            });
        }
        if self.width == 0 || self.height == 0 {
            return Err(CatalogError::ZeroDimension {
                id: self.id.clone(),
            });
        }
        // Alternate locators, when present, must be strictly increasing in width
        for pair in self.srcset.windows(2) {
            if pair[1].width <= pair[0].width {
                return Err(CatalogError::UnorderedVariants {
                    id: self.id.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Errors produced while loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("image '{id}' has no primary source locator")]
    MissingSource { id: String },
    #[error("image '{id}' has a zero intrinsic dimension")]
    ZeroDimension { id: String },
    #[error("image '{id}' has srcset widths that are not strictly increasing")]
    UnorderedVariants { id: String },
}

/// The full ordered backing set of images for the site.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Catalog {
    pub images: Vec<ImageRecord>,
}

impl Catalog {
    /// Build a catalog from records, checking every record's invariants.
    pub fn new(images: Vec<ImageRecord>) -> Result<Self, CatalogError> {
        for record in &images {
            record.validate()?;
        }
        Ok(Catalog { images })
    }

    /// Load and validate a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parse and validate a catalog from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        for record in &catalog.images {
            record.validate()?;
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// All records in a category, original order preserved.
    pub fn category(&self, name: &str) -> Vec<&ImageRecord> {
        self.images
            .iter()
            .filter(|r| r.category == name)
            .collect()
    }
}
