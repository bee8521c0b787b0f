/// Offline image optimization
///
/// Source photographs come off the camera far too heavy to serve. This
/// module turns a directory of originals into the resolution ladder the
/// gallery's srcset expects, plus a tiny base64 placeholder per image, and
/// assembles the matching `ImageRecord`s so the output can drop straight
/// into the catalog.

use crate::gallery::catalog::{ImageRecord, ImageVariant, SizeHint};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

/// One rung of the output ladder.
#[derive(Debug, Clone, Copy)]
pub struct VariantSpec {
    pub width: u32,
    pub quality: u8,
    pub suffix: &'static str,
}

/// Grid preview, mobile lightbox, desktop lightbox, high-res displays.
pub const VARIANT_LADDER: [VariantSpec; 4] = [
    VariantSpec {
        width: 400,
        quality: 75,
        suffix: "_thumb",
    },
    VariantSpec {
        width: 800,
        quality: 75,
        suffix: "_medium",
    },
    VariantSpec {
        width: 1600,
        quality: 75,
        suffix: "_large",
    },
    VariantSpec {
        width: 2000,
        quality: 75,
        suffix: "",
    },
];

/// Width of the low-quality placeholder before it is inlined.
const PLACEHOLDER_SIZE: u32 = 16;
const PLACEHOLDER_QUALITY: u8 = 35;

const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether this looks like a source photograph we can process.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Scale down to `width`, never enlarging. Sources narrower than the target
/// pass through at native size.
fn resize_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
    if img.width() <= width {
        return img.clone();
    }
    let height = ((img.height() as u64 * width as u64) / img.width() as u64).max(1) as u32;
    img.resize(width, height, FilterType::Lanczos3)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, OptimizeError> {
    let mut buf = Vec::new();
    let mut cursor = Cursor::new(&mut buf);
    let encoder = JpegEncoder::new_with_quality(&mut cursor, quality);
    img.to_rgb8().write_with_encoder(encoder)?;
    Ok(buf)
}

/// Render the inline placeholder: a few-pixel resize at low JPEG quality,
/// wrapped in a data URI. The renderer blurs it up to full size.
pub fn generate_placeholder(img: &DynamicImage) -> Result<String, OptimizeError> {
    let tiny = img.resize(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, FilterType::Triangle);
    let jpeg = encode_jpeg(&tiny, PLACEHOLDER_QUALITY)?;
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg)))
}

/// Default breakpoint hints matching the variant ladder.
fn default_size_hints() -> Vec<SizeHint> {
    vec![
        SizeHint {
            max_viewport_width: Some(640),
            display_width: 400,
        },
        SizeHint {
            max_viewport_width: Some(1024),
            display_width: 800,
        },
        SizeHint {
            max_viewport_width: None,
            display_width: 1600,
        },
    ]
}

/// Process one source photograph: write every ladder rung into
/// `output_dir`, inline a placeholder, and return the assembled record.
/// `url_prefix` is the public path under which `output_dir` will be served.
pub fn optimize_file(
    input: &Path,
    output_dir: &Path,
    url_prefix: &str,
    category: &str,
) -> Result<ImageRecord, OptimizeError> {
    let img = image::open(input)?;
    std::fs::create_dir_all(output_dir)?;

    let stem = input
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_lowercase();

    let mut srcset: Vec<ImageVariant> = Vec::new();
    let mut primary_url = String::new();

    for spec in &VARIANT_LADDER {
        let resized = resize_to_width(&img, spec.width);
        let filename = format!("{}{}.jpg", stem, spec.suffix);
        let jpeg = encode_jpeg(&resized, spec.quality)?;
        std::fs::write(output_dir.join(&filename), &jpeg)?;

        let url = format!("{}/{}", url_prefix.trim_end_matches('/'), filename);
        if spec.suffix.is_empty() {
            primary_url = url.clone();
        }
        // A narrow source collapses several rungs to the same width; keep
        // the srcset strictly increasing
        if srcset.last().map_or(true, |last| resized.width() > last.width) {
            srcset.push(ImageVariant {
                url,
                width: resized.width(),
            });
        }
    }

    Ok(ImageRecord {
        id: stem,
        src: primary_url,
        srcset,
        sizes: default_size_hints(),
        placeholder: Some(generate_placeholder(&img)?),
        alt: String::new(),
        width: img.width(),
        height: img.height(),
        category: category.to_string(),
        priority: false,
    })
}

/// Process every supported photograph directly inside `input_dir`.
/// Per-file failures are logged and skipped; the run continues.
pub fn optimize_directory(
    input_dir: &Path,
    output_dir: &Path,
    url_prefix: &str,
    category: &str,
) -> Result<Vec<ImageRecord>, OptimizeError> {
    let mut sources: Vec<PathBuf> = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_supported(p))
        .collect();
    sources.sort();

    let mut records = Vec::new();
    for source in sources {
        match optimize_file(&source, output_dir, url_prefix, category) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Skipping image");
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::catalog::Catalog;
    use image::{ImageBuffer, Rgb};

    fn test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb([180, 170, 160])))
    }

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "nest-portfolio-optimize-{}-{}",
            label,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_resize_never_enlarges() {
        let img = test_image(64, 40);
        let resized = resize_to_width(&img, 400);
        assert_eq!((resized.width(), resized.height()), (64, 40));
    }

    #[test]
    fn test_resize_preserves_aspect() {
        let img = test_image(2000, 1000);
        let resized = resize_to_width(&img, 400);
        assert_eq!(resized.width(), 400);
        assert_eq!(resized.height(), 200);
    }

    #[test]
    fn test_placeholder_is_a_data_uri() {
        let placeholder = generate_placeholder(&test_image(640, 400)).unwrap();
        assert!(placeholder.starts_with("data:image/jpeg;base64,"));
        // Tiny: inlining it must stay cheap
        assert!(placeholder.len() < 4096);
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("photo.JPG")));
        assert!(is_supported(Path::new("photo.webp")));
        assert!(!is_supported(Path::new("photo.nef")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("no-extension")));
    }

    #[test]
    fn test_optimize_file_emits_valid_record() {
        let dir = temp_dir("file");
        let source = dir.join("BLVD9185.png");
        test_image(1200, 800).save(&source).unwrap();

        let out = dir.join("optimized");
        let record = optimize_file(&source, &out, "/images/wedding/optimized", "wedding").unwrap();

        assert_eq!(record.id, "blvd9185");
        assert_eq!(record.src, "/images/wedding/optimized/blvd9185.jpg");
        assert_eq!((record.width, record.height), (1200, 800));
        // 1200px source: 400 and 800 resize, 1600 and 2000 collapse to 1200
        let widths: Vec<u32> = record.srcset.iter().map(|v| v.width).collect();
        assert_eq!(widths, vec![400, 800, 1200]);
        assert!(record.placeholder.is_some());
        assert!(out.join("blvd9185_thumb.jpg").exists());
        assert!(out.join("blvd9185.jpg").exists());

        // The emitted record must satisfy the catalog invariants
        Catalog::new(vec![record]).unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_narrow_source_collapses_ladder() {
        let dir = temp_dir("narrow");
        let source = dir.join("tiny.png");
        test_image(64, 40).save(&source).unwrap();

        let record = optimize_file(&source, &dir.join("optimized"), "opt", "wedding").unwrap();
        let widths: Vec<u32> = record.srcset.iter().map(|v| v.width).collect();
        assert_eq!(widths, vec![64]);
        Catalog::new(vec![record]).unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_directory_run_skips_unsupported_files() {
        let dir = temp_dir("dir");
        test_image(800, 600).save(dir.join("b.png")).unwrap();
        test_image(800, 600).save(dir.join("a.png")).unwrap();
        std::fs::write(dir.join("notes.txt"), "not an image").unwrap();

        let records =
            optimize_directory(&dir, &dir.join("optimized"), "opt", "portrait").unwrap();
        assert_eq!(records.len(), 2);
        // Deterministic order
        assert_eq!(records[0].id, "a");
        assert_eq!(records[1].id, "b");

        let _ = std::fs::remove_dir_all(dir);
    }
}
