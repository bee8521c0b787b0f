//! Offline image optimization tool.
//!
//! Usage: `optimize-images <dir> [<dir>...]`
//!
//! Each directory is processed in place: variants land in an `optimized/`
//! subdirectory and a `catalog.json` fragment is written next to them. The
//! directory name doubles as the gallery category.

use nest_portfolio::gallery::catalog::Catalog;
use nest_portfolio::optimize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let dirs: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if dirs.is_empty() {
        eprintln!("Usage: optimize-images <dir> [<dir>...]");
        std::process::exit(2);
    }

    println!("🖼️  Portfolio Image Optimization Tool");
    println!("=====================================");

    let mut failed = false;
    for dir in dirs {
        if !dir.is_dir() {
            println!("⏭️  Skipping {} (directory not found)", dir.display());
            continue;
        }

        let category = dir
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let output = dir.join("optimized");
        let url_prefix = format!("/images/{}/optimized", category);

        println!("📁 Processing: {}", dir.display());
        match optimize::optimize_directory(&dir, &output, &url_prefix, &category) {
            Ok(records) => {
                let count = records.len();
                match Catalog::new(records) {
                    Ok(catalog) => {
                        let fragment = dir.join("catalog.json");
                        match serde_json::to_string_pretty(&catalog)
                            .map_err(std::io::Error::other)
                            .and_then(|json| std::fs::write(&fragment, json))
                        {
                            Ok(()) => println!(
                                "✅ {} images → {} (fragment: {})",
                                count,
                                output.display(),
                                fragment.display()
                            ),
                            Err(e) => {
                                eprintln!("❌ Could not write catalog fragment: {}", e);
                                failed = true;
                            }
                        }
                    }
                    Err(e) => {
                        eprintln!("❌ Generated records failed validation: {}", e);
                        failed = true;
                    }
                }
            }
            Err(e) => {
                eprintln!("❌ Error processing {}: {}", dir.display(), e);
                failed = true;
            }
        }
    }

    println!("✨ Image optimization complete!");
    println!("📊 Generated sizes:");
    println!("• Thumbnails (400px) - for grid previews");
    println!("• Medium (800px) - for mobile lightbox");
    println!("• Large (1600px) - for desktop lightbox");
    println!("• Original (2000px) - for high-res displays");

    if failed {
        std::process::exit(1);
    }
}
