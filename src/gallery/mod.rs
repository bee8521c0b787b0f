// Progressive gallery engine: catalog model, per-image lazy loading,
// incremental reveal. Pure state machines; the host performs the I/O.

pub mod catalog;
pub mod feed;
pub mod loader;
pub mod viewport;

pub use catalog::{Catalog, CatalogError, ImageRecord, ImageVariant, SizeHint};
pub use feed::{FeedAction, FeedConfig, FeedEvent, GalleryFeed};
pub use loader::{ImageLoader, LoadState, LoaderAction, LoaderConfig, LoaderEvent, Visual};
pub use viewport::Rect;
