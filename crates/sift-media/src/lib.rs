pub mod hints;
pub mod normalize;
pub mod quality;

pub use hints::{dimensions_from_attributes, dimensions_from_url};
pub use normalize::{normalize_media_url, UrlRejection, UrlRules};
pub use quality::{CatalogEntry, QualityClassifier};
