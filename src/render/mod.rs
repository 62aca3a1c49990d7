pub mod hover;
pub mod svg;

pub use hover::HoverInfo;
pub use svg::{ComparisonMapRenderer, MapRenderConfig};
