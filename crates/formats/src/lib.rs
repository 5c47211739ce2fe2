pub mod clipboard;
pub mod geojson;

pub use clipboard::*;
pub use geojson::*;
