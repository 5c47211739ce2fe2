pub mod collection;
pub mod describe;
pub mod editor;
pub mod feature;
pub mod history;
pub mod mutation;
pub mod store;
pub mod time_window;
pub mod track_filter;
pub mod viewport;

pub use collection::*;
pub use editor::*;
pub use feature::*;
pub use history::*;
pub use mutation::*;
pub use store::*;
pub use time_window::*;
pub use track_filter::*;
pub use viewport::*;
