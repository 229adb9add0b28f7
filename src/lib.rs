pub mod catalog;
pub mod compositor;
pub mod config;
pub mod error;
pub mod events;
pub mod gpu;
pub mod pagination;
pub mod slider;
pub mod text;
pub mod timeline;
pub mod transition;
pub mod tasks {
    pub mod slider;
    pub mod viewer;
}

pub use error::Error;
