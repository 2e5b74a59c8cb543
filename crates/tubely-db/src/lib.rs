//! Record store for video metadata.
//!
//! The store is an explicit value handed to whoever needs it, created once at
//! process start. [`VideoRepository`] is the seam; [`InMemoryVideoRepository`] is
//! the implementation shipped with the service and used by tests.

pub mod memory;
pub mod video;

pub use memory::InMemoryVideoRepository;
pub use video::VideoRepository;
