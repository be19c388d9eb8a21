pub mod gallery;
pub mod sessions;
pub mod stats;
