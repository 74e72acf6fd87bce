pub mod review;

pub use review::{ReviewMode, UploadResponse};
