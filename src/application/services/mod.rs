pub mod image_services;
pub mod load_controller;

pub use image_services::ImageServices;
pub use load_controller::{ImageLoadController, ImageSources, LoadCallback, LoadHandle};
