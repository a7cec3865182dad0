pub mod encode;
pub mod store;
pub mod scene;
pub mod audio;

pub mod app;
