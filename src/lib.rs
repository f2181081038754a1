pub mod analysis;
pub mod app;
pub mod clock;
pub mod config;
pub mod journal;
pub mod profile;
pub mod state;
pub mod storage;
pub mod summary;
pub mod validation;
