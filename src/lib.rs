//! Image compression service for uploaded story and character artwork
//!
//! Accepts base64 (data-URI) images over HTTP, resizes them with one of two
//! fixed presets and returns a JPEG data URI together with size metrics.

pub mod config;
pub mod data_uri;
pub mod error;
pub mod handler;
pub mod image;
pub mod models;
pub mod server;

pub use error::{Error, Result};
