// SPDX-License-Identifier: GPL-3.0-only

//! Woodglass - live Wood's-glass camera filter
//!
//! This library provides the core functionality for the Woodglass application:
//! a per-pixel ultraviolet-lamp color transform applied to a live camera feed,
//! watermarked still capture, capped clip recording, and artifact export.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Application model routing host input to the pipelines
//! - [`backends`]: Camera source abstraction and the frame loop
//! - [`pipelines`]: Color transform, photo capture and video recording
//! - [`export`]: Share, download and app-level share fallback
//! - [`config`]: User configuration handling
//! - [`storage`]: Output directories and file naming
//! - [`terminal`]: Terminal live preview host
//!
//! # Example
//!
//! ```ignore
//! // Live preview in the terminal:
//! // woodglass preview
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod export;
pub mod pipelines;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use backends::camera::Facing;
pub use config::Config;
pub use constants::BitratePreset;
