// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for the filtered feed
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │   Display    │ ──▶ │  Photo Pipeline   │ ──▶ │  PNG bytes   │
//! │   surface    │     │  - Watermark      │     │              │
//! │              │     │  - Encoding       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │   Display    │ ──▶ │  Video Pipeline   │ ──▶ │ Clip bytes   │
//! │   surface    │     │  - 24 fps sampler │     │ (MJPEG/GIF)  │
//! │              │     │  - 30 s cap       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! The color transform itself lives in [`filter`] and runs inside the frame
//! loop, so everything downstream of the display surface is already filtered.
//!
//! # Modules
//!
//! - [`filter`]: Per-pixel Wood's glass transform
//! - [`photo`]: Still capture with watermark and PNG encoding
//! - [`video`]: Time-boxed recording over an encoding stream

pub mod filter;
pub mod photo;
pub mod video;
