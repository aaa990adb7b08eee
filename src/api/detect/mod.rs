// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection API endpoint module
//!
//! Provides POST /detect for label text or label photos.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::detect_handler;
pub use request::{DetectInput, DetectRequest};
pub use response::DetectResponse;
