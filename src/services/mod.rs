//! Outbound HTTP clients for third-party services.

/// Image classification with model fallback
pub mod classifier;
/// Location autocomplete
pub mod geocoder;

pub use classifier::{GeminiClient, ImageInput, Verifier, VisionModel};
pub use geocoder::{Geocoder, Place};
