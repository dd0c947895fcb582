//! Output generation.
//!
//! - [`json`]: writes the [`SimpleData`](crate::models::SimpleData) document
//!
//! # Output Shape
//!
//! ```text
//! {
//!   "<range name>": {
//!     "<capsule name>": { "caffeine_mg": 65, "image_url": "https://..." }
//!   }
//! }
//! ```

pub mod json;
