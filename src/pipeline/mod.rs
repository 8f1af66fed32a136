//! Pipeline stages for image-directory-to-PDF conversion.
//!
//! Each submodule implements one step. The orchestration (prompts, ordering,
//! guaranteed cleanup) lives in [`crate::convert`].
//!
//! ## Data Flow
//!
//! ```text
//! discover ──▶ scratch ──▶ stage ──▶ assemble
//! (.png/.jpg)  (temp dir)  (tone+JPEG) (PDF bytes)
//! ```
//!
//! 1. [`discover`] — list the input directory and keep `.png` / `.jpg` files
//! 2. [`scratch`]  — own the scratch directory; removed on close or drop
//! 3. [`stage`]    — decode, adjust brightness/contrast, re-encode as JPEG
//! 4. [`assemble`] — embed the staged JPEGs as PDF pages

pub mod assemble;
pub mod discover;
pub mod scratch;
pub mod stage;
