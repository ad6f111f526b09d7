//! subtrans - Subtitle translation through Google Translate
//!
//! Translates subtitle files (or a subtitle track of a video) line by line while
//! keeping line boundaries and inline styling intact, optionally showing the
//! original and the translation together.

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod subtitle;
pub mod translate;
pub mod workflow;
