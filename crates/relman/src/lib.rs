//! Relman: decoder for binary release manifests.
//!
//! A release manifest is an index of the directories and files in a release, stored as flat
//! tables that refer to each other by index. This crate reads the tables, resolves them into a
//! tree of [`Directory`] and [`File`], works out which directories are the roots, and renders the
//! result as text.
//!
//! ```no_run
//! use std::path::Path;
//! use relman::{decode_file, DecodeOptions, RenderOptions};
//!
//! let manifest = decode_file(Path::new("releasemanifest"), DecodeOptions::default())?;
//! print!("{}", manifest.render(RenderOptions::default()));
//! # Ok::<(), relman::decode::error::Error>(())
//! ```

#![warn(clippy::unwrap_used, missing_docs)]
#![deny(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod cursor;
pub mod decode;
pub mod format;
pub mod manifest;
pub mod render;
pub mod tree;

#[doc(inline)]
pub use self::decode::{decode_file, DecodeOptions, Decoder, VersionPolicy};
#[doc(inline)]
pub use self::manifest::Manifest;
#[doc(inline)]
pub use self::render::{render, RenderOptions};
#[doc(inline)]
pub use self::tree::{Directory, File};
