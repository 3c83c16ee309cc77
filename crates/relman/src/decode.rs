//! Decoder types and functions.

use std::{
	fs::File,
	io::{self, Read},
	path::Path,
};

use tracing::{debug, instrument};

use crate::{cursor::Cursor, manifest::Manifest};

use self::error::{Error, ErrorKind, Result, SimpleError};

#[doc(inline)]
pub use self::tables::FlatTables;

pub mod error;
mod resolve;
mod tables;

/// What to do with manifest versions.
///
/// The format has no published compatibility contract, so the default is to accept anything and
/// let the caller look at [`Manifest::version`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum VersionPolicy {
	/// Accept any version.
	#[default]
	AcceptAll,

	/// Accept any version, but log a warning if it's not one of these.
	Warn(Vec<u32>),

	/// Only accept these versions.
	Reject(Vec<u32>),
}

/// Decoder configuration.
#[derive(Clone, Debug, Default)]
pub struct DecodeOptions {
	/// What to do with the manifest version.
	pub version_policy: VersionPolicy,

	/// Maximum number of entries in any one table.
	///
	/// Tables are always checked against the remaining input before being allocated; this is an
	/// additional hard limit.
	pub max_entries: Option<usize>,
}

/// Decoder context.
///
/// Reads a fully-buffered manifest in one pass.
#[derive(Debug)]
pub struct Decoder<'a> {
	cursor: Cursor<'a>,
	options: DecodeOptions,
}

impl<'a> Decoder<'a> {
	/// New decoder over a buffer, with default options.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self::with_options(bytes, DecodeOptions::default())
	}

	/// New decoder over a buffer.
	pub fn with_options(bytes: &'a [u8], options: DecodeOptions) -> Self {
		Self {
			cursor: Cursor::new(bytes),
			options,
		}
	}

	/// The decoder options.
	pub fn options(&self) -> &DecodeOptions {
		&self.options
	}

	/// Decode and resolve the whole manifest.
	#[instrument(level = "debug", skip(self))]
	pub fn decode(self) -> Result<Manifest> {
		let tables = self.tables()?;
		let directories = resolve::Resolver::new(&tables).resolve_all()?;
		let manifest = Manifest::classify(&tables.header, directories);
		debug!(
			directories=%manifest.directories().len(),
			main=%manifest.main_directories().len(),
			sub=%manifest.sub_directories().len(),
			"decoded manifest"
		);
		Ok(manifest)
	}

	/// Decode the flat tables only, without resolving anything.
	pub fn tables(mut self) -> Result<FlatTables> {
		self.read_tables()
	}
}

/// Read a whole file into memory.
///
/// The file is closed before this returns, including on error. A missing file is reported as
/// [`InputNotFound`](ErrorKind::InputNotFound).
#[instrument(level = "debug")]
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
	let mut file = File::open(path).map_err(|err| -> Error {
		match err.kind() {
			io::ErrorKind::NotFound => SimpleError::new(ErrorKind::InputNotFound)
				.with_message(format!("input file not found: {}", path.display()))
				.into(),
			_ => err.into(),
		}
	})?;

	let mut bytes = Vec::new();
	file.read_to_end(&mut bytes)?;
	debug!(bytes=%bytes.len(), "read input file");
	Ok(bytes)
}

/// Read and decode a manifest file.
pub fn decode_file(path: &Path, options: DecodeOptions) -> Result<Manifest> {
	let bytes = read_file(path)?;
	Decoder::with_options(&bytes, options).decode()
}
