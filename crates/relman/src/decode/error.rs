//! Error types for [`Decoder`](super::Decoder).
use std::borrow::Cow;

use deku::DekuError;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Convenience return type.
pub type Result<T> = std::result::Result<T, Error>;

/// How many bytes of input to show on either side of an error location.
pub(crate) const SNIPPET_CONTEXT: usize = 16;

/// Combined return error type for [`Decoder`](super::Decoder) methods.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
	/// I/O error.
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// Decoder error that's just a message.
	#[error(transparent)]
	Simple(#[from] SimpleError),

	/// Decoder error that includes source.
	#[error(transparent)]
	Source(#[from] SourceError),
}

impl Error {
	/// The kind of this error, if it came from the decoder itself.
	pub fn kind(&self) -> Option<ErrorKind> {
		match self {
			Self::Io(_) => None,
			Self::Simple(err) => Some(err.kind),
			Self::Source(err) => Some(err.kind),
		}
	}

	/// Make an error pointing at a byte offset of the input.
	///
	/// Falls back to a [`SimpleError`] when there's no input to show.
	pub(crate) fn at(kind: ErrorKind, source: &[u8], offset: usize) -> Self {
		if source.is_empty() {
			SimpleError::new(kind).into()
		} else {
			let at_byte = offset.min(source.len() - 1);
			SourceError::from_source(kind, source, at_byte, SNIPPET_CONTEXT).into()
		}
	}
}

/// Decoder error.
#[derive(Error, Diagnostic, Debug)]
#[error("relman decode: {message}")]
pub struct SimpleError {
	/// Error kind.
	pub kind: ErrorKind,

	/// Error message.
	pub message: Cow<'static, str>,
}

/// Decoder error.
#[derive(Error, Diagnostic, Debug)]
#[error("relman decode: {message}")]
pub struct SourceError {
	/// Error kind.
	pub kind: ErrorKind,

	/// Error message.
	pub message: Cow<'static, str>,

	/// Error location in the manifest.
	#[label("here")]
	pub at: SourceSpan,

	/// Snippet of the manifest.
	#[source_code]
	pub snippet: String,
}

impl SimpleError {
	/// New error without source.
	pub fn new(kind: ErrorKind) -> Self {
		Self {
			kind,
			message: kind.default_message(),
		}
	}

	/// Change the error message.
	pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
		self.message = message.into();
		self
	}
}

impl SourceError {
	/// New error with source snippet.
	pub fn new(kind: ErrorKind, snippet: &[u8], at_byte: usize) -> Self {
		Self {
			kind,
			message: kind.default_message(),
			snippet: format!("{snippet:02x?}"),
			at: SourceSpan::from((
				(at_byte * 4) + 1, // to account for [ and the ", " separators
				2,                 // always 2 bytes for the hex value
			)),
		}
	}

	/// New error with source snippet, extracted from a larger source.
	pub fn from_source(kind: ErrorKind, source: &[u8], at_byte: usize, context: usize) -> Self {
		let start = at_byte.saturating_sub(context);
		let end = at_byte.saturating_add(context).min(source.len());
		Self::new(kind, &source[start..end], at_byte.saturating_sub(start))
	}

	/// New error from deku.
	pub fn from_deku(orig: DekuError, source: &[u8], at_byte: usize, context: usize) -> Self {
		Self::from_source(ErrorKind::Parse, source, at_byte, context).with_message(orig.to_string())
	}

	/// Change the error message.
	pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
		self.message = message.into();
		self
	}
}

/// Decoder error kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// The input file does not exist.
	InputNotFound,

	/// The input ended before a read could be satisfied.
	UnexpectedEndOfInput {
		/// Offset in bytes where the read started.
		offset: usize,
		/// How many bytes the read needed.
		wanted: usize,
	},

	/// A range or index in a record points past the end of one of the flat tables.
	TruncatedManifest {
		/// Which table the reference points into.
		table: &'static str,
		/// Exclusive end of the reference.
		end: u64,
		/// Actual length of the table.
		len: usize,
	},

	/// A string in the string table isn't valid UTF-8, or has no terminator.
	MalformedString {
		/// Offset in bytes of the start of the string.
		offset: usize,
	},

	/// A directory record is reachable from its own subdirectory range.
	CyclicManifest {
		/// Index of the directory record that was reached again.
		index: usize,
	},

	/// The manifest version isn't in the accepted set.
	UnsupportedVersion(u32),

	/// A table declares more entries than the decoder is configured to accept.
	TooManyEntries {
		/// Which table.
		table: &'static str,
		/// Declared count.
		count: usize,
		/// Configured maximum.
		max: usize,
	},

	/// Parse error.
	Parse,
}

impl ErrorKind {
	/// Get the default error message for this error kind.
	pub fn default_message(self) -> Cow<'static, str> {
		match self {
			ErrorKind::InputNotFound => Cow::Borrowed("input file not found"),
			ErrorKind::UnexpectedEndOfInput { offset, wanted } => Cow::Owned(format!(
				"unexpected end of input: wanted {wanted} bytes at offset {offset}"
			)),
			ErrorKind::TruncatedManifest { table, end, len } => Cow::Owned(format!(
				"truncated manifest: reference up to {end} is past the end of the {table} table ({len} entries)"
			)),
			ErrorKind::MalformedString { offset } => {
				Cow::Owned(format!("malformed string at offset {offset}"))
			}
			ErrorKind::CyclicManifest { index } => Cow::Owned(format!(
				"cyclic manifest: directory {index} contains itself"
			)),
			ErrorKind::UnsupportedVersion(version) => {
				Cow::Owned(format!("unsupported release manifest version {version}"))
			}
			ErrorKind::TooManyEntries { table, count, max } => Cow::Owned(format!(
				"{table} table declares {count} entries, more than the maximum of {max}"
			)),
			ErrorKind::Parse => Cow::Borrowed("parse error"),
		}
	}
}

impl From<ErrorKind> for SimpleError {
	fn from(ek: ErrorKind) -> Self {
		Self::new(ek)
	}
}

impl From<ErrorKind> for Error {
	fn from(ek: ErrorKind) -> Self {
		Self::Simple(ek.into())
	}
}
