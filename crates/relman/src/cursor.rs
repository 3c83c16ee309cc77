//! Bounds-checked sequential reader over an in-memory buffer.
//!
//! Every read checks that enough bytes remain before touching the buffer, and a failed read leaves
//! the position where it was.

use deku::DekuContainerRead;
use tracing::trace;

use crate::{
	decode::error::{Error, ErrorKind, Result, SourceError, SNIPPET_CONTEXT},
	format::WireRecord,
};

/// Sequential reader over a byte buffer.
#[derive(Clone, Debug)]
pub struct Cursor<'a> {
	bytes: &'a [u8],
	position: usize,
}

impl<'a> Cursor<'a> {
	/// Start reading at the beginning of `bytes`.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, position: 0 }
	}

	/// Current offset in bytes from the start of the buffer.
	pub fn position(&self) -> usize {
		self.position
	}

	/// Number of bytes left to read.
	pub fn remaining(&self) -> usize {
		self.bytes.len() - self.position
	}

	/// Whether everything has been read.
	pub fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	/// The whole underlying buffer.
	pub fn source(&self) -> &'a [u8] {
		self.bytes
	}

	/// An error for a read of `wanted` bytes at the current position.
	pub(crate) fn end_of_input(&self, wanted: usize) -> Error {
		Error::at(
			ErrorKind::UnexpectedEndOfInput {
				offset: self.position,
				wanted,
			},
			self.bytes,
			self.position,
		)
	}

	/// Take the next `n` bytes.
	fn take(&mut self, n: usize) -> Result<&'a [u8]> {
		let start = self.position;
		let Some(slice) = start
			.checked_add(n)
			.and_then(|end| self.bytes.get(start..end))
		else {
			return Err(self.end_of_input(n));
		};

		self.position += n;
		Ok(slice)
	}

	/// Read exactly `n` raw bytes.
	pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
		self.take(n)
	}

	/// Read a fixed-size array of bytes.
	pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let mut array = [0; N];
		array.copy_from_slice(self.take(N)?);
		Ok(array)
	}

	/// Read a byte.
	pub fn read_u8(&mut self) -> Result<u8> {
		self.read_array::<1>().map(u8::from_le_bytes)
	}

	/// Read a little-endian u16.
	pub fn read_u16(&mut self) -> Result<u16> {
		self.read_array::<2>().map(u16::from_le_bytes)
	}

	/// Read a little-endian u32.
	pub fn read_u32(&mut self) -> Result<u32> {
		self.read_array::<4>().map(u32::from_le_bytes)
	}

	/// Read a NUL-terminated UTF-8 string.
	///
	/// The terminator is consumed but not included. Fails with
	/// [`MalformedString`](ErrorKind::MalformedString) if there's no terminator before the end of
	/// the buffer or if the bytes before it aren't UTF-8.
	pub fn read_cstr(&mut self) -> Result<&'a str> {
		let start = self.position;
		let rest = &self.bytes[start..];
		let malformed = ErrorKind::MalformedString { offset: start };

		let Some(length) = rest.iter().position(|byte| *byte == 0) else {
			trace!(offset=%start, "string runs to end of input");
			return Err(Error::at(malformed, self.bytes, self.bytes.len()));
		};

		let string = std::str::from_utf8(&rest[..length])
			.map_err(|err| Error::at(malformed, self.bytes, start + err.valid_up_to()))?;

		self.position += length + 1;
		Ok(string)
	}

	/// Read a fixed-size wire structure.
	///
	/// The bytes are bounds-checked first, so a short buffer is always reported as
	/// [`UnexpectedEndOfInput`](ErrorKind::UnexpectedEndOfInput).
	pub fn read_record<T>(&mut self) -> Result<T>
	where
		T: DekuContainerRead<'a> + WireRecord,
	{
		let start = self.position;
		let bytes = self.take(T::LENGTH)?;
		let (_, record) = T::from_bytes((bytes, 0))
			.map_err(|err| SourceError::from_deku(err, self.bytes, start, SNIPPET_CONTEXT))?;
		Ok(record)
	}
}
