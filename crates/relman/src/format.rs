//! Wire structures of the release manifest format.
//!
//! A release manifest is a small header followed by three flat tables: directory records, file
//! records, and a string table. All integers are little-endian. Records refer to each other only
//! by index (or by start/count ranges) into those tables, and to their names by index into the
//! string table.
//!
//! ```text
//! magic            4 bytes
//! type             u32
//! entry count      u32
//! version          u32
//! directory count  u32
//! directories      count × DirectoryRecord (20 bytes)
//! file count       u32
//! files            count × FileRecord (44 bytes)
//! string count     u32
//! strings size     u32
//! strings          count × NUL-terminated UTF-8
//! ```

use std::{fmt, ops::Range};

use deku::prelude::*;

/// A fixed-size structure on the wire.
pub trait WireRecord {
	/// Length in bytes of the structure on the wire.
	const LENGTH: usize;
}

/// Release manifest header.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct Header {
	/// Magic tag. Not validated.
	pub magic: [u8; 4],

	/// Format type.
	pub kind: u32,

	/// Entry count. Informational only.
	pub entry_count: u32,

	/// Format version.
	pub version: u32,
}

impl WireRecord for Header {
	const LENGTH: usize = 16;
}

/// Directory record, as stored in the flat directory table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct DirectoryRecord {
	/// Index of the name in the string table.
	pub name_index: u32,

	/// Index of the first subdirectory in the directory table.
	pub sub_directory_start: u32,

	/// Number of subdirectories.
	pub sub_directory_count: u32,

	/// Index of the first file in the file table.
	pub file_start: u32,

	/// Number of files.
	pub file_count: u32,
}

impl WireRecord for DirectoryRecord {
	const LENGTH: usize = 20;
}

impl DirectoryRecord {
	/// Range of subdirectories in the directory table.
	///
	/// This is not checked against the table; `Err` holds the (overflowed) end of the range.
	pub fn sub_directories(&self) -> Result<Range<usize>, u64> {
		checked_range(self.sub_directory_start, self.sub_directory_count)
	}

	/// Range of files in the file table.
	///
	/// This is not checked against the table; `Err` holds the (overflowed) end of the range.
	pub fn files(&self) -> Result<Range<usize>, u64> {
		checked_range(self.file_start, self.file_count)
	}
}

fn checked_range(start: u32, count: u32) -> Result<Range<usize>, u64> {
	let end = u64::from(start) + u64::from(count);
	match (usize::try_from(start), usize::try_from(end)) {
		(Ok(start), Ok(end)) => Ok(start..end),
		_ => Err(end),
	}
}

/// File record, as stored in the flat file table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct FileRecord {
	/// Index of the name in the string table.
	pub name_index: u32,

	/// File version.
	pub version: u32,

	/// Hash of the file content.
	pub hash: ContentHash,

	/// Flags. Opaque.
	pub flags: Flags,

	/// Uncompressed size in bytes.
	pub size: u32,

	/// Compressed size in bytes.
	pub compressed_size: u32,

	/// Unknown. Thought to be part of a timestamp, with the three fields after it.
	pub unknown: u32,

	/// File type.
	pub kind: u16,

	/// Unknown.
	pub unknown1: u8,

	/// Unknown.
	pub unknown2: u8,
}

impl WireRecord for FileRecord {
	const LENGTH: usize = 44;
}

/// Content hash of a file.
///
/// Sixteen opaque bytes; displays as lowercase hex.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct ContentHash(pub [u8; 16]);

impl fmt::Display for ContentHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&hex::encode(self.0))
	}
}

/// File flags.
///
/// Only some of the bits have a guessed meaning, so this is kept as an opaque bitfield.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct Flags(pub u32);

impl Flags {
	/// The raw bits.
	pub fn bits(self) -> u32 {
		self.0
	}
}

impl fmt::Display for Flags {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#010x}", self.0)
	}
}
