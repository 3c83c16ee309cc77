use tracing::{debug, instrument, trace, warn};

use crate::format::{DirectoryRecord, FileRecord, Header, WireRecord};

use super::{
	error::{ErrorKind, Result},
	Decoder, VersionPolicy,
};

/// The flat tables of a manifest, as read off the wire.
///
/// Nothing in here has been cross-checked: ranges and name indices may point anywhere.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlatTables {
	/// Header.
	pub header: Header,

	/// Directory records.
	pub directories: Vec<DirectoryRecord>,

	/// File records.
	pub files: Vec<FileRecord>,

	/// String table.
	pub strings: Vec<String>,

	/// Byte size of the string table as declared in the manifest.
	pub strings_size: u32,
}

impl<'a> Decoder<'a> {
	/// Read the header and all three tables.
	#[instrument(level = "debug", skip(self))]
	pub(crate) fn read_tables(&mut self) -> Result<FlatTables> {
		let header = self.read_header()?;
		let directories = self.read_directory_records()?;
		let files = self.read_file_records()?;
		let (strings, strings_size) = self.read_string_table()?;

		if !self.cursor.is_empty() {
			debug!(remaining=%self.cursor.remaining(), "trailing bytes after string table");
		}

		Ok(FlatTables {
			header,
			directories,
			files,
			strings,
			strings_size,
		})
	}

	/// Read the header and check its version against the policy.
	#[cfg_attr(feature = "expose-internals", visibility::make(pub))]
	#[instrument(level = "debug", skip(self))]
	fn read_header(&mut self) -> Result<Header> {
		let header: Header = self.cursor.read_record()?;
		debug!(?header, "read header");

		let version = header.version;
		match &self.options.version_policy {
			VersionPolicy::AcceptAll => {}
			VersionPolicy::Warn(known) if !known.contains(&version) => {
				warn!(%version, ?known, "unexpected release manifest version, continuing anyway");
			}
			VersionPolicy::Reject(accepted) if !accepted.contains(&version) => {
				return Err(ErrorKind::UnsupportedVersion(version).into());
			}
			_ => {}
		}

		Ok(header)
	}

	/// Read a table count, and check the table can fit in what's left of the input.
	///
	/// `min_length` is the smallest size of one entry on the wire.
	fn read_count(&mut self, table: &'static str, min_length: usize) -> Result<usize> {
		let count = self.cursor.read_u32()? as usize;
		trace!(%table, %count, "read table count");

		if let Some(max) = self.options.max_entries {
			if count > max {
				return Err(ErrorKind::TooManyEntries { table, count, max }.into());
			}
		}

		let wanted = count.saturating_mul(min_length);
		if wanted > self.cursor.remaining() {
			return Err(self.cursor.end_of_input(wanted));
		}

		Ok(count)
	}

	/// Read the directory count and records.
	#[cfg_attr(feature = "expose-internals", visibility::make(pub))]
	#[instrument(level = "debug", skip(self))]
	fn read_directory_records(&mut self) -> Result<Vec<DirectoryRecord>> {
		let count = self.read_count("directories", DirectoryRecord::LENGTH)?;
		let records = (0..count)
			.map(|_| self.cursor.read_record())
			.collect::<Result<Vec<DirectoryRecord>>>()?;
		debug!(count=%records.len(), "read directory records");
		Ok(records)
	}

	/// Read the file count and records.
	#[cfg_attr(feature = "expose-internals", visibility::make(pub))]
	#[instrument(level = "debug", skip(self))]
	fn read_file_records(&mut self) -> Result<Vec<FileRecord>> {
		let count = self.read_count("files", FileRecord::LENGTH)?;
		let records = (0..count)
			.map(|_| self.cursor.read_record())
			.collect::<Result<Vec<FileRecord>>>()?;
		debug!(count=%records.len(), "read file records");
		Ok(records)
	}

	/// Read the string table.
	///
	/// The declared byte size isn't used to bound the reads: strings are read by terminator.
	#[cfg_attr(feature = "expose-internals", visibility::make(pub))]
	#[instrument(level = "debug", skip(self))]
	fn read_string_table(&mut self) -> Result<(Vec<String>, u32)> {
		let count = self.cursor.read_u32()? as usize;
		let size = self.cursor.read_u32()?;
		trace!(%count, %size, "read string table header");

		if let Some(max) = self.options.max_entries {
			if count > max {
				return Err(ErrorKind::TooManyEntries {
					table: "strings",
					count,
					max,
				}
				.into());
			}
		}

		// every string is at least its terminator
		if count > self.cursor.remaining() {
			return Err(self.cursor.end_of_input(count));
		}

		let start = self.cursor.position();
		let strings = (0..count)
			.map(|_| self.cursor.read_cstr().map(String::from))
			.collect::<Result<Vec<_>>>()?;

		let actual = self.cursor.position() - start;
		if actual != size as usize {
			warn!(declared=%size, %actual, "string table size mismatch");
		}

		debug!(count=%strings.len(), "read string table");
		Ok((strings, size))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::decode::DecodeOptions;

	fn manifest_bytes(version: u32, strings: &[&str]) -> Vec<u8> {
		let mut bytes = Vec::new();
		bytes.extend(b"RLSM");
		bytes.extend(1_u32.to_le_bytes());
		bytes.extend(0_u32.to_le_bytes());
		bytes.extend(version.to_le_bytes());

		// one directory, no files
		bytes.extend(1_u32.to_le_bytes());
		bytes.extend([0_u32, 0, 0, 0, 0].iter().flat_map(|n| n.to_le_bytes()));
		bytes.extend(0_u32.to_le_bytes());

		let size: usize = strings.iter().map(|s| s.len() + 1).sum();
		bytes.extend((strings.len() as u32).to_le_bytes());
		bytes.extend((size as u32).to_le_bytes());
		for string in strings {
			bytes.extend(string.as_bytes());
			bytes.push(0);
		}
		bytes
	}

	#[test]
	fn reads_all_tables() {
		let bytes = manifest_bytes(0x0001_0000, &["root", "other"]);
		let tables = Decoder::new(&bytes).tables().unwrap();

		assert_eq!(&tables.header.magic, b"RLSM");
		assert_eq!(tables.header.kind, 1);
		assert_eq!(tables.header.version, 0x0001_0000);
		assert_eq!(tables.directories.len(), 1);
		assert!(tables.files.is_empty());
		assert_eq!(tables.strings, ["root", "other"]);
		assert_eq!(tables.strings_size, 11);
	}

	#[test]
	fn version_policies() {
		let bytes = manifest_bytes(7, &["root"]);

		let options = DecodeOptions {
			version_policy: VersionPolicy::Warn(vec![1]),
			..Default::default()
		};
		assert!(Decoder::with_options(&bytes, options).tables().is_ok());

		let options = DecodeOptions {
			version_policy: VersionPolicy::Reject(vec![7]),
			..Default::default()
		};
		assert!(Decoder::with_options(&bytes, options).tables().is_ok());

		let options = DecodeOptions {
			version_policy: VersionPolicy::Reject(vec![1, 2]),
			..Default::default()
		};
		let err = Decoder::with_options(&bytes, options).tables().unwrap_err();
		assert_eq!(err.kind(), Some(ErrorKind::UnsupportedVersion(7)));
	}

	#[test]
	fn absurd_counts_are_rejected_before_allocating() {
		let mut bytes = manifest_bytes(1, &["root"]);
		bytes[16..20].copy_from_slice(&u32::MAX.to_le_bytes());

		let err = Decoder::new(&bytes).tables().unwrap_err();
		assert!(matches!(
			err.kind(),
			Some(ErrorKind::UnexpectedEndOfInput { offset: 20, .. })
		));
	}

	#[test]
	fn max_entries_is_enforced() {
		let bytes = manifest_bytes(1, &["a", "b", "c"]);
		let options = DecodeOptions {
			max_entries: Some(2),
			..Default::default()
		};

		let err = Decoder::with_options(&bytes, options).tables().unwrap_err();
		assert_eq!(
			err.kind(),
			Some(ErrorKind::TooManyEntries {
				table: "strings",
				count: 3,
				max: 2
			})
		);
	}

	#[test]
	fn string_size_is_informational() {
		let mut bytes = manifest_bytes(1, &["root"]);
		let size_at = bytes.len() - 5 - 4;
		bytes[size_at..size_at + 4].copy_from_slice(&9999_u32.to_le_bytes());

		let tables = Decoder::new(&bytes).tables().unwrap();
		assert_eq!(tables.strings, ["root"]);
		assert_eq!(tables.strings_size, 9999);
	}

	#[test]
	fn trailing_bytes_are_ignored() {
		let mut bytes = manifest_bytes(1, &["root"]);
		bytes.extend([0xFF; 3]);
		assert!(Decoder::new(&bytes).tables().is_ok());
	}
}
