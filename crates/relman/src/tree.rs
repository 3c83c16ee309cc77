//! Resolved directory tree.

use std::{
	fmt,
	rc::{Rc, Weak},
};

use crate::format::{ContentHash, FileRecord, Flags};

/// A directory, with its files and subdirectories resolved.
pub struct Directory {
	/// Directory name.
	pub name: String,

	/// Index of the record this was resolved from in the flat directory table.
	pub index: usize,

	/// Files directly in this directory, in table order.
	pub files: Vec<File>,

	/// Subdirectories, in table order.
	///
	/// A subdirectory is shared with every other place that refers to the same record.
	pub sub_directories: Vec<Rc<Directory>>,
}

impl Directory {
	/// Build a directory, linking every file back to it.
	pub(crate) fn assemble(
		index: usize,
		name: String,
		files: Vec<(usize, String, FileRecord)>,
		sub_directories: Vec<Rc<Directory>>,
	) -> Rc<Self> {
		Rc::new_cyclic(|this| Self {
			name,
			index,
			files: files
				.into_iter()
				.map(|(index, name, record)| File::from_record(index, name, &record, this.clone()))
				.collect(),
			sub_directories,
		})
	}

	/// Iterate over this directory and all its descendants, depth-first, parents first.
	///
	/// Each directory comes with its depth below this one, which is at depth zero. A subdirectory
	/// shared by several parents is visited under each of them.
	pub fn walk(&self) -> impl Iterator<Item = (usize, &Directory)> + '_ {
		let mut stack = vec![(0, self)];
		std::iter::from_fn(move || {
			let (depth, dir) = stack.pop()?;
			stack.extend(
				dir.sub_directories
					.iter()
					.rev()
					.map(|sub| (depth + 1, sub.as_ref())),
			);
			Some((depth, dir))
		})
	}

	/// Find a direct subdirectory by name.
	pub fn sub_directory(&self, name: &str) -> Option<&Rc<Directory>> {
		self.sub_directories.iter().find(|dir| dir.name == name)
	}

	/// Find a file directly in this directory by name.
	pub fn file(&self, name: &str) -> Option<&File> {
		self.files.iter().find(|file| file.name == name)
	}
}

impl fmt::Debug for Directory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Directory")
			.field("name", &self.name)
			.field("index", &self.index)
			.field("files", &self.files)
			.field(
				"sub_directories",
				&self.sub_directories.iter().map(|dir| dir.index).collect::<Vec<_>>(),
			)
			.finish()
	}
}

impl Drop for Directory {
	// Nested chains can be as deep as the directory table is long; unlink them in a loop.
	fn drop(&mut self) {
		let mut pending = std::mem::take(&mut self.sub_directories);
		while let Some(dir) = pending.pop() {
			if let Ok(mut dir) = Rc::try_unwrap(dir) {
				pending.append(&mut dir.sub_directories);
			}
		}
	}
}

/// A file entry.
#[derive(Clone, Debug)]
pub struct File {
	/// File name.
	pub name: String,

	/// Index of the record this was resolved from in the flat file table.
	pub index: usize,

	/// File version.
	pub version: u32,

	/// Content hash.
	pub hash: ContentHash,

	/// Flags, opaque.
	pub flags: Flags,

	/// Uncompressed size in bytes.
	pub size: u32,

	/// Compressed size in bytes.
	pub compressed_size: u32,

	/// File type.
	pub kind: u16,

	/// Unknown fields, in wire order.
	pub unknown: (u32, u8, u8),

	parent: Weak<Directory>,
}

impl File {
	fn from_record(index: usize, name: String, record: &FileRecord, parent: Weak<Directory>) -> Self {
		Self {
			name,
			index,
			version: record.version,
			hash: record.hash,
			flags: record.flags,
			size: record.size,
			compressed_size: record.compressed_size,
			kind: record.kind,
			unknown: (record.unknown, record.unknown1, record.unknown2),
			parent,
		}
	}

	/// The directory that contains this file.
	///
	/// Returns `None` once that directory has been dropped.
	pub fn parent(&self) -> Option<Rc<Directory>> {
		self.parent.upgrade()
	}
}
