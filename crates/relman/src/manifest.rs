//! The decoded manifest, with its directories classified.

use std::{collections::HashSet, fmt, rc::Rc};

use tracing::trace;

use crate::{
	format::Header,
	render::{RenderOptions, Rendered},
	tree::{Directory, File},
};

/// A decoded release manifest.
///
/// Every directory record of the manifest becomes a top-level entry in
/// [`directories()`](Self::directories), including the ones that are also nested under another
/// directory. [`main_directories()`](Self::main_directories) is the subset that forms the actual
/// roots of the tree.
#[derive(Debug)]
pub struct Manifest {
	/// Magic tag from the header.
	pub magic: [u8; 4],

	/// Format type from the header.
	pub kind: u32,

	/// Entry count from the header.
	pub entry_count: u32,

	/// Format version.
	pub version: u32,

	directories: Vec<Rc<Directory>>,
	sub_directories: Vec<Rc<Directory>>,
	main_directories: Vec<Rc<Directory>>,
}

impl Manifest {
	/// Classify resolved directories.
	///
	/// `directories` must be one resolved tree per directory record, in table order.
	pub(crate) fn classify(header: &Header, directories: Vec<Rc<Directory>>) -> Self {
		let mut seen = HashSet::new();
		let mut sub_directories = Vec::new();
		for child in directories.iter().flat_map(|dir| dir.sub_directories.iter()) {
			if seen.insert(Rc::as_ptr(child)) {
				sub_directories.push(Rc::clone(child));
			}
		}

		let sub_names: HashSet<&str> = sub_directories.iter().map(|dir| dir.name.as_str()).collect();
		let mut main_names = HashSet::new();
		let mut main_directories = Vec::new();
		for dir in &directories {
			if sub_names.contains(dir.name.as_str()) || !main_names.insert(dir.name.as_str()) {
				trace!(index=%dir.index, name=%dir.name, "not a main directory");
				continue;
			}

			main_directories.push(Rc::clone(dir));
		}

		Self {
			magic: header.magic,
			kind: header.kind,
			entry_count: header.entry_count,
			version: header.version,
			directories,
			sub_directories,
			main_directories,
		}
	}

	/// All directories, one per directory record, in table order.
	pub fn directories(&self) -> &[Rc<Directory>] {
		&self.directories
	}

	/// Directories that are a subdirectory of some other directory.
	///
	/// Each appears once, in the order first reached.
	pub fn sub_directories(&self) -> &[Rc<Directory>] {
		&self.sub_directories
	}

	/// Root directories: not a subdirectory anywhere, and the first with their name.
	pub fn main_directories(&self) -> &[Rc<Directory>] {
		&self.main_directories
	}

	/// Every file in the manifest, once each.
	///
	/// Files are deduplicated by the file record they were resolved from: when the file ranges of
	/// several directory records overlap, a shared record is listed once, under the first directory
	/// that reaches it. Distinct records that merely share a name or hash are all listed.
	pub fn files(&self) -> Vec<&File> {
		let mut seen = HashSet::new();
		self.directories
			.iter()
			.flat_map(|dir| dir.files.iter())
			.filter(|file| seen.insert(file.index))
			.collect()
	}

	/// Find a main directory by name.
	pub fn main_directory(&self, name: &str) -> Option<&Rc<Directory>> {
		self.main_directories.iter().find(|dir| dir.name == name)
	}

	/// Render this manifest as text.
	pub fn render(&self, options: RenderOptions) -> String {
		Rendered::new(self, options).to_string()
	}
}

impl fmt::Display for Manifest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(&Rendered::new(self, RenderOptions::default()), f)
	}
}
