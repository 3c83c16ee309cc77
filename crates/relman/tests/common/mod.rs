#![allow(dead_code)]

use deku::DekuContainerWrite;
use relman::format::{ContentHash, DirectoryRecord, FileRecord, Flags, Header};

/// Builds manifest bytes from a list of directories and files.
#[derive(Clone, Debug, Default)]
pub struct ManifestBuilder {
	pub version: u32,
	pub directories: Vec<DirectoryRecord>,
	pub files: Vec<FileRecord>,
	pub strings: Vec<String>,
}

impl ManifestBuilder {
	pub fn new(version: u32) -> Self {
		Self {
			version,
			..Default::default()
		}
	}

	/// Intern a string, returning its index.
	pub fn string(&mut self, s: &str) -> u32 {
		if let Some(index) = self.strings.iter().position(|existing| existing == s) {
			return index as u32;
		}
		self.strings.push(s.into());
		(self.strings.len() - 1) as u32
	}

	/// Add a file record, returning its index.
	pub fn file(&mut self, name: &str, version: u32) -> u32 {
		let name_index = self.string(name);
		self.files.push(FileRecord {
			name_index,
			version,
			hash: ContentHash([version as u8; 16]),
			flags: Flags(0x04),
			size: 100 * version,
			compressed_size: 50 * version,
			unknown: 0x1234_5678,
			kind: 1,
			unknown1: 2,
			unknown2: 3,
		});
		(self.files.len() - 1) as u32
	}

	/// Add a directory record, returning its index.
	pub fn directory(&mut self, name: &str, sub_dirs: (u32, u32), files: (u32, u32)) -> u32 {
		let name_index = self.string(name);
		self.directories.push(DirectoryRecord {
			name_index,
			sub_directory_start: sub_dirs.0,
			sub_directory_count: sub_dirs.1,
			file_start: files.0,
			file_count: files.1,
		});
		(self.directories.len() - 1) as u32
	}

	pub fn build(&self) -> Vec<u8> {
		let header = Header {
			magic: *b"RLSM",
			kind: 1,
			entry_count: (self.directories.len() + self.files.len()) as u32,
			version: self.version,
		};

		let mut bytes = header.to_bytes().unwrap();
		bytes.extend((self.directories.len() as u32).to_le_bytes());
		for dir in &self.directories {
			bytes.extend(dir.to_bytes().unwrap());
		}

		bytes.extend((self.files.len() as u32).to_le_bytes());
		for file in &self.files {
			bytes.extend(file.to_bytes().unwrap());
		}

		let size: usize = self.strings.iter().map(|s| s.len() + 1).sum();
		bytes.extend((self.strings.len() as u32).to_le_bytes());
		bytes.extend((size as u32).to_le_bytes());
		for string in &self.strings {
			bytes.extend(string.as_bytes());
			bytes.push(0);
		}

		bytes
	}
}

/// A small manifest with two roots, nesting, and a shared subtree.
///
/// ```text
/// 0 projects            files: -
///   1 lol_game_client   files: game.exe
///     3 DATA            files: a.dds, b.dds
/// 2 solutions           files: -
///   4 lol_game_client_sln
/// ```
pub fn sample() -> ManifestBuilder {
	let mut m = ManifestBuilder::new(0x0001_0002);
	m.file("game.exe", 1);
	m.file("a.dds", 2);
	m.file("b.dds", 3);

	m.directory("projects", (1, 1), (0, 0));
	m.directory("lol_game_client", (3, 1), (0, 1));
	m.directory("solutions", (4, 1), (0, 0));
	m.directory("DATA", (0, 0), (1, 2));
	m.directory("lol_game_client_sln", (0, 0), (0, 0));
	m
}
