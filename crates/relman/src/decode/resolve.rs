use std::{ops::Range, rc::Rc};

use tracing::{instrument, trace};

use crate::{format::FileRecord, tree::Directory};

use super::{
	error::{Error, ErrorKind, Result},
	FlatTables,
};

/// Resolution state of one directory record.
#[derive(Clone, Debug)]
enum Slot {
	Pending,
	InProgress,
	Resolved(Rc<Directory>),
}

/// Pending work while resolving.
#[derive(Debug)]
enum Step {
	/// Look at a record, and queue its children ahead of its own assembly.
	Enter(usize),

	/// All children are resolved; build the directory.
	Assemble {
		index: usize,
		name: String,
		files: Vec<(usize, String, FileRecord)>,
		children: Range<usize>,
	},
}

/// Turns flat directory records into a tree.
///
/// Each record is resolved once and then shared, so a subtree reachable from several places is
/// the same object everywhere.
#[derive(Debug)]
pub(crate) struct Resolver<'t> {
	tables: &'t FlatTables,
	slots: Vec<Slot>,
}

impl<'t> Resolver<'t> {
	pub fn new(tables: &'t FlatTables) -> Self {
		Self {
			tables,
			slots: vec![Slot::Pending; tables.directories.len()],
		}
	}

	/// Resolve every directory record, in table order.
	#[instrument(level = "debug", skip(self))]
	pub fn resolve_all(mut self) -> Result<Vec<Rc<Directory>>> {
		(0..self.tables.directories.len())
			.map(|index| self.resolve(index))
			.collect()
	}

	/// Resolve one directory record and everything under it.
	///
	/// Reaching a record that is still being resolved is a cycle, and aborts. The walk keeps its
	/// own stack, so nesting depth is limited only by the size of the directory table.
	pub fn resolve(&mut self, index: usize) -> Result<Rc<Directory>> {
		let mut work = vec![Step::Enter(index)];
		while let Some(step) = work.pop() {
			match step {
				Step::Enter(index) => {
					match self.slots.get(index) {
						None => {
							return Err(ErrorKind::TruncatedManifest {
								table: "directories",
								end: index as u64 + 1,
								len: self.slots.len(),
							}
							.into())
						}
						Some(Slot::Resolved(_)) => continue,
						Some(Slot::InProgress) => {
							return Err(ErrorKind::CyclicManifest { index }.into())
						}
						Some(Slot::Pending) => {}
					}

					self.slots[index] = Slot::InProgress;
					let record = self.tables.directories[index];
					let name = self.string(record.name_index)?;
					trace!(%index, %name, ?record, "resolving directory");

					let files = self
						.range(record.files(), self.tables.files.len(), "files")?
						.map(|file_index| {
							let file = self.tables.files[file_index];
							self.string(file.name_index)
								.map(|name| (file_index, name, file))
						})
						.collect::<Result<Vec<_>>>()?;

					let children =
						self.range(record.sub_directories(), self.slots.len(), "directories")?;
					work.push(Step::Assemble {
						index,
						name,
						files,
						children: children.clone(),
					});
					work.extend(children.rev().map(Step::Enter));
				}
				Step::Assemble {
					index,
					name,
					files,
					children,
				} => {
					let sub_directories = children
						.map(|child| match &self.slots[child] {
							Slot::Resolved(dir) => Ok(Rc::clone(dir)),
							_ => Err(Error::from(ErrorKind::CyclicManifest { index: child })),
						})
						.collect::<Result<Vec<_>>>()?;

					let dir = Directory::assemble(index, name, files, sub_directories);
					self.slots[index] = Slot::Resolved(dir);
				}
			}
		}

		match &self.slots[index] {
			Slot::Resolved(dir) => Ok(Rc::clone(dir)),
			_ => Err(ErrorKind::CyclicManifest { index }.into()),
		}
	}

	fn string(&self, index: u32) -> Result<String> {
		self.tables
			.strings
			.get(index as usize)
			.cloned()
			.ok_or_else(|| {
				ErrorKind::TruncatedManifest {
					table: "strings",
					end: u64::from(index) + 1,
					len: self.tables.strings.len(),
				}
				.into()
			})
	}

	fn range(
		&self,
		range: std::result::Result<Range<usize>, u64>,
		len: usize,
		table: &'static str,
	) -> Result<Range<usize>> {
		match range {
			Ok(range) if range.end <= len => Ok(range),
			Ok(range) => Err(ErrorKind::TruncatedManifest {
				table,
				end: range.end as u64,
				len,
			}
			.into()),
			Err(end) => Err(ErrorKind::TruncatedManifest { table, end, len }.into()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::format::{ContentHash, DirectoryRecord, Flags};

	fn named(name_index: u32) -> DirectoryRecord {
		DirectoryRecord {
			name_index,
			sub_directory_start: 0,
			sub_directory_count: 0,
			file_start: 0,
			file_count: 0,
		}
	}

	fn file(name_index: u32) -> FileRecord {
		FileRecord {
			name_index,
			version: 1,
			hash: ContentHash::default(),
			flags: Flags(0),
			size: 0,
			compressed_size: 0,
			unknown: 0,
			kind: 0,
			unknown1: 0,
			unknown2: 0,
		}
	}

	fn tables(directories: Vec<DirectoryRecord>, files: Vec<FileRecord>) -> FlatTables {
		FlatTables {
			directories,
			files,
			strings: ["root", "sub", "leaf", "a.dds", "b.dds"]
				.map(String::from)
				.to_vec(),
			..Default::default()
		}
	}

	#[test]
	fn resolves_nested_tree_in_order() {
		let tables = tables(
			vec![
				DirectoryRecord {
					sub_directory_start: 1,
					sub_directory_count: 1,
					file_start: 0,
					file_count: 1,
					..named(0)
				},
				DirectoryRecord {
					sub_directory_start: 2,
					sub_directory_count: 1,
					file_start: 1,
					file_count: 1,
					..named(1)
				},
				named(2),
			],
			vec![file(3), file(4)],
		);

		let dirs = Resolver::new(&tables).resolve_all().unwrap();
		assert_eq!(dirs.len(), 3);

		let root = &dirs[0];
		assert_eq!(root.name, "root");
		assert_eq!(root.files[0].name, "a.dds");
		let sub = &root.sub_directories[0];
		assert_eq!(sub.name, "sub");
		assert_eq!(sub.files[0].name, "b.dds");
		assert_eq!(sub.sub_directories[0].name, "leaf");

		// shared, not rebuilt
		assert!(Rc::ptr_eq(sub, &dirs[1]));
		assert!(Rc::ptr_eq(&sub.sub_directories[0], &dirs[2]));
	}

	#[test]
	fn self_reference_is_a_cycle() {
		let tables = tables(
			vec![DirectoryRecord {
				sub_directory_start: 0,
				sub_directory_count: 1,
				..named(0)
			}],
			Vec::new(),
		);

		let err = Resolver::new(&tables).resolve_all().unwrap_err();
		assert_eq!(err.kind(), Some(ErrorKind::CyclicManifest { index: 0 }));
	}

	#[test]
	fn transitive_reference_is_a_cycle() {
		let tables = tables(
			vec![
				DirectoryRecord {
					sub_directory_start: 1,
					sub_directory_count: 1,
					..named(0)
				},
				DirectoryRecord {
					sub_directory_start: 0,
					sub_directory_count: 1,
					..named(1)
				},
			],
			Vec::new(),
		);

		let err = Resolver::new(&tables).resolve_all().unwrap_err();
		assert_eq!(err.kind(), Some(ErrorKind::CyclicManifest { index: 0 }));
	}

	#[test]
	fn shared_child_is_not_a_cycle() {
		let tables = tables(
			vec![
				DirectoryRecord {
					sub_directory_start: 1,
					sub_directory_count: 2,
					..named(0)
				},
				DirectoryRecord {
					sub_directory_start: 2,
					sub_directory_count: 1,
					..named(1)
				},
				named(2),
			],
			Vec::new(),
		);

		let dirs = Resolver::new(&tables).resolve_all().unwrap();
		assert!(Rc::ptr_eq(
			&dirs[0].sub_directories[1],
			&dirs[1].sub_directories[0]
		));
	}

	#[test]
	fn deep_chain_resolves_and_drops() {
		const DEPTH: u32 = 100_000;
		let directories = (0..DEPTH)
			.map(|index| DirectoryRecord {
				sub_directory_start: index + 1,
				sub_directory_count: u32::from(index + 1 < DEPTH),
				..named(0)
			})
			.collect();
		let tables = tables(directories, Vec::new());

		let dirs = Resolver::new(&tables).resolve_all().unwrap();
		assert_eq!(dirs.len(), DEPTH as usize);
		assert!(Rc::ptr_eq(&dirs[0].sub_directories[0], &dirs[1]));

		let root = Rc::clone(&dirs[0]);
		drop(dirs);
		let (depth, deepest) = root.walk().last().unwrap();
		assert_eq!(depth, DEPTH as usize - 1);
		assert_eq!(deepest.index, DEPTH as usize - 1);
		drop(root);
	}

	#[test]
	fn out_of_bounds_ranges_are_truncation() {
		let tables = tables(
			vec![DirectoryRecord {
				sub_directory_start: 1,
				sub_directory_count: 1,
				..named(0)
			}],
			Vec::new(),
		);
		let err = Resolver::new(&tables).resolve_all().unwrap_err();
		assert_eq!(
			err.kind(),
			Some(ErrorKind::TruncatedManifest {
				table: "directories",
				end: 2,
				len: 1
			})
		);

		let tables = self::tables(
			vec![DirectoryRecord {
				file_start: u32::MAX,
				file_count: 2,
				..named(0)
			}],
			vec![file(3)],
		);
		let err = Resolver::new(&tables).resolve_all().unwrap_err();
		assert!(matches!(
			err.kind(),
			Some(ErrorKind::TruncatedManifest { table: "files", .. })
		));
	}

	#[test]
	fn bad_name_index_is_truncation() {
		let tables = tables(vec![named(5)], Vec::new());
		let err = Resolver::new(&tables).resolve_all().unwrap_err();
		assert_eq!(
			err.kind(),
			Some(ErrorKind::TruncatedManifest {
				table: "strings",
				end: 6,
				len: 5
			})
		);
	}
}
