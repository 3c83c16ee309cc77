//! Text rendering of a manifest.
//!
//! The output is one line per entry, indented with tabs:
//!
//! ```text
//! Release Manifest 65536
//! Directories:
//! root
//! Files:
//! 	a.dds
//! Sub Directories:
//! 	data
//! 	Files:
//! 		b.dds
//!
//! ```

use std::fmt::{self, Write};

use crate::{
	manifest::Manifest,
	tree::{Directory, File},
};

/// Rendering configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
	/// Include every file attribute, not just the name.
	pub detailed: bool,
}

/// Render a manifest as text.
pub fn render(manifest: &Manifest, options: RenderOptions) -> String {
	manifest.render(options)
}

/// A manifest paired with options, ready for display.
#[derive(Clone, Copy, Debug)]
pub struct Rendered<'m> {
	manifest: &'m Manifest,
	options: RenderOptions,
}

impl<'m> Rendered<'m> {
	/// Pair a manifest with options.
	pub fn new(manifest: &'m Manifest, options: RenderOptions) -> Self {
		Self { manifest, options }
	}

	fn line(f: &mut fmt::Formatter<'_>, depth: usize, args: fmt::Arguments<'_>) -> fmt::Result {
		for _ in 0..depth {
			f.write_char('\t')?;
		}
		f.write_fmt(args)?;
		f.write_char('\n')
	}

	fn directory(&self, f: &mut fmt::Formatter<'_>, root: &Directory) -> fmt::Result {
		for (depth, dir) in root.walk() {
			Self::line(f, depth, format_args!("{}", dir.name))?;
			Self::line(f, depth, format_args!("Files:"))?;
			for file in &dir.files {
				self.file(f, file, depth + 1)?;
			}

			if !dir.sub_directories.is_empty() {
				Self::line(f, depth, format_args!("Sub Directories:"))?;
			}
		}

		Ok(())
	}

	fn file(&self, f: &mut fmt::Formatter<'_>, file: &File, depth: usize) -> fmt::Result {
		if self.options.detailed {
			Self::line(
				f,
				depth,
				format_args!(
					"{} (version {}, flags {}, type {}, size {}/{}, hash {})",
					file.name,
					file.version,
					file.flags,
					file.kind,
					file.size,
					file.compressed_size,
					file.hash,
				),
			)
		} else {
			Self::line(f, depth, format_args!("{}", file.name))
		}
	}
}

impl fmt::Display for Rendered<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		Self::line(f, 0, format_args!("Release Manifest {}", self.manifest.version))?;
		Self::line(f, 0, format_args!("Directories:"))?;
		for dir in self.manifest.main_directories() {
			self.directory(f, dir)?;
			f.write_char('\n')?;
		}

		Ok(())
	}
}
