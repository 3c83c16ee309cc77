use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

/// Default output file, written in the current directory.
pub const DEFAULT_OUTPUT: &str = "release_manifest.txt";

/// Decode a release manifest and write it out as text.
#[derive(Debug, Clone, Parser)]
#[command(
	name = "relman",
	bin_name = "relman",
	author,
	version,
	after_help = "Want more detail? Try the long '--help' flag!",
	after_long_help = "Didn't expect this much output? Use the short '-h' flag to get short help."
)]
#[cfg_attr(debug_assertions, command(before_help = "⚠ DEBUG BUILD ⚠"))]
pub struct Args {
	/// Release manifest to decode.
	#[arg(
		value_hint = ValueHint::FilePath,
		value_name = "PATH",
	)]
	pub input: PathBuf,

	/// Where to write the text output.
	#[arg(
		value_hint = ValueHint::AnyPath,
		value_name = "PATH",
		default_value = DEFAULT_OUTPUT,
	)]
	pub output: PathBuf,

	/// Include every file attribute in the output, not just names.
	#[arg(long)]
	pub detailed: bool,

	/// Manifest version to expect.
	///
	/// Can be given multiple times. Other versions are decoded anyway with a warning, unless
	/// '--strict-version' is given.
	#[arg(long, value_name = "VERSION")]
	pub expect_version: Vec<u32>,

	/// Refuse manifest versions not given with '--expect-version'.
	#[arg(long, requires = "expect_version")]
	pub strict_version: bool,

	/// Maximum number of entries in any table of the manifest.
	#[arg(long, value_name = "COUNT")]
	pub max_entries: Option<usize>,

	/// Set diagnostic log level.
	///
	/// This enables diagnostic logging, which is useful for investigating bugs. Use multiple
	/// times to increase verbosity.
	///
	/// You may want to use with '--log-file' to avoid polluting your terminal.
	///
	/// Setting $RUST_LOG also works, and takes precedence, but is not recommended unless you know
	/// what you're doing.
	#[arg(long, short, action = ArgAction::Count)]
	pub verbose: u8,

	/// Write diagnostic logs to a file.
	///
	/// This writes diagnostic logs to a file, instead of the terminal, in JSON format. If a
	/// directory is given, a timestamped file is created in it.
	#[arg(long,
		value_hint = ValueHint::AnyPath,
		value_name = "PATH",
	)]
	pub log_file: Option<PathBuf>,
}
