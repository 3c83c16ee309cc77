use std::fs;

use miette::IntoDiagnostic;
use relman::{decode_file, DecodeOptions, RenderOptions, VersionPolicy};
use tracing::info;

use crate::args::Args;

impl Args {
	fn decode_options(&self) -> DecodeOptions {
		let version_policy = match (self.expect_version.is_empty(), self.strict_version) {
			(true, _) => VersionPolicy::AcceptAll,
			(false, false) => VersionPolicy::Warn(self.expect_version.clone()),
			(false, true) => VersionPolicy::Reject(self.expect_version.clone()),
		};

		DecodeOptions {
			version_policy,
			max_entries: self.max_entries,
		}
	}

	fn render_options(&self) -> RenderOptions {
		RenderOptions {
			detailed: self.detailed,
		}
	}
}

pub(crate) fn report(args: Args) -> miette::Result<()> {
	info!(path=?args.input, "decode release manifest");
	let manifest = decode_file(&args.input, args.decode_options())?;
	info!(version=%manifest.version, directories=%manifest.directories().len(), "decoded");

	let text = manifest.render(args.render_options());
	info!(path=?args.output, bytes=%text.len(), "write output");
	fs::write(&args.output, text).into_diagnostic()?;

	println!("Finished parsing Release Manifest.");
	Ok(())
}
