///! # CLI - binpkg
///!
///! Packages multiple files into a single file, or lists the directory of an
///! existing package.
///!
///! ## Usage
///!
///! ```text
///! binpkg --version | -v
///! binpkg -h
///! binpkg [-V...] -o OUTFILE FILES...
///! binpkg -l PACKAGE
///! ```
///!
///! ## Configuration
///!
///! ```text
///! BINPKG_OUTPUT          default for -o/--output
///! BINPKG_FORMAT_VERSION  default for --format-version  (default: 0)
///! RUST_LOG               overrides the log filter chosen by -V
///! ```
///!
///! ## Example
///!
///! ```text
///! $ binpkg -V -o assets.pkg logo.png readme.txt
///! [INFO  binpkg::pack] logo.png: 5120
///! [INFO  binpkg::pack] readme.txt: 311
///! packed 2 file(s) into assets.pkg (5480 bytes)
///! $ binpkg -l assets.pkg
///! version: 0
///!         49       5120 logo.png
///!       5169        311 readme.txt
///! (2 entries)
///! ```

mod pack;

use anyhow::Result;
use clap::Parser;
use config::{Mode, PackConfig};
use std::path::PathBuf;

/// A small, simple tool for packaging multiple files within a single file.
#[derive(Parser, Debug)]
#[command(name = "binpkg", long_about = None, disable_version_flag = true)]
struct Args {
    /// The output file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the directory of an existing package instead of packing.
    #[arg(short, long, value_name = "PACKAGE", conflicts_with = "output")]
    list: Option<PathBuf>,

    /// Verbose output. Repeat for more detail.
    #[arg(short = 'V', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Version stamp written into the package header.
    #[arg(long, allow_negative_numbers = true)]
    format_version: Option<i32>,

    /// Print the version info.
    #[arg(short = 'v', long)]
    version: bool,

    /// Files to package, in order.
    files: Vec<PathBuf>,
}

impl Args {
    /// Overlays the parsed arguments on the environment defaults.
    fn into_config(self) -> PackConfig {
        self.overlay(PackConfig::from_env())
    }

    /// The default output only applies when packing; `-l` never picks it up.
    fn overlay(self, defaults: PackConfig) -> PackConfig {
        let default_output = if self.list.is_none() {
            defaults.output
        } else {
            None
        };
        PackConfig {
            output: self.output.or(default_output),
            inputs: self.files,
            verbosity: self.verbose,
            format_version: self.format_version.unwrap_or(defaults.format_version),
            list: self.list,
        }
    }
}

fn init_logging(config: &PackConfig) {
    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.version {
        println!("binpkg {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = args.into_config();
    init_logging(&config);

    match config.validate()? {
        Mode::Pack { output, inputs } => {
            let report = pack::pack_files(&output, &inputs, config.format_version)?;
            println!(
                "packed {} file(s) into {} ({} bytes)",
                report.files,
                output.display(),
                report.total_bytes
            );
            if report.short_entries > 0 {
                log::warn!(
                    "{} file(s) shrank while packing; their regions are incomplete",
                    report.short_entries
                );
            }
        }
        Mode::List { package } => {
            let dir = pack::read_package_directory(&package)?;
            println!("version: {}", dir.version());
            for entry in &dir {
                println!(
                    "{:>10} {:>10} {}",
                    entry.offset(),
                    entry.length(),
                    entry.name_lossy()
                );
            }
            println!("({} entries)", dir.item_count());
        }
    }

    Ok(())
}
