//! Filesystem side of the tool: turns paths into `(name, length, source)`
//! triples for a [`Container`] and reads packages back for listing.

use anyhow::{bail, Context, Result};
use binpkg::{Container, Directory};
use log::{info, warn};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One readable input file, opened and sized.
struct InputFile {
    path: PathBuf,
    name: String,
    length: u32,
    file: File,
}

/// What a pack run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackReport {
    pub files: usize,
    pub total_bytes: u64,
    pub short_entries: usize,
}

/// Name stored for `path`: its last component, splitting on both `/` and
/// `\` so Windows-style paths behave the same on every platform.
pub fn entry_name(path: &Path) -> String {
    let full = path.to_string_lossy();
    full.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Opens every path that is a readable regular file. Others are skipped
/// with a warning.
///
/// # Errors
///
/// Returns an error if a file is too large for a 32-bit length.
fn open_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>> {
    let mut inputs = Vec::with_capacity(paths.len());

    for path in paths {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let metadata = file
            .metadata()
            .with_context(|| format!("failed to stat {}", path.display()))?;
        if !metadata.is_file() {
            warn!("skipping {}: not a regular file", path.display());
            continue;
        }

        let length = u32::try_from(metadata.len()).with_context(|| {
            format!(
                "{} is {} bytes, more than a package entry can hold",
                path.display(),
                metadata.len()
            )
        })?;
        info!("{}: {}", path.display(), length);

        inputs.push(InputFile {
            path: path.clone(),
            name: entry_name(path),
            length,
            file,
        });
    }

    Ok(inputs)
}

/// Temporary sibling of `output` the package is assembled in.
fn tmp_path(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Packs `paths` into a new package at `output`.
///
/// The package is written to `output.tmp`, synced, and renamed over
/// `output`, so a failed run never leaves a half-written package behind.
///
/// # Errors
///
/// Fails if none of the inputs could be opened, an input is too large, or on
/// any I/O error.
pub fn pack_files(output: &Path, paths: &[PathBuf], format_version: i32) -> Result<PackReport> {
    let mut inputs = open_inputs(paths)?;
    if inputs.is_empty() {
        bail!("no readable input files");
    }

    let tmp = tmp_path(output);
    let result = write_package(&tmp, &mut inputs, format_version);
    match result {
        Ok(report) => {
            fs::rename(&tmp, output).with_context(|| {
                format!("failed to move package into place at {}", output.display())
            })?;
            Ok(report)
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn write_package(tmp: &Path, inputs: &mut [InputFile], format_version: i32) -> Result<PackReport> {
    let raw_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(tmp)
        .with_context(|| format!("failed to create {}", tmp.display()))?;
    let mut out = BufWriter::new(raw_file);

    let mut pkg = Container::with_directory(&mut out, Directory::new(format_version));
    for input in inputs.iter_mut() {
        pkg.append_entry(&input.name, input.length, &mut input.file)
            .with_context(|| format!("cannot add {}", input.path.display()))?;
    }

    let summary = pkg.write_all()?;
    let report = PackReport {
        files: pkg.directory().item_count(),
        total_bytes: pkg.directory().payload_end(),
        short_entries: summary.short_entries,
    };
    drop(pkg);

    out.flush()?;
    out.into_inner()?.sync_all()?;
    Ok(report)
}

/// Reads the directory, version included, of the package at `path`.
pub fn read_package_directory(path: &Path) -> Result<Directory> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = Container::new(BufReader::new(file));
    let dir = reader
        .read_directory()
        .with_context(|| format!("failed to read directory of {}", path.display()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn entry_name_takes_last_component() {
        assert_eq!(entry_name(Path::new("a/b/c.txt")), "c.txt");
        assert_eq!(entry_name(Path::new("c.txt")), "c.txt");
        assert_eq!(entry_name(Path::new(r"dir\sub\win.bin")), "win.bin");
        assert_eq!(entry_name(Path::new(r"mixed/dir\file")), "file");
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(tmp_path(Path::new("out/x.pkg")), PathBuf::from("out/x.pkg.tmp"));
    }

    #[test]
    fn pack_then_read_back() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.txt");
        fs::write(&a, [1u8, 2, 3]).unwrap();
        fs::write(&b, b"hello").unwrap();
        let out = dir.path().join("out.pkg");

        let report = pack_files(&out, &[a, b], 4).unwrap();
        assert_eq!(report.files, 2);
        assert_eq!(report.short_entries, 0);
        assert_eq!(fs::metadata(&out).unwrap().len(), report.total_bytes);
        assert!(!tmp_path(&out).exists());

        let parsed = read_package_directory(&out).unwrap();
        assert_eq!(parsed.version(), 4);
        assert_eq!(parsed.get(0).unwrap().name(), b"a.bin");
        assert_eq!(parsed.get(1).unwrap().length(), 5);

        let bytes = fs::read(&out).unwrap();
        let at = parsed.get(1).unwrap().offset() as usize;
        assert_eq!(&bytes[at..], b"hello");
    }

    #[test]
    fn unreadable_inputs_are_skipped() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real.txt");
        fs::write(&real, b"data").unwrap();
        let missing = dir.path().join("missing.txt");
        let out = dir.path().join("out.pkg");

        let report = pack_files(&out, &[missing, dir.path().to_path_buf(), real], 0).unwrap();
        assert_eq!(report.files, 1);

        let parsed = read_package_directory(&out).unwrap();
        assert_eq!(parsed.get(0).unwrap().name(), b"real.txt");
    }

    #[test]
    fn all_inputs_unreadable_is_an_error() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.pkg");
        let err = pack_files(&out, &[dir.path().join("nope")], 0).unwrap_err();
        assert!(err.to_string().contains("no readable input files"));
        assert!(!out.exists());
    }
}
