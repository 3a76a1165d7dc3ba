//! Output paths and staged writes.
//!
//! Every artifact is written to a temporary file in its final directory and
//! renamed into place once complete. A failed run leaves nothing at the
//! final path.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::warn;

/// Extension of the I/Q stream.
pub const STREAM_EXTENSION: &str = "c16";

/// Extension of the sidecar metadata.
pub const METADATA_EXTENSION: &str = "txt";

/// Final locations of the two artifacts of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// `<stem>.c16`
    pub stream: PathBuf,
    /// `<stem>.txt`
    pub metadata: PathBuf,
}

impl OutputPaths {
    /// Paths for `input`, placed in `out_dir` or next to the input.
    pub fn for_input(input: &Path, out_dir: Option<&Path>) -> Self {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let dir = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        // Appended rather than `with_extension` so dotted stems survive.
        Self {
            stream: dir.join(format!("{}.{}", stem, STREAM_EXTENSION)),
            metadata: dir.join(format!("{}.{}", stem, METADATA_EXTENSION)),
        }
    }

    /// Paths named by an explicit output base.
    ///
    /// A trailing `.c16` or `.txt` on `base` is replaced; any other
    /// extension is kept as part of the stem.
    pub fn from_base(base: &Path) -> Self {
        let stem = match base.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext == STREAM_EXTENSION || ext == METADATA_EXTENSION => {
                base.with_extension("")
            }
            _ => base.to_path_buf(),
        };
        let mut stream = stem.clone().into_os_string();
        stream.push(".");
        stream.push(STREAM_EXTENSION);
        let mut metadata = stem.into_os_string();
        metadata.push(".");
        metadata.push(METADATA_EXTENSION);
        Self {
            stream: stream.into(),
            metadata: metadata.into(),
        }
    }

    /// Directory both artifacts live in.
    pub fn dir(&self) -> &Path {
        self.stream.parent().unwrap_or_else(|| Path::new(""))
    }
}

/// Where a run places its artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputLocation {
    /// Next to each input.
    #[default]
    NextToInput,
    /// Inside one directory, named after each input.
    Dir(PathBuf),
    /// Exactly `<base>.c16` and `<base>.txt`, for a single input.
    Base(PathBuf),
}

impl OutputLocation {
    /// Interprets an `--output` argument.
    ///
    /// A single input file gets `output` as its base name unless `output`
    /// is an existing directory or ends in a path separator. Any other run
    /// treats it as a directory.
    pub fn from_arg(output: Option<PathBuf>, inputs: &[PathBuf]) -> Self {
        let Some(output) = output else {
            return OutputLocation::NextToInput;
        };
        let names_dir = output.is_dir()
            || output
                .as_os_str()
                .to_string_lossy()
                .ends_with(std::path::is_separator);
        match inputs {
            [single] if !single.is_dir() && !names_dir => OutputLocation::Base(output),
            _ => OutputLocation::Dir(output),
        }
    }

    /// Output paths for one input.
    pub fn paths_for(&self, input: &Path) -> OutputPaths {
        match self {
            OutputLocation::NextToInput => OutputPaths::for_input(input, None),
            OutputLocation::Dir(dir) => OutputPaths::for_input(input, Some(dir)),
            OutputLocation::Base(base) => OutputPaths::from_base(base),
        }
    }
}

/// Creates a temporary file in the directory of `target`.
pub fn stage_for(target: &Path) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    tempfile::Builder::new()
        .prefix(".subiq-")
        .suffix(".part")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))
}

/// Flushes a staged file to disk and renames it to `target`.
pub fn commit(staged: NamedTempFile, target: &Path) -> Result<()> {
    staged
        .as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync {}", target.display()))?;
    staged
        .persist(target)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write output file: {}", target.display()))?;
    Ok(())
}

/// Stages `bytes` for `target` without committing them.
pub fn stage_bytes(target: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let mut staged = stage_for(target)?;
    staged
        .write_all(bytes)
        .with_context(|| format!("Failed to write output file: {}", target.display()))?;
    Ok(staged)
}

/// Commits a fully staged stream and sidecar.
///
/// The stream is renamed first. If the sidecar then cannot be moved into
/// place the stream is removed again, so a conversion either leaves both
/// artifacts or neither.
pub fn commit_pair(
    stream: NamedTempFile,
    metadata: NamedTempFile,
    paths: &OutputPaths,
) -> Result<()> {
    commit(stream, &paths.stream)?;
    if let Err(e) = commit(metadata, &paths.metadata) {
        if let Err(remove) = fs::remove_file(&paths.stream) {
            warn!(
                path = %paths.stream.display(),
                error = %remove,
                "failed to remove stream after sidecar error"
            );
        }
        return Err(e);
    }
    Ok(())
}
