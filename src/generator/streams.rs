//! Named output streams with staged commit.
//!
//! A generation run writes a dozen files at once. Each stream is backed by
//! a temporary file in the destination directory. [`StreamSet::stage`]
//! flushes every stream; [`StagedStreams::persist`] then renames them into
//! place. Dropping either without persisting (any early return on error)
//! deletes every temporary, so a failed write never leaves a half-written
//! memory file behind.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::arith::Saturation;
use crate::codec::{self, ColumnOrder, FieldFormat, PackedWord};
use crate::error::Result;
use crate::matrix::Matrix;

/// Sentinel value filling end-of-matrix rows (all ones in two's complement).
pub const SENTINEL: i64 = -1;

/// A set of output files in one directory, keyed by file name.
pub struct StreamSet {
    dir: PathBuf,
    streams: BTreeMap<String, BufWriter<NamedTempFile>>,
}

impl StreamSet {
    /// Create the directory if needed. No files are opened yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            streams: BTreeMap::new(),
        })
    }

    /// Writer for `name`, opened on first use.
    pub fn writer(&mut self, name: &str) -> Result<&mut BufWriter<NamedTempFile>> {
        Ok(match self.streams.entry(name.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(BufWriter::new(NamedTempFile::new_in(&self.dir)?)),
        })
    }

    /// Append one line.
    pub fn write_line(&mut self, name: &str, line: &str) -> Result<()> {
        writeln!(self.writer(name)?, "{}", line)?;
        Ok(())
    }

    /// Append `m` as whitespace-separated decimal rows.
    pub fn write_decimal(&mut self, name: &str, m: &Matrix) -> Result<()> {
        let w = self.writer(name)?;
        for row in m.iter_rows() {
            let tokens: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(w, "{}", tokens.join(" "))?;
        }
        Ok(())
    }

    /// Append `m` followed by one full-width sentinel row.
    pub fn write_decimal_terminated(&mut self, name: &str, m: &Matrix) -> Result<()> {
        self.write_decimal(name, m)?;
        self.write_decimal(name, &Matrix::filled(1, m.cols(), SENTINEL))
    }

    /// Append `m` as fixed-digit two's-complement rows.
    pub fn write_hex(
        &mut self,
        name: &str,
        m: &Matrix,
        sat: Saturation,
        order: ColumnOrder,
    ) -> Result<()> {
        let w = self.writer(name)?;
        for row in m.iter_rows() {
            writeln!(w, "{}", codec::encode_row(row, sat, FieldFormat::Hex, order)?)?;
        }
        Ok(())
    }

    /// Append `m` as one packed decimal word per row.
    pub fn write_packed(&mut self, name: &str, m: &Matrix, sat: Saturation) -> Result<()> {
        let w = self.writer(name)?;
        for row in m.iter_rows() {
            writeln!(w, "{}", PackedWord::pack(row, sat)?)?;
        }
        Ok(())
    }

    /// Flush every stream without moving anything into place.
    pub fn stage(self) -> Result<StagedStreams> {
        let mut staged = StagedStreams::default();
        for (name, writer) in self.streams {
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            staged.files.push((self.dir.join(&name), file));
        }
        Ok(staged)
    }

    /// Stage and persist in one step.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        self.stage()?.persist()
    }
}

/// Fully written temporaries waiting to be renamed to their final paths.
#[derive(Default)]
pub struct StagedStreams {
    files: Vec<(PathBuf, NamedTempFile)>,
}

impl StagedStreams {
    /// Take over the files staged by another set.
    pub fn extend(&mut self, other: StagedStreams) {
        self.files.extend(other.files);
    }

    /// Rename every file into place.
    ///
    /// Renames run one at a time. If one fails, files renamed before it stay
    /// in place and the remaining temporaries are deleted.
    pub fn persist(self) -> Result<Vec<PathBuf>> {
        let mut committed = Vec::with_capacity(self.files.len());
        for (path, file) in self.files {
            file.persist(&path).map_err(|e| e.error)?;
            log::debug!("Committed {}", path.display());
            committed.push(path);
        }
        Ok(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = StreamSet::new(dir.path()).unwrap();
        let m = Matrix::from_rows(&[[1, -2], [3, 4]]).unwrap();
        set.write_decimal_terminated("a.txt", &m).unwrap();
        set.write_line("b.txt", "hello").unwrap();

        let paths = set.commit().unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "1 -2\n3 4\n-1 -1\n"
        );
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "hello\n");
    }

    #[test]
    fn test_drop_without_commit_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut set = StreamSet::new(dir.path()).unwrap();
            set.write_line("a.txt", "partial").unwrap();
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_staged_files_appear_only_on_persist() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("case");

        let mut first = StreamSet::new(dir.path()).unwrap();
        first.write_line("a.txt", "a").unwrap();
        let mut second = StreamSet::new(&sub).unwrap();
        second.write_line("b.txt", "b").unwrap();

        let mut staged = first.stage().unwrap();
        staged.extend(second.stage().unwrap());
        assert!(!dir.path().join("a.txt").exists());
        assert!(!sub.join("b.txt").exists());

        let paths = staged.persist().unwrap();
        assert_eq!(paths, vec![dir.path().join("a.txt"), sub.join("b.txt")]);
        assert_eq!(fs::read_to_string(sub.join("b.txt")).unwrap(), "b\n");
    }

    #[test]
    fn test_dropped_stage_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = StreamSet::new(dir.path()).unwrap();
        set.write_line("a.txt", "a").unwrap();
        drop(set.stage().unwrap());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_hex_and_packed() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = StreamSet::new(dir.path()).unwrap();
        let m = Matrix::from_rows(&[[1, -1]]).unwrap();
        set.write_hex("m.hex", &m, Saturation::int8(), ColumnOrder::MsbFirst).unwrap();
        set.write_packed("m.dma", &m, Saturation::int8()).unwrap();
        set.commit().unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("m.hex")).unwrap(), "ff01\n");
        assert_eq!(fs::read_to_string(dir.path().join("m.dma")).unwrap(), "65281\n");
    }

    #[test]
    fn test_encoding_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = StreamSet::new(dir.path()).unwrap();
        let m = Matrix::from_rows(&[[500]]).unwrap();
        assert!(set.write_hex("m.hex", &m, Saturation::int8(), ColumnOrder::MsbFirst).is_err());
    }
}
