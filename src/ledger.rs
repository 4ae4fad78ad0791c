use std::collections::HashSet;
use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The set of filenames already downloaded successfully, persisted as a flat
/// text file with one filename per line.  Append-only; entries are never
/// removed or rewritten.
///
/// Single-process, single-threaded use only.  Two processes writing the same
/// ledger file is undefined behavior.
pub struct DownloadLedger {
    path: PathBuf,
    names: HashSet<String>,
}

impl DownloadLedger {
    /// Read the ledger file, one trimmed non-empty line per entry.  A missing
    /// file is an empty ledger, not an error.
    pub fn load(path: &Path) -> Result<DownloadLedger, Box<dyn Error>> {
        let names = match fs::read_to_string(path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(Box::new(e)),
        };
        Ok(DownloadLedger {
            path: path.to_path_buf(),
            names,
        })
    }

    /// The sole gate for skip-vs-download decisions.
    pub fn contains(&self, filename: &str) -> bool {
        self.names.contains(filename)
    }

    /// Insert the name in the in-memory set and append a line to the ledger
    /// file, creating it if absent.  A name already in the set is not
    /// appended again.
    pub fn record(&mut self, filename: &str) -> Result<(), Box<dyn Error>> {
        if !self.names.insert(filename.to_owned()) {
            return Ok(());
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", filename)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
