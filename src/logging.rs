use std::error::Error;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

use jiff::Zoned;
use log::LevelFilter;

/// Writes every log record to the run's log file and mirrors it to stderr.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write_all(buf)?;
        io::stderr().write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        io::stderr().flush()
    }
}

/// Create `logs/` if absent and start logging to
/// `logs/sgx_download_<YYYYMMDD_HHMMSS>.log`, one file per run, never
/// rotated or cleaned.  Returns the log file path.
pub fn init() -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all("logs")?;
    let stamp = Zoned::now().strftime("%Y%m%d_%H%M%S");
    let path = PathBuf::from(format!("logs/sgx_download_{}.log", stamp));
    let file = File::create(&path)?;
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .target(env_logger::Target::Pipe(Box::new(Tee { file })))
        .try_init()?;
    Ok(path)
}
