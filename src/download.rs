use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use jiff::civil::Date;
use jiff::ToSpan;
use log::{error, info};
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::ledger::DownloadLedger;

pub const SGX_BASE_URL: &str = "https://links.sgx.com/1.0.0/derivatives-web/tick-download";

/// One file to fetch: the local filename and the URL it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFile {
    pub filename: String,
    pub url: String,
}

/// The result of one download attempt, end-to-end: a non-200 status is an
/// `HttpError`; a connect, DNS, body-read or disk-write failure is a
/// `TransportError`.
#[derive(Debug)]
pub enum FetchOutcome {
    Success,
    HttpError { status: StatusCode },
    TransportError { detail: Box<dyn Error> },
}

/// The SGX derivatives tick-download page.  Four files per trading day, two
/// date-stamped and two static structure-definition files.
#[derive(Clone)]
pub struct SgxTickArchive {
    pub base_url: String,
    pub out_dir: PathBuf,
    pub redownload: bool,
}

impl SgxTickArchive {
    /// The four target descriptors for a day, in download order.  The remote
    /// names of the two date-stamped files are lowercase; the local names
    /// follow what the unzipped SGX archive calls them.
    pub fn targets(&self, date_str: &str) -> Vec<TargetFile> {
        vec![
            TargetFile {
                filename: format!("WEBPXTICK_DT-{}.zip", date_str),
                url: format!("{}/webpxtick_dt_{}.zip", self.base_url, date_str),
            },
            TargetFile {
                filename: format!("TC_{}.txt", date_str),
                url: format!("{}/tc_{}.txt", self.base_url, date_str),
            },
            TargetFile {
                filename: "TickData_structure.dat".to_owned(),
                url: format!("{}/TickData_structure.dat", self.base_url),
            },
            TargetFile {
                filename: "TC_structure.dat".to_owned(),
                url: format!("{}/TC_structure.dat", self.base_url),
            },
        ]
    }

    /// Download the four files for one day, skipping the ones already in the
    /// ledger unless `redownload` is set.  A failed file does not abort its
    /// siblings; it stays out of the ledger and is retried on the next run.
    ///
    /// `date_str` is YYYYMMDD but is not validated; a malformed date builds
    /// URLs that 404, which is logged and skipped.
    pub fn download_for_date(&self, client: &Client, ledger: &mut DownloadLedger, date_str: &str) {
        for target in self.targets(date_str) {
            if ledger.contains(&target.filename) && !self.redownload {
                info!("skipping {} (already downloaded)", target.filename);
                continue;
            }
            info!("downloading {}", target.filename);
            let save_path = self.out_dir.join(&target.filename);
            match fetch(client, &target.url, &save_path) {
                FetchOutcome::Success => {
                    info!("saved to {}", save_path.display());
                    if let Err(e) = ledger.record(&target.filename) {
                        error!("failed to record {} in the ledger: {}", target.filename, e);
                    }
                }
                FetchOutcome::HttpError { status } => {
                    error!("failed to download {}, status: {}", target.filename, status);
                }
                FetchOutcome::TransportError { detail } => {
                    error!("error downloading {}: {}", target.filename, detail);
                }
            }
        }
    }
}

/// GET the url and write the full response body to `path`, overwriting any
/// existing file.  No special headers, no timeout, no retry.
pub fn fetch(client: &Client, url: &str, path: &Path) -> FetchOutcome {
    let response = match client.get(url).send() {
        Ok(r) => r,
        Err(e) => {
            return FetchOutcome::TransportError {
                detail: Box::new(e),
            }
        }
    };
    if response.status() != StatusCode::OK {
        return FetchOutcome::HttpError {
            status: response.status(),
        };
    }
    let body = match response.bytes() {
        Ok(b) => b,
        Err(e) => {
            return FetchOutcome::TransportError {
                detail: Box::new(e),
            }
        }
    };
    if let Err(e) = File::create(path).and_then(|mut out| out.write_all(&body)) {
        return FetchOutcome::TransportError {
            detail: Box::new(e),
        };
    }
    FetchOutcome::Success
}

#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub struct ParseDateError(pub String);

/// Strict YYYYMMDD: eight ASCII digits naming a real calendar date.
pub fn parse_yyyymmdd(s: &str) -> Result<Date, ParseDateError> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseDateError(format!(
            "invalid date '{}', expected YYYYMMDD",
            s
        )));
    }
    let year = s[0..4].parse::<i16>().unwrap();
    let month = s[4..6].parse::<i8>().unwrap();
    let day = s[6..8].parse::<i8>().unwrap();
    Date::new(year, month, day).map_err(|e| ParseDateError(format!("invalid date '{}': {}", s, e)))
}

/// Every calendar day from `start` to `end` inclusive, ascending.  Empty
/// when `start > end`.
pub fn days_in_range(start: Date, end: Date) -> Vec<Date> {
    start.series(1.day()).take_while(|day| *day <= end).collect()
}
