use log::{error, info};
use reqwest::blocking::Client;

use crate::download::{days_in_range, parse_yyyymmdd, SgxTickArchive};
use crate::ledger::DownloadLedger;
use crate::settings::Settings;

/// Dispatch on the resolved parameters: a single-date run, a ranged run, or
/// a validation failure with zero downloads attempted.  Returns the process
/// exit code: 1 for a reversed range or a setup failure, 0 otherwise —
/// individual file failures are logged, not surfaced as exit status.
///
/// `base_url` is the SGX endpoint for production and a local server in
/// tests.
pub fn run(settings: &Settings, base_url: &str) -> u8 {
    let record_file = settings.output_dir.join("downloaded_files.txt");
    let mut ledger = match DownloadLedger::load(&record_file) {
        Ok(ledger) => ledger,
        Err(e) => {
            error!("failed to load {}: {}", record_file.display(), e);
            return 1;
        }
    };
    // the blocking client defaults to a 30s timeout; the SGX tick archives
    // can take longer than that, so turn it off
    let client = match Client::builder().timeout(None).build() {
        Ok(client) => client,
        Err(e) => {
            error!("failed to build the http client: {}", e);
            return 1;
        }
    };
    let archive = SgxTickArchive {
        base_url: base_url.to_owned(),
        out_dir: settings.output_dir.clone(),
        redownload: settings.redownload,
    };

    if let Some(date) = &settings.date {
        // not validated; a malformed date 404s per file, logged and skipped
        archive.download_for_date(&client, &mut ledger, date);
        0
    } else if let (Some(start), Some(end)) = (&settings.start_date, &settings.end_date) {
        let start = match parse_yyyymmdd(start) {
            Ok(date) => date,
            Err(e) => {
                error!("{}", e);
                return 0;
            }
        };
        let end = match parse_yyyymmdd(end) {
            Ok(date) => date,
            Err(e) => {
                error!("{}", e);
                return 0;
            }
        };
        if start > end {
            error!("start date cannot be after end date");
            return 1;
        }
        for day in days_in_range(start, end) {
            let date_str = day.strftime("%Y%m%d").to_string();
            info!("===== processing date: {} =====", date_str);
            archive.download_for_date(&client, &mut ledger, &date_str);
        }
        0
    } else {
        error!("you must specify --date or both --start-date and --end-date");
        0
    }
}
