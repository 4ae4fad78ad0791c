pub mod download;
pub mod driver;
pub mod ledger;
pub mod logging;
pub mod settings;
