//! Review scraping: the `tweet-harvest` child process, CSV tables, job
//! metadata and object storage.

pub mod csv_io;
pub mod error;
pub mod events;
pub mod harvest;
pub mod jobs;
pub mod names;
pub mod scrape;
pub mod storage;

pub use csv_io::{read_rows, read_rows_from_path, write_rows};
pub use error::ScraperError;
pub use events::{EventSink, JobEvent, ScrapeSummary, EVENT_BUFFER};
pub use harvest::{HarvestArgs, Harvester, Tab};
pub use jobs::{validate_job_id, JobMeta, JobStore};
pub use names::{download_file_name, job_file_name, sanitize_file_name};
pub use scrape::{ScrapeRequest, Scraper};
pub use storage::{
    validate_file_id, AppwriteStore, FileInfo, LocalStore, ObjectStore, StoredFile,
};
