//! Runtime configuration, read from flags with environment fallbacks
use super::error::BookingError;
use super::query::{DEFAULT_PAGE_SIZE, PageRequest};
use super::store::SledStore;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Path of the sled database directory.
    #[arg(long = "db", env = "SHAREIT_DB", default_value = "shareit.db")]
    pub db_path: PathBuf,
    /// tracing filter directive, e.g. `info` or `shareit_booking=debug`.
    #[arg(long = "log", env = "SHAREIT_LOG", default_value = "info")]
    pub log_filter: String,
    /// Page length used when a listing does not ask for one.
    #[arg(long = "page-size", env = "SHAREIT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

impl Config {
    pub fn open_store(&self) -> Result<SledStore, BookingError> {
        SledStore::open(&self.db_path)
    }

    pub fn page(&self, from: usize, size: Option<usize>) -> Result<PageRequest, BookingError> {
        PageRequest::new(from, size.unwrap_or(self.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn flags_override_defaults() {
        let harness =
            Harness::try_parse_from(["shareit", "--db", "/tmp/bookings", "--page-size", "25"])
                .unwrap();

        assert_eq!(harness.config.db_path, PathBuf::from("/tmp/bookings"));
        assert_eq!(harness.config.page(0, None).unwrap().size(), 25);
        assert_eq!(harness.config.page(3, Some(2)).unwrap().from(), 3);
    }

    #[test]
    fn zero_page_size_is_rejected_when_used() {
        let harness = Harness::try_parse_from(["shareit", "--page-size", "0"]).unwrap();
        assert!(matches!(
            harness.config.page(0, None),
            Err(BookingError::InvalidArgument(_))
        ));
    }
}
