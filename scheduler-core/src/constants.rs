//! Fixed values shared across the crate.

/// Base URL of the hosted schedule API.
pub const DEFAULT_API_BASE_URL: &str = "https://thws-scheduler.azurewebsites.net/api";

/// Time zone that timestamps without an offset are interpreted in.
pub const DEFAULT_TIMEZONE: &str = "Europe/Berlin";

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const METADATA_PATH: &str = "course_scraper";
pub const SCHEDULE_PATH: &str = "schedule_scraper";
pub const AUTH_PATH: &str = "auth";

/// Name used for the config directory and the ICS product id.
pub const APP_DIR_NAME: &str = "thws-scheduler";

pub const ICS_PRODUCT_ID: &str = "-//THWS Scheduler//DE";

/// Suffix appended to every ICS UID.
pub const ICS_UID_DOMAIN: &str = "thws-scheduler";

/// Shown when the session carries no username.
pub const DEFAULT_DISPLAY_NAME: &str = "Benutzer";
