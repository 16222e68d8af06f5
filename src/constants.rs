/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

pub(crate) const DEFAULT_BASE_URL: &str = "https://portalpacjenta.luxmed.pl/PatientPortal";
pub(crate) const LOGIN_PATH: &str = "/Account/LogIn";
pub(crate) const USER_PROFILE_PATH: &str = "/NewPortal/UserProfile/GetUser";
pub(crate) const TERMS_SEARCH_PATH: &str = "/NewPortal/terms/index";

pub(crate) const DEFAULT_REQUEST_TIMEOUT: u64 = 15;
pub(crate) const DEFAULT_PROBE_GRACE: u64 = 30;
/// Seconds a delivered notification suppresses identical ones.
pub(crate) const DEFAULT_DEDUP_RETENTION: u64 = 24 * 60 * 60;
pub(crate) const DEFAULT_CHECK_INTERVAL: u64 = 300;
pub(crate) const DEFAULT_COOKIE_FILE: &str = "cookies.json";
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

pub(crate) const USER_AGENT: &str = concat!("luxmed-checker/", env!("CARGO_PKG_VERSION"));
