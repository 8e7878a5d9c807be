//! Central place for all transfer defaults.
//! Update these and the whole tool picks them up.

pub struct Defaults;

impl Defaults {
    /* Store command */
    pub const STORE_BIN: &'static str = "credstash";
    pub const STORE_BIN_ENV: &'static str = "CREDSTASH_BIN";

    /* Store command arguments */
    pub const ARG_TABLE: &'static str = "-t";
    pub const ARG_REGION: &'static str = "-r";
    pub const ACTION_GETALL: &'static str = "getall";
    pub const ACTION_PUT: &'static str = "put";
    pub const ACTION_DELETE: &'static str = "delete";
    pub const END_OF_OPTIONS: &'static str = "--";

    /* Exit statuses */
    pub const EXIT_FAILURE: u8 = 1;
    pub const EXIT_INVALID_ARGUMENTS: u8 = 2;
    pub const EXIT_FETCH_FAILED: u8 = 2;

    /* Logging */
    pub const LOG_LEVEL: &'static str = "info";
}
