//! Wire constants of the packages API

/// Path prefix under which every package endpoint lives
pub const PACKAGE_LIST_PATH: &str = "/api/v2/packages/";

/// Query parameter restricting results to installed packages
pub const INSTALLED_ONLY_PARAM: &str = "installed_only";

/// JSON body returned for accepted install/uninstall requests
pub const ACCEPTED_BODY: &str = "Accepted";
