pub(crate) const HELP_TOKEN: &str = "--help";
pub(crate) const HELP_SHORT_TOKEN: &str = "-h";
pub(crate) const SEPARATOR: &str = "--";

// Config file discovery: `<program><suffix>` for each suffix, then the shared name.
pub(crate) const CONFIG_SUFFIXES: [&str; 2] = [".json", ".config.json"];
pub(crate) const CONFIG_SHARED_NAME: &str = "config.json";
pub(crate) const CONFIG_DEFAULT_DIRS: [&str; 2] = [".", "./config"];
pub(crate) const CONFIG_ALLOWED_DIRS: [&str; 3] = ["/tmp", "/opt", "/etc"];
pub(crate) const HOME_VARIABLE: &str = "HOME";

// Help rendering.
pub(crate) const HELP_LEFT_WIDTH: usize = 30;
pub(crate) const MINIMUM_USAGE_WIDTH: usize = 17;
