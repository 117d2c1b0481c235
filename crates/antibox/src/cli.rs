//! Clap derive structures for the `antibox` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// antibox -- keep Altibox port-forwarding rules pointed at the right device
#[derive(Debug, Parser)]
#[command(
    name = "antibox",
    version,
    about = "Point an Altibox firewall rule at a LAN device's current address",
    long_about = "Looks up a device on the Altibox gateway by hostname or MAC address and \
        rebinds the named port-forwarding rule to the device's current IP when it has \
        drifted.\n\n\
        Credentials are read from ALTIBOX_USER / ALTIBOX_PASS, the system keyring \
        (service `antibox`, entry `<username>/password`) or the config file.",
    after_help = "Examples:\n  \
        antibox -h mediaserver -r plex_rule\n  \
        antibox -m 4A:DA:61:1C:B5:24 -r vpn_rule -v DEBUG\n  \
        antibox -a 'mediaserver||plex_rule,|4A:DA:61:1C:B5:24|vpn_rule'",
    disable_help_flag = true
)]
pub struct Cli {
    /// Find the device by hostname
    #[arg(short = 'h', long, env = "DEVICE_NAME", value_name = "HOSTNAME")]
    pub hostname: Option<String>,

    /// Find the device by MAC address
    #[arg(short = 'm', long, env = "DEVICE_MAC", value_name = "MAC_ADDRESS")]
    pub mac: Option<String>,

    /// Name of the rule to modify
    #[arg(short = 'r', long, env = "RULE_NAME", value_name = "RULE_NAME")]
    pub rule: Option<String>,

    /// Batch of `hostname|mac|rule` entries separated by commas
    #[arg(short = 'a', long = "all", env = "ANTIBOX_ALL", value_name = "LIST")]
    pub all: Option<String>,

    /// Log verbosity [ERROR, INFO, DEBUG]
    #[arg(short = 'v', long, env = "VERBOSITY", value_name = "LEVEL")]
    pub verbosity: Option<String>,

    /// Directory that receives antibox.log (default: current directory)
    #[arg(short = 'l', long, env = "LOGPATH", value_name = "DIR")]
    pub logpath: Option<PathBuf>,

    /// Altibox site (location) id
    #[arg(long, env = "ALTIBOX_SITE_ID", value_name = "ID")]
    pub site_id: Option<String>,

    /// API root
    #[arg(long, env = "ALTIBOX_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "ALTIBOX_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Config file (default: platform config dir)
    #[arg(long, env = "ANTIBOX_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

/// The CLI with every `env` fallback switched off.
#[cfg(test)]
fn command_without_env() -> clap::Command {
    use clap::CommandFactory;

    Cli::command().mut_args(|arg| arg.env(None::<&'static str>))
}

/// Parse `args` as flags only, ignoring `DEVICE_NAME`, `VERBOSITY`,
/// `ALTIBOX_*` and friends in the calling environment.
#[cfg(test)]
pub(crate) fn parse_flags<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    use clap::FromArgMatches;

    let matches = command_without_env().try_get_matches_from(args)?;
    Cli::from_arg_matches(&matches)
}
