use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use simplepay_common::HostFamily;

/// Replay a scripted checkout session against a simulated host page.
#[derive(Parser, Debug)]
#[command(name = "simplepay-sim", version, about)]
pub struct Args {
    /// JSON script to replay. Runs the built-in demo when omitted.
    #[arg(short = 's', long)]
    pub script: Option<PathBuf>,

    /// Host platform family to simulate.
    #[arg(short = 'f', long, value_enum, default_value_t = Family::Ios)]
    pub family: Family,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Answer "no" to the cancel confirmation.
    #[arg(long)]
    pub decline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Family {
    Android,
    Ios,
    Browser,
}

impl From<Family> for HostFamily {
    fn from(family: Family) -> Self {
        match family {
            Family::Android => HostFamily::Android,
            Family::Ios => HostFamily::Ios,
            Family::Browser => HostFamily::Browser,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["simplepay-sim"]);
        assert_eq!(args.family, Family::Ios);
        assert!(args.script.is_none());
        assert!(!args.decline);
    }

    #[test]
    fn family_flag() {
        let args = Args::parse_from(["simplepay-sim", "--family", "android", "--decline"]);
        assert_eq!(HostFamily::from(args.family), HostFamily::Android);
        assert!(args.decline);
    }
}
