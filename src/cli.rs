// cli.rs - Command line interface
// Purpose: clap arguments, `-il`/`-dl` short flags and target validation

use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::discover::DiscoveryPath;
use crate::runner;

/// discoveryx - ProjectDiscovery recon pipeline
#[derive(Parser, Debug)]
#[command(
    name = "discoveryx",
    version,
    about = "Chain subfinder, dnsx, naabu, httpx, katana and nuclei into one discovery run",
    after_help = r#"
DISCOVERY PATHS:

  domain:  subfinder → dnsx → naabu → httpx → katana + nuclei
  ip:                        naabu → httpx → katana + nuclei

  The run stops quietly as soon as a stage leaves an empty output file.

EXAMPLES:

    discoveryx --setup
    discoveryx -d example.com
    discoveryx -il targets.txt --docker

OUTPUT FILES:

  output/<YYYYmmddTHHMMSS>/
  ├── subfinder.txt  dnsx.txt  naabu.txt  httpx.txt
  ├── httpx_urls.txt           # url column fed to katana and nuclei
  ├── katana.txt
  └── nuclei.txt  nuclei.json
"#
)]
pub struct Args {
    /// ip address to scan (comma-separated)
    #[arg(short = 'i', long = "ip", value_name = "IP")]
    pub ip: Option<String>,

    /// list of ip addresses to scan (file); short form -il
    #[arg(long = "iplist", value_name = "FILE")]
    pub iplist: Option<PathBuf>,

    /// domain to scan (comma-separated)
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// list of domains to scan (file); short form -dl
    #[arg(long = "domainlist", value_name = "FILE")]
    pub domainlist: Option<PathBuf>,

    /// run tools via Docker containers
    #[arg(long)]
    pub docker: bool,

    /// install tools and setup environment
    #[arg(long)]
    pub setup: bool,

    /// update existing tool installs
    #[arg(long)]
    pub update: bool,

    /// show which tools are installed
    #[arg(long)]
    pub check_tools: bool,

    /// directory receiving per-run output folders
    #[arg(short = 'o', long, value_name = "DIR", default_value = "output")]
    pub output: PathBuf,

    /// enable debugging
    #[arg(long)]
    pub debug: bool,
}

/// What the scan is pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Ip(Vec<String>),
    IpList(PathBuf),
    Domain(Vec<String>),
    DomainList(PathBuf),
}

impl Target {
    pub fn discovery_path(&self) -> DiscoveryPath {
        match self {
            Target::Ip(_) | Target::IpList(_) => DiscoveryPath::Address,
            Target::Domain(_) | Target::DomainList(_) => DiscoveryPath::Domain,
        }
    }

    /// Shell command that prints the targets, one per line
    pub fn stdin_command(&self) -> String {
        match self {
            Target::Ip(values) | Target::Domain(values) => runner::echo_command(values),
            Target::IpList(file) | Target::DomainList(file) => runner::cat_command(file),
        }
    }
}

/// Requested mode of operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Setup,
    Update,
    CheckTools,
    Scan(Target),
}

/// Rejected argument combination, reported through clap's usage error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError {
    pub kind: ErrorKind,
    pub message: String,
}

impl UsageError {
    fn new(kind: ErrorKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

/// Rewrite the two-letter short flags `-il`/`-dl` to their long forms
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            match arg.to_str() {
                Some("-il") => OsString::from("--iplist"),
                Some("-dl") => OsString::from("--domainlist"),
                Some(other) if other.starts_with("-il=") => {
                    OsString::from(format!("--iplist={}", &other[4..]))
                }
                Some(other) if other.starts_with("-dl=") => {
                    OsString::from(format!("--domainlist={}", &other[4..]))
                }
                _ => arg,
            }
        })
        .collect()
}

fn split_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

impl Args {
    /// Parse the process arguments, accepting `-il`/`-dl`
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Resolve flags into one invocation. Setup/update/check skip target validation.
    pub fn invocation(&self) -> Result<Invocation, UsageError> {
        if self.setup {
            return Ok(Invocation::Setup);
        }
        if self.update {
            return Ok(Invocation::Update);
        }
        if self.check_tools {
            return Ok(Invocation::CheckTools);
        }
        self.target().map(Invocation::Scan)
    }

    pub fn target(&self) -> Result<Target, UsageError> {
        let has_domain = self.domain.is_some() || self.domainlist.is_some();
        let has_ip = self.ip.is_some() || self.iplist.is_some();

        if !has_domain && !has_ip {
            return Err(UsageError::new(
                ErrorKind::MissingRequiredArgument,
                "missing required argument(s): -i/--ip, -il/--iplist, -d/--domain, or -dl/--domainlist",
            ));
        }
        if has_domain && has_ip {
            return Err(UsageError::new(
                ErrorKind::ArgumentConflict,
                "invalid argument(s): only one type of target can be provided, ip or domain",
            ));
        }
        if self.domain.is_some() && self.domainlist.is_some() {
            return Err(UsageError::new(
                ErrorKind::ArgumentConflict,
                "invalid argument(s): only -d/--domain or -dl/--domainlist allowed",
            ));
        }
        if self.ip.is_some() && self.iplist.is_some() {
            return Err(UsageError::new(
                ErrorKind::ArgumentConflict,
                "invalid argument(s): only -i/--ip or -il/--iplist allowed",
            ));
        }

        if let Some(file) = &self.iplist {
            if !file.is_file() {
                return Err(UsageError::new(ErrorKind::InvalidValue, "invalid ip file"));
            }
            return Ok(Target::IpList(file.clone()));
        }
        if let Some(file) = &self.domainlist {
            if !file.is_file() {
                return Err(UsageError::new(ErrorKind::InvalidValue, "invalid domain file"));
            }
            return Ok(Target::DomainList(file.clone()));
        }

        let empty = || UsageError::new(ErrorKind::InvalidValue, "invalid argument(s): empty target");
        let (raw, is_ip) = match (&self.ip, &self.domain) {
            (Some(ip), _) => (ip, true),
            (None, Some(domain)) => (domain, false),
            (None, None) => return Err(empty()),
        };
        let values = split_targets(raw);
        if values.is_empty() {
            return Err(empty());
        }

        Ok(if is_ip { Target::Ip(values) } else { Target::Domain(values) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["discoveryx"];
        full.extend_from_slice(argv);
        Args::parse_from(normalize_args(full))
    }

    #[test]
    fn test_normalize_two_letter_flags() {
        let args = normalize_args(["discoveryx", "-il", "a.txt", "-dl=b.txt", "-d", "x"]);
        assert_eq!(args, ["discoveryx", "--iplist", "a.txt", "--domainlist=b.txt", "-d", "x"]);
    }

    #[test]
    fn test_each_single_family_is_accepted() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("targets.txt");
        fs::write(&list, "example.com\n").unwrap();
        let list = list.to_str().unwrap();

        assert_eq!(parse(&["-i", "10.0.0.1"]).target(), Ok(Target::Ip(vec!["10.0.0.1".into()])));
        assert_eq!(
            parse(&["-d", "example.com"]).target(),
            Ok(Target::Domain(vec!["example.com".into()]))
        );
        assert_eq!(parse(&["-il", list]).target(), Ok(Target::IpList(list.into())));
        assert_eq!(parse(&["-dl", list]).target(), Ok(Target::DomainList(list.into())));
    }

    #[test]
    fn test_conflicting_families_are_rejected() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("targets.txt");
        fs::write(&list, "x\n").unwrap();
        let list = list.to_str().unwrap();

        let rejected: [&[&str]; 7] = [
            &[],
            &["-i", "1.1.1.1", "-d", "a.com"],
            &["-il", list, "-dl", list],
            &["-i", "1.1.1.1", "-dl", list],
            &["-d", "a.com", "-dl", list],
            &["-i", "1.1.1.1", "-il", list],
            &["--docker", "--debug"],
        ];
        for argv in rejected {
            assert!(parse(argv).target().is_err(), "accepted {:?}", argv);
        }
    }

    #[test]
    fn test_usage_error_kinds() {
        let missing = parse(&["--docker"]).target().unwrap_err();
        assert_eq!(missing.kind, ErrorKind::MissingRequiredArgument);
        assert!(missing.message.starts_with("missing required argument(s)"));

        let conflict = parse(&["-i", "1.1.1.1", "-d", "a.com"]).target().unwrap_err();
        assert_eq!(conflict.kind, ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_list_must_be_a_file() {
        let dir = TempDir::new().unwrap();
        let dir_str = dir.path().to_str().unwrap();
        let err = parse(&["-il", dir_str]).target().unwrap_err();
        assert_eq!(err.message, "invalid ip file");
        assert_eq!(err.kind, ErrorKind::InvalidValue);
        assert_eq!(
            parse(&["-dl", "/definitely/not/here.txt"]).target().map_err(|e| e.message),
            Err("invalid domain file".to_string())
        );
    }

    #[test]
    fn test_setup_and_update_skip_validation() {
        assert_eq!(parse(&["--setup"]).invocation(), Ok(Invocation::Setup));
        assert_eq!(parse(&["--update", "-i", "1.1.1.1", "-d", "a.com"]).invocation(), Ok(Invocation::Update));
        assert_eq!(parse(&["--check-tools"]).invocation(), Ok(Invocation::CheckTools));
        assert!(parse(&[]).invocation().is_err());
    }

    #[test]
    fn test_comma_separated_targets() {
        let target = parse(&["-d", "a.com, b.com,,c.com"]).target().unwrap();
        assert_eq!(target, Target::Domain(vec!["a.com".into(), "b.com".into(), "c.com".into()]));
        assert_eq!(target.discovery_path(), DiscoveryPath::Domain);
        assert!(parse(&["-d", " , "]).target().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_target_stdin_command() {
        let target = Target::Ip(vec!["10.0.0.1".into(), "10.0.0.2".into()]);
        assert_eq!(target.stdin_command(), r"printf '%s\n' '10.0.0.1' '10.0.0.2'");
        assert_eq!(target.discovery_path(), DiscoveryPath::Address);
        assert_eq!(
            Target::DomainList("lists/d.txt".into()).stdin_command(),
            "cat 'lists/d.txt'"
        );
    }
}
