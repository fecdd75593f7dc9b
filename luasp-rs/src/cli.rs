//! Command-line argument parsing.
//!
//! Usage:
//!   luasp [-f[<config>]] [-r<root>] [-t<secs>] [-d] [<path>…]
//!
//! With no paths (or a lone `-`) the document is read from stdin.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::parse_timeout;

/// Environment variable naming a site file.
pub const CONFIG_ENV: &str = "LUASP_CONFIG";

/// Site file name looked up in the working and per-user config directories.
pub const CONFIG_FILE_NAME: &str = "luasp.conf";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Which site file to load.
    pub config: ConfigFile,
    /// Document root override (`-r<dir>`).
    pub root: Option<PathBuf>,
    /// Render deadline override (`-t<secs>`); `Some(None)` disables it.
    pub timeout: Option<Option<Duration>>,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// What to render.
    pub input: Input,
}

/// How to choose the site file.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// `$LUASP_CONFIG`, `./luasp.conf`, then the user config dir (default).
    #[default]
    Search,
    /// `-f` with no file argument: built-in defaults only.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

/// Where documents come from.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum Input {
    /// Interpret stdin straight through, bypassing the site rules.
    #[default]
    Stdin,
    /// Serve these request paths from the site root.
    Paths(Vec<String>),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(&raw[1..])
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            i += 1;
            positional.extend(argv[i..].iter().cloned());
            break;
        }

        // Non-flag argument.
        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else if i + 1 < argv.len() && !argv[i + 1].starts_with('-') {
                        i += 1;
                        args.config = ConfigFile::Explicit(PathBuf::from(&argv[i]));
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                // -r<dir>, -t<secs>
                flag @ ('r' | 't') => {
                    let value = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err(format!("-{flag} requires an argument"));
                    };
                    if flag == 'r' {
                        args.root = Some(PathBuf::from(value));
                    } else {
                        args.timeout = Some(parse_timeout(&value)?);
                    }
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    args.input = match positional.as_slice() {
        [] => Input::Stdin,
        [only] if only == "-" => Input::Stdin,
        paths => {
            if paths.iter().any(|p| p == "-") {
                return Err("'-' cannot be combined with request paths".to_owned());
            }
            Input::Paths(paths.to_vec())
        }
    };
    if args.input == Input::Stdin && args.root.is_some() {
        return Err("-r needs request paths; stdin is not served from a root".to_owned());
    }

    Ok(args)
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for a site file in the standard locations.
/// Returns the first path that exists, or `None`.
pub fn find_site_config() -> Option<PathBuf> {
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let user = directories::ProjectDirs::from("", "", "luasp")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME));

    from_env
        .into_iter()
        .chain(std::iter::once(PathBuf::from(CONFIG_FILE_NAME)))
        .chain(user)
        .find(|p| p.exists())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn empty_args_read_stdin() {
        let a = parse_argv(&argv(&[])).unwrap();
        assert_eq!(a.input, Input::Stdin);
        assert!(matches!(a.config, ConfigFile::Search));
        assert!(!a.debug);
    }

    #[test]
    fn dash_reads_stdin() {
        let a = parse_argv(&argv(&["-"])).unwrap();
        assert_eq!(a.input, Input::Stdin);
    }

    #[test]
    fn request_paths() {
        let a = parse_argv(&argv(&["/a.html", "/b/"])).unwrap();
        assert_eq!(a.input, Input::Paths(argv(&["/a.html", "/b/"])));
    }

    #[test]
    fn dash_with_paths_is_error() {
        assert!(parse_argv(&argv(&["/a", "-"])).is_err());
    }

    #[test]
    fn root_embedded_and_separate() {
        let a = parse_argv(&argv(&["-rsite", "/"])).unwrap();
        assert_eq!(a.root, Some(PathBuf::from("site")));
        let a = parse_argv(&argv(&["-r", "site", "/"])).unwrap();
        assert_eq!(a.root, Some(PathBuf::from("site")));
    }

    #[test]
    fn timeout_flag() {
        let a = parse_argv(&argv(&["-t1.5"])).unwrap();
        assert_eq!(a.timeout, Some(Some(Duration::from_millis(1500))));
        let a = parse_argv(&argv(&["-t", "0"])).unwrap();
        assert_eq!(a.timeout, Some(None));
        assert!(parse_argv(&argv(&["-tfast"])).is_err());
        assert!(parse_argv(&argv(&["-t1e20"])).is_err());
        assert!(parse_argv(&argv(&["-t", "18446744073709551616"])).is_err());
    }

    #[test]
    fn root_without_paths_is_error() {
        assert!(parse_argv(&argv(&["-rsite"])).is_err());
        assert!(parse_argv(&argv(&["-rsite", "-"])).is_err());
        let a = parse_argv(&argv(&["-rsite", "/x"])).unwrap();
        assert_eq!(a.input, Input::Paths(argv(&["/x"])));
    }

    #[test]
    fn missing_flag_value() {
        assert!(parse_argv(&argv(&["-r"])).is_err());
        assert!(parse_argv(&argv(&["-t"])).is_err());
    }

    #[test]
    fn config_skip() {
        let a = parse_argv(&argv(&["-f"])).unwrap();
        assert!(matches!(a.config, ConfigFile::Skip));
    }

    #[test]
    fn config_explicit() {
        let a = parse_argv(&argv(&["-fsite.conf"])).unwrap();
        assert!(matches!(&a.config, ConfigFile::Explicit(p) if p == &PathBuf::from("site.conf")));
        let a = parse_argv(&argv(&["-f", "site.conf", "/x"])).unwrap();
        assert!(matches!(&a.config, ConfigFile::Explicit(p) if p == &PathBuf::from("site.conf")));
        assert_eq!(a.input, Input::Paths(argv(&["/x"])));
    }

    #[test]
    fn combined_flags() {
        let a = parse_argv(&argv(&["-drdocs", "/"])).unwrap();
        assert!(a.debug);
        assert_eq!(a.root, Some(PathBuf::from("docs")));
    }

    #[test]
    fn double_dash_ends_flags() {
        let a = parse_argv(&argv(&["--", "-odd"])).unwrap();
        assert_eq!(a.input, Input::Paths(argv(&["-odd"])));
    }

    #[test]
    fn unknown_flag() {
        assert!(parse_argv(&argv(&["-z"])).is_err());
    }
}
