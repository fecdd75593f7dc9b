//! Site configuration file parser.
//!
//! One directive per line:
//!
//! | Directive | Action |
//! |-----------|--------|
//! | `root <dir>` | document root (default `.`) |
//! | `lua [<basepath>]` | route paths under `basepath` (default `/`) through Lua |
//! | `index <name> …` | replace the index page list |
//! | `timeout <seconds>` | render deadline; `0` disables it |
//! | Lines starting with `#` | comment, ignored |
//!
//! A file with no `lua` lines routes every path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Index pages tried, in order, when a request names a directory.
pub const DEFAULT_INDEX_PAGES: &[&str] = &[
    "index.html",
    "index.htm",
    "index.txt",
    "default.html",
    "default.htm",
    "default.txt",
];

// ── Public API ────────────────────────────────────────────────────────────────

/// An error on a specific line of a site file.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

/// A base request path whose documents go through the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub base_path: String,
}

impl Default for Rule {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Rule {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self { base_path: base_path.into() }
    }

    /// Whether `path` lies under this rule's base path (plain prefix match).
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.base_path)
    }
}

/// Everything the site handler needs to resolve and render a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub root: PathBuf,
    pub rules: Vec<Rule>,
    pub index_pages: Vec<String>,
    /// Per-render deadline; `None` lets a script run forever.
    pub timeout: Option<Duration>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            rules: vec![Rule::default()],
            index_pages: DEFAULT_INDEX_PAGES.iter().map(|&s| s.to_owned()).collect(),
            timeout: None,
        }
    }
}

impl SiteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a site file.  Stops at the first bad line.
    pub fn load_str(s: &str) -> Result<Self, ConfigError> {
        let mut config = SiteConfig::new();
        let mut rules = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let tokens = split_args(line);
            let Some((directive, args)) = tokens.split_first() else { continue };
            let err = |message: String| ConfigError { line: lineno, message };

            match directive.as_str() {
                "root" => match args {
                    [dir] => config.root = PathBuf::from(dir),
                    _ => return Err(err("root takes exactly one directory".to_owned())),
                },
                "lua" => match args {
                    [] => rules.push(Rule::default()),
                    [base] => rules.push(Rule::new(base.as_str())),
                    _ => return Err(err(format!("lua takes at most one base path, got {}", args.len()))),
                },
                "index" => {
                    if args.is_empty() {
                        return Err(err("index needs at least one file name".to_owned()));
                    }
                    config.index_pages = args.to_vec();
                }
                "timeout" => match args {
                    [secs] => config.timeout = parse_timeout(secs).map_err(err)?,
                    _ => return Err(err("timeout takes one number of seconds".to_owned())),
                },
                other => return Err(err(format!("unknown directive: {other}"))),
            }
        }

        if !rules.is_empty() {
            config.rules = rules;
        }
        Ok(config)
    }

    /// Read and parse a site file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<Result<Self, ConfigError>> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    /// First rule covering `path`, if any.
    pub fn rule_for(&self, path: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.matches(path))
    }
}

/// Parse a deadline in (possibly fractional) seconds; zero means none.
pub fn parse_timeout(s: &str) -> Result<Option<Duration>, String> {
    let secs: f64 = s
        .parse()
        .map_err(|_| format!("invalid timeout: {s}"))?;
    if secs == 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|_| format!("invalid timeout: {s}"))
}

// ── Argument tokenizer ────────────────────────────────────────────────────────

/// Split `s` into whitespace-delimited tokens, honouring double-quoted strings
/// and `\"` escapes within them.
fn split_args(s: &str) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    cur.push(escaped);
                }
            }
            c if c.is_ascii_whitespace() && !in_quotes => {
                if !cur.is_empty() || quoted {
                    args.push(std::mem::take(&mut cur));
                }
                quoted = false;
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() || quoted {
        args.push(cur);
    }
    args
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SiteConfig::default();
        assert_eq!(c.root, PathBuf::from("."));
        assert_eq!(c.rules, vec![Rule::new("/")]);
        assert_eq!(c.index_pages.len(), DEFAULT_INDEX_PAGES.len());
        assert_eq!(c.timeout, None);
    }

    #[test]
    fn full_file() {
        let src = "\
# site
root /srv/www
lua /pages
lua /blog
index home.html index.html
timeout 2.5
";
        let c = SiteConfig::load_str(src).unwrap();
        assert_eq!(c.root, PathBuf::from("/srv/www"));
        assert_eq!(c.rules, vec![Rule::new("/pages"), Rule::new("/blog")]);
        assert_eq!(c.index_pages, vec!["home.html", "index.html"]);
        assert_eq!(c.timeout, Some(Duration::from_millis(2500)));
    }

    #[test]
    fn lua_without_path_defaults_to_slash() {
        let c = SiteConfig::load_str("lua").unwrap();
        assert_eq!(c.rules, vec![Rule::new("/")]);
    }

    #[test]
    fn lua_with_two_paths_is_error() {
        let err = SiteConfig::load_str("root .\nlua /a /b").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("at most one"), "{err}");
    }

    #[test]
    fn unknown_directive_is_error() {
        let err = SiteConfig::load_str("\n\ngzip").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.to_string(), "line 3: unknown directive: gzip");
    }

    #[test]
    fn quoted_root_with_spaces() {
        let c = SiteConfig::load_str(r#"root "/srv/my site""#).unwrap();
        assert_eq!(c.root, PathBuf::from("/srv/my site"));
    }

    #[test]
    fn zero_timeout_disables() {
        let c = SiteConfig::load_str("timeout 0").unwrap();
        assert_eq!(c.timeout, None);
    }

    #[test]
    fn bad_timeout() {
        assert!(SiteConfig::load_str("timeout soon").is_err());
        assert!(SiteConfig::load_str("timeout -1").is_err());
        assert!(SiteConfig::load_str("timeout inf").is_err());
        assert!(SiteConfig::load_str("timeout 1e30").is_err());
        assert!(parse_timeout("18446744073709551616").is_err());
    }

    #[test]
    fn rule_prefix_match() {
        let r = Rule::new("/docs");
        assert!(r.matches("/docs"));
        assert!(r.matches("/docs/a.html"));
        assert!(!r.matches("/other"));
        assert!(Rule::default().matches("/anything"));
    }

    #[test]
    fn rule_for_picks_first_match() {
        let c = SiteConfig::load_str("lua /a\nlua /").unwrap();
        assert_eq!(c.rule_for("/a/x").map(|r| r.base_path.as_str()), Some("/a"));
        assert_eq!(c.rule_for("/b").map(|r| r.base_path.as_str()), Some("/"));
    }

    #[test]
    fn no_rule_matches() {
        let c = SiteConfig::load_str("lua /only").unwrap();
        assert!(c.rule_for("/elsewhere").is_none());
    }

    #[test]
    fn split_args_quotes() {
        assert_eq!(split_args(r#"a "b c" "d\"e""#), vec!["a", "b c", "d\"e"]);
        assert_eq!(split_args(r#"x """#), vec!["x", ""]);
    }

    #[test]
    fn load_file_reads_disk() {
        use std::io::Write;
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "root /tmp\nlua /x").unwrap();
        let c = SiteConfig::load_file(f.path()).unwrap().unwrap();
        assert_eq!(c.root, PathBuf::from("/tmp"));
        assert_eq!(c.rules, vec![Rule::new("/x")]);
    }
}
