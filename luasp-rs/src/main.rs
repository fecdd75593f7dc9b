use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::task::JoinSet;

use luasp::cli::{self, CliArgs, ConfigFile, Input};
use luasp::config::SiteConfig;
use luasp::site::{Outcome, Site};

/// Install a stderr `tracing` subscriber when `RUST_LOG` is set or `-d` is
/// given.  Without either, nothing is logged.
fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else if debug {
        EnvFilter::new("luasp=debug")
    } else {
        return;
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

/// Build the site configuration from the site file and flag overrides.
fn load_config(args: &CliArgs) -> Result<SiteConfig, String> {
    let path = match &args.config {
        ConfigFile::Skip => None,
        ConfigFile::Explicit(p) => Some(p.clone()),
        ConfigFile::Search => cli::find_site_config(),
    };

    let mut config = match path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading site file");
            SiteConfig::load_file(&path)
                .map_err(|e| format!("{}: {e}", path.display()))?
                .map_err(|e| format!("{}: {e}", path.display()))?
        }
        None => SiteConfig::default(),
    };

    if let Some(root) = &args.root {
        config.root = root.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    Ok(config)
}

/// Interpret stdin onto stdout, giving up after `deadline` if one is set.
async fn render_stdin(deadline: Option<Duration>) -> Result<(), String> {
    let mut src = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut src)
        .await
        .map_err(|e| format!("stdin: {e}"))?;

    let task = tokio::task::spawn_blocking(move || -> Result<(), luasp::Error> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        // Flush even on failure so the prefix written so far reaches stdout.
        let result = luasp::interpret(&mut out, &src);
        out.flush()?;
        result
    });

    let joined = match deadline {
        Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
            tracing::warn!(limit_secs = limit.as_secs_f64(), "stdin render timed out");
            format!(
                "stdin: render exceeded deadline of {:.3}s",
                limit.as_secs_f64()
            )
        })?,
        None => task.await,
    };
    joined.map_err(|e| e.to_string())?.map_err(|e| e.to_string())
}

/// Serve every request path concurrently, printing results in argument
/// order.  Returns `false` if any path failed.
async fn render_paths(site: Site, paths: Vec<String>) -> bool {
    let site = Arc::new(site);
    let mut tasks = JoinSet::new();
    for (idx, path) in paths.iter().cloned().enumerate() {
        let site = Arc::clone(&site);
        tasks.spawn(async move {
            let result = site.serve(&path).await;
            (idx, result)
        });
    }

    let mut results: Vec<Option<_>> = paths.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((idx, result)) => results[idx] = Some(result),
            Err(e) => eprintln!("luasp: {e}"),
        }
    }

    let mut ok = true;
    let mut stdout = tokio::io::stdout();
    for (path, result) in paths.iter().zip(results) {
        match result {
            Some(Ok(Outcome::Rendered(bytes))) => {
                if let Err(e) = stdout.write_all(&bytes).await {
                    eprintln!("luasp: stdout: {e}");
                    return false;
                }
            }
            Some(Ok(Outcome::Pass)) => {
                eprintln!("luasp: {path}: no lua rule covers this path");
                ok = false;
            }
            Some(Ok(other)) => {
                let status = other.status().unwrap_or_default();
                eprintln!("luasp: {path}: {status} {other:?}");
                ok = false;
            }
            Some(Err(e)) => {
                eprintln!("luasp: {} {e}", e.status());
                ok = false;
            }
            None => ok = false,
        }
    }
    if let Err(e) = stdout.flush().await {
        eprintln!("luasp: stdout: {e}");
        return false;
    }
    ok
}

#[tokio::main]
async fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("luasp: {e}");
            eprintln!("Usage: luasp [-f[<config>]] [-r<root>] [-t<secs>] [-d] [<path>...]");
            std::process::exit(1);
        }
    };

    init_tracing(args.debug);

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("luasp: {e}");
            std::process::exit(1);
        }
    };

    let ok = match args.input {
        Input::Stdin => match render_stdin(config.timeout).await {
            Ok(()) => true,
            Err(e) => {
                eprintln!("luasp: {e}");
                false
            }
        },
        Input::Paths(paths) => render_paths(Site::new(config), paths).await,
    };

    // Exit directly: a render that outlived its deadline may still be
    // running on a blocking worker.
    std::process::exit(if ok { 0 } else { 1 });
}
