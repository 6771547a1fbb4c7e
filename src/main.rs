use clap::{Parser, Subcommand};
use dirindex::asset::GeneratorAsset;
use dirindex::cgi::{self, CgiRequest};
use dirindex::config::{self, IndexConfig};
use dirindex::listing::{self, ListingOptions};
use dirindex::{output, propagate, render};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("DIRINDEX_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("DIRINDEX_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once; clap needs a &'static str
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Directory selection shared by the listing commands.
#[derive(clap::Args, Clone)]
struct DirArgs {
    /// Directory to list
    #[arg(long, default_value = ".")]
    dir: PathBuf,
}

#[derive(Parser)]
#[command(name = "dirindex")]
#[command(about = "Self-propagating directory listing generator")]
#[command(long_about = "\
Self-propagating directory listing generator

Renders an 'Index of /path/' page for a directory and copies the generator
into every subdirectory, so each directory can serve its own listing.

Run without a command (as a web server does for CGI programs) to list the
working directory relative to $DOCUMENT_ROOT and write a full CGI response:

  /srv/www/
  ├── dirindex.toml        # Optional config (exclusions, style, dates)
  ├── index.cgi            # This program
  ├── notes.txt
  └── photos/
      └── index.cgi        # Written on the first visit to /, kept current

A subdirectory's copy is rewritten only when it is missing or older than
the running generator.

Run 'dirindex gen-config' to print a documented dirindex.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Document root; listings show paths relative to it (default: the listed directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file (default: <root>/dirindex.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Generator payload to propagate (default: this executable)
    #[arg(long, global = true)]
    asset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan, propagate, and write the HTML listing page
    Render {
        #[command(flatten)]
        dir: DirArgs,
        /// Write the page to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Do not copy the generator into subdirectories
        #[arg(long)]
        no_propagate: bool,
        /// Prefix the page with CGI response headers
        #[arg(long)]
        cgi: bool,
    },
    /// Print a directory listing without writing anything
    Scan {
        #[command(flatten)]
        dir: DirArgs,
        /// Print the listing record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy the generator into subdirectories whose copy is missing or stale
    Propagate {
        #[command(flatten)]
        dir: DirArgs,
        /// Descend into every directory below, not just immediate children
        #[arg(long)]
        recursive: bool,
    },
    /// Print a stock dirindex.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = match parse_cli(std::env::args_os(), cgi::is_gateway_request()) {
        Ok(Some(cli)) => cli,
        Ok(None) => {
            serve(&CgiRequest::from_env());
            return Ok(());
        }
        Err(err) => err.exit(),
    };

    let Some(command) = cli.command else {
        let defaults = CgiRequest::from_env();
        serve(&CgiRequest {
            document_root: cli.root.or(defaults.document_root.clone()),
            config_path: cli.config,
            asset_path: cli.asset,
            ..defaults
        });
        return Ok(());
    };

    match command {
        Command::Render {
            dir,
            output,
            no_propagate,
            cgi,
        } => {
            let root = cli.root.clone().unwrap_or_else(|| dir.dir.clone());
            let config = load_config(&root, cli.config.as_deref())?;
            let options = ListingOptions::from_config(&config)?;
            let asset = if no_propagate {
                None
            } else {
                GeneratorAsset::load(cli.asset.as_deref(), &config.generator_name)
                    .map_err(|err| tracing::warn!(error = %err, "propagation disabled"))
                    .ok()
            };

            let (listing, report) = listing::build(&root, &dir.dir, &options, asset.as_ref())?;
            let mut page = String::new();
            if cgi {
                page.push_str(&render::cgi_headers(&config.cgi));
            }
            page.push_str(&render::render_page(&listing, &config.display).into_string());

            match output {
                Some(path) => {
                    std::fs::write(&path, page)?;
                    println!("Wrote {}", path.display());
                    if !report.is_empty() {
                        output::print_propagation(&report, &dir.dir);
                    }
                }
                None => std::io::stdout().lock().write_all(page.as_bytes())?,
            }
        }
        Command::Scan { dir, json } => {
            let root = cli.root.clone().unwrap_or_else(|| dir.dir.clone());
            let config = load_config(&root, cli.config.as_deref())?;
            let options = ListingOptions::from_config(&config)?;
            let (listing, _) = listing::build(&root, &dir.dir, &options, None)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                output::print_listing(&listing, &config.display);
            }
        }
        Command::Propagate { dir, recursive } => {
            let root = cli.root.clone().unwrap_or_else(|| dir.dir.clone());
            let config = load_config(&root, cli.config.as_deref())?;
            let options = ListingOptions::from_config(&config)?;
            let asset = GeneratorAsset::load(cli.asset.as_deref(), &config.generator_name)?;

            let report = if recursive {
                propagate::propagate_tree(&dir.dir, &options.exclusions, &asset)
            } else {
                listing::build(&root, &dir.dir, &options, Some(&asset))?.1
            };
            output::print_propagation(&report, &dir.dir);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Parse the command line, or return `None` when a web server started us.
/// Under CGI the arguments are the words of an ISINDEX query, not options,
/// so they are never parsed.
fn parse_cli<I, T>(args: I, under_gateway: bool) -> Result<Option<Cli>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    if under_gateway {
        return Ok(None);
    }
    Cli::try_parse_from(args).map(Some)
}

/// Write one CGI response to stdout. Nothing here reports failure to the
/// web server beyond a smaller page.
fn serve(request: &CgiRequest) {
    let mut stdout = std::io::stdout().lock();
    if let Err(err) = cgi::respond(request, &mut stdout) {
        tracing::warn!(error = %err, "failed to write response");
    }
}

/// Load `--config` when given, otherwise `dirindex.toml` from the root.
fn load_config(root: &Path, explicit: Option<&Path>) -> Result<IndexConfig, config::ConfigError> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => config::load_config(root),
    }
}

/// Diagnostics go to stderr so CGI stdout only carries the response.
/// Filter with `RUST_LOG` (default: `warn`).
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
