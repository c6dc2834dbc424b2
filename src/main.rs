use clap::{Parser, Subcommand};
use codewalk::{config, highlight, output, serve, site};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codewalk")]
#[command(about = "Static site generator for annotated code examples")]
#[command(long_about = "\
Static site generator for annotated code examples

Each example is a directory of numbered steps. Comment lines in the step's
code and script files become prose; the code beside them is highlighted.
Two blank lines start a new section.

Project structure:

  codewalk.toml                 # Optional config (run 'codewalk gen-config')
  catalog.json                  # Categories and their ordered examples
  assets/                       # Copied verbatim into the output root
  examples/
  └── closures/                 # Catalog item \"dir\"
      ├── 1/
      │   ├── closures.js       # Code file
      │   └── closures.sh       # Script file (optional)
      ├── 2/
      └── 10/                   # Steps sort numerically: 1, 2, 10

Examples listed in the catalog but missing on disk are skipped and left out
of navigation.")]
#[command(version)]
struct Cli {
    /// Project root containing codewalk.toml and catalog.json
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Show info-level diagnostics (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the HTML site into the output directory
    Build,
    /// Load the catalog and every example without writing output
    Check,
    /// Print the assembled site as JSON
    Manifest,
    /// Build, serve the output and rebuild on change
    Serve {
        /// Port to listen on (overrides serve.port)
        #[arg(long)]
        port: Option<u16>,
        /// Serve without watching for changes
        #[arg(long)]
        no_watch: bool,
    },
    /// Print a stock codewalk.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.root)?;
            println!("==> Building {}", config.output_dir().display());
            let report = site::build_html(&config)?;
            output::print_build_report(&report, &config.examples_dir());
        }
        Command::Check => {
            let config = config::load_config(&cli.root)?;
            println!("==> Checking {}", config.root.display());
            let (_, report) = site::collect(&config, &highlight::PlainHighlighter)?;
            output::print_check_report(&report, &config.examples_dir());
            println!("==> Content is valid");
        }
        Command::Manifest => {
            let config = config::load_config(&cli.root)?;
            let (manifest, _) = site::collect(&config, &highlight::TokenHighlighter)?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Command::Serve { port, no_watch } => {
            let config = config::load_config(&cli.root)?;
            let report = site::build_html(&config)?;
            output::print_build_report(&report, &config.examples_dir());
            serve::serve(
                &config,
                serve::ServeOptions {
                    port,
                    watch: !no_watch,
                },
            )?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("info"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
