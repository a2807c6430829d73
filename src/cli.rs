use clap::{Parser, Subcommand, ValueEnum};
use dsa_lib::{ExportFormat, Viewport};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dsa")]
#[command(
    version,
    about = "Design Sprawl Auditor - Measure the visual-design consistency of a web page",
    long_about = "Design Sprawl Auditor (DSA)\n\nModes:\n- audit: load a URL in a headless browser, sample computed styles and score how far each style category sprawls past a disciplined design system.\n- export: turn a stored audit's token proposals into a token map, Tailwind theme or CSS variables.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable debug logging on stderr")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) for viewport/timeouts/thresholds/weights; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit one page for design sprawl
    Audit {
        #[arg(long, help = "Public http(s) URL to audit")]
        url: String,

        #[arg(long, help = "Viewport dimensions (WIDTHxHEIGHT) [default: 1440x900]")]
        viewport: Option<Viewport>,

        #[arg(long, value_name = "SECONDS", help = "Navigation timeout [default: 30]")]
        nav_timeout: Option<u64>,

        #[arg(
            long,
            value_name = "SECONDS",
            help = "Network idle wait after load; expiry is not an error [default: 5]"
        )]
        network_idle_timeout: Option<u64>,

        #[arg(
            long,
            value_name = "SECONDS",
            help = "Hard limit for the browser helper process [default: 60]"
        )]
        process_timeout: Option<u64>,

        #[arg(
            long,
            value_name = "DIR",
            help = "Persist the completed report under DIR and print its id"
        )]
        store_dir: Option<PathBuf>,

        #[arg(
            long,
            value_name = "DIR",
            help = "Directory for the page screenshot (system temp dir if omitted)"
        )]
        screenshot_dir: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
    /// Export token proposals from a finished audit
    Export {
        #[arg(
            long,
            value_name = "PATH_OR_ID",
            help = "Audit JSON file (result or `dsa audit` envelope), or a report id with --store-dir"
        )]
        report: String,

        #[arg(long, value_name = "DIR", help = "Report store used to resolve ids")]
        store_dir: Option<PathBuf>,

        #[arg(
            long = "as",
            value_name = "FORMAT",
            default_value = "tokens",
            help = "tokens | tailwind | css"
        )]
        format: ExportFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn audit_flags_parse() {
        let cli = Cli::try_parse_from([
            "dsa",
            "audit",
            "--url",
            "https://example.com",
            "--viewport",
            "1280x720",
            "--nav-timeout",
            "12",
            "--format",
            "pretty",
        ])
        .unwrap();
        match cli.command {
            Commands::Audit {
                url,
                viewport,
                nav_timeout,
                process_timeout,
                format,
                ..
            } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(viewport, Some(Viewport { width: 1280, height: 720 }));
                assert_eq!(nav_timeout, Some(12));
                assert_eq!(process_timeout, None);
                assert_eq!(format, OutputFormat::Pretty);
            }
            _ => panic!("expected audit"),
        }
    }

    #[test]
    fn export_format_flag_parses() {
        let cli = Cli::try_parse_from(["dsa", "export", "--report", "r.json", "--as", "css"])
            .unwrap();
        match cli.command {
            Commands::Export { format, .. } => assert_eq!(format, ExportFormat::Css),
            _ => panic!("expected export"),
        }
        assert!(Cli::try_parse_from(["dsa", "export", "--report", "r.json", "--as", "yaml"]).is_err());
    }

    #[test]
    fn bad_viewport_is_rejected() {
        assert!(
            Cli::try_parse_from(["dsa", "audit", "--url", "https://a.test", "--viewport", "big"])
                .is_err()
        );
    }
}
