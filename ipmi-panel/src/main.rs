//! ipmi-panel - render the IPMI help block of a KVM host from the command line
//!
//! - `render`: fetch /api/info (retrying until it answers) and print the panel
//! - `passwd`: validate an IPMI passwd file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use ipmi_panel::logging::init_logging;
use ipmi_panel::{
    CliOverrides, HttpInfoSource, InfoPanelLoader, IpmiAuthManager, LoadOutcome, Output, PageLocation,
    PanelConfig, TerminalPage,
};

/// Exit status when the daemon asks for a login.
const EXIT_LOGIN_REQUIRED: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "ipmi-panel", version, about = "IPMI help panel for the KVM daemon")]
struct Cli {
    /// Config file (default: $IPMI_PANEL_CONFIG or ./ipmi-panel.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch /api/info and render the panel
    Render {
        /// Base URL of the KVM daemon, e.g. https://kvm.local
        #[arg(long)]
        url: Option<String>,

        /// Write the element to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip TLS certificate verification
        #[arg(long, conflicts_with = "verify_tls")]
        insecure: bool,

        /// Verify TLS certificates even if the config file disables it
        #[arg(long)]
        verify_tls: bool,

        /// Delay between attempts, in milliseconds
        #[arg(long)]
        retry_delay_ms: Option<u64>,
    },
    /// Check an IPMI passwd file and list its users
    Passwd {
        file: PathBuf,
    },
}

impl Command {
    fn overrides(&self) -> CliOverrides {
        match self {
            Command::Render {
                url,
                insecure,
                verify_tls,
                retry_delay_ms,
                ..
            } => CliOverrides {
                base_url: url.clone(),
                insecure: match (*insecure, *verify_tls) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                retry_delay_ms: *retry_delay_ms,
            },
            Command::Passwd { .. } => CliOverrides::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Charger les variables d'environnement depuis .env (si présent)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.quiet);

    let overrides = cli.command.overrides();
    match cli.command {
        Command::Render { out, .. } => {
            let path = cli.config.unwrap_or_else(PanelConfig::config_file_path);
            let mut config = PanelConfig::load_from(&path)
                .await
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env();
            config.apply_cli(&overrides);
            config.validate().context("Invalid configuration")?;

            let status = render(&config, out).await?;
            Ok(ExitCode::from(status))
        }
        Command::Passwd { file } => {
            check_passwd(file).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Runs the loader; returns the process exit status.
async fn render(config: &PanelConfig, out: Option<PathBuf>) -> Result<u8> {
    let location = PageLocation::from_url(&config.base_url).context("Invalid base URL")?;
    let source = HttpInfoSource::from_config(config).context("Failed to build HTTP client")?;
    let output = out.map(Output::File).unwrap_or(Output::Stdout);

    info!("loading {}", source.url());
    let mut loader = InfoPanelLoader::from_config(source, TerminalPage::new(location, output), config);
    let outcome = loader.load().await.context("Failed to write the panel")?;

    match outcome {
        LoadOutcome::Rendered => Ok(0),
        LoadOutcome::Redirected => {
            let target = loader.page().redirect().unwrap_or(config.login_path.as_str());
            eprintln!("login required: {target}");
            Ok(EXIT_LOGIN_REQUIRED)
        }
    }
}

async fn check_passwd(file: PathBuf) -> Result<()> {
    let auth = IpmiAuthManager::load(&file)
        .await
        .with_context(|| format!("Failed to load {}", file.display()))?;

    println!("{}: {} IPMI user(s)", file.display(), auth.len());
    for user in auth.users() {
        if let Some(creds) = auth.credentials(user) {
            println!("  {} -> {}", creds.ipmi_user, creds.kvmd_user);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_render_flags() {
        let cli = Cli::try_parse_from([
            "ipmi-panel",
            "--quiet",
            "render",
            "--url",
            "https://kvm.local",
            "--retry-delay-ms",
            "500",
        ])
        .unwrap();
        assert!(cli.quiet);
        match cli.command {
            Command::Render { url, retry_delay_ms, out, .. } => {
                assert_eq!(url.as_deref(), Some("https://kvm.local"));
                assert_eq!(retry_delay_ms, Some(500));
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_tls_flags() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).map(|cli| cli.command.overrides().insecure);

        assert_eq!(parse(&["ipmi-panel", "render"]).unwrap(), None);
        assert_eq!(parse(&["ipmi-panel", "render", "--insecure"]).unwrap(), Some(true));
        assert_eq!(parse(&["ipmi-panel", "render", "--verify-tls"]).unwrap(), Some(false));
        assert!(parse(&["ipmi-panel", "render", "--insecure", "--verify-tls"]).is_err());
    }

    #[tokio::test]
    async fn test_render_reports_login_required() {
        let server = panel_devkit::StubInfoServer::start().await.unwrap();
        server.require_credentials("admin", "admin");
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("panel.html");
        let config = PanelConfig {
            base_url: server.base_url(),
            ..PanelConfig::default()
        };

        assert_eq!(render(&config, Some(out.clone())).await.unwrap(), EXIT_LOGIN_REQUIRED);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_render_success_exits_zero() {
        let server = panel_devkit::StubInfoServer::start().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("panel.html");
        let config = PanelConfig {
            base_url: server.base_url(),
            ..PanelConfig::default()
        };

        assert_eq!(render(&config, Some(out.clone())).await.unwrap(), 0);
        assert!(std::fs::read_to_string(&out).unwrap().contains("-p 623 power on"));
    }

    #[test]
    fn test_cli_requires_passwd_file() {
        assert!(Cli::try_parse_from(["ipmi-panel", "passwd"]).is_err());
    }
}
