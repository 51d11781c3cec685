pub mod demo;
pub mod output;
pub mod prompt;
pub mod wizard;

use std::io::{self, BufRead};
use std::sync::Arc;

use sacco_api_http::HttpLoanApi;
use sacco_config::{Config, ConfigError, ConfigManager};
use sacco_core::{LoanApi, ProfileSource, SessionOptions, WizardSession};
use tracing::{debug, warn};

use crate::errors::CliError;
use crate::utils::build_info;

pub use output::ConsoleNotifier;
pub use prompt::{DialoguerPrompter, Prompter, ScriptPrompter};
pub use wizard::run_wizard;

/// Answers are read from stdin, one per line, when this is set.
pub const SCRIPT_ENV: &str = "LOAN_WIZARD_CLI_SCRIPT";

const USAGE: &str = "\
Usage: loan_wizard_cli [OPTIONS]

Options:
  --demo         Use built-in sample products and a sample member (no network)
  --init-config  Write the default configuration file and exit
  --version      Print version and build information
  --help         Print this help

Environment:
  LOAN_WIZARD_API_URL          Loan service base URL
  LOAN_WIZARD_APPLICANT_TYPE   member | non-member
  LOAN_WIZARD_TOKEN            Access token of the signed-in user
  LOAN_WIZARD_CLI_SCRIPT       Read answers from stdin instead of prompting
";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub demo: bool,
    pub init_config: bool,
    pub version: bool,
    pub help: bool,
}

impl CliArgs {
    pub fn parse<I, S>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = CliArgs::default();
        for arg in args {
            match arg.as_ref() {
                "--demo" => parsed.demo = true,
                "--init-config" => parsed.init_config = true,
                "--version" | "-V" => parsed.version = true,
                "--help" | "-h" => parsed.help = true,
                other => {
                    return Err(CliError::InvalidArguments(format!(
                        "unknown argument `{other}`\n\n{USAGE}"
                    )))
                }
            }
        }
        Ok(parsed)
    }
}

/// Loads stored settings, falling back to defaults when the platform has no
/// config directory, then applies environment overrides. A stored file that
/// cannot be read or parsed is an error.
pub fn load_config() -> Result<Config, CliError> {
    let config = match ConfigManager::default_location() {
        Ok(manager) => manager.load()?,
        Err(ConfigError::NoConfigDir) => {
            debug!("no config directory; using default configuration");
            Config::default()
        }
        Err(err) => return Err(err.into()),
    };
    Ok(config.with_env_overrides()?)
}

fn build_api(
    args: &CliArgs,
    config: &Config,
    token: Option<&str>,
) -> Result<Arc<dyn LoanApi>, CliError> {
    if args.demo {
        return Ok(Arc::new(demo::api()));
    }
    let mut api = HttpLoanApi::new(config.api_base_url.clone())?;
    if let Some(token) = token {
        api = api.with_token(token);
    }
    Ok(Arc::new(api))
}

fn build_profile(
    args: &CliArgs,
    token: Option<&str>,
) -> Result<Arc<dyn ProfileSource>, CliError> {
    if args.demo && token.is_none() {
        return Ok(Arc::new(demo::profile_source()));
    }
    let source = crate::identity::profile_source(token)?;
    if source.identity().is_none() {
        warn!("no access token; submissions will be refused");
        output::warning("You are not signed in. Set LOAN_WIZARD_TOKEN to submit an application.");
    }
    Ok(Arc::new(source))
}

/// Entry point of `loan_wizard_cli`. Tracing is installed once the config
/// (and its log filter) is known.
pub async fn run_cli<I, S>(args: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args = CliArgs::parse(args)?;
    if args.help {
        print!("{USAGE}");
        return Ok(());
    }
    if args.version {
        println!("{}", build_info::current().version_line());
        return Ok(());
    }
    if args.init_config {
        let manager = ConfigManager::default_location()?;
        manager.save(&Config::default())?;
        output::success(format!(
            "Wrote default configuration to {}",
            manager.config_path().display()
        ));
        return Ok(());
    }

    let config = load_config()?;
    crate::init_with_filter(&config.log_filter);
    output::set_preferences(output::OutputPreferences {
        color: config.ui_color_enabled && std::env::var_os(SCRIPT_ENV).is_none(),
    });

    let token = std::env::var(config.access_token_var())
        .ok()
        .filter(|token| !token.trim().is_empty());
    let api = build_api(&args, &config, token.as_deref())?;
    let profile = build_profile(&args, token.as_deref())?;
    let mut session = WizardSession::new(
        api,
        profile,
        Arc::new(ConsoleNotifier),
        SessionOptions {
            applicant_type: config.applicant_type,
            retry: config.phase_retry,
        },
    );

    if std::env::var_os(SCRIPT_ENV).is_some() {
        let stdin = io::stdin();
        let mut prompter = ScriptPrompter::new(stdin.lock());
        run_wizard(&mut session, &mut prompter).await
    } else {
        let mut prompter = DialoguerPrompter::new();
        run_wizard(&mut session, &mut prompter).await
    }
}

/// Convenience for tests: scripted run over any reader.
pub async fn run_scripted<R: BufRead>(
    session: &mut WizardSession,
    reader: R,
) -> Result<(), CliError> {
    let mut prompter = ScriptPrompter::new(reader);
    run_wizard(session, &mut prompter).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_flags() {
        let args = CliArgs::parse(["--demo", "--version"]).unwrap();
        assert!(args.demo && args.version);
        assert!(!args.help);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(matches!(
            CliArgs::parse(["--nope"]),
            Err(CliError::InvalidArguments(_))
        ));
    }
}
