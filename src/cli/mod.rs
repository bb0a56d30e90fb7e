pub mod interaction;
pub mod output;

use std::io;

use crate::config::{Config, ConfigManager};
use crate::errors::{ConfigError, SubmissionError, WizardError};
use crate::estimate::{estimate, parse_square_footage, Frequency, MIN_SQUARE_FOOTAGE};
use crate::forms::{
    ApplicationWizard, FormEngine, FormFlow, FormInteraction, FormResult, QuoteWizard,
    WizardController,
};
use crate::submission::{HttpTransport, SubmissionHandler, SubmissionStatus};
use crate::utils::build_info;

use interaction::{ScriptedInteraction, TerminalInteraction};

const USAGE: &str = "\
Usage: quote_core_cli <command> [args]

Commands:
  quote                          Request a cleaning quote
  apply                          Apply for a cleaning position
  estimate <sq-ft> <frequency>   Show the monthly price range
  config show                    Print the current configuration
  config set <key> <value>       Change a configuration value
  version                        Print build information
  help                           Show this message";

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Entry point for the binary. `args` excludes the program name.
pub async fn run_cli(args: Vec<String>) -> Result<(), CommandError> {
    let scripted = ScriptedInteraction::from_env();
    if scripted.is_some() || std::env::var_os("NO_COLOR").is_some() {
        output::set_plain(true);
    }

    let command = args.first().map(|arg| arg.to_ascii_lowercase());
    let rest = args.get(1..).unwrap_or_default();

    match command.as_deref() {
        None | Some("help") | Some("--help") | Some("-h") => {
            println!("{USAGE}");
            Ok(())
        }
        Some("quote") => {
            let config = ConfigManager::new()?.load()?;
            let endpoint = config.quote_endpoint.clone();
            run_form(QuoteWizard::new(), &config, &endpoint, scripted).await
        }
        Some("apply") => {
            let config = ConfigManager::new()?.load()?;
            let endpoint = config.application_endpoint.clone();
            run_form(ApplicationWizard::new(), &config, &endpoint, scripted).await
        }
        Some("estimate") => run_estimate(rest),
        Some("config") => run_config(rest),
        Some("version") | Some("--version") => {
            println!("{}", build_info::current().summary());
            Ok(())
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "Unknown command `{other}`. Run `quote_core_cli help` for usage."
        ))),
    }
}

async fn run_form<F: FormFlow>(
    flow: F,
    config: &Config,
    endpoint: &str,
    scripted: Option<ScriptedInteraction>,
) -> Result<(), CommandError> {
    let transport = HttpTransport::new(config.http_timeout())?;
    let handler = SubmissionHandler::new(transport, endpoint, config.fallback_phone.as_str());
    let mut controller = WizardController::new(flow)?;
    tracing::debug!(
        form = controller.descriptor().name,
        endpoint = handler.endpoint(),
        "starting form session"
    );

    output::section(&config.company_name);
    let result = match scripted {
        Some(mut interaction) => drive(&mut controller, &mut interaction, &handler).await?,
        None => {
            output::info("Type :back to revisit a field, :help for details, :cancel to quit.");
            drive(&mut controller, &mut TerminalInteraction::new(), &handler).await?
        }
    };

    if result == FormResult::Cancelled {
        output::warning(cancel_message(controller.status(), &handler.fallback_message()));
    }
    Ok(())
}

/// Closing line for a cancelled run; differs once a submission was attempted.
fn cancel_message(status: &SubmissionStatus, fallback: &str) -> String {
    match status {
        SubmissionStatus::Error(_) => {
            format!("Form closed. Your request was not received. {fallback}")
        }
        _ => "Form cancelled. Nothing was sent.".to_string(),
    }
}

async fn drive<F: FormFlow, I: FormInteraction>(
    controller: &mut WizardController<F>,
    interaction: &mut I,
    handler: &SubmissionHandler<HttpTransport>,
) -> Result<FormResult, WizardError> {
    FormEngine::new(controller).run(interaction, handler).await
}

fn run_estimate(args: &[String]) -> Result<(), CommandError> {
    let [sq_ft, frequency] = args else {
        return Err(CommandError::InvalidArguments(
            "Usage: estimate <square-feet> <frequency>".into(),
        ));
    };
    let square_footage = parse_square_footage(sq_ft).ok_or_else(|| {
        CommandError::InvalidArguments(format!("`{sq_ft}` is not a square footage"))
    })?;
    let frequency = frequency.parse::<Frequency>().map_err(|_| {
        let options: Vec<&str> = Frequency::ALL.iter().map(|freq| freq.slug()).collect();
        CommandError::InvalidArguments(format!(
            "Unknown frequency `{frequency}`. Choose one of: {}",
            options.join(", ")
        ))
    })?;

    match estimate(Some(square_footage), Some(frequency)) {
        Some(band) => println!("Estimated range: {band}"),
        None => println!(
            "No estimate available below {MIN_SQUARE_FOOTAGE} sq ft. Request a quote for a custom price."
        ),
    }
    Ok(())
}

fn run_config(args: &[String]) -> Result<(), CommandError> {
    let manager = ConfigManager::new()?;
    match args {
        [action] if action == "show" => {
            let config = manager.load()?;
            print_config(&config, manager.path().display());
            Ok(())
        }
        [action, key, value] if action == "set" => {
            let mut config = manager.load()?;
            config.set(key, value)?;
            manager.save(&config)?;
            output::success(format!("Updated `{key}`."));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(format!(
            "Usage: config show | config set <key> <value>\nKeys: {}",
            Config::KEYS.join(", ")
        ))),
    }
}

fn print_config(config: &Config, path: impl std::fmt::Display) {
    output::section(format!("Configuration ({path})"));
    println!("  company_name: {}", config.company_name);
    println!("  quote_endpoint: {}", config.quote_endpoint);
    println!("  application_endpoint: {}", config.application_endpoint);
    println!("  fallback_phone: {}", config.fallback_phone);
    match config.http_timeout_secs {
        Some(secs) => println!("  http_timeout_secs: {secs}"),
        None => println!("  http_timeout_secs: none"),
    }
}
