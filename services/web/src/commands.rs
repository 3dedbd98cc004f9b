use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use topsis_form::config::{AppConfig, ConfigError};
use topsis_form::error::AppError;
use topsis_form::form::{FormController, FormFields, Lifecycle, UploadFile};
use topsis_form::notify::{EmailJsClient, ResultMailer};
use topsis_form::results::{CsvSink, TextTableSink};
use topsis_form::submission::TopsisApiClient;
use topsis_form::telemetry::{self, LogTarget};

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// CSV dataset: first column names the alternatives, the rest are criteria
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Comma separated weights, one per criterion (e.g. 1,1,1,1)
    #[arg(long)]
    pub(crate) weights: String,
    /// Comma separated impacts, + or - per criterion (e.g. +,+,-,+)
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) impacts: String,
    /// Ask the backend to e-mail the result to this address
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Also write the ranked table to this CSV file
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct NotifyArgs {
    /// Recipient address
    #[arg(long)]
    pub(crate) to: String,
    /// Result link to include in the message
    #[arg(long)]
    pub(crate) link: String,
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogTarget::Stderr)?;

    let SubmitArgs {
        file,
        weights,
        impacts,
        email,
        output,
    } = args;

    let client = TopsisApiClient::new(&config.backend)?;
    let fields = FormFields {
        file: Some(UploadFile::from_path(&file)?),
        weights,
        impacts,
        send_mail: email.is_some(),
        email: email.unwrap_or_default(),
    };

    let mut form = FormController::new();
    form.submit(fields, &client).await?;

    match form.lifecycle() {
        Lifecycle::Succeeded(table) => {
            println!("TOPSIS result for {}", file.display());
            form.present(&mut TextTableSink::new(io::stdout().lock()))?;

            if let Some(path) = output {
                let mut sink = CsvSink::new(BufWriter::new(File::create(&path)?));
                form.present(&mut sink)?;
                sink.into_inner()?.flush()?;
                println!("\nSaved ranked table to {}", path.display());
            }
            if let Some(link) = &table.download {
                println!("Download: {link}");
            }
            if form.fields().send_mail {
                println!(
                    "The backend was asked to e-mail the result to {}",
                    form.fields().email.trim()
                );
            }
            Ok(())
        }
        Lifecycle::Failed(message) => Err(AppError::Rejected(message.clone())),
        Lifecycle::Idle | Lifecycle::Loading { .. } => {
            Err(AppError::Rejected("submission did not settle".to_string()))
        }
    }
}

pub(crate) async fn run_notify(args: NotifyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogTarget::Stderr)?;

    let email = config.email.ok_or(ConfigError::EmailNotConfigured)?;
    let mailer = EmailJsClient::new(email);
    let receipt = mailer.send_result_email(&args.to, &args.link).await?;

    println!("E-mail accepted ({}): {}", receipt.status, receipt.text);
    Ok(())
}
