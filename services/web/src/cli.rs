use crate::commands::{run_notify, run_submit, NotifyArgs, SubmitArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use topsis_form::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "topsis-form",
    about = "Serve the TOPSIS submission form or submit datasets from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP form service (default command)
    Serve(ServeArgs),
    /// Submit one dataset to the scoring backend and print the ranked table
    Submit(SubmitArgs),
    /// E-mail a result link through the configured e-mail API
    Notify(NotifyArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Submit(args) => run_submit(args).await,
        Command::Notify(args) => run_notify(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["topsis-form"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn submit_takes_optional_email_and_output() {
        let cli = Cli::try_parse_from([
            "topsis-form",
            "submit",
            "--file",
            "funds.csv",
            "--weights",
            "1,1,1",
            "--impacts",
            "+,+,-",
            "--email",
            "analyst@example.com",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Submit(args)) => {
                assert_eq!(args.weights, "1,1,1");
                assert_eq!(args.email.as_deref(), Some("analyst@example.com"));
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn impacts_starting_with_minus_are_accepted() {
        let cli = Cli::try_parse_from([
            "topsis-form",
            "submit",
            "--file",
            "funds.csv",
            "--weights",
            "1,1",
            "--impacts",
            "-,+",
        ])
        .expect("parses");
        assert!(matches!(cli.command, Some(Command::Submit(args)) if args.impacts == "-,+"));
    }
}
