use crate::demo::{run_demo, DemoArgs};
use crate::quote::{run_lint, run_quote, LintArgs, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use shiprate::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "shiprate-api",
    about = "Serve and exercise tiered shipping-rate rules from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Quote one cart against a configured method instance
    Quote(QuoteArgs),
    /// Inspect stored rule documents
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Run bundled sample methods over a handful of sample carts
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Decode a rules document and report every recovered problem
    Lint(LintArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured method settings file
    #[arg(long)]
    pub(crate) methods: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quote(args) => run_quote(args),
        Command::Rules {
            command: RulesCommand::Lint(args),
        } => run_lint(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["shiprate-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_quote_arguments() {
        let cli = Cli::try_parse_from([
            "shiprate-api",
            "quote",
            "--methods",
            "methods.json",
            "--instance",
            "4",
            "--items",
            "cart.csv",
            "--state",
            "DL",
            "--weight-unit",
            "g",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Quote(args)) => {
                assert_eq!(args.instance, 4);
                assert_eq!(args.state, "DL");
                assert_eq!(args.postcode, "");
                assert_eq!(args.weight_unit, Some(shiprate::rates::WeightUnit::G));
            }
            other => panic!("expected quote command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_weight_unit() {
        let result = Cli::try_parse_from([
            "shiprate-api",
            "quote",
            "--methods",
            "methods.json",
            "--instance",
            "4",
            "--items",
            "cart.csv",
            "--weight-unit",
            "stone",
        ]);
        assert!(result.is_err());
    }
}
