use std::process::ExitCode;

use clap::Parser;
use essay_grader::cli::Cli;
use essay_grader::presentation::render_error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", render_error(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}
