use std::process::ExitCode;

use clap::Parser;

use buildmatrix::cli::Cli;
use buildmatrix::error::MatrixError;
use buildmatrix::utils::terminal::print_error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.execute() {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            match err.downcast_ref::<MatrixError>() {
                Some(matrix_err) => matrix_err.display_with_hints(),
                None => print_error(&format!("{:#}", err)),
            }
            ExitCode::FAILURE
        }
    }
}
