use std::process::ExitCode;

use javah_bin::Cli;

fn main() -> ExitCode {
    match javah_bin::run(Cli::from_env()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("javah: {:#}", err);
            ExitCode::from(2)
        }
    }
}
