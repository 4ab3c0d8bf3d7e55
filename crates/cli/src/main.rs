use std::process::ExitCode;

fn main() -> ExitCode {
    shipguard_cli::run()
}
