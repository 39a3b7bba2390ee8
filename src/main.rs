use std::process::ExitCode;

fn main() -> ExitCode {
    metascrub::cli::run()
}
