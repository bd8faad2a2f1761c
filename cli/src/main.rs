use std::process::ExitCode;

fn main() -> ExitCode {
    if todo_cli::run() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
