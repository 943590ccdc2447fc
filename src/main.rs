use std::process::ExitCode;

fn main() -> ExitCode {
    match labelmerge::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}
