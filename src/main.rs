use std::{
    env,
    fs::File,
    io::{self, BufReader},
    process::ExitCode,
};

use string_queue::script::{Interpreter, ScriptError};
use tracing_subscriber::EnvFilter;

/// Runs a queue command script from the file given as the only argument, or from stdin.
fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("QTEST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut interpreter = Interpreter::new(io::stdout().lock());
    let outcome = match env::args_os().nth(1) {
        Some(path) => File::open(&path)
            .map_err(ScriptError::from)
            .and_then(|file| interpreter.run(BufReader::new(file))),
        None => interpreter.run(io::stdin().lock()),
    };

    match outcome {
        Ok(0) => ExitCode::SUCCESS,
        Ok(errors) => {
            eprintln!("{errors} error(s) found");
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!(%err, "script aborted");
            eprintln!("qtest: {err}");
            ExitCode::FAILURE
        }
    }
}
