use thiserror::Error;

/// Fatal errors that abort the process before any JSON is written to stdout.
///
/// Model-level infeasibility is *not* represented here — it is a normal,
/// successful outcome of the solve (see `factory::reducer` / `belts::reducer`)
/// and is reported on stdout with exit code 0.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read standard input")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON input")]
    Json(#[from] serde_json::Error),

    #[error("invalid problem instance: {0}")]
    Model(String),
}
