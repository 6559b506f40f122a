use crate::error::AppResult;
use std::io::Read;

/// Source of the raw pasted text. Abstracted so the pipeline can be driven
/// from stdin in production and from fixtures in tests.
pub trait InputProvider {
    fn read_input(&self) -> AppResult<String>;
}

/// Reads everything from standard input; a multi-line paste collapses into one
/// captured string.
pub struct StdinInput;

impl InputProvider for StdinInput {
    fn read_input(&self) -> AppResult<String> {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer.trim().to_string())
    }
}
