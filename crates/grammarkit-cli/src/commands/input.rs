use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Text to tokenize: inline, a file, or stdin (`-`).
pub struct InputSource {
    pub path: Option<PathBuf>,
    pub text: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read stdin: {0}")]
    Stdin(io::Error),

    #[error("failed to read '{}': {source}", .path.display())]
    File { path: PathBuf, source: io::Error },

    #[error("input is required: use a positional argument or -s/--source")]
    Missing,
}

impl InputSource {
    pub fn new(path: Option<PathBuf>, text: Option<String>) -> Self {
        Self { path, text }
    }

    pub fn read(&self) -> Result<String, InputError> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        let Some(path) = &self.path else {
            return Err(InputError::Missing);
        };
        if path.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(InputError::Stdin)?;
            return Ok(buf);
        }
        fs::read_to_string(path).map_err(|source| InputError::File {
            path: path.clone(),
            source,
        })
    }
}

/// Reads the input or exits.
pub fn require_input(input: &InputSource) -> String {
    input.read().unwrap_or_else(|err| {
        eprintln!("error: {}", err);
        std::process::exit(1);
    })
}
