//! Contract for the external text generator
//!
//! The orchestrator only needs "prompt in, text or failure out". Whatever
//! produces the text (a local model, a remote service, a recorded response)
//! sits behind [`TextGenerator`], and its output is always treated as
//! untrusted.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;

/// Sampling settings passed to the generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Hard cap on generated tokens
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 600,
            temperature: 0.1,
        }
    }
}

/// Failure of a generator invocation
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    #[error("failed to run generator command {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("generator command exited with {status}: {stderr}")]
    NonZeroExit { status: String, stderr: String },

    #[error("generator returned an empty response")]
    EmptyResponse,

    #[error("generator I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A source of candidate Java text
pub trait TextGenerator: Send + Sync {
    /// Short name used in log entries
    fn name(&self) -> &str;

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GeneratorError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GeneratorError> {
        (**self).generate(prompt, params)
    }
}

/// Generator for rule-based-only runs; every call fails
#[derive(Debug, Clone)]
pub struct UnavailableGenerator {
    reason: String,
}

impl UnavailableGenerator {
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self { reason: reason.into() }
    }
}

impl Default for UnavailableGenerator {
    fn default() -> Self {
        Self::new("no generator configured")
    }
}

impl TextGenerator for UnavailableGenerator {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String, GeneratorError> {
        Err(GeneratorError::Unavailable(self.reason.clone()))
    }
}

/// Returns the same response for every prompt, e.g. a recorded model answer
#[derive(Debug, Clone)]
pub struct FixedGenerator {
    name: String,
    response: String,
}

impl FixedGenerator {
    pub fn new<S: Into<String>>(response: S) -> Self {
        Self::named("fixed", response)
    }

    pub fn named<N: Into<String>, S: Into<String>>(name: N, response: S) -> Self {
        Self {
            name: name.into(),
            response: response.into(),
        }
    }
}

impl TextGenerator for FixedGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String, GeneratorError> {
        Ok(self.response.clone())
    }
}

/// Runs an external program, feeding the prompt on stdin and reading the
/// response from stdout. The sampling settings are passed in the
/// `COBOL2JAVA_MAX_TOKENS` and `COBOL2JAVA_TEMPERATURE` environment variables.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    name: String,
    program: PathBuf,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        let program = program.into();
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Self {
            name,
            program,
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }
}

impl TextGenerator for CommandGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, GeneratorError> {
        log::debug!("Running generator command {:?} {:?}", self.program, self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("COBOL2JAVA_MAX_TOKENS", params.max_tokens.to_string())
            .env("COBOL2JAVA_TEMPERATURE", params.temperature.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GeneratorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // stdin is written on its own thread: the child may fill stdout
        // before it has read the whole prompt.
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_string();
            std::thread::spawn(move || stdin.write_all(prompt.as_bytes()))
        });

        let output = child.wait_with_output()?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        if !output.status.success() {
            return Err(GeneratorError::NonZeroExit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let response = String::from_utf8_lossy(&output.stdout).into_owned();
        if response.trim().is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(response)
    }
}
