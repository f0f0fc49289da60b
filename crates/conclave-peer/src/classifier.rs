use std::io::Write;
use std::process::{Command, Stdio};

use conclave_types::{ConclaveError, Label, Result};

/// The inference backend seam. Implementations may block; callers run them
/// on a blocking thread.
pub trait Classifier: Send + Sync {
    /// Produce a label for one image.
    fn classify(&self, image: &[u8]) -> Result<Label>;

    fn name(&self) -> &str;
}

/// Classifier that delegates to an external command as a subprocess. The
/// image bytes are piped to the command's stdin and the label is whatever
/// it prints to stdout.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
}

impl CommandClassifier {
    /// Split a shell-ish command line into program + arguments. Quoting is
    /// not interpreted; wrap complex pipelines in a script instead.
    pub fn new(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| ConclaveError::Classifier("empty classifier command".to_string()))?;
        Ok(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }
}

impl Classifier for CommandClassifier {
    fn classify(&self, image: &[u8]) -> Result<Label> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                ConclaveError::Classifier(format!("failed to spawn '{}': {e}", self.program))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(image)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(ConclaveError::Classifier(format!(
                "'{}' exited with {}",
                self.program, output.status
            )));
        }

        let label = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if label.is_empty() {
            return Err(ConclaveError::Classifier(format!(
                "'{}' produced no label",
                self.program
            )));
        }
        Ok(label)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Classifier that always answers the same label. Useful for demos and for
/// exercising the swarm without a real model.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    label: Label,
}

impl FixedClassifier {
    pub fn new(label: impl Into<Label>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, _image: &[u8]) -> Result<Label> {
        Ok(self.label.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_classifier_ignores_the_image() {
        let classifier = FixedClassifier::new("4");
        assert_eq!(classifier.classify(b"anything").unwrap(), "4");
        assert_eq!(classifier.classify(b"").unwrap(), "4");
    }

    #[test]
    fn test_command_parsing_splits_program_and_args() {
        let classifier = CommandClassifier::new("python3 classify.py --fast").unwrap();
        assert_eq!(classifier.program, "python3");
        assert_eq!(classifier.args, vec!["classify.py", "--fast"]);
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(CommandClassifier::new("   ").is_err());
    }

    #[test]
    fn test_command_classifier_echoes_through_cat() {
        // cat copies stdin to stdout, so the "label" is the image itself.
        let classifier = CommandClassifier::new("cat").unwrap();
        assert_eq!(classifier.classify(b"7\n").unwrap(), "7");
    }

    #[test]
    fn test_missing_program_is_a_classifier_error() {
        let classifier = CommandClassifier::new("definitely-not-a-real-binary").unwrap();
        let err = classifier.classify(b"x").unwrap_err();
        assert!(matches!(err, ConclaveError::Classifier(_)));
    }

    #[test]
    fn test_silent_program_is_a_classifier_error() {
        // true exits zero without printing anything.
        let classifier = CommandClassifier::new("true").unwrap();
        let err = classifier.classify(b"x").unwrap_err();
        assert!(matches!(err, ConclaveError::Classifier(_)));
    }

    #[test]
    fn test_failing_program_is_a_classifier_error() {
        let classifier = CommandClassifier::new("false").unwrap();
        let err = classifier.classify(b"x").unwrap_err();
        assert!(matches!(err, ConclaveError::Classifier(_)));
    }
}
