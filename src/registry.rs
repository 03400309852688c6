//! Collector command registry.
//!
//! Holds the ordered list of collector shell commands loaded from the
//! configuration file. The list is loaded once at startup and never
//! mutated afterwards; its order is the execution order for every cycle.

use std::path::Path;

use thiserror::Error;

/// Upper bound on concatenated command text, counting one separator byte
/// per command (8 KiB).
pub const COMMAND_CAPACITY: usize = 8 * 1024;

/// Errors that can occur while loading the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered, bounded list of collector command strings.
#[derive(Debug, Default)]
pub struct CollectorRegistry {
    commands: Vec<String>,
}

impl CollectorRegistry {
    /// Load the registry from a configuration file.
    ///
    /// # Errors
    /// Returns [`RegistryError::Io`] if the file cannot be read. An
    /// over-capacity configuration is not an error; see [`Self::parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::parse(&content))
    }

    /// Parse newline-delimited command strings.
    ///
    /// Blank lines and lines whose first non-whitespace character is `#`
    /// are skipped. Commands are kept in file order. Once the total
    /// command text would exceed [`COMMAND_CAPACITY`], loading stops
    /// early with a warning and the remaining lines are discarded —
    /// accepted commands are always complete, never truncated mid-string.
    pub fn parse(content: &str) -> Self {
        let mut commands = Vec::new();
        let mut used = 0;

        for line in content.lines() {
            let command = line.trim();
            if command.is_empty() || command.starts_with('#') {
                continue;
            }

            // Budget counts the command bytes plus one separator byte.
            let cost = command.len() + 1;
            if used + cost > COMMAND_CAPACITY - 1 {
                tracing::warn!(
                    capacity = COMMAND_CAPACITY,
                    accepted = commands.len(),
                    "too many collectors defined, truncating"
                );
                break;
            }
            used += cost;

            tracing::debug!(command, "read collector command");
            commands.push(command.to_owned());
        }

        Self { commands }
    }

    /// Registered commands, in execution order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Number of registered collectors.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the registry holds no collectors.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_skips_blanks_and_comments() {
        let registry = CollectorRegistry::parse(
            "# collectors\n\
             \n\
             echo one\n\
             \t  \n\
             it's not a comment # really\n\
               # indented comment\n\
             echo two\n",
        );
        assert_eq!(
            registry.commands(),
            ["echo one", "it's not a comment # really", "echo two"]
        );
    }

    #[test]
    fn test_parse_preserves_order() {
        let registry = CollectorRegistry::parse("c\nb\na\n");
        assert_eq!(registry.commands(), ["c", "b", "a"]);
    }

    #[test]
    fn test_parse_empty_input() {
        let registry = CollectorRegistry::parse("");
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_truncation_at_capacity() {
        // Each command costs len + 1 bytes of the 8 KiB budget.
        let command = "x".repeat(1023); // cost 1024
        let mut content = String::new();
        for _ in 0..10 {
            content.push_str(&command);
            content.push('\n');
        }

        let registry = CollectorRegistry::parse(&content);
        // 8 commands cost 8192 > 8191, so only 7 fit.
        assert_eq!(registry.len(), 7);
        // No partial command text survives truncation.
        for cmd in registry.commands() {
            assert_eq!(cmd.len(), 1023);
        }
    }

    #[test]
    fn test_truncation_skips_oversized_tail_only() {
        let big = "y".repeat(COMMAND_CAPACITY); // can never fit
        let content = format!("echo first\n{big}\necho never-reached\n");
        let registry = CollectorRegistry::parse(&content);
        assert_eq!(registry.commands(), ["echo first"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# sample config").unwrap();
        writeln!(file, "cat /proc/loadavg").unwrap();
        file.flush().unwrap();

        let registry = CollectorRegistry::load(file.path()).unwrap();
        assert_eq!(registry.commands(), ["cat /proc/loadavg"]);
    }

    #[test]
    fn test_load_missing_file() {
        let result = CollectorRegistry::load("/nonexistent/skopos.conf");
        assert!(matches!(result, Err(RegistryError::Io(_))));
    }
}
