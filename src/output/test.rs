//! Test output implementation for verifying command output in tests.
//!
//! This captures all output as structured data for easy assertions.

use super::{Output, OutputConfig};

/// Represents a single output entry captured during testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputEntry {
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
    Debug(String),
    Step(String),
    Result(String),
    Detail { key: String, value: String },
    ListItem(String),
    OperationStart(String),
    OperationEnd { operation: String, success: bool },
    Raw(String),
}

/// Test output implementation that captures all output for assertions.
#[derive(Debug, Default)]
pub struct TestOutput {
    config: OutputConfig,
    entries: Vec<OutputEntry>,
}

impl TestOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OutputConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
        }
    }

    pub fn quiet() -> Self {
        Self::with_config(OutputConfig::new(true, false))
    }

    pub fn verbose() -> Self {
        Self::with_config(OutputConfig::new(false, true))
    }

    pub fn entries(&self) -> &[OutputEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn infos(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                OutputEntry::Info(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn successes(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                OutputEntry::Success(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                OutputEntry::Warning(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                OutputEntry::Error(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn steps(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                OutputEntry::Step(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                OutputEntry::Result(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_step(&self, substring: &str) -> bool {
        self.steps().iter().any(|s| s.contains(substring))
    }

    pub fn has_result(&self, substring: &str) -> bool {
        self.results().iter().any(|s| s.contains(substring))
    }

    pub fn list_items(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                OutputEntry::ListItem(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn raw_outputs(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                OutputEntry::Raw(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_info(&self, substring: &str) -> bool {
        self.infos().iter().any(|s| s.contains(substring))
    }

    pub fn has_success(&self, substring: &str) -> bool {
        self.successes().iter().any(|s| s.contains(substring))
    }

    pub fn has_warning(&self, substring: &str) -> bool {
        self.warnings().iter().any(|s| s.contains(substring))
    }

    pub fn has_error(&self, substring: &str) -> bool {
        self.errors().iter().any(|s| s.contains(substring))
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, OutputEntry::Error(_)))
    }

    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, OutputEntry::Warning(_)))
    }
}

impl Output for TestOutput {
    fn info(&mut self, msg: &str) {
        if !self.config.quiet {
            self.entries.push(OutputEntry::Info(msg.to_string()));
        }
    }

    fn success(&mut self, msg: &str) {
        if !self.config.quiet {
            self.entries.push(OutputEntry::Success(msg.to_string()));
        }
    }

    fn warning(&mut self, msg: &str) {
        self.entries.push(OutputEntry::Warning(msg.to_string()));
    }

    fn error(&mut self, msg: &str) {
        self.entries.push(OutputEntry::Error(msg.to_string()));
    }

    fn debug(&mut self, msg: &str) {
        if self.config.verbose {
            self.entries.push(OutputEntry::Debug(msg.to_string()));
        }
    }

    fn step(&mut self, msg: &str) {
        if self.config.verbose && !self.config.quiet {
            self.entries.push(OutputEntry::Step(msg.to_string()));
        }
    }

    fn result(&mut self, msg: &str) {
        if !self.config.quiet {
            self.entries.push(OutputEntry::Result(msg.to_string()));
        }
    }

    fn detail(&mut self, key: &str, value: &str) {
        if !self.config.quiet {
            self.entries.push(OutputEntry::Detail {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }

    fn list_item(&mut self, item: &str) {
        if !self.config.quiet {
            self.entries.push(OutputEntry::ListItem(item.to_string()));
        }
    }

    fn operation_start(&mut self, operation: &str) {
        self.entries
            .push(OutputEntry::OperationStart(operation.to_string()));
    }

    fn operation_end(&mut self, operation: &str, success: bool) {
        self.entries.push(OutputEntry::OperationEnd {
            operation: operation.to_string(),
            success,
        });
    }

    fn raw(&mut self, content: &str) {
        self.entries.push(OutputEntry::Raw(content.to_string()));
    }

    fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    fn is_verbose(&self) -> bool {
        self.config.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_info() {
        let mut output = TestOutput::new();
        output.info("Hello world");
        assert_eq!(output.infos(), vec!["Hello world"]);
        assert!(output.has_info("world"));
    }

    #[test]
    fn test_captures_warnings_and_errors() {
        let mut output = TestOutput::new();
        output.warning("Something is fishy");
        output.error("Something went wrong");

        assert!(output.has_warnings());
        assert!(output.has_errors());
        assert!(output.has_warning("fishy"));
        assert!(output.has_error("wrong"));
    }

    #[test]
    fn test_quiet_mode_suppresses_info() {
        let mut output = TestOutput::quiet();
        output.info("Should not appear");
        output.warning("Should appear");

        assert!(output.infos().is_empty());
        assert!(!output.warnings().is_empty());
    }

    #[test]
    fn test_verbose_mode_enables_debug() {
        let mut output = TestOutput::verbose();
        output.debug("Debug message");
        assert!(output.entries().iter().any(|e| matches!(e, OutputEntry::Debug(s) if s == "Debug message")));

        let mut non_verbose = TestOutput::new();
        non_verbose.debug("Should not appear");
        assert!(non_verbose
            .entries()
            .iter()
            .all(|e| !matches!(e, OutputEntry::Debug(_))));
    }

    #[test]
    fn test_detail_and_list_item() {
        let mut output = TestOutput::new();
        output.detail("Path", "/some/path");
        output.list_item("item one");
        output.list_item("item two");

        assert_eq!(output.list_items(), vec!["item one", "item two"]);
        assert!(output.entries().iter().any(|e| matches!(
            e,
            OutputEntry::Detail { key, value } if key == "Path" && value == "/some/path"
        )));
    }

    #[test]
    fn test_clear() {
        let mut output = TestOutput::new();
        output.info("Message");
        output.clear();
        assert!(output.entries().is_empty());
    }
}
