//! Runtime closure metadata supplied by the host's introspection facility.

use std::path::{Path, PathBuf};

/// Identifies an instance method a closure was created from, when the closure
/// is a bound method reference rather than a literal in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundMethod {
    pub class: String,
    pub method: String,
}

/// Opaque reference to a runtime closure. The exporter only reads from it:
/// where the literal was declared and what lightweight reflection knows about
/// its parameters and captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureHandle {
    file: PathBuf,
    start_line: usize,
    end_line: usize,
    params: Vec<String>,
    captured: Vec<String>,
    bound_method: Option<BoundMethod>,
}

impl ClosureHandle {
    /// Handle for a closure whose literal exists in a source file. Lines are
    /// 1-based, matching what the host runtime reports.
    pub fn from_source(
        file: impl Into<PathBuf>,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
            params: Vec::new(),
            captured: Vec::new(),
            bound_method: None,
        }
    }

    /// Handle for a closure with no backing source, e.g. one synthesized at
    /// runtime. Export of such a handle always takes the fallback path.
    pub fn synthetic() -> Self {
        Self {
            file: PathBuf::new(),
            start_line: 0,
            end_line: 0,
            params: Vec::new(),
            captured: Vec::new(),
            bound_method: None,
        }
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_captured<I, S>(mut self, captured: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.captured = captured.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the handle as a bound instance-method reference, enabling the
    /// forwarding-literal synthesis when no literal node exists at the line.
    pub fn with_bound_method(mut self, class: impl Into<String>, method: impl Into<String>) -> Self {
        self.bound_method = Some(BoundMethod {
            class: class.into(),
            method: method.into(),
        });
        self
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn captured(&self) -> &[String] {
        &self.captured
    }

    pub fn bound_method(&self) -> Option<&BoundMethod> {
        self.bound_method.as_ref()
    }
}
