//! ExtractorManager - Public API for declaration extraction
//!
//! Picks the `DeclarationParser` for a file's grammar and turns parse
//! failures into `SurfaceError::Parse`. Stateless apart from the registry,
//! so one manager can be shared across worker threads.

use crate::error::{Result, SurfaceError};
use crate::extractors::base::{DeclarationParser, ExtractOptions, ModuleDeclarations};
use crate::extractors::python::PythonParser;
use std::path::Path;

/// Manager for all grammar parsers
pub struct ExtractorManager {
    parsers: Vec<Box<dyn DeclarationParser>>,
}

impl Default for ExtractorManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorManager {
    /// Manager with every built-in grammar registered
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(PythonParser)],
        }
    }

    /// Manager with an explicit parser set
    pub fn with_parsers(parsers: Vec<Box<dyn DeclarationParser>>) -> Self {
        Self { parsers }
    }

    /// Grammars this manager can route to
    pub fn supported_grammars(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|parser| parser.grammar()).collect()
    }

    /// Extract declarations from file content using the matching grammar
    ///
    /// `file_path` is the relative Unix-style path; it selects the grammar
    /// and is recorded in every span.
    pub fn extract_declarations(
        &self,
        file_path: &str,
        content: &str,
        options: ExtractOptions,
    ) -> Result<ModuleDeclarations> {
        let grammar = self.get_grammar_from_extension(file_path)?;
        let parser = self
            .parsers
            .iter()
            .find(|parser| parser.grammar() == grammar)
            .ok_or_else(|| {
                SurfaceError::Config(format!("No declaration parser registered for '{}'", grammar))
            })?;

        let declarations = parser
            .parse_declarations(file_path, content, options)
            .map_err(|failure| SurfaceError::Parse {
                file_path: file_path.to_string(),
                line: failure.line,
                message: failure.message,
            })?;

        tracing::debug!(
            "Extracted {} top-level declarations from {} file: {}",
            declarations.declarations.len(),
            grammar,
            file_path
        );
        Ok(declarations)
    }

    /// Determine grammar from file extension
    fn get_grammar_from_extension(&self, file_path: &str) -> Result<&'static str> {
        let extension = Path::new(file_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        crate::language::detect_grammar_from_extension(extension).ok_or_else(|| SurfaceError::Parse {
            file_path: file_path.to_string(),
            line: 0,
            message: format!("Unsupported file extension: '{}'", extension),
        })
    }
}
