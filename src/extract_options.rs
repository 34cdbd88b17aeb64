//! Options for document extraction.

use crate::model::SourceMethod;
use crate::normalize::NormalizeOptions;

/// Options for controlling extraction behavior.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Whether to normalize the text before parsing.
    pub normalize: bool,

    /// Normalizer stages to run.
    pub normalize_options: NormalizeOptions,

    /// How the text was obtained (recorded on the document).
    pub source: SourceMethod,

    /// Whether batch extraction runs in parallel.
    pub parallel: bool,

    /// Worker threads for batch extraction (`None` = rayon's global pool).
    pub threads: Option<usize>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            normalize_options: NormalizeOptions::default(),
            source: SourceMethod::Text,
            parallel: true,
            threads: None,
        }
    }
}

impl ExtractOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the input as OCR output.
    pub fn ocr(mut self) -> Self {
        self.source = SourceMethod::Ocr;
        self
    }

    /// Sets the source method.
    pub fn with_source(mut self, source: SourceMethod) -> Self {
        self.source = source;
        self
    }

    /// Skips normalization; the text is parsed as given.
    pub fn without_normalization(mut self) -> Self {
        self.normalize = false;
        self
    }

    /// Sets the normalizer stages.
    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.normalize = true;
        self.normalize_options = options;
        self
    }

    /// Disables parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Sets the number of worker threads for batch extraction.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self.parallel = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert!(options.normalize);
        assert!(options.parallel);
        assert_eq!(options.source, SourceMethod::Text);
        assert_eq!(options.threads, None);
    }

    #[test]
    fn test_builder_chain() {
        let options = ExtractOptions::new().ocr().sequential().without_normalization();
        assert_eq!(options.source, SourceMethod::Ocr);
        assert!(!options.parallel);
        assert!(!options.normalize);
    }

    #[test]
    fn test_threads_clamped_and_enable_parallel() {
        let options = ExtractOptions::new().sequential().with_threads(0);
        assert_eq!(options.threads, Some(1));
        assert!(options.parallel);
    }

    #[test]
    fn test_normalize_options_reenable_normalization() {
        let options = ExtractOptions::new()
            .without_normalization()
            .with_normalize_options(NormalizeOptions::minimal());
        assert!(options.normalize);
        assert!(!options.normalize_options.collapse_syllables);
    }
}
