//! Rendering options for Markdown output.

/// Options for Markdown rendering.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Whether to include metadata as YAML frontmatter.
    pub include_frontmatter: bool,

    /// Whether to render incident bodies below their headings.
    pub include_bodies: bool,

    /// Whether to render the raw sanction-table rows.
    pub include_details: bool,

    /// Whether to append the quality report.
    pub include_quality: bool,

    /// Heading level of the incident headings (1-6).
    pub incident_heading_level: u8,

    /// Whether to escape special Markdown characters in text.
    pub escape_special_chars: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: false,
            include_bodies: true,
            include_details: false,
            include_quality: false,
            incident_heading_level: 3,
            escape_special_chars: false,
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables YAML frontmatter output.
    pub fn with_frontmatter(mut self) -> Self {
        self.include_frontmatter = true;
        self
    }

    /// Renders the raw sanction-table rows as a code block.
    pub fn with_details(mut self) -> Self {
        self.include_details = true;
        self
    }

    /// Appends the quality report.
    pub fn with_quality_report(mut self) -> Self {
        self.include_quality = true;
        self
    }

    /// Renders incident titles only.
    pub fn without_bodies(mut self) -> Self {
        self.include_bodies = false;
        self
    }

    /// Sets the incident heading level, clamped to 1-6.
    pub fn with_incident_heading_level(mut self, level: u8) -> Self {
        self.incident_heading_level = level.clamp(1, 6);
        self
    }

    /// Escapes Markdown special characters in extracted text.
    pub fn with_escaping(mut self) -> Self {
        self.escape_special_chars = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(RenderOptions::new().with_incident_heading_level(0).incident_heading_level, 1);
        assert_eq!(RenderOptions::new().with_incident_heading_level(9).incident_heading_level, 6);
        assert_eq!(RenderOptions::new().with_incident_heading_level(4).incident_heading_level, 4);
    }

    #[test]
    fn test_builder_chain() {
        let options = RenderOptions::new()
            .with_frontmatter()
            .with_details()
            .with_quality_report()
            .without_bodies();
        assert!(options.include_frontmatter);
        assert!(options.include_details);
        assert!(options.include_quality);
        assert!(!options.include_bodies);
    }
}
