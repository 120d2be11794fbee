//! Debug-info configuration.

use crate::flags::SourceLanguage;

/// Debug information detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugLevel {
    /// No debug information.
    #[default]
    None,
    /// Line tables only (file/line/column, no type info).
    LineTablesOnly,
    /// Full debug information (types, variables, scopes).
    Full,
}

impl DebugLevel {
    /// Emission-kind code recorded on compile units.
    pub(crate) fn emission_code(self) -> u64 {
        match self {
            Self::None => 0,
            Self::Full => 1,
            Self::LineTablesOnly => 2,
        }
    }

    /// Check if debug info should be generated at all.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::LineTablesOnly => write!(f, "line-tables"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Configuration for a debug-info builder session.
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Debug information detail level.
    pub level: DebugLevel,
    /// Source language recorded on the compile unit.
    pub language: SourceLanguage,
    /// Producer string identifying the compiler.
    pub producer: String,
    /// DWARF version to emit (4 or 5).
    pub dwarf_version: u32,
    /// Whether this is an optimized build.
    pub optimized: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            level: DebugLevel::None,
            language: SourceLanguage::default(),
            producer: String::new(),
            dwarf_version: 4,
            optimized: false,
        }
    }
}

impl DebugConfig {
    /// Create a configuration with the given level.
    #[must_use]
    pub fn new(level: DebugLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Full debug info, unoptimized.
    #[must_use]
    pub fn development() -> Self {
        Self::new(DebugLevel::Full)
    }

    #[must_use]
    pub fn with_language(mut self, language: SourceLanguage) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }

    #[must_use]
    pub fn with_dwarf_version(mut self, version: u32) -> Self {
        self.dwarf_version = version;
        self
    }

    #[must_use]
    pub fn with_optimized(mut self, optimized: bool) -> Self {
        self.optimized = optimized;
        self
    }
}
