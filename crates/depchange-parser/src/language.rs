// ABOUTME: Defines the source dialects whose imports the resolver can follow.
// ABOUTME: Maps file extensions to Tree-sitter grammars and builds configured parsers.
use std::collections::HashMap;
use std::path::Path;
use tree_sitter::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    TypeScript,
    Tsx,
    JavaScript,
}

pub struct LanguageConfig {
    pub language: tree_sitter::Language,
    pub file_extensions: Vec<&'static str>,
}

pub struct LanguageRegistry {
    configs: HashMap<SourceKind, LanguageConfig>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut configs = HashMap::new();

        configs.insert(
            SourceKind::TypeScript,
            LanguageConfig {
                language: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                file_extensions: vec!["ts", "mts", "cts"],
            },
        );

        configs.insert(
            SourceKind::Tsx,
            LanguageConfig {
                language: tree_sitter_typescript::LANGUAGE_TSX.into(),
                file_extensions: vec!["tsx"],
            },
        );

        // The JavaScript grammar accepts JSX, so .js files written with JSX parse too.
        configs.insert(
            SourceKind::JavaScript,
            LanguageConfig {
                language: tree_sitter_javascript::LANGUAGE.into(),
                file_extensions: vec!["js", "jsx", "mjs", "cjs"],
            },
        );

        Self { configs }
    }

    pub fn detect_language(&self, file_path: &Path) -> Option<SourceKind> {
        let extension = file_path.extension()?.to_str()?;

        for (kind, config) in &self.configs {
            if config.file_extensions.contains(&extension) {
                return Some(*kind);
            }
        }

        None
    }

    pub fn get_config(&self, kind: SourceKind) -> Option<&LanguageConfig> {
        self.configs.get(&kind)
    }

    pub fn create_parser(&self, kind: SourceKind) -> Option<Parser> {
        let config = self.get_config(kind)?;
        let mut parser = Parser::new();
        parser.set_language(&config.language).ok()?;
        Some(parser)
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
