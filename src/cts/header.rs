use crate::cts::normalize::TextCleaner;
use crate::cts::xml_tree::XmlElement;
use crate::model::ReferencePattern;

const REF_PATTERN_PATH: &[&str] = &["teiHeader", "encodingDesc", "refsDecl", "cRefPattern"];
const TITLE_PATH: &[&str] = &["teiHeader", "fileDesc", "titleStmt", "title"];
const AUTHOR_PATH: &[&str] = &["teiHeader", "fileDesc", "titleStmt", "author"];
const LANGUAGE_PATH: &[&str] = &["teiHeader", "profileDesc", "langUsage", "language"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    pub patterns: Vec<ReferencePattern>,
    pub titles: Vec<String>,
    pub authors: Vec<String>,
    pub languages: Vec<String>,
}

impl DocumentHeader {
    pub fn parse(root: &XmlElement, source: &str) -> Self {
        let patterns = root
            .select_path(REF_PATTERN_PATH)
            .into_iter()
            .map(|element| ReferencePattern {
                literal_path: element
                    .attribute("replacementPattern")
                    .unwrap_or_default()
                    .to_string(),
                kind: element.attribute("n").unwrap_or_default().to_string(),
            })
            .collect();

        let inner_values = |path: &[&str]| {
            root.select_path(path)
                .into_iter()
                .map(|element| element.inner_xml(source).to_string())
                .collect::<Vec<String>>()
        };

        let languages = root
            .select_path(LANGUAGE_PATH)
            .into_iter()
            .map(|element| element.attribute("ident").unwrap_or_default().to_string())
            .collect();

        Self {
            patterns,
            titles: inner_values(TITLE_PATH),
            authors: inner_values(AUTHOR_PATH),
            languages,
        }
    }

    pub fn group_name(&self, cleaner: &TextCleaner) -> String {
        cleaner.clean_header_value(&self.authors.join(","))
    }

    pub fn work_title(&self, cleaner: &TextCleaner) -> String {
        cleaner.clean_header_value(&self.titles.join(","))
    }

    pub fn language(&self) -> String {
        self.languages.join(",")
    }

    /// Pattern kinds from least to most specific (shortest literal first, declaration order on ties).
    pub fn citation_scheme_label(&self) -> String {
        let mut ordered = self.patterns.iter().collect::<Vec<&ReferencePattern>>();
        ordered.sort_by_key(|pattern| pattern.literal_path.len());
        ordered
            .iter()
            .map(|pattern| pattern.kind.as_str())
            .collect::<Vec<&str>>()
            .join(",")
    }
}
