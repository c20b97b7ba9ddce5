//! Static catalog of recognised citation schemes and the classifier that maps a
//! document's declared reference patterns onto it.
//!
//! Every descriptor lists the normalized spellings it accepts. Lookup is exact
//! string equality after [`PatternNormalizer::normalize`]; new tolerance is added
//! by adding spellings, never by loosening the match.

use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Serialize;

use crate::cts::plan::DescentPlan;
use crate::model::ReferencePattern;

use self::PathStep as S;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemeId {
    BodyDiv,
    BodyDiv2,
    BodyDiv3,
    BodyDescendantLine,
    Div,
    Div2,
    Div3,
    Div4,
    NestedDiv,
    Paragraph,
    ParagraphSeg,
    Line,
    DivParagraph,
    DivAb,
    DivLine,
    DivLineGroupLine,
    DivParagraphCit,
    Div2Paragraph,
    Div2Line,
    Div2Cit,
    Div3Paragraph,
    DescendantDiv,
    DescendantFragment,
    DescendantLine,
    ParagraphDescendantLine,
    DivDescendantDiv,
    DivDescendantLine,
    Div2DescendantDiv,
}

impl SchemeId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BodyDiv => "body-div",
            Self::BodyDiv2 => "body-div2",
            Self::BodyDiv3 => "body-div3",
            Self::BodyDescendantLine => "body-descendant-line",
            Self::Div => "div",
            Self::Div2 => "div2",
            Self::Div3 => "div3",
            Self::Div4 => "div4",
            Self::NestedDiv => "nested-div",
            Self::Paragraph => "paragraph",
            Self::ParagraphSeg => "paragraph-seg",
            Self::Line => "line",
            Self::DivParagraph => "div-paragraph",
            Self::DivAb => "div-ab",
            Self::DivLine => "div-line",
            Self::DivLineGroupLine => "div-line-group-line",
            Self::DivParagraphCit => "div-paragraph-cit",
            Self::Div2Paragraph => "div2-paragraph",
            Self::Div2Line => "div2-line",
            Self::Div2Cit => "div2-cit",
            Self::Div3Paragraph => "div3-paragraph",
            Self::DescendantDiv => "descendant-div",
            Self::DescendantFragment => "descendant-fragment",
            Self::DescendantLine => "descendant-line",
            Self::ParagraphDescendantLine => "paragraph-descendant-line",
            Self::DivDescendantDiv => "div-descendant-div",
            Self::DivDescendantLine => "div-descendant-line",
            Self::Div2DescendantDiv => "div2-descendant-div",
        }
    }
}

impl fmt::Display for SchemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthMode {
    Child,
    ArbitraryDescendant,
}

/// One level of a descent plan, relative to the document's `body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub element_name: &'static str,
    pub depth_mode: DepthMode,
    pub captures_number: bool,
    pub is_terminal: bool,
}

impl PathStep {
    /// Structural wrapper: descended into, contributes nothing to the identifier.
    pub const fn child(element_name: &'static str) -> Self {
        Self {
            element_name,
            depth_mode: DepthMode::Child,
            captures_number: false,
            is_terminal: false,
        }
    }

    pub const fn numbered(element_name: &'static str) -> Self {
        Self {
            element_name,
            depth_mode: DepthMode::Child,
            captures_number: true,
            is_terminal: false,
        }
    }

    pub const fn leaf(element_name: &'static str) -> Self {
        Self {
            element_name,
            depth_mode: DepthMode::Child,
            captures_number: true,
            is_terminal: true,
        }
    }

    pub const fn descendant_leaf(element_name: &'static str) -> Self {
        Self {
            element_name,
            depth_mode: DepthMode::ArbitraryDescendant,
            captures_number: true,
            is_terminal: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SchemeDescriptor {
    pub id: SchemeId,
    pub steps: &'static [PathStep],
    pub spellings: &'static [&'static str],
}

pub static SCHEME_TABLE: &[SchemeDescriptor] = &[
    SchemeDescriptor {
        id: SchemeId::BodyDiv,
        steps: &[S::leaf("div")],
        spellings: &[
            "/TEI/text/body/div[@n='$1']",
            "/TEI.2/text/body/div[@n='$1']",
        ],
    },
    SchemeDescriptor {
        id: SchemeId::BodyDiv2,
        steps: &[S::numbered("div"), S::leaf("div")],
        spellings: &[
            "/TEI/text/body/div[@n='$1']/div[@n='$2']",
            "/TEI.2/text/body/div[@n='$1']/div[@n='$2']",
        ],
    },
    SchemeDescriptor {
        id: SchemeId::BodyDiv3,
        steps: &[S::numbered("div"), S::numbered("div"), S::leaf("div")],
        spellings: &["/TEI.2/text/body/div[@n='$1']/div[@n='$2']/div[@n='$3']"],
    },
    SchemeDescriptor {
        id: SchemeId::BodyDescendantLine,
        steps: &[S::descendant_leaf("l")],
        spellings: &["/TEI/text/body//l[@n='$1']"],
    },
    SchemeDescriptor {
        id: SchemeId::Div,
        steps: &[S::child("div"), S::leaf("div")],
        spellings: &[
            "/TEI/text/body/div/div[@n='$1']",
            "/TEI/text/body/div[@type='edition']/div[@n='$1']",
        ],
    },
    SchemeDescriptor {
        id: SchemeId::Div2,
        steps: &[S::child("div"), S::numbered("div"), S::leaf("div")],
        spellings: &[
            "/TEI/text/body/div/div[@n='$1']/div[@n='$2']",
            "/TEI/text/body/div[@type='edition']/div[@n='$1']/div[@n='$2']",
            "/TEI/text/body/div[@type='translation']/div[@n='$1']/div[@n='$2']",
        ],
    },
    SchemeDescriptor {
        id: SchemeId::Div3,
        steps: &[
            S::child("div"),
            S::numbered("div"),
            S::numbered("div"),
            S::leaf("div"),
        ],
        spellings: &[
            "/TEI/text/body/div/div[@n='$1']/div[@n='$2']/div[@n='$3']",
            "/TEI/text/body/div[@type='edition']/div[@n='$1']/div[@n='$2']/div[@n='$3']",
        ],
    },
    SchemeDescriptor {
        id: SchemeId::Div4,
        steps: &[
            S::child("div"),
            S::numbered("div"),
            S::numbered("div"),
            S::numbered("div"),
            S::leaf("div"),
        ],
        spellings: &[
            "/TEI/text/body/div/div[@n='$1']/div[@n='$2']/div[@n='$3']/div[@n='$4']",
        ],
    },
    SchemeDescriptor {
        id: SchemeId::NestedDiv,
        steps: &[S::child("div"), S::child("div"), S::leaf("div")],
        spellings: &["/TEI/text/body/div/div/div[@n='$1']"],
    },
    SchemeDescriptor {
        id: SchemeId::Paragraph,
        steps: &[S::child("div"), S::leaf("p")],
        spellings: &["/TEI/text/body/div/p[@n='$1']"],
    },
    SchemeDescriptor {
        id: SchemeId::ParagraphSeg,
        steps: &[S::child("div"), S::child("p"), S::leaf("seg")],
        spellings: &["/TEI/text/body/div/p/seg[@n='$1']"],
    },
    SchemeDescriptor {
        id: SchemeId::Line,
        steps: &[S::child("div"), S::leaf("l")],
        spellings: &["/TEI/text/body/div/l[@n='$1']"],
    },
    SchemeDescriptor {
        id: SchemeId::DivParagraph,
        steps: &[S::child("div"), S::numbered("div"), S::leaf("p")],
        spellings: &["/TEI/text/body/div/div[@n='$1']/p[@n='$2']"],
    },
    SchemeDescriptor {
        id: SchemeId::DivAb,
        steps: &[S::child("div"), S::numbered("div"), S::leaf("ab")],
        spellings: &["/TEI/text/body/div/div[@n='$1']/ab[@n='$2']"],
    },
    SchemeDescriptor {
        id: SchemeId::DivLine,
        steps: &[S::child("div"), S::numbered("div"), S::leaf("l")],
        spellings: &["/TEI/text/body/div/div[@n='$1']/l[@n='$2']"],
    },
    SchemeDescriptor {
        id: SchemeId::DivLineGroupLine,
        steps: &[
            S::child("div"),
            S::numbered("div"),
            S::child("lg"),
            S::leaf("l"),
        ],
        spellings: &["/TEI/text/body/div/div[@n='$1']/lg/l[@n='$2']"],
    },
    SchemeDescriptor {
        id: SchemeId::DivParagraphCit,
        steps: &[
            S::child("div"),
            S::numbered("div"),
            S::numbered("p"),
            S::leaf("cit"),
        ],
        spellings: &["/TEI/text/body/div/div[@n='$1']/p[@n='$2']/cit[@n='$3']"],
    },
    SchemeDescriptor {
        id: SchemeId::Div2Paragraph,
        steps: &[
            S::child("div"),
            S::numbered("div"),
            S::numbered("div"),
            S::leaf("p"),
        ],
        spellings: &[
            "/TEI/text/body/div/div[@n='$1']/div[@n='$2']/p[@n='$3']",
            "/TEI/text/body/div[@type='edition']/div[@n='$1']/div[@n='$2']/p[@n='$3']",
        ],
    },
    SchemeDescriptor {
        id: SchemeId::Div2Line,
        steps: &[
            S::child("div"),
            S::numbered("div"),
            S::numbered("div"),
            S::leaf("l"),
        ],
        spellings: &["/TEI/text/body/div/div[@n='$1']/div[@n='$2']/l[@n='$3']"],
    },
    SchemeDescriptor {
        id: SchemeId::Div2Cit,
        steps: &[
            S::child("div"),
            S::numbered("div"),
            S::numbered("div"),
            S::leaf("cit"),
        ],
        spellings: &["/TEI/text/body/div/div[@n='$1']/div[@n='$2']/cit[@n='$3']"],
    },
    SchemeDescriptor {
        id: SchemeId::Div3Paragraph,
        steps: &[
            S::child("div"),
            S::numbered("div"),
            S::numbered("div"),
            S::numbered("div"),
            S::leaf("p"),
        ],
        spellings: &[
            "/TEI/text/body/div/div[@n='$1']/div[@n='$2']/div[@n='$3']/p[@n='$4']",
        ],
    },
    SchemeDescriptor {
        id: SchemeId::DescendantDiv,
        steps: &[S::child("div"), S::descendant_leaf("div")],
        spellings: &["/TEI/text/body/div//div[@n='$1']"],
    },
    SchemeDescriptor {
        id: SchemeId::DescendantFragment,
        steps: &[S::child("div"), S::child("div"), S::descendant_leaf("div")],
        spellings: &["/TEI/text/body/div/div//div[@subtype='fragment'][@n='$1']"],
    },
    SchemeDescriptor {
        id: SchemeId::DescendantLine,
        steps: &[S::child("div"), S::descendant_leaf("l")],
        spellings: &[
            "/TEI/text/body/div//l[@n='$1']",
            "/TEI/text/body/div/sp/l[@n='$1']",
        ],
    },
    SchemeDescriptor {
        id: SchemeId::ParagraphDescendantLine,
        steps: &[S::child("div"), S::child("p"), S::descendant_leaf("l")],
        spellings: &["/TEI/text/body/div/p//l[@n='$1']"],
    },
    SchemeDescriptor {
        id: SchemeId::DivDescendantDiv,
        steps: &[
            S::child("div"),
            S::numbered("div"),
            S::descendant_leaf("div"),
        ],
        spellings: &["/TEI/text/body/div/div[@n='$1']//div[@n='$2']"],
    },
    SchemeDescriptor {
        id: SchemeId::DivDescendantLine,
        steps: &[S::child("div"), S::numbered("div"), S::descendant_leaf("l")],
        spellings: &["/TEI/text/body/div/div[@n='$1']//l[@n='$2']"],
    },
    SchemeDescriptor {
        id: SchemeId::Div2DescendantDiv,
        steps: &[
            S::child("div"),
            S::numbered("div"),
            S::numbered("div"),
            S::descendant_leaf("div"),
        ],
        spellings: &["/TEI/text/body/div/div[@n='$1']/div[@n='$2']//div[@n='$3']"],
    },
];

/// Collapses cosmetic differences between spellings of the same reference pattern.
#[derive(Debug, Clone)]
pub struct PatternNormalizer {
    namespace_prefix: Regex,
    numbered_division: Regex,
}

impl PatternNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            namespace_prefix: Regex::new(r"/[A-Za-z_][\w.\-]*:")
                .context("failed to compile namespace prefix regex")?,
            numbered_division: Regex::new(r"/div[1-9]\b")
                .context("failed to compile numbered division regex")?,
        })
    }

    pub fn normalize(&self, literal: &str) -> String {
        let trimmed = literal.trim();
        let unwrapped = match trimmed.strip_prefix("#xpath(") {
            Some(rest) => rest.strip_suffix(')').unwrap_or(rest),
            None => trimmed,
        };
        let unescaped = unwrapped.replace("\\'", "'");
        let unprefixed = self.namespace_prefix.replace_all(&unescaped, "/");
        self.numbered_division
            .replace_all(&unprefixed, "/div")
            .into_owned()
    }
}

/// Result of classifying one document's declared patterns.
#[derive(Debug, Clone)]
pub enum Classification {
    NoPattern,
    Unclassified {
        literal: String,
        canonical: String,
    },
    Matched {
        plan: DescentPlan,
        literal: String,
        canonical: String,
    },
}

/// The most specific declared pattern: longest literal, first declared on ties.
pub fn select_canonical_pattern(patterns: &[ReferencePattern]) -> Option<&ReferencePattern> {
    let mut best: Option<&ReferencePattern> = None;
    for pattern in patterns {
        match best {
            Some(current) if pattern.literal_path.len() <= current.literal_path.len() => {}
            _ => best = Some(pattern),
        }
    }
    best
}

/// Validated, process-wide lookup from normalized spelling to descent plan.
#[derive(Debug, Clone)]
pub struct SchemeCatalog {
    normalizer: PatternNormalizer,
    plans: Vec<DescentPlan>,
    by_spelling: HashMap<&'static str, usize>,
}

impl SchemeCatalog {
    pub fn new() -> Result<Self> {
        Self::from_table(SCHEME_TABLE)
    }

    pub fn from_table(table: &'static [SchemeDescriptor]) -> Result<Self> {
        let normalizer = PatternNormalizer::new()?;
        let mut plans = Vec::with_capacity(table.len());
        let mut by_spelling = HashMap::new();
        let mut seen_ids = Vec::with_capacity(table.len());

        for descriptor in table {
            if seen_ids.contains(&descriptor.id) {
                bail!("scheme {} is declared twice", descriptor.id);
            }
            seen_ids.push(descriptor.id);

            let plan = DescentPlan::compile(descriptor)
                .with_context(|| format!("invalid descent plan for scheme {}", descriptor.id))?;
            let index = plans.len();
            plans.push(plan);

            if descriptor.spellings.is_empty() {
                bail!("scheme {} accepts no spelling", descriptor.id);
            }
            for spelling in descriptor.spellings {
                if normalizer.normalize(spelling) != *spelling {
                    bail!(
                        "spelling for scheme {} is not in normalized form: {spelling}",
                        descriptor.id
                    );
                }
                if let Some(previous) = by_spelling.insert(*spelling, index) {
                    bail!(
                        "spelling {spelling} is claimed by both {} and {}",
                        plans[previous].scheme(),
                        descriptor.id
                    );
                }
            }
        }

        Ok(Self {
            normalizer,
            plans,
            by_spelling,
        })
    }

    pub fn plans(&self) -> &[DescentPlan] {
        &self.plans
    }

    pub fn normalize(&self, literal: &str) -> String {
        self.normalizer.normalize(literal)
    }

    pub fn lookup(&self, literal: &str) -> Option<DescentPlan> {
        let canonical = self.normalize(literal);
        self.by_spelling
            .get(canonical.as_str())
            .map(|index| self.plans[*index])
    }

    pub fn classify(&self, patterns: &[ReferencePattern]) -> Classification {
        let Some(pattern) = select_canonical_pattern(patterns) else {
            return Classification::NoPattern;
        };

        let literal = pattern.literal_path.clone();
        let canonical = self.normalize(&literal);
        match self.lookup(&canonical) {
            Some(plan) => Classification::Matched {
                plan,
                literal,
                canonical,
            },
            None => Classification::Unclassified { literal, canonical },
        }
    }
}
