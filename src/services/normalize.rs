// src/services/normalize.rs

//! Category and location normalization.
//!
//! Both sites describe categories in their own vocabulary. Each site gets an
//! ordered keyword table evaluated top to bottom; the first rule with a
//! keyword contained in the lower-cased text wins. Order matters because
//! keywords overlap, so specific rules sit above generic ones. The two tables
//! disagree in places (e.g. "servis", "mühasibat").

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Source;

/// Canonical job category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    It,
    Sales,
    Marketing,
    Healthcare,
    Education,
    Finance,
    Construction,
    Restaurant,
    Transport,
    Administration,
    Hr,
    Legal,
    Auto,
    Design,
    Home,
    Beauty,
    Industry,
    Security,
    Other,
}

impl Category {
    /// Label stored in the job record.
    pub fn label(&self) -> &'static str {
        match self {
            Category::It => "İnformasiya texnologiyaları, telekom",
            Category::Sales => "Satış",
            Category::Marketing => "Marketinq, reklam, PR",
            Category::Healthcare => "Tibb və əczaçılıq",
            Category::Education => "Təhsil və elm",
            Category::Finance => "Maliyyə",
            Category::Construction => {
                "Tikinti və təmir (usta, rəngsaz, santexnik, elektrik, fəhlələr)"
            }
            Category::Restaurant => "Restoran işi və turizm",
            Category::Transport => "Nəqliyyat, logistika, anbar",
            Category::Administration => "İnzibati heyət",
            Category::Hr => "HR, kadrlar",
            Category::Legal => "Hüquqşünaslıq",
            Category::Auto => "Avtobiznes və servis",
            Category::Design => "Dizayn",
            Category::Home => "Ev personalı və təmizlik",
            Category::Beauty => "Gözəllik, Fitnes, İdman",
            Category::Industry => "Sənaye və istehsalat",
            Category::Security => "Təhlükəsizlik",
            Category::Other => "Digər",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One keyword rule: any keyword matching maps to `category`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub keywords: &'static [&'static str],
    pub category: Category,
}

const fn rule(keywords: &'static [&'static str], category: Category) -> CategoryRule {
    CategoryRule { keywords, category }
}

/// boss.az rules, most specific first.
pub static BOSS_RULES: &[CategoryRule] = &[
    rule(
        &["informasiya texnologiyaları", "it", "proqramlaşdırma"],
        Category::It,
    ),
    rule(&["satış"], Category::Sales),
    rule(&["marketinq", "reklam"], Category::Marketing),
    rule(&["tibb", "əczaçılıq"], Category::Healthcare),
    rule(&["təhsil", "elm"], Category::Education),
    rule(&["maliyyə", "mühasibat"], Category::Finance),
    rule(&["tikinti", "sənaye"], Category::Construction),
    rule(&["restoran", "turizm", "otel"], Category::Restaurant),
    rule(&["nəqliyyat", "logistika"], Category::Transport),
    rule(&["inzibati", "idarəetmə"], Category::Administration),
    rule(&["hr", "kadr"], Category::Hr),
    rule(&["hüquq"], Category::Legal),
    rule(&["dizayn"], Category::Design),
    rule(&["xidmət", "təmizlik"], Category::Home),
    rule(&["gözəllik", "fitnes", "idman"], Category::Beauty),
    rule(&["təhlükəsizlik", "mühafizə"], Category::Security),
];

/// ejob.az rules, most specific first.
pub static EJOB_RULES: &[CategoryRule] = &[
    rule(&["informasiya texnologiyaları", "it"], Category::It),
    rule(&["satış"], Category::Sales),
    rule(&["marketinq"], Category::Marketing),
    rule(&["tibb", "əczaçılıq"], Category::Healthcare),
    rule(&["təhsil", "elm"], Category::Education),
    rule(&["maliyyə"], Category::Finance),
    rule(
        &["memarlıq", "tikinti", "sənaye", "istehsal"],
        Category::Construction,
    ),
    rule(&["xidmət"], Category::Home),
    rule(&["administrasiya", "idarəetmə"], Category::Administration),
    rule(&["dizayn"], Category::Design),
    rule(&["hüquqşünaslıq"], Category::Legal),
    rule(&["servis"], Category::Transport),
    rule(&["müxtəlif"], Category::Other),
];

/// Rule table for a site.
pub fn category_rules(source: Source) -> &'static [CategoryRule] {
    match source {
        Source::BossAz => BOSS_RULES,
        Source::EjobAz => EJOB_RULES,
    }
}

/// Map a site's raw category text to the canonical taxonomy.
pub fn normalize_category(raw: &str, source: Source) -> Category {
    let normalized = raw.trim().to_lowercase();

    let matched = category_rules(source).iter().find(|rule| {
        rule.keywords
            .iter()
            .any(|keyword| normalized.contains(keyword))
    });

    match matched {
        Some(rule) => rule.category,
        None => {
            log::debug!(
                "Unmapped {} category: {:?} -> {}",
                source,
                raw,
                Category::Other
            );
            Category::Other
        }
    }
}

/// Capital city with its default district.
pub const CAPITAL_DEFAULT: &str = "Bakı, Nəsimi";

/// Prefix of locations already in canonical "Bakı, <district>" form.
const CANONICAL_PREFIX: &str = "Bakı, ";

/// Lower-cased substring to canonical city, in match order.
static CITY_TABLE: &[(&str, &str)] = &[
    ("sumqayıt", "Sumqayıt"),
    ("gəncə", "Gəncə"),
    ("mingəçevir", "Mingəçevir"),
    ("şirvan", "Şirvan"),
    ("naxçıvan", "Naxçıvan"),
    ("lənkəran", "Lənkəran"),
    ("şəki", "Şəki"),
    ("quba", "Quba"),
];

/// Map a raw location to its canonical form, passing unknown text through.
pub fn normalize_location(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.starts_with(CANONICAL_PREFIX) {
        return trimmed.to_string();
    }

    let lower = trimmed.to_lowercase();
    if lower == "baku" || lower == "bakı" {
        return CAPITAL_DEFAULT.to_string();
    }

    if let Some((_, city)) = CITY_TABLE.iter().find(|(key, _)| lower.contains(key)) {
        return city.to_string();
    }

    if !trimmed.is_empty() {
        log::debug!("Unmapped location: {:?}", trimmed);
    }
    trimmed.to_string()
}
