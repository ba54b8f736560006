// src/models/selectors.rs

//! Site profiles: where a job board lists its cards and which CSS selectors
//! pull each field out of them.

use serde::{Deserialize, Serialize};

use crate::models::{ListingKind, Source};

/// Which match to use when a selector hits several elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pick {
    #[default]
    First,
    Last,
}

/// How to read one text field inside a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// CSS selector relative to the card
    pub selector: String,

    #[serde(default)]
    pub pick: Pick,

    /// Keep only the text before the first of these characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_on: Option<String>,
}

impl FieldRule {
    pub fn first(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            pick: Pick::First,
            split_on: None,
        }
    }

    pub fn last(selector: impl Into<String>) -> Self {
        Self {
            pick: Pick::Last,
            ..Self::first(selector)
        }
    }

    pub fn split_on(mut self, chars: impl Into<String>) -> Self {
        self.split_on = Some(chars.into());
        self
    }
}

/// Selectors for the listing index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Selector for each listing card
    pub card: String,

    pub title: FieldRule,

    /// Link element; when absent the title element carries the link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<FieldRule>,

    /// HTML attribute holding the detail URL
    #[serde(default = "default_link_attr")]
    pub link_attr: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<FieldRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<FieldRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<FieldRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<FieldRule>,

    /// Short description shown on the card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<FieldRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<FieldRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<FieldRule>,
}

fn default_link_attr() -> String {
    "href".to_string()
}

/// Selectors for a listing's detail page. Each list is tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailSelectors {
    #[serde(default)]
    pub phone: Vec<String>,

    #[serde(default)]
    pub description: Vec<String>,
}

/// One scrapeable listing index on a job board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Short key used by the source selector (e.g. "boss")
    pub key: String,

    /// Name used in logs and run results (e.g. "boss.az")
    pub name: String,

    pub source: Source,

    #[serde(default)]
    pub kind: ListingKind,

    /// Base URL relative links are resolved against
    pub base_url: String,

    /// Listing index page
    pub index_url: String,

    pub listing: ListingSelectors,

    /// Detail page selectors; `None` skips detail fetches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailSelectors>,
}

impl SiteProfile {
    /// boss.az vacancies. Cards link to a detail page carrying the phone.
    pub fn boss_az() -> Self {
        Self {
            key: "boss".to_string(),
            name: "boss.az".to_string(),
            source: Source::BossAz,
            kind: ListingKind::Standing,
            base_url: "https://boss.az".to_string(),
            index_url: "https://boss.az/vacancies".to_string(),
            listing: ListingSelectors {
                card: ".results-i".to_string(),
                title: FieldRule::first(".results-i-title"),
                link: Some(FieldRule::first(".results-i-link")),
                link_attr: default_link_attr(),
                company: Some(FieldRule::first(".results-i-company")),
                category: Some(FieldRule::last(".results-i-secondary a")),
                location: Some(FieldRule::first(".results-i-secondary").split_on("/→")),
                salary: Some(FieldRule::first(".results-i-salary")),
                summary: Some(FieldRule::first(".results-i-summary")),
                start_date: None,
                duration: None,
            },
            detail: Some(DetailSelectors {
                phone: vec![
                    ".phone.params-i-val a".to_string(),
                    ".phone.params-i-val".to_string(),
                ],
                description: vec![
                    ".job_description.params-i-val".to_string(),
                    ".post-info".to_string(),
                ],
            }),
        }
    }

    /// ejob.az regular vacancies.
    pub fn ejob_vacancies() -> Self {
        Self {
            key: "ejob-vac".to_string(),
            name: "ejob.az/vacancies".to_string(),
            source: Source::EjobAz,
            kind: ListingKind::Standing,
            base_url: "https://ejob.az".to_string(),
            index_url: "https://ejob.az/vacancies".to_string(),
            listing: ListingSelectors {
                card: ".vacancy-card, .job-item, .listing-item".to_string(),
                title: FieldRule::first(".vacancy-title a, .job-title a, h3 a"),
                link: None,
                link_attr: default_link_attr(),
                company: Some(FieldRule::first(".company-name, .vacancy-company")),
                category: Some(FieldRule::first(".vacancy-category, .job-category")),
                location: Some(FieldRule::first(".vacancy-location, .job-location")),
                salary: Some(FieldRule::first(".vacancy-salary, .job-salary")),
                summary: None,
                start_date: None,
                duration: None,
            },
            detail: None,
        }
    }

    /// ejob.az daily gigs ("muzdlu iş").
    pub fn ejob_daily() -> Self {
        Self {
            key: "ejob-muzdlu".to_string(),
            name: "ejob.az/muzdlu".to_string(),
            source: Source::EjobAz,
            kind: ListingKind::DailyGig,
            base_url: "https://ejob.az".to_string(),
            index_url: "https://ejob.az/muzdlu-is".to_string(),
            listing: ListingSelectors {
                card: ".muzdlu-card, .short-job-card, .gig-item".to_string(),
                title: FieldRule::first(".job-title a, h3 a"),
                link: None,
                link_attr: default_link_attr(),
                company: None,
                category: Some(FieldRule::first(".job-category")),
                location: Some(FieldRule::first(".job-location")),
                salary: Some(FieldRule::first(".job-payment")),
                summary: None,
                start_date: Some(FieldRule::first(".start-date")),
                duration: Some(FieldRule::first(".duration")),
            },
            detail: None,
        }
    }

    /// All built-in profiles, in run order.
    pub fn defaults() -> Vec<Self> {
        vec![Self::boss_az(), Self::ejob_vacancies(), Self::ejob_daily()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles_have_unique_keys() {
        let profiles = SiteProfile::defaults();
        let mut keys: Vec<_> = profiles.iter().map(|p| p.key.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), profiles.len());
    }

    #[test]
    fn test_only_daily_profile_reads_gig_fields() {
        for profile in SiteProfile::defaults() {
            let daily = profile.kind == ListingKind::DailyGig;
            assert_eq!(profile.listing.start_date.is_some(), daily);
            assert_eq!(profile.listing.duration.is_some(), daily);
        }
    }

    #[test]
    fn test_profile_from_toml_fills_defaults() {
        let toml_src = r#"
            key = "custom"
            name = "custom.az"
            source = "ejob.az"
            base_url = "https://custom.az"
            index_url = "https://custom.az/jobs"

            [listing]
            card = "li.job"
            title = { selector = "a.title" }
        "#;
        let profile: SiteProfile = toml::from_str(toml_src).unwrap();
        assert_eq!(profile.kind, ListingKind::Standing);
        assert_eq!(profile.listing.link_attr, "href");
        assert_eq!(profile.listing.title.pick, Pick::First);
        assert!(profile.detail.is_none());
    }
}
