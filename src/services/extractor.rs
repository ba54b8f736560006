// src/services/extractor.rs

//! Site extractor.
//!
//! Fetches a site profile's listing index, reads each card with the profile's
//! CSS selectors, optionally enriches it from the detail page, and normalizes
//! the result into [`NormalizedJob`]s.

use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use serde_json::json;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    FieldRule, NormalizedJob, Pick, RateLimitConfig, SALARY_NEGOTIABLE, SiteProfile,
};
use crate::services::normalize::{normalize_category, normalize_location};
use crate::services::rate_limit::RatePolicy;
use crate::utils::activity;
use crate::utils::http::{FetchedPage, PageFetcher, ensure_success};
use crate::utils::{extract_source_id, non_empty, normalize_whitespace, resolve_url};

/// Per-run extraction knobs.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Card cap for this run
    pub max_listings: usize,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Fixed User-Agent instead of a random pick
    pub identity: Option<String>,
    /// Proxy the run's fetcher is built with
    pub proxy: Option<String>,
}

impl ExtractOptions {
    pub fn from_config(rate_limit: &RateLimitConfig) -> Self {
        Self {
            max_listings: rate_limit.max_listings,
            min_delay_ms: rate_limit.min_delay_ms,
            max_delay_ms: rate_limit.max_delay_ms,
            identity: None,
            proxy: None,
        }
    }
}

/// What one extraction produced.
///
/// Never an error: blocking and page-level failures end the run early and
/// keep whatever was collected.
#[derive(Debug, Default)]
pub struct ExtractOutcome {
    pub jobs: Vec<NormalizedJob>,
    /// Blocking status that stopped the run
    pub blocked_status: Option<u16>,
    /// Page-level failure that stopped the run
    pub error: Option<String>,
    /// Cards dropped for missing title or link
    pub skipped: usize,
    /// Detail pages that could not be used
    pub detail_failures: usize,
}

/// Fields read from one card before normalization.
#[derive(Debug, Default)]
struct RawListing {
    title: String,
    link: String,
    company: String,
    category: String,
    location: String,
    salary: String,
    summary: String,
    start_date: String,
    duration: String,
}

/// Fields read from a detail page.
#[derive(Debug, Default)]
struct DetailFields {
    phone: Option<String>,
    description: Option<String>,
}

enum DetailFetch {
    Fields(DetailFields),
    Blocked(u16),
    Failed(String),
}

struct CompiledField {
    selector: Selector,
    pick: Pick,
    split_on: Option<Vec<char>>,
}

impl CompiledField {
    fn compile(rule: &FieldRule) -> Result<Self> {
        Ok(Self {
            selector: parse_selector(&rule.selector)?,
            pick: rule.pick,
            split_on: rule.split_on.as_ref().map(|s| s.chars().collect()),
        })
    }

    fn element<'a>(&self, card: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        let mut matches = card.select(&self.selector);
        match self.pick {
            Pick::First => matches.next(),
            Pick::Last => matches.last(),
        }
    }

    fn text(&self, card: &ElementRef) -> String {
        let Some(element) = self.element(card) else {
            return String::new();
        };
        let text = normalize_whitespace(&element.text().collect::<String>());
        match &self.split_on {
            Some(chars) => text
                .split(|c| chars.contains(&c))
                .next()
                .unwrap_or_default()
                .trim()
                .to_string(),
            None => text,
        }
    }
}

struct CompiledListing {
    card: Selector,
    title: CompiledField,
    link: Option<CompiledField>,
    link_attr: String,
    company: Option<CompiledField>,
    category: Option<CompiledField>,
    location: Option<CompiledField>,
    salary: Option<CompiledField>,
    summary: Option<CompiledField>,
    start_date: Option<CompiledField>,
    duration: Option<CompiledField>,
}

struct CompiledDetail {
    phone: Vec<Selector>,
    description: Vec<Selector>,
}

/// Extractor for one site profile.
pub struct SiteExtractor {
    profile: SiteProfile,
    base_url: Url,
    listing: CompiledListing,
    detail: Option<CompiledDetail>,
    fetcher: Arc<dyn PageFetcher>,
    policy: RatePolicy,
}

impl SiteExtractor {
    /// Compile the profile's selectors. Fails on an invalid selector or URL.
    pub fn new(
        profile: SiteProfile,
        fetcher: Arc<dyn PageFetcher>,
        policy: RatePolicy,
    ) -> Result<Self> {
        let base_url = Url::parse(&profile.base_url)?;
        let optional =
            |rule: &Option<FieldRule>| rule.as_ref().map(CompiledField::compile).transpose();

        let selectors = &profile.listing;
        let listing = CompiledListing {
            card: parse_selector(&selectors.card)?,
            title: CompiledField::compile(&selectors.title)?,
            link: optional(&selectors.link)?,
            link_attr: selectors.link_attr.clone(),
            company: optional(&selectors.company)?,
            category: optional(&selectors.category)?,
            location: optional(&selectors.location)?,
            salary: optional(&selectors.salary)?,
            summary: optional(&selectors.summary)?,
            start_date: optional(&selectors.start_date)?,
            duration: optional(&selectors.duration)?,
        };

        let detail = profile
            .detail
            .as_ref()
            .map(|d| -> Result<CompiledDetail> {
                Ok(CompiledDetail {
                    phone: d.phone.iter().map(|s| parse_selector(s)).collect::<Result<_>>()?,
                    description: d
                        .description
                        .iter()
                        .map(|s| parse_selector(s))
                        .collect::<Result<_>>()?,
                })
            })
            .transpose()?;

        Ok(Self {
            profile,
            base_url,
            listing,
            detail,
            fetcher,
            policy,
        })
    }

    /// Scrape the profile's index page into normalized jobs.
    pub async fn extract(&self, options: &ExtractOptions) -> ExtractOutcome {
        let name = self.profile.name.as_str();
        let mut outcome = ExtractOutcome::default();
        let identity = options
            .identity
            .clone()
            .unwrap_or_else(|| self.policy.pick_identity());

        activity::record(
            name,
            "Starting scrape",
            json!({ "max_listings": options.max_listings, "url": self.profile.index_url }),
        );

        let page = match self.fetch_index(&identity).await {
            Ok(page) => page,
            Err(e) => {
                activity::warn(name, "Network error", json!({ "message": e.to_string() }));
                outcome.error = Some(format!("Failed to fetch {}: {e}", self.profile.index_url));
                return outcome;
            }
        };

        if self.policy.should_abort(page.status) {
            activity::warn(name, "Stopped - blocked status", json!({ "status": page.status }));
            outcome.blocked_status = Some(page.status);
            return outcome;
        }

        let page = match ensure_success(page, &self.profile.index_url) {
            Ok(page) => page,
            Err(e) => {
                activity::warn(name, "HTTP error", json!({ "message": e.to_string() }));
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };

        let (listings, skipped) = self.parse_index(&page.body, options.max_listings);
        outcome.skipped = skipped;
        activity::record(
            name,
            "Found listing cards",
            json!({ "count": listings.len() + skipped, "usable": listings.len() }),
        );

        let count = listings.len();
        for (i, raw) in listings.into_iter().enumerate() {
            let mut detail = DetailFields::default();

            if self.detail.is_some() {
                self.policy
                    .pace_between(options.min_delay_ms, options.max_delay_ms)
                    .await;
                match self.fetch_detail(&raw.link, &identity).await {
                    DetailFetch::Fields(fields) => detail = fields,
                    DetailFetch::Blocked(status) => outcome.blocked_status = Some(status),
                    DetailFetch::Failed(message) => {
                        outcome.detail_failures += 1;
                        activity::warn(
                            name,
                            "Error fetching details",
                            json!({ "url": raw.link, "error": message }),
                        );
                    }
                }
            }

            let job = self.assemble(raw, detail);
            activity::record(
                name,
                "Parsed job",
                json!({
                    "title": job.title,
                    "company": job.company,
                    "has_phone": job.contact_phone.is_some(),
                }),
            );
            outcome.jobs.push(job);

            if let Some(status) = outcome.blocked_status {
                activity::warn(name, "Stopped - blocked status", json!({ "status": status }));
                break;
            }

            if i + 1 < count {
                self.policy
                    .pace_between(options.min_delay_ms, options.max_delay_ms)
                    .await;
            }
        }

        activity::record(name, "Scrape completed", json!({ "total": outcome.jobs.len() }));
        outcome
    }

    /// Fetch the index page, retrying transport failures.
    async fn fetch_index(&self, identity: &str) -> Result<FetchedPage> {
        let max_retries = self.policy.config().max_retries;
        let mut attempt = 0;
        loop {
            match self.fetcher.fetch(&self.profile.index_url, identity).await {
                Ok(page) => return Ok(page),
                Err(e) if attempt < max_retries => {
                    attempt += 1;
                    log::warn!(
                        "{}: index fetch failed ({}), retry {}/{}",
                        self.profile.name,
                        e,
                        attempt,
                        max_retries
                    );
                    self.policy.pace_retry().await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_detail(&self, url: &str, identity: &str) -> DetailFetch {
        match self.fetcher.fetch(url, identity).await {
            Ok(page) if self.policy.should_abort(page.status) => DetailFetch::Blocked(page.status),
            Ok(page) => match ensure_success(page, url) {
                Ok(page) => DetailFetch::Fields(self.parse_detail(&page.body)),
                Err(e) => DetailFetch::Failed(e.to_string()),
            },
            Err(e) => DetailFetch::Failed(e.to_string()),
        }
    }

    /// Read up to `max` cards in document order; returns usable listings and
    /// the number skipped.
    fn parse_index(&self, body: &str, max: usize) -> (Vec<RawListing>, usize) {
        let document = Html::parse_document(body);
        let listing = &self.listing;
        let read = |field: &Option<CompiledField>, card: &ElementRef| {
            field.as_ref().map(|f| f.text(card)).unwrap_or_default()
        };

        let mut listings = Vec::new();
        let mut skipped = 0;

        for (index, card) in document.select(&listing.card).take(max).enumerate() {
            let title_elem = listing.title.element(&card);
            let title = listing.title.text(&card);

            let link_elem = match &listing.link {
                Some(field) => field.element(&card),
                None => title_elem,
            };
            let href = link_elem
                .and_then(|e| e.value().attr(&listing.link_attr))
                .map(str::trim)
                .unwrap_or_default();

            if title.is_empty() || href.is_empty() {
                skipped += 1;
                activity::record(
                    &self.profile.name,
                    "Skipping - missing title/url",
                    json!({ "index": index }),
                );
                continue;
            }

            listings.push(RawListing {
                title,
                link: resolve_url(&self.base_url, href),
                company: read(&listing.company, &card),
                category: read(&listing.category, &card),
                location: read(&listing.location, &card),
                salary: read(&listing.salary, &card),
                summary: read(&listing.summary, &card),
                start_date: read(&listing.start_date, &card),
                duration: read(&listing.duration, &card),
            });
        }

        (listings, skipped)
    }

    fn parse_detail(&self, body: &str) -> DetailFields {
        let Some(detail) = &self.detail else {
            return DetailFields::default();
        };
        let document = Html::parse_document(body);
        let first_text = |selectors: &[Selector]| {
            selectors.iter().find_map(|selector| {
                document
                    .select(selector)
                    .next()
                    .map(|e| normalize_whitespace(&e.text().collect::<String>()))
                    .and_then(non_empty)
            })
        };

        DetailFields {
            phone: first_text(&detail.phone),
            description: first_text(&detail.description),
        }
    }

    fn assemble(&self, raw: RawListing, detail: DetailFields) -> NormalizedJob {
        let source = self.profile.source;
        NormalizedJob {
            source,
            source_id: extract_source_id(&raw.link),
            source_url: raw.link,
            title: raw.title,
            category: normalize_category(&raw.category, source).label().to_string(),
            location: normalize_location(&raw.location),
            salary: non_empty(raw.salary).unwrap_or_else(|| SALARY_NEGOTIABLE.to_string()),
            description: detail.description.or_else(|| non_empty(raw.summary)),
            contact_phone: detail.phone,
            company: non_empty(raw.company),
            kind: self.profile.kind,
            start_date: non_empty(raw.start_date),
            duration: non_empty(raw.duration),
            raw_category: raw.category,
            raw_location: raw.location,
        }
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::{ListingKind, Source};
    use crate::services::rate_limit::{NoPacer, Pacer};

    /// Serves canned pages and records every requested URL.
    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, (u16, String)>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn page(mut self, url: &str, status: u16, body: &str) -> Self {
            self.pages.insert(url.to_string(), (status, body.to_string()));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str, _identity: &str) -> Result<FetchedPage> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some((status, body)) => Ok(FetchedPage {
                    status: *status,
                    body: body.clone(),
                }),
                None => Err(AppError::extract(url, "connection reset")),
            }
        }
    }

    /// Records every pace request instead of sleeping.
    #[derive(Default)]
    struct RecordingPacer {
        paces: Mutex<Vec<(u64, u64)>>,
    }

    impl RecordingPacer {
        fn paces(&self) -> Vec<(u64, u64)> {
            self.paces.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Pacer for RecordingPacer {
        async fn pace(&self, min_ms: u64, max_ms: u64) {
            self.paces.lock().unwrap().push((min_ms, max_ms));
        }
    }

    const BOSS_INDEX: &str = r#"
        <html><body><div class="results">
          <div class="results-i">
            <h3 class="results-i-title">Sürücü</h3>
            <a class="results-i-link" href="/vacancies/1001"></a>
            <a class="results-i-company">Acme MMC</a>
            <div class="results-i-secondary">Baku / <a href="/c/1">Satış</a> → <a href="/c/2">Logistika</a></div>
            <div class="results-i-salary">800 AZN</div>
            <div class="results-i-summary">B kateqoriyası</div>
          </div>
          <div class="results-i">
            <h3 class="results-i-title">Mühasib</h3>
            <a class="results-i-link" href="/vacancies/1002"></a>
            <div class="results-i-secondary">Gəncə şəhəri / <a href="/c/3">Maliyyə</a></div>
            <div class="results-i-summary">Tam ştat</div>
          </div>
          <div class="results-i">
            <h3 class="results-i-title">Linksiz elan</h3>
          </div>
        </div></body></html>
    "#;

    const BOSS_DETAIL_1: &str = r#"
        <div class="phone params-i-val"><a href="tel:0501234567">(050) 123-45-67</a></div>
        <div class="job_description params-i-val">Yük maşını sürmək</div>
    "#;

    const BOSS_DETAIL_2: &str = r#"
        <div class="phone params-i-val">(055) 765-43-21</div>
        <div class="post-info">Hesabatların hazırlanması</div>
    "#;

    const EJOB_DAILY_INDEX: &str = r#"
        <div class="gig-item">
          <div class="job-title"><a href="/muzdlu-is/77">Yükdaşıma</a></div>
          <span class="job-category">Müxtəlif</span>
          <span class="job-location">Sumqayıt</span>
          <span class="start-date">20.10.2026</span>
          <span class="duration">2 gün</span>
        </div>
    "#;

    const EJOB_INDEX: &str = r#"
        <div class="vacancy-card"><h3><a href="/vacancies/1">Aşpaz</a></h3></div>
        <div class="vacancy-card"><h3><a href="/vacancies/2">Satıcı</a></h3></div>
        <div class="vacancy-card"><h3><a href="/vacancies/3">Kuryer</a></h3></div>
        <div class="vacancy-card"><h3><a href="/vacancies/4">Dizayner</a></h3></div>
    "#;

    fn policy_with(pacer: Arc<dyn Pacer>) -> RatePolicy {
        let config = RateLimitConfig {
            max_retries: 2,
            retry_delay_ms: 750,
            ..RateLimitConfig::default()
        };
        RatePolicy::new(config, vec!["test-agent".to_string()], pacer)
    }

    fn policy() -> RatePolicy {
        policy_with(Arc::new(NoPacer))
    }

    fn options() -> ExtractOptions {
        ExtractOptions::from_config(&RateLimitConfig::default())
    }

    fn boss_fetcher(index_status: u16) -> FakeFetcher {
        FakeFetcher::default()
            .page("https://boss.az/vacancies", index_status, BOSS_INDEX)
            .page("https://boss.az/vacancies/1001", 200, BOSS_DETAIL_1)
            .page("https://boss.az/vacancies/1002", 200, BOSS_DETAIL_2)
    }

    fn extractor(profile: SiteProfile, fetcher: Arc<FakeFetcher>) -> SiteExtractor {
        SiteExtractor::new(profile, fetcher, policy()).unwrap()
    }

    #[tokio::test]
    async fn test_boss_cards_with_details() {
        let fetcher = Arc::new(boss_fetcher(200));
        let outcome = extractor(SiteProfile::boss_az(), fetcher.clone())
            .extract(&options())
            .await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.jobs.len(), 2);

        let driver = &outcome.jobs[0];
        assert_eq!(driver.source, Source::BossAz);
        assert_eq!(driver.title, "Sürücü");
        assert_eq!(driver.source_url, "https://boss.az/vacancies/1001");
        assert_eq!(driver.source_id, "1001");
        assert_eq!(driver.company.as_deref(), Some("Acme MMC"));
        assert_eq!(driver.raw_category, "Logistika");
        assert_eq!(driver.category, "Nəqliyyat, logistika, anbar");
        assert_eq!(driver.raw_location, "Baku");
        assert_eq!(driver.location, "Bakı, Nəsimi");
        assert_eq!(driver.salary, "800 AZN");
        assert_eq!(driver.contact_phone.as_deref(), Some("(050) 123-45-67"));
        assert_eq!(driver.description.as_deref(), Some("Yük maşını sürmək"));
        assert_eq!(driver.kind, ListingKind::Standing);

        let accountant = &outcome.jobs[1];
        assert_eq!(accountant.company, None);
        assert_eq!(accountant.location, "Gəncə");
        assert_eq!(accountant.category, "Maliyyə");
        assert_eq!(accountant.salary, SALARY_NEGOTIABLE);
        assert_eq!(accountant.contact_phone.as_deref(), Some("(055) 765-43-21"));
        assert_eq!(
            accountant.description.as_deref(),
            Some("Hesabatların hazırlanması")
        );

        assert_eq!(
            fetcher.calls(),
            vec![
                "https://boss.az/vacancies",
                "https://boss.az/vacancies/1001",
                "https://boss.az/vacancies/1002",
            ]
        );
    }

    #[tokio::test]
    async fn test_blocking_index_status_returns_empty_without_error() {
        for status in [403, 429, 503] {
            let fetcher = Arc::new(boss_fetcher(status));
            let outcome = extractor(SiteProfile::boss_az(), fetcher.clone())
                .extract(&options())
                .await;

            assert!(outcome.jobs.is_empty());
            assert!(outcome.error.is_none());
            assert_eq!(outcome.blocked_status, Some(status));
            assert_eq!(fetcher.calls().len(), 1, "no detail fetch after {status}");
        }
    }

    #[tokio::test]
    async fn test_blocked_detail_keeps_current_card_and_stops() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .page("https://boss.az/vacancies", 200, BOSS_INDEX)
                .page("https://boss.az/vacancies/1001", 429, ""),
        );
        let outcome = extractor(SiteProfile::boss_az(), fetcher.clone())
            .extract(&options())
            .await;

        assert_eq!(outcome.blocked_status, Some(429));
        assert_eq!(outcome.jobs.len(), 1);
        assert_eq!(outcome.jobs[0].contact_phone, None);
        assert_eq!(outcome.jobs[0].description.as_deref(), Some("B kateqoriyası"));
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_detail_failure_degrades_to_listing_data() {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .page("https://boss.az/vacancies", 200, BOSS_INDEX)
                .page("https://boss.az/vacancies/1002", 404, "gone"),
        );
        let outcome = extractor(SiteProfile::boss_az(), fetcher)
            .extract(&options())
            .await;

        assert_eq!(outcome.jobs.len(), 2);
        assert_eq!(outcome.detail_failures, 2);
        assert!(outcome.jobs.iter().all(|j| j.contact_phone.is_none()));
        assert_eq!(outcome.jobs[1].description.as_deref(), Some("Tam ştat"));
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_index_network_error_is_retried_then_reported() {
        let fetcher = Arc::new(FakeFetcher::default());
        let outcome = extractor(SiteProfile::boss_az(), fetcher.clone())
            .extract(&options())
            .await;

        assert!(outcome.jobs.is_empty());
        assert!(outcome.error.as_deref().unwrap().contains("boss.az/vacancies"));
        assert_eq!(fetcher.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_index_server_error_is_reported() {
        let fetcher = Arc::new(boss_fetcher(500));
        let outcome = extractor(SiteProfile::boss_az(), fetcher.clone())
            .extract(&options())
            .await;

        assert!(outcome.jobs.is_empty());
        assert!(outcome.blocked_status.is_none());
        assert!(outcome.error.unwrap().contains("500"));
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_max_listings_caps_cards() {
        let fetcher = Arc::new(boss_fetcher(200));
        let options = ExtractOptions {
            max_listings: 1,
            ..options()
        };
        let outcome = extractor(SiteProfile::boss_az(), fetcher.clone())
            .extract(&options)
            .await;

        assert_eq!(outcome.jobs.len(), 1);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_daily_gig_fields() {
        let fetcher = Arc::new(FakeFetcher::default().page(
            "https://ejob.az/muzdlu-is",
            200,
            EJOB_DAILY_INDEX,
        ));
        let outcome = extractor(SiteProfile::ejob_daily(), fetcher.clone())
            .extract(&options())
            .await;

        assert_eq!(outcome.jobs.len(), 1);
        let gig = &outcome.jobs[0];
        assert_eq!(gig.source, Source::EjobAz);
        assert_eq!(gig.kind, ListingKind::DailyGig);
        assert_eq!(gig.source_url, "https://ejob.az/muzdlu-is/77");
        assert_eq!(gig.source_id, "77");
        assert_eq!(gig.title, "Yükdaşıma");
        assert_eq!(gig.category, "Digər");
        assert_eq!(gig.location, "Sumqayıt");
        assert_eq!(gig.salary, SALARY_NEGOTIABLE);
        assert_eq!(gig.start_date.as_deref(), Some("20.10.2026"));
        assert_eq!(gig.duration.as_deref(), Some("2 gün"));
        assert_eq!(gig.company, None);
        assert_eq!(gig.contact_phone, None);
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_paces_before_each_detail_and_between_cards() {
        let pacer = Arc::new(RecordingPacer::default());
        let options = ExtractOptions {
            min_delay_ms: 100,
            max_delay_ms: 200,
            ..options()
        };
        let extractor = SiteExtractor::new(
            SiteProfile::boss_az(),
            Arc::new(boss_fetcher(200)),
            policy_with(pacer.clone()),
        )
        .unwrap();

        let outcome = extractor.extract(&options).await;

        // detail 1, between cards, detail 2; nothing before the index or after the last card
        assert_eq!(outcome.jobs.len(), 2);
        assert_eq!(pacer.paces(), vec![(100, 200); 3]);
    }

    #[tokio::test]
    async fn test_index_only_site_paces_between_cards() {
        let pacer = Arc::new(RecordingPacer::default());
        let fetcher = Arc::new(FakeFetcher::default().page(
            "https://ejob.az/vacancies",
            200,
            EJOB_INDEX,
        ));
        let extractor = SiteExtractor::new(
            SiteProfile::ejob_vacancies(),
            fetcher.clone(),
            policy_with(pacer.clone()),
        )
        .unwrap();

        let outcome = extractor.extract(&options()).await;

        let defaults = RateLimitConfig::default();
        assert_eq!(outcome.jobs.len(), 4);
        assert_eq!(
            pacer.paces(),
            vec![(defaults.min_delay_ms, defaults.max_delay_ms); 3]
        );
        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_blocked_index_never_paces() {
        let pacer = Arc::new(RecordingPacer::default());
        let extractor = SiteExtractor::new(
            SiteProfile::boss_az(),
            Arc::new(boss_fetcher(429)),
            policy_with(pacer.clone()),
        )
        .unwrap();

        let outcome = extractor.extract(&options()).await;

        assert_eq!(outcome.blocked_status, Some(429));
        assert!(pacer.paces().is_empty());
    }

    #[tokio::test]
    async fn test_index_retries_wait_retry_delay() {
        let pacer = Arc::new(RecordingPacer::default());
        let extractor = SiteExtractor::new(
            SiteProfile::boss_az(),
            Arc::new(FakeFetcher::default()),
            policy_with(pacer.clone()),
        )
        .unwrap();

        let outcome = extractor.extract(&options()).await;

        assert!(outcome.error.is_some());
        assert_eq!(pacer.paces(), vec![(750, 750), (750, 750)]);
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let mut profile = SiteProfile::ejob_vacancies();
        profile.listing.card = "[[invalid".to_string();
        let result = SiteExtractor::new(profile, Arc::new(FakeFetcher::default()), policy());
        assert!(matches!(result, Err(AppError::Selector { .. })));
    }

    #[test]
    fn test_parse_selector_valid() {
        assert!(parse_selector("div.class").is_ok());
        assert!(parse_selector(".vacancy-title a, .job-title a, h3 a").is_ok());
    }
}
