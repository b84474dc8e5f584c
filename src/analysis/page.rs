//! Heuristic on-page SEO scoring of a fetched HTML document.
//!
//! Signals are pulled out of the raw markup with regular expressions, then
//! every failed check subtracts a fixed penalty from one of six category
//! scores. Scores are clamped to `0..=100`; the overall score is the rounded
//! mean of the six.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    models::{AuditCategories, Category, FoundIssue, Severity},
    schema::QuickCheckReport,
};

const START_SCORE: i64 = 100;
const OFF_PAGE_START_SCORE: i64 = 50;

const TITLE_MAX_CHARS: usize = 60;
const TITLE_MIN_CHARS: usize = 20;
const DESCRIPTION_MAX_CHARS: usize = 160;
const MAX_ALT_PENALTY: i64 = 15;
const SLOW_RESPONSE_MS: u64 = 3000;
const MODERATE_RESPONSE_MS: u64 = 1500;
const LARGE_HTML_BYTES: usize = 500_000;
const MIN_LINKS: usize = 3;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());

// The description may declare `name` before or after `content`
static DESCRIPTION_NAME_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*name=["']description["'][^>]*content=["']([^"']*)["']"#).unwrap()
});
static DESCRIPTION_CONTENT_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*content=["']([^"']*)["'][^>]*name=["']description["']"#).unwrap()
});

static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>.*?</h1>").unwrap());
static H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<h2[^>]*>.*?</h2>").unwrap());
static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img[^>]*>").unwrap());
static ALT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)alt=["'][^"']+["']"#).unwrap());
static VIEWPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta[^>]*name=["']viewport["']"#).unwrap());
static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<link[^>]*rel=["']canonical["']"#).unwrap());
static JSON_LD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)application/ld\+json").unwrap());
static OPEN_GRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta[^>]*property=["']og:"#).unwrap());
static FAQ_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)FAQPage").unwrap());
static NOINDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*content=["'][^"']*noindex[^"']*["']"#).unwrap()
});
static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<a[^>]*href=["'][^"']*["']"#).unwrap());
static LANG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<html[^>]*lang=["']"#).unwrap());

/// Everything the checklist looks at, extracted from one HTML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSignals {
    pub title: String,
    pub description: String,
    pub h1_count: usize,
    pub h2_count: usize,
    pub images_without_alt: usize,
    pub has_viewport: bool,
    pub has_canonical: bool,
    pub has_json_ld: bool,
    pub has_open_graph: bool,
    pub has_faq_schema: bool,
    pub is_noindex: bool,
    pub link_count: usize,
    pub has_lang: bool,
    pub html_size: usize,
}

impl PageSignals {
    pub fn extract(html: &str) -> Self {
        let title = TITLE_RE
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        let description = DESCRIPTION_NAME_FIRST_RE
            .captures(html)
            .or_else(|| DESCRIPTION_CONTENT_FIRST_RE.captures(html))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        let images_without_alt = IMG_RE
            .find_iter(html)
            .filter(|img| !ALT_RE.is_match(img.as_str()))
            .count();

        Self {
            title,
            description,
            h1_count: H1_RE.find_iter(html).count(),
            h2_count: H2_RE.find_iter(html).count(),
            images_without_alt,
            has_viewport: VIEWPORT_RE.is_match(html),
            has_canonical: CANONICAL_RE.is_match(html),
            has_json_ld: JSON_LD_RE.is_match(html),
            has_open_graph: OPEN_GRAPH_RE.is_match(html),
            has_faq_schema: FAQ_RE.is_match(html),
            is_noindex: NOINDEX_RE.is_match(html),
            link_count: ANCHOR_RE.find_iter(html).count(),
            has_lang: LANG_RE.is_match(html),
            html_size: html.len(),
        }
    }
}

/// Running category scores plus the issues found so far.
struct Scorecard {
    categories: AuditCategories,
    total_issues: usize,
}

impl Scorecard {
    fn new() -> Self {
        let mut categories = AuditCategories::default();
        for category in Category::ALL {
            categories.get_mut(category).score = match category {
                Category::OffPage => OFF_PAGE_START_SCORE,
                _ => START_SCORE,
            };
        }
        Self {
            categories,
            total_issues: 0,
        }
    }

    fn flag(
        &mut self,
        category: Category,
        severity: Severity,
        penalty: i64,
        title: impl Into<String>,
        fix: impl Into<String>,
    ) {
        let report = self.categories.get_mut(category);
        report.score -= penalty;
        report.issues.push(FoundIssue {
            title: title.into(),
            severity: severity.as_str().to_string(),
            fix: fix.into(),
        });
        self.total_issues += 1;
    }

    fn finish(mut self) -> (AuditCategories, usize, i64) {
        let mut sum = 0;
        for category in Category::ALL {
            let report = self.categories.get_mut(category);
            report.score = report.score.clamp(0, 100);
            sum += report.score;
        }
        let overall = (sum as f64 / Category::ALL.len() as f64).round() as i64;
        (self.categories, self.total_issues, overall)
    }
}

/// Scores `html` fetched from `url` in `load_time_ms` milliseconds.
pub fn analyze_page(url: &str, html: &str, load_time_ms: u64) -> QuickCheckReport {
    let signals = PageSignals::extract(html);
    let mut card = Scorecard::new();

    let title_len = signals.title.chars().count();
    if signals.title.is_empty() {
        card.flag(
            Category::OnPage,
            Severity::Critical,
            20,
            "Missing page title",
            "Add a <title> tag with primary keyword",
        );
    } else if title_len > TITLE_MAX_CHARS {
        card.flag(
            Category::OnPage,
            Severity::Medium,
            5,
            format!("Title too long ({} chars)", title_len),
            "Keep title under 60 characters",
        );
    } else if title_len < TITLE_MIN_CHARS {
        card.flag(
            Category::OnPage,
            Severity::Low,
            3,
            format!("Title too short ({} chars)", title_len),
            "Expand title to 30-60 characters with keywords",
        );
    }

    let description_len = signals.description.chars().count();
    if signals.description.is_empty() {
        card.flag(
            Category::OnPage,
            Severity::High,
            15,
            "Missing meta description",
            "Add a meta description tag (120-160 chars) with CTA",
        );
    } else if description_len > DESCRIPTION_MAX_CHARS {
        card.flag(
            Category::OnPage,
            Severity::Low,
            3,
            format!("Meta description too long ({} chars)", description_len),
            "Keep under 160 characters",
        );
    }

    match signals.h1_count {
        0 => card.flag(
            Category::Content,
            Severity::High,
            15,
            "Missing H1 heading",
            "Add one H1 tag with primary keyword",
        ),
        1 => {}
        n => card.flag(
            Category::Content,
            Severity::Medium,
            5,
            format!("Multiple H1 tags ({})", n),
            "Use only one H1 per page",
        ),
    }

    if signals.h2_count == 0 {
        card.flag(
            Category::Content,
            Severity::Medium,
            10,
            "No H2 headings found",
            "Add H2 headings to structure content",
        );
    }

    if signals.images_without_alt > 0 {
        let n = signals.images_without_alt;
        card.flag(
            Category::OnPage,
            Severity::Medium,
            MAX_ALT_PENALTY.min(n as i64 * 2),
            format!("{} images missing alt text", n),
            "Add descriptive alt attributes to all images",
        );
    }

    if !url.starts_with("https://") {
        card.flag(
            Category::Technical,
            Severity::Critical,
            25,
            "Not using HTTPS",
            "Install SSL certificate and redirect HTTP to HTTPS",
        );
    }

    if !signals.has_viewport {
        card.flag(
            Category::Technical,
            Severity::High,
            15,
            "Missing viewport meta tag",
            r#"Add <meta name="viewport" content="width=device-width, initial-scale=1">"#,
        );
    }

    if !signals.has_canonical {
        card.flag(
            Category::Technical,
            Severity::Medium,
            8,
            "Missing canonical tag",
            r#"Add <link rel="canonical" href="..."> to prevent duplicate content"#,
        );
    }

    if !signals.has_json_ld {
        card.flag(
            Category::Aeo,
            Severity::High,
            20,
            "No structured data (JSON-LD)",
            "Add JSON-LD schema markup for your content type (Article, Product, FAQ, etc.)",
        );
    }

    if !signals.has_open_graph {
        card.flag(
            Category::OnPage,
            Severity::Low,
            5,
            "Missing Open Graph tags",
            "Add og:title, og:description, og:image for social sharing",
        );
    }

    if !signals.has_faq_schema {
        card.flag(
            Category::Aeo,
            Severity::Medium,
            10,
            "No FAQ schema found",
            "Add FAQ structured data to help AI engines cite your content",
        );
    }

    if load_time_ms > SLOW_RESPONSE_MS {
        card.flag(
            Category::Performance,
            Severity::High,
            20,
            format!("Slow response time ({}ms)", load_time_ms),
            "Optimize server response time, enable caching, use CDN",
        );
    } else if load_time_ms > MODERATE_RESPONSE_MS {
        card.flag(
            Category::Performance,
            Severity::Medium,
            10,
            format!("Moderate response time ({}ms)", load_time_ms),
            "Consider server-side caching and CDN",
        );
    }

    if signals.html_size > LARGE_HTML_BYTES {
        card.flag(
            Category::Performance,
            Severity::Medium,
            10,
            format!(
                "Large HTML size ({}KB)",
                (signals.html_size as f64 / 1024.0).round()
            ),
            "Minimize HTML, remove inline scripts/styles",
        );
    }

    if signals.is_noindex {
        card.flag(
            Category::Technical,
            Severity::Critical,
            30,
            "Page is set to noindex",
            "Remove noindex directive if this page should be indexed",
        );
    }

    if signals.link_count < MIN_LINKS {
        card.flag(
            Category::Content,
            Severity::Medium,
            8,
            "Very few links on page",
            "Add internal links to related content",
        );
    }

    if !signals.has_lang {
        card.flag(
            Category::Technical,
            Severity::Low,
            3,
            "Missing lang attribute on <html>",
            r#"Add lang="en" (or appropriate language) to <html> tag"#,
        );
    }

    let (categories, total_issues, score) = card.finish();

    QuickCheckReport {
        url: url.to_string(),
        score,
        load_time: load_time_ms,
        title: signals.title,
        description: signals.description,
        html_size: signals.html_size,
        categories,
        total_issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <title>Rust SEO Guide: Ranking Fast Static Sites</title>
  <meta name="description" content="A practical walkthrough of technical SEO for static sites built with Rust, covering metadata, structured data and speed.">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="canonical" href="https://example.com/guide">
  <meta property="og:title" content="Rust SEO Guide">
  <script type="application/ld+json">{"@type": "FAQPage"}</script>
</head>
<body>
  <h1>Rust SEO Guide</h1>
  <h2>Metadata</h2>
  <img src="a.png" alt="diagram">
  <a href="/one">one</a> <a href="/two">two</a> <a href="/three">three</a>
</body>
</html>"#;

    fn titles(report: &QuickCheckReport, category: Category) -> Vec<String> {
        report
            .categories
            .get(category)
            .issues
            .iter()
            .map(|i| i.title.clone())
            .collect()
    }

    #[test]
    fn test_clean_page_scores_full_marks_except_off_page() {
        let report = analyze_page("https://example.com/guide", GOOD_PAGE, 200);
        assert_eq!(report.total_issues, 0);
        for category in Category::ALL {
            let expected = if category == Category::OffPage { 50 } else { 100 };
            assert_eq!(report.categories.get(category).score, expected);
        }
        // (100 * 5 + 50) / 6 = 91.67
        assert_eq!(report.score, 92);
        assert_eq!(report.title, "Rust SEO Guide: Ranking Fast Static Sites");
        assert!(report.description.starts_with("A practical walkthrough"));
        assert_eq!(report.html_size, GOOD_PAGE.len());
    }

    #[test]
    fn test_empty_page_flags_everything() {
        let report = analyze_page("http://example.com", "", 0);
        assert_eq!(report.categories.technical.score, 100 - 25 - 15 - 8 - 3);
        assert_eq!(report.categories.content.score, 100 - 15 - 10 - 8);
        assert_eq!(report.categories.on_page.score, 100 - 20 - 15 - 5);
        assert_eq!(report.categories.aeo.score, 100 - 20 - 10);
        assert_eq!(report.categories.performance.score, 100);
        assert_eq!(report.categories.off_page.score, 50);
        assert_eq!(report.total_issues, 12);
        assert_eq!(
            titles(&report, Category::Technical),
            vec![
                "Not using HTTPS",
                "Missing viewport meta tag",
                "Missing canonical tag",
                "Missing lang attribute on <html>"
            ]
        );
        // (49 + 67 + 60 + 50 + 100 + 70) / 6 = 66
        assert_eq!(report.score, 66);
    }

    #[test]
    fn test_title_length_rules() {
        let long = format!("<title>{}</title>", "x".repeat(61));
        let report = analyze_page("https://e.com", &long, 0);
        assert!(titles(&report, Category::OnPage).contains(&"Title too long (61 chars)".to_string()));

        let short = "<title>  Home  </title>";
        let report = analyze_page("https://e.com", short, 0);
        assert_eq!(report.title, "Home");
        assert!(titles(&report, Category::OnPage).contains(&"Title too short (4 chars)".to_string()));
    }

    #[test]
    fn test_title_spanning_lines_and_uppercase_tags() {
        let html = "<TITLE lang=\"en\">\n  Multi line title for a page\n</TITLE>";
        assert_eq!(PageSignals::extract(html).title, "Multi line title for a page");
    }

    #[test]
    fn test_description_attribute_order() {
        let content_first = r#"<meta content="Reversed order" name="description">"#;
        assert_eq!(PageSignals::extract(content_first).description, "Reversed order");

        let too_long = format!(r#"<meta name='description' content='{}'>"#, "d".repeat(161));
        let report = analyze_page("https://e.com", &too_long, 0);
        assert!(
            titles(&report, Category::OnPage)
                .contains(&"Meta description too long (161 chars)".to_string())
        );
    }

    #[test]
    fn test_heading_counts() {
        let html = "<h1>a</h1><h1 class=x>b</h1><h2>c</h2>";
        let signals = PageSignals::extract(html);
        assert_eq!(signals.h1_count, 2);
        assert_eq!(signals.h2_count, 1);
        let report = analyze_page("https://e.com", html, 0);
        assert!(titles(&report, Category::Content).contains(&"Multiple H1 tags (2)".to_string()));
    }

    #[test]
    fn test_alt_penalty_is_capped() {
        let html = r#"<img src=a><img src=b alt=""><img src=c alt="ok">"#;
        assert_eq!(PageSignals::extract(html).images_without_alt, 2);

        let many = "<img src=x>".repeat(10);
        let report = analyze_page("https://e.com", &many, 0);
        let issue = &report.categories.on_page.issues;
        assert!(issue.iter().any(|i| i.title == "10 images missing alt text"));
        // title 20 + description 15 + og 5 + capped alt 15
        assert_eq!(report.categories.on_page.score, 100 - 20 - 15 - 5 - 15);
    }

    #[test]
    fn test_response_time_bands() {
        let slow = analyze_page("https://e.com", GOOD_PAGE, 3001);
        assert_eq!(slow.categories.performance.score, 80);
        assert_eq!(
            slow.categories.performance.issues[0].title,
            "Slow response time (3001ms)"
        );
        assert_eq!(slow.categories.performance.issues[0].severity, "high");

        let moderate = analyze_page("https://e.com", GOOD_PAGE, 1501);
        assert_eq!(moderate.categories.performance.score, 90);

        let edge = analyze_page("https://e.com", GOOD_PAGE, 1500);
        assert_eq!(edge.categories.performance.score, 100);
    }

    #[test]
    fn test_large_html() {
        let html = format!("{}{}", GOOD_PAGE, " ".repeat(600_000));
        let report = analyze_page("https://e.com", &html, 0);
        let perf = &report.categories.performance;
        assert_eq!(perf.score, 90);
        assert!(perf.issues[0].title.starts_with("Large HTML size ("));
        assert!(perf.issues[0].title.ends_with("KB)"));
    }

    #[test]
    fn test_noindex_is_critical() {
        let html = GOOD_PAGE.replace(
            "<head>",
            r#"<head><meta name="robots" content="noindex, nofollow">"#,
        );
        let report = analyze_page("https://e.com", &html, 0);
        assert_eq!(report.categories.technical.score, 70);
        assert_eq!(
            report.categories.technical.issues[0].severity,
            Severity::Critical.as_str()
        );
    }

    #[test]
    fn test_scores_stay_in_range() {
        let html = r#"<meta content="noindex">"#;
        let report = analyze_page("ftp://e.com", html, 10_000);
        assert_eq!(report.categories.technical.score, 19);
        assert!(Category::ALL
            .iter()
            .all(|c| (0..=100).contains(&report.categories.get(*c).score)));
    }

    #[test]
    fn test_report_serializes_dashboard_shape() {
        let report = analyze_page("https://e.com", GOOD_PAGE, 12);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["loadTime"], 12);
        assert_eq!(value["totalIssues"], 0);
        assert_eq!(value["categories"]["offPage"]["score"], 50);
        assert!(value["categories"]["onPage"]["issues"].is_array());
        assert!(value.get("htmlSize").is_some());
    }
}
