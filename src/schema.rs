//! src/schema.rs
//!
//! Request and response bodies of the HTTP API. Creation bodies follow the
//! dashboard's loose contract: every field is optional and empty values fall
//! back to the documented default.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::{AppError, AppResult},
    models::*,
    utils::{hostname_of, non_empty_or, time_sortable_uid},
};

//=============================================================================
//  Common bodies
//=============================================================================

/// Body of every `DELETE` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRequest {
    #[serde(default)]
    pub id: String,
}

/// Body of every `PUT` endpoint: the record id plus the fields to overwrite.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchRequest {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteFilter {
    pub site_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    pub site_id: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        filter_matches(&self.site_id, &issue.site_id)
            && filter_matches(&self.category, &issue.category)
            && filter_matches(&self.severity, &issue.severity)
            && filter_matches(&self.status, &issue.status)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkFilter {
    pub site_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// True when no filter value was given or it equals `value`.
pub fn filter_matches(filter: &Option<String>, value: &str) -> bool {
    match filter.as_deref() {
        None | Some("") => true,
        Some(f) => f == value,
    }
}

//=============================================================================
//  Creation bodies
//=============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewSite {
    pub name: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub cms: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub current_score: Option<i64>,
}

impl TryFrom<NewSite> for Site {
    type Error = AppError;

    fn try_from(req: NewSite) -> AppResult<Self> {
        let url = non_empty_or(req.url, "");
        let domain = match req.domain.filter(|d| !d.is_empty()) {
            Some(domain) => domain,
            None if url.is_empty() => String::new(),
            None => hostname_of(&url)
                .ok_or_else(|| AppError::validation(format!("Invalid site URL: {}", url)))?,
        };

        Ok(Site {
            id: time_sortable_uid(),
            name: non_empty_or(req.name, ""),
            url,
            domain,
            cms: non_empty_or(req.cms, "custom"),
            current_score: req.current_score.unwrap_or(0),
            previous_score: 0,
            score_history: Vec::new(),
            last_audit: None,
            integrations: Integrations::default(),
            created_at: Utc::now(),
            extra: Map::new(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewAudit {
    pub site_id: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub score: Option<i64>,
    pub categories: Option<AuditCategories>,
    pub summary: Option<String>,
}

impl From<NewAudit> for Audit {
    fn from(req: NewAudit) -> Self {
        Audit {
            id: time_sortable_uid(),
            site_id: non_empty_or(req.site_id, ""),
            score: req.score.unwrap_or(0),
            categories: req.categories.unwrap_or_default(),
            summary: non_empty_or(req.summary, ""),
            created_at: Utc::now(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewIssue {
    pub site_id: Option<String>,
    pub audit_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub fix: Option<String>,
    pub impact: Option<String>,
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub priority: Option<i64>,
    pub assigned_to: Option<String>,
}

impl From<NewIssue> for Issue {
    fn from(req: NewIssue) -> Self {
        Issue {
            id: time_sortable_uid(),
            site_id: non_empty_or(req.site_id, ""),
            audit_id: req.audit_id.filter(|a| !a.is_empty()),
            title: non_empty_or(req.title, ""),
            description: non_empty_or(req.description, ""),
            category: non_empty_or(req.category, "technical"),
            severity: non_empty_or(req.severity, "medium"),
            status: non_empty_or(req.status, "open"),
            fix: non_empty_or(req.fix, ""),
            impact: non_empty_or(req.impact, ""),
            url: non_empty_or(req.url, ""),
            priority: req.priority.filter(|p| *p != 0).unwrap_or(5),
            assigned_to: non_empty_or(req.assigned_to, ""),
            fixed_at: None,
            created_at: Utc::now(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewContent {
    pub site_id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub target_keywords: Option<Vec<TargetKeyword>>,
    pub content: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub word_count: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub readability_score: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub seo_score: Option<i64>,
    pub status: Option<String>,
    pub url: Option<String>,
}

impl From<NewContent> for ContentItem {
    fn from(req: NewContent) -> Self {
        ContentItem {
            id: time_sortable_uid(),
            site_id: non_empty_or(req.site_id, ""),
            title: non_empty_or(req.title, ""),
            kind: non_empty_or(req.kind, "blog-post"),
            target_keywords: req.target_keywords.unwrap_or_default(),
            content: non_empty_or(req.content, ""),
            meta_title: non_empty_or(req.meta_title, ""),
            meta_description: non_empty_or(req.meta_description, ""),
            slug: non_empty_or(req.slug, ""),
            word_count: req.word_count.unwrap_or(0),
            readability_score: req.readability_score.unwrap_or(0),
            seo_score: req.seo_score.unwrap_or(0),
            status: non_empty_or(req.status, "draft"),
            url: non_empty_or(req.url, ""),
            created_at: Utc::now(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewKeyword {
    pub site_id: Option<String>,
    pub keyword: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub volume: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub difficulty: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub current_position: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub previous_position: Option<i64>,
    pub trend: Option<String>,
    pub intent: Option<String>,
    pub cluster_id: Option<String>,
    pub url: Option<String>,
}

impl From<NewKeyword> for Keyword {
    fn from(req: NewKeyword) -> Self {
        Keyword {
            id: time_sortable_uid(),
            site_id: non_empty_or(req.site_id, ""),
            keyword: non_empty_or(req.keyword, ""),
            volume: req.volume.unwrap_or(0),
            difficulty: req.difficulty.unwrap_or(0),
            // Position 0 means "not ranked"
            current_position: req.current_position.filter(|p| *p != 0),
            previous_position: req.previous_position.filter(|p| *p != 0),
            trend: non_empty_or(req.trend, "stable"),
            intent: non_empty_or(req.intent, "informational"),
            cluster_id: req.cluster_id.filter(|c| !c.is_empty()),
            url: non_empty_or(req.url, ""),
            last_checked: Utc::now(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewLink {
    pub site_id: Option<String>,
    pub source_url: Option<String>,
    pub source_domain: Option<String>,
    pub target_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub anchor_text: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub domain_authority: Option<i64>,
}

impl From<NewLink> for Link {
    fn from(req: NewLink) -> Self {
        let now = Utc::now();
        Link {
            id: time_sortable_uid(),
            site_id: non_empty_or(req.site_id, ""),
            source_url: non_empty_or(req.source_url, ""),
            source_domain: non_empty_or(req.source_domain, ""),
            target_url: non_empty_or(req.target_url, ""),
            kind: non_empty_or(req.kind, "backlink"),
            status: non_empty_or(req.status, "active"),
            anchor_text: non_empty_or(req.anchor_text, ""),
            domain_authority: req.domain_authority.unwrap_or(0),
            contact_email: None,
            outreach_date: None,
            notes: None,
            first_seen: now,
            last_checked: now,
            extra: Map::new(),
        }
    }
}

/// Body of `POST /api/links/outreach`: a link opportunity plus contact data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutreachRequest {
    pub site_id: Option<String>,
    pub source_url: Option<String>,
    pub source_domain: Option<String>,
    pub target_url: Option<String>,
    pub anchor_text: Option<String>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub domain_authority: Option<i64>,
    pub contact_email: Option<String>,
    pub notes: Option<String>,
}

impl From<OutreachRequest> for Link {
    fn from(req: OutreachRequest) -> Self {
        let now = Utc::now();
        Link {
            id: time_sortable_uid(),
            site_id: non_empty_or(req.site_id, ""),
            source_url: non_empty_or(req.source_url, ""),
            source_domain: non_empty_or(req.source_domain, ""),
            target_url: non_empty_or(req.target_url, ""),
            kind: LINK_TYPE_OPPORTUNITY.to_string(),
            status: "pending-outreach".to_string(),
            anchor_text: non_empty_or(req.anchor_text, ""),
            domain_authority: req.domain_authority.unwrap_or(0),
            contact_email: Some(non_empty_or(req.contact_email, "")),
            outreach_date: Some(now),
            notes: Some(non_empty_or(req.notes, "")),
            first_seen: now,
            last_checked: now,
            extra: Map::new(),
        }
    }
}

//=============================================================================
//  Analyzer bodies
//=============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuickCheckRequest {
    pub url: Option<String>,
}

/// Result of fetching and scoring one page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuickCheckReport {
    pub url: String,
    pub score: i64,
    pub load_time: u64,
    pub title: String,
    pub description: String,
    pub html_size: usize,
    pub categories: AuditCategories,
    pub total_issues: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentAnalysisRequest {
    pub content: Option<String>,
    pub target_keywords: Option<Vec<TargetKeyword>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Good,
    Ok,
    Bad,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub msg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordDensity {
    pub keyword: String,
    pub count: usize,
    pub density: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentReport {
    pub seo_score: i64,
    pub word_count: usize,
    pub readability: i64,
    pub avg_words_per_sentence: i64,
    pub keyword_densities: Vec<KeywordDensity>,
    pub headings: HeadingCounts,
    pub link_count: usize,
    pub feedback: Vec<Feedback>,
}

/// Response of `POST /api/content/analyze`. Empty content short-circuits to
/// a zero score with a single issue line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ContentAnalysis {
    Report(ContentReport),
    Empty { #[serde(rename = "seoScore")] seo_score: i64, issues: Vec<String> },
}

//=============================================================================
//  Aggregates
//=============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    pub total: usize,
    pub by_category: IndexMap<String, usize>,
    pub by_severity: IndexMap<String, usize>,
    pub by_status: IndexMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordCluster {
    pub id: String,
    pub keywords: Vec<Keyword>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentSuggestion {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationGuide {
    pub platform: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub setup_steps: Vec<String>,
    pub api_endpoints: Vec<String>,
    pub features: Vec<String>,
    pub best_practices: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueCounts {
    pub total: usize,
    pub open: usize,
    pub fixed: usize,
    pub in_progress: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentCounts {
    pub total: usize,
    pub published: usize,
    pub draft: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeywordCounts {
    pub total: usize,
    pub improving: usize,
    pub declining: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkCounts {
    pub total: usize,
    pub active: usize,
    pub lost: usize,
}

/// Dashboard overview returned by `GET /api/analytics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub current_score: i64,
    pub previous_score: i64,
    pub score_history: Vec<ScorePoint>,
    pub issues: IssueCounts,
    pub content: ContentCounts,
    pub keywords: KeywordCounts,
    pub links: LinkCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_site_derives_domain_from_url() {
        let req: NewSite =
            serde_json::from_value(json!({"name": "Blog", "url": "https://blog.example.org/"}))
                .unwrap();
        let site = Site::try_from(req).unwrap();
        assert_eq!(site.domain, "blog.example.org");
        assert_eq!(site.cms, "custom");
        assert_eq!(site.current_score, 0);
        assert!(site.score_history.is_empty());
        assert!(!site.id.is_empty());
    }

    #[test]
    fn test_new_site_explicit_domain_wins() {
        let req: NewSite = serde_json::from_value(
            json!({"url": "https://a.example.com", "domain": "example.com", "cms": ""}),
        )
        .unwrap();
        let site = Site::try_from(req).unwrap();
        assert_eq!(site.domain, "example.com");
        assert_eq!(site.cms, "custom");
    }

    #[test]
    fn test_new_site_rejects_bad_url() {
        let req: NewSite = serde_json::from_value(json!({"url": "nope"})).unwrap();
        let err = Site::try_from(req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_new_issue_defaults() {
        let issue = Issue::from(NewIssue {
            priority: Some(0),
            ..Default::default()
        });
        assert_eq!(issue.category, "technical");
        assert_eq!(issue.severity, "medium");
        assert_eq!(issue.status, "open");
        assert_eq!(issue.priority, 5);
        assert_eq!(issue.audit_id, None);
        assert_eq!(issue.fixed_at, None);
    }

    #[test]
    fn test_outreach_link_is_opportunity() {
        let link = Link::from(OutreachRequest {
            source_domain: Some("news.example".into()),
            contact_email: Some("editor@news.example".into()),
            ..Default::default()
        });
        assert_eq!(link.kind, LINK_TYPE_OPPORTUNITY);
        assert_eq!(link.status, "pending-outreach");
        assert_eq!(link.contact_email.as_deref(), Some("editor@news.example"));
        assert!(link.outreach_date.is_some());
    }

    #[test]
    fn test_issue_filter_and_semantics() {
        let issue = Issue {
            site_id: "s1".into(),
            category: "content".into(),
            severity: "high".into(),
            status: "open".into(),
            ..Default::default()
        };
        let mut filter = IssueFilter::default();
        assert!(filter.matches(&issue));
        filter.category = Some("content".into());
        filter.status = Some("open".into());
        assert!(filter.matches(&issue));
        filter.severity = Some("low".into());
        assert!(!filter.matches(&issue));
    }

    #[test]
    fn test_patch_request_splits_id() {
        let patch: PatchRequest =
            serde_json::from_value(json!({"id": "x", "status": "fixed"})).unwrap();
        assert_eq!(patch.id, "x");
        assert_eq!(patch.fields.get("status"), Some(&json!("fixed")));
        assert!(!patch.fields.contains_key("id"));
    }

    #[test]
    fn test_empty_analysis_shape() {
        let value = serde_json::to_value(ContentAnalysis::Empty {
            seo_score: 0,
            issues: vec!["No content provided".into()],
        })
        .unwrap();
        assert_eq!(value, json!({"seoScore": 0, "issues": ["No content provided"]}));
    }
}
