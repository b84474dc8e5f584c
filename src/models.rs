//! Records persisted in the JSON collections.
//!
//! Every record keeps the keys it does not know about in a flattened `extra`
//! map, so a partial update can attach arbitrary fields and they survive the
//! next load/save cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record stored in a JSON collection, addressed by its id.
pub trait Record {
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })+
    };
}

impl_record!(Site, Audit, Issue, ContentItem, Keyword, Link);

/// Integer fields edited by hand or written by older versions may hold
/// fractional numbers; they are rounded on read.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Number;

    fn round(n: &Number) -> i64 {
        n.as_i64()
            .unwrap_or_else(|| n.as_f64().map_or(0, |f| f.round() as i64))
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        Ok(Option::<Number>::deserialize(d)?.as_ref().map_or(0, round))
    }

    pub fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(Option::<Number>::deserialize(d)?.as_ref().map(round))
    }
}

//=============================================================================
//  Scoring primitives shared by audits and the page analyzer
//=============================================================================

/// How urgent a problem found by the page analyzer is. Stored audits keep
/// severities as plain strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// The six scoring dimensions of an audit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Technical,
    Content,
    OnPage,
    OffPage,
    Performance,
    Aeo,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Technical,
        Category::Content,
        Category::OnPage,
        Category::OffPage,
        Category::Performance,
        Category::Aeo,
    ];
}

/// One problem found on a page, with the suggested fix.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FoundIssue {
    pub title: String,
    pub severity: String,
    pub fix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CategoryReport {
    #[serde(deserialize_with = "lenient::int")]
    pub score: i64,
    pub issues: Vec<FoundIssue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditCategories {
    pub technical: CategoryReport,
    pub content: CategoryReport,
    pub on_page: CategoryReport,
    pub off_page: CategoryReport,
    pub performance: CategoryReport,
    pub aeo: CategoryReport,
}

impl AuditCategories {
    pub fn get(&self, category: Category) -> &CategoryReport {
        match category {
            Category::Technical => &self.technical,
            Category::Content => &self.content,
            Category::OnPage => &self.on_page,
            Category::OffPage => &self.off_page,
            Category::Performance => &self.performance,
            Category::Aeo => &self.aeo,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut CategoryReport {
        match category {
            Category::Technical => &mut self.technical,
            Category::Content => &mut self.content,
            Category::OnPage => &mut self.on_page,
            Category::OffPage => &mut self.off_page,
            Category::Performance => &mut self.performance,
            Category::Aeo => &mut self.aeo,
        }
    }
}

//=============================================================================
//  Sites & audits
//=============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ScorePoint {
    #[serde(deserialize_with = "lenient::int")]
    pub score: i64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Integrations {
    pub google_analytics: bool,
    pub search_console: bool,
    pub semrush: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
    pub url: String,
    pub domain: String,
    pub cms: String,
    #[serde(deserialize_with = "lenient::int")]
    pub current_score: i64,
    #[serde(deserialize_with = "lenient::int")]
    pub previous_score: i64,
    pub score_history: Vec<ScorePoint>,
    pub last_audit: Option<DateTime<Utc>>,
    pub integrations: Integrations,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Site {
    /// Shifts the current score into `previous_score` and records `score`
    /// as the latest audit result.
    pub fn record_audit(&mut self, score: i64, at: DateTime<Utc>) {
        self.previous_score = self.current_score;
        self.current_score = score;
        self.last_audit = Some(at);
        self.score_history.push(ScorePoint { score, date: at });
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Audit {
    pub id: String,
    pub site_id: String,
    #[serde(deserialize_with = "lenient::int")]
    pub score: i64,
    pub categories: AuditCategories,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

//=============================================================================
//  Issues
//=============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub site_id: String,
    pub audit_id: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub severity: String,
    pub status: String,
    pub fix: String,
    pub impact: String,
    pub url: String,
    #[serde(deserialize_with = "lenient::int")]
    pub priority: i64,
    pub assigned_to: String,
    pub fixed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const ISSUE_STATUS_FIXED: &str = "fixed";

//=============================================================================
//  Content
//=============================================================================

/// A target keyword, stored either as a bare string or as `{"keyword": ".."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TargetKeyword {
    Plain(String),
    Tagged { keyword: String },
}

impl TargetKeyword {
    pub fn text(&self) -> &str {
        match self {
            TargetKeyword::Plain(k) => k,
            TargetKeyword::Tagged { keyword } => keyword,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub site_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub target_keywords: Vec<TargetKeyword>,
    pub content: String,
    pub meta_title: String,
    pub meta_description: String,
    pub slug: String,
    #[serde(deserialize_with = "lenient::int")]
    pub word_count: i64,
    #[serde(deserialize_with = "lenient::int")]
    pub readability_score: i64,
    #[serde(deserialize_with = "lenient::int")]
    pub seo_score: i64,
    pub status: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

//=============================================================================
//  Keywords & links
//=============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Keyword {
    pub id: String,
    pub site_id: String,
    pub keyword: String,
    #[serde(deserialize_with = "lenient::int")]
    pub volume: i64,
    #[serde(deserialize_with = "lenient::int")]
    pub difficulty: i64,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub current_position: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_int")]
    pub previous_position: Option<i64>,
    pub trend: String,
    pub intent: String,
    pub cluster_id: Option<String>,
    pub url: String,
    pub last_checked: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const UNCLUSTERED: &str = "unclustered";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub site_id: String,
    pub source_url: String,
    pub source_domain: String,
    pub target_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub anchor_text: String,
    #[serde(deserialize_with = "lenient::int")]
    pub domain_authority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outreach_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_checked: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const LINK_TYPE_OPPORTUNITY: &str = "opportunity";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_keeps_unknown_fields() {
        let raw = json!({
            "id": "s1",
            "name": "Example",
            "currentScore": 40,
            "favourite": true
        });
        let site: Site = serde_json::from_value(raw).unwrap();
        assert_eq!(site.current_score, 40);
        assert_eq!(site.extra.get("favourite"), Some(&json!(true)));

        let back = serde_json::to_value(&site).unwrap();
        assert_eq!(back["favourite"], json!(true));
        assert_eq!(back["scoreHistory"], json!([]));
        assert_eq!(back["lastAudit"], Value::Null);
    }

    #[test]
    fn test_fractional_numbers_are_rounded() {
        let raw = json!({
            "id": "s1",
            "currentScore": 87.5,
            "previousScore": null,
            "scoreHistory": [{"score": 61.2, "date": "2026-01-02T03:04:05Z"}]
        });
        let site: Site = serde_json::from_value(raw).unwrap();
        assert_eq!(site.current_score, 88);
        assert_eq!(site.previous_score, 0);
        assert_eq!(site.score_history[0].score, 61);

        let kw: Keyword =
            serde_json::from_value(json!({"id": "k", "currentPosition": 3.0})).unwrap();
        assert_eq!(kw.current_position, Some(3));
        assert_eq!(kw.previous_position, None);

        assert!(serde_json::from_value::<Site>(json!({"currentScore": "high"})).is_err());
    }

    #[test]
    fn test_found_issue_severity_is_free_text() {
        let report: CategoryReport = serde_json::from_value(json!({
            "score": 90,
            "issues": [{"title": "Minor", "severity": "info", "fix": ""}]
        }))
        .unwrap();
        assert_eq!(report.issues[0].severity, "info");
        assert_eq!(Severity::Critical.as_str(), "critical");
    }

    #[test]
    fn test_record_audit_shifts_scores() {
        let mut site = Site {
            current_score: 55,
            ..Default::default()
        };
        let now = Utc::now();
        site.record_audit(72, now);
        assert_eq!(site.previous_score, 55);
        assert_eq!(site.current_score, 72);
        assert_eq!(site.last_audit, Some(now));
        assert_eq!(site.score_history, vec![ScorePoint { score: 72, date: now }]);
    }

    #[test]
    fn test_target_keyword_shapes() {
        let kws: Vec<TargetKeyword> =
            serde_json::from_value(json!(["seo tips", {"keyword": "Rust"}])).unwrap();
        assert_eq!(kws[0].text(), "seo tips");
        assert_eq!(kws[1].text(), "Rust");
        assert_eq!(
            serde_json::to_value(&kws).unwrap(),
            json!(["seo tips", {"keyword": "Rust"}])
        );
    }

    #[test]
    fn test_category_wire_names() {
        let names: Vec<Value> = Category::ALL
            .iter()
            .map(|c| serde_json::to_value(c).unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                json!("technical"),
                json!("content"),
                json!("onPage"),
                json!("offPage"),
                json!("performance"),
                json!("aeo")
            ]
        );
    }

    #[test]
    fn test_link_type_field_and_optional_outreach() {
        let link = Link {
            id: "l1".into(),
            kind: "backlink".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["type"], json!("backlink"));
        assert!(value.get("contactEmail").is_none());
    }
}
