//! Read-only aggregates over the stored collections.

use indexmap::IndexMap;

use crate::{
    models::{ContentItem, Issue, Keyword, LINK_TYPE_OPPORTUNITY, Link, Site, UNCLUSTERED},
    schema::{
        AnalyticsSnapshot, ContentCounts, IssueCounts, IssueSummary, KeywordCluster,
        KeywordCounts, LinkCounts,
    },
};

pub fn issue_summary(issues: &[Issue]) -> IssueSummary {
    let mut summary = IssueSummary {
        total: issues.len(),
        ..Default::default()
    };
    for issue in issues {
        *summary.by_category.entry(issue.category.clone()).or_default() += 1;
        *summary.by_severity.entry(issue.severity.clone()).or_default() += 1;
        *summary.by_status.entry(issue.status.clone()).or_default() += 1;
    }
    summary
}

/// Groups keywords by cluster id, in the order clusters are first seen.
pub fn keyword_clusters(keywords: Vec<Keyword>) -> Vec<KeywordCluster> {
    let mut clusters: IndexMap<String, Vec<Keyword>> = IndexMap::new();
    for keyword in keywords {
        let id = keyword
            .cluster_id
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNCLUSTERED.to_string());
        clusters.entry(id).or_default().push(keyword);
    }
    clusters
        .into_iter()
        .map(|(id, keywords)| KeywordCluster { id, keywords })
        .collect()
}

pub fn link_opportunities(links: Vec<Link>) -> Vec<Link> {
    links
        .into_iter()
        .filter(|l| l.kind == LINK_TYPE_OPPORTUNITY)
        .collect()
}

fn count_where<T>(items: &[T], pred: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|i| pred(i)).count()
}

/// Dashboard overview. Scores come from the first site, since the dashboard
/// manages a single site.
pub fn analytics_snapshot(
    sites: &[Site],
    issues: &[Issue],
    content: &[ContentItem],
    keywords: &[Keyword],
    links: &[Link],
) -> AnalyticsSnapshot {
    let (current_score, previous_score, score_history) = sites
        .first()
        .map(|s| (s.current_score, s.previous_score, s.score_history.clone()))
        .unwrap_or_default();

    AnalyticsSnapshot {
        current_score,
        previous_score,
        score_history,
        issues: IssueCounts {
            total: issues.len(),
            open: count_where(issues, |i| i.status == "open"),
            fixed: count_where(issues, |i| i.status == "fixed"),
            in_progress: count_where(issues, |i| i.status == "in-progress"),
        },
        content: ContentCounts {
            total: content.len(),
            published: count_where(content, |c| c.status == "published"),
            draft: count_where(content, |c| c.status == "draft"),
        },
        keywords: KeywordCounts {
            total: keywords.len(),
            improving: count_where(keywords, |k| k.trend == "up"),
            declining: count_where(keywords, |k| k.trend == "down"),
        },
        links: LinkCounts {
            total: links.len(),
            active: count_where(links, |l| l.status == "active"),
            lost: count_where(links, |l| l.status == "lost"),
        },
    }
}
