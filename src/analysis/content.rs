//! Scoring of draft content (markdown or HTML) against target keywords.

use std::sync::LazyLock;

use log::warn;
use regex::{Regex, RegexBuilder};

use crate::{
    models::TargetKeyword,
    schema::{
        ContentAnalysis, ContentAnalysisRequest, ContentReport, Feedback, FeedbackKind,
        HeadingCounts, KeywordDensity,
    },
};

const BASE_SCORE: i64 = 50;
const LONG_FORM_WORDS: usize = 1500;
const DECENT_WORDS: usize = 800;
const DENSITY_MIN: f64 = 1.0;
const DENSITY_MAX: f64 = 3.0;
const MIN_H2: usize = 2;
const MIN_LINKS: usize = 3;
const META_TITLE_CHARS: std::ops::RangeInclusive<usize> = 30..=60;
const META_DESCRIPTION_CHARS: std::ops::RangeInclusive<usize> = 120..=160;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#*_`\[\]]").unwrap());
static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());
static MD_H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#\s").unwrap());
static MD_H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^##\s").unwrap());
static HTML_H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h1").unwrap());
static HTML_H2_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h2").unwrap());
static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]\(.*?\)").unwrap());
static HTML_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<a\s").unwrap());

/// Strips HTML tags and markdown punctuation, leaving prose.
pub fn plain_text(content: &str) -> String {
    let without_tags = TAG_RE.replace_all(content, "");
    MARKUP_RE.replace_all(&without_tags, "").into_owned()
}

/// Flesch reading ease reduced to its sentence-length term.
pub fn readability(avg_words_per_sentence: f64) -> f64 {
    (206.835 - 1.015 * avg_words_per_sentence).clamp(0.0, 100.0)
}

/// Case-insensitive, literal occurrences of `keyword` in `text`.
pub fn count_occurrences(text: &str, keyword: &str) -> usize {
    match RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.find_iter(text).count(),
        Err(e) => {
            warn!("Cannot match keyword {:?}: {}", keyword, e);
            0
        }
    }
}

struct Scoring {
    score: i64,
    feedback: Vec<Feedback>,
}

impl Scoring {
    fn note(&mut self, kind: FeedbackKind, delta: i64, msg: impl Into<String>) {
        self.score += delta;
        self.feedback.push(Feedback {
            kind,
            msg: msg.into(),
        });
    }
}

pub fn analyze_content(req: &ContentAnalysisRequest) -> ContentAnalysis {
    let content = match req.content.as_deref() {
        Some(c) if !c.is_empty() => c,
        _ => {
            return ContentAnalysis::Empty {
                seo_score: 0,
                issues: vec!["No content provided".to_string()],
            };
        }
    };

    let text = plain_text(content);
    let word_count = text.split_whitespace().count();
    let sentence_count = SENTENCE_END_RE
        .split(&text)
        .filter(|s| !s.trim().is_empty())
        .count();
    let avg_words_per_sentence = if sentence_count > 0 {
        word_count as f64 / sentence_count as f64
    } else {
        0.0
    };

    let mut s = Scoring {
        score: BASE_SCORE,
        feedback: Vec::new(),
    };

    if word_count > LONG_FORM_WORDS {
        s.note(
            FeedbackKind::Good,
            10,
            format!("Good content length ({} words)", word_count),
        );
    } else if word_count > DECENT_WORDS {
        s.note(
            FeedbackKind::Ok,
            5,
            format!("Decent length ({} words), aim for 1500+", word_count),
        );
    } else {
        s.note(
            FeedbackKind::Bad,
            -10,
            format!("Content too short ({} words), aim for 1500+", word_count),
        );
    }

    let ease = readability(avg_words_per_sentence);

    let keywords: &[TargetKeyword] = req.target_keywords.as_deref().unwrap_or_default();
    let mut keyword_densities = Vec::with_capacity(keywords.len());
    for target in keywords {
        let keyword = target.text().to_lowercase();
        if keyword.is_empty() {
            continue;
        }
        let count = count_occurrences(&text, &keyword);
        let density = if word_count > 0 {
            count as f64 / word_count as f64 * 100.0
        } else {
            0.0
        };

        if (DENSITY_MIN..=DENSITY_MAX).contains(&density) {
            s.note(
                FeedbackKind::Good,
                5,
                format!("Good keyword density for \"{}\" ({:.1}%)", keyword, density),
            );
        } else if density > DENSITY_MAX {
            s.note(
                FeedbackKind::Bad,
                -5,
                format!("Keyword stuffing for \"{}\" ({:.1}%)", keyword, density),
            );
        } else if density > 0.0 {
            s.note(
                FeedbackKind::Ok,
                0,
                format!(
                    "Low density for \"{}\" ({:.1}%), aim for 1-3%",
                    keyword, density
                ),
            );
        } else {
            s.note(
                FeedbackKind::Bad,
                -5,
                format!("Keyword \"{}\" not found in content", keyword),
            );
        }

        keyword_densities.push(KeywordDensity {
            keyword,
            count,
            density: (density * 100.0).round() / 100.0,
        });
    }

    let headings = HeadingCounts {
        h1: MD_H1_RE.find_iter(content).count() + HTML_H1_RE.find_iter(content).count(),
        h2: MD_H2_RE.find_iter(content).count() + HTML_H2_RE.find_iter(content).count(),
    };
    if headings.h2 >= MIN_H2 {
        s.note(
            FeedbackKind::Good,
            5,
            format!("Good heading structure ({} H2s)", headings.h2),
        );
    } else {
        s.note(FeedbackKind::Bad, -5, "Add more H2 headings for structure");
    }

    match req.meta_title.as_deref().filter(|t| !t.is_empty()) {
        Some(title) => {
            let len = title.chars().count();
            if META_TITLE_CHARS.contains(&len) {
                s.note(FeedbackKind::Good, 5, "Meta title length is optimal");
            } else {
                s.note(
                    FeedbackKind::Ok,
                    0,
                    format!("Meta title is {} chars (aim for 30-60)", len),
                );
            }
        }
        None => s.note(FeedbackKind::Bad, -5, "Missing meta title"),
    }

    match req.meta_description.as_deref().filter(|d| !d.is_empty()) {
        Some(description) => {
            let len = description.chars().count();
            if META_DESCRIPTION_CHARS.contains(&len) {
                s.note(FeedbackKind::Good, 5, "Meta description length is optimal");
            } else {
                s.note(
                    FeedbackKind::Ok,
                    0,
                    format!("Meta description is {} chars (aim for 120-160)", len),
                );
            }
        }
        None => s.note(FeedbackKind::Bad, -5, "Missing meta description"),
    }

    let link_count =
        MD_LINK_RE.find_iter(content).count() + HTML_LINK_RE.find_iter(content).count();
    if link_count >= MIN_LINKS {
        s.note(
            FeedbackKind::Good,
            5,
            format!("Good internal/external linking ({} links)", link_count),
        );
    } else {
        s.note(FeedbackKind::Ok, 0, "Add more internal and external links");
    }

    ContentAnalysis::Report(ContentReport {
        seo_score: s.score.clamp(0, 100),
        word_count,
        readability: ease.round() as i64,
        avg_words_per_sentence: avg_words_per_sentence.round() as i64,
        keyword_densities,
        headings,
        link_count,
        feedback: s.feedback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str) -> ContentAnalysisRequest {
        ContentAnalysisRequest {
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    fn report(req: &ContentAnalysisRequest) -> ContentReport {
        match analyze_content(req) {
            ContentAnalysis::Report(r) => r,
            other => panic!("expected a report, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_content_short_circuits() {
        assert_eq!(
            analyze_content(&ContentAnalysisRequest::default()),
            ContentAnalysis::Empty {
                seo_score: 0,
                issues: vec!["No content provided".into()]
            }
        );
        assert!(matches!(
            analyze_content(&request("")),
            ContentAnalysis::Empty { .. }
        ));
    }

    #[test]
    fn test_plain_text_strips_markup() {
        assert_eq!(
            plain_text("## Hello <b>*bold*</b> [link](x) `code`"),
            " Hello bold link(x) code"
        );
    }

    #[test]
    fn test_short_bare_content_penalties() {
        // 50 - 10 (short) - 5 (h2) - 5 (meta title) - 5 (meta description)
        let r = report(&request("Just a few words here. Another sentence!"));
        assert_eq!(r.word_count, 7);
        assert_eq!(r.avg_words_per_sentence, 4); // 7 / 2 = 3.5
        assert_eq!(r.seo_score, 25);
        assert_eq!(r.readability, 100);
        assert_eq!(r.headings, HeadingCounts { h1: 0, h2: 0 });
        assert_eq!(r.feedback[0].kind, FeedbackKind::Bad);
        assert_eq!(r.feedback[0].msg, "Content too short (7 words), aim for 1500+");
        assert_eq!(
            r.feedback.last().unwrap().msg,
            "Add more internal and external links"
        );
    }

    #[test]
    fn test_long_well_structured_content() {
        let mut body = String::from("# Rust guide\n\n## Part one\n\n## Part two\n\n");
        // 1600 words, 16 sentences, "rust" appears 32 times (2%)
        for _ in 0..16 {
            body.push_str(&"word ".repeat(98));
            body.push_str("rust Rust. ");
        }
        body.push_str("[a](/a) [b](/b) <a href=\"/c\">c</a>");

        let req = ContentAnalysisRequest {
            content: Some(body),
            target_keywords: Some(vec![TargetKeyword::Plain("RUST".into())]),
            meta_title: Some("A complete guide to Rust for SEO folks".into()),
            meta_description: Some("d".repeat(130)),
        };
        let r = report(&req);

        assert_eq!(r.headings, HeadingCounts { h1: 1, h2: 2 });
        assert_eq!(r.link_count, 3);
        assert_eq!(r.keyword_densities.len(), 1);
        let kd = &r.keyword_densities[0];
        assert_eq!(kd.keyword, "rust");
        // heading "Rust guide" adds one more occurrence
        assert_eq!(kd.count, 33);
        assert!(kd.density > 1.0 && kd.density < 3.0);
        // 50 + 10 + 5 + 5 + 5 + 5 + 5 = 85
        assert_eq!(r.seo_score, 85);
        assert!(r.feedback.iter().all(|f| f.kind == FeedbackKind::Good));
    }

    #[test]
    fn test_keyword_density_bands() {
        let text = "alpha beta gamma delta. ".repeat(25); // 100 words
        let req = ContentAnalysisRequest {
            content: Some(format!("{} alpha alpha alpha", text)),
            target_keywords: Some(vec![
                TargetKeyword::Tagged {
                    keyword: "alpha".into(),
                },
                TargetKeyword::Plain("beta".into()),
                TargetKeyword::Plain("missing".into()),
                TargetKeyword::Plain(String::new()),
            ]),
            ..Default::default()
        };
        let r = report(&req);
        let densities: Vec<(&str, usize, f64)> = r
            .keyword_densities
            .iter()
            .map(|k| (k.keyword.as_str(), k.count, k.density))
            .collect();
        assert_eq!(
            densities,
            vec![("alpha", 28, 27.18), ("beta", 25, 24.27), ("missing", 0, 0.0)]
        );
        assert!(r.feedback.iter().any(|f| f.msg == "Keyword stuffing for \"alpha\" (27.2%)"));
        assert!(r.feedback.iter().any(|f| f.msg == "Keyword \"missing\" not found in content"));
    }

    #[test]
    fn test_low_density_is_neutral() {
        let mut body = "filler ".repeat(199);
        body.push_str("needle");
        let r = report(&ContentAnalysisRequest {
            content: Some(body),
            target_keywords: Some(vec![TargetKeyword::Plain("needle".into())]),
            ..Default::default()
        });
        assert_eq!(r.keyword_densities[0].density, 0.5);
        assert!(r
            .feedback
            .iter()
            .any(|f| f.kind == FeedbackKind::Ok && f.msg.starts_with("Low density for \"needle\" (0.5%)")));
    }

    #[test]
    fn test_keyword_is_literal() {
        assert_eq!(count_occurrences("c++ and C++ and cpp", "c++"), 2);
        assert_eq!(count_occurrences("a.b axb", "a.b"), 1);
    }

    #[test]
    fn test_meta_lengths_outside_range_are_neutral() {
        let r = report(&ContentAnalysisRequest {
            content: Some("text".into()),
            meta_title: Some("short".into()),
            meta_description: Some("tiny".into()),
            ..Default::default()
        });
        assert!(r.feedback.iter().any(|f| f.msg == "Meta title is 5 chars (aim for 30-60)"));
        assert!(r
            .feedback
            .iter()
            .any(|f| f.msg == "Meta description is 4 chars (aim for 120-160)"));
        // 50 - 10 (short) - 5 (h2)
        assert_eq!(r.seo_score, 35);
    }

    #[test]
    fn test_readability_clamps() {
        assert_eq!(readability(0.0), 100.0);
        assert_eq!(readability(500.0), 0.0);
        assert_eq!(readability(100.0), 100.0);
        assert!((readability(150.0) - 54.585).abs() < 1e-9);
    }

    #[test]
    fn test_html_headings_and_links() {
        let html = "<H1>T</H1><h2>a</h2><h2>b</h2><a href='x'>1</a><A\nhref='y'>2</A>";
        let r = report(&request(html));
        assert_eq!(r.headings, HeadingCounts { h1: 1, h2: 2 });
        assert_eq!(r.link_count, 2);
        // tags are removed without spacing, so the letters fuse into one word
        assert_eq!(r.word_count, 1);
    }
}
