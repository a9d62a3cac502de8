use crate::store::SnapshotStore;
use crate::types::{
    Counts, LanguageCount, ModelsSnapshot, NewsSnapshot, PapersSnapshot, Stats, TagCount,
    TrendingSnapshot,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub const MAX_TOP_TAGS: usize = 10;
pub const MAX_TOP_LANGUAGES: usize = 5;

/// Sizes of the hand-maintained collections that only appear in the counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticCounts {
    pub ai_tools: usize,
    pub dev_tips: usize,
}

impl StaticCounts {
    /// Missing or malformed files count as empty.
    pub async fn load(store: &SnapshotStore) -> Self {
        Self {
            ai_tools: store.count_items("ai_tools.json", "tools").await,
            dev_tips: store.count_items("dev_tips.json", "tips").await,
        }
    }
}

/// The current snapshot of every live source.
#[derive(Debug, Clone, Copy)]
pub struct SourceSnapshots<'a> {
    pub papers: &'a PapersSnapshot,
    pub models: &'a ModelsSnapshot,
    pub trending: &'a TrendingSnapshot,
    pub news: &'a NewsSnapshot,
}

/// Cross-source summary statistics.
///
/// Paper categories are counted before model tags, so on equal counts a
/// tag first seen on a paper ranks ahead of one first seen on a model.
pub fn compute(
    sources: SourceSnapshots<'_>,
    static_counts: StaticCounts,
    updated: DateTime<Utc>,
) -> Stats {
    let paper_tags = sources
        .papers
        .papers
        .iter()
        .flat_map(|p| p.categories.iter());
    let model_tags = sources.models.models.iter().flat_map(|m| m.tags.iter());
    let top_tags = rank(paper_tags.chain(model_tags).map(String::as_str), MAX_TOP_TAGS)
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();

    let languages = sources
        .trending
        .repositories
        .iter()
        .map(|r| r.language.as_str())
        .filter(|l| !l.is_empty());
    let top_languages = rank(languages, MAX_TOP_LANGUAGES)
        .into_iter()
        .map(|(language, count)| LanguageCount { language, count })
        .collect();

    Stats {
        updated,
        counts: Counts {
            arxiv: sources.papers.papers.len(),
            huggingface: sources.models.models.len(),
            github_trending: sources.trending.repositories.len(),
            rss_news: sources.news.articles.len(),
            ai_tools: static_counts.ai_tools,
            dev_tips: static_counts.dev_tips,
        },
        top_tags,
        top_languages,
    }
}

/// Count occurrences and rank by count descending. Ties keep first-seen order.
pub fn rank<'a, I>(items: I, limit: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for item in items {
        match index.get(item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item, counts.len());
                counts.push((item.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);
    counts
}
