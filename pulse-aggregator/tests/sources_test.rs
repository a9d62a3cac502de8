mod common;

use chrono::{NaiveDate, Utc};
use pulse_aggregator::config::{NewsConfig, NewsFeed};
use pulse_aggregator::sources::arxiv::{paper_id, parse_papers};
use pulse_aggregator::sources::github_trending::{parse_api_response, parse_trending_page};
use pulse_aggregator::sources::huggingface::{parse_models, split_model_id};
use pulse_aggregator::sources::rss_news::{latest_articles, parse_articles};
use pulse_aggregator::Article;

const ARXIV_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query: search_query=cat:cs.AI</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <updated>2024-01-03T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/abs/2401.01234v1</id>
    <updated>2024-01-03T18:00:00Z</updated>
    <published>2024-01-02T18:00:00Z</published>
    <title>Scaling Laws
      for Tool-Using Agents</title>
    <summary>  We study how agents
  scale.  </summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
    <author><name>Grace Hopper</name></author>
    <author><name>Edsger Dijkstra</name></author>
    <author><name>Barbara Liskov</name></author>
    <author><name>Donald Knuth</name></author>
    <link href="http://arxiv.org/pdf/2401.01234v1" rel="related" type="application/pdf"/>
    <link href="http://arxiv.org/abs/2401.01234v1" rel="alternate" type="text/html"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.05678v2</id>
    <updated>2024-01-01T08:00:00Z</updated>
    <title>Short Paper</title>
    <summary>SUMMARY_PLACEHOLDER</summary>
    <author><name>Solo Author</name></author>
    <link href="http://arxiv.org/abs/2401.05678v2" rel="alternate" type="text/html"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

#[test]
fn arxiv_entries_are_normalized() {
    common::init_tracing();

    let long_summary = "x".repeat(450);
    let feed = ARXIV_FEED.replace("SUMMARY_PLACEHOLDER", &long_summary);
    let parsed = parse_papers(&feed).expect("feed parses");

    assert!(parsed.issues.is_empty());
    assert_eq!(parsed.records.len(), 2);

    let first = &parsed.records[0];
    assert_eq!(first.id, "2401.01234v1");
    assert_eq!(first.title, "Scaling Laws for Tool-Using Agents");
    assert_eq!(first.summary, "We study how agents scale.");
    assert_eq!(first.authors.len(), 5);
    assert_eq!(first.authors[0], "Ada Lovelace");
    assert!(!first.authors.contains(&"Donald Knuth".to_string()));
    assert_eq!(first.published, "2024-01-02");
    assert_eq!(first.link, "http://arxiv.org/abs/2401.01234v1");
    assert_eq!(first.categories, vec!["cs.CL", "cs.AI"]);

    let second = &parsed.records[1];
    assert_eq!(second.id, "2401.05678v2");
    assert_eq!(second.summary.chars().count(), 300);
    // No published date: the updated date stands in.
    assert_eq!(second.published, "2024-01-01");
}

#[test]
fn arxiv_garbage_is_an_error() {
    assert!(parse_papers("this is not xml at all").is_err());
}

#[test]
fn arxiv_identifier_comes_from_abs_path() {
    assert_eq!(paper_id("http://arxiv.org/abs/2401.01234v1").as_deref(), Some("2401.01234v1"));
    assert_eq!(paper_id("2401.01234").as_deref(), Some("2401.01234"));
    assert_eq!(paper_id("http://arxiv.org/abs/"), None);
}

#[test]
fn model_ids_split_on_namespace() {
    assert_eq!(split_model_id("meta-llama/Llama-3-8B"), ("meta-llama".to_string(), "Llama-3-8B".to_string()));
    assert_eq!(split_model_id("gpt2"), (String::new(), "gpt2".to_string()));
    assert_eq!(split_model_id("org/group/model"), ("org".to_string(), "model".to_string()));
}

#[test]
fn models_skip_bad_entries_and_default_counts() {
    common::init_tracing();

    let body = r#"[
        {"id": "meta-llama/Llama-3-8B", "downloads": 1000, "likes": 50,
         "tags": ["a", "b", "c", "d", "e", "f"], "lastModified": "2024-05-01T12:00:00.000Z"},
        {"id": "gpt2", "downloads": 5},
        {"id": 42},
        {"modelId": "nameless"}
    ]"#;
    let parsed = parse_models(body).expect("array parses");

    assert_eq!(parsed.records.len(), 2);
    assert_eq!(parsed.issues.len(), 2);
    assert_eq!(parsed.issues[0].index, 2);
    assert_eq!(parsed.issues[1].index, 3);

    let llama = &parsed.records[0];
    assert_eq!(llama.author, "meta-llama");
    assert_eq!(llama.name, "Llama-3-8B");
    assert_eq!(llama.tags, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(llama.link, "https://huggingface.co/meta-llama/Llama-3-8B");
    assert_eq!(llama.updated, "2024-05-01");

    let gpt2 = &parsed.records[1];
    assert_eq!(gpt2.author, "");
    assert_eq!(gpt2.likes, 0);
    assert!(gpt2.tags.is_empty());
    assert_eq!(gpt2.updated, "");
}

#[test]
fn models_require_an_array() {
    assert!(parse_models(r#"{"error": "rate limited"}"#).is_err());
}

#[test]
fn trending_api_records_share_the_page_shape() {
    common::init_tracing();

    let long = "d".repeat(250);
    let body = format!(
        r#"[
            {{"fullname": "foo/bar", "description": "{}", "stars": "1,234",
              "currentPeriodStars": 56, "language": "Python", "url": "https://github.com/foo/bar"}},
            {{"name": "baz/qux", "description": null, "stars": 10, "language": null}},
            {{"description": "nameless"}}
        ]"#,
        long
    );
    let parsed = parse_api_response(&body, 15).expect("array parses");

    assert_eq!(parsed.records.len(), 2);
    assert_eq!(parsed.issues.len(), 1);

    let foo = &parsed.records[0];
    assert_eq!(foo.name, "foo/bar");
    assert_eq!(foo.description.chars().count(), 200);
    assert_eq!(foo.stars, 1234);
    assert_eq!(foo.stars_today, 56);
    assert_eq!(foo.language, "Python");

    let baz = &parsed.records[1];
    assert_eq!(baz.description, "");
    assert_eq!(baz.stars_today, 0);
    assert_eq!(baz.language, "");
    assert_eq!(baz.link, "https://github.com/baz/qux");
}

#[test]
fn trending_api_respects_limit() {
    let body = (0..20)
        .map(|i| format!(r#"{{"fullname": "o/r{}", "stars": {}}}"#, i, i))
        .collect::<Vec<_>>()
        .join(",");
    let parsed = parse_api_response(&format!("[{}]", body), 15).unwrap();
    assert_eq!(parsed.records.len(), 15);
}

const TRENDING_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<main>
  <article class="Box-row">
    <h2 class="h3 lh-condensed">
      <a href="/foo/bar" class="Link">foo / bar</a>
    </h2>
    <p class="col-9 color-fg-muted my-1 pr-4">
      A   fast tool
    </p>
    <div class="f6 color-fg-muted mt-2">
      <span class="d-inline-block ml-0 mr-3">
        <span itemprop="programmingLanguage">Rust</span>
      </span>
      <a href="/foo/bar/stargazers" class="Link--muted d-inline-block mr-3"><svg aria-label="star"></svg>
        1,234</a>
      <a href="/foo/bar/forks" class="Link--muted d-inline-block mr-3">99</a>
      <span class="d-inline-block float-sm-right"><svg></svg>
        56 stars today</span>
    </div>
  </article>
  <article class="Box-row">
    <p class="col-9">An entry without a repository link</p>
  </article>
  <article class="Box-row">
    <h2 class="h3"><a href="/x/y">x / y</a></h2>
    <a href="/x/y/stargazers" class="Link--muted">lots</a>
  </article>
</main>
</body></html>"#;

#[test]
fn trending_page_entry_is_scraped() {
    common::init_tracing();

    let parsed = parse_trending_page(TRENDING_PAGE, 15).expect("page parses");
    assert_eq!(parsed.records.len(), 2);
    assert_eq!(parsed.issues.len(), 1);

    let repo = &parsed.records[0];
    assert_eq!(repo.name, "foo/bar");
    assert_eq!(repo.stars, 1234);
    assert_eq!(repo.stars_today, 56);
    assert_eq!(repo.language, "Rust");
    assert_eq!(repo.description, "A fast tool");
    assert_eq!(repo.link, "https://github.com/foo/bar");

    // Unparseable numbers and missing fields default instead of failing.
    let sparse = &parsed.records[1];
    assert_eq!(sparse.name, "x/y");
    assert_eq!(sparse.stars, 0);
    assert_eq!(sparse.stars_today, 0);
    assert_eq!(sparse.language, "");
    assert_eq!(sparse.description, "");
}

#[test]
fn trending_page_without_entries_is_empty() {
    let parsed = parse_trending_page("<html><body><p>rate limited</p></body></html>", 15).unwrap();
    assert!(parsed.records.is_empty());
    assert!(parsed.issues.is_empty());
}

fn rss_feed(items: &[&str]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example AI News</title>
    <link>https://news.example.com</link>
    <description>Example feed</description>
    {}
  </channel>
</rss>"#,
        items.join("\n")
    )
}

#[test]
fn news_entries_are_marked_and_cleaned() {
    common::init_tracing();

    let long = "长".repeat(400);
    let long_item = format!(
        "<item><title>长文</title><link>https://news.example.com/long</link>\
         <description>{}</description><pubDate>Mon, 01 Jan 2024 08:00:00 GMT</pubDate></item>",
        long
    );
    let content = rss_feed(&[
        "<item><title>GPT-5 Released</title><link>https://news.example.com/gpt5</link>\
         <description>&lt;p&gt;OpenAI &lt;b&gt;announced&lt;/b&gt; it.&lt;/p&gt;</description>\
         <pubDate>Tue, 02 Jan 2024 10:00:00 GMT</pubDate></item>",
        "<item><title>大模型周报</title><link>https://news.example.com/weekly</link>\
         <description>plain text</description></item>",
        &long_item,
    ]);

    let feed = NewsFeed::new("量子位", "https://news.example.com/feed");
    let config = NewsConfig::default();
    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let parsed = parse_articles(&content, &feed, &config, today).expect("feed parses");

    assert_eq!(parsed.records.len(), 3);

    let gpt = &parsed.records[0];
    assert_eq!(gpt.title, "[EN] GPT-5 Released");
    assert_eq!(gpt.summary, "OpenAI announced it.");
    assert_eq!(gpt.published, "2024-01-02");
    assert_eq!(gpt.source, "量子位");
    assert_eq!(gpt.category, "AI News");
    assert_eq!(gpt.link, "https://news.example.com/gpt5");

    let weekly = &parsed.records[1];
    assert_eq!(weekly.title, "大模型周报");
    assert_eq!(weekly.published, "2024-03-15");

    assert_eq!(parsed.records[2].summary.chars().count(), 300);
}

#[test]
fn news_respects_per_feed_limit() {
    let items: Vec<String> = (0..8)
        .map(|i| format!("<item><title>Item {}</title><link>https://news.example.com/{}</link></item>", i, i))
        .collect();
    let refs: Vec<&str> = items.iter().map(String::as_str).collect();

    let feed = NewsFeed::new("OpenAI Blog", "https://news.example.com/feed");
    let config = NewsConfig::default();
    let parsed = parse_articles(&rss_feed(&refs), &feed, &config, Utc::now().date_naive()).unwrap();

    assert_eq!(parsed.records.len(), 5);
    assert_eq!(parsed.records[4].title, "[EN] Item 4");
}

fn article(title: &str, published: &str) -> Article {
    Article {
        title: title.to_string(),
        source: "feed".to_string(),
        published: published.to_string(),
        summary: String::new(),
        link: String::new(),
        category: "AI News".to_string(),
    }
}

#[test]
fn articles_are_sorted_newest_first_and_capped_globally() {
    let mut articles = Vec::new();
    for day in 1..=15 {
        articles.push(article(&format!("a{}", day), &format!("2024-01-{:02}", day)));
        articles.push(article(&format!("b{}", day), &format!("2024-01-{:02}", day)));
    }

    let latest = latest_articles(articles, 20);
    assert_eq!(latest.len(), 20);
    assert_eq!(latest[0].published, "2024-01-15");
    // Same-day articles keep their feed order.
    assert_eq!(latest[0].title, "a15");
    assert_eq!(latest[1].title, "b15");
    assert_eq!(latest[19].published, "2024-01-06");
    assert!(latest.windows(2).all(|w| w[0].published >= w[1].published));
}
