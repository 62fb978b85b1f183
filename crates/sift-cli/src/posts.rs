//! `sift posts`: pull slideshow posts and their hooks out of captured
//! profile pages, rehydration payloads or JSON-lines dumps.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use sift_collect::{
    aggregate_posts, AcceptanceLedger, HookPatterns, HookStatistics, PostPipeline, PostReport,
    PostRun, PostSummary,
};
use sift_core::{
    ClassifiedPost, HookAnalysis, HookCategory, HookComponents, PipelineConfig, PostRecord,
    PostStats, SiftConfig,
};
use sift_posts::{extract_feed_items, extract_rehydration_data};

use crate::output::{run_dir, write_json, write_lines, RunStamp};
use crate::runs::{ensure_unique_slugs, keep_successes, run_all, FeedLine, NamedSource};

#[derive(Debug, Serialize)]
struct SlideshowsFile<'a> {
    profile: &'a str,
    #[serde(flatten)]
    stamp: RunStamp,
    total: usize,
    posts: Vec<&'a PostRecord>,
}

#[derive(Debug, Serialize)]
struct DatasetMetadata<'a> {
    profile: &'a str,
    #[serde(flatten)]
    stamp: RunStamp,
    source: String,
    passes: usize,
    total_posts: usize,
    total_hooks: usize,
    categories: Vec<HookCategory>,
    ledger: &'a AcceptanceLedger,
}

/// One labelled hook in the training dataset.
#[derive(Debug, Serialize)]
struct DatasetEntry<'a> {
    hook: &'a str,
    categories: &'a BTreeMap<HookCategory, f64>,
    primary_category: HookCategory,
    quality_score: f64,
    quality_analysis: &'a HookAnalysis,
    components: &'a HookComponents,
    post_id: Option<&'a str>,
    author: Option<&'a str>,
    stats: PostStats,
    is_slideshow: bool,
}

#[derive(Debug, Serialize)]
struct TrainingDataset<'a> {
    metadata: DatasetMetadata<'a>,
    hooks: Vec<DatasetEntry<'a>>,
    patterns: &'a HookPatterns,
    statistics: Option<&'a HookStatistics>,
    summary: &'a PostSummary,
}

/// What one finished profile run produced.
#[derive(Debug)]
pub(crate) struct ProfileOutcome {
    pub run: PostRun,
    pub report: PostReport,
    pub dir: PathBuf,
}

/// Process every profile capture in parallel and write per-profile findings.
///
/// # Errors
///
/// Returns an error when two profiles share an output folder or when every
/// profile run failed.
pub(crate) async fn run_posts(
    config: &SiftConfig,
    profiles: Vec<NamedSource>,
) -> anyhow::Result<()> {
    ensure_unique_slugs(&profiles)?;

    let pipeline = config.pipeline.clone();
    let out = config.app.output_dir.clone();
    let outcomes = run_all(profiles, config.app.max_concurrent_runs, move |profile| {
        collect_profile(&profile, &pipeline, &out)
    })
    .await;

    for outcome in keep_successes("post", outcomes)? {
        print_summary(&outcome);
    }
    Ok(())
}

/// Replay one capture and write `slideshows.json`, `hooks.txt` and
/// `training_dataset.json` under `<out>/<slug>/`.
pub(crate) fn collect_profile(
    profile: &NamedSource,
    config: &PipelineConfig,
    out: &Path,
) -> anyhow::Result<ProfileOutcome> {
    let stamp = RunStamp::new();
    tracing::info!(profile = %profile.name, path = %profile.path.display(), run_id = %stamp.run_id, "starting post run");

    let content = std::fs::read_to_string(&profile.path)
        .with_context(|| format!("failed to read capture {}", profile.path.display()))?;
    let passes = load_passes(&content)
        .with_context(|| format!("no post data found in {}", profile.path.display()))?;

    let run = replay_passes(&profile.name, passes, config);
    let report = aggregate_posts(&run.posts);
    let dir = run_dir(out, &run.profile)?;

    write_json(
        &dir.join("slideshows.json"),
        &SlideshowsFile {
            profile: &run.profile,
            stamp,
            total: run.posts.len(),
            posts: run.posts.iter().map(|p| &p.post).collect(),
        },
    )?;
    write_lines(
        &dir.join("hooks.txt"),
        run.posts.iter().map(|p| p.post.hook.as_str()),
    )?;
    write_json(
        &dir.join("training_dataset.json"),
        &training_dataset(&run, &report, stamp, &profile.path),
    )?;

    Ok(ProfileOutcome { run, report, dir })
}

/// Split a capture into passes of raw post records.
///
/// An HTML page or a single JSON document is one pass. Otherwise each
/// non-blank line is decoded as its own pass. Returns `None` for a page
/// with no embedded payload.
pub(crate) fn load_passes(content: &str) -> Option<Vec<FeedLine<Value>>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('<') {
        let data = extract_rehydration_data(content)?;
        return Some(vec![FeedLine::Pass(records_in(data))]);
    }

    if let Ok(document) = serde_json::from_str::<Value>(trimmed) {
        return Some(vec![FeedLine::Pass(records_in(document))]);
    }

    let lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| match serde_json::from_str::<Value>(line) {
            Ok(value) => FeedLine::Pass(records_in(value)),
            Err(e) => {
                tracing::debug!(line = index + 1, error = %e, "skipping undecodable capture line");
                FeedLine::Malformed
            }
        })
        .collect();
    Some(lines)
}

/// Post records inside a decoded document; a lone object that matches no
/// feed shape is taken as a record itself.
fn records_in(document: Value) -> Vec<Value> {
    let items = extract_feed_items(&document);
    if items.is_empty() && document.is_object() {
        vec![document]
    } else {
        items
    }
}

pub(crate) fn replay_passes(
    profile: &str,
    passes: Vec<FeedLine<Value>>,
    config: &PipelineConfig,
) -> PostRun {
    let mut pipeline = PostPipeline::new(profile, config);

    for pass in passes {
        match pass {
            FeedLine::Pass(records) => {
                for record in &records {
                    pipeline.submit(record);
                    if pipeline.is_satisfied() {
                        break;
                    }
                }
            }
            FeedLine::Malformed => pipeline.record_malformed(),
        }

        let stalled = pipeline.end_pass();
        if stalled || pipeline.is_satisfied() {
            break;
        }
    }

    pipeline.finish()
}

fn training_dataset<'a>(
    run: &'a PostRun,
    report: &'a PostReport,
    stamp: RunStamp,
    source: &Path,
) -> TrainingDataset<'a> {
    let hooks: Vec<DatasetEntry<'a>> = run
        .posts
        .iter()
        .filter(|p| !p.post.hook.trim().is_empty())
        .map(dataset_entry)
        .collect();

    TrainingDataset {
        metadata: DatasetMetadata {
            profile: &run.profile,
            stamp,
            source: source.display().to_string(),
            passes: run.passes,
            total_posts: run.posts.len(),
            total_hooks: hooks.len(),
            categories: report.by_category.keys().copied().collect(),
            ledger: &run.ledger,
        },
        hooks,
        patterns: &report.patterns,
        statistics: report.hook_statistics.as_ref(),
        summary: &report.summary,
    }
}

fn dataset_entry(classified: &ClassifiedPost) -> DatasetEntry<'_> {
    let post = &classified.post;
    DatasetEntry {
        hook: &post.hook,
        categories: &classified.classification.category_weights,
        primary_category: classified.classification.primary_category,
        quality_score: classified.classification.quality_score,
        quality_analysis: &classified.analysis,
        components: &classified.components,
        post_id: post.id.as_deref(),
        author: post.author.username.as_deref(),
        stats: post.stats,
        is_slideshow: post.is_multi_image,
    }
}

fn print_summary(outcome: &ProfileOutcome) {
    let run = &outcome.run;
    let categories = outcome
        .report
        .summary
        .per_category
        .iter()
        .map(|(category, count)| format!("{category}={count}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{}: {} posts, {} hooks ({}), {} rejected over {} passes -> {}",
        run.profile,
        run.posts.len(),
        outcome.report.summary.hook_count,
        if categories.is_empty() { "none" } else { categories.as_str() },
        run.ledger.total_rejected(),
        run.passes,
        outcome.dir.display(),
    );
}

#[cfg(test)]
#[path = "posts_test.rs"]
mod tests;
