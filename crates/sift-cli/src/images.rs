//! `sift images`: replay captured discovery feeds through one image
//! pipeline per category.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use sift_collect::{aggregate_images, AcceptanceLedger, ImagePipeline, ImageReport, ImageRun};
use sift_core::{CandidateMedia, ImageItem, PipelineConfig, SiftConfig};

use crate::output::{run_dir, search_url, write_json, write_lines, RunStamp};
use crate::runs::{ensure_unique_slugs, keep_successes, run_all, FeedLine, NamedSource};

#[derive(Debug, Serialize)]
struct ImageDataFile<'a> {
    category: &'a str,
    search_url: &'a str,
    #[serde(flatten)]
    stamp: RunStamp,
    total: usize,
    images: &'a [ImageItem],
}

#[derive(Debug, Serialize)]
struct ImageReportFile<'a> {
    category: &'a str,
    search_url: &'a str,
    #[serde(flatten)]
    stamp: RunStamp,
    source: String,
    passes: usize,
    satisfied: bool,
    ledger: &'a AcceptanceLedger,
    #[serde(flatten)]
    report: &'a ImageReport,
}

/// What one finished category run produced.
#[derive(Debug)]
pub(crate) struct CategoryOutcome {
    pub run: ImageRun,
    pub report: ImageReport,
    pub dir: PathBuf,
}

/// Replay every feed in parallel and write per-category findings.
///
/// # Errors
///
/// Returns an error when two categories share an output folder or when every
/// category run failed.
pub(crate) async fn run_images(config: &SiftConfig, feeds: Vec<NamedSource>) -> anyhow::Result<()> {
    ensure_unique_slugs(&feeds)?;

    let pipeline = config.pipeline.clone();
    let out = config.app.output_dir.clone();
    let outcomes = run_all(feeds, config.app.max_concurrent_runs, move |feed| {
        collect_category(&feed, &pipeline, &out)
    })
    .await;

    for outcome in keep_successes("image", outcomes)? {
        print_summary(&outcome);
    }
    Ok(())
}

/// Replay one feed and write `image_data.json`, `image_urls.txt` and
/// `report.json` under `<out>/<slug>/`.
pub(crate) fn collect_category(
    feed: &NamedSource,
    config: &PipelineConfig,
    out: &Path,
) -> anyhow::Result<CategoryOutcome> {
    let stamp = RunStamp::new();
    tracing::info!(category = %feed.name, path = %feed.path.display(), run_id = %stamp.run_id, "starting image run");

    let run = replay_feed(&feed.name, &feed.path, config)?;
    let report = aggregate_images(&run.items);
    let search = search_url(&run.category);
    let dir = run_dir(out, &run.category)?;

    write_json(
        &dir.join("image_data.json"),
        &ImageDataFile {
            category: &run.category,
            search_url: &search,
            stamp,
            total: run.items.len(),
            images: &run.items,
        },
    )?;
    write_lines(
        &dir.join("image_urls.txt"),
        run.items.iter().map(|item| item.image.canonical_url.as_str()),
    )?;
    write_json(
        &dir.join("report.json"),
        &ImageReportFile {
            category: &run.category,
            search_url: &search,
            stamp,
            source: feed.path.display().to_string(),
            passes: run.passes,
            satisfied: run.satisfied,
            ledger: &run.ledger,
            report: &report,
        },
    )?;

    Ok(CategoryOutcome { run, report, dir })
}

/// Feed each line of a JSON-lines capture to the pipeline as one pass,
/// stopping once it is satisfied or stalls.
pub(crate) fn replay_feed(
    category: &str,
    path: &Path,
    config: &PipelineConfig,
) -> anyhow::Result<ImageRun> {
    let file =
        File::open(path).with_context(|| format!("failed to open feed {}", path.display()))?;
    let mut pipeline = ImagePipeline::new(category, config);

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_feed_line(&line, index + 1) {
            FeedLine::Pass(entries) => {
                for entry in entries {
                    match entry {
                        Some(candidate) => {
                            pipeline.submit(candidate);
                        }
                        None => pipeline.record_malformed(),
                    }
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

    Ok(pipeline.finish())
}

/// Decode one feed line. Entries are candidate objects or bare URL strings;
/// entries that decode to neither come back as `None`.
fn parse_feed_line(line: &str, line_number: usize) -> FeedLine<Option<CandidateMedia>> {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(line = line_number, error = %e, "skipping undecodable feed line");
            return FeedLine::Malformed;
        }
    };

    let Value::Array(entries) = value else {
        tracing::debug!(line = line_number, "feed line is not a JSON array");
        return FeedLine::Malformed;
    };

    let candidates = entries
        .into_iter()
        .map(|entry| match entry {
            Value::String(url) => Some(CandidateMedia::new(url)),
            other => match serde_json::from_value::<CandidateMedia>(other) {
                Ok(candidate) => Some(candidate),
                Err(e) => {
                    tracing::debug!(line = line_number, error = %e, "skipping malformed candidate");
                    None
                }
            },
        })
        .collect();
    FeedLine::Pass(candidates)
}

fn print_summary(outcome: &CategoryOutcome) {
    let run = &outcome.run;
    let tiers = outcome
        .report
        .summary
        .per_tier
        .iter()
        .map(|(tier, count)| format!("{tier}={count}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{}: {} images ({}; unrated={}), {} rejected over {} passes{} -> {}",
        run.category,
        run.items.len(),
        if tiers.is_empty() { "no rated images" } else { tiers.as_str() },
        outcome.report.unrated.len(),
        run.ledger.total_rejected(),
        run.passes,
        if run.satisfied { ", target reached" } else { "" },
        outcome.dir.display(),
    );
}
