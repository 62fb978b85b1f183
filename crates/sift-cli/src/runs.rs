//! Shared orchestration for parallel category and profile runs.
//!
//! Each named source is replayed on the blocking pool under a semaphore
//! sized by `SIFT_MAX_CONCURRENT_RUNS`. A failing run is logged and skipped
//! so one bad capture does not abort the others.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::output::slug;

/// A `NAME=PATH` pair from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NamedSource {
    pub name: String,
    pub path: PathBuf,
}

/// Parse `NAME=PATH`, splitting on the first `=`.
pub(crate) fn parse_named_source(raw: &str) -> Result<NamedSource, String> {
    let (name, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{raw}'"))?;
    let name = name.trim();
    let path = path.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{raw}'"));
    }
    if path.is_empty() {
        return Err(format!("missing path in '{raw}'"));
    }
    Ok(NamedSource {
        name: name.to_string(),
        path: PathBuf::from(path),
    })
}

/// Fail when two sources would write into the same output folder.
pub(crate) fn ensure_unique_slugs(sources: &[NamedSource]) -> anyhow::Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for source in sources {
        if let Some(previous) = seen.insert(slug(&source.name), &source.name) {
            anyhow::bail!(
                "'{previous}' and '{}' map to the same output folder '{}'",
                source.name,
                slug(&source.name)
            );
        }
    }
    Ok(())
}

/// Run `job` for every source on the blocking pool, at most `limit` at a
/// time. Outcomes come back in input order.
pub(crate) async fn run_all<T, F>(
    sources: Vec<NamedSource>,
    limit: usize,
    job: F,
) -> Vec<(String, anyhow::Result<T>)>
where
    T: Send + 'static,
    F: Fn(NamedSource) -> anyhow::Result<T> + Send + Sync + 'static,
{
    let permits = Arc::new(Semaphore::new(limit.max(1)));
    let job = Arc::new(job);
    let mut set = JoinSet::new();

    for (index, source) in sources.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        let job = Arc::clone(&job);
        set.spawn(async move {
            let name = source.name.clone();
            let result = match permits.acquire_owned().await {
                Ok(_permit) => match tokio::task::spawn_blocking(move || (*job)(source)).await {
                    Ok(result) => result,
                    Err(e) => Err(anyhow::anyhow!("run task failed: {e}")),
                },
                Err(e) => Err(e.into()),
            };
            (index, name, result)
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => tracing::error!(error = %e, "run task aborted"),
        }
    }
    outcomes.sort_by_key(|(index, _, _)| *index);
    outcomes
        .into_iter()
        .map(|(_, name, result)| (name, result))
        .collect()
}

/// Log failed runs and keep the successful ones.
///
/// # Errors
///
/// Returns an error only when there was at least one run and every run failed.
pub(crate) fn keep_successes<T>(
    kind: &str,
    outcomes: Vec<(String, anyhow::Result<T>)>,
) -> anyhow::Result<Vec<T>> {
    let total = outcomes.len();
    let mut successes = Vec::with_capacity(total);
    for (name, result) in outcomes {
        match result {
            Ok(value) => successes.push(value),
            Err(e) => {
                tracing::error!(run = %name, error = %e, "{kind} run failed");
                eprintln!("error: {kind} run '{name}' failed: {e:#}");
            }
        }
    }
    if total > 0 && successes.is_empty() {
        anyhow::bail!("all {total} {kind} runs failed");
    }
    Ok(successes)
}

/// One line of a JSON-lines capture: a pass worth of entries, or a line that
/// could not be decoded.
#[derive(Debug)]
pub(crate) enum FeedLine<T> {
    Pass(Vec<T>),
    Malformed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> NamedSource {
        NamedSource {
            name: name.to_string(),
            path: PathBuf::from(format!("{name}.jsonl")),
        }
    }

    #[test]
    fn parse_named_source_splits_on_first_equals() {
        let parsed = parse_named_source("desk setup=feeds/a=b.jsonl").unwrap();
        assert_eq!(parsed.name, "desk setup");
        assert_eq!(parsed.path, PathBuf::from("feeds/a=b.jsonl"));
    }

    #[test]
    fn parse_named_source_rejects_missing_parts() {
        assert!(parse_named_source("no-separator").is_err());
        assert!(parse_named_source("=feeds/a.jsonl").is_err());
        assert!(parse_named_source("desk= ").is_err());
    }

    #[test]
    fn unique_slugs_detects_collisions() {
        assert!(ensure_unique_slugs(&[source("desk setup"), source("plants")]).is_ok());
        let err = ensure_unique_slugs(&[source("Desk Setup"), source("desk setup")]).unwrap_err();
        assert!(err.to_string().contains("desk_setup"));
    }

    #[test]
    fn keep_successes_fails_only_when_everything_failed() {
        let mixed = vec![
            ("a".to_string(), Ok(1)),
            ("b".to_string(), Err(anyhow::anyhow!("boom"))),
        ];
        assert_eq!(keep_successes("image", mixed).unwrap(), vec![1]);

        let failed: Vec<(String, anyhow::Result<i32>)> =
            vec![("a".to_string(), Err(anyhow::anyhow!("boom")))];
        assert!(keep_successes("image", failed).is_err());

        let empty: Vec<(String, anyhow::Result<i32>)> = Vec::new();
        assert!(keep_successes("image", empty).unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_all_preserves_input_order() {
        let sources = vec![source("c"), source("a"), source("b")];
        let outcomes = run_all(sources, 2, |s| Ok(s.name.to_uppercase())).await;
        let names: Vec<&str> = outcomes.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
        let values: Vec<String> = outcomes.into_iter().map(|(_, r)| r.unwrap()).collect();
        assert_eq!(values, ["C", "A", "B"]);
    }

    #[tokio::test]
    async fn run_all_reports_panics_as_errors() {
        let outcomes = run_all(vec![source("boom"), source("fine")], 0, |s| {
            if s.name == "boom" {
                panic!("exploded");
            }
            Ok(())
        })
        .await;
        assert!(outcomes[0].1.is_err());
        assert!(outcomes[1].1.is_ok());
    }
}
