//! Single-value diagnostics: `sift hook`, `sift classify`, `sift normalize`.

use serde::Serialize;
use sift_core::{
    HookAnalysis, HookClassification, HookComponents, PipelineConfig, QualityAssessment,
};
use sift_media::{normalize_media_url, QualityClassifier, UrlRules};
use sift_posts::{analyze_hook, classify_hook, extract_hook, hook_components};

#[derive(Debug, Serialize)]
pub(crate) struct HookReport {
    pub hook: String,
    pub classification: HookClassification,
    pub analysis: HookAnalysis,
    pub components: HookComponents,
}

#[derive(Debug, Serialize)]
pub(crate) struct NormalizeReport<'a> {
    pub input: &'a str,
    pub canonical_url: Option<String>,
    pub rejected: Option<String>,
}

pub(crate) fn hook_report(text: &str, max_length: usize) -> HookReport {
    let hook = extract_hook(text, max_length);
    HookReport {
        classification: classify_hook(&hook),
        analysis: analyze_hook(&hook),
        components: hook_components(&hook),
        hook,
    }
}

pub(crate) fn normalize_report<'a>(config: &PipelineConfig, url: &'a str) -> NormalizeReport<'a> {
    match normalize_media_url(url, &UrlRules::from_config(config)) {
        Ok(canonical) => NormalizeReport {
            input: url,
            canonical_url: Some(canonical),
            rejected: None,
        },
        Err(rejection) => NormalizeReport {
            input: url,
            canonical_url: None,
            rejected: Some(rejection.reason().to_string()),
        },
    }
}

pub(crate) fn classification(config: &PipelineConfig, width: u32, height: u32) -> QualityAssessment {
    QualityClassifier::from_config(config).classify(width, height)
}

pub(crate) fn print_hook(text: &str, max_length: usize) -> anyhow::Result<()> {
    print_json(&hook_report(text, max_length))
}

pub(crate) fn print_classification(
    config: &PipelineConfig,
    width: u32,
    height: u32,
) -> anyhow::Result<()> {
    print_json(&classification(config, width, height))
}

pub(crate) fn print_normalized(config: &PipelineConfig, url: &str) -> anyhow::Result<()> {
    print_json(&normalize_report(config, url))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
