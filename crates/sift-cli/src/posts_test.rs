use std::fs;

use serde_json::json;
use sift_core::RejectionReason;

use super::*;
use crate::output::slug;
use crate::output::tests::scratch_dir;

const PROFILE_PAGE: &str = r#"<html><body>
<script id="__UNIVERSAL_DATA_FOR_REHYDRATION__" type="application/json">
{"__DEFAULT_SCOPE__": {"webapp.user-detail": {"userInfo": {"itemList": [
  {
    "id": "7300000000000000001",
    "desc": "5 desk upgrades under $50? Swipe to see them all #desksetup",
    "author": {"uniqueId": "deskgoals"},
    "imagePost": {"images": [
      {"imageURL": {"urlList": ["https://p16.example/obj/one.jpeg"]}},
      {"imageURL": {"urlList": ["https://p16.example/obj/two.jpeg"]}}
    ]}
  },
  {
    "id": "7300000000000000002",
    "desc": "Cable management done right",
    "author": {"uniqueId": "deskgoals"},
    "video": {"playAddr": "https://v16.example/clip.mp4"}
  }
]}}}}
</script>
</body></html>"#;

fn slideshow_record(id: &str, desc: &str) -> Value {
    json!({
        "id": id,
        "desc": desc,
        "author": {"uniqueId": "lampnerd"},
        "imagePost": {"images": [
            {"imageURL": {"urlList": [format!("https://p16.example/{id}/a.jpeg")]}},
            {"imageURL": {"urlList": [format!("https://p16.example/{id}/b.jpeg")]}}
        ]}
    })
}

fn source(dir: &Path, name: &str, body: &str) -> NamedSource {
    let path = dir.join(format!("{}.capture", slug(name)));
    fs::write(&path, body).unwrap();
    NamedSource {
        name: name.to_string(),
        path,
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn html_page_is_a_single_pass() {
    let passes = load_passes(PROFILE_PAGE).expect("payload present");
    assert_eq!(passes.len(), 1);
    let FeedLine::Pass(records) = &passes[0] else {
        panic!("expected a pass");
    };
    assert_eq!(records.len(), 2);
}

#[test]
fn html_page_without_payload_has_no_passes() {
    assert!(load_passes("<html><body>nothing here</body></html>").is_none());
}

#[test]
fn single_record_document_is_taken_as_a_record() {
    let body = slideshow_record("1", "Three lamps I love! more").to_string();
    let passes = load_passes(&body).unwrap();
    let FeedLine::Pass(records) = &passes[0] else {
        panic!("expected a pass");
    };
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], "1");
}

#[test]
fn json_lines_become_one_pass_each() {
    let body = format!(
        "{}\noops\n\n{}\n",
        slideshow_record("1", "Three lamps I love! more"),
        json!([slideshow_record("2", "Why this lamp? Because")]),
    );
    let passes = load_passes(&body).unwrap();
    assert_eq!(passes.len(), 3);
    assert!(matches!(passes[1], FeedLine::Malformed));
    let FeedLine::Pass(records) = &passes[2] else {
        panic!("expected a pass");
    };
    assert_eq!(records.len(), 1);
}

#[test]
fn replay_counts_duplicates_and_malformed_lines() {
    let record = slideshow_record("1", "Three lamps I love! more");
    let body = format!("{record}\noops\n{record}\n");
    let passes = load_passes(&body).unwrap();

    let run = replay_passes("lampnerd", passes, &PipelineConfig::default());
    assert_eq!(run.posts.len(), 1);
    assert_eq!(run.passes, 3);
    assert_eq!(run.ledger.rejected_for(RejectionReason::Duplicate), 1);
    assert_eq!(run.ledger.rejected_for(RejectionReason::MalformedInput), 1);
    assert_eq!(run.posts[0].post.hook, "Three lamps I love!");
}

#[test]
fn collect_profile_writes_slideshows_hooks_and_dataset() {
    let dir = scratch_dir("profile");
    let capture = source(&dir, "Desk Goals", PROFILE_PAGE);
    let out = dir.join("findings");

    let outcome = collect_profile(&capture, &PipelineConfig::default(), &out).unwrap();
    assert_eq!(outcome.dir, out.join("desk_goals"));
    assert_eq!(outcome.run.posts.len(), 1);
    assert_eq!(
        outcome.run.ledger.rejected_for(RejectionReason::NotMultiImage),
        1
    );

    let hooks = fs::read_to_string(outcome.dir.join("hooks.txt")).unwrap();
    assert_eq!(hooks, "5 desk upgrades under $50?\n");

    let slideshows = read_json(&outcome.dir.join("slideshows.json"));
    assert_eq!(slideshows["total"], 1);
    assert_eq!(slideshows["posts"][0]["id"], "7300000000000000001");
    assert!(slideshows["run_id"].is_string());

    let dataset = read_json(&outcome.dir.join("training_dataset.json"));
    assert_eq!(dataset["metadata"]["total_hooks"], 1);
    assert_eq!(dataset["hooks"][0]["primary_category"], "question");
    assert_eq!(dataset["hooks"][0]["is_slideshow"], true);
    assert_eq!(dataset["hooks"][0]["author"], "deskgoals");
    assert!(dataset["statistics"].is_object());
    assert_eq!(dataset["metadata"]["run_id"], slideshows["run_id"]);
    fs::remove_dir_all(dir).ok();
}

#[test]
fn collect_profile_keeps_single_posts_when_asked() {
    let dir = scratch_dir("profile-all");
    let capture = source(&dir, "deskgoals", PROFILE_PAGE);
    let config = PipelineConfig {
        slideshows_only: false,
        ..PipelineConfig::default()
    };

    let outcome = collect_profile(&capture, &config, &dir.join("findings")).unwrap();
    assert_eq!(outcome.run.posts.len(), 2);
    let hooks = fs::read_to_string(outcome.dir.join("hooks.txt")).unwrap();
    assert_eq!(hooks.lines().count(), 2);
    fs::remove_dir_all(dir).ok();
}

#[test]
fn collect_profile_fails_on_page_without_payload() {
    let dir = scratch_dir("profile-empty");
    let capture = source(&dir, "deskgoals", "<html></html>");
    let err = collect_profile(&capture, &PipelineConfig::default(), &dir).unwrap_err();
    assert!(err.to_string().contains("no post data found"));
    fs::remove_dir_all(dir).ok();
}
