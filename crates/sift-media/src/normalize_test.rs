use super::*;

fn rules() -> UrlRules {
    UrlRules::default()
}

// -----------------------------------------------------------------------
// rewriting
// -----------------------------------------------------------------------

#[test]
fn thumbnail_bucket_is_rewritten_to_originals() {
    let got = normalize_media_url("https://i.pinimg.com/236x/8a/06/c7/x.jpg", &rules()).unwrap();
    assert_eq!(got, "https://i.pinimg.com/originals/8a/06/c7/x.jpg");
}

#[test]
fn every_default_thumbnail_bucket_is_rewritten() {
    for bucket in ["170x", "236x", "474x", "564x", "736x", "1200x"] {
        let raw = format!("https://i.pinimg.com/{bucket}/8a/06/c7/8a06c7cb1f199a52.jpg");
        let got = normalize_media_url(&raw, &rules()).unwrap();
        assert_eq!(
            got, "https://i.pinimg.com/originals/8a/06/c7/8a06c7cb1f199a52.jpg",
            "bucket {bucket}"
        );
    }
}

#[test]
fn originals_url_is_returned_unchanged() {
    let raw = "https://i.pinimg.com/originals/8a/06/c7/8a06c7cb1f199a52d7dca09f74e46bea.jpg";
    assert_eq!(normalize_media_url(raw, &rules()).unwrap(), raw);
}

#[test]
fn normalize_is_idempotent() {
    let once = normalize_media_url("https://i.pinimg.com/736x/ab/cd/ef/pin.png", &rules()).unwrap();
    let twice = normalize_media_url(&once, &rules()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let got = normalize_media_url("  https://i.pinimg.com/474x/aa/bb/cc/y.webp\n", &rules()).unwrap();
    assert_eq!(got, "https://i.pinimg.com/originals/aa/bb/cc/y.webp");
}

#[test]
fn query_string_is_preserved() {
    let got = normalize_media_url("https://i.pinimg.com/564x/aa/bb/cc/y.jpg?v=2", &rules()).unwrap();
    assert_eq!(got, "https://i.pinimg.com/originals/aa/bb/cc/y.jpg?v=2");
}

// -----------------------------------------------------------------------
// rejections
// -----------------------------------------------------------------------

#[test]
fn video_thumbnail_under_originals_is_rejected() {
    let raw = "https://i.pinimg.com/videos/thumbnails/originals/8a/06/c7/8a06c7cb1f199a52d7dca09f74e46bea.0000000.jpg";
    assert_eq!(
        normalize_media_url(raw, &rules()),
        Err(UrlRejection::VideoPlaceholder)
    );
}

#[test]
fn frame_marker_alone_marks_a_video_placeholder() {
    let raw = "https://i.pinimg.com/originals/8a/06/c7/clip.0000001.jpg";
    assert_eq!(
        normalize_media_url(raw, &rules()),
        Err(UrlRejection::VideoPlaceholder)
    );
}

#[test]
fn tiny_buckets_are_rejected_with_or_without_rs_suffix() {
    for bucket in ["30x30", "60x60", "75x75_RS", "140x140_rs"] {
        let raw = format!("https://i.pinimg.com/{bucket}/aa/bb/cc/avatar.jpg");
        assert_eq!(
            normalize_media_url(&raw, &rules()),
            Err(UrlRejection::TinyImage),
            "bucket {bucket}"
        );
    }
}

#[test]
fn unknown_bucket_is_not_guessed() {
    assert_eq!(
        normalize_media_url("https://i.pinimg.com/999x/aa/bb/cc/x.jpg", &rules()),
        Err(UrlRejection::Unrecognized)
    );
}

#[test]
fn thumbnail_without_hash_path_is_unrecognized() {
    assert_eq!(
        normalize_media_url("https://i.pinimg.com/236x/user/profile/x.jpg", &rules()),
        Err(UrlRejection::Unrecognized)
    );
}

#[test]
fn non_http_input_is_unrecognized() {
    for raw in ["", "data:image/png;base64,AAAA", "ftp://host/236x/aa/bb/cc/x.jpg", "not a url"] {
        assert_eq!(
            normalize_media_url(raw, &rules()),
            Err(UrlRejection::Unrecognized),
            "input {raw:?}"
        );
    }
}

#[test]
fn custom_rules_change_the_bucket_set() {
    let rules = UrlRules {
        thumbnail_buckets: vec!["200x".to_string()],
        tiny_size_markers: Vec::new(),
    };
    assert_eq!(
        normalize_media_url("https://i.pinimg.com/200x/aa/bb/cc/x.jpg", &rules).unwrap(),
        "https://i.pinimg.com/originals/aa/bb/cc/x.jpg"
    );
    assert_eq!(
        normalize_media_url("https://i.pinimg.com/236x/aa/bb/cc/x.jpg", &rules),
        Err(UrlRejection::Unrecognized)
    );
    assert_eq!(
        normalize_media_url("https://i.pinimg.com/75x75_RS/aa/bb/cc/x.jpg", &rules),
        Err(UrlRejection::Unrecognized)
    );
}

#[test]
fn rejection_maps_to_ledger_reason() {
    assert_eq!(
        UrlRejection::VideoPlaceholder.reason(),
        RejectionReason::VideoPlaceholder
    );
    assert_eq!(UrlRejection::TinyImage.reason(), RejectionReason::TinyImage);
    assert_eq!(
        UrlRejection::Unrecognized.reason(),
        RejectionReason::UnrecognizedUrl
    );
}
