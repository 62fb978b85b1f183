use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["sift"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(cli.out.is_none());
}

#[test]
fn parses_images_with_repeated_feeds() {
    let cli = Cli::try_parse_from([
        "sift",
        "images",
        "--feed",
        "desk setup=feeds/desk.jsonl",
        "--feed",
        "plants=feeds/plants.jsonl",
    ])
    .expect("expected valid cli args");

    let Some(Commands::Images { feeds, target }) = cli.command else {
        panic!("unexpected command variant");
    };
    assert!(target.is_none());
    assert_eq!(feeds.len(), 2);
    assert_eq!(feeds[0].name, "desk setup");
    assert_eq!(feeds[0].path, PathBuf::from("feeds/desk.jsonl"));
    assert_eq!(feeds[1].name, "plants");
}

#[test]
fn parses_images_target_and_global_out() {
    let cli = Cli::try_parse_from([
        "sift",
        "images",
        "--feed",
        "plants=p.jsonl",
        "--target",
        "25",
        "--out",
        "/tmp/findings",
    ])
    .unwrap();
    assert_eq!(cli.out, Some(PathBuf::from("/tmp/findings")));
    assert!(matches!(
        cli.command,
        Some(Commands::Images {
            target: Some(25),
            ..
        })
    ));
}

#[test]
fn images_requires_a_feed() {
    assert!(Cli::try_parse_from(["sift", "images"]).is_err());
}

#[test]
fn images_rejects_feed_without_path() {
    assert!(Cli::try_parse_from(["sift", "images", "--feed", "plants"]).is_err());
}

#[test]
fn parses_posts_defaults() {
    let cli = Cli::try_parse_from(["sift", "posts", "--profile", "deskgoals=captures/desk.html"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Posts {
            target: None,
            include_single: false,
            ..
        })
    ));
}

#[test]
fn parses_posts_include_single() {
    let cli = Cli::try_parse_from([
        "sift",
        "posts",
        "--profile",
        "deskgoals=captures/desk.html",
        "--include-single",
    ])
    .unwrap();
    if let Some(Commands::Posts {
        ref profiles,
        include_single,
        ..
    }) = cli.command
    {
        assert!(include_single);
        assert_eq!(profiles[0].name, "deskgoals");
    } else {
        panic!("unexpected command variant");
    }
}

#[test]
fn parses_hook_with_max_length() {
    let cli = Cli::try_parse_from(["sift", "hook", "Why does this work?", "--max-length", "30"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Hook {
            ref text,
            max_length: Some(30),
        }) if text == "Why does this work?"
    ));
}

#[test]
fn parses_classify_dimensions() {
    let cli = Cli::try_parse_from(["sift", "classify", "1080", "1920"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Classify {
            width: 1080,
            height: 1920
        })
    ));
}

#[test]
fn classify_rejects_non_numeric_dimensions() {
    assert!(Cli::try_parse_from(["sift", "classify", "wide", "1920"]).is_err());
}

#[test]
fn parses_normalize_url() {
    let cli = Cli::try_parse_from([
        "sift",
        "normalize",
        "https://i.pinimg.com/236x/8a/06/c7/x.jpg",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Normalize { ref url }) if url.ends_with("x.jpg")
    ));
}
