//! Scripted terminal sessions against a small corpus.

use std::fs;
use std::path::{Path, PathBuf};
use tagman::config::DatasetConfig;
use tagman::session::{CuratorSession, SessionOptions, SessionOutcome, TerminalPrompt};
use tagman::{Dataset, FixedDecision, OnboardingDecision};
use tempfile::TempDir;

fn corpus() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    for (image, caption) in [(&a, "t, blue hair"), (&b, "t, red eyes")] {
        fs::write(image, b"png").unwrap();
        fs::write(image.with_extension("txt"), caption).unwrap();
    }
    (dir, a, b)
}

fn open(root: &Path) -> Dataset {
    Dataset::open(
        root,
        &DatasetConfig::default(),
        &mut FixedDecision(OnboardingDecision::Decline),
    )
    .unwrap()
}

fn run(dataset: &mut Dataset, script: &str) -> (SessionOutcome, String) {
    let mut output = Vec::new();
    let options = SessionOptions { suggestion_limit: 3, clear_screen: false };
    let outcome = CuratorSession::new(dataset, script.as_bytes(), &mut output, options)
        .run()
        .unwrap();
    (outcome, String::from_utf8_lossy(&output).to_string())
}

fn read_caption(image: &Path) -> String {
    fs::read_to_string(image.with_extension("txt")).unwrap()
}

#[test]
fn edits_are_saved_on_exit() {
    let (dir, a, b) = corpus();
    let mut dataset = open(dir.path());

    let (outcome, output) = run(&mut dataset, "Smile,\nn\n-red eyes\nexit\n");
    assert_eq!(outcome, SessionOutcome::Saved(2));
    assert!(output.contains("[1/2] a.png"));
    assert!(output.contains("[2/2] b.png"));
    assert!(output.contains("Added 'smile' to 1 caption(s)."));
    assert_eq!(read_caption(&a), "t, blue hair, smile, ");
    assert_eq!(read_caption(&b), "t, ");
}

#[test]
fn abort_leaves_files_untouched() {
    let (dir, a, b) = corpus();
    let mut dataset = open(dir.path());

    let (outcome, output) = run(&mut dataset, "mode apply_all\nsmile\nabort\n");
    assert_eq!(outcome, SessionOutcome::Aborted);
    assert!(output.contains("Mode: apply_all"));
    assert_eq!(dataset.tag_trie().count("smile"), 2);
    assert_eq!(read_caption(&a), "t, blue hair");
    assert_eq!(read_caption(&b), "t, red eyes");
}

#[test]
fn end_of_input_aborts() {
    let (dir, a, _) = corpus();
    let mut dataset = open(dir.path());
    let (outcome, _) = run(&mut dataset, "smile\n");
    assert_eq!(outcome, SessionOutcome::Aborted);
    assert_eq!(read_caption(&a), "t, blue hair");
}

#[test]
fn unknown_mode_is_reported() {
    let (dir, _, _) = corpus();
    let mut dataset = open(dir.path());
    let (outcome, output) = run(&mut dataset, "mode sideways\nabort\n");
    assert_eq!(outcome, SessionOutcome::Aborted);
    assert!(output.contains("error: Unknown tag mode 'sideways'"));
    assert!(output.contains("Mode: apply"));
}

#[test]
fn suggestions_can_be_selected() {
    let (dir, a, _) = corpus();
    let mut dataset = open(dir.path());

    let (_, output) = run(&mut dataset, "?re\n:1\nw\nabort\n");
    assert!(output.contains(":1: red eyes"));
    assert_eq!(read_caption(&a), "t, blue hair, red eyes, ");
    assert_eq!(dataset.tag_trie().count("red eyes"), 2);
}

#[test]
fn negated_suggestions_offer_present_tags() {
    let (dir, a, _) = corpus();
    let mut dataset = open(dir.path());

    let (_, output) = run(&mut dataset, "?-b\n:1\nexit\n");
    assert!(output.contains(":1: blue hair"));
    assert_eq!(read_caption(&a), "t, ");
    assert!(!dataset.tag_trie().exists("blue hair"));
}

#[test]
fn trigger_word_cannot_be_edited() {
    let (dir, _, _) = corpus();
    let mut dataset = open(dir.path());

    let (_, output) = run(&mut dataset, "-t\nabort\n");
    assert!(output.contains("'t' is the trigger word and cannot be changed."));
    assert_eq!(dataset.tag_trie().count("t"), 2);
}

#[test]
fn terminal_prompt_reasks_until_answered() {
    let (dir, _, _) = corpus();
    let c = dir.path().join("c.png");
    let d = dir.path().join("d.png");
    fs::write(&c, b"png").unwrap();
    fs::write(&d, b"png").unwrap();

    let mut input = "maybe\ny\nn\n".as_bytes();
    let mut output = Vec::new();
    let mut prompt = TerminalPrompt::new(&mut input, &mut output);
    let dataset = Dataset::open(dir.path(), &DatasetConfig::default(), &mut prompt).unwrap();

    let output = String::from_utf8_lossy(&output).to_string();
    assert!(output.contains("Please answer y, n, Y or N (got 'maybe')."));
    assert!(output.contains("(1 more queued)"));
    assert_eq!(dataset.len(), 3);
    assert!(d.with_extension("txt").is_file());
    assert!(!c.with_extension("txt").exists());
}

#[test]
fn terminal_prompt_declines_rest_on_closed_input() {
    let (dir, _, _) = corpus();
    fs::write(dir.path().join("c.png"), b"png").unwrap();

    let mut input = "".as_bytes();
    let mut output = Vec::new();
    let mut prompt = TerminalPrompt::new(&mut input, &mut output);
    let dataset = Dataset::open(dir.path(), &DatasetConfig::default(), &mut prompt).unwrap();
    assert_eq!(dataset.len(), 2);
}
