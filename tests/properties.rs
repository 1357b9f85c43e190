//! Behavior every tree must show, exercised through the public API only.

mod common;

use treefs::{FileSystem, FsError};

#[test]
fn root_identity() {
    common::init();
    let mut fs = FileSystem::new();
    assert_eq!(fs.cwd(), "/");
    for _ in 0..5 {
        fs.cd("..").unwrap();
        assert_eq!(fs.cwd(), "/");
    }
    assert_eq!(fs.lookup("..").unwrap(), *fs.root());
    assert_eq!(fs.lookup("/../.").unwrap(), *fs.root());
}

#[test]
fn failed_cd_leaves_cwd_alone() {
    common::init();
    let mut fs = FileSystem::new();
    fs.mkdir("/one", false).unwrap();
    fs.mkdir("/two", false).unwrap();
    fs.cd("/one").unwrap();

    assert_eq!(fs.cd("../three"), Err(FsError::not_found("../three")));
    assert_eq!(fs.cwd(), "/one");
    fs.cd("../two").unwrap();
    assert_eq!(fs.cwd(), "/two");
}

#[test]
fn touch_is_idempotent() {
    common::init();
    let fs = FileSystem::new();
    let first = fs.touch("x").unwrap();
    let second = fs.touch("x").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs.ls("").unwrap(), vec!["x"]);
}

#[test]
fn mkdir_is_exclusive() {
    common::init();
    let fs = FileSystem::new();
    fs.mkdir("x", false).unwrap();
    assert_eq!(fs.mkdir("x", false).unwrap_err(), FsError::exists("x"));
    assert_eq!(fs.mkdir("x", true).unwrap_err(), FsError::exists("x"));
}

#[test]
fn hard_links_alias_one_inode() {
    common::init();
    let fs = FileSystem::new();
    fs.touch("t").unwrap();
    fs.write_file("t", "A").unwrap();
    fs.ln("t", "d").unwrap();
    assert_eq!(fs.read_file("d").unwrap(), "A");
    assert_eq!(fs.lookup("d").unwrap().link_count(), 2);

    fs.write_file("d", "B").unwrap();
    assert_eq!(fs.read_file("t").unwrap(), "B");

    fs.rm("t", false).unwrap();
    assert_eq!(fs.read_file("d").unwrap(), "B");
    assert_eq!(fs.lookup("d").unwrap().link_count(), 1);
}

#[test]
fn removed_node_lives_on_in_handles() {
    common::init();
    let fs = FileSystem::new();
    let held = fs.write_file("f", "still here").unwrap();
    let removed = fs.rm("f", false).unwrap();
    assert_eq!(held, removed);
    assert_eq!(held.link_count(), 0);
    assert_eq!(held.len(), "still here".len());
    assert!(!fs.exists("f"));
}

#[test]
fn directories_need_recursive_removal() {
    common::init();
    let fs = FileSystem::new();
    fs.mkdir("dir/sub", true).unwrap();
    assert_eq!(fs.rm("dir", false).unwrap_err(), FsError::is_a_directory("dir"));
    assert!(fs.exists("dir/sub"));
    fs.rm("dir", true).unwrap();
    assert!(!fs.exists("dir"));
    assert!(fs.ls("").unwrap().is_empty());
}

#[test]
fn intermediates() {
    common::init();
    let mut fs = FileSystem::new();
    fs.mkdir("one/two", true).unwrap();
    assert_eq!(fs.ls("").unwrap(), vec!["one"]);
    fs.cd("one").unwrap();
    assert_eq!(fs.ls("").unwrap(), vec!["two"]);
}

#[test]
fn find_reports_in_discovery_order() {
    common::init();
    let fs = FileSystem::new();
    fs.mkdir("/a/b/c/d", true).unwrap();
    fs.touch("/a/b/c/d/e").unwrap();
    fs.mkdir("/a/b/e", false).unwrap();
    assert_eq!(fs.find("e", None).unwrap(), vec!["a/b/e", "a/b/c/d/e"]);
}

#[test]
fn deep_nesting() {
    common::init();
    let mut fs = FileSystem::new();
    for _ in 0..1000 {
        fs.mkdir("deep", false).unwrap();
        fs.cd("deep").unwrap();
    }
    assert_eq!(fs.cwd(), "/deep".repeat(1000));

    fs.touch("bottom").unwrap();
    let found = fs.find("bottom", Some("/")).unwrap();
    assert_eq!(found, vec![format!("{}/bottom", "/deep".repeat(1000))]);
    assert_eq!(fs.find("deep", Some("/")).unwrap().len(), 1000);
}

#[test]
fn contents_round_trip() {
    common::init();
    let fs = FileSystem::new();
    for contents in &["", "plain", "multi\nline\n", "ünïcödé ✓"] {
        fs.write_file("p", *contents).unwrap();
        assert_eq!(fs.read_file("p").unwrap(), *contents);
        assert_eq!(fs.stream_file("p").unwrap().collect::<String>(), *contents);
        assert_eq!(fs.lookup("p").unwrap().len(), contents.chars().count());
    }
}
