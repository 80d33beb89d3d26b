#![allow(dead_code)]

use activity_ring::{
    Change, ChangeComment, ChangeState, Commit, CommitComment, Create, Delete, Event, FileSystem,
    Fork, Issue, IssueComment, IssueState, MemFs, Page, Payload, Push, Star, User, UserSpec, Wiki,
};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn owner() -> User {
    User::new(UserSpec::new(1, "example.org"), "gopher").with_name("Sample Gopher")
}

pub fn stranger() -> User {
    User::new(UserSpec::new(2, "example.org"), "gopher2")
}

pub fn utc(secs: i64) -> DateTime<FixedOffset> {
    Utc.timestamp_opt(secs, 0).unwrap().fixed_offset()
}

pub fn star_event(secs: i64, container: &str) -> Event {
    Event::new(utc(secs), owner(), container).with_payload(Star {})
}

/// `n` distinct star events, oldest first.
pub fn numbered_events(n: usize) -> Vec<Event> {
    (0..n)
        .map(|i| star_event(1_700_000_000 + i as i64, &format!("example.org/repo-{i}")))
        .collect()
}

pub fn issue_event() -> Event {
    Event::new(
        Utc.timestamp_opt(1_502_000_000, 105_247_415).unwrap(),
        owner(),
        "example.org/some-app",
    )
    .with_payload(Issue {
        action: "opened".to_string(),
        issue_title: "\"Create Issue\" button doesn't show up if user isn't logged in.".to_string(),
        issue_html_url: "https://example.org/some-app/issues/40".to_string(),
    })
}

pub fn issue_comment_event() -> Event {
    Event::new(
        Utc.timestamp_opt(1_501_000_000, 841_364_328).unwrap(),
        owner(),
        "example.org/another-app",
    )
    .with_payload(IssueComment {
        issue_title: "feature request: \"recently read\" notifications tab".to_string(),
        issue_state: IssueState::Open,
        comment_body: "I am going to work on this and implement it soon.\n\nI want to prototype..."
            .to_string(),
        comment_html_url: "https://example.org/another-app/issues/3#comment-2".to_string(),
    })
}

pub fn star_only_event() -> Event {
    star_event(1_500_000_000, "example.org/starworthy")
}

pub fn commit(sha: &str) -> Commit {
    Commit {
        sha: sha.to_string(),
        message: format!("commit {sha}"),
        author_avatar_url: "https://example.org/avatar.png".to_string(),
        html_url: None,
    }
}

/// One payload of every kind.
pub fn all_payloads() -> Vec<Payload> {
    vec![
        Issue {
            action: "closed".to_string(),
            issue_title: "crash on start".to_string(),
            issue_html_url: "https://example.org/app/issues/1".to_string(),
        }
        .into(),
        Change {
            action: "merged".to_string(),
            change_title: "fix crash on start".to_string(),
            change_html_url: "https://example.org/app/changes/2".to_string(),
        }
        .into(),
        IssueComment {
            issue_title: "crash on start".to_string(),
            issue_state: IssueState::Closed,
            comment_body: "fixed".to_string(),
            comment_html_url: "https://example.org/app/issues/1#comment-1".to_string(),
        }
        .into(),
        ChangeComment {
            change_title: "fix crash on start".to_string(),
            change_state: ChangeState::Merged,
            comment_body: "LGTM".to_string(),
            comment_html_url: "https://example.org/app/changes/2#comment-1".to_string(),
        }
        .into(),
        CommitComment {
            commit: Commit {
                html_url: Some("https://example.org/app/commit/abc".to_string()),
                ..commit("abc")
            },
            comment_body: "nice".to_string(),
        }
        .into(),
        Push {
            branch: "main".to_string(),
            head: "ccc".to_string(),
            before: "aaa".to_string(),
            commits: vec![commit("bbb"), commit("ccc")],
            head_html_url: Some("https://example.org/app/commit/ccc".to_string()),
            before_html_url: None,
        }
        .into(),
        Star {}.into(),
        Create {
            kind: "repository".to_string(),
            name: String::new(),
            description: "An app.".to_string(),
        }
        .into(),
        Fork {
            container: "example.org/someone/app".to_string(),
        }
        .into(),
        Delete {
            kind: "branch".to_string(),
            name: "feature".to_string(),
        }
        .into(),
        Wiki {
            pages: vec![Page {
                action: "edited".to_string(),
                sha: "ddd".to_string(),
                title: "Home".to_string(),
                html_url: "https://example.org/app/wiki/Home".to_string(),
                compare_html_url: "https://example.org/app/wiki/Home/_compare/ddd".to_string(),
            }],
        }
        .into(),
    ]
}

/// A [`MemFs`] wrapper whose operations can be made to fail on demand.
#[derive(Clone, Debug, Default)]
pub struct FlakyFs {
    pub inner: MemFs,
    pub fail_slot_writes: Arc<AtomicBool>,
    pub fail_ring_writes: Arc<AtomicBool>,
    pub fail_reads: Arc<AtomicBool>,
}

impl FlakyFs {
    pub fn new(inner: MemFs) -> Self {
        FlakyFs {
            inner,
            ..FlakyFs::default()
        }
    }

    pub fn set(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }
}

fn injected(path: &Path) -> io::Error {
    io::Error::other(format!("injected failure: {}", path.display()))
}

impl FileSystem for FlakyFs {
    type Reader = <MemFs as FileSystem>::Reader;
    type Writer = <MemFs as FileSystem>::Writer;

    fn open(&self, path: &Path) -> io::Result<Self::Reader> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(injected(path));
        }
        self.inner.open(path)
    }

    fn create(&self, path: &Path) -> io::Result<Self::Writer> {
        let is_ring = path.file_name().is_some_and(|name| name == "ring");
        if is_ring && self.fail_ring_writes.load(Ordering::SeqCst) {
            return Err(injected(path));
        }
        if !is_ring && self.fail_slot_writes.load(Ordering::SeqCst) {
            return Err(injected(path));
        }
        self.inner.create(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path)
    }
}
