use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Persisted identity of a user: a numeric ID scoped to a domain.
///
/// The `Display` form, `"{id}@{domain}"`, doubles as the name of the
/// directory holding that user's event history.
///
/// # Examples
///
/// ```
/// use activity_ring::UserSpec;
///
/// let spec = UserSpec::new(1, "example.org");
/// assert_eq!(spec.to_string(), "1@example.org");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserSpec {
    pub id: u64,
    pub domain: String,
}

impl UserSpec {
    pub fn new(id: u64, domain: impl Into<String>) -> Self {
        UserSpec {
            id,
            domain: domain.into(),
        }
    }
}

impl fmt::Display for UserSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.domain)
    }
}

/// The actor that produced an event.
///
/// Only `spec` is meaningful to the store. `login` and `name` are display
/// fields supplied by whoever owns the store; they are not written to disk
/// and are reattached to every event when history is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    pub spec: UserSpec,
    pub login: String,
    pub name: String,
}

impl User {
    pub fn new(spec: UserSpec, login: impl Into<String>) -> Self {
        User {
            spec,
            login: login.into(),
            name: String::new(),
        }
    }

    /// Set the user's display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// A normalized activity occurrence.
///
/// `time` keeps its offset so that a caller passing a non-UTC timestamp can
/// be told so; the store only accepts a zero offset. `container` is a
/// path-like project identifier such as `"example.org/some-app"`.
///
/// # Examples
///
/// ```
/// use activity_ring::{Event, Payload, Star, User, UserSpec};
/// use chrono::{TimeZone, Utc};
///
/// let actor = User::new(UserSpec::new(1, "example.org"), "gopher");
/// let event = Event::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(), actor, "example.org/app")
///     .with_payload(Payload::Star(Star {}));
/// assert_eq!(event.payload.as_ref().map(Payload::tag), Some("star"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub time: DateTime<FixedOffset>,
    pub actor: User,
    pub container: String,

    /// `None` only for zero-value events, or for records written with a
    /// type tag this version does not know.
    pub payload: Option<Payload>,
}

impl Event {
    /// Create an event without a payload.
    pub fn new(
        time: impl Into<DateTime<FixedOffset>>,
        actor: User,
        container: impl Into<String>,
    ) -> Self {
        Event {
            time: time.into(),
            actor,
            container: container.into(),
            payload: None,
        }
    }

    /// Set the event's payload.
    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Whether `time` is expressed in UTC.
    pub fn is_utc(&self) -> bool {
        self.time.offset().local_minus_utc() == 0
    }
}

impl Default for Event {
    fn default() -> Self {
        Event {
            time: DateTime::<Utc>::default().fixed_offset(),
            actor: User::default(),
            container: String::new(),
            payload: None,
        }
    }
}

/// The kind-specific part of an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Issue(Issue),
    Change(Change),
    IssueComment(IssueComment),
    ChangeComment(ChangeComment),
    CommitComment(CommitComment),
    Push(Push),
    Star(Star),
    Create(Create),
    Fork(Fork),
    Delete(Delete),
    Wiki(Wiki),
}

impl Payload {
    /// Every type tag, in declaration order.
    pub const TAGS: [&'static str; 11] = [
        "issue",
        "change",
        "issueComment",
        "changeComment",
        "commitComment",
        "push",
        "star",
        "create",
        "fork",
        "delete",
        "wiki",
    ];

    /// The stable type tag written next to this payload on disk.
    pub fn tag(&self) -> &'static str {
        match self {
            Payload::Issue(_) => "issue",
            Payload::Change(_) => "change",
            Payload::IssueComment(_) => "issueComment",
            Payload::ChangeComment(_) => "changeComment",
            Payload::CommitComment(_) => "commitComment",
            Payload::Push(_) => "push",
            Payload::Star(_) => "star",
            Payload::Create(_) => "create",
            Payload::Fork(_) => "fork",
            Payload::Delete(_) => "delete",
            Payload::Wiki(_) => "wiki",
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Payload {
                fn from(p: $variant) -> Self {
                    Payload::$variant(p)
                }
            }
        )*
    };
}

impl_from_variant!(
    Issue,
    Change,
    IssueComment,
    ChangeComment,
    CommitComment,
    Push,
    Star,
    Create,
    Fork,
    Delete,
    Wiki,
);

/// State of an issue at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }
}

impl FromStr for IssueState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// State of a change (pull request) at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeState {
    Open,
    Closed,
    Merged,
}

impl ChangeState {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeState::Open => "open",
            ChangeState::Closed => "closed",
            ChangeState::Merged => "merged",
        }
    }
}

impl FromStr for ChangeState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ChangeState::Open),
            "closed" => Ok(ChangeState::Closed),
            "merged" => Ok(ChangeState::Merged),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

// Both state enums cross the serialization boundary as their `as_str` token,
// and are read back through `FromStr`.
macro_rules! impl_serde_via_token {
    ($($state:ident),* $(,)?) => {
        $(
            impl Serialize for $state {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.as_str())
                }
            }

            impl<'de> Deserialize<'de> for $state {
                fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let token = String::deserialize(deserializer)?;
                    token.parse().map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

impl_serde_via_token!(IssueState, ChangeState);

/// Returned when parsing a state token that is not `open`, `closed` or `merged`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown state token {0:?}")]
pub struct UnknownState(pub String);

// Payload variants. Field names are camelCase on disk; optional URLs are
// omitted when absent.

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// `"opened"`, `"closed"` or `"reopened"`.
    pub action: String,
    pub issue_title: String,
    pub issue_html_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// `"opened"`, `"closed"`, `"merged"` or `"reopened"`.
    pub action: String,
    pub change_title: String,
    pub change_html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueComment {
    pub issue_title: String,
    pub issue_state: IssueState,
    pub comment_body: String,
    pub comment_html_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeComment {
    pub change_title: String,
    pub change_state: ChangeState,
    pub comment_body: String,
    pub comment_html_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitComment {
    pub commit: Commit,
    pub comment_body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Push {
    /// Branch pushed to, e.g. `"main"`.
    pub branch: String,
    /// SHA of the most recent commit after the push.
    pub head: String,
    /// SHA of the most recent commit before the push.
    pub before: String,
    /// Earliest first; the last entry is `head`.
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_html_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_html_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    /// `"repository"`, `"branch"` or `"tag"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Only set for branches and tags.
    #[serde(default)]
    pub name: String,
    /// Only set for repositories.
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fork {
    /// The forkee, e.g. `"example.org/user/repo"`.
    pub container: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delete {
    /// `"branch"` or `"tag"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wiki {
    #[serde(default)]
    pub pages: Vec<Page>,
}

/// A commit referenced by a push or a commit comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub sha: String,
    #[serde(rename = "commitMessage")]
    pub message: String,
    pub author_avatar_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

/// A wiki page touched by a [`Wiki`] event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub action: String,
    #[serde(default)]
    pub sha: String,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub compare_html_url: String,
}
