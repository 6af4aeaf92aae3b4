use crate::record::ListLine;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Lines indented by at most this many whitespace characters are main tasks;
/// anything deeper is a subtask of the nearest main task above it.
pub const MAIN_TASK_MAX_INDENT: usize = 3;

// ---------------------------------------------------------------------------
// CheckState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Pending,
    Done,
    Skipped,
}

impl CheckState {
    /// The checkbox written for this state. Always 3 bytes.
    pub fn marker(self) -> &'static str {
        match self {
            CheckState::Pending => "[ ]",
            CheckState::Done => "[x]",
            CheckState::Skipped => "[-]",
        }
    }

    fn from_mark(mark: &str) -> Option<Self> {
        match mark {
            " " => Some(CheckState::Pending),
            "x" | "X" => Some(CheckState::Done),
            "-" => Some(CheckState::Skipped),
            _ => None,
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckState::Pending => "pending",
            CheckState::Done => "done",
            CheckState::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// MilestoneNode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Main,
    Subtask,
    /// Not a checklist line: a plain bullet or a note.
    Structural,
}

#[derive(Debug, Clone, Serialize)]
pub struct MilestoneNode {
    /// 0-based line number in the campaigns file.
    pub line: usize,
    pub indent: usize,
    pub role: Role,
    /// `None` for structural lines and for checkboxes with an unknown mark
    /// such as `[?]`. Those still count as tasks but are never pending.
    pub state: Option<CheckState>,
    pub text: String,
    /// Byte offset of the `[` of the checkbox within the line.
    #[serde(skip)]
    pub marker_offset: Option<usize>,
    /// Index into the tree's nodes of the owning main task.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
}

impl MilestoneNode {
    pub fn is_main(&self) -> bool {
        self.role == Role::Main
    }

    pub fn is_pending(&self) -> bool {
        self.state == Some(CheckState::Pending)
    }
}

static CHECKBOX_RE: OnceLock<Regex> = OnceLock::new();

fn checkbox_re() -> &'static Regex {
    CHECKBOX_RE.get_or_init(|| {
        Regex::new(r"^(?P<indent>\s*)- (?P<box>\[(?P<mark>.)\])(?P<text>.*)$").unwrap()
    })
}

fn indent_depth(raw: &str) -> usize {
    raw.chars().take_while(|c| c.is_whitespace()).count()
}

fn parse_node(item: &ListLine) -> MilestoneNode {
    let indent = indent_depth(&item.raw);
    let checkbox = checkbox_re().captures(&item.raw).and_then(|caps| {
        let state = CheckState::from_mark(&caps["mark"]);
        let offset = caps.name("box").map(|m| m.start())?;
        Some((state, offset, caps["text"].trim().to_string()))
    });

    match checkbox {
        Some((state, offset, text)) => MilestoneNode {
            line: item.line,
            indent,
            role: if indent <= MAIN_TASK_MAX_INDENT {
                Role::Main
            } else {
                Role::Subtask
            },
            state,
            text,
            marker_offset: Some(offset),
            parent: None,
        },
        None => MilestoneNode {
            line: item.line,
            indent,
            role: Role::Structural,
            state: None,
            text: item.raw.trim().trim_start_matches('-').trim().to_string(),
            marker_offset: None,
            parent: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Focus / Progress
// ---------------------------------------------------------------------------

/// The single thing to work on next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionableItem {
    pub parent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtask: Option<String>,
    /// Position of the parent among the pending main tasks (0-based).
    pub ordinal: usize,
    /// Position of the subtask among the parent's pending subtasks (0-based).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtask_ordinal: Option<usize>,
    /// 1-based position of the parent among all main tasks.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Focus {
    Item(ActionableItem),
    AllComplete,
}

/// Completion counted over main tasks only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.completed, self.total)
    }
}

// ---------------------------------------------------------------------------
// MilestoneTree
// ---------------------------------------------------------------------------

/// The milestones of one campaign in file order, with each subtask linked to
/// its main task once at parse time.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct MilestoneTree {
    nodes: Vec<MilestoneNode>,
}

impl MilestoneTree {
    pub fn parse(items: &[ListLine]) -> Self {
        let mut nodes: Vec<MilestoneNode> = Vec::with_capacity(items.len());
        let mut owner: Option<usize> = None;

        for item in items.iter().filter(|i| !i.raw.trim().is_empty()) {
            let mut node = parse_node(item);
            match node.role {
                Role::Main => owner = Some(nodes.len()),
                Role::Subtask => node.parent = owner,
                Role::Structural => {}
            }
            nodes.push(node);
        }
        Self { nodes }
    }

    pub fn nodes(&self) -> &[MilestoneNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Main tasks with their index into `nodes()`.
    pub fn main_tasks(&self) -> impl Iterator<Item = (usize, &MilestoneNode)> {
        self.nodes.iter().enumerate().filter(|(_, n)| n.is_main())
    }

    /// Subtasks owned by the main task at `index`, in file order.
    pub fn subtasks_of(&self, index: usize) -> impl Iterator<Item = &MilestoneNode> {
        self.nodes
            .iter()
            .filter(move |n| n.role == Role::Subtask && n.parent == Some(index))
    }

    /// The `ordinal`-th pending main task (0-based), with its node index.
    pub fn pending_main(&self, ordinal: usize) -> Option<(usize, &MilestoneNode)> {
        self.main_tasks().filter(|(_, n)| n.is_pending()).nth(ordinal)
    }

    /// The `ordinal`-th pending subtask beneath the `parent_ordinal`-th
    /// pending main task.
    pub fn pending_subtask(&self, parent_ordinal: usize, ordinal: usize) -> Option<&MilestoneNode> {
        let (index, _) = self.pending_main(parent_ordinal)?;
        self.subtasks_of(index).filter(|n| n.is_pending()).nth(ordinal)
    }

    /// The first pending main task, paired with its first pending subtask.
    pub fn find_current(&self) -> Focus {
        let Some((index, main)) = self.pending_main(0) else {
            return Focus::AllComplete;
        };
        let position = self.main_tasks().take_while(|(i, _)| *i != index).count() + 1;
        let subtask = self.subtasks_of(index).find(|n| n.is_pending());

        Focus::Item(ActionableItem {
            parent: main.text.clone(),
            subtask: subtask.map(|s| s.text.clone()),
            ordinal: 0,
            subtask_ordinal: subtask.map(|_| 0),
            position,
        })
    }

    pub fn progress(&self) -> Progress {
        let mut progress = Progress::default();
        for (_, node) in self.main_tasks() {
            progress.total += 1;
            if node.state == Some(CheckState::Done) {
                progress.completed += 1;
            }
        }
        progress
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
