use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Create,
    Update,
    Delete,
    Replace,
    NoOp,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Replace => "replace",
            Action::NoOp => "no-op",
        }
    }

    /// Collapses Terraform's ordered verb list into one action.
    ///
    /// Replacement is encoded as a `delete`/`create` pair in either order.
    /// Anything unrecognized resolves to [`Action::NoOp`].
    pub fn from_verbs<S: AsRef<str>>(verbs: &[S]) -> Action {
        match verbs {
            [a, b]
                if matches!(
                    (a.as_ref(), b.as_ref()),
                    ("delete", "create") | ("create", "delete")
                ) =>
            {
                Action::Replace
            }
            [first, ..] => match first.as_ref() {
                "create" => Action::Create,
                "update" => Action::Update,
                "delete" => Action::Delete,
                _ => Action::NoOp,
            },
            [] => Action::NoOp,
        }
    }

    /// Resolves the raw `actions` field of a plan entry. A missing field, a
    /// non-list, or a list holding anything other than strings is no-op.
    pub fn resolve(raw: &Value) -> Action {
        let Some(items) = raw.as_array() else {
            return Action::NoOp;
        };
        let verbs: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
        match verbs {
            Some(verbs) => Action::from_verbs(verbs.as_slice()),
            None => Action::NoOp,
        }
    }

    pub const fn is_noop(self) -> bool {
        matches!(self, Action::NoOp)
    }

    pub const fn has_both_sides(self) -> bool {
        matches!(self, Action::Update | Action::Replace)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
