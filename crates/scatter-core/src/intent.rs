use std::fmt;

use serde::{Deserialize, Serialize};

/// What the caller wants done with a named resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationIntent {
    /// The resource must already exist. Never creates.
    UseExisting,
    /// Reuse when present, create when absent.
    #[default]
    CreateIfAbsent,
}

impl fmt::Display for CreationIntent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::UseExisting => "use_existing",
            Self::CreateIfAbsent => "create_if_absent",
        })
    }
}

/// Observed state of a resource tier. Re-probed on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    Absent,
    Present,
}

/// Answer gathered from an operator or a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserChoice {
    CreateNew,
    UseExisting,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentDecision {
    Proceed(CreationIntent),
    Abort,
}

/// Turn an operator's choice and a probe result into an intent.
///
/// `CreateNew` against a present resource becomes a reuse: creation calls are
/// never issued against something that exists. `UseExisting` against an
/// absent resource is passed through so the resolver reports `NotFound`.
pub fn resolve_intent(choice: UserChoice, observed: ResourceState) -> IntentDecision {
    match (choice, observed) {
        (UserChoice::Cancel, _) => IntentDecision::Abort,
        (UserChoice::CreateNew, ResourceState::Present) => {
            IntentDecision::Proceed(CreationIntent::UseExisting)
        }
        (UserChoice::CreateNew, ResourceState::Absent) => {
            IntentDecision::Proceed(CreationIntent::CreateIfAbsent)
        }
        (UserChoice::UseExisting, _) => IntentDecision::Proceed(CreationIntent::UseExisting),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_table() {
        use IntentDecision::*;
        use ResourceState::*;

        let cases = [
            (UserChoice::Cancel, Present, Abort),
            (UserChoice::Cancel, Absent, Abort),
            (UserChoice::CreateNew, Absent, Proceed(CreationIntent::CreateIfAbsent)),
            (UserChoice::CreateNew, Present, Proceed(CreationIntent::UseExisting)),
            (UserChoice::UseExisting, Present, Proceed(CreationIntent::UseExisting)),
            (UserChoice::UseExisting, Absent, Proceed(CreationIntent::UseExisting)),
        ];
        for (choice, observed, expected) in cases {
            assert_eq!(resolve_intent(choice, observed), expected, "{choice:?}/{observed:?}");
        }
    }
}
