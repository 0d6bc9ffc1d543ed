use serde::{Deserialize, Serialize};

/// What the quest log says about one quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestStatus {
    pub name: String,
    pub is_complete: bool,
}

pub trait QuestLog {
    /// `None` when the quest is not in the log.
    fn quest_status(&self, quest_id: u32) -> Option<QuestStatus>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InLogRequirement {
    #[default]
    InLog,
    NotInLog,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompleteRequirement {
    #[default]
    NotComplete,
    Complete,
    Any,
}

/// Quest state under which the behavior still has work to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressRequirements {
    pub in_log: InLogRequirement,
    pub complete: CompleteRequirement,
}

impl ProgressRequirements {
    /// Quest id 0 means "no associated quest" and always passes.
    pub fn met<L: QuestLog + ?Sized>(&self, log: &L, quest_id: u32) -> bool {
        if quest_id == 0 {
            return true;
        }
        let status = log.quest_status(quest_id);

        let in_log_ok = match self.in_log {
            InLogRequirement::InLog => status.is_some(),
            InLogRequirement::NotInLog => status.is_none(),
        };
        let is_complete = status.as_ref().is_some_and(|s| s.is_complete);
        let complete_ok = match self.complete {
            CompleteRequirement::NotComplete => !is_complete,
            CompleteRequirement::Complete => is_complete,
            CompleteRequirement::Any => true,
        };
        in_log_ok && complete_ok
    }
}
