use serde::{Deserialize, Serialize};

use super::task_id::TaskId;

/// Response to a successful task insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreated {
    /// Store-assigned id of the new task
    pub id: TaskId,
}
