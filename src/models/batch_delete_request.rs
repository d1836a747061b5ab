use serde::{Deserialize, Serialize};

use super::task_id::TaskId;

/// Atomic multi-document delete request.
///
/// The server applies the whole batch or none of it; partial failure never
/// leaves a subset of the listed tasks deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDeleteRequest {
    /// Ids of the tasks to remove
    pub ids: Vec<TaskId>,
}
