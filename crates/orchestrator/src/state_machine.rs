use agentflow_core::{ExecutionStatus, TaskStatus};

use crate::error::{OrchestratorError, Result};

/// Allowed execution status transitions. Terminal states have no exits.
///
/// `analyzing` is never entered by the orchestrator, which runs the final
/// analysis while still `executing`. Rows already in it can only finish.
pub struct ExecutionStateMachine;

impl ExecutionStateMachine {
    pub fn validate_transition(from: &ExecutionStatus, to: &ExecutionStatus) -> Result<()> {
        if Self::allowed_transitions(from).contains(to) {
            Ok(())
        } else {
            Err(OrchestratorError::invalid_transition(
                from.as_str(),
                to.as_str(),
            ))
        }
    }

    fn allowed_transitions(from: &ExecutionStatus) -> Vec<ExecutionStatus> {
        match from {
            ExecutionStatus::Pending => vec![ExecutionStatus::Planning],
            ExecutionStatus::Planning => vec![ExecutionStatus::Executing, ExecutionStatus::Failed],
            ExecutionStatus::Executing => {
                vec![ExecutionStatus::Completed, ExecutionStatus::Failed]
            }
            ExecutionStatus::Analyzing => {
                vec![ExecutionStatus::Completed, ExecutionStatus::Failed]
            }
            ExecutionStatus::Completed | ExecutionStatus::Failed => vec![],
        }
    }

    pub fn can_transition(from: &ExecutionStatus, to: &ExecutionStatus) -> bool {
        Self::validate_transition(from, to).is_ok()
    }

    pub fn is_terminal(status: &ExecutionStatus) -> bool {
        Self::allowed_transitions(status).is_empty()
    }
}

/// Allowed task status transitions. `cancelled` is only ever requested from outside;
/// `pending -> failed` is the fault path for a task that could not be started.
pub struct TaskStateMachine;

impl TaskStateMachine {
    pub fn validate_transition(from: &TaskStatus, to: &TaskStatus) -> Result<()> {
        if Self::allowed_transitions(from).contains(to) {
            Ok(())
        } else {
            Err(OrchestratorError::invalid_transition(
                from.as_str(),
                to.as_str(),
            ))
        }
    }

    fn allowed_transitions(from: &TaskStatus) -> Vec<TaskStatus> {
        match from {
            TaskStatus::Pending => vec![
                TaskStatus::Running,
                TaskStatus::Failed,
                TaskStatus::Cancelled,
            ],
            TaskStatus::Running => vec![
                TaskStatus::Completed,
                TaskStatus::Failed,
                TaskStatus::Cancelled,
            ],
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled => vec![],
        }
    }

    pub fn can_transition(from: &TaskStatus, to: &TaskStatus) -> bool {
        Self::validate_transition(from, to).is_ok()
    }

    pub fn is_terminal(status: &TaskStatus) -> bool {
        Self::allowed_transitions(status).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_success_path() {
        assert!(ExecutionStateMachine::can_transition(
            &ExecutionStatus::Pending,
            &ExecutionStatus::Planning
        ));
        assert!(ExecutionStateMachine::can_transition(
            &ExecutionStatus::Planning,
            &ExecutionStatus::Executing
        ));
        assert!(ExecutionStateMachine::can_transition(
            &ExecutionStatus::Executing,
            &ExecutionStatus::Completed
        ));
        assert!(ExecutionStateMachine::can_transition(
            &ExecutionStatus::Analyzing,
            &ExecutionStatus::Completed
        ));
    }

    #[test]
    fn test_execution_invalid_transitions() {
        assert!(!ExecutionStateMachine::can_transition(
            &ExecutionStatus::Pending,
            &ExecutionStatus::Executing
        ));
        assert!(!ExecutionStateMachine::can_transition(
            &ExecutionStatus::Pending,
            &ExecutionStatus::Failed
        ));
        assert!(!ExecutionStateMachine::can_transition(
            &ExecutionStatus::Executing,
            &ExecutionStatus::Analyzing
        ));
        assert!(!ExecutionStateMachine::can_transition(
            &ExecutionStatus::Completed,
            &ExecutionStatus::Failed
        ));
        assert!(!ExecutionStateMachine::can_transition(
            &ExecutionStatus::Failed,
            &ExecutionStatus::Planning
        ));
    }

    #[test]
    fn test_execution_failure_reachable_from_active_states() {
        for from in [
            ExecutionStatus::Planning,
            ExecutionStatus::Executing,
            ExecutionStatus::Analyzing,
        ] {
            assert!(ExecutionStateMachine::can_transition(
                &from,
                &ExecutionStatus::Failed
            ));
        }
    }

    #[test]
    fn test_terminal_states_match_status() {
        for status in [
            ExecutionStatus::Pending,
            ExecutionStatus::Planning,
            ExecutionStatus::Executing,
            ExecutionStatus::Analyzing,
            ExecutionStatus::Completed,
            ExecutionStatus::Failed,
        ] {
            assert_eq!(
                ExecutionStateMachine::is_terminal(&status),
                status.is_terminal()
            );
        }
        for status in [
            TaskStatus::Pending,
            TaskStatus::Running,
            TaskStatus::Completed,
            TaskStatus::Failed,
            TaskStatus::Cancelled,
        ] {
            assert_eq!(TaskStateMachine::is_terminal(&status), status.is_terminal());
        }
    }

    #[test]
    fn test_task_transitions() {
        assert!(TaskStateMachine::can_transition(
            &TaskStatus::Pending,
            &TaskStatus::Running
        ));
        assert!(TaskStateMachine::can_transition(
            &TaskStatus::Running,
            &TaskStatus::Failed
        ));
        assert!(TaskStateMachine::can_transition(
            &TaskStatus::Pending,
            &TaskStatus::Cancelled
        ));
        assert!(TaskStateMachine::can_transition(
            &TaskStatus::Pending,
            &TaskStatus::Failed
        ));
        assert!(!TaskStateMachine::can_transition(
            &TaskStatus::Completed,
            &TaskStatus::Failed
        ));
        assert!(!TaskStateMachine::can_transition(
            &TaskStatus::Pending,
            &TaskStatus::Completed
        ));
        assert!(!TaskStateMachine::can_transition(
            &TaskStatus::Failed,
            &TaskStatus::Running
        ));
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = TaskStateMachine::validate_transition(&TaskStatus::Completed, &TaskStatus::Running)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid state transition from completed to running"
        );
    }
}
