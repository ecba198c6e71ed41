// Valid-transition table for lifecycle commands.

use crate::models::{EntityAction, EntityStatus};

/// What a valid command does: an optional status shown while it is in flight,
/// and the status it resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub interim: Option<EntityStatus>,
    pub target: EntityStatus,
}

/// Looks up `action` from `from`. `None` means the command is not allowed.
///
/// | action  | from           | interim    | target  |
/// |---------|----------------|------------|---------|
/// | start   | stopped, error | starting   | running |
/// | stop    | running        | stopping   | stopped |
/// | restart | running        | restarting | running |
/// | pause   | running        | -          | paused  |
/// | unpause | paused         | -          | running |
///
/// `error` is only left through `start`.
pub fn plan(from: EntityStatus, action: EntityAction) -> Option<Transition> {
    use EntityAction as A;
    use EntityStatus as S;

    let (interim, target) = match (action, from) {
        (A::Start, S::Stopped | S::Error) => (Some(S::Starting), S::Running),
        (A::Stop, S::Running) => (Some(S::Stopping), S::Stopped),
        (A::Restart, S::Running) => (Some(S::Restarting), S::Running),
        (A::Pause, S::Running) => (None, S::Paused),
        (A::Unpause, S::Paused) => (None, S::Running),
        _ => return None,
    };
    Some(Transition { interim, target })
}

/// Actions allowed from `from`, in display order.
pub fn allowed_actions(from: EntityStatus) -> Vec<EntityAction> {
    [
        EntityAction::Start,
        EntityAction::Stop,
        EntityAction::Restart,
        EntityAction::Pause,
        EntityAction::Unpause,
    ]
    .into_iter()
    .filter(|a| plan(from, *a).is_some())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [EntityStatus; 7] = [
        EntityStatus::Running,
        EntityStatus::Stopped,
        EntityStatus::Paused,
        EntityStatus::Starting,
        EntityStatus::Stopping,
        EntityStatus::Restarting,
        EntityStatus::Error,
    ];

    #[test]
    fn table_has_exactly_six_valid_pairs() {
        let valid = ALL_STATUSES
            .iter()
            .map(|s| allowed_actions(*s).len())
            .sum::<usize>();
        assert_eq!(valid, 6);
    }

    #[test]
    fn error_only_recovers_through_start() {
        assert_eq!(allowed_actions(EntityStatus::Error), vec![EntityAction::Start]);
        assert!(plan(EntityStatus::Error, EntityAction::Stop).is_none());
    }

    #[test]
    fn transitional_statuses_accept_nothing() {
        for s in ALL_STATUSES.iter().filter(|s| s.is_transitional()) {
            assert!(allowed_actions(*s).is_empty(), "{s} should accept no action");
        }
    }

    #[test]
    fn pause_and_unpause_have_no_interim() {
        assert_eq!(
            plan(EntityStatus::Running, EntityAction::Pause),
            Some(Transition {
                interim: None,
                target: EntityStatus::Paused
            })
        );
        assert_eq!(
            plan(EntityStatus::Paused, EntityAction::Unpause).map(|t| t.target),
            Some(EntityStatus::Running)
        );
    }

    #[test]
    fn restart_goes_through_restarting() {
        let t = plan(EntityStatus::Running, EntityAction::Restart).unwrap();
        assert_eq!(t.interim, Some(EntityStatus::Restarting));
        assert_eq!(t.target, EntityStatus::Running);
    }

    #[test]
    fn stop_on_paused_is_rejected() {
        assert!(plan(EntityStatus::Paused, EntityAction::Stop).is_none());
        assert!(plan(EntityStatus::Stopped, EntityAction::Pause).is_none());
    }
}
