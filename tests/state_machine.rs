#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use teampulse::libs::clock::{Clock, ManualClock};
    use teampulse::libs::config::SyncConfig;
    use teampulse::libs::error::SessionError;
    use teampulse::libs::interruption::InterruptionKind;
    use teampulse::libs::state::{InterruptionToggle, Mode, SessionStateMachine};
    use teampulse::libs::task::{Task, TaskStatus};
    use teampulse::libs::user::{OnlineStatus, Role, User};
    use teampulse::store::users::Users;
    use teampulse::store::DocumentStore;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};

    struct StateMachineTestContext {
        _temp_dir: TempDir,
    }

    impl AsyncTestContext for StateMachineTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            StateMachineTestContext { _temp_dir: temp_dir }
        }
    }

    struct Engine {
        clock: Arc<ManualClock>,
        machine: SessionStateMachine,
        users: Users,
        user: User,
    }

    impl Engine {
        async fn new() -> Self {
            let store = Arc::new(DocumentStore::new(&SyncConfig::default()).unwrap());
            let clock = Arc::new(ManualClock::new(0));
            let machine = SessionStateMachine::new(store.clone(), clock.clone());
            let users = Users::new(store);
            let user = users.create(User::new("Ada Lovelace", "ada", Role::Member)).await.unwrap();
            Engine { clock, machine, users, user }
        }

        async fn seed_task(&self, description: &str) -> Task {
            self.machine
                .tasks()
                .create(Task::new(&self.user.id, &self.clock.today(), "Platform", description, 2.0))
                .await
                .unwrap()
        }

        fn task(&self, id: &str) -> Task {
            self.machine.tasks().fetch(id).unwrap().unwrap()
        }
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_elapsed_accumulates_across_start_stop_cycles(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        let task = engine.seed_task("wire up billing").await;

        for session_ms in [1000, 2000, 3000] {
            engine.machine.start_task(&engine.user, &task.id).await.unwrap();
            engine.clock.advance(session_ms);
            let delta = engine.machine.stop_task(&engine.user.id).await.unwrap();
            assert_eq!(delta, session_ms);
        }

        let stored = engine.task(&task.id);
        assert_eq!(stored.elapsed_ms, 6000);
        assert!(!stored.is_running);
        assert_eq!(stored.last_start_time, None);
        assert_eq!(stored.status, TaskStatus::InProgress);

        // Live elapsed includes the in-flight session only while running.
        engine.machine.start_task(&engine.user, &task.id).await.unwrap();
        engine.clock.advance(500);
        assert_eq!(engine.machine.current_elapsed(&task.id).unwrap().num_milliseconds(), 6500);
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_stop_without_running_task_fails(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        let task = engine.seed_task("write release notes").await;

        engine.machine.start_task(&engine.user, &task.id).await.unwrap();
        engine.clock.advance(4000);
        engine.machine.stop_task(&engine.user.id).await.unwrap();

        let err = engine.machine.stop_task(&engine.user.id).await.unwrap_err();
        assert!(matches!(err, SessionError::NoActiveTask));
        assert_eq!(engine.task(&task.id).elapsed_ms, 4000);
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_starting_second_task_pauses_the_first(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        let first = engine.seed_task("refactor importer").await;
        let second = engine.seed_task("review rollout plan").await;

        engine.machine.start_task(&engine.user, &first.id).await.unwrap();
        engine.clock.advance(5000);
        engine.machine.start_task(&engine.user, &second.id).await.unwrap();

        let first = engine.task(&first.id);
        assert!(!first.is_running);
        assert_eq!(first.elapsed_ms, 5000);

        let running = engine.machine.tasks().running_for(&engine.user.id).unwrap();
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].id, second.id);
        assert_eq!(engine.machine.mode_of(&engine.user.id).unwrap(), Mode::Working(second.id));
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_done_task_can_never_run_again(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        let task = engine.seed_task("ship the hotfix").await;

        engine.machine.start_task(&engine.user, &task.id).await.unwrap();
        engine.clock.advance(2500);
        let delta = engine.machine.complete_task(&task.id).await.unwrap();
        assert_eq!(delta, 2500);

        let stored = engine.task(&task.id);
        assert_eq!(stored.status, TaskStatus::Done);
        assert!(!stored.is_running);

        let err = engine.machine.start_task(&engine.user, &task.id).await.unwrap_err();
        assert!(matches!(err, SessionError::TaskAlreadyDone(_)));
        let err = engine.machine.complete_task(&task.id).await.unwrap_err();
        assert!(matches!(err, SessionError::TaskAlreadyDone(_)));
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_unknown_task_is_rejected(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        let err = engine.machine.start_task(&engine.user, "no-such-task").await.unwrap_err();
        assert!(matches!(err, SessionError::TaskNotFound(_)));
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_break_pauses_task_and_publishes_status(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        let task = engine.seed_task("triage inbox").await;

        engine.machine.start_task(&engine.user, &task.id).await.unwrap();
        engine.clock.advance(10_000);
        engine.machine.start_break(&engine.user).await.unwrap();

        assert_eq!(engine.task(&task.id).elapsed_ms, 10_000);
        assert_eq!(engine.machine.mode_of(&engine.user.id).unwrap(), Mode::OnBreak);
        let published = engine.users.fetch(&engine.user.id).unwrap().unwrap();
        assert_eq!(published.online_status, OnlineStatus::Break);

        // Working is excluded while the break is open.
        let err = engine.machine.start_task(&engine.user, &task.id).await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadyOnBreak));
        let err = engine.machine.start_break(&engine.user).await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadyOnBreak));

        engine.clock.advance(15 * 60 * 1000);
        let closed = engine.machine.end_break(&engine.user).await.unwrap();
        assert_eq!(closed.duration_ms, Some(15 * 60 * 1000));
        assert!(!closed.is_active());
        let published = engine.users.fetch(&engine.user.id).unwrap().unwrap();
        assert_eq!(published.online_status, OnlineStatus::Online);

        let err = engine.machine.end_break(&engine.user).await.unwrap_err();
        assert!(matches!(err, SessionError::NoActiveBreak));
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_reclosing_a_completed_break_is_a_noop(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        let brk = engine.machine.start_break(&engine.user).await.unwrap();

        engine.clock.advance(60_000);
        assert!(engine.machine.breaks().close(&brk.id, engine.clock.now_ms()).await.unwrap());

        // A retried close after the break completed must not move the end.
        engine.clock.advance(60_000);
        assert!(!engine.machine.breaks().close(&brk.id, engine.clock.now_ms()).await.unwrap());
        let stored = engine.machine.breaks().fetch(&brk.id).unwrap().unwrap();
        assert_eq!(stored.duration_ms, Some(60_000));
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_power_cut_freezes_time_and_archives_the_outage(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        let task = engine.seed_task("model the pipeline").await;

        engine.machine.start_task(&engine.user, &task.id).await.unwrap();
        engine.clock.set(90_000);
        let toggle = engine.machine.toggle_interruption(&engine.user).await.unwrap();
        assert!(matches!(toggle, InterruptionToggle::Started(_)));

        // The outage auto-paused the task with the pre-outage time intact.
        assert_eq!(engine.task(&task.id).elapsed_ms, 90_000);
        assert_eq!(engine.machine.mode_of(&engine.user.id).unwrap(), Mode::PowerCut);

        // No timed mode can start while the outage is live.
        let err = engine.machine.start_task(&engine.user, &task.id).await.unwrap_err();
        assert!(matches!(err, SessionError::BlockedByInterruption));
        let err = engine.machine.start_break(&engine.user).await.unwrap_err();
        assert!(matches!(err, SessionError::BlockedByInterruption));
        assert_eq!(engine.task(&task.id).elapsed_ms, 90_000);

        engine.clock.set(150_000);
        let toggle = engine.machine.toggle_interruption(&engine.user).await.unwrap();
        let archived = match toggle {
            InterruptionToggle::Ended(archived) => archived.unwrap(),
            other => panic!("expected the outage to end, got {:?}", other),
        };
        assert_eq!(archived.duration_ms, 60_000);
        assert_eq!(archived.user_id, engine.user.id);

        // The live record is gone, only the history entry remains.
        assert!(engine.machine.interruptions().active_for(&engine.user.id).unwrap().is_none());
        let logs = engine
            .machine
            .interruptions()
            .power_logs_for(&engine.user.id, &archived.date)
            .unwrap();
        assert_eq!(logs.len(), 1);

        // Resume and stop: the total is pre-outage plus post-outage work.
        engine.machine.start_task(&engine.user, &task.id).await.unwrap();
        engine.clock.set(200_000);
        engine.machine.stop_task(&engine.user.id).await.unwrap();
        assert_eq!(engine.task(&task.id).elapsed_ms, 140_000);
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_short_outage_leaves_no_archive(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        let date = engine.clock.today();

        engine.machine.toggle_interruption(&engine.user).await.unwrap();
        engine.clock.advance(500);
        let toggle = engine.machine.toggle_interruption(&engine.user).await.unwrap();
        assert!(matches!(toggle, InterruptionToggle::Ended(None)));
        assert!(engine
            .machine
            .interruptions()
            .power_logs_for(&engine.user.id, &date)
            .unwrap()
            .is_empty());
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_interruption_is_rejected_during_break(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        engine.machine.start_break(&engine.user).await.unwrap();
        let err = engine.machine.toggle_interruption(&engine.user).await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadyOnBreak));
        assert_eq!(engine.machine.mode_of(&engine.user.id).unwrap(), Mode::OnBreak);
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_admin_reports_outage_for_a_member(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        let admin = engine.users.create(User::new("Margaret Hamilton", "margaret", Role::Admin)).await.unwrap();
        let task = engine.seed_task("draft the audit").await;

        engine.machine.start_task(&engine.user, &task.id).await.unwrap();
        engine.clock.advance(30_000);

        // A member cannot assert an outage on someone else's behalf.
        let err = engine.machine.report_outage(&engine.user, &admin).await.unwrap_err();
        assert!(matches!(err, SessionError::AdminRequired));

        // The admin can: the member's task pauses and the live record
        // carries the admin-reported kind.
        let toggle = engine.machine.report_outage(&admin, &engine.user).await.unwrap();
        assert!(matches!(toggle, InterruptionToggle::Started(_)));
        assert_eq!(engine.task(&task.id).elapsed_ms, 30_000);
        assert_eq!(engine.machine.mode_of(&engine.user.id).unwrap(), Mode::PowerCut);

        let active = engine.machine.interruptions().active_for(&engine.user.id).unwrap().unwrap();
        assert_eq!(active.kind, InterruptionKind::AdminReportedOutage);
        assert_eq!(active.user, engine.user.fullname);

        // The member cannot work until the admin resumes them.
        let err = engine.machine.start_task(&engine.user, &task.id).await.unwrap_err();
        assert!(matches!(err, SessionError::BlockedByInterruption));

        engine.clock.advance(120_000);
        let toggle = engine.machine.report_outage(&admin, &engine.user).await.unwrap();
        let archived = match toggle {
            InterruptionToggle::Ended(archived) => archived.unwrap(),
            other => panic!("expected the outage to end, got {:?}", other),
        };
        assert_eq!(archived.duration_ms, 120_000);
        assert!(engine.machine.interruptions().active_for(&engine.user.id).unwrap().is_none());
    }

    #[test_context(StateMachineTestContext)]
    #[tokio::test]
    async fn test_mode_defaults_to_available(_ctx: &mut StateMachineTestContext) {
        let engine = Engine::new().await;
        assert_eq!(engine.machine.mode_of(&engine.user.id).unwrap(), Mode::Available);
        assert_eq!(engine.machine.pause_running(&engine.user.id).await.unwrap(), 0);
    }
}
