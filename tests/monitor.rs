#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use teampulse::libs::clock::{Clock, ManualClock};
    use teampulse::libs::config::{MonitorConfig, SyncConfig};
    use teampulse::libs::idle_log::AUTO_IDLE;
    use teampulse::libs::monitor::Monitor;
    use teampulse::libs::user::{OnlineStatus, Role, User};
    use teampulse::store::idle_logs::IdleLogs;
    use teampulse::store::users::Users;
    use teampulse::store::DocumentStore;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use tokio::time::{Duration, Instant};

    struct MonitorTestContext {
        _temp_dir: TempDir,
    }

    impl AsyncTestContext for MonitorTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", temp_dir.path());
            std::env::set_var("LOCALAPPDATA", temp_dir.path());
            MonitorTestContext { _temp_dir: temp_dir }
        }
    }

    struct Fixture {
        clock: Arc<ManualClock>,
        monitor: Monitor,
        users: Users,
        idle_logs: IdleLogs,
        user: User,
    }

    impl Fixture {
        async fn new(config: MonitorConfig) -> Self {
            let store = Arc::new(DocumentStore::new(&SyncConfig::default()).unwrap());
            let clock = Arc::new(ManualClock::new(0));
            let users = Users::new(store.clone());
            let idle_logs = IdleLogs::new(store.clone());
            let user = users.create(User::new("Alan Turing", "alan", Role::Member)).await.unwrap();
            let monitor = Monitor::new(config, store, &user, clock.clone());
            Fixture { clock, monitor, users, idle_logs, user }
        }

        /// Backdates the last input signal so a poll observes `secs` of
        /// inactivity without the test sleeping for it.
        fn last_input_secs_ago(&self, secs: u64) {
            *self.monitor.last_activity.lock() = Instant::now() - Duration::from_secs(secs);
        }
    }

    fn config() -> MonitorConfig {
        MonitorConfig {
            idle_threshold: 60,
            poll_interval: 500,
            heartbeat_interval: 3600,
            min_idle_log: 1000,
        }
    }

    #[test_context(MonitorTestContext)]
    #[tokio::test]
    async fn test_idle_spell_is_detected_and_logged(_ctx: &mut MonitorTestContext) {
        let fixture = Fixture::new(config()).await;

        // No input for longer than the threshold opens an idle spell.
        fixture.clock.set(10_000);
        fixture.last_input_secs_ago(61);
        fixture.monitor.poll_once().await.unwrap();
        assert!(fixture.monitor.is_idle());

        // A second quiet poll keeps the spell open without logging.
        fixture.monitor.poll_once().await.unwrap();
        assert!(fixture.monitor.is_idle());
        assert!(fixture.idle_logs.for_date(&fixture.user.id, &fixture.clock.today()).unwrap().is_empty());

        // Input resumes: the spell closes, the log captures its span and
        // the wake-up refresh publishes the user as back online.
        fixture.clock.set(70_000);
        fixture.last_input_secs_ago(0);
        fixture.monitor.poll_once().await.unwrap();
        assert!(!fixture.monitor.is_idle());

        let logs = fixture.idle_logs.for_date(&fixture.user.id, &fixture.clock.today()).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].start_time, 10_000);
        assert_eq!(logs[0].end_time, 70_000);
        assert_eq!(logs[0].duration_ms, 60_000);
        assert_eq!(logs[0].kind, AUTO_IDLE);

        let published = fixture.users.fetch(&fixture.user.id).unwrap().unwrap();
        assert_eq!(published.online_status, OnlineStatus::Online);
        assert_eq!(published.last_seen, Some(70_000));
    }

    #[test_context(MonitorTestContext)]
    #[tokio::test]
    async fn test_brief_idle_spell_is_not_logged(_ctx: &mut MonitorTestContext) {
        let fixture = Fixture::new(config()).await;

        fixture.clock.set(1000);
        fixture.last_input_secs_ago(61);
        fixture.monitor.poll_once().await.unwrap();
        assert!(fixture.monitor.is_idle());

        // The spell closes under min_idle_log: no history entry, but the
        // status refresh still happens.
        fixture.clock.set(1500);
        fixture.last_input_secs_ago(0);
        fixture.monitor.poll_once().await.unwrap();
        assert!(!fixture.monitor.is_idle());
        assert!(fixture.idle_logs.for_date(&fixture.user.id, &fixture.clock.today()).unwrap().is_empty());
        let published = fixture.users.fetch(&fixture.user.id).unwrap().unwrap();
        assert_eq!(published.online_status, OnlineStatus::Online);
    }

    #[test_context(MonitorTestContext)]
    #[tokio::test]
    async fn test_steady_input_never_opens_a_spell(_ctx: &mut MonitorTestContext) {
        let fixture = Fixture::new(config()).await;
        for _ in 0..5 {
            fixture.last_input_secs_ago(0);
            fixture.monitor.poll_once().await.unwrap();
            assert!(!fixture.monitor.is_idle());
        }
        assert!(fixture.idle_logs.for_date(&fixture.user.id, &fixture.clock.today()).unwrap().is_empty());
    }

    #[test_context(MonitorTestContext)]
    #[tokio::test]
    async fn test_monitor_stands_down_during_a_break(_ctx: &mut MonitorTestContext) {
        let fixture = Fixture::new(config()).await;

        fixture.clock.set(5000);
        fixture.last_input_secs_ago(61);
        fixture.monitor.poll_once().await.unwrap();
        assert!(fixture.monitor.is_idle());

        // Going on break discards the half-open spell entirely.
        fixture.users.set_status(&fixture.user.id, OnlineStatus::Break, fixture.clock.now_ms()).await.unwrap();
        fixture.monitor.poll_once().await.unwrap();
        assert!(!fixture.monitor.is_idle());

        // Nothing is logged afterwards either, however long the quiet lasts.
        fixture.clock.set(900_000);
        fixture.monitor.poll_once().await.unwrap();
        assert!(!fixture.monitor.is_idle());
        assert!(fixture.idle_logs.for_date(&fixture.user.id, &fixture.clock.today()).unwrap().is_empty());
    }

    #[test_context(MonitorTestContext)]
    #[tokio::test]
    async fn test_heartbeat_refreshes_last_seen(_ctx: &mut MonitorTestContext) {
        let mut cfg = config();
        cfg.heartbeat_interval = 0;
        let fixture = Fixture::new(cfg).await;

        fixture.clock.set(5555);
        fixture.last_input_secs_ago(0);
        fixture.monitor.poll_once().await.unwrap();

        let published = fixture.users.fetch(&fixture.user.id).unwrap().unwrap();
        assert_eq!(published.last_seen, Some(5555));
        // The heartbeat only touches liveness, never the status.
        assert_eq!(published.online_status, OnlineStatus::Offline);
    }

    #[test_context(MonitorTestContext)]
    #[tokio::test]
    async fn test_no_heartbeat_while_idle(_ctx: &mut MonitorTestContext) {
        let mut cfg = config();
        cfg.heartbeat_interval = 0;
        let fixture = Fixture::new(cfg).await;

        fixture.clock.set(8000);
        fixture.last_input_secs_ago(61);
        fixture.monitor.poll_once().await.unwrap();
        assert!(fixture.monitor.is_idle());

        let published = fixture.users.fetch(&fixture.user.id).unwrap().unwrap();
        assert_eq!(published.last_seen, None);
    }
}
