use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use modvisor::{
    Event, EventKind, Manager, ManagerConfig, Module, ModuleFn, ModuleStatus, RuntimeError,
    Status, Subscribe,
};

type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Copy)]
enum Behavior {
    /// Running until cancelled, then Stopped.
    Serve,
    /// Never touches its status.
    Silent,
    /// Panics before reporting anything.
    Panic,
    /// Running, then panics after the delay.
    PanicLater(Duration),
    /// Running until cancelled, waits the delay, then Stopped.
    SlowStop(Duration),
    /// Reports Stopped right away and returns.
    Finish,
}

struct FakeModule {
    name: String,
    status: Option<ModuleStatus>,
    requires: Vec<String>,
    journal: Journal,
    behavior: Behavior,
}

impl FakeModule {
    fn new(name: &str, requires: &[&str], journal: &Journal, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            status: Some(ModuleStatus::new()),
            requires: requires.iter().map(|r| r.to_string()).collect(),
            journal: Arc::clone(journal),
            behavior,
        })
    }

    fn without_status(name: &str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            status: None,
            requires: Vec::new(),
            journal: Arc::clone(journal),
            behavior: Behavior::Silent,
        })
    }

    fn set(&self, status: Status) {
        if let Some(cell) = &self.status {
            cell.set(status);
        }
    }
}

#[async_trait]
impl Module for FakeModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> Option<&ModuleStatus> {
        self.status.as_ref()
    }

    async fn run(&self, ctx: CancellationToken) {
        self.journal.lock().unwrap().push(self.name.clone());
        match self.behavior {
            Behavior::Serve => {
                self.set(Status::Running);
                ctx.cancelled().await;
                self.set(Status::Stopped);
            }
            Behavior::Silent => ctx.cancelled().await,
            Behavior::Panic => panic!("{} refused to start", self.name),
            Behavior::PanicLater(delay) => {
                self.set(Status::Running);
                tokio::time::sleep(delay).await;
                panic!("{} crashed", self.name);
            }
            Behavior::SlowStop(delay) => {
                self.set(Status::Running);
                ctx.cancelled().await;
                tokio::time::sleep(delay).await;
                self.set(Status::Stopped);
            }
            Behavior::Finish => self.set(Status::Stopped),
        }
    }

    fn requires(&self) -> &[String] {
        &self.requires
    }
}

struct Recorder {
    events: Mutex<Vec<Event>>,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

impl Recorder {
    fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    fn find(&self, kind: EventKind) -> Option<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.kind == kind)
            .cloned()
    }
}

fn fast_config() -> ManagerConfig {
    ManagerConfig {
        ready_timeout: Duration::from_millis(200),
        ..ManagerConfig::default()
    }
}

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn spawn_serve(
    mgr: &Arc<Manager>,
    root: &CancellationToken,
) -> tokio::task::JoinHandle<Result<(), RuntimeError>> {
    let mgr = Arc::clone(mgr);
    let root = root.clone();
    tokio::spawn(async move { mgr.start_and_serve(root).await })
}

async fn wait_until_running(mgr: &Manager, names: &[&str]) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let mut all = true;
            for name in names {
                all &= mgr.status_of(name).await == Some(Status::Running);
            }
            if all {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("modules never reached running");
}

#[tokio::test]
async fn empty_manager_serves_and_completes_shutdown() {
    let mgr = Manager::builder(ManagerConfig::default()).build();
    let root = CancellationToken::new();
    let server = spawn_serve(&mgr, &root);

    let done = mgr.done(|| root.cancel()).await;
    tokio::time::timeout(Duration::from_secs(1), done)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(server.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn modules_start_in_dependency_order() {
    let log = journal();
    let mgr = Manager::builder(fast_config()).build();
    mgr.add_module("A", FakeModule::new("A", &["B", "C", "D"], &log, Behavior::Serve))
        .await;
    mgr.add_module("B", FakeModule::new("B", &["E"], &log, Behavior::Serve))
        .await;
    mgr.add_module("C", FakeModule::new("C", &["D"], &log, Behavior::Serve))
        .await;
    mgr.add_module("D", FakeModule::new("D", &[], &log, Behavior::Serve))
        .await;
    mgr.add_module("E", FakeModule::new("E", &["C"], &log, Behavior::Serve))
        .await;

    let root = CancellationToken::new();
    let server = spawn_serve(&mgr, &root);
    wait_until_running(&mgr, &["A", "B", "C", "D", "E"]).await;

    assert_eq!(*log.lock().unwrap(), vec!["D", "C", "E", "B", "A"]);

    let done = mgr.done(|| root.cancel()).await;
    done.await.unwrap();
    assert_eq!(server.await.unwrap(), Ok(()));
    for name in ["A", "B", "C", "D", "E"] {
        assert_eq!(mgr.status_of(name).await, Some(Status::Stopped));
    }
}

#[tokio::test]
async fn cyclic_dependencies_abort_startup() {
    let log = journal();
    let rec = Arc::new(Recorder {
        events: Mutex::new(Vec::new()),
    });
    let mgr = Manager::builder(fast_config())
        .with_subscriber(rec.clone())
        .build();
    mgr.add_module("A", FakeModule::new("A", &["B"], &log, Behavior::Serve))
        .await;
    mgr.add_module("B", FakeModule::new("B", &["A", "C"], &log, Behavior::Serve))
        .await;
    mgr.add_module("C", FakeModule::new("C", &[], &log, Behavior::Serve))
        .await;

    let err = mgr
        .start_and_serve(CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UnresolvedDependencies {
            modules: vec!["A".into(), "B".into()]
        }
    );
    assert!(log.lock().unwrap().is_empty(), "nothing may start");

    tokio::time::sleep(Duration::from_millis(50)).await;
    let unresolved = rec
        .kinds()
        .into_iter()
        .filter(|k| *k == EventKind::DependencyUnresolved)
        .count();
    assert_eq!(unresolved, 2);
}

#[tokio::test]
async fn independent_modules_all_start() {
    let log = journal();
    let mgr = Manager::builder(fast_config()).build();
    let names: Vec<String> = (0..8).map(|i| format!("worker-{i}")).collect();
    for name in &names {
        mgr.add_module(name.as_str(), FakeModule::new(name, &[], &log, Behavior::Serve))
            .await;
    }

    let root = CancellationToken::new();
    let server = spawn_serve(&mgr, &root);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    wait_until_running(&mgr, &refs).await;

    let mut started = log.lock().unwrap().clone();
    started.sort();
    assert_eq!(started, names);

    let done = mgr.done(|| root.cancel()).await;
    tokio::time::timeout(Duration::from_secs(1), done)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(server.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn silent_module_times_out() {
    let log = journal();
    let rec = Arc::new(Recorder {
        events: Mutex::new(Vec::new()),
    });
    let mgr = Manager::builder(fast_config())
        .with_subscriber(rec.clone())
        .build();
    mgr.add_module("db", FakeModule::new("db", &[], &log, Behavior::Serve))
        .await;
    mgr.add_module("slow", FakeModule::new("slow", &["db"], &log, Behavior::Silent))
        .await;
    mgr.add_module("api", FakeModule::new("api", &["slow"], &log, Behavior::Serve))
        .await;

    let err = mgr
        .start_and_serve(CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::StartupTimeout {
            module: "slow".into(),
            timeout: Duration::from_millis(200),
        }
    );
    assert_eq!(*log.lock().unwrap(), vec!["db", "slow"]);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let ev = rec.find(EventKind::StartupTimeout).unwrap();
    assert_eq!(ev.module.as_deref(), Some("slow"));
    assert_eq!(ev.timeout_ms, Some(200));
}

#[tokio::test]
async fn missing_status_aborts_startup() {
    let log = journal();
    let mgr = Manager::builder(fast_config()).build();
    mgr.add_module("ghost", FakeModule::without_status("ghost", &log))
        .await;

    let err = mgr
        .start_and_serve(CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::MissingStatus {
            module: "ghost".into()
        }
    );
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn panic_during_startup_is_fatal() {
    let log = journal();
    let mgr = Manager::builder(fast_config()).build();
    mgr.add_module("bad", FakeModule::new("bad", &[], &log, Behavior::Panic))
        .await;

    let err = mgr
        .start_and_serve(CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RuntimeError::ModulePanicked {
            module: "bad".into(),
            info: "bad refused to start".into(),
        }
    );
}

#[tokio::test]
async fn panic_after_startup_ends_serving() {
    let log = journal();
    let mgr = Manager::builder(fast_config()).build();
    mgr.add_module("ok", FakeModule::new("ok", &[], &log, Behavior::Serve))
        .await;
    mgr.add_module(
        "flaky",
        FakeModule::new(
            "flaky",
            &["ok"],
            &log,
            Behavior::PanicLater(Duration::from_millis(50)),
        ),
    )
    .await;

    let res = tokio::time::timeout(
        Duration::from_secs(2),
        mgr.start_and_serve(CancellationToken::new()),
    )
    .await
    .expect("panic must end serving");
    assert!(matches!(
        res,
        Err(RuntimeError::ModulePanicked { ref module, .. }) if module == "flaky"
    ));
}

#[tokio::test]
async fn done_waits_only_for_running_modules() {
    let log = journal();
    let rec = Arc::new(Recorder {
        events: Mutex::new(Vec::new()),
    });
    let mgr = Manager::builder(fast_config())
        .with_subscriber(rec.clone())
        .build();
    let lazy = FakeModule::new(
        "lazy",
        &[],
        &log,
        Behavior::SlowStop(Duration::from_millis(150)),
    );
    mgr.add_module("lazy", lazy).await;
    mgr.add_module("oneshot", FakeModule::new("oneshot", &[], &log, Behavior::Finish))
        .await;

    let root = CancellationToken::new();
    let server = spawn_serve(&mgr, &root);
    wait_until_running(&mgr, &["lazy"]).await;
    assert_eq!(mgr.status_of("oneshot").await, Some(Status::Stopped));

    let mut done = mgr.done(|| root.cancel()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(done.try_recv().is_err(), "lazy is still stopping");
    assert_eq!(mgr.status_of("lazy").await, Some(Status::Running));

    tokio::time::timeout(Duration::from_secs(1), done)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(mgr.status_of("lazy").await, Some(Status::Stopped));
    assert_eq!(server.await.unwrap(), Ok(()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    let requested = rec.find(EventKind::ShutdownRequested).unwrap();
    assert_eq!(requested.count, Some(1));
    let stopped = rec.find(EventKind::ModuleStopped).unwrap();
    assert_eq!(stopped.module.as_deref(), Some("lazy"));
    assert!(rec.kinds().contains(&EventKind::AllStopped));
}

#[tokio::test]
async fn restarting_cancels_previous_tokens() {
    let cancelled = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&cancelled);
    let module = ModuleFn::arc("svc", move |ctx: CancellationToken, status: Arc<ModuleStatus>| {
        let counter = Arc::clone(&counter);
        async move {
            status.set(Status::Running);
            ctx.cancelled().await;
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            status.set(Status::Stopped);
        }
    });

    let mgr = Manager::builder(fast_config()).build();
    mgr.add_module("svc", module).await;

    let first_root = CancellationToken::new();
    let first = spawn_serve(&mgr, &first_root);
    wait_until_running(&mgr, &["svc"]).await;

    let second_root = CancellationToken::new();
    let second = spawn_serve(&mgr, &second_root);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!first_root.is_cancelled());
    assert_eq!(cancelled.load(std::sync::atomic::Ordering::SeqCst), 1);

    first_root.cancel();
    second_root.cancel();
    assert_eq!(first.await.unwrap(), Ok(()));
    assert_eq!(second.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn readding_a_removed_module_cancels_its_stale_run() {
    let live = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&live);
    let module = ModuleFn::arc("svc", move |ctx: CancellationToken, status: Arc<ModuleStatus>| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            status.set(Status::Running);
            ctx.cancelled().await;
            counter.fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
            status.set(Status::Stopped);
        }
    });

    let mgr = Manager::builder(fast_config()).build();
    mgr.add_module("svc", module.clone()).await;

    let root = CancellationToken::new();
    let first = spawn_serve(&mgr, &root);
    wait_until_running(&mgr, &["svc"]).await;

    let removed = mgr.del_module("svc").await;
    assert!(removed.is_some());
    assert_eq!(
        live.load(std::sync::atomic::Ordering::SeqCst),
        1,
        "removal does not stop the module"
    );

    mgr.add_module("svc", module).await;
    let second = spawn_serve(&mgr, &root);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(live.load(std::sync::atomic::Ordering::SeqCst), 1);

    root.cancel();
    assert_eq!(first.await.unwrap(), Ok(()));
    assert_eq!(second.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn registry_add_and_delete() {
    let log = journal();
    let rec = Arc::new(Recorder {
        events: Mutex::new(Vec::new()),
    });
    let mgr = Manager::builder(fast_config())
        .with_subscriber(rec.clone())
        .build();

    mgr.add_module("b", FakeModule::new("b", &[], &log, Behavior::Serve))
        .await;
    mgr.add_module("a", FakeModule::new("a", &[], &log, Behavior::Serve))
        .await;
    assert_eq!(mgr.modules().await, vec!["a", "b"]);
    assert_eq!(mgr.status_of("a").await, Some(Status::Stopped));
    assert_eq!(mgr.status_of("zzz").await, None);

    let removed = mgr.del_module("a").await.unwrap();
    assert_eq!(removed.name(), "a");
    assert!(mgr.del_module("a").await.is_none());
    assert_eq!(mgr.modules().await, vec!["b"]);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let kinds = rec.kinds();
    assert_eq!(
        kinds
            .iter()
            .filter(|k| **k == EventKind::ModuleAdded)
            .count(),
        2
    );
    assert_eq!(
        kinds
            .iter()
            .filter(|k| **k == EventKind::ModuleRemoved)
            .count(),
        1
    );
}

#[tokio::test]
async fn unknown_dependency_is_unresolved() {
    let log = journal();
    let mgr = Manager::builder(fast_config()).build();
    mgr.add_module("api", FakeModule::new("api", &["db"], &log, Behavior::Serve))
        .await;

    let err = mgr
        .start_and_serve(CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.as_label(), "runtime_unresolved_dependencies");
    assert_eq!(
        err,
        RuntimeError::UnresolvedDependencies {
            modules: vec!["api".into()]
        }
    );
}
