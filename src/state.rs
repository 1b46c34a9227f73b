use crate::application::ports::{
    ConnectivityProbe, HttpTransport, LocalStateStore, OfflineNotifier, OfflineRequestStore,
    ProvisionalReconciler,
};
use crate::application::services::{
    ApiRoutes, EntityStore, ExpirySweeper, MessageRouter, OfflineDispatcher, ProjectService,
    ReconcilerRegistry, ReplayEngine, SweeperHandle, TaskService, VersionTracker,
};
use crate::domain::entities::offline::ContextMessage;
use crate::domain::entities::{Project, Task};
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::network::{NetworkMonitor, ReqwestTransport};
use crate::infrastructure::notification::{ChannelNotifier, TracingNotifier};
use crate::infrastructure::offline::{SqliteLocalStateStore, SqliteOfflineRequestStore};
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;

const CONTEXT_BUS_CAPACITY: usize = 64;

/// Every component of the offline subsystem, wired from configuration.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub pool: ConnectionPool,
    pub queue: Arc<SqliteOfflineRequestStore>,
    pub transport: Arc<dyn HttpTransport>,
    pub network: Arc<NetworkMonitor>,
    pub bus: broadcast::Sender<ContextMessage>,
    pub projects: Arc<EntityStore<Project>>,
    pub tasks: Arc<EntityStore<Task>>,
    pub dispatcher: Arc<OfflineDispatcher>,
    pub sweeper: Arc<ExpirySweeper>,
    pub replay: Arc<ReplayEngine>,
    pub router: Arc<MessageRouter>,
    pub versions: Arc<VersionTracker>,
    pub project_service: Arc<ProjectService>,
    pub task_service: Arc<TaskService>,
    background: Arc<Mutex<Option<Background>>>,
}

struct Background {
    shutdown_tx: watch::Sender<bool>,
    sweeper: SweeperHandle,
    tasks: Vec<JoinHandle<()>>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let pool = ConnectionPool::from_config(&config.database).await?;
        pool.migrate().await?;
        let transport = Arc::new(ReqwestTransport::from_config(&config.api)?);

        Self::assemble(config, pool, transport, false).await
    }

    /// Wires the components over an existing pool and transport. The pool must be migrated.
    pub async fn assemble(
        config: AppConfig,
        pool: ConnectionPool,
        transport: Arc<dyn HttpTransport>,
        initially_online: bool,
    ) -> anyhow::Result<Self> {
        let queue = Arc::new(SqliteOfflineRequestStore::new(pool.clone()));
        let local_state: Arc<dyn LocalStateStore> = Arc::new(SqliteLocalStateStore::new(pool.clone()));
        let network = Arc::new(NetworkMonitor::new(
            initially_online,
            config.offline.connectivity_window(),
        ));

        let (bus, _) = broadcast::channel(CONTEXT_BUS_CAPACITY);
        let page_alerts: Arc<dyn OfflineNotifier> = Arc::new(TracingNotifier);
        let notifier: Arc<dyn OfflineNotifier> =
            Arc::new(ChannelNotifier::new(bus.clone()).with_fallback(page_alerts.clone()));

        let projects = Arc::new(EntityStore::<Project>::persistent(local_state.clone()));
        let tasks = Arc::new(EntityStore::<Task>::persistent(local_state.clone()));
        projects.hydrate().await?;
        tasks.hydrate().await?;
        let reconciler: Arc<dyn ProvisionalReconciler> =
            Arc::new(ReconcilerRegistry::new(projects.clone(), tasks.clone()));

        let store: Arc<dyn OfflineRequestStore> = queue.clone();
        let connectivity: Arc<dyn ConnectivityProbe> = network.clone();
        let ttl = config.offline.request_ttl();

        let dispatcher = Arc::new(OfflineDispatcher::new(
            store.clone(),
            transport.clone(),
            connectivity.clone(),
        ));
        let sweeper = Arc::new(
            ExpirySweeper::new(store.clone(), notifier.clone(), ttl).with_reconciler(reconciler.clone()),
        );
        let replay = Arc::new(
            ReplayEngine::new(store, transport.clone(), notifier.clone(), ttl)
                .with_reconciler(reconciler)
                .with_connectivity(connectivity)
                .with_id_map_store(local_state.clone()),
        );
        replay.restore_id_map().await?;
        let router = Arc::new(MessageRouter::new(replay.clone(), page_alerts));
        let versions = Arc::new(VersionTracker::new(local_state, notifier));

        let routes = ApiRoutes::new(config.api.base_url.clone());
        let project_service = Arc::new(ProjectService::new(
            dispatcher.clone(),
            projects.clone(),
            routes.clone(),
        ));
        let task_service = Arc::new(TaskService::new(dispatcher.clone(), tasks.clone(), routes));

        Ok(Self {
            config,
            pool,
            queue,
            transport,
            network,
            bus,
            projects,
            tasks,
            dispatcher,
            sweeper,
            replay,
            router,
            versions,
            project_service,
            task_service,
            background: Arc::new(Mutex::new(None)),
        })
    }

    /// Starts the sweeper loop, the message router and the reconnect watcher.
    /// Calling it again while running is a no-op.
    pub async fn start(&self) -> anyhow::Result<()> {
        let mut background = self.background.lock().await;
        if background.is_some() {
            return Ok(());
        }

        if let Some(version) = &self.config.app_version {
            self.versions.announce(version).await?;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sweeper = self
            .sweeper
            .clone()
            .spawn(self.config.offline.sweep_interval());
        let router = self
            .router
            .clone()
            .spawn(self.bus.subscribe(), shutdown_rx.clone());
        let watcher = spawn_reconnect_watcher(
            self.replay.clone(),
            self.network.subscribe(),
            shutdown_rx,
        );

        if self.network.is_online() {
            self.replay.trigger();
        }

        *background = Some(Background {
            shutdown_tx,
            sweeper,
            tasks: vec![router, watcher],
        });
        tracing::info!(target: "offline::state", "offline subsystem started");
        Ok(())
    }

    /// Asks the background side for a replay pass, the way the page side does.
    pub fn request_sync(&self) -> Result<(), AppError> {
        self.bus
            .send(ContextMessage::SyncRequests)
            .map(|_| ())
            .map_err(|_| AppError::Internal("no background listener for sync requests".into()))
    }

    pub async fn shutdown(&self) {
        let Some(background) = self.background.lock().await.take() else {
            return;
        };
        let _ = background.shutdown_tx.send(true);
        for result in join_all(background.tasks).await {
            if let Err(err) = result {
                tracing::warn!(target: "offline::state", error = %err, "background task ended abnormally");
            }
        }
        background.sweeper.shutdown().await;
        tracing::info!(target: "offline::state", "offline subsystem stopped");
    }

    pub async fn close(&self) {
        self.shutdown().await;
        self.pool.close().await;
    }
}

/// Runs a replay pass on every offline-to-online transition.
fn spawn_reconnect_watcher(
    replay: Arc<ReplayEngine>,
    mut online: watch::Receiver<bool>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut was_online = *online.borrow_and_update();
        loop {
            tokio::select! {
                changed = online.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let now_online = *online.borrow_and_update();
                    if now_online && !was_online {
                        tracing::info!(target: "offline::state", "connectivity restored; replaying queued requests");
                        if let Err(err) = replay.run_pass().await {
                            tracing::error!(target: "offline::state", error = %err, "replay after reconnect failed");
                        }
                    }
                    was_online = now_online;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    })
}
