use super::api_routes::{expect_success, AccessToken, ApiRoutes};
use super::dispatcher::OfflineDispatcher;
use super::entity_store::EntityStore;
use crate::domain::entities::offline::{DispatchOutcome, HttpRequest};
use crate::domain::entities::{Task, TaskDraft};
use crate::domain::value_objects::{HttpMethod, LocalId};
use crate::shared::error::AppError;
use std::sync::Arc;

/// Tasks are nested under their project in every backend route.
pub struct TaskService {
    dispatcher: Arc<OfflineDispatcher>,
    tasks: Arc<EntityStore<Task>>,
    routes: ApiRoutes,
}

impl TaskService {
    pub fn new(
        dispatcher: Arc<OfflineDispatcher>,
        tasks: Arc<EntityStore<Task>>,
        routes: ApiRoutes,
    ) -> Self {
        Self {
            dispatcher,
            tasks,
            routes,
        }
    }

    pub fn store(&self) -> &Arc<EntityStore<Task>> {
        &self.tasks
    }

    pub async fn create(
        &self,
        token: &AccessToken,
        project_id: &str,
        draft: TaskDraft,
    ) -> Result<Task, AppError> {
        draft.validate().map_err(AppError::ValidationError)?;
        let local_id = LocalId::generate();
        let request = HttpRequest::new(HttpMethod::Post, self.routes.tasks(project_id)?, token.headers())
            .with_json(&draft)?;

        match self.dispatcher.dispatch(request, Some(local_id.clone())).await? {
            DispatchOutcome::Delivered(response) => {
                let mut task: Task = expect_success(response)?.json()?;
                if task.project_id.is_none() {
                    task.project_id = Some(project_id.to_string());
                }
                self.tasks.upsert(task.clone()).await?;
                Ok(task)
            }
            DispatchOutcome::AcceptedOffline(_) => {
                let task = Task::from_draft(local_id.into(), project_id, &draft);
                self.tasks.insert_provisional(task.clone()).await?;
                Ok(task)
            }
        }
    }

    pub async fn update(
        &self,
        token: &AccessToken,
        project_id: &str,
        task_id: &str,
        draft: TaskDraft,
    ) -> Result<Task, AppError> {
        draft.validate().map_err(AppError::ValidationError)?;
        let request = HttpRequest::new(
            HttpMethod::Put,
            self.routes.task(project_id, task_id)?,
            token.headers(),
        )
        .with_json(&draft)?;

        if let DispatchOutcome::Delivered(response) = self.dispatcher.dispatch(request, None).await? {
            let response = expect_success(response)?;
            if let Ok(mut task) = response.json::<Task>() {
                if task.project_id.is_none() {
                    task.project_id = Some(project_id.to_string());
                }
                self.tasks.upsert(task.clone()).await?;
                return Ok(task);
            }
        }

        self.tasks.update(task_id, |task| task.apply(&draft)).await?;
        self.tasks
            .get(task_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("task {task_id}")))
    }

    pub async fn delete(
        &self,
        token: &AccessToken,
        project_id: &str,
        task_id: &str,
    ) -> Result<(), AppError> {
        let request = HttpRequest::new(
            HttpMethod::Delete,
            self.routes.task(project_id, task_id)?,
            token.headers(),
        );
        if let DispatchOutcome::Delivered(response) = self.dispatcher.dispatch(request, None).await? {
            expect_success(response)?;
        }
        self.tasks.remove(task_id).await?;
        Ok(())
    }

    /// Tasks of one project. Cached tasks are served when the backend is unreachable.
    pub async fn list(&self, token: &AccessToken, project_id: &str) -> Result<Vec<Task>, AppError> {
        let request = HttpRequest::get(self.routes.tasks(project_id)?, token.headers());
        match self.dispatcher.dispatch(request, None).await {
            Ok(outcome) => {
                let mut fresh: Vec<Task> = expect_success(outcome.into_response())?.json()?;
                for task in &mut fresh {
                    if task.project_id.is_none() {
                        task.project_id = Some(project_id.to_string());
                    }
                }
                self.tasks
                    .replace_confirmed_matching(fresh, |task| {
                        task.project_id.as_deref() == Some(project_id)
                    })
                    .await?;
            }
            Err(err) if err.is_network() => {
                tracing::warn!(
                    target: "offline::tasks",
                    project_id,
                    error = %err,
                    "task list unavailable; serving cached tasks"
                );
            }
            Err(err) => return Err(err),
        }
        Ok(self
            .tasks
            .all()
            .await
            .into_iter()
            .filter(|task| task.project_id.as_deref() == Some(project_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ConnectivityProbe, HttpTransport, OfflineRequestStore};
    use crate::domain::entities::offline::HttpResponse;
    use crate::infrastructure::offline::InMemoryOfflineRequestStore;
    use async_trait::async_trait;

    struct Online(bool);

    impl ConnectivityProbe for Online {
        fn is_online(&self) -> bool {
            self.0
        }
    }

    struct TaskBackend;

    #[async_trait]
    impl HttpTransport for TaskBackend {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AppError> {
            match request.method {
                HttpMethod::Get => Ok(HttpResponse::new(
                    200,
                    r#"[{"id":1,"name":"Review"},{"id":2,"name":"Ship"}]"#,
                )),
                HttpMethod::Post => Ok(HttpResponse::new(201, r#"{"id":9,"name":"Draft report"}"#)),
                _ => Ok(HttpResponse::new(200, "")),
            }
        }
    }

    fn service(online: bool) -> (TaskService, Arc<InMemoryOfflineRequestStore>) {
        let queue = Arc::new(InMemoryOfflineRequestStore::new());
        let dispatcher = Arc::new(OfflineDispatcher::new(
            queue.clone(),
            Arc::new(TaskBackend),
            Arc::new(Online(online)),
        ));
        let service = TaskService::new(
            dispatcher,
            Arc::new(EntityStore::new()),
            ApiRoutes::new("https://api.example.com"),
        );
        (service, queue)
    }

    fn draft() -> TaskDraft {
        TaskDraft {
            name: "Draft report".into(),
            status: "pending".into(),
            priority: "low".into(),
            ..TaskDraft::default()
        }
    }

    #[tokio::test]
    async fn offline_create_queues_post_with_local_id() {
        let (service, queue) = service(false);
        let task = service.create(&AccessToken::new("t"), "3", draft()).await.unwrap();

        assert!(task.id.starts_with("temp-"));
        assert_eq!(task.project_id.as_deref(), Some("3"));
        let queued = queue.list_all().await.unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].method, HttpMethod::Post);
        assert_eq!(queued[0].url.path(), "/projects/3/tasks");
        assert_eq!(queued[0].local_id.as_ref().map(|l| l.to_string()), Some(task.id));
    }

    #[tokio::test]
    async fn offline_delete_removes_locally() {
        let (service, queue) = service(false);
        let token = AccessToken::new("t");
        let task = service.create(&token, "3", draft()).await.unwrap();

        service.delete(&token, "3", &task.id).await.unwrap();

        assert!(service.store().is_empty().await);
        assert_eq!(queue.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_scopes_refresh_to_project() {
        let (service, _queue) = service(true);
        service
            .store()
            .upsert(Task::from_draft("77".into(), "4", &draft()))
            .await
            .unwrap();

        let tasks = service.list(&AccessToken::new("t"), "3").await.unwrap();

        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.project_id.as_deref() == Some("3")));
        assert_eq!(service.store().len().await, 3);
    }
}
