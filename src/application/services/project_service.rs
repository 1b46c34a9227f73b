use super::api_routes::{expect_success, AccessToken, ApiRoutes};
use super::dispatcher::OfflineDispatcher;
use super::entity_store::EntityStore;
use crate::domain::entities::offline::{DispatchOutcome, HttpRequest};
use crate::domain::entities::{Project, ProjectDraft};
use crate::domain::value_objects::{HttpMethod, LocalId};
use crate::shared::error::AppError;
use std::sync::Arc;

pub struct ProjectService {
    dispatcher: Arc<OfflineDispatcher>,
    projects: Arc<EntityStore<Project>>,
    routes: ApiRoutes,
}

impl ProjectService {
    pub fn new(
        dispatcher: Arc<OfflineDispatcher>,
        projects: Arc<EntityStore<Project>>,
        routes: ApiRoutes,
    ) -> Self {
        Self {
            dispatcher,
            projects,
            routes,
        }
    }

    pub fn store(&self) -> &Arc<EntityStore<Project>> {
        &self.projects
    }

    /// Creates a project. While offline the returned project carries a
    /// temporary id until the queued creation is replayed.
    pub async fn create(&self, token: &AccessToken, draft: ProjectDraft) -> Result<Project, AppError> {
        draft.validate().map_err(AppError::ValidationError)?;
        let local_id = LocalId::generate();
        let request =
            HttpRequest::new(HttpMethod::Post, self.routes.projects()?, token.headers()).with_json(&draft)?;

        match self.dispatcher.dispatch(request, Some(local_id.clone())).await? {
            DispatchOutcome::Delivered(response) => {
                let project: Project = expect_success(response)?.json()?;
                self.projects.upsert(project.clone()).await?;
                Ok(project)
            }
            DispatchOutcome::AcceptedOffline(_) => {
                let project = Project::from_draft(local_id.into(), &draft);
                self.projects.insert_provisional(project.clone()).await?;
                Ok(project)
            }
        }
    }

    pub async fn update(
        &self,
        token: &AccessToken,
        project_id: &str,
        draft: ProjectDraft,
    ) -> Result<Project, AppError> {
        draft.validate().map_err(AppError::ValidationError)?;
        let request = HttpRequest::new(HttpMethod::Put, self.routes.project(project_id)?, token.headers())
            .with_json(&draft)?;

        if let DispatchOutcome::Delivered(response) = self.dispatcher.dispatch(request, None).await? {
            let response = expect_success(response)?;
            if let Ok(project) = response.json::<Project>() {
                self.projects.upsert(project.clone()).await?;
                return Ok(project);
            }
        }

        self.projects
            .update(project_id, |project| project.apply(&draft))
            .await?;
        self.projects
            .get(project_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("project {project_id}")))
    }

    pub async fn delete(&self, token: &AccessToken, project_id: &str) -> Result<(), AppError> {
        let request = HttpRequest::new(
            HttpMethod::Delete,
            self.routes.project(project_id)?,
            token.headers(),
        );
        if let DispatchOutcome::Delivered(response) = self.dispatcher.dispatch(request, None).await? {
            expect_success(response)?;
        }
        self.projects.remove(project_id).await?;
        Ok(())
    }

    /// Fetches the project list, falling back to the cached collection when
    /// the backend cannot be reached.
    pub async fn list(&self, token: &AccessToken) -> Result<Vec<Project>, AppError> {
        let request = HttpRequest::get(self.routes.projects()?, token.headers());
        match self.dispatcher.dispatch(request, None).await {
            Ok(outcome) => {
                let fresh: Vec<Project> = expect_success(outcome.into_response())?.json()?;
                self.projects.replace_confirmed(fresh).await?;
            }
            Err(err) if err.is_network() => {
                tracing::warn!(
                    target: "offline::projects",
                    error = %err,
                    "project list unavailable; serving cached projects"
                );
            }
            Err(err) => return Err(err),
        }
        Ok(self.projects.all().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ConnectivityProbe, HttpTransport, OfflineRequestStore};
    use crate::domain::entities::offline::HttpResponse;
    use crate::infrastructure::offline::InMemoryOfflineRequestStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Toggle(AtomicBool);

    impl ConnectivityProbe for Toggle {
        fn is_online(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct EchoTransport {
        reachable: bool,
    }

    #[async_trait]
    impl HttpTransport for EchoTransport {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, AppError> {
            if !self.reachable {
                return Err(AppError::Network("unreachable".into()));
            }
            match request.method {
                HttpMethod::Get => Ok(HttpResponse::new(200, r#"[{"id":1,"name":"Server"}]"#)),
                HttpMethod::Post => Ok(HttpResponse::new(201, r#"{"id":5,"name":"Roadmap"}"#)),
                _ => Ok(HttpResponse::new(204, "")),
            }
        }
    }

    fn service(online: bool, reachable: bool) -> (ProjectService, Arc<InMemoryOfflineRequestStore>) {
        let queue = Arc::new(InMemoryOfflineRequestStore::new());
        let dispatcher = Arc::new(OfflineDispatcher::new(
            queue.clone(),
            Arc::new(EchoTransport { reachable }),
            Arc::new(Toggle(AtomicBool::new(online))),
        ));
        let service = ProjectService::new(
            dispatcher,
            Arc::new(EntityStore::new()),
            ApiRoutes::new("https://api.example.com"),
        );
        (service, queue)
    }

    fn draft(name: &str) -> ProjectDraft {
        ProjectDraft {
            name: name.into(),
            ..ProjectDraft::default()
        }
    }

    #[tokio::test]
    async fn online_create_stores_server_project() {
        let (service, queue) = service(true, true);
        let project = service
            .create(&AccessToken::new("t"), draft("Roadmap"))
            .await
            .unwrap();
        assert_eq!(project.id, "5");
        assert_eq!(service.store().len().await, 1);
        assert_eq!(queue.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn offline_create_and_update_stay_local() {
        let (service, queue) = service(false, false);
        let token = AccessToken::new("t");
        let project = service.create(&token, draft("Roadmap")).await.unwrap();
        assert!(project.id.starts_with("temp-"));

        let renamed = service
            .update(&token, &project.id, draft("Roadmap v2"))
            .await
            .unwrap();

        assert_eq!(renamed.id, project.id);
        assert_eq!(renamed.name, "Roadmap v2");
        assert_eq!(queue.count().await.unwrap(), 2);
        let queued = queue.list_all().await.unwrap();
        assert_eq!(queued[0].local_id.as_ref().map(|l| l.as_str()), Some(project.id.as_str()));
        assert!(queued[1].url.as_str().ends_with(&project.id));
    }

    #[tokio::test]
    async fn list_falls_back_to_cache_when_unreachable() {
        let (service, _queue) = service(false, false);
        let token = AccessToken::new("t");
        service.create(&token, draft("Offline")).await.unwrap();

        let projects = service.list(&token).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Offline");
    }

    #[tokio::test]
    async fn empty_name_is_rejected_before_dispatch() {
        let (service, queue) = service(false, false);
        let result = service.create(&AccessToken::new("t"), draft("  ")).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert_eq!(queue.count().await.unwrap(), 0);
    }
}
