use super::api_routes::CreateRoute;
use super::entity_store::EntityStore;
use crate::application::ports::ProvisionalReconciler;
use crate::domain::entities::offline::{HttpResponse, QueuedRequest};
use crate::domain::entities::{Project, Task};
use crate::domain::value_objects::LocalId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves provisional projects and tasks once their queued creation is
/// replayed or abandoned.
pub struct ReconcilerRegistry {
    projects: Arc<EntityStore<Project>>,
    tasks: Arc<EntityStore<Task>>,
}

impl ReconcilerRegistry {
    pub fn new(projects: Arc<EntityStore<Project>>, tasks: Arc<EntityStore<Task>>) -> Self {
        Self { projects, tasks }
    }

    async fn confirm_project(
        &self,
        local_id: &LocalId,
        response: &HttpResponse,
    ) -> Result<Option<String>, AppError> {
        let project: Project = response.json()?;
        let server_id = project.id.clone();
        self.projects
            .replace_provisional(local_id.as_str(), project)
            .await?;

        // Tasks created under the provisional project follow it.
        for task in self.tasks.all().await {
            if task.project_id.as_deref() == Some(local_id.as_str()) {
                let server_id = server_id.clone();
                self.tasks
                    .update(&task.id, move |t| t.project_id = Some(server_id))
                    .await?;
            }
        }
        Ok(Some(server_id))
    }

    async fn confirm_task(
        &self,
        local_id: &LocalId,
        project_id: String,
        response: &HttpResponse,
    ) -> Result<Option<String>, AppError> {
        let mut task: Task = response.json()?;
        if task.project_id.is_none() {
            task.project_id = Some(project_id);
        }
        let server_id = task.id.clone();
        self.tasks.replace_provisional(local_id.as_str(), task).await?;
        Ok(Some(server_id))
    }
}

#[async_trait]
impl ProvisionalReconciler for ReconcilerRegistry {
    async fn confirm(
        &self,
        request: &QueuedRequest,
        response: &HttpResponse,
    ) -> Result<Option<String>, AppError> {
        let Some(local_id) = &request.local_id else {
            return Ok(None);
        };
        match CreateRoute::from_path(request.url.path()) {
            Some(CreateRoute::Projects) => self.confirm_project(local_id, response).await,
            Some(CreateRoute::ProjectTasks { project_id }) => {
                self.confirm_task(local_id, project_id, response).await
            }
            None => {
                tracing::debug!(
                    target: "offline::reconciler",
                    url = %request.url,
                    "no collection registered for confirmed create"
                );
                Ok(None)
            }
        }
    }

    async fn abandon(&self, local_id: &LocalId) -> Result<bool, AppError> {
        if self.projects.remove_provisional(local_id.as_str()).await? {
            return Ok(true);
        }
        self.tasks.remove_provisional(local_id.as_str()).await
    }
}
