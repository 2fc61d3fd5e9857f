//! Staff task board with per-task checklists.

use chrono::Utc;
use log::info;
use shared::{
    ChecklistItem, CreateTaskRequest, Staff, Task, TaskListQuery, TaskStatus, TaskView,
    UpdateTaskRequest,
};
use uuid::Uuid;

use crate::domain::error::{require_text, DomainError, DomainResult};
use crate::storage::{CollectionRepository, StoreConnection};

const UNASSIGNED: &str = "Unassigned";
const UNKNOWN_ASSIGNEE: &str = "Unknown";

/// Display name for a task's assignee
///
/// Assignee ids are not validated on write, so a deleted staff member
/// resolves to "Unknown" instead of failing the listing.
pub fn assignee_name(task: &Task, staff: &[Staff]) -> String {
    match &task.assigned_to {
        None => UNASSIGNED.to_string(),
        Some(id) => staff
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| UNKNOWN_ASSIGNEE.to_string()),
    }
}

fn find_task<'a>(tasks: &'a mut [Task], id: &str) -> DomainResult<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| DomainError::not_found("Task", id))
}

fn normalize_assignee(assigned_to: Option<String>) -> Option<String> {
    assigned_to
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

#[derive(Clone)]
pub struct TaskService {
    tasks: CollectionRepository<Task>,
    staff: CollectionRepository<Staff>,
}

impl TaskService {
    pub fn new(connection: &StoreConnection) -> Self {
        Self {
            tasks: connection.repository(),
            staff: connection.repository(),
        }
    }

    pub async fn create_task(&self, request: CreateTaskRequest) -> DomainResult<Task> {
        let checklist = request
            .checklist
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .map(|text| ChecklistItem {
                id: Uuid::new_v4().to_string(),
                text: text.to_string(),
                done: false,
            })
            .collect();

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: require_text("Title", &request.title)?,
            description: request.description.trim().to_string(),
            assigned_to: normalize_assignee(request.assigned_to),
            status: TaskStatus::Pending,
            checklist,
            priority: request.priority,
            created_at: Utc::now(),
            completed_at: None,
        };
        let task = self.tasks.insert(task).await?;
        info!("Created task '{}' ({:?})", task.title, task.priority);
        Ok(task)
    }

    /// Pending tasks first, then by priority (high first), then oldest first
    pub async fn list_tasks(&self, query: &TaskListQuery) -> DomainResult<Vec<TaskView>> {
        let staff = self.staff.load_all().await?;
        let mut tasks: Vec<Task> = self
            .tasks
            .load_all()
            .await?
            .into_iter()
            .filter(|t| {
                query
                    .assigned_to
                    .as_ref()
                    .map_or(true, |id| t.assigned_to.as_ref() == Some(id))
            })
            .filter(|t| query.status.map_or(true, |status| t.status == status))
            .collect();

        tasks.sort_by(|a, b| {
            (a.status == TaskStatus::Completed)
                .cmp(&(b.status == TaskStatus::Completed))
                .then(b.priority.cmp(&a.priority))
                .then(a.created_at.cmp(&b.created_at))
        });

        Ok(tasks
            .into_iter()
            .map(|task| TaskView {
                assignee_name: assignee_name(&task, &staff),
                task,
            })
            .collect())
    }

    pub async fn get_task(&self, id: &str) -> DomainResult<TaskView> {
        let task = self
            .tasks
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Task", id))?;
        let staff = self.staff.load_all().await?;
        Ok(TaskView {
            assignee_name: assignee_name(&task, &staff),
            task,
        })
    }

    pub async fn update_task(&self, id: &str, request: UpdateTaskRequest) -> DomainResult<Task> {
        self.tasks
            .mutate(|tasks| {
                let task = find_task(tasks, id)?;
                if let Some(title) = request.title {
                    task.title = require_text("Title", &title)?;
                }
                if let Some(description) = request.description {
                    task.description = description.trim().to_string();
                }
                if request.assigned_to.is_some() {
                    task.assigned_to = normalize_assignee(request.assigned_to);
                }
                if let Some(priority) = request.priority {
                    task.priority = priority;
                }
                Ok(task.clone())
            })
            .await
    }

    pub async fn delete_task(&self, id: &str) -> DomainResult<()> {
        if !self.tasks.delete(id).await? {
            return Err(DomainError::not_found("Task", id));
        }
        Ok(())
    }

    /// Mark a task completed; completing a completed task changes nothing
    pub async fn complete(&self, id: &str) -> DomainResult<Task> {
        self.tasks
            .mutate(|tasks| {
                let task = find_task(tasks, id)?;
                if task.status == TaskStatus::Pending {
                    task.status = TaskStatus::Completed;
                    task.completed_at = Some(Utc::now());
                    info!("Completed task '{}'", task.title);
                }
                Ok(task.clone())
            })
            .await
    }

    pub async fn reopen(&self, id: &str) -> DomainResult<Task> {
        self.tasks
            .mutate(|tasks| {
                let task = find_task(tasks, id)?;
                task.status = TaskStatus::Pending;
                task.completed_at = None;
                Ok(task.clone())
            })
            .await
    }

    pub async fn toggle_checklist_item(&self, task_id: &str, item_id: &str) -> DomainResult<Task> {
        self.tasks
            .mutate(|tasks| {
                let task = find_task(tasks, task_id)?;
                let item = task
                    .checklist
                    .iter_mut()
                    .find(|i| i.id == item_id)
                    .ok_or_else(|| DomainError::not_found("Checklist item", item_id))?;
                item.done = !item.done;
                Ok(task.clone())
            })
            .await
    }
}
