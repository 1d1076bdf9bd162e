//! Per-view cached state for presentation code.
//!
//! Each view owns its snapshot of one backend collection; nothing is shared
//! between views, so two views of the same collection can diverge until each
//! refreshes. Mutations go to the server first and are followed by a
//! re-fetch, never applied locally. Failures are stored on the view as a
//! `ViewError` and also returned to the caller.

use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::{ClientError, ErrorCode};
use crate::http::Transport;
use crate::resources::time::ListEntriesParams;
use crate::resources::{categories, projects, time};
use crate::tree::{build_tree, CategoryNode};
use crate::types::{Category, CategoryInput, Project, ProjectInput, TimeEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// What a view remembers about the last failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewError {
    pub message: String,
    pub code: Option<String>,
    pub request_id: Option<String>,
}

impl ViewError {
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code.as_deref().map(ErrorCode::parse)
    }
}

impl From<&ClientError> for ViewError {
    fn from(err: &ClientError) -> Self {
        match err.as_api() {
            Some(api) => ViewError {
                message: api.message.clone(),
                code: api.code.clone(),
                request_id: api.request_id.clone(),
            },
            None => ViewError {
                message: err.to_string(),
                code: None,
                request_id: None,
            },
        }
    }
}

/// Status, last good data and last error of one fetched resource.
#[derive(Debug, Clone, Default)]
pub struct Loadable<T> {
    status: LoadStatus,
    data: T,
    error: Option<ViewError>,
}

impl<T> Loadable<T> {
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn error(&self) -> Option<&ViewError> {
        self.error.as_ref()
    }

    fn begin(&mut self) {
        self.status = LoadStatus::Loading;
        self.error = None;
    }

    fn settle(&mut self, result: Result<T, ClientError>) -> Result<(), ViewError> {
        match result {
            Ok(data) => {
                self.data = data;
                self.status = LoadStatus::Success;
                Ok(())
            }
            Err(err) => Err(self.fail(&err)),
        }
    }

    /// Records a failure; the previously loaded data is kept.
    fn fail(&mut self, err: &ClientError) -> ViewError {
        let view_error = ViewError::from(err);
        self.error = Some(view_error.clone());
        self.status = LoadStatus::Error;
        view_error
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectsView {
    state: Loadable<Vec<Project>>,
}

impl ProjectsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Loadable<Vec<Project>> {
        &self.state
    }

    pub fn projects(&self) -> &[Project] {
        self.state.data()
    }

    pub fn refresh<T: Transport>(&mut self, client: &ApiClient, transport: &T) -> Result<(), ViewError> {
        self.state.begin();
        let result = client.call(transport, projects::list());
        self.state.settle(result)
    }

    pub fn create<T: Transport>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        input: &ProjectInput,
    ) -> Result<(), ViewError> {
        self.state.error = None;
        let result = projects::create(input).and_then(|ep| client.call(transport, ep));
        self.after_mutation(client, transport, result.map(drop))
    }

    pub fn update<T: Transport>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        project_id: Uuid,
        input: &ProjectInput,
    ) -> Result<(), ViewError> {
        self.state.error = None;
        let result = projects::update(project_id, input).and_then(|ep| client.call(transport, ep));
        self.after_mutation(client, transport, result.map(drop))
    }

    pub fn remove<T: Transport>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        project_id: Uuid,
    ) -> Result<(), ViewError> {
        self.state.error = None;
        let result = client.call(transport, projects::delete(project_id));
        self.after_mutation(client, transport, result)
    }

    fn after_mutation<T: Transport>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        result: Result<(), ClientError>,
    ) -> Result<(), ViewError> {
        match result {
            Ok(()) => self.refresh(client, transport),
            Err(err) => Err(self.state.fail(&err)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoriesView {
    project_id: Uuid,
    state: Loadable<Vec<Category>>,
}

impl CategoriesView {
    pub fn new(project_id: Uuid) -> Self {
        Self {
            project_id,
            state: Loadable::default(),
        }
    }

    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    pub fn state(&self) -> &Loadable<Vec<Category>> {
        &self.state
    }

    pub fn categories(&self) -> &[Category] {
        self.state.data()
    }

    /// Rebuilt from the cached list on every call.
    pub fn tree(&self) -> Vec<CategoryNode> {
        build_tree(self.state.data())
    }

    pub fn refresh<T: Transport>(&mut self, client: &ApiClient, transport: &T) -> Result<(), ViewError> {
        self.state.begin();
        let result = client.call(transport, categories::list(self.project_id));
        self.state.settle(result)
    }

    pub fn create<T: Transport>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        input: &CategoryInput,
    ) -> Result<(), ViewError> {
        self.state.error = None;
        let result =
            categories::create(self.project_id, input).and_then(|ep| client.call(transport, ep));
        self.after_mutation(client, transport, result.map(drop))
    }

    pub fn update<T: Transport>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        category_id: Uuid,
        input: &CategoryInput,
    ) -> Result<(), ViewError> {
        self.state.error = None;
        let result = categories::update(self.project_id, category_id, input)
            .and_then(|ep| client.call(transport, ep));
        self.after_mutation(client, transport, result.map(drop))
    }

    pub fn remove<T: Transport>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        category_id: Uuid,
    ) -> Result<(), ViewError> {
        self.state.error = None;
        let result = client.call(transport, categories::delete(self.project_id, category_id));
        self.after_mutation(client, transport, result)
    }

    fn after_mutation<T: Transport>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        result: Result<(), ClientError>,
    ) -> Result<(), ViewError> {
        match result {
            Ok(()) => self.refresh(client, transport),
            Err(err) => Err(self.state.fail(&err)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActiveTimerView {
    state: Loadable<Option<TimeEntry>>,
}

impl ActiveTimerView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Loadable<Option<TimeEntry>> {
        &self.state
    }

    pub fn active(&self) -> Option<&TimeEntry> {
        self.state.data().as_ref()
    }

    pub fn refresh<T: Transport>(&mut self, client: &ApiClient, transport: &T) -> Result<(), ViewError> {
        self.state.begin();
        let result = client.call(transport, time::active());
        self.state.settle(result)
    }

    /// The server stops any running timer first; re-fetching reconciles.
    pub fn start<T: Transport>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        category_id: Uuid,
    ) -> Result<(), ViewError> {
        self.state.error = None;
        match time::start(category_id).and_then(|ep| client.call(transport, ep)) {
            Ok(_) => self.refresh(client, transport),
            Err(err) => Err(self.state.fail(&err)),
        }
    }

    pub fn stop<T: Transport>(&mut self, client: &ApiClient, transport: &T) -> Result<(), ViewError> {
        self.state.error = None;
        match client.call(transport, time::stop()) {
            Ok(_) => self.refresh(client, transport),
            Err(err) => Err(self.state.fail(&err)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntriesView {
    params: Option<ListEntriesParams>,
    state: Loadable<Vec<TimeEntry>>,
}

impl EntriesView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Loadable<Vec<TimeEntry>> {
        &self.state
    }

    pub fn entries(&self) -> &[TimeEntry] {
        self.state.data()
    }

    pub fn params(&self) -> Option<&ListEntriesParams> {
        self.params.as_ref()
    }

    pub fn load<T: Transport>(
        &mut self,
        client: &ApiClient,
        transport: &T,
        params: ListEntriesParams,
    ) -> Result<(), ViewError> {
        self.params = Some(params);
        self.refresh(client, transport)
    }

    /// Re-issues the last `load`; does nothing before the first one.
    pub fn refresh<T: Transport>(&mut self, client: &ApiClient, transport: &T) -> Result<(), ViewError> {
        let Some(params) = &self.params else {
            return Ok(());
        };
        let endpoint = time::list_entries(params);
        self.state.begin();
        let result = client.call(transport, endpoint);
        self.state.settle(result)
    }
}
