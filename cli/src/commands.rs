//! Command dispatch. Each command performs its calls, prints the result to
//! stdout and leaves failure reporting to `main`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use clockwork_core::resources::{health, projects};
use clockwork_core::{
    ActiveTimerView, ApiClient, CategoriesView, CategoryInput, EntriesView, ListEntriesParams,
    ProjectInput, ProjectsView, TimeEntry, ViewError,
};

use crate::cli::{CategoryCommand, Cli, Command, ProjectCommand, TimerCommand};
use crate::error::CliError;
use crate::messages;
use crate::poller::Poller;
use crate::render;
use crate::transport::UreqTransport;

/// Client plus transport shared by every command.
#[derive(Clone)]
pub struct Context {
    pub client: ApiClient,
    pub transport: UreqTransport,
}

impl Context {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: ApiClient::new(base_url),
            transport: UreqTransport::new(),
        }
    }
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::new(&cli.base_url);
    tracing::debug!(base_url = ctx.client.base_url(), "running command");

    match cli.command {
        Command::Health => {
            let status = ctx.client.call(&ctx.transport, health::get())?;
            println!("{}", render::health(&status));
        }
        Command::Projects { action } => run_projects(&ctx, action)?,
        Command::Categories { action } => run_categories(&ctx, action)?,
        Command::Timer { action } => run_timer(&ctx, action)?,
        Command::Entries { category, from, to } => {
            let mut view = EntriesView::new();
            let params = ListEntriesParams {
                category_id: category,
                from,
                to,
            };
            view.load(&ctx.client, &ctx.transport, params)?;
            println!("{}", render::entries(view.entries(), Utc::now()));
        }
    }
    Ok(())
}

fn run_projects(ctx: &Context, action: ProjectCommand) -> Result<(), CliError> {
    let mut view = ProjectsView::new();
    match action {
        ProjectCommand::List => view.refresh(&ctx.client, &ctx.transport)?,
        ProjectCommand::Create { name, description } => {
            let input = ProjectInput { name, description };
            view.create(&ctx.client, &ctx.transport, &input)?;
        }
        ProjectCommand::Show { id } => {
            let project = ctx.client.call(&ctx.transport, projects::get(id))?;
            println!("{}", render::project(&project));
            return Ok(());
        }
        ProjectCommand::Rename { id, name, description } => {
            let input = ProjectInput { name, description };
            view.update(&ctx.client, &ctx.transport, id, &input)?;
        }
        ProjectCommand::Delete { id } => view.remove(&ctx.client, &ctx.transport, id)?,
    }
    println!("{}", render::projects(view.projects()));
    Ok(())
}

fn run_categories(ctx: &Context, action: CategoryCommand) -> Result<(), CliError> {
    match action {
        CategoryCommand::List { project } => {
            let mut view = CategoriesView::new(project);
            view.refresh(&ctx.client, &ctx.transport)?;
            println!("{}", render::categories(view.categories()));
        }
        CategoryCommand::Tree { project } => {
            let mut view = CategoriesView::new(project);
            view.refresh(&ctx.client, &ctx.transport)?;
            println!("{}", render::tree(&view.tree()));
        }
        CategoryCommand::Create {
            project,
            name,
            parent,
            description,
        } => {
            let mut view = CategoriesView::new(project);
            let input = CategoryInput {
                name,
                description,
                parent_category_id: parent,
            };
            view.create(&ctx.client, &ctx.transport, &input)?;
            println!("{}", render::tree(&view.tree()));
        }
        CategoryCommand::Update {
            project,
            id,
            name,
            parent,
            description,
        } => {
            let mut view = CategoriesView::new(project);
            let input = CategoryInput {
                name,
                description,
                parent_category_id: parent,
            };
            view.update(&ctx.client, &ctx.transport, id, &input)?;
            println!("{}", render::tree(&view.tree()));
        }
        CategoryCommand::Delete { project, id } => {
            let mut view = CategoriesView::new(project);
            view.remove(&ctx.client, &ctx.transport, id)?;
            println!("{}", render::tree(&view.tree()));
        }
    }
    Ok(())
}

fn run_timer(ctx: &Context, action: TimerCommand) -> Result<(), CliError> {
    let mut view = ActiveTimerView::new();
    match action {
        TimerCommand::Start { category } => view.start(&ctx.client, &ctx.transport, category)?,
        TimerCommand::Stop => view.stop(&ctx.client, &ctx.transport)?,
        TimerCommand::Status => view.refresh(&ctx.client, &ctx.transport)?,
        TimerCommand::Watch { interval_ms } => {
            return watch(ctx.clone(), Duration::from_millis(interval_ms.max(1)));
        }
    }
    println!("{}", render::timer(view.active(), Utc::now()));
    Ok(())
}

/// Starts polling the active timer and hands each refresh outcome to
/// `report`; returns the handle so the caller decides when to stop.
pub fn watch_timer<R>(ctx: Context, period: Duration, report: R) -> Poller
where
    R: Fn(Result<Option<TimeEntry>, ViewError>) + Send + Sync + 'static,
{
    let view = Arc::new(Mutex::new(ActiveTimerView::new()));
    Poller::spawn(period, move || {
        let mut view = view.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let outcome = view
            .refresh(&ctx.client, &ctx.transport)
            .map(|()| view.active().cloned());
        report(outcome);
    })
}

fn watch(ctx: Context, period: Duration) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async move {
        let poller = watch_timer(ctx, period, |outcome| match outcome {
            Ok(active) => println!("{}", render::timer(active.as_ref(), Utc::now())),
            Err(err) => eprintln!("{}", messages::describe_view_error(&err)),
        });
        let interrupted = tokio::signal::ctrl_c().await;
        poller.stop().await;
        interrupted.map_err(CliError::Signal)
    })
}
