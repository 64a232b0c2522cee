use crate::context::{Context, Session};
use crate::output::{or_dash, print_json, print_table, redirect_notice};
use anyhow::{bail, Context as _};
use metecho_store::action::{CreateRequest, ObjectsRequest, UpdateRequest};
use metecho_store::project::Project;
use metecho_store::repository::Repository;
use metecho_store::selectors::{self, Lookup};
use metecho_store::types::{Filters, ObjectType};
use metecho_store::user::GitHubUser;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Slug resolution
// ---------------------------------------------------------------------------

fn repository(session: &Session, slug: &str) -> anyhow::Result<Arc<Repository>> {
    let lookup = session
        .block_on(session.client.fetch_repository_if_missing(&session.store, slug))
        .with_context(|| format!("failed to look up repository '{slug}'"))?;
    if let Some(current) = lookup.needs_redirect(slug) {
        redirect_notice("repository", slug, current);
    }
    match lookup {
        Lookup::Found(repository) => Ok(repository),
        _ => bail!("repository not found: {slug}"),
    }
}

fn project(session: &Session, repository: &Repository, slug: &str) -> anyhow::Result<Arc<Project>> {
    let lookup = session
        .block_on(
            session
                .client
                .fetch_project_if_missing(&session.store, repository, slug),
        )
        .with_context(|| format!("failed to look up project '{slug}'"))?;
    if let Some(current) = lookup.needs_redirect(slug) {
        redirect_notice("project", slug, current);
    }
    match lookup {
        Lookup::Found(project) => Ok(project),
        _ => bail!("project not found: {}/{slug}", repository.slug),
    }
}

fn status(project: &Project) -> String {
    if selectors::project_submitting(project) {
        "submitting for review".to_string()
    } else if let Some(pr) = &project.pr_url {
        format!("in review ({pr})")
    } else if selectors::project_ready_to_submit(project) {
        "ready to submit".to_string()
    } else {
        "in progress".to_string()
    }
}

fn logins(users: &[GitHubUser]) -> String {
    if users.is_empty() {
        return "-".to_string();
    }
    users
        .iter()
        .map(|u| u.login.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// projects
// ---------------------------------------------------------------------------

pub fn list(ctx: &Context, repo_slug: &str, all: bool) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let repository = repository(&session, repo_slug)?;

    let request = ObjectsRequest::new(
        ObjectType::Project,
        Filters::new().with("repository", repository.id.as_str()),
    );
    if all {
        session.block_on(session.client.fetch_all_objects(&session.store, request))?;
    } else {
        session.block_on(session.client.fetch_objects(&session.store, request))?;
    }

    let state = session.store.state();
    let Some(projects) = state.projects.get(&repository.id) else {
        bail!("no projects loaded for {}", repository.slug);
    };
    if ctx.json {
        return print_json(&projects.items);
    }
    if projects.items.is_empty() {
        println!("No projects in {}.", repository.name);
        return Ok(());
    }
    let rows = projects
        .items
        .iter()
        .map(|p| {
            vec![
                p.slug.clone(),
                p.name.clone(),
                or_dash(p.branch_name.as_deref()),
                status(p),
            ]
        })
        .collect();
    print_table(&["SLUG", "NAME", "BRANCH", "STATUS"], rows);
    if projects.next.is_some() {
        println!("(more available: pass --all)");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// project
// ---------------------------------------------------------------------------

pub fn show(ctx: &Context, repo_slug: &str, project_slug: &str) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let repository = repository(&session, repo_slug)?;
    let project = project(&session, &repository, project_slug)?;
    let tasks = session
        .block_on(session.client.fetch_tasks_if_missing(&session.store, &project))
        .context("failed to load tasks")?;

    if ctx.json {
        let redirect = (project.slug != project_slug).then(|| project.slug.clone());
        return print_json(&serde_json::json!({
            "project": &*project,
            "tasks": tasks.iter().map(|t| &**t).collect::<Vec<_>>(),
            "ready_to_submit": selectors::project_ready_to_submit(&project),
            "redirect": redirect,
        }));
    }

    println!("{} / {}", repository.name, project.name);
    println!("  slug:    {}", project.slug);
    println!("  branch:  {}", or_dash(project.branch_name.as_deref()));
    println!("  status:  {}", status(&project));
    println!("  members: {}", logins(&project.github_users));
    if !project.description.is_empty() {
        println!();
        println!("{}", project.description);
    }
    println!();
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    let rows = tasks
        .iter()
        .map(|t| {
            vec![
                t.slug.clone(),
                t.name.clone(),
                or_dash(t.assignee.as_deref()),
                logins(&t.reviewers),
            ]
        })
        .collect();
    print_table(&["TASK", "NAME", "ASSIGNEE", "REVIEWERS"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// create-project
// ---------------------------------------------------------------------------

pub fn create(
    ctx: &Context,
    repo_slug: &str,
    name: &str,
    description: Option<&str>,
) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let repository = repository(&session, repo_slug)?;
    let data = serde_json::json!({
        "name": name,
        "description": description.unwrap_or_default(),
        "repository": repository.id,
        "github_users": [],
    });
    let object = session
        .block_on(
            session
                .client
                .create_object(&session.store, CreateRequest::new(ObjectType::Project, data)),
        )
        .context("failed to create project")?;

    if ctx.json {
        return print_json(&object);
    }
    match object.as_project() {
        Some(project) => println!("Created project {} ({})", project.name, project.slug),
        None => println!("Created {}", object.id()),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// assign
// ---------------------------------------------------------------------------

pub fn assign(
    ctx: &Context,
    repo_slug: &str,
    project_slug: &str,
    requested: &[String],
) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let repository = repository(&session, repo_slug)?;
    let project = project(&session, &repository, project_slug)?;

    let available = selectors::available_users(&repository, &project.github_users);
    let mut users = project.github_users.clone();
    for login in requested {
        if users.iter().any(|u| &u.login == login) {
            continue;
        }
        match available.iter().find(|u| &u.login == login) {
            Some(user) => users.push((*user).clone()),
            None => bail!("'{login}' is not a collaborator on {}", repository.slug),
        }
    }
    if users.len() == project.github_users.len() {
        println!("Nothing to change.");
        return Ok(());
    }

    let data = serde_json::json!({ "github_users": users });
    session
        .block_on(session.client.update_object(
            &session.store,
            UpdateRequest::patch(ObjectType::Project, project.id.as_str(), data),
        ))
        .context("failed to update project members")?;

    let state = session.store.state();
    let updated = selectors::project_by_slug(&state, &repository.id, &project.slug);
    let members = match &updated {
        Lookup::Found(p) => logins(&p.github_users),
        _ => logins(&users),
    };
    if ctx.json {
        return print_json(&serde_json::json!({ "project": project.slug, "members": users }));
    }
    println!("{} members: {members}", project.name);
    Ok(())
}
