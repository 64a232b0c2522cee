use crate::context::Context;
use crate::output::{print_json, print_table};
use metecho_store::action::ObjectsRequest;
use metecho_store::types::{Filters, ObjectType};

pub fn run(ctx: &Context, all: bool) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let request = ObjectsRequest::new(ObjectType::Repository, Filters::new());
    if all {
        session.block_on(session.client.fetch_all_objects(&session.store, request))?;
    } else {
        session.block_on(session.client.fetch_objects(&session.store, request))?;
    }

    let state = session.store.state();
    let repositories = &state.repositories;
    if ctx.json {
        return print_json(&repositories.items);
    }
    if repositories.items.is_empty() {
        println!("No repositories.");
        return Ok(());
    }
    let rows = repositories
        .items
        .iter()
        .map(|r| vec![r.slug.clone(), r.name.clone(), r.repo_url.clone()])
        .collect();
    print_table(&["SLUG", "NAME", "URL"], rows);
    if repositories.next.is_some() {
        println!("(more available: pass --all)");
    }
    Ok(())
}
