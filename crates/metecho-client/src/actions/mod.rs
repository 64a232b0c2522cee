//! Async orchestration over the cache. Each operation dispatches its
//! started / succeeded / failed actions through a [`metecho_store::Dispatch`].

mod lookup;
mod objects;
mod user;
