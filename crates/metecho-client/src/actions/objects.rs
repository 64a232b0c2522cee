use crate::api::Request;
use crate::client::Client;
use crate::error::{ClientError, Result};
use metecho_store::action::{CreateRequest, ObjectRequest, ObjectsRequest, UpdateRequest};
use metecho_store::types::Page;
use metecho_store::{Action, Dispatch, Object};
use serde::Deserialize;
use tracing::debug;

/// List endpoints are either paginated or (for tasks and orgs) plain arrays.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Page(Page<serde_json::Value>),
    Plain(Vec<serde_json::Value>),
}

impl Listing {
    fn into_page(self) -> Page<serde_json::Value> {
        match self {
            Listing::Page(page) => page,
            Listing::Plain(results) => Page {
                next: None,
                results,
            },
        }
    }
}

impl Client {
    fn list_request(&self, request: &ObjectsRequest) -> Request {
        if let Some(url) = &request.url {
            return Request::get(url.clone());
        }
        let list = Request::get(self.urls.list(request.object_type)).with_query(request.filters.iter());
        match self.page_size {
            Some(size) => {
                let size = size.to_string();
                list.with_query([("page_size", size.as_str())])
            }
            None => list,
        }
    }

    /// Fetch one page of a list and merge it into the cache.
    pub async fn fetch_objects(
        &self,
        dispatch: &dyn Dispatch,
        request: ObjectsRequest,
    ) -> Result<Page<Object>> {
        dispatch.dispatch(Action::FetchObjectsStarted(request.clone()));
        let result = async {
            let listing = self
                .api
                .fetch::<Listing>(dispatch, self.list_request(&request), &[])
                .await?;
            let page = listing.map(Listing::into_page).unwrap_or(Page {
                next: None,
                results: Vec::new(),
            });
            Ok::<_, ClientError>(Object::decode_page(request.object_type, page)?)
        }
        .await;

        match result {
            Ok(page) => {
                debug!(
                    object_type = %request.object_type,
                    count = page.results.len(),
                    more = page.next.is_some(),
                    "fetched objects"
                );
                dispatch.dispatch(Action::FetchObjectsSucceeded {
                    request,
                    response: page.clone(),
                });
                Ok(page)
            }
            Err(e) => {
                dispatch.dispatch(Action::FetchObjectsFailed(request));
                Err(e)
            }
        }
    }

    /// Fetch the first page and then follow `next` cursors to the end.
    pub async fn fetch_all_objects(
        &self,
        dispatch: &dyn Dispatch,
        request: ObjectsRequest,
    ) -> Result<()> {
        let object_type = request.object_type;
        let filters = request.filters.clone();
        let mut next = self.fetch_objects(dispatch, request).await?.next;
        while let Some(url) = next {
            let page = ObjectsRequest::next_page(object_type, filters.clone(), url);
            next = self.fetch_objects(dispatch, page).await?.next;
        }
        Ok(())
    }

    /// Fetch a single object by filters (usually a parent id and `slug`).
    /// A 404 or an empty result records the slug as not found.
    pub async fn fetch_object(
        &self,
        dispatch: &dyn Dispatch,
        request: ObjectRequest,
    ) -> Result<Option<Object>> {
        dispatch.dispatch(Action::FetchObjectStarted(request.clone()));
        let http = match &request.url {
            Some(url) => Request::get(url.clone()),
            None => Request::get(self.urls.list(request.object_type)).with_query(request.filters.iter()),
        };
        let result = async {
            let listing = self.api.fetch::<Listing>(dispatch, http, &[404]).await?;
            let first = listing.and_then(|l| l.into_page().results.into_iter().next());
            match first {
                Some(value) => Ok::<_, ClientError>(Some(Object::decode(request.object_type, value)?)),
                None => Ok(None),
            }
        }
        .await;

        match result {
            Ok(object) => {
                dispatch.dispatch(Action::FetchObjectSucceeded {
                    request,
                    object: object.clone(),
                });
                Ok(object)
            }
            Err(e) => {
                dispatch.dispatch(Action::FetchObjectFailed(request));
                Err(e)
            }
        }
    }

    pub async fn create_object(
        &self,
        dispatch: &dyn Dispatch,
        request: CreateRequest,
    ) -> Result<Object> {
        dispatch.dispatch(Action::CreateObjectStarted(request.clone()));
        let url = request
            .url
            .clone()
            .unwrap_or_else(|| self.urls.list(request.object_type).to_string());
        let http = Request::post(url).with_json(request.data.clone());
        let result = async {
            let value = self
                .api
                .fetch::<serde_json::Value>(dispatch, http, &[])
                .await?
                .ok_or_else(|| ClientError::EmptyResponse(format!("create {}", request.object_type)))?;
            Ok::<_, ClientError>(Object::decode(request.object_type, value)?)
        }
        .await;

        match result {
            Ok(object) => {
                dispatch.dispatch(Action::CreateObjectSucceeded {
                    request,
                    object: object.clone(),
                });
                Ok(object)
            }
            Err(e) => {
                dispatch.dispatch(Action::CreateObjectFailed(request));
                Err(e)
            }
        }
    }

    pub async fn update_object(
        &self,
        dispatch: &dyn Dispatch,
        request: UpdateRequest,
    ) -> Result<Object> {
        dispatch.dispatch(Action::UpdateObjectStarted(request.clone()));
        let url = request
            .url
            .clone()
            .unwrap_or_else(|| self.urls.detail(request.object_type, &request.id));
        let http = if request.patch {
            Request::patch(url)
        } else {
            Request::put(url)
        }
        .with_json(request.data.clone());
        let result = async {
            let value = self
                .api
                .fetch::<serde_json::Value>(dispatch, http, &[])
                .await?
                .ok_or_else(|| ClientError::EmptyResponse(format!("update {}", request.object_type)))?;
            Ok::<_, ClientError>(Object::decode(request.object_type, value)?)
        }
        .await;

        match result {
            Ok(object) => {
                dispatch.dispatch(Action::UpdateObjectSucceeded {
                    request,
                    object: object.clone(),
                });
                Ok(object)
            }
            Err(e) => {
                dispatch.dispatch(Action::UpdateObjectFailed(request));
                Err(e)
            }
        }
    }
}
