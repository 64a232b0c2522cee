use crate::api::Request;
use crate::client::Client;
use crate::error::Result;
use metecho_store::action::ObjectsRequest;
use metecho_store::types::{Filters, ObjectType, Subscription};
use metecho_store::user::User;
use metecho_store::{Action, Dispatch};
use tracing::{error, info};

/// Statuses on the user endpoint that mean "nobody is logged in".
const NOT_LOGGED_IN: &[u16] = &[401, 403, 404];

impl Client {
    /// Build the login action and subscribe to the user's real-time events.
    pub fn login(&self, user: User) -> Action {
        info!(user = %user.id, "logged in");
        self.socket.subscribe(&Subscription::user(user.id.clone()));
        if let Some(reporter) = &self.reporter {
            reporter.set_user(&user);
        }
        Action::UserLoggedIn(user)
    }

    /// End the server session, then reset local state, the socket and the
    /// reporting scope. A failed request is returned after the local logout.
    pub async fn logout(&self, dispatch: &dyn Dispatch) -> Result<()> {
        let response = self
            .api
            .fetch::<serde_json::Value>(dispatch, Request::post(self.urls.account_logout()), &[])
            .await;

        info!("logged out");
        dispatch.dispatch(Action::UserLoggedOut);
        self.socket.reconnect();
        if let Some(reporter) = &self.reporter {
            reporter.configure_scope(&mut |scope| scope.clear());
        }
        response.map(|_| ())
    }

    /// Reload the session user and, when logged in, the repository list.
    /// Returns the user, or `None` when not logged in.
    pub async fn refetch_all_data(&self, dispatch: &dyn Dispatch) -> Result<Option<User>> {
        dispatch.dispatch(Action::RefetchDataStarted);
        let user = match self
            .api
            .fetch::<User>(dispatch, Request::get(self.urls.user()), NOT_LOGGED_IN)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                dispatch.dispatch(Action::RefetchDataFailed);
                error!(error = %e, "failed to refetch user data");
                return Err(e);
            }
        };
        dispatch.dispatch(Action::RefetchDataSucceeded);

        let Some(user) = user else {
            dispatch.dispatch(Action::UserLoggedOut);
            return Ok(None);
        };
        dispatch.dispatch(self.login(user.clone()));
        self.fetch_objects(
            dispatch,
            ObjectsRequest::new(ObjectType::Repository, Filters::new()),
        )
        .await?;
        Ok(Some(user))
    }

    /// Ask the server to re-sync the user's GitHub repositories. Completion
    /// arrives later as a `USER_REPOS_REFRESH` push.
    pub async fn refresh_repositories(&self, dispatch: &dyn Dispatch) -> Result<()> {
        dispatch.dispatch(Action::RefreshingRepos);
        match self
            .api
            .fetch::<serde_json::Value>(dispatch, Request::post(self.urls.user_refresh()), &[])
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                dispatch.dispatch(Action::RefreshReposRejected);
                Err(e)
            }
        }
    }
}
