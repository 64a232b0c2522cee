use metecho_store::user::User;
use tracing::info;

/// The mutable reporting context (user, tags, breadcrumbs).
pub trait ReportingScope {
    fn clear(&mut self);
}

/// Error-reporting port. Absent when no DSN is configured.
pub trait ErrorReporter: Send + Sync {
    fn set_user(&self, user: &User);
    fn configure_scope(&self, f: &mut dyn FnMut(&mut dyn ReportingScope));
}

// ---------------------------------------------------------------------------
// Sentry
// ---------------------------------------------------------------------------

impl ReportingScope for sentry::Scope {
    fn clear(&mut self) {
        sentry::Scope::clear(self);
    }
}

/// Reports through the process-wide Sentry hub.
#[derive(Debug, Default, Clone, Copy)]
pub struct SentryReporter;

impl SentryReporter {
    /// Install the Sentry client. Keep the guard alive for the life of the
    /// process so queued events are flushed on exit.
    pub fn init(dsn: &str) -> (Self, sentry::ClientInitGuard) {
        info!("error reporting enabled");
        let guard = sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ));
        (Self, guard)
    }
}

impl ErrorReporter for SentryReporter {
    fn set_user(&self, user: &User) {
        let sentry_user = sentry::User {
            id: Some(user.id.clone()),
            username: Some(user.username.clone()),
            email: user.email.clone(),
            ..Default::default()
        };
        sentry::configure_scope(|scope| scope.set_user(Some(sentry_user)));
    }

    fn configure_scope(&self, f: &mut dyn FnMut(&mut dyn ReportingScope)) {
        sentry::configure_scope(|scope| {
            let scope: &mut dyn ReportingScope = scope;
            f(scope)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".into(),
            username: "alice".into(),
            email: Some("alice@example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn set_user_tags_events() {
        let events = sentry::test::with_captured_events(|| {
            SentryReporter.set_user(&user());
            sentry::capture_message("boom", sentry::Level::Error);
        });
        assert_eq!(events.len(), 1);
        let tagged = events[0].user.as_ref().unwrap();
        assert_eq!(tagged.id.as_deref(), Some("u1"));
        assert_eq!(tagged.username.as_deref(), Some("alice"));
    }

    #[test]
    fn clearing_scope_drops_user() {
        let events = sentry::test::with_captured_events(|| {
            SentryReporter.set_user(&user());
            SentryReporter.configure_scope(&mut |scope| scope.clear());
            sentry::capture_message("after logout", sentry::Level::Info);
        });
        assert_eq!(events.len(), 1);
        assert!(events[0].user.is_none());
    }
}
