use std::future::Future;

use tracing::info;

use crate::backoff::Backoff;
use crate::client::{ClusterDescriber, ClusterDescriptor, ClusterStatus};
use crate::error::{ClientError, Error, Result};

/// Outcome of a single check of an eventually-consistent resource.
#[derive(Debug)]
pub enum Readiness<T> {
    Ready(T),
    /// Not usable yet; the reason is logged before backing off.
    Pending(String),
}

/// Calls `check` until it reports [`Readiness::Ready`] or fails.
///
/// There is no attempt limit: a resource that never converges blocks the
/// caller until the process is stopped from outside.
pub async fn poll_until<T, F, Fut>(backoff: &Backoff, mut check: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Readiness<T>>>,
{
    let mut attempt: u32 = 1;
    loop {
        match check().await? {
            Readiness::Ready(value) => return Ok(value),
            Readiness::Pending(reason) => {
                let delay = backoff.duration(attempt);
                info!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "{reason}, will try again in {delay:?}"
                );
                tokio::time::sleep(delay).await;
                attempt = attempt.saturating_add(1);
            }
        }
    }
}

/// Returns the named cluster once it is `ACTIVE`.
///
/// A cluster that doesn't exist yet, is still creating, or sits behind an
/// unavailable API is retried. A deleting or failed cluster, an unknown
/// status, or any other API error is returned immediately.
pub async fn await_cluster(
    client: &dyn ClusterDescriber,
    name: &str,
    backoff: &Backoff,
) -> Result<ClusterDescriptor> {
    poll_until(backoff, move || async move {
        let cluster = match client.describe_cluster(name).await {
            Ok(cluster) => cluster,
            Err(ClientError::NotFound(_)) => {
                return Ok(Readiness::Pending(format!(
                    "the cluster: {name} does not (yet) exist"
                )));
            }
            Err(ClientError::ServiceUnavailable(_)) => {
                return Ok(Readiness::Pending(
                    "the cluster service is currently unavailable".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };
        match cluster.status {
            ClusterStatus::Active => Ok(Readiness::Ready(cluster)),
            ClusterStatus::Creating => Ok(Readiness::Pending(format!(
                "waiting for the cluster: {name} to start"
            ))),
            status => Err(Error::ClusterUnusable {
                name: name.to_string(),
                status: status.to_string(),
            }),
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tracing_test::traced_test;

    use super::*;

    struct ScriptedClusters {
        responses: Mutex<VecDeque<Result<ClusterStatus, ClientError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedClusters {
        fn new(
            responses: impl IntoIterator<Item = Result<ClusterStatus, ClientError>>,
        ) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ClusterDescriber for ScriptedClusters {
        async fn describe_cluster(
            &self,
            name: &str,
        ) -> Result<ClusterDescriptor, ClientError> {
            *self.calls.lock().unwrap() += 1;
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("describe called more often than scripted");
            next.map(|status| ClusterDescriptor {
                name: name.to_string(),
                status,
                endpoint: "https://example.eks.amazonaws.com".into(),
                certificate_authority: "dGhpc2lzdGhlY2VydGRhdGE=".into(),
            })
        }
    }

    fn not_found() -> Result<ClusterStatus, ClientError> {
        Err(ClientError::NotFound("no such cluster".into()))
    }

    fn unavailable() -> Result<ClusterStatus, ClientError> {
        Err(ClientError::ServiceUnavailable("try later".into()))
    }

    #[tokio::test]
    async fn retries_through_transient_responses_until_active() {
        let client = ScriptedClusters::new([
            not_found(),
            unavailable(),
            not_found(),
            Ok(ClusterStatus::Creating),
            Ok(ClusterStatus::Active),
        ]);
        let cluster = await_cluster(&client, "cluster-name", &Backoff::disabled())
            .await
            .unwrap();
        assert_eq!(cluster.name, "cluster-name");
        assert_eq!(cluster.status, ClusterStatus::Active);
        assert_eq!(client.calls(), 5);
    }

    #[tokio::test]
    async fn deleting_cluster_is_terminal() {
        let client = ScriptedClusters::new([Ok(ClusterStatus::Deleting)]);
        let err = await_cluster(&client, "X", &Backoff::disabled())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot use the cluster: X, because it is DELETING");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn failed_and_unknown_statuses_are_terminal() {
        for (status, shown) in [
            (ClusterStatus::Failed, "FAILED"),
            (ClusterStatus::Unknown("UPDATING".into()), "UPDATING"),
        ] {
            let client =
                ScriptedClusters::new([Ok(ClusterStatus::Creating), Ok(status)]);
            let err = await_cluster(&client, "prod", &Backoff::disabled())
                .await
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("cannot use the cluster: prod, because it is {shown}")
            );
            assert_eq!(client.calls(), 2);
        }
    }

    #[tokio::test]
    async fn other_api_errors_are_not_retried() {
        let denied = ClientError::other("AccessDeniedException");
        let client = ScriptedClusters::new([Err(denied.clone())]);
        let err = await_cluster(&client, "prod", &Backoff::disabled())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Client(e) if e == denied));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_for_the_backoff_between_attempts() {
        let client = ScriptedClusters::new([
            Ok(ClusterStatus::Creating),
            Ok(ClusterStatus::Creating),
            Ok(ClusterStatus::Active),
        ]);
        let started = tokio::time::Instant::now();
        await_cluster(&client, "prod", &Backoff::new([10]))
            .await
            .unwrap();
        let waited = started.elapsed();
        assert!(waited >= std::time::Duration::from_millis(19_000));
        assert!(waited <= std::time::Duration::from_millis(21_000));
    }

    #[tokio::test]
    #[traced_test]
    async fn every_retry_is_logged_with_its_reason() {
        let client = ScriptedClusters::new([not_found(), Ok(ClusterStatus::Active)]);
        await_cluster(&client, "prod", &Backoff::disabled())
            .await
            .unwrap();
        assert!(logs_contain("the cluster: prod does not (yet) exist, will try again in"));
        assert!(logs_contain("attempt=1"));
    }

    #[tokio::test]
    async fn poll_until_propagates_check_errors() {
        let mut checks = 0;
        let res: Result<()> = poll_until(&Backoff::disabled(), || {
            checks += 1;
            async { Err(Error::UnknownContainerRuntime) }
        })
        .await;
        assert!(matches!(res, Err(Error::UnknownContainerRuntime)));
        assert_eq!(checks, 1);
    }
}
