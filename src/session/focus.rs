use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::gateway::UserGateway;
use crate::session::controller::SessionController;
use crate::session::state::Snapshot;

/// Focus was requested and the input is enabled again
pub fn focus_ready(snapshot: &Snapshot) -> bool {
    snapshot.focus_requested && snapshot.controls_enabled()
}

/// Run `effect` once `predicate` holds for the latest snapshot.
///
/// Returns `None` if the controller goes away first. The effect gets a
/// clone, so it may call back into the controller.
pub async fn run_when<P, E, R>(
    receiver: &mut watch::Receiver<Snapshot>,
    predicate: P,
    effect: E,
) -> Option<R>
where
    P: FnMut(&Snapshot) -> bool,
    E: FnOnce(&Snapshot) -> R,
{
    let snapshot = receiver.wait_for(predicate).await.ok()?.clone();
    Some(effect(&snapshot))
}

/// Give focus back to the search input every time it is requested,
/// but never while a request is still in flight.
pub fn spawn_focus_keeper<G, E>(controller: Arc<SessionController<G>>, mut effect: E) -> JoinHandle<()>
where
    G: UserGateway + 'static,
    E: FnMut(&Snapshot) + Send + 'static,
{
    let mut receiver = controller.subscribe();
    tokio::spawn(async move {
        loop {
            let served = run_when(&mut receiver, focus_ready, |snapshot| {
                effect(snapshot);
                snapshot.focus_request
            });
            match served.await {
                Some(served) => controller.acknowledge_focus(served),
                None => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::fixtures::user;
    use crate::session::controller::fake::FakeGateway;
    use crate::session::state::TriggerOutcome;
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn ready() -> Arc<SessionController<FakeGateway>> {
        let gateway = FakeGateway::with_users(vec![
            user(1, "John", "Doe", 30, "admin"),
            user(2, "Jane", "Smith", 25, "user"),
        ]);
        let (controller, _notifications) = SessionController::new(gateway, 3);
        let controller = Arc::new(controller);
        controller.initialize().await;
        controller
    }

    #[tokio::test]
    async fn test_focus_waits_for_loading_to_finish() {
        let controller = ready().await;
        let gate = controller.gateway().hold();
        let (focused_tx, mut focused_rx) = mpsc::unbounded_channel();

        let keeper = spawn_focus_keeper(Arc::clone(&controller), move |snapshot: &Snapshot| {
            let _ = focused_tx.send(snapshot.status.clone());
        });

        let search = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit_search("john").await }
        });

        let mut snapshots = controller.subscribe();
        snapshots.wait_for(|s| s.is_loading() && s.focus_requested).await.unwrap();

        // still loading: the input stays unfocused
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(focused_rx.try_recv().is_err());

        gate.notify_one();
        assert_eq!(search.await.unwrap(), TriggerOutcome::Applied);

        let status = focused_rx.recv().await.unwrap();
        assert!(!status.is_busy());

        snapshots.wait_for(|s| !s.focus_requested).await.unwrap();
        keeper.abort();
    }

    #[tokio::test]
    async fn test_rejected_commit_refocuses_immediately() {
        let controller = ready().await;
        let mut receiver = controller.subscribe();

        assert_eq!(controller.submit_search("Jo").await, TriggerOutcome::TermTooShort);

        let hint = run_when(&mut receiver, focus_ready, |s| s.search_hint.clone()).await;
        assert_eq!(
            hint,
            Some(Some("Enter at least 3 characters to search".to_string()))
        );
    }

    #[tokio::test]
    async fn test_run_when_ends_with_controller() {
        let controller = ready().await;
        let mut receiver = controller.subscribe();
        drop(controller);

        let fired = run_when(&mut receiver, |_| false, |_| ()).await;
        assert!(fired.is_none());
    }
}
