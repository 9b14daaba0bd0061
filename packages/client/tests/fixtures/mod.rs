//! Test fixtures shared by the client integration tests.

#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use flowsync_client::{
    ChartSession, RelayLink,
    domain::ChartRepository,
    infrastructure::{HttpChartRepository, LocalFlowStore, RelayConnection, RelayEvent, relay_url},
};
use flowsync_server::ui::AppState;
use tokio::task::JoinHandle;

/// The real server on an ephemeral port for the duration of a test.
pub struct TestServer {
    addr: std::net::SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let handle = tokio::spawn(async move {
            flowsync_server::serve(listener, Arc::new(AppState::in_memory()))
                .await
                .expect("Server error");
        });
        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn repository(&self) -> Arc<HttpChartRepository> {
        Arc::new(HttpChartRepository::new(self.base_url()))
    }

    /// Create a chart and return its id.
    pub async fn create_chart(&self, title: &str) -> String {
        self.repository()
            .create_chart(title)
            .await
            .expect("Failed to create chart")
            .id
    }

    /// Open a session on `chart_id` with its own relay connection.
    pub async fn open_session(&self, chart_id: &str) -> ChartSession {
        let (connection, events) = RelayConnection::connect(&relay_url(&self.base_url()))
            .await
            .expect("Failed to connect relay");
        let local = LocalFlowStore::new(
            std::env::temp_dir().join(format!("flowsync-it-{}", uuid::Uuid::new_v4())),
        );
        ChartSession::open(
            chart_id,
            self.repository(),
            Some(RelayLink { connection, events }),
            local,
        )
        .await
        .expect("Failed to open session")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Apply events until one matches, or give up after five seconds.
pub async fn wait_for(
    session: &mut ChartSession,
    mut matches: impl FnMut(&RelayEvent) -> bool,
) -> Option<RelayEvent> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let left = deadline.checked_duration_since(tokio::time::Instant::now())?;
        let event = session.next_event(left).await?;
        if matches(&event) {
            return Some(event);
        }
    }
}

pub async fn wait_for_user_count(session: &mut ChartSession, count: usize) -> bool {
    wait_for(session, |e| *e == RelayEvent::UserCount(count))
        .await
        .is_some()
}

pub async fn wait_for_chart_update(session: &mut ChartSession) -> bool {
    wait_for(session, |e| matches!(e, RelayEvent::ChartUpdated(_)))
        .await
        .is_some()
}

/// Count chart updates arriving within `wait`.
pub async fn chart_updates_within(session: &mut ChartSession, wait: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + wait;
    let mut updates = 0;
    while let Some(left) = deadline.checked_duration_since(tokio::time::Instant::now()) {
        match session.next_event(left).await {
            Some(RelayEvent::ChartUpdated(_)) => updates += 1,
            Some(_) => {}
            None => break,
        }
    }
    updates
}
