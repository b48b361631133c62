//! Loopback HTTP stubs standing in for upstream APIs in tests.

use axum::Router;
use tokio::net::TcpListener;

/// Serves `app` on an ephemeral loopback port and returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}
