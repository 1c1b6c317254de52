//! Shared test helpers

use axum::Router;
use std::net::SocketAddr;

/// Serve `router` on an ephemeral port from its own runtime thread.
///
/// Returns the base URL. The blocking client must not run inside a tokio
/// runtime, so the server gets a thread of its own.
pub fn spawn_server(router: Router) -> String {
    let (tx, rx) = std::sync::mpsc::channel::<SocketAddr>();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router).await.unwrap();
        });
    });

    format!("http://{}", rx.recv().unwrap())
}
