use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use {
    axum::{Router, extract::Query, response::Html, routing::get},
    tokio::sync::oneshot,
    tracing::debug,
};

use crate::error::{Error, Result};

/// Raw query parameters captured from the provider's redirect.
///
/// The listener only transports them; validating `state` against the pending
/// authorization is the connection manager's job.
#[derive(Debug, Clone)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// Loopback HTTP listener for the authorization redirect.
///
/// Binding and waiting are separate steps so callers can learn the bound
/// address (port 0 in tests) before the browser round-trip starts.
pub struct CallbackListener {
    addr: SocketAddr,
    listener: tokio::net::TcpListener,
    path: String,
}

impl CallbackListener {
    /// Bind `127.0.0.1:{port}` and serve a single GET on `path`.
    pub async fn bind(port: u16, path: impl Into<String>) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}")).await?;
        let addr = listener.local_addr()?;
        Ok(Self {
            addr,
            listener,
            path: path.into(),
        })
    }

    /// The address the listener is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the provider redirect, then shut down.
    ///
    /// A `code`/`state` pair resolves to `CallbackParams`; a provider `error`
    /// parameter or the timeout elapsing resolves to an error.
    pub async fn wait(self, timeout: Duration) -> Result<CallbackParams> {
        let (tx, rx) = oneshot::channel::<Result<CallbackParams>>();
        let tx = Arc::new(std::sync::Mutex::new(Some(tx)));

        let app = Router::new().route(
            &self.path,
            get(move |Query(params): Query<HashMap<String, String>>| {
                let tx = tx.lock().unwrap_or_else(|e| e.into_inner()).take();
                async move {
                    let result = parse_redirect(&params);
                    match result {
                        Ok(captured) => {
                            if let Some(tx) = tx {
                                let _ = tx.send(Ok(captured));
                            }
                            Html(
                                "<h1>Authorization complete</h1>\
                                 <p>You can close this window and return to crier.</p>"
                                    .to_string(),
                            )
                        }
                        Err(e) => {
                            let message = e.to_string();
                            if let Some(tx) = tx {
                                let _ = tx.send(Err(e));
                            }
                            Html(format!("<h1>Authorization failed</h1><p>{message}</p>"))
                        }
                    }
                }
            }),
        );

        debug!(addr = %self.addr, path = %self.path, "waiting for authorization redirect");
        let server = axum::serve(self.listener, app);

        tokio::select! {
            result = rx => {
                result.map_err(|_| Error::message("callback channel closed"))?
            }
            _ = server.into_future() => {
                Err(Error::message("callback server exited unexpectedly"))
            }
            _ = tokio::time::sleep(timeout) => {
                Err(Error::message(format!(
                    "authorization redirect timed out after {}s",
                    timeout.as_secs()
                )))
            }
        }
    }
}

fn parse_redirect(params: &HashMap<String, String>) -> Result<CallbackParams> {
    if let Some(error) = params.get("error") {
        let detail = params
            .get("error_description")
            .map(|d| format!(": {d}"))
            .unwrap_or_default();
        return Err(Error::message(format!(
            "provider denied authorization ({error}{detail})"
        )));
    }
    let code = params
        .get("code")
        .ok_or_else(|| Error::message("callback missing code parameter"))?;
    let state = params
        .get("state")
        .ok_or_else(|| Error::message("callback missing state parameter"))?;
    Ok(CallbackParams {
        code: code.clone(),
        state: state.clone(),
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_code_and_state() {
        let listener = CallbackListener::bind(0, "/auth/callback").await.unwrap();
        let addr = listener.addr();
        let handle = tokio::spawn(listener.wait(Duration::from_secs(5)));

        let body = reqwest::get(format!(
            "http://{addr}/auth/callback?code=abc123&state=xyz789"
        ))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
        assert!(body.contains("Authorization complete"));

        let params = handle.await.unwrap().unwrap();
        assert_eq!(params.code, "abc123");
        assert_eq!(params.state, "xyz789");
    }

    #[tokio::test]
    async fn provider_error_is_reported() {
        let listener = CallbackListener::bind(0, "/auth/callback").await.unwrap();
        let addr = listener.addr();
        let handle = tokio::spawn(listener.wait(Duration::from_secs(5)));

        let body = reqwest::get(format!(
            "http://{addr}/auth/callback?error=access_denied&error_description=user%20said%20no"
        ))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
        assert!(body.contains("Authorization failed"));

        let err = handle.await.unwrap().unwrap_err();
        assert!(err.to_string().contains("access_denied"));
        assert!(err.to_string().contains("user said no"));
    }

    #[tokio::test]
    async fn missing_code_is_rejected() {
        let listener = CallbackListener::bind(0, "/auth/callback").await.unwrap();
        let addr = listener.addr();
        let handle = tokio::spawn(listener.wait(Duration::from_secs(5)));

        reqwest::get(format!("http://{addr}/auth/callback?state=only-state"))
            .await
            .unwrap();

        let err = handle.await.unwrap().unwrap_err();
        assert!(err.to_string().contains("missing code"));
    }

    #[tokio::test]
    async fn times_out_without_redirect() {
        let listener = CallbackListener::bind(0, "/auth/callback").await.unwrap();
        let err = listener.wait(Duration::from_millis(50)).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
