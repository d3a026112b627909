//! Ctrl-C handling while a model is generating

use tokio_util::sync::CancellationToken;

/// Watches for Ctrl-C until dropped.
///
/// The token is cancelled when the user interrupts, which stops the
/// in-flight stream without leaving the REPL.
pub struct InterruptScope {
    token: CancellationToken,
    done: CancellationToken,
}

impl InterruptScope {
    pub fn start() -> Self {
        let token = CancellationToken::new();
        let done = CancellationToken::new();

        let watched = token.clone();
        let finished = done.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if result.is_ok() {
                        watched.cancel();
                    }
                }
                _ = finished.cancelled() => {}
            }
        });

        Self { token, done }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for InterruptScope {
    fn drop(&mut self) {
        self.done.cancel();
    }
}
