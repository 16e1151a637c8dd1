use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::JoinHandle;

use crate::error::panic_message;

type BoxAny = Box<dyn Any + Send>;

/// Failure to get a result back from the host thread.
#[derive(Debug, thiserror::Error)]
pub(crate) enum HostError {
    #[error("session call panicked: {0}")]
    Panicked(String),
    #[error("session host is no longer running")]
    Stopped,
}

struct Call<S> {
    f: Box<dyn FnOnce(&mut S) -> BoxAny + Send>,
    ret: crossbeam::channel::Sender<Result<BoxAny, String>>,
}

/// Owns a value on a dedicated thread and runs closures against it one at a time.
///
/// Callers on any thread submit work through [`SessionHost::with`]; the host executes calls in
/// arrival order, so the hosted value never sees concurrent access. A panicking call is caught on
/// the host thread and reported to its caller only.
pub(crate) struct SessionHost<S> {
    tx: Option<crossbeam::channel::Sender<Call<S>>>,
    abort_tx: crossbeam::channel::Sender<()>,
    join_handle: Option<JoinHandle<()>>,
}

impl<S: Send + 'static> SessionHost<S> {
    pub fn spawn(name: &str, session: S) -> std::io::Result<Self> {
        let (abort_tx, abort_rx) = crossbeam::channel::bounded::<()>(1);
        let (tx, rx) = crossbeam::channel::unbounded::<Call<S>>();
        let join_handle = std::thread::Builder::new()
            // Thread names may not contain NUL; `Builder::spawn` panics on them.
            .name(format!("session-host-{}", name.replace('\0', "")))
            .spawn(move || {
                let mut session = session;
                loop {
                    crossbeam::channel::select! {
                        recv(rx) -> msg => {
                            let Ok(Call { f, ret }) = msg else {
                                break;
                            };
                            let result = catch_unwind(AssertUnwindSafe(|| f(&mut session)))
                                .map_err(|payload| panic_message(payload.as_ref()));
                            let _ = ret.send(result);
                        }
                        recv(abort_rx) -> _ => {
                            break;
                        }
                    }
                }
            })?;
        Ok(Self {
            tx: Some(tx),
            abort_tx,
            join_handle: Some(join_handle),
        })
    }

    /// Run `f` against the hosted value and wait for its result.
    pub fn with<R: Send + 'static>(
        &self,
        f: impl FnOnce(&mut S) -> R + Send + 'static,
    ) -> Result<R, HostError> {
        let tx = self.tx.as_ref().ok_or(HostError::Stopped)?;
        let (ret_tx, ret_rx) = crossbeam::channel::bounded(1);
        tx.send(Call {
            f: Box::new(move |s: &mut S| Box::new(f(s)) as BoxAny),
            ret: ret_tx,
        })
        .map_err(|_| HostError::Stopped)?;
        let result = ret_rx.recv().map_err(|_| HostError::Stopped)?;
        let value = result.map_err(HostError::Panicked)?;
        value
            .downcast::<R>()
            .map(|r| *r)
            .map_err(|_| HostError::Panicked("session call returned an unexpected type".into()))
    }
}

impl<S> Drop for SessionHost<S> {
    fn drop(&mut self) {
        // Stop the host thread and wait for it to drop the session.
        self.tx.take();
        let _ = self.abort_tx.try_send(());
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.join();
        }
    }
}
