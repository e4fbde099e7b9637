use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use renderq_core::{OperatorSignal, StopReason};
use renderq_logging::queue_debug;
use tokio::sync::oneshot;

use crate::{Interrupt, SignalError};

/// Converts operator signals into pending control actions on an [`Interrupt`].
///
/// The skip signal raises [`StopReason::Skip`]; every other trapped signal
/// raises [`StopReason::Abort`]. Handlers stay installed until the
/// controller is dropped.
pub struct SignalController {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SignalController {
    /// Installs handlers for every signal in [`renderq_core::TRAPPED_SIGNALS`].
    ///
    /// Returns once all handlers are registered.
    pub fn install(interrupt: Interrupt) -> Result<Self, SignalError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = thread::Builder::new()
            .name("signal-dispatch".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        let _ = ready_tx.send(Err(SignalError::Runtime(err)));
                        return;
                    }
                };
                runtime.block_on(listen(interrupt, ready_tx, shutdown_rx));
            })
            .map_err(SignalError::Runtime)?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                shutdown: Some(shutdown_tx),
                handle: Some(handle),
            }),
            Ok(Err(err)) => {
                let _ = handle.join();
                Err(err)
            }
            Err(_) => Err(SignalError::DispatcherGone),
        }
    }
}

impl Drop for SignalController {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Classifies `signal` and raises the matching control action.
pub fn dispatch_signal(interrupt: &Interrupt, signal: OperatorSignal) {
    queue_debug!("Caught signal {}", signal);
    interrupt.raise(StopReason::from_signal(signal));
}

#[cfg(unix)]
async fn listen(
    interrupt: Interrupt,
    ready: mpsc::Sender<Result<(), SignalError>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    use tokio::signal::unix::{signal, Signal, SignalKind};

    fn install(kind: SignalKind, signal_id: OperatorSignal) -> Result<Signal, SignalError> {
        signal(kind).map_err(|source| SignalError::Install {
            signal: signal_id,
            source,
        })
    }

    let streams = install(SignalKind::interrupt(), OperatorSignal::Interrupt).and_then(|int| {
        let term = install(SignalKind::terminate(), OperatorSignal::Terminate)?;
        let hup = install(SignalKind::hangup(), OperatorSignal::Hangup)?;
        Ok((int, term, hup))
    });
    let (mut int, mut term, mut hup) = match streams {
        Ok(streams) => {
            let _ = ready.send(Ok(()));
            streams
        }
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };

    loop {
        let caught = tokio::select! {
            Some(()) = int.recv() => OperatorSignal::Interrupt,
            Some(()) = term.recv() => OperatorSignal::Terminate,
            Some(()) = hup.recv() => OperatorSignal::Hangup,
            _ = &mut shutdown => break,
            else => break,
        };
        dispatch_signal(&interrupt, caught);
    }
}

#[cfg(windows)]
async fn listen(
    interrupt: Interrupt,
    ready: mpsc::Sender<Result<(), SignalError>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    use tokio::signal::windows::{ctrl_break, ctrl_c, ctrl_close};

    let install = |signal: OperatorSignal| {
        move |source: std::io::Error| SignalError::Install { signal, source }
    };
    let streams = ctrl_c()
        .map_err(install(OperatorSignal::Interrupt))
        .and_then(|int| {
            let close = ctrl_close().map_err(install(OperatorSignal::Terminate))?;
            let brk = ctrl_break().map_err(install(OperatorSignal::Break))?;
            Ok((int, close, brk))
        });
    let (mut int, mut close, mut brk) = match streams {
        Ok(streams) => {
            let _ = ready.send(Ok(()));
            streams
        }
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };

    loop {
        let caught = tokio::select! {
            Some(()) = int.recv() => OperatorSignal::Interrupt,
            Some(()) = close.recv() => OperatorSignal::Terminate,
            Some(()) = brk.recv() => OperatorSignal::Break,
            _ = &mut shutdown => break,
            else => break,
        };
        dispatch_signal(&interrupt, caught);
    }
}
