use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use nix::sys::signal::{killpg, sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::unistd::Pid;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

static SIGINT_PENDING: AtomicBool = AtomicBool::new(false);

/// Process groups currently forwarded to. One listener thread serves all of
/// them; it exists while the list is non-empty.
static REGISTRY: Mutex<Registry> = Mutex::new(Registry {
    groups: Vec::new(),
    previous: None,
    listener: None,
});

struct Listener {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

struct Registry {
    groups: Vec<Pid>,
    previous: Option<SigAction>,
    listener: Option<Listener>,
}

fn registry() -> MutexGuard<'static, Registry> {
    // the registry stays consistent even if a holder panicked
    REGISTRY.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

extern "C" fn on_sigint(_: libc::c_int) {
    SIGINT_PENDING.store(true, Ordering::SeqCst);
}

fn interrupt_action() -> SigAction {
    SigAction::new(
        SigHandler::Handler(on_sigint),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    )
}

/// Keeps Ctrl-C from killing the shell itself. A caught signal (unlike an
/// ignored one) is reset to its default in exec'd children, so commands can
/// still be interrupted.
pub fn catch_interrupts() -> nix::Result<()> {
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
    unsafe { sigaction(Signal::SIGINT, &interrupt_action()) }?;
    debug!("SIGINT handler installed");
    Ok(())
}

/// Drops a Ctrl-C that arrived while no pipeline was running. Call it before
/// starting a pipeline's processes; an interrupt landing after this call is
/// kept and delivered once the group registers.
pub fn discard_pending() {
    let registry = registry();
    if registry.groups.is_empty() {
        SIGINT_PENDING.store(false, Ordering::SeqCst);
    }
}

fn broadcast() {
    let groups = registry().groups.clone();
    for pgid in groups {
        debug!("forwarding SIGINT to process group {}", pgid);
        if let Err(err) = killpg(pgid, Signal::SIGINT) {
            warn!("failed to forward SIGINT to {}: {}", pgid, err);
        }
    }
}

fn spawn_listener() -> io::Result<Listener> {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let handle = thread::Builder::new()
        .name(String::from("sigint-forward"))
        .spawn(move || loop {
            if SIGINT_PENDING.swap(false, Ordering::SeqCst) {
                broadcast();
            }
            match stop_rx.recv_timeout(POLL_INTERVAL) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        })?;
    Ok(Listener { stop_tx, handle })
}

/// Forwards every SIGINT the shell receives to one process group, alongside
/// any other groups registered at the same time.
///
/// Start it once the group has a member and call [`stop`] (or drop it) after
/// the group's processes have been reaped. The first registration installs
/// the SIGINT handler and the last one to stop restores the disposition that
/// was in place before.
///
/// [`stop`]: SigintForwarder::stop
pub struct SigintForwarder {
    pgid: Pid,
    active: bool,
}

impl SigintForwarder {
    pub fn start(pgid: Pid) -> io::Result<Self> {
        let mut registry = registry();

        if registry.groups.is_empty() {
            // SAFETY: see `catch_interrupts`.
            let previous = unsafe { sigaction(Signal::SIGINT, &interrupt_action()) }?;
            match spawn_listener() {
                Ok(listener) => {
                    registry.previous = Some(previous);
                    registry.listener = Some(listener);
                }
                Err(err) => {
                    restore(&previous);
                    return Err(err);
                }
            }
        }

        registry.groups.push(pgid);
        debug!("SIGINT forwarding to {} started", pgid);
        Ok(Self { pgid, active: true })
    }

    /// Unregisters the group, shutting the listener down if it was the last.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let listener = {
            let mut registry = registry();
            if let Some(index) = registry.groups.iter().position(|pgid| *pgid == self.pgid) {
                registry.groups.remove(index);
            }
            if !registry.groups.is_empty() {
                None
            } else {
                if let Some(previous) = registry.previous.take() {
                    restore(&previous);
                }
                registry.listener.take()
            }
        };

        // joined outside the lock: the listener takes it to broadcast
        if let Some(listener) = listener {
            let _ = listener.stop_tx.send(());
            if listener.handle.join().is_err() {
                warn!("SIGINT listener panicked");
            }
        }
        debug!("SIGINT forwarding to {} stopped", self.pgid);
    }
}

impl Drop for SigintForwarder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn restore(previous: &SigAction) {
    // SAFETY: reinstalls the disposition that was active before the first start.
    if let Err(err) = unsafe { sigaction(Signal::SIGINT, previous) } {
        warn!("failed to restore SIGINT disposition: {}", err);
    }
}
