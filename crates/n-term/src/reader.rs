// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader.
//
// A dedicated thread polls stdin and forwards what it reads over a channel.
// Terminal resizes travel over the same channel: the SIGWINCH handler only
// sets a flag, and the reader thread turns the flag into an `Input::Resize`
// message between polls. The main thread therefore has exactly one place to
// block, and a resize wakes it just like a keypress does.
//
// Shutdown: `poll()` runs with a short timeout so the thread sees the stop
// flag without being stuck in `read()`.

#[cfg(unix)]
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Once};
use std::thread::{self, JoinHandle};

const READ_BUF_SIZE: usize = 4096;

/// Upper bound on how long a stop request or a resize waits to be noticed.
const POLL_TIMEOUT_MS: i32 = 50;

/// What the reader thread delivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A non-empty chunk of raw stdin bytes.
    Bytes(Vec<u8>),
    /// The terminal changed size.
    Resize,
}

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Set by the SIGWINCH handler, cleared by the reader thread.
static RESIZED: AtomicBool = AtomicBool::new(false);

static SIGWINCH_INSTALLED: Once = Once::new();

/// Point SIGWINCH at a handler that only stores to [`RESIZED`], which is
/// async-signal-safe.
#[cfg(unix)]
fn install_sigwinch_handler() {
    SIGWINCH_INSTALLED.call_once(|| unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    });
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {
    SIGWINCH_INSTALLED.call_once(|| {});
}

// ─── StdinReader ─────────────────────────────────────────────────────────────

/// Handle to the reader thread. Stops and joins it on drop.
///
/// ```no_run
/// use n_term::reader::{Input, StdinReader};
///
/// let (_reader, rx) = StdinReader::spawn()?;
/// while let Ok(input) = rx.recv() {
///     match input {
///         Input::Bytes(bytes) => println!("{} bytes", bytes.len()),
///         Input::Resize => println!("resized"),
///     }
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Install the resize handler and start the reader thread.
    ///
    /// The channel closes when the reader stops or stdin reaches EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn() -> std::io::Result<(Self, Receiver<Input>)> {
        install_sigwinch_handler();
        Self::spawn_with(&RESIZED)
    }

    fn spawn_with(resized: &'static AtomicBool) -> std::io::Result<(Self, Receiver<Input>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || reader_loop(&tx, &stop_flag, resized))?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Ask the thread to exit and wait for it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(unix)]
fn reader_loop(tx: &Sender<Input>, stop: &AtomicBool, resized: &AtomicBool) {
    use std::os::unix::io::AsRawFd;

    let fd = io::stdin().as_raw_fd();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        if resized.swap(false, Ordering::Relaxed) && tx.send(Input::Resize).is_err() {
            break;
        }

        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
        };
        if ready == 0 || (ready < 0 && interrupted()) {
            continue;
        }
        if ready < 0 {
            break;
        }

        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 && interrupted() {
            continue;
        }
        if n <= 0 {
            break;
        }
        #[allow(clippy::cast_sign_loss)]
        let chunk = buf[..n as usize].to_vec();
        if tx.send(Input::Bytes(chunk)).is_err() {
            break;
        }
    }
}

#[cfg(unix)]
fn interrupted() -> bool {
    io::Error::last_os_error().kind() == io::ErrorKind::Interrupted
}

/// Blocking reads without poll: no resize messages, and the thread only
/// notices a stop request after the next chunk arrives.
#[cfg(not(unix))]
fn reader_loop(tx: &Sender<Input>, stop: &AtomicBool, _resized: &AtomicBool) {
    use std::io::Read;

    let stdin = std::io::stdin();
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::Relaxed) {
        match stdin.lock().read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(Input::Bytes(buf[..n].to_vec())).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
