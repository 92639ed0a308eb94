//! Owner-thread runtime for the editor.
//!
//! `EditorRuntime::spawn` starts a dedicated OS thread running a
//! current-thread tokio runtime. The `Editor` is built on that thread and
//! never leaves it; every other thread talks to it through `EditorHandle`
//! commands, which the owner loop applies one at a time in arrival order.
//! Formatting passes run on the runtime's blocking pool and come back through
//! the same mailbox as `FormatCompleted` commands.
//!
//! Events are bridged out through a `ChannelSubscriber`; take the receiver
//! with `take_events`. Shutdown is explicit (`shutdown` or drop): the editor
//! holds a handle to its own mailbox for formatting replies, so the mailbox
//! never closes on its own.

use crate::command::{EditorCommand, EditorHandle};
use crate::editor::Editor;
use crate::error::RuntimeError;
use crate::highlight::BlockingPoolExecutor;
use crate::settings::EditorSettings;
use core_events::{ChannelSubscriber, EditorEvent};
use std::rc::Rc;
use std::thread;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{error, info, warn};

pub const OWNER_THREAD_NAME: &str = "calced-editor";

pub struct EditorRuntime {
    handle: EditorHandle,
    events: Option<UnboundedReceiver<EditorEvent>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl EditorRuntime {
    /// Spawn the owner thread. `setup` runs there before the first command,
    /// which is where views and extra subscribers (both owner-thread
    /// confined) get attached.
    pub fn spawn<F>(settings: EditorSettings, setup: F) -> Result<Self, RuntimeError>
    where
        F: FnOnce(&mut Editor) + Send + 'static,
    {
        let (tx, mailbox) = mpsc::unbounded_channel();
        let handle = EditorHandle::new(tx);
        let (event_tx, events) = mpsc::unbounded_channel();
        let owner_handle = handle.clone();
        // Built on the caller's thread so build errors surface from `spawn`;
        // it is only driven on the owner thread.
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| {
                error!(target: "runtime.editor", %e, "runtime_build_failed");
                RuntimeError::Build(e)
            })?;

        let thread = thread::Builder::new()
            .name(OWNER_THREAD_NAME.to_string())
            .spawn(move || {
                let mut editor = Editor::attached(settings, owner_handle)
                    .with_executor(BlockingPoolExecutor::new(rt.handle().clone()));
                editor.subscribe(Rc::new(ChannelSubscriber::new(event_tx)));
                setup(&mut editor);

                info!(target: "runtime.editor", highlight = settings.highlight, "owner_loop_start");
                let handled = rt.block_on(owner_loop(&mut editor, mailbox));
                info!(target: "runtime.editor", handled, "owner_loop_exit");
            })
            .map_err(RuntimeError::Spawn)?;

        Ok(Self {
            handle,
            events: Some(events),
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> EditorHandle {
        self.handle.clone()
    }

    /// Receiver for published editor events. `None` once taken.
    pub fn take_events(&mut self) -> Option<UnboundedReceiver<EditorEvent>> {
        self.events.take()
    }

    /// Stop the owner loop and wait for the thread.
    pub fn shutdown(mut self) -> Result<(), RuntimeError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), RuntimeError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        // Fails only when the loop has already exited.
        let _ = self.handle.shutdown();
        thread.join().map_err(|_| RuntimeError::Panicked)
    }
}

impl Drop for EditorRuntime {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(target: "runtime.editor", %e, "stop_on_drop_failed");
        }
    }
}

async fn owner_loop(editor: &mut Editor, mut mailbox: UnboundedReceiver<EditorCommand>) -> u64 {
    let mut handled = 0u64;
    while let Some(command) = mailbox.recv().await {
        handled += 1;
        if editor.handle_command(command).is_break() {
            break;
        }
    }
    handled
}
