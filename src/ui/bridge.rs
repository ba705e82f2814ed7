// EventLoopBridge - marshals work between worker threads and the Slint event loop
//
// Slint owns every window on its single event loop thread. Background tasks
// run on tokio's blocking pool and reach the windows only through this
// bridge:
// - `update_ui()` queues a closure and returns immediately
// - `call_ui()` queues a closure and waits for its result (workers only)
// - `spawn_async()` moves async work off the event loop

use anyhow::{Result, anyhow};
use slint::ComponentHandle;
use std::future::Future;
use tokio::sync::{mpsc, oneshot};

type UiUpdate<T> = Box<dyn FnOnce(&T) + Send>;

/// Capacity of the pending UI update queue
const UI_UPDATE_CAPACITY: usize = 100;

/// Owner of the forwarding thread between workers and the event loop
///
/// # Example
/// ```ignore
/// let ui = MainWindow::new()?;
/// let bridge = EventLoopBridge::new(&ui, runtime.handle().clone());
///
/// let handle = bridge.clone_handle();
/// handle.clone().spawn_async(move || async move {
///     let files = scan_folder().await;
///     let _ = handle.update_ui(move |ui| ui.set_opened_file_count(files.len() as i32));
/// });
/// ```
pub struct EventLoopBridge<T: ComponentHandle> {
    handle: EventLoopBridgeHandle<T>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Start the forwarding thread for `ui`
    pub fn new(ui: &T, tokio_handle: tokio::runtime::Handle) -> Self {
        let ui_weak = ui.as_weak();
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<UiUpdate<T>>(UI_UPDATE_CAPACITY);

        let spawned = std::thread::Builder::new()
            .name("reelname-ui-bridge".to_string())
            .spawn(move || {
                tracing::debug!("EventLoopBridge handler thread started");

                while let Some(update_fn) = ui_update_rx.blocking_recv() {
                    let result = ui_weak.upgrade_in_event_loop(move |ui| {
                        update_fn(&ui);
                    });

                    if let Err(e) = result {
                        // Event loop is gone; nothing left to update
                        tracing::debug!("Failed to queue UI update to event loop: {:?}", e);
                        break;
                    }
                }

                tracing::debug!("EventLoopBridge handler thread terminated");
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to start EventLoopBridge handler thread: {}", e);
        }

        Self {
            handle: EventLoopBridgeHandle {
                tokio_handle,
                ui_update_tx,
            },
        }
    }

    pub fn clone_handle(&self) -> EventLoopBridgeHandle<T> {
        self.handle.clone()
    }
}

/// Cloneable, thread-safe handle to an [`EventLoopBridge`]
pub struct EventLoopBridgeHandle<T: ComponentHandle> {
    tokio_handle: tokio::runtime::Handle,
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridgeHandle<T> {
    /// Queue `update` to run on the event loop thread
    pub fn update_ui<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.ui_update_tx
            .try_send(Box::new(update))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => anyhow!("UI update queue is full"),
                mpsc::error::TrySendError::Closed(_) => anyhow!("UI is no longer running"),
            })
    }

    /// Run `call` on the event loop thread and wait for its result.
    ///
    /// Must not be called from the event loop thread itself.
    pub fn call_ui<F, R>(&self, call: F) -> Result<R>
    where
        F: FnOnce(&T) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.update_ui(move |ui| {
            let _ = reply_tx.send(call(ui));
        })?;

        reply_rx
            .blocking_recv()
            .map_err(|_| anyhow!("UI closed before the call completed"))
    }

    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }

    pub fn tokio_handle(&self) -> &tokio::runtime::Handle {
        &self.tokio_handle
    }
}
