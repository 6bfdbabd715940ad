use crate::{Character, Error, GenerateRequest, Result, Service, Uid};
use log::debug;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

enum Command {
    Load(oneshot::Sender<Result<()>>),
    GetCharacters(Uid, oneshot::Sender<Result<Vec<Character>>>),
    Generate(GenerateRequest, oneshot::Sender<Result<Vec<u8>>>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly service handle backed by a dedicated worker thread.
///
/// The worker thread owns a synchronous [`Service`] and executes commands in
/// the order they are sent, so callers can await each operation without the
/// service having to be `Send` or thread-safe.
#[derive(Clone)]
pub struct Client {
    cmd_tx: Sender<Command>,
}

impl Client {
    /// Create a client for the default HTTP backend.
    #[cfg(feature = "http")]
    pub async fn new(config: crate::ServiceConfig) -> Result<Self> {
        Self::spawn(move || crate::new_service(config)).await
    }

    /// Spawn a worker thread, build the service on it with `init`, and
    /// return a handle once construction has finished.
    pub async fn spawn<S, F>(init: F) -> Result<Self>
    where
        S: Service + 'static,
        F: FnOnce() -> Result<S> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::Builder::new()
            .name("artifacter-service".into())
            .spawn(move || {
                let mut service = match init() {
                    Ok(s) => s,
                    Err(err) => {
                        let _ = init_tx.send(Err(err));
                        return;
                    }
                };
                let _ = init_tx.send(Ok(()));

                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::Load(resp) => {
                            let _ = resp.send(service.load());
                        }
                        Command::GetCharacters(uid, resp) => {
                            let _ = resp.send(service.get_characters(uid));
                        }
                        Command::Generate(request, resp) => {
                            let _ = resp.send(service.generate(&request));
                        }
                        Command::Close(resp) => {
                            let _ = resp.send(service.close());
                            return;
                        }
                    }
                }
                debug!("All client handles dropped; stopping service worker");
            })
            .map_err(|e| Error::InitializationError(format!("Failed to spawn worker: {}", e)))?;

        let init_res = init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    /// Load the service's resources. Must be awaited before any other call.
    pub async fn load(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Load(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Load canceled: {}", e)))?
    }

    /// List the characters on a player's profile
    pub async fn get_characters(&self, uid: Uid) -> Result<Vec<Character>> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::GetCharacters(uid, tx));
        rx.await
            .map_err(|e| Error::Other(format!("GetCharacters canceled: {}", e)))?
    }

    /// Render a card and return the encoded image
    pub async fn generate(&self, request: GenerateRequest) -> Result<Vec<u8>> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Generate(request, tx));
        rx.await
            .map_err(|e| Error::Other(format!("Generate canceled: {}", e)))?
    }

    /// Tear down the service and stop the worker thread.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}
