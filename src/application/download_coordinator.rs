use std::path::PathBuf;

use futures::{stream::BoxStream, StreamExt};
use log::info;

use crate::{
    api::{ApiClient, DownloadStarted},
    application::export::ExportSink,
    domain::{AppError, DownloadRequest},
    utils::resolve_filename,
};

/// Events emitted over the lifetime of one download attempt.
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    /// Response headers arrived; the payload branch was taken.
    Connected {
        filename: String,
        total: Option<u64>,
    },
    /// The server answered with JSON instead of a file.
    ServerMessage(String),
    Progress {
        loaded: u64,
        total: Option<u64>,
    },
    /// The user dismissed the save dialog; nothing was written.
    SaveCancelled,
    Saved(PathBuf),
    Failed(AppError),
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: ApiClient,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// Runs one attempt as an event stream: issue the POST, branch on the
    /// response, ask for a save location, then stream bytes into a scoped
    /// part-file sink. Every failure is absorbed into a `Failed` event; the
    /// stream itself never errors.
    pub fn run(&self, request: DownloadRequest) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            RunState::Start {
                client: self.api_client.clone(),
                request,
            },
            |state| async move {
                match state {
                    RunState::Start { client, request } => {
                        let quality = request.quality;
                        match client.start_download(&request).await {
                            Ok(DownloadStarted::Payload {
                                disposition,
                                total,
                                stream,
                            }) => {
                                let filename =
                                    resolve_filename(disposition.as_deref(), quality);
                                Some((
                                    DownloadEvent::Connected {
                                        filename: filename.clone(),
                                        total,
                                    },
                                    RunState::ChoosePath {
                                        filename,
                                        total,
                                        stream,
                                    },
                                ))
                            }
                            Ok(DownloadStarted::Message(text)) => Some((
                                DownloadEvent::ServerMessage(text),
                                RunState::Finished,
                            )),
                            Err(e) => Some((
                                DownloadEvent::Failed(AppError::from(e)),
                                RunState::Finished,
                            )),
                        }
                    }
                    RunState::ChoosePath {
                        filename,
                        total,
                        stream,
                    } => {
                        let chosen = rfd::AsyncFileDialog::new()
                            .set_file_name(&filename)
                            .save_file()
                            .await
                            .map(|handle| handle.path().to_path_buf());

                        let path = match chosen {
                            Some(path) => path,
                            None => {
                                return Some((
                                    DownloadEvent::SaveCancelled,
                                    RunState::Finished,
                                ))
                            }
                        };

                        let sink = match ExportSink::create(&path).await {
                            Ok(sink) => sink,
                            Err(e) => {
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(e.to_string())),
                                    RunState::Finished,
                                ))
                            }
                        };

                        Some((
                            DownloadEvent::Progress { loaded: 0, total },
                            RunState::Streaming {
                                sink,
                                stream,
                                loaded: 0,
                                total,
                            },
                        ))
                    }
                    RunState::Streaming {
                        mut sink,
                        mut stream,
                        mut loaded,
                        total,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Err(e) = sink.write(&chunk).await {
                                // sink drops here and discards the part file
                                return Some((
                                    DownloadEvent::Failed(AppError::Io(e.to_string())),
                                    RunState::Finished,
                                ));
                            }

                            loaded += chunk.len() as u64;

                            Some((
                                DownloadEvent::Progress { loaded, total },
                                RunState::Streaming {
                                    sink,
                                    stream,
                                    loaded,
                                    total,
                                },
                            ))
                        }
                        Some(Err(e)) => Some((
                            DownloadEvent::Failed(AppError::from(e)),
                            RunState::Finished,
                        )),
                        None => match sink.commit().await {
                            Ok(path) => {
                                info!("saved download: path={}", path.display());
                                Some((DownloadEvent::Saved(path), RunState::Finished))
                            }
                            Err(e) => Some((
                                DownloadEvent::Failed(AppError::Io(e.to_string())),
                                RunState::Finished,
                            )),
                        },
                    },
                    RunState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

enum RunState {
    Start {
        client: ApiClient,
        request: DownloadRequest,
    },
    ChoosePath {
        filename: String,
        total: Option<u64>,
        stream: BoxStream<'static, crate::api::Result<bytes::Bytes>>,
    },
    Streaming {
        sink: ExportSink,
        stream: BoxStream<'static, crate::api::Result<bytes::Bytes>>,
        loaded: u64,
        total: Option<u64>,
    },
    Finished,
}
