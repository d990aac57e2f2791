use futures::StreamExt;
use iced::Task;

use crate::api::{ApiClient, CacheStatus};
use crate::application::{AdminRefresher, DownloadCoordinator, DownloadEvent, RefreshOutcome};
use crate::domain::{
    AppError, DownloadPhase, DownloadRequest, NotificationKind, NotificationQueue, Progress,
    NOTIFICATION_TTL,
};
use crate::ui::{notification_area, AdminView, DownloadView, Screen, UiMessage};
use crate::utils::{validate_media_url, UrlCheck};

pub struct DownloadApp {
    screen: Screen,
    download: DownloadView,
    admin: AdminView,
    notifications: NotificationQueue,
    api_client: ApiClient,
    coordinator: DownloadCoordinator,
    refresher: AdminRefresher,
    // Loading toast shown while the eviction DELETE is pending
    clearing_toast: Option<u64>,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadApp {
    pub fn new() -> Self {
        let api_client = ApiClient::new(Default::default());

        Self {
            screen: Screen::Download,
            download: DownloadView::default(),
            admin: AdminView::default(),
            notifications: NotificationQueue::default(),
            coordinator: DownloadCoordinator::new(api_client.clone()),
            refresher: AdminRefresher::new(api_client.clone()),
            api_client,
            clearing_toast: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    Ui(UiMessage),
    /// Event from the in-flight download attempt
    Download(DownloadEvent),
    /// Joined result of the parallel status+logs fetch
    AdminRefreshed(RefreshOutcome),
    HealthChecked(Result<(), AppError>),
    CacheCleared(Result<(), AppError>),
    /// Status-only re-poll after a successful eviction
    CacheStatusRefetched(Result<CacheStatus, AppError>),
    NotificationExpired(u64),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::Ui(ui_msg) => {
            app.download.update(ui_msg.clone());

            match ui_msg {
                UiMessage::SubmitPressed => submit(app),
                UiMessage::HealthCheckPressed => {
                    let client = app.api_client.clone();
                    Task::perform(
                        async move { client.health().await.map_err(AppError::from) },
                        Message::HealthChecked,
                    )
                }
                UiMessage::ScreenSelected(screen) => {
                    app.screen = screen;
                    // each entry to the admin screen behaves like a mount
                    if screen == Screen::Admin {
                        start_refresh(app)
                    } else {
                        Task::none()
                    }
                }
                UiMessage::RefreshPressed => start_refresh(app),
                UiMessage::ClearCachePressed => start_clear_cache(app),
                UiMessage::NotificationDismissed(id) => {
                    app.notifications.dismiss(id);
                    Task::none()
                }
                _ => Task::none(),
            }
        }
        Message::Download(event) => handle_download_event(app, event),
        Message::AdminRefreshed(outcome) => {
            app.admin.finish_refresh();
            let all_ok = outcome.cache.is_ok() && outcome.logs.is_ok();
            let mut tasks = Vec::new();

            match outcome.cache {
                // replaced wholesale, never merged field by field
                Ok(status) => app.admin.cache = Some(status),
                Err(e) => tasks.push(notify(
                    app,
                    NotificationKind::Error,
                    format!("Failed to fetch cache status: {}", e),
                )),
            }
            match outcome.logs {
                Ok(logs) => app.admin.logs = logs,
                Err(e) => tasks.push(notify(
                    app,
                    NotificationKind::Error,
                    format!("Failed to fetch logs: {}", e),
                )),
            }

            if all_ok {
                tasks.push(notify(
                    app,
                    NotificationKind::Success,
                    "Data refreshed successfully",
                ));
            }

            Task::batch(tasks)
        }
        Message::HealthChecked(result) => match result {
            Ok(()) => notify(
                app,
                NotificationKind::Success,
                "Service is healthy and running!",
            ),
            Err(AppError::Network) => notify(
                app,
                NotificationKind::Error,
                "Unable to connect to service",
            ),
            Err(_) => notify(app, NotificationKind::Error, "Service health check failed"),
        },
        Message::CacheCleared(result) => {
            app.admin.finish_clear();
            if let Some(id) = app.clearing_toast.take() {
                app.notifications.dismiss(id);
            }

            match result {
                Ok(()) => {
                    let toast = notify(
                        app,
                        NotificationKind::Success,
                        "Cache cleared successfully",
                    );
                    let refresher = app.refresher.clone();
                    Task::batch([
                        toast,
                        Task::perform(
                            async move { refresher.cache_status().await },
                            Message::CacheStatusRefetched,
                        ),
                    ])
                }
                Err(e) => notify(app, NotificationKind::Error, e.to_string()),
            }
        }
        Message::CacheStatusRefetched(result) => match result {
            Ok(status) => {
                app.admin.cache = Some(status);
                Task::none()
            }
            Err(e) => notify(
                app,
                NotificationKind::Error,
                format!("Failed to fetch cache status: {}", e),
            ),
        },
        Message::NotificationExpired(id) => {
            app.notifications.dismiss(id);
            Task::none()
        }
    }
}

/// Validates the form and, if it passes, starts the attempt stream. A
/// submit while one attempt is in flight is silently dropped.
fn submit(app: &mut DownloadApp) -> Task<Message> {
    if app.download.attempt.is_in_flight() {
        return Task::none();
    }

    app.download.attempt.reset();
    app.download.resolved_filename = None;
    app.download.attempt.phase = DownloadPhase::Validating;

    match validate_media_url(&app.download.url) {
        UrlCheck::Empty => {
            app.download.attempt.phase = DownloadPhase::Failed;
            return notify(app, NotificationKind::Error, AppError::EmptyUrl.to_string());
        }
        UrlCheck::InvalidDomain => {
            app.download.attempt.phase = DownloadPhase::Failed;
            return notify(
                app,
                NotificationKind::Error,
                AppError::UnsupportedUrl.to_string(),
            );
        }
        UrlCheck::Valid => {}
    }

    let quality = match app.download.quality {
        Some(quality) => quality,
        None => {
            app.download.attempt.phase = DownloadPhase::Failed;
            return notify(
                app,
                NotificationKind::Error,
                AppError::MissingQuality.to_string(),
            );
        }
    };

    // total is unknown until the response headers arrive
    app.download.attempt.phase = DownloadPhase::InFlight {
        progress: Progress::new(0, None),
    };

    let request = DownloadRequest {
        url: app.download.url.trim().to_string(),
        quality,
    };
    Task::stream(app.coordinator.run(request).map(Message::Download))
}

fn handle_download_event(app: &mut DownloadApp, event: DownloadEvent) -> Task<Message> {
    match event {
        DownloadEvent::Connected { filename, total } => {
            if app.download.attempt.is_in_flight() {
                app.download.resolved_filename = Some(filename);
                app.download.attempt.phase = DownloadPhase::InFlight {
                    progress: Progress::new(0, total),
                };
            }
            Task::none()
        }
        DownloadEvent::Progress { loaded, total } => {
            if app.download.attempt.is_in_flight() {
                app.download.attempt.phase = DownloadPhase::InFlight {
                    progress: Progress::new(loaded, total),
                };
            }
            Task::none()
        }
        DownloadEvent::ServerMessage(text) => {
            app.download.attempt.phase = DownloadPhase::Succeeded { filename: None };
            notify(app, NotificationKind::Success, text)
        }
        DownloadEvent::SaveCancelled => {
            app.download.attempt.reset();
            notify(app, NotificationKind::Info, "Download cancelled")
        }
        DownloadEvent::Saved(_path) => {
            app.download.attempt.phase = DownloadPhase::Succeeded {
                filename: app.download.resolved_filename.clone(),
            };
            notify(
                app,
                NotificationKind::Success,
                "Download completed successfully!",
            )
        }
        DownloadEvent::Failed(e) => {
            app.download.attempt.phase = DownloadPhase::Failed;
            notify(app, NotificationKind::Error, e.to_string())
        }
    }
}

fn start_refresh(app: &mut DownloadApp) -> Task<Message> {
    if !app.admin.begin_refresh() {
        return Task::none();
    }

    let refresher = app.refresher.clone();
    Task::perform(
        async move { refresher.refresh().await },
        Message::AdminRefreshed,
    )
}

fn start_clear_cache(app: &mut DownloadApp) -> Task<Message> {
    if !app.admin.begin_clear() {
        return Task::none();
    }

    let id = app
        .notifications
        .push(NotificationKind::Loading, "Clearing cache...");
    app.clearing_toast = Some(id);

    let refresher = app.refresher.clone();
    Task::batch([
        expiry(id),
        Task::perform(
            async move { refresher.clear_cache().await },
            Message::CacheCleared,
        ),
    ])
}

fn notify(app: &mut DownloadApp, kind: NotificationKind, text: impl Into<String>) -> Task<Message> {
    let id = app.notifications.push(kind, text);
    expiry(id)
}

fn expiry(id: u64) -> Task<Message> {
    Task::perform(tokio::time::sleep(NOTIFICATION_TTL), move |_| {
        Message::NotificationExpired(id)
    })
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    use iced::widget::{button, column, row};

    let nav = row![
        button("Download").on_press(UiMessage::ScreenSelected(Screen::Download)),
        button("Admin").on_press(UiMessage::ScreenSelected(Screen::Admin)),
    ]
    .spacing(10)
    .padding(10);

    let content = match app.screen {
        Screen::Download => app.download.view(),
        Screen::Admin => app.admin.view(),
    };

    iced::Element::from(column![nav, notification_area(&app.notifications), content])
        .map(Message::Ui)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QualityTier;

    fn submit_with(url: &str, quality: Option<QualityTier>) -> DownloadApp {
        let mut app = DownloadApp::new();
        app.download.url = url.to_string();
        app.download.quality = quality;
        let _ = update(&mut app, Message::Ui(UiMessage::SubmitPressed));
        app
    }

    fn notification_texts(app: &DownloadApp) -> Vec<String> {
        app.notifications.iter().map(|n| n.text.clone()).collect()
    }

    #[tokio::test]
    async fn test_empty_url_fails_without_request() {
        let app = submit_with("", Some(QualityTier::P720));
        assert_eq!(app.download.attempt.phase, DownloadPhase::Failed);
        assert_eq!(notification_texts(&app), vec!["Please enter a video URL"]);
    }

    #[tokio::test]
    async fn test_invalid_domain_fails_without_request() {
        let app = submit_with("ftp://x.com/v", Some(QualityTier::P720));
        assert_eq!(app.download.attempt.phase, DownloadPhase::Failed);
        assert_eq!(
            notification_texts(&app),
            vec!["Only YouTube and Instagram links are supported"]
        );
    }

    #[tokio::test]
    async fn test_missing_quality_is_rejected_locally() {
        let app = submit_with("https://youtu.be/abc123", None);
        assert_eq!(app.download.attempt.phase, DownloadPhase::Failed);
        assert_eq!(notification_texts(&app), vec!["Please select a quality"]);
    }

    #[test]
    fn test_valid_submit_goes_in_flight_indeterminate() {
        let app = submit_with("https://youtube.com/watch?v=x", Some(QualityTier::P720));
        match &app.download.attempt.phase {
            DownloadPhase::InFlight { progress } => {
                assert_eq!(progress.percent(), None);
            }
            other => panic!("expected InFlight, got {other:?}"),
        }
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_resubmit_while_in_flight_is_dropped() {
        let mut app = submit_with("https://youtube.com/watch?v=x", Some(QualityTier::P720));

        // clear the URL so a second (bad) submit would visibly change state
        app.download.url = String::new();
        let _ = update(&mut app, Message::Ui(UiMessage::SubmitPressed));

        assert!(app.download.attempt.is_in_flight());
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_progress_events_drive_phase() {
        let mut app = submit_with("https://youtube.com/watch?v=x", Some(QualityTier::P720));

        let _ = update(
            &mut app,
            Message::Download(DownloadEvent::Connected {
                filename: "x_720p.mp4".to_string(),
                total: Some(200),
            }),
        );
        let _ = update(
            &mut app,
            Message::Download(DownloadEvent::Progress {
                loaded: 50,
                total: Some(200),
            }),
        );

        match &app.download.attempt.phase {
            DownloadPhase::InFlight { progress } => assert_eq!(progress.percent(), Some(25)),
            other => panic!("expected InFlight, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_saved_event_carries_resolved_filename() {
        let mut app = submit_with("https://youtube.com/watch?v=x", Some(QualityTier::P720));

        let _ = update(
            &mut app,
            Message::Download(DownloadEvent::Connected {
                filename: "x_720p.mp4".to_string(),
                total: Some(200),
            }),
        );
        let _ = update(
            &mut app,
            Message::Download(DownloadEvent::Saved("/tmp/x_720p.mp4".into())),
        );

        assert_eq!(
            app.download.attempt.phase,
            DownloadPhase::Succeeded {
                filename: Some("x_720p.mp4".to_string())
            }
        );
        assert_eq!(
            notification_texts(&app),
            vec!["Download completed successfully!"]
        );
    }

    #[tokio::test]
    async fn test_server_message_succeeds_without_file() {
        let mut app = submit_with("https://youtube.com/watch?v=x", Some(QualityTier::P720));

        let _ = update(
            &mut app,
            Message::Download(DownloadEvent::ServerMessage("Queued for later".to_string())),
        );

        assert_eq!(
            app.download.attempt.phase,
            DownloadPhase::Succeeded { filename: None }
        );
        assert_eq!(notification_texts(&app), vec!["Queued for later"]);
    }

    #[tokio::test]
    async fn test_failure_is_absorbed_into_terminal_state() {
        let mut app = submit_with("https://youtube.com/watch?v=x", Some(QualityTier::P720));

        let _ = update(
            &mut app,
            Message::Download(DownloadEvent::Failed(AppError::Network)),
        );

        assert_eq!(app.download.attempt.phase, DownloadPhase::Failed);
        assert_eq!(
            notification_texts(&app),
            vec!["Network error. Please try again."]
        );
    }

    #[tokio::test]
    async fn test_terminal_state_allows_resubmit() {
        let mut app = submit_with("https://youtube.com/watch?v=x", Some(QualityTier::P720));
        let _ = update(
            &mut app,
            Message::Download(DownloadEvent::Failed(AppError::Network)),
        );

        let _ = update(&mut app, Message::Ui(UiMessage::SubmitPressed));
        assert!(app.download.attempt.is_in_flight());
    }

    #[tokio::test]
    async fn test_clear_cache_is_single_flight() {
        let mut app = DownloadApp::new();

        let _ = update(&mut app, Message::Ui(UiMessage::ClearCachePressed));
        assert!(app.admin.is_clearing);
        let toasts = notification_texts(&app);
        assert_eq!(toasts, vec!["Clearing cache..."]);

        // second press while pending is a no-op: no second toast
        let _ = update(&mut app, Message::Ui(UiMessage::ClearCachePressed));
        assert_eq!(notification_texts(&app), toasts);
    }

    #[tokio::test]
    async fn test_cache_cleared_dismisses_loading_toast() {
        let mut app = DownloadApp::new();
        let _ = update(&mut app, Message::Ui(UiMessage::ClearCachePressed));

        let _ = update(&mut app, Message::CacheCleared(Ok(())));
        assert!(!app.admin.is_clearing);
        assert_eq!(
            notification_texts(&app),
            vec!["Cache cleared successfully"]
        );
    }

    #[tokio::test]
    async fn test_cache_clear_failure_shows_server_text() {
        let mut app = DownloadApp::new();
        let _ = update(&mut app, Message::Ui(UiMessage::ClearCachePressed));

        let _ = update(
            &mut app,
            Message::CacheCleared(Err(AppError::Server(
                "Failed to clear cache: permission denied".to_string(),
            ))),
        );
        assert_eq!(
            notification_texts(&app),
            vec!["Failed to clear cache: permission denied"]
        );
        // guard released so the operator can retry
        assert!(!app.admin.is_clearing);
    }

    #[tokio::test]
    async fn test_admin_refresh_partial_failure() {
        let mut app = DownloadApp::new();
        let _ = update(&mut app, Message::Ui(UiMessage::RefreshPressed));
        assert!(app.admin.is_refreshing);

        let outcome = RefreshOutcome {
            cache: Ok(CacheStatus {
                files: 2,
                total_size: 2048,
                status: "enabled".to_string(),
            }),
            logs: Err(AppError::Network),
        };
        let _ = update(&mut app, Message::AdminRefreshed(outcome));

        assert!(!app.admin.is_refreshing);
        // status panel got its data; only the logs fetch reported an error
        assert_eq!(app.admin.cache.as_ref().unwrap().files, 2);
        assert!(app.admin.logs.is_empty());
        assert_eq!(
            notification_texts(&app),
            vec!["Failed to fetch logs: Network error. Please try again."]
        );
    }

    #[tokio::test]
    async fn test_admin_screen_refreshes_on_each_entry() {
        let mut app = DownloadApp::new();

        let _ = update(&mut app, Message::Ui(UiMessage::ScreenSelected(Screen::Admin)));
        assert!(app.admin.is_refreshing);

        let _ = update(&mut app, Message::AdminRefreshed(RefreshOutcome {
            cache: Ok(CacheStatus {
                files: 0,
                total_size: 0,
                status: "enabled".to_string(),
            }),
            logs: Ok(Vec::new()),
        }));
        assert!(!app.admin.is_refreshing);

        // re-entering the screen mounts it again
        let _ = update(&mut app, Message::Ui(UiMessage::ScreenSelected(Screen::Download)));
        let _ = update(&mut app, Message::Ui(UiMessage::ScreenSelected(Screen::Admin)));
        assert!(app.admin.is_refreshing);
    }

    #[tokio::test]
    async fn test_full_refresh_reports_success() {
        let mut app = DownloadApp::new();
        let _ = update(&mut app, Message::Ui(UiMessage::RefreshPressed));

        let outcome = RefreshOutcome {
            cache: Ok(CacheStatus {
                files: 1,
                total_size: 1024,
                status: "enabled".to_string(),
            }),
            logs: Ok(Vec::new()),
        };
        let _ = update(&mut app, Message::AdminRefreshed(outcome));

        assert_eq!(
            notification_texts(&app),
            vec!["Data refreshed successfully"]
        );
    }

    #[tokio::test]
    async fn test_health_check_success_toast() {
        let mut app = DownloadApp::new();
        let _ = update(&mut app, Message::HealthChecked(Ok(())));
        assert_eq!(
            notification_texts(&app),
            vec!["Service is healthy and running!"]
        );
    }

    #[tokio::test]
    async fn test_health_check_unreachable_toast() {
        let mut app = DownloadApp::new();
        let _ = update(&mut app, Message::HealthChecked(Err(AppError::Network)));
        assert_eq!(
            notification_texts(&app),
            vec!["Unable to connect to service"]
        );
    }

    #[tokio::test]
    async fn test_health_check_failure_toast() {
        let mut app = DownloadApp::new();
        let _ = update(
            &mut app,
            Message::HealthChecked(Err(AppError::Server(
                "Service health check failed".to_string(),
            ))),
        );
        assert_eq!(
            notification_texts(&app),
            vec!["Service health check failed"]
        );
    }

    #[tokio::test]
    async fn test_notification_expiry_dismisses() {
        let mut app = DownloadApp::new();
        let _ = update(&mut app, Message::Ui(UiMessage::ClearCachePressed));
        let id = app.notifications.iter().next().unwrap().id;

        let _ = update(&mut app, Message::NotificationExpired(id));
        assert!(app.notifications.is_empty());
    }
}
