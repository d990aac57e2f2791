use iced::{
    widget::{button, column, pick_list, progress_bar, row, scrollable, text, text_input, Column, Space},
    Element, Length,
};

use crate::api::{CacheStatus, LogEntry};
use crate::domain::{
    DownloadAttempt, DownloadPhase, NotificationKind, NotificationQueue, QualityTier,
};
use crate::utils::format_size;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Download,
    Admin,
}

#[derive(Debug, Clone)]
pub enum UiMessage {
    UrlChanged(String),
    QualitySelected(QualityTier),
    SubmitPressed,
    HealthCheckPressed,
    ScreenSelected(Screen),
    RefreshPressed,
    ClearCachePressed,
    NotificationDismissed(u64),
}

/// Download form state. Everything shown about the attempt derives from
/// `attempt.phase`; there are no parallel booleans to drift out of sync.
pub struct DownloadView {
    pub url: String,
    pub quality: Option<QualityTier>,
    pub attempt: DownloadAttempt,
    pub resolved_filename: Option<String>,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            url: String::new(),
            quality: None,
            attempt: DownloadAttempt::default(),
            resolved_filename: None,
        }
    }
}

impl DownloadView {
    pub fn update(&mut self, message: UiMessage) {
        match message {
            UiMessage::UrlChanged(url) => {
                self.url = url;
            }
            UiMessage::QualitySelected(quality) => {
                self.quality = Some(quality);
            }
            _ => {
                // handled by the app
            }
        }
    }

    pub fn view(&self) -> Element<'_, UiMessage> {
        let submit_enabled = !self.attempt.is_in_flight();

        column![
            text("DownLink").size(32),
            text("Download Your Links With Ease").size(16),
            Space::new().height(Length::Fixed(20.0)),
            text("Video URL:").size(16),
            text_input("https://example.com/video", &self.url)
                .on_input(UiMessage::UrlChanged)
                .padding(10),
            Space::new().height(Length::Fixed(10.0)),
            text("Quality:").size(16),
            pick_list(
                &QualityTier::ALL[..],
                self.quality,
                UiMessage::QualitySelected
            )
            .placeholder("Select quality")
            .padding(10),
            Space::new().height(Length::Fixed(10.0)),
            self.progress_view(),
            Space::new().height(Length::Fixed(20.0)),
            button(if submit_enabled {
                "Start Download"
            } else {
                "Downloading..."
            })
            .on_press_maybe(submit_enabled.then_some(UiMessage::SubmitPressed))
            .padding([10, 20]),
            Space::new().height(Length::Fixed(10.0)),
            button("Check Service Status")
                .on_press(UiMessage::HealthCheckPressed)
                .padding([10, 20]),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }

    fn progress_view(&self) -> Element<'_, UiMessage> {
        match &self.attempt.phase {
            DownloadPhase::Idle => text("").size(14).into(),
            DownloadPhase::Validating => text("Checking URL...").size(14).into(),
            DownloadPhase::InFlight { progress } => match progress.percent() {
                Some(pct) => column![
                    progress_bar(0.0..=100.0, f32::from(pct)),
                    text(format!("Downloading: {}%", pct)).size(14),
                ]
                .spacing(5)
                .into(),
                // Unknown length renders as a looping message, never as 0%.
                None => text(format!(
                    "Downloading... ({} received)",
                    format_size(progress.loaded())
                ))
                .size(14)
                .into(),
            },
            DownloadPhase::Succeeded { filename } => match filename {
                Some(name) => text(format!("Saved: {}", name)).size(14).into(),
                None => text("Done").size(14).into(),
            },
            DownloadPhase::Failed => text("Download failed").size(14).into(),
        }
    }
}

/// Operator dashboard state: cache occupancy, recent logs, and the busy
/// flags that make refresh and eviction single-flight.
pub struct AdminView {
    pub cache: Option<CacheStatus>,
    pub logs: Vec<LogEntry>,
    pub is_refreshing: bool,
    pub is_clearing: bool,
}

impl Default for AdminView {
    fn default() -> Self {
        Self {
            cache: None,
            logs: Vec::new(),
            is_refreshing: false,
            is_clearing: false,
        }
    }
}

impl AdminView {
    /// Claims the refresh busy flag. Returns false if a refresh is already
    /// in flight, in which case the trigger is dropped.
    pub fn begin_refresh(&mut self) -> bool {
        if self.is_refreshing {
            return false;
        }
        self.is_refreshing = true;
        true
    }

    pub fn finish_refresh(&mut self) {
        self.is_refreshing = false;
    }

    /// Claims the eviction busy flag; same single-flight contract as
    /// `begin_refresh`.
    pub fn begin_clear(&mut self) -> bool {
        if self.is_clearing {
            return false;
        }
        self.is_clearing = true;
        true
    }

    pub fn finish_clear(&mut self) {
        self.is_clearing = false;
    }

    pub fn view(&self) -> Element<'_, UiMessage> {
        column![
            text("Admin Dashboard").size(32),
            text("Manage cache and monitor system logs").size(16),
            Space::new().height(Length::Fixed(20.0)),
            button(if self.is_refreshing {
                "Refreshing..."
            } else {
                "Refresh"
            })
            .on_press_maybe((!self.is_refreshing).then_some(UiMessage::RefreshPressed))
            .padding([10, 20]),
            Space::new().height(Length::Fixed(20.0)),
            self.cache_panel(),
            Space::new().height(Length::Fixed(20.0)),
            text("Logs").size(20),
            self.logs_panel(),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }

    fn cache_panel(&self) -> Element<'_, UiMessage> {
        let summary: Element<'_, UiMessage> = match &self.cache {
            Some(cache) => column![
                text(format!("Cache Size: {}", format_size(cache.total_size))).size(16),
                text(format!("Files: {}", cache.files)).size(16),
                text(format!(
                    "Status: {}",
                    if cache.enabled() {
                        "enabled"
                    } else {
                        cache.status.as_str()
                    }
                ))
                .size(16),
            ]
            .spacing(5)
            .into(),
            None => text("No cache data available.").size(14).into(),
        };

        column![
            text("Cache Status").size(20),
            summary,
            Space::new().height(Length::Fixed(10.0)),
            button(if self.is_clearing {
                "Clearing..."
            } else {
                "Clear Cache"
            })
            .on_press_maybe((!self.is_clearing).then_some(UiMessage::ClearCachePressed))
            .padding([10, 20]),
        ]
        .spacing(10)
        .into()
    }

    fn logs_panel(&self) -> Element<'_, UiMessage> {
        if self.logs.is_empty() {
            return text("No logs available.").size(14).into();
        }

        let entries: Vec<Element<'_, UiMessage>> = self
            .logs
            .iter()
            .map(|entry| {
                let mut lines = column![
                    row![
                        text(entry.time.format("%Y-%m-%d %H:%M:%S").to_string()).size(12),
                        Space::new().width(Length::Fixed(10.0)),
                        text(entry.level.label()).size(12),
                    ],
                    text(&entry.msg).size(14),
                ]
                .spacing(2);

                if let Some(attrs) = &entry.attrs {
                    let rendered = serde_json::to_string_pretty(attrs)
                        .unwrap_or_else(|_| "{}".to_string());
                    lines = lines.push(text(rendered).size(12));
                }

                lines.into()
            })
            .collect();

        scrollable(Column::with_children(entries).spacing(10))
            .height(Length::Fixed(300.0))
            .into()
    }
}

/// Renders the currently visible notifications, newest last. Clicking one
/// dismisses it early; otherwise each expires on its own timer.
pub fn notification_area(queue: &NotificationQueue) -> Element<'_, UiMessage> {
    if queue.is_empty() {
        return Space::new().height(Length::Fixed(0.0)).into();
    }

    let entries: Vec<Element<'_, UiMessage>> = queue
        .iter()
        .map(|notification| {
            button(text(format!(
                "{} {}",
                kind_marker(notification.kind),
                notification.text
            )))
            .on_press(UiMessage::NotificationDismissed(notification.id))
            .padding(8)
            .into()
        })
        .collect();

    Column::with_children(entries).spacing(5).padding(10).into()
}

fn kind_marker(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "[ok]",
        NotificationKind::Error => "[error]",
        NotificationKind::Loading => "[...]",
        NotificationKind::Info => "[info]",
    }
}
