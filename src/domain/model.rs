use serde::Serialize;

/// Resolution tiers offered by the backend, plus "best available".
///
/// The wire values are fixed labels; free-text quality never leaves the
/// client because requests can only be built from this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityTier {
    #[serde(rename = "144p")]
    P144,
    #[serde(rename = "240p")]
    P240,
    #[serde(rename = "360p")]
    P360,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "1440p")]
    P1440,
    #[serde(rename = "2160p")]
    P2160,
    #[serde(rename = "best")]
    Best,
}

impl QualityTier {
    pub const ALL: [QualityTier; 9] = [
        QualityTier::P144,
        QualityTier::P240,
        QualityTier::P360,
        QualityTier::P480,
        QualityTier::P720,
        QualityTier::P1080,
        QualityTier::P1440,
        QualityTier::P2160,
        QualityTier::Best,
    ];

    /// The value sent in the request body.
    pub fn wire_value(&self) -> &'static str {
        match self {
            QualityTier::P144 => "144p",
            QualityTier::P240 => "240p",
            QualityTier::P360 => "360p",
            QualityTier::P480 => "480p",
            QualityTier::P720 => "720p",
            QualityTier::P1080 => "1080p",
            QualityTier::P1440 => "1440p",
            QualityTier::P2160 => "2160p",
            QualityTier::Best => "best",
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            QualityTier::P720 => "720p (HD)",
            QualityTier::P1080 => "1080p (Full HD)",
            QualityTier::P1440 => "1440p (2K)",
            QualityTier::P2160 => "2160p (4K)",
            QualityTier::Best => "Best Available",
            other => other.wire_value(),
        };
        f.write_str(label)
    }
}

/// One submitted download request. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadRequest {
    pub url: String,
    pub quality: QualityTier,
}

/// Transfer progress as reported by the transport.
///
/// Unknown total length is a state of its own, not 0%: a transfer that has
/// genuinely moved no bytes yet and one whose length the server never
/// declared must render differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Indeterminate { loaded: u64 },
    Determinate { loaded: u64, total: u64 },
}

impl Progress {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        match total {
            Some(total) if total > 0 => Progress::Determinate { loaded, total },
            _ => Progress::Indeterminate { loaded },
        }
    }

    pub fn loaded(&self) -> u64 {
        match self {
            Progress::Indeterminate { loaded } => *loaded,
            Progress::Determinate { loaded, .. } => *loaded,
        }
    }

    /// Rounded percentage, clamped to [0, 100]. `None` while indeterminate.
    pub fn percent(&self) -> Option<u8> {
        match self {
            Progress::Indeterminate { .. } => None,
            Progress::Determinate { loaded, total } => {
                let pct = (*loaded as f64 / *total as f64 * 100.0).round();
                Some(pct.clamp(0.0, 100.0) as u8)
            }
        }
    }
}

/// The single source of truth for one download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    Validating,
    InFlight { progress: Progress },
    Succeeded { filename: Option<String> },
    Failed,
}

#[derive(Debug, Clone)]
pub struct DownloadAttempt {
    pub phase: DownloadPhase,
}

impl Default for DownloadAttempt {
    fn default() -> Self {
        Self {
            phase: DownloadPhase::Idle,
        }
    }
}

impl DownloadAttempt {
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self.phase,
            DownloadPhase::Validating | DownloadPhase::InFlight { .. }
        )
    }

    /// Resets to a fresh attempt. Called on re-submit.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_known_total() {
        let progress = Progress::new(50, Some(200));
        assert_eq!(progress.percent(), Some(25));
    }

    #[test]
    fn test_percent_unknown_total_is_indeterminate() {
        let progress = Progress::new(50, None);
        assert!(matches!(progress, Progress::Indeterminate { loaded: 50 }));
        assert_eq!(progress.percent(), None);
    }

    #[test]
    fn test_percent_zero_total_is_indeterminate() {
        assert_eq!(Progress::new(0, Some(0)).percent(), None);
    }

    #[test]
    fn test_percent_clamped() {
        // Server lied about content-length; never report more than 100%.
        let progress = Progress::new(300, Some(200));
        assert_eq!(progress.percent(), Some(100));
    }

    #[test]
    fn test_fresh_attempt_is_idle() {
        let attempt = DownloadAttempt::default();
        assert_eq!(attempt.phase, DownloadPhase::Idle);
        assert!(!attempt.is_in_flight());
    }

    #[test]
    fn test_in_flight_detection() {
        let mut attempt = DownloadAttempt::default();
        attempt.phase = DownloadPhase::InFlight {
            progress: Progress::new(0, None),
        };
        assert!(attempt.is_in_flight());

        attempt.phase = DownloadPhase::Failed;
        assert!(!attempt.is_in_flight());
    }

    #[test]
    fn test_quality_wire_values() {
        assert_eq!(QualityTier::P144.wire_value(), "144p");
        assert_eq!(QualityTier::P2160.wire_value(), "2160p");
        assert_eq!(QualityTier::Best.wire_value(), "best");
    }

    #[test]
    fn test_request_serializes_wire_quality() {
        let request = DownloadRequest {
            url: "https://youtube.com/watch?v=x".to_string(),
            quality: QualityTier::P720,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["quality"], "720p");
        assert_eq!(json["url"], "https://youtube.com/watch?v=x");
    }
}
