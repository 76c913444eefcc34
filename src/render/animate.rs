//! The frame loop.
//!
//! One task polls both the frame timer and the pending extraction. Frames
//! keep drawing with whatever parameters the session holds (defaults at
//! first); when extraction finishes its result is applied between frames.

use std::future::Future;
use tokio::time::MissedTickBehavior;

use super::{FrameOutcome, Renderer};
use crate::metadata::ImageMetadata;
use crate::session::{Session, UploadTicket};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationReport {
    /// Frames drawn in total
    pub frames: u64,
    /// Frames drawn while extraction was still pending
    pub frames_before_metadata: u64,
    /// Frames replaced by the fallback glyph
    pub fallbacks: u64,
    /// Whether the extraction result was applied (false if superseded)
    pub applied: bool,
}

/// Run the frame loop until extraction has finished and at least
/// `min_frames` frames have been drawn.
pub async fn animate<F>(
    renderer: &mut Renderer,
    session: &mut Session,
    ticket: UploadTicket,
    extraction: F,
    min_frames: u64,
) -> AnimationReport
where
    F: Future<Output = ImageMetadata>,
{
    let mut interval = tokio::time::interval(renderer.config().frame_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(extraction);

    let mut report = AnimationReport::default();
    let mut pending = true;

    while pending || report.frames < min_frames {
        tokio::select! {
            metadata = &mut extraction, if pending => {
                pending = false;
                report.applied = session.complete(&ticket, metadata);
            }
            _ = interval.tick() => {
                let params = session.store().snapshot();
                if renderer.frame(&params) == FrameOutcome::Fallback {
                    report.fallbacks += 1;
                }
                report.frames += 1;
                if pending {
                    report.frames_before_metadata += 1;
                }
            }
        }
    }

    tracing::debug!(
        frames = report.frames,
        before_metadata = report.frames_before_metadata,
        fallbacks = report.fallbacks,
        "[render] animation finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CanvasConfig;
    use crate::params::RenderParameters;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_frames_continue_while_extraction_pending() {
        let mut session = Session::new(3);
        let ticket = session.begin_upload("slow.jpg");
        let defaults = RenderParameters::default();
        let mut renderer = Renderer::new(CanvasConfig::THUMBNAIL, &defaults, None);

        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            ImageMetadata {
                iso: Some(2000),
                ..Default::default()
            }
        };
        let report = animate(&mut renderer, &mut session, ticket, slow, 3).await;

        assert!(report.applied);
        assert!(report.frames_before_metadata >= 3, "{:?}", report);
        assert!(report.frames >= 3);
        assert_eq!(session.store().snapshot().density, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_extraction_is_not_applied() {
        let mut session = Session::new(3);
        let stale = session.begin_upload("old.jpg");
        let _current = session.begin_upload("new.jpg");
        let defaults = RenderParameters::default();
        let mut renderer = Renderer::new(CanvasConfig::THUMBNAIL, &defaults, None);

        let result = async {
            ImageMetadata {
                iso: Some(2000),
                ..Default::default()
            }
        };
        let report = animate(&mut renderer, &mut session, stale, result, 2).await;

        assert!(!report.applied);
        assert_eq!(session.metadata(), None);
        assert_eq!(report.frames, 2);
    }
}
