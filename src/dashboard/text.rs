use super::view::{DashboardView, SectionHeader};
use crate::card::DeviceCardView;
use crate::feed::{CameraFeedView, FeedPhase};
use std::fmt;

impl fmt::Display for SectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.summary())
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.subtitle)?;
        writeln!(f)?;

        writeln!(f, "== {} ==", self.cameras.header)?;
        for feed in &self.cameras.feeds {
            write_feed(f, feed)?;
        }
        writeln!(f)?;

        writeln!(f, "== {} ==", self.devices.header)?;
        for group in &self.devices.groups {
            writeln!(f, "-- {} --", group.title)?;
            for card in &group.cards {
                write_card(f, card)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "== System Status ==")?;
        writeln!(f, "  Devices Online: {}", self.status.devices_online)?;
        writeln!(f, "  Cameras Online: {}", self.status.cameras_online)?;
        write!(f, "  Recording: {}", self.status.cameras_recording)
    }
}

fn write_feed(f: &mut fmt::Formatter<'_>, feed: &CameraFeedView) -> fmt::Result {
    let rec = if feed.rec_indicator { " [REC]" } else { "" };
    writeln!(
        f,
        "  [{}] {} ({}) {}{}",
        feed.id, feed.name, feed.location, feed.status, rec
    )?;

    match feed.overlay.detail {
        Some(detail) => writeln!(f, "      {}: {}", feed.overlay.title, detail)?,
        None => writeln!(f, "      {}", feed.overlay.title)?,
    }

    if feed.phase == FeedPhase::Live {
        writeln!(
            f,
            "      {}{}",
            feed.play_label(),
            if feed.fullscreen { " | Fullscreen" } else { "" }
        )?;
    }
    if feed.retry_available {
        writeln!(f, "      Retry available")?;
    }

    writeln!(
        f,
        "      {} | Last updated: {}",
        feed.recording_label, feed.last_updated
    )
}

fn write_card(f: &mut fmt::Formatter<'_>, card: &DeviceCardView) -> fmt::Result {
    let busy = if card.busy { " ..." } else { "" };
    writeln!(
        f,
        "  [{}] {} ({}) {} {}{}",
        card.id, card.name, card.location, card.status, card.power_label, busy
    )?;

    if let Some(slider) = &card.slider {
        writeln!(
            f,
            "      {}: {} [{}..{}]",
            slider.label, slider.display, slider.min, slider.max
        )?;
    }
    if let Some(notice) = card.offline_notice {
        writeln!(f, "      {}", notice)?;
    }
    Ok(())
}
