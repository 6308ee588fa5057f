//! Terminal rendering of the dashboard: a count-up line, then the cards.

use std::io::{self, Write};
use std::time::Duration;

use hunterdash_app::dashboard::{Dashboard, StatCard};
use hunterdash_domain::count_up::CountUp;

/// One animation frame, `elapsed` into a count-up that starts at zero.
pub fn frame_line(dashboard: &Dashboard, elapsed: Duration) -> String {
    let shown: Vec<String> = dashboard
        .cards()
        .iter()
        .map(|card| format!("{}: {}", card.label, from_zero(card).formatted_at(elapsed)))
        .collect();
    shown.join(" | ")
}

fn from_zero(card: &StatCard) -> CountUp {
    CountUp::new(card.total).with_duration(card.animation.duration())
}

/// Play the count-up over `frames` frames, then print the settled cards.
///
/// # Errors
///
/// Returns any error raised while writing to `out`.
pub async fn play<W: Write>(dashboard: &Dashboard, frames: u32, out: &mut W) -> io::Result<()> {
    let duration = dashboard.users.animation.duration();
    if frames > 0 && !duration.is_zero() {
        let step = duration / frames;
        for frame in 1..=frames {
            write!(out, "\r{}", frame_line(dashboard, step * frame))?;
            out.flush()?;
            tokio::time::sleep(step).await;
        }
        writeln!(out)?;
    }
    writeln!(out, "{dashboard}")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hunterdash_app::dashboard::DashboardConfig;
    use hunterdash_app::store::StoreState;

    fn dashboard() -> Dashboard {
        let mut state = StoreState::default();
        state.user.meta.total = 57;
        state.resume.meta.total = 1_023;
        Dashboard::from_state(&state, &DashboardConfig::default())
    }

    #[test]
    fn should_start_frames_at_zero() {
        assert_eq!(frame_line(&dashboard(), Duration::ZERO), "User: 0 | CV: 0");
    }

    #[test]
    fn should_end_frames_on_totals() {
        assert_eq!(
            frame_line(&dashboard(), Duration::from_secs(2)),
            "User: 57 | CV: 1,023"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_print_frames_then_cards() {
        let mut out = Vec::new();
        play(&dashboard(), 4, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches('\r').count(), 4);
        assert!(text.contains("\rUser: 57 | CV: 1,023\n"));
        assert!(text.ends_with("Tổng số User\n  User: 57\nTổng số CV\n  CV: 1,023\n"));
    }

    #[tokio::test]
    async fn should_print_only_cards_without_frames() {
        let mut out = Vec::new();
        play(&dashboard(), 0, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Tổng số User\n  User: 57\nTổng số CV\n  CV: 1,023\n");
    }
}
