//! List renderer - draws a mounted [`DealList`] into a terminal.
//!
//! Every frame is a full repaint of `height` rows wrapped in a synchronized
//! update block:
//!
//! ```text
//! row 0..            cards from `offset`, CARD_LINES rows + 1 separator each
//! ...                blank rows
//! row height - 1     footer "showing X of Y"
//! ```
//!
//! Only whole cards are drawn. The index of the last one drawn is returned
//! so the host can feed it to [`DealList::on_viewport`].

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate};

use super::card::{card_lines, truncate_to_width, CARD_LINES};
use crate::pipeline::{DealList, LoadStatus};
use crate::platform::PlatformContext;
use crate::state::CompletionReport;
use crate::types::DealRecord;

/// Rows taken by one card including its separator.
pub const CARD_ROWS: usize = CARD_LINES + 1;

/// Rows reserved at the bottom for the footer.
pub const FOOTER_ROWS: usize = 1;

/// Result of drawing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Index into the collection of the last card fully drawn.
    pub last_in_view: Option<usize>,
    /// Cards drawn this frame.
    pub drawn: usize,
    /// Completion report fired by this paint, if any.
    pub report: Option<CompletionReport>,
}

/// Full-repaint renderer for a deal list.
#[derive(Debug, Clone)]
pub struct ListRenderer {
    width: u16,
    height: u16,
    offset: usize,
    platform: PlatformContext,
}

impl ListRenderer {
    pub fn new(width: u16, height: u16, platform: PlatformContext) -> Self {
        Self {
            width,
            height,
            offset: 0,
            platform,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// First collection index drawn.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Whole cards that fit in the viewport. At least one.
    pub fn viewport_items(&self) -> usize {
        let rows = (self.height as usize).saturating_sub(FOOTER_ROWS);
        (rows / CARD_ROWS).max(1)
    }

    /// Draw the list and notify it that the paint was committed.
    ///
    /// `badge_sub_text` supplies the live sub-text for a deal's badge
    /// (countdown display); return `None` to use the stored one.
    pub fn render<W, F>(&mut self, out: &mut W, list: &DealList, badge_sub_text: F) -> io::Result<Frame>
    where
        W: Write,
        F: Fn(&DealRecord) -> Option<String>,
    {
        let width = self.width as usize;
        let height = self.height as usize;
        let body_rows = height.saturating_sub(FOOTER_ROWS);
        let slice = list.visible_slice();

        self.offset = self.offset.min(slice.len().saturating_sub(1));

        queue!(out, BeginSynchronizedUpdate)?;

        let mut row = 0usize;
        let mut drawn = 0usize;
        match list.status() {
            LoadStatus::Ready { .. } => {
                for deal in slice.iter().skip(self.offset) {
                    if row + CARD_LINES > body_rows {
                        break;
                    }
                    let sub_text = badge_sub_text(deal);
                    let lines = card_lines(deal, width, sub_text.as_deref(), &self.platform);
                    for (i, line) in lines.iter().enumerate() {
                        self.line(out, row, line, i == 0)?;
                        row += 1;
                    }
                    if row < body_rows {
                        self.line(out, row, "", false)?;
                        row += 1;
                    }
                    drawn += 1;
                }
            }
            status => {
                if body_rows > 0 {
                    self.line(out, 0, &status_text(&status), false)?;
                    row = 1;
                }
            }
        }

        for blank in row..body_rows {
            self.line(out, blank, "", false)?;
        }
        if height > 0 {
            let footer = format!("showing {} of {}", slice.len(), slice.total());
            self.line(out, height - 1, &footer, false)?;
        }

        queue!(out, EndSynchronizedUpdate)?;
        out.flush()?;

        let last_in_view = drawn.checked_sub(1).map(|last| self.offset + last);
        let report = list.paint_committed();
        Ok(Frame {
            last_in_view,
            drawn,
            report,
        })
    }

    fn line<W: Write>(&self, out: &mut W, row: usize, text: &str, bold: bool) -> io::Result<()> {
        let text = truncate_to_width(text, self.width as usize);
        queue!(out, MoveTo(0, row as u16), Clear(ClearType::CurrentLine))?;
        if bold {
            queue!(
                out,
                SetAttribute(Attribute::Bold),
                Print(text),
                SetAttribute(Attribute::Reset)
            )
        } else {
            queue!(out, Print(text))
        }
    }
}

fn status_text(status: &LoadStatus) -> String {
    match status {
        LoadStatus::Idle => String::new(),
        LoadStatus::Loading => "loading deals…".to_string(),
        LoadStatus::Empty => "no deals".to_string(),
        LoadStatus::Failed { reason } => format!("failed to load deals: {reason}"),
        LoadStatus::Ready { total } => format!("{total} deals"),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::config::RevealConfig;
    use crate::engine::ManualClock;
    use crate::error::LoadError;
    use crate::state::LogSink;

    fn deals(n: usize) -> Vec<DealRecord> {
        (0..n)
            .map(|i| DealRecord {
                deal_id: i.to_string(),
                deal_image: String::new(),
                badges: Vec::new(),
                deal_title: format!("deal {i}"),
                price: 9.9,
                original_price: 20.0,
                button_text: "buy".into(),
            })
            .collect()
    }

    fn mounted() -> DealList {
        DealList::mount(
            RevealConfig::default(),
            Rc::new(ManualClock::new(0.0)),
            Rc::new(LogSink),
        )
    }

    fn render(renderer: &mut ListRenderer, list: &DealList) -> (Frame, String) {
        let mut out = Vec::new();
        let frame = renderer.render(&mut out, list, |_| None).unwrap();
        (frame, String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn test_viewport_items() {
        assert_eq!(ListRenderer::new(40, 11, PlatformContext::Browser).viewport_items(), 2);
        assert_eq!(ListRenderer::new(40, 3, PlatformContext::Browser).viewport_items(), 1);
    }

    #[test]
    fn test_draws_whole_cards_only() {
        let list = mounted();
        let ticket = list.begin_load();
        list.finish_load(ticket, Ok(deals(10)));

        // 11 rows: 10 body rows hold two 5-row cards.
        let mut renderer = ListRenderer::new(40, 11, PlatformContext::Browser);
        let (frame, text) = render(&mut renderer, &list);
        assert_eq!(frame.drawn, 2);
        assert_eq!(frame.last_in_view, Some(1));
        assert!(text.contains("deal 0"));
        assert!(text.contains("deal 1"));
        assert!(!text.contains("deal 2"));
        assert!(text.contains("showing 4 of 10"));
        assert!(text.contains("¥9.9  ¥20  [buy]"));
    }

    #[test]
    fn test_offset_shifts_last_in_view() {
        let list = mounted();
        let ticket = list.begin_load();
        list.finish_load(ticket, Ok(deals(10)));

        let mut renderer = ListRenderer::new(40, 11, PlatformContext::Browser);
        renderer.set_offset(2);
        let (frame, text) = render(&mut renderer, &list);
        assert_eq!(frame.last_in_view, Some(3));
        assert!(text.contains("deal 3"));
        assert!(!text.contains("deal 1"));
    }

    #[test]
    fn test_offset_clamped_to_window() {
        let list = mounted();
        let ticket = list.begin_load();
        list.finish_load(ticket, Ok(deals(10)));

        let mut renderer = ListRenderer::new(40, 30, PlatformContext::Browser);
        renderer.set_offset(50);
        let (frame, _) = render(&mut renderer, &list);
        assert_eq!(renderer.offset(), 3);
        assert_eq!(frame.last_in_view, Some(3));
    }

    #[test]
    fn test_status_lines() {
        let list = mounted();
        let mut renderer = ListRenderer::new(60, 10, PlatformContext::Browser);

        let ticket = list.begin_load();
        let (frame, text) = render(&mut renderer, &list);
        assert!(text.contains("loading deals"));
        assert_eq!(frame.last_in_view, None);

        list.finish_load(ticket, Err(LoadError::unavailable("timeout")));
        let (_, text) = render(&mut renderer, &list);
        assert!(text.contains("failed to load deals"));

        let ticket = list.begin_load();
        list.finish_load(ticket, Ok(Vec::new()));
        let (frame, text) = render(&mut renderer, &list);
        assert!(text.contains("no deals"));
        assert_eq!(frame.drawn, 0);
        assert!(frame.report.is_none());
    }

    #[test]
    fn test_live_badge_text() {
        let list = mounted();
        let mut items = deals(1);
        items[0].badges.push(crate::types::BadgeItem {
            text: "限时".into(),
            sub_text: Some("1:00:00".into()),
            kind: crate::types::BadgeKind::Countdown,
        });
        let ticket = list.begin_load();
        list.finish_load(ticket, Ok(items));

        let mut renderer = ListRenderer::new(40, 11, PlatformContext::Browser);
        let mut out = Vec::new();
        renderer
            .render(&mut out, &list, |_| Some("00:59:59".to_string()))
            .unwrap();
        assert!(String::from_utf8_lossy(&out).contains("限时 00:59:59"));
    }
}
