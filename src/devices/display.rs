use anyhow::Result;
use log::info;

/// Columns that fit on a 128 px wide panel with the 8 px font.
pub const PANEL_COLUMNS: usize = 16;

/// A monochrome text panel: clear, place text, then commit.
pub trait DisplaySurface {
    fn clear(&mut self);

    fn text(&mut self, text: &str, x: i32, y: i32);

    fn show(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub x: i32,
    pub y: i32,
}

/// A full panel's worth of text, drawn onto a cleared surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub lines: Vec<TextLine>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, text: impl Into<String>, y: i32) -> Self {
        self.lines.push(TextLine {
            text: text.into(),
            x: 0,
            y,
        });
        self
    }

    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    pub fn draw_on<D: DisplaySurface>(&self, surface: &mut D) -> Result<()> {
        surface.clear();
        for line in &self.lines {
            surface.text(&line.text, line.x, line.y);
        }
        surface.show()
    }
}

/// Host stand-in for an SSD1306 panel: each committed frame that differs
/// from the previous one is written to the log.
pub struct TerminalDisplay {
    name: String,
    canvas: Vec<TextLine>,
    shown: Vec<TextLine>,
}

impl TerminalDisplay {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            canvas: Vec::new(),
            shown: Vec::new(),
        }
    }

    /// Text currently visible, top to bottom, clipped to the panel width.
    pub fn visible_lines(&self) -> Vec<String> {
        let mut lines = self.shown.clone();
        lines.sort_by_key(|line| (line.y, line.x));
        lines
            .into_iter()
            .map(|line| line.text.chars().take(PANEL_COLUMNS).collect())
            .collect()
    }
}

impl DisplaySurface for TerminalDisplay {
    fn clear(&mut self) {
        self.canvas.clear();
    }

    fn text(&mut self, text: &str, x: i32, y: i32) {
        self.canvas.push(TextLine {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn show(&mut self) -> Result<()> {
        if self.canvas == self.shown {
            return Ok(());
        }
        self.shown = self.canvas.clone();
        info!("[{}] {}", self.name, self.visible_lines().join(" | "));
        Ok(())
    }
}
