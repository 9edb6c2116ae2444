use std::{
    cmp::Ordering,
    fmt::Display,
    io::{self, Write},
};

use blockfall_engine::{Board, DrawSurface, TileColor};
use crossterm::{
    cursor,
    style::{self, Color, Print, PrintStyledContent, Stylize},
    terminal, QueueableCommand,
};

type Glyph = (char, Option<Color>);

/// Frame buffer for the playfield and its surroundings.
///
/// Board cells are two characters wide so they look square in most terminals.
/// Only glyphs that changed since the last flush are written out.
#[derive(Clone, Default, Debug)]
pub struct TerminalSurface {
    prev: Vec<Vec<Glyph>>,
    next: Vec<Vec<Glyph>>,
    x_draw: usize,
    y_draw: usize,
}

impl TerminalSurface {
    pub const W_MAIN: u16 = 2 * Board::WIDTH as u16 + 2;
    pub const H_MAIN: u16 = Board::HEIGHT as u16 + 5;

    const CELL_FILLED: &'static str = "██";
    const CELL_EMPTY: &'static str = " .";

    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets what is on screen, forcing the next flush to repaint everything.
    pub fn invalidate(&mut self, (x, y): (usize, usize)) {
        self.prev.clear();
        (self.x_draw, self.y_draw) = (x, y);
    }

    /// Starts a fresh frame containing only the well's border.
    pub fn begin(&mut self) {
        let w_inner = 2 * Board::WIDTH;
        let mut base = Vec::with_capacity(Board::HEIGHT + 2);
        base.push(format!("╔{}╗", "═".repeat(w_inner)));
        for _ in 0..Board::HEIGHT {
            base.push(format!("║{}║", " ".repeat(w_inner)));
        }
        base.push(format!("╚{}╝", "═".repeat(w_inner)));
        self.next = base
            .iter()
            .map(|str| str.chars().zip(std::iter::repeat(None)).collect())
            .collect();
    }

    /// Text centered over the middle of the well.
    pub fn overlay(&mut self, lines: &[&str]) {
        let w_inner = 2 * Board::WIDTH;
        let y_top = 1 + Board::HEIGHT.saturating_sub(lines.len()) / 2;
        for (dy, line) in lines.iter().enumerate() {
            let banner = format!("{line:^w_inner$}");
            self.buffer_str(&banner, Some(Color::White), (1, y_top + dy));
        }
    }

    /// Plain text below the well, `line` counted from its bottom edge.
    pub fn status(&mut self, line: usize, text: &str) {
        self.buffer_str(text, None, (0, Board::HEIGHT + 2 + line));
    }

    fn buffer_str(&mut self, str: &str, fg_color: Option<Color>, (x, y): (usize, usize)) {
        for (x_c, c) in str.chars().enumerate() {
            // Lazy: just fill up until desired starting row and column exist.
            while y >= self.next.len() {
                self.next.push(Vec::new());
            }
            let row = &mut self.next[y];
            while x + x_c >= row.len() {
                row.push((' ', None));
            }
            row[x + x_c] = (c, fg_color);
        }
    }

    fn move_to(&self, term: &mut impl Write, x: usize, y: usize) -> io::Result<()> {
        let col = u16::try_from(self.x_draw + x).unwrap_or(u16::MAX);
        let row = u16::try_from(self.y_draw + y).unwrap_or(u16::MAX);
        term.queue(cursor::MoveTo(col, row))?;
        Ok(())
    }

    fn put(&self, term: &mut impl Write, c: char, x: usize, y: usize) -> io::Result<()> {
        self.move_to(term, x, y)?;
        term.queue(Print(c))?;
        Ok(())
    }

    fn put_styled<D: Display>(
        &self,
        term: &mut impl Write,
        content: style::StyledContent<D>,
        x: usize,
        y: usize,
    ) -> io::Result<()> {
        self.move_to(term, x, y)?;
        term.queue(PrintStyledContent(content))?;
        Ok(())
    }

    fn put_glyph(
        &self,
        term: &mut impl Write,
        (c, col): Glyph,
        x: usize,
        y: usize,
    ) -> io::Result<()> {
        match col {
            Some(col) => self.put_styled(term, c.with(col), x, y),
            None => self.put(term, c, x, y),
        }
    }

    /// Writes the pending frame to `term`.
    pub fn flush(&mut self, term: &mut impl Write) -> io::Result<()> {
        term.queue(terminal::BeginSynchronizedUpdate)?;
        if self.prev.is_empty() {
            // Redraw entire screen.
            term.queue(terminal::Clear(terminal::ClearType::All))?;
            for (y, line) in self.next.iter().enumerate() {
                for (x, glyph) in line.iter().enumerate() {
                    self.put_glyph(term, *glyph, x, y)?;
                }
            }
        } else {
            // Compare next to previous frames and only write differences.
            for (y, (line_prev, line_next)) in self.prev.iter().zip(self.next.iter()).enumerate() {
                for (x, (glyph_prev, glyph_next)) in
                    line_prev.iter().zip(line_next.iter()).enumerate()
                {
                    if glyph_prev == glyph_next {
                        continue;
                    }
                    // Previously colored but not anymore, explicit reset.
                    if glyph_prev.1.is_some() && glyph_next.1.is_none() {
                        self.put_styled(term, glyph_next.0.reset(), x, y)?;
                    } else {
                        self.put_glyph(term, *glyph_next, x, y)?;
                    }
                }
                match line_prev.len().cmp(&line_next.len()) {
                    Ordering::Less => {
                        for (x, glyph) in line_next.iter().enumerate().skip(line_prev.len()) {
                            self.put_glyph(term, *glyph, x, y)?;
                        }
                    }
                    Ordering::Equal => {}
                    Ordering::Greater => {
                        for (x, _) in line_prev.iter().enumerate().skip(line_next.len()) {
                            self.put_styled(term, ' '.reset(), x, y)?;
                        }
                    }
                }
            }
            // Lines that only exist in one of the two frames.
            for (y, line_next) in self.next.iter().enumerate().skip(self.prev.len()) {
                for (x, glyph) in line_next.iter().enumerate() {
                    self.put_glyph(term, *glyph, x, y)?;
                }
            }
            for (y, line_prev) in self.prev.iter().enumerate().skip(self.next.len()) {
                for (x, _) in line_prev.iter().enumerate() {
                    self.put_styled(term, ' '.reset(), x, y)?;
                }
            }
        }
        term.queue(terminal::EndSynchronizedUpdate)?;
        term.flush()?;
        self.prev = std::mem::take(&mut self.next);
        Ok(())
    }

    #[cfg(test)]
    fn line_text(&self, y: usize) -> String {
        self.next[y].iter().map(|(c, _)| c).collect()
    }

    /// The pending frame as plain text, one line per row.
    #[cfg(test)]
    pub(crate) fn screen_text(&self) -> String {
        (0..self.next.len())
            .map(|y| self.line_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DrawSurface for TerminalSurface {
    fn clear(&mut self, color: TileColor) {
        let (tile, fg) = tile_glyph(color);
        for y in 0..Board::HEIGHT {
            for x in 0..Board::WIDTH {
                self.buffer_str(tile, fg, (1 + 2 * x, 1 + y));
            }
        }
    }

    fn fill_cell(&mut self, x: isize, y: isize, color: TileColor) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if x >= Board::WIDTH || y >= Board::HEIGHT {
            return;
        }
        let (tile, fg) = tile_glyph(color);
        self.buffer_str(tile, fg, (1 + 2 * x, 1 + y));
    }
}

fn tile_glyph(color: TileColor) -> (&'static str, Option<Color>) {
    let rgb = |r, g, b| Some(Color::Rgb { r, g, b });
    match color {
        TileColor::Background => (TerminalSurface::CELL_EMPTY, Some(Color::DarkGrey)),
        TileColor::Blue => (TerminalSurface::CELL_FILLED, rgb(0, 0, 255)),
        TileColor::Purple => (TerminalSurface::CELL_FILLED, rgb(128, 0, 128)),
        TileColor::Green => (TerminalSurface::CELL_FILLED, rgb(0, 128, 0)),
        TileColor::Red => (TerminalSurface::CELL_FILLED, rgb(255, 0, 0)),
        TileColor::Pink => (TerminalSurface::CELL_FILLED, rgb(231, 84, 128)),
        TileColor::Brown => (TerminalSurface::CELL_FILLED, rgb(165, 42, 42)),
        TileColor::Yellow => (TerminalSurface::CELL_FILLED, rgb(255, 255, 0)),
    }
}
