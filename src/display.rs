//! Terminal presentation backend. All terminal output lives here.
//!
//! The core hands over a render list in window pixels; this module maps
//! pixels onto terminal cells and picks a glyph and colour per entity kind
//! and animation row. No game logic is performed here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use space_invader::behavior::rows;
use space_invader::scheduler::{Drawable, SpriteFrame, Surface, TextLine, TextStyle};
use space_invader::{EntityKind, GameError, Vec2};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD: Color = Color::Yellow;
const C_BANNER: Color = Color::White;
const C_PLAYER: Color = Color::White;
const C_BOSS: Color = Color::Red;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_BULLET_BOSS: Color = Color::Red;
const C_EXPLOSION: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// Enemy recolor variants, cycled across spawn columns.
const ENEMY_PALETTE: [Color; 4] = [Color::Green, Color::Red, Color::Yellow, Color::Magenta];

// ── Surface ───────────────────────────────────────────────────────────────────

pub struct TerminalSurface<W: Write> {
    out: W,
    world: Vec2,
    width: u16,
    height: u16,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, world: Vec2) -> std::io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self {
            out,
            world,
            width,
            height,
        })
    }

    /// Window pixels → terminal cell inside the border (rows 2..height-2).
    fn cell(&self, position: Vec2) -> (u16, u16) {
        let inner_w = f32::from(self.width.saturating_sub(2).max(1));
        let inner_h = f32::from(self.height.saturating_sub(5).max(1));
        let col = (position.x / self.world.x).clamp(0.0, 1.0) * (inner_w - 1.0) + 1.0;
        let row = (position.y / self.world.y).clamp(0.0, 1.0) * (inner_h - 1.0) + 2.0;
        (col as u16, row as u16)
    }

    fn print_centered(&mut self, col: u16, row: u16, text: &str, color: Color) -> std::io::Result<()> {
        let half = text.chars().count() as u16 / 2;
        self.out.queue(cursor::MoveTo(col.saturating_sub(half).max(1), row))?;
        self.out.queue(style::SetForegroundColor(color))?;
        self.out.queue(Print(text))?;
        Ok(())
    }

    fn draw_border(&mut self) -> std::io::Result<()> {
        let w = self.width as usize;
        let h = self.height;

        self.out.queue(style::SetForegroundColor(C_BORDER))?;

        // Row 1: top bar
        self.out.queue(cursor::MoveTo(0, 1))?;
        self.out
            .queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

        // Row h-2: bottom bar
        self.out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
        self.out
            .queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

        // Side walls
        for row in 2..h.saturating_sub(2) {
            self.out.queue(cursor::MoveTo(0, row))?;
            self.out.queue(Print("│"))?;
            self.out.queue(cursor::MoveTo(self.width.saturating_sub(1), row))?;
            self.out.queue(Print("│"))?;
        }

        // Last row: controls hint
        self.out.queue(cursor::MoveTo(1, h.saturating_sub(1)))?;
        self.out.queue(style::SetForegroundColor(C_HINT))?;
        self.out
            .queue(Print("A D : Move   SPACE : Shoot   P : Pause   ENTER : Start   Q : Quit"))?;
        Ok(())
    }

    fn draw_sprite(&mut self, sprite: &SpriteFrame) -> std::io::Result<()> {
        let (col, row) = self.cell(sprite.position);
        let blink = sprite.column % 2 == 1;
        let dying = sprite.row > rows::ACTION;

        let (glyph, color) = match sprite.kind {
            EntityKind::Player if dying => ("*#*", C_EXPLOSION),
            EntityKind::Player if sprite.row == rows::ACTION => ("/▲\\", C_BULLET_PLAYER),
            EntityKind::Player => ("/▲\\", C_PLAYER),
            EntityKind::Enemy if dying => ("✶✶✶", C_EXPLOSION),
            EntityKind::Enemy => {
                let color = ENEMY_PALETTE[sprite.variant as usize % ENEMY_PALETTE.len()];
                (if blink { "»▼«" } else { "«▼»" }, color)
            }
            EntityKind::Boss if dying => ("✶✶✶✶✶", C_EXPLOSION),
            EntityKind::Boss => ("╔═██═╗", C_BOSS),
            _ if sprite.row == rows::ACTION => ("*", C_EXPLOSION),
            EntityKind::PlayerProjectile => ("║", C_BULLET_PLAYER),
            EntityKind::EnemyProjectile => ("↓", C_BULLET_ENEMY),
            EntityKind::BossProjectile => ("◆", C_BULLET_BOSS),
        };
        self.print_centered(col, row, glyph, color)?;

        // Boss is tall enough for a second row.
        if sprite.kind == EntityKind::Boss && !dying {
            self.print_centered(col, row + 1, if blink { "╚▼▼▼▼╝" } else { "╚▼══▼╝" }, C_BOSS)?;
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &TextLine) -> std::io::Result<()> {
        match text.style {
            TextStyle::Hud => {
                self.out.queue(cursor::MoveTo(1, 0))?;
                self.out.queue(style::SetForegroundColor(C_HUD))?;
                self.out.queue(Print(&text.text))?;
            }
            TextStyle::Banner => {
                let (col, row) = self.cell(text.position);
                let frame = format!("╔{}╗", "═".repeat(text.text.chars().count() + 2));
                let bottom = format!("╚{}╝", "═".repeat(text.text.chars().count() + 2));
                self.print_centered(col, row.saturating_sub(1), &frame, C_BANNER)?;
                self.print_centered(col, row, &format!("║ {} ║", text.text), C_BANNER)?;
                self.print_centered(col, row + 1, &bottom, C_BANNER)?;
            }
        }
        Ok(())
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn clear(&mut self) -> Result<(), GameError> {
        let (width, height) = terminal::size()?;
        self.width = width;
        self.height = height;
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        self.draw_border()?;
        Ok(())
    }

    fn draw(&mut self, item: &Drawable) -> Result<(), GameError> {
        match item {
            Drawable::Sprite(sprite) => self.draw_sprite(sprite)?,
            Drawable::Text(text) => self.draw_text(text)?,
        }
        Ok(())
    }

    fn display(&mut self) -> Result<(), GameError> {
        // Park cursor in a harmless spot and flush
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, self.height.saturating_sub(1)))?;
        self.out.flush()?;
        Ok(())
    }
}
