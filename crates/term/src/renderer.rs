//! TextRenderer: serializes games to a line-oriented stream.
//!
//! Every line starts with `RENDER ` so the stream can share a pipe with other
//! output. Frames are encoded into a reusable buffer first and written in one
//! call, so a reader never sees half a frame.

use std::io::{self, Write};

use anyhow::Result;
use tracing::warn;

use crate::core::{RenderSink, TetrisGame};
use crate::types::{GameStatus, BOARD_HEIGHT, BOARD_WIDTH};

const PREFIX: &str = "RENDER ";

pub struct TextRenderer<W: Write> {
    out: W,
    buf: Vec<u8>,
    write_errors: u64,
}

impl TextRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextRenderer<W> {
    /// Wrap a writer and emit the stream header (`RENDER 0 <width> <height>`)
    pub fn new(out: W) -> Self {
        let mut renderer = Self {
            out,
            buf: Vec::with_capacity(4 * 1024),
            write_errors: 0,
        };
        let _ = encode_header_into(&mut renderer.buf);
        renderer.flush_or_log();
        renderer
    }

    /// Writes that failed so far. Rendering continues after a failure.
    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.out.write_all(&self.buf)?;
        self.out.flush()?;
        Ok(())
    }

    fn flush_or_log(&mut self) {
        if let Err(e) = self.flush_buf() {
            self.write_errors += 1;
            warn!(error = %e, failures = self.write_errors, "render write failed");
        }
        self.buf.clear();
    }
}

impl<W: Write> RenderSink for TextRenderer<W> {
    fn set_games(&mut self, count: usize) {
        self.buf.clear();
        let _ = encode_set_games_into(count, &mut self.buf);
        self.flush_or_log();
    }

    fn render_games(&mut self, games: &[TetrisGame]) {
        self.buf.clear();
        let _ = encode_frame_into(games, &mut self.buf);
        self.flush_or_log();
    }
}

/// `RENDER 0 <width> <height>`
pub fn encode_header_into(out: &mut Vec<u8>) -> Result<()> {
    writeln!(out, "{PREFIX}0 {BOARD_WIDTH} {BOARD_HEIGHT}")?;
    Ok(())
}

/// `RENDER SETGAMES` followed by the new count
pub fn encode_set_games_into(count: usize, out: &mut Vec<u8>) -> Result<()> {
    writeln!(out, "{PREFIX}SETGAMES")?;
    writeln!(out, "{PREFIX}{count}")?;
    Ok(())
}

/// One frame: `RENDER FRAME`, then per game its status code and, while
/// playing, the board rows, the stored piece code (`-1` for none) and the score.
pub fn encode_frame_into(games: &[TetrisGame], out: &mut Vec<u8>) -> Result<()> {
    writeln!(out, "{PREFIX}FRAME")?;

    for game in games {
        let status = game.status();
        writeln!(out, "{PREFIX}{}", status.code())?;
        if status != GameStatus::Playing {
            continue;
        }

        for row in game.view_board() {
            out.extend_from_slice(PREFIX.as_bytes());
            out.extend(row.iter().map(|&cell| b'0' + cell));
            out.push(b'\n');
        }

        let stored = game.stored_piece().map_or(-1, |kind| kind.code());
        writeln!(out, "{PREFIX}{stored}")?;
        writeln!(out, "{PREFIX}{}", game.score())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn lines(buf: &[u8]) -> Vec<String> {
        String::from_utf8(buf.to_vec())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn header_on_construction() {
        let r = TextRenderer::new(Vec::new());
        assert_eq!(lines(r.get_ref()), vec!["RENDER 0 10 20"]);
    }

    #[test]
    fn set_games_emits_two_lines() {
        let mut r = TextRenderer::new(Vec::new());
        r.set_games(3);
        assert_eq!(
            lines(r.get_ref()),
            vec!["RENDER 0 10 20", "RENDER SETGAMES", "RENDER 3"]
        );
    }

    #[test]
    fn ready_game_is_one_line() {
        let games = [TetrisGame::new(1)];
        let mut buf = Vec::new();
        encode_frame_into(&games, &mut buf).unwrap();
        assert_eq!(lines(&buf), vec!["RENDER FRAME", "RENDER 0"]);
    }

    #[test]
    fn playing_game_has_board_stored_and_score() {
        let mut game = TetrisGame::new(1);
        game.start();
        game.spawn_piece(Some(PieceKind::Square));
        game.board_mut().set(0, 19, true);

        let mut buf = Vec::new();
        encode_frame_into(&[game], &mut buf).unwrap();
        let out = lines(&buf);

        assert_eq!(out.len(), 1 + 1 + 20 + 2);
        assert_eq!(out[1], "RENDER 1");
        assert_eq!(out[2], "RENDER 0000220000");
        assert_eq!(out[3], "RENDER 0000220000");
        assert_eq!(out[21], "RENDER 1000000000");
        assert_eq!(out[22], "RENDER -1");
        assert_eq!(out[23], "RENDER 0");
    }

    #[test]
    fn stored_piece_code() {
        let mut game = TetrisGame::new(1);
        game.start();
        game.spawn_piece(Some(PieceKind::T));
        game.store();

        let mut buf = Vec::new();
        encode_frame_into(&[game], &mut buf).unwrap();
        let out = lines(&buf);
        assert_eq!(out[22], "RENDER 2");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_counted_not_fatal() {
        let mut r = TextRenderer::new(BrokenPipe);
        r.render_games(&[TetrisGame::new(1)]);
        assert_eq!(r.write_errors(), 2);
    }
}
