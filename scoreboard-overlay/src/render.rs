use crate::view::ScoreboardView;
use macroquad::prelude::*;

const FONT_SIZE: u16 = 72;
const LINE_HEIGHT: f32 = 96.0;
const TOP_MARGIN: f32 = 110.0;

/// Draws the view's lines centred horizontally, one under the other
pub fn draw(view: &ScoreboardView) {
    for (i, line) in view.lines().iter().enumerate() {
        let dims = measure_text(line, None, FONT_SIZE, 1.0);
        let x = (screen_width() - dims.width) / 2.0;
        let y = TOP_MARGIN + LINE_HEIGHT * i as f32;
        draw_text(line, x, y, FONT_SIZE as f32, WHITE);
    }
}

pub fn window_conf() -> Conf {
    Conf {
        window_title: String::from("Scoreboard Overlay"),
        window_width: 1280,
        window_height: 400,
        window_resizable: false,
        ..Default::default()
    }
}
