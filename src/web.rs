//! Browser surface: replays frames onto a `<canvas>` 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.

use wasm_bindgen::{Clamped, JsValue};
use web_sys::{CanvasRenderingContext2d, ImageData};

use crate::geometry::{Point, Rect};
use crate::image_load::DecodedImage;
use crate::render::{Stroke, Surface, TextAlign, TextStyle};

impl Surface for CanvasRenderingContext2d {
    type Error = JsValue;

    fn begin(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        let canvas = self
            .canvas()
            .ok_or_else(|| JsValue::from_str("context is not attached to a canvas"))?;
        // Assigning the size resets the backing store even when unchanged.
        canvas.set_width(width);
        canvas.set_height(height);
        self.clear_rect(0.0, 0.0, f64::from(width), f64::from(height));
        Ok(())
    }

    fn draw_image(&mut self, image: &DecodedImage) -> Result<(), JsValue> {
        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(&image.rgba[..]), image.width, image.height)?;
        self.put_image_data(&data, 0.0, 0.0)
    }

    fn stroke_rect(&mut self, rect: &Rect, stroke: &Stroke) -> Result<(), JsValue> {
        apply_stroke(self, stroke)?;
        CanvasRenderingContext2d::stroke_rect(self, rect.x, rect.y, rect.width, rect.height);
        reset_stroke(self)
    }

    fn fill_rect(&mut self, rect: &Rect, color: &str) -> Result<(), JsValue> {
        self.set_fill_style_str(color);
        CanvasRenderingContext2d::fill_rect(self, rect.x, rect.y, rect.width, rect.height);
        Ok(())
    }

    fn line(&mut self, from: Point, to: Point, stroke: &Stroke) -> Result<(), JsValue> {
        apply_stroke(self, stroke)?;
        self.begin_path();
        self.move_to(from.x, from.y);
        self.line_to(to.x, to.y);
        self.stroke();
        reset_stroke(self)
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) -> Result<(), JsValue> {
        self.set_fill_style_str(&style.color);
        self.set_font(&style.font);
        self.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        });
        self.set_text_baseline("middle");
        CanvasRenderingContext2d::fill_text(self, text, at.x, at.y)
    }
}

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: &Stroke) -> Result<(), JsValue> {
    ctx.set_stroke_style_str(&stroke.color);
    ctx.set_line_width(stroke.width);
    ctx.set_global_alpha(stroke.alpha);
    let dash = js_sys::Array::new();
    if let Some([on, off]) = stroke.dash {
        dash.push(&JsValue::from_f64(on));
        dash.push(&JsValue::from_f64(off));
    }
    ctx.set_line_dash(&dash)
}

fn reset_stroke(ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
    ctx.set_global_alpha(1.0);
    ctx.set_line_dash(&js_sys::Array::new())
}
