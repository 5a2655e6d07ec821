use crate::surface::{RadialGradient, Rgba, Surface};

/// One recorded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Clear(f64, f64),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    ClosePath,
    Circle(f64, f64, f64),
    FillColor(Rgba),
    FillGradient(RadialGradient),
    StrokeColor(Rgba),
    LineWidth(f64),
    Fill,
    Stroke,
    FillRect(f64, f64, f64, f64),
}

/// Surface double that records the command stream, for asserting layer
/// order and idempotence without a real canvas.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingSurface {
    pub ops: Vec<Op>,
}

impl RecordingSurface {
    pub fn position<F>(&self, mut pred: F) -> Option<usize>
    where
        F: FnMut(&Op) -> bool,
    {
        self.ops.iter().position(|op| pred(op))
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ops.push(Op::Clear(width, height));
    }

    fn begin_path(&mut self) {
        self.ops.push(Op::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::LineTo(x, y));
    }

    fn close_path(&mut self) {
        self.ops.push(Op::ClosePath);
    }

    fn circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.ops.push(Op::Circle(cx, cy, radius));
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.ops.push(Op::FillColor(color));
    }

    fn set_fill_gradient(&mut self, gradient: &RadialGradient) {
        self.ops.push(Op::FillGradient(gradient.clone()));
    }

    fn set_stroke_color(&mut self, color: Rgba) {
        self.ops.push(Op::StrokeColor(color));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ops.push(Op::LineWidth(width));
    }

    fn fill(&mut self) {
        self.ops.push(Op::Fill);
    }

    fn stroke(&mut self) {
        self.ops.push(Op::Stroke);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::FillRect(x, y, width, height));
    }
}
