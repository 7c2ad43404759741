/// Before/after comparison slider
///
/// `GestureSlider` turns a horizontal drag on the divider handle into a
/// split fraction in [0, 1]: the "after" photo is revealed left of the
/// divider, the "before" photo right of it. `SliderCanvas` is the iced
/// canvas that draws the divider and forwards pointer events.
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::{touch, Color, Pixels, Point, Rectangle, Renderer, Theme};
use tracing::debug;

use super::capture::{CaptureRegistry, PointerCapture};
use crate::Message;

/// Horizontal distance from the divider that still counts as grabbing it
pub const HANDLE_HALF_WIDTH: f32 = 24.0;

/// Split fraction used before the first drag
pub const DEFAULT_SPLIT: f32 = 0.5;

/// Measured geometry of the comparison container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl From<Rectangle> for ContainerBox {
    fn from(bounds: Rectangle) -> Self {
        Self {
            left: bounds.x,
            top: bounds.y,
            width: bounds.width,
            height: bounds.height,
        }
    }
}

/// Map a pointer x coordinate to a split fraction.
///
/// Returns `None` while the container has no usable width yet.
pub fn split_fraction(x: f32, container: ContainerBox) -> Option<f32> {
    let width = container.width;
    if !(width.is_finite() && width > 0.0) || !x.is_finite() {
        return None;
    }
    Some((x - container.left).clamp(0.0, width) / width)
}

/// Pointer events forwarded from the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderEvent {
    /// Pointer or finger went down on the handle
    Pressed,
    /// Pointer or finger moved anywhere while dragging
    Moved {
        x: Option<f32>,
        container: ContainerBox,
    },
    /// Pointer released or finger lifted anywhere
    Released,
}

/// Drag state and split position of one comparison view
#[derive(Debug)]
pub struct GestureSlider {
    split: f32,
    capture: Option<PointerCapture>,
    registry: CaptureRegistry,
}

impl Default for GestureSlider {
    fn default() -> Self {
        Self::new(CaptureRegistry::new())
    }
}

impl GestureSlider {
    pub fn new(registry: CaptureRegistry) -> Self {
        Self {
            split: DEFAULT_SPLIT,
            capture: None,
            registry,
        }
    }

    pub fn split(&self) -> f32 {
        self.split
    }

    pub fn is_dragging(&self) -> bool {
        self.capture.is_some()
    }

    /// Whether `point` lands on the divider handle
    pub fn hits_handle(&self, point: Point, container: ContainerBox) -> bool {
        let divider = container.left + self.split * container.width;
        let inside_vertically =
            point.y >= container.top && point.y <= container.top + container.height;
        inside_vertically && (point.x - divider).abs() <= HANDLE_HALF_WIDTH
    }

    /// Start dragging. The split does not move until the first move event.
    pub fn begin(&mut self) {
        if self.capture.is_none() {
            self.capture = Some(self.registry.acquire());
            debug!(split = self.split, "drag started");
        }
    }

    /// Follow the pointer while dragging.
    ///
    /// Returns the new split, or `None` when the move was ignored (not
    /// dragging, no contact point, container not measured).
    pub fn pointer_moved(&mut self, x: Option<f32>, container: ContainerBox) -> Option<f32> {
        if !self.is_dragging() {
            return None;
        }
        let split = split_fraction(x?, container)?;
        self.split = split;
        Some(split)
    }

    /// Stop dragging; the split stays where it was
    pub fn end(&mut self) {
        if self.capture.take().is_some() {
            debug!(split = self.split, "drag ended");
        }
    }

    pub fn handle(&mut self, event: SliderEvent) {
        match event {
            SliderEvent::Pressed => self.begin(),
            SliderEvent::Moved { x, container } => {
                self.pointer_moved(x, container);
            }
            SliderEvent::Released => self.end(),
        }
    }
}

/// Canvas drawing the divider and handle over the photo stack
pub struct SliderCanvas<'a> {
    pub slider: &'a GestureSlider,
}

impl SliderCanvas<'_> {
    fn press(
        &self,
        position: Option<Point>,
        bounds: Rectangle,
    ) -> (canvas::event::Status, Option<Message>) {
        match position {
            Some(point) if self.slider.hits_handle(point, bounds.into()) => (
                canvas::event::Status::Captured,
                Some(Message::Slider(SliderEvent::Pressed)),
            ),
            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn moved(
        &self,
        x: Option<f32>,
        bounds: Rectangle,
    ) -> (canvas::event::Status, Option<Message>) {
        if !self.slider.is_dragging() {
            return (canvas::event::Status::Ignored, None);
        }
        (
            canvas::event::Status::Captured,
            Some(Message::Slider(SliderEvent::Moved {
                x,
                container: bounds.into(),
            })),
        )
    }

    fn released(&self) -> (canvas::event::Status, Option<Message>) {
        if !self.slider.is_dragging() {
            return (canvas::event::Status::Ignored, None);
        }
        (
            canvas::event::Status::Captured,
            Some(Message::Slider(SliderEvent::Released)),
        )
    }
}

impl Program<Message> for SliderCanvas<'_> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        // Canvas sees every window event, so moves outside the bounds
        // are still tracked while dragging
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                self.press(cursor.position(), bounds)
            }
            // Bounds are in layout coordinates; the cursor has already been
            // translated by any enclosing scrollable, the raw finger position has not
            canvas::Event::Touch(touch::Event::FingerPressed { position, .. }) => {
                self.press(cursor.position().or(Some(position)), bounds)
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { position }) => {
                self.moved(Some(position.x), bounds)
            }
            canvas::Event::Touch(touch::Event::FingerMoved { position, .. }) => {
                self.moved(Some(position.x), bounds)
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
            | canvas::Event::Mouse(mouse::Event::CursorLeft)
            | canvas::Event::Touch(touch::Event::FingerLifted { .. })
            | canvas::Event::Touch(touch::Event::FingerLost { .. }) => self.released(),
            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let accent = Color::from_rgb(0.93, 0.2, 0.3);

        let x = bounds.width * self.slider.split();
        let divider = Path::line(Point::new(x, 0.0), Point::new(x, bounds.height));
        frame.stroke(&divider, Stroke::default().with_color(accent).with_width(4.0));

        let center = Point::new(x, bounds.height / 2.0);
        let radius = if self.slider.is_dragging() {
            HANDLE_HALF_WIDTH + 2.0
        } else {
            HANDLE_HALF_WIDTH
        };
        frame.fill(&Path::circle(center, radius), accent);
        frame.stroke(
            &Path::circle(center, radius),
            Stroke::default().with_color(Color::WHITE).with_width(2.0),
        );

        for (label, position) in [
            ("MOVE-OUT", Point::new(16.0, 16.0)),
            ("MOVE-IN", Point::new(bounds.width - 88.0, 16.0)),
        ] {
            frame.fill_text(canvas::Text {
                content: label.to_string(),
                position,
                color: Color::WHITE,
                size: Pixels(14.0),
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        let over_handle = cursor
            .position()
            .is_some_and(|point| self.slider.hits_handle(point, bounds.into()));

        if self.slider.is_dragging() || over_handle {
            mouse::Interaction::ResizingHorizontally
        } else {
            mouse::Interaction::default()
        }
    }
}
