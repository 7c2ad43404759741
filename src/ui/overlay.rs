/// Anomaly overlay drawn over the comparison photos
/// Heatmap spots mark anomaly locations, contours trace their outlines
use cgmath::{ElementWise, Vector2};
use iced::mouse::Cursor;
use iced::widget::canvas::{self, LineDash, Path, Program, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::config::ReferenceFrame;
use crate::state::data::{Anomaly, Point2, Severity};
use crate::Message;

/// How anomaly coordinates are expressed in the data set
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateSpace {
    /// Pixels in a fixed reference frame
    Pixels(ReferenceFrame),
    /// Fractions of the photo size
    Normalized,
}

impl From<Option<ReferenceFrame>> for CoordinateSpace {
    fn from(frame: Option<ReferenceFrame>) -> Self {
        frame.map_or(CoordinateSpace::Normalized, CoordinateSpace::Pixels)
    }
}

impl CoordinateSpace {
    /// Project a data set coordinate onto a canvas of `size`
    pub fn project(self, point: Point2, size: Size) -> Option<Point> {
        let scale = match self {
            CoordinateSpace::Pixels(frame) => {
                if frame.width <= 0.0 || frame.height <= 0.0 {
                    return None;
                }
                Vector2::new(size.width / frame.width, size.height / frame.height)
            }
            CoordinateSpace::Normalized => Vector2::new(size.width, size.height),
        };

        let projected = Vector2::new(point.x, point.y).mul_element_wise(scale);
        Some(Point::new(projected.x, projected.y))
    }
}

/// Shapes to draw for the current toggles, in canvas coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayShapes {
    pub spots: Vec<(Point, Severity)>,
    pub outlines: Vec<Vec<Point>>,
}

impl OverlayShapes {
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty() && self.outlines.is_empty()
    }
}

pub struct AnomalyOverlay<'a> {
    pub anomalies: &'a [Anomaly],
    pub space: CoordinateSpace,
    pub show_heatmap: bool,
    pub show_contours: bool,
}

impl AnomalyOverlay<'_> {
    pub fn shapes(&self, size: Size) -> OverlayShapes {
        let mut shapes = OverlayShapes::default();

        for anomaly in self.anomalies {
            if self.show_heatmap {
                if let Some(center) = self.space.project(anomaly.location, size) {
                    shapes.spots.push((center, anomaly.severity));
                }
            }

            if self.show_contours {
                let outline: Option<Vec<Point>> = anomaly
                    .outline
                    .iter()
                    .flatten()
                    .map(|point| self.space.project(*point, size))
                    .collect();

                if let Some(outline) = outline.filter(|points| points.len() >= 2) {
                    shapes.outlines.push(outline);
                }
            }
        }

        shapes
    }
}

fn severity_color(severity: Severity, alpha: f32) -> Color {
    match severity {
        Severity::Low => Color::from_rgba(0.96, 0.75, 0.2, alpha),
        Severity::Medium => Color::from_rgba(0.96, 0.5, 0.2, alpha),
        Severity::High => Color::from_rgba(0.93, 0.2, 0.3, alpha),
    }
}

impl Program<Message> for AnomalyOverlay<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let shapes = self.shapes(bounds.size());

        if shapes.is_empty() {
            return vec![frame.into_geometry()];
        }

        for (center, severity) in &shapes.spots {
            frame.fill(&Path::circle(*center, 30.0), severity_color(*severity, 0.2));
            frame.fill(&Path::circle(*center, 20.0), severity_color(*severity, 0.3));
            frame.fill(&Path::circle(*center, 4.0), severity_color(*severity, 1.0));
        }

        for outline in &shapes.outlines {
            let polygon = Path::new(|builder| {
                builder.move_to(outline[0]);
                for point in &outline[1..] {
                    builder.line_to(*point);
                }
                builder.close();
            });

            frame.stroke(
                &polygon,
                Stroke {
                    line_dash: LineDash {
                        segments: &[5.0, 5.0],
                        offset: 0,
                    },
                    ..Stroke::default()
                        .with_color(Color::from_rgb(0.93, 0.2, 0.3))
                        .with_width(2.0)
                },
            );
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::fixtures::anomaly;

    fn triangle() -> Option<Vec<Point2>> {
        Some(vec![
            Point2::new(100.0, 100.0),
            Point2::new(200.0, 100.0),
            Point2::new(150.0, 200.0),
        ])
    }

    #[test]
    fn test_pixel_projection_scales_to_canvas() {
        let space = CoordinateSpace::Pixels(ReferenceFrame::default());

        let point = space
            .project(Point2::new(400.0, 300.0), Size::new(400.0, 300.0))
            .unwrap();

        assert_eq!(point, Point::new(200.0, 150.0));
    }

    #[test]
    fn test_normalized_projection() {
        let point = CoordinateSpace::Normalized
            .project(Point2::new(0.25, 0.5), Size::new(800.0, 600.0))
            .unwrap();

        assert_eq!(point, Point::new(200.0, 300.0));
    }

    #[test]
    fn test_degenerate_reference_frame_projects_nothing() {
        let space = CoordinateSpace::Pixels(ReferenceFrame {
            width: 0.0,
            height: 600.0,
        });
        assert!(space.project(Point2::new(1.0, 1.0), Size::new(800.0, 600.0)).is_none());
    }

    #[test]
    fn test_toggles_select_shapes() {
        let anomalies = vec![
            anomaly(1, 100.0, 100.0, triangle()),
            anomaly(2, 300.0, 300.0, None),
        ];
        let size = Size::new(800.0, 600.0);
        let overlay = |show_heatmap, show_contours| AnomalyOverlay {
            anomalies: &anomalies,
            space: CoordinateSpace::Pixels(ReferenceFrame::default()),
            show_heatmap,
            show_contours,
        };

        assert!(overlay(false, false).shapes(size).is_empty());

        let heatmap = overlay(true, false).shapes(size);
        assert_eq!(heatmap.spots.len(), 2);
        assert!(heatmap.outlines.is_empty());

        let contours = overlay(false, true).shapes(size);
        assert!(contours.spots.is_empty());
        assert_eq!(contours.outlines.len(), 1);
        assert_eq!(contours.outlines[0].len(), 3);
    }

    #[test]
    fn test_empty_anomaly_list_draws_nothing() {
        let overlay = AnomalyOverlay {
            anomalies: &[],
            space: CoordinateSpace::Normalized,
            show_heatmap: true,
            show_contours: true,
        };
        assert!(overlay.shapes(Size::new(800.0, 600.0)).is_empty());
    }

    #[test]
    fn test_single_point_outline_is_skipped() {
        let anomalies = vec![anomaly(1, 0.5, 0.5, Some(vec![Point2::new(0.5, 0.5)]))];
        let overlay = AnomalyOverlay {
            anomalies: &anomalies,
            space: CoordinateSpace::Normalized,
            show_heatmap: false,
            show_contours: true,
        };
        assert!(overlay.shapes(Size::new(100.0, 100.0)).outlines.is_empty());
    }
}
