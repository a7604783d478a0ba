use std::time::Duration;

/// Fraction of the viewport a drag must cross to count as a decision,
/// per axis (width for left/right, height for up).
pub const SWIPE_THRESHOLD_RATIO: f32 = 0.25;
/// Degrees of card rotation per pixel of horizontal displacement.
const ROTATION_FACTOR: f32 = 0.1;
/// Off-screen exit margin so the card fully clears the viewport.
const EXIT_MARGIN: f32 = 200.0;
const TRIGGER_EXIT_ROTATION: f32 = 30.0;
const TRIGGER_EXIT_LIFT: f32 = -50.0;

/// Settle delay after a physical release: the exit animation window.
pub const RELEASE_SETTLE: Duration = Duration::from_millis(300);
/// Settle delay for a programmatic trigger; longer because there is no
/// release velocity to anchor the animation to.
pub const TRIGGER_SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Displacement of the pointer from the drag start, in pixels. Positive
/// `dy` points down, so an upward swipe has negative `dy`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Displacement {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
}

/// Outcome of classifying a released drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Decisive(SwipeDirection),
    Cancel,
}

/// Declarative rendering target for the frontmost card. The recognizer
/// never touches a rendering layer; whoever draws the card applies this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub rotation: f32,
}

impl CardTransform {
    pub const IDENTITY: CardTransform = CardTransform {
        translate_x: 0.0,
        translate_y: 0.0,
        rotation: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Dragging {
        start: Point,
        displacement: Displacement,
    },
    Settling {
        direction: SwipeDirection,
        programmatic: bool,
        exit: CardTransform,
    },
}

/// Converts a pointer-down/move/up sequence into a discrete swipe
/// decision: Idle -> Dragging -> Settling -> Idle. A settling decision is
/// final; only an in-progress drag can be cancelled back to Idle.
#[derive(Debug)]
pub struct GestureRecognizer {
    phase: Phase,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Begin a drag. Ignored unless Idle: a decision in flight cannot be
    /// grabbed, and a second pointer does not restart an active drag.
    pub fn pointer_down(&mut self, at: Point) {
        if matches!(self.phase, Phase::Idle) {
            self.phase = Phase::Dragging {
                start: at,
                displacement: Displacement::default(),
            };
        }
    }

    pub fn pointer_move(&mut self, at: Point) {
        if let Phase::Dragging { start, displacement } = &mut self.phase {
            displacement.dx = at.x - start.x;
            displacement.dy = at.y - start.y;
        }
    }

    /// End the drag and classify the final displacement. A cancel snaps
    /// straight back to Idle with no emission; a decisive release holds in
    /// Settling until [`complete_settle`](Self::complete_settle).
    pub fn pointer_up(&mut self, viewport: Viewport) -> Classification {
        let Phase::Dragging { displacement, .. } = self.phase else {
            return Classification::Cancel;
        };
        match classify(displacement, viewport) {
            Classification::Decisive(direction) => {
                self.phase = Phase::Settling {
                    direction,
                    programmatic: false,
                    exit: release_exit(direction, displacement, viewport),
                };
                Classification::Decisive(direction)
            }
            Classification::Cancel => {
                self.phase = Phase::Idle;
                Classification::Cancel
            }
        }
    }

    /// A lost pointer is handled exactly like a release at the last known
    /// displacement.
    pub fn pointer_cancel(&mut self, viewport: Viewport) -> Classification {
        self.pointer_up(viewport)
    }

    /// Programmatic decision (action button): skips Dragging entirely.
    /// Returns false when a drag or a previous decision is still active.
    pub fn trigger(&mut self, direction: SwipeDirection, viewport: Viewport) -> bool {
        if !matches!(self.phase, Phase::Idle) {
            return false;
        }
        self.phase = Phase::Settling {
            direction,
            programmatic: true,
            exit: trigger_exit(direction, viewport),
        };
        true
    }

    /// How long the current decision should hold before emission.
    pub fn settle_delay(&self) -> Option<Duration> {
        match self.phase {
            Phase::Settling { programmatic, .. } => Some(if programmatic {
                TRIGGER_SETTLE
            } else {
                RELEASE_SETTLE
            }),
            _ => None,
        }
    }

    /// Emit the settled decision and return to Idle with all transient
    /// state cleared. None when nothing was settling.
    pub fn complete_settle(&mut self) -> Option<SwipeDirection> {
        match self.phase {
            Phase::Settling { direction, .. } => {
                self.phase = Phase::Idle;
                Some(direction)
            }
            _ => None,
        }
    }

    /// Rendering target for the frontmost card.
    pub fn transform(&self) -> CardTransform {
        match self.phase {
            Phase::Idle => CardTransform::IDENTITY,
            Phase::Dragging { displacement, .. } => CardTransform {
                translate_x: displacement.dx,
                translate_y: displacement.dy,
                rotation: displacement.dx * ROTATION_FACTOR,
            },
            Phase::Settling { exit, .. } => exit,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    pub fn is_settling(&self) -> bool {
        matches!(self.phase, Phase::Settling { .. })
    }
}

/// Classify a released displacement. Horizontal wins outright when over
/// its threshold, regardless of vertical travel; only then is an upward
/// swipe considered; anything else snaps back.
pub fn classify(d: Displacement, viewport: Viewport) -> Classification {
    let horizontal = viewport.width * SWIPE_THRESHOLD_RATIO;
    let vertical = viewport.height * SWIPE_THRESHOLD_RATIO;
    if d.dx.abs() > horizontal {
        if d.dx > 0.0 {
            Classification::Decisive(SwipeDirection::Right)
        } else {
            Classification::Decisive(SwipeDirection::Left)
        }
    } else if -d.dy > vertical {
        Classification::Decisive(SwipeDirection::Up)
    } else {
        Classification::Cancel
    }
}

fn release_exit(
    direction: SwipeDirection,
    d: Displacement,
    viewport: Viewport,
) -> CardTransform {
    match direction {
        SwipeDirection::Left | SwipeDirection::Right => {
            let sign = if d.dx > 0.0 { 1.0 } else { -1.0 };
            CardTransform {
                translate_x: (viewport.width + EXIT_MARGIN) * sign,
                translate_y: d.dy,
                rotation: d.dx * ROTATION_FACTOR,
            }
        }
        SwipeDirection::Up => CardTransform {
            translate_x: d.dx,
            translate_y: -(viewport.height + EXIT_MARGIN),
            rotation: 0.0,
        },
    }
}

fn trigger_exit(direction: SwipeDirection, viewport: Viewport) -> CardTransform {
    match direction {
        SwipeDirection::Left => CardTransform {
            translate_x: -(viewport.width + EXIT_MARGIN),
            translate_y: TRIGGER_EXIT_LIFT,
            rotation: -TRIGGER_EXIT_ROTATION,
        },
        SwipeDirection::Right => CardTransform {
            translate_x: viewport.width + EXIT_MARGIN,
            translate_y: TRIGGER_EXIT_LIFT,
            rotation: TRIGGER_EXIT_ROTATION,
        },
        SwipeDirection::Up => CardTransform {
            translate_x: 0.0,
            translate_y: -(viewport.height + EXIT_MARGIN),
            rotation: 0.0,
        },
    }
}
