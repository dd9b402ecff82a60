//! Scroll-triggered reveal effects: section fade-ins, the staggered name
//! reveal and the navigation dot highlight.

use crate::timeline::{ScheduledEvent, Scheduler};

/// Fraction of an element that must be visible before it fades in.
pub const FADE_IN_THRESHOLD: f32 = 0.1;
/// The viewport's bottom edge is pulled up by this many pixels for fade-ins.
pub const FADE_IN_BOTTOM_MARGIN: f32 = 50.0;
pub const NAME_REVEAL_THRESHOLD: f32 = 0.2;
pub const NAV_DOT_THRESHOLD: f32 = 0.4;

/// Vertical extent of an element relative to the top of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f32,
    pub height: f32,
}

impl Span {
    pub const fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }
}

/// Visible fraction of `element` inside a viewport of `viewport_height`
/// whose bottom edge is shrunk by `bottom_margin`.
pub fn intersection_ratio(element: Span, viewport_height: f32, bottom_margin: f32) -> f32 {
    if element.height <= 0.0 {
        return 0.0;
    }

    let visible_bottom = (viewport_height - bottom_margin).max(0.0);
    let start = element.top.max(0.0);
    let end = (element.top + element.height).min(visible_bottom);
    ((end - start).max(0.0) / element.height).clamp(0.0, 1.0)
}

/// Elements that fade in once and stay visible.
#[derive(Debug, Clone)]
pub struct FadeInSet {
    revealed: Vec<bool>,
}

impl FadeInSet {
    pub fn new(count: usize) -> Self {
        Self {
            revealed: vec![false; count],
        }
    }

    /// Reveals an element unconditionally, e.g. the welcome section on load.
    pub fn reveal(&mut self, index: usize) {
        if let Some(flag) = self.revealed.get_mut(index) {
            *flag = true;
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    /// Checks every element against the viewport and returns the indices that
    /// became visible on this pass.
    pub fn observe(&mut self, elements: &[Span], viewport_height: f32) -> Vec<usize> {
        let mut newly = Vec::new();
        for (index, (flag, element)) in self.revealed.iter_mut().zip(elements).enumerate() {
            if *flag {
                continue;
            }
            let ratio = intersection_ratio(*element, viewport_height, FADE_IN_BOTTOM_MARGIN);
            if ratio >= FADE_IN_THRESHOLD {
                *flag = true;
                newly.push(index);
            }
        }
        newly
    }
}

/// Parts of the couple's names, revealed one after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePart {
    Groom,
    Ampersand,
    Bride,
}

impl NamePart {
    fn label(self) -> &'static str {
        match self {
            NamePart::Groom => "groom",
            NamePart::Ampersand => "ampersand",
            NamePart::Bride => "bride",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "groom" => Some(NamePart::Groom),
            "ampersand" => Some(NamePart::Ampersand),
            "bride" => Some(NamePart::Bride),
            _ => None,
        }
    }

    /// Delay after the names block comes into view.
    pub fn delay_ms(self) -> f64 {
        match self {
            NamePart::Groom => 200.0,
            NamePart::Ampersand => 600.0,
            NamePart::Bride => 1000.0,
        }
    }
}

/// One-shot staggered reveal of the names block.
#[derive(Debug, Default)]
pub struct NameReveal {
    triggered: bool,
    timers: Scheduler,
}

impl NameReveal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Arms the timers the first time the block is visible enough. Later
    /// observations are ignored.
    pub fn observe(&mut self, ratio: f32, now_ms: f64) {
        if self.triggered || ratio < NAME_REVEAL_THRESHOLD {
            return;
        }

        self.triggered = true;
        self.timers.set_events(
            [NamePart::Groom, NamePart::Ampersand, NamePart::Bride]
                .into_iter()
                .map(|part| ScheduledEvent::new(now_ms + part.delay_ms(), part.label()))
                .collect(),
        );
    }

    /// Parts whose delay has elapsed since the last call.
    pub fn tick(&mut self, now_ms: f64) -> Vec<NamePart> {
        self.timers
            .tick(now_ms)
            .iter()
            .filter_map(|event| NamePart::from_label(&event.label))
            .collect()
    }
}

/// Highlights the navigation dot of the section currently in view.
#[derive(Debug, Default, Clone)]
pub struct NavDots {
    active: Option<usize>,
}

impl NavDots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Makes `section` the single active dot when enough of it is visible.
    pub fn observe(&mut self, section: usize, ratio: f32) -> bool {
        if ratio < NAV_DOT_THRESHOLD {
            return false;
        }
        self.active = Some(section);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_accounts_for_bottom_margin() {
        // Element spans 700..800 in a 800px viewport shrunk to 750.
        let ratio = intersection_ratio(Span::new(700.0, 100.0), 800.0, 50.0);
        assert!((ratio - 0.5).abs() < 1e-6);
        assert_eq!(intersection_ratio(Span::new(900.0, 100.0), 800.0, 50.0), 0.0);
        assert_eq!(intersection_ratio(Span::new(-20.0, 100.0), 800.0, 0.0), 0.8);
    }

    #[test]
    fn fade_ins_never_revert() {
        let mut set = FadeInSet::new(2);
        let visible = [Span::new(100.0, 200.0), Span::new(2_000.0, 200.0)];
        assert_eq!(set.observe(&visible, 800.0), vec![0]);

        let scrolled_away = [Span::new(-5_000.0, 200.0), Span::new(2_000.0, 200.0)];
        assert!(set.observe(&scrolled_away, 800.0).is_empty());
        assert!(set.is_revealed(0));
        assert!(!set.is_revealed(1));
    }

    #[test]
    fn revealed_elements_are_not_reported_again() {
        let mut set = FadeInSet::new(2);
        set.reveal(0);
        set.reveal(7);
        assert!(set.is_revealed(0));
        assert!(!set.is_revealed(7));

        let both_visible = [Span::new(0.0, 200.0), Span::new(300.0, 200.0)];
        assert_eq!(set.observe(&both_visible, 800.0), vec![1]);
    }

    #[test]
    fn fade_in_needs_a_tenth_visible() {
        let mut set = FadeInSet::new(1);
        // 5px of a 100px element above the shrunk bottom edge.
        assert!(set.observe(&[Span::new(745.0, 100.0)], 800.0).is_empty());
        assert_eq!(set.observe(&[Span::new(730.0, 100.0)], 800.0), vec![0]);
    }

    #[test]
    fn names_reveal_in_sequence_once() {
        let mut reveal = NameReveal::new();
        reveal.observe(0.1, 0.0);
        assert!(!reveal.is_triggered());

        reveal.observe(0.25, 1_000.0);
        reveal.observe(1.0, 1_500.0);
        assert!(reveal.tick(1_100.0).is_empty());
        assert_eq!(reveal.tick(1_250.0), vec![NamePart::Groom]);
        assert_eq!(
            reveal.tick(2_000.0),
            vec![NamePart::Ampersand, NamePart::Bride]
        );
        assert!(reveal.tick(10_000.0).is_empty());
    }

    #[test]
    fn nav_dot_follows_the_visible_section() {
        let mut dots = NavDots::new();
        assert!(!dots.observe(0, 0.3));
        assert_eq!(dots.active(), None);
        assert!(dots.observe(2, 0.5));
        assert!(dots.observe(3, 0.4));
        assert_eq!(dots.active(), Some(3));
    }
}
