//! Key elements and their style transitions
//!
//! A key element has an "active" flag and three animated style values. Each
//! flip of the flag starts a transition on every value; a value already at its
//! new target gets a zero-length one that ends on the next tick. `Board::tick` advances the transitions and delivers a
//! `TransitionEnd` to the element's own listeners whenever one finishes.

use crate::binding::{BindingTable, ElementId, KitError};
use std::time::Duration;

/// Animated style properties of a key element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    /// Pad scale (grows while active)
    Transform,
    /// Border highlight color
    BorderColor,
    /// Glow under the pad
    BoxShadow,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 3] = [
        StyleProperty::Transform,
        StyleProperty::BorderColor,
        StyleProperty::BoxShadow,
    ];

    fn index(self) -> usize {
        match self {
            StyleProperty::Transform => 0,
            StyleProperty::BorderColor => 1,
            StyleProperty::BoxShadow => 2,
        }
    }
}

/// Signal that one property transition on one element has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEnd {
    pub element: ElementId,
    pub property: StyleProperty,
}

/// Handler registered on a single element for its transition ends
pub trait TransitionListener {
    fn on_transition_end(&mut self, event: &TransitionEnd, element: &mut KeyElement);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    from: f32,
    to: f32,
    elapsed: Duration,
    duration: Duration,
}

impl Transition {
    /// Eased value at the current elapsed time
    fn value(&self) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0);
        // smoothstep
        let eased = t * t * (3.0 - 2.0 * t);
        self.from + (self.to - self.from) * eased
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// A visual key on the board
#[derive(Debug, Clone)]
pub struct KeyElement {
    id: ElementId,
    label: String,
    sound: String,
    active: bool,
    /// Current animated value per property (0.0 = resting, 1.0 = highlighted)
    values: [f32; 3],
    transitions: [Option<Transition>; 3],
    transition_duration: Duration,
}

impl KeyElement {
    pub fn new(
        id: ElementId,
        label: impl Into<String>,
        sound: impl Into<String>,
        transition_duration: Duration,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            sound: sound.into(),
            active: false,
            values: [0.0; 3],
            transitions: [None; 3],
            transition_duration,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sound(&self) -> &str {
        &self.sound
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current animated value of a property (0.0 - 1.0)
    pub fn value(&self, property: StyleProperty) -> f32 {
        self.values[property.index()]
    }

    /// Whether a transition is running on the property
    pub fn is_transitioning(&self, property: StyleProperty) -> bool {
        self.transitions[property.index()].is_some()
    }

    pub fn is_animating(&self) -> bool {
        self.transitions.iter().any(Option::is_some)
    }

    /// Apply the active state. No-op if already active.
    pub fn add_active(&mut self) {
        if !self.active {
            self.active = true;
            self.retarget();
        }
    }

    /// Clear the active state. No-op if already resting.
    pub fn remove_active(&mut self) {
        if self.active {
            self.active = false;
            self.retarget();
        }
    }

    /// Start or replace transitions toward the values the current state calls for
    fn retarget(&mut self) {
        let target = if self.active { 1.0 } else { 0.0 };

        for slot in 0..self.values.len() {
            let current = self.values[slot];
            let distance = (target - current).abs();

            if matches!(self.transitions[slot], Some(t) if t.to == target) {
                continue;
            }

            // Already there: still report an end on the next tick
            let duration = if distance <= f32::EPSILON {
                self.values[slot] = target;
                Duration::ZERO
            } else if distance >= 1.0 {
                self.transition_duration
            } else {
                self.transition_duration.mul_f32(distance)
            };

            // A replaced transition never reports an end
            self.transitions[slot] = Some(Transition {
                from: current,
                to: target,
                elapsed: Duration::ZERO,
                duration,
            });
        }
    }

    /// Advance running transitions, returning the properties that finished
    fn advance(&mut self, elapsed: Duration) -> Vec<StyleProperty> {
        let mut ended = Vec::new();

        for property in StyleProperty::ALL {
            let slot = property.index();
            let Some(transition) = self.transitions[slot].as_mut() else {
                continue;
            };

            transition.elapsed += elapsed;
            self.values[slot] = transition.value();

            if transition.is_finished() {
                self.values[slot] = transition.to;
                self.transitions[slot] = None;
                ended.push(property);
            }
        }

        ended
    }
}

/// All key elements plus their per-element transition listeners
pub struct Board {
    elements: Vec<KeyElement>,
    listeners: Vec<Vec<Box<dyn TransitionListener>>>,
}

impl Board {
    /// Transition length of the stock kit's pulse
    pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(70);

    /// Create one element per binding, in binding order
    pub fn from_table(table: &BindingTable, transition: Duration) -> Self {
        let elements: Vec<KeyElement> = table
            .iter()
            .map(|b| KeyElement::new(b.element, b.label.clone(), b.sound.clone(), transition))
            .collect();
        let listeners = elements.iter().map(|_| Vec::new()).collect();

        Self {
            elements,
            listeners,
        }
    }

    pub fn elements(&self) -> &[KeyElement] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&KeyElement> {
        self.elements.get(id.0)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut KeyElement> {
        self.elements.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Register a transition-end listener on one element
    pub fn add_listener(
        &mut self,
        id: ElementId,
        listener: Box<dyn TransitionListener>,
    ) -> Result<(), KitError> {
        self.listeners
            .get_mut(id.0)
            .ok_or(KitError::UnknownElement(id))?
            .push(listener);
        Ok(())
    }

    pub fn is_animating(&self) -> bool {
        self.elements.iter().any(KeyElement::is_animating)
    }

    /// Advance every running transition by `elapsed` and deliver the
    /// resulting transition ends. Returns the delivered events.
    pub fn tick(&mut self, elapsed: Duration) -> Vec<TransitionEnd> {
        let mut delivered = Vec::new();

        for index in 0..self.elements.len() {
            let ended = self.elements[index].advance(elapsed);
            for property in ended {
                let event = TransitionEnd {
                    element: ElementId(index),
                    property,
                };
                self.deliver(&event);
                delivered.push(event);
            }
        }

        delivered
    }

    /// Deliver a transition end to the listeners of the element it names
    pub fn deliver(&mut self, event: &TransitionEnd) {
        let index = event.element.0;
        let (Some(element), Some(listeners)) =
            (self.elements.get_mut(index), self.listeners.get_mut(index))
        else {
            return;
        };

        for listener in listeners.iter_mut() {
            listener.on_transition_end(event, element);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::KeyCode;
    use std::cell::RefCell;
    use std::rc::Rc;

    const PULSE: Duration = Duration::from_millis(70);

    struct Recorder(Rc<RefCell<Vec<TransitionEnd>>>);

    impl TransitionListener for Recorder {
        fn on_transition_end(&mut self, event: &TransitionEnd, _element: &mut KeyElement) {
            self.0.borrow_mut().push(*event);
        }
    }

    fn two_key_board() -> Board {
        let table = BindingTable::new([(KeyCode(65), "clap"), (KeyCode(83), "hihat")]).unwrap();
        Board::from_table(&table, PULSE)
    }

    #[test]
    fn test_activation_starts_all_transitions() {
        let mut element = KeyElement::new(ElementId(0), "A", "clap", PULSE);
        element.add_active();

        for property in StyleProperty::ALL {
            assert!(element.is_transitioning(property));
            assert_eq!(element.value(property), 0.0);
        }
    }

    #[test]
    fn test_transitions_reach_target_and_end() {
        let mut element = KeyElement::new(ElementId(0), "A", "clap", PULSE);
        element.add_active();

        assert!(element.advance(Duration::from_millis(35)).is_empty());
        let halfway = element.value(StyleProperty::Transform);
        assert!(halfway > 0.0 && halfway < 1.0);

        let ended = element.advance(Duration::from_millis(35));
        assert_eq!(ended, StyleProperty::ALL.to_vec());
        assert_eq!(element.value(StyleProperty::Transform), 1.0);
        assert!(!element.is_animating());
    }

    #[test]
    fn test_repeated_add_does_not_restart() {
        let mut element = KeyElement::new(ElementId(0), "A", "clap", PULSE);
        element.add_active();
        element.advance(Duration::from_millis(50));
        element.add_active();

        // Still the original transition: 20ms left
        let ended = element.advance(Duration::from_millis(20));
        assert_eq!(ended.len(), 3);
    }

    #[test]
    fn test_remove_when_resting_is_noop() {
        let mut element = KeyElement::new(ElementId(0), "A", "clap", PULSE);
        element.remove_active();
        assert!(!element.is_animating());
        assert!(!element.is_active());
    }

    #[test]
    fn test_flip_at_target_still_ends() {
        let mut element = KeyElement::new(ElementId(0), "A", "clap", PULSE);
        element.add_active();
        element.advance(PULSE);
        element.remove_active();
        // Reactivated before the return transition moved anything
        element.add_active();

        for property in StyleProperty::ALL {
            assert!(element.is_transitioning(property));
        }
        let ended = element.advance(Duration::from_millis(1));
        assert_eq!(ended, StyleProperty::ALL.to_vec());
        assert_eq!(element.value(StyleProperty::Transform), 1.0);
        assert!(!element.is_animating());
    }

    #[test]
    fn test_interrupted_transition_scales_duration() {
        let mut element = KeyElement::new(ElementId(0), "A", "clap", PULSE);
        element.add_active();
        element.advance(PULSE);
        element.remove_active();
        element.advance(Duration::from_millis(35));
        let partial = element.value(StyleProperty::Transform);
        element.add_active();

        // Remaining distance is shorter than a full pulse
        let ended = element.advance(PULSE.mul_f32(1.0 - partial));
        assert_eq!(ended.len(), 3);
        assert_eq!(element.value(StyleProperty::Transform), 1.0);
    }

    #[test]
    fn test_tick_delivers_only_to_own_element() {
        let mut board = two_key_board();
        let seen_a = Rc::new(RefCell::new(Vec::new()));
        let seen_b = Rc::new(RefCell::new(Vec::new()));
        board
            .add_listener(ElementId(0), Box::new(Recorder(seen_a.clone())))
            .unwrap();
        board
            .add_listener(ElementId(1), Box::new(Recorder(seen_b.clone())))
            .unwrap();

        board.element_mut(ElementId(0)).unwrap().add_active();
        let delivered = board.tick(PULSE);

        assert_eq!(delivered.len(), 3);
        assert_eq!(seen_a.borrow().len(), 3);
        assert!(seen_b.borrow().is_empty());
        assert!(seen_a
            .borrow()
            .iter()
            .all(|e| e.element == ElementId(0)));
    }

    #[test]
    fn test_listener_on_unknown_element() {
        let mut board = two_key_board();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let result = board.add_listener(ElementId(7), Box::new(Recorder(seen)));
        assert_eq!(result.unwrap_err(), KitError::UnknownElement(ElementId(7)));
    }

    #[test]
    fn test_board_mirrors_table() {
        let board = two_key_board();
        assert_eq!(board.len(), 2);
        assert_eq!(board.elements()[1].label(), "S");
        assert_eq!(board.elements()[1].sound(), "hihat");
        assert!(!board.is_animating());
    }
}
