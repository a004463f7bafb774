//! Property animators.
//!
//! An [`Animator`] is a node that drives one numeric property of its parent
//! with a waveform. Time is measured in normalised units: one period is one
//! unit of `timer`, and `speed` is units per second.
//!
//! ```text
//! value = (offset + amplitude * f(timer)) * multiplier
//! ```

use std::borrow::Cow;
use std::f32::consts::{PI, TAU};

use rand::Rng;

use crate::config::AnimatorDefaults;

/// Waveform used by an animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimationFunction {
    /// Ramp 0 to 1 per period, held at the end.
    #[default]
    Linear,
    /// `sin(2πt)`.
    Sine,
    /// `|sin(πt)|`, a bounce.
    SineAbs,
    /// +1 for the first half of each period, -1 for the second.
    Square,
    /// Rises from -1 to 1 each period, centred on 0.
    Saw,
    /// Linear rise and fall between -1 and 1.
    Triangle,
    /// A fresh uniform sample in [-1, 1] every tick.
    Noise,
    /// The animator's custom callback.
    Custom,
}

impl AnimationFunction {
    /// Parses a function name.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "linear" => Some(Self::Linear),
            "sine" => Some(Self::Sine),
            "sine_abs" | "sineabs" => Some(Self::SineAbs),
            "square" => Some(Self::Square),
            "saw" => Some(Self::Saw),
            "triangle" => Some(Self::Triangle),
            "noise" | "random" => Some(Self::Noise),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// The canonical name accepted by [`AnimationFunction::parse`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Sine => "sine",
            Self::SineAbs => "sine_abs",
            Self::Square => "square",
            Self::Saw => "saw",
            Self::Triangle => "triangle",
            Self::Noise => "noise",
            Self::Custom => "custom",
        }
    }
}

/// Custom waveform. Receives the animator and the normalised time.
pub type CustomFunction = fn(&Animator, f32) -> f32;

/// A property of a visual node that animators can drive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    /// Rect x.
    X,
    /// Rect y.
    Y,
    /// Rect width, cascading to children.
    Width,
    /// Rect height, cascading to children.
    Height,
    /// Horizontal scale.
    ScaleX,
    /// Vertical scale.
    ScaleY,
    /// Pivot x.
    PivotX,
    /// Pivot y.
    PivotY,
    /// Rotation in degrees.
    Angle,
    /// Red channel.
    Red,
    /// Green channel.
    Green,
    /// Blue channel.
    Blue,
    /// Alpha channel.
    Alpha,
    /// Sibling z-order.
    ZOrder,
    /// A numeric widget property, resolved through the widget behaviour.
    Named(String),
}

impl AnimatedProperty {
    /// Parses a property key. Unknown keys become [`AnimatedProperty::Named`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "x" => Self::X,
            "y" => Self::Y,
            "w" | "width" => Self::Width,
            "h" | "height" => Self::Height,
            "scale_x" => Self::ScaleX,
            "scale_y" => Self::ScaleY,
            "pivot_x" => Self::PivotX,
            "pivot_y" => Self::PivotY,
            "angle" => Self::Angle,
            "red" => Self::Red,
            "green" => Self::Green,
            "blue" => Self::Blue,
            "alpha" => Self::Alpha,
            "zorder" => Self::ZOrder,
            other => Self::Named(other.to_owned()),
        }
    }

    /// Property key.
    #[must_use]
    pub fn key(&self) -> Cow<'_, str> {
        Cow::Borrowed(match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Width => "w",
            Self::Height => "h",
            Self::ScaleX => "scale_x",
            Self::ScaleY => "scale_y",
            Self::PivotX => "pivot_x",
            Self::PivotY => "pivot_y",
            Self::Angle => "angle",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Alpha => "alpha",
            Self::ZOrder => "zorder",
            Self::Named(name) => return Cow::Borrowed(name.as_str()),
        })
    }

    /// 8-bit targets clamp to [0, 255] and compare as integers.
    #[must_use]
    pub const fn is_byte(&self) -> bool {
        matches!(self, Self::Red | Self::Green | Self::Blue | Self::Alpha)
    }

    /// Factory type name of the animator that drives this property.
    #[must_use]
    pub fn animator_type_name(&self) -> &'static str {
        match self {
            Self::X => "MoverX",
            Self::Y => "MoverY",
            Self::Width => "ResizerX",
            Self::Height => "ResizerY",
            Self::ScaleX => "ScalerX",
            Self::ScaleY => "ScalerY",
            Self::PivotX => "PivotMoverX",
            Self::PivotY => "PivotMoverY",
            Self::Angle => "Rotator",
            Self::Red => "RedChanger",
            Self::Green => "GreenChanger",
            Self::Blue => "BlueChanger",
            Self::Alpha => "AlphaChanger",
            Self::ZOrder => "ZOrderChanger",
            Self::Named(_) => "Animator",
        }
    }
}

/// Lifecycle state of an animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimatorState {
    /// Waiting out the delay. The target property is not touched.
    Delayed,
    /// Interpolating.
    Active,
    /// Periods exhausted.
    Expired,
}

/// What happened during one [`Animator::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tick {
    /// The delay ran out during this tick.
    pub delay_ended: bool,
    /// The last period completed during this tick.
    pub completed: bool,
    /// The animator was re-armed after completing.
    pub rearmed: bool,
}

/// Drives one property of its parent with a waveform.
#[derive(Debug, Clone)]
pub struct Animator {
    property: AnimatedProperty,
    /// Waveform.
    pub function: AnimationFunction,
    /// Callback for [`AnimationFunction::Custom`].
    pub custom: Option<CustomFunction>,
    /// Cycle count. Negative runs forever.
    pub periods: f32,
    /// Waveform amplitude.
    pub amplitude: f32,
    /// Timer units per second.
    pub speed: f32,
    /// Value at `f(t) = 0`.
    pub offset: f32,
    /// Applied after the offset.
    pub multiplier: f32,
    /// Change of speed per second. Ignored below 0.01.
    pub acceleration: f32,
    /// Quantisation step. Zero disables quantisation.
    pub discrete_step: f32,
    /// Restart instead of expiring.
    pub reset_on_expire: bool,
    /// Take `offset` from the live value at attach and at delay end.
    pub inherit_value: bool,
    /// Value to reach at the end of the first period.
    pub target: f32,
    /// Derive `amplitude` from `target` and the live value.
    pub use_target: bool,
    value: f32,
    timer: f32,
    delay: f32,
    initial_timer: f32,
    initial_delay: f32,
    pub(crate) warned: bool,
}

impl Animator {
    /// Acceleration magnitudes at or below this are ignored.
    pub const ACCELERATION_THRESHOLD: f32 = 0.01;

    /// Creates an animator for `property` with built-in defaults.
    #[must_use]
    pub fn new(property: AnimatedProperty) -> Self {
        Self::with_defaults(property, &AnimatorDefaults::default())
    }

    /// Creates an animator for `property` with configured defaults.
    #[must_use]
    pub fn with_defaults(property: AnimatedProperty, defaults: &AnimatorDefaults) -> Self {
        Self {
            property,
            function: AnimationFunction::Linear,
            custom: None,
            periods: defaults.periods,
            amplitude: defaults.amplitude,
            speed: defaults.speed,
            offset: 0.0,
            multiplier: 1.0,
            acceleration: 0.0,
            discrete_step: 0.0,
            reset_on_expire: false,
            inherit_value: false,
            target: 0.0,
            use_target: false,
            value: 0.0,
            timer: 0.0,
            delay: 0.0,
            initial_timer: 0.0,
            initial_delay: 0.0,
            warned: false,
        }
    }

    /// Sets the waveform.
    #[must_use]
    pub fn function(mut self, function: AnimationFunction) -> Self {
        self.function = function;
        self
    }

    /// Sets a custom waveform.
    #[must_use]
    pub fn custom(mut self, callback: CustomFunction) -> Self {
        self.function = AnimationFunction::Custom;
        self.custom = Some(callback);
        self
    }

    /// Sets offset and amplitude.
    #[must_use]
    pub fn range(mut self, offset: f32, amplitude: f32) -> Self {
        self.offset = offset;
        self.amplitude = amplitude;
        self
    }

    /// Sets speed in periods per second.
    #[must_use]
    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Sets the cycle count.
    #[must_use]
    pub fn periods(mut self, periods: f32) -> Self {
        self.periods = periods;
        self
    }

    /// Sets the pre-roll delay in seconds.
    #[must_use]
    pub fn delayed(mut self, delay: f32) -> Self {
        self.set_delay(delay);
        self
    }

    /// Targets an absolute value, reached at the end of the first period.
    #[must_use]
    pub fn toward(mut self, target: f32) -> Self {
        self.set_target(target);
        self
    }

    /// Enables reset on expire.
    #[must_use]
    pub fn looping(mut self) -> Self {
        self.reset_on_expire = true;
        self
    }

    /// Animated property.
    #[must_use]
    pub const fn property(&self) -> &AnimatedProperty {
        &self.property
    }

    pub(crate) fn set_property_key(&mut self, property: AnimatedProperty) {
        self.property = property;
        self.warned = false;
    }

    /// Last computed value.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Normalised time.
    #[must_use]
    pub const fn timer(&self) -> f32 {
        self.timer
    }

    /// Sets the normalised time. Also the value restored on reset.
    pub fn set_timer(&mut self, timer: f32) {
        self.timer = timer;
        self.initial_timer = timer;
    }

    /// Remaining delay in seconds.
    #[must_use]
    pub const fn delay(&self) -> f32 {
        self.delay
    }

    /// Sets the delay. Also the value restored on reset.
    pub fn set_delay(&mut self, delay: f32) {
        self.delay = delay;
        self.initial_delay = delay;
    }

    /// Sets the target and enables target and inheritance.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        self.use_target = true;
        self.inherit_value = true;
    }

    /// Sets the duration of one period in seconds.
    pub fn set_time(&mut self, seconds: f32) {
        if seconds.abs() > f32::EPSILON {
            self.speed = 1.0 / seconds;
        }
    }

    /// Sets amplitude so the waveform spans `peak_to_peak`.
    pub fn set_peak_to_peak(&mut self, peak_to_peak: f32) {
        self.amplitude = peak_to_peak * 0.5;
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AnimatorState {
        if self.delay > 0.0 {
            AnimatorState::Delayed
        } else if self.is_exhausted() && !self.reset_on_expire {
            AnimatorState::Expired
        } else {
            AnimatorState::Active
        }
    }

    /// Returns true while interpolating.
    #[must_use]
    pub fn is_animated(&self) -> bool {
        self.state() == AnimatorState::Active
    }

    /// Returns true once the periods are used up, or never for negative periods.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.state() == AnimatorState::Expired
    }

    fn is_exhausted(&self) -> bool {
        self.periods >= 0.0 && self.timer.abs() >= self.periods
    }

    /// Takes the live value as the new baseline.
    pub fn inherit(&mut self, live: f32) {
        self.offset = live;
        self.value = live;
        if self.use_target {
            self.amplitude = self.target - live;
        }
    }

    /// Advances time by `dt` seconds.
    ///
    /// The delay is consumed first and any leftover time carries into the
    /// timer. A completed animator with reset enabled re-arms on the next
    /// call instead of advancing.
    pub fn advance(&mut self, dt: f32) -> Tick {
        let mut tick = Tick::default();

        if self.is_exhausted() {
            if self.reset_on_expire {
                self.timer = self.initial_timer;
                self.delay = self.initial_delay;
                tick.rearmed = true;
            }
            return tick;
        }

        let mut dt = dt;
        if self.delay > 0.0 {
            self.delay -= dt;
            if self.delay > 0.0 {
                return tick;
            }
            dt = -self.delay;
            self.delay = 0.0;
            tick.delay_ended = true;
        }

        self.timer += dt * self.speed;
        if self.acceleration.abs() > Self::ACCELERATION_THRESHOLD {
            self.speed += self.acceleration * dt;
        }
        tick.completed = self.is_exhausted();
        tick
    }

    /// Raw waveform at the current time, before offset and amplitude.
    pub fn waveform(&self, rng: &mut impl Rng) -> f32 {
        let t = if self.periods >= 0.0 {
            self.timer.clamp(-self.periods, self.periods)
        } else {
            self.timer
        };

        match self.function {
            AnimationFunction::Linear => t,
            AnimationFunction::Sine => (TAU * t).sin(),
            AnimationFunction::SineAbs => (PI * t).sin().abs(),
            AnimationFunction::Square => {
                if t.rem_euclid(1.0) < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            AnimationFunction::Saw => ((t + 0.5).rem_euclid(1.0) - 0.5) * 2.0,
            AnimationFunction::Triangle => {
                let phase = t.rem_euclid(1.0);
                if !(0.25..0.75).contains(&phase) {
                    ((t + 0.5).rem_euclid(1.0) - 0.5) * 4.0
                } else {
                    -((t - 0.25).rem_euclid(1.0) - 0.25) * 4.0
                }
            }
            AnimationFunction::Noise => rng.gen_range(-1.0_f32..=1.0),
            AnimationFunction::Custom => self.custom.map_or(0.0, |callback| callback(self, t)),
        }
    }

    /// Computes and stores the value for the current time.
    pub fn evaluate(&mut self, rng: &mut impl Rng) -> f32 {
        let mut value = (self.offset + self.amplitude * self.waveform(rng)) * self.multiplier;
        if self.discrete_step > 0.0 {
            value = (value / self.discrete_step).round() * self.discrete_step;
        }
        self.value = value;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const TOLERANCE: f32 = 1e-4;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn sample(function: AnimationFunction, t: f32) -> f32 {
        let mut animator = Animator::new(AnimatedProperty::X).function(function).periods(-1.0);
        animator.set_timer(t);
        animator.waveform(&mut rng())
    }

    #[test]
    fn test_waveform_shapes() {
        assert!((sample(AnimationFunction::Sine, 0.25) - 1.0).abs() < TOLERANCE);
        assert!((sample(AnimationFunction::SineAbs, 1.5) - 1.0).abs() < TOLERANCE);
        assert_eq!(sample(AnimationFunction::Square, 0.2), 1.0);
        assert_eq!(sample(AnimationFunction::Square, 0.7), -1.0);
        assert!((sample(AnimationFunction::Saw, 0.25) - 0.5).abs() < TOLERANCE);
        assert!((sample(AnimationFunction::Saw, 0.75) + 0.5).abs() < TOLERANCE);
        assert!((sample(AnimationFunction::Triangle, 0.25) - 1.0).abs() < TOLERANCE);
        assert!((sample(AnimationFunction::Triangle, 0.5)).abs() < TOLERANCE);
        assert!((sample(AnimationFunction::Triangle, 0.75) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_noise_stays_in_range() {
        let mut rng = rng();
        let animator = Animator::new(AnimatedProperty::X).function(AnimationFunction::Noise);
        for _ in 0..1000 {
            let v = animator.waveform(&mut rng);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_linear_ramp_expires() {
        let mut rng = rng();
        let mut animator = Animator::new(AnimatedProperty::X).range(0.0, 10.0).speed(1.0);

        for _ in 0..3 {
            animator.advance(0.25);
        }
        assert!((animator.evaluate(&mut rng) - 7.5).abs() < TOLERANCE);
        assert_eq!(animator.state(), AnimatorState::Active);

        let tick = animator.advance(0.25);
        assert!(tick.completed);
        assert!((animator.evaluate(&mut rng) - 10.0).abs() < TOLERANCE);
        assert_eq!(animator.state(), AnimatorState::Expired);

        // Held at the end
        animator.advance(0.25);
        assert!((animator.evaluate(&mut rng) - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_delay_leftover_carries_over() {
        let mut animator = Animator::new(AnimatedProperty::X).delayed(0.3).speed(1.0).periods(-1.0);

        assert_eq!(animator.advance(0.2), Tick::default());
        assert_eq!(animator.state(), AnimatorState::Delayed);

        let tick = animator.advance(0.2);
        assert!(tick.delay_ended);
        assert!((animator.timer() - 0.1).abs() < TOLERANCE);
    }

    #[test]
    fn test_reset_rearms_delay_and_timer() {
        let mut animator = Animator::new(AnimatedProperty::X).delayed(0.5).looping();
        animator.advance(0.5);
        animator.advance(1.0);
        assert_eq!(animator.state(), AnimatorState::Active);

        let tick = animator.advance(0.1);
        assert!(tick.rearmed);
        assert_eq!(animator.state(), AnimatorState::Delayed);
        assert!((animator.delay() - 0.5).abs() < TOLERANCE);
        assert_eq!(animator.timer(), 0.0);
    }

    #[test]
    fn test_acceleration_changes_speed() {
        let mut animator = Animator::new(AnimatedProperty::X).speed(1.0).periods(-1.0);
        animator.acceleration = 2.0;
        animator.advance(0.5);
        assert!((animator.speed - 2.0).abs() < TOLERANCE);

        animator.acceleration = 0.005;
        animator.advance(0.5);
        assert!((animator.speed - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_discrete_step_rounds() {
        let mut animator = Animator::new(AnimatedProperty::X).range(0.0, 10.0);
        animator.discrete_step = 4.0;
        animator.set_timer(0.55);
        assert!((animator.evaluate(&mut rng()) - 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_target_derives_amplitude() {
        let mut animator = Animator::new(AnimatedProperty::Alpha).toward(200.0);
        animator.inherit(50.0);
        assert!((animator.offset - 50.0).abs() < TOLERANCE);
        assert!((animator.amplitude - 150.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_custom_callback() {
        fn double(_: &Animator, t: f32) -> f32 {
            t * 2.0
        }
        let mut animator = Animator::new(AnimatedProperty::X).custom(double).range(1.0, 1.0);
        animator.set_timer(0.25);
        assert!((animator.evaluate(&mut rng()) - 1.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_property_keys() {
        assert_eq!(AnimatedProperty::parse("w"), AnimatedProperty::Width);
        assert_eq!(AnimatedProperty::parse("progress"), AnimatedProperty::Named("progress".into()));
        assert_eq!(AnimatedProperty::Named("progress".into()).key(), "progress");
        assert!(AnimatedProperty::Alpha.is_byte());
        assert!(!AnimatedProperty::Angle.is_byte());
    }
}
