//! Modular reward system with compile-time composition.
//!
//! Components implement [`RewardComponent`] and are summed by composing them
//! in tuples:
//!
//! ```ignore
//! use quadrotor_env::reward::*;
//!
//! let reward = (
//!     PositionError { weight: 7.0 },
//!     AttitudeError { weight: 3.5 },
//!     ControlEffort { weight: 0.01 },
//! );
//! ```
//!
//! # Built-in Components
//!
//! - [`PositionError`], [`VelocityError`], [`AttitudeError`],
//!   [`AngularVelocityError`]: squared tracking error penalties
//! - [`ControlEffort`]: squared action penalty
//! - [`PositionProximity`], [`VelocityMagnitude`], [`AngularVelocityMagnitude`]:
//!   the bounded proximity shaping of [`presets::proximity`]
//!
//! Failure penalties and success bonuses are applied by the environment on top
//! of the composed reward, not by components.

pub mod components;
pub mod presets;

pub use components::*;
pub use presets::*;

use crate::observation::ErrorState;

/// Everything a reward component may look at for one step.
#[derive(Clone, Copy, Debug)]
pub struct RewardInput<'a> {
    /// Tracking errors after the step
    pub error: &'a ErrorState,
    /// Action actually applied (clamped), in action units
    pub action: &'a [f64; 4],
}

/// Trait for reward components that can be composed at compile-time.
pub trait RewardComponent: Clone + Send + Sync {
    /// Human-readable name for logging/debugging.
    const NAME: &'static str;

    /// Reward contribution for one step.
    fn compute(&self, input: &RewardInput<'_>) -> f64;
}

// ============================================================================
// Tuple Implementations (HList-style composition)
// ============================================================================

/// Empty tuple - base case for composition.
impl RewardComponent for () {
    const NAME: &'static str = "Empty";

    #[inline(always)]
    fn compute(&self, _input: &RewardInput<'_>) -> f64 {
        0.0
    }
}

/// 2-tuple composition.
impl<A: RewardComponent, B: RewardComponent> RewardComponent for (A, B) {
    const NAME: &'static str = "Composed2";

    #[inline(always)]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        self.0.compute(input) + self.1.compute(input)
    }
}

/// 3-tuple composition.
impl<A: RewardComponent, B: RewardComponent, C: RewardComponent> RewardComponent for (A, B, C) {
    const NAME: &'static str = "Composed3";

    #[inline(always)]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        self.0.compute(input) + self.1.compute(input) + self.2.compute(input)
    }
}

/// 4-tuple composition.
impl<A: RewardComponent, B: RewardComponent, C: RewardComponent, D: RewardComponent>
    RewardComponent for (A, B, C, D)
{
    const NAME: &'static str = "Composed4";

    #[inline(always)]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        self.0.compute(input)
            + self.1.compute(input)
            + self.2.compute(input)
            + self.3.compute(input)
    }
}

/// 5-tuple composition (covers the quadratic reward).
impl<
        A: RewardComponent,
        B: RewardComponent,
        C: RewardComponent,
        D: RewardComponent,
        E: RewardComponent,
    > RewardComponent for (A, B, C, D, E)
{
    const NAME: &'static str = "Composed5";

    #[inline(always)]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        self.0.compute(input)
            + self.1.compute(input)
            + self.2.compute(input)
            + self.3.compute(input)
            + self.4.compute(input)
    }
}

/// 6-tuple composition.
impl<
        A: RewardComponent,
        B: RewardComponent,
        C: RewardComponent,
        D: RewardComponent,
        E: RewardComponent,
        F: RewardComponent,
    > RewardComponent for (A, B, C, D, E, F)
{
    const NAME: &'static str = "Composed6";

    #[inline(always)]
    fn compute(&self, input: &RewardInput<'_>) -> f64 {
        self.0.compute(input)
            + self.1.compute(input)
            + self.2.compute(input)
            + self.3.compute(input)
            + self.4.compute(input)
            + self.5.compute(input)
    }
}
