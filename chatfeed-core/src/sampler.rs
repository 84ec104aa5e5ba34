//! Payload sampler contract.
//!
//! The engine decides *which kind* fires; a sampler turns that kind into
//! concrete content. Returning `None` is an ordinary outcome (nothing
//! eligible for that kind right now), not an error: the decision point is
//! consumed and nothing is emitted.

use crate::random::RandomSource;
use crate::runtime::RuntimeState;
use crate::types::{EventPayload, KindId};

/// Maps a chosen kind to an event payload.
pub trait PayloadSampler {
    /// Produce content for `kind`.
    ///
    /// `state` is read-only: samplers consult [`RuntimeState::recently_used`]
    /// to respect the no-repeat window. `rng` is the engine's own source, so
    /// seeded runs stay reproducible end to end.
    fn try_sample(
        &mut self,
        kind: KindId,
        state: &RuntimeState,
        rng: &mut dyn RandomSource,
    ) -> Option<EventPayload>;
}

impl<S: PayloadSampler + ?Sized> PayloadSampler for &mut S {
    fn try_sample(
        &mut self,
        kind: KindId,
        state: &RuntimeState,
        rng: &mut dyn RandomSource,
    ) -> Option<EventPayload> {
        (**self).try_sample(kind, state, rng)
    }
}

impl<S: PayloadSampler + ?Sized> PayloadSampler for Box<S> {
    fn try_sample(
        &mut self,
        kind: KindId,
        state: &RuntimeState,
        rng: &mut dyn RandomSource,
    ) -> Option<EventPayload> {
        (**self).try_sample(kind, state, rng)
    }
}

/// Sampler built from a closure. See [`from_fn`].
pub struct FnSampler<F>(F);

impl<F> PayloadSampler for FnSampler<F>
where
    F: FnMut(KindId, &RuntimeState, &mut dyn RandomSource) -> Option<EventPayload>,
{
    fn try_sample(
        &mut self,
        kind: KindId,
        state: &RuntimeState,
        rng: &mut dyn RandomSource,
    ) -> Option<EventPayload> {
        (self.0)(kind, state, rng)
    }
}

/// Wrap a closure as a [`PayloadSampler`].
///
/// ```
/// use chatfeed_core::sampler::from_fn;
/// use chatfeed_core::types::EventPayload;
///
/// let mut next_id = 0;
/// let _sampler = from_fn(move |_kind, _state, _rng| {
///     next_id += 1;
///     Some(EventPayload::with_id(next_id))
/// });
/// ```
pub fn from_fn<F>(f: F) -> FnSampler<F>
where
    F: FnMut(KindId, &RuntimeState, &mut dyn RandomSource) -> Option<EventPayload>,
{
    FnSampler(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    #[test]
    fn closure_sampler_sees_state() {
        let mut state = RuntimeState::new(1, 4);
        state.record_emit(KindId(0), 7, 0.0, false);
        let mut sampler = from_fn(|_kind, state: &RuntimeState, _rng| {
            (!state.recently_used(7)).then(|| EventPayload::with_id(7))
        });
        let mut rng = SeededRandom::new(0);
        assert!(sampler.try_sample(KindId(0), &state, &mut rng).is_none());

        let fresh = RuntimeState::new(1, 4);
        assert_eq!(
            sampler.try_sample(KindId(0), &fresh, &mut rng),
            Some(EventPayload::with_id(7))
        );
    }
}
