//! Consumer callbacks invoked once per delivered fragment.

use super::Fragment;

/// Receives every fragment a live poll reads.
///
/// Closures taking `&Fragment<'_>` implement this trait.
pub trait FragmentHandler {
    /// Consume one fragment.
    fn on_fragment(&mut self, fragment: &Fragment<'_>);
}

impl<F> FragmentHandler for F
where
    F: FnMut(&Fragment<'_>),
{
    fn on_fragment(&mut self, fragment: &Fragment<'_>) { self(fragment); }
}

/// Receives fragments during a controlled poll and may refuse them.
///
/// Returning `false` leaves the reader positioned at the refused frame, which
/// is offered again by the next poll. Closures taking `&Fragment<'_>` and
/// returning `bool` implement this trait.
pub trait ControlledFragmentHandler {
    /// Consume one fragment, returning whether it was accepted.
    fn on_fragment(&mut self, fragment: &Fragment<'_>) -> bool;
}

impl<F> ControlledFragmentHandler for F
where
    F: FnMut(&Fragment<'_>) -> bool,
{
    fn on_fragment(&mut self, fragment: &Fragment<'_>) -> bool { self(fragment) }
}
