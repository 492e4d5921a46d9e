//! Contracts between the continuation engine and the algorithm it drives.

/// One unit of recursable work produced and consumed by the invoking algorithm.
///
/// Continuations are plain values: they are copied between the seed array, worker stacks and thieves,
/// so they must not carry any identity tied to the thread that created them.
pub trait Continuation: Copy + Send + Sync {
    /// Whether this continuation is a leaf of the decomposition.
    ///
    /// Final continuations are still handed to the processing function exactly once, but when emitted they are
    /// processed inline on the emitting thread and never buffered for stealing.
    fn is_final(&self) -> bool;
}

/// Capability handed to the processing function for emitting follow-up continuations.
pub trait ParallelContinue<C> {
    /// Hands a follow-up continuation to the engine. May be called any number of times per invocation.
    fn emit(&mut self, continuation: C);
}

/// Collects emitted continuations. Handy for expanding the top of a problem sequentially before seeding the engine.
impl<C> ParallelContinue<C> for Vec<C> {
    #[inline(always)]
    fn emit(&mut self, continuation: C) {
        self.push(continuation);
    }
}
