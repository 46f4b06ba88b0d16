/// A source of uniformly distributed indices.
///
/// This abstraction allows you to plug in a real random source or a seeded
/// one in tests and benches.
///
/// # Example
/// ```
/// use coupongen::RandSource;
///
/// struct Fixed;
/// impl RandSource for Fixed {
///     fn index_below(&mut self, _bound: usize) -> usize {
///         0
///     }
/// }
///
/// let mut rng = Fixed;
/// assert_eq!(rng.index_below(10), 0);
/// ```
pub trait RandSource {
    /// Returns an index uniformly drawn from `0..bound`.
    ///
    /// Callers never pass `bound == 0`.
    fn index_below(&mut self, bound: usize) -> usize;
}
