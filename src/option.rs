/// Knobs for vectorized evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOptions {
    pub(crate) narrowing: bool,
}

impl Default for SelectOptions {
    fn default() -> Self {
        SelectOptions { narrowing: true }
    }
}

impl SelectOptions {
    /// When enabled (the default), later children of `And`, `Or` and `Field`
    /// only see rows whose outcome is still undecided. Disabling it evaluates
    /// every child against the combinator's full candidate set; masks are
    /// identical either way.
    pub fn narrowing(self, narrowing: bool) -> Self {
        SelectOptions { narrowing, ..self }
    }

    /// Returns whether short-circuit narrowing is enabled.
    pub fn is_narrowing(&self) -> bool {
        self.narrowing
    }
}
