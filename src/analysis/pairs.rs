use std::iter::FusedIterator;

/// Number of unordered pairs among `n` items, `n * (n - 1) / 2`.
///
/// Saturates at `usize::MAX` when the count does not fit in a `usize`.
pub const fn pair_count(n: usize) -> usize {
    if n < 2 {
        return 0;
    }

    // Halve the even factor first so only the final product can overflow.
    let (a, b) = if n % 2 == 0 {
        (n / 2, n - 1)
    } else {
        ((n - 1) / 2, n)
    };

    match a.checked_mul(b) {
        Some(count) => count,
        None => usize::MAX,
    }
}

/// Every `(i, j)` with `0 <= i < j < n`, row-major.
pub fn pairs(n: usize) -> PairIter {
    PairIter {
        n,
        i: 0,
        j: 1,
        remaining: pair_count(n),
    }
}

/// Iterator returned by [`pairs`].
#[derive(Debug, Clone)]
pub struct PairIter {
    n: usize,
    i: usize,
    j: usize,
    remaining: usize,
}

impl Iterator for PairIter {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let pair = (self.i, self.j);
        self.remaining -= 1;
        self.j += 1;
        if self.j == self.n {
            self.i += 1;
            self.j = self.i + 1;
        }

        Some(pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for PairIter {}

impl FusedIterator for PairIter {}
