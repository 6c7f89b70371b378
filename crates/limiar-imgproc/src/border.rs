/// A policy for neighborhood coordinates that fall outside the image.
///
/// Every policy keeps the pixel under the window center, so a window over a
/// non-empty image never yields an empty neighborhood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BorderPolicy {
    /// Clamp to the outermost row or column of pixels.
    ///
    /// Example: ...d c b a | a a a a...
    #[default]
    Replicate,

    /// Reflect the pixel values at the boundary, starting with the edge pixel itself.
    ///
    /// Example: ...d c b a | a b c d...
    Reflect,

    /// Drop samples outside the image; the neighborhood shrinks at the borders.
    Exclude,
}

impl BorderPolicy {
    #[inline]
    fn reflect(i: isize, len: usize) -> usize {
        if len == 1 {
            return 0;
        }
        let len = len as isize;
        let mut i = i;
        while i < 0 || i >= len {
            if i < 0 {
                i = -i - 1;
            } else {
                i = 2 * len - i - 1;
            }
        }
        i as usize
    }

    /// Maps index `i` to a valid index within `[0, len)` according to the policy.
    ///
    /// - `Replicate`: clamp to edge
    /// - `Reflect`: mirror including edge
    /// - `Exclude`: `None` when `i` is out of range
    ///
    /// # Arguments
    /// - `i`: The (possibly out-of-range) coordinate index.
    /// - `len`: The valid length of the dimension; must be > 0.
    ///
    /// # Example
    ///
    /// ```
    /// use limiar_imgproc::border::BorderPolicy;
    ///
    /// assert_eq!(BorderPolicy::Replicate.map_index(-2, 4), Some(0));
    /// assert_eq!(BorderPolicy::Reflect.map_index(-2, 4), Some(1));
    /// assert_eq!(BorderPolicy::Exclude.map_index(-2, 4), None);
    /// assert_eq!(BorderPolicy::Exclude.map_index(3, 4), Some(3));
    /// ```
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self {
            BorderPolicy::Replicate => Some(i.clamp(0, len as isize - 1) as usize),
            BorderPolicy::Reflect => Some(Self::reflect(i, len)),
            BorderPolicy::Exclude => (i >= 0 && i < len as isize).then_some(i as usize),
        }
    }
}

impl std::str::FromStr for BorderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "replicate" | "clamp" => Ok(BorderPolicy::Replicate),
            "reflect" | "mirror" => Ok(BorderPolicy::Reflect),
            "exclude" => Ok(BorderPolicy::Exclude),
            other => Err(format!(
                "unknown border policy `{other}`, expected replicate, reflect or exclude"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BorderPolicy;

    #[test]
    fn test_replicate() {
        let p = BorderPolicy::Replicate;
        assert_eq!(p.map_index(-5, 3), Some(0));
        assert_eq!(p.map_index(1, 3), Some(1));
        assert_eq!(p.map_index(7, 3), Some(2));
    }

    #[test]
    fn test_reflect() {
        let p = BorderPolicy::Reflect;
        // ...c b a | a b c | c b a...
        assert_eq!(p.map_index(-1, 3), Some(0));
        assert_eq!(p.map_index(-3, 3), Some(2));
        assert_eq!(p.map_index(3, 3), Some(2));
        assert_eq!(p.map_index(5, 3), Some(0));
        assert_eq!(p.map_index(-4, 1), Some(0));
    }

    #[test]
    fn test_exclude() {
        let p = BorderPolicy::Exclude;
        assert_eq!(p.map_index(-1, 3), None);
        assert_eq!(p.map_index(0, 3), Some(0));
        assert_eq!(p.map_index(3, 3), None);
    }

    #[test]
    fn test_map_index_always_in_bounds() {
        for policy in [
            BorderPolicy::Replicate,
            BorderPolicy::Reflect,
            BorderPolicy::Exclude,
        ] {
            for len in 1..6usize {
                for i in -12isize..12 {
                    if let Some(mapped) = policy.map_index(i, len) {
                        assert!(mapped < len, "{policy:?} mapped {i} to {mapped} (len {len})");
                    }
                }
            }
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("clamp".parse::<BorderPolicy>(), Ok(BorderPolicy::Replicate));
        assert_eq!("Reflect".parse::<BorderPolicy>(), Ok(BorderPolicy::Reflect));
        assert_eq!("exclude".parse::<BorderPolicy>(), Ok(BorderPolicy::Exclude));
        assert!("wrap".parse::<BorderPolicy>().is_err());
    }
}
