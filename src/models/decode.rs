// Output decoding
// Arg-max over the class scores, then a threshold-gated index-to-letter map.

/// A confident classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub letter: char,
    pub index: usize,
    pub confidence: f32,
}

/// Index and value of the first maximum.
///
/// Uses strict `>` so the lowest index wins ties. NaN never compares
/// greater, so an all-NaN (or empty) slice has no maximum.
pub fn arg_max(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, max)) if v <= max || v.is_nan() => {}
            None if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

/// `base + index` as a char, if that is a valid code point
pub fn letter_for(index: usize, base: char) -> Option<char> {
    let offset = u32::try_from(index).ok()?;
    (base as u32).checked_add(offset).and_then(char::from_u32)
}

/// Decode a score vector. `None` unless the maximum is strictly above `threshold`.
pub fn decode(values: &[f32], threshold: f32, base: char) -> Option<Prediction> {
    let (index, confidence) = arg_max(values)?;
    if confidence > threshold {
        letter_for(index, base).map(|letter| Prediction {
            letter,
            index,
            confidence,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_max_first_wins_ties() {
        assert_eq!(arg_max(&[0.2, 0.7, 0.7, 0.1]), Some((1, 0.7)));
        assert_eq!(arg_max(&[0.4, 0.4]), Some((0, 0.4)));
    }

    #[test]
    fn test_arg_max_empty_and_nan() {
        assert_eq!(arg_max(&[]), None);
        assert_eq!(arg_max(&[f32::NAN, f32::NAN]), None);
        assert_eq!(arg_max(&[f32::NAN, 0.3, f32::NAN]), Some((1, 0.3)));
    }

    #[test]
    fn test_arg_max_negative_values() {
        assert_eq!(arg_max(&[-3.0, -1.5, -2.0]), Some((1, -1.5)));
    }

    #[test]
    fn test_decode_confident() {
        let p = decode(&[0.9, 0.1, 0.05], 0.5, 'A').unwrap();
        assert_eq!(p.letter, 'A');
        assert_eq!(p.index, 0);
        assert!((p.confidence - 0.9).abs() < 1e-6);

        let mut scores = vec![0.0; 26];
        scores[25] = 0.8;
        assert_eq!(decode(&scores, 0.5, 'A').unwrap().letter, 'Z');
    }

    #[test]
    fn test_decode_threshold_is_strict() {
        assert_eq!(decode(&[0.5, 0.2, 0.3], 0.5, 'A'), None);
        assert_eq!(decode(&[0.1, 0.4, 0.3], 0.5, 'A'), None);
    }

    #[test]
    fn test_letter_for() {
        assert_eq!(letter_for(0, 'A'), Some('A'));
        assert_eq!(letter_for(2, 'a'), Some('c'));
        // Surrogate range is not a char
        assert_eq!(letter_for(0xD800 - 'A' as usize, 'A'), None);
    }
}
