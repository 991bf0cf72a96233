use rand::Rng;

/// Uniform draw in [0, 1). Every random decision in the scene goes through here.
#[inline]
pub(crate) fn unit<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>()
}

/// Uniform draw in [lo, hi).
#[inline]
pub(crate) fn between<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    lo + unit(rng) * (hi - lo)
}

/// Uniform integer in lo..=hi.
pub(crate) fn count_in<R: Rng + ?Sized>(rng: &mut R, lo: usize, hi: usize) -> usize {
    let span = (hi - lo + 1) as f32;
    lo + ((unit(rng) * span) as usize).min(hi - lo)
}

/// -1 with probability one half, otherwise +1.
pub(crate) fn direction<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if unit(rng) > 0.5 {
        -1.0
    } else {
        1.0
    }
}

#[cfg(test)]
pub(crate) use scripted::ScriptedRng;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_values_come_back_as_unit_draws() {
        let mut rng = ScriptedRng::new(vec![0.0, 0.25, 0.5, 0.75], 0.125);
        assert_eq!(unit(&mut rng), 0.0);
        assert_eq!(unit(&mut rng), 0.25);
        assert_eq!(unit(&mut rng), 0.5);
        assert_eq!(unit(&mut rng), 0.75);
        assert_eq!(unit(&mut rng), 0.125);
        assert_eq!(rng.draws, 5);
    }

    #[test]
    fn count_in_covers_inclusive_range() {
        let mut rng = ScriptedRng::new(vec![0.0, 0.2499, 0.25, 0.5, 0.75, 0.9999], 0.0);
        let got: Vec<usize> = (0..6).map(|_| count_in(&mut rng, 3, 6)).collect();
        assert_eq!(got, vec![3, 3, 4, 5, 6, 6]);
    }

    #[test]
    fn direction_splits_at_half() {
        let mut rng = ScriptedRng::new(vec![0.5, 0.51], 0.0);
        assert_eq!(direction(&mut rng), 1.0);
        assert_eq!(direction(&mut rng), -1.0);
    }
}
