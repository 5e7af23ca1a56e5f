#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    BounceOut,
}

impl Easing {
    pub fn sample(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::BounceOut => bounce_out(t),
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Fixed-duration interpolation of a scalar. Once the elapsed time reaches the
/// duration the tween reports exactly its target value.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Tween {
        Tween {
            from,
            to,
            duration,
            elapsed: 0.0,
            easing,
        }
    }

    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;

        if self.elapsed >= self.duration {
            self.to
        } else {
            let t = self.easing.sample(self.elapsed / self.duration);
            self.from + (self.to - self.from) * t
        }
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// A scalar animated by at most one tween at a time. Starting a new tween
/// replaces the running one (last write wins).
#[derive(Debug, Clone, Copy)]
pub struct Channel {
    value: f32,
    tween: Option<Tween>,
}

impl Channel {
    pub fn new(value: f32) -> Channel {
        Channel { value, tween: None }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn tween_to(&mut self, to: f32, duration: f32, easing: Easing) {
        self.tween = Some(Tween::new(self.value, to, duration, easing));
    }

    pub fn tick(&mut self, dt: f32) {
        if let Some(tween) = &mut self.tween {
            self.value = tween.advance(dt);
            if tween.finished() {
                self.tween = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounce_out_endpoints() {
        assert_eq!(bounce_out(0.0), 0.0);
        assert!((bounce_out(1.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn bounce_out_stays_in_range() {
        for step in 0..=100 {
            let t = step as f32 / 100.0;
            let value = bounce_out(t);
            assert!((0.0..=1.0 + 1e-4).contains(&value));
        }
    }

    #[test]
    fn channel_converges_exactly() {
        let mut scale = Channel::new(1.0);
        scale.tween_to(10.0, 1.0, Easing::BounceOut);

        for _ in 0..4 {
            scale.tick(0.25);
        }

        assert_eq!(scale.value(), 10.0);

        // Settled channels keep their value
        scale.tick(0.25);
        assert_eq!(scale.value(), 10.0);
    }

    #[test]
    fn overshooting_tick_lands_on_target() {
        let mut scale = Channel::new(10.0);
        scale.tween_to(1.0, 1.0, Easing::BounceOut);

        scale.tick(3.0);
        assert_eq!(scale.value(), 1.0);
    }

    #[test]
    fn new_tween_replaces_running_one() {
        let mut scale = Channel::new(1.0);
        scale.tween_to(10.0, 1.0, Easing::Linear);
        scale.tick(0.5);
        assert!((scale.value() - 5.5).abs() < 1e-5);

        // Retarget mid-flight; the new tween starts from the current value
        scale.tween_to(1.0, 1.0, Easing::Linear);
        scale.tick(0.5);
        assert!((scale.value() - 3.25).abs() < 1e-5);

        scale.tick(0.5);
        assert_eq!(scale.value(), 1.0);
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        let mut scale = Channel::new(1.0);
        scale.tween_to(10.0, 0.0, Easing::BounceOut);
        scale.tick(0.0);
        assert_eq!(scale.value(), 10.0);
    }
}
