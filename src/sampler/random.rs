use crate::{Point2i, Point2f, Float};
use rand_xoshiro::Xoshiro256Plus;
use rand::{SeedableRng, Rng};
use crate::sampler::{Sampler, SamplerState};

/// An unstratified sampler: every sample, including array samples, is an
/// independent uniform draw. Simplest possible `Sampler`, useful as a
/// baseline and for tests that don't care about variance.
pub struct RandomSampler {
    rng: Xoshiro256Plus,
    seed: u64,
    state: SamplerState,
}

impl RandomSampler {
    pub fn new(samples_per_pixel: usize) -> Self {
        Self::new_with_seed(samples_per_pixel, 0)
    }

    pub fn new_with_seed(samples_per_pixel: usize, seed: u64) -> Self {
        RandomSampler {
            rng: Xoshiro256Plus::seed_from_u64(seed),
            seed,
            state: SamplerState::new(samples_per_pixel),
        }
    }
}

impl Sampler for RandomSampler {
    fn start_pixel(&mut self, pixel: Point2i) {
        self.state.start_pixel(pixel);
        self.state.fill_arrays_random(&mut self.rng);
    }

    fn start_next_sample(&mut self) -> bool {
        self.state.start_next_sample()
    }

    fn get_1d(&mut self) -> Float {
        self.rng.gen()
    }

    fn get_2d(&mut self) -> Point2f {
        Point2f::new(self.rng.gen(), self.rng.gen())
    }

    fn request_1d_array(&mut self, len: usize) {
        self.state.request_1d_array(len)
    }

    fn request_2d_array(&mut self, len: usize) {
        self.state.request_2d_array(len)
    }

    fn get_1d_array(&mut self, len: usize) -> &[Float] {
        self.state.get_1d_array(len)
    }

    fn get_2d_array(&mut self, len: usize) -> &[Point2f] {
        self.state.get_2d_array(len)
    }

    fn clone_with_seed(&self, seed: u64) -> Box<dyn Sampler> {
        Box::new(RandomSampler::new_with_seed(self.state.samples_per_pixel(), seed))
    }

    fn samples_per_pixel(&self) -> usize {
        self.state.samples_per_pixel()
    }

    fn set_sample_number(&mut self, sample_num: u64) -> bool {
        for _ in 0..sample_num {
            if !self.start_next_sample() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_sampler_1d_range() {
        let mut sampler = RandomSampler::new_with_seed(4, 1);
        sampler.start_pixel(Point2i::new(0, 0));
        for _ in 0..100 {
            let v = sampler.get_1d();
            assert!(v >= 0.0 && v < 1.0);
        }
    }

    #[test]
    fn test_random_sampler_array() {
        let mut sampler = RandomSampler::new_with_seed(2, 1);
        sampler.request_1d_array(3);
        sampler.start_pixel(Point2i::new(0, 0));
        let arr = sampler.get_1d_array(3);
        assert_eq!(arr.len(), 3);
    }
}
