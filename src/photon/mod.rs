//! Photon mapping: a deposited photon map queried by radius, plus the
//! per-pixel progressive photon mapping (PPM) statistics and Hachisuka's
//! radius/radiance update rule for refining a gather estimate across
//! passes.

use std::collections::HashMap;

use cgmath::InnerSpace;

use crate::spectrum::Spectrum;
use crate::{Float, Point3f, Vec3f};

/// A single deposited photon: the throughput radiance it's carrying, its
/// position, and the direction it arrived from (needed to evaluate the
/// BSDF at gather time).
#[derive(Debug, Clone, Copy)]
pub struct Photon {
    pub throughput: Spectrum,
    pub position: Point3f,
    pub incident_dir: Vec3f,
}

impl Photon {
    pub fn new(throughput: Spectrum, position: Point3f, incident_dir: Vec3f) -> Self {
        Self { throughput, position, incident_dir }
    }
}

/// A uniform spatial hash grid over deposited photons, queried by radius
/// at gather time. The grid's cell size is fixed at build time from the
/// largest gather radius the caller expects to query with -- too large a
/// query radius relative to the cell size just means scanning more
/// neighboring cells, not missed photons.
pub struct PhotonMap {
    photons: Vec<Photon>,
    cell_size: Float,
    cells: HashMap<(i32, i32, i32), Vec<u32>>,
}

impl PhotonMap {
    pub fn build(photons: Vec<Photon>, cell_size: Float) -> Self {
        debug_assert!(cell_size > 0.0);
        let mut cells: HashMap<(i32, i32, i32), Vec<u32>> = HashMap::new();
        for (i, photon) in photons.iter().enumerate() {
            cells.entry(Self::cell_of(photon.position, cell_size)).or_default().push(i as u32);
        }
        Self { photons, cell_size, cells }
    }

    fn cell_of(p: Point3f, cell_size: Float) -> (i32, i32, i32) {
        (
            (p.x / cell_size).floor() as i32,
            (p.y / cell_size).floor() as i32,
            (p.z / cell_size).floor() as i32,
        )
    }

    /// Visits every photon within `radius` of `center`. The grid only
    /// guarantees correctness when `radius <= cell_size`; a caller ramping
    /// radii down across PPM passes should rebuild with a smaller
    /// `cell_size` once radii shrink well below the initial one.
    pub fn for_each_in_radius(&self, center: Point3f, radius: Float, mut visit: impl FnMut(&Photon)) {
        let r2 = radius * radius;
        let (cx, cy, cz) = Self::cell_of(center, self.cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(indices) = self.cells.get(&(cx + dx, cy + dy, cz + dz)) {
                        for &i in indices {
                            let photon = &self.photons[i as usize];
                            let d2 = (photon.position - center).magnitude2();
                            if d2 <= r2 {
                                visit(photon);
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }
}

/// Per-pixel progressive photon mapping state: the current gather radius,
/// the accumulated photon count, and the accumulated flux. Each rendering
/// pass traces `m` new photons into the radius, then [`Self::update`]
/// folds them in and shrinks the radius following Hachisuka's rule.
#[derive(Debug, Clone, Copy)]
pub struct PpmPixelStats {
    pub radius: Float,
    pub n_photons: Float,
    pub accumulated_flux: Spectrum,
}

impl PpmPixelStats {
    pub fn new(initial_radius: Float) -> Self {
        Self { radius: initial_radius, n_photons: 0.0, accumulated_flux: Spectrum::uniform(0.0) }
    }

    /// Folds in `m` newly gathered photons contributing `new_flux` total,
    /// shrinking the search radius by the progressive photon mapping
    /// reduction factor `alpha` (typically in `(0, 1)`; smaller values
    /// converge the radius faster at the cost of more variance early on).
    pub fn update(&mut self, m: Float, new_flux: Spectrum, alpha: Float) {
        if m <= 0.0 {
            return;
        }

        let n = self.n_photons;
        let ratio = (n + alpha * m) / (n + m);

        self.accumulated_flux = (self.accumulated_flux + new_flux) * ratio;
        self.radius *= ratio.sqrt();
        self.n_photons = n + alpha * m;
    }

    /// The current radiance estimate: accumulated flux divided by the
    /// disc area the gather radius subtends, matching the standard photon
    /// mapping density estimate.
    pub fn radiance_estimate(&self, n_emitted: Float) -> Spectrum {
        if n_emitted <= 0.0 || self.radius <= 0.0 {
            return Spectrum::uniform(0.0);
        }
        let area = std::f32::consts::PI * self.radius * self.radius;
        self.accumulated_flux / (n_emitted * area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_finds_nearby_photons_only() {
        let photons = vec![
            Photon::new(Spectrum::uniform(1.0), Point3f::new(0.0, 0.0, 0.0), Vec3f::new(0.0, 0.0, 1.0)),
            Photon::new(Spectrum::uniform(1.0), Point3f::new(0.05, 0.0, 0.0), Vec3f::new(0.0, 0.0, 1.0)),
            Photon::new(Spectrum::uniform(1.0), Point3f::new(10.0, 0.0, 0.0), Vec3f::new(0.0, 0.0, 1.0)),
        ];
        let map = PhotonMap::build(photons, 1.0);

        let mut found = 0;
        map.for_each_in_radius(Point3f::new(0.0, 0.0, 0.0), 0.1, |_| found += 1);
        assert_eq!(found, 2);
    }

    #[test]
    fn ppm_radius_shrinks_each_update() {
        let mut stats = PpmPixelStats::new(1.0);
        stats.update(10.0, Spectrum::uniform(5.0), 0.7);
        assert!(stats.radius < 1.0);
        let r1 = stats.radius;
        stats.update(10.0, Spectrum::uniform(5.0), 0.7);
        assert!(stats.radius < r1);
    }

    #[test]
    fn ppm_update_is_noop_for_zero_photons() {
        let mut stats = PpmPixelStats::new(1.0);
        stats.update(0.0, Spectrum::uniform(0.0), 0.7);
        assert_relative_eq!(stats.radius, 1.0);
        assert_eq!(stats.n_photons, 0.0);
    }
}
