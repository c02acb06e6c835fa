//! Level of detail as a function of squared distance to the viewer.

use crate::MeshError;

/// Absorbs rounding right below an integer before flooring, so the near
/// field level does not depend on how `close_resolution / render_distance`
/// happens to round.
const LEVEL_SNAP: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LodConfig {
    /// `D`, the distance scale of the falloff
    render_distance: f64,
    /// near field density basis, `K = close_resolution / D`
    close_resolution: f64,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            render_distance: 100.,
            close_resolution: 5.,
        }
    }
}

impl LodConfig {
    pub fn new(render_distance: f64, close_resolution: f64) -> Result<Self, MeshError> {
        if !(render_distance.is_finite() && render_distance > 0.) {
            return Err(MeshError::InvalidConfig("render distance must be positive"));
        }
        if !(close_resolution.is_finite() && close_resolution > 0.) {
            return Err(MeshError::InvalidConfig("close resolution must be positive"));
        }
        if close_resolution > render_distance {
            return Err(MeshError::InvalidConfig(
                "close resolution must not exceed render distance",
            ));
        }
        Ok(Self {
            render_distance,
            close_resolution,
        })
    }

    pub fn render_distance(&self) -> f64 {
        self.render_distance
    }

    pub fn close_resolution(&self) -> f64 {
        self.close_resolution
    }

    /// `K`, the near field density ratio
    pub fn ratio(&self) -> f64 {
        self.close_resolution / self.render_distance
    }

    /// `floor(K (D + 1) / (d2 / D + 1) - K) + 1`, never below 1.
    ///
    /// Non increasing in `d2`: the near field maximum at the viewer, 1 from
    /// roughly `d2 = D^2` on.
    pub fn target_subdivision_level(&self, d2: f64) -> u32 {
        let d = self.render_distance;
        let k = self.ratio();
        let raw = k * (d + 1.) / (d2.max(0.) / d + 1.) - k;
        let level = (raw + LEVEL_SNAP).floor() + 1.;
        if level.is_nan() || level < 1. {
            1
        } else {
            level as u32
        }
    }

    /// Level right at the viewer
    pub fn max_level(&self) -> u32 {
        self.target_subdivision_level(0.)
    }

    /// Largest circumradius^2 acceptable at `level`.
    ///
    /// Level 1 accepts the outer triangle itself, every further level halves
    /// the circumradius.
    pub fn max_radius_sq(&self, level: u32, root_radius_sq: f64) -> f64 {
        let halvings = level.saturating_sub(1).min(512) as i32;
        root_radius_sq * 0.25f64.powi(halvings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(LodConfig::new(100., 5.).is_ok());
        assert!(LodConfig::new(100., 100.).is_ok());
        assert!(matches!(
            LodConfig::new(0., 5.),
            Err(MeshError::InvalidConfig(_))
        ));
        assert!(matches!(
            LodConfig::new(100., -1.),
            Err(MeshError::InvalidConfig(_))
        ));
        assert!(matches!(
            LodConfig::new(10., 20.),
            Err(MeshError::InvalidConfig(_))
        ));
        assert!(matches!(
            LodConfig::new(f64::INFINITY, 20.),
            Err(MeshError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_near_and_far_levels() {
        let lod = LodConfig::new(100., 5.).unwrap();
        assert_eq!(lod.target_subdivision_level(0.), 6);
        assert_eq!(lod.max_level(), 6);
        assert_eq!(lod.target_subdivision_level(1.), 5);
        assert_eq!(lod.target_subdivision_level(100.), 3);
        assert_eq!(lod.target_subdivision_level(100. * 100.), 1);
        assert!(lod.target_subdivision_level(100. * 100.) < lod.target_subdivision_level(0.));
        assert_eq!(lod.target_subdivision_level(1e12), 1);
    }

    #[test]
    fn test_monotonic() {
        for (d, cr) in [(100., 5.), (10., 10.), (250., 1.), (3., 0.5)] {
            let lod = LodConfig::new(d, cr).unwrap();
            let mut prev = lod.max_level();
            let mut d2 = 0.;
            while d2 < 4. * d * d {
                let level = lod.target_subdivision_level(d2);
                assert!(level <= prev, "D={d} cr={cr} d2={d2}");
                assert!(level >= 1);
                prev = level;
                d2 += d / 50.;
            }
        }
    }

    #[test]
    fn test_max_radius_sq() {
        let lod = LodConfig::default();
        assert_eq!(lod.max_radius_sq(1, 64.), 64.);
        assert_eq!(lod.max_radius_sq(2, 64.), 16.);
        assert_eq!(lod.max_radius_sq(4, 64.), 1.);
        assert_eq!(lod.max_radius_sq(0, 64.), 64.);
    }
}
