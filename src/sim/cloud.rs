//! Blast clouds: a fading marker where a grenade went off

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CLOUD_ALPHA, CLOUD_FADE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: IVec2,
    alpha: u8,
}

impl Cloud {
    pub fn new(pos: IVec2) -> Self {
        Self {
            pos,
            alpha: CLOUD_ALPHA,
        }
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    pub fn update(&mut self) {
        self.alpha = self.alpha.saturating_sub(CLOUD_FADE);
    }

    pub fn is_faded(&self) -> bool {
        self.alpha == 0
    }
}

/// Fade every cloud one step and drop the ones that are gone
pub fn age_clouds(clouds: &mut Vec<Cloud>) {
    for cloud in clouds.iter_mut() {
        cloud.update();
    }
    clouds.retain(|c| !c.is_faded());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_fades_out() {
        let mut cloud = Cloud::new(IVec2::new(3, 4));
        cloud.update();
        assert_eq!(cloud.alpha(), 245);
        for _ in 0..30 {
            cloud.update();
        }
        assert_eq!(cloud.alpha(), 0);
        assert!(cloud.is_faded());
    }

    #[test]
    fn test_age_clouds_drops_every_faded_cloud() {
        // Two adjacent clouds fading on the same tick must both go
        let mut old = Cloud::new(IVec2::ZERO);
        for _ in 0..24 {
            old.update();
        }
        let mut clouds = vec![old.clone(), old, Cloud::new(IVec2::ONE)];
        age_clouds(&mut clouds);
        assert_eq!(clouds.len(), 3);
        age_clouds(&mut clouds);
        assert_eq!(clouds.len(), 1);
        assert_eq!(clouds[0].pos, IVec2::ONE);
    }
}
