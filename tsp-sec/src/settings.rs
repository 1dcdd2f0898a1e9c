//! TSP solver settings.

use lazy_mip::MipSettings;

/// Settings for building and solving a TSP model.
#[derive(Debug, Clone)]
pub struct TspSettings {
    /// An edge counts as selected if its value exceeds `eps`.
    /// LP solutions carry floating-point noise around 0 and 1.
    pub eps: f64,

    /// Settings passed to the MIP host.
    ///
    /// `allow_dual_reductions` is always turned off by the model builder:
    /// subtour constraints do not exist until the handler adds them.
    pub mip: MipSettings,
}

impl Default for TspSettings {
    fn default() -> Self {
        Self {
            eps: 1e-6,
            mip: MipSettings::default(),
        }
    }
}

impl TspSettings {
    /// Create settings with verbose host output enabled.
    pub fn verbose() -> Self {
        Self {
            mip: MipSettings::verbose(),
            ..Self::default()
        }
    }

    /// Set the selection tolerance.
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Replace the host settings.
    pub fn with_mip_settings(mut self, mip: MipSettings) -> Self {
        self.mip = mip;
        self
    }
}
