use serde::Deserialize;

/// Customer sign-up settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OnboardingConfig {
    /// Prefix of generated CIF numbers.
    pub cif_prefix: String,
    /// Largest accepted photo upload, in bytes.
    pub max_photo_bytes: usize,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            cif_prefix: "CIF".into(),
            max_photo_bytes: 2 * 1024 * 1024,
        }
    }
}
